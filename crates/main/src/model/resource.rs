////////////////////////////////////////////////////////////////////////////////
// This file is part of "Stagehand", a script discovery and modeling          //
// engine.                                                                    //
//                                                                            //
// This work is proprietary software with source-available code.              //
//                                                                            //
// To copy, use, distribute, or contribute to this work, you must agree to    //
// the terms of the General License Agreement:                                //
//                                                                            //
// https://github.com/Eliah-Lakhin/ad-astra/blob/master/EULA.md               //
//                                                                            //
// The agreement grants a Basic Commercial License, allowing you to use       //
// this work in non-commercial and limited commercial products with a total   //
// gross revenue cap. To remove this commercial limit for one of your         //
// products, you must acquire a Full Commercial License.                      //
//                                                                            //
// If you contribute to the source code, documentation, or related materials, //
// you must grant me an exclusive license to these contributions.             //
// Contributions are governed by the "Contributions" section of the General   //
// License Agreement.                                                         //
//                                                                            //
// Copying the work in parts is strictly forbidden, except as permitted       //
// under the General License Agreement.                                       //
//                                                                            //
// If you do not or cannot agree to the terms of this Agreement,              //
// do not use this work.                                                      //
//                                                                            //
// This work is provided "as is", without any warranties, express or implied, //
// except where such disclaimers are legally invalid.                         //
//                                                                            //
// Copyright (c) 2024 Ilya Lakhin (Илья Александрович Лахин).                 //
// All rights reserved.                                                       //
////////////////////////////////////////////////////////////////////////////////

use crate::runtime::{Instance, InstanceError, ReleaseFn};

/// A handle of the releasable resource owned by a script's instance.
///
/// The handle exists only if the script type implements
/// [Release](crate::runtime::Release). The owning
/// [ScriptAssembly](crate::model::ScriptAssembly) releases it at most once,
/// either explicitly or when the assembly is dropped.
#[derive(Debug)]
pub struct ManagedResource {
    instance: Instance,
    release: ReleaseFn,
    released: bool,
}

impl ManagedResource {
    #[inline(always)]
    pub(crate) fn new(instance: Instance, release: ReleaseFn) -> Self {
        Self {
            instance,
            release,
            released: false,
        }
    }

    #[inline(always)]
    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Releases the resource. Subsequent calls do nothing.
    ///
    /// The call waits for the operations that currently use the instance.
    pub(crate) fn release(&mut self) -> Result<(), InstanceError> {
        if self.released {
            return Ok(());
        }

        self.released = true;

        (self.release)(&self.instance)
    }
}
