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

use std::{
    fmt::{Debug, Formatter},
    sync::Arc,
};

use crate::sink::SinkDirectory;

/// A configuration of the [AssemblyBuilder](crate::discovery::AssemblyBuilder).
#[derive(Clone)]
#[non_exhaustive]
pub struct BuildConfig {
    /// The group of the mini scripts and settings that do not specify one.
    ///
    /// The default value is `"Other"`.
    pub default_group: &'static str,

    /// If set, a module without script types produces a single script
    /// synthesized from the module's entry point.
    ///
    /// The default value is true.
    pub fallback: bool,

    /// The factory of the scripts' diagnostic sinks.
    ///
    /// The default value is None: the scripts do not have sinks, and the
    /// `#[script(sink)]` members keep their initial values.
    pub sinks: Option<Arc<dyn SinkDirectory>>,

    /// If set, the build warnings of a script are also written to the
    /// script's sink.
    ///
    /// The default value is true.
    pub warn_to_sink: bool,
}

impl Debug for BuildConfig {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("BuildConfig")
            .field("default_group", &self.default_group)
            .field("fallback", &self.fallback)
            .field("sinks", &self.sinks.is_some())
            .field("warn_to_sink", &self.warn_to_sink)
            .finish()
    }
}

impl Default for BuildConfig {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl BuildConfig {
    /// The default constructor for this configuration object.
    #[inline(always)]
    pub const fn new() -> Self {
        Self {
            default_group: "Other",
            fallback: true,
            sinks: None,
            warn_to_sink: true,
        }
    }

    /// Sets the [sinks](Self::sinks) directory.
    #[inline(always)]
    pub fn with_sinks(mut self, directory: impl SinkDirectory) -> Self {
        self.sinks = Some(Arc::new(directory));
        self
    }
}
