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

use proc_macro2::Span;
use syn::{Attribute, Result};

use crate::utils::PathUtils;

/// The standard derives of a struct that matter to the script discovery.
#[derive(Default)]
pub struct DeriveMeta {
    default: Option<Span>,
}

impl DeriveMeta {
    /// Returns the span of `#[derive(Default)]`, the source of the script
    /// type's parameterless constructor.
    #[inline(always)]
    pub fn impls_default(&self) -> Option<Span> {
        self.default
    }

    pub(super) fn enrich(&mut self, attribute: &Attribute) -> Result<()> {
        if !attribute.path().is_ident("derive") {
            return Ok(());
        }

        attribute.parse_nested_meta(|meta| {
            if let Some(meta) = meta.path.matches_default() {
                self.default = Some(meta.span);
            }

            Ok(())
        })?;

        Ok(())
    }
}
