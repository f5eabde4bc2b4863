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

//! The discovered object graph.
//!
//! A [ScriptAssembly] is the owning arena of all [Script]s discovered in one
//! module. Scripts own their operations ([InvocableMember]) and settings
//! ([ScriptSetting]); the members refer back to their script by
//! [ScriptId] only.

mod assembly;
mod group;
mod member;
mod resource;
mod setting;

pub use crate::model::{
    assembly::{BuildWarning, Script, ScriptAssembly},
    group::Groups,
    member::InvocableMember,
    resource::ManagedResource,
    setting::ScriptSetting,
};

/// A process-unique identifier of a [Script].
///
/// The identifier is named after its script while the owning
/// [ScriptAssembly] is alive.
pub type ScriptId = lady_deirdre::arena::Id;
