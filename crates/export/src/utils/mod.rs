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

mod attr;
mod context;
mod declaration;
mod derive;
mod facade;
mod path;
mod seed;
mod ty;

pub use crate::utils::{
    attr::{
        Attrs,
        Role,
        Scriptable,
        CLEANUP,
        DESCRIPTION,
        DUMP,
        ENTRY_POINT,
        GROUP,
        MINI_SCRIPT,
        MODULE,
        NAME,
        ONCE,
        RANGE,
        SETTER,
        SETTING,
        SETUP,
        SINK,
        VERSION,
    },
    context::{Context, OriginRef},
    declaration::{
        Annotations,
        Constructor,
        EntryPointDeclaration,
        Field,
        FieldKind,
        Group,
        ImplDeclaration,
        ModuleDeclaration,
        Operation,
        Param,
        Receiver,
        TypeDeclaration,
    },
    derive::DeriveMeta,
    facade::Facade,
    path::PathUtils,
    seed::{seed_hash_set, seed_hasher},
    ty::{ParamShape, TypeUtils},
};
