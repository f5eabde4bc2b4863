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

//! The runtime side of the discovery engine.
//!
//! This module contains the dynamic [Value] model and the
//! [compatibility] engine that reconciles heterogeneous primitive kinds,
//! the [Slider] materialization of numeric settings, and the descriptor
//! tables ([ModuleMeta], [TypeMeta], [OperationMeta], [MemberMeta]) through
//! which the [discovery](crate::discovery) engine inspects a module.
//!
//! The descriptor tables are normally produced by the
//! [script](crate::script) macro, but they can be assembled manually as well.

mod annotation;
mod compat;
mod error;
mod instance;
mod module;
mod origin;
mod range;
mod ty;
mod value;

#[doc(hidden)]
pub mod __intrinsics;

pub use crate::runtime::{
    annotation::{Annotation, Annotations, Marker},
    compat::{cast, compatibility, convert, is_implicit, strip_numeric_suffix, Compatibility},
    error::{
        BuildError,
        BuildResult,
        CastCause,
        CastError,
        InstanceError,
        InvokeError,
        NumberCastCause,
        SettingError,
    },
    instance::{Instance, Release},
    module::{ModuleMeta, ScriptModule},
    origin::{RustCode, RustOrigin},
    range::{RangeBound, RangeBounds, RangeMismatch, Slider},
    ty::{
        release_fn,
        Arg,
        ConstructFn,
        ConstructorMeta,
        GetFn,
        InjectFn,
        InvokeFn,
        MemberKind,
        MemberMeta,
        MemberReceiver,
        OperationMeta,
        ParamMeta,
        ParamShape,
        Receiver,
        ReleaseFn,
        SetFn,
        TypeMeta,
    },
    value::{IntoOutput, ScriptValue, Value, ValueKind},
};

/// A cooperative cancellation signal.
///
/// An operation that declares a single Signal parameter may observe the
/// signal's [activation](lady_deirdre::sync::Trigger::activate) and stop
/// early. Nothing interrupts an operation forcibly.
pub type Signal = lady_deirdre::sync::Trigger;
