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
    error::Error as StdError,
    fmt::{Display, Formatter},
    result::Result as StdResult,
};

use compact_str::CompactString;

use crate::runtime::{RangeBound, ValueKind};

/// A result of the [AssemblyBuilder](crate::discovery::AssemblyBuilder) that
/// can either be a normal value or a [BuildError].
pub type BuildResult<T> = StdResult<T, BuildError>;

/// An authoring mistake in the inspected module that prevents the discovery
/// of the scripts.
///
/// Build errors are never swallowed: the first one aborts the whole
/// [parse](crate::discovery::AssemblyBuilder::parse) call, and the module's
/// author has to fix the annotated code.
#[derive(Clone, PartialEq, Eq, Debug)]
#[non_exhaustive]
pub enum BuildError {
    /// A type marked as a script does not have a public constructor without
    /// parameters (e.g., neither `#[derive(Default)]` nor `pub fn new() -> Self`).
    NoParameterlessConstructor {
        /// The name of the script type.
        ty: CompactString,
    },

    /// A type marked as a script has generic parameters.
    IncompatibleWithGenericClasses {
        /// The name of the script type.
        ty: CompactString,
    },

    /// An annotated operation has generic parameters.
    IncompatibleWithGenericMethods {
        /// The name of the type that owns the operation.
        ty: CompactString,

        /// The name of the operation.
        operation: CompactString,
    },

    /// An annotated operation declares parameters other than exactly one
    /// cancellation [Signal](crate::runtime::Signal).
    IncompatibleWithParameters {
        /// The name of the type that owns the operation.
        ty: CompactString,

        /// The name of the operation.
        operation: CompactString,

        /// The types of the declared parameters.
        params: Vec<CompactString>,
    },

    /// The module's entry point has a parameter list other than none or
    /// a single sequence of strings.
    IncompatibleEntryPoint {
        /// The name of the module.
        module: CompactString,

        /// The types of the declared parameters.
        params: Vec<CompactString>,
    },

    /// An explicit range bound of a numeric setting cannot be reconciled with
    /// the setting's value kind.
    IncompatibleTypeUsedWithRange {
        /// The name of the script type.
        ty: CompactString,

        /// The name of the setting member.
        setting: CompactString,

        /// The bound that failed.
        bound: RangeBound,

        /// The kind of the author-supplied bound.
        supplied: ValueKind,

        /// The kind of the setting's value.
        expected: ValueKind,
    },
}

impl Display for BuildError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoParameterlessConstructor { ty } => formatter.write_fmt(format_args!(
                "script type \"{ty}\" does not have a public parameterless constructor",
            )),

            Self::IncompatibleWithGenericClasses { ty } => formatter.write_fmt(format_args!(
                "script type \"{ty}\" is generic, and generic types cannot be scripts",
            )),

            Self::IncompatibleWithGenericMethods { ty, operation } => {
                formatter.write_fmt(format_args!(
                    "operation \"{ty}::{operation}\" is generic, and generic operations \
                    cannot be invoked by scripts",
                ))
            }

            Self::IncompatibleWithParameters {
                ty,
                operation,
                params,
            } => formatter.write_fmt(format_args!(
                "operation \"{ty}::{operation}\" has parameters ({}), but script \
                operations accept either nothing or a single cancellation signal",
                params.join(", "),
            )),

            Self::IncompatibleEntryPoint { module, params } => formatter.write_fmt(format_args!(
                "entry point of module \"{module}\" has parameters ({}), but an entry \
                point accepts either nothing or a single sequence of strings",
                params.join(", "),
            )),

            Self::IncompatibleTypeUsedWithRange {
                ty,
                setting,
                bound,
                supplied,
                expected,
            } => formatter.write_fmt(format_args!(
                "range {bound} of type {supplied} cannot be used with setting \
                \"{ty}::{setting}\" of type {expected}",
            )),
        }
    }
}

impl StdError for BuildError {}

/// An error that occurs when invoking a discovered operation.
#[derive(Clone, PartialEq, Eq, Debug)]
#[non_exhaustive]
pub enum InvokeError {
    /// The number of passed arguments does not match the operation's
    /// signature.
    ArityMismatch {
        operation: CompactString,
        expected: usize,
        actual: usize,
    },

    /// The argument at `index` does not match the parameter's type.
    ArgumentMismatch {
        operation: CompactString,
        index: usize,
        expected: &'static str,
        actual: &'static str,
    },

    /// The operation requires a receiver object, but the member is not bound
    /// to an instance.
    MissingInstance { operation: CompactString },

    /// The operation's receiver object is not accessible.
    Instance {
        operation: CompactString,
        cause: InstanceError,
    },

    /// The operation's signature is not supported by the engine, and the
    /// operation cannot be called.
    Unsupported { operation: CompactString },

    /// The operation has returned an [Err] result.
    Failed {
        /// The name of the operation, if known at the point of failure.
        operation: Option<CompactString>,

        /// The printed error.
        message: String,
    },
}

impl Display for InvokeError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ArityMismatch {
                operation,
                expected,
                actual,
            } => formatter.write_fmt(format_args!(
                "operation \"{operation}\" expects {expected} argument(s), but {actual} \
                provided",
            )),

            Self::ArgumentMismatch {
                operation,
                index,
                expected,
                actual,
            } => formatter.write_fmt(format_args!(
                "argument #{index} of operation \"{operation}\" must be {expected}, \
                but {actual} provided",
            )),

            Self::MissingInstance { operation } => formatter.write_fmt(format_args!(
                "operation \"{operation}\" is not bound to an instance",
            )),

            Self::Instance { operation, cause } => {
                formatter.write_fmt(format_args!("operation \"{operation}\": {cause}"))
            }

            Self::Unsupported { operation } => formatter.write_fmt(format_args!(
                "operation \"{operation}\" has an unsupported signature",
            )),

            Self::Failed {
                operation: Some(operation),
                message,
            } => formatter.write_fmt(format_args!("operation \"{operation}\" failed: {message}")),

            Self::Failed {
                operation: None,
                message,
            } => formatter.write_fmt(format_args!("operation failed: {message}")),
        }
    }
}

impl StdError for InvokeError {
    #[inline]
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Instance { cause, .. } => Some(cause),
            _ => None,
        }
    }
}

impl InvokeError {
    // Attaches the operation name to the errors produced by the output
    // conversion, which does not know it.
    #[inline]
    pub(crate) fn with_operation(self, name: &str) -> Self {
        match self {
            Self::Failed {
                operation: None,
                message,
            } => Self::Failed {
                operation: Some(CompactString::from(name)),
                message,
            },

            other => other,
        }
    }
}

/// An error that occurs when reading or writing a
/// [ScriptSetting](crate::model::ScriptSetting).
#[derive(Clone, PartialEq, Eq, Debug)]
#[non_exhaustive]
pub enum SettingError {
    /// The new value cannot be converted into the setting's kind at all.
    Incompatible {
        setting: CompactString,
        expected: ValueKind,
        actual: ValueKind,
    },

    /// The new value is compatible with the setting's kind in general, but
    /// this particular value does not fit (e.g., `300` for a `u8` setting).
    Cast {
        setting: CompactString,
        cause: CastError,
    },

    /// The setting's instance is not accessible.
    Instance {
        setting: CompactString,
        cause: InstanceError,
    },

    /// The setting's member does not have a setter.
    ReadOnly { setting: CompactString },
}

impl Display for SettingError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Incompatible {
                setting,
                expected,
                actual,
            } => formatter.write_fmt(format_args!(
                "setting \"{setting}\" of type {expected} cannot accept a value of \
                type {actual}",
            )),

            Self::Cast { setting, cause } => {
                formatter.write_fmt(format_args!("setting \"{setting}\": {cause}"))
            }

            Self::Instance { setting, cause } => {
                formatter.write_fmt(format_args!("setting \"{setting}\": {cause}"))
            }

            Self::ReadOnly { setting } => {
                formatter.write_fmt(format_args!("setting \"{setting}\" is read-only"))
            }
        }
    }
}

impl StdError for SettingError {
    #[inline]
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Cast { cause, .. } => Some(cause),
            Self::Instance { cause, .. } => Some(cause),
            _ => None,
        }
    }
}

/// An error of the value conversion performed by the
/// [cast](crate::runtime::cast) and [convert](crate::runtime::convert)
/// functions.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct CastError {
    /// The kind of the source value.
    pub from: ValueKind,

    /// The requested kind.
    pub to: ValueKind,

    /// The reason of the failure.
    pub cause: CastCause,
}

impl Display for CastError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        let from = self.from;
        let to = self.to;

        match self.cause {
            CastCause::Number(NumberCastCause::Infinite) => formatter.write_fmt(format_args!(
                "cannot cast infinite {from} to {to}",
            )),

            CastCause::Number(NumberCastCause::NAN) => {
                formatter.write_fmt(format_args!("cannot cast NaN {from} to {to}"))
            }

            CastCause::Number(NumberCastCause::Overflow) => formatter.write_fmt(format_args!(
                "{from} value is too large for {to}",
            )),

            CastCause::Number(NumberCastCause::Underflow) => formatter.write_fmt(format_args!(
                "{from} value is too small for {to}",
            )),

            CastCause::Parse => {
                formatter.write_fmt(format_args!("{from} value cannot be parsed as {to}"))
            }

            CastCause::Unsupported => {
                formatter.write_fmt(format_args!("{from} cannot be converted to {to}"))
            }
        }
    }
}

impl StdError for CastError {}

/// A reason of the [CastError].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CastCause {
    /// Numeric conversion failed.
    Number(NumberCastCause),

    /// The source text does not represent a value of the requested kind.
    Parse,

    /// There is no conversion between the two kinds.
    Unsupported,
}

/// A type of the numeric [CastCause].
///
/// This object describes the reason why the source numeric value cannot be
/// converted into the destination numeric value.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum NumberCastCause {
    /// The target type does not support representation of infinite numbers.
    Infinite,

    /// The target type does not support representation of NaN numbers.
    NAN,

    /// The source numeric value is too large for the range of the target type.
    Overflow,

    /// The source numeric value is too small for the range of the target type.
    Underflow,
}

impl From<cast::Error> for NumberCastCause {
    #[inline]
    fn from(error: cast::Error) -> Self {
        match error {
            cast::Error::Infinite => Self::Infinite,
            cast::Error::NaN => Self::NAN,
            cast::Error::Overflow => Self::Overflow,
            cast::Error::Underflow => Self::Underflow,
        }
    }
}

/// An error of the [Instance](crate::runtime::Instance) access.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum InstanceError {
    /// The instance is currently locked by a running operation.
    Busy,

    /// The instance holds an object of a different type than the accessor
    /// expects.
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },
}

impl Display for InstanceError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Busy => formatter.write_str("instance is busy with another operation"),

            Self::TypeMismatch { expected, actual } => formatter.write_fmt(format_args!(
                "instance of type {actual} cannot be accessed as {expected}",
            )),
        }
    }
}

impl StdError for InstanceError {}
