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

use std::fmt::{Debug, Display, Formatter};

use crate::runtime::InvokeError;

/// A primitive kind of the [Value].
///
/// Every data member that can be exposed as a script setting has one of these
/// kinds. The [compatibility](crate::runtime::compatibility) engine reasons
/// about conversions between kinds, and the
/// [range materializer](crate::runtime::Slider) derives slider bounds for
/// the numeric ones.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum ValueKind {
    /// An absent value.
    Nil,
    /// The [bool] type.
    Bool,
    /// The [char] type.
    Char,
    /// The [i8] type.
    I8,
    /// The [i16] type.
    I16,
    /// The [i32] type.
    I32,
    /// The [i64] type.
    I64,
    /// The [i128] type.
    I128,
    /// The [isize] type.
    Isize,
    /// The [u8] type.
    U8,
    /// The [u16] type.
    U16,
    /// The [u32] type.
    U32,
    /// The [u64] type.
    U64,
    /// The [u128] type.
    U128,
    /// The [usize] type.
    Usize,
    /// The [f32] type.
    F32,
    /// The [f64] type.
    F64,
    /// The [String] type.
    Str,
    /// A sequence of strings (`Vec<String>`), the conventional shape of the
    /// program arguments.
    Strings,
}

impl Display for ValueKind {
    #[inline(always)]
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.name())
    }
}

impl ValueKind {
    /// Returns the Rust name of the type this kind stands for.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Bool => "bool",
            Self::Char => "char",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::I128 => "i128",
            Self::Isize => "isize",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::U128 => "u128",
            Self::Usize => "usize",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Str => "String",
            Self::Strings => "Vec<String>",
        }
    }

    /// Returns true for the signed integer kinds.
    #[inline(always)]
    pub const fn is_signed(self) -> bool {
        matches!(
            self,
            Self::I8 | Self::I16 | Self::I32 | Self::I64 | Self::I128 | Self::Isize
        )
    }

    /// Returns true for the unsigned integer kinds.
    #[inline(always)]
    pub const fn is_unsigned(self) -> bool {
        matches!(
            self,
            Self::U8 | Self::U16 | Self::U32 | Self::U64 | Self::U128 | Self::Usize
        )
    }

    /// Returns true for the integer kinds.
    #[inline(always)]
    pub const fn is_integer(self) -> bool {
        self.is_signed() || self.is_unsigned()
    }

    /// Returns true for the floating-point kinds.
    #[inline(always)]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    /// Returns true for the integer and floating-point kinds.
    ///
    /// These are the kinds that can be rendered as slider controls.
    #[inline(always)]
    pub const fn is_numeric(self) -> bool {
        self.is_integer() || self.is_float()
    }

    /// Returns true for the kinds that have a built-in default range:
    /// numeric kinds and [char].
    #[inline(always)]
    pub const fn is_ranged(self) -> bool {
        self.is_numeric() || matches!(self, Self::Char)
    }
}

/// A dynamically typed value of a script setting, an operation argument, or
/// an operation result.
#[derive(Clone, PartialEq)]
pub enum Value {
    Nil,
    Bool(bool),
    Char(char),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    I128(i128),
    Isize(isize),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    U128(u128),
    Usize(usize),
    F32(f32),
    F64(f64),
    Str(String),
    Strings(Vec<String>),
}

impl Default for Value {
    #[inline(always)]
    fn default() -> Self {
        Self::Nil
    }
}

impl Debug for Value {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nil => formatter.write_str("nil"),
            Self::Str(value) => Debug::fmt(value, formatter),
            Self::Char(value) => Debug::fmt(value, formatter),
            Self::Strings(value) => Debug::fmt(value, formatter),
            other => formatter.write_fmt(format_args!("{other}{}", other.kind())),
        }
    }
}

/// Prints the textual form of the value.
///
/// This form is what the Parsable compatibility level parses back.
impl Display for Value {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nil => formatter.write_str(""),
            Self::Bool(value) => Display::fmt(value, formatter),
            Self::Char(value) => Display::fmt(value, formatter),
            Self::I8(value) => Display::fmt(value, formatter),
            Self::I16(value) => Display::fmt(value, formatter),
            Self::I32(value) => Display::fmt(value, formatter),
            Self::I64(value) => Display::fmt(value, formatter),
            Self::I128(value) => Display::fmt(value, formatter),
            Self::Isize(value) => Display::fmt(value, formatter),
            Self::U8(value) => Display::fmt(value, formatter),
            Self::U16(value) => Display::fmt(value, formatter),
            Self::U32(value) => Display::fmt(value, formatter),
            Self::U64(value) => Display::fmt(value, formatter),
            Self::U128(value) => Display::fmt(value, formatter),
            Self::Usize(value) => Display::fmt(value, formatter),
            Self::F32(value) => Display::fmt(value, formatter),
            Self::F64(value) => Display::fmt(value, formatter),
            Self::Str(value) => formatter.write_str(value),
            Self::Strings(value) => formatter.write_fmt(format_args!("[{}]", value.join(", "))),
        }
    }
}

impl Value {
    /// Returns the primitive kind of this value.
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Nil => ValueKind::Nil,
            Self::Bool(..) => ValueKind::Bool,
            Self::Char(..) => ValueKind::Char,
            Self::I8(..) => ValueKind::I8,
            Self::I16(..) => ValueKind::I16,
            Self::I32(..) => ValueKind::I32,
            Self::I64(..) => ValueKind::I64,
            Self::I128(..) => ValueKind::I128,
            Self::Isize(..) => ValueKind::Isize,
            Self::U8(..) => ValueKind::U8,
            Self::U16(..) => ValueKind::U16,
            Self::U32(..) => ValueKind::U32,
            Self::U64(..) => ValueKind::U64,
            Self::U128(..) => ValueKind::U128,
            Self::Usize(..) => ValueKind::Usize,
            Self::F32(..) => ValueKind::F32,
            Self::F64(..) => ValueKind::F64,
            Self::Str(..) => ValueKind::Str,
            Self::Strings(..) => ValueKind::Strings,
        }
    }

    #[inline(always)]
    pub const fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    /// Converts this value into the Rust type `T` if the value's kind is
    /// exactly `T`'s kind.
    ///
    /// No numeric conversion happens here. To reconcile different kinds, use
    /// [cast](crate::runtime::cast) first.
    #[inline(always)]
    pub fn get<T: ScriptValue>(self) -> Option<T> {
        T::from_value(self)
    }
}

/// A Rust type that can be represented as a [Value].
///
/// The trait is implemented for all primitive numeric types, [bool], [char],
/// [String], `Vec<String>`, and for `Option<T>` of any of them. Data members
/// exposed as script settings must have one of these types.
pub trait ScriptValue: Sized + Send + Sync + 'static {
    /// The kind of values this type produces.
    const KIND: ValueKind;

    /// Whether the type can hold [Value::Nil] in addition to the values of
    /// [KIND](Self::KIND).
    const NULLABLE: bool = false;

    /// Converts the Rust value into a dynamic value.
    fn into_value(self) -> Value;

    /// Converts a dynamic value of exactly [KIND](Self::KIND) back into the
    /// Rust value. Returns None if the kinds differ.
    fn from_value(value: Value) -> Option<Self>;
}

macro_rules! impl_script_value {
    ($($ty:ty => $variant:ident;)*) => {
        $(
            impl ScriptValue for $ty {
                const KIND: ValueKind = ValueKind::$variant;

                #[inline(always)]
                fn into_value(self) -> Value {
                    Value::$variant(self)
                }

                #[inline(always)]
                fn from_value(value: Value) -> Option<Self> {
                    match value {
                        Value::$variant(value) => Some(value),
                        _ => None,
                    }
                }
            }

            impl From<$ty> for Value {
                #[inline(always)]
                fn from(value: $ty) -> Self {
                    Value::$variant(value)
                }
            }

            impl IntoOutput for $ty {
                #[inline(always)]
                fn into_output(self) -> Result<Value, InvokeError> {
                    Ok(Value::$variant(self))
                }
            }
        )*
    };
}

impl_script_value! {
    bool => Bool;
    char => Char;
    i8 => I8;
    i16 => I16;
    i32 => I32;
    i64 => I64;
    i128 => I128;
    isize => Isize;
    u8 => U8;
    u16 => U16;
    u32 => U32;
    u64 => U64;
    u128 => U128;
    usize => Usize;
    f32 => F32;
    f64 => F64;
    String => Str;
    Vec<String> => Strings;
}

impl<T: ScriptValue> ScriptValue for Option<T> {
    const KIND: ValueKind = T::KIND;

    const NULLABLE: bool = true;

    #[inline]
    fn into_value(self) -> Value {
        match self {
            Some(value) => value.into_value(),
            None => Value::Nil,
        }
    }

    #[inline]
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Nil => Some(None),
            other => Some(Some(T::from_value(other)?)),
        }
    }
}

impl<'a> From<&'a str> for Value {
    #[inline(always)]
    fn from(value: &'a str) -> Self {
        Value::Str(String::from(value))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    #[inline]
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => value.into(),
            None => Value::Nil,
        }
    }
}

/// A Rust type that a script operation may return.
///
/// Implemented for `()`, every [ScriptValue] type, and for `Result<T, E>`
/// where `T` is itself an output type and `E` implements [Display]. An [Err]
/// result turns into [InvokeError::Failed].
pub trait IntoOutput {
    fn into_output(self) -> Result<Value, InvokeError>;
}

impl IntoOutput for () {
    #[inline(always)]
    fn into_output(self) -> Result<Value, InvokeError> {
        Ok(Value::Nil)
    }
}

impl<T: ScriptValue> IntoOutput for Option<T> {
    #[inline(always)]
    fn into_output(self) -> Result<Value, InvokeError> {
        Ok(self.into_value())
    }
}

impl<T: IntoOutput, E: Display> IntoOutput for Result<T, E> {
    #[inline]
    fn into_output(self) -> Result<Value, InvokeError> {
        match self {
            Ok(value) => value.into_output(),
            Err(error) => Err(InvokeError::Failed {
                operation: None,
                message: error.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::runtime::{ScriptValue, Value, ValueKind};

    #[test]
    fn test_optional_values() {
        assert_eq!(<Option<u16>>::KIND, ValueKind::U16);
        assert!(<Option<u16>>::NULLABLE);
        assert!(!<u16>::NULLABLE);

        assert_eq!(Some(5u16).into_value(), Value::U16(5));
        assert_eq!(None::<u16>.into_value(), Value::Nil);
        assert_eq!(<Option<u16>>::from_value(Value::Nil), Some(None));
        assert_eq!(<Option<u16>>::from_value(Value::U16(3)), Some(Some(3)));
        assert_eq!(<Option<u16>>::from_value(Value::U8(3)), None);
    }

    #[test]
    fn test_textual_form() {
        assert_eq!(Value::F32(1.5).to_string(), "1.5");
        assert_eq!(Value::Char('x').to_string(), "x");
        assert_eq!(Value::Str(String::from("foo")).to_string(), "foo");
        assert_eq!(format!("{:?}", Value::U8(7)), "7u8");
        assert_eq!(Value::from("bar").kind(), ValueKind::Str);
    }
}
