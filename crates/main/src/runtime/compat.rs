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

use crate::runtime::{CastCause, CastError, NumberCastCause, Value, ValueKind};

/// A level of compatibility between a runtime [Value] and a desired
/// [ValueKind].
///
/// The levels are ordered from the weakest to the strongest:
/// `None < Parsable < Explicit < Implicit < SameType`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Compatibility {
    /// The value cannot be turned into the desired kind.
    None,

    /// The textual form of the value, with the numeric suffixes stripped,
    /// converts into the desired kind (e.g., `"1.5f"` into [f32]).
    Parsable,

    /// The value converts into the desired kind without an error, but the
    /// conversion is not a widening (e.g., `300i32` into [u16], or
    /// `"12"` into [i32]).
    Explicit,

    /// Every value of the value's kind converts into the desired kind without
    /// an error by the standard widening rules (e.g., [i16] into [f64]).
    /// Large integers may lose precision in floats.
    Implicit,

    /// The value already has the desired kind.
    SameType,
}

impl Compatibility {
    /// Returns true if the level is anything but [None](Self::None).
    #[inline(always)]
    pub const fn is_compatible(self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Computes how the `value` can be turned into the `desired` kind.
///
/// The levels are tried from the strongest to the weakest, and the first
/// satisfied level is returned.
///
/// ```
/// use stagehand::runtime::{compatibility, Compatibility, Value, ValueKind};
///
/// assert_eq!(compatibility(&Value::I8(5), ValueKind::F64), Compatibility::Implicit);
/// assert_eq!(compatibility(&Value::I32(300), ValueKind::U16), Compatibility::Explicit);
/// assert_eq!(compatibility(&Value::I32(300), ValueKind::U8), Compatibility::None);
/// assert_eq!(compatibility(&Value::from("1.5f"), ValueKind::F32), Compatibility::Parsable);
/// ```
pub fn compatibility(value: &Value, desired: ValueKind) -> Compatibility {
    let kind = value.kind();

    if kind == desired {
        return Compatibility::SameType;
    }

    if kind == ValueKind::Nil {
        return Compatibility::None;
    }

    if is_implicit(kind, desired) {
        return Compatibility::Implicit;
    }

    if convert(value, desired).is_ok() {
        return Compatibility::Explicit;
    }

    if parse_stripped(value, desired).is_ok() {
        return Compatibility::Parsable;
    }

    Compatibility::None
}

/// Performs the conversion implied by a previously computed `compatibility`
/// level.
///
/// SameType returns the value unchanged. Implicit returns the same number
/// represented in the desired kind. Explicit converts the value directly.
/// Parsable converts the stripped textual form of the value.
///
/// When the level was computed by [compatibility] for the same value and kind,
/// this function does not fail.
pub fn cast(value: Value, desired: ValueKind, compatibility: Compatibility) -> Result<Value, CastError> {
    match compatibility {
        Compatibility::SameType => Ok(value),

        Compatibility::Implicit | Compatibility::Explicit => convert(&value, desired),

        Compatibility::Parsable => parse_stripped(&value, desired),

        Compatibility::None => Err(CastError {
            from: value.kind(),
            to: desired,
            cause: CastCause::Unsupported,
        }),
    }
}

/// Returns true if every value of the `from` kind converts into the `to` kind
/// without an error.
///
/// The table follows the standard numeric widening rules: narrower integers
/// widen into wider integers of the compatible signedness and into floats,
/// unsigned integers also widen into strictly wider signed integers, and
/// [f32] widens into [f64]. Integers wider than the float's mantissa may lose
/// precision. A [char] widens into the integers that hold any code point up
/// to `U+10FFFF`, but not into floats. Pointer-sized integers are treated as
/// at most 64 bits wide, and 128-bit integers never widen into floats.
pub fn is_implicit(from: ValueKind, to: ValueKind) -> bool {
    use ValueKind::*;

    match from {
        I8 => matches!(to, I16 | I32 | I64 | I128 | Isize | F32 | F64),

        I16 => matches!(to, I32 | I64 | I128 | Isize | F32 | F64),

        I32 => matches!(to, I64 | I128 | Isize | F32 | F64),

        I64 => matches!(to, I128 | F32 | F64),

        Isize => matches!(to, I64 | I128 | F32 | F64),

        U8 => matches!(
            to,
            I16 | I32 | I64 | I128 | Isize | U16 | U32 | U64 | U128 | Usize | F32 | F64
        ),

        U16 => matches!(
            to,
            I32 | I64 | I128 | Isize | U32 | U64 | U128 | Usize | F32 | F64
        ),

        Char => matches!(to, I32 | I64 | I128 | Isize | U32 | U64 | U128 | Usize),

        U32 => matches!(to, I64 | I128 | U64 | U128 | Usize | F32 | F64),

        U64 => matches!(to, I128 | U128 | F32 | F64),

        Usize => matches!(to, I128 | U64 | U128 | F32 | F64),

        F32 => matches!(to, F64),

        _ => false,
    }
}

/// Converts the `value` into the `desired` kind directly.
///
/// Numbers convert with range checks, floats round half to even before
/// turning into integers, [bool] converts to and from numbers as `1` and `0`,
/// [char] converts to and from integers by its code point, every
/// non-sequence value converts into a string by its textual form, and strings
/// convert into primitives by parsing their trimmed content.
pub fn convert(value: &Value, desired: ValueKind) -> Result<Value, CastError> {
    let from = value.kind();

    if from == desired {
        return Ok(value.clone());
    }

    let unsupported = CastError {
        from,
        to: desired,
        cause: CastCause::Unsupported,
    };

    let number = |cause: NumberCastCause| CastError {
        from,
        to: desired,
        cause: CastCause::Number(cause),
    };

    match (value, desired) {
        (Value::Nil | Value::Strings(..), _) => Err(unsupported),

        (_, ValueKind::Nil | ValueKind::Strings) => Err(unsupported),

        (_, ValueKind::Str) => Ok(Value::Str(value.to_string())),

        (Value::Str(text), _) => parse(text, desired).ok_or(CastError {
            from,
            to: desired,
            cause: CastCause::Parse,
        }),

        (Value::Bool(flag), _) if desired.is_numeric() => {
            narrow(Wide::Signed(*flag as i128), desired).map_err(number)
        }

        (Value::Bool(..), _) => Err(unsupported),

        (_, ValueKind::Bool) => match Wide::of(value) {
            Some(Wide::Signed(number)) => Ok(Value::Bool(number != 0)),
            Some(Wide::Unsigned(number)) => Ok(Value::Bool(number != 0)),
            Some(Wide::Float(number)) => Ok(Value::Bool(number != 0.0)),
            None => Err(unsupported),
        },

        (Value::Char(..), _) if desired.is_float() => Err(unsupported),

        (_, ValueKind::Char) => match Wide::of(value) {
            Some(Wide::Float(..)) | None => Err(unsupported),

            Some(wide) => {
                let Value::U32(code) = narrow(wide, ValueKind::U32).map_err(number)? else {
                    return Err(unsupported);
                };

                match char::from_u32(code) {
                    Some(ch) => Ok(Value::Char(ch)),
                    None => Err(number(NumberCastCause::Overflow)),
                }
            }
        },

        _ => match Wide::of(value) {
            Some(wide) => narrow(wide, desired).map_err(number),
            None => Err(unsupported),
        },
    }
}

/// Removes trailing numeric literal suffixes from the text.
///
/// A Rust primitive suffix (`10u8`, `2.5_f32`) is removed once, and the
/// single-letter suffixes `f`, `d`, `m`, `u`, `l` (in any case, `10ul`) are
/// removed repeatedly.
///
/// ```
/// use stagehand::runtime::strip_numeric_suffix;
///
/// assert_eq!(strip_numeric_suffix("1.5f"), "1.5");
/// assert_eq!(strip_numeric_suffix("10UL"), "10");
/// assert_eq!(strip_numeric_suffix("255_u8"), "255");
/// assert_eq!(strip_numeric_suffix("12"), "12");
/// ```
pub fn strip_numeric_suffix(text: &str) -> &str {
    static RUST_SUFFIXES: [&str; 14] = [
        "i128", "u128", "isize", "usize", "i16", "i32", "i64", "u16", "u32", "u64", "f32", "f64",
        "i8", "u8",
    ];

    let text = text.trim();

    for suffix in RUST_SUFFIXES {
        let Some(stripped) = text.strip_suffix(suffix) else {
            continue;
        };

        let stripped = stripped.trim_end_matches('_');

        if stripped.ends_with(|ch: char| ch.is_ascii_digit() || ch == '.') {
            return stripped;
        }
    }

    text.trim_end_matches(['f', 'F', 'd', 'D', 'm', 'M', 'u', 'U', 'l', 'L'])
}

#[inline]
fn parse_stripped(value: &Value, desired: ValueKind) -> Result<Value, CastError> {
    let from = value.kind();

    if let Value::Nil | Value::Strings(..) = value {
        return Err(CastError {
            from,
            to: desired,
            cause: CastCause::Unsupported,
        });
    }

    let text = value.to_string();
    let stripped = Value::Str(String::from(strip_numeric_suffix(&text)));

    convert(&stripped, desired).map_err(|error| CastError { from, ..error })
}

fn parse(text: &str, desired: ValueKind) -> Option<Value> {
    if let ValueKind::Char = desired {
        let mut chars = text.chars();
        let ch = chars.next()?;

        return match chars.next() {
            None => Some(Value::Char(ch)),
            Some(_) => None,
        };
    }

    let text = text.trim();

    Some(match desired {
        ValueKind::Bool => match text {
            _ if text.eq_ignore_ascii_case("true") => Value::Bool(true),
            _ if text.eq_ignore_ascii_case("false") => Value::Bool(false),
            _ => return None,
        },

        ValueKind::I8 => Value::I8(text.parse().ok()?),
        ValueKind::I16 => Value::I16(text.parse().ok()?),
        ValueKind::I32 => Value::I32(text.parse().ok()?),
        ValueKind::I64 => Value::I64(text.parse().ok()?),
        ValueKind::I128 => Value::I128(text.parse().ok()?),
        ValueKind::Isize => Value::Isize(text.parse().ok()?),
        ValueKind::U8 => Value::U8(text.parse().ok()?),
        ValueKind::U16 => Value::U16(text.parse().ok()?),
        ValueKind::U32 => Value::U32(text.parse().ok()?),
        ValueKind::U64 => Value::U64(text.parse().ok()?),
        ValueKind::U128 => Value::U128(text.parse().ok()?),
        ValueKind::Usize => Value::Usize(text.parse().ok()?),
        ValueKind::F32 => Value::F32(text.parse().ok()?),
        ValueKind::F64 => Value::F64(text.parse().ok()?),

        _ => return None,
    })
}

// A lossless intermediate representation of any numeric value.
#[derive(Clone, Copy)]
enum Wide {
    Signed(i128),
    Unsigned(u128),
    Float(f64),
}

impl Wide {
    fn of(value: &Value) -> Option<Self> {
        Some(match value {
            Value::I8(number) => Self::Signed(cast::i128(*number)),
            Value::I16(number) => Self::Signed(cast::i128(*number)),
            Value::I32(number) => Self::Signed(cast::i128(*number)),
            Value::I64(number) => Self::Signed(cast::i128(*number)),
            Value::I128(number) => Self::Signed(*number),
            Value::Isize(number) => Self::Signed(cast::i128(*number)),
            Value::U8(number) => Self::Unsigned(cast::u128(*number)),
            Value::U16(number) => Self::Unsigned(cast::u128(*number)),
            Value::U32(number) => Self::Unsigned(cast::u128(*number)),
            Value::U64(number) => Self::Unsigned(cast::u128(*number)),
            Value::U128(number) => Self::Unsigned(*number),
            Value::Usize(number) => Self::Unsigned(cast::u128(*number)),
            Value::F32(number) => Self::Float(cast::f64(*number)),
            Value::F64(number) => Self::Float(*number),
            Value::Char(ch) => Self::Unsigned(cast::u128(*ch as u32)),
            _ => return None,
        })
    }
}

fn narrow(wide: Wide, desired: ValueKind) -> Result<Value, NumberCastCause> {
    macro_rules! checked {
        ($variant:ident, $f:ident) => {
            Value::$variant(match wide {
                Wide::Signed(number) => cast::$f(number)?,
                Wide::Unsigned(number) => cast::$f(number)?,
                Wide::Float(number) => cast::$f(number.round_ties_even())?,
            })
        };
    }

    Ok(match desired {
        ValueKind::I8 => checked!(I8, i8),
        ValueKind::I16 => checked!(I16, i16),
        ValueKind::I32 => checked!(I32, i32),
        ValueKind::I64 => checked!(I64, i64),
        ValueKind::Isize => checked!(Isize, isize),
        ValueKind::U8 => checked!(U8, u8),
        ValueKind::U16 => checked!(U16, u16),
        ValueKind::U32 => checked!(U32, u32),
        ValueKind::U64 => checked!(U64, u64),
        ValueKind::Usize => checked!(Usize, usize),

        ValueKind::I128 => Value::I128(match wide {
            Wide::Signed(number) => number,
            Wide::Unsigned(number) => cast::i128(number)?,
            Wide::Float(number) => cast::i128(number.round_ties_even())?,
        }),

        ValueKind::U128 => Value::U128(match wide {
            Wide::Signed(number) => cast::u128(number)?,
            Wide::Unsigned(number) => number,
            Wide::Float(number) => cast::u128(number.round_ties_even())?,
        }),

        ValueKind::F32 => Value::F32(match wide {
            Wide::Signed(number) => cast::f32(number),
            Wide::Unsigned(number) => cast::f32(number)?,
            Wide::Float(number) => cast::f32(number)?,
        }),

        ValueKind::F64 => Value::F64(match wide {
            Wide::Signed(number) => cast::f64(number),
            Wide::Unsigned(number) => cast::f64(number),
            Wide::Float(number) => number,
        }),

        _ => return Err(NumberCastCause::Overflow),
    })
}

#[cfg(test)]
mod tests {
    use crate::runtime::{
        cast,
        compatibility,
        convert,
        is_implicit,
        CastCause,
        Compatibility,
        NumberCastCause,
        Value,
        ValueKind,
    };

    #[test]
    fn test_compatibility_levels() {
        assert_eq!(compatibility(&Value::I32(5), ValueKind::I32), Compatibility::SameType);
        assert_eq!(compatibility(&Value::I32(5), ValueKind::I64), Compatibility::Implicit);
        assert_eq!(compatibility(&Value::I32(5), ValueKind::F32), Compatibility::Implicit);
        assert_eq!(compatibility(&Value::I32(5), ValueKind::U8), Compatibility::Explicit);
        assert_eq!(compatibility(&Value::I32(-5), ValueKind::U8), Compatibility::None);
        assert_eq!(compatibility(&Value::F64(2.5), ValueKind::I32), Compatibility::Explicit);
        assert_eq!(compatibility(&Value::from("42"), ValueKind::U8), Compatibility::Explicit);
        assert_eq!(compatibility(&Value::from("42u8"), ValueKind::U8), Compatibility::Parsable);
        assert_eq!(compatibility(&Value::from("0.5d"), ValueKind::F64), Compatibility::Parsable);
        assert_eq!(compatibility(&Value::from("abc"), ValueKind::I32), Compatibility::None);
        assert_eq!(compatibility(&Value::Nil, ValueKind::I32), Compatibility::None);
        assert_eq!(compatibility(&Value::I32(1), ValueKind::Str), Compatibility::Explicit);

        assert!(Compatibility::SameType > Compatibility::Implicit);
        assert!(Compatibility::Implicit > Compatibility::Explicit);
        assert!(Compatibility::Explicit > Compatibility::Parsable);
        assert!(Compatibility::Parsable > Compatibility::None);
    }

    #[test]
    fn test_boolean_is_isolated() {
        for kind in [ValueKind::I8, ValueKind::U64, ValueKind::F64, ValueKind::Char] {
            assert!(!is_implicit(ValueKind::Bool, kind));
            assert!(!is_implicit(kind, ValueKind::Bool));
        }

        assert_eq!(compatibility(&Value::Bool(true), ValueKind::Bool), Compatibility::SameType);
        assert_eq!(compatibility(&Value::Bool(true), ValueKind::Char), Compatibility::None);
    }

    #[test]
    fn test_widening_table() {
        assert!(is_implicit(ValueKind::I8, ValueKind::I16));
        assert!(is_implicit(ValueKind::I8, ValueKind::F32));
        assert!(!is_implicit(ValueKind::I8, ValueKind::U16));
        assert!(is_implicit(ValueKind::U8, ValueKind::I16));
        assert!(is_implicit(ValueKind::U32, ValueKind::I64));
        assert!(!is_implicit(ValueKind::U32, ValueKind::I32));
        assert!(!is_implicit(ValueKind::Char, ValueKind::U16));
        assert!(!is_implicit(ValueKind::Char, ValueKind::F32));
        assert!(is_implicit(ValueKind::Char, ValueKind::I32));
        assert!(!is_implicit(ValueKind::Char, ValueKind::I16));
        assert!(!is_implicit(ValueKind::Char, ValueKind::Char));
        assert!(!is_implicit(ValueKind::U16, ValueKind::Char));
        assert!(!is_implicit(ValueKind::U16, ValueKind::U16));
        assert!(is_implicit(ValueKind::F32, ValueKind::F64));
        assert!(!is_implicit(ValueKind::F64, ValueKind::F32));
        assert!(!is_implicit(ValueKind::I128, ValueKind::F64));
        assert!(!is_implicit(ValueKind::I64, ValueKind::Isize));
    }

    #[test]
    fn test_implicit_casts_never_fail() {
        let extremes = [
            Value::I8(i8::MIN),
            Value::I8(i8::MAX),
            Value::I16(i16::MIN),
            Value::I16(i16::MAX),
            Value::I32(i32::MIN),
            Value::I32(i32::MAX),
            Value::I64(i64::MIN),
            Value::I64(i64::MAX),
            Value::I128(i128::MIN),
            Value::I128(i128::MAX),
            Value::Isize(isize::MIN),
            Value::Isize(isize::MAX),
            Value::U8(u8::MAX),
            Value::U16(u16::MAX),
            Value::U32(u32::MAX),
            Value::U64(u64::MAX),
            Value::U128(u128::MAX),
            Value::Usize(usize::MAX),
            Value::F32(f32::MIN),
            Value::F32(f32::MAX),
            Value::Char(char::MAX),
            Value::Char('\u{1F600}'),
        ];

        let kinds = [
            ValueKind::I8,
            ValueKind::I16,
            ValueKind::I32,
            ValueKind::I64,
            ValueKind::I128,
            ValueKind::Isize,
            ValueKind::U8,
            ValueKind::U16,
            ValueKind::U32,
            ValueKind::U64,
            ValueKind::U128,
            ValueKind::Usize,
            ValueKind::F32,
            ValueKind::F64,
            ValueKind::Char,
        ];

        for value in &extremes {
            for kind in kinds {
                let level = compatibility(value, kind);

                assert!(
                    cast(value.clone(), kind, level).is_ok() || !level.is_compatible(),
                    "{value:?} into {kind} at {level:?}",
                );
            }
        }

        let emoji = Value::Char('\u{1F600}');

        assert_eq!(compatibility(&emoji, ValueKind::U16), Compatibility::None);
        assert_eq!(compatibility(&Value::Char('A'), ValueKind::U16), Compatibility::Explicit);
        assert_eq!(
            cast(emoji, ValueKind::U32, Compatibility::Implicit),
            Ok(Value::U32(0x1F600)),
        );

        assert!(cast(Value::I64(i64::MAX), ValueKind::F32, Compatibility::Implicit).is_ok());
        assert!(cast(Value::U64(u64::MAX), ValueKind::F64, Compatibility::Implicit).is_ok());
    }

    #[test]
    fn test_implicit_cast_changes_representation() {
        let widened = cast(Value::I16(-7), ValueKind::F64, Compatibility::Implicit).unwrap();
        assert_eq!(widened, Value::F64(-7.0));

        let widened = cast(Value::Char('A'), ValueKind::U32, Compatibility::Implicit).unwrap();
        assert_eq!(widened, Value::U32(65));
    }

    #[test]
    fn test_explicit_conversions() {
        assert_eq!(convert(&Value::F64(2.5), ValueKind::I32), Ok(Value::I32(2)));
        assert_eq!(convert(&Value::F64(3.5), ValueKind::I32), Ok(Value::I32(4)));
        assert_eq!(convert(&Value::Bool(true), ValueKind::U8), Ok(Value::U8(1)));
        assert_eq!(convert(&Value::I32(0), ValueKind::Bool), Ok(Value::Bool(false)));
        assert_eq!(convert(&Value::U32(97), ValueKind::Char), Ok(Value::Char('a')));
        assert_eq!(convert(&Value::from(" 17 "), ValueKind::I64), Ok(Value::I64(17)));
        assert_eq!(convert(&Value::from("TRUE"), ValueKind::Bool), Ok(Value::Bool(true)));
        assert_eq!(convert(&Value::from("x"), ValueKind::Char), Ok(Value::Char('x')));
        assert_eq!(convert(&Value::F32(0.25), ValueKind::Str), Ok(Value::from("0.25")));

        let error = convert(&Value::I32(300), ValueKind::U8).unwrap_err();
        assert_eq!(error.cause, CastCause::Number(NumberCastCause::Overflow));

        let error = convert(&Value::I32(-1), ValueKind::U8).unwrap_err();
        assert_eq!(error.cause, CastCause::Number(NumberCastCause::Underflow));

        let error = convert(&Value::F64(f64::NAN), ValueKind::I32).unwrap_err();
        assert_eq!(error.cause, CastCause::Number(NumberCastCause::NAN));

        let error = convert(&Value::F64(f64::INFINITY), ValueKind::U64).unwrap_err();
        assert_eq!(error.cause, CastCause::Number(NumberCastCause::Infinite));

        let error = convert(&Value::F32(1.0), ValueKind::Char).unwrap_err();
        assert_eq!(error.cause, CastCause::Unsupported);

        let error = convert(&Value::from("12a"), ValueKind::I32).unwrap_err();
        assert_eq!(error.cause, CastCause::Parse);
    }

    #[test]
    fn test_parsable_cast() {
        let value = Value::from("1.5f");

        let level = compatibility(&value, ValueKind::F32);
        assert_eq!(level, Compatibility::Parsable);
        assert_eq!(cast(value, ValueKind::F32, level), Ok(Value::F32(1.5)));

        let value = Value::from("10_u16");
        let level = compatibility(&value, ValueKind::U64);
        assert_eq!(level, Compatibility::Parsable);
        assert_eq!(cast(value, ValueKind::U64, level), Ok(Value::U64(10)));
    }

    #[test]
    fn test_no_cast_for_incompatible() {
        let error = cast(Value::Nil, ValueKind::I32, Compatibility::None).unwrap_err();
        assert_eq!(error.from, ValueKind::Nil);
        assert_eq!(error.cause, CastCause::Unsupported);

        assert_eq!(
            compatibility(&Value::Strings(vec![]), ValueKind::Str),
            Compatibility::None
        );
    }
}
