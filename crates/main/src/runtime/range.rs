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

use std::fmt::{Display, Formatter};

use crate::runtime::{cast, compatibility, Value, ValueKind};

/// One of the three bounds of a numeric setting's slider.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum RangeBound {
    Min,
    Max,
    Step,
}

impl Display for RangeBound {
    #[inline]
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Min => formatter.write_str("min"),
            Self::Max => formatter.write_str("max"),
            Self::Step => formatter.write_str("step"),
        }
    }
}

impl RangeBound {
    /// All bounds in the order they are materialized.
    pub const ALL: [Self; 3] = [Self::Min, Self::Max, Self::Step];
}

/// Author-supplied bounds of a numeric setting.
///
/// Every bound is optional. An unspecified bound falls back to the built-in
/// default of the setting's kind. A specified bound may have any kind, as long
/// as it can be reconciled with the setting's kind.
///
/// ```
/// use stagehand::runtime::{RangeBound, RangeBounds, Value};
///
/// let bounds = RangeBounds::new().min(0).max(100);
///
/// assert_eq!(bounds.get(RangeBound::Max), Some(&Value::I32(100)));
/// assert_eq!(bounds.get(RangeBound::Step), None);
/// ```
#[derive(Clone, Default, PartialEq, Debug)]
pub struct RangeBounds {
    pub min: Option<Value>,
    pub max: Option<Value>,
    pub step: Option<Value>,
}

impl RangeBounds {
    #[inline(always)]
    pub const fn new() -> Self {
        Self {
            min: None,
            max: None,
            step: None,
        }
    }

    #[inline(always)]
    pub fn min(mut self, value: impl Into<Value>) -> Self {
        self.min = Some(value.into());
        self
    }

    #[inline(always)]
    pub fn max(mut self, value: impl Into<Value>) -> Self {
        self.max = Some(value.into());
        self
    }

    #[inline(always)]
    pub fn step(mut self, value: impl Into<Value>) -> Self {
        self.step = Some(value.into());
        self
    }

    #[inline(always)]
    pub fn get(&self, bound: RangeBound) -> Option<&Value> {
        match bound {
            RangeBound::Min => self.min.as_ref(),
            RangeBound::Max => self.max.as_ref(),
            RangeBound::Step => self.step.as_ref(),
        }
    }

    /// Returns true if none of the bounds is specified.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none() && self.step.is_none()
    }
}

/// The materialized slider state of a setting.
///
/// All three bounds always have the same kind as the setting's value.
#[derive(Clone, PartialEq, Debug)]
pub struct Slider {
    pub min: Value,
    pub max: Value,
    pub step: Value,

    /// True if the setting can be rendered as a numeric slider. Only the
    /// integer and floating-point kinds are slider-compatible. A [char]
    /// setting has the slider state, but is not compatible.
    pub compatible: bool,
}

impl Slider {
    /// Returns the built-in slider of the `kind`, or None if the kind does not
    /// have a default range.
    ///
    /// | Kinds                | Min         | Max         | Step       |
    /// |----------------------|-------------|-------------|------------|
    /// | signed integers      | `MIN`       | `MAX`       | `1`        |
    /// | unsigned integers    | `0`         | `MAX`       | `1`        |
    /// | `f32`, `f64`         | `-1.0`      | `1.0`       | `0.000001` |
    /// | `char`               | `'\0'`      | `char::MAX` | `'\u{1}'`  |
    pub fn of_kind(kind: ValueKind) -> Option<Self> {
        macro_rules! integer {
            ($variant:ident, $ty:ty) => {
                (
                    Value::$variant(<$ty>::MIN),
                    Value::$variant(<$ty>::MAX),
                    Value::$variant(1),
                )
            };
        }

        let (min, max, step) = match kind {
            ValueKind::I8 => integer!(I8, i8),
            ValueKind::I16 => integer!(I16, i16),
            ValueKind::I32 => integer!(I32, i32),
            ValueKind::I64 => integer!(I64, i64),
            ValueKind::I128 => integer!(I128, i128),
            ValueKind::Isize => integer!(Isize, isize),
            ValueKind::U8 => integer!(U8, u8),
            ValueKind::U16 => integer!(U16, u16),
            ValueKind::U32 => integer!(U32, u32),
            ValueKind::U64 => integer!(U64, u64),
            ValueKind::U128 => integer!(U128, u128),
            ValueKind::Usize => integer!(Usize, usize),
            ValueKind::F32 => (Value::F32(-1.0), Value::F32(1.0), Value::F32(0.000001)),
            ValueKind::F64 => (Value::F64(-1.0), Value::F64(1.0), Value::F64(0.000001)),
            ValueKind::Char => (Value::Char('\0'), Value::Char(char::MAX), Value::Char('\u{1}')),
            _ => return None,
        };

        Some(Self {
            min,
            max,
            step,
            compatible: kind.is_numeric(),
        })
    }

    #[inline(always)]
    pub fn get(&self, bound: RangeBound) -> &Value {
        match bound {
            RangeBound::Min => &self.min,
            RangeBound::Max => &self.max,
            RangeBound::Step => &self.step,
        }
    }

    #[inline(always)]
    fn get_mut(&mut self, bound: RangeBound) -> &mut Value {
        match bound {
            RangeBound::Min => &mut self.min,
            RangeBound::Max => &mut self.max,
            RangeBound::Step => &mut self.step,
        }
    }

    /// Derives the slider state of a setting from its `current` value and
    /// the optional author-supplied `bounds`.
    ///
    /// Returns `Ok(None)` if the value is [Nil](Value::Nil), or if the value's
    /// kind has no default range and no bounds were supplied.
    ///
    /// Each supplied bound is reconciled with the value's kind through the
    /// [compatibility] engine and converted to that kind. A bound that cannot
    /// be reconciled is reported as a [RangeMismatch]. Unspecified bounds keep
    /// the kind's defaults.
    ///
    /// ```
    /// use stagehand::runtime::{RangeBounds, Slider, Value};
    ///
    /// let bounds = RangeBounds::new().min(0).max(10);
    /// let slider = Slider::materialize(&Value::U8(5), Some(&bounds)).unwrap().unwrap();
    ///
    /// assert_eq!(slider.min, Value::U8(0));
    /// assert_eq!(slider.max, Value::U8(10));
    /// assert_eq!(slider.step, Value::U8(1));
    /// ```
    pub fn materialize(
        current: &Value,
        bounds: Option<&RangeBounds>,
    ) -> Result<Option<Self>, RangeMismatch> {
        match current.kind() {
            ValueKind::Nil => Ok(None),
            kind => Self::materialize_kind(kind, bounds),
        }
    }

    /// Like [materialize](Self::materialize), but derives the slider state
    /// from the setting's declared `expected` kind when its current value is
    /// not available.
    pub fn materialize_kind(
        expected: ValueKind,
        bounds: Option<&RangeBounds>,
    ) -> Result<Option<Self>, RangeMismatch> {
        if expected == ValueKind::Nil {
            return Ok(None);
        }

        let Some(mut slider) = Self::of_kind(expected) else {
            let Some(bounds) = bounds else {
                return Ok(None);
            };

            for bound in RangeBound::ALL {
                if let Some(supplied) = bounds.get(bound) {
                    return Err(RangeMismatch {
                        bound,
                        supplied: supplied.kind(),
                        expected,
                    });
                }
            }

            return Ok(None);
        };

        let Some(bounds) = bounds else {
            return Ok(Some(slider));
        };

        for bound in RangeBound::ALL {
            let Some(supplied) = bounds.get(bound) else {
                continue;
            };

            let mismatch = RangeMismatch {
                bound,
                supplied: supplied.kind(),
                expected,
            };

            let level = compatibility(supplied, expected);

            if !level.is_compatible() {
                return Err(mismatch);
            }

            *slider.get_mut(bound) = cast(supplied.clone(), expected, level).map_err(|_| mismatch)?;
        }

        Ok(Some(slider))
    }
}

/// A supplied range bound that cannot be reconciled with the setting's kind.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct RangeMismatch {
    pub bound: RangeBound,
    pub supplied: ValueKind,
    pub expected: ValueKind,
}

#[cfg(test)]
mod tests {
    use crate::runtime::{RangeBound, RangeBounds, RangeMismatch, Slider, Value, ValueKind};

    #[test]
    fn test_default_sliders() {
        let slider = Slider::of_kind(ValueKind::I32).unwrap();
        assert_eq!(slider.min, Value::I32(i32::MIN));
        assert_eq!(slider.max, Value::I32(i32::MAX));
        assert_eq!(slider.step, Value::I32(1));
        assert!(slider.compatible);

        let slider = Slider::of_kind(ValueKind::U16).unwrap();
        assert_eq!(slider.min, Value::U16(0));
        assert_eq!(slider.max, Value::U16(u16::MAX));

        let slider = Slider::of_kind(ValueKind::F32).unwrap();
        assert_eq!(slider.min, Value::F32(-1.0));
        assert_eq!(slider.step, Value::F32(0.000001));

        let slider = Slider::of_kind(ValueKind::Char).unwrap();
        assert_eq!(slider.max, Value::Char(char::MAX));
        assert!(!slider.compatible);

        assert!(Slider::of_kind(ValueKind::Bool).is_none());
        assert!(Slider::of_kind(ValueKind::Str).is_none());
    }

    #[test]
    fn test_bounds_take_setting_kind() {
        let bounds = RangeBounds::new().min(1u8).max("2.5f").step(0.5);

        let slider = Slider::materialize(&Value::F64(1.0), Some(&bounds))
            .unwrap()
            .unwrap();

        assert_eq!(slider.min, Value::F64(1.0));
        assert_eq!(slider.max, Value::F64(2.5));
        assert_eq!(slider.step, Value::F64(0.5));

        for bound in RangeBound::ALL {
            assert_eq!(slider.get(bound).kind(), ValueKind::F64);
        }
    }

    #[test]
    fn test_unspecified_bounds_keep_defaults() {
        let bounds = RangeBounds::new().max(50);

        let slider = Slider::materialize(&Value::I64(7), Some(&bounds))
            .unwrap()
            .unwrap();

        assert_eq!(slider.min, Value::I64(i64::MIN));
        assert_eq!(slider.max, Value::I64(50));
        assert_eq!(slider.step, Value::I64(1));
    }

    #[test]
    fn test_incompatible_bound() {
        let bounds = RangeBounds::new().min(-5);

        assert_eq!(
            Slider::materialize(&Value::U8(0), Some(&bounds)),
            Err(RangeMismatch {
                bound: RangeBound::Min,
                supplied: ValueKind::I32,
                expected: ValueKind::U8,
            }),
        );

        let bounds = RangeBounds::new().step("fast");

        assert_eq!(
            Slider::materialize(&Value::F32(0.0), Some(&bounds)),
            Err(RangeMismatch {
                bound: RangeBound::Step,
                supplied: ValueKind::Str,
                expected: ValueKind::F32,
            }),
        );
    }

    #[test]
    fn test_char_bounds() {
        let bounds = RangeBounds::new().min('A').max('z');

        let slider = Slider::materialize(&Value::U16(70), Some(&bounds))
            .unwrap()
            .unwrap();

        assert_eq!(slider.min, Value::U16(65));
        assert_eq!(slider.max, Value::U16(122));

        let bounds = RangeBounds::new().max('\u{1F600}');

        assert_eq!(
            Slider::materialize(&Value::U16(5), Some(&bounds)),
            Err(RangeMismatch {
                bound: RangeBound::Max,
                supplied: ValueKind::Char,
                expected: ValueKind::U16,
            }),
        );

        let slider = Slider::materialize(&Value::U32(5), Some(&bounds))
            .unwrap()
            .unwrap();

        assert_eq!(slider.max, Value::U32(0x1F600));
    }

    #[test]
    fn test_no_slider() {
        assert_eq!(Slider::materialize(&Value::Nil, None), Ok(None));
        assert_eq!(Slider::materialize(&Value::from("text"), None), Ok(None));
        assert_eq!(Slider::materialize(&Value::Bool(true), None), Ok(None));

        let bounds = RangeBounds::new().max(1);

        assert_eq!(
            Slider::materialize(&Value::Bool(true), Some(&bounds)),
            Err(RangeMismatch {
                bound: RangeBound::Max,
                supplied: ValueKind::I32,
                expected: ValueKind::Bool,
            }),
        );
    }
}
