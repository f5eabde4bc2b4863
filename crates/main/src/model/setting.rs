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

use compact_str::CompactString;
use lady_deirdre::arena::Id;

use crate::{
    model::ScriptId,
    runtime::{
        cast,
        compatibility,
        GetFn,
        Instance,
        InstanceError,
        MemberReceiver,
        SetFn,
        SettingError,
        Slider,
        Value,
        ValueKind,
    },
};

/// A bound, adjustable wrapper around one discovered data member.
///
/// The setting reads and writes the member of the live instance directly,
/// without caching. Both operations lock the instance without blocking: if
/// an operation of the script currently holds the instance,
/// [get](Self::get) and [set](Self::set) return an [InstanceError::Busy]
/// error.
#[derive(Clone, Debug)]
pub struct ScriptSetting {
    id: Id,
    name: CompactString,
    description: Option<CompactString>,
    group: Option<CompactString>,
    ty: &'static str,
    member: &'static str,
    kind: ValueKind,
    nullable: bool,
    receiver: MemberReceiver,
    instance: Option<Instance>,
    get: GetFn,
    set: Option<SetFn>,
    slider: Option<Slider>,
    parent: ScriptId,
}

impl ScriptSetting {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        ty: &'static str,
        member: &'static str,
        kind: ValueKind,
        nullable: bool,
        receiver: MemberReceiver,
        instance: Option<Instance>,
        get: GetFn,
        set: Option<SetFn>,
    ) -> Self {
        Self {
            id: Id::new(),
            name: CompactString::from(member),
            description: None,
            group: None,
            ty,
            member,
            kind,
            nullable,
            receiver,
            instance,
            get,
            set,
            slider: None,
            parent: ScriptId::nil(),
        }
    }

    #[inline(always)]
    pub(crate) fn with_name(mut self, name: &str) -> Self {
        self.name = CompactString::from(name);
        self
    }

    #[inline(always)]
    pub(crate) fn with_description(mut self, description: Option<&str>) -> Self {
        self.description = description.map(CompactString::from);
        self
    }

    #[inline(always)]
    pub(crate) fn with_group(mut self, group: Option<&str>) -> Self {
        self.group = group.map(CompactString::from);
        self
    }

    #[inline(always)]
    pub(crate) fn set_slider(&mut self, slider: Option<Slider>) {
        self.slider = slider;
    }

    #[inline(always)]
    pub(crate) fn set_parent(&mut self, parent: ScriptId) {
        self.parent = parent;
    }

    #[inline(always)]
    pub fn id(&self) -> Id {
        self.id
    }

    /// The display name: the explicit `name` annotation or the member's
    /// identifier.
    #[inline(always)]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline(always)]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The explicit group of the setting. None for the settings in the
    /// default group.
    #[inline(always)]
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// The Rust identifier of the data member.
    #[inline(always)]
    pub fn member(&self) -> &'static str {
        self.member
    }

    /// The declared kind of the setting's value.
    #[inline(always)]
    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Returns true if the setting accepts [Value::Nil].
    #[inline(always)]
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    #[inline(always)]
    pub fn is_read_only(&self) -> bool {
        self.set.is_none()
    }

    /// The slider state, present if the setting's value had a numeric (or
    /// [char]) kind when the setting was discovered.
    #[inline(always)]
    pub fn slider(&self) -> Option<&Slider> {
        self.slider.as_ref()
    }

    #[inline(always)]
    pub fn parent(&self) -> Option<ScriptId> {
        match self.parent.is_nil() {
            true => None,
            false => Some(self.parent),
        }
    }

    /// Reads the current value of the member.
    pub fn get(&self) -> Result<Value, SettingError> {
        let value = match (self.receiver, &self.instance) {
            (MemberReceiver::Instance, Some(instance)) => instance
                .try_read_any(|object| (self.get)(Some(object)))
                .map_err(|cause| self.instance_error(cause))?,

            _ => (self.get)(None),
        };

        value.ok_or_else(|| self.mismatch())
    }

    /// Writes a new value into the member.
    ///
    /// The value does not have to be of the setting's [kind](Self::kind):
    /// it is reconciled with the kind through the
    /// [compatibility](crate::runtime::compatibility) engine first, so that
    /// `"42"` or `42u8` can be written into an [i64] setting.
    pub fn set(&self, value: impl Into<Value>) -> Result<(), SettingError> {
        let Some(set) = self.set else {
            return Err(SettingError::ReadOnly {
                setting: self.name.clone(),
            });
        };

        let value = self.reconcile(value.into())?;

        let result = match (self.receiver, &self.instance) {
            (MemberReceiver::Instance, Some(instance)) => instance
                .try_write_any(|object| set(Some(object), value))
                .map_err(|cause| self.instance_error(cause))?,

            _ => set(None, value),
        };

        result.ok_or_else(|| self.mismatch())
    }

    fn reconcile(&self, value: Value) -> Result<Value, SettingError> {
        let actual = value.kind();

        if actual == ValueKind::Nil {
            return match self.nullable {
                true => Ok(Value::Nil),

                false => Err(SettingError::Incompatible {
                    setting: self.name.clone(),
                    expected: self.kind,
                    actual,
                }),
            };
        }

        let level = compatibility(&value, self.kind);

        if !level.is_compatible() {
            return Err(SettingError::Incompatible {
                setting: self.name.clone(),
                expected: self.kind,
                actual,
            });
        }

        cast(value, self.kind, level).map_err(|cause| SettingError::Cast {
            setting: self.name.clone(),
            cause,
        })
    }

    #[inline(always)]
    fn instance_error(&self, cause: InstanceError) -> SettingError {
        SettingError::Instance {
            setting: self.name.clone(),
            cause,
        }
    }

    fn mismatch(&self) -> SettingError {
        let actual = match &self.instance {
            Some(instance) => instance.type_name(),
            None => "nil",
        };

        self.instance_error(InstanceError::TypeMismatch {
            expected: self.ty,
            actual,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        model::ScriptSetting,
        runtime::{
            Instance,
            InstanceError,
            MemberReceiver,
            SettingError,
            Value,
            ValueKind,
            __intrinsics,
        },
    };

    #[derive(Default)]
    struct Tuning {
        speed: u8,
        label: Option<String>,
    }

    fn speed(instance: &Instance) -> ScriptSetting {
        ScriptSetting::new(
            "Tuning",
            "speed",
            ValueKind::U8,
            false,
            MemberReceiver::Instance,
            Some(instance.clone()),
            |receiver| {
                __intrinsics::get(receiver, |this: &Tuning| Value::U8(this.speed))
            },
            Some(|receiver, value| {
                __intrinsics::set(receiver, value, |this: &mut Tuning, value: u8| {
                    this.speed = value
                })
            }),
        )
    }

    #[test]
    fn test_setting_conversions() {
        let instance = Instance::new(Tuning::default());
        let setting = speed(&instance);

        assert_eq!(setting.get(), Ok(Value::U8(0)));

        setting.set(7u8).unwrap();
        assert_eq!(setting.get(), Ok(Value::U8(7)));

        setting.set(12i64).unwrap();
        assert_eq!(setting.get(), Ok(Value::U8(12)));

        setting.set("33").unwrap();
        assert_eq!(setting.get(), Ok(Value::U8(33)));

        setting.set("9u8").unwrap();
        assert_eq!(setting.get(), Ok(Value::U8(9)));

        assert!(matches!(
            setting.set(300i32),
            Err(SettingError::Incompatible {
                expected: ValueKind::U8,
                actual: ValueKind::I32,
                ..
            }),
        ));

        assert!(matches!(
            setting.set(vec![String::from("1")]),
            Err(SettingError::Incompatible {
                actual: ValueKind::Strings,
                ..
            }),
        ));

        setting.set(true).unwrap();
        assert_eq!(setting.get(), Ok(Value::U8(1)));

        setting.set("9u8").unwrap();

        assert!(matches!(
            setting.set(Value::Nil),
            Err(SettingError::Incompatible { .. }),
        ));

        assert_eq!(setting.get(), Ok(Value::U8(9)));
    }

    #[test]
    fn test_nullable_setting() {
        let instance = Instance::new(Tuning::default());

        let setting = ScriptSetting::new(
            "Tuning",
            "label",
            ValueKind::Str,
            true,
            MemberReceiver::Instance,
            Some(instance.clone()),
            |receiver| {
                __intrinsics::get(receiver, |this: &Tuning| Value::from(this.label.clone()))
            },
            Some(|receiver, value| {
                __intrinsics::set(receiver, value, |this: &mut Tuning, value: Option<String>| {
                    this.label = value
                })
            }),
        );

        assert_eq!(setting.get(), Ok(Value::Nil));

        setting.set("fast").unwrap();
        assert_eq!(setting.get(), Ok(Value::from("fast")));

        setting.set(15).unwrap();
        assert_eq!(setting.get(), Ok(Value::from("15")));

        setting.set(Value::Nil).unwrap();
        assert_eq!(setting.get(), Ok(Value::Nil));
    }

    #[test]
    fn test_setting_busy_and_read_only() {
        let instance = Instance::new(Tuning::default());
        let setting = speed(&instance);

        instance
            .write(|_: &mut Tuning| {
                assert!(matches!(
                    setting.get(),
                    Err(SettingError::Instance {
                        cause: InstanceError::Busy,
                        ..
                    }),
                ));
            })
            .unwrap();

        let read_only = ScriptSetting::new(
            "Tuning",
            "speed",
            ValueKind::U8,
            false,
            MemberReceiver::Instance,
            Some(instance),
            |_| Some(Value::U8(1)),
            None,
        );

        assert!(read_only.is_read_only());
        assert!(matches!(
            read_only.set(1u8),
            Err(SettingError::ReadOnly { .. }),
        ));
    }
}
