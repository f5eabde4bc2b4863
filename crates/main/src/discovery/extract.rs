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
use log::warn;

use crate::{
    discovery::DISCOVERY_LOG,
    model::{InvocableMember, ScriptSetting},
    runtime::{
        BuildError,
        BuildResult,
        Instance,
        Marker,
        MemberKind,
        MemberReceiver,
        OperationMeta,
        Receiver,
        Slider,
        TypeMeta,
    },
    sink::Sink,
};

/// Extracts the operations of the `ty` that carry the `marker`, in the
/// order of their discovery.
///
/// Every candidate is validated, even if only the first one is used later.
pub(super) fn operations(
    ty: &TypeMeta,
    marker: Marker,
    instance: &Instance,
) -> BuildResult<Vec<InvocableMember>> {
    let mut result = Vec::new();

    for operation in ty.operations_with(marker) {
        validate(ty, operation)?;

        let group = match marker {
            Marker::MiniScript => operation.annotations.group(),
            _ => None,
        };

        let instance = match operation.receiver {
            Receiver::Static => None,
            Receiver::Ref | Receiver::Mut => Some(instance.clone()),
        };

        let member = InvocableMember::new(operation.name, operation.invoke)
            .with_name(operation.annotations.name().unwrap_or(operation.name))
            .with_description(operation.annotations.description())
            .with_group(group)
            .with_instance(instance)
            .accepting_signal(operation.accepts_signal())
            .running_once(operation.annotations.once(marker));

        result.push(member);
    }

    Ok(result)
}

fn validate(ty: &TypeMeta, operation: &OperationMeta) -> BuildResult<()> {
    if operation.generic {
        return Err(BuildError::IncompatibleWithGenericMethods {
            ty: CompactString::from(ty.name),
            operation: CompactString::from(operation.name),
        });
    }

    if !operation.params.is_empty() && !operation.accepts_signal() {
        return Err(BuildError::IncompatibleWithParameters {
            ty: CompactString::from(ty.name),
            operation: CompactString::from(operation.name),
            params: operation
                .params
                .iter()
                .map(|param| CompactString::from(param.type_name()))
                .collect(),
        });
    }

    Ok(())
}

/// Extracts the data members of the `ty` that carry the
/// [Setting](Marker::Setting) marker and materializes their sliders.
pub(super) fn settings(ty: &TypeMeta, instance: &Instance) -> BuildResult<Vec<ScriptSetting>> {
    let mut result = Vec::new();

    for member in ty.members_with(Marker::Setting) {
        let MemberKind::Value {
            kind,
            nullable,
            get,
            set,
        } = &member.kind
        else {
            continue;
        };

        let instance = match member.receiver {
            MemberReceiver::Instance => Some(instance.clone()),
            MemberReceiver::Static => None,
        };

        let mut setting = ScriptSetting::new(
            ty.name,
            member.name,
            *kind,
            *nullable,
            member.receiver,
            instance,
            *get,
            *set,
        )
        .with_name(member.annotations.name().unwrap_or(member.name))
        .with_description(member.annotations.description())
        .with_group(member.annotations.group());

        let bounds = member.annotations.range();

        let slider = match setting.get() {
            Ok(current) => Slider::materialize(&current, bounds),

            Err(error) => {
                warn!(
                    target: DISCOVERY_LOG,
                    "Setting \"{}\" of {} is not readable during discovery. {error}",
                    member.name,
                    ty.name,
                );

                Slider::materialize_kind(*kind, bounds)
            }
        };

        let slider = slider.map_err(
            |mismatch| BuildError::IncompatibleTypeUsedWithRange {
                ty: CompactString::from(ty.name),
                setting: CompactString::from(member.name),
                bound: mismatch.bound,
                supplied: mismatch.supplied,
                expected: mismatch.expected,
            },
        )?;

        setting.set_slider(slider);

        result.push(setting);
    }

    Ok(result)
}

/// Stores the `sink` into every data member of the `ty` that carries the
/// [Sink](Marker::Sink) marker. Returns true if at least one member received
/// the sink.
pub(super) fn inject_sink(ty: &TypeMeta, instance: &Instance, sink: &Sink) -> bool {
    let mut injected = false;

    for member in ty.members_with(Marker::Sink) {
        let MemberKind::Sink { inject } = &member.kind else {
            continue;
        };

        let result = instance.try_write_any(|object| inject(object, sink.clone()));

        injected = injected || matches!(result, Ok(Some(())));
    }

    injected
}
