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
use log::info;

use crate::{
    discovery::{AssemblyBuilder, DISCOVERY_LOG},
    model::{InvocableMember, Script, ScriptAssembly, ScriptId},
    runtime::{Arg, BuildError, BuildResult, ModuleMeta, ParamShape, Value},
};

impl AssemblyBuilder {
    // Synthesizes the single script from the module's entry point. The
    // assembly stays empty if there is no entry point.
    pub(super) fn synthesize(
        &self,
        module: &ModuleMeta,
        assembly: &mut ScriptAssembly,
    ) -> BuildResult<()> {
        let Some(entry_point) = &module.entry_point else {
            return Ok(());
        };

        if entry_point.generic {
            return Err(BuildError::IncompatibleWithGenericMethods {
                ty: CompactString::from(module.name),
                operation: CompactString::from(entry_point.name),
            });
        }

        let default_args = match entry_point.params.as_slice() {
            [] => Vec::new(),

            [param] if param.shape == ParamShape::Strings => {
                vec![Arg::Value(Value::Strings(Vec::new()))]
            }

            params => {
                return Err(BuildError::IncompatibleEntryPoint {
                    module: CompactString::from(module.name),
                    params: params
                        .iter()
                        .map(|param| CompactString::from(param.type_name()))
                        .collect(),
                })
            }
        };

        let id = ScriptId::new();

        id.set_name(module.name);

        let mut script = Script::new(id, module.name);

        script.description = module.description.map(CompactString::from);
        script.generic_fallback = true;
        script.sink = self.create_sink(id, module.name);
        script.entry_point = Some(
            InvocableMember::new(entry_point.name, entry_point.invoke)
                .with_name(module.name)
                .with_description(module.description)
                .with_default_args(default_args),
        );

        script.adopt();

        info!(
            target: DISCOVERY_LOG,
            "Module \"{}\" has no script types. Entry point \"{}\" is used as a script.",
            module.name,
            entry_point.name,
        );

        assembly.push(script);

        Ok(())
    }
}
