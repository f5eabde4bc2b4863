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

use stagehand::{
    discovery::AssemblyBuilder,
    runtime::{Arg, BuildError, ScriptModule, Value},
};

mod tool {
    use stagehand::script;

    /// Counts its arguments.
    #[script(module, name "tool", version "1.0.0")]
    pub struct Module;

    #[script(entry_point)]
    pub fn main(args: Vec<String>) -> usize {
        args.len()
    }
}

mod mixed {
    use stagehand::script;

    #[script(module, name "mixed", version "1.0.0")]
    pub struct Module;

    #[script(entry_point)]
    fn main() -> u8 {
        1
    }

    #[script]
    #[derive(Default)]
    pub struct Task;

    #[script]
    impl Task {
        #[script(entry_point)]
        fn perform(&self) -> u8 {
            2
        }
    }
}

mod broken {
    use stagehand::script;

    #[script(module, name "broken-main", version "1.0.0")]
    pub struct Module;

    #[script(entry_point)]
    fn main(_args: Vec<String>, _verbose: bool) {}
}

#[test]
fn test_entry_point_script() {
    let module = tool::Module::meta();

    assert!(module.types.is_empty());
    assert_eq!(module.entry_point.as_ref().unwrap().name, "main");

    let assembly = AssemblyBuilder::default().parse(Some(module)).unwrap();

    assert!(assembly.is_generic_fallback());
    assert_eq!(assembly.len(), 1);

    let script = &assembly.scripts()[0];

    assert!(script.is_generic_fallback());
    assert!(script.instance().is_none());
    assert!(script.settings().is_empty());
    assert!(script.mini_scripts().is_empty());
    assert_eq!(script.name(), "tool");
    assert_eq!(script.description(), Some("Counts its arguments."));

    let entry_point = script.entry_point().unwrap();

    assert_eq!(entry_point.name(), "tool");
    assert_eq!(entry_point.operation(), "main");
    assert_eq!(entry_point.invoke(None), Ok(Value::Usize(0)));
    assert_eq!(
        entry_point.invoke_with(&[Arg::Value(Value::Strings(vec![
            String::from("--dry-run"),
            String::from("input.txt"),
        ]))]),
        Ok(Value::Usize(2)),
    );

    assert_eq!(script.run(None), Ok(()));
}

#[test]
fn test_script_types_take_precedence() {
    let module = mixed::Module::meta();

    assert!(module.entry_point.is_some());

    let assembly = AssemblyBuilder::default().parse(Some(module)).unwrap();

    assert!(!assembly.is_generic_fallback());
    assert_eq!(assembly.len(), 1);

    let task = &assembly.scripts()[0];

    assert_eq!(task.name(), "Task");
    assert_eq!(task.entry_point().unwrap().invoke(None), Ok(Value::U8(2)));
}

#[test]
fn test_incompatible_entry_point() {
    assert_eq!(
        AssemblyBuilder::default()
            .parse(Some(broken::Module::meta()))
            .unwrap_err(),
        BuildError::IncompatibleEntryPoint {
            module: "broken-main".into(),
            params: vec!["Vec<String>".into(), "bool".into()],
        },
    );
}
