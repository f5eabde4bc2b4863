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
    runtime::{ScriptModule, Value, ValueKind},
};

mod showcase {
    use stagehand::{runtime::Release, script};

    #[script(module, name "showcase", version "0.1.0")]
    pub struct Module;

    // The impl block comes first, so the integer property is discovered
    // before the struct's fields.
    #[script]
    impl TestScript {
        #[script(setting, group "Number Settings")]
        fn count(&self) -> i32 {
            self.count
        }

        fn ratio(&self) -> f64 {
            self.speed as f64 / 2.0
        }

        #[script(setup)]
        fn prepare(&mut self) {
            self.log.push("setup");
        }

        #[script(entry_point)]
        fn perform(&mut self) {
            self.log.push("entry point");
        }

        #[script(cleanup)]
        fn finish(&mut self) {
            self.log.push("cleanup");
        }

        #[script(mini_script)]
        fn ping(&self) -> String {
            String::from("pong")
        }

        fn unmarked(&self) -> f64 {
            self.ratio()
        }
    }

    #[script(name "Test Script")]
    #[derive(Default)]
    pub struct TestScript {
        pub count: i32,

        #[script(setting, group "Number Settings")]
        pub speed: f32,

        #[script(setting, group "Text Settings")]
        pub title: String,

        pub log: Vec<&'static str>,
        pub released: bool,
    }

    #[script]
    impl Release for TestScript {
        fn release(&mut self) {
            self.released = true;
        }
    }
}

#[test]
fn test_script_model() {
    let assembly = AssemblyBuilder::default()
        .parse(Some(showcase::Module::meta()))
        .unwrap();

    assert_eq!(assembly.len(), 1);
    assert!(assembly.warnings().is_empty());

    let script = &assembly.scripts()[0];

    assert_eq!(script.name(), "Test Script");
    assert_eq!(script.description(), None);
    assert!(script.resource().is_some());

    let settings = script
        .settings()
        .iter()
        .map(|setting| setting.name())
        .collect::<Vec<_>>();

    assert_eq!(settings, ["count", "speed", "title"]);

    let groups = script
        .setting_groups()
        .iter()
        .map(|(group, indices)| {
            let names = indices
                .iter()
                .map(|index| script.settings()[*index].name())
                .collect::<Vec<_>>();

            (group, names)
        })
        .collect::<Vec<_>>();

    assert_eq!(
        groups,
        [
            ("Number Settings", vec!["count", "speed"]),
            ("Text Settings", vec!["title"]),
        ],
    );

    let count = script.setting("count").unwrap();

    assert_eq!(count.kind(), ValueKind::I32);
    assert!(count.is_read_only());

    let slider = count.slider().unwrap();

    assert_eq!(slider.min, Value::I32(i32::MIN));
    assert_eq!(slider.max, Value::I32(i32::MAX));
    assert_eq!(slider.step, Value::I32(1));
    assert!(slider.compatible);

    assert!(script.setting("title").unwrap().slider().is_none());

    assert_eq!(script.mini_scripts().len(), 1);
    assert_eq!(
        script.mini_script_groups().names().collect::<Vec<_>>(),
        ["Other"],
    );

    for member in [script.setup(), script.entry_point(), script.cleanup()] {
        assert_eq!(member.unwrap().parent(), Some(script.id()));
    }

    script.run(None).unwrap();

    let log = script
        .instance()
        .unwrap()
        .read(|script: &showcase::TestScript| script.log.clone())
        .unwrap();

    assert_eq!(log, ["setup", "entry point", "cleanup"]);
}

#[test]
fn test_release_on_drop() {
    let assembly = AssemblyBuilder::default()
        .parse(Some(showcase::Module::meta()))
        .unwrap();

    let instance = assembly.scripts()[0].instance().unwrap().clone();

    drop(assembly);

    assert_eq!(
        instance.read(|script: &showcase::TestScript| script.released),
        Ok(true),
    );
}
