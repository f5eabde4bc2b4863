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
    runtime::{BuildError, ModuleMeta, RangeBound, ScriptModule, ValueKind},
};

mod generic {
    use stagehand::script;

    #[script(module, name "generic-type", version "1.0.0")]
    pub struct Module;

    #[script]
    pub struct Holder<T> {
        pub value: T,
    }
}

mod locked {
    use stagehand::script;

    #[script(module, name "locked", version "1.0.0")]
    pub struct Module;

    #[script]
    pub struct Vault {
        pub secret: u64,
    }

    #[script]
    impl Vault {
        fn new() -> Self {
            Self { secret: 0 }
        }

        #[script(entry_point)]
        fn open(&self) -> u64 {
            Self::new().secret + self.secret
        }
    }
}

mod generic_method {
    use stagehand::script;

    #[script(module, name "generic-method", version "1.0.0")]
    pub struct Module;

    #[script]
    #[derive(Default)]
    pub struct Picker;

    #[script]
    impl Picker {
        #[script(mini_script)]
        fn pick<T: Default>(&self) {
            let _ = T::default();
        }
    }
}

mod lifecycle_params {
    use stagehand::script;

    #[script(module, name "lifecycle-params", version "1.0.0")]
    pub struct Module;

    #[script]
    #[derive(Default)]
    pub struct Counter;

    #[script]
    impl Counter {
        #[script(setup)]
        fn prepare(&self, count: u32) -> u32 {
            count
        }
    }
}

mod string_range {
    use stagehand::script;

    #[script(module, name "string-range", version "1.0.0")]
    pub struct Module;

    #[script]
    #[derive(Default)]
    pub struct Greeter {
        #[script(setting, max 10)]
        pub greeting: String,
    }
}

fn parse(module: &ModuleMeta) -> BuildError {
    AssemblyBuilder::default().parse(Some(module)).unwrap_err()
}

#[test]
fn test_generic_script_type() {
    assert_eq!(
        parse(generic::Module::meta()),
        BuildError::IncompatibleWithGenericClasses {
            ty: "Holder".into()
        },
    );
}

#[test]
fn test_private_constructor() {
    assert_eq!(
        parse(locked::Module::meta()),
        BuildError::NoParameterlessConstructor { ty: "Vault".into() },
    );
}

#[test]
fn test_generic_mini_script() {
    assert_eq!(
        parse(generic_method::Module::meta()),
        BuildError::IncompatibleWithGenericMethods {
            ty: "Picker".into(),
            operation: "pick".into(),
        },
    );
}

#[test]
fn test_lifecycle_with_parameters() {
    assert_eq!(
        parse(lifecycle_params::Module::meta()),
        BuildError::IncompatibleWithParameters {
            ty: "Counter".into(),
            operation: "prepare".into(),
            params: vec!["u32".into()],
        },
    );
}

#[test]
fn test_range_on_string_setting() {
    assert_eq!(
        parse(string_range::Module::meta()),
        BuildError::IncompatibleTypeUsedWithRange {
            ty: "Greeter".into(),
            setting: "greeting".into(),
            bound: RangeBound::Max,
            supplied: ValueKind::I32,
            expected: ValueKind::Str,
        },
    );
}
