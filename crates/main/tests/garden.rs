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

use std::sync::{Arc, Mutex};

use stagehand::{
    discovery::{AssemblyBuilder, BuildConfig},
    model::ScriptId,
    runtime::{InvokeError, ModuleMeta, ScriptModule, SettingError, Signal, Value, ValueKind},
    sink::{Level, Sink, SinkBackend},
};

mod garden {
    use stagehand::{
        runtime::{Release, Signal},
        script,
        sink::Sink,
    };

    /// Tools of the garden.
    #[script(module, name "garden", version "2.1.0")]
    pub struct Module;

    /// Waters the plants.
    #[script(name "Gardener")]
    #[derive(Default)]
    pub struct Watering {
        /// Liters per plant.
        #[script(setting, group "Amounts", min 0.5, max 3, step 0.5)]
        pub liters: f32,

        #[script(setting, name "Plant count")]
        pub plants: u8,

        #[script(setting)]
        pub label: String,

        #[script(setting)]
        pub note: Option<String>,

        #[script(sink)]
        pub log: Option<Sink>,

        pub days: u8,
        pub filled: usize,
        pub watered: usize,
        pub released: bool,
    }

    #[script]
    impl Watering {
        #[script(setup, once)]
        fn fill_can(&mut self) {
            self.filled += 1;

            if let Some(log) = &self.log {
                log.info("can filled");
            }
        }

        /// Waters every plant.
        #[script(entry_point)]
        fn water(&mut self, signal: &Signal) -> usize {
            if signal.is_active() {
                return 0;
            }

            self.watered += self.plants as usize;

            self.watered
        }

        #[script(cleanup)]
        fn report(&self) -> Result<(), String> {
            match self.watered {
                0 => Err(String::from("nothing watered")),
                _ => Ok(()),
            }
        }

        #[script(mini_script, group "Maintenance")]
        fn sharpen_tools() -> String {
            String::from("sharp")
        }

        #[script(mini_script)]
        fn rest(&self) {}

        #[script(setting, setter set_days, description "Days between waterings.")]
        fn days(&self) -> u8 {
            self.days
        }

        fn set_days(&mut self, days: u8) {
            self.days = days;
        }

        #[script(setting, group "Amounts")]
        fn capacity() -> f64 {
            10.0
        }
    }

    #[script]
    impl Release for Watering {
        fn release(&mut self) {
            self.released = true;
        }
    }

    #[script]
    pub struct Sprinkler {
        pub turns: u32,
    }

    #[script]
    impl Sprinkler {
        pub fn new() -> Self {
            Self { turns: 4 }
        }

        #[script(entry_point)]
        fn spin(&self) -> u32 {
            self.turns
        }
    }

    pub struct Helper;
}

#[derive(Clone, Default)]
struct Records(Arc<Mutex<Vec<(Level, String)>>>);

impl SinkBackend for Records {
    fn enabled(&self, _level: Level) -> bool {
        true
    }

    fn write(&self, level: Level, message: &str) {
        self.0.lock().unwrap().push((level, String::from(message)));
    }
}

impl Records {
    fn take(&self) -> Vec<(Level, String)> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}

#[test]
fn test_module_registry() {
    let module = garden::Module::meta();

    assert_eq!(garden::Module::name(), "garden");
    assert_eq!(garden::Module::version(), "2.1.0");
    assert_eq!(module.description, Some("Tools of the garden."));
    assert!(module.entry_point.is_none());

    let names = module.types.iter().map(|ty| ty.name).collect::<Vec<_>>();

    assert_eq!(names, ["Watering", "Sprinkler"]);

    assert_eq!(ModuleMeta::of("garden", "2"), Some(module));
    assert_eq!(ModuleMeta::of("garden", "=2.1.0"), Some(module));
    assert_eq!(ModuleMeta::of("garden", "3"), None);
    assert_eq!(ModuleMeta::of("orchard", "2"), None);
}

#[test]
fn test_discovered_model() {
    let assembly = AssemblyBuilder::default()
        .parse(Some(garden::Module::meta()))
        .unwrap();

    assert_eq!(assembly.name(), "garden");
    assert_eq!(assembly.description(), Some("Tools of the garden."));
    assert_eq!(assembly.len(), 2);
    assert!(!assembly.is_generic_fallback());
    assert!(assembly.warnings().is_empty());

    let gardener = &assembly.scripts()[0];

    assert_eq!(gardener.name(), "Gardener");
    assert_eq!(gardener.description(), Some("Waters the plants."));
    assert!(gardener.sink().is_none());
    assert!(gardener.resource().is_some());

    let setup = gardener.setup().unwrap();

    assert_eq!(setup.name(), "fill_can");
    assert!(setup.is_once());
    assert!(!setup.accepts_signal());

    let entry_point = gardener.entry_point().unwrap();

    assert_eq!(entry_point.name(), "water");
    assert_eq!(entry_point.description(), Some("Waters every plant."));
    assert!(entry_point.accepts_signal());
    assert_eq!(entry_point.parent(), Some(gardener.id()));

    assert_eq!(gardener.cleanup().unwrap().name(), "report");

    let mini_scripts = gardener
        .mini_scripts()
        .iter()
        .map(|member| member.name())
        .collect::<Vec<_>>();

    assert_eq!(mini_scripts, ["sharpen_tools", "rest"]);
    assert_eq!(
        gardener.mini_script_groups().names().collect::<Vec<_>>(),
        ["Maintenance", "Other"],
    );

    let settings = gardener
        .settings()
        .iter()
        .map(|setting| setting.name())
        .collect::<Vec<_>>();

    assert_eq!(
        settings,
        ["liters", "Plant count", "label", "note", "days", "capacity"],
    );

    assert_eq!(
        gardener
            .setting_group("Amounts")
            .map(|setting| setting.name())
            .collect::<Vec<_>>(),
        ["liters", "capacity"],
    );

    let liters = gardener.setting("liters").unwrap();

    assert_eq!(liters.description(), Some("Liters per plant."));
    assert_eq!(liters.kind(), ValueKind::F32);

    let slider = liters.slider().unwrap();

    assert_eq!(slider.min, Value::F32(0.5));
    assert_eq!(slider.max, Value::F32(3.0));
    assert_eq!(slider.step, Value::F32(0.5));

    let plants = gardener.setting("Plant count").unwrap();

    assert_eq!(plants.member(), "plants");
    assert_eq!(plants.slider().unwrap().max, Value::U8(u8::MAX));

    assert!(gardener.setting("label").unwrap().slider().is_none());
    assert!(gardener.setting("note").unwrap().is_nullable());
    assert_eq!(
        gardener.setting("days").unwrap().description(),
        Some("Days between waterings."),
    );
    assert!(gardener.setting("capacity").unwrap().is_read_only());

    let sprinkler = &assembly.scripts()[1];

    assert_eq!(sprinkler.name(), "Sprinkler");
    assert!(sprinkler.resource().is_none());
    assert_eq!(
        sprinkler.entry_point().unwrap().invoke(None),
        Ok(Value::U32(4)),
    );
}

#[test]
fn test_settings_access() {
    let assembly = AssemblyBuilder::default()
        .parse(Some(garden::Module::meta()))
        .unwrap();

    let gardener = &assembly.scripts()[0];

    let plants = gardener.setting("Plant count").unwrap();

    assert_eq!(plants.get(), Ok(Value::U8(0)));
    plants.set(3u8).unwrap();
    assert_eq!(plants.get(), Ok(Value::U8(3)));

    let liters = gardener.setting("liters").unwrap();

    liters.set(1.5f32).unwrap();
    assert_eq!(liters.get(), Ok(Value::F32(1.5)));

    let label = gardener.setting("label").unwrap();

    label.set("Roses").unwrap();
    assert_eq!(label.get(), Ok(Value::Str(String::from("Roses"))));

    let note = gardener.setting("note").unwrap();

    assert_eq!(note.get(), Ok(Value::Nil));
    note.set("dry soil").unwrap();
    assert_eq!(note.get(), Ok(Value::Str(String::from("dry soil"))));
    note.set(Value::Nil).unwrap();
    assert_eq!(note.get(), Ok(Value::Nil));

    let days = gardener.setting("days").unwrap();

    days.set(5u8).unwrap();
    assert_eq!(days.get(), Ok(Value::U8(5)));

    let capacity = gardener.setting("capacity").unwrap();

    assert_eq!(capacity.get(), Ok(Value::F64(10.0)));
    assert!(matches!(
        capacity.set(20.0),
        Err(SettingError::ReadOnly { .. }),
    ));

    let state = gardener
        .instance()
        .unwrap()
        .read(|watering: &garden::Watering| {
            (
                watering.plants,
                watering.label.clone(),
                watering.note.clone(),
                watering.days,
            )
        })
        .unwrap();

    assert_eq!(state, (3, String::from("Roses"), None, 5));
}

#[test]
fn test_lifecycle() {
    let records = Records::default();

    let config = BuildConfig::new().with_sinks({
        let records = records.clone();

        move |_: ScriptId, _: &str| Sink::new(records.clone())
    });

    let mut assembly = AssemblyBuilder::new(config)
        .parse(Some(garden::Module::meta()))
        .unwrap();

    let gardener = &assembly.scripts()[0];

    assert!(gardener.sink().is_some());

    assert_eq!(
        gardener.cleanup().unwrap().invoke(None),
        Err(InvokeError::Failed {
            operation: Some("report".into()),
            message: String::from("nothing watered"),
        }),
    );

    gardener.setting("Plant count").unwrap().set(3u8).unwrap();

    gardener.run(None).unwrap();
    gardener.run(None).unwrap();

    assert!(gardener.setup().unwrap().is_done());

    let signal = Signal::new();

    signal.activate();

    assert_eq!(
        gardener.entry_point().unwrap().invoke(Some(&signal)),
        Ok(Value::Usize(0)),
    );

    assert_eq!(
        gardener.mini_scripts()[0].invoke(None),
        Ok(Value::Str(String::from("sharp"))),
    );

    let (filled, watered) = gardener
        .instance()
        .unwrap()
        .read(|watering: &garden::Watering| (watering.filled, watering.watered))
        .unwrap();

    assert_eq!((filled, watered), (1, 6));
    assert_eq!(records.take(), [(Level::Info, String::from("can filled"))]);

    assembly.release();

    let gardener = &assembly.scripts()[0];

    assert!(assembly.is_released());
    assert!(gardener.resource().unwrap().is_released());
    assert_eq!(
        gardener
            .instance()
            .unwrap()
            .read(|watering: &garden::Watering| watering.released),
        Ok(true),
    );
}
