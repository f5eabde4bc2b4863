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

//! The discovery engine.
//!
//! The [AssemblyBuilder] inspects a [ModuleMeta], selects the types marked
//! as scripts ([scan]), instantiates each of them, and extracts their
//! lifecycle operations, mini scripts and settings into a [ScriptAssembly].
//! If the module has no script types, the builder synthesizes a single
//! script from the module's entry point instead.
//!
//! ```
//! use stagehand::{
//!     discovery::AssemblyBuilder,
//!     runtime::{ModuleMeta, OperationMeta, ParamMeta, ParamShape, Receiver, Value},
//! };
//!
//! let module = ModuleMeta::new("tool").with_entry_point(OperationMeta {
//!     receiver: Receiver::Static,
//!     params: vec![ParamMeta::new("args", ParamShape::Strings)],
//!     ..OperationMeta::new("main", |_, args| match args {
//!         [stagehand::runtime::Arg::Value(Value::Strings(args))] => Ok(Value::Usize(args.len())),
//!         _ => Ok(Value::Nil),
//!     })
//! });
//!
//! let assembly = AssemblyBuilder::default().parse(Some(&module)).unwrap();
//!
//! assert!(assembly.is_generic_fallback());
//!
//! let script = &assembly.scripts()[0];
//!
//! assert_eq!(script.name(), "tool");
//! assert_eq!(script.entry_point().unwrap().invoke(None), Ok(Value::Usize(0)));
//! ```

mod config;
mod extract;
mod fallback;
mod scanner;

use compact_str::CompactString;
use log::{debug, warn};

pub use crate::discovery::{config::BuildConfig, scanner::scan};
use crate::{
    model::{BuildWarning, Groups, ManagedResource, Script, ScriptAssembly, ScriptId},
    runtime::{BuildError, BuildResult, Instance, Marker, ModuleMeta, TypeMeta},
    sink::Sink,
};

/// The [log] target of the discovery process.
pub static DISCOVERY_LOG: &'static str = "stagehand::discovery";

/// The builder of [ScriptAssembly] objects.
///
/// Building is a single synchronous pass over the module's descriptor table.
/// The first authoring mistake found in the module aborts the pass with
/// a [BuildError]: nothing is skipped silently.
#[derive(Clone, Default, Debug)]
pub struct AssemblyBuilder {
    config: BuildConfig,
}

impl AssemblyBuilder {
    #[inline(always)]
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    #[inline(always)]
    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Discovers the scripts of the `module`.
    ///
    /// An absent module produces an empty assembly.
    pub fn parse(&self, module: Option<&ModuleMeta>) -> BuildResult<ScriptAssembly> {
        let Some(module) = module else {
            return Ok(ScriptAssembly::new("", None));
        };

        debug!(target: DISCOVERY_LOG, "Discovering module \"{module}\".");

        let mut assembly = ScriptAssembly::new(module.name, module.description);

        let mut candidates = scan(Some(module)).peekable();

        if candidates.peek().is_none() {
            if self.config.fallback {
                self.synthesize(module, &mut assembly)?;
            }

            return Ok(assembly);
        }

        for ty in candidates {
            self.build(ty, &mut assembly)?;
        }

        debug!(
            target: DISCOVERY_LOG,
            "Module \"{module}\" discovered: {} script(s).",
            assembly.len(),
        );

        Ok(assembly)
    }

    fn build(&self, ty: &TypeMeta, assembly: &mut ScriptAssembly) -> BuildResult<()> {
        if ty.generic {
            return Err(BuildError::IncompatibleWithGenericClasses {
                ty: CompactString::from(ty.name),
            });
        }

        let Some(construct) = ty
            .parameterless_constructor()
            .and_then(|constructor| constructor.construct)
        else {
            return Err(BuildError::NoParameterlessConstructor {
                ty: CompactString::from(ty.name),
            });
        };

        let instance = construct();

        let id = ScriptId::new();
        let name = ty.annotations.name().unwrap_or(ty.name);

        let mut script = Script::new(id, name);

        script.description = ty.annotations.description().map(CompactString::from);
        script.instance = Some(instance.clone());
        script.sink = self.create_sink(id, name);

        if let Some(sink) = &script.sink {
            if !extract::inject_sink(ty, &instance, sink) {
                debug!(
                    target: DISCOVERY_LOG,
                    "Script \"{name}\" has no sink member. The sink is kept by the script only.",
                );
            }
        }

        let mut warnings = Vec::new();

        if let Err(error) = self.extract(ty, &instance, &mut script, &mut warnings) {
            if let Some(release) = ty.release {
                if let Err(release_error) = release(&instance) {
                    warn!(
                        target: DISCOVERY_LOG,
                        "Script \"{name}\" release failure. {release_error}",
                    );
                }
            }

            return Err(error);
        }

        script.resource = ty
            .release
            .map(|release| ManagedResource::new(instance, release));

        script.adopt();

        id.set_name(name);

        for warning in warnings {
            warn!(target: DISCOVERY_LOG, "{warning}.");

            if self.config.warn_to_sink {
                if let Some(sink) = &script.sink {
                    sink.warn(&warning);
                }
            }

            assembly.warn(warning);
        }

        debug!(
            target: DISCOVERY_LOG,
            "Script \"{name}\" discovered: {} mini script(s), {} setting(s).",
            script.mini_scripts.len(),
            script.settings.len(),
        );

        assembly.push(script);

        Ok(())
    }

    fn extract(
        &self,
        ty: &TypeMeta,
        instance: &Instance,
        script: &mut Script,
        warnings: &mut Vec<BuildWarning>,
    ) -> BuildResult<()> {
        for marker in [Marker::Setup, Marker::EntryPoint, Marker::Cleanup] {
            let mut candidates = extract::operations(ty, marker, instance)?.into_iter();

            let Some(used) = candidates.next() else {
                continue;
            };

            for ignored in candidates {
                warnings.push(BuildWarning::DuplicateLifecycle {
                    script: script.id,
                    ty: CompactString::from(ty.name),
                    marker,
                    used: CompactString::from(used.operation()),
                    ignored: CompactString::from(ignored.operation()),
                });
            }

            match marker {
                Marker::Setup => script.setup = Some(used),
                Marker::EntryPoint => script.entry_point = Some(used),
                _ => script.cleanup = Some(used),
            }
        }

        script.mini_scripts = extract::operations(ty, Marker::MiniScript, instance)?;

        script.mini_script_groups = Groups::collect(
            script.mini_scripts.iter().map(|member| member.group()),
            self.config.default_group,
        );

        script.settings = extract::settings(ty, instance)?;

        script.setting_groups = Groups::collect(
            script.settings.iter().map(|setting| setting.group()),
            self.config.default_group,
        );

        Ok(())
    }

    #[inline]
    fn create_sink(&self, id: ScriptId, name: &str) -> Option<Sink> {
        self.config.sinks.as_ref()?.create_sink(id, name)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        any::Any,
        sync::atomic::{AtomicUsize, Ordering},
    };

    use crate::{
        discovery::{AssemblyBuilder, BuildConfig},
        model::{BuildWarning, ScriptId},
        runtime::{
            release_fn,
            Annotation,
            Annotations,
            BuildError,
            ConstructorMeta,
            Marker,
            MemberKind,
            MemberMeta,
            ModuleMeta,
            OperationMeta,
            ParamMeta,
            ParamShape,
            RangeBounds,
            Receiver,
            Release,
            TypeMeta,
            Value,
            ValueKind,
            __intrinsics,
        },
        sink::{tests::Records, Level, Sink},
    };

    #[derive(Default)]
    struct Lamp {
        brightness: f32,
        log: Sink,
        runs: usize,
        released: bool,
    }

    impl Release for Lamp {
        fn release(&mut self) {
            self.released = true;
        }
    }

    fn set_brightness(receiver: Option<&mut (dyn Any + Send + Sync)>, value: Value) -> Option<()> {
        __intrinsics::set(receiver, value, |lamp: &mut Lamp, value: f32| {
            lamp.brightness = value
        })
    }

    fn mini_script(name: &'static str, group: Option<&'static str>) -> OperationMeta {
        OperationMeta {
            annotations: Annotations::new().with(Annotation::MiniScript { group }),
            ..OperationMeta::new(name, |instance, args| {
                __intrinsics::no_args(args, "mini")?;
                __intrinsics::invoke_ref(instance, "mini", |_: &Lamp| ())
            })
        }
    }

    fn lamp() -> TypeMeta {
        TypeMeta {
            annotations: Annotations::new()
                .with(Annotation::Script)
                .with(Annotation::Name("Desk Lamp"))
                .with(Annotation::Description("Lights the desk.")),
            constructors: vec![ConstructorMeta::default_of::<Lamp>()],
            operations: vec![
                OperationMeta {
                    annotations: Annotations::new().with(Annotation::Setup { once: true }),
                    receiver: Receiver::Mut,
                    ..OperationMeta::new("prepare", |instance, args| {
                        __intrinsics::no_args(args, "prepare")?;
                        __intrinsics::invoke_mut(instance, "prepare", |lamp: &mut Lamp| {
                            lamp.log.info("prepared")
                        })
                    })
                },
                OperationMeta {
                    annotations: Annotations::new().with(Annotation::EntryPoint),
                    receiver: Receiver::Mut,
                    params: vec![ParamMeta::new("signal", ParamShape::Signal)],
                    ..OperationMeta::new("shine", |instance, args| {
                        let signal = __intrinsics::signal_arg(args, "shine")?;

                        __intrinsics::invoke_mut(instance, "shine", move |lamp: &mut Lamp| {
                            if !signal.is_active() {
                                lamp.runs += 1;
                            }

                            lamp.runs
                        })
                    })
                },
                OperationMeta {
                    annotations: Annotations::new().with(Annotation::EntryPoint),
                    ..OperationMeta::new("glow", |_, _| Ok(Value::Nil))
                },
                mini_script("blink", Some("Effects")),
                mini_script("reset", None),
                mini_script("dim", Some("Effects")),
            ],
            members: vec![
                MemberMeta {
                    annotations: Annotations::new()
                        .with(Annotation::Setting {
                            group: Some("Light"),
                        })
                        .with(Annotation::Range(RangeBounds::new().min(0).max(100))),
                    ..MemberMeta::new(
                        "brightness",
                        MemberKind::Value {
                            kind: ValueKind::F32,
                            nullable: false,
                            get: |receiver| {
                                __intrinsics::get(receiver, |lamp: &Lamp| {
                                    Value::F32(lamp.brightness)
                                })
                            },
                            set: Some(set_brightness),
                        },
                    )
                },
                MemberMeta {
                    annotations: Annotations::new().with(Annotation::Sink),
                    ..MemberMeta::new(
                        "log",
                        MemberKind::Sink {
                            inject: |receiver, sink| {
                                __intrinsics::inject(receiver, sink, |lamp: &mut Lamp, sink| {
                                    lamp.log = sink
                                })
                            },
                        },
                    )
                },
            ],
            release: Some(release_fn::<Lamp>()),
            ..TypeMeta::of::<Lamp>("Lamp")
        }
    }

    #[test]
    fn test_discover_script() {
        let module = ModuleMeta::new("lights").with_type(lamp());

        let mut assembly = AssemblyBuilder::default().parse(Some(&module)).unwrap();

        assert_eq!(assembly.name(), "lights");
        assert_eq!(assembly.len(), 1);
        assert!(!assembly.is_generic_fallback());

        let script = &assembly.scripts()[0];

        assert_eq!(script.name(), "Desk Lamp");
        assert_eq!(script.description(), Some("Lights the desk."));
        assert_eq!(script.id().name(), "Desk Lamp");
        assert_eq!(script.setup().unwrap().operation(), "prepare");
        assert!(script.setup().unwrap().is_once());
        assert_eq!(script.entry_point().unwrap().operation(), "shine");
        assert!(script.entry_point().unwrap().accepts_signal());
        assert!(script.cleanup().is_none());

        let mini_scripts = script
            .mini_scripts()
            .iter()
            .map(|member| member.name())
            .collect::<Vec<_>>();

        assert_eq!(mini_scripts, ["blink", "reset", "dim"]);

        let groups = script.mini_script_groups().names().collect::<Vec<_>>();

        assert_eq!(groups, ["Effects", "Other"]);

        let effects = script
            .mini_script_group("Effects")
            .map(|member| member.name())
            .collect::<Vec<_>>();

        assert_eq!(effects, ["blink", "dim"]);

        let brightness = script.setting("brightness").unwrap();

        assert_eq!(brightness.group(), Some("Light"));
        assert_eq!(brightness.parent(), Some(script.id()));
        assert_eq!(brightness.slider().unwrap().min, Value::F32(0.0));
        assert_eq!(brightness.slider().unwrap().max, Value::F32(100.0));
        assert_eq!(brightness.slider().unwrap().step, Value::F32(0.000001));

        brightness.set(40u8).unwrap();

        assert_eq!(brightness.get(), Ok(Value::F32(40.0)));

        assert_eq!(script.run(None), Ok(()));
        assert_eq!(script.entry_point().unwrap().invoke(None), Ok(Value::Usize(2)));

        assert_eq!(assembly.warnings().len(), 1);

        match &assembly.warnings()[0] {
            BuildWarning::DuplicateLifecycle {
                marker,
                used,
                ignored,
                ..
            } => {
                assert_eq!(*marker, Marker::EntryPoint);
                assert_eq!(used.as_str(), "shine");
                assert_eq!(ignored.as_str(), "glow");
            }
        }

        assembly.release();

        let script = &assembly.scripts()[0];

        assert!(assembly.is_released());
        assert!(script.resource().unwrap().is_released());
        assert_eq!(
            script.instance().unwrap().read(|lamp: &Lamp| lamp.released),
            Ok(true),
        );
    }

    #[test]
    fn test_sink_injection() {
        let records = Records::default();

        let config = {
            let records = records.clone();

            BuildConfig::new()
                .with_sinks(move |_: ScriptId, _: &str| Sink::new(records.clone()))
        };

        let module = ModuleMeta::new("lights").with_type(lamp());

        let assembly = AssemblyBuilder::new(config).parse(Some(&module)).unwrap();

        let script = &assembly.scripts()[0];

        assert!(script.sink().is_some());

        let warnings = records.take();

        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].0, Level::Warn);

        script.setup().unwrap().invoke(None).unwrap();

        assert_eq!(records.take(), vec![(Level::Info, String::from("prepared"))]);

        // Run-once setup.
        script.setup().unwrap().invoke(None).unwrap();

        assert!(records.take().is_empty());
    }

    #[test]
    fn test_discovery_errors() {
        let builder = AssemblyBuilder::default();

        let generic = ModuleMeta::new("broken").with_type(TypeMeta {
            generic: true,
            ..lamp()
        });

        assert_eq!(
            builder.parse(Some(&generic)).unwrap_err(),
            BuildError::IncompatibleWithGenericClasses { ty: "Lamp".into() },
        );

        let no_constructor = ModuleMeta::new("broken").with_type(TypeMeta {
            constructors: vec![ConstructorMeta {
                public: false,
                ..ConstructorMeta::default_of::<Lamp>()
            }],
            ..lamp()
        });

        assert_eq!(
            builder.parse(Some(&no_constructor)).unwrap_err(),
            BuildError::NoParameterlessConstructor { ty: "Lamp".into() },
        );

        let mut with_params = lamp();

        with_params.operations.push(OperationMeta {
            annotations: Annotations::new().with(Annotation::MiniScript { group: None }),
            params: vec![ParamMeta::new("times", ParamShape::Other("u32"))],
            ..OperationMeta::new("flash", |_, _| __intrinsics::unsupported("flash"))
        });

        assert_eq!(
            builder
                .parse(Some(&ModuleMeta::new("broken").with_type(with_params)))
                .unwrap_err(),
            BuildError::IncompatibleWithParameters {
                ty: "Lamp".into(),
                operation: "flash".into(),
                params: vec!["u32".into()],
            },
        );

        let mut with_generic = lamp();

        with_generic.operations.push(OperationMeta {
            annotations: Annotations::new().with(Annotation::Cleanup { once: false }),
            generic: true,
            ..OperationMeta::new("finish", |_, _| __intrinsics::unsupported("finish"))
        });

        assert_eq!(
            builder
                .parse(Some(&ModuleMeta::new("broken").with_type(with_generic)))
                .unwrap_err(),
            BuildError::IncompatibleWithGenericMethods {
                ty: "Lamp".into(),
                operation: "finish".into(),
            },
        );

        let mut with_range = lamp();

        with_range.members[0].annotations = Annotations::new()
            .with(Annotation::Setting { group: None })
            .with(Annotation::Range(
                RangeBounds::new().step(Value::Strings(Vec::new())),
            ));

        assert!(matches!(
            builder.parse(Some(&ModuleMeta::new("broken").with_type(with_range))),
            Err(BuildError::IncompatibleTypeUsedWithRange {
                supplied: ValueKind::Strings,
                expected: ValueKind::F32,
                ..
            }),
        ));
    }

    #[test]
    fn test_unreadable_setting_bounds() {
        fn unreadable(_: Option<&(dyn Any + Send + Sync)>) -> Option<Value> {
            None
        }

        let mut lamp = lamp();

        lamp.members.push(MemberMeta {
            annotations: Annotations::new()
                .with(Annotation::Setting { group: None })
                .with(Annotation::Range(RangeBounds::new().max(10))),
            ..MemberMeta::new(
                "level",
                MemberKind::Value {
                    kind: ValueKind::U8,
                    nullable: false,
                    get: unreadable,
                    set: None,
                },
            )
        });

        let assembly = AssemblyBuilder::default()
            .parse(Some(&ModuleMeta::new("lights").with_type(lamp.clone())))
            .unwrap();

        let slider = assembly.scripts()[0].setting("level").unwrap().slider().unwrap();

        assert_eq!(slider.max, Value::U8(10));
        assert_eq!(slider.min, Value::U8(0));

        if let Some(member) = lamp.members.last_mut() {
            member.annotations = Annotations::new()
                .with(Annotation::Setting { group: None })
                .with(Annotation::Range(RangeBounds::new().max("bright")));
        }

        assert!(matches!(
            AssemblyBuilder::default().parse(Some(&ModuleMeta::new("lights").with_type(lamp))),
            Err(BuildError::IncompatibleTypeUsedWithRange {
                supplied: ValueKind::Str,
                expected: ValueKind::U8,
                ..
            }),
        ));
    }

    #[test]
    fn test_release_on_failed_build() {
        static RELEASED: AtomicUsize = AtomicUsize::new(0);

        #[derive(Default)]
        struct Cache;

        impl Release for Cache {
            fn release(&mut self) {
                let _ = RELEASED.fetch_add(1, Ordering::SeqCst);
            }
        }

        let cache = TypeMeta {
            annotations: Annotations::new().with(Annotation::Script),
            constructors: vec![ConstructorMeta::default_of::<Cache>()],
            operations: vec![OperationMeta {
                annotations: Annotations::new().with(Annotation::MiniScript { group: None }),
                generic: true,
                ..OperationMeta::new("flush", |_, _| __intrinsics::unsupported("flush"))
            }],
            release: Some(release_fn::<Cache>()),
            ..TypeMeta::of::<Cache>("Cache")
        };

        assert!(AssemblyBuilder::default()
            .parse(Some(&ModuleMeta::new("cache").with_type(cache.clone())))
            .is_err());

        assert_eq!(RELEASED.load(Ordering::SeqCst), 1);

        // A failing release does not hide the build error.
        let mismatched = TypeMeta {
            release: Some(release_fn::<Lamp>()),
            ..cache
        };

        assert_eq!(
            AssemblyBuilder::default()
                .parse(Some(&ModuleMeta::new("cache").with_type(mismatched)))
                .unwrap_err(),
            BuildError::IncompatibleWithGenericMethods {
                ty: "Cache".into(),
                operation: "flush".into(),
            },
        );

        assert_eq!(RELEASED.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_entry_point_fallback() {
        let builder = AssemblyBuilder::default();

        let assembly = builder.parse(None).unwrap();

        assert!(assembly.is_empty());
        assert_eq!(assembly.name(), "");

        let assembly = builder.parse(Some(&ModuleMeta::new("bare"))).unwrap();

        assert!(assembly.is_empty());
        assert!(!assembly.is_generic_fallback());

        let module = ModuleMeta::new("tool")
            .with_description("Prints the arguments.")
            .with_entry_point(OperationMeta {
                receiver: Receiver::Static,
                ..OperationMeta::new("main", |_, args| {
                    __intrinsics::no_args(args, "main")?;
                    __intrinsics::invoke_static("main", || 7u8)
                })
            });

        let assembly = builder.parse(Some(&module)).unwrap();

        assert!(assembly.is_generic_fallback());
        assert_eq!(assembly.len(), 1);

        let script = &assembly.scripts()[0];

        assert!(script.is_generic_fallback());
        assert!(script.instance().is_none());
        assert_eq!(script.name(), "tool");
        assert_eq!(script.description(), Some("Prints the arguments."));
        assert_eq!(script.entry_point().unwrap().name(), "tool");
        assert_eq!(script.entry_point().unwrap().invoke(None), Ok(Value::U8(7)));

        let disabled = AssemblyBuilder::new(BuildConfig {
            fallback: false,
            ..BuildConfig::new()
        });

        assert!(disabled.parse(Some(&module)).unwrap().is_empty());

        let invalid = ModuleMeta::new("tool").with_entry_point(OperationMeta {
            receiver: Receiver::Static,
            params: vec![
                ParamMeta::new("args", ParamShape::Strings),
                ParamMeta::new("verbose", ParamShape::Other("bool")),
            ],
            ..OperationMeta::new("main", |_, _| __intrinsics::unsupported("main"))
        });

        assert_eq!(
            builder.parse(Some(&invalid)).unwrap_err(),
            BuildError::IncompatibleEntryPoint {
                module: "tool".into(),
                params: vec!["Vec<String>".into(), "bool".into()],
            },
        );
    }
}
