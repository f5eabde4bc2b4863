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

use std::{
    any::{type_name, Any, TypeId},
    collections::{
        hash_map::{Entry, VacantEntry},
        HashMap,
    },
    mem::{size_of, take, transmute},
    ops::Deref,
    ptr::addr_of,
    slice,
    sync::{Mutex, MutexGuard},
};

use ahash::RandomState;
use compact_str::CompactString;
use lady_deirdre::sync::Lazy;

use crate::{
    runtime::{
        Arg,
        ConstructorMeta,
        Instance,
        IntoOutput,
        InvokeError,
        MemberMeta,
        ModuleMeta,
        OperationMeta,
        ReleaseFn,
        RustOrigin,
        ScriptValue,
        Signal,
        TypeMeta,
        Value,
    },
    sink::Sink,
};

type ExporterFn = extern "C" fn();

static __STAGEHAND_DECLARATIONS: Lazy<
    Mutex<HashMap<ExporterFn, Option<DeclarationGroup>, RandomState>>,
> = Lazy::new(|| Mutex::default());

pub struct ExportEntry {
    vacant: VacantEntry<'static, ExporterFn, Option<DeclarationGroup>>,
    #[allow(unused)]
    guard: MutexGuard<'static, HashMap<ExporterFn, Option<DeclarationGroup>, RandomState>>,
}

impl ExportEntry {
    #[inline(always)]
    pub fn get(f: ExporterFn) -> Option<Self> {
        let mut guard = __STAGEHAND_DECLARATIONS
            .lock()
            .unwrap_or_else(|poison| poison.into_inner());

        let Entry::Vacant(vacant) = guard.entry(f) else {
            return None;
        };

        // Safety: The entry does not outlive the guard stored next to it.
        let vacant = unsafe {
            transmute::<
                VacantEntry<'_, ExporterFn, Option<DeclarationGroup>>,
                VacantEntry<'static, ExporterFn, Option<DeclarationGroup>>,
            >(vacant)
        };

        Some(Self { vacant, guard })
    }

    #[inline(always)]
    pub fn export(self, group: DeclarationGroup) {
        let _ = self.vacant.insert(Some(group));
    }
}

/// Everything a single `#[script]` macro invocation declares.
pub struct DeclarationGroup {
    pub origin: &'static RustOrigin,
    pub modules: Vec<fn() -> ModuleDeclaration>,
    pub types: Vec<fn() -> TypeDeclaration>,
    pub impls: Vec<fn() -> ImplDeclaration>,
    pub entry_points: Vec<fn() -> EntryPointDeclaration>,
}

impl DeclarationGroup {
    #[inline(always)]
    pub(crate) fn enumerate() -> impl Iterator<Item = &'static DeclarationGroup> {
        static ENUMERATION: Lazy<Vec<DeclarationGroup>> = Lazy::new(|| {
            for exporter in DeclarationGroup::exporters() {
                exporter();
            }

            let mut declarations = __STAGEHAND_DECLARATIONS
                .lock()
                .unwrap_or_else(|poison| poison.into_inner());

            let mut vector = Vec::with_capacity(declarations.len());

            for (_, declaration) in declarations.iter_mut() {
                let Some(declaration) = take(declaration) else {
                    continue;
                };

                vector.push(declaration);
            }

            vector
        });

        ENUMERATION.deref().iter()
    }

    #[cfg(any(
        target_os = "none",
        target_os = "linux",
        target_os = "android",
        target_os = "fuchsia",
        target_os = "psp",
        target_os = "freebsd"
    ))]
    fn exporters() -> &'static [ExporterFn] {
        extern "Rust" {
            #[link_name = "__start_stagehandexpr"]
            static START: ExporterFn;
            #[link_name = "__stop_stagehandexpr"]
            static STOP: ExporterFn;
        }

        #[used]
        #[link_section = "stagehandexpr"]
        static mut EMPTY: [ExporterFn; 0] = [];

        let start = unsafe { addr_of!(START) };
        let stop = unsafe { addr_of!(STOP) };

        let len = ((stop as usize) - (start as usize)) / size_of::<ExporterFn>();

        unsafe { slice::from_raw_parts::<'static, ExporterFn>(start, len) }
    }

    #[cfg(any(target_os = "macos", target_os = "ios", target_os = "tvos"))]
    fn exporters() -> &'static [ExporterFn] {
        extern "Rust" {
            #[link_name = "\x01section$start$__DATA$__stagehandexpr"]
            static START: ExporterFn;
            #[link_name = "\x01section$end$__DATA$__stagehandexpr"]
            static STOP: ExporterFn;
        }

        let start = unsafe { addr_of!(START) };
        let stop = unsafe { addr_of!(STOP) };

        let len = ((stop as usize) - (start as usize)) / size_of::<ExporterFn>();

        unsafe { slice::from_raw_parts::<'static, ExporterFn>(start, len) }
    }

    #[cfg(any(target_os = "illumos"))]
    fn exporters() -> &'static [ExporterFn] {
        extern "Rust" {
            #[link_name = "__start_set_stagehandexpr"]
            static START: ExporterFn;
            #[link_name = "__stop_set_stagehandexpr"]
            static STOP: ExporterFn;
        }

        #[used]
        #[link_section = "set_stagehandexpr"]
        static mut EMPTY: [ExporterFn; 0] = [];

        let start = unsafe { addr_of!(START) };
        let stop = unsafe { addr_of!(STOP) };

        let len = ((stop as usize) - (start as usize)) / size_of::<ExporterFn>();

        unsafe { slice::from_raw_parts::<'static, ExporterFn>(start, len) }
    }

    #[cfg(target_os = "windows")]
    fn exporters() -> &'static [ExporterFn] {
        extern "Rust" {
            #[link_name = ".stagehandexpr$a"]
            static START: [ExporterFn; 0];
            #[link_name = ".stagehandexpr$c"]
            static STOP: [ExporterFn; 0];
        }

        let start = unsafe { addr_of!(START) } as *const ExporterFn;
        let stop = unsafe { addr_of!(STOP) } as *const ExporterFn;

        let len = ((stop as usize) - (start as usize)) / size_of::<ExporterFn>();

        let start = std::hint::black_box(start);

        unsafe { slice::from_raw_parts::<'static, ExporterFn>(start, len) }
    }

    #[cfg(not(any(
        target_os = "none",
        target_os = "linux",
        target_os = "android",
        target_os = "fuchsia",
        target_os = "psp",
        target_os = "freebsd",
        target_os = "macos",
        target_os = "ios",
        target_os = "tvos",
        target_os = "illumos",
        target_os = "windows",
    )))]
    fn exporters() -> &'static [ExporterFn] {
        &[]
    }
}

pub struct ModuleDeclaration {
    pub name: &'static str,
    pub version: &'static str,
    pub description: Option<&'static str>,

    /// The `module_path!()` of the declaring struct.
    pub path: &'static str,

    pub type_id: TypeId,
}

pub struct TypeDeclaration {
    pub path: &'static str,
    pub meta: TypeMeta,
}

pub struct ImplDeclaration {
    pub type_id: TypeId,
    pub constructors: Vec<ConstructorMeta>,
    pub operations: Vec<OperationMeta>,
    pub members: Vec<MemberMeta>,
    pub release: Option<ReleaseFn>,
}

pub struct EntryPointDeclaration {
    pub path: &'static str,
    pub operation: OperationMeta,
}

pub fn module_of<T: 'static>() -> &'static ModuleMeta {
    match ModuleMeta::by_type(&TypeId::of::<T>()) {
        Some(meta) => meta,

        None => panic!(
            "Module {} is not registered. Script declarations are not supported on this platform.",
            type_name::<T>(),
        ),
    }
}

#[inline]
pub fn no_args(args: &[Arg], operation: &str) -> Result<(), InvokeError> {
    match args.is_empty() {
        true => Ok(()),

        false => Err(InvokeError::ArityMismatch {
            operation: CompactString::from(operation),
            expected: 0,
            actual: args.len(),
        }),
    }
}

#[inline]
pub fn signal_arg(args: &[Arg], operation: &str) -> Result<Signal, InvokeError> {
    match args {
        [Arg::Signal(signal)] => Ok(signal.clone()),

        [other] => Err(InvokeError::ArgumentMismatch {
            operation: CompactString::from(operation),
            index: 0,
            expected: type_name::<Signal>(),
            actual: other.type_name(),
        }),

        _ => Err(InvokeError::ArityMismatch {
            operation: CompactString::from(operation),
            expected: 1,
            actual: args.len(),
        }),
    }
}

#[inline]
pub fn strings_arg(args: &[Arg], operation: &str) -> Result<Vec<String>, InvokeError> {
    match args {
        [Arg::Value(Value::Strings(strings))] => Ok(strings.clone()),

        [other] => Err(InvokeError::ArgumentMismatch {
            operation: CompactString::from(operation),
            index: 0,
            expected: <Vec<String>>::KIND.name(),
            actual: other.type_name(),
        }),

        _ => Err(InvokeError::ArityMismatch {
            operation: CompactString::from(operation),
            expected: 1,
            actual: args.len(),
        }),
    }
}

pub fn invoke_ref<T: 'static, R: IntoOutput>(
    instance: Option<&Instance>,
    operation: &str,
    f: impl FnOnce(&T) -> R,
) -> Result<Value, InvokeError> {
    let Some(instance) = instance else {
        return Err(InvokeError::MissingInstance {
            operation: CompactString::from(operation),
        });
    };

    instance
        .read(f)
        .map_err(|cause| InvokeError::Instance {
            operation: CompactString::from(operation),
            cause,
        })?
        .into_output()
        .map_err(|error| error.with_operation(operation))
}

pub fn invoke_mut<T: 'static, R: IntoOutput>(
    instance: Option<&Instance>,
    operation: &str,
    f: impl FnOnce(&mut T) -> R,
) -> Result<Value, InvokeError> {
    let Some(instance) = instance else {
        return Err(InvokeError::MissingInstance {
            operation: CompactString::from(operation),
        });
    };

    instance
        .write(f)
        .map_err(|cause| InvokeError::Instance {
            operation: CompactString::from(operation),
            cause,
        })?
        .into_output()
        .map_err(|error| error.with_operation(operation))
}

#[inline]
pub fn invoke_static<R: IntoOutput>(
    operation: &str,
    f: impl FnOnce() -> R,
) -> Result<Value, InvokeError> {
    f().into_output()
        .map_err(|error| error.with_operation(operation))
}

#[inline]
pub fn unsupported(operation: &str) -> Result<Value, InvokeError> {
    Err(InvokeError::Unsupported {
        operation: CompactString::from(operation),
    })
}

#[inline]
pub fn get<T: 'static>(
    receiver: Option<&(dyn Any + Send + Sync)>,
    f: impl FnOnce(&T) -> Value,
) -> Option<Value> {
    Some(f(receiver?.downcast_ref::<T>()?))
}

#[inline]
pub fn set<T: 'static, V: ScriptValue>(
    receiver: Option<&mut (dyn Any + Send + Sync)>,
    value: Value,
    f: impl FnOnce(&mut T, V),
) -> Option<()> {
    let this = receiver?.downcast_mut::<T>()?;
    let value = V::from_value(value)?;

    f(this, value);

    Some(())
}

#[inline]
pub fn inject<T: 'static>(
    receiver: &mut (dyn Any + Send + Sync),
    sink: Sink,
    f: impl FnOnce(&mut T, Sink),
) -> Option<()> {
    f(receiver.downcast_mut::<T>()?, sink);

    Some(())
}

#[cfg(test)]
mod tests {
    use crate::runtime::{
        Arg,
        Instance,
        InstanceError,
        InvokeError,
        Signal,
        Value,
        __intrinsics::{invoke_mut, invoke_ref, no_args, signal_arg, strings_arg},
    };

    #[test]
    fn test_argument_helpers() {
        assert_eq!(no_args(&[], "run"), Ok(()));

        assert!(matches!(
            no_args(&[Arg::Value(Value::Nil)], "run"),
            Err(InvokeError::ArityMismatch {
                expected: 0,
                actual: 1,
                ..
            }),
        ));

        let signal = Signal::new();

        assert_eq!(
            signal_arg(&[Arg::Signal(signal.clone())], "run"),
            Ok(signal)
        );

        assert!(matches!(
            signal_arg(&[Arg::Value(Value::I32(1))], "run"),
            Err(InvokeError::ArgumentMismatch {
                index: 0,
                actual: "i32",
                ..
            }),
        ));

        let args = vec![String::from("a"), String::from("b")];

        assert_eq!(
            strings_arg(&[Arg::Value(Value::Strings(args.clone()))], "main"),
            Ok(args),
        );

        assert!(matches!(
            strings_arg(&[], "main"),
            Err(InvokeError::ArityMismatch {
                expected: 1,
                actual: 0,
                ..
            }),
        ));
    }

    #[test]
    fn test_invoke_helpers() {
        let instance = Instance::new(5u32);

        assert_eq!(
            invoke_mut(Some(&instance), "inc", |value: &mut u32| *value += 1),
            Ok(Value::Nil),
        );

        assert_eq!(
            invoke_ref(Some(&instance), "get", |value: &u32| *value),
            Ok(Value::U32(6)),
        );

        assert!(matches!(
            invoke_ref(None, "get", |value: &u32| *value),
            Err(InvokeError::MissingInstance { .. }),
        ));

        assert!(matches!(
            invoke_ref(Some(&instance), "get", |value: &i8| *value),
            Err(InvokeError::Instance {
                cause: InstanceError::TypeMismatch { .. },
                ..
            }),
        ));

        let failure = invoke_ref(Some(&instance), "check", |_: &u32| -> Result<(), String> {
            Err(String::from("broken"))
        });

        assert_eq!(
            failure,
            Err(InvokeError::Failed {
                operation: Some("check".into()),
                message: String::from("broken"),
            }),
        );
    }
}
