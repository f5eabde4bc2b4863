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
    fmt::{Debug, Formatter},
};

use crate::{
    runtime::{
        Annotations,
        Instance,
        InstanceError,
        InvokeError,
        Marker,
        Release,
        RustOrigin,
        Signal,
        Value,
        ValueKind,
    },
    sink::Sink,
};

/// Creates a new [Instance] of a script type.
pub type ConstructFn = fn() -> Instance;

/// Calls an operation late-bound: with an optional receiver instance and
/// a list of arguments.
pub type InvokeFn = fn(instance: Option<&Instance>, args: &[Arg]) -> Result<Value, InvokeError>;

/// Reads a data member of a locked object (or a static member if the receiver
/// is None). Returns None if the receiver has an unexpected type.
pub type GetFn = fn(receiver: Option<&(dyn Any + Send + Sync)>) -> Option<Value>;

/// Writes a value of the member's exact kind into a data member of a locked
/// object (or into a static member if the receiver is None). Returns None if
/// the receiver or the value has an unexpected type.
pub type SetFn = fn(receiver: Option<&mut (dyn Any + Send + Sync)>, value: Value) -> Option<()>;

/// Stores a diagnostic sink into a data member of a locked object.
pub type InjectFn = fn(receiver: &mut (dyn Any + Send + Sync), sink: Sink) -> Option<()>;

/// Releases the resources owned by an instance.
pub type ReleaseFn = fn(instance: &Instance) -> Result<(), InstanceError>;

/// Introspection metadata of a Rust type offered for discovery.
///
/// The [script](crate::script) macro creates this object for every
/// `#[script]` struct and merges into it everything declared in the struct's
/// `#[script] impl` blocks. The metadata can also be assembled manually:
///
/// ```
/// use stagehand::runtime::{
///     Annotation,
///     Annotations,
///     ConstructorMeta,
///     OperationMeta,
///     TypeMeta,
///     __intrinsics,
/// };
///
/// #[derive(Default)]
/// struct Greeter;
///
/// let meta = TypeMeta {
///     annotations: Annotations::new().with(Annotation::Script),
///     constructors: vec![ConstructorMeta::default_of::<Greeter>()],
///     operations: vec![OperationMeta {
///         annotations: Annotations::new().with(Annotation::EntryPoint),
///         ..OperationMeta::new("greet", |instance, args| {
///             __intrinsics::no_args(args, "greet")?;
///             __intrinsics::invoke_ref(instance, "greet", |_: &Greeter| ())
///         })
///     }],
///     ..TypeMeta::of::<Greeter>("Greeter")
/// };
///
/// assert!(meta.parameterless_constructor().is_some());
/// ```
#[derive(Clone, Debug)]
pub struct TypeMeta {
    /// The place where the type was declared.
    pub origin: &'static RustOrigin,

    /// The identifier of the type.
    pub name: &'static str,

    /// The Rust type identifier. None for generic types.
    pub type_id: Option<TypeId>,

    /// True if the type has generic parameters.
    pub generic: bool,

    pub annotations: Annotations,

    pub constructors: Vec<ConstructorMeta>,

    /// Operations in the order of their declaration.
    pub operations: Vec<OperationMeta>,

    /// Data members in the order of their declaration.
    pub members: Vec<MemberMeta>,

    /// Present if the type implements [Release].
    pub release: Option<ReleaseFn>,
}

impl TypeMeta {
    /// Creates an empty metadata object of a type unknown to the Rust type
    /// system (e.g., a generic type).
    #[inline]
    pub fn new(name: &'static str) -> Self {
        Self {
            origin: RustOrigin::nil(),
            name,
            type_id: None,
            generic: false,
            annotations: Annotations::new(),
            constructors: Vec::new(),
            operations: Vec::new(),
            members: Vec::new(),
            release: None,
        }
    }

    /// Creates an empty metadata object of the Rust type `T`.
    #[inline]
    pub fn of<T: 'static>(name: &'static str) -> Self {
        Self {
            type_id: Some(TypeId::of::<T>()),
            ..Self::new(name)
        }
    }

    /// Returns the first public constructor without parameters that can
    /// actually construct an instance.
    pub fn parameterless_constructor(&self) -> Option<&ConstructorMeta> {
        self.constructors.iter().find(|constructor| {
            constructor.public && constructor.params.is_empty() && constructor.construct.is_some()
        })
    }

    /// Iterates over the operations carrying the `marker`.
    #[inline]
    pub fn operations_with(&self, marker: Marker) -> impl Iterator<Item = &OperationMeta> + '_ {
        self.operations
            .iter()
            .filter(move |operation| operation.annotations.has(marker))
    }

    /// Iterates over the data members carrying the `marker`.
    #[inline]
    pub fn members_with(&self, marker: Marker) -> impl Iterator<Item = &MemberMeta> + '_ {
        self.members
            .iter()
            .filter(move |member| member.annotations.has(marker))
    }
}

/// A constructor of a script type.
#[derive(Clone, Debug)]
pub struct ConstructorMeta {
    pub name: &'static str,
    pub public: bool,
    pub params: Vec<ParamMeta>,

    /// Present only for constructors without parameters.
    pub construct: Option<ConstructFn>,
}

impl ConstructorMeta {
    /// A public parameterless constructor backed by the [Default]
    /// implementation of `T`.
    #[inline]
    pub fn default_of<T: Default + Send + Sync + 'static>() -> Self {
        fn construct<T: Default + Send + Sync + 'static>() -> Instance {
            Instance::new(T::default())
        }

        Self {
            name: "default",
            public: true,
            params: Vec::new(),
            construct: Some(construct::<T>),
        }
    }
}

/// The kind of receiver an operation takes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Receiver {
    /// `&self`: the instance is locked for shared access.
    Ref,
    /// `&mut self`: the instance is locked for exclusive access.
    Mut,
    /// No receiver.
    Static,
}

/// An operation (a method or a free function) offered for discovery.
#[derive(Clone, Debug)]
pub struct OperationMeta {
    pub origin: &'static RustOrigin,
    pub name: &'static str,
    pub annotations: Annotations,

    /// True if the operation has generic parameters.
    pub generic: bool,

    pub receiver: Receiver,

    /// Parameters, excluding the receiver.
    pub params: Vec<ParamMeta>,

    pub invoke: InvokeFn,
}

impl OperationMeta {
    /// Creates a non-generic `&self` operation without parameters and
    /// annotations.
    #[inline]
    pub fn new(name: &'static str, invoke: InvokeFn) -> Self {
        Self {
            origin: RustOrigin::nil(),
            name,
            annotations: Annotations::new(),
            generic: false,
            receiver: Receiver::Ref,
            params: Vec::new(),
            invoke,
        }
    }

    /// Returns true if the operation takes a single cancellation signal.
    #[inline]
    pub fn accepts_signal(&self) -> bool {
        match self.params.as_slice() {
            [param] => param.shape == ParamShape::Signal,
            _ => false,
        }
    }
}

/// A declared parameter of an operation.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ParamMeta {
    pub name: &'static str,
    pub shape: ParamShape,
}

impl ParamMeta {
    #[inline(always)]
    pub fn new(name: &'static str, shape: ParamShape) -> Self {
        Self { name, shape }
    }

    /// Returns the Rust name of the parameter's type.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        match self.shape {
            ParamShape::Signal => type_name::<Signal>(),
            ParamShape::Strings => "Vec<String>",
            ParamShape::Other(name) => name,
        }
    }
}

/// The type of a parameter as far as the discovery engine is concerned.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ParamShape {
    /// A cooperative cancellation [Signal].
    Signal,
    /// A sequence of strings, the conventional shape of program arguments.
    Strings,
    /// Any other type, by its Rust name.
    Other(&'static str),
}

/// The kind of receiver a data member belongs to.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum MemberReceiver {
    Instance,
    Static,
}

/// A data member (a field or a property) offered for discovery.
#[derive(Clone, Debug)]
pub struct MemberMeta {
    pub origin: &'static RustOrigin,
    pub name: &'static str,
    pub annotations: Annotations,
    pub receiver: MemberReceiver,
    pub kind: MemberKind,
}

impl MemberMeta {
    #[inline]
    pub fn new(name: &'static str, kind: MemberKind) -> Self {
        Self {
            origin: RustOrigin::nil(),
            name,
            annotations: Annotations::new(),
            receiver: MemberReceiver::Instance,
            kind,
        }
    }
}

#[derive(Clone)]
pub enum MemberKind {
    /// A member holding a [Value].
    Value {
        kind: ValueKind,

        /// True if the member can hold [Value::Nil].
        nullable: bool,

        get: GetFn,

        /// None for read-only members.
        set: Option<SetFn>,
    },

    /// A member holding a diagnostic [Sink].
    Sink { inject: InjectFn },
}

impl Debug for MemberKind {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Value {
                kind,
                nullable,
                set,
                ..
            } => formatter
                .debug_struct("Value")
                .field("kind", kind)
                .field("nullable", nullable)
                .field("writable", &set.is_some())
                .finish(),

            Self::Sink { .. } => formatter.write_str("Sink"),
        }
    }
}

/// An argument of a late-bound operation call.
#[derive(Clone, PartialEq, Debug)]
pub enum Arg {
    Value(Value),
    Signal(Signal),
}

impl Arg {
    /// Returns the Rust name of the argument's type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Value(value) => value.kind().name(),
            Self::Signal(..) => type_name::<Signal>(),
        }
    }
}

impl From<Value> for Arg {
    #[inline(always)]
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<Signal> for Arg {
    #[inline(always)]
    fn from(signal: Signal) -> Self {
        Self::Signal(signal)
    }
}

/// Returns a [ReleaseFn] that calls [Release::release] on an instance of `T`.
#[inline(always)]
pub fn release_fn<T: Release>() -> ReleaseFn {
    fn release<T: Release>(instance: &Instance) -> Result<(), InstanceError> {
        instance.write(|object: &mut T| object.release())
    }

    release::<T>
}
