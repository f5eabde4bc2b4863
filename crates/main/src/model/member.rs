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

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use compact_str::CompactString;
use lady_deirdre::arena::Id;

use crate::{
    model::ScriptId,
    runtime::{Arg, Instance, InvokeError, InvokeFn, Signal, Value},
};

/// A bound, invocable wrapper around one discovered operation.
///
/// The member holds the operation's late-bound call function, the instance
/// the operation is bound to (None for static operations and for the
/// fallback entry point), and the default arguments.
///
/// Invocation may take arbitrary time and should normally happen on a worker
/// thread. The engine does not serialize the invocations: the instance lock
/// only protects the instance's memory for the duration of each call.
#[derive(Clone, Debug)]
pub struct InvocableMember {
    id: Id,
    name: CompactString,
    description: Option<CompactString>,
    group: Option<CompactString>,
    operation: &'static str,
    invoke: InvokeFn,
    instance: Option<Instance>,
    default_args: Vec<Arg>,
    accepts_signal: bool,
    once: bool,
    done: Arc<AtomicBool>,
    parent: ScriptId,
}

impl InvocableMember {
    #[inline(always)]
    pub(crate) fn new(operation: &'static str, invoke: InvokeFn) -> Self {
        Self {
            id: Id::new(),
            name: CompactString::from(operation),
            description: None,
            group: None,
            operation,
            invoke,
            instance: None,
            default_args: Vec::new(),
            accepts_signal: false,
            once: false,
            done: Arc::new(AtomicBool::new(false)),
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
    pub(crate) fn with_instance(mut self, instance: Option<Instance>) -> Self {
        self.instance = instance;
        self
    }

    #[inline(always)]
    pub(crate) fn with_default_args(mut self, args: Vec<Arg>) -> Self {
        self.default_args = args;
        self
    }

    #[inline(always)]
    pub(crate) fn accepting_signal(mut self, accepts_signal: bool) -> Self {
        self.accepts_signal = accepts_signal;
        self
    }

    #[inline(always)]
    pub(crate) fn running_once(mut self, once: bool) -> Self {
        self.once = once;
        self
    }

    #[inline(always)]
    pub(crate) fn set_parent(&mut self, parent: ScriptId) {
        self.parent = parent;
    }

    #[inline(always)]
    pub fn id(&self) -> Id {
        self.id
    }

    /// The display name: the explicit `name` annotation or the operation's
    /// identifier.
    #[inline(always)]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline(always)]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The explicit group of a mini script. None for the lifecycle members
    /// and for the mini scripts in the default group.
    #[inline(always)]
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// The Rust identifier of the wrapped operation.
    #[inline(always)]
    pub fn operation(&self) -> &'static str {
        self.operation
    }

    #[inline(always)]
    pub fn instance(&self) -> Option<&Instance> {
        self.instance.as_ref()
    }

    #[inline(always)]
    pub fn default_args(&self) -> &[Arg] {
        &self.default_args
    }

    /// Returns true if the operation takes a cancellation [Signal].
    #[inline(always)]
    pub fn accepts_signal(&self) -> bool {
        self.accepts_signal
    }

    /// Returns true if the member runs at most once.
    #[inline(always)]
    pub fn is_once(&self) -> bool {
        self.once
    }

    /// Returns true if a run-once member has already been invoked.
    #[inline(always)]
    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }

    /// Returns the identifier of the owning script.
    ///
    /// The value is None only while the owning script is under construction.
    #[inline(always)]
    pub fn parent(&self) -> Option<ScriptId> {
        match self.parent.is_nil() {
            true => None,
            false => Some(self.parent),
        }
    }

    /// Calls the operation with its default arguments.
    ///
    /// If the operation accepts a cancellation signal, the `signal` is passed
    /// to it (or a fresh inactive signal if None). Otherwise the `signal` is
    /// ignored.
    ///
    /// A run-once member returns [Value::Nil] without calling the operation
    /// on every invocation after the first one.
    pub fn invoke(&self, signal: Option<&Signal>) -> Result<Value, InvokeError> {
        match self.accepts_signal {
            true => {
                let signal = signal.cloned().unwrap_or_default();

                self.invoke_with(&[Arg::Signal(signal)])
            }

            false => self.invoke_with(&self.default_args),
        }
    }

    /// Calls the operation with the explicit `args`.
    pub fn invoke_with(&self, args: &[Arg]) -> Result<Value, InvokeError> {
        if self.once && self.done.swap(true, Ordering::AcqRel) {
            return Ok(Value::Nil);
        }

        (self.invoke)(self.instance.as_ref(), args)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        model::InvocableMember,
        runtime::{Instance, Signal, Value, __intrinsics},
    };

    #[test]
    fn test_member_invocation() {
        let instance = Instance::new(0usize);

        let member = InvocableMember::new("count", |instance, args| {
            __intrinsics::no_args(args, "count")?;
            __intrinsics::invoke_mut(instance, "count", |counter: &mut usize| {
                *counter += 1;
                *counter
            })
        })
        .with_instance(Some(instance.clone()));

        assert_eq!(member.name(), "count");
        assert_eq!(member.parent(), None);
        assert_eq!(member.invoke(None), Ok(Value::Usize(1)));
        assert_eq!(member.invoke(Some(&Signal::new())), Ok(Value::Usize(2)));
        assert_eq!(instance.read(|counter: &usize| *counter), Ok(2));
    }

    #[test]
    fn test_member_signal() {
        let member = InvocableMember::new("wait", |_, args| {
            let signal = __intrinsics::signal_arg(args, "wait")?;

            Ok(Value::Bool(signal.is_active()))
        })
        .accepting_signal(true);

        let signal = Signal::new();

        assert_eq!(member.invoke(Some(&signal)), Ok(Value::Bool(false)));

        signal.activate();

        assert_eq!(member.invoke(Some(&signal)), Ok(Value::Bool(true)));
        assert_eq!(member.invoke(None), Ok(Value::Bool(false)));
    }

    #[test]
    fn test_member_once() {
        let member = InvocableMember::new("setup", |_, _| Ok(Value::Bool(true))).running_once(true);

        assert!(!member.is_done());
        assert_eq!(member.invoke(None), Ok(Value::Bool(true)));
        assert!(member.is_done());
        assert_eq!(member.invoke(None), Ok(Value::Nil));
        assert_eq!(member.clone().invoke(None), Ok(Value::Nil));
    }
}
