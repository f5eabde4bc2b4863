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
    sync::{Arc, RwLock, TryLockError},
};

use crate::runtime::InstanceError;

/// A shared, type-erased object of a script type.
///
/// The Instance owns the object created by the script type's constructor.
/// Clones of the Instance refer to the same object. The object is protected
/// by a read-write lock: operations with a `&self` receiver share it, and
/// operations with a `&mut self` receiver lock it exclusively.
///
/// ```
/// use stagehand::runtime::Instance;
///
/// let instance = Instance::new(10u32);
///
/// instance.write(|value: &mut u32| *value += 5).unwrap();
///
/// assert_eq!(instance.read(|value: &u32| *value).unwrap(), 15);
/// assert!(instance.read(|value: &i32| *value).is_err());
/// ```
#[derive(Clone)]
pub struct Instance {
    inner: Arc<InstanceInner>,
}

struct InstanceInner {
    type_name: &'static str,
    type_id: TypeId,
    object: RwLock<Box<dyn Any + Send + Sync>>,
}

impl Debug for Instance {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_tuple("Instance")
            .field(&format_args!("{}", self.inner.type_name))
            .finish()
    }
}

impl PartialEq for Instance {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Instance {}

impl Instance {
    #[inline]
    pub fn new<T: Send + Sync + 'static>(object: T) -> Self {
        Self {
            inner: Arc::new(InstanceInner {
                type_name: type_name::<T>(),
                type_id: TypeId::of::<T>(),
                object: RwLock::new(Box::new(object)),
            }),
        }
    }

    /// Returns the Rust name of the object's type.
    #[inline(always)]
    pub fn type_name(&self) -> &'static str {
        self.inner.type_name
    }

    #[inline(always)]
    pub fn type_id(&self) -> TypeId {
        self.inner.type_id
    }

    #[inline(always)]
    pub fn is<T: 'static>(&self) -> bool {
        self.inner.type_id == TypeId::of::<T>()
    }

    /// Calls `f` with a shared reference to the object, blocking the current
    /// thread while another thread holds the exclusive lock.
    pub fn read<T: 'static, R>(&self, f: impl FnOnce(&T) -> R) -> Result<R, InstanceError> {
        let guard = self
            .inner
            .object
            .read()
            .unwrap_or_else(|poison| poison.into_inner());

        match guard.downcast_ref::<T>() {
            Some(object) => Ok(f(object)),
            None => Err(self.mismatch::<T>()),
        }
    }

    /// Calls `f` with an exclusive reference to the object, blocking the
    /// current thread while any other thread holds the lock.
    pub fn write<T: 'static, R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R, InstanceError> {
        let mut guard = self
            .inner
            .object
            .write()
            .unwrap_or_else(|poison| poison.into_inner());

        match guard.downcast_mut::<T>() {
            Some(object) => Ok(f(object)),
            None => Err(self.mismatch::<T>()),
        }
    }

    /// Like [read](Self::read), but returns [InstanceError::Busy] instead of
    /// blocking.
    pub fn try_read<T: 'static, R>(&self, f: impl FnOnce(&T) -> R) -> Result<R, InstanceError> {
        self.try_read_any(|object| match object.downcast_ref::<T>() {
            Some(object) => Ok(f(object)),
            None => Err(self.mismatch::<T>()),
        })?
    }

    /// Like [write](Self::write), but returns [InstanceError::Busy] instead
    /// of blocking.
    pub fn try_write<T: 'static, R>(
        &self,
        f: impl FnOnce(&mut T) -> R,
    ) -> Result<R, InstanceError> {
        self.try_write_any(|object| match object.downcast_mut::<T>() {
            Some(object) => Ok(f(object)),
            None => Err(self.mismatch::<T>()),
        })?
    }

    pub(crate) fn try_read_any<R>(
        &self,
        f: impl FnOnce(&(dyn Any + Send + Sync)) -> R,
    ) -> Result<R, InstanceError> {
        let guard = match self.inner.object.try_read() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poison)) => poison.into_inner(),
            Err(TryLockError::WouldBlock) => return Err(InstanceError::Busy),
        };

        Ok(f(guard.as_ref()))
    }

    pub(crate) fn try_write_any<R>(
        &self,
        f: impl FnOnce(&mut (dyn Any + Send + Sync)) -> R,
    ) -> Result<R, InstanceError> {
        let mut guard = match self.inner.object.try_write() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poison)) => poison.into_inner(),
            Err(TryLockError::WouldBlock) => return Err(InstanceError::Busy),
        };

        Ok(f(guard.as_mut()))
    }

    #[inline(always)]
    fn mismatch<T: 'static>(&self) -> InstanceError {
        InstanceError::TypeMismatch {
            expected: type_name::<T>(),
            actual: self.inner.type_name,
        }
    }
}

/// A script type that owns a resource which must be released explicitly.
///
/// When a script type implements this trait and exports the implementation
/// with `#[script] impl Release for MyScript`, the
/// [ScriptAssembly](crate::model::ScriptAssembly) calls
/// [release](Release::release) on the script's instance when the assembly is
/// released or dropped.
pub trait Release: Send + Sync + 'static {
    fn release(&mut self);
}

#[cfg(test)]
mod tests {
    use std::{sync::mpsc::channel, thread};

    use crate::runtime::{Instance, InstanceError};

    #[test]
    fn test_instance_busy() {
        let instance = Instance::new(String::from("foo"));
        let other = instance.clone();

        let (locked_sender, locked_receiver) = channel();
        let (release_sender, release_receiver) = channel::<()>();

        let worker = thread::spawn(move || {
            other
                .write(|_: &mut String| {
                    locked_sender.send(()).unwrap();
                    release_receiver.recv().unwrap();
                })
                .unwrap();
        });

        locked_receiver.recv().unwrap();

        assert_eq!(
            instance.try_read(|value: &String| value.len()),
            Err(InstanceError::Busy),
        );

        release_sender.send(()).unwrap();
        worker.join().unwrap();

        assert_eq!(instance.try_read(|value: &String| value.len()), Ok(3));
    }

    #[test]
    fn test_instance_identity() {
        let first = Instance::new(1u8);
        let second = Instance::new(1u8);

        assert_eq!(first, first.clone());
        assert_ne!(first, second);
        assert!(first.is::<u8>());
        assert_eq!(first.type_name(), "u8");
    }
}
