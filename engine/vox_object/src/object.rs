//! Reference-counted dynamic instances.
//!
//! An [`Object`] pairs an [`ObjectHeader`] with type-erased instance data.
//! [`ObjectRef`] is the shared handle: cloning it is `incref`, dropping it is
//! `decref`, and its strong count is the object's reference count. When the
//! last handle goes away the dispose hook runs, then the destroy hooks from
//! the most derived class to the root, then the memory is released.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::class::{ClassInfo, InstanceData, ObjectHeader, TypeInfo};
use crate::error::{ResultExt, VoxError, VoxResult};

/// A dynamic instance of a registered class.
pub struct Object {
    header: ObjectHeader,
    data: RwLock<InstanceData>,
}

impl Object {
    pub(crate) fn from_parts(class: &Arc<ClassInfo>, data: InstanceData) -> Self {
        Object {
            header: ObjectHeader::new(class),
            data: RwLock::new(data),
        }
    }
}

impl TypeInfo for Object {
    fn header(&self) -> &ObjectHeader {
        &self.header
    }
}

impl Drop for Object {
    fn drop(&mut self) {
        let class = Arc::clone(self.header.class());
        let data = self.data.get_mut();

        if let Some(dispose) = class.find_hook(|hooks| hooks.dispose) {
            dispose(&mut **data);
        }
        for level in class.ancestry() {
            if let Some(destroy) = level.hooks().destroy {
                destroy(&mut **data);
            }
        }
        tracing::trace!(class = class.name(), "destroyed object");
    }
}

/// Shared handle to an [`Object`].
#[derive(Clone)]
pub struct ObjectRef(Arc<Object>);

impl ObjectRef {
    pub(crate) fn from_object(object: Object) -> Self {
        ObjectRef(Arc::new(object))
    }

    /// Current reference count.
    pub fn refcount(&self) -> usize {
        Arc::strong_count(&self.0)
    }

    /// Take another reference.
    #[must_use]
    pub fn incref(&self) -> ObjectRef {
        self.clone()
    }

    /// Release this reference. Returns true if it was the last one and the
    /// object was destroyed.
    pub fn decref(self) -> bool {
        Arc::into_inner(self.0).is_some()
    }

    /// Destroy the object now.
    ///
    /// Only valid at teardown, when the caller holds the last reference.
    /// Otherwise nothing is destroyed and the handle is handed back.
    pub fn force_delete(self) -> Result<(), ObjectRef> {
        match Arc::try_unwrap(self.0) {
            Ok(object) => {
                drop(object);
                Ok(())
            }
            Err(shared) => Err(ObjectRef(shared)),
        }
    }

    /// True if both handles point at the same object.
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn class_info(&self) -> &Arc<ClassInfo> {
        self.0.header.class()
    }

    /// Compare two objects.
    ///
    /// Identical handles are equal and objects of different classes are not.
    /// Otherwise the class's compare hook decides; a class without one
    /// signals `MethodNotImplemented`.
    pub fn compare(&self, other: &ObjectRef) -> VoxResult<bool> {
        if self.ptr_eq(other) {
            return Ok(true);
        }
        if !Arc::ptr_eq(self.class_info(), other.class_info()) {
            return Ok(false);
        }
        let compare = self
            .class_info()
            .find_hook(|hooks| hooks.compare)
            .ok_or_else(|| VoxError::method_not_implemented(self.class_name(), "compare"))?;

        let a = self.0.data.read();
        let b = other.0.data.read();
        let a: &dyn Any = &**a;
        let b: &dyn Any = &**b;
        Ok(compare(a, b))
    }

    /// Render the object with its class's print hook.
    pub fn print(&self) -> VoxResult<String> {
        let print = self
            .class_info()
            .find_hook(|hooks| hooks.print)
            .ok_or_else(|| VoxError::method_not_implemented(self.class_name(), "print"))?;
        let data = self.0.data.read();
        Ok(print(&**data))
    }

    /// Deep copy through the class's copy hook. The copy has its own
    /// reference count of one.
    pub fn copy(&self) -> VoxResult<ObjectRef> {
        let copy = self
            .class_info()
            .find_hook(|hooks| hooks.copy)
            .ok_or_else(|| VoxError::method_not_implemented(self.class_name(), "copy"))?;
        let data = {
            let guard = self.0.data.read();
            copy(&**guard).context("ObjectRef::copy", "copy hook failed")?
        };
        Ok(ObjectRef::from_object(Object::from_parts(
            self.class_info(),
            data,
        )))
    }

    /// `self` if it is a `name`, otherwise `TypeMismatch`.
    pub fn cast(&self, name: &str) -> VoxResult<&ObjectRef> {
        self.0.cast(name).map(|_| self)
    }

    /// Borrow the instance data as `T`.
    pub fn with_data<T: Any, R>(&self, f: impl FnOnce(&T) -> R) -> VoxResult<R> {
        let guard = self.0.data.read();
        let data: &dyn Any = &**guard;
        data.downcast_ref::<T>()
            .map(f)
            .ok_or_else(|| VoxError::type_mismatch(std::any::type_name::<T>(), self.class_name()))
    }

    /// Mutably borrow the instance data as `T`.
    pub fn with_data_mut<T: Any, R>(&self, f: impl FnOnce(&mut T) -> R) -> VoxResult<R> {
        let mut guard = self.0.data.write();
        let data: &mut dyn Any = &mut **guard;
        match data.downcast_mut::<T>() {
            Some(value) => Ok(f(value)),
            None => Err(VoxError::type_mismatch(
                std::any::type_name::<T>(),
                self.class_name(),
            )),
        }
    }
}

impl TypeInfo for ObjectRef {
    fn header(&self) -> &ObjectHeader {
        &self.0.header
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectRef({}, refs={})", self.class_name(), self.refcount())
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.print() {
            Ok(text) => f.write_str(&text),
            Err(_) => write!(f, "[{}]", self.class_name()),
        }
    }
}
