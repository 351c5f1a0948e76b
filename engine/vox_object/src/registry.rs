//! Runtime class registry.
//!
//! Maps class names to [`ClassInfo`]. Classes are registered parent first
//! and must be unregistered in exact reverse order, so a class can never
//! outlive its parent's registration.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::class::{ClassDescriptor, ClassInfo};
use crate::error::{ResultExt, VoxError, VoxResult};
use crate::object::{Object, ObjectRef};

/// Registry of classes by name.
#[derive(Default)]
pub struct ClassRegistry {
    classes: FxHashMap<Box<str>, Arc<ClassInfo>>,
    /// Registration order; the last entry is the only one that may be
    /// unregistered next.
    order: Vec<Arc<ClassInfo>>,
}

impl ClassRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a class.
    ///
    /// Fails with `DuplicateClass` if the name is taken and `MissingParent`
    /// if the parent has not been registered.
    pub fn register(&mut self, descriptor: ClassDescriptor) -> VoxResult<Arc<ClassInfo>> {
        if self.classes.contains_key(descriptor.name.as_str()) {
            return Err(VoxError::duplicate_class(&descriptor.name));
        }

        let parent = match descriptor.parent.as_deref() {
            Some(parent) => Some(
                self.classes
                    .get(parent)
                    .cloned()
                    .ok_or_else(|| VoxError::missing_parent(&descriptor.name, parent))?,
            ),
            None => None,
        };

        let info = Arc::new(ClassInfo::new(descriptor, parent));
        tracing::debug!(
            class = info.name(),
            inheritance = %info.inheritance(),
            size = info.size(),
            "registered class"
        );
        self.classes.insert(info.name().into(), Arc::clone(&info));
        self.order.push(Arc::clone(&info));
        Ok(info)
    }

    /// Unregister the most recently registered class.
    ///
    /// Unregistering out of order is an `ArgumentError`; unregistering a
    /// class with live instances violates the registry invariant and is
    /// fatal.
    pub fn unregister(&mut self, name: &str) -> VoxResult<()> {
        let Some(info) = self.classes.get(name) else {
            return Err(VoxError::unknown_class(name));
        };

        match self.order.last() {
            Some(last) if Arc::ptr_eq(last, info) => {}
            Some(last) => {
                return Err(VoxError::argument(format!(
                    "classes must be unregistered in reverse order: '{name}' requested, \
                     '{}' is next",
                    last.name()
                )));
            }
            None => return Err(VoxError::invariant("registry order list is empty")),
        }

        let live = info.live_instances();
        if live > 0 {
            return Err(VoxError::invariant(format!(
                "cannot unregister class '{name}': {live} live instance(s)"
            )));
        }

        self.order.pop();
        self.classes.remove(name);
        tracing::debug!(class = name, "unregistered class");
        Ok(())
    }

    /// Look up a class.
    pub fn find(&self, name: &str) -> VoxResult<Arc<ClassInfo>> {
        self.classes
            .get(name)
            .cloned()
            .ok_or_else(|| VoxError::unknown_class(name))
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// True if class `name` is `ancestor` or derives from it.
    pub fn is_subclass(&self, name: &str, ancestor: &str) -> VoxResult<bool> {
        Ok(self.find(name)?.is_a(ancestor))
    }

    /// Construct a new instance by class name.
    ///
    /// The instance starts with one reference. Init hooks run root class
    /// first; an init failure drops the half-built instance and is returned
    /// with context.
    pub fn new_object(&self, name: &str) -> VoxResult<ObjectRef> {
        let class = self.find(name)?;
        let Some(construct) = class.constructor() else {
            return Err(VoxError::argument(format!(
                "class '{name}' is abstract and cannot be constructed by name"
            )));
        };

        let mut data = construct();
        let mut chain: Vec<&ClassInfo> = class.ancestry().collect();
        chain.reverse();
        for level in chain {
            if let Some(init) = level.hooks().init {
                init(&mut *data).with_context("ClassRegistry::new_object", || {
                    format!("init hook of '{}' failed while creating '{name}'", level.name())
                })?;
            }
        }

        Ok(ObjectRef::from_object(Object::from_parts(&class, data)))
    }

    /// Live instances of exactly class `name`.
    pub fn live_instances(&self, name: &str) -> VoxResult<usize> {
        Ok(self.find(name)?.live_instances())
    }

    /// Live instances across every registered class.
    pub fn total_live(&self) -> usize {
        self.order.iter().map(|class| class.live_instances()).sum()
    }

    /// Registered class names in registration order.
    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|class| class.name())
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl std::fmt::Debug for ClassRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.order.iter()).finish()
    }
}

#[cfg(test)]
mod tests;
