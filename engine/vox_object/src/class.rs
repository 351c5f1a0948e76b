//! Class descriptors, registered class info and the per-instance header.
//!
//! A [`ClassDescriptor`] is what a module hands to the registry. Once
//! registered it becomes a [`ClassInfo`]: the parent is resolved to a
//! pointer, and a live-instance counter starts tracking every
//! [`ObjectHeader`] created for the class.
//!
//! Every instance in the engine carries an `ObjectHeader`. Dynamic objects
//! built by name (`ClassRegistry::new_object`) and the statically typed graph
//! nodes in `vox_hrg` share this header, so type tests and instance census
//! work the same way for both.

use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::error::{VoxError, VoxResult};

/// Type-erased instance data.
pub type InstanceData = Box<dyn Any + Send + Sync>;

/// Builds the default instance data for a class.
pub type Constructor = fn() -> InstanceData;

/// Runs after construction, root class first.
pub type InitHook = fn(&mut dyn Any) -> VoxResult<()>;

/// Runs on destruction, most derived class first.
pub type DestroyHook = fn(&mut dyn Any);

/// Runs once when the last reference is released, before the destroy hooks.
pub type DisposeHook = fn(&mut dyn Any);

/// Compares two instances of the same class.
pub type CompareHook = fn(&dyn Any, &dyn Any) -> bool;

/// Renders an instance as text.
pub type PrintHook = fn(&dyn Any) -> String;

/// Produces a copy of the instance data.
pub type CopyHook = fn(&dyn Any) -> VoxResult<InstanceData>;

/// Optional per-class hooks.
///
/// `compare`, `print`, `copy` and `dispose` are inherited: a class without
/// its own hook uses the nearest ancestor's. `init` and `destroy` run for
/// every class in the chain.
#[derive(Clone, Copy, Default)]
pub struct ClassHooks {
    pub init: Option<InitHook>,
    pub destroy: Option<DestroyHook>,
    pub dispose: Option<DisposeHook>,
    pub compare: Option<CompareHook>,
    pub print: Option<PrintHook>,
    pub copy: Option<CopyHook>,
}

impl fmt::Debug for ClassHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassHooks")
            .field("init", &self.init.is_some())
            .field("destroy", &self.destroy.is_some())
            .field("dispose", &self.dispose.is_some())
            .field("compare", &self.compare.is_some())
            .field("print", &self.print.is_some())
            .field("copy", &self.copy.is_some())
            .finish()
    }
}

/// Description of a class before registration.
#[derive(Clone, Debug)]
pub struct ClassDescriptor {
    /// Unique class name.
    pub name: String,
    /// Parent class name; `None` only for a root class.
    pub parent: Option<String>,
    /// Size of the instance data in bytes (informational).
    pub size: usize,
    /// Builds instance data for `new_object`. Abstract classes have none.
    pub construct: Option<Constructor>,
    pub hooks: ClassHooks,
}

impl ClassDescriptor {
    /// An abstract class: it can be a parent and a type tag, but cannot be
    /// constructed by name.
    pub fn new(name: impl Into<String>, parent: Option<&str>) -> Self {
        ClassDescriptor {
            name: name.into(),
            parent: parent.map(str::to_owned),
            size: 0,
            construct: None,
            hooks: ClassHooks::default(),
        }
    }

    /// A constructible class whose instance data is `T::default()`.
    pub fn of<T>(name: impl Into<String>, parent: Option<&str>) -> Self
    where
        T: Any + Send + Sync + Default,
    {
        ClassDescriptor {
            name: name.into(),
            parent: parent.map(str::to_owned),
            size: std::mem::size_of::<T>(),
            construct: Some(construct_default::<T>),
            hooks: ClassHooks::default(),
        }
    }

    #[must_use]
    pub fn with_hooks(mut self, hooks: ClassHooks) -> Self {
        self.hooks = hooks;
        self
    }
}

fn construct_default<T>() -> InstanceData
where
    T: Any + Send + Sync + Default,
{
    Box::new(T::default())
}

/// A registered class.
pub struct ClassInfo {
    name: Box<str>,
    parent: Option<Arc<ClassInfo>>,
    size: usize,
    construct: Option<Constructor>,
    hooks: ClassHooks,
    live: AtomicUsize,
}

impl ClassInfo {
    pub(crate) fn new(descriptor: ClassDescriptor, parent: Option<Arc<ClassInfo>>) -> Self {
        ClassInfo {
            name: descriptor.name.into_boxed_str(),
            parent,
            size: descriptor.size,
            construct: descriptor.construct,
            hooks: descriptor.hooks,
            live: AtomicUsize::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&Arc<ClassInfo>> {
        self.parent.as_ref()
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn hooks(&self) -> &ClassHooks {
        &self.hooks
    }

    pub(crate) fn constructor(&self) -> Option<Constructor> {
        self.construct
    }

    pub fn is_abstract(&self) -> bool {
        self.construct.is_none()
    }

    /// Number of live instances of exactly this class.
    pub fn live_instances(&self) -> usize {
        self.live.load(Ordering::Acquire)
    }

    /// This class followed by its ancestors, ending at the root.
    pub fn ancestry(&self) -> Ancestry<'_> {
        Ancestry { next: Some(self) }
    }

    /// True if `name` is this class or one of its ancestors.
    pub fn is_a(&self, name: &str) -> bool {
        self.ancestry().any(|class| class.name() == name)
    }

    /// The inheritance chain rendered root first, e.g. `Object:Item`.
    pub fn inheritance(&self) -> String {
        let mut names: Vec<&str> = self.ancestry().map(ClassInfo::name).collect();
        names.reverse();
        names.join(":")
    }

    /// Nearest hook of a kind, searching this class then its ancestors.
    pub(crate) fn find_hook<H: Copy>(
        &self,
        select: impl Fn(&ClassHooks) -> Option<H>,
    ) -> Option<H> {
        self.ancestry().find_map(|class| select(&class.hooks))
    }
}

impl fmt::Debug for ClassInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassInfo")
            .field("name", &self.name)
            .field("inheritance", &self.inheritance())
            .field("size", &self.size)
            .field("live", &self.live_instances())
            .finish_non_exhaustive()
    }
}

/// Iterator over a class and its ancestors.
pub struct Ancestry<'a> {
    next: Option<&'a ClassInfo>,
}

impl<'a> Iterator for Ancestry<'a> {
    type Item = &'a ClassInfo;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.parent.as_deref();
        Some(current)
    }
}

/// Class pointer embedded in every instance.
///
/// Creating a header counts a live instance of its class; dropping it
/// releases the count. Not `Clone`: a copied instance gets a fresh header
/// from [`ObjectHeader::new`].
pub struct ObjectHeader {
    class: Arc<ClassInfo>,
}

impl ObjectHeader {
    pub fn new(class: &Arc<ClassInfo>) -> Self {
        class.live.fetch_add(1, Ordering::AcqRel);
        ObjectHeader {
            class: Arc::clone(class),
        }
    }

    pub fn class(&self) -> &Arc<ClassInfo> {
        &self.class
    }
}

impl Drop for ObjectHeader {
    fn drop(&mut self) {
        self.class.live.fetch_sub(1, Ordering::AcqRel);
    }
}

impl fmt::Debug for ObjectHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectHeader({})", self.class.name())
    }
}

/// Runtime type information for anything carrying an [`ObjectHeader`].
pub trait TypeInfo {
    fn header(&self) -> &ObjectHeader;

    fn class(&self) -> &ClassInfo {
        self.header().class()
    }

    fn class_name(&self) -> &str {
        self.class().name()
    }

    /// True if `name` is anywhere in this instance's class chain.
    fn is_type(&self, name: &str) -> bool {
        self.class().is_a(name)
    }

    /// `self` if it is a `name`, otherwise `TypeMismatch`.
    fn cast(&self, name: &str) -> VoxResult<&Self> {
        if self.is_type(name) {
            Ok(self)
        } else {
            Err(VoxError::type_mismatch(name, self.class_name()))
        }
    }
}

#[cfg(test)]
mod tests;
