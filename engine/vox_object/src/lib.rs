//! Vox Object - object system for the Vox speech engine.
//!
//! This crate provides:
//! - The runtime class registry (`ClassRegistry`, `ClassDescriptor`, `ClassInfo`)
//! - Reference-counted dynamic instances (`Object`, `ObjectRef`)
//! - Feature values and containers (`Value`, `List`, `Map`, `iterator_get`)
//! - The engine-wide error type (`VoxError`, `ErrorCode`, `FatalPolicy`)
//!
//! # Class Registry
//!
//! Classes are registered by name with single inheritance. The registry is
//! the extension point for plugin classes: a plugin registers descriptors,
//! constructs instances with `ClassRegistry::new_object`, and stores them in
//! feature maps as `Value::Object`.
//!
//! # Census
//!
//! Every instance carries an `ObjectHeader` that counts itself against its
//! class while alive. `ClassRegistry::total_live` reaching zero after a
//! teardown is how destroy cascades are checked.

mod builtins;
mod class;
mod error;
mod iterator;
mod list;
mod map;
mod object;
mod registry;
mod value;

pub use builtins::{
    base_classes, container_classes, FLOAT_CLASS, INT_CLASS, LIST_CLASS, MAP_CLASS,
    OBJECT_CLASS, STRING_CLASS,
};
pub use class::{
    Ancestry, ClassDescriptor, ClassHooks, ClassInfo, CompareHook, Constructor, CopyHook,
    DestroyHook, DisposeHook, InitHook, InstanceData, ObjectHeader, PrintHook, TypeInfo,
};
pub use error::{ErrorCode, ErrorFrame, FatalPolicy, ResultExt, VoxError, VoxResult};
pub use iterator::{iterator_get, Container, ContainerIter, Entry};
pub use list::List;
pub use map::Map;
pub use object::{Object, ObjectRef};
pub use registry::ClassRegistry;
pub use value::Value;
