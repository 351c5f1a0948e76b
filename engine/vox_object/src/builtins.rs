//! Builtin classes.
//!
//! Two groups, each registered by its own engine module: the base classes
//! (`Object`, `Int`, `Float`, `String`) and the containers (`List`, `Map`).
//! Descriptors are returned in registration order, parents first.

use std::any::Any;
use std::fmt::Display;

use crate::class::{ClassDescriptor, ClassHooks, InstanceData};
use crate::error::{VoxError, VoxResult};
use crate::list::List;
use crate::map::Map;

pub const OBJECT_CLASS: &str = "Object";
pub const INT_CLASS: &str = "Int";
pub const FLOAT_CLASS: &str = "Float";
pub const STRING_CLASS: &str = "String";
pub const LIST_CLASS: &str = "List";
pub const MAP_CLASS: &str = "Map";

/// `Object`, `Int`, `Float` and `String`.
pub fn base_classes() -> Vec<ClassDescriptor> {
    vec![
        ClassDescriptor::new(OBJECT_CLASS, None),
        ClassDescriptor::of::<i32>(INT_CLASS, Some(OBJECT_CLASS)).with_hooks(ClassHooks {
            compare: Some(compare_eq::<i32>),
            print: Some(print_display::<i32>),
            copy: Some(copy_clone::<i32>),
            ..ClassHooks::default()
        }),
        ClassDescriptor::of::<f32>(FLOAT_CLASS, Some(OBJECT_CLASS)).with_hooks(ClassHooks {
            compare: Some(compare_eq::<f32>),
            print: Some(print_display::<f32>),
            copy: Some(copy_clone::<f32>),
            ..ClassHooks::default()
        }),
        ClassDescriptor::of::<String>(STRING_CLASS, Some(OBJECT_CLASS)).with_hooks(ClassHooks {
            compare: Some(compare_eq::<String>),
            print: Some(print_display::<String>),
            copy: Some(copy_clone::<String>),
            ..ClassHooks::default()
        }),
    ]
}

/// `List` and `Map`. Requires the base classes.
pub fn container_classes() -> Vec<ClassDescriptor> {
    vec![
        ClassDescriptor::of::<List>(LIST_CLASS, Some(OBJECT_CLASS)).with_hooks(ClassHooks {
            compare: Some(compare_list),
            print: Some(print_display::<List>),
            copy: Some(copy_clone::<List>),
            ..ClassHooks::default()
        }),
        ClassDescriptor::of::<Map>(MAP_CLASS, Some(OBJECT_CLASS)).with_hooks(ClassHooks {
            compare: Some(compare_map),
            print: Some(print_display::<Map>),
            copy: Some(copy_clone::<Map>),
            ..ClassHooks::default()
        }),
    ]
}

fn compare_eq<T: PartialEq + 'static>(a: &dyn Any, b: &dyn Any) -> bool {
    match (a.downcast_ref::<T>(), b.downcast_ref::<T>()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

// Nested objects without a compare hook make the containers unequal.
fn compare_list(a: &dyn Any, b: &dyn Any) -> bool {
    match (a.downcast_ref::<List>(), b.downcast_ref::<List>()) {
        (Some(a), Some(b)) => a.compare(b).unwrap_or(false),
        _ => false,
    }
}

fn compare_map(a: &dyn Any, b: &dyn Any) -> bool {
    match (a.downcast_ref::<Map>(), b.downcast_ref::<Map>()) {
        (Some(a), Some(b)) => a.compare(b).unwrap_or(false),
        _ => false,
    }
}

fn print_display<T: Display + 'static>(data: &dyn Any) -> String {
    data.downcast_ref::<T>()
        .map(ToString::to_string)
        .unwrap_or_default()
}

fn copy_clone<T: Clone + Send + Sync + 'static>(data: &dyn Any) -> VoxResult<InstanceData> {
    data.downcast_ref::<T>()
        .map(|value| Box::new(value.clone()) as InstanceData)
        .ok_or_else(|| VoxError::type_mismatch(std::any::type_name::<T>(), "instance data"))
}

#[cfg(test)]
mod tests;
