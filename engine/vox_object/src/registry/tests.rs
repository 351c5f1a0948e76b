use std::any::Any;

use pretty_assertions::assert_eq;

use super::*;
use crate::class::ClassHooks;
use crate::error::ErrorCode;

#[derive(Default)]
struct Counter {
    value: i32,
    steps: Vec<&'static str>,
}

fn init_root(data: &mut dyn Any) -> VoxResult<()> {
    if let Some(counter) = data.downcast_mut::<Counter>() {
        counter.steps.push("root");
    }
    Ok(())
}

fn init_leaf(data: &mut dyn Any) -> VoxResult<()> {
    if let Some(counter) = data.downcast_mut::<Counter>() {
        counter.steps.push("leaf");
        counter.value = 7;
    }
    Ok(())
}

fn init_fails(_: &mut dyn Any) -> VoxResult<()> {
    Err(VoxError::argument("refusing to initialise"))
}

fn registry() -> ClassRegistry {
    let mut registry = ClassRegistry::new();
    registry
        .register(ClassDescriptor::new("Object", None))
        .unwrap_or_else(|e| panic!("{e}"));
    registry
}

#[test]
fn register_and_find() {
    let mut registry = registry();
    let info = registry
        .register(ClassDescriptor::of::<i32>("Int", Some("Object")))
        .unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(info.inheritance(), "Object:Int");

    let Ok(found) = registry.find("Int") else {
        panic!("Int not found");
    };
    assert!(Arc::ptr_eq(&found, &info));
    assert!(registry.is_registered("Int"));
    assert_eq!(registry.is_subclass("Int", "Object"), Ok(true));
    assert_eq!(registry.len(), 2);
    assert_eq!(registry.class_names().collect::<Vec<_>>(), vec!["Object", "Int"]);
}

#[test]
fn duplicate_and_missing_parent_are_rejected() {
    let mut registry = registry();
    let dup = registry.register(ClassDescriptor::new("Object", None));
    assert_eq!(dup.map(|_| ()).map_err(|e| e.code()), Err(ErrorCode::DuplicateClass));

    let orphan = registry.register(ClassDescriptor::new("Phone", Some("Segment")));
    assert_eq!(orphan.map(|_| ()).map_err(|e| e.code()), Err(ErrorCode::MissingParent));
    assert!(!registry.is_registered("Phone"));
}

#[test]
fn unknown_class_lookup() {
    let registry = registry();
    let err = registry.find("SArrayFloat").map(|_| ()).map_err(|e| e.code());
    assert_eq!(err, Err(ErrorCode::UnknownClass));
    let err = registry.new_object("SArrayFloat").map(|_| ()).map_err(|e| e.code());
    assert_eq!(err, Err(ErrorCode::UnknownClass));
}

#[test]
fn abstract_class_cannot_be_constructed() {
    let registry = registry();
    let err = registry.new_object("Object").map(|_| ()).map_err(|e| e.code());
    assert_eq!(err, Err(ErrorCode::ArgumentError));
}

#[test]
fn init_hooks_run_root_first() {
    let mut registry = registry();
    registry
        .register(
            ClassDescriptor::of::<Counter>("Base", Some("Object")).with_hooks(ClassHooks {
                init: Some(init_root),
                ..ClassHooks::default()
            }),
        )
        .unwrap_or_else(|e| panic!("{e}"));
    registry
        .register(
            ClassDescriptor::of::<Counter>("Derived", Some("Base")).with_hooks(ClassHooks {
                init: Some(init_leaf),
                ..ClassHooks::default()
            }),
        )
        .unwrap_or_else(|e| panic!("{e}"));

    let obj = registry.new_object("Derived").unwrap_or_else(|e| panic!("{e}"));
    let (value, steps) = obj
        .with_data(|c: &Counter| (c.value, c.steps.clone()))
        .unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(value, 7);
    assert_eq!(steps, vec!["root", "leaf"]);
    assert_eq!(registry.live_instances("Derived"), Ok(1));
    assert_eq!(registry.live_instances("Base"), Ok(0));
}

#[test]
fn failed_init_leaves_no_instance() {
    let mut registry = registry();
    registry
        .register(
            ClassDescriptor::of::<Counter>("Broken", Some("Object")).with_hooks(ClassHooks {
                init: Some(init_fails),
                ..ClassHooks::default()
            }),
        )
        .unwrap_or_else(|e| panic!("{e}"));

    let Err(err) = registry.new_object("Broken") else {
        panic!("init failure was swallowed");
    };
    assert_eq!(err.code(), ErrorCode::ArgumentError);
    assert_eq!(err.context()[0].operation, "ClassRegistry::new_object");
    assert_eq!(registry.total_live(), 0);
}

#[test]
fn unregister_in_reverse_order_only() {
    let mut registry = registry();
    registry
        .register(ClassDescriptor::of::<i32>("Int", Some("Object")))
        .unwrap_or_else(|e| panic!("{e}"));

    let err = registry.unregister("Object").map_err(|e| e.code());
    assert_eq!(err, Err(ErrorCode::ArgumentError));

    assert_eq!(registry.unregister("Int"), Ok(()));
    assert_eq!(registry.unregister("Object"), Ok(()));
    assert!(registry.is_empty());

    let err = registry.unregister("Object").map_err(|e| e.code());
    assert_eq!(err, Err(ErrorCode::UnknownClass));
}

#[test]
fn unregister_with_live_instances_is_fatal() {
    let mut registry = registry();
    registry
        .register(ClassDescriptor::of::<i32>("Int", Some("Object")))
        .unwrap_or_else(|e| panic!("{e}"));
    let obj = registry.new_object("Int").unwrap_or_else(|e| panic!("{e}"));

    let Err(err) = registry.unregister("Int") else {
        panic!("unregistered a class with a live instance");
    };
    assert_eq!(err.code(), ErrorCode::StructuralError);
    assert!(err.is_fatal());

    assert!(obj.decref());
    assert_eq!(registry.unregister("Int"), Ok(()));
}
