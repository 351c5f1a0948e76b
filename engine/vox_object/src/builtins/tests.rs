use pretty_assertions::assert_eq;

use super::*;
use crate::registry::ClassRegistry;
use crate::value::Value;

fn registry() -> ClassRegistry {
    let mut registry = ClassRegistry::new();
    for descriptor in base_classes().into_iter().chain(container_classes()) {
        registry.register(descriptor).unwrap_or_else(|e| panic!("{e}"));
    }
    registry
}

#[test]
fn registration_order_is_parent_first() {
    let registry = registry();
    assert_eq!(
        registry.class_names().collect::<Vec<_>>(),
        vec!["Object", "Int", "Float", "String", "List", "Map"]
    );
    assert_eq!(registry.is_subclass("Map", "Object"), Ok(true));
}

#[test]
fn containers_need_base_classes() {
    let mut registry = ClassRegistry::new();
    let Err(err) = registry.register(container_classes().remove(0)) else {
        panic!("List registered without Object");
    };
    assert_eq!(err.code(), crate::error::ErrorCode::MissingParent);
}

#[test]
fn string_object_hooks() {
    let registry = registry();
    let a = registry.new_object(STRING_CLASS).unwrap_or_else(|e| panic!("{e}"));
    a.with_data_mut(|s: &mut String| s.push_str("hello"))
        .unwrap_or_else(|e| panic!("{e}"));

    let b = a.copy().unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(b.print(), Ok("hello".to_owned()));
    assert_eq!(a.compare(&b), Ok(true));

    b.with_data_mut(|s: &mut String| s.push('!'))
        .unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(a.compare(&b), Ok(false));
}

#[test]
fn list_object_holds_values() {
    let registry = registry();
    let list = registry.new_object(LIST_CLASS).unwrap_or_else(|e| panic!("{e}"));
    list.with_data_mut(|l: &mut List| {
        l.push_back(1);
        l.push_back("two");
    })
    .unwrap_or_else(|e| panic!("{e}"));

    assert_eq!(list.print(), Ok("(1 two)".to_owned()));
    let len = list.with_data(|l: &List| l.len()).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(len, 2);

    let copy = list.copy().unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(copy.compare(&list), Ok(true));
    assert_eq!(registry.live_instances(LIST_CLASS), Ok(2));
}

#[test]
fn map_object_compare() {
    let registry = registry();
    let a = registry.new_object(MAP_CLASS).unwrap_or_else(|e| panic!("{e}"));
    let b = registry.new_object(MAP_CLASS).unwrap_or_else(|e| panic!("{e}"));
    for obj in [&a, &b] {
        obj.with_data_mut(|m: &mut Map| m.set("pos", Value::from("n")))
            .unwrap_or_else(|e| panic!("{e}"));
    }
    assert_eq!(a.compare(&b), Ok(true));
}

#[test]
fn int_and_float_print() {
    let registry = registry();
    let n = registry.new_object(INT_CLASS).unwrap_or_else(|e| panic!("{e}"));
    let x = registry.new_object(FLOAT_CLASS).unwrap_or_else(|e| panic!("{e}"));
    x.with_data_mut(|v: &mut f32| *v = 0.5)
        .unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(n.print(), Ok("0".to_owned()));
    assert_eq!(x.print(), Ok("0.5".to_owned()));
    assert_eq!(n.compare(&x), Ok(false));
}
