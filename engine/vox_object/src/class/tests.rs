use pretty_assertions::assert_eq;

use super::*;
use crate::error::ErrorCode;

fn chain() -> (Arc<ClassInfo>, Arc<ClassInfo>, Arc<ClassInfo>) {
    let root = Arc::new(ClassInfo::new(ClassDescriptor::new("Object", None), None));
    let item = Arc::new(ClassInfo::new(
        ClassDescriptor::new("Item", Some("Object")),
        Some(Arc::clone(&root)),
    ));
    let word = Arc::new(ClassInfo::new(
        ClassDescriptor::of::<u32>("WordItem", Some("Item")),
        Some(Arc::clone(&item)),
    ));
    (root, item, word)
}

struct Tagged {
    header: ObjectHeader,
}

impl TypeInfo for Tagged {
    fn header(&self) -> &ObjectHeader {
        &self.header
    }
}

#[test]
fn ancestry_walks_to_root() {
    let (_, _, word) = chain();
    let names: Vec<&str> = word.ancestry().map(ClassInfo::name).collect();
    assert_eq!(names, vec!["WordItem", "Item", "Object"]);
    assert_eq!(word.inheritance(), "Object:Item:WordItem");
}

#[test]
fn is_a_covers_self_and_ancestors_only() {
    let (root, item, word) = chain();
    assert!(word.is_a("WordItem"));
    assert!(word.is_a("Item"));
    assert!(word.is_a("Object"));
    assert!(item.is_a("Object"));
    assert!(!item.is_a("WordItem"));
    assert!(!root.is_a("Item"));
}

#[test]
fn abstract_and_constructible_descriptors() {
    let (root, _, word) = chain();
    assert!(root.is_abstract());
    assert!(!word.is_abstract());
    assert_eq!(word.size(), std::mem::size_of::<u32>());
    let Some(construct) = word.constructor() else {
        panic!("constructible class has no constructor");
    };
    let data = construct();
    assert_eq!((*data).downcast_ref::<u32>(), Some(&0));
}

#[test]
fn header_tracks_live_instances() {
    let (_, item, _) = chain();
    assert_eq!(item.live_instances(), 0);
    let a = ObjectHeader::new(&item);
    let b = ObjectHeader::new(&item);
    assert_eq!(item.live_instances(), 2);
    drop(a);
    assert_eq!(item.live_instances(), 1);
    drop(b);
    assert_eq!(item.live_instances(), 0);
}

#[test]
fn find_hook_prefers_nearest_class() {
    fn root_print(_: &dyn Any) -> String {
        "root".to_owned()
    }
    fn leaf_print(_: &dyn Any) -> String {
        "leaf".to_owned()
    }

    let root = Arc::new(ClassInfo::new(
        ClassDescriptor::new("Object", None).with_hooks(ClassHooks {
            print: Some(root_print),
            ..ClassHooks::default()
        }),
        None,
    ));
    let middle = Arc::new(ClassInfo::new(
        ClassDescriptor::new("Middle", Some("Object")),
        Some(Arc::clone(&root)),
    ));
    let leaf = Arc::new(ClassInfo::new(
        ClassDescriptor::new("Leaf", Some("Middle")).with_hooks(ClassHooks {
            print: Some(leaf_print),
            ..ClassHooks::default()
        }),
        Some(Arc::clone(&middle)),
    ));

    let render = |class: &ClassInfo| class.find_hook(|h| h.print).map(|p| p(&()));
    assert_eq!(render(&*leaf).as_deref(), Some("leaf"));
    assert_eq!(render(&*middle).as_deref(), Some("root"));
    assert!(middle.find_hook(|h| h.copy).is_none());
}

#[test]
fn type_info_cast() {
    let (_, _, word) = chain();
    let tagged = Tagged {
        header: ObjectHeader::new(&word),
    };
    assert_eq!(tagged.class_name(), "WordItem");
    assert!(tagged.is_type("Item"));
    assert!(tagged.cast("Object").is_ok());

    let Err(err) = tagged.cast("Relation") else {
        panic!("cast to an unrelated class succeeded");
    };
    assert_eq!(err.code(), ErrorCode::TypeMismatch);
}
