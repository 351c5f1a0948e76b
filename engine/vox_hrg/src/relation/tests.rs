#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;
use vox_object::{ErrorCode, TypeInfo};

use super::*;
use crate::test_helpers::registry;

fn named(rel: &Relation) -> Vec<String> {
    rel.iter().map(|item| item.name().unwrap_or_default()).collect()
}

fn append_named(rel: &mut Relation, name: &str) -> ItemId {
    let id = rel.append(None).unwrap();
    rel.get(id).unwrap().set_name(name);
    id
}

#[test]
fn empty_relation_has_no_head_or_tail() {
    let (_registry, classes) = registry();
    let mut rel = Relation::new("Word", &classes).unwrap();
    assert!(rel.head().is_none());
    assert!(rel.tail().is_none());
    assert!(rel.is_empty());

    rel.append(None).unwrap();
    assert_eq!(rel.head(), rel.tail());
    assert_eq!(rel.len(), 1);
    rel.verify().unwrap();
}

#[test]
fn empty_name_is_rejected() {
    let (_registry, classes) = registry();
    let err = Relation::new("", &classes).map(|_| ()).map_err(|e| e.code());
    assert_eq!(err, Err(ErrorCode::ArgumentError));
}

#[test]
fn append_prepend_and_insert_keep_order() {
    let (_registry, classes) = registry();
    let mut rel = Relation::new("Word", &classes).unwrap();
    let b = append_named(&mut rel, "b");
    let d = append_named(&mut rel, "d");

    let a = rel.prepend(None).unwrap();
    rel.get(a).unwrap().set_name("a");
    let c = rel.insert_after(b, None).unwrap();
    rel.get(c).unwrap().set_name("c");
    let e = rel.insert_after(d, None).unwrap();
    rel.get(e).unwrap().set_name("e");
    let z = rel.insert_before(a, None).unwrap();
    rel.get(z).unwrap().set_name("z");

    assert_eq!(named(&rel), vec!["z", "a", "b", "c", "d", "e"]);
    assert_eq!(rel.head().map(|i| i.id()), Some(z));
    assert_eq!(rel.tail().map(|i| i.id()), Some(e));
    rel.verify().unwrap();
}

#[test]
fn daughters_form_a_chain_under_their_parent() {
    let (_registry, classes) = registry();
    let mut rel = Relation::new("SylStructure", &classes).unwrap();
    let word = append_named(&mut rel, "hello");
    let s1 = rel.add_daughter(word, None).unwrap();
    let s2 = rel.add_daughter(word, None).unwrap();
    let s0 = rel.insert_before(s1, None).unwrap();

    let parent = rel.get(word).unwrap();
    let ids: Vec<ItemId> = parent.daughters().map(|d| d.id()).collect();
    assert_eq!(ids, vec![s0, s1, s2]);
    assert_eq!(parent.daughter().map(|d| d.id()), Some(s0));
    assert_eq!(parent.last_daughter().map(|d| d.id()), Some(s2));
    assert_eq!(rel.get(s2).unwrap().parent(), Some(parent));

    // daughters stay out of the top level
    assert_eq!(rel.iter().count(), 1);
    assert_eq!(rel.tail().map(|i| i.id()), Some(word));
    assert_eq!(rel.len(), 4);
    rel.verify().unwrap();
}

#[test]
fn traverse_is_pre_order() {
    let (_registry, classes) = registry();
    let mut rel = Relation::new("Phrase", &classes).unwrap();
    let p1 = append_named(&mut rel, "p1");
    let p2 = append_named(&mut rel, "p2");
    for (parent, name) in [(p1, "w1"), (p1, "w2"), (p2, "w3")] {
        let w = rel.add_daughter(parent, None).unwrap();
        rel.get(w).unwrap().set_name(name);
    }

    let order: Vec<String> = rel.traverse().filter_map(|i| i.name()).collect();
    assert_eq!(order, vec!["p1", "w1", "w2", "p2", "w3"]);
    assert_eq!(rel.to_string(), "Phrase:\n  p1\n    w1\n    w2\n  p2\n    w3\n");
}

#[test]
fn delete_relinks_neighbours_and_drops_subtree() {
    let (registry, classes) = registry();
    let mut rel = Relation::new("Word", &classes).unwrap();
    let a = append_named(&mut rel, "a");
    let b = append_named(&mut rel, "b");
    let c = append_named(&mut rel, "c");
    rel.add_daughter(b, None).unwrap();
    rel.add_daughter(b, None).unwrap();
    assert_eq!(registry.live_instances("Content"), Ok(5));

    rel.delete_item(b).unwrap();
    assert_eq!(named(&rel), vec!["a", "c"]);
    assert_eq!(rel.get(a).unwrap().next().map(|i| i.id()), Some(c));
    assert_eq!(rel.get(c).unwrap().prev().map(|i| i.id()), Some(a));
    assert_eq!(rel.len(), 2);
    assert_eq!(registry.live_instances("Item"), Ok(2));
    assert_eq!(registry.live_instances("Content"), Ok(2));
    rel.verify().unwrap();

    rel.delete_item(a).unwrap();
    rel.delete_item(c).unwrap();
    assert!(rel.head().is_none());
    assert!(rel.tail().is_none());
    rel.verify().unwrap();
}

#[test]
fn deleting_first_daughter_moves_parent_link() {
    let (_registry, classes) = registry();
    let mut rel = Relation::new("SylStructure", &classes).unwrap();
    let word = append_named(&mut rel, "w");
    let first = rel.add_daughter(word, None).unwrap();
    let second = rel.add_daughter(word, None).unwrap();

    rel.delete_item(first).unwrap();
    let parent = rel.get(word).unwrap();
    assert_eq!(parent.daughter().map(|d| d.id()), Some(second));
    assert!(rel.get(second).unwrap().prev().is_none());
    rel.verify().unwrap();
}

#[test]
fn stale_and_foreign_ids_are_structural_errors() {
    let (_registry, classes) = registry();
    let mut words = Relation::new("Word", &classes).unwrap();
    let mut syls = Relation::new("Syllable", &classes).unwrap();
    let w = words.append(None).unwrap();
    let s = syls.append(None).unwrap();

    assert!(words.item(s).is_none());
    let err = words.insert_after(s, None).map_err(|e| e.code());
    assert_eq!(err, Err(ErrorCode::StructuralError));

    words.delete_item(w).unwrap();
    let err = words.get(w).map(|_| ()).map_err(|e| e.code());
    assert_eq!(err, Err(ErrorCode::StructuralError));
    let err = words.delete_item(w).map_err(|e| e.code());
    assert_eq!(err, Err(ErrorCode::StructuralError));
}

#[test]
fn shared_content_is_indexed_once_per_relation() {
    let (_registry, classes) = registry();
    let mut words = Relation::new("Word", &classes).unwrap();
    let mut syls = Relation::new("Syllable", &classes).unwrap();
    let w = words.append(None).unwrap();
    let content = words.get(w).unwrap().content().clone();
    assert_eq!(content.refcount(), 2);

    let s = syls.append(Some(&content)).unwrap();
    assert_eq!(content.refcount(), 3);
    assert_eq!(syls.item_for_content(content.id()).map(|i| i.id()), Some(s));

    let err = syls.append(Some(&content)).map_err(|e| e.code());
    assert_eq!(err, Err(ErrorCode::StructuralError));
    assert_eq!(content.refcount(), 3);
    assert_eq!(syls.len(), 1);

    syls.delete_item(s).unwrap();
    assert_eq!(content.refcount(), 2);
    assert!(syls.item_for_content(content.id()).is_none());
}

#[test]
fn nodes_carry_class_pointers() {
    let (registry, classes) = registry();
    let mut rel = Relation::new("Word", &classes).unwrap();
    let id = rel.append(None).unwrap();
    let item = rel.get(id).unwrap();

    assert_eq!(rel.class_name(), "Relation");
    assert_eq!(item.class_name(), "Item");
    assert!(item.is_type("Object"));
    assert_eq!(item.content().class_name(), "Content");
    assert_eq!(registry.live_instances("Relation"), Ok(1));

    drop(rel);
    assert_eq!(registry.total_live(), 0);
}

#[test]
fn churn_reuses_freed_slots() {
    let (_registry, classes) = registry();
    let mut rel = Relation::new("Segment", &classes).unwrap();
    let anchor = append_named(&mut rel, "anchor");

    for _ in 0..100_000 {
        let id = rel.append(None).unwrap();
        rel.delete_item(id).unwrap();
    }
    let last = rel.append(None).unwrap();

    assert_eq!(rel.len(), 2);
    assert_eq!(rel.slot_count(), 2);
    assert_eq!(last.index(), 1);
    assert_eq!(rel.get(anchor).unwrap().name().as_deref(), Some("anchor"));
    rel.verify().unwrap();
}

#[test]
fn reused_slot_does_not_resurrect_old_id() {
    let (_registry, classes) = registry();
    let mut rel = Relation::new("Word", &classes).unwrap();
    let old = append_named(&mut rel, "old");
    rel.delete_item(old).unwrap();

    let new = append_named(&mut rel, "new");
    assert_eq!(new.index(), old.index());
    assert_ne!(new.generation(), old.generation());
    assert!(rel.item(old).is_none());
    let err = rel.delete_item(old).map_err(|e| e.code());
    assert_eq!(err, Err(ErrorCode::StructuralError));
    assert_eq!(named(&rel), vec!["new"]);
    assert_eq!(rel.get(new).unwrap().id(), new);
}

#[test]
fn deleting_a_subtree_frees_every_slot() {
    let (_registry, classes) = registry();
    let mut rel = Relation::new("SylStructure", &classes).unwrap();
    let word = append_named(&mut rel, "word");
    let syl = rel.add_daughter(word, None).unwrap();
    rel.add_daughter(syl, None).unwrap();
    rel.add_daughter(syl, None).unwrap();
    assert_eq!(rel.slot_count(), 4);

    rel.delete_item(word).unwrap();
    assert!(rel.is_empty());
    rel.verify().unwrap();

    for name in ["a", "b", "c", "d"] {
        append_named(&mut rel, name);
    }
    assert_eq!(rel.slot_count(), 4);
    assert_eq!(named(&rel), vec!["a", "b", "c", "d"]);
    rel.verify().unwrap();
}
