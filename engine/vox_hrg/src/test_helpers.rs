//! Shared fixtures for unit tests.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use vox_object::{base_classes, ClassRegistry};

use crate::classes::HrgClasses;
use crate::relation::ItemId;
use crate::utterance::Utterance;

/// A registry with the base and graph classes, plus the resolved classes.
pub(crate) fn registry() -> (ClassRegistry, HrgClasses) {
    let mut registry = ClassRegistry::new();
    for descriptor in base_classes().into_iter().chain(HrgClasses::descriptors()) {
        registry.register(descriptor).unwrap();
    }
    let classes = HrgClasses::resolve(&registry).unwrap();
    (registry, classes)
}

/// Append one named top-level item per name.
pub(crate) fn words(utt: &mut Utterance, relation: &str, names: &[&str]) -> Vec<ItemId> {
    let mut ids = Vec::with_capacity(names.len());
    for name in names {
        let rel = utt.relation_mut(relation).unwrap();
        let id = rel.append(None).unwrap();
        rel.get(id).unwrap().set_name(*name);
        ids.push(id);
    }
    ids
}

/// Top-level item names, head to tail.
pub(crate) fn names(utt: &Utterance, relation: &str) -> Vec<String> {
    utt.relation(relation)
        .unwrap()
        .iter()
        .map(|item| item.name().unwrap_or_default())
        .collect()
}
