//! Borrowed views of items.
//!
//! An [`Item`] is a cheap, copyable view onto one node of a relation. It
//! navigates the list and tree links and reads or writes the features of the
//! content the node addresses. Structural changes go through the owning
//! [`Relation`], which needs `&mut` access.

use std::fmt;

use vox_object::{ObjectHeader, ResultExt, TypeInfo, Value, VoxError, VoxResult};

use crate::content::Content;
use crate::relation::{ItemId, ItemNode, Relation};
use crate::utterance::Utterance;

/// Feature that holds an item's name.
pub const NAME_FEATURE: &str = "name";

#[derive(Copy, Clone)]
pub struct Item<'a> {
    relation: &'a Relation,
    index: u32,
    node: &'a ItemNode,
}

impl<'a> Item<'a> {
    pub(crate) fn new(relation: &'a Relation, index: u32, node: &'a ItemNode) -> Self {
        Item {
            relation,
            index,
            node,
        }
    }

    pub(crate) fn node(&self) -> &'a ItemNode {
        self.node
    }

    pub(crate) fn index(&self) -> u32 {
        self.index
    }

    /// Handle for this item, valid until the item is deleted.
    pub fn id(&self) -> ItemId {
        self.relation.item_id(self.index)
    }

    /// The relation that owns this item.
    pub fn relation(&self) -> &'a Relation {
        self.relation
    }

    pub fn content(&self) -> &'a Content {
        &self.node.content
    }

    #[allow(clippy::should_implement_trait)]
    pub fn next(&self) -> Option<Item<'a>> {
        self.node.next.and_then(|i| self.relation.view(i))
    }

    pub fn prev(&self) -> Option<Item<'a>> {
        self.node.prev.and_then(|i| self.relation.view(i))
    }

    pub fn parent(&self) -> Option<Item<'a>> {
        self.node.parent.and_then(|i| self.relation.view(i))
    }

    /// First daughter.
    pub fn daughter(&self) -> Option<Item<'a>> {
        self.node.daughter.and_then(|i| self.relation.view(i))
    }

    /// The `n`th daughter counting from zero; `-1` is the last one.
    pub fn nth_daughter(&self, n: i32) -> Option<Item<'a>> {
        match n {
            -1 => self.last_daughter(),
            n => self.daughters().nth(usize::try_from(n).ok()?),
        }
    }

    pub fn last_daughter(&self) -> Option<Item<'a>> {
        self.daughters().last()
    }

    pub fn daughters(&self) -> Daughters<'a> {
        self.relation.daughters_of(self.index)
    }

    /// This item's counterpart in relation `name` of `utt`: the item there
    /// that addresses the same content.
    ///
    /// `Ok(None)` if `utt` has no such relation or the content is not in it.
    /// Asking through an utterance that does not own this item is a
    /// `StructuralError`.
    pub fn as_in<'u>(&self, utt: &'u Utterance, name: &str) -> VoxResult<Option<Item<'u>>> {
        if self.relation.owner() != Some(utt.id()) {
            return Err(VoxError::structural(format!(
                "item in relation '{}' is not owned by utterance {}",
                self.relation.name(),
                utt.id()
            ))
            .with_context("Item::as_in", format!("looking up relation '{name}'")));
        }
        Ok(utt
            .relation(name)
            .and_then(|rel| rel.item_for_content(self.node.content.id())))
    }

    /// True if this item's content is also addressed in relation `name`.
    pub fn in_relation(&self, utt: &Utterance, name: &str) -> VoxResult<bool> {
        Ok(self.as_in(utt, name)?.is_some())
    }

    /// True if both items are the same item or address the same content.
    pub fn shares_content(&self, other: &Item<'_>) -> bool {
        self == other || self.node.content.ptr_eq(&other.node.content)
    }

    /// The `name` feature, if it is set and is a string.
    pub fn name(&self) -> Option<String> {
        self.node.content.with_features(|features| {
            features
                .get(NAME_FEATURE)
                .and_then(|v| v.as_str().ok().map(str::to_owned))
        })
    }

    pub fn set_name(&self, name: impl Into<String>) {
        self.set_feature(NAME_FEATURE, Value::Str(name.into()));
    }

    /// A copy of the feature value under `key`.
    pub fn feature(&self, key: &str) -> Option<Value> {
        self.node.content.with_features(|features| features.get(key).cloned())
    }

    pub fn has_feature(&self, key: &str) -> bool {
        self.node.content.with_features(|features| features.contains(key))
    }

    pub fn get_int(&self, key: &str) -> VoxResult<i32> {
        self.node
            .content
            .with_features(|features| features.get_int(key))
            .context("Item::get_int", "reading item feature")
    }

    pub fn get_float(&self, key: &str) -> VoxResult<f32> {
        self.node
            .content
            .with_features(|features| features.get_float(key))
            .context("Item::get_float", "reading item feature")
    }

    pub fn get_string(&self, key: &str) -> VoxResult<String> {
        self.node
            .content
            .with_features(|features| features.get_str(key).map(str::to_owned))
            .context("Item::get_string", "reading item feature")
    }

    pub fn set_int(&self, key: &str, value: i32) {
        self.set_feature(key, Value::Int(value));
    }

    pub fn set_float(&self, key: &str, value: f32) {
        self.set_feature(key, Value::Float(value));
    }

    pub fn set_string(&self, key: &str, value: impl Into<String>) {
        self.set_feature(key, Value::Str(value.into()));
    }

    /// Store a feature on the item's content. Every item sharing the
    /// content sees it.
    pub fn set_feature(&self, key: &str, value: impl Into<Value>) {
        self.node
            .content
            .with_features_mut(|features| features.set(key, value));
    }

    pub fn delete_feature(&self, key: &str) -> VoxResult<()> {
        self.node
            .content
            .with_features_mut(|features| features.delete(key))
            .context("Item::delete_feature", "deleting item feature")
    }

    pub fn feature_keys(&self) -> Vec<String> {
        self.node
            .content
            .with_features(|features| features.keys().map(str::to_owned).collect())
    }
}

impl TypeInfo for Item<'_> {
    fn header(&self) -> &ObjectHeader {
        &self.node.header
    }
}

impl PartialEq for Item<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.relation.key() == other.relation.key() && self.index == other.index
    }
}

impl Eq for Item<'_> {}

impl fmt::Debug for Item<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Item")
            .field("relation", &self.relation.name())
            .field("index", &self.index)
            .field("name", &self.name())
            .finish()
    }
}

/// Iterator over a daughter chain.
pub struct Daughters<'a> {
    relation: &'a Relation,
    next: Option<u32>,
}

impl<'a> Daughters<'a> {
    pub(crate) fn new(relation: &'a Relation, first: Option<u32>) -> Self {
        Daughters {
            relation,
            next: first,
        }
    }
}

impl<'a> Iterator for Daughters<'a> {
    type Item = Item<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.relation.view(self.next?)?;
        self.next = item.node.next;
        Some(item)
    }
}
