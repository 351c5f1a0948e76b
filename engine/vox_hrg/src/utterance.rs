//! Utterances: the root of the ownership tree.
//!
//! An utterance owns its relations by name and its own feature map.
//! Dropping it drops every relation, which drops every item, which releases
//! every content handle.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use rustc_hash::FxHashMap;
use vox_object::{Map, ObjectHeader, ResultExt, TypeInfo, Value, VoxError, VoxResult};

use crate::classes::HrgClasses;
use crate::content::Content;
use crate::item::Item;
use crate::relation::{ItemId, Relation};

static NEXT_UTTERANCE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of an utterance.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct UtteranceId(u64);

impl fmt::Display for UtteranceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An external voice. Utterances reference one but never own or change it.
pub trait Voice: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;
}

pub struct Utterance {
    header: ObjectHeader,
    id: UtteranceId,
    classes: HrgClasses,
    relations: FxHashMap<String, Relation>,
    features: Map,
    voice: Option<Arc<dyn Voice>>,
}

impl Utterance {
    pub fn new(classes: &HrgClasses) -> Self {
        Utterance {
            header: ObjectHeader::new(&classes.utterance),
            id: UtteranceId(NEXT_UTTERANCE_ID.fetch_add(1, Ordering::Relaxed)),
            classes: classes.clone(),
            relations: FxHashMap::default(),
            features: Map::new(),
            voice: None,
        }
    }

    pub fn with_voice(classes: &HrgClasses, voice: Arc<dyn Voice>) -> Self {
        let mut utt = Self::new(classes);
        utt.voice = Some(voice);
        utt
    }

    pub fn id(&self) -> UtteranceId {
        self.id
    }

    pub fn voice(&self) -> Option<&Arc<dyn Voice>> {
        self.voice.as_ref()
    }

    pub fn classes(&self) -> &HrgClasses {
        &self.classes
    }

    /// Create a relation named `name` and attach it.
    ///
    /// A relation already attached under that name is destroyed first.
    #[tracing::instrument(level = "debug", skip(self), fields(utterance = %self.id))]
    pub fn new_relation(&mut self, name: &str) -> VoxResult<&mut Relation> {
        let relation = Relation::new(name, &self.classes)
            .context("Utterance::new_relation", "creating relation")?;
        Ok(self.attach(relation))
    }

    /// Attach an unowned relation under its own name, replacing any
    /// relation of that name.
    pub fn set_relation(&mut self, relation: Relation) -> VoxResult<&mut Relation> {
        if let Some(owner) = relation.owner() {
            return Err(VoxError::argument(format!(
                "relation '{}' is already attached to utterance {owner}",
                relation.name()
            )));
        }
        Ok(self.attach(relation))
    }

    pub fn relation(&self, name: &str) -> Option<&Relation> {
        self.relations.get(name)
    }

    pub fn relation_mut(&mut self, name: &str) -> Option<&mut Relation> {
        self.relations.get_mut(name)
    }

    /// Like [`Utterance::relation`], but a missing relation is a
    /// `StructuralError`.
    pub fn get_relation(&self, name: &str) -> VoxResult<&Relation> {
        self.relations.get(name).ok_or_else(|| self.missing_relation(name))
    }

    pub fn get_relation_mut(&mut self, name: &str) -> VoxResult<&mut Relation> {
        if self.relations.contains_key(name) {
            self.relations
                .get_mut(name)
                .ok_or_else(|| VoxError::invariant("relation vanished during lookup"))
        } else {
            Err(self.missing_relation(name))
        }
    }

    /// Destroy the relation named `name`. Returns false if there was none.
    pub fn del_relation(&mut self, name: &str) -> bool {
        match self.relations.remove(name) {
            Some(relation) => {
                tracing::debug!(
                    utterance = %self.id,
                    relation = name,
                    items = relation.len(),
                    "deleted relation"
                );
                true
            }
            None => false,
        }
    }

    /// Detach the relation named `name` without destroying it.
    pub fn take_relation(&mut self, name: &str) -> Option<Relation> {
        let mut relation = self.relations.remove(name)?;
        relation.set_owner(None);
        Some(relation)
    }

    pub fn relation_present(&self, name: &str) -> bool {
        self.relations.contains_key(name)
    }

    /// Names of the attached relations, sorted.
    pub fn relation_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.relations.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// The item `id` in relation `relation`.
    pub fn item(&self, relation: &str, id: ItemId) -> VoxResult<Item<'_>> {
        self.get_relation(relation)?
            .get(id)
            .with_context("Utterance::item", || format!("resolving item in '{relation}'"))
    }

    /// A new handle on the content of item `id`, ready to be shared into
    /// another relation.
    pub fn share(&self, relation: &str, id: ItemId) -> VoxResult<Content> {
        Ok(self.item(relation, id)?.content().clone())
    }

    /// Every item addressing `content`, as `(relation name, item)`, sorted
    /// by relation name.
    pub fn sharers(&self, content: &Content) -> Vec<(&str, ItemId)> {
        let mut found: Vec<(&str, ItemId)> = self
            .relations
            .iter()
            .filter_map(|(name, rel)| {
                rel.item_for_content(content.id())
                    .map(|item| (name.as_str(), item.id()))
            })
            .collect();
        found.sort_unstable_by(|a, b| a.0.cmp(b.0));
        found
    }

    pub fn features(&self) -> &Map {
        &self.features
    }

    pub fn features_mut(&mut self) -> &mut Map {
        &mut self.features
    }

    pub fn feature(&self, key: &str) -> Option<&Value> {
        self.features.get(key)
    }

    pub fn has_feature(&self, key: &str) -> bool {
        self.features.contains(key)
    }

    pub fn set_feature(&mut self, key: &str, value: impl Into<Value>) {
        self.features.set(key, value);
    }

    pub fn get_int(&self, key: &str) -> VoxResult<i32> {
        self.features
            .get_int(key)
            .context("Utterance::get_int", "reading utterance feature")
    }

    pub fn get_float(&self, key: &str) -> VoxResult<f32> {
        self.features
            .get_float(key)
            .context("Utterance::get_float", "reading utterance feature")
    }

    pub fn get_string(&self, key: &str) -> VoxResult<&str> {
        self.features
            .get_str(key)
            .context("Utterance::get_string", "reading utterance feature")
    }

    pub fn delete_feature(&mut self, key: &str) -> VoxResult<()> {
        self.features
            .delete(key)
            .context("Utterance::delete_feature", "deleting utterance feature")
    }

    pub fn feature_keys(&self) -> Vec<&str> {
        self.features.keys().collect()
    }

    /// Replace-then-insert. The old relation is gone before the new one is
    /// visible.
    fn attach(&mut self, mut relation: Relation) -> &mut Relation {
        let name = relation.name().to_owned();
        if let Some(old) = self.relations.remove(&name) {
            tracing::debug!(
                utterance = %self.id,
                relation = %name,
                items = old.len(),
                "replacing relation"
            );
            drop(old);
        }
        relation.set_owner(Some(self.id));
        tracing::debug!(utterance = %self.id, relation = %name, "attached relation");
        self.relations.entry(name).or_insert(relation)
    }

    fn missing_relation(&self, name: &str) -> VoxError {
        VoxError::structural(format!("no relation named '{name}' in utterance {}", self.id))
            .with_context("Utterance::get_relation", format!("looking up '{name}'"))
    }
}

impl TypeInfo for Utterance {
    fn header(&self) -> &ObjectHeader {
        &self.header
    }
}

impl Drop for Utterance {
    fn drop(&mut self) {
        let relations = self.relations.len();
        self.relations.clear();
        self.features.clear();
        tracing::debug!(utterance = %self.id, relations, "destroyed utterance");
    }
}

impl fmt::Debug for Utterance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Utterance")
            .field("id", &self.id)
            .field("relations", &self.relation_names())
            .field("features", &self.features)
            .field("voice", &self.voice.as_ref().map(|v| v.name()))
            .finish()
    }
}
