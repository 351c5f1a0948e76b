//! Relations: named lists and trees of items.
//!
//! A relation owns its items in an arena. Each node holds four links
//! (`next`, `prev`, `parent`, `daughter`) as arena indices, so the list view
//! and the tree view live in the same storage. Deleted slots go on a free
//! list and are handed out again by later inserts. Every slot carries a
//! generation that is bumped when its item is deleted, so an [`ItemId`]
//! that outlives its item resolves to nothing rather than to the slot's new
//! occupant.
//!
//! # Content Index
//!
//! Every relation keeps a side table from [`ContentId`] to the item that
//! addresses it. Cross-relation lookup (`Item::as_in`) is a probe of the
//! target relation's table. A content block may be addressed at most once
//! per relation; sharing it into a relation that already has it is a
//! `StructuralError`.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use vox_object::{ObjectHeader, TypeInfo, VoxError, VoxResult};

use crate::classes::HrgClasses;
use crate::content::{Content, ContentId};
use crate::item::{Daughters, Item};
use crate::utterance::UtteranceId;

static NEXT_RELATION_KEY: AtomicU32 = AtomicU32::new(1);

/// Handle to an item: the owning relation's key, the arena slot and the
/// slot's generation at the time the item was created.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ItemId {
    relation: u32,
    index: u32,
    generation: u32,
}

impl ItemId {
    /// Arena slot of the item within its relation.
    pub fn index(self) -> u32 {
        self.index
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

/// One arena slot. `node` is `None` while the slot sits on the free list.
struct Slot {
    generation: u32,
    node: Option<ItemNode>,
}

pub(crate) struct ItemNode {
    pub(crate) header: ObjectHeader,
    pub(crate) content: Content,
    pub(crate) next: Option<u32>,
    pub(crate) prev: Option<u32>,
    pub(crate) parent: Option<u32>,
    pub(crate) daughter: Option<u32>,
}

/// Where a new node goes.
#[derive(Copy, Clone)]
enum Placement {
    Back,
    Front,
    After(u32),
    Before(u32),
    LastDaughter(u32),
}

/// A named list/tree of items.
pub struct Relation {
    header: ObjectHeader,
    key: u32,
    name: String,
    owner: Option<UtteranceId>,
    slots: Vec<Slot>,
    free: Vec<u32>,
    head: Option<u32>,
    tail: Option<u32>,
    index: FxHashMap<ContentId, u32>,
    classes: HrgClasses,
    len: usize,
}

impl Relation {
    /// Create an unowned, empty relation. The name is fixed for life.
    pub fn new(name: impl Into<String>, classes: &HrgClasses) -> VoxResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(VoxError::argument("relation name must not be empty"));
        }
        Ok(Relation {
            header: ObjectHeader::new(&classes.relation),
            key: NEXT_RELATION_KEY.fetch_add(1, Ordering::Relaxed),
            name,
            owner: None,
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            index: FxHashMap::default(),
            classes: classes.clone(),
            len: 0,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The utterance this relation is attached to, if any.
    pub fn owner(&self) -> Option<UtteranceId> {
        self.owner
    }

    pub(crate) fn set_owner(&mut self, owner: Option<UtteranceId>) {
        self.owner = owner;
    }

    /// Number of items in the relation, at every tree level.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn head(&self) -> Option<Item<'_>> {
        self.head.and_then(|i| self.view(i))
    }

    pub fn tail(&self) -> Option<Item<'_>> {
        self.tail.and_then(|i| self.view(i))
    }

    /// The item behind `id`, or `None` if it was deleted or belongs to
    /// another relation.
    pub fn item(&self, id: ItemId) -> Option<Item<'_>> {
        if id.relation != self.key {
            return None;
        }
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        self.view(id.index)
    }

    /// Like [`Relation::item`] but a missing item is a `StructuralError`.
    pub fn get(&self, id: ItemId) -> VoxResult<Item<'_>> {
        self.item(id).ok_or_else(|| self.stale(id))
    }

    /// The item addressing `content` in this relation.
    pub fn item_for_content(&self, content: ContentId) -> Option<Item<'_>> {
        self.index.get(&content).and_then(|&i| self.view(i))
    }

    /// Append a top-level item. With `share`, the item addresses that
    /// content; otherwise it gets a fresh one.
    pub fn append(&mut self, share: Option<&Content>) -> VoxResult<ItemId> {
        self.insert(Placement::Back, share)
    }

    /// Prepend a top-level item.
    pub fn prepend(&mut self, share: Option<&Content>) -> VoxResult<ItemId> {
        self.insert(Placement::Front, share)
    }

    /// Insert a sibling directly after `at`, at the same tree level.
    pub fn insert_after(&mut self, at: ItemId, share: Option<&Content>) -> VoxResult<ItemId> {
        let at = self.local(at)?;
        self.insert(Placement::After(at), share)
    }

    /// Insert a sibling directly before `at`, at the same tree level.
    pub fn insert_before(&mut self, at: ItemId, share: Option<&Content>) -> VoxResult<ItemId> {
        let at = self.local(at)?;
        self.insert(Placement::Before(at), share)
    }

    /// Append a daughter to the end of `parent`'s daughter chain.
    pub fn add_daughter(&mut self, parent: ItemId, share: Option<&Content>) -> VoxResult<ItemId> {
        let parent = self.local(parent)?;
        self.insert(Placement::LastDaughter(parent), share)
    }

    /// Delete an item together with its daughter subtree.
    ///
    /// Neighbours are re-linked around it first, then every removed item
    /// releases its content handle and its slot goes back on the free list.
    pub fn delete_item(&mut self, id: ItemId) -> VoxResult<()> {
        let at = self.local(id)?;
        self.unlink(at)?;

        let mut pending: SmallVec<[u32; 16]> = SmallVec::new();
        pending.push(at);
        let mut removed = 0usize;
        while let Some(i) = pending.pop() {
            let Some(slot) = self.slots.get_mut(i as usize) else {
                return Err(VoxError::invariant(format!(
                    "relation '{}': daughter slot {i} is out of range",
                    self.name
                )));
            };
            let Some(node) = slot.node.take() else {
                return Err(VoxError::invariant(format!(
                    "relation '{}': daughter slot {i} is empty",
                    self.name
                )));
            };
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(i);
            let mut daughter = node.daughter;
            while let Some(d) = daughter {
                pending.push(d);
                daughter = self.node(d)?.next;
            }
            self.index.remove(&node.content.id());
            self.len -= 1;
            removed += 1;
        }
        tracing::trace!(relation = %self.name, removed, "deleted item subtree");
        Ok(())
    }

    /// Top-level items, head to tail.
    pub fn iter(&self) -> Siblings<'_> {
        Siblings {
            relation: self,
            next: self.head,
        }
    }

    /// Every item, depth first: each item is followed by its daughters.
    pub fn traverse(&self) -> Traverse<'_> {
        Traverse {
            relation: self,
            stack: self.head.into_iter().collect(),
        }
    }

    /// Check the link structure and the content index.
    ///
    /// Any inconsistency is a fatal `StructuralError`.
    pub fn verify(&self) -> VoxResult<()> {
        let fail = |what: String| -> VoxResult<()> {
            Err(VoxError::invariant(format!("relation '{}': {what}", self.name)))
        };

        if let Some(h) = self.head {
            let head = self.node(h)?;
            if head.prev.is_some() || head.parent.is_some() {
                return fail(format!("head {h} has a prev or a parent"));
            }
        }
        if let Some(t) = self.tail {
            let tail = self.node(t)?;
            if tail.next.is_some() || tail.parent.is_some() {
                return fail(format!("tail {t} has a next or a parent"));
            }
        }
        if self.head.is_some() != self.tail.is_some() {
            return fail("head and tail disagree on emptiness".to_owned());
        }

        let mut live = 0usize;
        for (slot, entry) in self.slots.iter().enumerate() {
            let Some(node) = &entry.node else { continue };
            let Ok(i) = u32::try_from(slot) else {
                return fail(format!("slot {slot} out of range"));
            };
            live += 1;

            if let Some(n) = node.next {
                let next = self.node(n)?;
                if next.prev != Some(i) || next.parent != node.parent {
                    return fail(format!("item {i} -> next {n} is not mirrored"));
                }
            } else if node.parent.is_none() && self.tail != Some(i) {
                return fail(format!("item {i} ends the top level but is not the tail"));
            }
            if let Some(p) = node.prev {
                if self.node(p)?.next != Some(i) {
                    return fail(format!("item {i} -> prev {p} is not mirrored"));
                }
            } else {
                let first = match node.parent {
                    Some(parent) => self.node(parent)?.daughter,
                    None => self.head,
                };
                if first != Some(i) {
                    return fail(format!("item {i} starts a chain that nothing points at"));
                }
            }
            if let Some(d) = node.daughter {
                let daughter = self.node(d)?;
                if daughter.parent != Some(i) || daughter.prev.is_some() {
                    return fail(format!("item {i} -> daughter {d} is not its first child"));
                }
            }
            if self.index.get(&node.content.id()) != Some(&i) {
                return fail(format!("item {i} is missing from the content index"));
            }
        }

        for &f in &self.free {
            if !self.is_free(f) {
                return fail(format!("free slot {f} is missing or occupied"));
            }
        }
        if live + self.free.len() != self.slots.len() {
            return fail(format!(
                "{live} live and {} free slots, {} allocated",
                self.free.len(),
                self.slots.len()
            ));
        }
        if live != self.len || self.index.len() != self.len {
            return fail(format!(
                "{live} live items, {} indexed, {} counted",
                self.index.len(),
                self.len
            ));
        }
        let reachable = self.traverse().take(self.len + 1).count();
        if reachable != self.len {
            return fail(format!("{reachable} items reachable from head, {} owned", self.len));
        }
        Ok(())
    }

    pub(crate) fn key(&self) -> u32 {
        self.key
    }

    pub(crate) fn item_id(&self, index: u32) -> ItemId {
        ItemId {
            relation: self.key,
            index,
            generation: self.slots.get(index as usize).map_or(0, |slot| slot.generation),
        }
    }

    /// Allocated arena slots, live or free.
    pub(crate) fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn node(&self, i: u32) -> VoxResult<&ItemNode> {
        self.slots
            .get(i as usize)
            .and_then(|slot| slot.node.as_ref())
            .ok_or_else(|| {
                VoxError::invariant(format!("relation '{}': dangling link to slot {i}", self.name))
            })
    }

    pub(crate) fn view(&self, i: u32) -> Option<Item<'_>> {
        let node = self.slots.get(i as usize)?.node.as_ref()?;
        Some(Item::new(self, i, node))
    }

    pub(crate) fn daughters_of(&self, i: u32) -> Daughters<'_> {
        let first = self
            .slots
            .get(i as usize)
            .and_then(|slot| slot.node.as_ref())
            .and_then(|n| n.daughter);
        Daughters::new(self, first)
    }

    fn node_mut(&mut self, i: u32) -> VoxResult<&mut ItemNode> {
        let name = &self.name;
        self.slots
            .get_mut(i as usize)
            .and_then(|slot| slot.node.as_mut())
            .ok_or_else(|| {
                VoxError::invariant(format!("relation '{name}': dangling link to slot {i}"))
            })
    }

    fn is_free(&self, i: u32) -> bool {
        matches!(self.slots.get(i as usize), Some(slot) if slot.node.is_none())
    }

    fn local(&self, id: ItemId) -> VoxResult<u32> {
        if self.item(id).is_some() {
            Ok(id.index)
        } else {
            Err(self.stale(id))
        }
    }

    fn stale(&self, id: ItemId) -> VoxError {
        if id.relation == self.key {
            VoxError::structural(format!(
                "item {} no longer exists in relation '{}'",
                id.index, self.name
            ))
        } else {
            VoxError::structural(format!(
                "item {} belongs to another relation, not '{}'",
                id.index, self.name
            ))
        }
    }

    /// Validate, allocate, then link. Nothing is linked unless the content
    /// and the slot are both in hand. Freed slots are used before the arena
    /// grows.
    fn insert(&mut self, placement: Placement, share: Option<&Content>) -> VoxResult<ItemId> {
        let content = match share {
            Some(content) => {
                if let Some(existing) = self.index.get(&content.id()) {
                    return Err(VoxError::structural(format!(
                        "content is already addressed by item {existing} in relation '{}'",
                        self.name
                    )));
                }
                content.clone()
            }
            None => Content::new(&self.classes.content),
        };

        let reused = self.free.last().copied();
        let i = match reused {
            Some(i) => {
                if !self.is_free(i) {
                    return Err(VoxError::invariant(format!(
                        "relation '{}': free slot {i} is missing or occupied",
                        self.name
                    )));
                }
                i
            }
            None => {
                let Ok(i) = u32::try_from(self.slots.len()) else {
                    return Err(VoxError::memory(format!(
                        "relation '{}' has exhausted its item slots",
                        self.name
                    )));
                };
                self.slots.try_reserve(1).map_err(|e| {
                    VoxError::memory(format!("growing relation '{}': {e}", self.name))
                })?;
                i
            }
        };
        self.index.try_reserve(1).map_err(|e| {
            VoxError::memory(format!("growing index of relation '{}': {e}", self.name))
        })?;

        let (prev, next, parent) = self.neighbours(placement)?;
        self.index.insert(content.id(), i);
        let node = ItemNode {
            header: ObjectHeader::new(&self.classes.item),
            content,
            next,
            prev,
            parent,
            daughter: None,
        };
        if reused.is_some() {
            if let Some(slot) = self.slots.get_mut(i as usize) {
                slot.node = Some(node);
            }
            self.free.pop();
        } else {
            self.slots.push(Slot {
                generation: 0,
                node: Some(node),
            });
        }
        self.len += 1;
        self.link(i, prev, next, parent)?;

        Ok(self.item_id(i))
    }

    /// The `(prev, next, parent)` a node inserted at `placement` will have.
    fn neighbours(
        &self,
        placement: Placement,
    ) -> VoxResult<(Option<u32>, Option<u32>, Option<u32>)> {
        Ok(match placement {
            Placement::Back => (self.tail, None, None),
            Placement::Front => (None, self.head, None),
            Placement::After(at) => {
                let node = self.node(at)?;
                (Some(at), node.next, node.parent)
            }
            Placement::Before(at) => {
                let node = self.node(at)?;
                (node.prev, Some(at), node.parent)
            }
            Placement::LastDaughter(parent) => {
                let last = self.daughters_of(parent).last().map(|item| item.index());
                (last, None, Some(parent))
            }
        })
    }

    /// Point the neighbours of a freshly placed node at it.
    fn link(
        &mut self,
        i: u32,
        prev: Option<u32>,
        next: Option<u32>,
        parent: Option<u32>,
    ) -> VoxResult<()> {
        match prev {
            Some(p) => self.node_mut(p)?.next = Some(i),
            None => match parent {
                Some(parent) => self.node_mut(parent)?.daughter = Some(i),
                None => self.head = Some(i),
            },
        }
        match next {
            Some(n) => self.node_mut(n)?.prev = Some(i),
            None => {
                if parent.is_none() {
                    self.tail = Some(i);
                }
            }
        }
        Ok(())
    }

    /// Detach `i` from its sibling chain, leaving its subtree attached to it.
    fn unlink(&mut self, i: u32) -> VoxResult<()> {
        let node = self.node(i)?;
        let (prev, next, parent) = (node.prev, node.next, node.parent);
        match prev {
            Some(p) => self.node_mut(p)?.next = next,
            None => match parent {
                Some(parent) => self.node_mut(parent)?.daughter = next,
                None => self.head = next,
            },
        }
        match next {
            Some(n) => self.node_mut(n)?.prev = prev,
            None => {
                if parent.is_none() {
                    self.tail = prev;
                }
            }
        }
        Ok(())
    }
}

impl TypeInfo for Relation {
    fn header(&self) -> &ObjectHeader {
        &self.header
    }
}

impl Drop for Relation {
    fn drop(&mut self) {
        tracing::trace!(relation = %self.name, items = self.len, "destroyed relation");
    }
}

impl fmt::Debug for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Relation")
            .field("name", &self.name)
            .field("items", &self.len)
            .field("owner", &self.owner)
            .finish_non_exhaustive()
    }
}

/// Renders the relation as an indented tree of item names.
impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", self.name)?;
        let mut stack: Vec<(Item<'_>, usize)> = self.iter().map(|item| (item, 1)).collect();
        stack.reverse();
        while let Some((item, depth)) = stack.pop() {
            let name = item.name().unwrap_or_else(|| "_".to_owned());
            writeln!(f, "{:indent$}{name}", "", indent = depth * 2)?;
            let mut daughters: Vec<_> = item.daughters().map(|d| (d, depth + 1)).collect();
            daughters.reverse();
            stack.extend(daughters);
        }
        Ok(())
    }
}

/// Iterator over a sibling chain.
pub struct Siblings<'a> {
    relation: &'a Relation,
    next: Option<u32>,
}

impl<'a> Iterator for Siblings<'a> {
    type Item = Item<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.relation.view(self.next?)?;
        self.next = item.node().next;
        Some(item)
    }
}

/// Pre-order iterator over the whole tree.
pub struct Traverse<'a> {
    relation: &'a Relation,
    stack: SmallVec<[u32; 16]>,
}

impl<'a> Iterator for Traverse<'a> {
    type Item = Item<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let i = self.stack.pop()?;
        let item = self.relation.view(i)?;
        let node = item.node();
        if let Some(next) = node.next {
            self.stack.push(next);
        }
        if let Some(daughter) = node.daughter {
            self.stack.push(daughter);
        }
        Some(item)
    }
}

#[cfg(test)]
mod tests;
