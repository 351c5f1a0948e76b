//! Shared feature blocks.
//!
//! A [`Content`] is the only shared-ownership node in the graph. Each item
//! holds one handle; cloning the handle is how a second relation comes to
//! address the same linguistic unit. The feature map sits behind a lock so
//! any holder can update it. The lock is only reachable through
//! [`Content::with_features`] and [`Content::with_features_mut`], so no
//! guard outlives a single call. The lock is not reentrant: the closures
//! must not touch features of the same content through another item.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use vox_object::{ClassInfo, Map, ObjectHeader, TypeInfo};

/// Identity of a content block: the address of its shared allocation.
///
/// Stable for as long as any handle to the block is alive.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentId(usize);

struct ContentInner {
    header: ObjectHeader,
    features: RwLock<Map>,
}

impl Drop for ContentInner {
    fn drop(&mut self) {
        tracing::trace!(features = self.features.get_mut().len(), "destroyed content");
    }
}

/// Reference-counted feature block.
#[derive(Clone)]
pub struct Content(Arc<ContentInner>);

impl Content {
    pub(crate) fn new(class: &Arc<ClassInfo>) -> Self {
        Content(Arc::new(ContentInner {
            header: ObjectHeader::new(class),
            features: RwLock::new(Map::new()),
        }))
    }

    pub fn id(&self) -> ContentId {
        ContentId(Arc::as_ptr(&self.0) as usize)
    }

    /// Number of handles: one per addressing item plus any held elsewhere.
    pub fn refcount(&self) -> usize {
        Arc::strong_count(&self.0)
    }

    pub fn ptr_eq(&self, other: &Content) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Run `f` with shared access to the feature map.
    pub fn with_features<R>(&self, f: impl FnOnce(&Map) -> R) -> R {
        f(&self.0.features.read())
    }

    /// Run `f` with exclusive access to the feature map.
    pub fn with_features_mut<R>(&self, f: impl FnOnce(&mut Map) -> R) -> R {
        f(&mut self.0.features.write())
    }
}

impl TypeInfo for Content {
    fn header(&self) -> &ObjectHeader {
        &self.0.header
    }
}

impl fmt::Debug for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Content")
            .field("refs", &self.refcount())
            .field("features", &*self.0.features.read())
            .finish()
    }
}
