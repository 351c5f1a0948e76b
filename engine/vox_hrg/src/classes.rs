//! Class pointers for the graph node types.

use std::sync::Arc;

use vox_object::{ClassDescriptor, ClassInfo, ClassRegistry, ResultExt, VoxResult, OBJECT_CLASS};

pub const CONTENT_CLASS: &str = "Content";
pub const ITEM_CLASS: &str = "Item";
pub const RELATION_CLASS: &str = "Relation";
pub const UTTERANCE_CLASS: &str = "Utterance";

/// Registered classes of the four node types.
///
/// Graph nodes are plain Rust types, built through their own constructors
/// rather than `ClassRegistry::new_object`, so their descriptors are
/// abstract. Resolving them once per utterance gives every node a class
/// pointer for type tests and the live-instance census.
#[derive(Clone, Debug)]
pub struct HrgClasses {
    pub content: Arc<ClassInfo>,
    pub item: Arc<ClassInfo>,
    pub relation: Arc<ClassInfo>,
    pub utterance: Arc<ClassInfo>,
}

impl HrgClasses {
    /// Descriptors for the `hrg` module, in registration order.
    pub fn descriptors() -> Vec<ClassDescriptor> {
        [CONTENT_CLASS, ITEM_CLASS, RELATION_CLASS, UTTERANCE_CLASS]
            .into_iter()
            .map(|name| ClassDescriptor::new(name, Some(OBJECT_CLASS)))
            .collect()
    }

    /// Look up the registered node classes.
    pub fn resolve(registry: &ClassRegistry) -> VoxResult<Self> {
        let find = |name: &str| {
            registry
                .find(name)
                .with_context("HrgClasses::resolve", || format!("resolving '{name}'"))
        };
        Ok(HrgClasses {
            content: find(CONTENT_CLASS)?,
            item: find(ITEM_CLASS)?,
            relation: find(RELATION_CLASS)?,
            utterance: find(UTTERANCE_CLASS)?,
        })
    }
}
