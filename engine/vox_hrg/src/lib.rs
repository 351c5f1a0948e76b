//! Vox HRG - the Heterogeneous Relation Graph.
//!
//! An utterance is represented as several named views over the same
//! linguistic content:
//! - `Utterance` owns named `Relation`s and its own feature map
//! - a `Relation` owns `Item`s arranged as a list and, independently, a tree
//! - an `Item` addresses one `Content`, the shared feature block
//!
//! # Ownership
//!
//! Utterance, relation and item form a strict single-owner tree: dropping
//! any of them drops everything below it. `Content` is the only shared node;
//! items in different relations hold handles to the same block, and the
//! block goes away with its last handle.
//!
//! # Cross-Relation Lookup
//!
//! Each relation indexes its items by content identity, so finding "this
//! word as a syllable" is a single table probe (`Item::as_in`).

mod classes;
mod content;
mod item;
pub mod path;
mod relation;
mod utterance;

#[cfg(test)]
mod test_helpers;

pub use classes::{HrgClasses, CONTENT_CLASS, ITEM_CLASS, RELATION_CLASS, UTTERANCE_CLASS};
pub use content::{Content, ContentId};
pub use item::{Daughters, Item, NAME_FEATURE};
pub use path::{path_to_feature, path_to_item, ItemPath, Step};
pub use relation::{ItemId, Relation, Siblings, Traverse};
pub use utterance::{Utterance, UtteranceId, Voice};
