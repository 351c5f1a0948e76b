//! Item paths.
//!
//! A path walks from one item to another and optionally names a feature on
//! the item it ends at. Tokens are separated by `.` or `:`:
//!
//! | Token | Step |
//! |-------|------|
//! | `p` | previous item |
//! | `n` | next item |
//! | `daughter` | first daughter |
//! | `daughtern` | last daughter |
//! | `parent` | parent |
//! | `R:<name>` | the same content as it appears in relation `<name>` |
//! | anything else | a feature name; only allowed as the last token |
//!
//! `n.daughter.name` is the name of the next item's first daughter;
//! `R:Syllable.parent` is the syllable's parent in the syllable tree.

use std::fmt;
use std::str::FromStr;

use vox_object::{ResultExt, Value, VoxError, VoxResult};

use crate::item::Item;
use crate::utterance::Utterance;

/// One navigation step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    Prev,
    Next,
    Daughter,
    LastDaughter,
    Parent,
    Relation(String),
}

/// A parsed path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemPath {
    steps: Vec<Step>,
    feature: Option<String>,
}

impl ItemPath {
    pub fn parse(path: &str) -> VoxResult<Self> {
        let malformed =
            |why: &str| VoxError::argument(format!("malformed item path '{path}': {why}"));

        if path.is_empty() {
            return Err(malformed("empty path"));
        }
        let mut steps = Vec::new();
        let mut feature = None;
        let mut tokens = path.split(['.', ':']);
        while let Some(token) = tokens.next() {
            if feature.is_some() {
                return Err(malformed("a feature name must be the last token"));
            }
            let step = match token {
                "" => return Err(malformed("empty token")),
                "p" => Step::Prev,
                "n" => Step::Next,
                "daughter" => Step::Daughter,
                "daughtern" => Step::LastDaughter,
                "parent" => Step::Parent,
                "R" => match tokens.next() {
                    Some(name) if !name.is_empty() => Step::Relation(name.to_owned()),
                    _ => return Err(malformed("'R' must be followed by a relation name")),
                },
                name => {
                    feature = Some(name.to_owned());
                    continue;
                }
            };
            steps.push(step);
        }
        Ok(ItemPath { steps, feature })
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// The trailing feature name, if the path has one.
    pub fn feature(&self) -> Option<&str> {
        self.feature.as_deref()
    }

    /// Follow the navigation steps from `item`.
    ///
    /// `Ok(None)` when a step falls off the graph. Relation steps resolve
    /// through `utt`, which must own `item`.
    pub fn walk<'u>(&self, utt: &'u Utterance, item: Item<'u>) -> VoxResult<Option<Item<'u>>> {
        let mut current = item;
        for step in &self.steps {
            let next = match step {
                Step::Prev => current.prev(),
                Step::Next => current.next(),
                Step::Daughter => current.daughter(),
                Step::LastDaughter => current.last_daughter(),
                Step::Parent => current.parent(),
                Step::Relation(name) => current.as_in(utt, name)?,
            };
            match next {
                Some(item) => current = item,
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }
}

impl FromStr for ItemPath {
    type Err = VoxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ItemPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<&str> = Vec::with_capacity(self.steps.len() + 1);
        for step in &self.steps {
            match step {
                Step::Prev => parts.push("p"),
                Step::Next => parts.push("n"),
                Step::Daughter => parts.push("daughter"),
                Step::LastDaughter => parts.push("daughtern"),
                Step::Parent => parts.push("parent"),
                Step::Relation(name) => parts.extend(["R", name.as_str()]),
            }
        }
        if let Some(feature) = &self.feature {
            parts.push(feature);
        }
        f.write_str(&parts.join("."))
    }
}

/// The item `path` leads to from `item`.
///
/// A path that names a feature is an `ArgumentError`; use
/// [`path_to_feature`].
pub fn path_to_item<'u>(
    utt: &'u Utterance,
    item: Item<'u>,
    path: &str,
) -> VoxResult<Option<Item<'u>>> {
    let parsed = ItemPath::parse(path)?;
    if let Some(feature) = parsed.feature() {
        return Err(VoxError::argument(format!(
            "item path '{path}' ends in feature '{feature}'"
        )));
    }
    parsed
        .walk(utt, item)
        .with_context("path_to_item", || format!("following '{path}'"))
}

/// The feature `path` leads to from `item`.
///
/// `Ok(None)` if navigation falls off the graph or the final item lacks the
/// feature. A path without a trailing feature is an `ArgumentError`.
pub fn path_to_feature(utt: &Utterance, item: Item<'_>, path: &str) -> VoxResult<Option<Value>> {
    let parsed = ItemPath::parse(path)?;
    let Some(feature) = parsed.feature() else {
        return Err(VoxError::argument(format!(
            "item path '{path}' does not end in a feature"
        )));
    };
    let target = parsed
        .walk(utt, item)
        .with_context("path_to_feature", || format!("following '{path}'"))?;
    Ok(target.and_then(|item| item.feature(feature)))
}
