//! Ordered sequence of values.

use std::collections::vec_deque;
use std::collections::VecDeque;
use std::fmt;

use crate::error::{VoxError, VoxResult};
use crate::value::Value;

/// Double-ended list of [`Value`]s. Order is significant.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct List {
    items: VecDeque<Value>,
}

impl List {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push_back(&mut self, value: impl Into<Value>) {
        self.items.push_back(value.into());
    }

    pub fn push_front(&mut self, value: impl Into<Value>) {
        self.items.push_front(value.into());
    }

    pub fn pop_back(&mut self) -> Option<Value> {
        self.items.pop_back()
    }

    pub fn pop_front(&mut self) -> Option<Value> {
        self.items.pop_front()
    }

    /// Insert `value` so that it ends up at `index`.
    pub fn insert_before(&mut self, index: usize, value: impl Into<Value>) -> VoxResult<()> {
        self.check_index(index, "insert_before")?;
        self.items.insert(index, value.into());
        Ok(())
    }

    /// Insert `value` right after the element at `index`.
    pub fn insert_after(&mut self, index: usize, value: impl Into<Value>) -> VoxResult<()> {
        self.check_index(index, "insert_after")?;
        self.items.insert(index + 1, value.into());
        Ok(())
    }

    pub fn nth(&self, index: usize) -> Option<&Value> {
        self.items.get(index)
    }

    pub fn nth_mut(&mut self, index: usize) -> Option<&mut Value> {
        self.items.get_mut(index)
    }

    pub fn first(&self) -> Option<&Value> {
        self.items.front()
    }

    pub fn last(&self) -> Option<&Value> {
        self.items.back()
    }

    /// Detach the element at `index` and hand its payload back.
    pub fn unlink(&mut self, index: usize) -> VoxResult<Value> {
        self.check_index(index, "unlink")?;
        self.items
            .remove(index)
            .ok_or_else(|| VoxError::invariant("list element vanished during unlink"))
    }

    /// Put `value` at `index`, returning the element it displaced.
    pub fn replace(&mut self, index: usize, value: impl Into<Value>) -> VoxResult<Value> {
        self.check_index(index, "replace")?;
        let slot = self
            .items
            .get_mut(index)
            .ok_or_else(|| VoxError::invariant("list element vanished during replace"))?;
        Ok(std::mem::replace(slot, value.into()))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// True if some element is [`Value::compare`] equal to `value`.
    pub fn contains(&self, value: &Value) -> VoxResult<bool> {
        for item in &self.items {
            if item.compare(value)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Append a copy of every element of `with`, leaving `with` untouched.
    /// Object elements are shared, not deep-copied.
    pub fn merge(&mut self, with: &List) {
        self.items.extend(with.items.iter().cloned());
    }

    pub fn reverse(&mut self) {
        self.items.make_contiguous().reverse();
    }

    /// Detach every element for which `pred(index, value)` holds, in one
    /// forward pass. `index` is the element's position before the call.
    /// The detached elements come back in their original order.
    pub fn unlink_where(&mut self, mut pred: impl FnMut(usize, &Value) -> bool) -> List {
        let mut kept = VecDeque::with_capacity(self.items.len());
        let mut unlinked = List::new();
        for (index, value) in std::mem::take(&mut self.items).into_iter().enumerate() {
            if pred(index, &value) {
                unlinked.items.push_back(value);
            } else {
                kept.push_back(value);
            }
        }
        self.items = kept;
        unlinked
    }

    pub fn iter(&self) -> vec_deque::Iter<'_, Value> {
        self.items.iter()
    }

    /// Element-wise [`Value::compare`].
    pub fn compare(&self, other: &List) -> VoxResult<bool> {
        if self.len() != other.len() {
            return Ok(false);
        }
        for (a, b) in self.items.iter().zip(other.items.iter()) {
            if !a.compare(b)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn check_index(&self, index: usize, operation: &str) -> VoxResult<()> {
        if index < self.items.len() {
            Ok(())
        } else {
            Err(VoxError::argument(format!(
                "List::{operation}: index {index} out of range for length {}",
                self.items.len()
            )))
        }
    }
}

impl<V: Into<Value>> FromIterator<V> for List {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        List {
            items: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl IntoIterator for List {
    type Item = Value;
    type IntoIter = vec_deque::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a List {
    type Item = &'a Value;
    type IntoIter = vec_deque::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for List {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, value) in self.items.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{value}")?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests;
