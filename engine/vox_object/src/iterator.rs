//! Uniform forward iteration over containers.
//!
//! [`iterator_get`] hands out a single-pass iterator over a [`List`] or a
//! [`Map`], or `None` when the container is empty. The iterator borrows the
//! container, so the container cannot be structurally mutated while an
//! iterator is alive. Detaching entries during a walk goes through
//! [`Container::unlink_entries`], which visits every entry once and unlinks
//! the ones the caller picks.

use std::collections::{hash_map, vec_deque};

use crate::list::List;
use crate::map::Map;
use crate::value::Value;

/// A container that [`iterator_get`] can walk.
pub trait Container {
    fn entry_count(&self) -> usize;

    fn container_iter(&self) -> ContainerIter<'_>;

    /// Walk every entry once and unlink those for which `pred` holds,
    /// handing back their payloads.
    fn unlink_entries<F>(&mut self, pred: F) -> Vec<Value>
    where
        Self: Sized,
        F: FnMut(Entry<'_>) -> bool;
}

impl Container for List {
    fn entry_count(&self) -> usize {
        self.len()
    }

    fn container_iter(&self) -> ContainerIter<'_> {
        ContainerIter::List {
            inner: self.iter(),
            index: 0,
        }
    }

    fn unlink_entries<F>(&mut self, mut pred: F) -> Vec<Value>
    where
        F: FnMut(Entry<'_>) -> bool,
    {
        self.unlink_where(|index, value| pred(Entry::Element { index, value }))
            .into_iter()
            .collect()
    }
}

impl Container for Map {
    fn entry_count(&self) -> usize {
        self.len()
    }

    fn container_iter(&self) -> ContainerIter<'_> {
        ContainerIter::Map { inner: self.iter() }
    }

    fn unlink_entries<F>(&mut self, mut pred: F) -> Vec<Value>
    where
        F: FnMut(Entry<'_>) -> bool,
    {
        self.unlink_where(|key, value| pred(Entry::Pair { key, value }))
            .into_iter()
            .map(|(_, value)| value)
            .collect()
    }
}

/// An iterator over `container`, or `None` if it is empty.
pub fn iterator_get<C: Container + ?Sized>(container: &C) -> Option<ContainerIter<'_>> {
    if container.entry_count() == 0 {
        None
    } else {
        Some(container.container_iter())
    }
}

/// One element yielded by a [`ContainerIter`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Entry<'a> {
    /// A list element and its position.
    Element { index: usize, value: &'a Value },
    /// A map entry.
    Pair { key: &'a str, value: &'a Value },
}

impl<'a> Entry<'a> {
    /// The map key; `None` for list elements.
    pub fn key(&self) -> Option<&'a str> {
        match self {
            Entry::Element { .. } => None,
            Entry::Pair { key, .. } => Some(key),
        }
    }

    pub fn value(&self) -> &'a Value {
        match self {
            Entry::Element { value, .. } | Entry::Pair { value, .. } => value,
        }
    }
}

/// Single-pass iterator over a list or a map.
pub enum ContainerIter<'a> {
    List {
        inner: vec_deque::Iter<'a, Value>,
        index: usize,
    },
    Map {
        inner: hash_map::Iter<'a, String, Value>,
    },
}

impl<'a> Iterator for ContainerIter<'a> {
    type Item = Entry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            ContainerIter::List { inner, index } => {
                let value = inner.next()?;
                let entry = Entry::Element {
                    index: *index,
                    value,
                };
                *index += 1;
                Some(entry)
            }
            ContainerIter::Map { inner } => inner.next().map(|(key, value)| Entry::Pair {
                key: key.as_str(),
                value,
            }),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            ContainerIter::List { inner, .. } => inner.size_hint(),
            ContainerIter::Map { inner } => inner.size_hint(),
        }
    }
}
