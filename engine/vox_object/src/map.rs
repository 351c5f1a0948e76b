//! String-keyed collection of values.
//!
//! Keys are unique; iteration order is unspecified. `Map` backs every
//! feature bag in the engine (Content, Utterance).

use std::collections::hash_map;
use std::fmt;

use rustc_hash::FxHashMap;

use crate::builtins::{FLOAT_CLASS, INT_CLASS, STRING_CLASS};
use crate::error::{VoxError, VoxResult};
use crate::value::Value;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Map {
    entries: FxHashMap<String, Value>,
}

impl Map {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries.get_mut(key)
    }

    /// The value under `key`, or `default` when absent.
    pub fn get_or<'a>(&'a self, key: &str, default: &'a Value) -> &'a Value {
        self.entries.get(key).unwrap_or(default)
    }

    /// Store `value` under `key`. Any prior value is dropped.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Remove and drop the value under `key`.
    pub fn delete(&mut self, key: &str) -> VoxResult<()> {
        match self.entries.remove(key) {
            Some(_) => Ok(()),
            None => Err(missing_key(key)),
        }
    }

    /// Remove the value under `key` and hand it back without dropping it.
    pub fn unlink(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    /// Remove every entry for which `pred(key, value)` holds and hand the
    /// entries back, sorted by key.
    pub fn unlink_where(
        &mut self,
        mut pred: impl FnMut(&str, &Value) -> bool,
    ) -> Vec<(String, Value)> {
        let mut doomed: Vec<String> = self
            .entries
            .iter()
            .filter(|(key, value)| pred(key, value))
            .map(|(key, _)| key.clone())
            .collect();
        doomed.sort_unstable();
        doomed
            .into_iter()
            .filter_map(|key| self.entries.remove_entry(&key))
            .collect()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> hash_map::Iter<'_, String, Value> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn get_int(&self, key: &str) -> VoxResult<i32> {
        self.require(key, INT_CLASS)?.as_int()
    }

    pub fn get_float(&self, key: &str) -> VoxResult<f32> {
        self.require(key, FLOAT_CLASS)?.as_float()
    }

    pub fn get_str(&self, key: &str) -> VoxResult<&str> {
        self.require(key, STRING_CLASS)?.as_str()
    }

    /// Like [`Map::get_int`], but an absent key yields `default`. A value of
    /// the wrong type is still a `TypeMismatch`.
    pub fn get_int_or(&self, key: &str, default: i32) -> VoxResult<i32> {
        self.entries.get(key).map_or(Ok(default), Value::as_int)
    }

    pub fn get_float_or(&self, key: &str, default: f32) -> VoxResult<f32> {
        self.entries.get(key).map_or(Ok(default), Value::as_float)
    }

    pub fn get_str_or<'a>(&'a self, key: &str, default: &'a str) -> VoxResult<&'a str> {
        self.entries.get(key).map_or(Ok(default), Value::as_str)
    }

    /// Same keys, and [`Value::compare`] equal under each.
    pub fn compare(&self, other: &Map) -> VoxResult<bool> {
        if self.len() != other.len() {
            return Ok(false);
        }
        for (key, value) in &self.entries {
            let Some(theirs) = other.entries.get(key) else {
                return Ok(false);
            };
            if !value.compare(theirs)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn require(&self, key: &str, wanted: &str) -> VoxResult<&Value> {
        self.entries.get(key).ok_or_else(|| {
            VoxError::structural(format!("no {wanted} feature named '{key}'"))
        })
    }
}

fn missing_key(key: &str) -> VoxError {
    VoxError::structural(format!("no feature named '{key}'"))
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Map {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Map {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl fmt::Display for Map {
    /// Renders entries sorted by key so output is stable.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut entries: Vec<(&String, &Value)> = self.entries.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        if entries.is_empty() {
            return f.write_str("()");
        }
        f.write_str("((")?;
        for (i, (key, value)) in entries.into_iter().enumerate() {
            if i > 0 {
                f.write_str(") (")?;
            }
            write!(f, "{key} {value}")?;
        }
        f.write_str("))")
    }
}
