//! Feature values.
//!
//! The statically known value types are variants of [`Value`]; anything
//! defined by a plugin through the class registry travels as
//! [`Value::Object`]. Type tests on a value walk the same class names the
//! builtin modules register, so `Value::Int(3).is_type("Object")` holds just
//! like it does for a registry object.

use std::fmt;

use crate::builtins::{FLOAT_CLASS, INT_CLASS, LIST_CLASS, MAP_CLASS, OBJECT_CLASS, STRING_CLASS};
use crate::class::TypeInfo;
use crate::error::{VoxError, VoxResult};
use crate::list::List;
use crate::map::Map;
use crate::object::ObjectRef;

/// A feature value.
#[derive(Clone, Debug)]
pub enum Value {
    Int(i32),
    Float(f32),
    Str(String),
    List(List),
    Map(Map),
    /// An instance of a registry-defined class.
    Object(ObjectRef),
}

impl Value {
    /// Class name of the value.
    pub fn class_name(&self) -> &str {
        match self {
            Value::Int(_) => INT_CLASS,
            Value::Float(_) => FLOAT_CLASS,
            Value::Str(_) => STRING_CLASS,
            Value::List(_) => LIST_CLASS,
            Value::Map(_) => MAP_CLASS,
            Value::Object(obj) => obj.class_name(),
        }
    }

    /// True if `name` is the value's class or one of its ancestors.
    pub fn is_type(&self, name: &str) -> bool {
        match self {
            Value::Object(obj) => obj.is_type(name),
            _ => name == OBJECT_CLASS || name == self.class_name(),
        }
    }

    pub fn as_int(&self) -> VoxResult<i32> {
        match self {
            Value::Int(n) => Ok(*n),
            other => Err(VoxError::type_mismatch(INT_CLASS, other.class_name())),
        }
    }

    pub fn as_float(&self) -> VoxResult<f32> {
        match self {
            Value::Float(x) => Ok(*x),
            other => Err(VoxError::type_mismatch(FLOAT_CLASS, other.class_name())),
        }
    }

    pub fn as_str(&self) -> VoxResult<&str> {
        match self {
            Value::Str(s) => Ok(s),
            other => Err(VoxError::type_mismatch(STRING_CLASS, other.class_name())),
        }
    }

    pub fn as_list(&self) -> VoxResult<&List> {
        match self {
            Value::List(list) => Ok(list),
            other => Err(VoxError::type_mismatch(LIST_CLASS, other.class_name())),
        }
    }

    pub fn as_map(&self) -> VoxResult<&Map> {
        match self {
            Value::Map(map) => Ok(map),
            other => Err(VoxError::type_mismatch(MAP_CLASS, other.class_name())),
        }
    }

    pub fn as_object(&self) -> VoxResult<&ObjectRef> {
        match self {
            Value::Object(obj) => Ok(obj),
            other => Err(VoxError::type_mismatch(OBJECT_CLASS, other.class_name())),
        }
    }

    /// Structural comparison.
    ///
    /// Values of different types are unequal. Objects defer to their class's
    /// compare hook and fail with `MethodNotImplemented` when there is none.
    pub fn compare(&self, other: &Value) -> VoxResult<bool> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Ok(a == b),
            #[allow(clippy::float_cmp)]
            (Value::Float(a), Value::Float(b)) => Ok(a == b),
            (Value::Str(a), Value::Str(b)) => Ok(a == b),
            (Value::List(a), Value::List(b)) => a.compare(b),
            (Value::Map(a), Value::Map(b)) => a.compare(b),
            (Value::Object(a), Value::Object(b)) => a.compare(b),
            _ => Ok(false),
        }
    }
}

/// Equality for tests and lookups: objects compare by identity.
impl PartialEq for Value {
    #[allow(clippy::float_cmp)]
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => f.write_str(s),
            Value::List(list) => write!(f, "{list}"),
            Value::Map(map) => write!(f, "{map}"),
            Value::Object(obj) => write!(f, "{obj}"),
        }
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n)
    }
}

impl From<f32> for Value {
    fn from(x: f32) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<List> for Value {
    fn from(list: List) -> Self {
        Value::List(list)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Map(map)
    }
}

impl From<ObjectRef> for Value {
    fn from(obj: ObjectRef) -> Self {
        Value::Object(obj)
    }
}
