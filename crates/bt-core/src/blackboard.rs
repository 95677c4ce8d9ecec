use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use glam::Vec3;
use thiserror::Error;

/// Errors surfaced by the non-panicking blackboard accessors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlackboardError {
    #[error("blackboard type mismatch for key `{key}`: stored {found}, requested {expected}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// Identity of a blackboard instance.
///
/// Ids are unique per process and survive moves, so a scope can tell whether the enclosing
/// blackboard it was attached to last time is the same instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlackboardId(u64);

impl BlackboardId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// A value stored on the blackboard.
///
/// Primitive variants are stored inline so the typed accessors never allocate once a key exists.
/// Anything else goes through [`Value::Object`].
#[derive(Clone)]
pub enum Value {
    Int(i64),
    Float(f32),
    Bool(bool),
    Vector(Vec3),
    Object(Arc<dyn Any + Send + Sync>),
}

impl Value {
    pub fn object<T: Any + Send + Sync>(value: T) -> Self {
        Value::Object(Arc::new(value))
    }

    /// Like [`Value::object`], but primitives land in their inline variants.
    pub fn from_any<T: Any + Send + Sync>(value: T) -> Self {
        let any: &dyn Any = &value;
        if let Some(&v) = any.downcast_ref::<i64>() {
            Value::Int(v)
        } else if let Some(&v) = any.downcast_ref::<f32>() {
            Value::Float(v)
        } else if let Some(&v) = any.downcast_ref::<bool>() {
            Value::Bool(v)
        } else if let Some(&v) = any.downcast_ref::<Vec3>() {
            Value::Vector(v)
        } else {
            Value::object(value)
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Vector(_) => "vector",
            Value::Object(_) => "object",
        }
    }

    /// The payload as `dyn Any`; primitives expose `i64`, `f32`, `bool` and `Vec3`.
    pub fn as_any(&self) -> &dyn Any {
        match self {
            Value::Int(v) => v,
            Value::Float(v) => v,
            Value::Bool(v) => v,
            Value::Vector(v) => v,
            Value::Object(v) => &**v,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => f.debug_tuple("Int").field(v).finish(),
            Value::Float(v) => f.debug_tuple("Float").field(v).finish(),
            Value::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Value::Vector(v) => f.debug_tuple("Vector").field(v).finish(),
            Value::Object(_) => f.write_str("Object(..)"),
        }
    }
}

impl PartialEq for Value {
    /// Objects compare by identity.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Vector(a), Value::Vector(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<Vec3> for Value {
    fn from(value: Vec3) -> Self {
        Value::Vector(value)
    }
}

/// Hierarchical key/value store.
///
/// Reads fall back to the parent chain when a key is absent locally; writes, removals and
/// [`clear`](Blackboard::clear) only ever touch the local scope. The parent reference is fixed
/// for the lifetime of a `Blackboard<'p>` value: the only way to change it is to
/// [`detach`](Blackboard::detach) and [`attach`](Blackboard::attach) again, which consumes the
/// scope and hands back a new value (keeping its id and its map allocation).
pub struct Blackboard<'p> {
    id: BlackboardId,
    values: HashMap<Box<str>, Value>,
    parent: Option<&'p Blackboard<'p>>,
}

impl Blackboard<'static> {
    pub fn new() -> Self {
        Self {
            id: BlackboardId::next(),
            values: HashMap::new(),
            parent: None,
        }
    }
}

impl Default for Blackboard<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Blackboard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blackboard")
            .field("id", &self.id)
            .field("values", &self.values)
            .field("parent", &self.parent.map(|p| p.id))
            .finish()
    }
}

impl<'p> Blackboard<'p> {
    /// Creates an empty scope whose reads fall back to `parent`.
    pub fn child_of(parent: &'p Blackboard<'p>) -> Self {
        Self {
            id: BlackboardId::next(),
            values: HashMap::new(),
            parent: Some(parent),
        }
    }

    /// Re-attaches this scope under `parent`, keeping id and local values.
    pub fn attach<'a>(self, parent: &'a Blackboard<'a>) -> Blackboard<'a> {
        Blackboard {
            id: self.id,
            values: self.values,
            parent: Some(parent),
        }
    }

    /// Drops the parent link so the scope can be stored and reused later.
    pub fn detach(self) -> Blackboard<'static> {
        Blackboard {
            id: self.id,
            values: self.values,
            parent: None,
        }
    }

    /// A copy of this scope's local values parented to `parent`, for read-only lookups while the
    /// scope itself is stored away.
    pub fn overlay<'a>(&self, parent: &'a Blackboard<'a>) -> Blackboard<'a> {
        Blackboard {
            id: self.id,
            values: self.values.clone(),
            parent: Some(parent),
        }
    }

    pub fn id(&self) -> BlackboardId {
        self.id
    }

    pub fn parent(&self) -> Option<&'p Blackboard<'p>> {
        self.parent
    }

    /// Number of scopes above this one.
    pub fn depth(&self) -> usize {
        self.parent.map_or(0, |p| p.depth() + 1)
    }

    /// Looks a key up locally, then along the parent chain.
    pub fn value(&self, key: &str) -> Option<&Value> {
        match self.values.get(key) {
            Some(value) => Some(value),
            None => self.parent.and_then(|p| p.value(key)),
        }
    }

    /// Looks a key up in the local scope only.
    pub fn local_value(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Generic typed read.
    ///
    /// # Panics
    ///
    /// Panics when the key exists (locally or inherited) with a different type; use
    /// [`try_get`](Blackboard::try_get) to get an error instead.
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.try_get(key).unwrap_or_else(|err| panic!("{err}"))
    }

    pub fn try_get<T: Any>(&self, key: &str) -> Result<Option<&T>, BlackboardError> {
        let Some(value) = self.value(key) else {
            return Ok(None);
        };
        match value.as_any().downcast_ref::<T>() {
            Some(v) => Ok(Some(v)),
            None => Err(BlackboardError::TypeMismatch {
                key: key.to_owned(),
                expected: std::any::type_name::<T>(),
                found: value.type_name(),
            }),
        }
    }

    /// Stores a value in the local scope. `i64`, `f32`, `bool` and `Vec3` are kept inline,
    /// anything else becomes an object.
    pub fn set<T: Any + Send + Sync>(&mut self, key: &str, value: T) {
        self.set_value(key, Value::from_any(value));
    }

    /// Writes to the local scope, reusing the existing key allocation when present.
    pub fn set_value(&mut self, key: &str, value: Value) {
        if let Some(slot) = self.values.get_mut(key) {
            *slot = value;
        } else {
            self.values.insert(key.into(), value);
        }
    }

    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        self.get::<i64>(key).copied().unwrap_or(default)
    }

    pub fn set_int(&mut self, key: &str, value: i64) {
        self.set_value(key, Value::Int(value));
    }

    pub fn get_float(&self, key: &str, default: f32) -> f32 {
        self.get::<f32>(key).copied().unwrap_or(default)
    }

    pub fn set_float(&mut self, key: &str, value: f32) {
        self.set_value(key, Value::Float(value));
    }

    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.get::<bool>(key).copied().unwrap_or(default)
    }

    pub fn set_bool(&mut self, key: &str, value: bool) {
        self.set_value(key, Value::Bool(value));
    }

    pub fn get_vector(&self, key: &str, default: Vec3) -> Vec3 {
        self.get::<Vec3>(key).copied().unwrap_or(default)
    }

    pub fn set_vector(&mut self, key: &str, value: Vec3) {
        self.set_value(key, Value::Vector(value));
    }

    /// `true` if the key is visible from this scope (locally or inherited).
    pub fn contains(&self, key: &str) -> bool {
        self.value(key).is_some()
    }

    pub fn contains_local(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Removes a key from the local scope. Inherited values are untouched.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    /// Empties the local scope. Keeps the map's capacity for reuse.
    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(|k| &**k)
    }
}
