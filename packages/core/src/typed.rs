//! Typed values: the structured side of a conversion.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use typecats_value::{IndexMap, Value};

use crate::Instance;

/// A value that has been checked against a declared type.
///
/// `Missing` is the typed "missing sentinel": the value of an `Optional`
/// field that was absent or `null`.
#[derive(Clone, Debug, PartialEq)]
pub enum TypedValue {
    Missing,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Seq(Vec<TypedValue>),
    /// Set elements, in first-seen order.
    Set(Vec<TypedValue>),
    Map(IndexMap<String, TypedValue>),
    Record(Instance),
    /// The value of an `Any` field.
    Raw(Value),
    Custom(CustomValue),
}

impl TypedValue {
    /// True for `Missing` and for an `Any` value that is `null`.
    pub fn is_missing(&self) -> bool {
        matches!(self, TypedValue::Missing | TypedValue::Raw(Value::Null))
    }

    /// Length of a container-like value, `None` for scalars and records.
    pub fn len(&self) -> Option<usize> {
        match self {
            TypedValue::Str(s) => Some(s.chars().count()),
            TypedValue::Seq(items) | TypedValue::Set(items) => Some(items.len()),
            TypedValue::Map(entries) => Some(entries.len()),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            TypedValue::Missing => "missing",
            TypedValue::Bool(_) => "bool",
            TypedValue::Int(_) => "int",
            TypedValue::Float(_) => "float",
            TypedValue::Str(_) => "str",
            TypedValue::Seq(_) => "list",
            TypedValue::Set(_) => "set",
            TypedValue::Map(_) => "dict",
            TypedValue::Record(_) => "record",
            TypedValue::Raw(_) => "any",
            TypedValue::Custom(_) => "custom",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            TypedValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            TypedValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TypedValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TypedValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_slice(&self) -> Option<&[TypedValue]> {
        match self {
            TypedValue::Seq(items) | TypedValue::Set(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, TypedValue>> {
        match self {
            TypedValue::Map(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Instance> {
        match self {
            TypedValue::Record(instance) => Some(instance),
            _ => None,
        }
    }

    pub fn as_record_mut(&mut self) -> Option<&mut Instance> {
        match self {
            TypedValue::Record(instance) => Some(instance),
            _ => None,
        }
    }

    /// Downcast a custom value to its concrete type.
    pub fn as_custom<T: Any>(&self) -> Option<&T> {
        match self {
            TypedValue::Custom(custom) => custom.downcast_ref(),
            _ => None,
        }
    }
}

impl From<bool> for TypedValue {
    fn from(v: bool) -> Self {
        TypedValue::Bool(v)
    }
}

impl From<i64> for TypedValue {
    fn from(v: i64) -> Self {
        TypedValue::Int(v)
    }
}

impl From<i32> for TypedValue {
    fn from(v: i32) -> Self {
        TypedValue::Int(v as i64)
    }
}

impl From<f64> for TypedValue {
    fn from(v: f64) -> Self {
        TypedValue::Float(v)
    }
}

impl From<String> for TypedValue {
    fn from(v: String) -> Self {
        TypedValue::Str(v)
    }
}

impl From<&str> for TypedValue {
    fn from(v: &str) -> Self {
        TypedValue::Str(v.to_string())
    }
}

impl<T: Into<TypedValue>> From<Vec<T>> for TypedValue {
    fn from(v: Vec<T>) -> Self {
        TypedValue::Seq(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<TypedValue>> From<Option<T>> for TypedValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(TypedValue::Missing, Into::into)
    }
}

impl From<Instance> for TypedValue {
    fn from(v: Instance) -> Self {
        TypedValue::Record(v)
    }
}

impl From<CustomValue> for TypedValue {
    fn from(v: CustomValue) -> Self {
        TypedValue::Custom(v)
    }
}

/// A value produced by a host-registered hook.
///
/// The payload is type-erased; equality compares payloads of the same
/// concrete type, and [`CustomValue::downcast_ref`] recovers it.
#[derive(Clone)]
pub struct CustomValue {
    type_name: Arc<str>,
    payload: Arc<dyn Any + Send + Sync>,
    eq: fn(&dyn Any, &dyn Any) -> bool,
    debug: fn(&dyn Any, &mut fmt::Formatter<'_>) -> fmt::Result,
}

impl CustomValue {
    /// Wrap `value` as an instance of the hook type `type_name`.
    pub fn new<T>(type_name: impl Into<Arc<str>>, value: T) -> Self
    where
        T: Any + Send + Sync + PartialEq + fmt::Debug,
    {
        Self {
            type_name: type_name.into(),
            payload: Arc::new(value),
            eq: eq_as::<T>,
            debug: debug_as::<T>,
        }
    }

    /// The registered hook name this value belongs to.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.payload.downcast_ref()
    }
}

fn eq_as<T: Any + PartialEq>(a: &dyn Any, b: &dyn Any) -> bool {
    match (a.downcast_ref::<T>(), b.downcast_ref::<T>()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn debug_as<T: Any + fmt::Debug>(value: &dyn Any, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match value.downcast_ref::<T>() {
        Some(value) => value.fmt(f),
        None => f.write_str("<opaque>"),
    }
}

impl PartialEq for CustomValue {
    fn eq(&self, other: &Self) -> bool {
        self.type_name == other.type_name && (self.eq)(&*self.payload, &*other.payload)
    }
}

impl fmt::Debug for CustomValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.type_name)?;
        (self.debug)(&*self.payload, f)?;
        f.write_str(")")
    }
}
