//! The Value type - the untyped side of every conversion.
//!
//! A dynamically-typed tree that can represent any decoded document: JSON,
//! YAML, a database row, etc. Structuring turns a `Value` into a typed
//! record; unstructuring produces a `Value` again.

use indexmap::IndexMap;

use crate::{Path, PathError};

/// An untyped, tree-shaped value.
///
/// # Design Notes
///
/// - Uses `IndexMap` so maps keep insertion order. Unstructured records list
///   their fields in declaration order, and open records keep unknown keys
///   where the input had them. Map equality ignores order.
/// - Uses `i64` for integers and keeps floats separate, so `0` and `0.0` keep
///   their kind. Equality is numeric though: `Integer(4) == Float(4.0)`, since
///   a `float` field widens integer input.
/// - `Null` doubles as the "missing" sentinel on the untyped side.
#[derive(Clone, Debug, Default)]
pub enum Value {
    /// Absence of a value.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// Signed 64-bit integer.
    Integer(i64),
    /// 64-bit floating point.
    Float(f64),
    /// UTF-8 string.
    String(String),
    /// Ordered sequence of values.
    Array(Vec<Value>),
    /// Key-value map with string keys.
    Map(IndexMap<String, Value>),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Integer(i), Value::Float(f)) | (Value::Float(f), Value::Integer(i)) => {
                integer_equals_float(*i, *f)
            }
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            _ => false,
        }
    }
}

/// Exact comparison: the float must be integral and in `i64` range.
fn integer_equals_float(i: i64, f: f64) -> bool {
    const LIMIT: f64 = 9_223_372_036_854_775_808.0; // 2^63
    f.fract() == 0.0 && (-LIMIT..LIMIT).contains(&f) && f as i64 == i
}

impl Value {
    /// Create a null value.
    pub fn null() -> Self {
        Value::Null
    }

    /// Create an empty map.
    pub fn map() -> Self {
        Value::Map(IndexMap::new())
    }

    /// Create an empty array.
    pub fn array() -> Self {
        Value::Array(Vec::new())
    }

    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check if this value is a map.
    pub fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    /// Check if this value is an array.
    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    /// A short human-readable name for the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Integers widen to floats here.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut IndexMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Get a reference to a nested value by path.
    ///
    /// Returns `None` if the path doesn't exist or can't be navigated
    /// (e.g., trying to index into a string).
    pub fn get(&self, path: &Path) -> Option<&Value> {
        let mut current = self;
        for component in path.iter() {
            current = match current {
                Value::Map(map) => map.get(component)?,
                Value::Array(arr) => {
                    let index: usize = component.parse().ok()?;
                    arr.get(index)?
                }
                _ => return None,
            };
        }
        Some(current)
    }

    /// Get a mutable reference to a nested value by path.
    pub fn get_mut(&mut self, path: &Path) -> Option<&mut Value> {
        let mut current = self;
        for component in path.iter() {
            current = match current {
                Value::Map(map) => map.get_mut(component)?,
                Value::Array(arr) => {
                    let index: usize = component.parse().ok()?;
                    arr.get_mut(index)?
                }
                _ => return None,
            };
        }
        Some(current)
    }

    /// Set a value at a path, creating intermediate maps as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the path traverses through a non-container value
    /// (e.g., trying to set `owner/name` when `owner` is a string).
    pub fn set(&mut self, path: &Path, value: Value) -> Result<(), PathError> {
        let Some((last, parents)) = path.components.split_last() else {
            *self = value;
            return Ok(());
        };

        let mut current = self;
        for (i, component) in parents.iter().enumerate() {
            current = match current {
                Value::Map(map) => map.entry(component.clone()).or_insert_with(Value::map),
                Value::Array(arr) => {
                    let index = parse_index(component, i)?;
                    arr.get_mut(index).ok_or_else(|| out_of_bounds(component, i))?
                }
                _ => return Err(not_a_container(component, i)),
            };
        }

        let position = parents.len();
        match current {
            Value::Map(map) => {
                map.insert(last.clone(), value);
                Ok(())
            }
            Value::Array(arr) => {
                let index = parse_index(last, position)?;
                if index < arr.len() {
                    arr[index] = value;
                } else if index == arr.len() {
                    arr.push(value);
                } else {
                    return Err(out_of_bounds(last, position));
                }
                Ok(())
            }
            _ => Err(not_a_container(last, position)),
        }
    }

    /// Remove a value at a path, returning it if it existed.
    ///
    /// Removing from a map keeps the order of the remaining keys.
    pub fn remove(&mut self, path: &Path) -> Option<Value> {
        let Some((last, parents)) = path.components.split_last() else {
            return Some(std::mem::take(self));
        };

        let parent_path = Path {
            components: parents.to_vec(),
        };
        match self.get_mut(&parent_path)? {
            Value::Map(map) => map.shift_remove(last),
            Value::Array(arr) => {
                let index: usize = last.parse().ok()?;
                (index < arr.len()).then(|| arr.remove(index))
            }
            _ => None,
        }
    }
}

fn parse_index(component: &str, position: usize) -> Result<usize, PathError> {
    component.parse().map_err(|_| PathError::InvalidComponent {
        component: component.to_string(),
        position,
        message: "invalid array index".to_string(),
    })
}

fn out_of_bounds(component: &str, position: usize) -> PathError {
    PathError::InvalidComponent {
        component: component.to_string(),
        position,
        message: "array index out of bounds".to_string(),
    }
}

fn not_a_container(component: &str, position: usize) -> PathError {
    PathError::InvalidComponent {
        component: component.to_string(),
        position,
        message: "cannot navigate through a non-container value".to_string(),
    }
}

// Conversion from common types

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Array(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(v: IndexMap<String, Value>) -> Self {
        Value::Map(v)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Value::Map(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Build a `Value::Map` from `key => value` pairs, keeping their order.
///
/// # Example
///
/// ```rust
/// use typecats_value::{map, Value};
///
/// let owner = map! {
///     "name" => "Jo",
///     "pets" => vec![map! { "name" => "Tom" }],
/// };
/// assert!(owner.is_map());
/// assert_eq!(map! {}, Value::map());
/// ```
#[macro_export]
macro_rules! map {
    () => {
        $crate::Value::map()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::IndexMap::new();
        $(
            map.insert(::std::string::String::from($key), $crate::Value::from($value));
        )+
        $crate::Value::Map(map)
    }};
}
