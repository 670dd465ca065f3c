//! Record instances and the backing store of open records.

use std::sync::Arc;

use typecats_value::{IndexMap, Path, Value};

use crate::engine::UnstructureOptions;
use crate::{RecordType, Registry, StructureError, TypedValue, UnstructureError};

/// Unknown keys kept by an open record, in input order.
///
/// This is an ordinary in-memory map with no synchronization of its own.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Extras(IndexMap<String, Value>);

impl Extras {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.0.get_mut(key)
    }

    /// Insert a key, returning the previous value.
    ///
    /// A key named like a declared field is stored, but on unstructure the
    /// declared field's value always wins.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Remove a key, keeping the order of the others.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &IndexMap<String, Value> {
        &self.0
    }
}

impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for Extras {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.0
            .extend(iter.into_iter().map(|(k, v)| (k.into(), v.into())));
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Extras {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut extras = Extras::default();
        extras.extend(iter);
        extras
    }
}

impl<'a> IntoIterator for &'a Extras {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// The answer to a key lookup on an instance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Entry<'a> {
    /// A declared field.
    Field(&'a TypedValue),
    /// A key kept in an open record's backing store.
    Extra(&'a Value),
}

/// A structured record: one typed value per declared field, plus the
/// backing store of unknown keys when the record type is open.
///
/// Field values are mutable through [`Instance::set`], which applies the same
/// type check and non-empty policy as construction.
#[derive(Clone, Debug)]
pub struct Instance {
    record_type: Arc<RecordType>,
    values: IndexMap<String, TypedValue>,
    extras: Option<Extras>,
    // key order of the structured input; empty unless open and structured
    layout: Vec<String>,
}

impl Instance {
    /// Build an instance from supplied field values.
    ///
    /// Missing fields are filled from defaults, or the missing sentinel for
    /// optional fields; anything else missing is an error. Validators run on
    /// supplied values only, never on defaults. `check_types` is off when the
    /// values were just produced by structuring against the same types.
    pub(crate) fn assemble(
        record_type: &Arc<RecordType>,
        mut supplied: IndexMap<String, TypedValue>,
        extras: Option<Extras>,
        path: &Path,
        check_types: bool,
    ) -> Result<Instance, StructureError> {
        let mut values = IndexMap::with_capacity(record_type.fields().len());

        for field in record_type.fields() {
            let value = match supplied.shift_remove(field.name()) {
                Some(value) => {
                    check_field(record_type, field.name(), &value, path, check_types)?;
                    value
                }
                None => match field.default() {
                    Some(default) => default.typed().clone(),
                    None if field.ty().is_optional() => TypedValue::Missing,
                    None => {
                        return Err(StructureError::MissingField {
                            path: path.clone(),
                            record: record_type.name().to_string(),
                            field: field.name().to_string(),
                        })
                    }
                },
            };
            values.insert(field.name().to_string(), value);
        }

        if let Some((unknown, _)) = supplied.first() {
            return Err(StructureError::UnknownField {
                path: path.clone(),
                record: record_type.name().to_string(),
                field: unknown.clone(),
            });
        }

        let extras = match extras {
            Some(extras) => Some(extras),
            None if record_type.is_open() => Some(Extras::default()),
            None => None,
        };

        Ok(Instance {
            record_type: Arc::clone(record_type),
            values,
            extras,
            layout: Vec::new(),
        })
    }

    pub(crate) fn with_layout(mut self, layout: Vec<String>) -> Self {
        self.layout = layout;
        self
    }

    pub(crate) fn layout(&self) -> &[String] {
        &self.layout
    }

    pub fn record_type(&self) -> &Arc<RecordType> {
        &self.record_type
    }

    pub fn type_name(&self) -> &str {
        self.record_type.name()
    }

    pub fn is_open(&self) -> bool {
        self.record_type.is_open()
    }

    /// A declared field's current value.
    pub fn get(&self, field: &str) -> Option<&TypedValue> {
        self.values.get(field)
    }

    /// Replace a declared field's value, returning the old one.
    ///
    /// The new value must conform to the field's type and pass its validator;
    /// on error the instance is left unchanged.
    pub fn set(
        &mut self,
        field: &str,
        value: impl Into<TypedValue>,
    ) -> Result<TypedValue, StructureError> {
        let value = value.into();
        check_field(&self.record_type, field, &value, &Path::root(), true)?;
        match self.values.get_mut(field) {
            Some(slot) => Ok(std::mem::replace(slot, value)),
            None => Err(unknown_field(&self.record_type, field, &Path::root())),
        }
    }

    /// Declared fields and their values, in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &TypedValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The backing store of unknown keys. `None` for closed records.
    pub fn extras(&self) -> Option<&Extras> {
        self.extras.as_ref()
    }

    pub fn extras_mut(&mut self) -> Option<&mut Extras> {
        self.extras.as_mut()
    }

    /// Look a key up over declared fields first, then the backing store.
    pub fn lookup(&self, key: &str) -> Option<Entry<'_>> {
        if let Some(value) = self.values.get(key) {
            return Some(Entry::Field(value));
        }
        self.extras
            .as_ref()
            .and_then(|extras| extras.get(key))
            .map(Entry::Extra)
    }

    /// Whether `key` is a declared field or a kept unknown key.
    pub fn contains_key(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }

    /// Turn this instance back into untyped data.
    ///
    /// Closed records produce exactly their declared fields in declaration
    /// order. Open records produce their kept keys overlaid with the current
    /// declared field values.
    pub fn unstructure(&self, registry: &Registry) -> Result<Value, UnstructureError> {
        registry.unstructure_instance(self, &UnstructureOptions::default())
    }

    pub fn unstructure_with(
        &self,
        registry: &Registry,
        options: &UnstructureOptions,
    ) -> Result<Value, UnstructureError> {
        registry.unstructure_instance(self, options)
    }
}

fn check_field(
    record_type: &RecordType,
    name: &str,
    value: &TypedValue,
    path: &Path,
    check_types: bool,
) -> Result<(), StructureError> {
    let Some(field) = record_type.field(name) else {
        return Err(unknown_field(record_type, name, path));
    };
    if let Some(validator) = field.validator() {
        validator
            .check(name, value)
            .map_err(|source| StructureError::Invalid {
                path: path.child(name),
                source,
            })?;
    }
    if check_types && !field.ty().admits(value) {
        return Err(StructureError::TypeMismatch {
            path: path.child(name),
            expected: field.ty().to_string(),
            found: value.kind().to_string(),
        });
    }
    Ok(())
}

fn unknown_field(record_type: &RecordType, name: &str, path: &Path) -> StructureError {
    StructureError::UnknownField {
        path: path.clone(),
        record: record_type.name().to_string(),
        field: name.to_string(),
    }
}

/// Instances are equal when they have the same record type name, the same
/// field values, and the same kept keys.
impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.type_name() == other.type_name()
            && self.values == other.values
            && self.extras == other.extras
    }
}
