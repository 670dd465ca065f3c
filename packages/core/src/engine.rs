//! The structuring/unstructuring engine.
//!
//! Both directions are a recursive walk driven by the declared `TypeExpr`
//! (structuring) or by the typed value itself (unstructuring). Record types
//! and hooks are looked up in the registry; everything else is built in.
//! Errors at any depth propagate unchanged to the top-level caller.

use std::sync::Arc;

use typecats_value::{IndexMap, Path, Value};

use crate::instance::Extras;
use crate::types::{Primitive, TypeExpr};
use crate::{Instance, RecordType, Registry, StructureError, TypedValue, UnstructureError};

/// Knobs for unstructuring.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UnstructureOptions {
    /// Omit declared fields whose current value equals their default.
    pub strip_defaults: bool,
}

impl UnstructureOptions {
    pub fn strip_defaults() -> Self {
        Self {
            strip_defaults: true,
        }
    }
}

impl Registry {
    /// Structure untyped input into an instance of the record type `name`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use typecats_core::{RecordSpec, Registry, TypedValue};
    /// use typecats_value::map;
    ///
    /// let mut builder = Registry::builder();
    /// builder
    ///     .declare_record(RecordSpec::closed("Pet").field("name", "str").field("age", "int"))
    ///     .unwrap();
    /// let registry = builder.freeze();
    ///
    /// let pet = registry
    ///     .structure("Pet", &map! { "name" => "Tom", "age" => 9, "extra" => 1 })
    ///     .unwrap();
    /// assert_eq!(pet.get("age"), Some(&TypedValue::Int(9)));
    /// assert_eq!(
    ///     pet.unstructure(&registry).unwrap(),
    ///     map! { "name" => "Tom", "age" => 9 }
    /// );
    /// ```
    pub fn structure(&self, name: &str, raw: &Value) -> Result<Instance, StructureError> {
        let root = Path::root();
        let record_type = self
            .record(name)
            .ok_or_else(|| unregistered(&root, name))?;
        self.structure_record(record_type, raw, &root)
    }

    /// Like [`Registry::structure`], but logs the failure and returns `None`.
    pub fn try_structure(&self, name: &str, raw: &Value) -> Option<Instance> {
        match self.structure(name, raw) {
            Ok(instance) => Some(instance),
            Err(e) => {
                log::warn!("Could not structure {}: {}", name, e);
                None
            }
        }
    }

    /// Structure untyped input against any declared type.
    pub fn structure_type(&self, ty: &TypeExpr, raw: &Value) -> Result<TypedValue, StructureError> {
        self.structure_at(ty, raw, &Path::root())
    }

    pub(crate) fn structure_at(
        &self,
        ty: &TypeExpr,
        raw: &Value,
        path: &Path,
    ) -> Result<TypedValue, StructureError> {
        let mismatch = || StructureError::TypeMismatch {
            path: path.clone(),
            expected: ty.to_string(),
            found: raw.kind().to_string(),
        };

        let typed = match ty {
            TypeExpr::Primitive(primitive) => match (primitive, raw) {
                (Primitive::Str, Value::String(s)) => TypedValue::Str(s.clone()),
                (Primitive::Int, Value::Integer(i)) => TypedValue::Int(*i),
                (Primitive::Float, Value::Float(f)) => TypedValue::Float(*f),
                (Primitive::Float, Value::Integer(i)) => TypedValue::Float(*i as f64),
                (Primitive::Bool, Value::Bool(b)) => TypedValue::Bool(*b),
                _ => return Err(mismatch()),
            },
            TypeExpr::Any => TypedValue::Raw(raw.clone()),
            TypeExpr::Optional(inner) => match raw {
                Value::Null => TypedValue::Missing,
                _ => self.structure_at(inner, raw, path)?,
            },
            TypeExpr::Sequence(item) => {
                let items = raw.as_array().ok_or_else(mismatch)?;
                let items = items
                    .iter()
                    .enumerate()
                    .map(|(i, v)| self.structure_at(item, v, &path.index(i)))
                    .collect::<Result<Vec<_>, _>>()?;
                TypedValue::Seq(items)
            }
            TypeExpr::Set(item) => {
                let mut unique: Vec<TypedValue> = Vec::new();
                for (i, v) in raw.as_array().ok_or_else(mismatch)?.iter().enumerate() {
                    let v = self.structure_at(item, v, &path.index(i))?;
                    if !unique.contains(&v) {
                        unique.push(v);
                    }
                }
                TypedValue::Set(unique)
            }
            TypeExpr::Mapping(key, value) => {
                if **key != TypeExpr::str() {
                    return Err(mismatch());
                }
                let entries = raw.as_map().ok_or_else(mismatch)?;
                let entries = entries
                    .iter()
                    .map(|(k, v)| Ok((k.clone(), self.structure_at(value, v, &path.child(k.as_str()))?)))
                    .collect::<Result<IndexMap<_, _>, StructureError>>()?;
                TypedValue::Map(entries)
            }
            TypeExpr::Record(name) => {
                let record_type = self.record(name).ok_or_else(|| unregistered(path, name))?;
                TypedValue::Record(self.structure_record(record_type, raw, path)?)
            }
            TypeExpr::Custom(name) => {
                let hook = self.hook(name).ok_or_else(|| unregistered(path, name))?;
                let custom = (hook.structure)(raw).map_err(|e| StructureError::Hook {
                    path: path.clone(),
                    type_name: name.clone(),
                    message: e.to_string(),
                })?;
                TypedValue::Custom(custom)
            }
        };
        Ok(typed)
    }

    /// Structure one record. Closed records drop unknown keys; open records
    /// keep them in the instance's backing store.
    pub(crate) fn structure_record(
        &self,
        record_type: &Arc<RecordType>,
        raw: &Value,
        path: &Path,
    ) -> Result<Instance, StructureError> {
        let Some(input) = raw.as_map() else {
            return Err(StructureError::TypeMismatch {
                path: path.clone(),
                expected: format!("mapping for {}", record_type.name()),
                found: raw.kind().to_string(),
            });
        };

        let mut supplied = IndexMap::with_capacity(record_type.fields().len());
        for field in record_type.fields() {
            let Some(value) = input.get(field.name()) else {
                continue;
            };
            let field_path = path.child(field.name());

            let typed = match value {
                // Optional fields treat null like an absent key: default or missing.
                Value::Null if field.ty().is_optional() => continue,
                // A required scalar or container given null: let the validator report it.
                Value::Null if !field.ty().accepts_null() && field.validator().is_some() => {
                    TypedValue::Missing
                }
                _ => self.structure_at(field.ty(), value, &field_path)?,
            };
            supplied.insert(field.name().to_string(), typed);
        }

        if !record_type.is_open() {
            return Instance::assemble(record_type, supplied, None, path, false);
        }

        let extras = input
            .iter()
            .filter(|(key, _)| record_type.field(key).is_none())
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect::<Extras>();
        let layout = input.keys().cloned().collect();
        Ok(Instance::assemble(record_type, supplied, Some(extras), path, false)?.with_layout(layout))
    }

    /// Turn a typed value back into untyped data.
    pub fn unstructure(&self, value: &TypedValue) -> Result<Value, UnstructureError> {
        self.unstructure_with(value, &UnstructureOptions::default())
    }

    pub fn unstructure_with(
        &self,
        value: &TypedValue,
        options: &UnstructureOptions,
    ) -> Result<Value, UnstructureError> {
        let raw = match value {
            TypedValue::Missing => Value::Null,
            TypedValue::Bool(b) => Value::Bool(*b),
            TypedValue::Int(i) => Value::Integer(*i),
            TypedValue::Float(f) => Value::Float(*f),
            TypedValue::Str(s) => Value::String(s.clone()),
            TypedValue::Seq(items) | TypedValue::Set(items) => Value::Array(
                items
                    .iter()
                    .map(|v| self.unstructure_with(v, options))
                    .collect::<Result<_, _>>()?,
            ),
            TypedValue::Map(entries) => Value::Map(
                entries
                    .iter()
                    .map(|(k, v)| Ok((k.clone(), self.unstructure_with(v, options)?)))
                    .collect::<Result<_, UnstructureError>>()?,
            ),
            TypedValue::Record(instance) => self.unstructure_instance(instance, options)?,
            TypedValue::Raw(raw) => raw.clone(),
            TypedValue::Custom(custom) => {
                let hook = self.hook(custom.type_name()).ok_or_else(|| {
                    UnstructureError::Unregistered {
                        type_name: custom.type_name().to_string(),
                    }
                })?;
                (hook.unstructure)(custom).map_err(|e| UnstructureError::Hook {
                    type_name: custom.type_name().to_string(),
                    message: e.to_string(),
                })?
            }
        };
        Ok(raw)
    }

    /// Closed records: declared fields in declaration order. Open records:
    /// the kept keys, overlaid with the current declared field values, in
    /// the key order of the structured input. Keys the input did not have
    /// follow, kept keys first.
    pub(crate) fn unstructure_instance(
        &self,
        instance: &Instance,
        options: &UnstructureOptions,
    ) -> Result<Value, UnstructureError> {
        let mut output = match instance.extras() {
            Some(extras) => extras.as_map().clone(),
            None => IndexMap::with_capacity(instance.record_type().fields().len()),
        };

        for field in instance.record_type().fields() {
            let value = instance.get(field.name()).unwrap_or(&TypedValue::Missing);
            let is_default = field.default().is_some_and(|d| d.typed() == value);
            if options.strip_defaults && is_default {
                // A kept key of the same name must not stand in for the default.
                output.shift_remove(field.name());
                continue;
            }
            output.insert(field.name().to_string(), self.unstructure_with(value, options)?);
        }

        if !instance.layout().is_empty() {
            let mut ordered = IndexMap::with_capacity(output.len());
            for key in instance.layout() {
                if let Some((key, value)) = output.shift_remove_entry(key) {
                    ordered.insert(key, value);
                }
            }
            ordered.extend(output);
            output = ordered;
        }

        Ok(Value::Map(output))
    }
}

fn unregistered(path: &Path, name: &str) -> StructureError {
    StructureError::Unregistered {
        path: path.clone(),
        type_name: name.to_string(),
    }
}
