//! The converter registry.
//!
//! A [`RegistryBuilder`] collects record declarations and hooks during
//! initialization. [`RegistryBuilder::freeze`] turns it into a [`Registry`],
//! which is immutable and can be shared across threads (e.g. in an `Arc`).
//! Declaring types while other threads structure data is impossible by
//! construction: declaring needs `&mut RegistryBuilder`.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use typecats_value::{validate_identifier, Value};

use crate::declare::{describe, RecordSpec};
use crate::types::TypeExpr;
use crate::{CustomValue, DeclarationError, RecordType};

/// Error type hook functions may return.
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

type StructureFn = dyn Fn(&Value) -> Result<CustomValue, HookError> + Send + Sync;
type UnstructureFn = dyn Fn(&CustomValue) -> Result<Value, HookError> + Send + Sync;

/// Structure and unstructure functions for one custom type.
#[derive(Clone)]
pub(crate) struct Hook {
    pub(crate) structure: Arc<StructureFn>,
    pub(crate) unstructure: Arc<UnstructureFn>,
}

/// A frozen set of record types and hooks.
///
/// Built-in handling of primitives and collections lives in the engine; the
/// registry holds one entry per declared record type and per hook.
#[derive(Clone, Default)]
pub struct Registry {
    records: IndexMap<String, Arc<RecordType>>,
    hooks: HashMap<String, Hook>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// A declared record type by name.
    pub fn record(&self, name: &str) -> Option<&Arc<RecordType>> {
        self.records.get(name)
    }

    /// Declared record types, in declaration order.
    pub fn records(&self) -> impl Iterator<Item = &Arc<RecordType>> {
        self.records.values()
    }

    pub fn has_hook(&self, name: &str) -> bool {
        self.hooks.contains_key(name)
    }

    /// Whether `name` is taken by a record type or a hook.
    pub fn contains(&self, name: &str) -> bool {
        self.records.contains_key(name) || self.hooks.contains_key(name)
    }

    pub(crate) fn hook(&self, name: &str) -> Option<&Hook> {
        self.hooks.get(name)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut hooks: Vec<&String> = self.hooks.keys().collect();
        hooks.sort();
        f.debug_struct("Registry")
            .field("records", &self.records.keys().collect::<Vec<_>>())
            .field("hooks", &hooks)
            .finish()
    }
}

/// Collects declarations before the registry is frozen.
///
/// Nested types must be declared before the records that use them.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    registry: Registry,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a record type.
    ///
    /// Normalizes the fields, compiles their validators, and registers the
    /// type's structure and unstructure functions.
    pub fn declare_record(&mut self, spec: RecordSpec) -> Result<Arc<RecordType>, DeclarationError> {
        let record_type = Arc::new(describe(spec, &self.registry)?);
        log::debug!(
            "Declared {} record type {} with {} field(s)",
            if record_type.is_open() { "open" } else { "closed" },
            record_type.name(),
            record_type.fields().len()
        );
        self.registry
            .records
            .insert(record_type.name().to_string(), Arc::clone(&record_type));
        Ok(record_type)
    }

    /// Register structure and unstructure functions for a custom type.
    ///
    /// Fields refer to the hook by `name`. Values structured by the hook are
    /// stored as [`CustomValue`]s wrapping a `T`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use typecats_core::{Registry, RecordSpec};
    /// use typecats_value::Value;
    ///
    /// #[derive(Debug, PartialEq)]
    /// struct Cents(i64);
    ///
    /// let mut builder = Registry::builder();
    /// builder
    ///     .register_hook(
    ///         "Cents",
    ///         |raw: &Value| raw.as_i64().map(Cents).ok_or("expected an integer"),
    ///         |cents: &Cents| Value::from(cents.0),
    ///     )
    ///     .unwrap();
    /// builder
    ///     .declare_record(RecordSpec::closed("Item").field("price", "Cents"))
    ///     .unwrap();
    /// ```
    pub fn register_hook<T, E, S, U>(
        &mut self,
        name: impl Into<String>,
        structure: S,
        unstructure: U,
    ) -> Result<(), DeclarationError>
    where
        T: Any + Send + Sync + PartialEq + fmt::Debug,
        E: Into<HookError>,
        S: Fn(&Value) -> Result<T, E> + Send + Sync + 'static,
        U: Fn(&T) -> Value + Send + Sync + 'static,
    {
        let name = name.into();
        validate_identifier(&name)?;
        if self.registry.contains(&name) || TypeExpr::is_builtin_name(&name) {
            return Err(DeclarationError::DuplicateType { name });
        }

        let type_name: Arc<str> = Arc::from(name.as_str());
        let hook = Hook {
            structure: Arc::new(move |raw: &Value| -> Result<CustomValue, HookError> {
                structure(raw)
                    .map(|value| CustomValue::new(Arc::clone(&type_name), value))
                    .map_err(Into::into)
            }),
            unstructure: Arc::new(move |custom: &CustomValue| -> Result<Value, HookError> {
                match custom.downcast_ref::<T>() {
                    Some(value) => Ok(unstructure(value)),
                    None => Err(format!("payload is not a {}", std::any::type_name::<T>()).into()),
                }
            }),
        };

        log::debug!("Registered hook {}", name);
        self.registry.hooks.insert(name, hook);
        Ok(())
    }

    /// The registry as declared so far.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Finish initialization.
    pub fn freeze(self) -> Registry {
        self.registry
    }
}
