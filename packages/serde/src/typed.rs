//! Registry extension trait for serde and JSON data.

use serde::de::DeserializeOwned;
use serde::Serialize;
use typecats_core::{Instance, Registry, UnstructureOptions};

use crate::convert::{from_value, json_to_value, to_value, value_to_json};
use crate::Error;

/// Extension trait for structuring serde data.
///
/// This trait is implemented for [`Registry`]. Every method goes through the
/// registry's declared record types, so validation and unknown-key handling
/// are the same as for `Value` input.
///
/// # Example
///
/// ```rust
/// use serde::Deserialize;
/// use serde_json::json;
/// use typecats_core::{RecordSpec, Registry};
/// use typecats_serde::TypedRegistry;
///
/// #[derive(Debug, Deserialize, PartialEq)]
/// struct Pet {
///     name: String,
///     age: i64,
/// }
///
/// let mut builder = Registry::builder();
/// builder
///     .declare_record(RecordSpec::closed("Pet").field("name", "str").field("age", "int"))
///     .unwrap();
/// let registry = builder.freeze();
///
/// let pet: Pet = registry
///     .structure_into("Pet", json!({ "name": "Tom", "age": 0, "collar": "red" }))
///     .unwrap();
/// assert_eq!(pet, Pet { name: "Tom".into(), age: 0 });
///
/// assert!(registry
///     .structure_into::<Pet>("Pet", json!({ "name": "", "age": 1 }))
///     .is_err());
/// ```
pub trait TypedRegistry {
    /// Structure JSON input into an instance of the record type `name`.
    fn structure_json(&self, name: &str, json: serde_json::Value) -> Result<Instance, Error>;

    /// Structure any serializable value into an instance of `name`.
    fn structure_from<T: Serialize>(&self, name: &str, data: &T) -> Result<Instance, Error>;

    /// Validate JSON input against `name`, then deserialize the normalized
    /// result into `T`.
    ///
    /// Defaults are filled in and, for closed records, unknown keys are
    /// dropped before `T` sees the data.
    fn structure_into<T: DeserializeOwned>(
        &self,
        name: &str,
        json: serde_json::Value,
    ) -> Result<T, Error>;

    /// Unstructure an instance to JSON.
    fn unstructure_json(&self, instance: &Instance) -> Result<serde_json::Value, Error> {
        self.unstructure_json_with(instance, &UnstructureOptions::default())
    }

    fn unstructure_json_with(
        &self,
        instance: &Instance,
        options: &UnstructureOptions,
    ) -> Result<serde_json::Value, Error>;
}

impl TypedRegistry for Registry {
    fn structure_json(&self, name: &str, json: serde_json::Value) -> Result<Instance, Error> {
        Ok(self.structure(name, &json_to_value(json))?)
    }

    fn structure_from<T: Serialize>(&self, name: &str, data: &T) -> Result<Instance, Error> {
        let value = to_value(data)?;
        Ok(self.structure(name, &value)?)
    }

    fn structure_into<T: DeserializeOwned>(
        &self,
        name: &str,
        json: serde_json::Value,
    ) -> Result<T, Error> {
        let instance = self.structure_json(name, json)?;
        from_value(instance.unstructure(self)?)
    }

    fn unstructure_json_with(
        &self,
        instance: &Instance,
        options: &UnstructureOptions,
    ) -> Result<serde_json::Value, Error> {
        Ok(value_to_json(instance.unstructure_with(self, options)?))
    }
}
