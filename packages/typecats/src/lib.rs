//! Typecats: structure untyped data into validated records, and back.
//!
//! Declare record types once, then convert freely between untyped trees
//! (what a JSON decoder produces) and typed instances:
//!
//! - Required fields are non-empty: `""`, `[]`, and `{}` are rejected, while
//!   `0`, `0.0`, and `false` are fine.
//! - Closed records drop unknown keys. Open records keep them and emit them
//!   again on unstructure, overlaid with the current field values.
//! - Custom types plug in through structure/unstructure hooks.
//!
//! The crate is layered:
//! - `typecats-value`: `Value` and `Path`
//! - `typecats-core`: declarations, validators, the registry and engine
//! - `typecats-serde` (feature `json`, on by default): serde and JSON bridge
//!
//! # Example
//!
//! ```rust
//! use typecats::{map, RecordSpec, Registry, TypedValue};
//!
//! let mut builder = Registry::builder();
//! builder.declare_record(
//!     RecordSpec::open("Pet")
//!         .field("name", "str")
//!         .field_with_default("age", "int", 0),
//! )?;
//! let registry = builder.freeze();
//!
//! let pet = registry.structure("Pet", &map! { "name" => "Tom", "chip" => "A1" })?;
//! assert_eq!(pet.get("age"), Some(&TypedValue::Int(0)));
//! assert_eq!(
//!     pet.unstructure(&registry)?,
//!     map! { "chip" => "A1", "name" => "Tom", "age" => 0 }
//! );
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod global;

pub use typecats_core::{
    attach_validators, Annotation, AnnotationError, CustomValue, DeclarationError, Entry, Extras,
    FieldDefault, FieldDescriptor, FieldSpec, HookError, Instance, Primitive, RecordSpec,
    RecordType, Registry, RegistryBuilder, StructureError, TypeExpr, TypedValue,
    UnstructureError, UnstructureOptions, ValidationError, Validator,
};
pub use typecats_value::{map, path, validate_identifier, IndexMap, Path, PathError, Value};

#[cfg(feature = "json")]
pub use typecats_serde::{
    from_value, json_to_value, to_value, value_to_json, Error as SerdeError, TypedRegistry,
};
