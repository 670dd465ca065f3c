//! Typecats core: typed records over untyped data
//!
//! This layer gives meaning to the `Value` trees of `typecats-value`:
//! - `RecordSpec` / `RecordType`: declared records, open or closed
//! - `TypeExpr`: field types, parsed from annotations like `Optional[List[Pet]]`
//! - `Validator`: the non-empty policy attached to required fields
//! - `Registry`: declared records and custom hooks, frozen after setup
//! - `Instance`: a structured record, plus kept unknown keys when open
//!
//! Structuring goes from `Value` to `Instance`, unstructuring goes back.
//! Closed records drop unknown keys; open records keep them and emit them
//! again on unstructure.
//!
//! # Example
//!
//! ```rust
//! use typecats_core::{RecordSpec, Registry, StructureError};
//! use typecats_value::{map, path, Value};
//!
//! let mut builder = Registry::builder();
//! builder
//!     .declare_record(RecordSpec::closed("Pet").field("name", "str").field("age", "int"))
//!     .unwrap();
//! builder
//!     .declare_record(
//!         RecordSpec::open("Owner")
//!             .field("name", "str")
//!             .field("pets", "List[Pet]"),
//!     )
//!     .unwrap();
//! let registry = builder.freeze();
//!
//! let raw = map! {
//!     "name" => "Jo",
//!     "pets" => vec![map! { "name" => "Tom", "age" => 3 }],
//!     "gps_tracker" => true,
//! };
//! let owner = registry.structure("Owner", &raw).unwrap();
//! assert_eq!(owner.unstructure(&registry).unwrap(), raw);
//!
//! let err = registry
//!     .structure("Owner", &map! { "name" => "Jo", "pets" => Vec::<Value>::new() })
//!     .unwrap_err();
//! assert_eq!(err.path(), &path!("pets"));
//! assert!(matches!(err, StructureError::Invalid { .. }));
//! ```

mod declare;
mod engine;
mod error;
mod instance;
mod registry;
mod typed;
mod types;
mod validate;

pub use declare::{Annotation, FieldDefault, FieldDescriptor, FieldSpec, RecordSpec, RecordType};
pub use engine::UnstructureOptions;
pub use error::{DeclarationError, StructureError, UnstructureError, ValidationError};
pub use instance::{Entry, Extras, Instance};
pub use registry::{HookError, Registry, RegistryBuilder};
pub use typed::{CustomValue, TypedValue};
pub use types::{AnnotationError, Primitive, TypeExpr};
pub use validate::{attach_validators, Validator};

pub use typecats_value::{Path, Value};
