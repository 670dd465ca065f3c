//! Serde integration for typecats
//!
//! This layer connects the untyped side of typecats to serde. It adds:
//! - `json_to_value` / `value_to_json`: `Value` <-> `serde_json::Value`
//! - `from_value` / `to_value`: `Value` <-> any serde type
//! - `TypedRegistry`: structure JSON or serde data through a `Registry`
//!
//! Structuring still runs through the registry, so the non-empty policy and
//! open-record retention apply to JSON input exactly as to `Value` input.
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use typecats_core::{RecordSpec, Registry};
//! use typecats_serde::TypedRegistry;
//!
//! let mut builder = Registry::builder();
//! builder
//!     .declare_record(RecordSpec::open("Pet").field("name", "str"))
//!     .unwrap();
//! let registry = builder.freeze();
//!
//! let input = json!({ "name": "Tom", "collar": "red" });
//! let pet = registry.structure_json("Pet", input.clone()).unwrap();
//! assert_eq!(registry.unstructure_json(&pet).unwrap(), input);
//! ```

mod convert;
mod error;
mod typed;

pub use convert::{from_value, json_to_value, to_value, value_to_json};
pub use error::Error;
pub use typed::TypedRegistry;
