//! Untyped data for typecats.
//!
//! This layer holds the data that sits on the "unstructured" side of every
//! conversion:
//! - `Value`: an ordered, dynamically-typed tree (what a JSON decoder produces)
//! - `Path`: the location of a value inside a tree, used in error reports
//!
//! Nothing here knows about records or types; see `typecats-core` for that.
//!
//! # Example
//!
//! ```rust
//! use typecats_value::{map, path, Value};
//!
//! let pet = map! { "name" => "Tom", "age" => 9 };
//! assert_eq!(pet.get(&path!("name")), Some(&Value::from("Tom")));
//! ```

pub use indexmap::IndexMap;

mod path;
mod value;

pub use path::{validate_identifier, Path, PathError};
pub use value::Value;
