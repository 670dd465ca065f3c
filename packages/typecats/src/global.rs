//! A process-wide registry, for hosts that want one.
//!
//! The slot is written once. Build and freeze the registry during startup,
//! [`install`] it, then read it from anywhere with [`get`].
//!
//! ```rust
//! use typecats::{global, map, RecordSpec, Registry};
//!
//! let mut builder = Registry::builder();
//! builder.declare_record(RecordSpec::closed("Pet").field("name", "str"))?;
//! global::install(builder.freeze()).expect("registry installed once");
//!
//! let pet = global::get()
//!     .expect("registry installed")
//!     .structure("Pet", &map! { "name" => "Tom" })?;
//! assert_eq!(pet.type_name(), "Pet");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::sync::OnceLock;

use crate::Registry;

static REGISTRY: OnceLock<Registry> = OnceLock::new();

/// Install the process-wide registry.
///
/// Fails with the rejected registry if one is already installed.
pub fn install(registry: Registry) -> Result<&'static Registry, Registry> {
    let mut slot = Some(registry);
    let installed = REGISTRY.get_or_init(|| slot.take().unwrap_or_default());
    match slot {
        Some(rejected) => Err(rejected),
        None => {
            log::debug!("Installed global registry");
            Ok(installed)
        }
    }
}

/// The installed registry, if any.
pub fn get() -> Option<&'static Registry> {
    REGISTRY.get()
}
