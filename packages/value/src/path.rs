//! Paths locating a value inside a `Value` tree.

use std::fmt;

/// Errors related to path parsing and identifier validation.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// A path component is not a valid Unicode identifier.
    #[error("invalid path component '{component}' at position {position}: {message}")]
    InvalidComponent {
        component: String,
        position: usize,
        message: String,
    },
    /// A name that must be an identifier is not one.
    #[error("'{name}' is not a valid identifier: {message}")]
    InvalidIdentifier { name: String, message: String },
}

/// Check that `name` is usable as a record or field name.
///
/// Names must be Unicode identifiers per UAX#31: an `XID_Start` character (or
/// an underscore followed by `XID_Continue`), then any number of
/// `XID_Continue` characters. Unlike path components, purely numeric names are
/// rejected since they cannot name a field.
pub fn validate_identifier(name: &str) -> Result<(), PathError> {
    check_identifier(name).map_err(|message| PathError::InvalidIdentifier {
        name: name.to_string(),
        message,
    })
}

fn check_identifier(s: &str) -> Result<(), String> {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return Err("empty name".to_string());
    };

    let valid_start = unicode_ident::is_xid_start(first)
        || (first == '_'
            && (s.len() == 1
                || chars
                    .clone()
                    .next()
                    .is_some_and(unicode_ident::is_xid_continue)));

    if !valid_start {
        return Err("must start with a letter or underscore".to_string());
    }

    for c in chars {
        if !unicode_ident::is_xid_continue(c) {
            return Err(format!("invalid character '{}' in identifier", c));
        }
    }

    Ok(())
}

/// The location of a value inside a tree, e.g. `pets/0/name`.
///
/// Paths built with [`Path::parse`] contain only identifiers and numeric
/// indices. Paths built at runtime with [`Path::child`] may contain any
/// mapping key, since untyped input is not restricted to identifier keys.
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Path {
    pub components: Vec<String>,
}

impl Path {
    /// The empty path, pointing at the top of a tree.
    pub fn root() -> Self {
        Path::default()
    }

    /// Parse a path string, validating components.
    ///
    /// # Path Syntax
    ///
    /// - Components are separated by `/`
    /// - Empty components are ignored (normalizes `//` and trailing `/`)
    /// - Each component must be a valid identifier or numeric string
    ///
    /// # Examples
    ///
    /// ```rust
    /// use typecats_value::Path;
    ///
    /// let path = Path::parse("pets/0/name").unwrap();
    /// assert_eq!(path.len(), 3);
    ///
    /// assert_eq!(Path::parse("pets/").unwrap(), Path::parse("pets").unwrap());
    /// ```
    pub fn parse(s: &str) -> Result<Self, PathError> {
        let components: Vec<String> = s
            .split('/')
            .filter(|c| !c.is_empty())
            .map(|c| c.to_string())
            .collect();

        for (i, component) in components.iter().enumerate() {
            Self::validate_component(component, i)?;
        }

        Ok(Path { components })
    }

    fn validate_component(component: &str, position: usize) -> Result<(), PathError> {
        // Pure numeric strings index into arrays
        if !component.is_empty() && component.chars().all(|c| c.is_ascii_digit()) {
            return Ok(());
        }

        check_identifier(component).map_err(|message| PathError::InvalidComponent {
            component: component.to_string(),
            position,
            message,
        })
    }

    /// Extend this path by one component without validation.
    #[must_use]
    pub fn child(&self, component: impl Into<String>) -> Path {
        let mut components = self.components.clone();
        components.push(component.into());
        Path { components }
    }

    /// Extend this path by an array index.
    #[must_use]
    pub fn index(&self, index: usize) -> Path {
        self.child(index.to_string())
    }

    /// Check if this path is empty (root path).
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Get the number of components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Iterate over components.
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.components.iter()
    }

    /// The final component, if any.
    pub fn last(&self) -> Option<&str> {
        self.components.last().map(String::as_str)
    }
}

/// The root renders as `<root>` so error messages never show an empty location.
impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.components.is_empty() {
            write!(f, "<root>")
        } else {
            write!(f, "{}", self.components.join("/"))
        }
    }
}

impl std::ops::Index<usize> for Path {
    type Output = String;

    fn index(&self, i: usize) -> &Self::Output {
        &self.components[i]
    }
}

/// Macro for creating validated paths from literals.
///
/// # Example
///
/// ```rust
/// use typecats_value::path;
///
/// let p = path!("pets/0/name");
/// assert_eq!(p.len(), 3);
/// ```
#[macro_export]
macro_rules! path {
    ($s:expr) => {
        $crate::Path::parse($s).expect("invalid path literal")
    };
}
