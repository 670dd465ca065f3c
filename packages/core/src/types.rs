//! Declared types: what a field is allowed to hold.
//!
//! `TypeExpr` is deliberately closed. Every conversion dispatches on it with
//! an exhaustive `match`, so a new variant cannot be added without the
//! compiler pointing at every place that has to handle it.

use std::fmt;
use std::str::FromStr;

use crate::TypedValue;

/// The scalar types a field can declare.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Primitive {
    Str,
    Int,
    Float,
    Bool,
}

impl Primitive {
    pub fn name(self) -> &'static str {
        match self {
            Primitive::Str => "str",
            Primitive::Int => "int",
            Primitive::Float => "float",
            Primitive::Bool => "bool",
        }
    }
}

/// A declared type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeExpr {
    Primitive(Primitive),
    /// Any untyped value, passed through as-is.
    Any,
    /// The value may be missing (`null` or an absent key).
    Optional(Box<TypeExpr>),
    Sequence(Box<TypeExpr>),
    /// A sequence without duplicates. First occurrence wins.
    Set(Box<TypeExpr>),
    /// String-keyed mapping. The key type must be `str`.
    Mapping(Box<TypeExpr>, Box<TypeExpr>),
    /// A declared record type, by registered name.
    Record(String),
    /// A host-registered hook type, by registered name.
    Custom(String),
}

impl TypeExpr {
    pub fn str() -> Self {
        TypeExpr::Primitive(Primitive::Str)
    }

    pub fn int() -> Self {
        TypeExpr::Primitive(Primitive::Int)
    }

    pub fn float() -> Self {
        TypeExpr::Primitive(Primitive::Float)
    }

    pub fn bool() -> Self {
        TypeExpr::Primitive(Primitive::Bool)
    }

    pub fn optional(inner: TypeExpr) -> Self {
        TypeExpr::Optional(Box::new(inner))
    }

    pub fn sequence(item: TypeExpr) -> Self {
        TypeExpr::Sequence(Box::new(item))
    }

    pub fn set(item: TypeExpr) -> Self {
        TypeExpr::Set(Box::new(item))
    }

    /// A `str`-keyed mapping.
    pub fn mapping(value: TypeExpr) -> Self {
        TypeExpr::Mapping(Box::new(TypeExpr::str()), Box::new(value))
    }

    pub fn record(name: impl Into<String>) -> Self {
        TypeExpr::Record(name.into())
    }

    pub fn custom(name: impl Into<String>) -> Self {
        TypeExpr::Custom(name.into())
    }

    /// Parse a textual annotation such as `Optional[List[Pet]]`.
    ///
    /// Bare names that are not builtins parse as [`TypeExpr::Record`]; the
    /// declaration adapter later resolves them against the registry, turning
    /// hook names into [`TypeExpr::Custom`].
    ///
    /// ```rust
    /// use typecats_core::TypeExpr;
    ///
    /// let ty = TypeExpr::parse("Dict[str, List[Pet]]").unwrap();
    /// assert_eq!(
    ///     ty,
    ///     TypeExpr::mapping(TypeExpr::sequence(TypeExpr::record("Pet")))
    /// );
    /// assert_eq!(ty.to_string(), "Dict[str, List[Pet]]");
    /// ```
    pub fn parse(annotation: &str) -> Result<Self, AnnotationError> {
        let mut parser = Parser {
            src: annotation,
            pos: 0,
        };
        let ty = parser.parse_type()?;
        parser.skip_whitespace();
        if parser.pos != annotation.len() {
            return Err(parser.error(format!(
                "unexpected trailing input '{}'",
                &annotation[parser.pos..]
            )));
        }
        Ok(ty)
    }

    /// Names that always resolve to builtins and cannot be registered.
    pub fn is_builtin_name(name: &str) -> bool {
        matches!(
            name,
            "str"
                | "int"
                | "float"
                | "bool"
                | "Any"
                | "Optional"
                | "List"
                | "list"
                | "Sequence"
                | "Set"
                | "set"
                | "Dict"
                | "dict"
                | "Mapping"
        )
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, TypeExpr::Optional(_))
    }

    /// Whether `null` is an acceptable untyped input for this type.
    pub fn accepts_null(&self) -> bool {
        matches!(self, TypeExpr::Optional(_) | TypeExpr::Any)
    }

    /// Whether an already-typed value conforms to this type.
    ///
    /// Used on direct construction and mutation, where no untyped input is
    /// available to structure. Nested records and custom values are matched
    /// by their registered type name. A set must not repeat an element.
    pub fn admits(&self, value: &TypedValue) -> bool {
        match (self, value) {
            (TypeExpr::Optional(_), TypedValue::Missing) => true,
            (TypeExpr::Optional(inner), value) => inner.admits(value),
            (TypeExpr::Any, TypedValue::Raw(_)) => true,
            (TypeExpr::Primitive(Primitive::Str), TypedValue::Str(_)) => true,
            (TypeExpr::Primitive(Primitive::Int), TypedValue::Int(_)) => true,
            (TypeExpr::Primitive(Primitive::Float), TypedValue::Float(_)) => true,
            (TypeExpr::Primitive(Primitive::Bool), TypedValue::Bool(_)) => true,
            (TypeExpr::Sequence(item), TypedValue::Seq(items)) => {
                items.iter().all(|v| item.admits(v))
            }
            (TypeExpr::Set(item), TypedValue::Set(items)) => {
                items.iter().all(|v| item.admits(v))
                    && items.iter().enumerate().all(|(i, v)| !items[..i].contains(v))
            }
            (TypeExpr::Mapping(_, value), TypedValue::Map(entries)) => {
                entries.values().all(|v| value.admits(v))
            }
            (TypeExpr::Record(name), TypedValue::Record(instance)) => instance.type_name() == name,
            (TypeExpr::Custom(name), TypedValue::Custom(custom)) => custom.type_name() == name,
            _ => false,
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Primitive(p) => f.write_str(p.name()),
            TypeExpr::Any => f.write_str("Any"),
            TypeExpr::Optional(inner) => write!(f, "Optional[{}]", inner),
            TypeExpr::Sequence(item) => write!(f, "List[{}]", item),
            TypeExpr::Set(item) => write!(f, "Set[{}]", item),
            TypeExpr::Mapping(key, value) => write!(f, "Dict[{}, {}]", key, value),
            TypeExpr::Record(name) | TypeExpr::Custom(name) => f.write_str(name),
        }
    }
}

impl FromStr for TypeExpr {
    type Err = AnnotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TypeExpr::parse(s)
    }
}

impl From<Primitive> for TypeExpr {
    fn from(p: Primitive) -> Self {
        TypeExpr::Primitive(p)
    }
}

/// A textual annotation that could not be parsed.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot parse annotation '{annotation}' at offset {offset}: {message}")]
pub struct AnnotationError {
    pub annotation: String,
    pub offset: usize,
    pub message: String,
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl Parser<'_> {
    fn error(&self, message: impl Into<String>) -> AnnotationError {
        AnnotationError {
            annotation: self.src.to_string(),
            offset: self.pos,
            message: message.into(),
        }
    }

    fn rest(&self) -> &str {
        &self.src[self.pos..]
    }

    fn skip_whitespace(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.src.len() - trimmed.len();
    }

    fn eat(&mut self, c: char) -> bool {
        self.skip_whitespace();
        if self.rest().starts_with(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, c: char) -> Result<(), AnnotationError> {
        if self.eat(c) {
            Ok(())
        } else {
            Err(self.error(format!("expected '{}'", c)))
        }
    }

    fn parse_name(&mut self) -> Result<&str, AnnotationError> {
        self.skip_whitespace();
        let start = self.pos;
        let len = self
            .rest()
            .find(|c: char| !(c == '_' || unicode_ident::is_xid_continue(c)))
            .unwrap_or(self.rest().len());
        if len == 0 {
            return Err(self.error("expected a type name"));
        }
        self.pos += len;
        Ok(&self.src[start..start + len])
    }

    fn parse_type(&mut self) -> Result<TypeExpr, AnnotationError> {
        let name_start = self.pos;
        let name = self.parse_name()?.to_string();

        let mut args = Vec::new();
        if self.eat('[') {
            loop {
                args.push(self.parse_type()?);
                if !self.eat(',') {
                    break;
                }
            }
            self.expect(']')?;
        }

        let arity = |expected: usize| -> Result<(), AnnotationError> {
            if args.len() == expected {
                Ok(())
            } else {
                Err(AnnotationError {
                    annotation: self.src.to_string(),
                    offset: name_start,
                    message: format!(
                        "'{}' takes {} type argument(s), found {}",
                        name,
                        expected,
                        args.len()
                    ),
                })
            }
        };

        let ty = match name.as_str() {
            "str" | "int" | "float" | "bool" | "Any" => {
                arity(0)?;
                match name.as_str() {
                    "str" => TypeExpr::str(),
                    "int" => TypeExpr::int(),
                    "float" => TypeExpr::float(),
                    "bool" => TypeExpr::bool(),
                    _ => TypeExpr::Any,
                }
            }
            "Optional" => {
                arity(1)?;
                TypeExpr::Optional(Box::new(args.remove(0)))
            }
            "List" | "list" | "Sequence" => {
                arity(1)?;
                TypeExpr::Sequence(Box::new(args.remove(0)))
            }
            "Set" | "set" => {
                arity(1)?;
                TypeExpr::Set(Box::new(args.remove(0)))
            }
            "Dict" | "dict" | "Mapping" => {
                arity(2)?;
                let value = args.remove(1);
                let key = args.remove(0);
                TypeExpr::Mapping(Box::new(key), Box::new(value))
            }
            _ => {
                arity(0)?;
                TypeExpr::Record(name)
            }
        };
        Ok(ty)
    }
}
