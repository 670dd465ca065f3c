//! Record declarations and the adapter that normalizes them.
//!
//! A [`RecordSpec`] is what the host writes: names, annotations, defaults.
//! [`describe`] turns it into a [`RecordType`] whose fields carry resolved
//! types, pre-structured defaults, and their compiled validators.

use std::sync::Arc;

use typecats_value::{validate_identifier, Path, Value};

use crate::types::TypeExpr;
use crate::validate::{attach_validators, Validator};
use crate::{DeclarationError, Instance, Registry, StructureError, TypedValue};

/// A field's declared type, either ready-made or as annotation text.
#[derive(Clone, Debug, PartialEq)]
pub enum Annotation {
    Text(String),
    Type(TypeExpr),
}

impl From<&str> for Annotation {
    fn from(s: &str) -> Self {
        Annotation::Text(s.to_string())
    }
}

impl From<String> for Annotation {
    fn from(s: String) -> Self {
        Annotation::Text(s)
    }
}

impl From<TypeExpr> for Annotation {
    fn from(ty: TypeExpr) -> Self {
        Annotation::Type(ty)
    }
}

/// One declared field, as written by the host.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub annotation: Annotation,
    pub default: Option<Value>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, annotation: impl Into<Annotation>) -> Self {
        Self {
            name: name.into(),
            annotation: annotation.into(),
            default: None,
        }
    }

    #[must_use]
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// A record declaration: a name, ordered fields, and whether the record is
/// open (keeps unknown keys) or closed (drops them).
///
/// # Example
///
/// ```rust
/// use typecats_core::{RecordSpec, Registry};
///
/// let mut builder = Registry::builder();
/// let pet = builder
///     .declare_record(
///         RecordSpec::closed("Pet")
///             .field("name", "str")
///             .field_with_default("age", "int", 0),
///     )
///     .unwrap();
/// assert_eq!(pet.fields().len(), 2);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct RecordSpec {
    pub name: String,
    pub is_open: bool,
    pub fields: Vec<FieldSpec>,
}

impl RecordSpec {
    /// A record that discards unknown keys.
    pub fn closed(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_open: false,
            fields: Vec::new(),
        }
    }

    /// A record that keeps unknown keys for a faithful round trip.
    pub fn open(name: impl Into<String>) -> Self {
        Self {
            is_open: true,
            ..Self::closed(name)
        }
    }

    #[must_use]
    pub fn field(self, name: impl Into<String>, annotation: impl Into<Annotation>) -> Self {
        self.with_field(FieldSpec::new(name, annotation))
    }

    #[must_use]
    pub fn field_with_default(
        self,
        name: impl Into<String>,
        annotation: impl Into<Annotation>,
        default: impl Into<Value>,
    ) -> Self {
        self.with_field(FieldSpec::new(name, annotation).with_default(default))
    }

    #[must_use]
    pub fn with_field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }
}

/// A field default, kept both as declared and already structured.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldDefault {
    raw: Value,
    typed: TypedValue,
}

impl FieldDefault {
    pub(crate) fn new(raw: Value, typed: TypedValue) -> Self {
        Self { raw, typed }
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn typed(&self) -> &TypedValue {
        &self.typed
    }
}

/// A normalized field: resolved type, optional default, compiled validator.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldDescriptor {
    pub(crate) name: String,
    pub(crate) ty: TypeExpr,
    pub(crate) default: Option<FieldDefault>,
    pub(crate) validator: Option<Validator>,
}

impl FieldDescriptor {
    pub(crate) fn new(name: impl Into<String>, ty: TypeExpr, default: Option<FieldDefault>) -> Self {
        Self {
            name: name.into(),
            ty,
            default,
            validator: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &TypeExpr {
        &self.ty
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    pub fn default(&self) -> Option<&FieldDefault> {
        self.default.as_ref()
    }

    pub fn validator(&self) -> Option<Validator> {
        self.validator
    }

    /// Whether a missing value is filled in rather than rejected.
    pub fn is_required(&self) -> bool {
        self.default.is_none() && !self.ty.is_optional()
    }
}

/// A declared record type. Immutable once registered.
///
/// Identity is the registered name: two record types with identical fields
/// are still distinct types.
#[derive(Debug)]
pub struct RecordType {
    name: String,
    fields: Vec<FieldDescriptor>,
    is_open: bool,
}

impl RecordType {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// Structure untyped input into an instance of this type.
    ///
    /// Equivalent to `registry.structure(self.name(), raw)`.
    pub fn structure(self: &Arc<Self>, registry: &Registry, raw: &Value) -> Result<Instance, StructureError> {
        registry.structure_record(self, raw, &Path::root())
    }

    /// Build an instance directly from typed field values.
    ///
    /// Omitted fields take their defaults (or the missing sentinel for
    /// optional fields). Supplied values are type-checked and validated
    /// exactly as if they had been structured.
    pub fn construct<K, I>(self: &Arc<Self>, values: I) -> Result<Instance, StructureError>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, TypedValue)>,
    {
        let supplied = values.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Instance::assemble(self, supplied, None, &Path::root(), true)
    }
}

/// Normalize a declaration against the types registered so far.
///
/// Only names already in `registry` resolve, so a declaration can never form
/// a cycle through other records; a direct self-reference is rejected.
pub(crate) fn describe(spec: RecordSpec, registry: &Registry) -> Result<RecordType, DeclarationError> {
    validate_identifier(&spec.name)?;
    if registry.contains(&spec.name) || TypeExpr::is_builtin_name(&spec.name) {
        return Err(DeclarationError::DuplicateType { name: spec.name });
    }

    let mut fields: Vec<FieldDescriptor> = Vec::with_capacity(spec.fields.len());
    for field in spec.fields {
        validate_identifier(&field.name)?;
        if fields.iter().any(|f| f.name == field.name) {
            return Err(DeclarationError::DuplicateField {
                record: spec.name,
                field: field.name,
            });
        }

        let ty = match field.annotation {
            Annotation::Text(text) => {
                TypeExpr::parse(&text).map_err(|source| DeclarationError::Annotation {
                    record: spec.name.clone(),
                    field: field.name.clone(),
                    source,
                })?
            }
            Annotation::Type(ty) => ty,
        };
        let ty = resolve(ty, &spec.name, &field.name, registry)?;

        let default = match field.default {
            Some(raw) => {
                let typed = registry
                    .structure_at(&ty, &raw, &Path::root().child(field.name.as_str()))
                    .map_err(|e| DeclarationError::IncompatibleDefault {
                        record: spec.name.clone(),
                        field: field.name.clone(),
                        source: Box::new(e),
                    })?;
                Some(FieldDefault::new(raw, typed))
            }
            None => None,
        };

        fields.push(FieldDescriptor::new(field.name, ty, default));
    }

    attach_validators(&mut fields);

    Ok(RecordType {
        name: spec.name,
        fields,
        is_open: spec.is_open,
    })
}

fn resolve(
    ty: TypeExpr,
    record: &str,
    field: &str,
    registry: &Registry,
) -> Result<TypeExpr, DeclarationError> {
    let resolve_inner =
        |inner: Box<TypeExpr>| resolve(*inner, record, field, registry).map(Box::new);

    let resolved = match ty {
        TypeExpr::Primitive(_) | TypeExpr::Any => ty,
        TypeExpr::Optional(inner) => TypeExpr::Optional(resolve_inner(inner)?),
        TypeExpr::Sequence(item) => TypeExpr::Sequence(resolve_inner(item)?),
        TypeExpr::Set(item) => TypeExpr::Set(resolve_inner(item)?),
        TypeExpr::Mapping(key, value) => {
            if *key != TypeExpr::str() {
                return Err(DeclarationError::UnsupportedKey {
                    record: record.to_string(),
                    field: field.to_string(),
                    key: key.to_string(),
                });
            }
            TypeExpr::Mapping(key, resolve_inner(value)?)
        }
        TypeExpr::Record(name) | TypeExpr::Custom(name) => {
            if name == record {
                return Err(DeclarationError::Cycle {
                    record: record.to_string(),
                    field: field.to_string(),
                });
            }
            if registry.record(&name).is_some() {
                TypeExpr::Record(name)
            } else if registry.has_hook(&name) {
                TypeExpr::Custom(name)
            } else {
                return Err(DeclarationError::UnknownType {
                    record: record.to_string(),
                    field: field.to_string(),
                    name,
                });
            }
        }
    };
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with_pet() -> Registry {
        let mut builder = Registry::builder();
        builder
            .declare_record(RecordSpec::closed("Pet").field("name", "str"))
            .unwrap();
        builder.freeze()
    }

    #[test]
    fn describe_preserves_order_and_defaults() {
        let registry = registry_with_pet();
        let spec = RecordSpec::closed("Owner")
            .field("name", "str")
            .field("pets", "List[Pet]")
            .field_with_default("age", "int", 0)
            .field("nickname", "Optional[str]");

        let record = describe(spec, &registry).unwrap();
        let names: Vec<&str> = record.fields().iter().map(FieldDescriptor::name).collect();
        assert_eq!(names, ["name", "pets", "age", "nickname"]);

        let age = record.field("age").unwrap();
        assert!(age.has_default());
        assert_eq!(age.default().unwrap().typed(), &TypedValue::Int(0));
        assert_eq!(age.validator(), None);
        assert!(!age.is_required());

        let pets = record.field("pets").unwrap();
        assert_eq!(pets.ty(), &TypeExpr::sequence(TypeExpr::record("Pet")));
        assert_eq!(pets.validator(), Some(Validator::NonEmpty));

        let nickname = record.field("nickname").unwrap();
        assert!(!nickname.is_required());
        assert_eq!(nickname.validator(), None);
    }

    #[test]
    fn unknown_type_is_rejected() {
        let registry = registry_with_pet();
        let err = describe(RecordSpec::closed("Owner").field("cat", "Cat"), &registry).unwrap_err();
        assert!(matches!(err, DeclarationError::UnknownType { name, .. } if name == "Cat"));
    }

    #[test]
    fn self_reference_is_a_cycle() {
        let registry = Registry::default();
        let err = describe(
            RecordSpec::closed("Node").field("children", "List[Node]"),
            &registry,
        )
        .unwrap_err();
        assert!(matches!(err, DeclarationError::Cycle { .. }));
    }

    #[test]
    fn malformed_declarations() {
        let registry = registry_with_pet();

        assert!(matches!(
            describe(RecordSpec::closed("Pet"), &registry),
            Err(DeclarationError::DuplicateType { .. })
        ));
        assert!(matches!(
            describe(RecordSpec::closed("List"), &registry),
            Err(DeclarationError::DuplicateType { .. })
        ));
        assert!(matches!(
            describe(RecordSpec::closed("bad name"), &registry),
            Err(DeclarationError::InvalidName(_))
        ));
        assert!(matches!(
            describe(RecordSpec::closed("A").field("gps-tracker", "bool"), &registry),
            Err(DeclarationError::InvalidName(_))
        ));
        assert!(matches!(
            describe(RecordSpec::closed("A").field("x", "int").field("x", "str"), &registry),
            Err(DeclarationError::DuplicateField { .. })
        ));
        assert!(matches!(
            describe(RecordSpec::closed("A").field("x", "List[int"), &registry),
            Err(DeclarationError::Annotation { .. })
        ));
        assert!(matches!(
            describe(RecordSpec::closed("A").field("x", "Dict[int, str]"), &registry),
            Err(DeclarationError::UnsupportedKey { .. })
        ));
    }

    #[test]
    fn incompatible_default_is_rejected() {
        let registry = Registry::default();
        let err = describe(
            RecordSpec::closed("A").field_with_default("age", "int", "nine"),
            &registry,
        )
        .unwrap_err();
        assert!(matches!(err, DeclarationError::IncompatibleDefault { field, .. } if field == "age"));

        // null is only a valid default for optional fields
        assert!(describe(
            RecordSpec::closed("B").field_with_default("age", "int", Value::Null),
            &registry
        )
        .is_err());
        let record = describe(
            RecordSpec::closed("C").field_with_default("age", "Optional[int]", Value::Null),
            &registry,
        )
        .unwrap();
        assert_eq!(
            record.field("age").unwrap().default().unwrap().typed(),
            &TypedValue::Missing
        );
    }

    #[test]
    fn empty_default_is_trusted() {
        let registry = Registry::default();
        let record = describe(
            RecordSpec::closed("A").field_with_default("name", "str", ""),
            &registry,
        )
        .unwrap();
        assert_eq!(record.field("name").unwrap().validator(), None);
    }

    #[test]
    fn prebuilt_types_are_resolved_too() {
        let registry = registry_with_pet();
        let record = describe(
            RecordSpec::closed("Owner").field("pet", TypeExpr::custom("Pet")),
            &registry,
        )
        .unwrap();
        assert_eq!(record.field("pet").unwrap().ty(), &TypeExpr::record("Pet"));
    }
}
