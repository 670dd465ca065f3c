//! Non-empty validation policy for required fields.
//!
//! Choosing a check ([`Validator::compile`]) is kept apart from running it
//! ([`Validator::check`]). Compilation happens once per field at declaration
//! time and never fails; checks run at construction time against real data.

use crate::declare::FieldDescriptor;
use crate::types::{Primitive, TypeExpr};
use crate::{TypedValue, ValidationError};

/// The check attached to a required field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Validator {
    /// Strings, sequences, sets, and mappings must have at least one element.
    NonEmpty,
    /// Scalars must be present. `0`, `0.0`, and `false` are valid values.
    Present,
}

impl Validator {
    /// Pick the check for a field of type `ty` that has no default.
    ///
    /// Nested records get no check of their own: their required fields are
    /// validated when the nested record is constructed. Optional fields get no
    /// check because absence is legal for them.
    pub fn compile(ty: &TypeExpr) -> Option<Validator> {
        match ty {
            TypeExpr::Primitive(Primitive::Str)
            | TypeExpr::Sequence(_)
            | TypeExpr::Set(_)
            | TypeExpr::Mapping(..) => Some(Validator::NonEmpty),
            TypeExpr::Primitive(Primitive::Int | Primitive::Float | Primitive::Bool)
            | TypeExpr::Any
            | TypeExpr::Custom(_) => Some(Validator::Present),
            TypeExpr::Record(_) | TypeExpr::Optional(_) => None,
        }
    }

    pub fn check(self, field: &str, value: &TypedValue) -> Result<(), ValidationError> {
        if value.is_missing() {
            return Err(ValidationError::Missing {
                field: field.to_string(),
            });
        }
        match self {
            Validator::Present => Ok(()),
            Validator::NonEmpty => match value.len() {
                Some(0) => Err(ValidationError::Empty {
                    field: field.to_string(),
                }),
                _ => Ok(()),
            },
        }
    }
}

/// Attach the policy to every descriptor, in place.
///
/// Fields with a default never get a validator: defaults are trusted.
pub fn attach_validators(fields: &mut [FieldDescriptor]) {
    for field in fields {
        field.validator = if field.has_default() {
            None
        } else {
            Validator::compile(&field.ty)
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declare::FieldDefault;
    use typecats_value::{IndexMap, Value};

    #[test]
    fn containers_must_be_non_empty() {
        for ty in [
            TypeExpr::str(),
            TypeExpr::sequence(TypeExpr::int()),
            TypeExpr::set(TypeExpr::int()),
            TypeExpr::mapping(TypeExpr::int()),
        ] {
            assert_eq!(Validator::compile(&ty), Some(Validator::NonEmpty), "{}", ty);
        }

        let v = Validator::NonEmpty;
        assert_eq!(
            v.check("name", &TypedValue::from("")),
            Err(ValidationError::Empty {
                field: "name".to_string()
            })
        );
        assert!(v.check("name", &TypedValue::from("x")).is_ok());
        assert!(v.check("tags", &TypedValue::Seq(vec![])).is_err());
        assert!(v.check("attrs", &TypedValue::Map(IndexMap::new())).is_err());
    }

    #[test]
    fn scalars_only_need_presence() {
        for ty in [TypeExpr::int(), TypeExpr::float(), TypeExpr::bool()] {
            assert_eq!(Validator::compile(&ty), Some(Validator::Present), "{}", ty);
        }

        let v = Validator::Present;
        assert!(v.check("age", &TypedValue::Int(0)).is_ok());
        assert!(v.check("weight", &TypedValue::Float(0.0)).is_ok());
        assert!(v.check("good", &TypedValue::Bool(false)).is_ok());
        assert_eq!(
            v.check("age", &TypedValue::Missing),
            Err(ValidationError::Missing {
                field: "age".to_string()
            })
        );
    }

    #[test]
    fn records_and_optionals_get_no_validator() {
        assert_eq!(Validator::compile(&TypeExpr::record("Pet")), None);
        assert_eq!(Validator::compile(&TypeExpr::optional(TypeExpr::str())), None);
    }

    #[test]
    fn any_rejects_null() {
        assert_eq!(Validator::compile(&TypeExpr::Any), Some(Validator::Present));
        assert!(Validator::Present
            .check("extra", &TypedValue::Raw(Value::Null))
            .is_err());
        assert!(Validator::Present
            .check("extra", &TypedValue::Raw(Value::from("")))
            .is_ok());
    }

    #[test]
    fn attach_skips_defaulted_fields() {
        let mut fields = vec![
            FieldDescriptor::new("name", TypeExpr::str(), None),
            FieldDescriptor::new(
                "nickname",
                TypeExpr::str(),
                Some(FieldDefault::new(Value::from(""), TypedValue::from(""))),
            ),
            FieldDescriptor::new("owner", TypeExpr::record("Person"), None),
        ];
        attach_validators(&mut fields);

        assert_eq!(fields[0].validator(), Some(Validator::NonEmpty));
        assert_eq!(fields[1].validator(), None);
        assert_eq!(fields[2].validator(), None);
    }
}
