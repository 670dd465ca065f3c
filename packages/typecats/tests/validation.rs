use typecats::{
    map, path, RecordSpec, Registry, StructureError, TypedValue, ValidationError, Value,
};

fn registry() -> Registry {
    let mut builder = Registry::builder();
    builder
        .declare_record(
            RecordSpec::closed("Pet")
                .field("name", "str")
                .field("toys", "List[str]")
                .field("ratings", "Dict[str, float]")
                .field("age", "int")
                .field("indoor", "bool")
                .field_with_default("color", "str", "")
                .field("nickname", "Optional[str]"),
        )
        .unwrap();
    builder
        .declare_record(
            RecordSpec::closed("Household")
                .field("pets", "List[Pet]")
                .field("favorite", "Pet")
                .field("sitter", "Optional[Pet]"),
        )
        .unwrap();
    builder.freeze()
}

fn pet() -> Value {
    map! {
        "name" => "Tom",
        "toys" => vec!["mouse"],
        "ratings" => map! { "cuddles" => 5.0 },
        "age" => 3,
        "indoor" => true,
    }
}

fn with(field: &str, value: impl Into<Value>) -> Value {
    let mut raw = pet();
    raw.as_map_mut().unwrap().insert(field.to_string(), value.into());
    raw
}

#[test]
fn non_empty_strings_and_collections() {
    let registry = registry();
    assert!(registry.structure("Pet", &pet()).is_ok());

    for (field, empty) in [
        ("name", Value::from("")),
        ("toys", Value::array()),
        ("ratings", Value::map()),
    ] {
        let err = registry.structure("Pet", &with(field, empty)).unwrap_err();
        assert_eq!(
            err.validation(),
            Some(&ValidationError::Empty {
                field: field.to_string()
            }),
            "{} should reject an empty value",
            field
        );
        assert_eq!(err.path(), &path!(field));
    }
}

#[test]
fn zero_and_false_are_valid() {
    let registry = registry();
    let pet = registry.structure("Pet", &with("indoor", false)).unwrap();
    assert_eq!(pet.get("indoor"), Some(&TypedValue::Bool(false)));

    let pet = registry.structure("Pet", &with("age", 0)).unwrap();
    assert_eq!(pet.get("age"), Some(&TypedValue::Int(0)));
}

#[test]
fn null_for_required_field_is_missing() {
    let registry = registry();
    for field in ["name", "age", "indoor", "toys"] {
        let err = registry
            .structure("Pet", &with(field, Value::Null))
            .unwrap_err();
        assert_eq!(
            err.validation(),
            Some(&ValidationError::Missing {
                field: field.to_string()
            })
        );
    }
}

#[test]
fn absent_required_field() {
    let registry = registry();
    let mut raw = pet();
    raw.remove(&path!("name"));
    let err = registry.structure("Pet", &raw).unwrap_err();
    assert!(matches!(err, StructureError::MissingField { ref field, .. } if field == "name"));
}

#[test]
fn defaults_bypass_validation() {
    let registry = registry();
    let pet = registry.structure("Pet", &pet()).unwrap();
    // the default is empty, which a supplied value could never be
    assert_eq!(pet.get("color"), Some(&TypedValue::from("")));

    let record = registry.record("Pet").unwrap();
    assert!(record.field("color").unwrap().validator().is_none());
    assert!(record.field("name").unwrap().validator().is_some());

    // a defaulted field has no validator, even for supplied values
    let pet = registry.structure("Pet", &with("color", "")).unwrap();
    assert_eq!(pet.get("color"), Some(&TypedValue::from("")));
}

#[test]
fn optional_fields_accept_absence() {
    let registry = registry();
    let pet = registry.structure("Pet", &pet()).unwrap();
    assert_eq!(pet.get("nickname"), Some(&TypedValue::Missing));

    let pet = registry.structure("Pet", &with("nickname", "T")).unwrap();
    assert_eq!(pet.get("nickname"), Some(&TypedValue::from("T")));
}

#[test]
fn type_mismatches() {
    let registry = registry();
    let err = registry.structure("Pet", &with("age", "three")).unwrap_err();
    assert!(matches!(err, StructureError::TypeMismatch { .. }));
    assert_eq!(err.path(), &path!("age"));

    let err = registry
        .structure("Pet", &with("toys", vec![Value::from("ball"), Value::from(7)]))
        .unwrap_err();
    assert_eq!(err.path(), &path!("toys/1"));
}

#[test]
fn nested_failures_propagate_with_path() {
    let registry = registry();

    let err = registry
        .structure(
            "Household",
            &map! {
                "pets" => vec![pet(), with("name", "")],
                "favorite" => pet(),
            },
        )
        .unwrap_err();
    assert_eq!(err.path(), &path!("pets/1/name"));
    assert!(matches!(err, StructureError::Invalid { .. }));

    let err = registry
        .structure(
            "Household",
            &map! { "pets" => vec![pet()], "favorite" => with("ratings", Value::map()) },
        )
        .unwrap_err();
    assert_eq!(err.path(), &path!("favorite/ratings"));
    assert_eq!(err.to_string(), "favorite/ratings: field 'ratings' is required and must not be empty");

    let err = registry
        .structure(
            "Household",
            &map! { "pets" => vec![pet()], "favorite" => pet(), "sitter" => with("toys", Value::array()) },
        )
        .unwrap_err();
    assert_eq!(err.path(), &path!("sitter/toys"));
}

#[test]
fn nested_record_must_be_a_mapping() {
    let registry = registry();
    let err = registry
        .structure(
            "Household",
            &map! { "pets" => vec![pet()], "favorite" => "Tom" },
        )
        .unwrap_err();
    assert!(matches!(err, StructureError::TypeMismatch { .. }));
    assert_eq!(err.path(), &path!("favorite"));
}

#[test]
fn construction_enforces_the_same_policy() {
    let registry = registry();
    let record = registry.record("Household").unwrap();
    let tom = registry.structure("Pet", &pet()).unwrap();

    let err = record
        .construct([
            ("pets", TypedValue::Seq(Vec::new())),
            ("favorite", TypedValue::from(tom.clone())),
        ])
        .unwrap_err();
    assert_eq!(
        err.validation(),
        Some(&ValidationError::Empty {
            field: "pets".to_string()
        })
    );

    let household = record
        .construct([
            ("pets", TypedValue::from(vec![tom.clone()])),
            ("favorite", TypedValue::from(tom)),
        ])
        .unwrap();
    assert_eq!(household.get("sitter"), Some(&TypedValue::Missing));
}

#[test]
fn constructed_sets_must_not_repeat() {
    let mut builder = Registry::builder();
    let bag = builder
        .declare_record(RecordSpec::closed("Bag").field("tags", "Set[str]"))
        .unwrap();
    let registry = builder.freeze();

    let repeated = TypedValue::Set(vec![TypedValue::from("a"), TypedValue::from("a")]);
    let err = bag.construct([("tags", repeated.clone())]).unwrap_err();
    assert!(matches!(err, StructureError::TypeMismatch { .. }));

    let mut instance = bag
        .construct([("tags", TypedValue::Set(vec![TypedValue::from("a")]))])
        .unwrap();
    assert!(instance.set("tags", repeated).is_err());

    // every instance that can be built survives a round trip
    let back = registry
        .structure("Bag", &instance.unstructure(&registry).unwrap())
        .unwrap();
    assert_eq!(back, instance);
}

#[test]
fn try_structure_returns_none_on_failure() {
    let registry = registry();
    assert!(registry.try_structure("Pet", &with("name", "")).is_none());
    assert!(registry.try_structure("Pet", &pet()).is_some());
}
