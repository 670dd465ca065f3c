use typecats::{map, path, Entry, RecordSpec, Registry, TypedValue, UnstructureOptions, Value};

fn registry() -> Registry {
    let mut builder = Registry::builder();
    builder
        .declare_record(
            RecordSpec::open("Profile")
                .field("name", "str")
                .field_with_default("visits", "int", 0)
                .field("email", "Optional[str]"),
        )
        .unwrap();
    builder
        .declare_record(
            RecordSpec::closed("Account")
                .field("id", "int")
                .field("profile", "Profile"),
        )
        .unwrap();
    builder.freeze()
}

#[test]
fn unknown_keys_are_kept() {
    let registry = registry();
    let input = map! {
        "name" => "Jo",
        "gps_tracker" => true,
        "notes" => vec![map! { "text" => "hi" }],
    };
    let profile = registry.structure("Profile", &input).unwrap();

    assert_eq!(profile.get("name"), Some(&TypedValue::from("Jo")));
    let extras = profile.extras().unwrap();
    let keys: Vec<&String> = extras.keys().collect();
    assert_eq!(keys, ["gps_tracker", "notes"]);
    assert_eq!(
        profile.lookup("gps_tracker"),
        Some(Entry::Extra(&Value::Bool(true)))
    );

    let raw = profile.unstructure(&registry).unwrap();
    assert_eq!(
        raw,
        map! {
            "name" => "Jo",
            "visits" => 0,
            "email" => Value::Null,
            "gps_tracker" => true,
            "notes" => vec![map! { "text" => "hi" }],
        }
    );
}

#[test]
fn exact_round_trip_when_all_fields_given() {
    let registry = registry();
    let input = map! {
        "zzz" => 1,
        "name" => "Jo",
        "visits" => 4,
        "email" => "jo@example.com",
        "aaa" => map! {},
    };
    let profile = registry.structure("Profile", &input).unwrap();
    assert_eq!(profile.unstructure(&registry).unwrap(), input);
}

#[test]
fn output_follows_input_key_order() {
    let registry = registry();
    let mut profile = registry
        .structure(
            "Profile",
            &map! { "theme" => "dark", "name" => "Jo", "zip" => "02139", "email" => Value::Null },
        )
        .unwrap();
    profile.set("name", "Sam").unwrap();
    profile.extras_mut().unwrap().insert("added", 1);

    let raw = profile.unstructure(&registry).unwrap();
    let keys: Vec<&String> = raw.as_map().unwrap().keys().collect();
    // input keys first, then new kept keys, then fields the input lacked
    assert_eq!(keys, ["theme", "name", "zip", "email", "added", "visits"]);
    assert_eq!(raw.get(&path!("name")), Some(&Value::from("Sam")));
}

#[test]
fn mutation_is_reflected() {
    let registry = registry();
    let mut profile = registry
        .structure("Profile", &map! { "name" => "Jo", "theme" => "dark" })
        .unwrap();

    profile.set("visits", 10).unwrap();
    profile.set("email", "jo@example.com").unwrap();
    profile.extras_mut().unwrap().insert("theme", "light");
    profile.extras_mut().unwrap().remove("missing");

    let raw = profile.unstructure(&registry).unwrap();
    assert_eq!(raw.get(&path!("visits")), Some(&Value::from(10)));
    assert_eq!(raw.get(&path!("email")), Some(&Value::from("jo@example.com")));
    assert_eq!(raw.get(&path!("theme")), Some(&Value::from("light")));
}

#[test]
fn declared_fields_win_over_kept_keys() {
    let registry = registry();
    let mut profile = registry
        .structure("Profile", &map! { "name" => "Jo" })
        .unwrap();
    profile.extras_mut().unwrap().insert("name", "Shadow");

    assert_eq!(profile.lookup("name"), Some(Entry::Field(&TypedValue::from("Jo"))));
    let raw = profile.unstructure(&registry).unwrap();
    assert_eq!(raw.get(&path!("name")), Some(&Value::from("Jo")));
}

#[test]
fn rejected_mutation_leaves_instance_unchanged() {
    let registry = registry();
    let mut profile = registry
        .structure("Profile", &map! { "name" => "Jo" })
        .unwrap();
    let before = profile.clone();

    assert!(profile.set("name", "").is_err());
    assert!(profile.set("visits", "many").is_err());
    assert_eq!(profile, before);
}

#[test]
fn open_records_nest_inside_closed_ones() {
    let registry = registry();
    let input = map! {
        "id" => 7,
        "profile" => map! { "name" => "Jo", "locale" => "en" },
        "legacy_flag" => true,
    };
    let account = registry.structure("Account", &input).unwrap();
    assert!(account.extras().is_none());

    let raw = account.unstructure(&registry).unwrap();
    assert_eq!(raw.get(&path!("profile/locale")), Some(&Value::from("en")));
    assert_eq!(raw.get(&path!("legacy_flag")), None);
}

#[test]
fn strip_defaults_omits_unchanged_defaults() {
    let registry = registry();
    let mut profile = registry
        .structure("Profile", &map! { "name" => "Jo", "visits" => 0, "theme" => "dark" })
        .unwrap();

    let stripped = profile
        .unstructure_with(&registry, &UnstructureOptions::strip_defaults())
        .unwrap();
    assert_eq!(
        stripped,
        map! { "theme" => "dark", "name" => "Jo", "email" => Value::Null }
    );

    profile.set("visits", 2).unwrap();
    let stripped = profile
        .unstructure_with(&registry, &UnstructureOptions::strip_defaults())
        .unwrap();
    assert_eq!(stripped.get(&path!("visits")), Some(&Value::from(2)));
}

#[test]
fn directly_constructed_open_instances_start_empty() {
    let registry = registry();
    let record = registry.record("Profile").unwrap();
    let mut profile = record.construct([("name", TypedValue::from("Jo"))]).unwrap();

    assert!(profile.extras().unwrap().is_empty());
    profile.extras_mut().unwrap().insert("source", "import");
    assert_eq!(
        profile.unstructure(&registry).unwrap(),
        map! { "source" => "import", "name" => "Jo", "visits" => 0, "email" => Value::Null }
    );
}
