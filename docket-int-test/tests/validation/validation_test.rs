use docket::doc;
use docket::errors::ErrorKind;
use docket::validation::{CrossFieldRule, FieldRule, Schema, Validator};
use docket::Value;
use docket_int_test::test_util::{order_schema, product, product_schema};

fn validator() -> Validator {
    Validator::new(product_schema()).unwrap()
}

#[test]
fn valid_candidate_is_returned_unchanged() {
    let candidate = doc! {
        name: "Widget",
        price: 10,
        cost: 5,
        stock: 3,
        status: "draft",
        sku: "WG-100",
        tags: ["tools"],
        variants: [{ sku: "WG-100-S", stock: 1 }],
        dimensions: { width: 2.5, height: 4 }
    };
    let validated = validator().validate(&candidate).unwrap();
    assert_eq!(validated, candidate);
}

#[test]
fn each_single_constraint_failure_names_its_field() {
    let base = doc! { name: "Widget", price: 10, cost: 5 };
    let cases: Vec<(&str, Value)> = vec![
        ("name", Value::from("")),
        ("name", Value::from(42)),
        ("price", Value::from(0)),
        ("cost", Value::from(-1)),
        ("stock", Value::from(1.5)),
        ("status", Value::from("archived")),
        ("sku", Value::from("wg100")),
        ("tags", Value::from(vec![1, 2])),
        ("dimensions", Value::from(doc! { width: 0 })),
    ];

    for (field, value) in cases {
        let mut candidate = base.clone();
        candidate.put(field, value.clone()).unwrap();
        let err = validator().validate(&candidate).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ValidationError);
        let names_field = err
            .violations()
            .iter()
            .any(|v| v.field() == field || v.field().starts_with(&format!("{}.", field)));
        assert!(names_field, "{} = {} reported {:?}", field, value, err.violations());
    }
}

#[test]
fn violations_are_aggregated() {
    let err = validator()
        .validate(&doc! { name: "", price: 3, cost: 5, stock: (-1), status: "gone" })
        .unwrap_err();
    for field in ["name", "price", "stock", "status"] {
        assert!(err.has_violation_for(field), "missing {}", field);
    }
}

#[test]
fn missing_required_fields_are_reported() {
    let err = validator().validate(&doc! { stock: 2 }).unwrap_err();
    assert!(err.has_violation_for("name"));
    assert!(err.has_violation_for("price"));
    assert!(err.has_violation_for("cost"));
}

#[test]
fn embedded_array_elements_are_validated_by_position() {
    let err = validator()
        .validate(&doc! {
            name: "Widget", price: 10, cost: 5,
            variants: [{ sku: "A", stock: 1 }, { stock: (-2) }]
        })
        .unwrap_err();
    assert!(err.has_violation_for("variants.1.sku"));
    assert!(err.has_violation_for("variants.1.stock"));
    assert!(!err.has_violation_for("variants.0.sku"));
}

#[test]
fn partial_validation_skips_required_and_incomplete_cross_rules() {
    let validator = validator();
    assert!(validator.validate_partial(&doc! { price: 2 }).is_ok());
    assert!(validator.validate_partial(&doc! { price: 2, cost: 5 }).is_err());
    assert!(validator.validate_partial(&doc! { price: (-2) }).unwrap_err().has_violation_for("price"));
}

#[test]
fn reserved_fields_cannot_be_supplied() {
    let mut candidate = product("Widget", 10, 5);
    candidate.put("is_active", false).unwrap();
    candidate.put("created_at", "2024-01-01T00:00:00Z").unwrap();
    let err = validator().validate(&candidate).unwrap_err();
    assert!(err.has_violation_for("is_active"));
    assert!(err.has_violation_for("created_at"));
}

#[test]
fn product_tolerance_is_inclusive() {
    let validator = Validator::new(order_schema()).unwrap();
    assert!(validator
        .validate(&doc! { quantity: 3, unit_price: 1.5, total_price: 4.5 })
        .is_ok());
    assert!(validator
        .validate(&doc! { quantity: 3, unit_price: 1.5, total_price: 4.505 })
        .is_ok());
    let err = validator
        .validate(&doc! { quantity: 3, unit_price: 1.5, total_price: 4.6 })
        .unwrap_err();
    assert!(err.has_violation_for("total_price"));
}

#[test]
fn timestamp_strings_become_timestamps() {
    let validator = Validator::new(order_schema()).unwrap();
    let validated = validator
        .validate(&doc! { quantity: 1, unit_price: 2, total_price: 2, placed_at: "2024-05-01T10:00:00Z" })
        .unwrap();
    assert!(validated.get("placed_at").is_timestamp());

    let err = validator
        .validate(&doc! { quantity: 1, unit_price: 2, total_price: 2, placed_at: "yesterday" })
        .unwrap_err();
    assert!(err.has_violation_for("placed_at"));
}

#[test]
fn custom_rules_and_strict_schemas() {
    let schema = Schema::new()
        .field("start", FieldRule::integer())
        .field("end", FieldRule::integer())
        .rule(CrossFieldRule::custom("ordered", &["end", "start"], |doc| {
            if doc.get("end") >= doc.get("start") {
                Ok(())
            } else {
                Err("must not precede start".to_string())
            }
        }))
        .strict();
    let validator = Validator::new(schema).unwrap();

    assert!(validator.validate(&doc! { start: 1, end: 2 }).is_ok());
    let err = validator.validate(&doc! { start: 3, end: 2, extra: true }).unwrap_err();
    assert!(err.has_violation_for("end"));
    assert!(err.has_violation_for("extra"));
}

#[test]
fn malformed_schema_is_rejected() {
    let err = Validator::new(Schema::new().field("sku", FieldRule::string().pattern("(")))
        .err()
        .unwrap();
    assert_eq!(err.kind(), &ErrorKind::ConfigError);

    let err = Validator::new(Schema::new().field("id", FieldRule::string()))
        .err()
        .unwrap();
    assert_eq!(err.kind(), &ErrorKind::InvalidOperation);
}
