use docket::collection::{Document, DocumentId};
use docket::doc;
use docket::{Value, CREATED_AT, UPDATED_AT};
use docket::validation::{FieldRule, Schema};
use docket_int_test::test_util::{cleanup, create_test_context, product, run_test};

#[test]
fn test_update_changes_only_supplied_fields() {
    run_test(
        create_test_context,
        |ctx| {
            let created = ctx.products().create(&doc! { name: "Widget", price: 10, cost: 5, stock: 4 })?;
            let id = created.id().unwrap();

            let result = ctx.products().update_with_result(&id, &doc! { price: 12 })?;
            assert_eq!(result.matched_count(), 1);
            assert_eq!(result.modified_count(), 1);

            let updated = ctx.products().get(&id)?;
            assert_eq!(updated.get("price"), Value::from(12));
            assert_eq!(updated.get("name"), Value::from("Widget"));
            assert_eq!(updated.get("stock"), Value::from(4));
            assert_eq!(updated.get(CREATED_AT), created.get(CREATED_AT));
            assert!(updated.get(UPDATED_AT) >= created.get(UPDATED_AT));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_update_unknown_id_is_not_found() {
    run_test(
        create_test_context,
        |ctx| {
            let id = DocumentId::parse("nonexistent-id")?;
            let err = ctx.products().update(&id, &doc! { price: 12 }).unwrap_err();
            assert!(err.is_not_found());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_update_without_change_keeps_updated_at() {
    run_test(
        create_test_context,
        |ctx| {
            let created = ctx.products().create(&product("Widget", 10, 5))?;
            let id = created.id().unwrap();

            let result = ctx.products().update_with_result(&id, &doc! { price: 10 })?;
            assert_eq!(result.matched_count(), 1);
            assert_eq!(result.modified_count(), 0);
            assert_eq!(ctx.products().get(&id)?.get(UPDATED_AT), created.get(UPDATED_AT));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_update_validates_supplied_fields() {
    run_test(
        create_test_context,
        |ctx| {
            let id = ctx.products().create(&product("Widget", 10, 5))?.id().unwrap();

            let err = ctx.products().update(&id, &doc! { price: (-1), status: "gone" }).unwrap_err();
            assert!(err.has_violation_for("price"));
            assert!(err.has_violation_for("status"));

            let err = ctx.products().update(&id, &doc! { updated_at: "2020-01-01T00:00:00Z" }).unwrap_err();
            assert!(err.has_violation_for("updated_at"));

            // cost above the stored price breaks the cross-field rule
            let err = ctx.products().update(&id, &doc! { cost: 11 }).unwrap_err();
            assert!(err.is_validation());
            assert_eq!(ctx.products().get(&id)?.get("cost"), Value::from(5));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_update_keeps_embedded_siblings() {
    run_test(
        create_test_context,
        |ctx| {
            let products = ctx.products();
            let id = products
                .create(&doc! { name: "Widget", price: 10, cost: 5, dimensions: { width: 1, height: 2 } })?
                .id()
                .unwrap();

            let mut fields = Document::new();
            fields.put("dimensions.width", 5)?;
            let updated = products.update(&id, &fields)?;
            assert_eq!(updated.get("dimensions.width"), Value::from(5));
            assert_eq!(updated.get("dimensions.height"), Value::from(2));

            let updated = products.update(&id, &doc! { dimensions: { height: 7 } })?;
            assert_eq!(updated.get("dimensions.width"), Value::from(5));
            assert_eq!(updated.get("dimensions.height"), Value::from(7));

            let err = products.update(&id, &doc! { dimensions: { width: 0 } }).unwrap_err();
            assert!(err.has_violation_for("dimensions.width"));
            assert_eq!(products.get(&id)?.get("dimensions.width"), Value::from(5));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_embedded_required_fields_allow_partial_update() {
    run_test(
        create_test_context,
        |ctx| {
            let schema = Schema::new().field(
                "address",
                FieldRule::document(
                    Schema::new()
                        .field("city", FieldRule::string().required())
                        .field("zip", FieldRule::string().required()),
                ),
            );
            let suppliers = ctx.docket().repository("suppliers", schema)?;
            let id = suppliers
                .create(&doc! { address: { city: "Oslo", zip: "0150" } })?
                .id()
                .unwrap();

            let updated = suppliers.update(&id, &doc! { address: { city: "Bergen" } })?;
            assert_eq!(updated.get("address.city"), Value::from("Bergen"));
            assert_eq!(updated.get("address.zip"), Value::from("0150"));

            // a required embedded field cannot be cleared
            let err = suppliers.update(&id, &doc! { address: { zip: () } }).unwrap_err();
            assert!(err.has_violation_for("address.zip"));
            Ok(())
        },
        cleanup,
    )
}
