use docket::doc;
use docket::filter::field;
use docket::repository::DeltaOp;
use docket::{Value, UPDATED_AT};
use docket_int_test::test_util::{cleanup, create_test_context, run_test};

#[test]
fn test_increment_and_bounds() {
    run_test(
        create_test_context,
        |ctx| {
            let products = ctx.products();
            let id = products
                .create(&doc! { name: "Widget", price: 10, cost: 5, stock: 3 })?
                .id()
                .unwrap();

            let updated = products.apply_delta(&id, &[DeltaOp::increment("stock", 2)])?;
            assert_eq!(updated.get("stock"), Value::from(5));

            let updated = products.apply_delta(
                &id,
                &[DeltaOp::set_if_min("price", 8), DeltaOp::set_if_max("cost", 4)],
            )?;
            assert_eq!(updated.get("price"), Value::from(8));
            assert_eq!(updated.get("cost"), Value::from(5));

            // stock may not go negative
            let err = products.apply_delta(&id, &[DeltaOp::increment("stock", -6)]).unwrap_err();
            assert!(err.has_violation_for("stock"));
            assert_eq!(products.get(&id)?.get("stock"), Value::from(5));

            // price may not drop to cost
            let err = products.apply_delta(&id, &[DeltaOp::set_if_min("price", 5)]).unwrap_err();
            assert!(err.has_violation_for("price"));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_add_unique_twice_changes_once() {
    run_test(
        create_test_context,
        |ctx| {
            let products = ctx.products();
            let id = products
                .create(&doc! { name: "Widget", price: 10, cost: 5, tags: ["tools"] })?
                .id()
                .unwrap();

            let first = products.apply_delta(&id, &[DeltaOp::add_unique("tags", "metal")])?;
            let second = products.apply_delta(&id, &[DeltaOp::add_unique("tags", "metal")])?;
            assert_eq!(first.get("tags"), Value::from(vec!["tools", "metal"]));
            assert_eq!(second.get("tags"), first.get("tags"));
            assert_eq!(second.get(UPDATED_AT), first.get(UPDATED_AT));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_remove_matching() {
    run_test(
        create_test_context,
        |ctx| {
            let products = ctx.products();
            let id = products
                .create(&doc! {
                    name: "Widget", price: 10, cost: 5,
                    tags: ["a", "b", "a"],
                    variants: [{ sku: "S", stock: 0 }, { sku: "M", stock: 3 }]
                })?
                .id()
                .unwrap();

            let updated = products.apply_delta(
                &id,
                &[
                    DeltaOp::remove_value("tags", "a"),
                    DeltaOp::remove_matching("variants", field("stock").eq(0)),
                ],
            )?;
            assert_eq!(updated.get("tags"), Value::from(vec!["b"]));
            assert_eq!(updated.get("variants.sku"), Value::from(vec!["M"]));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_replace_element_by_sub_key() {
    run_test(
        create_test_context,
        |ctx| {
            let products = ctx.products();
            let id = products
                .create(&doc! {
                    name: "Widget", price: 10, cost: 5,
                    variants: [{ sku: "S", stock: 1 }, { sku: "M", stock: 3 }]
                })?
                .id()
                .unwrap();

            let updated = products.apply_delta(
                &id,
                &[DeltaOp::replace_element("variants", "sku", "M", doc! { stock: 7 })],
            )?;
            assert_eq!(updated.get("variants.1.stock"), Value::from(7));
            assert_eq!(updated.get("variants.0.stock"), Value::from(1));

            let err = products
                .apply_delta(&id, &[DeltaOp::replace_element("variants", "sku", "XL", doc! { stock: 1 })])
                .unwrap_err();
            assert!(err.is_not_found());

            // the element is re-validated against the embedded schema
            let err = products
                .apply_delta(&id, &[DeltaOp::replace_element("variants", "sku", "S", doc! { stock: (-1) })])
                .unwrap_err();
            assert!(err.has_violation_for("variants.0.stock"));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_delta_on_missing_document() {
    run_test(
        create_test_context,
        |ctx| {
            let id = docket::collection::DocumentId::new();
            let err = ctx
                .products()
                .apply_delta(&id, &[DeltaOp::increment("stock", 1)])
                .unwrap_err();
            assert!(err.is_not_found());
            Ok(())
        },
        cleanup,
    )
}
