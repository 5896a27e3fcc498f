use docket::collection::DocumentId;
use docket::doc;
use docket::filter::field;
use docket::query::QueryPlan;
use docket::{Value, CREATED_AT, IS_ACTIVE, UPDATED_AT};
use docket_int_test::test_util::{cleanup, create_test_context, product, run_test};

#[test]
fn test_create_returns_persisted_document() {
    run_test(
        create_test_context,
        |ctx| {
            let created = ctx.products().create(&product("Widget", 10, 5))?;

            let id = created.id().unwrap();
            assert!(!id.as_str().is_empty());
            assert!(created.get(CREATED_AT).is_timestamp());
            assert!(created.get(UPDATED_AT).is_timestamp());
            assert_eq!(created.get(IS_ACTIVE), Value::Bool(true));
            assert_eq!(created.get("price"), Value::from(10));

            assert_eq!(ctx.products().get(&id)?, created);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_create_rejects_price_not_above_cost() {
    run_test(
        create_test_context,
        |ctx| {
            let err = ctx.products().create(&product("Widget", 3, 5)).unwrap_err();
            assert!(err.is_validation());
            assert!(err.has_violation_for("price"));
            assert!(err
                .violations()
                .iter()
                .any(|v| v.constraint().contains("cost")));
            assert_eq!(ctx.products().count(&docket::filter::all())?, 0);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_create_then_list_round_trips_fields() {
    run_test(
        create_test_context,
        |ctx| {
            let candidate = doc! {
                name: "Widget",
                price: 10.5,
                cost: 5,
                tags: ["tools", "metal"],
                dimensions: { width: 3, height: 4.5 }
            };
            ctx.products().create(&candidate)?;

            let page = ctx
                .products()
                .list(&QueryPlan::new().filter(field("name").eq("Widget")).filter(field("tags").eq("metal")))?;
            assert_eq!(page.len(), 1);

            let listed = &page.documents()[0];
            for key in candidate.keys() {
                assert_eq!(listed.get(key), candidate.get(key), "field {}", key);
            }
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_create_many_reports_positions() {
    run_test(
        create_test_context,
        |ctx| {
            let err = ctx
                .products()
                .create_many(&[product("a", 10, 5), product("b", 1, 5), product("", 10, 5)])
                .unwrap_err();
            assert!(err.has_violation_for("[1].price"));
            assert!(err.has_violation_for("[2].name"));
            assert!(!err.has_violation_for("[0].price"));
            assert_eq!(ctx.products().count(&docket::filter::all())?, 0);

            let created = ctx.products().create_many(&[product("a", 10, 5), product("b", 8, 5)])?;
            let ids: Vec<DocumentId> = created.iter().filter_map(|d| d.id()).collect();
            assert_eq!(ids.len(), 2);
            assert_ne!(ids[0], ids[1]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_unique_field_conflicts() {
    run_test(
        create_test_context,
        |ctx| {
            let products = ctx.products();
            products.ensure_unique("sku")?;

            let mut first = product("a", 10, 5);
            first.put("sku", "AB-1")?;
            products.create(&first)?;

            let mut second = product("b", 10, 5);
            second.put("sku", "AB-1")?;
            let err = products.create(&second).unwrap_err();
            assert_eq!(err.kind(), &docket::errors::ErrorKind::Conflict);
            assert_eq!(products.count(&docket::filter::all())?, 1);
            Ok(())
        },
        cleanup,
    )
}
