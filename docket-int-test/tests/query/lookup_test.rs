use docket::doc;
use docket::filter::field;
use docket::query::{Lookup, QueryPlan};
use docket::Value;
use docket_int_test::test_util::{cleanup, create_test_context, run_test};

#[test]
fn test_single_reference_lookup() {
    run_test(
        create_test_context,
        |ctx| {
            let tools = ctx.categories().create(&doc! { name: "Tools" })?;
            let garden = ctx.categories().create(&doc! { name: "Garden" })?;
            let tools_id = tools.id().unwrap().to_string();
            let garden_id = garden.id().unwrap().to_string();

            ctx.products().create(&doc! { name: "Hammer", price: 10, cost: 4, category_id: (tools_id.as_str()) })?;
            ctx.products().create(&doc! { name: "Rake", price: 12, cost: 5, category_id: (garden_id.as_str()) })?;

            // a soft-deleted category resolves to null
            ctx.categories().delete(&garden.id().unwrap(), true)?;

            let plan = QueryPlan::new()
                .sort_by("name", docket::SortOrder::Ascending)
                .lookup(Lookup::new("category_id", "categories", "category"));
            let page = ctx.products().list(&plan)?;

            let hammer = &page.documents()[0];
            assert_eq!(hammer.get("category.name"), Value::from("Tools"));
            let rake = &page.documents()[1];
            assert!(rake.contains_key("category"));
            assert!(rake.get("category").is_null());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_array_reference_lookup_keeps_order() {
    run_test(
        create_test_context,
        |ctx| {
            let a = ctx.products().create(&doc! { name: "A", price: 2, cost: 1 })?;
            let b = ctx.products().create(&doc! { name: "B", price: 2, cost: 1 })?;
            let related = vec![
                b.id().unwrap().to_string(),
                "missing-product".to_string(),
                a.id().unwrap().to_string(),
            ];
            let mut bundle = doc! { name: "Bundle", price: 5, cost: 2 };
            bundle.put("related_ids", related)?;
            ctx.products().create(&bundle)?;

            let plan = QueryPlan::new()
                .filter(field("name").eq("Bundle"))
                .lookup(Lookup::new("related_ids", "products", "related"));
            let page = ctx.products().list(&plan)?;
            let related = page.documents()[0].get("related");
            let items = related.as_array().unwrap();
            assert_eq!(items.len(), 3);
            assert_eq!(items[0].as_document().unwrap().get("name"), Value::from("B"));
            assert!(items[1].is_null());
            assert_eq!(items[2].as_document().unwrap().get("name"), Value::from("A"));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_missing_reference_field_attaches_null() {
    run_test(
        create_test_context,
        |ctx| {
            ctx.products().create(&doc! { name: "Loose", price: 2, cost: 1 })?;
            let plan = QueryPlan::new().lookup(Lookup::new("category_id", "categories", "category"));
            let page = ctx.products().list(&plan)?;
            assert!(page.documents()[0].get("category").is_null());
            Ok(())
        },
        cleanup,
    )
}
