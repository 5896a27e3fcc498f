use std::collections::HashSet;

use docket::docket::Docket;
use docket::filter::field;
use docket::query::QueryPlan;
use docket::{SortOrder, Value};
use docket_int_test::test_util::{cleanup, create_test_context, insert_test_products, product, product_schema, run_test};

#[test]
fn test_filtered_sorted_paginated_list() {
    run_test(
        create_test_context,
        |ctx| {
            insert_test_products(&ctx)?;
            let plan = QueryPlan::new()
                .filter(field("price").between_inclusive(5, 15))
                .sort_by("price", SortOrder::Descending)
                .page(1, 2);

            let page = ctx.products().list(&plan)?;
            let meta = page.meta();
            assert_eq!(meta.total_count, 5);
            assert_eq!(meta.total_pages, 3);
            assert_eq!(meta.page, 1);
            assert!(meta.has_next);
            assert!(!meta.has_prev);

            let prices = page.documents().iter().map(|d| d.get("price")).collect::<Vec<_>>();
            assert_eq!(prices, vec![Value::from(15), Value::from(12)]);

            let last = ctx.products().list(&plan.clone().page(3, 2))?;
            assert_eq!(last.len(), 1);
            assert!(!last.meta().has_next);
            assert!(last.meta().has_prev);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_pages_cover_every_document_once() {
    run_test(
        create_test_context,
        |ctx| {
            let candidates = (0..23)
                .map(|i| product(&format!("item-{:02}", i), 10 + (i % 4), 1))
                .collect::<Vec<_>>();
            let created = ctx.products().create_many(&candidates)?;

            let page_size = 5;
            let first = ctx.products().list(&QueryPlan::new().page(1, page_size))?;
            let total_pages = first.meta().total_pages;
            assert_eq!(total_pages, 5);

            let mut seen = HashSet::new();
            for page in 1..=total_pages {
                let plan = QueryPlan::new()
                    .sort_by("price", SortOrder::Ascending)
                    .sort_by("name", SortOrder::Ascending)
                    .page(page, page_size);
                for doc in ctx.products().list(&plan)?.into_documents() {
                    assert!(seen.insert(doc.id().unwrap()), "duplicate across pages");
                }
            }
            assert_eq!(seen.len(), created.len());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_empty_result_page() {
    run_test(
        create_test_context,
        |ctx| {
            let page = ctx.products().list(&QueryPlan::new().filter(field("price").gt(1000)))?;
            assert!(page.is_empty());
            assert_eq!(page.meta().total_count, 0);
            assert_eq!(page.meta().total_pages, 0);
            assert!(!page.meta().has_next);

            let json = page.to_json();
            assert_eq!(json["data"], serde_json::json!([]));
            assert_eq!(json["meta"]["total_count"], 0);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_limit_is_capped_and_zero_rejected() {
    run_test(
        create_test_context,
        |ctx| {
            insert_test_products(&ctx)?;
            let page = ctx.products().list(&QueryPlan::new().limit(5000))?;
            assert_eq!(page.meta().limit, docket::MAX_PAGE_SIZE);
            assert_eq!(page.len(), 7);

            assert!(ctx.products().list(&QueryPlan::new().limit(0)).is_err());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_configured_defaults_apply() {
    run_test(
        create_test_context,
        |_ctx| {
            let docket = Docket::builder()
                .store_address(&format!("memory://{}", uuid::Uuid::new_v4().simple()))
                .default_page_size(3)
                .default_sort("-price")
                .open()?;
            let products = docket.repository("products", product_schema())?;
            for (name, price) in [("a", 4), ("b", 9), ("c", 6), ("d", 2)] {
                products.create(&product(name, price, 1))?;
            }

            let page = products.list(&QueryPlan::new())?;
            assert_eq!(page.meta().limit, 3);
            assert_eq!(page.meta().total_pages, 2);
            let names = page
                .documents()
                .iter()
                .map(|d| d.get("name"))
                .collect::<Vec<_>>();
            assert_eq!(names, vec![Value::from("b"), Value::from("c"), Value::from("a")]);

            // an explicit sort wins over the configured one
            let page = products.list(&QueryPlan::new().sort_by("name", SortOrder::Ascending))?;
            assert_eq!(page.documents()[0].get("name"), Value::from("a"));
            docket.close()
        },
        cleanup,
    )
}

#[test]
fn test_projection_keeps_id() {
    run_test(
        create_test_context,
        |ctx| {
            insert_test_products(&ctx)?;
            let page = ctx.products().list(&QueryPlan::new().project(&["name"]))?;
            for doc in page.documents() {
                assert!(doc.contains_key("name"));
                assert!(doc.contains_key("id"));
                assert!(!doc.contains_key("price"));
            }
            Ok(())
        },
        cleanup,
    )
}
