use docket::collection::Document;
use docket::doc;
use docket::errors::ErrorKind;
use docket::filter::parse_filter;
use docket::query::QueryPlan;
use docket::Value;
use docket_int_test::test_util::{cleanup, create_test_context, insert_test_products, run_test};
use serde_json::json;

#[test]
fn test_api_query_document_drives_listing() {
    run_test(
        create_test_context,
        |ctx| {
            insert_test_products(&ctx)?;
            let query = Document::from_json(&json!({
                "filter": { "price": { "$gte": 5, "$lte": 15 } },
                "sort": "-price",
                "page": 2,
                "page_size": 2,
                "fields": ["name", "price"]
            }))?;
            let plan = QueryPlan::from_document(&query)?;
            let page = ctx.products().list(&plan)?;

            assert_eq!(page.meta().total_count, 5);
            assert_eq!(page.meta().page, 2);
            assert!(page.meta().has_prev);
            let names = page.documents().iter().map(|d| d.get("name")).collect::<Vec<_>>();
            assert_eq!(names, vec![Value::from("washer"), Value::from("nut")]);
            assert!(!page.documents()[0].contains_key("cost"));

            let json = page.to_json();
            assert_eq!(json["meta"]["total_pages"], 3);
            assert_eq!(json["data"][0]["price"], 9);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_parsed_filter_combinators() {
    run_test(
        create_test_context,
        |ctx| {
            insert_test_products(&ctx)?;
            let filter = parse_filter(&doc! {
                or: [{ name: "vice" }, { price: { lt: 5 } }],
                not: { name: { regex: "^c" } }
            })?;
            assert_eq!(ctx.products().count(&filter)?, 1);

            let filter = parse_filter(&doc! { name: { in: ["bolt", "nut", "gear"] } })?;
            assert_eq!(ctx.products().count(&filter)?, 2);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_malformed_query_is_filter_error() {
    run_test(
        create_test_context,
        |_ctx| {
            let err = parse_filter(&doc! { price: { gte: 5, currency: "eur" } }).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::FilterError);

            let err = QueryPlan::from_document(&doc! { sort: 42 }).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::FilterError);
            Ok(())
        },
        cleanup,
    )
}
