use docket::collection::DocumentId;
use docket::filter::{all, field};
use docket::query::QueryPlan;
use docket::{Value, DELETED_AT, IS_ACTIVE};
use docket_int_test::test_util::{cleanup, create_test_context, product, run_test};

#[test]
fn test_soft_delete_hides_document_from_default_list() {
    run_test(
        create_test_context,
        |ctx| {
            let products = ctx.products();
            let id = products.create(&product("Widget", 10, 5))?.id().unwrap();
            products.create(&product("Gadget", 20, 5))?;

            let result = products.delete(&id, true)?;
            assert_eq!(result.matched_count(), 1);
            assert_eq!(result.modified_count(), 1);

            let page = products.list(&QueryPlan::new())?;
            assert_eq!(page.len(), 1);
            assert!(page.documents().iter().all(|d| d.id() != Some(id.clone())));

            let page = products.list(&QueryPlan::new().include_inactive(true))?;
            assert_eq!(page.len(), 2);
            let deleted = page
                .documents()
                .iter()
                .find(|d| d.id() == Some(id.clone()))
                .unwrap();
            assert_eq!(deleted.get(IS_ACTIVE), Value::Bool(false));
            assert!(deleted.get(DELETED_AT).is_timestamp());

            assert!(products.get(&id).unwrap_err().is_not_found());
            assert_eq!(products.count(&all())?, 1);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_soft_delete_twice_is_not_found() {
    run_test(
        create_test_context,
        |ctx| {
            let id = ctx.products().create(&product("Widget", 10, 5))?.id().unwrap();
            ctx.products().delete(&id, true)?;
            assert!(ctx.products().delete(&id, true).unwrap_err().is_not_found());
            assert!(ctx
                .products()
                .update(&id, &docket::doc! { price: 11 })
                .unwrap_err()
                .is_not_found());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_reactivate_restores_document() {
    run_test(
        create_test_context,
        |ctx| {
            let products = ctx.products();
            let id = products.create(&product("Widget", 10, 5))?.id().unwrap();
            products.delete(&id, true)?;

            let restored = products.reactivate(&id)?;
            assert_eq!(restored.get(IS_ACTIVE), Value::Bool(true));
            assert!(!restored.contains_key(DELETED_AT));
            assert_eq!(products.list(&QueryPlan::new().filter(field("name").eq("Widget")))?.len(), 1);

            // reactivating an active document changes nothing
            assert_eq!(products.reactivate(&id)?, restored);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_hard_delete_purges() {
    run_test(
        create_test_context,
        |ctx| {
            let products = ctx.products();
            let id = products.create(&product("Widget", 10, 5))?.id().unwrap();

            assert_eq!(products.delete(&id, false)?.deleted_count(), 1);
            assert_eq!(products.list(&QueryPlan::new().include_inactive(true))?.len(), 0);
            assert!(products.reactivate(&id).unwrap_err().is_not_found());

            let unknown = DocumentId::new();
            assert_eq!(products.delete(&unknown, false)?.deleted_count(), 0);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_hard_delete_of_inactive_document() {
    run_test(
        create_test_context,
        |ctx| {
            let products = ctx.products();
            let id = products.create(&product("Widget", 10, 5))?.id().unwrap();
            products.delete(&id, true)?;
            assert_eq!(products.delete(&id, false)?.deleted_count(), 1);
            Ok(())
        },
        cleanup,
    )
}
