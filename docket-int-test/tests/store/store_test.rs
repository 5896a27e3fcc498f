use std::sync::Arc;
use std::time::Duration;

use docket::docket::Docket;
use docket::errors::ErrorKind;
use docket::filter::all;
use docket::query::QueryPlan;
use docket::store::memory::InMemoryStore;
use docket::store::{DocumentStore, StoreConfig};
use docket_int_test::test_util::{cleanup, create_test_context, product, product_schema, run_test};

#[test]
fn test_unsupported_address_is_connection_error() {
    run_test(
        create_test_context,
        |_ctx| {
            let err = Docket::builder().store_address("tcp://db.local:27017").open().unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::ConnectionError);

            let err = Docket::builder().store_address("memory://").open().unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::ConnectionError);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_unreachable_backend_fails_to_connect() {
    run_test(
        create_test_context,
        |_ctx| {
            let backend = Arc::new(InMemoryStore::new("offline"));
            backend.set_online(false);
            let err = Docket::builder()
                .store_address("memory://offline")
                .pool_size(1, 2)
                .connect_timeout(Duration::from_millis(50))
                .backend(backend)
                .open()
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::ConnectionError);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_invalid_pool_settings_are_rejected() {
    run_test(
        create_test_context,
        |_ctx| {
            let result = Docket::builder().store_address("memory://pool").pool_size(5, 2).open();
            assert!(result.is_err());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_pool_exhaustion_is_storage_unavailable() {
    run_test(
        create_test_context,
        |_ctx| {
            let config = StoreConfig::new()
                .address("memory://exhausted")
                .pool_size(1, 1)
                .socket_timeout(Duration::from_millis(50));
            let store = DocumentStore::connect(config)?;

            let held = store.pool().checkout()?;
            let err = store.count("products", &all()).unwrap_err();
            assert!(err.is_storage_unavailable());

            drop(held);
            assert_eq!(store.count("products", &all())?, 0);
            store.close()
        },
        cleanup,
    )
}

#[test]
fn test_partition_surfaces_as_storage_unavailable() {
    run_test(
        create_test_context,
        |_ctx| {
            let backend = Arc::new(InMemoryStore::new("flaky"));
            let docket = Docket::builder()
                .store_address("memory://flaky")
                .backend(backend.clone())
                .open()?;
            let products = docket.repository("products", product_schema())?;
            let id = products.create(&product("Widget", 10, 5))?.id().unwrap();

            backend.set_online(false);
            assert!(products.get(&id).unwrap_err().is_storage_unavailable());
            assert!(products.list(&QueryPlan::new()).unwrap_err().is_storage_unavailable());

            backend.set_online(true);
            assert_eq!(products.get(&id)?.get("name"), docket::Value::from("Widget"));
            docket.close()
        },
        cleanup,
    )
}

#[test]
fn test_closed_docket_rejects_operations() {
    run_test(
        create_test_context,
        |ctx| {
            let products = ctx.products();
            products.create(&product("Widget", 10, 5))?;
            ctx.docket().close()?;

            assert!(ctx.docket().is_closed());
            assert!(products.count(&all()).unwrap_err().is_storage_unavailable());
            assert!(ctx
                .docket()
                .repository("late", product_schema())
                .unwrap_err()
                .is_storage_unavailable());
            // closing twice is fine
            ctx.docket().close()
        },
        cleanup,
    )
}

#[test]
fn test_handles_share_one_backend() {
    run_test(
        create_test_context,
        |_ctx| {
            let backend = Arc::new(InMemoryStore::new("shared"));
            let first = Docket::builder().store_address("memory://shared").backend(backend.clone()).open()?;
            let second = Docket::builder().store_address("memory://shared").backend(backend.clone()).open()?;

            first.repository("products", product_schema())?.create(&product("Widget", 10, 5))?;
            assert_eq!(second.repository("products", product_schema())?.count(&all())?, 1);
            assert_eq!(backend.collection_names(), vec!["products".to_string()]);

            first.close()?;
            assert_eq!(second.repository("products", product_schema())?.count(&all())?, 1);
            second.close()
        },
        cleanup,
    )
}
