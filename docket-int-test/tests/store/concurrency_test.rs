use std::collections::HashSet;
use std::thread;

use docket::doc;
use docket::filter::all;
use docket::query::QueryPlan;
use docket::repository::DeltaOp;
use docket::Value;
use docket_int_test::test_util::{cleanup, create_test_context, product, run_test};

#[test]
fn test_concurrent_creates_get_distinct_ids() {
    run_test(
        create_test_context,
        |ctx| {
            let handles = (0..8)
                .map(|t| {
                    let products = ctx.products();
                    thread::spawn(move || {
                        (0..25)
                            .map(|i| products.create(&product(&format!("p-{}-{}", t, i), 10, 5)))
                            .collect::<Vec<_>>()
                    })
                })
                .collect::<Vec<_>>();

            let mut ids = HashSet::new();
            for handle in handles {
                for created in handle.join().unwrap() {
                    assert!(ids.insert(created?.id().unwrap()));
                }
            }
            assert_eq!(ids.len(), 200);
            assert_eq!(ctx.products().count(&all())?, 200);
            assert_eq!(ctx.products().list(&QueryPlan::new().limit(1000))?.len(), 200);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_concurrent_increments_are_not_lost() {
    run_test(
        create_test_context,
        |ctx| {
            let id = ctx
                .products()
                .create(&doc! { name: "Counter", price: 10, cost: 5, stock: 0 })?
                .id()
                .unwrap();

            let handles = (0..8)
                .map(|_| {
                    let products = ctx.products();
                    let id = id.clone();
                    thread::spawn(move || {
                        for _ in 0..50 {
                            products.apply_delta(&id, &[DeltaOp::increment("stock", 1)])?;
                        }
                        Ok::<_, docket::errors::DocketError>(())
                    })
                })
                .collect::<Vec<_>>();

            for handle in handles {
                handle.join().unwrap()?;
            }
            assert_eq!(ctx.products().get(&id)?.get("stock"), Value::from(400));
            Ok(())
        },
        cleanup,
    )
}
