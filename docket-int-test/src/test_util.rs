use docket::collection::Document;
use docket::doc;
use docket::docket::Docket;
use docket::errors::DocketResult;
use docket::repository::Repository;
use docket::validation::{CrossFieldRule, FieldRule, Schema};
use std::backtrace::Backtrace;
use std::thread;
use std::time::{Duration, Instant};

/// Runs a test with retry logic and error handling.
///
/// `before` builds a fresh context, `after` always runs once the test body
/// finished, whatever its outcome. A failing attempt is retried up to three
/// times before the test panics with the last error.
pub fn run_test<T, B, A>(before: B, test: T, after: A)
where
    T: Fn(TestContext) -> DocketResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    B: Fn() -> DocketResult<TestContext> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    A: Fn(TestContext) -> DocketResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
{
    const MAX_RETRIES: u32 = 3;
    let mut last_error: Option<String> = None;
    let mut last_backtrace: Option<String> = None;

    for attempt in 1..=MAX_RETRIES {
        let start_time = Instant::now();

        let result = std::panic::catch_unwind(|| {
            let backtrace = Backtrace::capture();
            match before() {
                Ok(ctx) => match test(ctx.clone()) {
                    Ok(_) => after(ctx).map_err(|e| (format!("After run failed: {:?}", e), backtrace.to_string())),
                    Err(e) => {
                        let _ = after(ctx);
                        Err((format!("Test failed: {:?}", e), backtrace.to_string()))
                    }
                },
                Err(e) => Err((format!("Before run failed: {:?}", e), backtrace.to_string())),
            }
        });

        let elapsed = start_time.elapsed();
        match result {
            Ok(Ok(_)) => return,
            Ok(Err((e, bt))) => {
                last_error = Some(e);
                last_backtrace = Some(bt);
            }
            Err(panic_err) => {
                let err_msg = if let Some(s) = panic_err.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_err.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };
                last_error = Some(format!("Panic: {}", err_msg));
                last_backtrace = Some(Backtrace::capture().to_string());
            }
        }

        if attempt < MAX_RETRIES {
            eprintln!(
                "\n========== Test Attempt {}/{} Failed (took {:?}) ==========",
                attempt, MAX_RETRIES, elapsed
            );
            eprintln!("Error: {}", last_error.as_deref().unwrap_or_default());
            thread::sleep(Duration::from_millis(100 * attempt as u64));
        }
    }

    panic!(
        "Test failed after {} attempts: {}\n{}",
        MAX_RETRIES,
        last_error.unwrap_or_default(),
        last_backtrace.unwrap_or_default()
    );
}

/// A fresh in-memory instance with the catalog repositories.
#[derive(Clone)]
pub struct TestContext {
    docket: Docket,
    products: Repository,
    categories: Repository,
    orders: Repository,
}

impl TestContext {
    pub fn docket(&self) -> Docket {
        self.docket.clone()
    }

    pub fn products(&self) -> Repository {
        self.products.clone()
    }

    pub fn categories(&self) -> Repository {
        self.categories.clone()
    }

    pub fn orders(&self) -> Repository {
        self.orders.clone()
    }
}

pub fn create_test_context() -> DocketResult<TestContext> {
    let address = format!("memory://{}", uuid::Uuid::new_v4().simple());
    let docket = Docket::builder().store_address(&address).pool_size(1, 4).open()?;
    let products = docket.repository("products", product_schema())?;
    let categories = docket.repository("categories", category_schema())?;
    let orders = docket.repository("orders", order_schema())?;
    Ok(TestContext {
        docket,
        products,
        categories,
        orders,
    })
}

pub fn cleanup(ctx: TestContext) -> DocketResult<()> {
    ctx.docket().close()
}

/// Products: price must exceed cost.
pub fn product_schema() -> Schema {
    Schema::new()
        .field("name", FieldRule::string().required().min_length(1).max_length(100))
        .field("price", FieldRule::number().required().gt(0))
        .field("cost", FieldRule::number().required().gte(0))
        .field("stock", FieldRule::integer().gte(0))
        .field("status", FieldRule::string().one_of(vec!["draft", "published"]))
        .field("sku", FieldRule::string().pattern("^[A-Z]{2}-[0-9]+$"))
        .field("tags", FieldRule::array().items(FieldRule::string()).max_items(10))
        .field("category_id", FieldRule::string())
        .field("related_ids", FieldRule::array().items(FieldRule::string()))
        .field(
            "variants",
            FieldRule::array().items(FieldRule::document(
                Schema::new()
                    .field("sku", FieldRule::string().required())
                    .field("stock", FieldRule::integer().gte(0)),
            )),
        )
        .field(
            "dimensions",
            FieldRule::document(
                Schema::new()
                    .field("width", FieldRule::number().gt(0))
                    .field("height", FieldRule::number().gt(0)),
            ),
        )
        .rule(CrossFieldRule::greater_than("price", "cost"))
}

pub fn category_schema() -> Schema {
    Schema::new().field("name", FieldRule::string().required())
}

/// Orders: total must equal quantity times unit price within 0.01.
pub fn order_schema() -> Schema {
    Schema::new()
        .field("quantity", FieldRule::integer().required().gt(0))
        .field("unit_price", FieldRule::number().required().gt(0))
        .field("total_price", FieldRule::number().required())
        .field("placed_at", FieldRule::timestamp())
        .rule(CrossFieldRule::product_within("total_price", "quantity", "unit_price", 0.01))
}

pub fn product(name: &str, price: i64, cost: i64) -> Document {
    doc! { name: name, price: price, cost: cost }
}

/// Inserts seven products; five of them priced within 5..=15.
pub fn insert_test_products(ctx: &TestContext) -> DocketResult<Vec<Document>> {
    let candidates = [
        ("bolt", 5, 1),
        ("nut", 7, 2),
        ("washer", 9, 3),
        ("hinge", 12, 4),
        ("bracket", 15, 5),
        ("clamp", 3, 1),
        ("vice", 40, 20),
    ]
    .iter()
    .map(|(name, price, cost)| product(name, *price, *cost))
    .collect::<Vec<_>>();
    ctx.products().create_many(&candidates)
}
