mod concurrency_test;
mod store_test;
