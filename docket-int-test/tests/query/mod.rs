mod list_test;
mod lookup_test;
mod plan_test;
