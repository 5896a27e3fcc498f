//! Query composition for list operations.
//!
//! A [QueryPlan] bundles a filter, sort keys, a skip/limit window, lookups
//! and a projection. Executing it yields a [Page] with [PageMeta].

mod executor;
mod lookup;
mod page;
mod query_plan;

pub use executor::*;
pub use lookup::*;
pub use page::*;
pub use query_plan::*;
