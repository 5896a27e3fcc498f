//! Query filters for selecting documents from collections.
//!
//! Filters are built with the fluent API and combined with logical
//! operators, or parsed from a document-shaped description with
//! [parse_filter].
//!
//! ```rust,ignore
//! use docket::filter::{field, and, or};
//!
//! let in_stock = field("stock").gt(0);
//! let cheap = field("price").between_inclusive(5, 15);
//! let tagged = field("tags").contains_any(vec!["sale", "clearance"]);
//!
//! let filter = and(vec![in_stock, or(vec![cheap, tagged])]);
//! ```
//!
//! # Supported Operators
//!
//! - **Equality**: `eq`, `ne`
//! - **Comparison**: `gt`, `gte`, `lt`, `lte`, `between`
//! - **Membership**: `in_array`, `not_in_array`
//! - **Pattern**: `regex`, `contains`
//! - **Array**: `contains_all`, `contains_any`, `elem_match`
//! - **Existence**: `exists`
//! - **Logical**: `and`, `or`, `not`
//! - **Special**: `all` (match all), `by_id` (match by id)
//!
//! Equality, comparison and membership terms match array fields element-wise:
//! `field("tags").eq("sale")` matches a document whose `tags` array holds
//! `"sale"`.

mod filter;
mod fluent;
mod parser;

mod array_filters;
mod basic_filters;
mod logical_filters;
mod pattern_filters;
mod range_filters;

pub use array_filters::*;
pub use basic_filters::*;
pub use filter::*;
pub use fluent::*;
pub use logical_filters::*;
pub use parser::*;
pub use pattern_filters::*;
pub use range_filters::*;
