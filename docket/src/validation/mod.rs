//! Schema enforcement for untyped documents.
//!
//! A [Schema] declares per-field rules ([FieldRule]) and cross-field rules
//! ([CrossFieldRule]). A [Validator] checks candidates against it and reports
//! every violation found in a single `ValidationError`.
//!
//! ```rust,ignore
//! use docket::validation::{CrossFieldRule, FieldRule, Schema, Validator};
//!
//! let schema = Schema::new()
//!     .field("name", FieldRule::string().required().min_length(1))
//!     .field("price", FieldRule::number().required().gt(0))
//!     .field("cost", FieldRule::number().gte(0))
//!     .rule(CrossFieldRule::greater_than("price", "cost"));
//!
//! let validator = Validator::new(schema)?;
//! let validated = validator.validate(&doc!{ name: "Widget", price: 10, cost: 4 })?;
//! ```

mod cross_field;
mod field_rule;
mod schema;
mod validator;
mod violation;

pub use cross_field::*;
pub use field_rule::*;
pub use schema::*;
pub use validator::*;
pub use violation::*;
