//! # Docket - document data access
//!
//! Docket is a data-access layer over a document store. It validates input
//! against declared schemas, composes queries with pagination and reference
//! enrichment, and manages the lifecycle of every document it writes.
//!
//! ## Key Features
//!
//! - **Validation**: per-field constraints and cross-field rules, with every
//!   violation reported at once
//! - **Store client**: a connection-pooled handle with atomic single-document
//!   writes and an in-memory backend
//! - **Queries**: composable filters, multi-key sorting, skip/limit pages with
//!   metadata, and batched reference lookups
//! - **Repositories**: timestamps and soft deletion owned by the repository,
//!   atomic deltas for counters and embedded arrays, typed entities
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use docket::docket::Docket;
//! use docket::doc;
//! use docket::filter::field;
//! use docket::query::QueryPlan;
//! use docket::validation::{CrossFieldRule, FieldRule, Schema};
//!
//! let docket = Docket::builder().from_env().open()?;
//!
//! let schema = Schema::new()
//!     .field("name", FieldRule::string().required())
//!     .field("price", FieldRule::number().required().gt(0))
//!     .field("cost", FieldRule::number().required())
//!     .rule(CrossFieldRule::greater_than("price", "cost"));
//! let products = docket.repository("products", schema)?;
//!
//! let widget = products.create(&doc! { name: "Widget", price: 10, cost: 5 })?;
//! let page = products.list(&QueryPlan::new().filter(field("price").gte(5)).page(1, 20))?;
//! println!("{} of {}", page.len(), page.meta().total_count);
//!
//! docket.close()?;
//! ```
//!
//! ## Design Pattern
//!
//! Handles ([`docket::Docket`], [`store::DocumentStore`],
//! [`repository::Repository`]) wrap their state in an `Arc`, so clones are
//! cheap and share it across threads. There is no process-wide instance: the
//! caller constructs a `Docket` and passes it where it is needed.
//!
//! ## Module Organization
//!
//! - [`collection`] - Documents, ids and find options
//! - [`common`] - Values, constants, sorting and shared utilities
//! - [`docket`] - The entry point
//! - [`docket_builder`] - Builder for opening an instance
//! - [`docket_config`] - Configuration, including `DOCKET_*` variables
//! - [`errors`] - Error types and result definitions
//! - [`filter`] - Filters, the fluent builder and filter parsing
//! - [`query`] - Query plans, pages and lookups
//! - [`repository`] - Repositories, deltas and typed entities
//! - [`store`] - Store client, connection pool and backends
//! - [`validation`] - Schemas, rules and the validator

pub mod collection;
pub mod common;
pub mod docket;
pub mod docket_builder;
pub mod docket_config;
pub mod errors;
pub mod filter;
pub mod query;
pub mod repository;
pub mod store;
pub mod validation;

pub use common::*;
