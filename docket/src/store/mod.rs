//! The document store client.
//!
//! [DocumentStore] is a connection-pooled handle over a [StoreBackend].
//! Writes are described by [UpdateSpec] and report a [WriteResult].

mod document_store;
mod pool;
mod store_config;
mod update_spec;
mod write_result;

pub mod memory;

pub use document_store::*;
pub use pool::*;
pub use store_config::*;
pub use update_spec::*;
pub use write_result::*;
