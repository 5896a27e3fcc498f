//! Collection repositories.
//!
//! [Repository] is the untyped contract over documents; [EntityRepository]
//! maps a typed [Entity] through it.

mod delta;
mod entity;
mod entity_repository;
mod repository;

pub use delta::DeltaOp;
pub use entity::*;
pub use entity_repository::*;
pub use repository::*;
