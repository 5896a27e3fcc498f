mod document;
mod document_id;
mod find_options;

pub use document::*;
pub use document_id::*;
pub use find_options::*;
