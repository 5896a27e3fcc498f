mod constants;
mod convertible;
mod fields;
mod sort_order;
mod sorting;
mod util;
mod value;

pub use constants::*;
pub use convertible::*;
pub use fields::*;
pub use sort_order::*;
pub use sorting::*;
pub use util::*;
pub use value::*;
