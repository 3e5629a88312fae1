//! Repository query model shared by the shapers and the content adapters.

pub mod evaluate;
pub mod filter;
pub mod types;

pub use evaluate::evaluate;
pub use filter::FilterNode;
pub use types::*;
