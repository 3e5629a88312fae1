pub mod asset;
pub mod sizes;

pub use asset::*;
pub use sizes::*;
