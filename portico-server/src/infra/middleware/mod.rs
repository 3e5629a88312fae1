pub mod content_shaping;

pub use content_shaping::{ContentShapingLayer, ContentShapingMiddleware};
