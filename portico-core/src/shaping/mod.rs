//! Mode-driven request and response shaping for collection routes.
//!
//! A request's `?mode=` selects one branch of a [`CollectionSpec`]: the
//! [`RequestShaper`] turns it into a [`ShapedQuery`](crate::query::ShapedQuery)
//! for the executor and the [`ResponseShaper`] reshapes what comes back.
//!
//! [`CollectionSpec`]: crate::collections::CollectionSpec

pub mod request;
pub mod response;

pub use request::{DEFAULT_MAX_PAGE_SIZE, QueryParams, RequestShaper, ShapeError, ShapedRequest};
pub use response::ResponseShaper;
