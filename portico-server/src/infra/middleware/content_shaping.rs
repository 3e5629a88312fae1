//! Mode-driven shaping around a collection's read handler.
//!
//! Before the handler runs, the request's query string is replaced by a
//! [`ShapedQuery`](portico_core::query::ShapedQuery) placed in the request
//! extensions; a rejected request never reaches the handler. After it runs,
//! a successful JSON body is reshaped for the accepted mode.

use std::{
    collections::HashMap,
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use axum::{
    Json,
    body::{Body, to_bytes},
    extract::{Query, Request},
    http::{Response, header},
    response::IntoResponse,
};
use serde_json::Value;
use tower::{Layer, Service};
use tracing::{debug, error};

use portico_core::{
    collections::CollectionSpec,
    shaping::{QueryParams, RequestShaper, ResponseShaper, ShapedRequest},
};
use portico_model::QueryMode;

use crate::infra::errors::AppError;

#[derive(Clone, Debug)]
pub struct ContentShapingLayer {
    spec: Arc<CollectionSpec>,
    max_page_size: u32,
}

impl ContentShapingLayer {
    pub fn new(spec: Arc<CollectionSpec>, max_page_size: u32) -> Self {
        Self {
            spec,
            max_page_size,
        }
    }
}

impl<S> Layer<S> for ContentShapingLayer {
    type Service = ContentShapingMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        debug!(collection = %self.spec.name, "installing content shaping layer");
        ContentShapingMiddleware {
            inner,
            spec: Arc::clone(&self.spec),
            max_page_size: self.max_page_size,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ContentShapingMiddleware<S> {
    inner: S,
    spec: Arc<CollectionSpec>,
    max_page_size: u32,
}

impl<S> ContentShapingMiddleware<S> {
    fn shape_request(&self, req: &Request) -> Result<ShapedRequest, AppError> {
        let Query(pairs) = Query::<HashMap<String, String>>::try_from_uri(req.uri())
            .map_err(|rejection| AppError::bad_request(rejection.body_text()))?;

        RequestShaper::new(&self.spec)
            .with_max_page_size(self.max_page_size)
            .shape(&QueryParams::from(pairs))
            .map_err(AppError::from)
    }
}

impl<S> Service<Request> for ContentShapingMiddleware<S>
where
    S: Service<Request, Response = Response<Body>> + Send + Clone + 'static,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
{
    type Response = Response<Body>;
    type Error = S::Error;
    type Future = Pin<
        Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        cx: &mut Context<'_>,
    ) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        let shaped = match self.shape_request(&req) {
            Ok(shaped) => shaped,
            Err(err) => {
                debug!(
                    collection = %self.spec.name,
                    query = req.uri().query().unwrap_or_default(),
                    message = %err,
                    "rejecting content request"
                );
                return Box::pin(async move { Ok(err.into_response()) });
            }
        };

        let mode = shaped.mode;
        debug!(collection = %self.spec.name, %mode, "shaped content request");
        req.extensions_mut().insert(shaped.query);

        // The ready service is the one that must be called.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let spec = Arc::clone(&self.spec);

        Box::pin(async move {
            let response = inner.call(req).await?;
            Ok(shape_response(&spec, mode, response).await)
        })
    }
}

async fn shape_response(
    spec: &CollectionSpec,
    mode: QueryMode,
    response: Response<Body>,
) -> Response<Body> {
    if !response.status().is_success() {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(err) => {
            error!(collection = %spec.name, error = %err, "failed to buffer content response");
            return AppError::internal("Internal Server Error").into_response();
        }
    };
    let Ok(payload) = serde_json::from_slice::<Value>(&bytes) else {
        return Response::from_parts(parts, Body::from(bytes));
    };

    let shaped = ResponseShaper::new(spec).shape(Some(mode), payload);

    parts.headers.remove(header::CONTENT_LENGTH);
    parts.headers.remove(header::CONTENT_TYPE);
    let mut response = Json(shaped).into_response();
    *response.status_mut() = parts.status;
    response.headers_mut().extend(parts.headers);
    response
}
