//! Identifier middleware.
//!
//! Rewrites the arguments of every intercepted write before handing the
//! request to the next stage. Responses and errors from the next stage are
//! returned as-is.

use std::task::{Context, Poll};

use autoid_core::PayloadRewriter;
use tower::{Layer, Service};

use crate::request::QueryRequest;

// ---------------------------------------------------------------------------
// AutoIdLayer
// ---------------------------------------------------------------------------

/// Tower layer that fills missing auto-identifier fields on insert payloads.
#[derive(Debug, Clone)]
pub struct AutoIdLayer {
    rewriter: PayloadRewriter,
}

impl AutoIdLayer {
    #[must_use]
    pub fn new(rewriter: PayloadRewriter) -> Self {
        Self { rewriter }
    }
}

impl<S> Layer<S> for AutoIdLayer {
    type Service = AutoIdService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AutoIdService {
            inner,
            rewriter: self.rewriter.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// AutoIdService
// ---------------------------------------------------------------------------

/// Service wrapper that rewrites `QueryRequest::args` and forwards the request.
#[derive(Debug, Clone)]
pub struct AutoIdService<S> {
    inner: S,
    rewriter: PayloadRewriter,
}

impl<S> Service<QueryRequest> for AutoIdService<S>
where
    S: Service<QueryRequest>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: QueryRequest) -> Self::Future {
        self.rewriter
            .rewrite_args(&request.operation, &request.model, &mut request.args);
        self.inner.call(request)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
