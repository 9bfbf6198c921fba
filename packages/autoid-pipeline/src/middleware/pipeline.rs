//! Pipeline composition: wraps a query executor with the extension's layers.

use tower::ServiceBuilder;

use super::autoid::AutoIdService;
use crate::extension::AutoIdExtension;
use crate::request::QueryRequest;

/// Build the query pipeline by wrapping `executor` with the extension's
/// `AutoIdLayer`, which fills generated identifiers before forwarding.
///
/// The returned service implements `tower::Service<QueryRequest>` with the
/// executor's response and error types.
#[must_use]
pub fn build_query_pipeline<S>(
    extension: &AutoIdExtension,
    executor: S,
) -> AutoIdService<S>
where
    S: tower::Service<QueryRequest>,
{
    ServiceBuilder::new()
        .layer(extension.layer())
        .service(executor)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
