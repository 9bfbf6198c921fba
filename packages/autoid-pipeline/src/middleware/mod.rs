//! Tower middleware layers for the query pipeline.
//!
//! - [`autoid`]: Fills generated identifier fields in write arguments
//! - [`pipeline`]: Wraps a query executor with the identifier layer

pub mod autoid;
pub mod pipeline;

pub use autoid::{AutoIdLayer, AutoIdService};
pub use pipeline::build_query_pipeline;
