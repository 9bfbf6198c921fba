use autoid_core::Operation;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One intercepted query as seen by the host pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Model the query targets, e.g. `"User"`.
    pub model: String,
    /// Operation kind, e.g. `create` or `findMany`.
    pub operation: Operation,
    /// Query arguments. Write operations carry `data`; upserts carry
    /// `create` and `update`.
    #[serde(default)]
    pub args: Value,
}

impl QueryRequest {
    #[must_use]
    pub fn new(model: impl Into<String>, operation: impl Into<Operation>, args: Value) -> Self {
        Self {
            model: model.into(),
            operation: operation.into(),
            args,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn deserializes_host_shape() {
        let request: QueryRequest = serde_json::from_value(json!({
            "model": "User",
            "operation": "createMany",
            "args": { "data": [] }
        }))
        .expect("request");
        assert_eq!(
            request,
            QueryRequest::new("User", Operation::CreateMany, json!({ "data": [] }))
        );
    }

    #[test]
    fn missing_args_default_to_null() {
        let request: QueryRequest =
            serde_json::from_value(json!({ "model": "User", "operation": "count" }))
                .expect("request");
        assert_eq!(request.operation, Operation::Other("count".to_string()));
        assert!(request.args.is_null());
    }
}
