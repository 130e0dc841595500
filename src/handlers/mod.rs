//! Route handlers, one file per route group. Each handler performs a single
//! data-access call and returns its result as JSON.

pub mod auth;
pub mod foods;
pub mod orders;
pub mod reviews;
pub mod system;
pub mod users;

use serde_json::{Map, Value};

use crate::error::ApiError;

/// Request bodies that are stored as documents must be JSON objects.
pub(crate) fn into_object(body: Value) -> Result<Map<String, Value>, ApiError> {
    match body {
        Value::Object(map) => Ok(map),
        other => Err(ApiError::bad_request(format!(
            "Expected a JSON object body, got {}",
            json_type(&other)
        ))),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use serde_json::json;

    #[test]
    fn only_objects_are_documents() {
        assert!(into_object(json!({ "a": 1 })).is_ok());
        let err = into_object(json!([1, 2])).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "Expected a JSON object body, got array");
    }
}
