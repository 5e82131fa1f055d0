//! Uniform `{data, error}` envelope for every gateway outcome.

use axum::{http::StatusCode, Json};
use serde::Serialize;
use serde_json::Value;

#[derive(Serialize, Debug)]
pub struct Envelope {
    pub data: Value,
    pub error: Option<ErrorInfo>,
}

#[derive(Serialize, Debug)]
pub struct ErrorInfo {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl Envelope {
    pub fn success(data: Value) -> Self {
        Envelope { data, error: None }
    }

    pub fn failure(error: ErrorInfo) -> Self {
        Envelope {
            data: Value::Null,
            error: Some(error),
        }
    }
}

/// Successful outcomes are always 200, empty result sets included.
pub fn envelope_ok(data: Value) -> (StatusCode, Json<Envelope>) {
    (StatusCode::OK, Json(Envelope::success(data)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_serializes_with_null_error() {
        let body = serde_json::to_value(Envelope::success(json!([{"id": 1}]))).unwrap();
        assert_eq!(body, json!({"data": [{"id": 1}], "error": null}));
    }

    #[test]
    fn failure_serializes_with_null_data() {
        let body = serde_json::to_value(Envelope::failure(ErrorInfo {
            message: "boom".into(),
            code: None,
        }))
        .unwrap();
        assert_eq!(body, json!({"data": null, "error": {"message": "boom"}}));
    }

    #[test]
    fn failure_carries_code_when_present() {
        let body = serde_json::to_value(Envelope::failure(ErrorInfo {
            message: "duplicate key".into(),
            code: Some("23505".into()),
        }))
        .unwrap();
        assert_eq!(body["error"]["code"], json!("23505"));
    }
}
