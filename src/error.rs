//! Typed gateway errors and HTTP mapping.

use crate::response::{Envelope, ErrorInfo};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    /// Table resolved to no binding and is outside the fallback allow-list.
    #[error("table '{table}' not found (no model binding for entity '{entity}')")]
    UnknownTable { table: String, entity: String },
    /// Binding absent, table allow-listed, but the operation has no raw-SQL form.
    #[error("operation '{operation}' is not supported for unbound table '{table}'")]
    FallbackUnsupported { table: String, operation: String },
    #[error("unknown operation '{0}'")]
    UnknownOperation(String),
    #[error("validation: {0}")]
    Validation(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
}

impl GatewayError {
    /// Client errors are 400; execution failures are 500. Nothing else.
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::UnknownTable { .. }
            | GatewayError::FallbackUnsupported { .. }
            | GatewayError::UnknownOperation(_)
            | GatewayError::Validation(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn code(&self) -> Option<String> {
        match self {
            GatewayError::Db(e) => e
                .as_database_error()
                .and_then(|d| d.code().map(|c| c.to_string())),
            _ => None,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Envelope::failure(ErrorInfo {
            message: self.to_string(),
            code: self.code(),
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_miss_is_a_client_error() {
        let err = GatewayError::UnknownTable {
            table: "unknown_table".into(),
            entity: "unknown_table".into(),
        };
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("unknown_table"));
    }

    #[test]
    fn execution_failure_is_a_server_error() {
        let err = GatewayError::Db(sqlx::Error::PoolClosed);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn miss_message_names_table_and_entity() {
        let err = GatewayError::UnknownTable {
            table: "widgets".into(),
            entity: "widget".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("widgets"));
        assert!(msg.contains("widget"));
    }
}
