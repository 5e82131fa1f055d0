//! HTTP handlers for the query endpoint.

use crate::error::GatewayError;
use crate::query::{Filter, QueryRequest};
use crate::response::{envelope_ok, Envelope};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use std::collections::HashMap;

/// POST /api/db/:table — structured query against a logical table.
pub async fn query(
    State(state): State<AppState>,
    Path(table): Path<String>,
    Json(body): Json<QueryRequest>,
) -> Result<(StatusCode, Json<Envelope>), GatewayError> {
    let outcome = state.gateway.execute(&table, &body).await?;
    Ok(envelope_ok(outcome.into_data()))
}

/// GET /api/db/:table — list convenience: each query-string pair becomes an
/// equality filter, `limit` excepted.
pub async fn list(
    State(state): State<AppState>,
    Path(table): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<(StatusCode, Json<Envelope>), GatewayError> {
    let mut req = QueryRequest {
        operation: "select".into(),
        ..Default::default()
    };
    for (k, v) in params {
        if k == "limit" {
            req.limit = v.parse().ok();
            continue;
        }
        req.filters.push(Filter {
            column: k,
            operator: "eq".into(),
            value: Value::String(v),
        });
    }
    let outcome = state.gateway.execute(&table, &req).await?;
    Ok(envelope_ok(outcome.into_data()))
}
