//! Operation dispatch: bound-entity execution or the raw-SQL fallback.

use crate::error::GatewayError;
use crate::observe::{GatewayObserver, TracingObserver};
use crate::query::{Operation, QueryRequest};
use crate::registry::{ModelBinding, TableRegistry};
use crate::sql::{self, BindValue, QueryBuf};
use serde_json::{Map, Value};
use sqlx::PgPool;
use std::sync::Arc;

/// Result of one dispatched query.
#[derive(Debug, PartialEq)]
pub enum QueryOutcome {
    /// select (multi) and insert results.
    Rows(Vec<Value>),
    /// select with `single: true`.
    Row(Option<Value>),
    /// update/delete affected-row count.
    Count(u64),
}

impl QueryOutcome {
    /// Envelope `data` payload for this outcome.
    pub fn into_data(self) -> Value {
        match self {
            QueryOutcome::Rows(rows) => Value::Array(rows),
            QueryOutcome::Row(Some(row)) => row,
            QueryOutcome::Row(None) => Value::Null,
            QueryOutcome::Count(n) => Value::Number(n.into()),
        }
    }
}

/// The gateway holds the one pooled client for its lifetime. A resolution
/// miss varies only the code path taken, never the client instance.
pub struct QueryGateway {
    pool: PgPool,
    registry: TableRegistry,
    observer: Arc<dyn GatewayObserver>,
}

impl QueryGateway {
    pub fn new(pool: PgPool, registry: TableRegistry) -> Self {
        Self::with_observer(pool, registry, Arc::new(TracingObserver))
    }

    pub fn with_observer(
        pool: PgPool,
        registry: TableRegistry,
        observer: Arc<dyn GatewayObserver>,
    ) -> Self {
        QueryGateway {
            pool,
            registry,
            observer,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Resolve the table and run the requested operation. Stateless per
    /// request; errors surface once and are never retried here.
    pub async fn execute(
        &self,
        table: &str,
        req: &QueryRequest,
    ) -> Result<QueryOutcome, GatewayError> {
        let op = Operation::parse(&req.operation)
            .ok_or_else(|| GatewayError::UnknownOperation(req.operation.clone()))?;
        match self.registry.resolve(table) {
            Some(binding) => self.execute_bound(binding, op, req).await,
            None => {
                self.observer.resolution_miss(table, table);
                self.execute_fallback(table, op, req).await
            }
        }
    }

    async fn execute_bound(
        &self,
        binding: ModelBinding,
        op: Operation,
        req: &QueryRequest,
    ) -> Result<QueryOutcome, GatewayError> {
        match op {
            Operation::Select => {
                let q = sql::select(binding.table, &req.filters, req.order().as_ref(), req.limit)?;
                let rows = self.query_many(&q).await?;
                Ok(reduce_select(rows, req.single))
            }
            Operation::Insert => {
                let records = insert_records(req.data.as_ref())?;
                let q = sql::insert(binding.table, &records)?;
                let rows = self.query_many(&q).await?;
                Ok(QueryOutcome::Rows(rows))
            }
            Operation::Update => {
                let data = update_data(req.data.as_ref())?;
                // empty filter list scopes the update to every row; accepted as sent
                let q = sql::update(binding.table, data, &req.filters)?;
                Ok(QueryOutcome::Count(self.execute_count(&q).await?))
            }
            Operation::Delete => {
                // zero matched rows is success with count 0
                let q = sql::delete(binding.table, &req.filters)?;
                Ok(QueryOutcome::Count(self.execute_count(&q).await?))
            }
        }
    }

    async fn execute_fallback(
        &self,
        table: &str,
        op: Operation,
        req: &QueryRequest,
    ) -> Result<QueryOutcome, GatewayError> {
        let Some(table) = self.registry.fallback_table(table) else {
            return Err(GatewayError::UnknownTable {
                table: table.to_string(),
                entity: table.to_string(),
            });
        };
        self.observer.fallback_engaged(table);
        match op {
            Operation::Select => {
                let q = sql::fallback_select(table, &req.filters, req.order().as_ref(), req.limit);
                let rows = self.query_many(&q).await?;
                Ok(reduce_select(rows, req.single))
            }
            Operation::Insert => {
                let records = insert_records(req.data.as_ref())?;
                let (q, echoed) = sql::fallback_insert(table, &records)?;
                self.execute_count(&q).await?;
                Ok(QueryOutcome::Rows(echoed))
            }
            Operation::Update | Operation::Delete => Err(GatewayError::FallbackUnsupported {
                table: table.to_string(),
                operation: op.as_str().to_string(),
            }),
        }
    }

    async fn query_many(&self, q: &QueryBuf) -> Result<Vec<Value>, GatewayError> {
        self.observer.statement(&q.sql);
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(BindValue::from(p));
        }
        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.iter().map(row_to_json).collect())
    }

    async fn execute_count(&self, q: &QueryBuf) -> Result<u64, GatewayError> {
        self.observer.statement(&q.sql);
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(BindValue::from(p));
        }
        let done = query.execute(&self.pool).await?;
        Ok(done.rows_affected())
    }
}

fn reduce_select(rows: Vec<Value>, single: bool) -> QueryOutcome {
    if single {
        QueryOutcome::Row(rows.into_iter().next())
    } else {
        QueryOutcome::Rows(rows)
    }
}

fn insert_records(data: Option<&Value>) -> Result<Vec<Map<String, Value>>, GatewayError> {
    match data {
        Some(Value::Object(m)) => Ok(vec![m.clone()]),
        Some(Value::Array(items)) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::Object(m) => out.push(m.clone()),
                    _ => {
                        return Err(GatewayError::Validation(
                            "insert 'data' array items must be objects".into(),
                        ))
                    }
                }
            }
            if out.is_empty() {
                return Err(GatewayError::Validation("insert 'data' must not be empty".into()));
            }
            Ok(out)
        }
        _ => Err(GatewayError::Validation(
            "insert requires a 'data' object or array".into(),
        )),
    }
}

fn update_data(data: Option<&Value>) -> Result<&Map<String, Value>, GatewayError> {
    match data {
        Some(Value::Object(m)) if !m.is_empty() => Ok(m),
        _ => Err(GatewayError::Validation(
            "update requires a non-empty 'data' object".into(),
        )),
    }
}

fn row_to_json(row: &sqlx::postgres::PgRow) -> Value {
    use sqlx::Column;
    use sqlx::Row;
    let mut map = serde_json::Map::new();
    for col in row.columns() {
        let name = col.name();
        map.insert(name.to_string(), cell_to_value(row, name));
    }
    Value::Object(map)
}

fn cell_to_value(row: &sqlx::postgres::PgRow, name: &str) -> Value {
    use sqlx::Row;
    if let Ok(Some(n)) = row.try_get::<Option<i16>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i32>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i64>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<f64>, _>(name) {
        if let Some(n) = serde_json::Number::from_f64(n) {
            return Value::Number(n);
        }
    }
    if let Ok(Some(b)) = row.try_get::<Option<bool>, _>(name) {
        return Value::Bool(b);
    }
    if let Ok(Some(u)) = row.try_get::<Option<uuid::Uuid>, _>(name) {
        return Value::String(u.to_string());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(name) {
        return Value::String(d.to_rfc3339());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::NaiveDateTime>, _>(name) {
        return Value::String(d.format("%Y-%m-%dT%H:%M:%S%.f").to_string());
    }
    if let Ok(Some(s)) = row.try_get::<Option<String>, _>(name) {
        return Value::String(s);
    }
    if let Ok(Some(j)) = row.try_get::<Option<Value>, _>(name) {
        return j;
    }
    Value::Null
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observe::NoopObserver;
    use serde_json::json;

    // connect_lazy never opens a connection; these paths fail before any I/O
    fn gateway() -> QueryGateway {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/gateway_test")
            .unwrap();
        QueryGateway::with_observer(pool, TableRegistry::new(), Arc::new(NoopObserver))
    }

    fn request(body: Value) -> QueryRequest {
        serde_json::from_value(body).unwrap()
    }

    #[tokio::test]
    async fn unresolved_table_outside_allow_list_is_rejected() {
        let err = gateway()
            .execute("unknown_table", &request(json!({"operation": "select"})))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::UnknownTable { .. }));
        assert!(err.to_string().contains("unknown_table"));
    }

    #[tokio::test]
    async fn fallback_update_and_delete_are_rejected() {
        let gw = gateway();
        for op in ["update", "delete"] {
            let body = if op == "update" {
                json!({"operation": op, "data": {"status": "x"}})
            } else {
                json!({"operation": op})
            };
            let err = gw.execute("products", &request(body)).await.unwrap_err();
            assert!(
                matches!(err, GatewayError::FallbackUnsupported { .. }),
                "{} should not reach the raw path",
                op
            );
        }
    }

    #[tokio::test]
    async fn unknown_operation_is_a_validation_failure() {
        let err = gateway()
            .execute("customers", &request(json!({"operation": "upsert"})))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::UnknownOperation(_)));
    }

    #[tokio::test]
    async fn insert_without_data_is_rejected() {
        let err = gateway()
            .execute("cart_items", &request(json!({"operation": "insert"})))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Validation(_)));
    }

    #[tokio::test]
    async fn update_without_data_is_rejected() {
        let err = gateway()
            .execute("cart_items", &request(json!({"operation": "update", "filters": []})))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Validation(_)));
    }

    #[test]
    fn outcome_data_shapes() {
        assert_eq!(QueryOutcome::Rows(vec![]).into_data(), json!([]));
        assert_eq!(QueryOutcome::Row(None).into_data(), Value::Null);
        assert_eq!(
            QueryOutcome::Row(Some(json!({"id": 1}))).into_data(),
            json!({"id": 1})
        );
        assert_eq!(QueryOutcome::Count(0).into_data(), json!(0));
    }

    #[test]
    fn single_reduces_to_first_row() {
        let rows = vec![json!({"id": 1}), json!({"id": 2})];
        assert_eq!(
            reduce_select(rows, true),
            QueryOutcome::Row(Some(json!({"id": 1})))
        );
        assert_eq!(reduce_select(vec![], true), QueryOutcome::Row(None));
    }

    #[test]
    fn insert_data_accepts_object_and_array() {
        assert_eq!(insert_records(Some(&json!({"a": 1}))).unwrap().len(), 1);
        assert_eq!(
            insert_records(Some(&json!([{"a": 1}, {"a": 2}]))).unwrap().len(),
            2
        );
        assert!(insert_records(Some(&json!([]))).is_err());
        assert!(insert_records(Some(&json!("x"))).is_err());
        assert!(insert_records(None).is_err());
    }
}
