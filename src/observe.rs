//! Observability port for the gateway. Injected at construction so tests run
//! silent and production logs through tracing.

/// Hooks the gateway calls around resolution and execution. Default methods
/// are no-ops.
pub trait GatewayObserver: Send + Sync {
    /// A table name resolved to no binding.
    fn resolution_miss(&self, _table: &str, _entity: &str) {}

    /// The raw-SQL fallback path was selected for a table.
    fn fallback_engaged(&self, _table: &str) {}

    /// A statement is about to execute.
    fn statement(&self, _sql: &str) {}
}

/// Observer that records nothing.
#[derive(Default)]
pub struct NoopObserver;

impl GatewayObserver for NoopObserver {}

/// Structured logging via tracing.
#[derive(Default)]
pub struct TracingObserver;

impl GatewayObserver for TracingObserver {
    fn resolution_miss(&self, table: &str, entity: &str) {
        tracing::warn!(table = %table, entity = %entity, "no model binding for table");
    }

    fn fallback_engaged(&self, table: &str) {
        tracing::debug!(table = %table, "serving table via raw-SQL fallback");
    }

    fn statement(&self, sql: &str) {
        tracing::debug!(sql = %sql, "query");
    }
}
