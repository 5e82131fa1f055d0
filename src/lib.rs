//! Query gateway: one endpoint, logical table names, structured queries over PostgreSQL.

pub mod error;
pub mod observe;
pub mod query;
pub mod registry;
pub mod response;
pub mod sql;
pub mod state;
pub mod service;
pub mod handlers;
pub mod routes;

pub use error::GatewayError;
pub use observe::{GatewayObserver, NoopObserver, TracingObserver};
pub use query::{Direction, Filter, Operation, Operator, OrderBy, QueryRequest};
pub use registry::{ModelBinding, TableRegistry};
pub use response::{envelope_ok, Envelope, ErrorInfo};
pub use service::{QueryGateway, QueryOutcome};
pub use state::AppState;
pub use routes::{common_routes, gateway_routes};
