//! Shared application state for all routes.

use crate::service::QueryGateway;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<QueryGateway>,
}
