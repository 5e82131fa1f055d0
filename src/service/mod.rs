mod gateway;
pub use gateway::{QueryGateway, QueryOutcome};
