//! Async client for the query-service API.

pub mod config;
pub mod preferences;
pub mod response;

pub use config::ClientConfig;
pub use preferences::{ApiClient, PreferencePayload};
pub use response::{ApiResponse, ErrorResponse, RequestFailure, SuccessResponse};
