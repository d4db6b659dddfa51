pub mod auth;
pub mod client;
pub mod errors;
pub mod request;

pub use client::{ApiClient, ApiClientConfig};
pub use errors::ApiError;
pub use request::{ApiRequest, ApiResponse};
