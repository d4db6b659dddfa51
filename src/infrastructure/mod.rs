//! Infrastructure layer module
//!
//! Adapters and external integrations:
//! - Admin API client with bearer auth and single-flight token refresh
//! - Session stores (in-memory, JSON file)
//! - Configuration management
//! - Logging infrastructure
//!
//! Infrastructure implementations satisfy the port traits defined in the domain layer.

pub mod api;
pub mod config;
pub mod logging;
pub mod session;
