//! tablefetch - authenticated admin API client and paginated collection controller
//!
//! Talks to a paginated REST admin backend: every request carries the
//! current bearer token, a 401 is recovered from with exactly one cookie
//! credentialed refresh, and collection endpoints are driven by a
//! controller that owns page, size, sort, search and filter state.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): models (session, pagination, filters, config) and ports
//! - **Service Layer** (`services`): query cache, debouncer, collection controller
//! - **Infrastructure Layer** (`infrastructure`): HTTP client, session stores, config, logging
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use serde::Deserialize;
//! use tablefetch::domain::ports::LogNotifier;
//! use tablefetch::infrastructure::api::{ApiClient, ApiClientConfig};
//! use tablefetch::infrastructure::session::InMemorySessionStore;
//! use tablefetch::services::{CollectionController, ControllerOptions, QueryCache};
//!
//! #[derive(Deserialize)]
//! struct User {
//!     first_name: String,
//! }
//!
//! # async fn run() -> anyhow::Result<()> {
//! let client = Arc::new(ApiClient::new(
//!     ApiClientConfig::default(),
//!     Arc::new(InMemorySessionStore::new()),
//!     Arc::new(LogNotifier),
//! )?);
//! let users: CollectionController<User> = CollectionController::new(
//!     client,
//!     Arc::new(QueryCache::default()),
//!     "/api/users/paginate",
//!     ControllerOptions::default(),
//! );
//! users.set_sort_key("first_name");
//! if let Some(page) = users.fetch().await?.applied() {
//!     println!("{} users on {} pages", page.info.total, page.info.pages);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{
    CacheKey, Config, FetchResult, FilterClause, FilterOperator, FilterSet, PageInfo, PageSize,
    PaginationState, Session, SortKey,
};
pub use domain::ports::{SessionNotifier, SessionStore};
pub use infrastructure::api::{ApiClient, ApiClientConfig, ApiError, ApiRequest, ApiResponse};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{CollectionController, ControllerOptions, FetchOutcome, FetchStatus, QueryCache};
