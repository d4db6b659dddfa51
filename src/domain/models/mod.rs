pub mod config;
pub mod fetch_result;
pub mod filter;
pub mod pagination;
pub mod session;

pub use config::{ApiConfig, Config, LoggingConfig, PaginationConfig};
pub use fetch_result::{FetchResult, PageInfo};
pub use filter::{FilterClause, FilterOperator, FilterParseError, FilterSet};
pub use pagination::{CacheKey, InvalidPageSize, PageSize, PaginationState, SortKey};
pub use session::{Credentials, Session, TokenResponse};
