pub mod collection;
pub mod debounce;
pub mod query_cache;

pub use collection::{CollectionController, ControllerOptions, FetchOutcome, FetchStatus};
pub use debounce::Debouncer;
pub use query_cache::{FetchMode, QueryCache};
