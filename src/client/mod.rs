pub mod http;
pub mod search;
pub mod traits;
pub mod types;

pub use http::HttpBackend;
pub use search::{SearchController, SearchState, SEARCH_FAILED_MESSAGE};
pub use traits::{ProfileBackend, SearchBackend};
pub use types::PageRequest;
