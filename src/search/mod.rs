pub mod features;
pub mod filter;
pub mod query;
pub mod summary;

pub use features::{find_matching_feature, FeatureAdded, FeatureSelection, WarningBanner};
pub use filter::SearchFilter;
pub use query::{decode, encode, search_path};
pub use summary::summarize;
