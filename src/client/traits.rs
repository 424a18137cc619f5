use crate::client::types::PageRequest;
use crate::models::{PropertyPage, UserProfile};
use crate::search::SearchFilter;
use anyhow::Result;
use async_trait::async_trait;

/// Marketplace search API
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Run a search and return one page of matching listings
    async fn search(&self, filter: &SearchFilter, page: PageRequest) -> Result<PropertyPage>;

    /// Feature names the backend indexes
    async fn known_features(&self) -> Result<Vec<String>>;
}

/// Source of the signed-in user's profile
#[async_trait]
pub trait ProfileBackend: Send + Sync {
    async fn fetch_profile(&self, token: &str) -> Result<UserProfile>;
}
