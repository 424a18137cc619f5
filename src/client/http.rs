use crate::client::traits::{ProfileBackend, SearchBackend};
use crate::client::types::PageRequest;
use crate::config::Config;
use crate::models::{PropertyPage, UserProfile};
use crate::search::{encode, SearchFilter};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, warn};

const SEARCH_ENDPOINT: &str = "api/real-estates/search";
const FEATURES_ENDPOINT: &str = "api/real-estates/features";
const PROFILE_ENDPOINT: &str = "api/users/me";

/// Marketplace REST backend
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .user_agent(config.user_agent.as_str())
            .build()
            .context("Failed to create HTTP client")?;

        // Url::join drops the last segment unless the base ends with '/'
        let mut base = config.api_base_url.trim_end_matches('/').to_string();
        base.push('/');
        let base_url = Url::parse(&base)
            .with_context(|| format!("Invalid backend URL: {}", config.api_base_url))?;

        Ok(Self { client, base_url })
    }

    /// Full request URL for a search
    pub fn search_url(&self, filter: &SearchFilter, page: PageRequest) -> Result<Url> {
        let mut url = self.endpoint(SEARCH_ENDPOINT)?;

        let mut query = encode(filter);
        if !query.is_empty() {
            query.push('&');
        }
        query.push_str(&format!("page={}&size={}", page.page, page.size));
        url.set_query(Some(&query));

        Ok(url)
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("Invalid endpoint {}", path))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        bearer: Option<&str>,
    ) -> Result<T> {
        debug!("Fetching URL: {}", url);

        let mut request = self.client.get(url.clone());
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to reach {}", url.path()))?;

        if !response.status().is_success() {
            warn!("Backend returned status {} for {}", response.status(), url.path());
            anyhow::bail!("Request to {} failed: {}", url.path(), response.status());
        }

        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to decode response from {}", url.path()))
    }
}

#[async_trait]
impl SearchBackend for HttpBackend {
    async fn search(&self, filter: &SearchFilter, page: PageRequest) -> Result<PropertyPage> {
        let url = self.search_url(filter, page)?;
        let results: PropertyPage = self.get_json(url, None).await?;

        info!(
            "Search returned {} of {} listings (page {})",
            results.content.len(),
            results.total(),
            page.page
        );
        Ok(results)
    }

    async fn known_features(&self) -> Result<Vec<String>> {
        let url = self.endpoint(FEATURES_ENDPOINT)?;
        let features: Vec<String> = self.get_json(url, None).await?;

        debug!("Backend knows {} features", features.len());
        Ok(features)
    }
}

#[async_trait]
impl ProfileBackend for HttpBackend {
    async fn fetch_profile(&self, token: &str) -> Result<UserProfile> {
        let url = self.endpoint(PROFILE_ENDPOINT)?;
        self.get_json(url, Some(token)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PropertyType;

    fn backend(base: &str) -> HttpBackend {
        let config = Config {
            api_base_url: base.to_string(),
            ..Config::for_tests()
        };
        HttpBackend::new(&config).unwrap()
    }

    #[test]
    fn search_url_carries_filter_and_pagination() {
        let filter = SearchFilter {
            price_max: Some(200000.0),
            property_type: Some(PropertyType::Apartment),
            features: vec!["Parking".to_string(), "Pool".to_string()],
            ..Default::default()
        };

        let url = backend("https://homes.example.com/")
            .search_url(&filter, PageRequest { page: 2, size: 12 })
            .unwrap();

        assert_eq!(
            url.as_str(),
            "https://homes.example.com/api/real-estates/search?priceMax=200000&propertyType=APARTMENT&features=Parking&features=Pool&page=2&size=12"
        );
    }

    #[test]
    fn base_path_is_preserved() {
        let url = backend("https://example.com/marketplace")
            .search_url(&SearchFilter::default(), PageRequest::first(12))
            .unwrap();

        assert_eq!(
            url.as_str(),
            "https://example.com/marketplace/api/real-estates/search?page=0&size=12"
        );
    }

    #[test]
    fn rejects_invalid_base_url() {
        let config = Config {
            api_base_url: "not a url".to_string(),
            ..Config::for_tests()
        };
        assert!(HttpBackend::new(&config).is_err());
    }

    #[tokio::test]
    async fn unreachable_backend_is_an_error() {
        // Port 9 (discard) is closed on test machines
        let result = backend("http://127.0.0.1:9")
            .search(&SearchFilter::default(), PageRequest::default())
            .await;
        assert!(result.is_err());
    }
}
