use crate::client::traits::SearchBackend;
use crate::client::types::PageRequest;
use crate::models::PropertyPage;
use crate::search::{summarize, SearchFilter};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// Shown instead of the backend error when a search fails
pub const SEARCH_FAILED_MESSAGE: &str = "Search failed. Please try again later.";

/// What the results page shows
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    pub loading: bool,
    pub filter: Option<SearchFilter>,
    pub results: Option<PropertyPage>,
    pub error: Option<String>,
}

#[derive(Debug, Default)]
struct Inner {
    /// Sequence number of the most recently issued request
    latest: u64,
    view: SearchState,
}

/// Runs searches for one results page and keeps its state.
///
/// Every request gets a sequence number; only the response to the most
/// recently issued request is applied. Issuing a number and applying a
/// response happen under the same lock.
pub struct SearchController<B: SearchBackend> {
    backend: Arc<B>,
    state: Mutex<Inner>,
}

/// Clears the loading flag when the owning request finishes, unless a newer
/// request has been issued in the meantime. Runs on error and cancellation too.
struct LoadingGuard<'a, B: SearchBackend> {
    controller: &'a SearchController<B>,
    seq: u64,
}

impl<B: SearchBackend> Drop for LoadingGuard<'_, B> {
    fn drop(&mut self) {
        let mut inner = self.controller.lock_state();
        if inner.latest == self.seq {
            inner.view.loading = false;
        }
    }
}

impl<B: SearchBackend> SearchController<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            state: Mutex::new(Inner::default()),
        }
    }

    /// Search and apply the outcome if no newer search was started.
    /// Returns whether the outcome was applied.
    pub async fn run(&self, filter: SearchFilter, page: PageRequest) -> bool {
        let seq = {
            let mut inner = self.lock_state();
            inner.latest += 1;
            inner.view.loading = true;
            inner.view.error = None;
            inner.latest
        };
        let _loading = LoadingGuard { controller: self, seq };

        info!("Search #{}: {}", seq, summarize(&filter));
        let outcome = self.backend.search(&filter, page).await;

        // Declared after the loading guard so it is released before the guard locks again
        let mut inner = self.lock_state();
        if inner.latest != seq {
            debug!("Dropping stale response for search #{}", seq);
            return false;
        }

        let view = &mut inner.view;
        match outcome {
            Ok(results) => {
                debug!("Search #{} returned {} listings", seq, results.content.len());
                view.results = Some(results);
                view.error = None;
            }
            Err(err) => {
                warn!("Search #{} failed: {:#}", seq, err);
                view.results = None;
                view.error = Some(SEARCH_FAILED_MESSAGE.to_string());
            }
        }
        view.filter = Some(filter);
        true
    }

    pub fn snapshot(&self) -> SearchState {
        self.lock_state().view.clone()
    }

    fn lock_state(&self) -> MutexGuard<'_, Inner> {
        // State stays consistent even if a holder panicked; every write is a plain field store
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Property;
    use anyhow::{Context, Result};
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::sync::oneshot;

    struct FailingBackend;

    #[async_trait]
    impl SearchBackend for FailingBackend {
        async fn search(&self, _: &SearchFilter, _: PageRequest) -> Result<PropertyPage> {
            anyhow::bail!("connection reset")
        }

        async fn known_features(&self) -> Result<Vec<String>> {
            Ok(Vec::new())
        }
    }

    struct StaticBackend;

    #[async_trait]
    impl SearchBackend for StaticBackend {
        async fn search(&self, _: &SearchFilter, _: PageRequest) -> Result<PropertyPage> {
            Ok(PropertyPage {
                content: vec![Property {
                    id: 1,
                    ..Default::default()
                }],
                ..Default::default()
            })
        }

        async fn known_features(&self) -> Result<Vec<String>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn failure_surfaces_generic_message_and_clears_loading() {
        let controller = SearchController::new(Arc::new(FailingBackend));

        assert!(controller.run(SearchFilter::default(), PageRequest::default()).await);

        let state = controller.snapshot();
        assert!(!state.loading);
        assert!(state.results.is_none());
        assert_eq!(state.error.as_deref(), Some(SEARCH_FAILED_MESSAGE));
    }

    #[tokio::test]
    async fn success_replaces_previous_error() {
        let controller = SearchController::new(Arc::new(StaticBackend));
        controller.lock_state().view.error = Some("old".to_string());

        let filter = SearchFilter {
            city: Some("Rijeka".to_string()),
            ..Default::default()
        };
        assert!(controller.run(filter.clone(), PageRequest::default()).await);

        let state = controller.snapshot();
        assert!(!state.loading);
        assert!(state.error.is_none());
        assert_eq!(state.filter, Some(filter));
        assert_eq!(state.results.map(|page| page.content.len()), Some(1));
    }

    /// Answers the first search once the test releases it
    struct GatedBackend {
        gate: Mutex<Option<oneshot::Receiver<PropertyPage>>>,
    }

    #[async_trait]
    impl SearchBackend for GatedBackend {
        async fn search(&self, _: &SearchFilter, _: PageRequest) -> Result<PropertyPage> {
            let gate = self.gate.lock().unwrap().take().context("unexpected search")?;
            Ok(gate.await?)
        }

        async fn known_features(&self) -> Result<Vec<String>> {
            Ok(Vec::new())
        }
    }

    fn page_of(id: i64) -> PropertyPage {
        PropertyPage {
            content: vec![Property {
                id,
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn newer_search_issued_during_apply_wins() {
        let (release, gate) = oneshot::channel();
        let backend = Arc::new(GatedBackend {
            gate: Mutex::new(Some(gate)),
        });
        let controller = Arc::new(SearchController::new(backend));

        let first = tokio::spawn({
            let controller = controller.clone();
            async move { controller.run(SearchFilter::default(), PageRequest::default()).await }
        });
        while !controller.snapshot().loading {
            tokio::task::yield_now().await;
        }

        {
            // While the lock is held the first response arrives and waits to be applied;
            // meanwhile a second search is issued and answered.
            let mut inner = controller.lock_state();
            release.send(page_of(1)).unwrap();
            std::thread::sleep(Duration::from_millis(50));
            inner.latest += 1;
            inner.view.results = Some(page_of(2));
        }

        assert!(!first.await.unwrap());
        let ids: Vec<i64> = controller
            .snapshot()
            .results
            .map(|page| page.content.iter().map(|p| p.id).collect())
            .unwrap_or_default();
        assert_eq!(ids, vec![2]);
    }
}
