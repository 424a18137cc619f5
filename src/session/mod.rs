use crate::client::ProfileBackend;
use crate::models::{User, UserProfile};
use anyhow::{anyhow, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

/// Signed-in state shared by the pages of the app
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<User>,
    pub profile: Option<UserProfile>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

#[derive(Debug, Default)]
struct Inner {
    session: Session,
    /// Bumped by login and logout so late profile responses can be recognised
    epoch: u64,
}

/// Outcome of the last finished profile request, kept for callers that waited on it
#[derive(Debug)]
struct SharedRefresh {
    /// Session epoch the request was made for
    epoch: u64,
    outcome: Result<UserProfile, String>,
}

/// Session store with explicit transitions: login, logout and profile refresh.
///
/// Concurrent refreshes are coalesced: a caller arriving while a refresh is in
/// flight waits for it and reuses its result instead of issuing another request.
pub struct SessionStore<P: ProfileBackend> {
    backend: Arc<P>,
    inner: Mutex<Inner>,
    last_refresh: tokio::sync::Mutex<Option<SharedRefresh>>,
    completed_refreshes: AtomicU64,
}

impl<P: ProfileBackend> SessionStore<P> {
    pub fn new(backend: Arc<P>) -> Self {
        Self {
            backend,
            inner: Mutex::new(Inner::default()),
            last_refresh: tokio::sync::Mutex::new(None),
            completed_refreshes: AtomicU64::new(0),
        }
    }

    pub fn login(&self, token: impl Into<String>, user: User) {
        let mut inner = self.lock_inner();
        info!("User {} signed in", user.email);
        inner.epoch += 1;
        inner.session = Session {
            token: Some(token.into()),
            user: Some(user),
            profile: None,
        };
    }

    pub fn logout(&self) {
        let mut inner = self.lock_inner();
        if inner.session.is_authenticated() {
            info!("User signed out");
        }
        inner.epoch += 1;
        inner.session = Session::default();
    }

    pub fn snapshot(&self) -> Session {
        self.lock_inner().session.clone()
    }

    /// Reload the profile of the signed-in user.
    ///
    /// A caller that waited on a refresh for the same session gets that
    /// refresh's profile or error. Returns `Ok(None)` when nobody is signed in,
    /// or when the session changed while the request was running and the
    /// response was discarded.
    pub async fn refresh_profile(&self) -> Result<Option<UserProfile>> {
        let observed = self.completed_refreshes.load(Ordering::SeqCst);
        let mut last = self.last_refresh.lock().await;

        if self.completed_refreshes.load(Ordering::SeqCst) != observed {
            let epoch = self.lock_inner().epoch;
            match last.as_ref() {
                Some(shared) if shared.epoch == epoch => {
                    debug!("Reusing outcome of concurrent profile refresh");
                    return match &shared.outcome {
                        Ok(profile) => Ok(Some(profile.clone())),
                        Err(message) => Err(anyhow!("{}", message)),
                    };
                }
                _ => debug!("Session changed since the concurrent refresh, fetching again"),
            }
        }

        let (token, epoch) = {
            let inner = self.lock_inner();
            match &inner.session.token {
                Some(token) => (token.clone(), inner.epoch),
                None => return Ok(None),
            }
        };

        let fetched = self.backend.fetch_profile(&token).await;
        *last = Some(SharedRefresh {
            epoch,
            outcome: fetched
                .as_ref()
                .map(UserProfile::clone)
                .map_err(|err| format!("{:#}", err)),
        });
        self.completed_refreshes.fetch_add(1, Ordering::SeqCst);
        let profile = fetched?;

        let mut inner = self.lock_inner();
        if inner.epoch != epoch {
            debug!("Session changed during profile refresh, discarding response");
            return Ok(None);
        }
        inner.session.profile = Some(profile.clone());
        Ok(Some(profile))
    }

    fn lock_inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    /// Counts calls and holds each response until released
    struct GatedProfiles {
        calls: AtomicUsize,
        release: Notify,
    }

    impl GatedProfiles {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                release: Notify::new(),
            }
        }
    }

    #[async_trait]
    impl ProfileBackend for GatedProfiles {
        async fn fetch_profile(&self, token: &str) -> Result<UserProfile> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.release.notified().await;
            if token == "expired" {
                anyhow::bail!("401 Unauthorized");
            }
            Ok(UserProfile {
                user_id: 42,
                first_name: Some("Ana".to_string()),
                ..Default::default()
            })
        }
    }

    fn user() -> User {
        User {
            id: 42,
            email: "ana@example.com".to_string(),
            role: Some("AGENT".to_string()),
        }
    }

    async fn wait_for_calls(backend: &GatedProfiles, calls: usize) {
        while backend.calls.load(Ordering::SeqCst) < calls {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn refresh_without_login_skips_backend() {
        let backend = Arc::new(GatedProfiles::new());
        let store = SessionStore::new(backend.clone());

        assert_eq!(store.refresh_profile().await.unwrap(), None);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn concurrent_refreshes_share_one_request() {
        let backend = Arc::new(GatedProfiles::new());
        let store = Arc::new(SessionStore::new(backend.clone()));
        store.login("token", user());

        let first = tokio::spawn({
            let store = store.clone();
            async move { store.refresh_profile().await }
        });
        wait_for_calls(&backend, 1).await;
        let second = tokio::spawn({
            let store = store.clone();
            async move { store.refresh_profile().await }
        });
        // Let the second caller queue behind the in-flight refresh
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        backend.release.notify_one();

        let first = first.await.unwrap().unwrap();
        let second = second.await.unwrap().unwrap();

        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
        assert_eq!(first, second);
        assert_eq!(store.snapshot().profile.map(|p| p.user_id), Some(42));
    }

    #[tokio::test]
    async fn waiter_gets_error_of_shared_refresh() {
        let backend = Arc::new(GatedProfiles::new());
        let store = Arc::new(SessionStore::new(backend.clone()));
        store.login("expired", user());

        let first = tokio::spawn({
            let store = store.clone();
            async move { store.refresh_profile().await }
        });
        wait_for_calls(&backend, 1).await;
        let second = tokio::spawn({
            let store = store.clone();
            async move { store.refresh_profile().await }
        });
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        backend.release.notify_one();

        let first = first.await.unwrap().unwrap_err();
        let second = second.await.unwrap().unwrap_err();

        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
        assert!(first.to_string().contains("401"));
        assert!(second.to_string().contains("401"), "{}", second);
        assert!(store.snapshot().is_authenticated());
    }

    #[tokio::test]
    async fn waiter_refetches_after_new_login() {
        let backend = Arc::new(GatedProfiles::new());
        let store = Arc::new(SessionStore::new(backend.clone()));
        store.login("expired", user());

        let first = tokio::spawn({
            let store = store.clone();
            async move { store.refresh_profile().await }
        });
        wait_for_calls(&backend, 1).await;
        let second = tokio::spawn({
            let store = store.clone();
            async move { store.refresh_profile().await }
        });
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        store.login("fresh", user());
        backend.release.notify_one();

        // The old session's request fails; the waiter fetches again with the new token
        assert!(first.await.unwrap().is_err());
        wait_for_calls(&backend, 2).await;
        backend.release.notify_one();

        let profile = second.await.unwrap().unwrap();
        assert_eq!(profile.map(|p| p.user_id), Some(42));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
        assert_eq!(store.snapshot().profile.map(|p| p.user_id), Some(42));
    }

    #[tokio::test]
    async fn logout_discards_late_profile() {
        let backend = Arc::new(GatedProfiles::new());
        let store = Arc::new(SessionStore::new(backend.clone()));
        store.login("token", user());

        let refresh = tokio::spawn({
            let store = store.clone();
            async move { store.refresh_profile().await }
        });
        wait_for_calls(&backend, 1).await;
        store.logout();
        backend.release.notify_one();

        assert_eq!(refresh.await.unwrap().unwrap(), None);
        assert_eq!(store.snapshot(), Session::default());
    }

    #[tokio::test]
    async fn failed_refresh_keeps_session() {
        let backend = Arc::new(GatedProfiles::new());
        let store = SessionStore::new(backend.clone());
        store.login("expired", user());
        backend.release.notify_one();

        assert!(store.refresh_profile().await.is_err());
        let session = store.snapshot();
        assert!(session.is_authenticated());
        assert!(session.profile.is_none());
    }
}
