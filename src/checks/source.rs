//! Fetching the authoritative check definition set, with stale fallback.
//!
//! A transient remote failure must not wipe out the currently active
//! configuration: once a load has succeeded, later failures return the
//! last known good snapshot. Only the very first load, where no prior
//! state exists, surfaces the failure to the caller.

use std::sync::Arc;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use reqwest_middleware::ClientWithMiddleware;
use thiserror::Error;
use tokio::sync::Mutex;
use url::Url;

use crate::{
    auth::{TokenProvider, credential_prefix},
    models::{CheckDefinitionSet, CheckDefinitionsResponse},
};

/// Errors raised while fetching check definitions from the remote
/// authority.
///
/// Callers of [`CheckSource::fetch_all`] only ever observe these before
/// the first successful load; afterwards failures are absorbed into the
/// stale fallback.
#[derive(Debug, Error)]
pub enum CheckFetchError {
    /// Transport-level failure talking to the definition endpoint.
    #[error("check definition request failed: {0}")]
    Request(#[from] reqwest_middleware::Error),

    /// The endpoint answered with a non-success status code.
    #[error("check definition endpoint returned {0}")]
    Status(reqwest::StatusCode),

    /// The response body could not be decoded.
    #[error("malformed check definition response: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Produces the current check definition snapshot on demand.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CheckSource: Send + Sync {
    /// Returns the current snapshot, falling back to the last known good
    /// one when a refresh fails after a completed first load.
    async fn fetch_all(&self) -> Result<Arc<CheckDefinitionSet>, CheckFetchError>;
}

/// Synchronization state of one source instance: the last known good
/// snapshot and whether any load has ever succeeded.
#[derive(Debug, Default)]
struct SyncState {
    last_known_good: Arc<CheckDefinitionSet>,
    loaded_once: bool,
}

impl SyncState {
    /// Decision table over (first load done, fetch outcome).
    ///
    /// A success always becomes the new last known good snapshot. A failure
    /// before the first success propagates and leaves the state untouched,
    /// so a retry starts from a clean slate; a failure after it returns the
    /// cached snapshot unchanged.
    fn absorb(
        &mut self,
        outcome: Result<CheckDefinitionSet, CheckFetchError>,
    ) -> Result<Arc<CheckDefinitionSet>, CheckFetchError> {
        match (self.loaded_once, outcome) {
            (_, Ok(fresh)) => {
                let fresh = Arc::new(fresh);
                self.last_known_good = Arc::clone(&fresh);
                self.loaded_once = true;
                Ok(fresh)
            }
            (false, Err(err)) => Err(err),
            (true, Err(err)) => {
                tracing::warn!(
                    error = %err,
                    checks = self.last_known_good.len(),
                    "keeping last known good check definitions after failed refresh"
                );
                Ok(Arc::clone(&self.last_known_good))
            }
        }
    }
}

/// A `CheckSource` backed by the remote definition authority's HTTP
/// endpoint.
pub struct HttpCheckSource {
    url: Url,
    tokens: Arc<dyn TokenProvider>,
    client: ClientWithMiddleware,
    state: Mutex<SyncState>,
}

impl HttpCheckSource {
    /// Creates a new `HttpCheckSource` for the given endpoint.
    pub fn new(url: Url, tokens: Arc<dyn TokenProvider>, client: ClientWithMiddleware) -> Self {
        tracing::info!(url = %url, "configuring check source");
        Self {
            url,
            tokens,
            client,
            state: Mutex::new(SyncState::default()),
        }
    }

    /// One round trip to the authority: authorized GET, status check,
    /// JSON decode. A 2xx response with a missing or null definition
    /// collection is an empty snapshot.
    async fn fetch_remote(&self) -> Result<CheckDefinitionSet, CheckFetchError> {
        let mut request = self.client.get(self.url.clone());
        match self.tokens.get() {
            Some(token) => {
                tracing::info!(
                    token_prefix = %credential_prefix(&token),
                    "querying check definitions"
                );
                request = request.bearer_auth(token);
            }
            None => {
                tracing::info!("querying check definitions without credential");
            }
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CheckFetchError::Status(status));
        }

        let body: CheckDefinitionsResponse =
            response.json().await.map_err(CheckFetchError::Decode)?;
        Ok(CheckDefinitionSet::from(body))
    }
}

#[async_trait]
impl CheckSource for HttpCheckSource {
    async fn fetch_all(&self) -> Result<Arc<CheckDefinitionSet>, CheckFetchError> {
        // Holding the lock across the round trip serializes overlapping
        // refresh ticks on the same instance.
        let mut state = self.state.lock().await;

        let outcome = self.fetch_remote().await;
        match &outcome {
            Ok(set) => {
                tracing::info!(checks = set.len(), url = %self.url, "fetched check definitions");
            }
            Err(err) => {
                tracing::error!(error = %err, url = %self.url, "failed to fetch check definitions");
            }
        }

        state.absorb(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::CheckDefinitionBuilder;

    fn snapshot(ids: &[i64]) -> CheckDefinitionSet {
        ids.iter()
            .map(|id| CheckDefinitionBuilder::new().id(*id).build())
            .collect()
    }

    fn fetch_error() -> CheckFetchError {
        CheckFetchError::Status(reqwest::StatusCode::INTERNAL_SERVER_ERROR)
    }

    #[test]
    fn success_on_first_load_stores_the_snapshot() {
        let mut state = SyncState::default();

        let result = state.absorb(Ok(snapshot(&[1, 2])));

        let set = result.expect("first successful load returns the snapshot");
        assert_eq!(set.len(), 2);
        assert!(state.loaded_once);
        assert!(Arc::ptr_eq(&set, &state.last_known_good));
    }

    #[test]
    fn success_after_first_load_replaces_the_snapshot() {
        let mut state = SyncState::default();
        state.absorb(Ok(snapshot(&[1]))).unwrap();

        let result = state.absorb(Ok(snapshot(&[1, 2, 3])));

        let set = result.expect("refresh returns the new snapshot");
        assert_eq!(set.len(), 3);
        assert!(state.loaded_once);
        assert_eq!(state.last_known_good.len(), 3);
    }

    #[test]
    fn failure_before_first_load_propagates_and_leaves_state_clean() {
        let mut state = SyncState::default();

        let result = state.absorb(Err(fetch_error()));

        assert!(matches!(result, Err(CheckFetchError::Status(_))));
        assert!(!state.loaded_once);
        assert!(state.last_known_good.is_empty());
    }

    #[test]
    fn failure_after_first_load_returns_the_cached_snapshot() {
        let mut state = SyncState::default();
        let loaded = state.absorb(Ok(snapshot(&[1, 2]))).unwrap();

        let result = state.absorb(Err(fetch_error()));

        let stale = result.expect("failure after first load is absorbed");
        assert!(Arc::ptr_eq(&stale, &loaded));
        assert!(state.loaded_once);
    }

    #[test]
    fn first_load_failure_then_success_then_failure() {
        let mut state = SyncState::default();

        assert!(state.absorb(Err(fetch_error())).is_err());
        assert!(!state.loaded_once);

        let loaded = state.absorb(Ok(snapshot(&[1, 2]))).unwrap();
        assert_eq!(loaded.len(), 2);

        let stale = state.absorb(Err(fetch_error())).unwrap();
        assert!(Arc::ptr_eq(&stale, &loaded));
    }
}
