//! The per-attempt restoration state machine.
//!
//! One attempt runs: request -> target resolution -> clear -> set ->
//! navigate. The ordering guarantee is that the clear phase fully
//! completes (every removal awaited) before the first write begins.
//! Individual removal and write failures are logged and tolerated; only a
//! failed clear-phase enumeration aborts, and it aborts before any
//! mutation. There is no rollback: an error mid-set leaves a partial
//! cookie set behind by design.
//!
//! Concurrent attempts against the same domain are serialized by a
//! per-domain async mutex. The browser jar is one shared mutable resource;
//! without the lock a second attempt's clears could interleave with the
//! first's writes.

use std::collections::HashMap;
use std::sync::Arc;

use knox_core::cookie::{self, CookieDescriptor};
use tokio::sync::Mutex;

use crate::api::{ApiClient, ApiError, Denial};
use crate::jar::{CookieJar, Navigator, SetCookie};

/// Failure of a restoration attempt.
#[derive(Debug, thiserror::Error)]
pub enum RestoreError {
    /// The server refused the credential fetch. No browser mutation has
    /// happened; the UI routes to login or subscribe.
    #[error("restoration denied: {0:?}")]
    Denied(Denial),

    #[error(transparent)]
    Api(ApiError),

    /// The fetched descriptor set was empty; there is no target domain to
    /// restore against.
    #[error("service returned an empty credential set")]
    EmptyCredentialSet,

    /// The clear phase could not enumerate existing cookies. Aborted
    /// before any mutation -- the safe default.
    #[error("could not enumerate cookies for {domain}: {message}")]
    ClearEnumeration { domain: String, message: String },
}

impl From<ApiError> for RestoreError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Denied(denial) => RestoreError::Denied(denial),
            other => RestoreError::Api(other),
        }
    }
}

/// What one completed attempt did to the jar.
#[derive(Debug, Clone)]
pub struct RestoreReport {
    pub target_url: String,
    /// Removals attempted during the clear phase.
    pub cleared: usize,
    /// Descriptors written successfully.
    pub written: usize,
    /// Descriptors whose write failed and was skipped.
    pub skipped: usize,
}

/// Per-domain mutexes serializing whole clear-then-set sequences.
#[derive(Default)]
pub struct DomainLocks {
    inner: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl DomainLocks {
    pub fn new() -> Self {
        Self::default()
    }

    async fn acquire(&self, domain: &str) -> Arc<Mutex<()>> {
        let mut map = self.inner.lock().await;
        Arc::clone(map.entry(domain.to_string()).or_default())
    }
}

/// Orchestrates restoration attempts against one jar + navigator pair.
pub struct Restorer<J, N> {
    jar: J,
    navigator: N,
    locks: DomainLocks,
}

impl<J: CookieJar, N: Navigator> Restorer<J, N> {
    pub fn new(jar: J, navigator: N) -> Self {
        Self {
            jar,
            navigator,
            locks: DomainLocks::new(),
        }
    }

    /// Run one full attempt for `service_code`: fetch the descriptor set
    /// from the server, apply it, then navigate to the target.
    ///
    /// A denial stops the attempt before any jar access.
    pub async fn restore_service(
        &self,
        api: &ApiClient,
        service_code: &str,
    ) -> Result<RestoreReport, RestoreError> {
        let descriptors = api.restore(service_code).await?;
        self.restore_descriptors(&descriptors).await
    }

    /// Apply an already-fetched descriptor set and navigate to the target.
    pub async fn restore_descriptors(
        &self,
        descriptors: &[CookieDescriptor],
    ) -> Result<RestoreReport, RestoreError> {
        let report = self.apply(descriptors).await?;

        if let Err(e) = self.navigator.open(&report.target_url).await {
            // The cookies are in place; a failed tab open is not worth
            // unwinding them.
            tracing::warn!(url = %report.target_url, error = %e, "Navigation failed");
        }

        Ok(report)
    }

    /// Apply a descriptor set to the jar: clear everything stored for the
    /// target domain, then write each descriptor.
    pub async fn apply(
        &self,
        descriptors: &[CookieDescriptor],
    ) -> Result<RestoreReport, RestoreError> {
        let target_url =
            cookie::target_url(descriptors).ok_or(RestoreError::EmptyCredentialSet)?;
        let domain = descriptors[0].bare_domain().to_string();

        // One clear-then-set sequence per domain at a time.
        let lock = self.locks.acquire(&domain).await;
        let _guard = lock.lock().await;

        let cleared = self.clear_domain(&domain).await?;
        let (written, skipped) = self.write_all(descriptors).await;

        tracing::info!(%domain, cleared, written, skipped, "Restoration applied");

        Ok(RestoreReport {
            target_url,
            cleared,
            written,
            skipped,
        })
    }

    /// Clear phase: enumerate and remove every cookie for `domain`. Each
    /// removal is awaited independently; a removal failure (the cookie may
    /// already be gone) is tolerated.
    async fn clear_domain(&self, domain: &str) -> Result<usize, RestoreError> {
        let existing = self.jar.get_all_by_domain(domain).await.map_err(|e| {
            RestoreError::ClearEnumeration {
                domain: domain.to_string(),
                message: e.to_string(),
            }
        })?;

        let removals = existing.iter().map(|cookie| {
            let url = cookie.removal_url();
            async move {
                if let Err(e) = self.jar.remove(&url, &cookie.name).await {
                    tracing::debug!(name = %cookie.name, error = %e, "Cookie removal failed");
                }
            }
        });
        futures::future::join_all(removals).await;

        Ok(existing.len())
    }

    /// Set phase: write every descriptor, counting failures instead of
    /// aborting on them.
    async fn write_all(&self, descriptors: &[CookieDescriptor]) -> (usize, usize) {
        let writes = descriptors.iter().map(|descriptor| async move {
            let set = SetCookie::from_descriptor(descriptor);
            match self.jar.set(set).await {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(name = %descriptor.name, error = %e, "Cookie write failed, skipping");
                    false
                }
            }
        });
        let results = futures::future::join_all(writes).await;

        let written = results.iter().filter(|ok| **ok).count();
        (written, results.len() - written)
    }
}
