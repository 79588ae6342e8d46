//! Browser cookie-store and navigation seams.
//!
//! The restoration protocol is defined entirely in terms of three jar
//! primitives (enumerate by domain, remove by url+name, set by descriptor)
//! plus one navigation call. Implementations adapt whatever messaging
//! surface the host browser offers.

use async_trait::async_trait;
use knox_core::cookie::{CookieDescriptor, SameSite};

/// A failure reported by the cookie store or navigation surface.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct JarError(pub String);

/// A cookie as currently stored in the browser, as much of it as the
/// clear phase needs to address a removal.
#[derive(Debug, Clone)]
pub struct StoredCookie {
    pub name: String,
    pub domain: String,
    pub path: String,
    pub secure: bool,
}

impl StoredCookie {
    /// The URL a removal of this cookie is addressed to.
    pub fn removal_url(&self) -> String {
        let scheme = if self.secure { "https" } else { "http" };
        let domain = self.domain.strip_prefix('.').unwrap_or(&self.domain);
        format!("{scheme}://{domain}{}", self.path)
    }
}

/// A fully resolved cookie write.
#[derive(Debug, Clone)]
pub struct SetCookie {
    pub url: String,
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    pub secure: bool,
    pub http_only: bool,
    /// Present only when the descriptor carried a recognized policy token;
    /// otherwise the attribute is omitted from the write.
    pub same_site: Option<SameSite>,
    pub expiration_date: Option<f64>,
}

impl SetCookie {
    /// Resolve a descriptor into the write the jar will perform.
    pub fn from_descriptor(descriptor: &CookieDescriptor) -> Self {
        Self {
            url: descriptor.set_url(),
            name: descriptor.name.clone(),
            value: descriptor.value.clone(),
            domain: descriptor.domain.clone(),
            path: descriptor.path.clone(),
            secure: descriptor.secure,
            http_only: descriptor.http_only,
            same_site: descriptor.same_site_policy(),
            expiration_date: descriptor.expiration_date,
        }
    }
}

/// The local browser cookie store.
#[async_trait]
pub trait CookieJar: Send + Sync {
    /// Enumerate every cookie stored for `domain` (and its subdomains,
    /// per the host browser's matching rules).
    async fn get_all_by_domain(&self, domain: &str) -> Result<Vec<StoredCookie>, JarError>;

    /// Remove one cookie addressed by url + name. Removing a cookie that
    /// no longer exists is not an error.
    async fn remove(&self, url: &str, name: &str) -> Result<(), JarError>;

    /// Write one cookie.
    async fn set(&self, cookie: SetCookie) -> Result<(), JarError>;
}

/// Navigation surface: where the client lands after a restoration.
#[async_trait]
pub trait Navigator: Send + Sync {
    async fn open(&self, url: &str) -> Result<(), JarError>;
}
