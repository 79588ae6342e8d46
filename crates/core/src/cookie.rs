//! Credential descriptor model.
//!
//! A descriptor is the structured form of one browser cookie as stored per
//! service. Descriptor sets are stored server-side as a JSON array and are
//! the payload of a successful credential fetch; the wire format uses the
//! camelCase field names the browser cookie APIs expect.

use serde::{Deserialize, Serialize};

/// One browser cookie belonging to a service's credential set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CookieDescriptor {
    pub name: String,
    pub value: String,
    /// Cookie domain, possibly with a leading `.` host-wildcard marker.
    pub domain: String,
    #[serde(default = "default_path")]
    pub path: String,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub http_only: bool,
    /// Raw same-site token as stored; only recognized values are applied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub same_site: Option<String>,
    /// Expiration as seconds since the Unix epoch. Session cookie if absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<f64>,
}

fn default_path() -> String {
    "/".to_string()
}

impl CookieDescriptor {
    /// The domain with any leading host-wildcard `.` stripped.
    pub fn bare_domain(&self) -> &str {
        self.domain.strip_prefix('.').unwrap_or(&self.domain)
    }

    /// The URL a cookie-store write for this descriptor is scoped to.
    pub fn set_url(&self) -> String {
        let scheme = if self.secure { "https" } else { "http" };
        format!("{scheme}://{}{}", self.bare_domain(), self.path)
    }

    /// The same-site policy, if the stored token is one of the recognized
    /// values. Unrecognized tokens yield `None` and the attribute is
    /// omitted from the cookie write rather than failing it.
    pub fn same_site_policy(&self) -> Option<SameSite> {
        self.same_site.as_deref().and_then(SameSite::parse)
    }
}

/// Derive the navigation target from a descriptor set.
///
/// The first descriptor's domain (wildcard marker stripped) and secure flag
/// determine where the client lands after restoration. Empty sets have no
/// target.
pub fn target_url(descriptors: &[CookieDescriptor]) -> Option<String> {
    let first = descriptors.first()?;
    let scheme = if first.secure { "https" } else { "http" };
    Some(format!("{scheme}://{}", first.bare_domain()))
}

/// The three same-site policy tokens the browser cookie store recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    NoRestriction,
    Lax,
    Strict,
}

impl SameSite {
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "no_restriction" => Some(Self::NoRestriction),
            "lax" => Some(Self::Lax),
            "strict" => Some(Self::Strict),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoRestriction => "no_restriction",
            Self::Lax => "lax",
            Self::Strict => "strict",
        }
    }
}
