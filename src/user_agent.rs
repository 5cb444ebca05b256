//! Shared User-Agent string for catalog and cover HTTP clients.
//!
//! Single source for project URL and UA format so catalog lookups and cover
//! downloads stay consistent and easy to update (good citizenship; RFC 9308).

/// Project URL for User-Agent identification (good citizenship; RFC 9308).
const PROJECT_UA_URL: &str = "https://github.com/fierce/shelfsync";

/// Default User-Agent for all outbound HTTP requests (identifies the tool).
#[must_use]
pub(crate) fn default_http_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("shelfsync/{version} (ebook-library-tool; +{PROJECT_UA_URL})")
}
