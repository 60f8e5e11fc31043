//! Cache key conventions.
//!
//! Keys are `"<namespace>:<identifier>"`; the degradation slot of a key is
//! `"<key>:backup"`. URL-derived identifiers are SHA-256 digests of the
//! canonical URL so that keys stay short and free of separators.

use sha2::{Digest, Sha256};

/// Suffix that marks the long-lived degradation slot.
pub const BACKUP_SUFFIX: &str = ":backup";

/// Namespace for content pages.
pub const PAGE_NAMESPACE: &str = "page";

/// Namespace for section listings.
pub const SECTIONS_NAMESPACE: &str = "sections";

/// Build a key from a namespace and a plain identifier.
pub fn cache_key(namespace: &str, identifier: &str) -> String {
    format!("{namespace}:{identifier}")
}

/// Build a key whose identifier is the hex SHA-256 digest of `url`.
pub fn url_cache_key(namespace: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    cache_key(namespace, &hex::encode(hasher.finalize()))
}

/// The degradation slot paired with `key`.
pub fn backup_key(key: &str) -> String {
    format!("{key}{BACKUP_SUFFIX}")
}

pub fn is_backup_key(key: &str) -> bool {
    key.ends_with(BACKUP_SUFFIX)
}
