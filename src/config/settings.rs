//! Environment-driven settings.
//!
//! Values are read from the process environment, which `main` populates from an
//! optional `.env` file before anything else runs.

/// Database used when `DATABASE_URL` is not set.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/storefront.sqlite?mode=rwc";

/// Session file used when `SESSION_FILE` is not set.
pub const DEFAULT_SESSION_FILE: &str = "data/session_id";

/// Catalog seed file used when `CATALOG_CONFIG` is not set.
pub const DEFAULT_CATALOG_CONFIG: &str = "config.toml";

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Database URL from `DATABASE_URL`, or the local `SQLite` default.
#[must_use]
pub fn database_url() -> String {
    env_or("DATABASE_URL", DEFAULT_DATABASE_URL)
}

/// Path of the file holding the persisted session id, from `SESSION_FILE`.
#[must_use]
pub fn session_file() -> String {
    env_or("SESSION_FILE", DEFAULT_SESSION_FILE)
}

/// Path of the catalog seed file, from `CATALOG_CONFIG`.
#[must_use]
pub fn catalog_config() -> String {
    env_or("CATALOG_CONFIG", DEFAULT_CATALOG_CONFIG)
}
