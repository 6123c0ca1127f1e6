/// Database configuration and connection management
pub mod database;

/// Catalog seed configuration loading from config.toml
pub mod catalog;

/// Environment-driven settings (database URL, session file)
pub mod settings;
