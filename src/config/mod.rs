/// Database configuration and connection management
pub mod database;

/// Brand list configuration from config.toml
pub mod brands;
