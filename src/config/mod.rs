/// Database configuration and connection management
pub mod database;

/// Console settings loaded from config.toml
pub mod settings;
