/// Database connection and table creation
pub mod database;

/// Economy tuning loaded from config.toml
pub mod economy;

/// Administrator identity from environment variables
pub mod owner;
