pub mod codec;
pub mod config_store;
pub mod configurator;
pub mod env_overrides;
pub mod error;
pub mod handle;
pub mod patch;
pub mod records;
pub mod types;
