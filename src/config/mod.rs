//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, BillingConfig, LogFormat, LoggingConfig, ServerConfig, StorageSettings,
};
