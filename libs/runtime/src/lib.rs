//! Process-level runtime support: layered configuration and logging setup.

pub mod config;
pub mod logging;
pub mod paths;

pub use config::{
    AppConfig, CliArgs, DatabaseConfig, LoggingConfig, Section, ServerConfig,
};
