pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use crate::adapters::LocalStorage;
pub use crate::app::pipelines::BackupPipeline;
pub use crate::config::toml_config::TomlConfig;
pub use crate::core::etl::EtlEngine;
pub use crate::utils::error::{EtlError, Result};
