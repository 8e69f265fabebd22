pub mod app_config;
pub mod config;
pub mod product;
pub mod summary;

pub use app_config::{AppConfig, OutputFormat, ParseFormatError};
pub use config::{load_app_config, load_app_config_from_env};
pub use product::{Nutriments, ProductRecord};
pub use summary::RunSummary;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
