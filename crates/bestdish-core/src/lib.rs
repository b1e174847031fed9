pub mod app_config;
pub mod config;
pub mod geo;
pub mod location;
pub mod types;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use geo::haversine_meters;
pub use location::{LocationFeed, LocationStatus};
pub use types::{Business, Coordinate, LabeledImage};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
