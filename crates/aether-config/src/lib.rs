//! Configuration for the aether sky renderer.
//!
//! Settings persist to disk as RON and accept CLI overrides via clap.
//! Missing fields fall back to defaults.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    APP_DIR, CONFIG_FILE, CameraConfig, Config, DebugConfig, RenderConfig, SunConfig,
};
pub use error::ConfigError;
