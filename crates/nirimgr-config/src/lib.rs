//! Configuration loading for nirimgr
//!
//! This crate handles discovering and parsing the JSON configuration file:
//! the window/workspace rules, the per-notification action blocks and the
//! scratchpad settings.

mod error;
mod loader;
mod model;

pub use error::ConfigError;
pub use loader::{default_config_paths, find_config, load_config, load_config_str, CONFIG_FILE_NAME};
pub use model::*;
