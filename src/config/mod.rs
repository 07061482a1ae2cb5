//! Configuration management for solatran.
//!
//! This module handles loading application configuration from TOML files and
//! resolving credentials from the environment. Configuration is stored in the
//! user's config directory; the payer keypair and the processed-message database
//! live in the user's local data directory.

pub mod file;
pub mod secrets;

pub use file::{
    data_dir, default_config_path, ApiConfig, OAuthConfig, SolatranConfig, SubtitleConfig,
};
pub use secrets::{apply_env_overrides, get_api_key};
