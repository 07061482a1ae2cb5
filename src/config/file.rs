//! Configuration file management for solatran.
//!
//! This module handles loading application configuration from TOML files.
//! Configuration is stored in the user's config directory, runtime data
//! (keypair, processed-message database) in the user's local data directory.

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// OAuth2 client registration with the social-media API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthConfig {
    /// Public client identifier issued by the provider
    pub client_id: String,
    /// Client secret used for the Basic header of the token request
    #[serde(default)]
    pub client_secret: String,
    /// Callback URL registered with the provider; must route to `/callback`
    pub redirect_uri: String,
    /// Authorization endpoint the user agent is redirected to
    #[serde(default = "default_auth_url")]
    pub auth_url: String,
    /// Token endpoint for the authorization-code exchange
    #[serde(default = "default_token_url")]
    pub token_url: String,
    /// Requested scopes, joined with spaces in the authorization request
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
}

fn default_auth_url() -> String {
    "https://twitter.com/i/oauth2/authorize".to_string()
}

fn default_token_url() -> String {
    "https://api.twitter.com/2/oauth2/token".to_string()
}

fn default_scopes() -> Vec<String> {
    ["tweet.read", "tweet.write", "users.read", "offline.access"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Social API endpoints and the bot's command surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL; `/search/recent` and `/messages` are appended
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Handle whose inbound messages are scanned for commands
    pub bot_handle: String,
    /// Number of recent messages fetched per callback
    #[serde(default = "default_max_results")]
    pub max_results: u8,
    /// Literal first token of a transfer command
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,
}

fn default_api_url() -> String {
    "https://api.twitter.com/2".to_string()
}

fn default_max_results() -> u8 {
    10
}

fn default_command_prefix() -> String {
    "!send".to_string()
}

/// Listener and session settings for `solatran serve`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Sessions older than this are discarded before the callback arrives
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
    /// Marks the session cookie `Secure`; enable behind HTTPS
    #[serde(default)]
    pub secure_cookie: bool,
}

fn default_bind() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_session_ttl_secs() -> u64 {
    600
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            session_ttl_secs: default_session_ttl_secs(),
            secure_cookie: false,
        }
    }
}

/// Outbound HTTP settings shared by every API client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Ledger RPC endpoint and the payer's keypair location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    /// Keypair JSON file; defaults to `keypair.json` in the data directory
    #[serde(default)]
    pub keypair_path: Option<PathBuf>,
}

fn default_rpc_url() -> String {
    "https://api.devnet.solana.com".to_string()
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            keypair_path: None,
        }
    }
}

impl LedgerConfig {
    /// Returns the configured keypair path or the default in the data directory.
    ///
    /// # Errors
    /// - If no path is configured and the home directory cannot be determined
    pub fn resolved_keypair_path(&self) -> anyhow::Result<PathBuf> {
        match &self.keypair_path {
            Some(path) => Ok(path.clone()),
            None => Ok(data_dir()?.join("keypair.json")),
        }
    }
}

/// Subtitle transcription settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtitleConfig {
    /// Model id; selects the provider (see `solatran subtitle --help`)
    #[serde(default = "default_subtitle_model")]
    pub model: String,
    /// ISO-639-1 hint passed to the speech model
    #[serde(default)]
    pub language: Option<String>,
    /// Upload plus inference can take minutes for long videos
    #[serde(default = "default_subtitle_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_subtitle_model() -> String {
    "whisper-1".to_string()
}

fn default_subtitle_timeout_secs() -> u64 {
    300
}

impl Default for SubtitleConfig {
    fn default() -> Self {
        Self {
            model: default_subtitle_model(),
            language: None,
            timeout_secs: default_subtitle_timeout_secs(),
        }
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolatranConfig {
    pub oauth: OAuthConfig,
    pub api: ApiConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub subtitle: SubtitleConfig,
}

impl SolatranConfig {
    /// Loads configuration from the given TOML file.
    ///
    /// # Errors
    /// - If the config file cannot be read
    /// - If the TOML is malformed
    pub fn load(config_path: &Path) -> anyhow::Result<Self> {
        let config_content = fs::read_to_string(config_path).map_err(|e| {
            anyhow!(
                "Failed to read config file {}: {e}",
                config_path.display()
            )
        })?;
        Self::from_toml(&config_content)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    /// - If the TOML is malformed or a required key is missing
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config: SolatranConfig =
            toml::from_str(content).map_err(|e| anyhow!("Invalid configuration: {e}"))?;
        Ok(config)
    }
}

/// Retrieves the path to the default config file.
///
/// # Errors
/// - If the home directory cannot be determined
pub fn default_config_path() -> anyhow::Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| anyhow!("Could not determine home directory"))?;
    Ok(home.join(".config").join("solatran").join("solatran.toml"))
}

/// Directory for runtime data (keypair, processed-message database).
///
/// # Errors
/// - If the home directory cannot be determined
pub fn data_dir() -> anyhow::Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| anyhow!("Could not determine home directory"))?;
    Ok(home.join(".local").join("share").join("solatran"))
}
