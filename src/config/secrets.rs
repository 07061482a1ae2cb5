//! Credential resolution from the environment.
//!
//! Secrets may live in the config file, but environment variables always win so that
//! the client secret and keypair location never have to be written to disk.

use super::file::SolatranConfig;
use std::path::PathBuf;

pub const CLIENT_ID_ENV: &str = "SOLATRAN_CLIENT_ID";
pub const CLIENT_SECRET_ENV: &str = "SOLATRAN_CLIENT_SECRET";
pub const REDIRECT_URI_ENV: &str = "SOLATRAN_REDIRECT_URI";
pub const KEYPAIR_ENV: &str = "SOLATRAN_KEYPAIR";

/// Applies environment overrides to a loaded configuration.
pub fn apply_env_overrides(config: &mut SolatranConfig) {
    apply_overrides_from(config, |name| std::env::var(name).ok());
}

fn apply_overrides_from(config: &mut SolatranConfig, lookup: impl Fn(&str) -> Option<String>) {
    let lookup = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

    if let Some(client_id) = lookup(CLIENT_ID_ENV) {
        tracing::debug!("OAuth client id taken from {CLIENT_ID_ENV}");
        config.oauth.client_id = client_id;
    }
    if let Some(client_secret) = lookup(CLIENT_SECRET_ENV) {
        tracing::debug!("OAuth client secret taken from {CLIENT_SECRET_ENV}");
        config.oauth.client_secret = client_secret;
    }
    if let Some(redirect_uri) = lookup(REDIRECT_URI_ENV) {
        config.oauth.redirect_uri = redirect_uri;
    }
    if let Some(keypair) = lookup(KEYPAIR_ENV) {
        config.ledger.keypair_path = Some(PathBuf::from(keypair));
    }
}

/// Looks up the API key for a transcription provider.
///
/// Returns `None` when the variable is unset or empty.
pub fn get_api_key(env_var: &str) -> Option<String> {
    std::env::var(env_var)
        .ok()
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_config() -> SolatranConfig {
        SolatranConfig::from_toml(
            r#"
            [oauth]
            client_id = "file-id"
            client_secret = "file-secret"
            redirect_uri = "http://localhost/callback"

            [api]
            bot_handle = "@bot"
            "#,
        )
        .unwrap()
    }

    #[test]
    fn test_env_overrides_file_values() {
        let env: HashMap<&str, &str> = [
            (CLIENT_SECRET_ENV, "env-secret"),
            (KEYPAIR_ENV, "/tmp/payer.json"),
        ]
        .into_iter()
        .collect();

        let mut config = base_config();
        apply_overrides_from(&mut config, |name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.oauth.client_id, "file-id");
        assert_eq!(config.oauth.client_secret, "env-secret");
        assert_eq!(
            config.ledger.keypair_path,
            Some(PathBuf::from("/tmp/payer.json"))
        );
    }

    #[test]
    fn test_empty_env_value_is_ignored() {
        let mut config = base_config();
        apply_overrides_from(&mut config, |name| {
            (name == CLIENT_ID_ENV).then(|| "  ".to_string())
        });
        assert_eq!(config.oauth.client_id, "file-id");
    }
}
