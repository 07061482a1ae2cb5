//! PKCE (RFC 7636) verifier, challenge and anti-forgery state generation.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::fmt;

use crate::config::OAuthConfig;

/// Verifier length in characters (the RFC 7636 maximum).
pub const VERIFIER_LEN: usize = 128;

/// Random bytes behind a verifier; base64url of 96 bytes is exactly 128 characters.
const VERIFIER_BYTES: usize = VERIFIER_LEN / 4 * 3;

/// Random bytes behind the `state` token.
const STATE_BYTES: usize = 16;

/// The secret half of a PKCE pair. Only ever sent in the token-exchange body.
#[derive(Clone, PartialEq, Eq)]
pub struct CodeVerifier(String);

impl CodeVerifier {
    /// Generates a fresh verifier from the URL-safe base64 alphabet.
    pub fn generate() -> Self {
        let mut bytes = [0u8; VERIFIER_BYTES];
        OsRng.fill_bytes(&mut bytes);
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The S256 challenge sent in the authorization redirect.
    pub fn challenge(&self) -> String {
        code_challenge(&self.0)
    }
}

impl fmt::Debug for CodeVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CodeVerifier(<redacted>)")
    }
}

/// `base64url_nopad(SHA256(verifier))`.
pub fn code_challenge(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

/// Generates a hex-encoded anti-forgery `state` token.
pub fn generate_state() -> String {
    let mut bytes = [0u8; STATE_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Builds the authorization-endpoint URL the user agent is redirected to.
pub fn authorize_url(config: &OAuthConfig, state: &str, challenge: &str) -> String {
    let scope = config.scopes.join(" ");
    let params = [
        ("response_type", "code"),
        ("client_id", config.client_id.as_str()),
        ("redirect_uri", config.redirect_uri.as_str()),
        ("scope", scope.as_str()),
        ("state", state),
        ("code_challenge", challenge),
        ("code_challenge_method", "S256"),
    ];

    let query = params
        .iter()
        .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");

    let separator = if config.auth_url.contains('?') { '&' } else { '?' };
    format!("{}{separator}{query}", config.auth_url)
}
