//! Authorization-code exchange against the provider's token endpoint.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::fmt;

use super::pkce::CodeVerifier;
use crate::config::OAuthConfig;

/// Bearer token returned by the token endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Error exchanging an authorization code.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("failed to reach the token endpoint: {0}")]
    Network(String),
    #[error("token endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("token response is malformed: {0}")]
    MalformedResponse(String),
}

/// `Basic base64(client_id:client_secret)`.
pub fn basic_credentials(client_id: &str, client_secret: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{client_id}:{client_secret}")))
}

/// Extracts `access_token` from a token response body.
///
/// # Errors
/// - If the body is not JSON, or `access_token` is absent, empty or not a string
pub fn parse_token_response(body: &str) -> Result<AccessToken, TokenError> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| TokenError::MalformedResponse(format!("not JSON: {e}")))?;

    match value.get("access_token").and_then(|token| token.as_str()) {
        Some(token) if !token.is_empty() => Ok(AccessToken::new(token)),
        Some(_) => Err(TokenError::MalformedResponse(
            "access_token is empty".to_string(),
        )),
        None => Err(TokenError::MalformedResponse(
            "access_token is missing".to_string(),
        )),
    }
}

/// Client for the `authorization_code` grant.
#[derive(Clone)]
pub struct TokenClient {
    client: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl TokenClient {
    pub fn new(client: reqwest::Client, config: &OAuthConfig) -> Self {
        Self {
            client,
            token_url: config.token_url.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
        }
    }

    /// Exchanges `code` for an access token. Never retried.
    ///
    /// # Errors
    /// - If the endpoint is unreachable or times out
    /// - If the endpoint answers with a non-2xx status
    /// - If the body carries no usable `access_token`
    pub async fn exchange(
        &self,
        code: &str,
        verifier: &CodeVerifier,
    ) -> Result<AccessToken, TokenError> {
        let form = [
            ("code", code),
            ("grant_type", "authorization_code"),
            ("client_id", self.client_id.as_str()),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("code_verifier", verifier.as_str()),
        ];

        tracing::debug!(
            "Token exchange:\n  URL: {}\n  Method: POST\n  Headers:\n    Authorization: Basic <redacted>\n    Content-Type: application/x-www-form-urlencoded",
            self.token_url
        );

        let response = self
            .client
            .post(&self.token_url)
            .header(
                reqwest::header::AUTHORIZATION,
                basic_credentials(&self.client_id, &self.client_secret),
            )
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                let detail = if e.is_connect() {
                    "Failed to connect to the token endpoint. Check your internet connection."
                        .to_string()
                } else if e.is_timeout() {
                    "Request to the token endpoint timed out.".to_string()
                } else {
                    e.to_string()
                };
                TokenError::Network(detail)
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TokenError::Network(format!("failed to read token response: {e}")))?;

        if !status.is_success() {
            return Err(TokenError::Status {
                status: status.as_u16(),
                body,
            });
        }

        parse_token_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_credentials_encode_id_and_secret() {
        assert_eq!(basic_credentials("id", "secret"), "Basic aWQ6c2VjcmV0");
    }

    #[test]
    fn parse_extracts_access_token() {
        let token =
            parse_token_response(r#"{"token_type":"bearer","access_token":"abc","expires_in":7200}"#)
                .unwrap();
        assert_eq!(token.as_str(), "abc");
    }

    #[test]
    fn parse_rejects_missing_or_empty_token() {
        assert!(matches!(
            parse_token_response(r#"{"token_type":"bearer"}"#),
            Err(TokenError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_token_response(r#"{"access_token":""}"#),
            Err(TokenError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_token_response(r#"{"access_token":42}"#),
            Err(TokenError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_token_response("<html>"),
            Err(TokenError::MalformedResponse(_))
        ));
    }

    #[test]
    fn debug_redacts_token() {
        assert_eq!(
            format!("{:?}", AccessToken::new("secret")),
            "AccessToken(<redacted>)"
        );
    }
}
