//! HTTP implementation of [`SocialApi`].

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;

use super::{Message, ReplyError, SocialApi};
use crate::config::ApiConfig;
use crate::oauth::AccessToken;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<Message>,
}

/// Social API client authenticated per call with the user's bearer token.
#[derive(Debug, Clone)]
pub struct HttpSocialApi {
    client: reqwest::Client,
    api_url: String,
    bot_handle: String,
    max_results: u8,
}

impl HttpSocialApi {
    /// Creates a client; `client` should carry the configured timeout.
    pub fn new(client: reqwest::Client, config: &ApiConfig) -> Self {
        Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            bot_handle: config.bot_handle.trim_start_matches('@').to_string(),
            max_results: config.max_results,
        }
    }

    async fn fetch_mentions(&self, token: &AccessToken) -> Result<Vec<Message>, String> {
        let url = format!("{}/search/recent", self.api_url);
        let query = format!("to:{}", self.bot_handle);
        let max_results = self.max_results.to_string();

        tracing::debug!(
            "Search API Call:\n  URL: {}\n  Method: GET\n  Headers:\n    Authorization: Bearer <redacted>\n  Query: {}",
            url,
            query
        );

        let response = self
            .client
            .get(&url)
            .bearer_auth(token.as_str())
            .query(&[
                ("query", query.as_str()),
                ("max_results", max_results.as_str()),
                ("fields", "created_at,author_id"),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    "search request timed out".to_string()
                } else {
                    e.to_string()
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(format!("HTTP {}: {}", status.as_u16(), body));
        }

        let search: SearchResponse = response
            .json()
            .await
            .map_err(|e| format!("failed to parse search response: {e}"))?;
        Ok(search.data)
    }
}

#[async_trait]
impl SocialApi for HttpSocialApi {
    async fn recent_mentions(&self, token: &AccessToken) -> Vec<Message> {
        match self.fetch_mentions(token).await {
            Ok(messages) => {
                tracing::info!("Fetched {} messages addressed to the bot", messages.len());
                messages
            }
            Err(e) => {
                tracing::error!("Error fetching messages: {e}");
                vec![Message::synthetic(format!("Error fetching messages: {e}"))]
            }
        }
    }

    async fn post_reply(
        &self,
        token: &AccessToken,
        in_reply_to_id: &str,
        text: &str,
    ) -> Result<(), ReplyError> {
        let url = format!("{}/messages", self.api_url);
        let body = json!({
            "text": text,
            "reply": { "in_reply_to_id": in_reply_to_id },
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(token.as_str())
            .json(&body)
            .send()
            .await
            .map_err(|e| ReplyError::Network(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::CREATED {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ReplyError::Status {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!("Replied to message {in_reply_to_id}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::{HeaderMap, StatusCode as HttpStatus};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use std::collections::HashMap;

    async fn search(
        headers: HeaderMap,
        Query(query): Query<HashMap<String, String>>,
    ) -> Result<Json<serde_json::Value>, HttpStatus> {
        if headers.get("authorization").and_then(|h| h.to_str().ok()) != Some("Bearer good") {
            return Err(HttpStatus::UNAUTHORIZED);
        }
        assert_eq!(query.get("query").map(String::as_str), Some("to:bot"));
        assert_eq!(query.get("max_results").map(String::as_str), Some("10"));
        assert_eq!(
            query.get("fields").map(String::as_str),
            Some("created_at,author_id")
        );
        Ok(Json(json!({
            "data": [
                { "id": "1", "text": "!send 5 abc", "author_id": "42", "created_at": "2026-10-19T00:00:00Z" },
                { "id": "2", "text": "hello" }
            ],
            "meta": { "result_count": 2 }
        })))
    }

    async fn reply(Json(body): Json<serde_json::Value>) -> HttpStatus {
        if body["reply"]["in_reply_to_id"] == "1" {
            HttpStatus::CREATED
        } else {
            HttpStatus::FORBIDDEN
        }
    }

    async fn start_api_server() -> ApiConfig {
        let app = Router::new()
            .route("/search/recent", get(search))
            .route("/messages", post(reply));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        ApiConfig {
            api_url: format!("http://{addr}/"),
            bot_handle: "@bot".to_string(),
            max_results: 10,
            command_prefix: "!send".to_string(),
        }
    }

    #[tokio::test]
    async fn fetches_mentions_with_bearer_token() {
        let api = HttpSocialApi::new(reqwest::Client::new(), &start_api_server().await);
        let messages = api.recent_mentions(&AccessToken::new("good")).await;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].id.as_deref(), Some("1"));
        assert_eq!(messages[0].author_id.as_deref(), Some("42"));
        assert_eq!(messages[1].text, "hello");
    }

    #[tokio::test]
    async fn fetch_failure_becomes_single_synthetic_message() {
        let api = HttpSocialApi::new(reqwest::Client::new(), &start_api_server().await);
        let messages = api.recent_mentions(&AccessToken::new("bad")).await;
        assert_eq!(messages.len(), 1);
        assert!(messages[0].id.is_none());
        assert!(messages[0].text.starts_with("Error fetching messages: HTTP 401"));
    }

    #[tokio::test]
    async fn reply_requires_201() {
        let api = HttpSocialApi::new(reqwest::Client::new(), &start_api_server().await);
        let token = AccessToken::new("good");
        assert!(api.post_reply(&token, "1", "@42 sent").await.is_ok());
        assert!(matches!(
            api.post_reply(&token, "2", "@42 sent").await,
            Err(ReplyError::Status { status: 403, .. })
        ));
    }
}
