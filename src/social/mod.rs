//! Social-media API access: fetching mentions of the bot and posting replies.

pub mod client;

use async_trait::async_trait;
use serde::Deserialize;

use crate::oauth::AccessToken;

pub use client::HttpSocialApi;

/// One inbound message addressed to the bot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Message {
    /// Absent only on the synthetic message that reports a failed fetch
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub author_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Message {
    /// A placeholder message carrying a fetch error, so that the dispatcher
    /// always has something to report.
    pub fn synthetic(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

/// Error posting a reply; the transfer it refers to still stands.
#[derive(Debug, thiserror::Error)]
pub enum ReplyError {
    #[error("reply request failed: {0}")]
    Network(String),
    #[error("reply rejected with HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

/// The subset of the social API the dispatcher needs.
#[async_trait]
pub trait SocialApi: Send + Sync {
    /// Recent messages addressed to the bot, in the order the API returns them.
    ///
    /// Never fails: a fetch error becomes a single synthetic message.
    async fn recent_mentions(&self, token: &AccessToken) -> Vec<Message>;

    /// Posts `text` as a reply to message `in_reply_to_id`.
    async fn post_reply(
        &self,
        token: &AccessToken,
        in_reply_to_id: &str,
        text: &str,
    ) -> Result<(), ReplyError>;
}
