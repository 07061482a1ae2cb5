//! Command dispatcher: turns recent mentions into ledger transfers.
//!
//! Messages are handled strictly one after another and independently; a bad
//! message never aborts the batch, it just yields its own [`TransferResult`].

pub mod command;
pub mod processed;

use std::fmt;
use std::sync::{Arc, Mutex};

use crate::ledger::{Address, Keypair, LedgerClient};
use crate::oauth::AccessToken;
use crate::social::{Message, ReplyError, SocialApi};

pub use command::{Command, ParseError};
pub use processed::ProcessedMessages;

/// Outcome for one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferResult {
    /// Transfer submitted and reply posted.
    Sent(String),
    /// Transfer submitted, but the confirmation reply was not accepted.
    ReplyFailed {
        signature: String,
        reply_error: String,
    },
    /// Message was skipped without touching the ledger.
    Rejected(String),
    Error(String),
}

impl fmt::Display for TransferResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sent(signature) => write!(f, "sent: {signature}"),
            Self::ReplyFailed {
                signature,
                reply_error,
            } => write!(f, "sent: {signature} (reply failed: {reply_error})"),
            Self::Rejected(reason) => write!(f, "rejected: {reason}"),
            Self::Error(detail) => write!(f, "error: {detail}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    pub text: String,
    pub result: TransferResult,
}

/// Everything one dispatcher run produced, rendered as the callback body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchReport {
    Disabled,
    Completed(Vec<ReportEntry>),
}

impl fmt::Display for DispatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => writeln!(
                f,
                "Logged in. Transfers are disabled: no payer keypair is configured."
            ),
            Self::Completed(entries) if entries.is_empty() => {
                writeln!(f, "Logged in. No messages to process.")
            }
            Self::Completed(entries) => {
                writeln!(f, "Logged in. Processed {} message(s):", entries.len())?;
                for entry in entries {
                    writeln!(f, "- {:?}: {}", entry.text, entry.result)?;
                }
                Ok(())
            }
        }
    }
}

/// Fetches mentions, executes transfer commands and replies with signatures.
pub struct Dispatcher {
    social: Arc<dyn SocialApi>,
    ledger: Arc<dyn LedgerClient>,
    payer: Option<Keypair>,
    processed: Mutex<ProcessedMessages>,
    prefix: String,
}

impl Dispatcher {
    /// `payer: None` disables transfers; every run then reports [`DispatchReport::Disabled`].
    pub fn new(
        social: Arc<dyn SocialApi>,
        ledger: Arc<dyn LedgerClient>,
        payer: Option<Keypair>,
        processed: ProcessedMessages,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            social,
            ledger,
            payer,
            processed: Mutex::new(processed),
            prefix: prefix.into(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.payer.is_some()
    }

    /// Processes the recent mentions visible to `token`.
    pub async fn run(&self, token: &AccessToken) -> DispatchReport {
        let Some(payer) = &self.payer else {
            tracing::warn!("Dispatch requested but no payer keypair is loaded");
            return DispatchReport::Disabled;
        };

        let messages = self.social.recent_mentions(token).await;
        tracing::info!("Dispatching {} message(s)", messages.len());

        let mut entries = Vec::with_capacity(messages.len());
        for message in messages {
            let result = self.process(token, payer, &message).await;
            tracing::info!("Message {:?}: {}", message.id, result);
            entries.push(ReportEntry {
                text: message.text,
                result,
            });
        }
        DispatchReport::Completed(entries)
    }

    async fn process(
        &self,
        token: &AccessToken,
        payer: &Keypair,
        message: &Message,
    ) -> TransferResult {
        let command = match Command::parse(&message.text, &self.prefix) {
            Ok(command) => command,
            Err(e @ (ParseError::NotACommand | ParseError::InvalidFormat)) => {
                return TransferResult::Rejected(e.to_string())
            }
            Err(e @ ParseError::InvalidAmount(_)) => return TransferResult::Error(e.to_string()),
        };

        let Ok(recipient) = command.recipient.parse::<Address>() else {
            return TransferResult::Error("invalid address".to_string());
        };

        let Some(message_id) = message.id.as_deref() else {
            return TransferResult::Error("message has no id".to_string());
        };

        match self.with_processed(|processed| processed.claim(message_id)) {
            Ok(true) => {}
            Ok(false) => return TransferResult::Rejected("already processed".to_string()),
            Err(e) => {
                tracing::error!("Failed to record message {}: {}", message_id, e);
                return TransferResult::Error(format!("failed to record message: {e}"));
            }
        }

        let signature = match self.ledger.transfer(payer, &recipient, command.amount).await {
            Ok(signature) => signature.to_string(),
            Err(e) => {
                match e.signature() {
                    None => self.release_claim(message_id),
                    // The claim stays: paying again could send the amount twice
                    Some(signature) => self.record(message_id, &signature.to_string()),
                }
                return TransferResult::Error(e.to_string());
            }
        };

        self.record(message_id, &signature);

        let reply = match message.author_id.as_deref().filter(|a| !a.is_empty()) {
            Some(author) => format!("@{author} Transaction sent: {signature}"),
            None => format!("Transaction sent: {signature}"),
        };
        match self.social.post_reply(token, message_id, &reply).await {
            Ok(()) => TransferResult::Sent(signature),
            Err(e) => TransferResult::ReplyFailed {
                signature,
                reply_error: match e {
                    ReplyError::Status { body, .. } => body,
                    ReplyError::Network(detail) => detail,
                },
            },
        }
    }

    fn release_claim(&self, message_id: &str) {
        if let Err(e) = self.with_processed(|processed| processed.release(message_id)) {
            tracing::error!("Failed to release message {}: {}", message_id, e);
        }
    }

    fn record(&self, message_id: &str, signature: &str) {
        if let Err(e) =
            self.with_processed(|processed| processed.record_signature(message_id, signature))
        {
            tracing::error!("Failed to store signature for message {}: {}", message_id, e);
        }
    }

    fn with_processed<T>(
        &self,
        f: impl FnOnce(&ProcessedMessages) -> anyhow::Result<T>,
    ) -> anyhow::Result<T> {
        let processed = self
            .processed
            .lock()
            .map_err(|_| anyhow::anyhow!("processed-message store lock poisoned"))?;
        f(&processed)
    }
}
