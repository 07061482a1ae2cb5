//! Whisper-compatible transcription client returning timed segments.
//!
//! OpenAI and Groq expose the same multipart endpoint; the only differences are
//! the base URL, the key and the wording of error messages.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use super::model::SubtitleModel;
use crate::config::SubtitleConfig;

/// One timed piece of speech.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// `verbose_json` response body.
#[derive(Debug, Clone, Deserialize)]
pub struct Transcription {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub segments: Vec<Segment>,
}

/// Sends audio files to the configured model.
#[derive(Debug, Clone)]
pub struct Transcriber {
    client: reqwest::Client,
    endpoint: String,
    model: SubtitleModel,
    api_key: String,
    language: Option<String>,
}

impl Transcriber {
    /// Builds a transcriber for `config.model` with its own request timeout.
    ///
    /// # Errors
    /// - If the model id is unknown
    /// - If the HTTP client cannot be built
    pub fn new(config: &SubtitleConfig, api_key: String) -> anyhow::Result<Self> {
        let model = SubtitleModel::from_id(&config.model).ok_or_else(|| {
            anyhow::anyhow!(
                "Unknown subtitle model '{}'. Available: {}",
                config.model,
                SubtitleModel::available_ids().join(", ")
            )
        })?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: model.provider().endpoint().to_string(),
            model,
            api_key,
            language: config.language.clone(),
        })
    }

    /// Points the transcriber at another OpenAI-compatible endpoint.
    #[cfg(test)]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn model(&self) -> SubtitleModel {
        self.model
    }

    /// Uploads `audio_path` and returns the timed transcription.
    ///
    /// # Errors
    /// - If the audio file cannot be read from disk
    /// - If the API request fails due to network issues (connection, timeout)
    /// - If the API returns an HTTP error (401 for invalid key, 429 for rate limit, etc.)
    /// - If the API response cannot be parsed
    pub async fn transcribe(&self, audio_path: &Path) -> anyhow::Result<Transcription> {
        let provider = self.model.provider().name();
        let audio_data = tokio::fs::read(audio_path)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to read audio file: {e}"))?;

        let file_name = audio_path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        let file_part = reqwest::multipart::Part::bytes(audio_data)
            .file_name(file_name)
            .mime_str(audio_mime_type(audio_path))
            .map_err(|e| anyhow::anyhow!("Failed to create file part for upload: {e}"))?;

        let mut form = reqwest::multipart::Form::new()
            .part("file", file_part)
            .text("model", self.model.id())
            .text("response_format", "verbose_json");

        let mut debug_params = vec![
            format!("model={}", self.model.id()),
            "response_format=verbose_json".to_string(),
        ];
        if let Some(language) = &self.language {
            form = form.text("language", language.clone());
            debug_params.push(format!("language={language}"));
        }

        tracing::debug!(
            "{} API Call:\n  URL: {}\n  Method: POST\n  Headers:\n    Authorization: Bearer <redacted>\n    Content-Type: multipart/form-data\n  Body parameters: {}",
            provider,
            self.endpoint,
            debug_params.join("\n    ")
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                let error_msg = if e.is_connect() {
                    format!("Failed to connect to {provider} API server. Check your internet connection.")
                } else if e.is_timeout() {
                    format!("Request to {provider} timed out. Long files can take a while; raise subtitle.timeout_secs.")
                } else {
                    format!("{provider} network error: {e}")
                };
                anyhow::anyhow!(error_msg)
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow::anyhow!(self.describe_status(status.as_u16(), &error_body)));
        }

        let transcription: Transcription = response
            .json()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to parse {provider} response: {e}"))?;

        tracing::debug!(
            "{} API Response:\n  Status: Success\n  Segments: {}\n  Transcription length: {} characters",
            provider,
            transcription.segments.len(),
            transcription.text.len()
        );

        Ok(transcription)
    }

    fn describe_status(&self, status: u16, body: &str) -> String {
        let provider = self.model.provider();
        let name = provider.name();
        match status {
            401 => format!(
                "{name} API key is invalid or expired. Check {}.",
                provider.api_key_env()
            ),
            403 => format!(
                "You don't have permission to use {name}'s API. Check your API key and account status."
            ),
            413 => format!("The audio file is too large for {name}. Split it or lower its bitrate."),
            429 => format!(
                "Too many requests to {name}. You've hit the API rate limit. Please wait and try again."
            ),
            500 | 502 | 503 | 504 => {
                format!("{name} API server is experiencing issues. Please try again later.")
            }
            _ => format!("{name} API error (status {status}): {body}"),
        }
    }
}

/// MIME type of an upload, from its extension.
fn audio_mime_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("wav") => "audio/wav",
        Some("flac") => "audio/flac",
        Some("ogg") => "audio/ogg",
        Some("m4a") => "audio/mp4",
        _ => "audio/mpeg",
    }
}
