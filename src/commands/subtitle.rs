//! Subtitle generation for a local audio or video file.

use std::path::PathBuf;

use crate::config::{get_api_key, SolatranConfig};
use crate::subtitle::{self, SubtitleModel, Transcriber};

/// Transcribes `input` into an `.srt` file.
///
/// `model` and `language` override the `[subtitle]` config section.
///
/// # Errors
/// - If the model is unknown or its provider's API key is not set
/// - If transcription or writing the subtitle file fails
pub async fn handle_subtitle(
    config: &SolatranConfig,
    input: PathBuf,
    output: Option<PathBuf>,
    model: Option<String>,
    language: Option<String>,
) -> anyhow::Result<()> {
    let mut settings = config.subtitle.clone();
    if let Some(model) = model {
        settings.model = model;
    }
    if language.is_some() {
        settings.language = language;
    }

    let provider = SubtitleModel::from_id(&settings.model)
        .map(|model| model.provider())
        .ok_or_else(|| {
            anyhow::anyhow!(
                "Unknown subtitle model '{}'. Available: {}",
                settings.model,
                SubtitleModel::available_ids().join(", ")
            )
        })?;
    let api_key = get_api_key(provider.api_key_env()).ok_or_else(|| {
        anyhow::anyhow!(
            "No {} API key found. Set {} to use model '{}'.",
            provider.name(),
            provider.api_key_env(),
            settings.model
        )
    })?;

    let output = output.unwrap_or_else(|| subtitle::default_output_path(&input));
    let transcriber = Transcriber::new(&settings, api_key)?;

    let segments = subtitle::generate(&transcriber, &input, &output).await?;
    println!("Wrote {segments} subtitle(s) to {}", output.display());
    Ok(())
}
