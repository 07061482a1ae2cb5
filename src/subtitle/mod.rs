//! Subtitle generation: audio or video in, SubRip file out.
//!
//! Video files are reduced to a mono 16 kHz mp3 with ffmpeg, uploaded to a
//! hosted Whisper model, and the returned segments are written as `.srt` cues.

pub mod api;
pub mod ffmpeg;
pub mod model;
pub mod srt;

use anyhow::anyhow;
use std::path::{Path, PathBuf};

pub use api::Transcriber;
pub use model::SubtitleModel;

/// Temporary audio extracted from a video; removed on drop.
struct ExtractedAudio(PathBuf);

impl Drop for ExtractedAudio {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.0) {
            tracing::debug!("Could not remove {}: {e}", self.0.display());
        }
    }
}

fn extracted_audio_path() -> PathBuf {
    std::env::temp_dir().join(format!("solatran-{}.mp3", std::process::id()))
}

/// Default output path: the input with an `.srt` extension.
pub fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension("srt")
}

/// Transcribes `input` and writes subtitles to `output`.
///
/// Returns the number of segments written.
///
/// # Errors
/// - If `input` does not exist
/// - If audio extraction or transcription fails
/// - If the subtitle file cannot be written
pub async fn generate(
    transcriber: &Transcriber,
    input: &Path,
    output: &Path,
) -> anyhow::Result<usize> {
    if !input.is_file() {
        return Err(anyhow!("Input file not found: {}", input.display()));
    }

    let _extracted;
    let audio_path = if ffmpeg::is_audio(input) {
        input.to_path_buf()
    } else {
        let path = extracted_audio_path();
        // Armed before ffmpeg runs so a partial file is removed on failure too
        _extracted = ExtractedAudio(path.clone());
        ffmpeg::extract_audio(input, &path).await?;
        path
    };

    tracing::info!(
        "Transcribing {} with {}",
        audio_path.display(),
        transcriber.model().description()
    );
    let transcription = transcriber.transcribe(&audio_path).await?;

    if let Some(language) = &transcription.language {
        tracing::debug!("Detected language: {language}");
    }
    if transcription.segments.is_empty() {
        tracing::warn!("No speech segments returned for {}", input.display());
    }

    srt::write_srt(output, &transcription.segments)?;
    tracing::info!(
        "Wrote {} segment(s) to {}",
        transcription.segments.len(),
        output.display()
    );
    Ok(transcription.segments.len())
}
