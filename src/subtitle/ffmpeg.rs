//! FFmpeg discovery and audio extraction.
//!
//! Checks standard installation locations before falling back to a PATH search,
//! so ffmpeg is found even when the process runs with a minimal PATH.

use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};

/// Extensions uploaded as-is; anything else is run through ffmpeg first.
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "mpga", "m4a", "wav", "ogg", "flac"];

/// Locates the ffmpeg binary on the system.
///
/// Checks in this order:
/// 1. Platform install locations (Homebrew, `/usr/bin`, `C:\ffmpeg\bin`, ...)
/// 2. PATH search via `which` or `where`
///
/// # Errors
/// - If ffmpeg is not installed anywhere we look
pub fn find_ffmpeg() -> Result<PathBuf> {
    let candidates = if cfg!(target_os = "macos") {
        vec![
            PathBuf::from("/opt/homebrew/bin/ffmpeg"),
            PathBuf::from("/usr/local/bin/ffmpeg"),
            PathBuf::from("/usr/bin/ffmpeg"),
        ]
    } else if cfg!(target_os = "linux") {
        vec![
            PathBuf::from("/usr/bin/ffmpeg"),
            PathBuf::from("/usr/local/bin/ffmpeg"),
            PathBuf::from("/snap/bin/ffmpeg"),
        ]
    } else if cfg!(target_os = "windows") {
        vec![
            PathBuf::from("C:\\ffmpeg\\bin\\ffmpeg.exe"),
            PathBuf::from("C:\\Program Files\\ffmpeg\\bin\\ffmpeg.exe"),
        ]
    } else {
        vec![]
    };

    if let Some(path) = candidates.into_iter().find(|path| path.exists()) {
        tracing::debug!("Found ffmpeg at: {}", path.display());
        return Ok(path);
    }

    let ffmpeg_path = find_in_path("ffmpeg")?;
    tracing::debug!("Found ffmpeg in PATH at: {}", ffmpeg_path.display());
    Ok(ffmpeg_path)
}

fn find_in_path(binary_name: &str) -> Result<PathBuf> {
    let search_cmd = if cfg!(target_os = "windows") {
        "where"
    } else {
        "which"
    };

    let output = std::process::Command::new(search_cmd)
        .arg(binary_name)
        .output()
        .map_err(|e| anyhow!("Failed to search PATH for {binary_name}: {e}"))?;

    if output.status.success() {
        let path_str = String::from_utf8_lossy(&output.stdout);
        // `where` may list several matches; take the first
        if let Some(first) = path_str.lines().next().map(str::trim) {
            if !first.is_empty() {
                return Ok(PathBuf::from(first));
            }
        }
    }

    Err(anyhow!(
        "ffmpeg not found. It is needed to extract audio from video files:\n\
         macOS: brew install ffmpeg\n\
         Linux: apt install ffmpeg (Debian/Ubuntu) or dnf install ffmpeg (Fedora)\n\
         Windows: Download from https://ffmpeg.org/download.html"
    ))
}

/// Whether `path` can be uploaded without conversion.
pub fn is_audio(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| AUDIO_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Extracts the audio track of `input` as mono 16 kHz mp3 into `output`.
///
/// # Errors
/// - If ffmpeg cannot be found or started
/// - If ffmpeg exits unsuccessfully (its stderr tail is included)
pub async fn extract_audio(input: &Path, output: &Path) -> Result<()> {
    let ffmpeg = find_ffmpeg()?;
    tracing::info!(
        "Extracting audio from {} to {}",
        input.display(),
        output.display()
    );

    let result = tokio::process::Command::new(&ffmpeg)
        .args(["-hide_banner", "-loglevel", "error", "-y", "-i"])
        .arg(input)
        .args(["-vn", "-ac", "1", "-ar", "16000", "-codec:a", "libmp3lame", "-b:a", "64k"])
        .arg(output)
        .output()
        .await
        .map_err(|e| anyhow!("Failed to run {}: {e}", ffmpeg.display()))?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        return Err(anyhow!(
            "ffmpeg failed to extract audio from {}: {}",
            input.display(),
            stderr.trim()
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_ffmpeg() {
        // Succeeds either way; only logs whether ffmpeg is installed
        match find_ffmpeg() {
            Ok(path) => println!("Found ffmpeg at: {}", path.display()),
            Err(e) => println!("ffmpeg not found (expected on CI): {e}"),
        }
    }

    #[test]
    fn audio_extensions_skip_conversion() {
        assert!(is_audio(Path::new("talk.mp3")));
        assert!(is_audio(Path::new("talk.WAV")));
        assert!(!is_audio(Path::new("output.mp4")));
        assert!(!is_audio(Path::new("no_extension")));
    }
}
