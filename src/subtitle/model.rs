//! Speech models usable for subtitle generation and the providers hosting them.

use serde::{Deserialize, Serialize};

/// Hosted provider of a Whisper-compatible transcription endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubtitleProvider {
    OpenAI,
    Groq,
}

impl SubtitleProvider {
    pub fn name(&self) -> &'static str {
        match self {
            SubtitleProvider::OpenAI => "OpenAI",
            SubtitleProvider::Groq => "Groq",
        }
    }

    /// Environment variable holding this provider's API key.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            SubtitleProvider::OpenAI => "OPENAI_API_KEY",
            SubtitleProvider::Groq => "GROQ_API_KEY",
        }
    }

    pub fn endpoint(&self) -> &'static str {
        match self {
            SubtitleProvider::OpenAI => "https://api.openai.com/v1/audio/transcriptions",
            SubtitleProvider::Groq => "https://api.groq.com/openai/v1/audio/transcriptions",
        }
    }
}

/// A supported speech model. All of them return timed segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubtitleModel {
    /// OpenAI Whisper
    Whisper1,
    /// Groq Whisper large v3 (best accuracy)
    WhisperLargeV3,
    /// Groq Whisper large v3 turbo (faster)
    WhisperLargeV3Turbo,
}

impl SubtitleModel {
    pub fn provider(&self) -> SubtitleProvider {
        match self {
            SubtitleModel::Whisper1 => SubtitleProvider::OpenAI,
            SubtitleModel::WhisperLargeV3 | SubtitleModel::WhisperLargeV3Turbo => {
                SubtitleProvider::Groq
            }
        }
    }

    /// Model id as written in the config file and sent to the API.
    pub fn id(&self) -> &'static str {
        match self {
            SubtitleModel::Whisper1 => "whisper-1",
            SubtitleModel::WhisperLargeV3 => "whisper-large-v3",
            SubtitleModel::WhisperLargeV3Turbo => "whisper-large-v3-turbo",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SubtitleModel::Whisper1 => "Whisper (OpenAI)",
            SubtitleModel::WhisperLargeV3 => "Whisper large v3 (Groq, best accuracy)",
            SubtitleModel::WhisperLargeV3Turbo => "Whisper large v3 turbo (Groq, faster)",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::all().iter().copied().find(|model| model.id() == id)
    }

    pub fn all() -> &'static [Self] {
        &[
            SubtitleModel::Whisper1,
            SubtitleModel::WhisperLargeV3,
            SubtitleModel::WhisperLargeV3Turbo,
        ]
    }

    pub fn available_ids() -> Vec<&'static str> {
        Self::all().iter().map(|m| m.id()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip() {
        for model in SubtitleModel::all() {
            assert_eq!(SubtitleModel::from_id(model.id()), Some(*model));
        }
        assert_eq!(SubtitleModel::from_id("whisper"), None);
    }

    #[test]
    fn models_map_to_providers() {
        assert_eq!(SubtitleModel::Whisper1.provider(), SubtitleProvider::OpenAI);
        assert_eq!(
            SubtitleModel::WhisperLargeV3Turbo.provider().api_key_env(),
            "GROQ_API_KEY"
        );
    }
}
