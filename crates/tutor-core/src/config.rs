use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, TutorError};

/// Top-level configuration for the tutoring application.
///
/// Loaded from `~/.tutor/config.toml` by default. Each section corresponds
/// to one subsystem.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TutorConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub engagement: EngagementConfig,
    #[serde(default)]
    pub voice: VoiceConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

impl TutorConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: TutorConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| TutorError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Webcam engagement tracking.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngagementConfig {
    /// Whether engagement tracking runs at all.
    pub enabled: bool,
    /// Frame polling interval in milliseconds.
    pub poll_interval_ms: u64,
    /// Number of face-derived readings kept in the rolling history.
    pub history_capacity: usize,
}

impl Default for EngagementConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_interval_ms: 100,
            history_capacity: 100,
        }
    }
}

/// Voice capture settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// Listen attempts per capture before giving up.
    pub max_attempts: u32,
    /// Seconds to wait for speech to start on each attempt.
    pub attempt_timeout_secs: u64,
    /// Maximum length of a single phrase in seconds.
    pub phrase_time_limit_secs: u64,
    /// Ambient-noise calibration time before the first attempt.
    pub ambient_calibration_secs: u64,
    /// Transcripts must be longer than this (after trimming) to be accepted.
    pub min_transcript_chars: usize,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            attempt_timeout_secs: 5,
            phrase_time_limit_secs: 8,
            ambient_calibration_secs: 1,
            min_transcript_chars: 3,
        }
    }
}

/// Answer generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Instruction prepended to every prompt.
    pub system_prompt: String,
    /// Number of question/answer turns kept in conversation memory.
    pub max_history: usize,
    pub max_new_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub repetition_penalty: f32,
    pub do_sample: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            system_prompt: "You are a knowledgeable and friendly teaching assistant. \
                            Provide accurate, student-friendly explanations with examples \
                            in simple language."
                .to_string(),
            max_history: 3,
            max_new_tokens: 300,
            temperature: 0.7,
            top_p: 0.9,
            repetition_penalty: 1.1,
            do_sample: true,
        }
    }
}

/// Session controller settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Questions shorter than this after trimming are rejected.
    pub min_question_chars: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            min_question_chars: 2,
        }
    }
}
