//! CLI argument definitions for the tutor binary.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

use tutor_core::TutorConfig;

/// Tutor - an interactive teaching assistant that answers typed or spoken
/// questions and adapts to the student's engagement.
#[derive(Parser, Debug)]
#[command(name = "tutor", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Run without webcam engagement tracking.
    #[arg(long = "no-engagement")]
    pub no_engagement: bool,

    /// Print each answer as a JSON object instead of plain text.
    #[arg(long = "json")]
    pub json: bool,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > TUTOR_CONFIG env var > ~/.tutor/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("TUTOR_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Apply command-line overrides on top of the loaded configuration.
    pub fn apply_overrides(&self, config: &mut TutorConfig) {
        if let Some(ref level) = self.log_level {
            config.general.log_level = level.clone();
        }
        if self.no_engagement {
            config.engagement.enabled = false;
        }
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".tutor").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".tutor").join("config.toml");
    }
    PathBuf::from("config.toml")
}
