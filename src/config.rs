//! Engine configuration
//!
//! All recognized options for a quizstack engine instance. The config is a
//! plain serde struct so hosts can load it from JSON alongside their own
//! settings; it is validated once when the engine is built.
//!
//! # Options
//!
//! - `extraction_path` - where in the stream the records live
//! - `chunk_pace_ms` - simulated/real pacing between chunks (0 = unpaced)
//! - `sensitivity` - drag-release threshold for dismissal
//! - `autoplay` / `autoplay_delay_ms` - timer-driven demotion of the top card
//! - `pause_on_hover` - hover pauses autoplay
//! - `random_rotation` - assign each card a random memoized rotation seed

use crate::error::{QuizStackError, Result};
use crate::parser::ExtractionPath;
use serde::{Deserialize, Serialize};

/// Default extraction path: every element of the top-level `quizzes` array
pub const DEFAULT_EXTRACTION_PATH: &str = "quizzes.*";

/// Default delay between stream chunks in milliseconds
pub const DEFAULT_CHUNK_PACE_MS: u64 = 10;

/// Default drag-release sensitivity threshold
pub const DEFAULT_SENSITIVITY: f32 = 200.0;

/// Default autoplay interval in milliseconds
pub const DEFAULT_AUTOPLAY_DELAY_MS: u64 = 3000;

/// Configuration for a quizstack engine instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Dotted path to the records within the stream (`*` matches any segment)
    #[serde(default = "default_extraction_path")]
    pub extraction_path: String,

    /// Milliseconds between chunk deliveries; 0 feeds as fast as possible
    #[serde(default = "default_chunk_pace_ms")]
    pub chunk_pace_ms: u64,

    /// Drag-release threshold: a release beyond this on either axis dismisses
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f32,

    /// Whether the autoplay timer is enabled
    #[serde(default)]
    pub autoplay: bool,

    /// Autoplay interval in milliseconds
    #[serde(default = "default_autoplay_delay_ms")]
    pub autoplay_delay_ms: u64,

    /// Whether hovering the stack pauses autoplay
    #[serde(default)]
    pub pause_on_hover: bool,

    /// Whether cards get a random memoized rotation seed
    #[serde(default)]
    pub random_rotation: bool,
}

fn default_extraction_path() -> String {
    DEFAULT_EXTRACTION_PATH.to_string()
}

fn default_chunk_pace_ms() -> u64 {
    DEFAULT_CHUNK_PACE_MS
}

fn default_sensitivity() -> f32 {
    DEFAULT_SENSITIVITY
}

fn default_autoplay_delay_ms() -> u64 {
    DEFAULT_AUTOPLAY_DELAY_MS
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            extraction_path: default_extraction_path(),
            chunk_pace_ms: DEFAULT_CHUNK_PACE_MS,
            sensitivity: DEFAULT_SENSITIVITY,
            autoplay: false,
            autoplay_delay_ms: DEFAULT_AUTOPLAY_DELAY_MS,
            pause_on_hover: false,
            random_rotation: false,
        }
    }
}

impl EngineConfig {
    /// Validate the configuration, returning the parsed extraction path
    ///
    /// Called once when the engine is built so a bad path or interval fails
    /// fast instead of surfacing mid-stream.
    pub fn validate(&self) -> Result<ExtractionPath> {
        if self.autoplay_delay_ms == 0 {
            return Err(QuizStackError::Config(
                "autoplay_delay_ms must be greater than zero".to_string(),
            ));
        }
        if self.sensitivity < 0.0 || !self.sensitivity.is_finite() {
            return Err(QuizStackError::Config(format!(
                "sensitivity must be a finite non-negative number, got {}",
                self.sensitivity
            )));
        }
        let path = ExtractionPath::parse(&self.extraction_path)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.extraction_path, "quizzes.*");
        assert_eq!(config.chunk_pace_ms, 10);
        assert!(!config.autoplay);
    }

    #[test]
    fn test_zero_autoplay_delay_rejected() {
        let config = EngineConfig {
            autoplay_delay_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_extraction_path_rejected() {
        let config = EngineConfig {
            extraction_path: "quizzes..".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_negative_sensitivity_rejected() {
        let config = EngineConfig {
            sensitivity: -1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let config = EngineConfig {
            autoplay: true,
            autoplay_delay_ms: 1500,
            random_rotation: true,
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: EngineConfig = serde_json::from_str(&json).unwrap();
        assert!(back.autoplay);
        assert_eq!(back.autoplay_delay_ms, 1500);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let back: EngineConfig = serde_json::from_str(r#"{"autoplay": true}"#).unwrap();
        assert!(back.autoplay);
        assert_eq!(back.chunk_pace_ms, DEFAULT_CHUNK_PACE_MS);
        assert_eq!(back.extraction_path, DEFAULT_EXTRACTION_PATH);
    }
}
