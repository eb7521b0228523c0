use std::path::Path;
use std::time::Duration;

use jumpflood_core::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// Tunables for a pipeline, loadable from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Full brush width in surface pixels.
    pub brush_size_px: f32,
    /// Time an automatic run spends on the propagation levels.
    pub playback_time_ms: u64,
    /// Largest texture side the device accepts.
    pub max_texture_size: u32,
    /// Color shown where no seed was found.
    pub background: [f32; 3],
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            brush_size_px: 10.0,
            playback_time_ms: 1000,
            max_texture_size: 8192,
            background: [0.0, 0.0, 0.0],
        }
    }
}

impl PipelineSettings {
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn playback_time(&self) -> Duration {
        Duration::from_millis(self.playback_time_ms)
    }

    pub fn background_color(&self) -> Vec3 {
        Vec3::from(self.background)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let s = PipelineSettings::from_json(r#"{ "brush_size_px": 4.0 }"#).unwrap();
        assert_eq!(s.brush_size_px, 4.0);
        assert_eq!(s.playback_time(), Duration::from_secs(1));
        assert_eq!(s.max_texture_size, 8192);
    }

    #[test]
    fn test_json_roundtrip() {
        let s = PipelineSettings {
            background: [0.1, 0.2, 0.3],
            ..Default::default()
        };
        let back = PipelineSettings::from_json(&s.to_json().unwrap()).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            PipelineSettings::from_json("{ nope"),
            Err(SettingsError::Parse(_))
        ));
        assert!(matches!(
            PipelineSettings::load("/nonexistent/settings.json"),
            Err(SettingsError::Io(_))
        ));
    }
}
