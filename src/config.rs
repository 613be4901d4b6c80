use crate::overlay::{IndicatorType, Thickness};
use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_BUSY_CONTENT: &str = "Please wait...";
pub const UI_SCALE_MIN: f32 = 0.75;
pub const UI_SCALE_MAX: f32 = 2.0;

/// Display properties of a busy overlay, as stored on disk.
///
/// `progress_value` is a percentage (0–100). It is kept exactly as given;
/// only rendering clamps it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub is_busy_at_startup: bool,
    pub busy_content: String,
    pub busy_content_margin: Thickness,
    pub indicator_type: IndicatorType,
    pub show_cancel_button: bool,
    pub progress_value: f64,
    pub progress_color: egui::Color32,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            is_busy_at_startup: false,
            busy_content: DEFAULT_BUSY_CONTENT.to_string(),
            busy_content_margin: Thickness::uniform(10.0),
            indicator_type: IndicatorType::Twist,
            show_cancel_button: false,
            progress_value: 0.0,
            progress_color: egui::Color32::WHITE,
        }
    }
}

/// Demo application settings.
/// Stored in the platform config directory (`$XDG_CONFIG_HOME/busymask/` or `%APPDATA%\busymask\`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Initial properties of the demo's busy overlay.
    pub overlay: OverlayConfig,
    /// How long the simulated job runs, in milliseconds.
    pub job_duration_ms: u64,
    /// Number of progress reports the simulated job emits.
    pub job_steps: u32,
    /// UI zoom factor (0.75–2.0).
    pub ui_scale: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            overlay: OverlayConfig::default(),
            job_duration_ms: 3000,
            job_steps: 50,
            ui_scale: 1.0,
        }
    }
}

impl Config {
    /// Load config from the platform config directory, or return defaults.
    pub fn load() -> Self {
        let path = config_path();
        if !path.exists() {
            log::info!(
                "No config file at {}, using defaults. Creating default config.",
                path.display()
            );
            let config = Self::default();
            config.save();
            return config;
        }
        match Self::load_from(&path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("{:#}, using defaults", e);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config.sanitized())
    }

    /// Pull hand-edited values back into the ranges the UI can use.
    pub fn sanitized(mut self) -> Self {
        self.ui_scale = if self.ui_scale.is_finite() {
            self.ui_scale.clamp(UI_SCALE_MIN, UI_SCALE_MAX)
        } else {
            1.0
        };
        self.overlay.busy_content_margin = self.overlay.busy_content_margin.clamped();
        self
    }

    /// Save current config. Failures are logged, not returned.
    pub fn save(&self) {
        if let Err(e) = self.save_to(&config_path()) {
            log::warn!("{:#}", e);
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }
}

fn config_path() -> PathBuf {
    let dir = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("busymask");
    if !dir.exists() {
        std::fs::create_dir_all(&dir).ok();
    }
    dir.join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_defaults() {
        let c = OverlayConfig::default();
        assert_eq!(c.busy_content, "Please wait...");
        assert_eq!(c.busy_content_margin, Thickness::uniform(10.0));
        assert_eq!(c.indicator_type, IndicatorType::Twist);
        assert_eq!(c.progress_color, egui::Color32::WHITE);
        assert!(!c.show_cancel_button);
        assert!(!c.is_busy_at_startup);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let json = r#"{ "job_steps": 5, "overlay": { "indicator_type": "ProgressBar" } }"#;
        let c: Config = serde_json::from_str(json).unwrap();
        assert_eq!(c.job_steps, 5);
        assert_eq!(c.job_duration_ms, 3000);
        assert_eq!(c.overlay.indicator_type, IndicatorType::ProgressBar);
        assert_eq!(c.overlay.busy_content, DEFAULT_BUSY_CONTENT);
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut config = Config::default();
        config.overlay.busy_content = "Syncing".into();
        config.overlay.progress_color = egui::Color32::from_rgb(10, 200, 30);
        config.overlay.busy_content_margin = Thickness {
            top: 1.0,
            right: 2.0,
            bottom: 3.0,
            left: 4.0,
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_from_clamps_out_of_range_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let json = r#"{
            "ui_scale": 0.0,
            "overlay": {
                "busy_content_margin": { "top": 500.0, "right": -4.0, "bottom": 10.0, "left": 10.0 }
            }
        }"#;
        std::fs::write(&path, json).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.ui_scale, UI_SCALE_MIN);
        assert_eq!(
            loaded.overlay.busy_content_margin,
            Thickness {
                top: Thickness::MAX_SIDE,
                right: 0.0,
                bottom: 10.0,
                left: 10.0,
            }
        );

        std::fs::write(&path, r#"{ "ui_scale": 9.5 }"#).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().ui_scale, UI_SCALE_MAX);
    }

    #[test]
    fn test_load_from_garbage_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse"));
    }
}
