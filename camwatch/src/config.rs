//! # Monitor configuration and position persistence

use crate::alert::Rgb;
use anyhow::{anyhow, Result};
use log::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top level monitor configuration.
///
/// Every field has a default, so a partial JSON file is enough to override single values.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MonitorConfig {
    /// Index of the camera to open.
    pub device_index: usize,
    /// Sleep between capture cycles.
    pub cadence_ms: u64,
    pub detection: DetectionSettings,
    pub alert: AlertSettings,
    pub display: DisplaySettings,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            device_index: 1,
            cadence_ms: 30,
            detection: Default::default(),
            alert: Default::default(),
            display: Default::default(),
        }
    }
}

impl MonitorConfig {
    /// Load configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let cfg: Self = serde_json::from_reader(BufReader::new(file))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check that all values are usable.
    pub fn validate(&self) -> Result<()> {
        let kernel = self.detection.blur_kernel;

        if kernel == 0 || kernel % 2 == 0 {
            return Err(anyhow!("blur_kernel must be odd, got {}", kernel));
        }

        if self.alert.preview_fps == 0 {
            return Err(anyhow!("preview_fps must be positive"));
        }

        let display = &self.display;

        for (name, value) in [
            ("screen_width", display.screen_width),
            ("screen_height", display.screen_height),
            ("border_width", display.border_width),
            ("preview_width", display.preview_width),
        ] {
            if value == 0 {
                return Err(anyhow!("{} must be positive", name));
            }
        }

        Ok(())
    }

    pub fn cadence(&self) -> Duration {
        Duration::from_millis(self.cadence_ms)
    }
}

/// Tuning of the frame differencing detector.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DetectionSettings {
    /// Motion score above which a frame pair counts as motion.
    pub threshold: u64,
    /// Per pixel intensity change above which a pixel counts as changed.
    pub binarize_delta: u8,
    /// Side of the square smoothing kernel. Must be odd.
    pub blur_kernel: usize,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            threshold: 300_000,
            binarize_delta: 25,
            blur_kernel: 21,
        }
    }
}

/// What happens inside the alert window.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AlertSettings {
    pub color: Rgb,
    pub flash_ms: u64,
    /// Show the live preview after the flash.
    pub preview: bool,
    pub preview_ms: u64,
    pub preview_fps: u32,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            color: Rgb::RED,
            flash_ms: 200,
            preview: true,
            preview_ms: 5000,
            preview_fps: 10,
        }
    }
}

impl AlertSettings {
    pub fn flash_duration(&self) -> Duration {
        Duration::from_millis(self.flash_ms)
    }

    pub fn preview_duration(&self) -> Duration {
        Duration::from_millis(self.preview_ms)
    }
}

/// Shape of the flash highlight.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FlashStyle {
    /// Four bars along the screen edges.
    Borders,
    /// One window covering the whole screen.
    FullScreen,
}

impl Default for FlashStyle {
    fn default() -> Self {
        Self::Borders
    }
}

/// Screen geometry used by rendering sinks.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DisplaySettings {
    pub screen_width: u32,
    pub screen_height: u32,
    pub border_width: u32,
    pub flash_style: FlashStyle,
    /// Width of the preview thumbnail. Height follows the camera aspect ratio.
    pub preview_width: u32,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            screen_width: 1920,
            screen_height: 1080,
            border_width: 40,
            flash_style: FlashStyle::Borders,
            preview_width: 320,
        }
    }
}

/// Screen coordinate of the preview window.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AlertPosition {
    pub x: i32,
    pub y: i32,
}

impl AlertPosition {
    /// Used when nothing has been stored yet.
    pub const FALLBACK: Self = Self { x: 50, y: 50 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Default for AlertPosition {
    fn default() -> Self {
        Self::FALLBACK
    }
}

/// JSON file holding the last confirmed [`AlertPosition`].
#[derive(Clone, Debug)]
pub struct PositionStore {
    path: PathBuf,
}

impl PositionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store inside the per-user configuration directory.
    pub fn user_default() -> Result<Self> {
        let mut path = dirs::config_dir().ok_or_else(|| anyhow!("no config directory"))?;
        path.push("camwatch");
        path.push("position.json");
        Ok(Self::new(path))
    }

    /// Read the stored position.
    ///
    /// Falls back to [`AlertPosition::FALLBACK`] when the file is absent or cannot be parsed.
    pub fn load(&self) -> AlertPosition {
        match self.try_load() {
            Ok(Some(pos)) => pos,
            Ok(None) => AlertPosition::FALLBACK,
            Err(e) => {
                warn!(
                    "Ignoring unreadable position file {}: {}",
                    self.path.display(),
                    e
                );
                AlertPosition::FALLBACK
            }
        }
    }

    fn try_load(&self) -> Result<Option<AlertPosition>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let file = File::open(&self.path)?;
        Ok(Some(serde_json::from_reader(BufReader::new(file))?))
    }

    /// Overwrite the stored position.
    pub fn save(&self, position: AlertPosition) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = File::create(&self.path)?;
        serde_json::to_writer_pretty(file, &position)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("camwatch-{}-{}", std::process::id(), name));
        path
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let cfg: MonitorConfig =
            serde_json::from_str(r#"{ "detection": { "threshold": 5 } }"#).unwrap();

        assert_eq!(cfg.detection.threshold, 5);
        assert_eq!(cfg.detection.binarize_delta, 25);
        assert_eq!(cfg.detection.blur_kernel, 21);
        assert_eq!(cfg.cadence(), Duration::from_millis(30));
        assert_eq!(cfg.alert.color, Rgb::RED);
    }

    #[test]
    fn flash_style_names() {
        let display: DisplaySettings =
            serde_json::from_str(r#"{ "flash_style": "full_screen" }"#).unwrap();
        assert_eq!(display.flash_style, FlashStyle::FullScreen);
    }

    #[test]
    fn validate_rejects_bad_values() {
        assert!(MonitorConfig::default().validate().is_ok());

        let mut cfg = MonitorConfig::default();
        cfg.detection.blur_kernel = 4;
        assert!(cfg.validate().is_err());

        let mut cfg = MonitorConfig::default();
        cfg.alert.preview_fps = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_display() {
        let zeroed: [fn(&mut DisplaySettings); 4] = [
            |d| d.screen_width = 0,
            |d| d.screen_height = 0,
            |d| d.border_width = 0,
            |d| d.preview_width = 0,
        ];

        for zero in zeroed {
            let mut cfg = MonitorConfig::default();
            zero(&mut cfg.display);
            assert!(cfg.validate().is_err(), "{:?}", cfg.display);
        }

        let path = temp_path("zero-preview.json");
        std::fs::write(&path, r#"{ "display": { "preview_width": 0 } }"#).unwrap();
        assert!(MonitorConfig::load(&path).is_err());
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn load_config_file() {
        let path = temp_path("config.json");
        std::fs::write(&path, r#"{ "device_index": 0, "cadence_ms": 10 }"#).unwrap();

        let cfg = MonitorConfig::load(&path).unwrap();
        assert_eq!(cfg.device_index, 0);
        assert_eq!(cfg.cadence_ms, 10);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn position_roundtrip() {
        let dir = temp_path("store");
        let store = PositionStore::new(dir.join("nested").join("position.json"));

        assert_eq!(store.load(), AlertPosition::FALLBACK);

        store.save(AlertPosition::new(640, -20)).unwrap();
        assert_eq!(store.load(), AlertPosition::new(640, -20));

        store.save(AlertPosition::new(1, 2)).unwrap();
        assert_eq!(store.load(), AlertPosition::new(1, 2));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn corrupt_position_falls_back() {
        let path = temp_path("corrupt.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert_eq!(PositionStore::new(&path).load(), AlertPosition::FALLBACK);

        std::fs::remove_file(&path).unwrap();
    }
}
