use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::EngineResult;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub frame: FrameConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
    /// Gamestates requested at boot, in order.
    #[serde(default)]
    pub gamestates: Vec<GamestateConfig>,
}

impl EngineConfig {
    pub fn from_toml_str(text: &str) -> EngineResult<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> EngineResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
}

fn default_title() -> String {
    "Stagehand".to_string()
}
fn default_width() -> u32 {
    1280
}
fn default_height() -> u32 {
    720
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            width: default_width(),
            height: default_height(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameConfig {
    /// Logic tick rate. One tick is one fixed-rate timer event.
    #[serde(default = "default_tick_hz")]
    pub tick_hz: u32,
    #[serde(default = "default_max_ticks")]
    pub max_ticks_per_frame: u32,
    #[serde(default = "default_max_dt_ms")]
    pub max_dt_ms: u32,
    #[serde(default)]
    pub log_fps: bool,
    #[serde(default = "default_fps_period_ms")]
    pub fps_log_period_ms: u32,
}

fn default_tick_hz() -> u32 {
    60
}
fn default_max_ticks() -> u32 {
    8
}
fn default_max_dt_ms() -> u32 {
    250
}
fn default_fps_period_ms() -> u32 {
    1000
}

impl FrameConfig {
    pub fn tick_dt_sec(&self) -> f32 {
        1.0 / (self.tick_hz.max(1) as f32)
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            tick_hz: default_tick_hz(),
            max_ticks_per_frame: default_max_ticks(),
            max_dt_ms: default_max_dt_ms(),
            log_fps: false,
            fps_log_period_ms: default_fps_period_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// "poll" or "wait"
    #[serde(default = "default_control_flow")]
    pub control_flow: String,
    /// Freeze all running gamestates while the window is unfocused.
    #[serde(default = "default_true")]
    pub freeze_on_focus_loss: bool,
    #[serde(default = "default_console_capacity")]
    pub console_capacity: usize,
}

fn default_control_flow() -> String {
    "poll".to_string()
}
fn default_true() -> bool {
    true
}
fn default_console_capacity() -> usize {
    256
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            control_flow: default_control_flow(),
            freeze_on_focus_loss: default_true(),
            console_capacity: default_console_capacity(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GamestateConfig {
    pub name: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Also request a start right after the load.
    #[serde(default = "default_true")]
    pub start: bool,
    #[serde(default = "default_true")]
    pub show_loading: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_document_uses_defaults() {
        let cfg = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.frame.tick_hz, 60);
        assert_eq!(cfg.window.title, "Stagehand");
        assert!(cfg.runtime.freeze_on_focus_loss);
        assert!(cfg.gamestates.is_empty());
    }

    #[test]
    fn gamestate_entries_parse_with_defaults() {
        let cfg = EngineConfig::from_toml_str(
            r#"
            [frame]
            tick_hz = 30

            [[gamestates]]
            name = "intro"

            [[gamestates]]
            name = "menu"
            start = false
            show_loading = false
            "#,
        )
        .unwrap();

        assert_eq!(cfg.frame.tick_hz, 30);
        assert_eq!(cfg.gamestates.len(), 2);
        assert!(cfg.gamestates[0].start && cfg.gamestates[0].enabled);
        assert!(!cfg.gamestates[1].start);
        assert!(!cfg.gamestates[1].show_loading);
    }

    #[test]
    fn load_reads_file_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[window]\ntitle = \"From disk\"").unwrap();

        let cfg = EngineConfig::load(file.path()).unwrap();
        assert_eq!(cfg.window.title, "From disk");
        assert_eq!(cfg.window.width, 1280);
    }

    #[test]
    fn malformed_document_is_a_config_error() {
        let err = EngineConfig::from_toml_str("[frame\ntick_hz = 1").unwrap_err();
        assert!(matches!(err, crate::EngineError::Config(_)));
    }
}
