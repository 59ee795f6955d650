//! Configuration management for the scrollway daemon.
//!
//! Configuration is loaded from TOML files in the following locations (in order):
//! 1. `$XDG_CONFIG_HOME/scrollway/config.toml` (platform standard)
//! 2. `~/.config/scrollway/config.toml`
//! 3. `./config.toml` (current directory, for development)

use anyhow::{Context, Result};
use directories::ProjectDirs;
use scrollway_core_layout::{Easing, LayoutSettings, Rect};
use scrollway_ipc::Mark;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::animation::AnimationSettings;

/// Main configuration structure for scrollway.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Screen area the columns are laid out in.
    pub screen: ScreenConfig,
    /// Layout configuration.
    pub layout: LayoutConfig,
    /// Animation configuration.
    pub animation: AnimationConfig,
    /// Behavior configuration.
    pub behavior: BehaviorConfig,
    /// Key bindings.
    pub bindings: BindingsConfig,
}

/// The usable screen rectangle, excluding bars.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        let screen = LayoutSettings::default().screen;
        Self {
            x: screen.x,
            y: screen.y,
            width: screen.width,
            height: screen.height,
        }
    }
}

/// Layout-related configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Gap around every tile in pixels.
    #[serde(default = "default_margin")]
    pub margin: i32,

    /// Pixels added or removed by one resize step.
    #[serde(default = "default_width_step")]
    pub width_step: i32,

    /// Minimum column width in pixels.
    #[serde(default = "default_min_column_width")]
    pub min_column_width: i32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            margin: default_margin(),
            width_step: default_width_step(),
            min_column_width: default_min_column_width(),
        }
    }
}

/// Animation-related configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Length of one transition in milliseconds. 0 disables animation.
    #[serde(default = "default_duration_ms")]
    pub duration_ms: u64,

    /// Frames per second.
    #[serde(default = "default_fps")]
    pub fps: u32,

    /// Easing curve name, e.g. `out_quad` or `out_back`.
    #[serde(default)]
    pub easing: Easing,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            duration_ms: default_duration_ms(),
            fps: default_fps(),
            easing: Easing::default(),
        }
    }
}

/// Behavior-related configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Key bindings, registered with the window manager at start-up.
///
/// Each key chord marks the focused window; the daemon reacts to the mark.
/// Example:
///
/// ```toml
/// [bindings]
/// "Mod4+h" = "_left"
/// "Mod4+Shift+c" = "_fullwidth"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BindingsConfig {
    /// Map of key chord to mark.
    #[serde(flatten)]
    pub bindings: BTreeMap<String, Mark>,
}

impl Default for BindingsConfig {
    fn default() -> Self {
        let bindings = [
            ("Mod4+k", Mark::Up),
            ("Mod4+j", Mark::Down),
            ("Mod4+h", Mark::Left),
            ("Mod4+l", Mark::Right),
            ("Mod4+equal", Mark::IncWidth),
            ("Mod4+minus", Mark::DecWidth),
            ("Mod4+Ctrl+h", Mark::MoveLeft),
            ("Mod4+Ctrl+l", Mark::MoveRight),
            ("Mod4+Shift+h", Mark::SwapLeft),
            ("Mod4+Shift+l", Mark::SwapRight),
            ("Mod4+Shift+j", Mark::MoveDown),
            ("Mod4+Shift+k", Mark::MoveUp),
            ("Mod4+c", Mark::Center),
            ("Mod4+Shift+c", Mark::FullWidth),
            ("Mod4+Next", Mark::NextWorkspace),
            ("Mod4+Prior", Mark::PrevWorkspace),
            ("Mod4+Shift+Next", Mark::MoveNextWorkspace),
            ("Mod4+Shift+Prior", Mark::MovePrevWorkspace),
        ]
        .into_iter()
        .map(|(key, mark)| (key.to_string(), mark))
        .collect();

        Self { bindings }
    }
}

fn default_margin() -> i32 {
    5
}

fn default_width_step() -> i32 {
    100
}

fn default_min_column_width() -> i32 {
    150
}

fn default_duration_ms() -> u64 {
    300
}

fn default_fps() -> u32 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const MAX_FPS: u32 = 240;
const MAX_DURATION_MS: u64 = 5000;

/// A configuration value that was out of range and has been replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub field: &'static str,
    pub message: String,
}

impl ConfigWarning {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl Config {
    /// Load configuration from standard locations.
    ///
    /// Tries the following locations in order:
    /// 1. `$XDG_CONFIG_HOME/scrollway/config.toml`
    /// 2. `~/.config/scrollway/config.toml`
    /// 3. `./config.toml`
    ///
    /// Returns default config if no file is found.
    pub fn load() -> Result<Self> {
        let paths = config_paths();

        for path in &paths {
            if path.exists() {
                tracing::info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific path.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Clamp out-of-range values, reporting each correction.
    pub fn validate(&mut self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        let defaults = ScreenConfig::default();

        if self.screen.width <= 0 || self.screen.height <= 0 {
            warnings.push(ConfigWarning::new(
                "screen",
                format!(
                    "{}x{} is not a usable size, using {}x{}",
                    self.screen.width, self.screen.height, defaults.width, defaults.height
                ),
            ));
            self.screen.width = defaults.width;
            self.screen.height = defaults.height;
        }

        let min_width = self.layout.min_column_width.clamp(1, self.screen.width);
        if min_width != self.layout.min_column_width {
            warnings.push(ConfigWarning::new(
                "layout.min_column_width",
                format!(
                    "{} is outside 1..={}, using {}",
                    self.layout.min_column_width, self.screen.width, min_width
                ),
            ));
            self.layout.min_column_width = min_width;
        }

        // Tiles must keep a positive size after the inset on both sides.
        let max_margin = (self.layout.min_column_width - 1) / 2;
        let margin = self.layout.margin.clamp(0, max_margin.max(0));
        if margin != self.layout.margin {
            warnings.push(ConfigWarning::new(
                "layout.margin",
                format!("{} is outside 0..={}, using {}", self.layout.margin, max_margin, margin),
            ));
            self.layout.margin = margin;
        }

        if self.layout.width_step <= 0 {
            warnings.push(ConfigWarning::new(
                "layout.width_step",
                format!("{} must be positive, using {}", self.layout.width_step, default_width_step()),
            ));
            self.layout.width_step = default_width_step();
        }

        let fps = self.animation.fps.clamp(1, MAX_FPS);
        if fps != self.animation.fps {
            warnings.push(ConfigWarning::new(
                "animation.fps",
                format!("{} is outside 1..={}, using {}", self.animation.fps, MAX_FPS, fps),
            ));
            self.animation.fps = fps;
        }

        if self.animation.duration_ms > MAX_DURATION_MS {
            warnings.push(ConfigWarning::new(
                "animation.duration_ms",
                format!(
                    "{} exceeds {}, using {}",
                    self.animation.duration_ms, MAX_DURATION_MS, MAX_DURATION_MS
                ),
            ));
            self.animation.duration_ms = MAX_DURATION_MS;
        }

        let level = self.behavior.log_level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            warnings.push(ConfigWarning::new(
                "behavior.log_level",
                format!("'{}' is not a log level, using info", self.behavior.log_level),
            ));
            self.behavior.log_level = default_log_level();
        }

        warnings
    }

    /// Geometry for the layout engine.
    pub fn layout_settings(&self) -> LayoutSettings {
        LayoutSettings {
            screen: Rect::new(
                self.screen.x,
                self.screen.y,
                self.screen.width,
                self.screen.height,
            ),
            margin: self.layout.margin,
            width_step: self.layout.width_step,
            min_column_width: self.layout.min_column_width,
        }
    }

    /// Timing for the animation engine.
    pub fn animation_settings(&self) -> AnimationSettings {
        AnimationSettings {
            duration: Duration::from_millis(self.animation.duration_ms),
            fps: self.animation.fps,
            easing: self.animation.easing,
        }
    }
}

/// Get all possible config file paths in priority order.
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    // 1. Platform standard: $XDG_CONFIG_HOME/scrollway/config.toml
    if let Some(proj_dirs) = ProjectDirs::from("org", "scrollway", "scrollway") {
        paths.push(proj_dirs.config_dir().join("config.toml"));
    }

    // 2. ~/.config/scrollway/config.toml
    if let Some(home) = dirs_home() {
        let path = home.join(".config").join("scrollway").join("config.toml");
        if !paths.contains(&path) {
            paths.push(path);
        }
    }

    // 3. Current directory: ./config.toml
    paths.push(PathBuf::from("config.toml"));

    paths
}

/// Get the user's home directory.
fn dirs_home() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf())
}
