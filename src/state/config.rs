//! Game and lobby configuration.
//!
//! [`GameConfig`] is the per-session record stored with every game. It is
//! versioned as a whole; older records are upgraded through serde defaults
//! rather than by probing for individual fields.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::code::DEFAULT_CODE_LEN;
use super::generator::{
    MAX_HEIGHT, MAX_TILE_TYPES, MAX_WIDTH, MIN_HEIGHT, MIN_TILE_TYPES, MIN_WIDTH,
};

/// Current [`GameConfig`] layout version.
pub const CONFIG_VERSION: u32 = 1;

pub const DEFAULT_WIDTH: usize = 40;
pub const DEFAULT_HEIGHT: usize = 20;
pub const DEFAULT_TILE_TYPES: u8 = 4;

pub const MIN_MOVES_PER_TURN: u32 = 1;
pub const MAX_MOVES_PER_TURN: u32 = 5;

pub const MIN_TIMER_SECONDS: u32 = 15;
pub const MAX_TIMER_SECONDS: u32 = 180;
pub const DEFAULT_TIMER_SECONDS: u32 = 60;

/// Theme used when a requested theme is unknown.
pub const DEFAULT_THEME: &str = "Squares";

/// How long a session stays reachable after creation.
pub const DEFAULT_SESSION_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

/// Upper bound for a configured session lifetime; it may only be shortened.
pub const MAX_SESSION_LIFETIME_SECS: u64 = DEFAULT_SESSION_LIFETIME.as_secs();

/// Timer scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerMode {
    #[default]
    PerMove,
    PerTurn,
}

impl TimerMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PerMove => "per_move",
            Self::PerTurn => "per_turn",
        }
    }
}

/// Turn timer settings. Stored and reported only; clients enforce them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerConfig {
    pub enabled: bool,
    pub seconds: u32,
    pub mode: TimerMode,
    /// Pick a group automatically when the timer runs out
    pub auto_select: bool,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            seconds: DEFAULT_TIMER_SECONDS,
            mode: TimerMode::PerMove,
            auto_select: false,
        }
    }
}

impl TimerConfig {
    fn clamped(self) -> Self {
        if !self.enabled {
            return Self {
                mode: self.mode,
                ..Self::default()
            };
        }
        Self {
            enabled: true,
            seconds: self.seconds.clamp(MIN_TIMER_SECONDS, MAX_TIMER_SECONDS),
            mode: self.mode,
            auto_select: self.auto_select,
        }
    }
}

/// Per-session game configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub version: u32,
    pub grid_width: usize,
    pub grid_height: usize,
    pub num_tile_types: u8,
    pub moves_per_turn: u32,
    pub tile_set: String,
    pub tile_type_multiplier_enabled: bool,
    pub timer: TimerConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            grid_width: DEFAULT_WIDTH,
            grid_height: DEFAULT_HEIGHT,
            num_tile_types: DEFAULT_TILE_TYPES,
            moves_per_turn: MIN_MOVES_PER_TURN,
            tile_set: DEFAULT_THEME.to_string(),
            tile_type_multiplier_enabled: false,
            timer: TimerConfig::default(),
        }
    }
}

impl GameConfig {
    /// Clamp every field into its valid range and resolve the theme.
    pub fn clamped(self, themes: &ThemeCatalog) -> Self {
        Self {
            version: CONFIG_VERSION,
            grid_width: self.grid_width.clamp(MIN_WIDTH, MAX_WIDTH),
            grid_height: self.grid_height.clamp(MIN_HEIGHT, MAX_HEIGHT),
            num_tile_types: self.num_tile_types.clamp(MIN_TILE_TYPES, MAX_TILE_TYPES),
            moves_per_turn: self
                .moves_per_turn
                .clamp(MIN_MOVES_PER_TURN, MAX_MOVES_PER_TURN),
            tile_set: themes.resolve(&self.tile_set).to_string(),
            tile_type_multiplier_enabled: self.tile_type_multiplier_enabled,
            timer: self.timer.clamped(),
        }
    }
}

/// Known board themes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeCatalog {
    themes: Vec<String>,
    default: String,
}

impl Default for ThemeCatalog {
    fn default() -> Self {
        Self::new(vec![DEFAULT_THEME.to_string()], DEFAULT_THEME)
    }
}

impl ThemeCatalog {
    /// Build a catalog. The default theme is always listed.
    pub fn new(themes: Vec<String>, default: &str) -> Self {
        let mut themes = themes;
        if !themes.iter().any(|t| t == default) {
            themes.push(default.to_string());
        }
        themes.sort();
        themes.dedup();
        Self {
            themes,
            default: default.to_string(),
        }
    }

    pub fn contains(&self, theme: &str) -> bool {
        self.themes.iter().any(|t| t == theme)
    }

    /// The requested theme if known, else the default.
    pub fn resolve<'a>(&'a self, requested: &'a str) -> &'a str {
        if self.contains(requested) {
            requested
        } else {
            &self.default
        }
    }

    pub fn default_theme(&self) -> &str {
        &self.default
    }

    /// Theme ids, sorted.
    pub fn list(&self) -> &[String] {
        &self.themes
    }
}

/// Errors that can occur when loading lobby settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("settings validation error: {0}")]
    Validation(String),
}

/// Lobby-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LobbySettings {
    pub code_len: usize,
    /// Session lifetime in seconds. Games expire 24 hours after creation;
    /// shorter values are for tests and local deployments.
    pub session_lifetime_secs: u64,
    pub themes: Vec<String>,
    pub default_theme: String,
}

impl Default for LobbySettings {
    fn default() -> Self {
        Self {
            code_len: DEFAULT_CODE_LEN,
            session_lifetime_secs: DEFAULT_SESSION_LIFETIME.as_secs(),
            themes: vec![DEFAULT_THEME.to_string()],
            default_theme: DEFAULT_THEME.to_string(),
        }
    }
}

impl LobbySettings {
    /// Parse settings from JSON text; missing fields take defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let settings: LobbySettings = serde_json::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate settings values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(4..=12).contains(&self.code_len) {
            return Err(ConfigError::Validation(
                "code_len must be between 4 and 12".into(),
            ));
        }
        if self.session_lifetime_secs == 0 || self.session_lifetime_secs > MAX_SESSION_LIFETIME_SECS {
            return Err(ConfigError::Validation(format!(
                "session_lifetime_secs must be between 1 and {MAX_SESSION_LIFETIME_SECS}"
            )));
        }
        if !self.themes.contains(&self.default_theme) {
            return Err(ConfigError::Validation(format!(
                "default_theme '{}' is not in themes",
                self.default_theme
            )));
        }
        Ok(())
    }

    pub fn session_lifetime(&self) -> chrono::Duration {
        let secs = self.session_lifetime_secs.min(MAX_SESSION_LIFETIME_SECS);
        chrono::Duration::seconds(secs as i64)
    }

    pub fn theme_catalog(&self) -> ThemeCatalog {
        ThemeCatalog::new(self.themes.clone(), &self.default_theme)
    }
}
