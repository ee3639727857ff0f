//! Module settings: keys, defaults, ranges and the provider seam.
//!
//! The controller never caches settings; it asks its [`SettingsProvider`]
//! every time a value is needed, so a host that changes a setting mid-session
//! is picked up on the next operation.
//!
//! ## Keys
//!
//! | Key                      | Type   | Default   | Range       |
//! |--------------------------|--------|-----------|-------------|
//! | `animation-duration`     | ms     | `3000`    | `0..=10000` |
//! | `show-notifications`     | bool   | `true`    |             |
//! | `cinematic-bars-height`  | %      | `10`      | `0..=50`    |
//! | `cinematic-bars-color`   | colour | `#000000` | `#rgb`/`#rrggbb` |
//! | `cinematic-bars-opacity` | float  | `1.0`     | `0..=1`     |
//! | `hide-ui-for-players`    | bool   | `false`   |             |
//! | `debug-mode`             | bool   | `false`   |             |

use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::CinematicError;

pub const DEFAULT_ANIMATION_DURATION_MS: u32 = 3000;
pub const MAX_ANIMATION_DURATION_MS: u32 = 10_000;
pub const DEFAULT_BARS_HEIGHT_PCT: u8 = 10;
pub const MAX_BARS_HEIGHT_PCT: u8 = 50;
pub const DEFAULT_BARS_COLOR: &str = "#000000";
pub const DEFAULT_BARS_OPACITY: f64 = 1.0;

/// Environment prefix for [`CinematicSettings::load`].
pub const ENV_PREFIX: &str = "CINEMATIC";

// ---------------------------------------------------------------------------
// Keys & values
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    AnimationDuration,
    ShowNotifications,
    BarsHeight,
    BarsColor,
    BarsOpacity,
    HideUiForPlayers,
    DebugMode,
}

impl SettingKey {
    pub const ALL: [SettingKey; 7] = [
        SettingKey::AnimationDuration,
        SettingKey::ShowNotifications,
        SettingKey::BarsHeight,
        SettingKey::BarsColor,
        SettingKey::BarsOpacity,
        SettingKey::HideUiForPlayers,
        SettingKey::DebugMode,
    ];

    /// Host-facing key name.
    pub fn as_str(self) -> &'static str {
        match self {
            SettingKey::AnimationDuration => "animation-duration",
            SettingKey::ShowNotifications => "show-notifications",
            SettingKey::BarsHeight => "cinematic-bars-height",
            SettingKey::BarsColor => "cinematic-bars-color",
            SettingKey::BarsOpacity => "cinematic-bars-opacity",
            SettingKey::HideUiForPlayers => "hide-ui-for-players",
            SettingKey::DebugMode => "debug-mode",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }
}

impl std::fmt::Display for SettingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SettingValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl SettingValue {
    fn as_i64(&self) -> Option<i64> {
        match self {
            SettingValue::Int(v) => Some(*v),
            SettingValue::Float(v) if v.is_finite() => Some(v.round() as i64),
            _ => None,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            SettingValue::Float(v) if v.is_finite() => Some(*v),
            SettingValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    fn as_bool(&self) -> Option<bool> {
        match self {
            SettingValue::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Provider seam
// ---------------------------------------------------------------------------

/// Source of setting values, consulted on demand.
///
/// Implementors only provide [`get`](SettingsProvider::get); the typed
/// accessors apply defaults and clamp to the documented ranges, so a provider
/// returning garbage can never push an out-of-range value into the core.
pub trait SettingsProvider {
    fn get(&self, key: SettingKey) -> Option<SettingValue>;

    fn animation_duration_ms(&self) -> u32 {
        self.get(SettingKey::AnimationDuration)
            .and_then(|v| v.as_i64())
            .map(|v| v.clamp(0, MAX_ANIMATION_DURATION_MS as i64) as u32)
            .unwrap_or(DEFAULT_ANIMATION_DURATION_MS)
    }

    fn show_notifications(&self) -> bool {
        self.get(SettingKey::ShowNotifications)
            .and_then(|v| v.as_bool())
            .unwrap_or(true)
    }

    fn bars_height_pct(&self) -> u8 {
        self.get(SettingKey::BarsHeight)
            .and_then(|v| v.as_i64())
            .map(|v| v.clamp(0, MAX_BARS_HEIGHT_PCT as i64) as u8)
            .unwrap_or(DEFAULT_BARS_HEIGHT_PCT)
    }

    fn bars_color(&self) -> String {
        match self.get(SettingKey::BarsColor) {
            Some(SettingValue::Text(c)) if is_hex_color(&c) => c,
            _ => DEFAULT_BARS_COLOR.to_string(),
        }
    }

    fn bars_opacity(&self) -> f64 {
        self.get(SettingKey::BarsOpacity)
            .and_then(|v| v.as_f64())
            .map(|v| v.clamp(0.0, 1.0))
            .unwrap_or(DEFAULT_BARS_OPACITY)
    }

    fn hide_ui_for_players(&self) -> bool {
        self.get(SettingKey::HideUiForPlayers)
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    fn debug_mode(&self) -> bool {
        self.get(SettingKey::DebugMode)
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }
}

/// `#rgb` or `#rrggbb`.
pub fn is_hex_color(s: &str) -> bool {
    match s.strip_prefix('#') {
        Some(hex) => (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

// ---------------------------------------------------------------------------
// Concrete store
// ---------------------------------------------------------------------------

/// Plain settings store, loadable from TOML and `CINEMATIC_*` env vars.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CinematicSettings {
    pub animation_duration: u32,
    pub show_notifications: bool,
    pub cinematic_bars_height: u8,
    pub cinematic_bars_color: String,
    pub cinematic_bars_opacity: f64,
    pub hide_ui_for_players: bool,
    pub debug_mode: bool,
}

impl Default for CinematicSettings {
    fn default() -> Self {
        Self {
            animation_duration: DEFAULT_ANIMATION_DURATION_MS,
            show_notifications: true,
            cinematic_bars_height: DEFAULT_BARS_HEIGHT_PCT,
            cinematic_bars_color: DEFAULT_BARS_COLOR.to_string(),
            cinematic_bars_opacity: DEFAULT_BARS_OPACITY,
            hide_ui_for_players: false,
            debug_mode: false,
        }
    }
}

impl CinematicSettings {
    /// Layer defaults, an optional TOML file and `CINEMATIC_*` env vars.
    ///
    /// Out-of-range values are clamped rather than rejected.
    pub fn load(file: Option<&Path>) -> Result<Self, CinematicError> {
        let mut builder = config::Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let raw = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .map_err(|e| CinematicError::Settings(e.to_string()))?;

        let settings: CinematicSettings = raw
            .try_deserialize()
            .map_err(|e| CinematicError::Settings(e.to_string()))?;
        Ok(settings.sanitized())
    }

    /// Clamp every value into its documented range.
    pub fn sanitized(mut self) -> Self {
        self.animation_duration = self.animation_duration.min(MAX_ANIMATION_DURATION_MS);
        self.cinematic_bars_height = self.cinematic_bars_height.min(MAX_BARS_HEIGHT_PCT);
        self.cinematic_bars_opacity = if self.cinematic_bars_opacity.is_finite() {
            self.cinematic_bars_opacity.clamp(0.0, 1.0)
        } else {
            DEFAULT_BARS_OPACITY
        };
        if !is_hex_color(&self.cinematic_bars_color) {
            warn!(
                "Invalid cinematic-bars-color '{}', using {}",
                self.cinematic_bars_color, DEFAULT_BARS_COLOR
            );
            self.cinematic_bars_color = DEFAULT_BARS_COLOR.to_string();
        }
        self
    }
}

impl SettingsProvider for CinematicSettings {
    fn get(&self, key: SettingKey) -> Option<SettingValue> {
        Some(match key {
            SettingKey::AnimationDuration => SettingValue::Int(self.animation_duration as i64),
            SettingKey::ShowNotifications => SettingValue::Bool(self.show_notifications),
            SettingKey::BarsHeight => SettingValue::Int(self.cinematic_bars_height as i64),
            SettingKey::BarsColor => SettingValue::Text(self.cinematic_bars_color.clone()),
            SettingKey::BarsOpacity => SettingValue::Float(self.cinematic_bars_opacity),
            SettingKey::HideUiForPlayers => SettingValue::Bool(self.hide_ui_for_players),
            SettingKey::DebugMode => SettingValue::Bool(self.debug_mode),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapProvider(HashMap<SettingKey, SettingValue>);

    impl SettingsProvider for MapProvider {
        fn get(&self, key: SettingKey) -> Option<SettingValue> {
            self.0.get(&key).cloned()
        }
    }

    #[test]
    fn empty_provider_yields_defaults() {
        let p = MapProvider(HashMap::new());
        assert_eq!(p.animation_duration_ms(), 3000);
        assert!(p.show_notifications());
        assert_eq!(p.bars_height_pct(), 10);
        assert_eq!(p.bars_color(), "#000000");
        assert_eq!(p.bars_opacity(), 1.0);
        assert!(!p.hide_ui_for_players());
        assert!(!p.debug_mode());
    }

    #[test]
    fn typed_accessors_clamp() {
        let p = MapProvider(HashMap::from([
            (SettingKey::AnimationDuration, SettingValue::Int(50_000)),
            (SettingKey::BarsHeight, SettingValue::Int(-3)),
            (SettingKey::BarsOpacity, SettingValue::Float(2.5)),
            (SettingKey::BarsColor, SettingValue::Text("red".into())),
        ]));
        assert_eq!(p.animation_duration_ms(), 10_000);
        assert_eq!(p.bars_height_pct(), 0);
        assert_eq!(p.bars_opacity(), 1.0);
        assert_eq!(p.bars_color(), "#000000");
    }

    #[test]
    fn key_names_round_trip() {
        for key in SettingKey::ALL {
            assert_eq!(SettingKey::parse(key.as_str()), Some(key));
        }
        assert_eq!(SettingKey::parse("nope"), None);
    }

    #[test]
    fn hex_colors() {
        assert!(is_hex_color("#000"));
        assert!(is_hex_color("#a1B2c3"));
        assert!(!is_hex_color("000000"));
        assert!(!is_hex_color("#12345"));
        assert!(!is_hex_color("#gggggg"));
    }
}
