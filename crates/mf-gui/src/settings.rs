//! Persisted player settings.
//!
//! Settings live in a flat JSON object. A missing or malformed file is
//! replaced by the defaults and rewritten; keys this build does not know
//! about are kept and written back untouched.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{GuiError, GuiResult};

/// Step used when adjusting a volume from the keyboard.
pub const VOLUME_STEP: f32 = 0.05;

/// Every known setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    /// Overall volume.
    MasterVolume,
    /// Music channel volume.
    MusicVolume,
    /// Effects channel volume.
    SfxVolume,
    /// Map overlay visible when a level starts.
    ShowMapOnStart,
    /// Spoken narration.
    EnableVoiceNarration,
    /// Falling glyph particles.
    EnableDigitalRain,
    /// Holographic radar instead of the corner minimap.
    UseDiegeticUi,
}

impl SettingKey {
    /// JSON key.
    pub fn name(self) -> &'static str {
        match self {
            Self::MasterVolume => "master_volume",
            Self::MusicVolume => "music_volume",
            Self::SfxVolume => "sfx_volume",
            Self::ShowMapOnStart => "show_map_on_start",
            Self::EnableVoiceNarration => "enable_voice_narration",
            Self::EnableDigitalRain => "enable_digital_rain",
            Self::UseDiegeticUi => "use_diegetic_ui",
        }
    }

    /// Whether the setting is a 0..=1 slider rather than a toggle.
    pub fn is_volume(self) -> bool {
        matches!(self, Self::MasterVolume | Self::MusicVolume | Self::SfxVolume)
    }
}

/// A setting value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SettingValue {
    /// Slider value in `0.0..=1.0`.
    Volume(f32),
    /// Toggle.
    Flag(bool),
}

fn default_master() -> f32 {
    0.8
}
fn default_music() -> f32 {
    0.7
}
fn default_sfx() -> f32 {
    1.0
}
fn default_true() -> bool {
    true
}

/// The settings file contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Overall volume.
    #[serde(default = "default_master")]
    pub master_volume: f32,
    /// Music channel volume.
    #[serde(default = "default_music")]
    pub music_volume: f32,
    /// Effects channel volume.
    #[serde(default = "default_sfx")]
    pub sfx_volume: f32,
    /// Map overlay visible when a level starts.
    #[serde(default = "default_true")]
    pub show_map_on_start: bool,
    /// Spoken narration.
    #[serde(default = "default_true")]
    pub enable_voice_narration: bool,
    /// Falling glyph particles.
    #[serde(default = "default_true")]
    pub enable_digital_rain: bool,
    /// Holographic radar instead of the corner minimap.
    #[serde(default)]
    pub use_diegetic_ui: bool,
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: default_master(),
            music_volume: default_music(),
            sfx_volume: default_sfx(),
            show_map_on_start: true,
            enable_voice_narration: true,
            enable_digital_rain: true,
            use_diegetic_ui: false,
            extra: serde_json::Map::new(),
        }
    }
}

impl Settings {
    /// Read settings from `path`.
    ///
    /// Never fails: a missing or unreadable file yields the defaults, which
    /// are then written back. A failed rewrite is only logged.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("settings unavailable ({e}); using defaults");
                let settings = Self::default();
                if let Err(e) = settings.save(path) {
                    tracing::warn!("could not write default settings: {e}");
                }
                settings
            }
        }
    }

    /// Strictly read settings from `path`.
    pub fn load(path: &Path) -> GuiResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| GuiError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut settings: Self = serde_json::from_str(&text)?;
        settings.clamp_volumes();
        Ok(settings)
    }

    /// Write settings to `path` as pretty JSON.
    pub fn save(&self, path: &Path) -> GuiResult<()> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text).map_err(|source| GuiError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "settings saved");
        Ok(())
    }

    /// Restore every known key to its default. Unknown keys are kept.
    pub fn reset(&mut self) {
        let extra = std::mem::take(&mut self.extra);
        *self = Self {
            extra,
            ..Self::default()
        };
    }

    /// Read one setting.
    pub fn get(&self, key: SettingKey) -> SettingValue {
        match key {
            SettingKey::MasterVolume => SettingValue::Volume(self.master_volume),
            SettingKey::MusicVolume => SettingValue::Volume(self.music_volume),
            SettingKey::SfxVolume => SettingValue::Volume(self.sfx_volume),
            SettingKey::ShowMapOnStart => SettingValue::Flag(self.show_map_on_start),
            SettingKey::EnableVoiceNarration => SettingValue::Flag(self.enable_voice_narration),
            SettingKey::EnableDigitalRain => SettingValue::Flag(self.enable_digital_rain),
            SettingKey::UseDiegeticUi => SettingValue::Flag(self.use_diegetic_ui),
        }
    }

    /// Set a volume, clamped to `0.0..=1.0`. Ignored for toggles.
    pub fn set_volume(&mut self, key: SettingKey, value: f32) {
        let value = if value.is_finite() {
            value.clamp(0.0, 1.0)
        } else {
            0.0
        };
        match key {
            SettingKey::MasterVolume => self.master_volume = value,
            SettingKey::MusicVolume => self.music_volume = value,
            SettingKey::SfxVolume => self.sfx_volume = value,
            _ => {}
        }
    }

    /// Flip a toggle. Ignored for volumes.
    pub fn toggle(&mut self, key: SettingKey) {
        match key {
            SettingKey::ShowMapOnStart => self.show_map_on_start ^= true,
            SettingKey::EnableVoiceNarration => self.enable_voice_narration ^= true,
            SettingKey::EnableDigitalRain => self.enable_digital_rain ^= true,
            SettingKey::UseDiegeticUi => self.use_diegetic_ui ^= true,
            _ => {}
        }
    }

    /// Nudge a volume by `steps` increments of [`VOLUME_STEP`], or flip a
    /// toggle.
    pub fn adjust(&mut self, key: SettingKey, steps: i32) {
        match self.get(key) {
            SettingValue::Volume(v) => self.set_volume(key, v + VOLUME_STEP * steps as f32),
            SettingValue::Flag(_) => self.toggle(key),
        }
    }

    /// Keys this build does not know, as loaded.
    pub fn unknown_keys(&self) -> impl Iterator<Item = &str> {
        self.extra.keys().map(String::as_str)
    }

    fn clamp_volumes(&mut self) {
        for key in [
            SettingKey::MasterVolume,
            SettingKey::MusicVolume,
            SettingKey::SfxVolume,
        ] {
            if let SettingValue::Volume(v) = self.get(key) {
                self.set_volume(key, v);
            }
        }
    }
}

/// Default settings file location.
pub fn default_path() -> PathBuf {
    PathBuf::from("settings.json")
}
