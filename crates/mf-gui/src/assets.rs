//! Image and sound catalog.
//!
//! Every asset is addressed by a short key. Files that are missing or fail
//! to decode are logged and left out; lookups for them return `None` and the
//! renderer and mixer fall back to placeholders and silence.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use macroquad::audio::{Sound, load_sound};
use macroquad::prelude::{FilterMode, Texture2D, load_texture};

/// Image keys and their file stems under `images/`.
pub const IMAGE_KEYS: &[(&str, &str)] = &[
    ("terminal", "terminal"),
    ("vignette", "vignette"),
    ("cables", "cables"),
    ("door_locked", "door_locked"),
    ("door_unlocked", "door_unlocked"),
    ("puzzle_terminal_1", "puzzle_terminal_1"),
    ("puzzle_terminal_2", "puzzle_terminal_2"),
    ("puzzle_terminal_3", "puzzle_terminal_3"),
    ("notice", "notice"),
    ("data_log", "data_log"),
    ("background", "banner"),
];

/// Sound keys and their file stems under `audios/`.
pub const SOUND_KEYS: &[(&str, &str)] = &[
    ("walk", "walk"),
    ("whisper", "whisper"),
    ("jumpscare", "jumpscare"),
    ("stalker_ambience", "stalker_ambience"),
    ("hum", "hum"),
    ("powerup", "powerup"),
    ("glitch", "glitch"),
    ("interact", "interact"),
    ("popup", "popup"),
    ("key_press", "key_press"),
    ("terminal_error", "terminal_error"),
    ("override_success", "override_success"),
    ("menu_music", "menu"),
    ("ambient_music", "ambience"),
    ("terminal_music", "terminal_music"),
    ("story_line_1", "intro"),
    ("story_line_8", "story_line_8"),
];

/// Audio containers tried for each sound, in order.
pub const SOUND_EXTENSIONS: &[&str] = &["ogg", "wav"];

/// Path of the image file for `stem`.
pub fn image_path(root: &Path, stem: &str) -> PathBuf {
    root.join("images").join(format!("{stem}.png"))
}

/// Candidate paths for the sound file `stem`, in lookup order.
pub fn sound_candidates(root: &Path, stem: &str) -> Vec<PathBuf> {
    SOUND_EXTENSIONS
        .iter()
        .map(|ext| root.join("audios").join(format!("{stem}.{ext}")))
        .collect()
}

/// Loaded textures and sounds.
#[derive(Default)]
pub struct AssetCatalog {
    images: HashMap<String, Texture2D>,
    sounds: HashMap<String, Sound>,
}

impl AssetCatalog {
    /// An empty catalog: every lookup misses.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load every known asset under `root`.
    pub async fn load(root: &Path) -> Self {
        let mut catalog = Self::default();

        for (key, stem) in IMAGE_KEYS {
            let path = image_path(root, stem);
            match load_texture(&path.to_string_lossy()).await {
                Ok(texture) => {
                    texture.set_filter(FilterMode::Linear);
                    catalog.images.insert((*key).to_string(), texture);
                }
                Err(e) => tracing::warn!(key, path = %path.display(), "image unavailable: {e}"),
            }
        }

        for (key, stem) in SOUND_KEYS {
            let mut loaded = None;
            for path in sound_candidates(root, stem) {
                if !path.exists() {
                    continue;
                }
                match load_sound(&path.to_string_lossy()).await {
                    Ok(sound) => {
                        loaded = Some(sound);
                        break;
                    }
                    Err(e) => tracing::warn!(key, path = %path.display(), "sound failed to decode: {e}"),
                }
            }
            match loaded {
                Some(sound) => {
                    catalog.sounds.insert((*key).to_string(), sound);
                }
                None => tracing::warn!(key, "sound unavailable; it will stay silent"),
            }
        }

        tracing::info!(
            images = catalog.images.len(),
            sounds = catalog.sounds.len(),
            "assets loaded"
        );
        catalog
    }

    /// The texture for `key`.
    pub fn image(&self, key: &str) -> Option<&Texture2D> {
        self.images.get(key)
    }

    /// The sound for `key`.
    pub fn sound(&self, key: &str) -> Option<&Sound> {
        self.sounds.get(key)
    }

    /// Hand the sounds to an audio backend, keeping the textures.
    pub fn take_sounds(&mut self) -> HashMap<String, Sound> {
        std::mem::take(&mut self.sounds)
    }
}
