//! Visual-effect state driven by the simulation and read by the renderer.
//!
//! Every effect stores an absolute expiry on the tick clock and is expired by
//! comparing against `now`; nothing is cancelled from outside.

use mf_core::{Cue, CueQueue, EntityId, Rect};
use rand::Rng;
use rand::rngs::StdRng;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Timed<T> {
    until: u64,
    value: T,
}

/// Screen glitch and static-burst state.
#[derive(Debug, Clone, Default)]
pub struct GlitchState {
    glitches: Vec<Timed<u32>>,
    bursts: Vec<Timed<u8>>,
    chromatic: (f32, f32),
    scanline_alpha: u8,
}

impl GlitchState {
    fn trigger(&mut self, now: u64, duration_ms: u64, intensity: u32) {
        self.glitches.push(Timed {
            until: now + duration_ms,
            value: intensity,
        });
    }

    fn burst(&mut self, now: u64, duration_ms: u64, alpha: u8) {
        self.bursts.push(Timed {
            until: now + duration_ms,
            value: alpha,
        });
    }

    /// Expire finished glitches and roll this tick's chromatic offset.
    pub fn update(&mut self, now: u64, rng: &mut StdRng) {
        self.glitches.retain(|g| g.until > now);
        self.bursts.retain(|b| b.until > now);

        match self.glitches.iter().map(|g| g.value).max() {
            Some(max) => {
                let spread = (max / 5) as f32;
                self.chromatic = if spread > 0.0 {
                    (
                        rng.random_range(-spread..=spread),
                        rng.random_range(-spread..=spread),
                    )
                } else {
                    (0.0, 0.0)
                };
                self.scanline_alpha = (max.saturating_mul(5)).min(100) as u8;
            }
            None => {
                self.chromatic = (0.0, 0.0);
                self.scanline_alpha = self.scanline_alpha.saturating_sub(5);
            }
        }
    }

    /// Whether any glitch is running.
    pub fn is_active(&self) -> bool {
        !self.glitches.is_empty()
    }

    /// Strongest running glitch intensity, 0 when idle.
    pub fn intensity(&self) -> u32 {
        self.glitches.iter().map(|g| g.value).max().unwrap_or(0)
    }

    /// Red/blue channel split for this tick.
    pub fn chromatic_offset(&self) -> (f32, f32) {
        self.chromatic
    }

    /// Scanline overlay alpha.
    pub fn scanline_alpha(&self) -> u8 {
        self.scanline_alpha
    }

    /// Alpha of the strongest running static burst, `None` when idle.
    pub fn static_alpha(&self) -> Option<u8> {
        self.bursts.iter().map(|b| b.value).max()
    }
}

/// Camera that follows a target and can shake.
#[derive(Debug, Clone)]
pub struct Camera {
    view: (f32, f32),
    offset: (f32, f32),
    shake: Option<Timed<u32>>,
}

impl Camera {
    /// A camera for a viewport of the given size.
    pub fn new(view_width: f32, view_height: f32) -> Self {
        Self {
            view: (view_width, view_height),
            offset: (0.0, 0.0),
            shake: None,
        }
    }

    fn start_shake(&mut self, now: u64, duration_ms: u64, intensity: u32) {
        self.shake = Some(Timed {
            until: now + duration_ms,
            value: intensity,
        });
    }

    /// Centre on `target`, adding shake jitter while a shake is running.
    pub fn follow(&mut self, target: &Rect, now: u64, rng: &mut StdRng) {
        let (cx, cy) = target.center();
        let mut offset = (self.view.0 / 2.0 - cx, self.view.1 / 2.0 - cy);

        if let Some(shake) = self.shake {
            if shake.until > now {
                let amp = shake.value as f32;
                offset.0 += rng.random_range(-amp..=amp);
                offset.1 += rng.random_range(-amp..=amp);
            } else {
                self.shake = None;
            }
        }
        self.offset = offset;
    }

    /// Whether a shake is running.
    pub fn is_shaking(&self) -> bool {
        self.shake.is_some()
    }

    /// World-to-screen translation.
    pub fn offset(&self) -> (f32, f32) {
        self.offset
    }

    /// Map a world rectangle into screen space.
    pub fn apply(&self, rect: &Rect) -> Rect {
        rect.translate(self.offset.0, self.offset.1)
    }
}

/// A timed centred message.
#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    /// Text shown.
    pub text: String,
    /// Absolute expiry (ms).
    pub until: u64,
}

/// A ghost-face echo on a reflective surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Reflection {
    /// Entity the echo appears on.
    pub entity: EntityId,
    /// Where to draw it (world space).
    pub rect: Rect,
    /// Start time (ms).
    pub started: u64,
    /// Absolute expiry (ms).
    pub until: u64,
}

impl Reflection {
    /// Fraction of the echo's lifetime elapsed, in `[0, 1]`.
    pub fn progress(&self, now: u64) -> f32 {
        let span = self.until.saturating_sub(self.started).max(1);
        (now.saturating_sub(self.started) as f32 / span as f32).min(1.0)
    }
}

/// All transient effects of a level session.
///
/// Trigger methods also queue the matching sound cue so the audio layer
/// stays in step with what is drawn.
#[derive(Debug, Clone)]
pub struct Effects {
    /// Glitch and static overlay state.
    pub glitch: GlitchState,
    /// Follow camera.
    pub camera: Camera,
    /// Sound and speech requests for the front end.
    pub cues: CueQueue,
    popups: Vec<Popup>,
    corrupted: Vec<Timed<EntityId>>,
    jumpscare_until: Option<u64>,
    reflections: Vec<Reflection>,
}

/// How long the jumpscare overlay stays up.
pub const JUMPSCARE_MS: u64 = 400;

impl Effects {
    /// Fresh effect state for a viewport.
    pub fn new(view_width: f32, view_height: f32) -> Self {
        Self {
            glitch: GlitchState::default(),
            camera: Camera::new(view_width, view_height),
            cues: CueQueue::new(),
            popups: Vec::new(),
            corrupted: Vec::new(),
            jumpscare_until: None,
            reflections: Vec::new(),
        }
    }

    /// Start a glitch and play "glitch".
    pub fn trigger_glitch(&mut self, now: u64, duration_ms: u64, intensity: u32) {
        self.glitch.trigger(now, duration_ms, intensity);
        self.cues.push(Cue::sfx("glitch"));
    }

    /// Start a static burst and play "glitch".
    pub fn static_burst(&mut self, now: u64, duration_ms: u64, alpha: u8) {
        self.glitch.burst(now, duration_ms, alpha);
        self.cues.push(Cue::sfx("glitch"));
    }

    /// Shake the camera.
    pub fn start_shake(&mut self, now: u64, duration_ms: u64, intensity: u32) {
        self.camera.start_shake(now, duration_ms, intensity);
    }

    /// Queue a popup, play "popup" and hand the text to narration.
    pub fn add_popup(&mut self, now: u64, text: impl Into<String>, duration_ms: u64) {
        let text = text.into();
        tracing::debug!(%text, duration_ms, "popup");
        self.cues.push(Cue::sfx("popup"));
        self.cues.push(Cue::Speak(text.clone()));
        self.popups.push(Popup {
            text,
            until: now + duration_ms,
        });
    }

    /// Live popups, oldest first.
    pub fn popups(&self) -> &[Popup] {
        &self.popups
    }

    /// Drop expired popups.
    pub fn expire_popups(&mut self, now: u64) {
        self.popups.retain(|p| p.until > now);
    }

    /// Mark an entity as corrupted until `now + duration_ms`.
    pub fn corrupt(&mut self, id: EntityId, now: u64, duration_ms: u64) {
        self.corrupted.retain(|c| c.value != id);
        self.corrupted.push(Timed {
            until: now + duration_ms,
            value: id,
        });
    }

    /// Whether the entity is currently corrupted.
    pub fn is_corrupted(&self, id: EntityId) -> bool {
        self.corrupted.iter().any(|c| c.value == id)
    }

    /// Ids of corrupted entities.
    pub fn corrupted(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.corrupted.iter().map(|c| c.value)
    }

    /// Drop expired corruption marks.
    pub fn expire_corrupted(&mut self, now: u64) {
        self.corrupted.retain(|c| c.until > now);
    }

    /// Raise the jumpscare overlay.
    pub fn jumpscare(&mut self, now: u64) {
        self.jumpscare_until = Some(now + JUMPSCARE_MS);
    }

    /// Whether the jumpscare overlay is up.
    pub fn jumpscare_active(&self, now: u64) -> bool {
        self.jumpscare_until.is_some_and(|until| until > now)
    }

    /// Show a reflection echo on an entity.
    pub fn add_reflection(&mut self, entity: EntityId, rect: Rect, now: u64, duration_ms: u64) {
        self.reflections.push(Reflection {
            entity,
            rect,
            started: now,
            until: now + duration_ms,
        });
    }

    /// Live reflection echoes.
    pub fn reflections(&self) -> &[Reflection] {
        &self.reflections
    }

    /// Drop finished reflections and the jumpscare overlay.
    pub fn expire_ambient(&mut self, now: u64) {
        self.reflections.retain(|r| r.until > now);
        if self.jumpscare_until.is_some_and(|until| until <= now) {
            self.jumpscare_until = None;
        }
    }
}
