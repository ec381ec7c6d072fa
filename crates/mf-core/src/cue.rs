//! Sound and speech requests.
//!
//! Simulation code never talks to an audio device. It pushes [`Cue`]s into a
//! [`CueQueue`] and the front end drains the queue once per frame.

/// Mixer channel a sound plays on. Volume is `master × channel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Short effects.
    Sfx,
    /// Looping background music.
    Music,
}

/// A request for the audio or narration collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cue {
    /// Start playing a named sound.
    Sound {
        /// Asset key.
        name: String,
        /// Mixer channel.
        channel: Channel,
        /// Loop until stopped.
        looped: bool,
        /// Fade-in duration, best effort.
        fade_ms: u32,
    },
    /// Stop a named sound.
    StopSound {
        /// Asset key.
        name: String,
        /// Fade-out duration, best effort.
        fade_ms: u32,
    },
    /// Speak a line through the narration task.
    Speak(String),
}

impl Cue {
    /// One-shot effect on the sfx channel.
    pub fn sfx(name: impl Into<String>) -> Self {
        Self::Sound {
            name: name.into(),
            channel: Channel::Sfx,
            looped: false,
            fade_ms: 0,
        }
    }

    /// Looping effect on the sfx channel.
    pub fn sfx_loop(name: impl Into<String>) -> Self {
        Self::Sound {
            name: name.into(),
            channel: Channel::Sfx,
            looped: true,
            fade_ms: 0,
        }
    }

    /// Looping track on the music channel.
    pub fn music(name: impl Into<String>, fade_ms: u32) -> Self {
        Self::Sound {
            name: name.into(),
            channel: Channel::Music,
            looped: true,
            fade_ms,
        }
    }

    /// Stop a sound, optionally fading it out.
    pub fn stop(name: impl Into<String>, fade_ms: u32) -> Self {
        Self::StopSound {
            name: name.into(),
            fade_ms,
        }
    }

    /// Name of the sound this cue starts, if any.
    pub fn sound_name(&self) -> Option<&str> {
        match self {
            Self::Sound { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// FIFO of pending cues.
#[derive(Debug, Clone, Default)]
pub struct CueQueue {
    cues: Vec<Cue>,
}

impl CueQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a cue.
    pub fn push(&mut self, cue: Cue) {
        self.cues.push(cue);
    }

    /// Take every queued cue, oldest first.
    pub fn drain(&mut self) -> Vec<Cue> {
        std::mem::take(&mut self.cues)
    }

    /// Pending cues without consuming them.
    pub fn pending(&self) -> &[Cue] {
        &self.cues
    }

    /// Count pending sounds with the given name.
    pub fn count_sound(&self, name: &str) -> usize {
        self.cues
            .iter()
            .filter(|c| c.sound_name() == Some(name))
            .count()
    }
}
