//! Two-channel audio mixer.
//!
//! The mixer turns [`Cue`]s into backend calls. A sound's volume is
//! `master_volume × channel_volume × fade`, recomputed every tick so slider
//! changes apply to sounds already playing. Sounds the backend does not
//! have are a silent no-op.

use std::collections::HashMap;

use macroquad::audio::{PlaySoundParams, Sound, play_sound, set_sound_volume, stop_sound};
use mf_core::{Channel, Cue};

use crate::settings::Settings;

/// Something that can play named sounds.
pub trait AudioBackend {
    /// Whether `name` is loaded.
    fn has(&self, name: &str) -> bool;
    /// Start `name` at `volume`.
    fn play(&mut self, name: &str, looped: bool, volume: f32);
    /// Stop every instance of `name`.
    fn stop(&mut self, name: &str);
    /// Change the volume of `name` while it plays.
    fn set_volume(&mut self, name: &str, volume: f32);
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Fade {
    from: f32,
    to: f32,
    elapsed_ms: u64,
    total_ms: u64,
}

impl Fade {
    fn level(&self) -> f32 {
        if self.total_ms == 0 {
            return self.to;
        }
        let t = (self.elapsed_ms as f32 / self.total_ms as f32).min(1.0);
        self.from + (self.to - self.from) * t
    }

    fn is_done(&self) -> bool {
        self.elapsed_ms >= self.total_ms
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Voice {
    channel: Channel,
    looped: bool,
    fade: Option<Fade>,
    stopping: bool,
}

impl Voice {
    fn gain(&self) -> f32 {
        self.fade.map_or(1.0, |f| f.level())
    }
}

/// Volume for `channel` under the current settings.
pub fn channel_volume(settings: &Settings, channel: Channel) -> f32 {
    let channel_volume = match channel {
        Channel::Sfx => settings.sfx_volume,
        Channel::Music => settings.music_volume,
    };
    settings.master_volume * channel_volume
}

/// Routes cues to a backend and keeps track of what is playing.
pub struct Mixer {
    backend: Box<dyn AudioBackend>,
    voices: HashMap<String, Voice>,
}

impl Mixer {
    /// Mixer over `backend`.
    pub fn new(backend: Box<dyn AudioBackend>) -> Self {
        Self {
            backend,
            voices: HashMap::new(),
        }
    }

    /// Apply one sound cue. Speech cues are not the mixer's business and
    /// are ignored.
    pub fn handle(&mut self, cue: &Cue, settings: &Settings) {
        match cue {
            Cue::Sound {
                name,
                channel,
                looped,
                fade_ms,
            } => {
                let loops = if *looped { -1 } else { 0 };
                self.play(name, *channel, loops, u64::from(*fade_ms), settings);
            }
            Cue::StopSound { name, fade_ms } => self.stop(name, u64::from(*fade_ms)),
            Cue::Speak(_) => {}
        }
    }

    /// Play `name` on `channel`. `loops < 0` repeats forever; anything else
    /// plays once. A non-zero `fade_ms` ramps the volume up from silence.
    pub fn play(&mut self, name: &str, channel: Channel, loops: i32, fade_ms: u64, settings: &Settings) {
        if !self.backend.has(name) {
            tracing::debug!(name, "sound not loaded; skipped");
            return;
        }
        let looped = loops < 0;
        if looped && self.voices.get(name).is_some_and(|v| v.looped && !v.stopping) {
            return;
        }
        if self.voices.contains_key(name) {
            self.backend.stop(name);
        }

        let voice = Voice {
            channel,
            looped,
            fade: (fade_ms > 0).then_some(Fade {
                from: 0.0,
                to: 1.0,
                elapsed_ms: 0,
                total_ms: fade_ms,
            }),
            stopping: false,
        };
        let volume = channel_volume(settings, channel) * voice.gain();
        self.backend.play(name, looped, volume);
        self.voices.insert(name.to_string(), voice);
    }

    /// Stop `name`, immediately or over `fade_ms`.
    pub fn stop(&mut self, name: &str, fade_ms: u64) {
        let Some(voice) = self.voices.get_mut(name) else {
            return;
        };
        if fade_ms == 0 {
            self.backend.stop(name);
            self.voices.remove(name);
            return;
        }
        let from = voice.gain();
        voice.stopping = true;
        voice.fade = Some(Fade {
            from,
            to: 0.0,
            elapsed_ms: 0,
            total_ms: fade_ms,
        });
    }

    /// Advance fades by `elapsed_ms` and push current volumes to the
    /// backend. One-shot voices are forgotten after their first update.
    pub fn update(&mut self, elapsed_ms: u64, settings: &Settings) {
        let mut finished = Vec::new();
        for (name, voice) in &mut self.voices {
            if let Some(fade) = &mut voice.fade {
                fade.elapsed_ms += elapsed_ms;
            }
            let faded_out = voice.stopping && voice.fade.is_some_and(|f| f.is_done());
            if faded_out {
                self.backend.stop(name);
                finished.push(name.clone());
                continue;
            }
            if voice.fade.is_some_and(|f| f.is_done()) {
                voice.fade = None;
            }
            let volume = channel_volume(settings, voice.channel) * voice.gain();
            self.backend.set_volume(name, volume);
            if !voice.looped && voice.fade.is_none() {
                finished.push(name.clone());
            }
        }
        for name in finished {
            self.voices.remove(&name);
        }
    }

    /// Whether the mixer believes `name` is still sounding.
    pub fn is_playing(&self, name: &str) -> bool {
        self.voices.contains_key(name)
    }

    /// Stop everything at once.
    pub fn stop_all(&mut self) {
        for name in self.voices.keys() {
            self.backend.stop(name);
        }
        self.voices.clear();
    }
}

/// Backend playing the catalog's sounds through macroquad.
pub struct MacroquadAudio {
    sounds: HashMap<String, Sound>,
}

impl MacroquadAudio {
    /// Backend over loaded sounds.
    pub fn new(sounds: HashMap<String, Sound>) -> Self {
        Self { sounds }
    }
}

impl AudioBackend for MacroquadAudio {
    fn has(&self, name: &str) -> bool {
        self.sounds.contains_key(name)
    }

    fn play(&mut self, name: &str, looped: bool, volume: f32) {
        if let Some(sound) = self.sounds.get(name) {
            play_sound(sound, PlaySoundParams { looped, volume });
        }
    }

    fn stop(&mut self, name: &str) {
        if let Some(sound) = self.sounds.get(name) {
            stop_sound(sound);
        }
    }

    fn set_volume(&mut self, name: &str, volume: f32) {
        if let Some(sound) = self.sounds.get(name) {
            set_sound_volume(sound, volume);
        }
    }
}

/// Backend with no sounds at all.
#[derive(Debug, Default)]
pub struct SilentAudio;

impl AudioBackend for SilentAudio {
    fn has(&self, _name: &str) -> bool {
        false
    }

    fn play(&mut self, _name: &str, _looped: bool, _volume: f32) {}

    fn stop(&mut self, _name: &str) {}

    fn set_volume(&mut self, _name: &str, _volume: f32) {}
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Play(String, bool, f32),
        Stop(String),
        Volume(String, f32),
    }

    #[derive(Clone, Default)]
    struct Fake {
        known: Vec<&'static str>,
        calls: Rc<RefCell<Vec<Call>>>,
    }

    impl AudioBackend for Fake {
        fn has(&self, name: &str) -> bool {
            self.known.contains(&name)
        }
        fn play(&mut self, name: &str, looped: bool, volume: f32) {
            self.calls.borrow_mut().push(Call::Play(name.into(), looped, volume));
        }
        fn stop(&mut self, name: &str) {
            self.calls.borrow_mut().push(Call::Stop(name.into()));
        }
        fn set_volume(&mut self, name: &str, volume: f32) {
            self.calls.borrow_mut().push(Call::Volume(name.into(), volume));
        }
    }

    fn mixer(known: Vec<&'static str>) -> (Mixer, Rc<RefCell<Vec<Call>>>) {
        let fake = Fake {
            known,
            ..Fake::default()
        };
        let calls = fake.calls.clone();
        (Mixer::new(Box::new(fake)), calls)
    }

    #[test]
    fn volume_is_master_times_channel() {
        let settings = Settings::default();
        let (mut mixer, calls) = mixer(vec!["interact", "menu_music"]);
        mixer.handle(&Cue::sfx("interact"), &settings);
        mixer.handle(&Cue::music("menu_music", 0), &settings);

        let calls = calls.borrow();
        assert_eq!(calls[0], Call::Play("interact".into(), false, 0.8));
        match &calls[1] {
            Call::Play(name, true, v) => {
                assert_eq!(name, "menu_music");
                assert!((v - 0.56).abs() < 1e-5);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn missing_sound_is_silent() {
        let settings = Settings::default();
        let (mut mixer, calls) = mixer(vec![]);
        mixer.play("hum", Channel::Sfx, -1, 0, &settings);
        mixer.stop("hum", 0);
        assert!(calls.borrow().is_empty());
        assert!(!mixer.is_playing("hum"));
    }

    #[test]
    fn looping_sound_is_not_restarted() {
        let settings = Settings::default();
        let (mut mixer, calls) = mixer(vec!["walk"]);
        mixer.handle(&Cue::sfx_loop("walk"), &settings);
        mixer.handle(&Cue::sfx_loop("walk"), &settings);
        let plays = calls
            .borrow()
            .iter()
            .filter(|c| matches!(c, Call::Play(..)))
            .count();
        assert_eq!(plays, 1);
        assert!(mixer.is_playing("walk"));
    }

    #[test]
    fn fade_out_stops_after_duration() {
        let settings = Settings::default();
        let (mut mixer, calls) = mixer(vec!["terminal_music"]);
        mixer.handle(&Cue::music("terminal_music", 0), &settings);
        mixer.handle(&Cue::stop("terminal_music", 500), &settings);

        mixer.update(250, &settings);
        assert!(mixer.is_playing("terminal_music"));
        match calls.borrow().last() {
            Some(Call::Volume(_, v)) => assert!((v - 0.28).abs() < 1e-5),
            other => panic!("unexpected {other:?}"),
        }

        mixer.update(250, &settings);
        assert!(!mixer.is_playing("terminal_music"));
        assert_eq!(calls.borrow().last(), Some(&Call::Stop("terminal_music".into())));
    }

    #[test]
    fn slider_changes_reach_playing_music() {
        let mut settings = Settings::default();
        let (mut mixer, calls) = mixer(vec!["ambient_music"]);
        mixer.handle(&Cue::music("ambient_music", 0), &settings);
        settings.master_volume = 0.5;
        settings.music_volume = 0.5;
        mixer.update(16, &settings);
        assert_eq!(calls.borrow().last(), Some(&Call::Volume("ambient_music".into(), 0.25)));
    }
}
