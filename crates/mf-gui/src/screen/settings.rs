//! Volume, visual and accessibility options.

use mf_core::Cue;
use mf_simulation::rain::RainField;

use super::{Screen, ScreenId, Transition};
use crate::app::AppContext;
use crate::input::{FrameInput, InputEvent, Key};
use crate::render::{Canvas, Layer};
use crate::settings::{SettingKey, SettingValue};
use crate::theme::{CANVAS_H, CANVAS_W, palette, text_size, with_alpha};
use crate::widget::button::Button;
use crate::widget::{slider, toggle};

/// One editable row: the setting, its label, an optional caption, and its y.
struct Row {
    key: SettingKey,
    label: &'static str,
    caption: Option<&'static str>,
    y: f32,
}

const ROWS: [Row; 7] = [
    Row {
        key: SettingKey::MasterVolume,
        label: "Master Volume",
        caption: None,
        y: 180.0,
    },
    Row {
        key: SettingKey::MusicVolume,
        label: "Music Volume",
        caption: None,
        y: 225.0,
    },
    Row {
        key: SettingKey::SfxVolume,
        label: "SFX Volume",
        caption: None,
        y: 270.0,
    },
    Row {
        key: SettingKey::EnableDigitalRain,
        label: "Digital Rain Effect",
        caption: Some("(Disabling may help with motion sickness)"),
        y: 380.0,
    },
    Row {
        key: SettingKey::ShowMapOnStart,
        label: "Show Map on Start",
        caption: None,
        y: 435.0,
    },
    Row {
        key: SettingKey::UseDiegeticUi,
        label: "Holographic Map (Diegetic UI)",
        caption: None,
        y: 480.0,
    },
    Row {
        key: SettingKey::EnableVoiceNarration,
        label: "Voice Narration",
        caption: None,
        y: 590.0,
    },
];

const HEADERS: [(&str, f32); 3] = [
    ("[ AUDIO ]", 130.0),
    ("[ VISUALS ]", 330.0),
    ("[ ACCESSIBILITY ]", 540.0),
];

const BUTTON_Y: f32 = 670.0;

/// The settings page.
pub struct SettingsScreen {
    selected: usize,
    save: Button,
    reset: Button,
    hovered: Option<usize>,
    rain: Option<RainField>,
}

impl Default for SettingsScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsScreen {
    /// Create a new settings screen.
    pub fn new() -> Self {
        let cx = CANVAS_W / 2.0;
        Self {
            selected: 0,
            save: Button::new("[ Save & Return ]", cx - 150.0, BUTTON_Y, text_size::UI),
            reset: Button::new("[ Reset Defaults ]", cx + 150.0, BUTTON_Y, text_size::UI),
            hovered: None,
            rain: None,
        }
    }

    /// Index of the highlighted row.
    pub fn selected(&self) -> usize {
        self.selected
    }

    fn flip(ctx: &mut AppContext, key: SettingKey) {
        ctx.settings.toggle(key);
        ctx.cues.push(Cue::sfx("interact"));
        tracing::debug!(setting = key.name(), "toggled");
    }

    fn save_and_return(ctx: &mut AppContext) -> Transition {
        ctx.save_settings();
        Transition::To(ScreenId::Menu)
    }

    fn reset(ctx: &mut AppContext) {
        ctx.settings.reset();
        ctx.save_settings();
        tracing::info!("settings reset to defaults");
    }

    fn click(&mut self, ctx: &mut AppContext, x: f32, y: f32) -> Transition {
        if self.save.contains(x, y) {
            return Self::save_and_return(ctx);
        }
        if self.reset.contains(x, y) {
            Self::reset(ctx);
            return Transition::None;
        }
        let cx = CANVAS_W / 2.0;
        for (i, row) in ROWS.iter().enumerate() {
            if row.key.is_volume() {
                if slider::hit_box(cx, row.y).contains(x, y) {
                    ctx.settings.set_volume(row.key, slider::value_at(cx, x));
                    self.selected = i;
                }
            } else if toggle::body(cx, row.y).contains(x, y) {
                Self::flip(ctx, row.key);
                self.selected = i;
            }
        }
        Transition::None
    }
}

impl Screen for SettingsScreen {
    fn on_enter(&mut self, ctx: &mut AppContext) {
        self.selected = 0;
        self.rain = ctx
            .settings
            .enable_digital_rain
            .then(|| RainField::new(CANVAS_W, CANVAS_H, &mut ctx.rng));
    }

    fn handle_input(&mut self, ctx: &mut AppContext, input: &FrameInput) -> Transition {
        let (mx, my) = input.mouse;
        self.hovered = [&self.save, &self.reset]
            .iter()
            .position(|b| b.contains(mx, my));

        for event in &input.events {
            let key = ROWS[self.selected].key;
            let transition = match *event {
                InputEvent::Key(Key::Up) => {
                    self.selected = self.selected.checked_sub(1).unwrap_or(ROWS.len() - 1);
                    Transition::None
                }
                InputEvent::Key(Key::Down) => {
                    self.selected = (self.selected + 1) % ROWS.len();
                    Transition::None
                }
                InputEvent::Key(Key::Left) => {
                    ctx.settings.adjust(key, -1);
                    Transition::None
                }
                InputEvent::Key(Key::Right) => {
                    ctx.settings.adjust(key, 1);
                    Transition::None
                }
                InputEvent::Key(Key::Enter) => {
                    if !key.is_volume() {
                        Self::flip(ctx, key);
                    }
                    Transition::None
                }
                InputEvent::Key(Key::Escape) => Self::save_and_return(ctx),
                InputEvent::Char('r' | 'R') => {
                    Self::reset(ctx);
                    Transition::None
                }
                InputEvent::Click { x, y } => self.click(ctx, x, y),
                _ => Transition::None,
            };
            if transition != Transition::None {
                return transition;
            }
        }
        Transition::None
    }

    fn update(&mut self, ctx: &mut AppContext, _input: &FrameInput) -> Transition {
        if !ctx.settings.enable_digital_rain {
            self.rain = None;
        } else if let Some(rain) = &mut self.rain {
            rain.update(&mut ctx.rng);
        } else {
            self.rain = Some(RainField::new(CANVAS_W, CANVAS_H, &mut ctx.rng));
        }
        Transition::None
    }

    fn draw(&self, ctx: &AppContext, canvas: &mut dyn Canvas) {
        canvas.begin_layer(Layer::Background);
        canvas.fill(palette::BLACK);

        if let Some(rain) = &self.rain {
            canvas.begin_layer(Layer::Particles);
            let mut buf = [0u8; 4];
            for drop in rain.drops() {
                let glyph = drop.glyph.encode_utf8(&mut buf);
                canvas.text(glyph, drop.x, drop.y, text_size::TERMINAL, with_alpha(palette::GREEN, 50));
            }
        }

        canvas.begin_layer(Layer::Hud);
        let cx = CANVAS_W / 2.0;
        canvas.text_centered(
            "System Configuration",
            cx,
            60.0 - text_size::LEVEL_TITLE / 2.0,
            text_size::LEVEL_TITLE,
            palette::GREEN,
        );
        for (header, y) in HEADERS {
            canvas.text_centered(
                header,
                cx,
                y - text_size::MESSAGE / 2.0,
                text_size::MESSAGE,
                palette::GREEN,
            );
        }

        for (i, row) in ROWS.iter().enumerate() {
            let selected = i == self.selected;
            match ctx.settings.get(row.key) {
                SettingValue::Volume(v) => {
                    slider::draw_slider(canvas, row.label, cx, row.y, v, selected);
                }
                SettingValue::Flag(on) => {
                    toggle::draw_toggle(canvas, row.label, row.caption, (cx, row.y), on, selected);
                }
            }
        }

        self.save.draw(canvas, self.hovered == Some(0));
        self.reset.draw(canvas, self.hovered == Some(1));

        canvas.text_centered(
            "Up/Down select  Left/Right adjust  Enter toggle  R reset  Esc save",
            cx,
            CANVAS_H - 24.0,
            text_size::UI * 0.75,
            palette::MID_GRAY,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_run_top_to_bottom() {
        assert!(ROWS.windows(2).all(|w| w[0].y < w[1].y));
        assert_eq!(ROWS.iter().filter(|r| r.key.is_volume()).count(), 3);
    }
}
