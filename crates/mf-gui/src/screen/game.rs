//! Exploring a sector: the live scene and its layered rendering.

use std::f32::consts::PI;

use macroquad::color::Color;
use mf_core::{EntityKind, MapGlyph, Rect};
use mf_simulation::effects::GlitchState;
use mf_simulation::lighting::LightOwner;
use mf_simulation::{Advance, Scene, SceneRequest};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{Screen, ScreenId, Transition};
use crate::app::AppContext;
use crate::input::FrameInput;
use crate::render::{Canvas, Layer};
use crate::theme::{CANVAS_H, CANVAS_W, palette, rgba, text_size, with_alpha};
use crate::widget::bordered_rect;

/// Legacy minimap size.
const MINIMAP_W: f32 = 250.0;
const MINIMAP_H: f32 = 150.0;
/// World radius covered by the holographic radar.
const RADAR_RANGE: f32 = 450.0;
/// On-screen radius of the holographic radar.
const RADAR_RADIUS: f32 = 350.0;
/// Frames out of every flicker period drawn in the alternate floor colour.
const FLICKER_PERIOD: u64 = 60;
const FLICKER_ON: u64 = 10;
const REFLECTION_ALPHA: u8 = 60;

/// Draw the glitch overlay: channel split, tearing, scanlines and static.
///
/// Randomness is seeded from `now` so one frame always draws the same way.
pub fn draw_glitch(glitch: &GlitchState, now: u64, canvas: &mut dyn Canvas) {
    let mut rng = StdRng::seed_from_u64(now);

    if glitch.is_active() {
        let (ox, oy) = glitch.chromatic_offset();
        if ox != 0.0 || oy != 0.0 {
            let full = Rect::new(0.0, 0.0, CANVAS_W, CANVAS_H);
            canvas.rect(full.translate(ox, oy), rgba(255, 0, 0, 24));
            canvas.rect(full.translate(-ox, -oy), rgba(0, 0, 255, 24));
        }

        let intensity = glitch.intensity();
        let shift = intensity as f32;
        for _ in 0..intensity / 3 {
            let y = rng.random_range(0.0..CANVAS_H);
            let h = rng.random_range(2.0..=20.0);
            let dx = rng.random_range(-shift..=shift);
            canvas.rect(Rect::new(dx, y, CANVAS_W, h), rgba(200, 255, 255, 40));
        }
    }

    let scan = glitch.scanline_alpha();
    if scan > 0 {
        let color = with_alpha(palette::BLACK, scan);
        let mut y = 0.0;
        while y < CANVAS_H {
            canvas.line((0.0, y), (CANVAS_W, y), 1.0, color);
            y += 4.0;
        }
    }

    if let Some(alpha) = glitch.static_alpha() {
        for _ in 0..150 {
            let x = rng.random_range(0.0..CANVAS_W);
            let y = rng.random_range(0.0..CANVAS_H);
            let w = rng.random_range(1.0..=4.0);
            let shade = rng.random_range(0..=255);
            canvas.rect(Rect::new(x, y, w, w), rgba(shade, shade, shade, alpha));
        }
    }
}

fn glyph_color(glyph: MapGlyph) -> Color {
    match glyph {
        MapGlyph::Wall => palette::MAP_WALL,
        MapGlyph::Door => palette::AMBER,
        MapGlyph::Terminal => palette::GREEN,
        MapGlyph::Puzzle => palette::CYAN,
        MapGlyph::Fragment => palette::WHITE,
        MapGlyph::Hostile => palette::RED,
        MapGlyph::Generic => palette::MID_GRAY,
    }
}

fn scale_color(rgb: [u8; 3], factor: f32, alpha: u8) -> Color {
    let channel = |c: u8| (f32::from(c) * factor).clamp(0.0, 255.0) as u8;
    rgba(channel(rgb[0]), channel(rgb[1]), channel(rgb[2]), alpha)
}

/// The sector view.
pub struct GameScreen {
    /// Set once the scene was shut down ahead of a chapter change.
    left: bool,
}

impl Default for GameScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl GameScreen {
    /// Create a new game screen.
    pub fn new() -> Self {
        Self { left: false }
    }

    /// Stop the outgoing scene's audio before it is replaced.
    fn leave_scene(&mut self, ctx: &mut AppContext) {
        if let Some(scene) = ctx.scene.as_mut() {
            scene.exit();
            for cue in scene.sector.effects.cues.drain() {
                ctx.cues.push(cue);
            }
        }
        self.left = true;
    }

    fn interact(&mut self, ctx: &mut AppContext) -> Transition {
        let request = match ctx.scene.as_mut() {
            Some(scene) => scene.try_interact(&ctx.clock),
            None => return Transition::To(ScreenId::Menu),
        };
        match request {
            Some(SceneRequest::EnterTerminal) => Transition::To(ScreenId::Terminal),
            Some(SceneRequest::AdvanceChapter) => {
                self.leave_scene(ctx);
                let transition = Self::advance(ctx);
                if transition == Transition::None {
                    // Still in this sector, so pick its audio back up.
                    self.left = false;
                    if let Some(scene) = ctx.scene.as_mut() {
                        scene.enter();
                    }
                }
                transition
            }
            None => Transition::None,
        }
    }

    fn advance(ctx: &mut AppContext) -> Transition {
        match ctx.advance_chapter() {
            Ok(Advance::Load(index)) => {
                tracing::info!(chapter = index, "sector breached");
                Transition::To(ScreenId::LevelIntro)
            }
            Ok(Advance::Completed) => Transition::To(ScreenId::Win),
            Ok(Advance::AlreadyCompleted) => Transition::None,
            Err(e) => {
                tracing::error!("could not load the next chapter: {e}");
                Transition::None
            }
        }
    }

    fn draw_world(scene: &Scene, canvas: &mut dyn Canvas) {
        let sector = &scene.sector;
        let camera = &sector.effects.camera;
        let ledger = &sector.ledger;
        let tick = sector.tick();

        canvas.begin_layer(Layer::Background);
        let floor = if tick % FLICKER_PERIOD < FLICKER_ON {
            palette::DARK_PURPLE
        } else {
            palette::DARK_GRAY
        };
        canvas.fill(floor);

        if let Some(rain) = scene.rain() {
            canvas.begin_layer(Layer::Particles);
            let mut buf = [0u8; 4];
            for drop in rain.drops() {
                let glyph = drop.glyph.encode_utf8(&mut buf);
                canvas.text(glyph, drop.x, drop.y, text_size::TERMINAL, with_alpha(palette::GREEN, 90));
            }
        }

        canvas.begin_layer(Layer::Reflections);
        for entity in &sector.interactives {
            if entity.rect.h < 10.0 {
                continue;
            }
            let Some(key) = entity.current_image(ledger) else {
                continue;
            };
            let rect = camera.apply(&entity.rect).translate(0.0, entity.rect.h);
            canvas.image(key, rect, with_alpha(palette::WHITE, REFLECTION_ALPHA));
        }

        canvas.begin_layer(Layer::World);
        for wall in &sector.walls {
            canvas.rect(camera.apply(&wall.rect), palette::WALL);
        }
        for entity in &sector.interactives {
            let rect = camera.apply(&entity.rect);
            canvas.image_or_placeholder(
                entity.current_image(ledger),
                rect,
                palette::WHITE,
                palette::DARK_PURPLE,
            );
            if let EntityKind::CodeFragment { .. } = entity.kind {
                let pulse = 0.5 + 0.5 * (tick as f32 * 0.1).sin();
                let glow = rect.inflate(4.0 * pulse, 4.0 * pulse);
                canvas.rect_outline(glow, 2.0, with_alpha(palette::CYAN, (155.0 + 100.0 * pulse) as u8));
            }
        }

        canvas.begin_layer(Layer::Hostiles);
        for hunter in &sector.hunters {
            let rect = camera.apply(&hunter.rect);
            canvas.rect(rect, with_alpha(palette::DARK_RED, hunter.alpha()));
            canvas.rect_outline(rect, 2.0, palette::RED);
        }

        canvas.begin_layer(Layer::Player);
        canvas.rect(camera.apply(&sector.player.rect), palette::CYAN);

        canvas.begin_layer(Layer::Lighting);
        canvas.fill(with_alpha(palette::BLACK, sector.lighting.ambient_darkness));
        for light in sector.lighting.active() {
            let owner = match light.owner {
                LightOwner::Player => Some(sector.player.rect),
                LightOwner::Entity(id) => sector
                    .interactive(id)
                    .map(|e| e.rect)
                    .or_else(|| sector.hunters.iter().find(|h| h.id == id).map(|h| h.rect)),
            };
            let Some(rect) = owner else {
                continue;
            };
            let (cx, cy) = camera.apply(&rect).center();
            let brightness = light.brightness();
            canvas.circle(cx, cy, light.radius, scale_color(light.color, brightness, 30));
            canvas.circle(cx, cy, light.radius * 0.5, scale_color(light.color, brightness, 45));
        }

        let now = sector.now();
        canvas.begin_layer(Layer::ReflectionEcho);
        for reflection in sector.effects.reflections() {
            let alpha = ((reflection.progress(now) * PI).sin() * 150.0).clamp(0.0, 255.0) as u8;
            let (cx, cy) = camera.apply(&reflection.rect).center();
            let r = reflection.rect.w.min(reflection.rect.h) * 0.3;
            canvas.circle(cx, cy, r, with_alpha(palette::MID_GRAY, alpha));
            canvas.circle(cx - r * 0.35, cy - r * 0.2, r * 0.15, with_alpha(palette::BLACK, alpha));
            canvas.circle(cx + r * 0.35, cy - r * 0.2, r * 0.15, with_alpha(palette::BLACK, alpha));
        }

        canvas.begin_layer(Layer::CorruptedStatic);
        for id in sector.effects.corrupted() {
            let Some(entity) = sector.interactive(id) else {
                continue;
            };
            let rect = camera.apply(&entity.rect);
            let mut rng = StdRng::seed_from_u64(now ^ u64::from(id.0));
            for _ in 0..12 {
                let x = rect.x + rng.random_range(0.0..=rect.w.max(1.0));
                let y = rect.y + rng.random_range(0.0..=rect.h.max(1.0));
                let shade = rng.random_range(80..=255);
                canvas.rect(Rect::new(x, y, 3.0, 3.0), rgba(shade, shade, shade, 200));
            }
        }

        canvas.begin_layer(Layer::Glitch);
        draw_glitch(&sector.effects.glitch, now, canvas);
    }

    fn draw_popups(scene: &Scene, canvas: &mut dyn Canvas) {
        let popups = scene.sector.effects.popups();
        if popups.is_empty() {
            return;
        }
        canvas.begin_layer(Layer::Popups);
        let size = text_size::POPUP;
        let mut y = CANVAS_H / 2.0 - 100.0;
        for popup in popups {
            let w = canvas.measure(&popup.text, size) + 40.0;
            let frame = Rect::new(CANVAS_W / 2.0 - w / 2.0, y - 10.0, w, size + 20.0);
            bordered_rect(canvas, frame, with_alpha(palette::BLACK, 200), palette::RED);
            canvas.text_centered(&popup.text, CANVAS_W / 2.0, y, size, palette::WHITE);
            y += size + 30.0;
        }
    }

    fn draw_minimap(scene: &Scene, canvas: &mut dyn Canvas) {
        let sector = &scene.sector;
        let (bw, bh) = sector.bounds();
        let scale = (MINIMAP_W / bw.max(1.0)).min(MINIMAP_H / bh.max(1.0));
        let origin = (CANVAS_W - MINIMAP_W - 20.0, 60.0);
        let project = |r: &Rect| {
            Rect::new(
                origin.0 + r.x * scale,
                origin.1 + r.y * scale,
                (r.w * scale).max(2.0),
                (r.h * scale).max(2.0),
            )
        };

        let frame = Rect::new(origin.0, origin.1, MINIMAP_W, MINIMAP_H);
        bordered_rect(canvas, frame, palette::MAP_GRAY, palette::GREEN);
        for entity in sector.walls.iter().chain(&sector.interactives) {
            canvas.rect(project(&entity.rect), glyph_color(entity.map_glyph()));
        }
        for hunter in &sector.hunters {
            canvas.rect(project(&hunter.rect), glyph_color(MapGlyph::Hostile));
        }
        canvas.rect(project(&sector.player.rect), palette::CYAN);
    }

    fn draw_radar(scene: &Scene, canvas: &mut dyn Canvas) {
        let sector = &scene.sector;
        let (px, py) = sector.player.rect.center();
        let (cx, cy) = (CANVAS_W / 2.0, CANVAS_H / 2.0);
        let scale = RADAR_RADIUS / RADAR_RANGE;

        canvas.circle(cx, cy, RADAR_RADIUS, with_alpha(palette::CYAN, 18));
        canvas.circle(cx, cy, RADAR_RADIUS * 0.5, with_alpha(palette::CYAN, 12));

        let blip = |rect: &Rect, glyph: MapGlyph| {
            let (ex, ey) = rect.center();
            let (dx, dy) = (ex - px, ey - py);
            (dx.hypot(dy) <= RADAR_RANGE).then(|| {
                let size = (rect.w.max(rect.h) * scale * 0.25).clamp(2.0, 12.0);
                (cx + dx * scale, cy + dy * scale, size, glyph_color(glyph))
            })
        };
        let blips = sector
            .walls
            .iter()
            .chain(&sector.interactives)
            .filter_map(|e| blip(&e.rect, e.map_glyph()))
            .chain(
                sector
                    .hunters
                    .iter()
                    .filter_map(|h| blip(&h.rect, MapGlyph::Hostile)),
            );
        for (x, y, size, color) in blips {
            canvas.circle(x, y, size, with_alpha(color, 140));
        }
        canvas.circle(cx, cy, 5.0, palette::CYAN);
    }

    fn draw_jumpscare(canvas: &mut dyn Canvas) {
        let (cx, cy) = (CANVAS_W / 2.0, CANVAS_H / 2.0);
        canvas.fill(with_alpha(palette::BLACK, 200));
        canvas.circle(cx, cy, 220.0, rgba(200, 200, 190, 235));
        canvas.circle(cx - 80.0, cy - 50.0, 45.0, palette::BLACK);
        canvas.circle(cx + 80.0, cy - 50.0, 45.0, palette::BLACK);
        canvas.circle(cx - 80.0, cy - 50.0, 8.0, palette::RED);
        canvas.circle(cx + 80.0, cy - 50.0, 8.0, palette::RED);
        canvas.rect(Rect::new(cx - 90.0, cy + 70.0, 180.0, 60.0), palette::BLACK);
    }
}

impl Screen for GameScreen {
    fn on_enter(&mut self, ctx: &mut AppContext) {
        self.left = false;
        match ctx.scene.as_mut() {
            Some(scene) => scene.enter(),
            None => tracing::warn!("game entered without a loaded chapter"),
        }
    }

    fn on_exit(&mut self, ctx: &mut AppContext) {
        if !self.left {
            self.leave_scene(ctx);
        }
    }

    fn handle_input(&mut self, ctx: &mut AppContext, input: &FrameInput) -> Transition {
        if ctx.scene.is_none() {
            return Transition::To(ScreenId::Menu);
        }
        for event in &input.events {
            let transition = match event.char_lower() {
                Some('e') => self.interact(ctx),
                Some('m') => {
                    if let Some(scene) = ctx.scene.as_mut() {
                        scene.toggle_map();
                    }
                    Transition::None
                }
                _ => Transition::None,
            };
            if transition != Transition::None {
                return transition;
            }
        }
        Transition::None
    }

    fn update(&mut self, ctx: &mut AppContext, input: &FrameInput) -> Transition {
        match ctx.scene.as_mut() {
            Some(scene) => {
                scene.update(input.held, &ctx.clock);
                Transition::None
            }
            None => Transition::To(ScreenId::Menu),
        }
    }

    fn draw(&self, ctx: &AppContext, canvas: &mut dyn Canvas) {
        let Some(scene) = ctx.scene.as_ref() else {
            canvas.begin_layer(Layer::Background);
            canvas.fill(palette::BLACK);
            return;
        };

        Self::draw_world(scene, canvas);
        Self::draw_popups(scene, canvas);

        canvas.begin_layer(Layer::Vignette);
        canvas.image(
            "vignette",
            Rect::new(0.0, 0.0, CANVAS_W, CANVAS_H),
            palette::WHITE,
        );

        if scene.show_map() {
            canvas.begin_layer(Layer::Map);
            if ctx.settings.use_diegetic_ui {
                Self::draw_radar(scene, canvas);
            } else {
                Self::draw_minimap(scene, canvas);
            }
        }

        canvas.begin_layer(Layer::Hud);
        let size = text_size::UI;
        if let Some(prompt) = scene.prompt() {
            canvas.text(prompt, 20.0, CANVAS_H - 40.0, size, palette::WHITE);
        }
        canvas.text_right(scene.location_name(), CANVAS_W - 20.0, 20.0, size, palette::GREEN);

        if scene.sector.effects.jumpscare_active(scene.sector.now()) {
            canvas.begin_layer(Layer::Jumpscare);
            Self::draw_jumpscare(canvas);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{DrawCall, RecordingCanvas};

    #[test]
    fn idle_glitch_draws_nothing() {
        let mut canvas = RecordingCanvas::new();
        canvas.begin_layer(Layer::Glitch);
        draw_glitch(&GlitchState::default(), 1000, &mut canvas);
        assert!(canvas.calls().is_empty());
    }

    #[test]
    fn glitch_overlay_is_stable_within_a_frame() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut effects = mf_simulation::Effects::new(CANVAS_W, CANVAS_H);
        effects.trigger_glitch(0, 500, 12);
        effects.static_burst(0, 500, 100);
        effects.glitch.update(10, &mut rng);

        let mut a = RecordingCanvas::new();
        let mut b = RecordingCanvas::new();
        a.begin_layer(Layer::Glitch);
        b.begin_layer(Layer::Glitch);
        draw_glitch(&effects.glitch, 10, &mut a);
        draw_glitch(&effects.glitch, 10, &mut b);
        assert_eq!(a.calls(), b.calls());
        let rects = a
            .calls()
            .iter()
            .filter(|(_, c)| matches!(c, DrawCall::Rect(..)))
            .count();
        assert!(rects >= 150);
    }

    #[test]
    fn glyphs_have_distinct_hostile_colour() {
        assert_eq!(glyph_color(MapGlyph::Hostile), palette::RED);
        assert_ne!(glyph_color(MapGlyph::Door), glyph_color(MapGlyph::Wall));
    }
}
