//! Mindfall: macroquad entry point.
//!
//! Polls input every frame, advances the simulation on a fixed 60 Hz step,
//! and draws the active screen onto a letterboxed virtual canvas.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use macroquad::prelude::*;
use tracing_subscriber::EnvFilter;

use mf_core::Campaign;
use mf_gui::app::{App, AppContext};
use mf_gui::assets::AssetCatalog;
use mf_gui::audio::MacroquadAudio;
use mf_gui::input;
use mf_gui::narration::LogSpeech;
use mf_gui::render::WindowCanvas;
use mf_gui::screen::ScreenId;
use mf_gui::settings::{Settings, default_path};
use mf_gui::theme::{CANVAS_H, CANVAS_W, palette, setup_virtual_canvas};
use mf_simulation::SimConfig;

/// Simulation steps allowed to catch up in a single frame.
const MAX_STEPS_PER_FRAME: u32 = 5;

#[derive(Parser)]
#[command(
    name = "mindfall",
    about = "Mindfall: escape the quarantined memory",
    version
)]
struct Args {
    /// Settings file, created with defaults when missing
    #[arg(long, default_value_os_t = default_path())]
    settings: PathBuf,

    /// Directory holding images/ and sounds/
    #[arg(long, default_value = "assets")]
    assets: PathBuf,

    /// Skip the story and menu and jump straight into a chapter
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
    chapter: Option<u8>,

    /// Seed for every random roll in the simulation
    #[arg(long)]
    seed: Option<u64>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn window_conf() -> Conf {
    Conf {
        window_title: "Mindfall".to_owned(),
        window_width: CANVAS_W as i32,
        window_height: CANVAS_H as i32,
        window_resizable: true,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    let args = Args::parse();
    init_tracing();
    prevent_quit();

    let settings = Settings::load_or_default(&args.settings);
    let campaign = match Campaign::bundled() {
        Ok(campaign) => campaign,
        Err(e) => {
            tracing::error!("bundled campaign is unreadable: {e}");
            return;
        }
    };
    let mut config = SimConfig::default();
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    let step = 1.0 / config.tick_rate as f32;

    let mut assets = AssetCatalog::load(&args.assets).await;
    let audio = MacroquadAudio::new(assets.take_sounds());

    let ctx = AppContext::new(settings, args.settings.clone(), campaign, config);
    let mut app = App::new(ctx, Box::new(audio), Arc::new(LogSpeech));

    if let Some(chapter) = args.chapter {
        match app.context_mut().select_chapter(usize::from(chapter) - 1) {
            Ok(()) => app.switch(ScreenId::LevelIntro),
            Err(e) => tracing::warn!(chapter, "cannot jump to chapter: {e}"),
        }
    }

    let mut accumulator = 0.0;
    loop {
        let frame = input::poll();
        app.handle_input(&frame);

        accumulator += get_frame_time();
        let mut steps = 0;
        while accumulator >= step && steps < MAX_STEPS_PER_FRAME {
            app.tick(&frame);
            accumulator -= step;
            steps += 1;
        }
        if steps == MAX_STEPS_PER_FRAME {
            accumulator = 0.0;
        }

        clear_background(palette::BLACK);
        setup_virtual_canvas();
        let mut canvas = WindowCanvas::new(&assets);
        app.draw(&mut canvas);

        if app.should_quit() {
            tracing::info!("disconnecting");
            break;
        }
        next_frame().await;
    }
}
