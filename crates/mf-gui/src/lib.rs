//! Macroquad front end for Mindfall.
//!
//! The application is a state machine over screens (story, menu,
//! instructions, settings, level intro, game, terminal, win) sharing an
//! [`app::AppContext`]. Screens draw through the [`render::Canvas`]
//! abstraction and emit audio and narration cues that the [`app::App`]
//! dispatches to the mixer and the narrator, so the whole flow runs
//! headless in tests.

pub mod app;
pub mod assets;
pub mod audio;
pub mod error;
pub mod input;
pub mod narration;
pub mod render;
pub mod screen;
pub mod settings;
pub mod theme;
pub mod widget;
