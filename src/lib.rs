//! A small pong game built around an asynchronous asset loader, a component
//! store and two screen states (main menu and game table).
//!
//! The window front end lives in `main.rs`; everything here can run headless
//! against a [`renderer::RecordingBatch`].

pub mod camera;
pub mod components;
pub mod config;
pub mod data;
pub mod ecs;
pub mod effects;
pub mod entities;
pub mod error;
pub mod game;
pub mod gui;
pub mod handles;
pub mod input;
pub mod loader;
pub mod rect;
pub mod renderer;
pub mod resources;
pub mod states;
pub mod textures;
pub mod viewport;

#[cfg(test)]
mod test_support;

pub use config::GameConfig;
pub use error::{GameError, GameResult};
pub use game::{GameCore, Services};
pub use states::{BaseState, GameStateId, StateSignal};
