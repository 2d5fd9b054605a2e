use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::GameResult;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const DEBUG: bool = true;
pub const FB_WIDTH: u32 = 1920;
pub const FB_HEIGHT: u32 = 1080;

/// Runtime settings. Every field has a default so a config file may set
/// any subset of them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub assets_root: PathBuf,
    pub framebuffer_width: u32,
    pub framebuffer_height: u32,
    pub window_width: u32,
    pub window_height: u32,
    pub debug: bool,
    pub load_timeout_ms: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            assets_root: PathBuf::from("assets"),
            framebuffer_width: FB_WIDTH,
            framebuffer_height: FB_HEIGHT,
            window_width: FB_WIDTH / 2,
            window_height: FB_HEIGHT / 2,
            debug: DEBUG,
            load_timeout_ms: 10_000,
        }
    }
}

impl GameConfig {
    pub fn from_ron_str(source: &str) -> GameResult<Self> {
        Ok(ron::from_str(source)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> GameResult<Self> {
        let source = std::fs::read_to_string(path.as_ref())?;
        log::info!("Loaded config from {:?}", path.as_ref());
        Self::from_ron_str(&source)
    }
}
