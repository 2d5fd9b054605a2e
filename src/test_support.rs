use std::path::Path;

use crate::config::{GameConfig, FB_HEIGHT, FB_WIDTH};

pub fn write_png(root: &Path, relative: &str, width: u32, height: u32) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    image::RgbaImage::from_pixel(width, height, image::Rgba([200, 200, 0, 255]))
        .save(&path)
        .unwrap();
}

pub fn write_binary(root: &Path, relative: &str, bytes: &[u8]) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, bytes).unwrap();
}

/// Writes every asset the menu and the game table queue.
pub fn write_game_assets(root: &Path) {
    use crate::{entities::pong, states::main_menu};

    for texture in [
        main_menu::BUTTON_ENABLED_TEXTURE,
        main_menu::BUTTON_DISABLED_TEXTURE,
        main_menu::BUTTON_PRESSED_TEXTURE,
    ] {
        write_png(root, texture, 128, 96);
    }
    write_png(root, main_menu::BACKGROUND_TEXTURE, 64, 64);
    write_binary(root, main_menu::BUTTON_FONT, b"font");
    write_png(root, pong::BALL_TEXTURE, 16, 16);
    write_png(root, pong::PADDLE_TEXTURE, 8, 32);
}

/// Window and framebuffer share a size, so a screen pixel is a world unit.
pub fn test_config(root: &Path) -> GameConfig {
    GameConfig {
        assets_root: root.to_path_buf(),
        window_width: FB_WIDTH,
        window_height: FB_HEIGHT,
        load_timeout_ms: 10_000,
        ..GameConfig::default()
    }
}

/// Screen position of a world point under `test_config`.
pub fn to_screen(world_x: f32, world_y: f32) -> (f32, f32) {
    (world_x + FB_WIDTH as f32 / 2.0, FB_HEIGHT as f32 / 2.0 - world_y)
}
