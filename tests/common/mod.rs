use std::path::Path;

use ceidec_pong::config::{FB_HEIGHT, FB_WIDTH};
use ceidec_pong::entities::pong;
use ceidec_pong::states::main_menu;
use ceidec_pong::GameConfig;

#[allow(dead_code)]
pub fn write_png(root: &Path, relative: &str, width: u32, height: u32) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    image::RgbaImage::from_pixel(width, height, image::Rgba([30, 120, 30, 255]))
        .save(&path)
        .unwrap();
}

#[allow(dead_code)]
pub fn write_assets(root: &Path) {
    for texture in [
        main_menu::BUTTON_ENABLED_TEXTURE,
        main_menu::BUTTON_DISABLED_TEXTURE,
        main_menu::BUTTON_PRESSED_TEXTURE,
        main_menu::BACKGROUND_TEXTURE,
        pong::BALL_TEXTURE,
        pong::PADDLE_TEXTURE,
    ] {
        write_png(root, texture, 32, 32);
    }

    let font = root.join(main_menu::BUTTON_FONT);
    std::fs::create_dir_all(font.parent().unwrap()).unwrap();
    std::fs::write(font, b"not a real font").unwrap();
}

#[allow(dead_code)]
pub fn config(root: &Path) -> GameConfig {
    GameConfig {
        assets_root: root.to_path_buf(),
        window_width: FB_WIDTH,
        window_height: FB_HEIGHT,
        ..GameConfig::default()
    }
}
