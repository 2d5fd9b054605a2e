use std::path::{Path, PathBuf};

use crate::{
    error::{GameError, GameResult},
    handles::AssetKind,
    loader::AsyncAssetLoader,
    rect::Rectangle,
    renderer::SpriteBatch,
    textures::{Texture, TextureRegion},
};

const SCROLL_SPEED: f32 = 0.1;

/// A texture that slowly slides diagonally behind the menu.
pub struct ScrollingBackground {
    path: PathBuf,
    texture: Option<Texture>,
    u_offset: f32,
    v_offset: f32,
}

impl ScrollingBackground {
    pub fn new<P: AsRef<Path>>(path: P, loader: &mut AsyncAssetLoader) -> GameResult<Self> {
        loader.add_asset_to_load(path.as_ref(), AssetKind::Texture)?;

        Ok(Self {
            path: path.as_ref().to_path_buf(),
            texture: None,
            u_offset: 0.0,
            v_offset: 0.0,
        })
    }

    pub fn on_assets_loaded(&mut self, loader: &AsyncAssetLoader) -> GameResult<()> {
        self.texture = Some(loader.get_texture(&self.path)?);
        Ok(())
    }

    pub fn texture(&self) -> Option<&Texture> {
        self.texture.as_ref()
    }

    /// Offsets are fractions of the texture size and wrap at 1.
    pub fn update(&mut self, delta: f32) {
        self.u_offset = (self.u_offset + delta * SCROLL_SPEED).fract();
        self.v_offset = (self.v_offset + delta * SCROLL_SPEED).fract();
    }

    pub fn offsets(&self) -> (f32, f32) {
        (self.u_offset, self.v_offset)
    }

    pub fn render(&self, batch: &mut dyn SpriteBatch, area: Rectangle) -> GameResult<()> {
        let texture = self
            .texture
            .as_ref()
            .ok_or_else(|| GameError::invalid_state("background rendered before its texture loaded"))?;

        let (width, height) = (texture.width(), texture.height());
        if width == 0 || height == 0 {
            return Ok(());
        }

        // The offset splits the texture into up to four pieces; drawing them
        // swapped keeps every region inside the texture.
        let x0 = ((self.u_offset * width as f32) as u32).min(width);
        let y0 = ((self.v_offset * height as f32) as u32).min(height);
        let columns = [(x0, width - x0), (0, x0)];
        let rows = [(y0, height - y0), (0, y0)];
        let scale_x = area.width / width as f32;
        let scale_y = area.height / height as f32;

        let mut dest_top = area.y + area.height;
        for &(src_y, src_height) in rows.iter().filter(|(_, h)| *h > 0) {
            let dest_height = src_height as f32 * scale_y;
            dest_top -= dest_height;

            let mut dest_x = area.x;
            for &(src_x, src_width) in columns.iter().filter(|(_, w)| *w > 0) {
                let dest_width = src_width as f32 * scale_x;
                let region = TextureRegion {
                    texture: texture.clone(),
                    x: src_x,
                    y: src_y,
                    width: src_width,
                    height: src_height,
                };
                let dest = Rectangle::new(dest_x, dest_top, dest_width, dest_height);
                batch.draw_region(&region, dest);
                dest_x += dest_width;
            }
        }
        Ok(())
    }

    pub fn dispose(&mut self) {
        if let Some(texture) = self.texture.take() {
            texture.dispose();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        renderer::{DrawCommand, RecordingBatch},
        test_support::write_png,
    };

    #[test]
    fn test_background_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "grass.png", 32, 32);

        let mut loader = AsyncAssetLoader::new(dir.path(), 1);
        let mut background = ScrollingBackground::new("grass.png", &mut loader).unwrap();

        let mut batch = RecordingBatch::new();
        assert!(background.render(&mut batch, Rectangle::default()).is_err());

        loader.block_until_resolved(Duration::from_secs(10)).unwrap();
        background.on_assets_loaded(&loader).unwrap();

        background.update(2.5);
        let (u, v) = background.offsets();
        assert!((u - 0.25).abs() < 1e-5);
        assert!((v - 0.25).abs() < 1e-5);

        batch.begin().unwrap();
        background.render(&mut batch, Rectangle::new(0.0, 0.0, 64.0, 64.0)).unwrap();
        batch.end().unwrap();
        assert_eq!(batch.commands.len(), 4);

        let texture = background.texture().unwrap().clone();
        background.dispose();
        assert!(texture.is_disposed());
        assert!(background.texture().is_none());
    }

    #[test]
    fn test_scrolled_regions_stay_inside_texture() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "grass.png", 32, 32);

        let mut loader = AsyncAssetLoader::new(dir.path(), 1);
        let mut background = ScrollingBackground::new("grass.png", &mut loader).unwrap();
        loader.block_until_resolved(Duration::from_secs(10)).unwrap();
        background.on_assets_loaded(&loader).unwrap();
        background.update(2.5);

        let area = Rectangle::new(-32.0, -16.0, 64.0, 32.0);
        let mut batch = RecordingBatch::new();
        batch.begin().unwrap();
        background.render(&mut batch, area).unwrap();
        batch.end().unwrap();

        let mut covered = 0.0;
        for command in batch.take_commands() {
            let DrawCommand::Region { src, dest, .. } = command else {
                panic!("unexpected command {:?}", command);
            };
            let (x, y, width, height) = src;
            assert!(x + width <= 32 && y + height <= 32);
            assert!(dest.x >= area.x && dest.x + dest.width <= area.x + area.width + 1e-3);
            assert!(dest.y >= area.y - 1e-3 && dest.y + dest.height <= area.y + area.height + 1e-3);
            covered += dest.width * dest.height;
        }
        assert!((covered - area.width * area.height).abs() < 1e-2);

        // No scroll: the whole texture in one piece.
        let still = ScrollingBackground {
            path: PathBuf::from("grass.png"),
            texture: background.texture().cloned(),
            u_offset: 0.0,
            v_offset: 0.0,
        };
        batch.begin().unwrap();
        still.render(&mut batch, area).unwrap();
        batch.end().unwrap();
        assert_eq!(
            batch.take_commands(),
            vec![DrawCommand::Region {
                texture: "grass.png".into(),
                src: (0, 0, 32, 32),
                dest: area,
            }]
        );
    }
}
