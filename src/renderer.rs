use std::path::PathBuf;

use cgmath::{Matrix4, SquareMatrix};

use crate::{
    error::{GameError, GameResult},
    rect::Rectangle,
    resources::Font,
    textures::{NinePatch, TextureRegion},
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

/// Draw submission surface provided by the rendering framework.
pub trait SpriteBatch {
    fn clear(&mut self, color: Color);
    fn set_projection(&mut self, projection: Matrix4<f32>);
    fn begin(&mut self) -> GameResult<()>;
    fn end(&mut self) -> GameResult<()>;

    fn draw_region(&mut self, region: &TextureRegion, dest: Rectangle);
    fn draw_nine_patch(&mut self, patch: &NinePatch, dest: Rectangle);
    fn draw_text(&mut self, font: &Font, text: &str, x: f32, y: f32, color: Color);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Color),
    Region {
        texture: PathBuf,
        src: (u32, u32, u32, u32),
        dest: Rectangle,
    },
    NinePatch {
        texture: PathBuf,
        dest: Rectangle,
    },
    Text {
        text: String,
        x: f32,
        y: f32,
        color: Color,
    },
}

/// Batch that records what it is asked to draw. Used headless and in tests.
pub struct RecordingBatch {
    pub commands: Vec<DrawCommand>,
    pub projection: Matrix4<f32>,
    drawing: bool,
    frames: usize,
}

impl RecordingBatch {
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            projection: Matrix4::identity(),
            drawing: false,
            frames: 0,
        }
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    fn record(&mut self, command: DrawCommand) {
        if !self.drawing {
            log::warn!("Draw call outside begin/end: {:?}", command);
        }
        self.commands.push(command);
    }
}

impl Default for RecordingBatch {
    fn default() -> Self {
        Self::new()
    }
}

impl SpriteBatch for RecordingBatch {
    fn clear(&mut self, color: Color) {
        self.commands.push(DrawCommand::Clear(color));
    }

    fn set_projection(&mut self, projection: Matrix4<f32>) {
        self.projection = projection;
    }

    fn begin(&mut self) -> GameResult<()> {
        if self.drawing {
            return Err(GameError::invalid_state("batch end must be called before begin"));
        }
        self.drawing = true;
        Ok(())
    }

    fn end(&mut self) -> GameResult<()> {
        if !self.drawing {
            return Err(GameError::invalid_state("batch begin must be called before end"));
        }
        self.drawing = false;
        self.frames += 1;
        Ok(())
    }

    fn draw_region(&mut self, region: &TextureRegion, dest: Rectangle) {
        self.record(DrawCommand::Region {
            texture: region.texture.path().to_path_buf(),
            src: (region.x, region.y, region.width, region.height),
            dest,
        });
    }

    fn draw_nine_patch(&mut self, patch: &NinePatch, dest: Rectangle) {
        self.record(DrawCommand::NinePatch {
            texture: patch.region.texture.path().to_path_buf(),
            dest,
        });
    }

    fn draw_text(&mut self, _font: &Font, text: &str, x: f32, y: f32, color: Color) {
        self.record(DrawCommand::Text {
            text: text.to_string(),
            x,
            y,
            color,
        });
    }
}
