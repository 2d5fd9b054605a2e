use std::rc::Rc;

use crate::{
    rect::Rectangle,
    renderer::{Color, SpriteBatch},
    resources::Font,
    textures::NinePatch,
};

pub struct TextButtonStyle {
    pub font: Font,
    pub up: NinePatch,
    pub checked: NinePatch,
    pub disabled: NinePatch,
    pub font_color: Color,
    pub down_font_color: Color,
    pub disabled_font_color: Color,
}

/// A nine-patch backed button with a centred label.
///
/// Size follows the label plus the background's border insets, never
/// smaller than the background's minimum size.
pub struct TextButton {
    text: String,
    style: Rc<TextButtonStyle>,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    checked: bool,
    disabled: bool,
}

impl TextButton {
    pub fn new<T: Into<String>>(text: T, style: Rc<TextButtonStyle>) -> Self {
        let mut button = Self {
            text: String::new(),
            style,
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            checked: false,
            disabled: false,
        };
        button.set_text(text);
        button
    }

    pub fn set_text<T: Into<String>>(&mut self, text: T) {
        self.text = text.into();

        let up = &self.style.up;
        let font = &self.style.font;
        self.width = (font.text_width(&self.text) + up.min_width()).max(up.min_width());
        self.height = (font.line_height() + up.min_height()).max(up.min_height());
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_position(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn bounds(&self) -> Rectangle {
        Rectangle::new(self.x, self.y, self.width, self.height)
    }

    pub fn is_checked(&self) -> bool {
        self.checked
    }

    pub fn set_checked(&mut self, checked: bool) {
        self.checked = checked;
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    pub fn draw(&self, batch: &mut dyn SpriteBatch) {
        let style = &self.style;
        let (background, color) = if self.disabled {
            (&style.disabled, style.disabled_font_color)
        } else if self.checked {
            (&style.checked, style.down_font_color)
        } else {
            (&style.up, style.font_color)
        };

        batch.draw_nine_patch(background, self.bounds());

        let text_x = self.x + (self.width - style.font.text_width(&self.text)) / 2.0;
        let text_y = self.y + (self.height + style.font.line_height()) / 2.0;
        batch.draw_text(&style.font, &self.text, text_x, text_y, color);
    }
}
