use crate::ecs::Component;

/// Draw size and tint for an entity's texture.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteComponent {
    pub width: f32,
    pub height: f32,
    pub tint: [f32; 4],
    pub visible: bool,
}

impl Default for SpriteComponent {
    fn default() -> Self {
        Self {
            width: 0.0,
            height: 0.0,
            tint: [1.0; 4],
            visible: true,
        }
    }
}

impl Component for SpriteComponent {
    fn reset(&mut self) {
        *self = Self::default();
    }
}
