use crate::{ecs::Component, textures::Texture};

/// The only resource-bearing component: disposing it releases the texture.
#[derive(Debug, Clone)]
pub struct TextureComponent {
    pub texture: Texture,
}

impl TextureComponent {
    pub fn new(texture: Texture) -> Self {
        Self { texture }
    }
}

impl Component for TextureComponent {
    // The handle is replaced wholesale on reuse.
    fn reset(&mut self) {}

    fn dispose_resources(&mut self) {
        self.texture.dispose();
    }

    fn holds_resources(&self) -> bool {
        true
    }
}
