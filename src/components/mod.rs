mod bounding_box;
mod player;
mod position;
mod sprite;
mod texture;

pub use bounding_box::BoundingBoxComponent;
pub use player::PlayerComponent;
pub use position::PositionComponent;
pub use sprite::SpriteComponent;
pub use texture::TextureComponent;
