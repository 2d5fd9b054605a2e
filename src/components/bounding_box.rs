use crate::{ecs::Component, rect::Rectangle};

/// A 2D bounding rectangle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundingBoxComponent {
    pub bbox: Rectangle,
}

impl Component for BoundingBoxComponent {
    fn reset(&mut self) {
        self.bbox = Rectangle::default();
    }
}
