use crate::ecs::Component;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PositionComponent {
    pub x: f32,
    pub y: f32,
}

impl PositionComponent {
    pub fn set(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
    }
}

impl Component for PositionComponent {
    fn reset(&mut self) {
        self.set(0.0, 0.0);
    }
}
