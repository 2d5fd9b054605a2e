use crate::ecs::Component;

/// Which side of the table an entity plays for.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerComponent {
    pub id: i32,
}

impl PlayerComponent {
    pub const HUMAN_PLAYER: i32 = 0;
    pub const COMPUTER_PLAYER: i32 = 1;
    pub const UNASSIGNED: i32 = -1;

    pub fn is_human(&self) -> bool {
        self.id == Self::HUMAN_PLAYER
    }
}

impl Default for PlayerComponent {
    fn default() -> Self {
        Self { id: Self::UNASSIGNED }
    }
}

impl Component for PlayerComponent {
    fn reset(&mut self) {
        self.id = Self::UNASSIGNED;
    }
}
