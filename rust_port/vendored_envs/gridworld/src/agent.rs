use serde::{Deserialize, Serialize};

use crate::types::{Cell, Direction};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentState {
    pub pos: (i32, i32), // (x, y)
    pub dir: Direction,
    pub carrying: Option<Cell>,
}

impl AgentState {
    pub fn new(pos: (i32, i32), dir: Direction) -> Self {
        Self { pos, dir, carrying: None }
    }

    /// The cell adjacent to the agent along its facing direction.
    pub fn front_pos(&self) -> (i32, i32) {
        let (dx, dy) = self.dir.delta();
        (self.pos.0 + dx, self.pos.1 + dy)
    }
}
