use serde::{Deserialize, Serialize};

use crate::error::GridError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Action {
    Left = 0,
    Right = 1,
    Forward = 2,
    Pickup = 3,
    Drop = 4,
    Toggle = 5,
    Done = 6,
}

impl Action {
    pub const ALL: [Action; 7] = [
        Action::Left,
        Action::Right,
        Action::Forward,
        Action::Pickup,
        Action::Drop,
        Action::Toggle,
        Action::Done,
    ];

    /// Parses the lowercase action names used by tool calls.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name.to_ascii_lowercase().as_str() {
            "left" => Action::Left,
            "right" => Action::Right,
            "forward" => Action::Forward,
            "pickup" => Action::Pickup,
            "drop" => Action::Drop,
            "toggle" => Action::Toggle,
            "done" => Action::Done,
            _ => return None,
        })
    }
}

impl TryFrom<u8> for Action {
    type Error = GridError;
    fn try_from(v: u8) -> Result<Self, Self::Error> {
        Action::ALL
            .get(v as usize)
            .copied()
            .ok_or(GridError::InvalidAction(v))
    }
}

/// Facing direction. Indices follow the clockwise screen convention
/// (y grows downwards).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    Right = 0,
    Down = 1,
    Left = 2,
    Up = 3,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Right, Direction::Down, Direction::Left, Direction::Up];

    /// Maps any integer onto a direction using the non-negative residue mod 4.
    pub fn from_index(i: i64) -> Self {
        Self::ALL[i.rem_euclid(4) as usize]
    }

    pub fn right(self) -> Self {
        Self::from_index(self as i64 + 1)
    }

    pub fn left(self) -> Self {
        Self::from_index(self as i64 - 1)
    }

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Up => (0, -1),
        }
    }

    /// Number of left turns needed to face `target` (0..=3).
    pub fn rotations_left_to(self, target: Direction) -> u8 {
        (self as i64 - target as i64).rem_euclid(4) as u8
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name.to_ascii_lowercase().as_str() {
            "right" | "east" => Direction::Right,
            "down" | "south" => Direction::Down,
            "left" | "west" => Direction::Left,
            "up" | "north" => Direction::Up,
            _ => return None,
        })
    }
}

impl TryFrom<u8> for Direction {
    type Error = GridError;
    fn try_from(v: u8) -> Result<Self, Self::Error> {
        Direction::ALL
            .get(v as usize)
            .copied()
            .ok_or(GridError::InvalidDirection(v))
    }
}

/// Object type indices, matching the MiniGrid encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum CellKind {
    Unseen = 0,
    Empty = 1,
    Wall = 2,
    Floor = 3,
    Door = 4,
    Key = 5,
    Ball = 6,
    Box = 7,
    Goal = 8,
    Lava = 9,
    Agent = 10,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Color {
    Red = 0,
    Green = 1,
    Blue = 2,
    Purple = 3,
    Yellow = 4,
    Grey = 5,
}

impl Color {
    pub const ALL: [Color; 6] = [Color::Red, Color::Green, Color::Blue, Color::Purple, Color::Yellow, Color::Grey];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum DoorState {
    Open = 0,
    Closed = 1,
    Locked = 2,
}

/// A grid object. Empty cells are represented by `None` in the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cell {
    Wall,
    Goal,
    Lava,
    Door { color: Color, state: DoorState },
    Key { color: Color },
    Ball { color: Color },
    Box { color: Color, contains: Option<Box<Cell>> },
}

impl Cell {
    pub fn door(color: Color, state: DoorState) -> Self {
        Cell::Door { color, state }
    }

    pub fn boxed(color: Color, contains: Option<Cell>) -> Self {
        Cell::Box { color, contains: contains.map(Box::new) }
    }

    pub fn kind(&self) -> CellKind {
        match self {
            Cell::Wall => CellKind::Wall,
            Cell::Goal => CellKind::Goal,
            Cell::Lava => CellKind::Lava,
            Cell::Door { .. } => CellKind::Door,
            Cell::Key { .. } => CellKind::Key,
            Cell::Ball { .. } => CellKind::Ball,
            Cell::Box { .. } => CellKind::Box,
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Cell::Wall => Color::Grey,
            Cell::Goal => Color::Green,
            Cell::Lava => Color::Red,
            Cell::Door { color, .. } | Cell::Key { color } | Cell::Ball { color } | Cell::Box { color, .. } => *color,
        }
    }

    /// Whether the agent may stand on this cell.
    pub fn can_overlap(&self) -> bool {
        match self {
            Cell::Goal | Cell::Lava => true,
            Cell::Door { state, .. } => *state == DoorState::Open,
            Cell::Wall | Cell::Key { .. } | Cell::Ball { .. } | Cell::Box { .. } => false,
        }
    }

    pub fn can_pickup(&self) -> bool {
        matches!(self, Cell::Key { .. } | Cell::Ball { .. } | Cell::Box { .. })
    }

    pub fn see_behind(&self) -> bool {
        match self {
            Cell::Wall | Cell::Box { .. } => false,
            Cell::Door { state, .. } => *state == DoorState::Open,
            Cell::Goal | Cell::Lava | Cell::Key { .. } | Cell::Ball { .. } => true,
        }
    }

    /// `(kind, color, state)` triple; doors report their state, others 0.
    pub fn encode(&self) -> [u8; 3] {
        let color = self.color() as u8;
        let state = match self {
            Cell::Door { state, .. } => *state as u8,
            _ => 0,
        };
        [self.kind() as u8, color, state]
    }

    /// Applies the toggle effect and returns what occupies the cell afterwards.
    /// A locked door only yields to a key of its own color; a box is replaced
    /// by its contents.
    pub fn toggled(self, carrying: Option<&Cell>) -> Option<Cell> {
        match self {
            Cell::Door { color, state: DoorState::Locked } => {
                let unlocked = matches!(carrying, Some(Cell::Key { color: key }) if *key == color);
                let state = if unlocked { DoorState::Open } else { DoorState::Locked };
                Some(Cell::Door { color, state })
            }
            Cell::Door { color, state: DoorState::Open } => Some(Cell::Door { color, state: DoorState::Closed }),
            Cell::Door { color, state: DoorState::Closed } => Some(Cell::Door { color, state: DoorState::Open }),
            Cell::Box { contains, .. } => contains.map(|inner| *inner),
            other => Some(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locked_door_needs_matching_key() {
        let door = Cell::door(Color::Yellow, DoorState::Locked);
        let wrong = Cell::Key { color: Color::Blue };
        let right = Cell::Key { color: Color::Yellow };
        assert_eq!(door.clone().toggled(None), Some(door.clone()));
        assert_eq!(door.clone().toggled(Some(&wrong)), Some(door.clone()));
        assert_eq!(door.toggled(Some(&right)), Some(Cell::door(Color::Yellow, DoorState::Open)));
    }

    #[test]
    fn unlocked_door_flips() {
        let open = Cell::door(Color::Red, DoorState::Open);
        let closed = open.clone().toggled(None).unwrap();
        assert_eq!(closed, Cell::door(Color::Red, DoorState::Closed));
        assert!(!closed.can_overlap());
        assert_eq!(closed.toggled(None), Some(open));
    }

    #[test]
    fn box_releases_contents() {
        let ball = Cell::Ball { color: Color::Purple };
        assert_eq!(Cell::boxed(Color::Grey, Some(ball.clone())).toggled(None), Some(ball));
        assert_eq!(Cell::boxed(Color::Grey, None).toggled(None), None);
    }

    #[test]
    fn static_cells_ignore_toggle() {
        for cell in [Cell::Wall, Cell::Goal, Cell::Lava, Cell::Key { color: Color::Red }] {
            assert_eq!(cell.clone().toggled(None), Some(cell));
        }
    }

    #[test]
    fn encode_matches_minigrid_triples() {
        assert_eq!(Cell::Wall.encode(), [2, 5, 0]);
        assert_eq!(Cell::Goal.encode(), [8, 1, 0]);
        assert_eq!(Cell::Lava.encode(), [9, 0, 0]);
        assert_eq!(Cell::door(Color::Blue, DoorState::Locked).encode(), [4, 2, 2]);
    }

    #[test]
    fn rotations_left_count() {
        assert_eq!(Direction::Right.rotations_left_to(Direction::Right), 0);
        assert_eq!(Direction::Right.rotations_left_to(Direction::Up), 1);
        assert_eq!(Direction::Right.rotations_left_to(Direction::Left), 2);
        assert_eq!(Direction::Right.rotations_left_to(Direction::Down), 3);
        assert_eq!(Direction::from_index(-1), Direction::Up);
    }
}
