//! World generation: the callback contract consumed by `World::reset` and a
//! handful of built-in layouts modelled on the classic MiniGrid worlds.

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::error::GridError;
use crate::grid::Grid;
use crate::types::{Cell, Color, Direction, DoorState};

/// Output of a world generator. Position and direction are optional so that
/// a generator which forgets to place the agent is caught by the controller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Generated {
    pub grid: Grid,
    pub agent_pos: Option<(i32, i32)>,
    pub agent_dir: Option<Direction>,
    pub mission: String,
}

impl Generated {
    pub fn new(grid: Grid, agent_pos: (i32, i32), agent_dir: Direction) -> Self {
        Self { grid, agent_pos: Some(agent_pos), agent_dir: Some(agent_dir), mission: String::new() }
    }

    pub fn with_mission(mut self, mission: impl Into<String>) -> Self {
        self.mission = mission.into();
        self
    }
}

pub trait WorldGenerator {
    fn generate(&mut self, width: usize, height: usize, rng: &mut dyn RngCore) -> Result<Generated, GridError>;
}

/// A fixed world replays itself on every reset.
impl WorldGenerator for Generated {
    fn generate(&mut self, _width: usize, _height: usize, _rng: &mut dyn RngCore) -> Result<Generated, GridError> {
        Ok(self.clone())
    }
}

/// Adapts a closure into a generator.
pub struct FnGenerator<F>(F);

pub fn from_fn<F>(f: F) -> FnGenerator<F>
where
    F: FnMut(usize, usize, &mut dyn RngCore) -> Result<Generated, GridError>,
{
    FnGenerator(f)
}

impl<F> WorldGenerator for FnGenerator<F>
where
    F: FnMut(usize, usize, &mut dyn RngCore) -> Result<Generated, GridError>,
{
    fn generate(&mut self, width: usize, height: usize, rng: &mut dyn RngCore) -> Result<Generated, GridError> {
        (self.0)(width, height, rng)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    #[default]
    EmptyRoom,
    DoorKey,
    LavaGap,
    FourRooms,
    Unlock,
    UnlockPickup,
}

impl Layout {
    pub fn from_name(name: &str) -> Option<Self> {
        Self::parse(name).map(|(layout, _)| layout)
    }

    /// Resolves a short name (`door_key`, `empty_5x5`) or a MiniGrid id
    /// (`MiniGrid-Empty-5x5-v0`, `MiniGrid-LavaGapS5-v0`) to a layout and a
    /// grid size. Names without a size get `default_size`.
    pub fn parse(name: &str) -> Option<(Self, (usize, usize))> {
        let name = name.to_ascii_lowercase();
        let (short, id_size) = match name.strip_prefix("minigrid-") {
            Some(rest) => {
                let mut parts = rest.split('-');
                let short = parts.next().unwrap_or(rest);
                (short, parts.find_map(parse_wxh))
            }
            None => (name.as_str(), None),
        };
        let (short, named_size) = strip_size(short);
        let layout = match short {
            "empty" | "empty_room" => Layout::EmptyRoom,
            "doorkey" | "door_key" => Layout::DoorKey,
            "lavagap" | "lava_gap" => Layout::LavaGap,
            "fourrooms" | "four_rooms" => Layout::FourRooms,
            "unlock" => Layout::Unlock,
            "unlockpickup" | "unlock_pickup" => Layout::UnlockPickup,
            _ => return None,
        };
        Some((layout, id_size.or(named_size).unwrap_or_else(|| layout.default_size())))
    }

    /// MiniGrid's registered size for ids that carry none.
    pub fn default_size(self) -> (usize, usize) {
        match self {
            Layout::EmptyRoom | Layout::DoorKey => (8, 8),
            Layout::LavaGap => (7, 7),
            Layout::FourRooms => (19, 19),
            Layout::Unlock | Layout::UnlockPickup => (11, 6),
        }
    }

    pub fn min_size(self) -> usize {
        match self {
            Layout::EmptyRoom => 3,
            Layout::LavaGap | Layout::DoorKey | Layout::FourRooms | Layout::Unlock | Layout::UnlockPickup => 5,
        }
    }

    pub fn mission(self) -> &'static str {
        match self {
            Layout::EmptyRoom => "get to the green goal square",
            Layout::DoorKey => "use the key to open the door and then get to the goal",
            Layout::LavaGap => "avoid the lava and get to the green goal square",
            Layout::FourRooms => "reach the goal",
            Layout::Unlock => "open the door and get to the goal",
            Layout::UnlockPickup => "open the door, unpack the box and get to the goal",
        }
    }
}

impl WorldGenerator for Layout {
    fn generate(&mut self, width: usize, height: usize, rng: &mut dyn RngCore) -> Result<Generated, GridError> {
        let min = self.min_size();
        if width < min || height < min {
            return Err(GridError::InvalidConfig(format!(
                "{self:?} needs at least {min}x{min}, got {width}x{height}"
            )));
        }
        let mut grid = Grid::new(width, height);
        grid.wall_rect(0, 0, width, height);
        let goal = (width - 2, height - 2);

        let (pos, dir) = match self {
            Layout::EmptyRoom => {
                grid.set(goal.0, goal.1, Some(Cell::Goal));
                ((1, 1), Direction::Right)
            }
            Layout::LavaGap => {
                grid.set(goal.0, goal.1, Some(Cell::Goal));
                let gap_x = rng.gen_range(2..width - 2);
                let gap_y = rng.gen_range(1..height - 1);
                for y in 1..height - 1 {
                    if y != gap_y {
                        grid.set(gap_x, y, Some(Cell::Lava));
                    }
                }
                ((1, 1), Direction::Right)
            }
            Layout::DoorKey => {
                grid.set(goal.0, goal.1, Some(Cell::Goal));
                let split = rng.gen_range(2..width - 2);
                grid.vert_wall(split, 0, height);
                let door_y = rng.gen_range(1..height - 1);
                let color = Color::Yellow;
                grid.set(split, door_y, Some(Cell::door(color, DoorState::Locked)));
                place_obj(&mut grid, rng, (1, 1), (split - 1, height - 2), Cell::Key { color })?;
                place_agent(&grid, rng, (1, 1), (split - 1, height - 2))?
            }
            Layout::FourRooms => {
                let (mid_x, mid_y) = (width / 2, height / 2);
                grid.vert_wall(mid_x, 0, height);
                grid.horz_wall(0, mid_y, width);
                grid.set(mid_x, rng.gen_range(1..mid_y), None);
                grid.set(mid_x, rng.gen_range(mid_y + 1..height - 1), None);
                grid.set(rng.gen_range(1..mid_x), mid_y, None);
                grid.set(rng.gen_range(mid_x + 1..width - 1), mid_y, None);
                grid.set(goal.0, goal.1, Some(Cell::Goal));
                ((1, 1), Direction::Right)
            }
            Layout::Unlock | Layout::UnlockPickup => {
                let mid_x = width / 2;
                grid.vert_wall(mid_x, 0, height);
                let door_y = rng.gen_range(1..height - 1);
                let color = Color::ALL[rng.gen_range(0..Color::ALL.len())];
                grid.set(mid_x, door_y, Some(Cell::door(color, DoorState::Locked)));
                grid.set(goal.0, goal.1, Some(Cell::Goal));
                if *self == Layout::UnlockPickup {
                    let ball = Cell::Ball { color: Color::ALL[rng.gen_range(0..Color::ALL.len())] };
                    let right_room = (mid_x + 1, 1);
                    let size = (width - 2 - mid_x, height - 2);
                    place_obj(&mut grid, rng, right_room, size, Cell::boxed(Color::Grey, Some(ball)))?;
                }
                place_obj(&mut grid, rng, (1, 1), (mid_x - 1, height - 2), Cell::Key { color })?;
                place_agent(&grid, rng, (1, 1), (mid_x - 1, height - 2))?
            }
        };

        Ok(Generated::new(grid, pos, dir).with_mission(self.mission()))
    }
}

fn parse_wxh(token: &str) -> Option<(usize, usize)> {
    let (w, h) = token.split_once('x')?;
    Some((w.parse().ok()?, h.parse().ok()?))
}

/// Splits a trailing `_WxH` token or an `S<n>` suffix (`lavagaps7`) off a name.
fn strip_size(short: &str) -> (&str, Option<(usize, usize)>) {
    if let Some((head, size)) = short.rsplit_once('_').and_then(|(h, t)| Some((h, parse_wxh(t)?))) {
        return (head, Some(size));
    }
    let head = short.trim_end_matches(|c: char| c.is_ascii_digit());
    if head.len() < short.len() {
        if let (Some(base), Ok(n)) = (head.strip_suffix('s'), short[head.len()..].parse::<usize>()) {
            return (base, Some((n, n)));
        }
    }
    (short, None)
}

fn free_cells(grid: &Grid, top: (usize, usize), size: (usize, usize)) -> usize {
    (top.1..top.1 + size.1)
        .flat_map(|y| (top.0..top.0 + size.0).map(move |x| (x, y)))
        .filter(|&(x, y)| grid.is_empty(x, y))
        .count()
}

fn sample_free(grid: &Grid, rng: &mut dyn RngCore, top: (usize, usize), size: (usize, usize)) -> Result<(usize, usize), GridError> {
    if size.0 == 0 || size.1 == 0 || free_cells(grid, top, size) == 0 {
        return Err(GridError::NoFreeInteriorCell);
    }
    loop {
        let x = rng.gen_range(top.0..top.0 + size.0);
        let y = rng.gen_range(top.1..top.1 + size.1);
        if grid.is_empty(x, y) {
            return Ok((x, y));
        }
    }
}

fn place_obj(grid: &mut Grid, rng: &mut dyn RngCore, top: (usize, usize), size: (usize, usize), cell: Cell) -> Result<(), GridError> {
    let (x, y) = sample_free(grid, rng, top, size)?;
    grid.set(x, y, Some(cell));
    Ok(())
}

fn place_agent(grid: &Grid, rng: &mut dyn RngCore, top: (usize, usize), size: (usize, usize)) -> Result<((i32, i32), Direction), GridError> {
    let (x, y) = sample_free(grid, rng, top, size)?;
    let dir = Direction::ALL[rng.gen_range(0..4)];
    Ok(((x as i32, y as i32), dir))
}
