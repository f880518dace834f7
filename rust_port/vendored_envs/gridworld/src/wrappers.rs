//! Adapters layered over a `World`: goal bearing and coordinate observations,
//! and a four-way absolute movement action space.

use serde::{Deserialize, Serialize};

use crate::agent::AgentState;
use crate::error::GridError;
use crate::grid::Grid;
use crate::types::{Action, CellKind, Direction};
use crate::world::{StepOutcome, World};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BearingMode {
    /// `atan(slope)` in degrees.
    #[default]
    Angle,
    Slope,
}

impl BearingMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "angle" => Some(BearingMode::Angle),
            "slope" => Some(BearingMode::Slope),
            _ => None,
        }
    }
}

/// Bearing from `agent` to `goal`. The first component of each pair is the
/// denominator axis; a zero denominator yields `+inf` (90 degrees).
pub fn bearing(goal: (i64, i64), agent: (i64, i64), mode: BearingMode) -> f64 {
    let den = goal.0 - agent.0;
    let slope = if den == 0 { f64::INFINITY } else { (goal.1 - agent.1) as f64 / den as f64 };
    match mode {
        BearingMode::Angle => slope.atan().to_degrees(),
        BearingMode::Slope => slope,
    }
}

/// First goal in enumeration order, as `(index / height, index % width)`.
pub fn locate_goal(grid: &Grid) -> Option<(i64, i64)> {
    grid.iter()
        .find(|(_, _, _, cell)| cell.kind() == CellKind::Goal)
        .map(|(i, _, _, _)| ((i / grid.height()) as i64, (i % grid.width()) as i64))
}

/// Goal-bearing observation. The goal position is looked up once per
/// episode; the bearing itself is recomputed on every call.
#[derive(Clone, Debug, Default)]
pub struct GoalBearing {
    mode: BearingMode,
    cached: Option<(u64, Option<(i64, i64)>)>,
}

impl GoalBearing {
    pub fn new(mode: BearingMode) -> Self {
        Self { mode, cached: None }
    }

    pub fn mode(&self) -> BearingMode { self.mode }

    /// Cached goal coordinate, if one has been located this episode.
    pub fn goal(&self) -> Option<(i64, i64)> {
        self.cached.and_then(|(_, goal)| goal)
    }

    /// `None` when the world has no goal cell. A new episode (`World::episode`
    /// moved on) discards the cached goal.
    pub fn observe<G>(&mut self, world: &World<G>) -> Option<f64> {
        let episode = world.episode();
        let goal = match self.cached {
            Some((ep, goal)) if ep == episode => goal,
            _ => {
                let goal = locate_goal(world.grid());
                self.cached = Some((episode, goal));
                goal
            }
        }?;
        let (x, y) = world.agent().pos;
        Some(bearing(goal, (x as i64, y as i64), self.mode))
    }
}

/// Agent coordinates with the axes swapped: `(y, x)`.
pub fn coords(agent: &AgentState) -> (i32, i32) {
    (agent.pos.1, agent.pos.0)
}

/// Four-way absolute movement: turn left until facing the requested
/// direction, then step forward once.
pub struct FourDirections<'w, G = crate::generate::Layout> {
    world: &'w mut World<G>,
    primitive_steps: usize,
}

impl<'w, G> FourDirections<'w, G> {
    pub fn new(world: &'w mut World<G>) -> Self {
        Self { world, primitive_steps: 0 }
    }

    pub fn world(&self) -> &World<G> { &*self.world }

    /// Primitive engine steps issued by the last `step` call (1..=4).
    pub fn primitive_steps(&self) -> usize { self.primitive_steps }

    /// Returns the outcome of the last primitive step. If a rotation ends
    /// the episode (step budget), the forward step is not issued.
    pub fn step(&mut self, target: Direction) -> Result<StepOutcome, GridError> {
        self.primitive_steps = 0;
        for _ in 0..self.world.agent().dir.rotations_left_to(target) {
            let out = self.world.step(Action::Left)?;
            self.primitive_steps += 1;
            if out.done {
                return Ok(out);
            }
        }
        let out = self.world.step(Action::Forward)?;
        self.primitive_steps += 1;
        Ok(out)
    }

    pub fn step_index(&mut self, index: u8) -> Result<StepOutcome, GridError> {
        self.step(Direction::try_from(index)?)
    }
}
