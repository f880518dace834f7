use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::agent::AgentState;
use crate::config::GridConfig;
use crate::error::GridError;
use crate::generate::{Generated, Layout, WorldGenerator};
use crate::grid::Grid;
use crate::types::{Action, Cell, CellKind, Direction};

/// Added to every step's reward, including the terminal one.
pub const STEP_PENALTY: f64 = -0.001;
pub const GOAL_REWARD: f64 = 1.0;
pub const LAVA_REWARD: f64 = -2.0;

/// Full snapshot of the world after a reset or a step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub grid: Grid,
    pub agent: AgentState,
    pub step_count: u32,
    pub max_steps: u32,
    pub done: bool,
    pub mission: String,
}

impl Observation {
    /// `[h][w][3]` encoding with the agent overlaid as `(Agent, 0, dir)`.
    ///
    /// As in MiniGrid, the overlay hides whatever the agent stands on (goal,
    /// lava, open door); `under_agent` and `grid` still carry that cell.
    pub fn encode_grid(&self) -> Vec<Vec<[u8; 3]>> {
        let mut out = self.grid.encode();
        let (x, y) = self.agent.pos;
        if self.grid.in_bounds(x, y) {
            out[y as usize][x as usize] = [CellKind::Agent as u8, 0, self.agent.dir as u8];
        }
        out
    }

    pub fn under_agent(&self) -> Option<&Cell> {
        let (x, y) = self.agent.pos;
        if self.grid.in_bounds(x, y) {
            self.grid.get(x as usize, y as usize)
        } else {
            None
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub observation: Observation,
    pub reward: f64,
    pub done: bool,
    /// Goal or lava reached on this step.
    pub terminated: bool,
    /// Step budget exhausted on this step.
    pub truncated: bool,
}

/// One episode's worth of state: the grid, the agent and the counters.
///
/// A freshly constructed world has no episode in progress; `reset` must be
/// called before the first `step`.
#[derive(Clone, Debug)]
pub struct World<G = Layout> {
    config: GridConfig,
    generator: G,
    grid: Grid,
    agent: AgentState,
    mission: String,
    step_count: u32,
    done: bool,
    episode: u64,
    last_reward: f64,
    total_reward: f64,
}

impl<G> World<G> {
    pub fn new(config: GridConfig, generator: G) -> Result<Self, GridError> {
        config.validate()?;
        let grid = Grid::new(config.width, config.height);
        Ok(Self {
            config,
            generator,
            grid,
            agent: AgentState::new((0, 0), Direction::Right),
            mission: String::new(),
            step_count: 0,
            done: true,
            episode: 0,
            last_reward: 0.0,
            total_reward: 0.0,
        })
    }

    pub fn config(&self) -> &GridConfig { &self.config }
    pub fn grid(&self) -> &Grid { &self.grid }
    pub fn agent(&self) -> &AgentState { &self.agent }
    pub fn step_count(&self) -> u32 { self.step_count }
    pub fn max_steps(&self) -> u32 { self.config.max_steps }
    pub fn is_done(&self) -> bool { self.done }
    pub fn last_reward(&self) -> f64 { self.last_reward }
    pub fn total_reward(&self) -> f64 { self.total_reward }
    /// Number of completed resets; adapters use it to detect a new episode.
    pub fn episode(&self) -> u64 { self.episode }

    pub fn observation(&self) -> Observation {
        Observation {
            grid: self.grid.clone(),
            agent: self.agent.clone(),
            step_count: self.step_count,
            max_steps: self.config.max_steps,
            done: self.done,
            mission: self.mission.clone(),
        }
    }

    /// Advances the world by one action.
    pub fn step(&mut self, action: Action) -> Result<StepOutcome, GridError> {
        if self.done {
            return Err(GridError::EpisodeFinished);
        }

        let mut reward = 0.0;
        let mut terminated = false;
        let (fx, fy) = self.agent.front_pos();
        // Off-grid counts as a wall: blocked and not interactable.
        let front = self.grid.in_bounds(fx, fy).then(|| (fx as usize, fy as usize));

        match action {
            Action::Left => self.agent.dir = self.agent.dir.left(),
            Action::Right => self.agent.dir = self.agent.dir.right(),
            Action::Forward => {
                if let Some((x, y)) = front {
                    let fwd = self.grid.get(x, y);
                    let kind = fwd.map(Cell::kind);
                    if fwd.map_or(true, Cell::can_overlap) {
                        self.agent.pos = (fx, fy);
                    }
                    match kind {
                        Some(CellKind::Goal) => {
                            terminated = true;
                            reward = GOAL_REWARD;
                        }
                        Some(CellKind::Lava) => {
                            terminated = true;
                            reward = LAVA_REWARD;
                        }
                        _ => {}
                    }
                }
            }
            Action::Pickup => {
                if let Some((x, y)) = front {
                    let liftable = self.grid.get(x, y).is_some_and(Cell::can_pickup);
                    if liftable && self.agent.carrying.is_none() {
                        self.agent.carrying = self.grid.take(x, y);
                    }
                }
            }
            Action::Drop => {
                if let Some((x, y)) = front {
                    if self.grid.is_empty(x, y) && self.agent.carrying.is_some() {
                        let carried = self.agent.carrying.take();
                        self.grid.set(x, y, carried);
                    }
                }
            }
            Action::Toggle => {
                if let Some((x, y)) = front {
                    if let Some(cell) = self.grid.take(x, y) {
                        let next = cell.toggled(self.agent.carrying.as_ref());
                        self.grid.set(x, y, next);
                    }
                }
            }
            Action::Done => {}
        }

        self.step_count += 1;
        let truncated = self.step_count >= self.config.max_steps;
        self.done = terminated || truncated;
        reward += STEP_PENALTY;
        self.last_reward = reward;
        self.total_reward += reward;

        trace!(?action, pos = ?self.agent.pos, dir = ?self.agent.dir, reward, "step");
        if self.done {
            debug!(
                episode = self.episode,
                steps = self.step_count,
                terminated,
                truncated,
                total_reward = self.total_reward,
                "episode finished"
            );
        }

        Ok(StepOutcome { observation: self.observation(), reward, done: self.done, terminated, truncated })
    }
}

impl<G: WorldGenerator> World<G> {
    /// Regenerates the world and places the agent.
    ///
    /// Nothing in `self` changes unless the whole reset succeeds.
    pub fn reset<R: RngCore>(&mut self, rng: &mut R) -> Result<Observation, GridError> {
        self.config.validate()?;
        let (width, height) = (self.config.width, self.config.height);
        let Generated { grid, agent_pos, agent_dir, mission } = self.generator.generate(width, height, rng)?;
        if grid.width() != width || grid.height() != height {
            return Err(GridError::InvalidConfig(format!(
                "generator produced {}x{} grid, expected {width}x{height}",
                grid.width(),
                grid.height()
            )));
        }
        let (Some(generated_pos), Some(dir)) = (agent_pos, agent_dir) else {
            return Err(GridError::MissingAgentPlacement);
        };

        let (pos, attempts) = if self.config.random_start {
            sample_free_interior(&grid, rng)?
        } else {
            (generated_pos, 0)
        };
        check_start(&grid, pos)?;

        self.grid = grid;
        self.agent = AgentState::new(pos, dir);
        self.mission = mission;
        self.step_count = 0;
        self.done = false;
        self.last_reward = 0.0;
        self.total_reward = 0.0;
        self.episode += 1;

        debug!(
            episode = self.episode,
            width,
            height,
            ?pos,
            ?dir,
            random_start = self.config.random_start,
            attempts,
            "reset"
        );
        Ok(self.observation())
    }
}

/// Rejection-samples a uniformly random empty cell strictly inside the border.
/// Returns the position and the number of draws it took.
fn sample_free_interior<R: Rng + ?Sized>(grid: &Grid, rng: &mut R) -> Result<((i32, i32), u32), GridError> {
    let (width, height) = (grid.width(), grid.height());
    if width <= 2 || height <= 2 {
        return Err(GridError::DegenerateGrid { width, height });
    }
    let any_free = (1..height - 1).any(|y| (1..width - 1).any(|x| grid.is_empty(x, y)));
    if !any_free {
        return Err(GridError::NoFreeInteriorCell);
    }
    let mut attempts = 0u32;
    loop {
        attempts += 1;
        let x = rng.gen_range(1..width - 1);
        let y = rng.gen_range(1..height - 1);
        if grid.is_empty(x, y) {
            return Ok(((x as i32, y as i32), attempts));
        }
    }
}

fn check_start(grid: &Grid, (x, y): (i32, i32)) -> Result<(), GridError> {
    let ok = grid.in_bounds(x, y) && grid.get(x as usize, y as usize).map_or(true, Cell::can_overlap);
    if ok {
        Ok(())
    } else {
        Err(GridError::BlockedStart { x, y })
    }
}
