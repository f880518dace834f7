//! Pure grid-world engine (no environment-service traits).
//! - Cell, action and direction types
//! - Grid storage and agent state
//! - `World`: step transitions, rewards and reset/placement
//! - Built-in world layouts and the generator callback contract
//! - Observation/action adapters (goal bearing, coordinates, four-way moves)

mod agent;
mod config;
mod error;
mod generate;
mod grid;
mod types;
mod world;
pub mod wrappers;

pub use agent::AgentState;
pub use config::GridConfig;
pub use error::GridError;
pub use generate::{from_fn, FnGenerator, Generated, Layout, WorldGenerator};
pub use grid::Grid;
pub use types::{Action, Cell, CellKind, Color, Direction, DoorState};
pub use world::{Observation, StepOutcome, World, GOAL_REWARD, LAVA_REWARD, STEP_PENALTY};
pub use wrappers::{BearingMode, FourDirections, GoalBearing};
