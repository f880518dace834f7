use async_trait::async_trait;
use gridworld_core::{
    make_snapshot, register_environment_with_config, EngineError, Environment, Observation, ReproducibleEngine, Snapshot,
    ToolCall,
};
use gridworld_rs::wrappers::coords;
use gridworld_rs::{
    Action, BearingMode, Cell, Direction, FourDirections, GoalBearing, GridConfig, GridError, Layout, StepOutcome, World,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as Json};
use std::sync::Arc;
use tracing::{debug, warn};

/// Name the default factory is registered under.
pub const ENV_NAME: &str = "GridWorld";

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    /// Layout name or MiniGrid id (`"MiniGrid-DoorKey-8x8-v0"`,
    /// `"MiniGrid-LavaGapS5-v0"`, `"empty_5x5"`). The size named in it, or the
    /// layout's MiniGrid default, applies unless `width`/`height` are given.
    pub env_name: Option<String>,
    pub width: Option<usize>,
    pub height: Option<usize>,
    pub max_steps: Option<u32>,
    pub random_start: Option<bool>,
    /// `"angle"` or `"slope"`.
    pub bearing_mode: Option<String>,
    pub seed: Option<u64>,
}

fn make_world(cfg: &Config) -> Result<World<Layout>, EngineError> {
    let (layout, (named_w, named_h)) = match cfg.env_name.as_deref() {
        None => (Layout::default(), Layout::default().default_size()),
        Some(name) => {
            Layout::parse(name).ok_or_else(|| EngineError::Validation(format!("unsupported env_name: {name}")))?
        }
    };
    let defaults = GridConfig::default();
    let bearing_mode = match cfg.bearing_mode.as_deref() {
        None => defaults.bearing_mode,
        Some(name) => {
            BearingMode::from_name(name).ok_or_else(|| EngineError::Validation(format!("unsupported bearing_mode: {name}")))?
        }
    };
    let grid_cfg = GridConfig::new(
        cfg.width.unwrap_or(named_w),
        cfg.height.unwrap_or(named_h),
        cfg.max_steps.unwrap_or(defaults.max_steps),
    )
    .with_random_start(cfg.random_start.unwrap_or(defaults.random_start))
    .with_bearing_mode(bearing_mode);
    World::new(grid_cfg, layout).map_err(engine_error)
}

/// Caller mistakes surface as validation errors; a generator that produced
/// an unusable world is an internal error.
fn engine_error(err: GridError) -> EngineError {
    match err {
        GridError::MissingAgentPlacement | GridError::BlockedStart { .. } | GridError::NoFreeInteriorCell => {
            EngineError::Internal(err.to_string())
        }
        GridError::EpisodeFinished
        | GridError::InvalidAction(_)
        | GridError::InvalidDirection(_)
        | GridError::DegenerateGrid { .. }
        | GridError::InvalidConfig(_) => EngineError::Validation(err.to_string()),
    }
}

fn small_index(v: &Json, what: &str) -> Result<u8, EngineError> {
    v.as_u64()
        .and_then(|i| u8::try_from(i).ok())
        .ok_or_else(|| EngineError::Validation(format!("{what} must be a name or a small non-negative integer, got {v}")))
}

fn parse_action(v: &Json) -> Result<Action, EngineError> {
    match v.as_str() {
        Some(name) => Action::from_name(name).ok_or_else(|| EngineError::Validation(format!("invalid action '{name}'"))),
        None => Action::try_from(small_index(v, "action")?).map_err(engine_error),
    }
}

fn parse_direction(v: &Json) -> Result<Direction, EngineError> {
    match v.as_str() {
        Some(name) => Direction::from_name(name).ok_or_else(|| EngineError::Validation(format!("invalid direction '{name}'"))),
        None => Direction::try_from(small_index(v, "direction")?).map_err(engine_error),
    }
}

fn cell_json(cell: &Cell) -> Json {
    let [_, color, state] = cell.encode();
    json!({
        "type": format!("{:?}", cell.kind()).to_ascii_lowercase(),
        "color": color,
        "state": state,
    })
}

/// JSON numbers cannot carry infinities; a vertical bearing in slope mode is
/// reported as the string `"inf"`.
fn bearing_json(bearing: Option<f64>) -> Json {
    match bearing {
        None => Json::Null,
        Some(b) if b.is_finite() => json!(b),
        Some(b) if b > 0.0 => json!("inf"),
        Some(_) => json!("-inf"),
    }
}

pub struct GridWorldEnvironment {
    world: World<Layout>,
    rng: StdRng,
    bearing: GoalBearing,
    terminated: bool,
    truncated: bool,
}

impl GridWorldEnvironment {
    pub fn new(cfg: Config) -> Result<Self, EngineError> {
        let world = make_world(&cfg)?;
        let bearing = GoalBearing::new(world.config().bearing_mode);
        let seed = cfg.seed.unwrap_or(0);
        debug!(?cfg, seed, "gridworld environment configured");
        Ok(Self { world, rng: StdRng::seed_from_u64(seed), bearing, terminated: false, truncated: false })
    }

    pub fn world(&self) -> &World<Layout> {
        &self.world
    }

    fn record(&mut self, out: &StepOutcome) {
        self.terminated = out.terminated;
        self.truncated = out.truncated;
    }

    fn interact(&mut self, args: &Json) -> Result<(), EngineError> {
        if let Some(a) = args.get("action") {
            let act = parse_action(a)?;
            let out = self.world.step(act).map_err(engine_error)?;
            self.record(&out);
        } else if let Some(arr) = args.get("actions").and_then(|v| v.as_array()) {
            let acts = arr.iter().map(parse_action).collect::<Result<Vec<_>, _>>()?;
            for act in acts {
                let out = self.world.step(act).map_err(engine_error)?;
                self.record(&out);
                if out.done {
                    break;
                }
            }
        } else {
            return Err(EngineError::Validation("missing 'action' or 'actions'".into()));
        }
        Ok(())
    }

    fn move_to(&mut self, args: &Json) -> Result<(), EngineError> {
        let v = args
            .get("direction")
            .ok_or_else(|| EngineError::Validation("missing 'direction'".into()))?;
        let dir = parse_direction(v)?;
        let mut mover = FourDirections::new(&mut self.world);
        let out = mover.step(dir).map_err(engine_error)?;
        let primitive = mover.primitive_steps();
        self.record(&out);
        debug!(?dir, primitive, "move");
        Ok(())
    }

    fn apply(&mut self, call: &ToolCall) -> Result<(), EngineError> {
        match call.tool.as_str() {
            "interact" => self.interact(&call.args),
            "move" => self.move_to(&call.args),
            other => Err(EngineError::Validation(format!("unknown tool: {other}"))),
        }
    }

    fn snapshot_obs(&mut self, event: &str) -> Observation {
        let bearing = self.bearing.observe(&self.world);
        let obs = self.world.observation();
        let (cy, cx) = coords(&obs.agent);
        let data = json!({
            "grid_array": obs.encode_grid(),
            "agent_pos": [obs.agent.pos.0, obs.agent.pos.1],
            "agent_dir": obs.agent.dir as u8,
            "carrying": obs.agent.carrying.as_ref().map(cell_json),
            "under_agent": obs.under_agent().map(cell_json),
            "coords": [cy, cx],
            "goal_bearing": bearing_json(bearing),
            "bearing_mode": self.bearing.mode(),
            "step_count": obs.step_count,
            "max_steps": obs.max_steps,
            "mission": obs.mission,
            "episode": self.world.episode(),
            "terminated": self.terminated,
            "truncated": self.truncated,
            "reward_last": self.world.last_reward(),
            "total_reward": self.world.total_reward(),
            "event": event,
        });
        Observation { terminated: self.terminated, truncated: self.truncated, data }
    }
}

impl ReproducibleEngine for GridWorldEnvironment {
    fn serialize_engine(&self) -> Result<Json, EngineError> {
        let obs = self.world.observation();
        let config = serde_json::to_value(self.world.config()).map_err(|e| EngineError::Internal(e.to_string()))?;
        Ok(json!({
            "config": config,
            "grid_array": obs.encode_grid(),
            "agent_pos": [obs.agent.pos.0, obs.agent.pos.1],
            "agent_dir": obs.agent.dir as u8,
            "carrying": obs.agent.carrying.as_ref().map(cell_json),
            "step_count": obs.step_count,
            "max_steps": obs.max_steps,
            "done": obs.done,
            "mission": obs.mission,
            "episode": self.world.episode(),
            "total_reward": self.world.total_reward(),
        }))
    }

    fn engine_name(&self) -> String {
        "gridworld".into()
    }
}

#[async_trait]
impl Environment for GridWorldEnvironment {
    /// Starts a new episode; calling it again re-rolls the world.
    async fn initialize(&mut self) -> Result<Observation, EngineError> {
        self.world.reset(&mut self.rng).map_err(engine_error)?;
        self.terminated = false;
        self.truncated = false;
        debug!(episode = self.world.episode(), pos = ?self.world.agent().pos, "initialize");
        Ok(self.snapshot_obs("initialize"))
    }

    /// Applies the calls in order and stops once the episode ends. Calls
    /// applied before a failing one keep their effect.
    async fn step(&mut self, tool_calls: Vec<ToolCall>) -> Result<Observation, EngineError> {
        if tool_calls.is_empty() {
            warn!("step without tool calls");
            return Err(EngineError::Validation("no tool_calls".into()));
        }
        for call in &tool_calls {
            if let Err(err) = self.apply(call) {
                warn!(tool = %call.tool, args = %call.args, %err, "tool call rejected");
                return Err(err);
            }
            if self.world.is_done() {
                break;
            }
        }
        Ok(self.snapshot_obs("step"))
    }

    async fn terminate(&mut self) -> Result<Observation, EngineError> {
        Ok(self.snapshot_obs("terminate"))
    }

    async fn checkpoint(&self) -> Result<Snapshot, EngineError> {
        make_snapshot(self, 1)
    }
}

pub fn register_default_env() {
    register_environment_with_config(
        ENV_NAME,
        Arc::new(|cfg| {
            let cfg: Config = match cfg {
                Some(v) => serde_json::from_value(v).map_err(|e| EngineError::Validation(format!("bad config: {e}")))?,
                None => Config::default(),
            };
            Ok(Box::new(GridWorldEnvironment::new(cfg)?))
        }),
    );
}
