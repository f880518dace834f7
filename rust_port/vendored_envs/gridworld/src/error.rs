/// Contract violations raised by the engine. None of these are retryable:
/// the offending call leaves the world untouched and the caller has to fix
/// its inputs (or `reset`) before continuing.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("no episode in progress (finished or never reset); call reset before stepping")]
    EpisodeFinished,
    #[error("invalid action index {0} (expected 0..6)")]
    InvalidAction(u8),
    #[error("invalid direction index {0} (expected 0..3)")]
    InvalidDirection(u8),
    #[error("world generator did not set the agent position and direction")]
    MissingAgentPlacement,
    #[error("agent start ({x}, {y}) is on a cell it cannot occupy")]
    BlockedStart { x: i32, y: i32 },
    #[error("grid {width}x{height} has no interior for random placement")]
    DegenerateGrid { width: usize, height: usize },
    #[error("no empty interior cell available for random placement")]
    NoFreeInteriorCell,
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}
