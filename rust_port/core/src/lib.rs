//! Environment contract shared by the grid-world crates.
//! Tool calls in, JSON observations out; snapshots for checkpointing; a
//! config-aware registry so callers can build environments by name.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

/// Canonical tool call: tool name and JSON-serializable arguments.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    pub tool: String,
    #[serde(default)]
    pub args: Json,
}

impl ToolCall {
    pub fn new(tool: impl Into<String>, args: Json) -> Self {
        Self { tool: tool.into(), args }
    }
}

/// Observation contract. `terminated` covers goal/lava endings, `truncated`
/// the step budget; everything else lives in `data`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Observation {
    pub terminated: bool,
    pub truncated: bool,
    #[serde(default)]
    pub data: Json,
}

impl Observation {
    pub fn done(&self) -> bool {
        self.terminated || self.truncated
    }
}

/// Snapshot contract for checkpoint/restore.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    pub version: u32,
    pub engine: String,
    pub data: Json,
}

/// Environment-level errors. Caller misuse is `Validation`; a broken world
/// generator surfaces as `Internal`.
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("internal error: {0}")]
    Internal(String),
}

#[async_trait]
pub trait Environment: Send + Sync {
    async fn initialize(&mut self) -> Result<Observation, EngineError>;
    async fn step(&mut self, tool_calls: Vec<ToolCall>) -> Result<Observation, EngineError>;
    async fn checkpoint(&self) -> Result<Snapshot, EngineError>;
    async fn terminate(&mut self) -> Result<Observation, EngineError>;
}

// ---------------------------------
// Environment factory + registry
// ---------------------------------

/// Config-aware factory for constructing environment instances.
pub type EnvConfigFactory = Arc<dyn Fn(Option<Json>) -> Result<Box<dyn Environment>, EngineError> + Send + Sync + 'static>;

static ENV_REGISTRY: OnceLock<Mutex<HashMap<String, EnvConfigFactory>>> = OnceLock::new();

fn registry() -> &'static Mutex<HashMap<String, EnvConfigFactory>> {
    ENV_REGISTRY.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Register a config-aware environment factory under a unique name.
/// Overwrites any existing entry.
pub fn register_environment_with_config(name: &str, factory: EnvConfigFactory) {
    let mut reg = registry().lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    reg.insert(name.to_string(), factory);
}

/// Instantiate a registered environment by name with optional JSON config.
pub fn create_environment_with_config(name: &str, config: Option<Json>) -> Result<Box<dyn Environment>, EngineError> {
    let factory = {
        let reg = registry()
            .lock()
            .map_err(|_| EngineError::Internal("env registry poisoned".into()))?;
        reg.get(name)
            .cloned()
            .ok_or_else(|| EngineError::NotFound(format!("unsupported environment: {name}")))?
    };
    factory(config)
}

pub fn create_environment(name: &str) -> Result<Box<dyn Environment>, EngineError> {
    create_environment_with_config(name, None)
}

pub fn list_environments() -> Vec<String> {
    registry()
        .lock()
        .map(|reg| {
            let mut names: Vec<String> = reg.keys().cloned().collect();
            names.sort();
            names
        })
        .unwrap_or_default()
}

// -----------------------
// Reproducibility traits
// -----------------------

/// Engines that can serialize their full state.
pub trait ReproducibleEngine {
    fn serialize_engine(&self) -> Result<Json, EngineError>;
    fn engine_name(&self) -> String;
}

pub fn make_snapshot(engine: &dyn ReproducibleEngine, version: u32) -> Result<Snapshot, EngineError> {
    let data = engine.serialize_engine()?;
    Ok(Snapshot { version, engine: engine.engine_name(), data })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NopEnv;
    #[async_trait]
    impl Environment for NopEnv {
        async fn initialize(&mut self) -> Result<Observation, EngineError> { Ok(Observation { terminated: false, truncated: false, data: Json::Null }) }
        async fn step(&mut self, _tool_calls: Vec<ToolCall>) -> Result<Observation, EngineError> { Ok(Observation { terminated: false, truncated: false, data: Json::Null }) }
        async fn checkpoint(&self) -> Result<Snapshot, EngineError> { Ok(Snapshot { version: 1, engine: "nop".into(), data: Json::Null }) }
        async fn terminate(&mut self) -> Result<Observation, EngineError> { Ok(Observation { terminated: true, truncated: false, data: Json::Null }) }
    }

    struct Counter(u32);
    impl ReproducibleEngine for Counter {
        fn serialize_engine(&self) -> Result<Json, EngineError> { Ok(serde_json::json!({ "count": self.0 })) }
        fn engine_name(&self) -> String { "counter".into() }
    }

    #[test]
    fn env_registry_registers_and_lists() {
        register_environment_with_config("nop", Arc::new(|_cfg| Ok(Box::new(NopEnv) as Box<dyn Environment>)));
        assert!(list_environments().contains(&"nop".to_string()));
        assert!(create_environment("nop").is_ok());
    }

    #[test]
    fn unknown_environment_is_not_found() {
        assert!(matches!(create_environment("no-such-env"), Err(EngineError::NotFound(_))));
    }

    #[test]
    fn snapshot_wraps_engine_state() {
        let snap = make_snapshot(&Counter(3), 2).unwrap();
        assert_eq!(snap.version, 2);
        assert_eq!(snap.engine, "counter");
        assert_eq!(snap.data["count"], 3);
    }

    #[tokio::test]
    async fn nop_env_runs_through_trait_object() {
        let mut env: Box<dyn Environment> = Box::new(NopEnv);
        assert!(!env.initialize().await.unwrap().done());
        assert!(env.terminate().await.unwrap().done());
    }
}
