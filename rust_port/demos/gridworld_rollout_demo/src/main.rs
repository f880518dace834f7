//! Seeded random rollout through the environment registry.
//!
//! Usage: `gridworld_rollout_demo [env_name] [seed] [episodes]`.
//! Set `RUST_LOG=gridworld_rs=trace` to see every primitive step.

use gridworld_core::{create_environment_with_config, list_environments, ToolCall};
use gridworld_env::{register_default_env, ENV_NAME};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let env_name = args.next().unwrap_or_else(|| "MiniGrid-DoorKey-8x8-v0".to_string());
    let seed: u64 = args.next().map(|s| s.parse()).transpose()?.unwrap_or(7);
    let episodes: u32 = args.next().map(|s| s.parse()).transpose()?.unwrap_or(3);

    register_default_env();
    info!(registered = ?list_environments(), "environments");

    let cfg = json!({ "env_name": env_name, "random_start": true, "max_steps": 200, "seed": seed });
    let mut env = create_environment_with_config(ENV_NAME, Some(cfg))?;
    let mut policy = StdRng::seed_from_u64(seed ^ 0x5eed);

    for episode in 1..=episodes {
        let mut obs = env.initialize().await?;
        info!(episode, mission = %obs.data["mission"], bearing = %obs.data["goal_bearing"], "start");
        while !obs.done() {
            // mostly absolute moves, sometimes a primitive action so doors and keys get used
            let call = if policy.gen_bool(0.7) {
                ToolCall::new("move", json!({ "direction": policy.gen_range(0..4u8) }))
            } else {
                ToolCall::new("interact", json!({ "action": policy.gen_range(0..7u8) }))
            };
            obs = env.step(vec![call]).await?;
        }
        info!(
            episode,
            steps = %obs.data["step_count"],
            terminated = obs.terminated,
            truncated = obs.truncated,
            total_reward = %obs.data["total_reward"],
            "finished"
        );
    }

    let snapshot = env.checkpoint().await?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
