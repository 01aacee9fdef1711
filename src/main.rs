//! Trains one DQN agent per EV and compares the result against baselines.
//!
//! Usage: cargo run --release --bin evq-train -- [--episodes 500] [--evs 2]

use anyhow::Result;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;

use evq::policy::{NearestStationPolicy, RandomPolicy};
use evq::{ChargingEnv, DqnConfig, EnvConfig, EvaluationMetrics, SessionConfig, TrainingSession};

/// Train independent DQN agents to route EVs to charging stations
#[derive(Parser, Debug)]
#[command(name = "evq-train")]
#[command(about = "Multi-agent DQN training for EV charging", long_about = None)]
struct Args {
    /// Number of training episodes
    #[arg(long, default_value_t = 500)]
    episodes: u32,

    /// Steps per episode
    #[arg(long, default_value_t = 20)]
    steps: u32,

    /// Number of EVs (one agent each)
    #[arg(long, default_value_t = 2)]
    evs: usize,

    /// Random seed
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Episodes between target network syncs
    #[arg(long, default_value_t = 10)]
    sync_every: u32,

    /// Evaluation episodes per policy after training
    #[arg(long, default_value_t = 20)]
    eval_episodes: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let env_config = EnvConfig {
        num_evs: args.evs,
        ..EnvConfig::default()
    };
    let session_config = SessionConfig {
        episodes: args.episodes,
        steps_per_episode: args.steps,
        target_sync_interval: args.sync_every,
        seed: args.seed,
        ..SessionConfig::default()
    };

    let mut session =
        TrainingSession::new(session_config, env_config.clone(), DqnConfig::default())?;
    tracing::info!(run = session.run_id(), "session created");
    session.train()?;

    let learned = session.evaluate(args.eval_episodes)?;

    let mut env = ChargingEnv::with_seed(env_config.clone(), args.seed.wrapping_add(1))?;
    let mut random = RandomPolicy::new(
        env_config.action_dim(),
        StdRng::seed_from_u64(args.seed.wrapping_add(2)),
    );
    let random =
        EvaluationMetrics::evaluate(&mut env, &mut random, args.eval_episodes, args.steps)?;
    let mut nearest = NearestStationPolicy::new(env_config);
    let nearest =
        EvaluationMetrics::evaluate(&mut env, &mut nearest, args.eval_episodes, args.steps)?;

    for metrics in [&learned, &random, &nearest] {
        tracing::info!("\n{metrics}");
    }
    Ok(())
}
