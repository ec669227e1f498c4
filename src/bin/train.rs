use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use polecart::agent::DqnAgentBuilder;
use polecart::checkpoint::CheckpointManager;
use polecart::config::TrainConfig;
use polecart::env::{CartPole, Environment, ScreenPreprocessor};
use polecart::metrics::EpisodeLog;
use polecart::replay_buffer::ReplayBuffer;
use polecart::trainer::{Trainer, TrainerConfig};

/// Train a DQN agent to balance a pole from rendered frames.
#[derive(Parser)]
#[command(name = "polecart-train", about = "Train a DQN agent on cart-pole")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, default_value = "polecart.toml")]
    config: PathBuf,

    /// Override the episode index at which training stops
    #[arg(long)]
    episodes: Option<usize>,

    /// Override the first episode index (when resuming)
    #[arg(long)]
    start_episode: Option<usize>,

    /// Pretrained parameter snapshot to start from
    #[arg(long)]
    load_path: Option<PathBuf>,

    /// Episode duration log of a previous run to continue
    #[arg(long)]
    durations: Option<PathBuf>,

    /// Seed for every random source of the run
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .init();

    let cli = Cli::parse();

    let mut config = TrainConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    if let Some(episodes) = cli.episodes {
        config.num_episodes = episodes;
    }
    if let Some(start) = cli.start_episode {
        config.start_episode = start;
    }
    if cli.load_path.is_some() {
        config.load_path = cli.load_path;
    }
    if cli.durations.is_some() {
        config.durations_path = cli.durations;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    config.validate().context("invalid configuration")?;

    let mut env = match config.seed {
        Some(seed) => CartPole::with_seed(seed),
        None => CartPole::new(),
    };
    let mut preprocessor = ScreenPreprocessor::new(config.frame_height, config.frame_width);

    let mut builder = DqnAgentBuilder::new(config.observation_shape(), env.num_actions())
        .hidden_layers(&config.hidden_layers)
        .gamma(config.gamma)
        .learning_rate(config.learning_rate)
        .optimizer(config.optimizer)
        .grad_clip(config.grad_clip_limit())
        .huber_delta(config.huber_delta)
        .action_network(config.action_network);
    if let Some(seed) = config.seed {
        builder = builder.seed(seed);
    }
    let mut agent = builder.build().context("building agent")?;

    if let Some(path) = &config.load_path {
        let snapshot = CheckpointManager::load_parameters(path)
            .with_context(|| format!("loading parameters from {}", path.display()))?;
        agent.load_parameters(&snapshot).context("applying pretrained parameters")?;
        info!("Loaded pretrained parameters from {}", path.display());
    }

    let mut log = match &config.durations_path {
        Some(path) => {
            let log = CheckpointManager::load_durations(path)
                .with_context(|| format!("loading episode durations from {}", path.display()))?;
            info!("Continuing duration log with {} episodes", log.len());
            log
        }
        None => EpisodeLog::new(),
    };

    let mut buffer = match config.seed {
        Some(seed) => ReplayBuffer::with_seed(config.replay_capacity, seed),
        None => ReplayBuffer::new(config.replay_capacity),
    }
    .context("creating replay buffer")?;
    let mut persistence = CheckpointManager::new(&config.model_dir, &config.figure_dir);

    let mut trainer = Trainer::new(TrainerConfig::from(&config));
    let summary = trainer
        .train(&mut env, &mut preprocessor, &mut agent, &mut buffer, &mut log, &mut persistence)
        .context("training aborted")?;

    info!(
        "Done: {} episodes, {} learning steps, {} target syncs, {} failed saves",
        summary.episodes, summary.learning_steps, summary.target_syncs, summary.failed_saves
    );
    Ok(())
}
