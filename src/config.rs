use std::path::{Path, PathBuf};

use serde::{Serialize, Deserialize};
use tracing::warn;

use crate::agent::{ActionNetwork, EpsilonSchedule, OptimizerKind};
use crate::error::{DqnError, Result};
use crate::observation::ObservationShape;

/// Shape of the exploration-rate decay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DecayShape {
    #[default]
    Linear,
    Exponential,
}

/// Every recognized training option, loadable from TOML. Missing keys take
/// their default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    /// First episode index; non-zero when resuming a run.
    pub start_episode: usize,
    /// Episode index at which training stops (exclusive).
    pub num_episodes: usize,
    pub max_steps_per_episode: usize,

    pub replay_capacity: usize,
    pub batch_size: usize,
    pub gamma: f32,
    pub learning_rate: f32,
    pub optimizer: OptimizerKind,
    /// Component-wise gradient bound; `0` disables clipping.
    pub grad_clip: f32,
    pub huber_delta: f32,
    pub hidden_layers: Vec<usize>,

    pub max_eps: f32,
    pub min_eps: f32,
    pub epsilon_decay: DecayShape,
    /// Decay constant of the exponential schedule, in episodes.
    pub eps_decay_episodes: f32,

    pub target_update_every: usize,
    pub save_every: usize,
    pub action_network: ActionNetwork,

    /// Replace the reward of episode-ending steps with `terminal_reward`.
    pub override_terminal_reward: bool,
    pub terminal_reward: f32,

    pub frame_stack: usize,
    pub frame_height: usize,
    pub frame_width: usize,

    pub model_dir: PathBuf,
    pub figure_dir: PathBuf,
    /// Pretrained parameter snapshot to start from.
    pub load_path: Option<PathBuf>,
    /// Episode duration log of a previous run to continue.
    pub durations_path: Option<PathBuf>,
    pub seed: Option<u64>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            start_episode: 0,
            num_episodes: 5000,
            max_steps_per_episode: 500,
            replay_capacity: 10_000,
            batch_size: 128,
            gamma: 0.98,
            learning_rate: 1e-3,
            optimizer: OptimizerKind::Adam,
            grad_clip: 1.0,
            huber_delta: 1.0,
            hidden_layers: vec![256],
            max_eps: 0.5,
            min_eps: 0.1,
            epsilon_decay: DecayShape::Linear,
            eps_decay_episodes: 50.0,
            target_update_every: 5,
            save_every: 100,
            action_network: ActionNetwork::Policy,
            override_terminal_reward: true,
            terminal_reward: -1.0,
            frame_stack: 4,
            frame_height: 40,
            frame_width: 80,
            model_dir: PathBuf::from("checkpoints"),
            figure_dir: PathBuf::from("figures"),
            load_path: None,
            durations_path: None,
            seed: None,
        }
    }
}

impl TrainConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DqnError::ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let config: TrainConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            warn!("config file '{}' not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<()> {
        let fail = |msg: &str| Err(DqnError::ConfigError(msg.to_string()));

        if self.num_episodes == 0 {
            return fail("num_episodes must be > 0");
        }
        if self.start_episode >= self.num_episodes {
            return fail("start_episode must be < num_episodes");
        }
        if self.max_steps_per_episode == 0 {
            return fail("max_steps_per_episode must be > 0");
        }
        if self.replay_capacity == 0 {
            return fail("replay_capacity must be > 0");
        }
        if self.batch_size == 0 {
            return fail("batch_size must be > 0");
        }
        if self.batch_size > self.replay_capacity {
            return fail("batch_size must not exceed replay_capacity");
        }
        if !(self.gamma > 0.0 && self.gamma < 1.0) {
            return fail("gamma must be in (0, 1)");
        }
        if !(self.learning_rate > 0.0) {
            return fail("learning_rate must be > 0");
        }
        if !(self.huber_delta.is_finite() && self.huber_delta > 0.0) {
            return fail("huber_delta must be finite and > 0");
        }
        if self.grad_clip < 0.0 {
            return fail("grad_clip must be >= 0");
        }
        if !(0.0..=1.0).contains(&self.min_eps) || !(0.0..=1.0).contains(&self.max_eps) {
            return fail("max_eps and min_eps must be in [0, 1]");
        }
        if self.min_eps > self.max_eps {
            return fail("min_eps must not exceed max_eps");
        }
        if self.epsilon_decay == DecayShape::Exponential && !(self.eps_decay_episodes > 0.0) {
            return fail("eps_decay_episodes must be > 0");
        }
        if self.target_update_every == 0 || self.save_every == 0 {
            return fail("target_update_every and save_every must be > 0");
        }
        if self.frame_stack == 0 || self.frame_height == 0 || self.frame_width == 0 {
            return fail("frame_stack, frame_height and frame_width must be > 0");
        }
        if self.hidden_layers.iter().any(|&h| h == 0) {
            return fail("hidden_layers must not contain zero-width layers");
        }
        Ok(())
    }

    pub fn epsilon_schedule(&self) -> EpsilonSchedule {
        match self.epsilon_decay {
            DecayShape::Linear => EpsilonSchedule::linear(self.max_eps, self.min_eps, self.num_episodes),
            DecayShape::Exponential => EpsilonSchedule::exponential(
                self.max_eps,
                self.min_eps,
                self.eps_decay_episodes,
                self.start_episode,
            ),
        }
    }

    pub fn observation_shape(&self) -> ObservationShape {
        ObservationShape::new(self.frame_stack, self.frame_height, self.frame_width)
    }

    pub fn terminal_reward_override(&self) -> Option<f32> {
        self.override_terminal_reward.then_some(self.terminal_reward)
    }

    pub fn grad_clip_limit(&self) -> Option<f32> {
        (self.grad_clip > 0.0).then_some(self.grad_clip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = TrainConfig::default();
        config.validate().unwrap();
        assert_eq!(config.observation_shape().flat_len(), 4 * 40 * 80);
        assert_eq!(config.terminal_reward_override(), Some(-1.0));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: TrainConfig = toml::from_str(
            r#"
            num_episodes = 20
            batch_size = 8
            epsilon_decay = "exponential"
            action_network = "target"
            override_terminal_reward = false
            "#,
        )
        .unwrap();
        config.validate().unwrap();
        assert_eq!(config.num_episodes, 20);
        assert_eq!(config.gamma, 0.98);
        assert_eq!(config.action_network, ActionNetwork::Target);
        assert_eq!(config.terminal_reward_override(), None);
        assert!(matches!(config.epsilon_schedule(), EpsilonSchedule::Exponential { .. }));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = TrainConfig::default();
        config.min_eps = 0.9;
        assert!(config.validate().is_err());

        let mut config = TrainConfig::default();
        config.gamma = 1.0;
        assert!(config.validate().is_err());

        let mut config = TrainConfig::default();
        config.start_episode = config.num_episodes;
        assert!(config.validate().is_err());

        for delta in [-1.0, 0.0, f32::NAN, f32::INFINITY] {
            let mut config = TrainConfig::default();
            config.huber_delta = delta;
            assert!(config.validate().is_err(), "huber_delta {} accepted", delta);
        }
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("train.toml");
        std::fs::write(&path, "num_episodes = 10\nsave_every = 2\n").unwrap();
        let config = TrainConfig::load(&path).unwrap();
        assert_eq!(config.save_every, 2);

        std::fs::write(&path, "batch_size = 0\n").unwrap();
        assert!(matches!(TrainConfig::load(&path), Err(DqnError::ConfigError(_))));
    }
}
