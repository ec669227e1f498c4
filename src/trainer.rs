//! Episode driver: plays episodes against an environment, fills the replay
//! buffer, runs a learning step on every environment step and handles the
//! per-episode target sync and checkpoint cadences.

use tracing::{info, warn};

use crate::agent::{ActionNetwork, DqnAgent, EpsilonSchedule};
use crate::checkpoint::Persistence;
use crate::config::TrainConfig;
use crate::env::{Environment, FramePreprocessor};
use crate::error::{DqnError, Result};
use crate::metrics::EpisodeLog;
use crate::network::ValueEstimator;
use crate::observation::FrameStack;
use crate::replay_buffer::{ReplayBuffer, Transition};

/// Run-level settings of the episode driver.
#[derive(Debug, Clone)]
pub struct TrainerConfig {
    pub start_episode: usize,
    pub num_episodes: usize,
    pub max_steps_per_episode: usize,
    pub batch_size: usize,
    pub target_update_every: usize,
    pub save_every: usize,
    pub terminal_reward_override: Option<f32>,
    pub schedule: EpsilonSchedule,
}

impl From<&TrainConfig> for TrainerConfig {
    fn from(config: &TrainConfig) -> Self {
        TrainerConfig {
            start_episode: config.start_episode,
            num_episodes: config.num_episodes,
            max_steps_per_episode: config.max_steps_per_episode,
            batch_size: config.batch_size,
            target_update_every: config.target_update_every,
            save_every: config.save_every,
            terminal_reward_override: config.terminal_reward_override(),
            schedule: config.epsilon_schedule(),
        }
    }
}

/// What a finished run did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainSummary {
    pub episodes: usize,
    /// Environment steps across all episodes.
    pub total_steps: usize,
    pub learning_steps: usize,
    pub target_syncs: usize,
    /// Checkpoint saves that failed and were skipped.
    pub failed_saves: usize,
    pub last_loss: Option<f32>,
}

pub struct Trainer {
    config: TrainerConfig,
    global_step: usize,
}

impl Trainer {
    pub fn new(config: TrainerConfig) -> Self {
        Trainer { config, global_step: 0 }
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Environment steps taken so far by this trainer.
    pub fn global_step(&self) -> usize {
        self.global_step
    }

    /// Train from `start_episode` up to `num_episodes`. Durations are appended
    /// to `log`. Persistence failures are logged and skipped; any other error
    /// aborts the run.
    pub fn train<E, P, S>(
        &mut self,
        env: &mut E,
        preprocessor: &mut P,
        agent: &mut DqnAgent,
        buffer: &mut ReplayBuffer,
        log: &mut EpisodeLog,
        persistence: &mut S,
    ) -> Result<TrainSummary>
    where
        E: Environment + ?Sized,
        P: FramePreprocessor<E> + ?Sized,
        S: Persistence + ?Sized,
    {
        if agent.action_network == ActionNetwork::Target {
            warn!("greedy actions are taken from the target network instead of the policy network");
        }

        let shape = agent.observation_shape();
        let frame = (shape.height, shape.width);
        if preprocessor.frame_shape() != frame {
            return Err(DqnError::dimension_mismatch(
                format!("frames of {:?}", frame),
                format!("frames of {:?}", preprocessor.frame_shape()),
            ));
        }

        let mut summary = TrainSummary::default();
        let mut frames = FrameStack::new(shape);
        let mut completed = None;

        info!(
            "Training episodes {}..{} (buffer capacity {}, batch size {})",
            self.config.start_episode,
            self.config.num_episodes,
            buffer.capacity(),
            self.config.batch_size
        );

        for episode in self.config.start_episode..self.config.num_episodes {
            let eps = self.config.schedule.value(episode);

            env.reset();
            let mut state = frames.reset(preprocessor.capture(env)?)?;
            let mut duration = 0;

            for t in 0..self.config.max_steps_per_episode {
                let action = agent.act(&state, eps)?;
                let outcome = env.step(action)?;
                duration = t + 1;

                let reward = match (outcome.done, self.config.terminal_reward_override) {
                    (true, Some(terminal)) => terminal,
                    _ => outcome.reward,
                };
                let next_state = if outcome.done {
                    shape.zeros()
                } else {
                    frames.push(preprocessor.capture(env)?)?
                };

                buffer.push(Transition {
                    state,
                    action,
                    next_state: next_state.clone(),
                    reward,
                    done: outcome.done,
                });
                state = next_state;

                if let Some(report) = agent.learn(buffer, self.config.batch_size)? {
                    summary.learning_steps += 1;
                    summary.last_loss = Some(report.loss);
                }
                self.global_step += 1;
                summary.total_steps += 1;

                if outcome.done {
                    break;
                }
            }

            log.push(duration);
            summary.episodes += 1;
            completed = Some(episode + 1);
            info!("Episode {} finished after {} timesteps -- EPS: {:.4}", episode, duration, eps);

            if (episode + 1) % self.config.target_update_every == 0 {
                agent.sync_target()?;
                summary.target_syncs += 1;
                info!("Target network updated");
            }

            if (episode + 1) % self.config.save_every == 0 {
                summary.failed_saves += save_checkpoint(persistence, episode + 1, agent, log);
            }
        }

        if let Some(completed) = completed {
            if let Err(e) = persistence.save_durations(completed, log) {
                warn!("failed to save episode durations at end of run: {}", e);
                summary.failed_saves += 1;
            }
        }

        info!(
            "Training finished: {} episodes, {} steps, {} learning steps",
            summary.episodes, summary.total_steps, summary.learning_steps
        );
        Ok(summary)
    }
}

/// Save every artifact keyed by the number of completed episodes; returns
/// how many saves failed.
fn save_checkpoint<S: Persistence + ?Sized>(
    persistence: &mut S,
    completed: usize,
    agent: &DqnAgent,
    log: &EpisodeLog,
) -> usize {
    let mut failed = 0;

    match persistence.save_parameters(completed, &agent.policy().parameters()) {
        Ok(path) => info!("Saved model to {}", path.display()),
        Err(e) => {
            warn!("failed to save model after {} episodes: {}", completed, e);
            failed += 1;
        }
    }
    if let Err(e) = persistence.save_durations(completed, log) {
        warn!("failed to save episode durations after {} episodes: {}", completed, e);
        failed += 1;
    }
    if let Err(e) = persistence.save_curve(completed, log) {
        warn!("failed to save training curve after {} episodes: {}", completed, e);
        failed += 1;
    }

    failed
}
