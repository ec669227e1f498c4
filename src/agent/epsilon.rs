use serde::{Serialize, Deserialize};

/// Exploration-rate schedule, evaluated once per episode.
///
/// Whatever the variant, the value is clamped into `[min_eps, max_eps]` and
/// never increases with the episode index.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum EpsilonSchedule {
    /// `min + (max - min) * exp(-(episode - start_episode) / decay)`
    Exponential {
        max_eps: f32,
        min_eps: f32,
        decay: f32,
        start_episode: usize,
    },

    /// `max - (max - min) * episode / total_episodes`
    Linear {
        max_eps: f32,
        min_eps: f32,
        total_episodes: usize,
    },
}

impl EpsilonSchedule {
    pub fn exponential(max_eps: f32, min_eps: f32, decay: f32, start_episode: usize) -> Self {
        EpsilonSchedule::Exponential { max_eps, min_eps, decay, start_episode }
    }

    pub fn linear(max_eps: f32, min_eps: f32, total_episodes: usize) -> Self {
        EpsilonSchedule::Linear { max_eps, min_eps, total_episodes }
    }

    /// Exploration rate for `episode`.
    pub fn value(&self, episode: usize) -> f32 {
        let (max_eps, min_eps) = self.bounds();

        let eps = match self {
            EpsilonSchedule::Exponential { decay, start_episode, .. } => {
                let k = episode.saturating_sub(*start_episode) as f32;
                min_eps + (max_eps - min_eps) * (-k / decay.max(f32::MIN_POSITIVE)).exp()
            }

            EpsilonSchedule::Linear { total_episodes, .. } => {
                let progress = (episode as f32 / (*total_episodes).max(1) as f32).min(1.0);
                max_eps - (max_eps - min_eps) * progress
            }
        };

        eps.max(min_eps).min(max_eps)
    }

    /// `(max_eps, min_eps)`
    pub fn bounds(&self) -> (f32, f32) {
        match self {
            EpsilonSchedule::Exponential { max_eps, min_eps, .. }
            | EpsilonSchedule::Linear { max_eps, min_eps, .. } => (*max_eps, *min_eps),
        }
    }
}
