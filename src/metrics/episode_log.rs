use serde::{Serialize, Deserialize};

/// Append-only record of episode durations (steps survived), kept across
/// resumed runs. Used for monitoring only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EpisodeLog {
    durations: Vec<usize>,
}

impl EpisodeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_durations(durations: Vec<usize>) -> Self {
        EpisodeLog { durations }
    }

    pub fn push(&mut self, duration: usize) {
        self.durations.push(duration);
    }

    pub fn durations(&self) -> &[usize] {
        &self.durations
    }

    pub fn len(&self) -> usize {
        self.durations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.durations.is_empty()
    }

    /// Mean over each trailing `window` of episodes, aligned with the log.
    /// The first `window - 1` entries have no full window and are reported
    /// as zero; the result is empty while the log is shorter than `window`.
    pub fn moving_average(&self, window: usize) -> Vec<f32> {
        if window == 0 || self.durations.len() < window {
            return Vec::new();
        }

        let mut averages = vec![0.0; window - 1];
        let mut sum: usize = self.durations[..window].iter().sum();
        averages.push(sum as f32 / window as f32);
        for i in window..self.durations.len() {
            sum = sum + self.durations[i] - self.durations[i - window];
            averages.push(sum as f32 / window as f32);
        }
        averages
    }
}
