//! Persistence of training artifacts: policy parameter snapshots, the episode
//! duration log and rendered training curves, all keyed by the number of completed episodes.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::metrics::EpisodeLog;
use crate::network::ParameterSnapshot;
use crate::visualization::{plot_durations, write_durations_csv};

const CURVE_WIDTH: usize = 100;
const CURVE_HEIGHT: usize = 25;

/// Where the episode driver sends artifacts on its save cadence. A failing
/// call is logged by the driver and skipped; it never stops training.
pub trait Persistence {
    fn save_parameters(&mut self, episode: usize, snapshot: &ParameterSnapshot) -> Result<PathBuf>;

    fn save_durations(&mut self, episode: usize, log: &EpisodeLog) -> Result<PathBuf>;

    fn save_curve(&mut self, episode: usize, log: &EpisodeLog) -> Result<PathBuf>;
}

/// Files under two directories, keyed by completed-episode count so that a
/// run resumed from `<n>.bin` starts at episode index `n`:
///
/// - `<model_dir>/<episode>.bin`: bincode parameter snapshot
/// - `<figure_dir>/<episode>-episode_duration.json`: the duration log
/// - `<figure_dir>/<episode>-figure.txt` and `.csv`: the training curve
#[derive(Debug, Clone)]
pub struct CheckpointManager {
    model_dir: PathBuf,
    figure_dir: PathBuf,
}

impl CheckpointManager {
    pub fn new(model_dir: impl Into<PathBuf>, figure_dir: impl Into<PathBuf>) -> Self {
        CheckpointManager {
            model_dir: model_dir.into(),
            figure_dir: figure_dir.into(),
        }
    }

    pub fn parameters_path(&self, episode: usize) -> PathBuf {
        self.model_dir.join(format!("{}.bin", episode))
    }

    pub fn durations_path(&self, episode: usize) -> PathBuf {
        self.figure_dir.join(format!("{}-episode_duration.json", episode))
    }

    pub fn curve_path(&self, episode: usize) -> PathBuf {
        self.figure_dir.join(format!("{}-figure.txt", episode))
    }

    pub fn load_parameters(path: &Path) -> Result<ParameterSnapshot> {
        let data = fs::read(path)?;
        Ok(bincode::deserialize(&data)?)
    }

    pub fn load_durations(path: &Path) -> Result<EpisodeLog> {
        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }
}

impl Persistence for CheckpointManager {
    fn save_parameters(&mut self, episode: usize, snapshot: &ParameterSnapshot) -> Result<PathBuf> {
        fs::create_dir_all(&self.model_dir)?;
        let path = self.parameters_path(episode);
        fs::write(&path, bincode::serialize(snapshot)?)?;
        Ok(path)
    }

    fn save_durations(&mut self, episode: usize, log: &EpisodeLog) -> Result<PathBuf> {
        fs::create_dir_all(&self.figure_dir)?;
        let path = self.durations_path(episode);
        fs::write(&path, serde_json::to_string(log)?)?;
        Ok(path)
    }

    fn save_curve(&mut self, episode: usize, log: &EpisodeLog) -> Result<PathBuf> {
        fs::create_dir_all(&self.figure_dir)?;
        let path = self.curve_path(episode);
        fs::write(&path, plot_durations(log, CURVE_WIDTH, CURVE_HEIGHT))?;
        write_durations_csv(log, &path.with_extension("csv"))?;
        Ok(path)
    }
}
