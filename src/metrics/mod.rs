pub mod episode_log;

pub use episode_log::EpisodeLog;
