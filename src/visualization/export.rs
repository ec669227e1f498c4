use std::io::Write;
use std::path::Path;

use crate::metrics::EpisodeLog;
use super::text_plots::AVERAGE_WINDOW;

/// Write `episode,duration,moving_average` rows for external plotting tools.
pub fn write_durations_csv(log: &EpisodeLog, path: &Path) -> std::io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    let averages = log.moving_average(AVERAGE_WINDOW);

    writeln!(file, "episode,duration,moving_average")?;
    for (i, &duration) in log.durations().iter().enumerate() {
        match averages.get(i) {
            Some(avg) => writeln!(file, "{},{},{:.3}", i, duration, avg)?,
            None => writeln!(file, "{},{},", i, duration)?,
        }
    }

    Ok(())
}
