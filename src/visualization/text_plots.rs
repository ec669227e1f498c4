use crate::metrics::EpisodeLog;

/// Window of the moving average drawn over the durations.
pub const AVERAGE_WINDOW: usize = 100;

/// Plot episode durations ('*') and their 100-episode moving average ('+')
/// as ASCII art.
pub fn plot_durations(log: &EpisodeLog, width: usize, height: usize) -> String {
    if log.is_empty() {
        return "Training...: no episodes yet\n".to_string();
    }

    let durations: Vec<f32> = log.durations().iter().map(|&d| d as f32).collect();
    let averages = log.moving_average(AVERAGE_WINDOW);

    let mut series: Vec<(&[f32], char)> = vec![(durations.as_slice(), '*')];
    if !averages.is_empty() {
        series.push((averages.as_slice(), '+'));
    }
    plot_series(&series, "Training... (x: episode, y: duration)", width, height)
}

/// Overlay several equally long series on one grid; later series draw on top.
fn plot_series(series: &[(&[f32], char)], title: &str, width: usize, height: usize) -> String {
    if series.is_empty() || series[0].0.is_empty() || width < 10 || height < 5 {
        return format!("{}: Invalid data or dimensions\n", title);
    }

    let min_val = series
        .iter()
        .flat_map(|(values, _)| values.iter().copied())
        .fold(f32::INFINITY, f32::min)
        .min(0.0);
    let max_val = series
        .iter()
        .flat_map(|(values, _)| values.iter().copied())
        .fold(f32::NEG_INFINITY, f32::max);

    if (max_val - min_val).abs() < f32::EPSILON {
        return format!("{}: All values are {:.4}\n", title, min_val);
    }

    let mut plot = vec![vec![' '; width]; height];

    // Axes
    for row in plot.iter_mut() {
        row[0] = '|';
    }
    for cell in plot[height - 1].iter_mut() {
        *cell = '-';
    }
    plot[height - 1][0] = '+';

    let len = series[0].0.len();
    let x_scale = (len.max(2) - 1) as f32 / (width - 3) as f32;
    let y_scale = (height - 3) as f32 / (max_val - min_val);

    for (values, marker) in series {
        for (i, &value) in values.iter().enumerate() {
            let x = ((i as f32 / x_scale) as usize + 2).min(width - 1);
            let level = ((value - min_val) * y_scale) as usize;
            let y = (height - 3).saturating_sub(level).min(height - 2);
            plot[y][x] = *marker;
        }
    }

    let mut output = format!("{}\n", title);
    output.push_str(&format!("Max: {:.1}\n", max_val));
    for row in plot.iter() {
        output.push_str(&row.iter().collect::<String>());
        output.push('\n');
    }
    output.push_str(&format!("Min: {:.1}\n", min_val));
    output.push_str(&format!("Episodes: {}\n", len));

    output
}
