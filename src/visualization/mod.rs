pub mod text_plots;
pub mod export;

pub use text_plots::plot_durations;
pub use export::write_durations_csv;
