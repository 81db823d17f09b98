//! Measurement plot rendering with egui_plot
//!
//! The series is drawn as value over elapsed seconds. Gap markers split the
//! series into separate line segments, so nothing is interpolated across a
//! stop.
//!
//! # Main Types
//!
//! - [`SeriesPlot`] - Plot configuration and rendering
//! - [`PlotStatistics`] - Summary of the readings shown
//! - [`split_segments`] - Turns buffer entries into continuous line segments

use egui::{Color32, Ui};
use egui_plot::{Corner, Legend, Line, Plot, PlotPoints, Points};

use crate::config::UiConfig;
use crate::types::SeriesEntry;

/// Series colour
const SERIES_COLOR: Color32 = Color32::from_rgb(80, 170, 255);

/// Split series entries into line segments at every gap marker
///
/// Each segment is a list of `[elapsed_secs, value]` points. Empty segments
/// (two gaps in a row, a gap at the start) are not emitted.
pub fn split_segments(entries: &[SeriesEntry]) -> Vec<Vec<[f64; 2]>> {
    let mut segments = Vec::new();
    let mut current = Vec::new();

    for entry in entries {
        match entry {
            SeriesEntry::Reading(r) => current.push([r.elapsed.as_secs_f64(), r.value]),
            SeriesEntry::Gap(_) => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

/// Plot view configuration and state
#[derive(Debug, Clone)]
pub struct SeriesPlot {
    /// Line width of the series
    pub line_width: f32,
    /// Draw a marker at every reading
    pub show_markers: bool,
    /// Marker radius
    pub marker_radius: f32,
    /// Whether to show grid lines
    pub show_grid: bool,
    /// Keep the newest readings in view
    pub follow_latest: bool,
    /// Label of the series in the legend
    pub series_name: String,
}

impl Default for SeriesPlot {
    fn default() -> Self {
        Self {
            line_width: 1.5,
            show_markers: true,
            marker_radius: 2.0,
            show_grid: true,
            follow_latest: true,
            series_name: "Measurement (mm)".to_string(),
        }
    }
}

impl SeriesPlot {
    /// Create a plot from UI configuration
    pub fn from_config(config: &UiConfig, device_name: &str) -> Self {
        Self {
            line_width: config.line_width,
            show_markers: config.show_markers,
            series_name: format!("{} (mm)", device_name),
            ..Default::default()
        }
    }

    /// Render the series
    pub fn render(&mut self, ui: &mut Ui, entries: &[SeriesEntry]) {
        let plot = Plot::new("measurement_plot")
            .show_axes(true)
            .show_grid(self.show_grid)
            .x_axis_label("Elapsed (s)")
            .y_axis_label("Value (mm)")
            .auto_bounds([self.follow_latest, self.follow_latest])
            .legend(Legend::default().position(Corner::RightTop));

        let segments = split_segments(entries);

        let response = plot.show(ui, |plot_ui| {
            for points in segments {
                if self.show_markers {
                    plot_ui.points(
                        Points::new(&self.series_name, PlotPoints::from(points.clone()))
                            .radius(self.marker_radius)
                            .color(SERIES_COLOR),
                    );
                }
                plot_ui.line(
                    Line::new(&self.series_name, PlotPoints::from(points))
                        .color(SERIES_COLOR)
                        .width(self.line_width),
                );
            }
        });

        // Panning or zooming by hand stops following the newest readings
        if response.response.dragged() {
            self.follow_latest = false;
        }
    }

    /// Follow the newest readings again
    pub fn reset_view(&mut self) {
        self.follow_latest = true;
    }
}

/// Summary of the readings in a series
///
/// Kept as a running summary (Welford) so the UI can fold in new entries as
/// they arrive instead of rescanning the whole session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlotStatistics {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
    pub count: usize,
    /// Sum of squared deviations from the mean
    m2: f64,
}

impl PlotStatistics {
    /// Calculate statistics over every reading (gaps are skipped)
    pub fn from_entries(entries: &[SeriesEntry]) -> Self {
        let mut stats = Self::default();
        stats.extend(entries);
        stats
    }

    /// Fold newly arrived entries into the summary
    pub fn extend(&mut self, entries: &[SeriesEntry]) {
        for reading in entries.iter().filter_map(SeriesEntry::as_reading) {
            self.push(reading.value);
        }
    }

    fn push(&mut self, value: f64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }

        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
        self.std_dev = (self.m2 / self.count as f64).sqrt();
    }

    /// Peak-to-peak range
    pub fn peak_to_peak(&self) -> f64 {
        self.max - self.min
    }

    /// Whether any reading contributed
    pub fn is_valid(&self) -> bool {
        self.count > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GapMarker, Reading};
    use chrono::Local;
    use proptest::prelude::*;
    use std::time::Duration;

    fn reading(secs: f64, value: f64) -> SeriesEntry {
        SeriesEntry::Reading(Reading::new(
            value,
            Local::now(),
            Duration::from_secs_f64(secs),
        ))
    }

    fn gap(secs: f64) -> SeriesEntry {
        SeriesEntry::Gap(GapMarker {
            elapsed: Duration::from_secs_f64(secs),
        })
    }

    #[test]
    fn test_gap_splits_series() {
        let entries = vec![
            reading(1.0, 10.0),
            reading(2.0, 10.1),
            gap(2.5),
            reading(5.0, 10.2),
        ];
        let segments = split_segments(&entries);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0], vec![[1.0, 10.0], [2.0, 10.1]]);
        assert_eq!(segments[1], vec![[5.0, 10.2]]);
    }

    #[test]
    fn test_leading_and_repeated_gaps_produce_no_empty_segments() {
        let entries = vec![gap(0.0), gap(1.0), reading(2.0, 1.0), gap(3.0)];
        let segments = split_segments(&entries);
        assert_eq!(segments, vec![vec![[2.0, 1.0]]]);
        assert!(split_segments(&[]).is_empty());
    }

    #[test]
    fn test_statistics() {
        let entries = vec![reading(0.0, 1.0), gap(0.5), reading(1.0, 3.0)];
        let stats = PlotStatistics::from_entries(&entries);
        assert_eq!(stats.count, 2);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 3.0);
        assert_eq!(stats.mean, 2.0);
        assert_eq!(stats.std_dev, 1.0);
        assert_eq!(stats.peak_to_peak(), 2.0);
        assert!(!PlotStatistics::from_entries(&[]).is_valid());
    }

    #[test]
    fn test_statistics_extend_matches_full_scan() {
        let entries: Vec<SeriesEntry> = (0..200)
            .map(|i| {
                if i % 17 == 0 {
                    gap(i as f64)
                } else {
                    reading(i as f64, (i as f64 * 0.37).sin() * 5.0 + 10.0)
                }
            })
            .collect();

        let mut incremental = PlotStatistics::default();
        for chunk in entries.chunks(7) {
            incremental.extend(chunk);
        }
        let full = PlotStatistics::from_entries(&entries);

        assert_eq!(incremental.count, full.count);
        assert_eq!(incremental.min, full.min);
        assert_eq!(incremental.max, full.max);
        assert!((incremental.mean - full.mean).abs() < 1e-12);
        assert!((incremental.std_dev - full.std_dev).abs() < 1e-12);

        // Reference values computed the two-pass way
        let values: Vec<f64> = entries
            .iter()
            .filter_map(SeriesEntry::as_reading)
            .map(|r| r.value)
            .collect();
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
        assert!((full.mean - mean).abs() < 1e-9);
        assert!((full.std_dev - var.sqrt()).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn prop_segments_keep_every_reading(pattern in proptest::collection::vec(any::<bool>(), 0..64)) {
            let entries: Vec<SeriesEntry> = pattern
                .iter()
                .enumerate()
                .map(|(i, is_gap)| if *is_gap { gap(i as f64) } else { reading(i as f64, i as f64) })
                .collect();

            let segments = split_segments(&entries);
            let readings = pattern.iter().filter(|g| !**g).count();
            let gaps_between = entries
                .windows(2)
                .filter(|w| !w[0].is_gap() && w[1].is_gap())
                .count();

            prop_assert_eq!(segments.iter().map(Vec::len).sum::<usize>(), readings);
            prop_assert!(segments.iter().all(|s| !s.is_empty()));
            if readings > 0 {
                let trailing = usize::from(!entries.last().map(SeriesEntry::is_gap).unwrap_or(true));
                prop_assert_eq!(segments.len(), gaps_between + trailing);
            }
        }
    }
}
