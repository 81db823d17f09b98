//! Status bar panel: read statistics and the last error.

use egui::{Color32, RichText, Ui};

use crate::acquisition::AcquisitionStats;

use super::plot::PlotStatistics;

/// Context needed to render the status bar.
pub struct StatusBarContext<'a> {
    pub stats: &'a AcquisitionStats,
    pub series: &'a PlotStatistics,
    pub error_count: usize,
    pub last_error: Option<&'a str>,
    pub transport: &'a str,
}

/// Render the status bar.
pub fn render_status_bar(ui: &mut Ui, ctx: &StatusBarContext<'_>) {
    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        ui.label(RichText::new(ctx.transport).small());

        ui.separator();

        let stats = ctx.stats;
        ui.label(RichText::new(format!("Polls: {}", stats.polls)).small());
        ui.label(RichText::new(format!("No data: {}", stats.no_data)).small());

        let error_color = if ctx.error_count > 0 {
            Color32::LIGHT_RED
        } else {
            Color32::GRAY
        };
        ui.colored_label(
            error_color,
            RichText::new(format!("Errors: {}", ctx.error_count)).small(),
        );

        ui.separator();

        ui.label(RichText::new(format!("Avg read: {:.1} ms", stats.avg_read_time_us() / 1000.0)).small());

        if ctx.series.is_valid() {
            ui.separator();
            ui.label(
                RichText::new(format!(
                    "min {:.3}  max {:.3}  mean {:.3}  σ {:.4}",
                    ctx.series.min, ctx.series.max, ctx.series.mean, ctx.series.std_dev
                ))
                .small()
                .monospace(),
            );
        }

        if let Some(error) = ctx.last_error {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.colored_label(Color32::RED, RichText::new(error).small());
            });
        }
    });
}
