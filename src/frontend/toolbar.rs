//! Toolbar panel: Start/Stop, state indicator and session information.

use std::path::Path;
use std::time::Duration;

use egui::{Color32, RichText, Ui};

use crate::types::{AcquisitionState, Reading};

/// Context needed to render the toolbar.
pub struct ToolbarContext<'a> {
    pub state: AcquisitionState,
    /// False until setup has finished
    pub session_ready: bool,
    pub readings: usize,
    pub last_reading: Option<&'a Reading>,
    pub interval: Option<Duration>,
    pub log_path: Option<&'a Path>,
}

/// What the operator clicked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    Start,
    Stop,
    ResetView,
}

/// Render the toolbar and return the clicked actions.
pub fn render_toolbar(ui: &mut Ui, ctx: &ToolbarContext<'_>) -> Vec<ToolbarAction> {
    let mut actions = Vec::new();

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 6.0;

        ui.add_enabled_ui(ctx.session_ready, |ui| {
            if ctx.state.is_running() {
                if ui.button("⏹ Stop").clicked() {
                    actions.push(ToolbarAction::Stop);
                }
            } else if ui.button("▶ Start").clicked() {
                actions.push(ToolbarAction::Start);
            }
        });

        let (color, text) = match ctx.state {
            AcquisitionState::Running => (Color32::GREEN, "Running"),
            AcquisitionState::Idle if ctx.session_ready => (Color32::GRAY, "Idle"),
            AcquisitionState::Idle => (Color32::YELLOW, "Setting up"),
        };
        ui.colored_label(color, "●");
        ui.label(text);

        ui.separator();

        ui.label(RichText::new(format!("Readings: {}", ctx.readings)).strong());

        ui.separator();

        let last = ctx
            .last_reading
            .map(|r| format!("{:.3} mm", r.value))
            .unwrap_or_else(|| "—".to_string());
        ui.label(format!("Last: {}", last));

        if ui.button("Reset view").clicked() {
            actions.push(ToolbarAction::ResetView);
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if let Some(path) = ctx.log_path {
                ui.label(RichText::new(path.display().to_string()).small().monospace());
                ui.label(RichText::new("Log:").small());
            }
            if let Some(interval) = ctx.interval {
                ui.label(RichText::new(format!("Every {:.3} s", interval.as_secs_f64())).small());
            }
        });
    });

    actions
}
