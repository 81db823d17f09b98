//! Frontend module for the egui UI
//!
//! The frontend is the presentation layer. It never touches the session:
//! it mirrors the series from [`AcquisitionMessage::Entries`] updates, sends
//! Start/Stop commands, and answers the worker's prompts with dialogs.
//!
//! # Main Types
//!
//! - [`CaliperApp`] - Main application state implementing [`eframe::App`]
//! - [`SeriesPlot`] - Plot configuration and rendering
//!
//! # Submodules
//!
//! - `dialogs` - Interval prompt, retry confirmation, notices
//! - `plot` - Plot rendering with egui_plot
//! - `toolbar` / `status_bar` - Top and bottom panels

pub mod dialogs;
pub mod plot;
pub mod status_bar;
pub mod toolbar;

pub use plot::{split_segments, PlotStatistics, SeriesPlot};

use std::path::PathBuf;
use std::time::Duration;

use dialogs::{
    show_dialog, show_dialog_with_title, ConfirmAction, ConfirmDialog, ConfirmState,
    IntervalPromptAction, IntervalPromptDialog, IntervalPromptState, NoticeDialog, NoticeKind,
    NoticeState,
};
use status_bar::{render_status_bar, StatusBarContext};
use toolbar::{render_toolbar, ToolbarAction, ToolbarContext};

use crate::acquisition::{
    AcquisitionMessage, AcquisitionStats, FrontendHandle, PromptReply, SessionOutcome,
};
use crate::config::AppConfig;
use crate::types::{AcquisitionState, SeriesEntry};

/// How often the UI polls the worker channel when nothing else happens
const REPAINT_INTERVAL: Duration = Duration::from_millis(100);

/// Main application state
pub struct CaliperApp {
    frontend: FrontendHandle,
    transport_name: String,

    // === Mirror of the worker's session ===
    series: Vec<SeriesEntry>,
    series_stats: PlotStatistics,
    counter: usize,
    state: AcquisitionState,
    log_path: Option<PathBuf>,
    interval: Option<Duration>,
    stats: AcquisitionStats,
    error_count: usize,
    last_error: Option<String>,
    outcome: Option<SessionOutcome>,

    plot: SeriesPlot,

    // === Dialogs ===
    prompt_open: bool,
    prompt_title: String,
    prompt_state: IntervalPromptState,
    confirm_open: bool,
    confirm_title: String,
    confirm_state: ConfirmState,
    notice_open: bool,
    notice_state: NoticeState,
}

impl CaliperApp {
    /// Create the app around a running worker
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        frontend: FrontendHandle,
        config: &AppConfig,
        transport_name: String,
    ) -> Self {
        let visuals = if config.ui.dark_mode {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        };
        cc.egui_ctx.set_visuals(visuals);

        Self::with_handle(frontend, config, transport_name)
    }

    fn with_handle(frontend: FrontendHandle, config: &AppConfig, transport_name: String) -> Self {
        Self {
            frontend,
            transport_name,
            series: Vec::new(),
            series_stats: PlotStatistics::default(),
            counter: 0,
            state: AcquisitionState::Idle,
            log_path: None,
            interval: None,
            stats: AcquisitionStats::default(),
            error_count: 0,
            last_error: None,
            outcome: None,
            plot: SeriesPlot::from_config(&config.ui, &config.device.name),
            prompt_open: false,
            prompt_title: String::new(),
            prompt_state: IntervalPromptState::default(),
            confirm_open: false,
            confirm_title: String::new(),
            confirm_state: ConfirmState::default(),
            notice_open: false,
            notice_state: NoticeState::default(),
        }
    }

    /// Apply worker messages; returns true if anything arrived
    fn process_messages(&mut self) -> bool {
        let messages = self.frontend.drain();
        let had_messages = !messages.is_empty();

        for msg in messages {
            match msg {
                AcquisitionMessage::Entries(entries) => {
                    self.series_stats.extend(&entries);
                    self.series.extend(entries);
                }
                AcquisitionMessage::Counter(n) => self.counter = n,
                AcquisitionMessage::State(state) => self.state = state,
                AcquisitionMessage::Error(message) => {
                    self.error_count += 1;
                    self.last_error = Some(message);
                }
                AcquisitionMessage::FailureStreak(n) => {
                    self.show_notice(
                        NoticeKind::Warning,
                        format!(
                            "{} consecutive read failures. Check the cable and the instrument; \
                             polling continues.",
                            n
                        ),
                    );
                }
                AcquisitionMessage::SessionStarted { log_path, interval } => {
                    tracing::info!("Session started, logging to {}", log_path.display());
                    self.log_path = Some(log_path);
                    self.interval = Some(interval);
                }
                AcquisitionMessage::PromptNumber {
                    title,
                    default,
                    min,
                    max,
                } => {
                    self.prompt_title = title;
                    self.prompt_state = IntervalPromptState::new(default, min, max);
                    self.prompt_open = true;
                }
                AcquisitionMessage::Confirm { title, message } => {
                    self.confirm_title = title;
                    self.confirm_state = ConfirmState { message };
                    self.confirm_open = true;
                }
                AcquisitionMessage::Fatal(message) => {
                    self.show_notice(NoticeKind::Fatal, message);
                }
                AcquisitionMessage::Stats(stats) => self.stats = stats,
                AcquisitionMessage::Finished(outcome) => {
                    tracing::debug!("Worker finished: {:?}", outcome);
                    self.outcome = Some(outcome);
                }
            }
        }

        had_messages
    }

    fn show_notice(&mut self, kind: NoticeKind, message: String) {
        // A fatal notice is never replaced by a warning
        if self.notice_open && self.notice_state.kind == NoticeKind::Fatal {
            return;
        }
        self.notice_state = NoticeState::new(kind, message);
        self.notice_open = true;
    }

    /// Whether the window should close now
    fn should_close(&self) -> bool {
        match &self.outcome {
            // Keep the error on screen until acknowledged
            Some(SessionOutcome::Failed(_)) => !self.notice_open,
            Some(_) => true,
            None => false,
        }
    }

    fn handle_toolbar_action(&mut self, action: ToolbarAction) {
        match action {
            ToolbarAction::Start => self.frontend.start(),
            ToolbarAction::Stop => self.frontend.stop(),
            ToolbarAction::ResetView => self.plot.reset_view(),
        }
    }

    fn render_dialogs(&mut self, ctx: &egui::Context) {
        if let Some(action) = show_dialog_with_title::<IntervalPromptDialog>(
            ctx,
            &self.prompt_title,
            &mut self.prompt_open,
            &mut self.prompt_state,
            (),
        ) {
            let value = match action {
                IntervalPromptAction::Submit(v) => Some(v),
                IntervalPromptAction::Cancel => None,
            };
            self.frontend.reply(PromptReply::Number(value));
        }

        if let Some(action) = show_dialog_with_title::<ConfirmDialog>(
            ctx,
            &self.confirm_title,
            &mut self.confirm_open,
            &mut self.confirm_state,
            (),
        ) {
            self.frontend
                .reply(PromptReply::Confirm(action == ConfirmAction::Yes));
        }

        show_dialog::<NoticeDialog>(ctx, &mut self.notice_open, &mut self.notice_state, ());
    }
}

impl eframe::App for CaliperApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.process_messages() || self.state.is_running() {
            ctx.request_repaint();
        } else {
            ctx.request_repaint_after(REPAINT_INTERVAL);
        }

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            let toolbar_ctx = ToolbarContext {
                state: self.state,
                session_ready: self.log_path.is_some() && self.outcome.is_none(),
                readings: self.counter,
                last_reading: self.series.iter().rev().find_map(SeriesEntry::as_reading),
                interval: self.interval,
                log_path: self.log_path.as_deref(),
            };
            let actions = render_toolbar(ui, &toolbar_ctx);
            for action in actions {
                self.handle_toolbar_action(action);
            }
        });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            render_status_bar(
                ui,
                &StatusBarContext {
                    stats: &self.stats,
                    series: &self.series_stats,
                    error_count: self.error_count,
                    last_error: self.last_error.as_deref(),
                    transport: &self.transport_name,
                },
            );
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.plot.render(ui, &self.series);
        });

        self.render_dialogs(ctx);

        if self.should_close() {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.frontend.shutdown();
    }
}
