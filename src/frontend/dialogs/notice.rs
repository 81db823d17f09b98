//! Acknowledge-only messages: fatal setup errors and failure alerts

use egui::{Color32, RichText, Ui};

use super::{Dialog, DialogAction, DialogState, DialogWindowConfig};

/// How serious the notice is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoticeKind {
    /// Acquisition continues
    #[default]
    Warning,
    /// The session is over
    Fatal,
}

/// State for the notice dialog
#[derive(Debug, Clone, Default)]
pub struct NoticeState {
    pub kind: NoticeKind,
    pub message: String,
}

impl DialogState for NoticeState {}

impl NoticeState {
    pub fn new(kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// The notice dialog; its only action is acknowledging it
pub struct NoticeDialog;

impl Dialog for NoticeDialog {
    type State = NoticeState;
    type Action = NoticeKind;
    type Context<'a> = ();

    fn title(state: &Self::State) -> &'static str {
        match state.kind {
            NoticeKind::Warning => "Warning",
            NoticeKind::Fatal => "Error",
        }
    }

    fn window_config() -> DialogWindowConfig {
        DialogWindowConfig::centered(380.0)
    }

    fn render(state: &mut Self::State, _ctx: (), ui: &mut Ui) -> DialogAction<Self::Action> {
        let color = match state.kind {
            NoticeKind::Warning => Color32::YELLOW,
            NoticeKind::Fatal => Color32::LIGHT_RED,
        };
        ui.label(RichText::new(&state.message).color(color));
        ui.separator();

        let label = match state.kind {
            NoticeKind::Warning => "OK",
            NoticeKind::Fatal => "Exit",
        };
        if ui.button(label).clicked() {
            return DialogAction::CloseWithAction(state.kind);
        }
        DialogAction::None
    }
}
