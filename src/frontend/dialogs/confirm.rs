//! Yes/no question from the worker (e.g. "try again?")

use egui::Ui;

use super::{Dialog, DialogAction, DialogState, DialogWindowConfig};

/// State for the confirmation dialog
#[derive(Debug, Clone, Default)]
pub struct ConfirmState {
    /// Question shown to the operator
    pub message: String,
}

impl DialogState for ConfirmState {}

/// Answer from the confirmation dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    Yes,
    No,
}

/// The confirmation dialog
pub struct ConfirmDialog;

impl Dialog for ConfirmDialog {
    type State = ConfirmState;
    type Action = ConfirmAction;
    type Context<'a> = ();

    fn title(_state: &Self::State) -> &'static str {
        "Confirm"
    }

    fn window_config() -> DialogWindowConfig {
        DialogWindowConfig::centered(360.0)
    }

    fn render(state: &mut Self::State, _ctx: (), ui: &mut Ui) -> DialogAction<Self::Action> {
        ui.label(&state.message);
        ui.separator();

        ui.horizontal(|ui| {
            if ui.button("Retry").clicked() {
                return DialogAction::CloseWithAction(ConfirmAction::Yes);
            }
            if ui.button("Quit").clicked() {
                return DialogAction::CloseWithAction(ConfirmAction::No);
            }
            DialogAction::None
        })
        .inner
    }
}
