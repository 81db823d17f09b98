//! Polling interval entry
//!
//! A text field pre-filled with the default interval. OK parses the input and
//! checks it against the prompt bounds; Cancel answers with no value. Zero or
//! negative values are left to the worker, which asks whether to retry.

use egui::{Key, Ui};

use super::{Dialog, DialogAction, DialogState, DialogWindowConfig};

/// State of the interval prompt
#[derive(Debug, Clone, Default)]
pub struct IntervalPromptState {
    /// Text in the input field
    pub input: String,
    /// Smallest value the prompt accepts
    pub min: f64,
    /// Largest value the prompt accepts
    pub max: f64,
    /// Inline validation message
    pub error: Option<String>,
}

impl DialogState for IntervalPromptState {}

impl IntervalPromptState {
    /// State for a new prompt
    pub fn new(default: f64, min: f64, max: f64) -> Self {
        Self {
            input: format!("{}", default),
            min,
            max,
            error: None,
        }
    }

    /// Parse the input
    ///
    /// Values at or below zero are passed through so the worker can reject
    /// them; otherwise the value must lie within `[min, max]`.
    pub fn parse(&self) -> Result<f64, String> {
        let value: f64 = self
            .input
            .trim()
            .parse()
            .map_err(|_| format!("'{}' is not a number", self.input.trim()))?;

        if !value.is_finite() {
            return Err("Enter a finite number".to_string());
        }
        if value > 0.0 && !(self.min..=self.max).contains(&value) {
            return Err(format!(
                "Enter a value between {} and {} seconds",
                self.min, self.max
            ));
        }
        Ok(value)
    }
}

/// Answer from the interval prompt
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IntervalPromptAction {
    /// The operator entered a number
    Submit(f64),
    /// The operator cancelled
    Cancel,
}

/// The interval prompt dialog
pub struct IntervalPromptDialog;

impl Dialog for IntervalPromptDialog {
    type State = IntervalPromptState;
    type Action = IntervalPromptAction;
    type Context<'a> = ();

    fn title(_state: &Self::State) -> &'static str {
        "Polling Interval"
    }

    fn window_config() -> DialogWindowConfig {
        DialogWindowConfig::centered(320.0)
    }

    fn render(state: &mut Self::State, _ctx: (), ui: &mut Ui) -> DialogAction<Self::Action> {
        ui.label(format!(
            "Polling interval in seconds ({} to {}):",
            state.min, state.max
        ));

        let response = ui.text_edit_singleline(&mut state.input);
        let enter = response.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter));

        if let Some(error) = &state.error {
            ui.colored_label(egui::Color32::LIGHT_RED, error);
        }

        ui.separator();

        let (ok, cancel) = ui
            .horizontal(|ui| (ui.button("OK").clicked(), ui.button("Cancel").clicked()))
            .inner;

        if cancel {
            return DialogAction::CloseWithAction(IntervalPromptAction::Cancel);
        }
        if ok || enter {
            match state.parse() {
                Ok(value) => return DialogAction::CloseWithAction(IntervalPromptAction::Submit(value)),
                Err(message) => state.error = Some(message),
            }
        }
        DialogAction::None
    }
}
