//! Messages between the acquisition worker and the UI thread
//!
//! - [`AcquisitionCommand`] - UI to worker (start, stop, shutdown)
//! - [`AcquisitionMessage`] - worker to UI (series updates, prompts, status)
//! - [`PromptReply`] - UI answers to prompts
//! - [`FrontendHandle`] - UI-side end of all three channels
//!
//! The worker side implements [`Presenter`] and [`Prompter`] on top of the
//! channels, so the controller and session setup never know a GUI exists.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, select, unbounded, Receiver, Sender, TrySendError};

use crate::presentation::{Presenter, Prompter};
use crate::types::{AcquisitionState, SeriesEntry};

use super::stats::AcquisitionStats;
use super::worker::SessionOutcome;

/// Capacity of the worker to UI channel
const MESSAGE_CAPACITY: usize = 1024;

/// How long the last messages of a session may wait for the UI
const FINISH_GRACE: Duration = Duration::from_secs(1);

/// Message sent from the UI to the worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionCommand {
    /// Begin polling
    Start,
    /// Stop polling and mark a gap
    Stop,
    /// End the session
    Shutdown,
}

/// Answer to a prompt message
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PromptReply {
    /// Answer to [`AcquisitionMessage::PromptNumber`]; `None` means cancelled
    Number(Option<f64>),
    /// Answer to [`AcquisitionMessage::Confirm`]
    Confirm(bool),
}

/// Message sent from the worker to the UI
#[derive(Debug, Clone)]
pub enum AcquisitionMessage {
    /// New series entries, in order
    Entries(Vec<SeriesEntry>),
    /// Readings counter
    Counter(usize),
    /// Controller state changed
    State(AcquisitionState),
    /// Non-fatal error
    Error(String),
    /// Consecutive read failures reached the alert threshold
    FailureStreak(u32),
    /// Setup finished
    SessionStarted { log_path: PathBuf, interval: Duration },
    /// Ask for a number; answer with [`PromptReply::Number`]
    PromptNumber {
        title: String,
        default: f64,
        min: f64,
        max: f64,
    },
    /// Ask a yes/no question; answer with [`PromptReply::Confirm`]
    Confirm { title: String, message: String },
    /// Setup failed
    Fatal(String),
    /// Statistics update
    Stats(AcquisitionStats),
    /// The worker has exited
    Finished(SessionOutcome),
}

/// Worker-side channel ends
pub struct WorkerChannels {
    pub commands: Receiver<AcquisitionCommand>,
    pub messages: Sender<AcquisitionMessage>,
    pub replies: Receiver<PromptReply>,
}

/// Create the channels connecting a worker and a frontend
pub fn channels() -> (WorkerChannels, FrontendHandle) {
    let (command_tx, command_rx) = unbounded();
    let (message_tx, message_rx) = bounded(MESSAGE_CAPACITY);
    let (reply_tx, reply_rx) = unbounded();

    (
        WorkerChannels {
            commands: command_rx,
            messages: message_tx,
            replies: reply_rx,
        },
        FrontendHandle {
            receiver: message_rx,
            command_sender: command_tx,
            reply_sender: reply_tx,
        },
    )
}

/// UI-side handle to the worker
#[derive(Clone)]
pub struct FrontendHandle {
    /// Messages from the worker
    pub receiver: Receiver<AcquisitionMessage>,
    /// Commands to the worker
    pub command_sender: Sender<AcquisitionCommand>,
    /// Prompt answers to the worker
    pub reply_sender: Sender<PromptReply>,
}

impl FrontendHandle {
    /// Try to receive a message without blocking
    pub fn try_recv(&self) -> Option<AcquisitionMessage> {
        self.receiver.try_recv().ok()
    }

    /// Receive all pending messages
    pub fn drain(&self) -> Vec<AcquisitionMessage> {
        self.receiver.try_iter().collect()
    }

    /// Send a command; false if the worker is gone
    pub fn send_command(&self, cmd: AcquisitionCommand) -> bool {
        self.command_sender.send(cmd).is_ok()
    }

    /// Start acquisition
    pub fn start(&self) {
        let _ = self.command_sender.send(AcquisitionCommand::Start);
    }

    /// Stop acquisition
    pub fn stop(&self) {
        let _ = self.command_sender.send(AcquisitionCommand::Stop);
    }

    /// Ask the worker to exit
    pub fn shutdown(&self) {
        let _ = self.command_sender.send(AcquisitionCommand::Shutdown);
    }

    /// Answer the pending prompt
    pub fn reply(&self, reply: PromptReply) {
        let _ = self.reply_sender.send(reply);
    }
}

/// [`Presenter`] forwarding to the UI thread
///
/// Never blocks. Messages the UI must see (series, state, alerts) wait in an
/// ordered outbox while the channel is full, with consecutive series updates
/// merged into one; [`flush`](Self::flush) moves them on once the UI drains.
/// Counter, error and stats updates are superseded by later ones and are
/// simply dropped when there is no room.
pub struct ChannelPresenter {
    sender: Sender<AcquisitionMessage>,
    outbox: VecDeque<AcquisitionMessage>,
    dropped: u64,
}

impl ChannelPresenter {
    pub fn new(sender: Sender<AcquisitionMessage>) -> Self {
        Self {
            sender,
            outbox: VecDeque::new(),
            dropped: 0,
        }
    }

    /// Queue a message that must reach the UI, in order
    fn queue(&mut self, message: AcquisitionMessage) {
        if let AcquisitionMessage::Entries(more) = message {
            match self.outbox.back_mut() {
                Some(AcquisitionMessage::Entries(pending)) => pending.extend(more),
                _ => self.outbox.push_back(AcquisitionMessage::Entries(more)),
            }
        } else {
            self.outbox.push_back(message);
        }
        self.flush();
    }

    /// Move queued messages into the channel while it has room
    pub fn flush(&mut self) {
        while let Some(message) = self.outbox.pop_front() {
            match self.sender.try_send(message) {
                Ok(()) => {}
                Err(TrySendError::Full(message)) => {
                    self.outbox.push_front(message);
                    return;
                }
                Err(TrySendError::Disconnected(_)) => {
                    tracing::debug!("Frontend gone, {} queued messages discarded", self.outbox.len() + 1);
                    self.outbox.clear();
                    return;
                }
            }
        }
    }

    /// Send a message that may be dropped when the UI falls behind
    pub fn try_send(&mut self, message: AcquisitionMessage) {
        if self.sender.try_send(message).is_err() {
            self.dropped += 1;
        }
    }

    /// Deliver what is queued plus the final outcome, waiting at most
    /// [`FINISH_GRACE`] for the UI to make room
    pub fn finish(&mut self, outcome: SessionOutcome) {
        self.outbox.push_back(AcquisitionMessage::Finished(outcome));
        let deadline = Instant::now() + FINISH_GRACE;

        while let Some(message) = self.outbox.pop_front() {
            if let Err(e) = self.sender.send_deadline(message, deadline) {
                tracing::debug!(
                    "Final messages not delivered ({}), {} discarded",
                    e,
                    self.outbox.len() + 1
                );
                self.outbox.clear();
                return;
            }
        }
    }

    /// Messages waiting for room in the channel
    pub fn pending(&self) -> usize {
        self.outbox.len()
    }

    /// Messages dropped by [`try_send`](Self::try_send)
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl Presenter for ChannelPresenter {
    fn render(&mut self, entries: &[SeriesEntry]) {
        self.queue(AcquisitionMessage::Entries(entries.to_vec()));
    }

    fn update_counter(&mut self, readings: usize) {
        self.try_send(AcquisitionMessage::Counter(readings));
    }

    fn state_changed(&mut self, state: AcquisitionState) {
        self.queue(AcquisitionMessage::State(state));
    }

    fn report_error(&mut self, message: &str) {
        self.try_send(AcquisitionMessage::Error(message.to_string()));
    }

    fn failure_streak(&mut self, consecutive: u32) {
        self.queue(AcquisitionMessage::FailureStreak(consecutive));
    }

    fn session_started(&mut self, log_path: &Path, interval: Duration) {
        self.queue(AcquisitionMessage::SessionStarted {
            log_path: log_path.to_path_buf(),
            interval,
        });
    }

    fn fatal(&mut self, message: &str) {
        self.queue(AcquisitionMessage::Fatal(message.to_string()));
    }
}

/// [`Prompter`] that asks the UI thread and blocks for the answer
///
/// A shutdown command or a closed channel while waiting counts as the
/// operator cancelling.
pub struct ChannelPrompter<'a> {
    messages: &'a Sender<AcquisitionMessage>,
    replies: &'a Receiver<PromptReply>,
    commands: &'a Receiver<AcquisitionCommand>,
    shutdown_requested: bool,
}

impl<'a> ChannelPrompter<'a> {
    pub fn new(channels: &'a WorkerChannels) -> Self {
        Self {
            messages: &channels.messages,
            replies: &channels.replies,
            commands: &channels.commands,
            shutdown_requested: false,
        }
    }

    /// Whether the UI asked to shut down while a prompt was open
    pub fn shutdown_requested(&self) -> bool {
        self.shutdown_requested
    }

    fn ask(&mut self, message: AcquisitionMessage) -> Option<PromptReply> {
        if self.shutdown_requested || self.messages.send(message).is_err() {
            return None;
        }

        loop {
            select! {
                recv(self.replies) -> reply => return reply.ok(),
                recv(self.commands) -> cmd => match cmd {
                    Ok(AcquisitionCommand::Shutdown) | Err(_) => {
                        self.shutdown_requested = true;
                        return None;
                    }
                    // Start/Stop have no meaning before the session exists
                    Ok(other) => tracing::debug!("Ignoring {:?} during setup", other),
                },
            }
        }
    }
}

impl Prompter for ChannelPrompter<'_> {
    fn prompt_number(&mut self, title: &str, default: f64, min: f64, max: f64) -> Option<f64> {
        match self.ask(AcquisitionMessage::PromptNumber {
            title: title.to_string(),
            default,
            min,
            max,
        }) {
            Some(PromptReply::Number(value)) => value,
            _ => None,
        }
    }

    fn confirm(&mut self, title: &str, message: &str) -> bool {
        matches!(
            self.ask(AcquisitionMessage::Confirm {
                title: title.to_string(),
                message: message.to_string(),
            }),
            Some(PromptReply::Confirm(true))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_prompt_round_trip() {
        let (worker, frontend) = channels();

        let ui = thread::spawn(move || {
            match frontend.receiver.recv().unwrap() {
                AcquisitionMessage::PromptNumber { default, .. } => {
                    assert_eq!(default, 1.0);
                    frontend.reply(PromptReply::Number(Some(2.5)));
                }
                other => panic!("unexpected {:?}", other),
            }
            frontend
        });

        let mut prompter = ChannelPrompter::new(&worker);
        assert_eq!(prompter.prompt_number("t", 1.0, 0.001, 3600.0), Some(2.5));
        let _ = ui.join().unwrap();
    }

    #[test]
    fn test_shutdown_cancels_prompt() {
        let (worker, frontend) = channels();
        frontend.shutdown();

        let mut prompter = ChannelPrompter::new(&worker);
        assert_eq!(prompter.prompt_number("t", 1.0, 0.001, 3600.0), None);
        assert!(prompter.shutdown_requested());
        assert!(!prompter.confirm("retry", "again?"));
    }

    #[test]
    fn test_presenter_forwards_series() {
        let (worker, frontend) = channels();
        let mut presenter = ChannelPresenter::new(worker.messages.clone());

        presenter.update_counter(3);
        presenter.report_error("boom");

        let messages = frontend.drain();
        assert!(matches!(messages[0], AcquisitionMessage::Counter(3)));
        assert!(matches!(&messages[1], AcquisitionMessage::Error(m) if m == "boom"));
    }

    #[test]
    fn test_full_channel_queues_and_merges_series() {
        use crate::types::GapMarker;

        let gap = |secs| {
            SeriesEntry::Gap(GapMarker {
                elapsed: Duration::from_secs(secs),
            })
        };
        let (tx, rx) = bounded(1);
        let mut presenter = ChannelPresenter::new(tx);

        presenter.render(&[gap(1)]);
        // Channel full from here on; none of these may block
        presenter.render(&[gap(2)]);
        presenter.render(&[gap(3), gap(4)]);
        presenter.update_counter(4);
        presenter.state_changed(AcquisitionState::Idle);
        assert_eq!(presenter.pending(), 2);
        assert_eq!(presenter.dropped(), 1);

        assert!(matches!(rx.recv().unwrap(), AcquisitionMessage::Entries(e) if e == vec![gap(1)]));
        presenter.flush();
        assert!(matches!(
            rx.recv().unwrap(),
            AcquisitionMessage::Entries(e) if e == vec![gap(2), gap(3), gap(4)]
        ));
        presenter.flush();
        assert!(matches!(
            rx.recv().unwrap(),
            AcquisitionMessage::State(AcquisitionState::Idle)
        ));
        assert_eq!(presenter.pending(), 0);
    }

    #[test]
    fn test_finish_gives_up_when_nobody_drains() {
        let (tx, rx) = bounded(1);
        let mut presenter = ChannelPresenter::new(tx);
        presenter.state_changed(AcquisitionState::Running);
        presenter.state_changed(AcquisitionState::Idle);

        let started = Instant::now();
        presenter.finish(SessionOutcome::Completed);
        assert!(started.elapsed() >= FINISH_GRACE);
        assert_eq!(presenter.pending(), 0);
        assert_eq!(rx.len(), 1);
    }
}
