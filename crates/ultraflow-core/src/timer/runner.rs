//! Async driver for [`TimerEngine`].
//!
//! One task owns the engine. Ticks, commands and collaborator answers all
//! funnel through a single `select!` loop, so the countdown has exactly one
//! source and every side effect (permission prompt, notification, rating
//! timeout, session write) is started from one place.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::engine::{TimerEngine, TimerSnapshot};
use super::notify::{Notifier, Permission};
use super::ticks::TickSource;
use crate::error::ValidationError;
use crate::events::Event;
use crate::session::Session;
use crate::settings::Settings;
use crate::storage::SessionStore;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("timer runner has stopped")]
    Closed,

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("no pending rating with id {0}")]
    UnknownRating(Uuid),
}

#[derive(Debug, Clone)]
enum Control {
    Start,
    Pause,
    Toggle,
    Reset,
    ApplySettings(Settings),
    SubmitRating { id: Uuid, raw: String },
    CancelRating(Uuid),
    Snapshot,
}

struct Command {
    control: Control,
    reply: oneshot::Sender<Result<TimerSnapshot, RunnerError>>,
}

/// Answers from spawned collaborator tasks.
#[derive(Debug)]
enum Feedback {
    Permission(Permission),
    RatingTimedOut(Uuid),
}

/// Cloneable front door to a running [`TimerRunner`]. The runner stops once
/// every handle is dropped.
#[derive(Debug, Clone)]
pub struct RunnerHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command").field("control", &self.control).finish()
    }
}

impl RunnerHandle {
    async fn send(&self, control: Control) -> Result<TimerSnapshot, RunnerError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command { control, reply })
            .map_err(|_| RunnerError::Closed)?;
        rx.await.map_err(|_| RunnerError::Closed)?
    }

    pub async fn start(&self) -> Result<TimerSnapshot, RunnerError> {
        self.send(Control::Start).await
    }

    pub async fn pause(&self) -> Result<TimerSnapshot, RunnerError> {
        self.send(Control::Pause).await
    }

    pub async fn toggle(&self) -> Result<TimerSnapshot, RunnerError> {
        self.send(Control::Toggle).await
    }

    pub async fn reset(&self) -> Result<TimerSnapshot, RunnerError> {
        self.send(Control::Reset).await
    }

    pub async fn snapshot(&self) -> Result<TimerSnapshot, RunnerError> {
        self.send(Control::Snapshot).await
    }

    pub async fn apply_settings(&self, settings: Settings) -> Result<TimerSnapshot, RunnerError> {
        self.send(Control::ApplySettings(settings)).await
    }

    /// Answer a rating request with raw user input. An unusable answer still
    /// records the session, without a rating.
    pub async fn submit_rating(&self, id: Uuid, raw: impl Into<String>) -> Result<TimerSnapshot, RunnerError> {
        self.send(Control::SubmitRating { id, raw: raw.into() }).await
    }

    pub async fn cancel_rating(&self, id: Uuid) -> Result<TimerSnapshot, RunnerError> {
        self.send(Control::CancelRating(id)).await
    }
}

/// Spawns the engine loop.
pub struct TimerRunner;

impl TimerRunner {
    /// Spawn the loop on the current tokio runtime.
    ///
    /// Returns the command handle, the event stream and the task handle; the
    /// task yields the final engine once every [`RunnerHandle`] is dropped.
    pub fn spawn<T, N>(
        engine: TimerEngine,
        ticks: T,
        notifier: Arc<N>,
        sessions: SessionStore,
    ) -> (RunnerHandle, mpsc::UnboundedReceiver<Event>, JoinHandle<TimerEngine>)
    where
        T: TickSource + 'static,
        N: Notifier,
    {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (feedback_tx, feedback_rx) = mpsc::unbounded_channel();

        let core = Core {
            engine,
            notifier,
            sessions,
            events: event_tx,
            feedback: feedback_tx,
        };
        let task = tokio::spawn(run(core, ticks, cmd_rx, feedback_rx));
        (RunnerHandle { tx: cmd_tx }, event_rx, task)
    }
}

async fn run<T, N>(
    mut core: Core<N>,
    mut ticks: T,
    mut commands: mpsc::UnboundedReceiver<Command>,
    mut feedback_rx: mpsc::UnboundedReceiver<Feedback>,
) -> TimerEngine
where
    T: TickSource,
    N: Notifier,
{
    let mut ticks_live = true;
    loop {
        let counting = ticks_live && core.engine.is_running();
        tokio::select! {
            biased;

            Some(feedback) = feedback_rx.recv() => core.on_feedback(feedback),

            alive = ticks.next_tick(), if counting => {
                if alive {
                    let events = core.engine.tick();
                    core.dispatch(events);
                } else {
                    tracing::debug!("tick source exhausted");
                    ticks_live = false;
                }
            }

            command = commands.recv() => {
                let Some(command) = command else { break };
                let was_running = core.engine.is_running();
                let result = core.on_command(command.control);
                if !was_running && core.engine.is_running() {
                    ticks.rearm();
                }
                let _ = command.reply.send(result);
            }
        }
    }
    core.shutdown();
    core.engine
}

struct Core<N> {
    engine: TimerEngine,
    notifier: Arc<N>,
    sessions: SessionStore,
    events: mpsc::UnboundedSender<Event>,
    feedback: mpsc::UnboundedSender<Feedback>,
}

impl<N: Notifier> Core<N> {
    fn on_command(&mut self, control: Control) -> Result<TimerSnapshot, RunnerError> {
        match control {
            Control::Start => {
                let events = self.engine.start();
                self.dispatch(events);
            }
            Control::Pause => {
                let events = self.engine.pause().into_iter().collect();
                self.dispatch(events);
            }
            Control::Toggle => {
                let events = self.engine.toggle();
                self.dispatch(events);
            }
            Control::Reset => {
                let event = self.engine.reset();
                self.dispatch(vec![event]);
            }
            Control::ApplySettings(settings) => {
                let event = self.engine.apply_settings(settings)?;
                self.dispatch(vec![event]);
            }
            Control::SubmitRating { id, raw } => {
                let outcome = self
                    .engine
                    .submit_rating(&id, &raw)
                    .ok_or(RunnerError::UnknownRating(id))?;
                if let Some(err) = outcome.rejected {
                    tracing::info!(%id, error = %err, "energy rating rejected, keeping session unrated");
                    self.emit(Event::RatingRejected {
                        request_id: id,
                        reason: err.to_string(),
                        at: Utc::now(),
                    });
                }
                self.persist(outcome.session);
            }
            Control::CancelRating(id) => {
                let session = self
                    .engine
                    .cancel_rating(&id)
                    .ok_or(RunnerError::UnknownRating(id))?;
                self.persist(session);
            }
            Control::Snapshot => {}
        }
        Ok(self.engine.snapshot())
    }

    fn on_feedback(&mut self, feedback: Feedback) {
        match feedback {
            Feedback::Permission(permission) => {
                tracing::debug!(?permission, "notification permission resolved");
                self.engine.set_permission(permission);
            }
            Feedback::RatingTimedOut(id) => {
                // Already answered or skipped: nothing to do.
                if let Some(session) = self.engine.cancel_rating(&id) {
                    tracing::info!(%id, "energy rating timed out");
                    self.emit(Event::RatingExpired {
                        request_id: id,
                        at: Utc::now(),
                    });
                    self.persist(session);
                }
            }
        }
    }

    /// Start side effects for engine events, then forward them.
    fn dispatch(&mut self, events: Vec<Event>) {
        for event in events {
            match &event {
                Event::NotificationPermissionRequested { .. } => self.spawn_permission_request(),
                Event::Notify { title, body, .. } => self.spawn_notify(title.clone(), body.clone()),
                Event::RatingRequested { request_id, .. } => self.spawn_rating_timeout(*request_id),
                _ => {}
            }
            self.emit(event);
        }
    }

    fn emit(&self, event: Event) {
        // A front-end that stopped listening must not stop the timer.
        let _ = self.events.send(event);
    }

    fn persist(&self, session: Session) {
        match self.sessions.append(&session) {
            Ok(()) => self.emit(Event::SessionRecorded {
                session,
                at: Utc::now(),
            }),
            Err(err) => {
                tracing::warn!(error = %err, "failed to persist focus session");
                self.emit(Event::SessionPersistFailed {
                    session,
                    message: err.to_string(),
                    at: Utc::now(),
                });
            }
        }
    }

    fn spawn_permission_request(&self) {
        let notifier = Arc::clone(&self.notifier);
        let feedback = self.feedback.clone();
        tokio::spawn(async move {
            let permission = match notifier.request_permission().await {
                Ok(p) => p,
                Err(err) => {
                    tracing::warn!(error = %err, "notification permission request failed");
                    Permission::Unsupported
                }
            };
            let _ = feedback.send(Feedback::Permission(permission));
        });
    }

    fn spawn_notify(&self, title: String, body: String) {
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            if let Err(err) = notifier.notify(&title, &body).await {
                tracing::warn!(error = %err, "notification failed");
            }
        });
    }

    fn spawn_rating_timeout(&self, id: Uuid) {
        let timeout = self.engine.rating_timeout();
        let feedback = self.feedback.clone();
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            let _ = feedback.send(Feedback::RatingTimedOut(id));
        });
    }

    /// Unanswered ratings still produce their sessions.
    fn shutdown(&mut self) {
        let pending: Vec<Uuid> = self.engine.pending_ratings().map(|r| r.id).collect();
        for id in pending {
            if let Some(session) = self.engine.cancel_rating(&id) {
                self.persist(session);
            }
        }
    }
}
