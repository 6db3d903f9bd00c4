//! End-to-end runner behaviour with virtual ticks.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc::UnboundedReceiver;
use uuid::Uuid;

use ultraflow_core::timer::{
    ManualTicks, Notifier, NotifyError, Permission, PermissionState, RunnerError,
};
use ultraflow_core::{
    Event, MemoryStore, Phase, SessionStore, Settings, SilentNotifier, TimerEngine, TimerRunner,
};

fn quiet(focus: u32) -> Settings {
    Settings {
        focus_duration: focus,
        break_duration: 20,
        enable_notifications: false,
    }
}

fn drain(events: &mut UnboundedReceiver<Event>) -> Vec<Event> {
    let mut out = Vec::new();
    while let Ok(event) = events.try_recv() {
        out.push(event);
    }
    out
}

fn rating_request(events: &[Event]) -> Option<Uuid> {
    events.iter().find_map(|e| match e {
        Event::RatingRequested { request_id, .. } => Some(*request_id),
        _ => None,
    })
}

#[tokio::test]
async fn full_focus_phase_records_rated_session() {
    let docs = Arc::new(MemoryStore::new());
    let sessions = SessionStore::new(docs);
    let (ticks, clock) = ManualTicks::new();
    let (timer, mut events, _task) = TimerRunner::spawn(
        TimerEngine::new(quiet(90)),
        ticks,
        Arc::new(SilentNotifier),
        sessions.clone(),
    );

    timer.start().await.unwrap();
    clock.advance(5400);
    let snap = timer.snapshot().await.unwrap();
    assert_eq!(snap.phase, Phase::Break);
    assert_eq!(snap.remaining_secs, 20 * 60);
    assert!(!snap.running);
    assert_eq!(snap.sessions_completed, 1);
    assert_eq!(snap.pending_ratings, 1);

    let seen = drain(&mut events);
    let completions = seen
        .iter()
        .filter(|e| matches!(e, Event::PhaseCompleted { .. }))
        .count();
    assert_eq!(completions, 1);
    let id = rating_request(&seen).expect("rating requested");

    let snap = timer.submit_rating(id, "4").await.unwrap();
    assert_eq!(snap.pending_ratings, 0);
    let stored = sessions.load();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].duration, 90);
    assert_eq!(stored[0].energy_level.map(|e| e.get()), Some(4));
    assert!(drain(&mut events)
        .iter()
        .any(|e| matches!(e, Event::SessionRecorded { .. })));

    // The request is resolved; a second answer is refused.
    assert!(matches!(
        timer.submit_rating(id, "5").await,
        Err(RunnerError::UnknownRating(_))
    ));
    assert_eq!(sessions.load().len(), 1);
}

#[tokio::test]
async fn double_start_does_not_double_count() {
    let (ticks, clock) = ManualTicks::new();
    let (timer, _events, _task) = TimerRunner::spawn(
        TimerEngine::new(quiet(90)),
        ticks,
        Arc::new(SilentNotifier),
        SessionStore::new(Arc::new(MemoryStore::new())),
    );

    timer.start().await.unwrap();
    timer.start().await.unwrap();
    clock.advance(10);
    assert_eq!(timer.snapshot().await.unwrap().remaining_secs, 5400 - 10);
}

#[tokio::test]
async fn ticks_while_paused_are_ignored() {
    let (ticks, clock) = ManualTicks::new();
    let (timer, _events, _task) = TimerRunner::spawn(
        TimerEngine::new(quiet(90)),
        ticks,
        Arc::new(SilentNotifier),
        SessionStore::new(Arc::new(MemoryStore::new())),
    );

    timer.start().await.unwrap();
    clock.advance(10);
    let paused = timer.pause().await.unwrap();
    assert_eq!(paused.remaining_secs, 5390);

    clock.advance(5);
    assert_eq!(timer.snapshot().await.unwrap().remaining_secs, 5390);

    timer.toggle().await.unwrap();
    assert_eq!(timer.snapshot().await.unwrap().remaining_secs, 5390);
    clock.tick();
    assert_eq!(timer.snapshot().await.unwrap().remaining_secs, 5389);

    let reset = timer.reset().await.unwrap();
    assert_eq!(reset.phase, Phase::Focus);
    assert!(!reset.running);
    assert_eq!(reset.remaining_secs, 5400);
}

#[tokio::test]
async fn invalid_rating_keeps_unrated_session() {
    let sessions = SessionStore::new(Arc::new(MemoryStore::new()));
    let (ticks, clock) = ManualTicks::new();
    let (timer, mut events, _task) = TimerRunner::spawn(
        TimerEngine::new(quiet(30)),
        ticks,
        Arc::new(SilentNotifier),
        sessions.clone(),
    );

    timer.start().await.unwrap();
    clock.advance(1800);
    timer.snapshot().await.unwrap();
    let id = rating_request(&drain(&mut events)).unwrap();

    timer.submit_rating(id, "4.5").await.unwrap();
    let seen = drain(&mut events);
    assert!(seen.iter().any(|e| matches!(e, Event::RatingRejected { .. })));
    let stored = sessions.load();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].energy_level, None);
}

#[tokio::test]
async fn settings_apply_to_next_phase_only() {
    let (ticks, clock) = ManualTicks::new();
    let (timer, _events, _task) = TimerRunner::spawn(
        TimerEngine::new(quiet(30)),
        ticks,
        Arc::new(SilentNotifier),
        SessionStore::new(Arc::new(MemoryStore::new())),
    );

    timer.start().await.unwrap();
    clock.advance(60);
    let snap = timer
        .apply_settings(Settings {
            focus_duration: 60,
            break_duration: 10,
            enable_notifications: false,
        })
        .await
        .unwrap();
    assert_eq!(snap.remaining_secs, 1740);

    clock.advance(1740);
    let snap = timer.snapshot().await.unwrap();
    assert_eq!(snap.phase, Phase::Break);
    assert_eq!(snap.remaining_secs, 600);

    let rejected = timer
        .apply_settings(Settings {
            focus_duration: 7,
            ..Settings::default()
        })
        .await;
    assert!(matches!(rejected, Err(RunnerError::Invalid(_))));
}

#[tokio::test(start_paused = true)]
async fn unanswered_rating_expires_into_unrated_session() {
    let sessions = SessionStore::new(Arc::new(MemoryStore::new()));
    let (ticks, clock) = ManualTicks::new();
    let engine = TimerEngine::new(quiet(30)).with_rating_timeout(Duration::from_secs(600));
    let (timer, mut events, _task) =
        TimerRunner::spawn(engine, ticks, Arc::new(SilentNotifier), sessions.clone());

    timer.start().await.unwrap();
    clock.advance(1800);
    assert_eq!(timer.snapshot().await.unwrap().pending_ratings, 1);
    let id = rating_request(&drain(&mut events)).unwrap();

    tokio::time::sleep(Duration::from_secs(601)).await;
    assert_eq!(timer.snapshot().await.unwrap().pending_ratings, 0);

    let seen = drain(&mut events);
    assert!(seen
        .iter()
        .any(|e| matches!(e, Event::RatingExpired { request_id, .. } if *request_id == id)));
    let stored = sessions.load();
    assert_eq!(stored.len(), 1);
    assert!(!stored[0].is_rated());

    // A late answer cannot write a second session.
    assert!(timer.submit_rating(id, "3").await.is_err());
    assert_eq!(sessions.load().len(), 1);
}

#[tokio::test]
async fn failed_write_is_reported_not_fatal() {
    let docs = Arc::new(MemoryStore::new());
    docs.set_fail_writes(true);
    let (ticks, clock) = ManualTicks::new();
    let (timer, mut events, _task) = TimerRunner::spawn(
        TimerEngine::new(quiet(30)),
        ticks,
        Arc::new(SilentNotifier),
        SessionStore::new(docs),
    );

    timer.start().await.unwrap();
    clock.advance(1800);
    timer.snapshot().await.unwrap();
    let id = rating_request(&drain(&mut events)).unwrap();
    timer.cancel_rating(id).await.unwrap();

    assert!(drain(&mut events)
        .iter()
        .any(|e| matches!(e, Event::SessionPersistFailed { .. })));
    // The timer keeps working.
    timer.start().await.unwrap();
    clock.advance(5);
    assert_eq!(timer.snapshot().await.unwrap().remaining_secs, 20 * 60 - 5);
}

#[tokio::test]
async fn shutdown_persists_pending_ratings() {
    let sessions = SessionStore::new(Arc::new(MemoryStore::new()));
    let (ticks, clock) = ManualTicks::new();
    let (timer, _events, task) = TimerRunner::spawn(
        TimerEngine::new(quiet(30)),
        ticks,
        Arc::new(SilentNotifier),
        sessions.clone(),
    );

    timer.start().await.unwrap();
    clock.advance(1800);
    timer.snapshot().await.unwrap();
    drop(timer);

    let engine = task.await.unwrap();
    assert_eq!(engine.sessions_completed(), 1);
    assert_eq!(engine.pending_ratings().count(), 0);
    let stored = sessions.load();
    assert_eq!(stored.len(), 1);
    assert!(!stored[0].is_rated());
}

#[derive(Default)]
struct RecordingNotifier {
    shown: Mutex<Vec<(String, String)>>,
}

impl Notifier for RecordingNotifier {
    async fn request_permission(&self) -> Result<Permission, NotifyError> {
        Ok(Permission::Granted)
    }

    async fn notify(&self, title: &str, body: &str) -> Result<(), NotifyError> {
        self.shown
            .lock()
            .unwrap()
            .push((title.to_string(), body.to_string()));
        Ok(())
    }
}

#[tokio::test]
async fn granted_permission_shows_completion_notice() {
    let notifier = Arc::new(RecordingNotifier::default());
    let (ticks, clock) = ManualTicks::new();
    let settings = Settings {
        enable_notifications: true,
        ..quiet(30)
    };
    let (timer, _events, _task) = TimerRunner::spawn(
        TimerEngine::new(settings),
        ticks,
        Arc::clone(&notifier),
        SessionStore::new(Arc::new(MemoryStore::new())),
    );

    timer.start().await.unwrap();
    for _ in 0..100 {
        if timer.snapshot().await.unwrap().permission == PermissionState::Granted {
            break;
        }
        tokio::task::yield_now().await;
    }
    assert_eq!(
        timer.snapshot().await.unwrap().permission,
        PermissionState::Granted
    );

    clock.advance(1800);
    timer.snapshot().await.unwrap();
    for _ in 0..100 {
        if !notifier.shown.lock().unwrap().is_empty() {
            break;
        }
        tokio::task::yield_now().await;
    }
    let shown = notifier.shown.lock().unwrap().clone();
    assert_eq!(
        shown,
        vec![(
            "Focus session complete!".to_string(),
            "Time for a break!".to_string()
        )]
    );
}

#[tokio::test]
async fn unsupported_notifications_never_block_the_timer() {
    let (ticks, clock) = ManualTicks::new();
    let settings = Settings {
        enable_notifications: true,
        ..quiet(30)
    };
    let (timer, _events, _task) = TimerRunner::spawn(
        TimerEngine::new(settings),
        ticks,
        Arc::new(SilentNotifier),
        SessionStore::new(Arc::new(MemoryStore::new())),
    );

    timer.start().await.unwrap();
    clock.advance(1800);
    let snap = timer.snapshot().await.unwrap();
    assert_eq!(snap.phase, Phase::Break);
    assert_eq!(snap.sessions_completed, 1);
}
