use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use clap::Subcommand;
use tokio::io::{AsyncBufReadExt, BufReader};
use uuid::Uuid;

use ultraflow_core::timer::{IntervalTicks, RunnerError, RunnerHandle};
use ultraflow_core::{Config, Event, TimerEngine, TimerRunner};

use super::{open_stores, print_json, runtime, CliResult};
use crate::notifier::TerminalNotifier;

const HELP: &str = "commands: p = start/pause, r = reset, 1-5 = rate energy, s = skip rating, q = quit";

#[derive(Subcommand)]
pub enum TimerAction {
    /// Run the timer in the foreground (reads commands from stdin)
    Run {
        /// Focus minutes for this run (30-120, step 5)
        #[arg(long)]
        focus: Option<u32>,
        /// Break minutes for this run (5-30, step 5)
        #[arg(long = "break")]
        break_minutes: Option<u32>,
    },
    /// Print the initial timer state for the current settings as JSON
    Preview,
}

pub fn run(action: TimerAction) -> CliResult {
    match action {
        TimerAction::Run {
            focus,
            break_minutes,
        } => run_foreground(focus, break_minutes),
        TimerAction::Preview => {
            let (_, settings) = open_stores()?;
            let engine = TimerEngine::new(settings.load());
            print_json(&engine.snapshot())
        }
    }
}

fn run_foreground(focus: Option<u32>, break_minutes: Option<u32>) -> CliResult {
    let (sessions, settings_store) = open_stores()?;
    let mut settings = settings_store.load();
    if let Some(focus) = focus {
        settings.focus_duration = focus;
    }
    if let Some(minutes) = break_minutes {
        settings.break_duration = minutes;
    }
    settings.validate()?;

    let config = Config::load_or_default();
    let engine = TimerEngine::new(settings).with_rating_timeout(config.rating_timeout());

    runtime()?.block_on(async move {
        let (timer, mut events, task) = TimerRunner::spawn(
            engine,
            IntervalTicks::every_second(),
            Arc::new(TerminalNotifier),
            sessions,
        );
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut render = tokio::time::interval(Duration::from_secs(1));
        let mut pending: VecDeque<Uuid> = VecDeque::new();
        eprintln!("{HELP}");

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    if !handle_line(&timer, line.trim(), &mut pending).await? {
                        break;
                    }
                }
                Some(event) = events.recv() => {
                    track_rating(&event, &mut pending);
                    println!("{}", serde_json::to_string(&event)?);
                }
                _ = render.tick() => {
                    let snap = timer.snapshot().await?;
                    if snap.running {
                        eprint!("\r{} {}   ", snap.phase.label(), snap.clock);
                    }
                }
            }
        }

        // Closing the last handle stops the runner, which records any
        // unanswered rating as an unrated session.
        drop(timer);
        task.await?;
        while let Ok(event) = events.try_recv() {
            println!("{}", serde_json::to_string(&event)?);
        }
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}

/// Returns `false` when the user asked to quit. Answers go to the oldest
/// pending rating.
async fn handle_line(
    timer: &RunnerHandle,
    line: &str,
    pending: &mut VecDeque<Uuid>,
) -> Result<bool, Box<dyn std::error::Error>> {
    match line {
        "" => {}
        "q" => return Ok(false),
        "p" => {
            timer.toggle().await?;
        }
        "r" => {
            timer.reset().await?;
        }
        "s" => match pending.pop_front() {
            Some(id) => settle(timer.cancel_rating(id).await)?,
            None => eprintln!("no rating pending"),
        },
        answer => match pending.pop_front() {
            Some(id) => settle(timer.submit_rating(id, answer).await)?,
            None => eprintln!("unknown command '{answer}'. {HELP}"),
        },
    }
    Ok(true)
}

/// A rating that expired while the user was typing is not an error.
fn settle(result: Result<ultraflow_core::TimerSnapshot, RunnerError>) -> Result<(), RunnerError> {
    match result {
        Ok(_) => Ok(()),
        Err(RunnerError::UnknownRating(id)) => {
            tracing::debug!(%id, "rating already resolved");
            Ok(())
        }
        Err(err) => Err(err),
    }
}

fn track_rating(event: &Event, pending: &mut VecDeque<Uuid>) {
    match event {
        Event::RatingRequested { request_id, duration_min, .. } => {
            pending.push_back(*request_id);
            eprintln!("\n{duration_min} min focus done. How was your energy? (1-5, s to skip)");
        }
        Event::RatingExpired { request_id, .. } => {
            pending.retain(|id| id != request_id);
            eprintln!("\nrating timed out; session saved without a rating");
        }
        Event::RatingRejected { reason, .. } => {
            eprintln!("\n{reason}; session saved without a rating");
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn requested(id: Uuid) -> Event {
        Event::RatingRequested {
            request_id: id,
            duration_min: 90,
            completed_at: Utc::now(),
        }
    }

    #[test]
    fn overlapping_requests_queue_oldest_first() {
        let (first, second) = (Uuid::new_v4(), Uuid::new_v4());
        let mut pending = VecDeque::new();
        track_rating(&requested(first), &mut pending);
        track_rating(&requested(second), &mut pending);
        assert_eq!(pending.pop_front(), Some(first));
        assert_eq!(pending.pop_front(), Some(second));
    }

    #[test]
    fn expired_request_leaves_the_queue() {
        let (first, second) = (Uuid::new_v4(), Uuid::new_v4());
        let mut pending = VecDeque::new();
        track_rating(&requested(first), &mut pending);
        track_rating(&requested(second), &mut pending);
        track_rating(
            &Event::RatingExpired {
                request_id: first,
                at: Utc::now(),
            },
            &mut pending,
        );
        assert_eq!(pending, VecDeque::from([second]));
    }
}
