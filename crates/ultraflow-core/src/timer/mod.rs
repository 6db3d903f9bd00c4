mod engine;
mod notify;
mod phase;
mod rating;
mod runner;
mod ticks;

pub use engine::{format_clock, TimerEngine, TimerSnapshot};
pub use notify::{Notifier, NotifyError, Permission, PermissionState, SilentNotifier};
pub use phase::Phase;
pub use rating::{RatingLedger, RatingOutcome, RatingRequest, DEFAULT_RATING_TIMEOUT};
pub use runner::{RunnerError, RunnerHandle, TimerRunner};
pub use ticks::{IntervalTicks, ManualTickHandle, ManualTicks, TickSource};
