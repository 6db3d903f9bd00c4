use serde::{Deserialize, Serialize};

/// Half of an ultradian cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Focus,
    Break,
}

impl Phase {
    /// The phase that follows this one.
    pub fn next(self) -> Self {
        match self {
            Phase::Focus => Phase::Break,
            Phase::Break => Phase::Focus,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::Focus => "Focus Phase",
            Phase::Break => "Break Time",
        }
    }

    /// Title and body of the notification shown when this phase ends.
    pub fn completion_message(self) -> (&'static str, &'static str) {
        match self {
            Phase::Focus => ("Focus session complete!", "Time for a break!"),
            Phase::Break => ("Break time over!", "Ready to focus again?"),
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Focus => f.write_str("focus"),
            Phase::Break => f.write_str("break"),
        }
    }
}
