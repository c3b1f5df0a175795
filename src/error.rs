use thiserror::Error;

/// Reasons an arrival is not accepted, or never reaches a terminal snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArrivalError {
    #[error("Invalid direction '{0}'. Valid directions are N, S, E, W.")]
    InvalidDirection(String),

    #[error("Invalid lane '{0}'. Valid lanes are l, s1, s2, r.")]
    InvalidLane(String),

    #[error("Malformed arrival '{0}'. Expected direction,lane (e.g. N,s1).")]
    MalformedArrival(String),

    #[error("A light transition is already in progress; wait for it to complete")]
    SequenceInProgress,

    #[error("Transition sequence ended without reporting completion")]
    SequenceAborted,

    #[error("No Tokio runtime is running to drive the light sequence")]
    NoRuntime,
}

impl ArrivalError {
    /// Validation failures mean the operator should simply re-enter the arrival.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidDirection(_) | Self::InvalidLane(_) | Self::MalformedArrival(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{key} must be a whole number of seconds, got '{value}'")]
    NotANumber { key: &'static str, value: String },

    #[error("{key} must be greater than zero")]
    ZeroInterval { key: &'static str },
}
