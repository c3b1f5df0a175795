use crate::error::ArrivalError;
use crate::models::intersection::{Direction, IntersectionState, Lane};
use serde::{Deserialize, Serialize};

/// A car showing up at the intersection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arrival {
    pub direction: Direction,
    pub lane: Lane,
}

impl Arrival {
    pub fn new(direction: Direction, lane: Lane) -> Self {
        Self { direction, lane }
    }

    /// Validates a raw direction/lane token pair.
    pub fn from_tokens(direction: &str, lane: &str) -> Result<Self, ArrivalError> {
        Ok(Self {
            direction: direction.parse()?,
            lane: lane.parse()?,
        })
    }

    /// Parses an operator line such as `N,s1`. `N:s1` is accepted as well.
    pub fn parse(line: &str) -> Result<Self, ArrivalError> {
        let line = line.trim();
        let (direction, lane) = line
            .split_once(',')
            .or_else(|| line.split_once(':'))
            .ok_or_else(|| ArrivalError::MalformedArrival(line.to_string()))?;
        Self::from_tokens(direction, lane)
    }
}

/// Which point of a transition a published snapshot was taken at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnapshotKind {
    /// State right after the controller was created.
    Initial,
    /// A stage inside a running sequence.
    Intermediate,
    /// Terminal state of an arrival, immediate or end of sequence.
    Completed,
}

/// Published to the display/log side each time the intersection becomes observable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntersectionEvent {
    pub kind: SnapshotKind,
    pub timestamp: u64,
    pub state: IntersectionState,
}
