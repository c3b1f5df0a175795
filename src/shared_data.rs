// src/shared_data.rs

use crate::communication::messages::{IntersectionEvent, SnapshotKind};
use crate::models::intersection::{Direction, Light, Phase};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds since the Unix epoch (0 if the clock is set before it).
pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// One flat CSV row per published snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub timestamp: u64,
    pub kind: SnapshotKind,
    pub phase: Phase,
    pub north_main: Light,
    pub north_left: Light,
    pub south_main: Light,
    pub south_left: Light,
    pub east_main: Light,
    pub east_left: Light,
    pub west_main: Light,
    pub west_left: Light,
}

impl From<&IntersectionEvent> for SnapshotRecord {
    fn from(event: &IntersectionEvent) -> Self {
        let state = &event.state;
        let n = state.lights(Direction::North);
        let s = state.lights(Direction::South);
        let e = state.lights(Direction::East);
        let w = state.lights(Direction::West);
        Self {
            timestamp: event.timestamp,
            kind: event.kind,
            phase: state.phase(),
            north_main: n.main_light,
            north_left: n.left_light,
            south_main: s.main_light,
            south_left: s.left_light,
            east_main: e.main_light,
            east_left: e.left_light,
            west_main: w.main_light,
            west_left: w.left_light,
        }
    }
}
