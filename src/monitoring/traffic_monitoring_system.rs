use crate::communication::messages::{IntersectionEvent, SnapshotKind};
use crate::shared_data::SnapshotRecord;
use serde::Serialize;
use std::error::Error;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

/// Generic helper to append a record to a CSV file, writing headers on first use.
fn log_to_csv<T: Serialize>(path: &Path, record: &T) -> Result<(), Box<dyn Error>> {
    let file_exists = path.exists();
    let file = OpenOptions::new().append(true).create(true).open(path)?;
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(!file_exists)
        .from_writer(file);
    wtr.serialize(record)?;
    wtr.flush()?;
    Ok(())
}

pub fn log_snapshot(path: &Path, event: &IntersectionEvent) {
    if let Err(e) = log_to_csv(path, &SnapshotRecord::from(event)) {
        log::warn!("Error logging snapshot to {}: {}", path.display(), e);
    }
}

/// Reads every snapshot row back from a CSV log.
pub fn read_snapshots(path: &Path) -> Result<Vec<SnapshotRecord>, Box<dyn Error>> {
    let file = File::open(path)?;
    let mut rdr = csv::Reader::from_reader(file);
    let mut records = Vec::new();
    for result in rdr.deserialize() {
        let record: SnapshotRecord = result?;
        records.push(record);
    }
    Ok(records)
}

/// Human-readable rendering of one published snapshot.
pub fn render_event(event: &IntersectionEvent) -> String {
    let heading = match event.kind {
        SnapshotKind::Initial => "Initial state of intersection:",
        SnapshotKind::Intermediate => "Temporary state of intersection:",
        SnapshotKind::Completed => "New state of intersection:",
    };
    format!("{}\n{}", heading, event.state)
}

/// Consumes snapshots until every controller handle has gone away.
///
/// When `printed` is set, the kind of each snapshot is sent back once it has been written
/// out, so an interactive caller can hold its next prompt until the display is done.
pub async fn run_display(
    mut events: mpsc::UnboundedReceiver<IntersectionEvent>,
    csv_path: Option<PathBuf>,
    printed: Option<mpsc::UnboundedSender<SnapshotKind>>,
) {
    while let Some(event) = events.recv().await {
        println!("{}", render_event(&event));
        if let Some(path) = &csv_path {
            log_snapshot(path, &event);
        }
        if let Some(printed) = &printed {
            let _ = printed.send(event.kind);
        }
    }
    log::debug!("Snapshot stream closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::intersection::{Axis, IntersectionState, Light, Phase};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn event(kind: SnapshotKind, state: IntersectionState) -> IntersectionEvent {
        IntersectionEvent {
            kind,
            timestamp: 42,
            state,
        }
    }

    fn scratch_csv(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("{}_{}_{}.csv", name, std::process::id(), nanos))
    }

    #[test]
    fn headings_follow_snapshot_kind() {
        let text = render_event(&event(SnapshotKind::Initial, IntersectionState::default()));
        assert!(text.starts_with("Initial state of intersection:\nPhase: NorthSouthStraight"));
        let text = render_event(&event(SnapshotKind::Completed, IntersectionState::default()));
        assert!(text.starts_with("New state of intersection:"));
    }

    #[test]
    fn csv_log_round_trips_with_single_header() {
        let path = scratch_csv("snapshots");
        log_snapshot(&path, &event(SnapshotKind::Initial, IntersectionState::default()));
        log_snapshot(
            &path,
            &event(SnapshotKind::Completed, IntersectionState::serving(Axis::EastWest)),
        );

        let records = read_snapshots(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].kind, SnapshotKind::Initial);
        assert_eq!(records[1].phase, Phase::EastWestStraight);
        assert_eq!(records[1].east_main, Light::Green);
        assert_eq!(records[1].north_left, Light::Red);

        let raw = std::fs::read_to_string(&path).unwrap();
        assert_eq!(raw.matches("timestamp").count(), 1);
        assert!(raw.contains("orange"));
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn display_drains_until_senders_drop() {
        let path = scratch_csv("display");
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(event(SnapshotKind::Initial, IntersectionState::default()))
            .unwrap();
        drop(tx);
        let (ack_tx, mut ack_rx) = mpsc::unbounded_channel();
        run_display(rx, Some(path.clone()), Some(ack_tx)).await;
        assert_eq!(read_snapshots(&path).unwrap().len(), 1);
        assert_eq!(ack_rx.recv().await, Some(SnapshotKind::Initial));
        assert_eq!(ack_rx.recv().await, None);
        let _ = std::fs::remove_file(&path);
    }
}
