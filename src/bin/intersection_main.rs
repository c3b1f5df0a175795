use intersection_controller::config::{snapshot_csv_path, TimingConfig};
use intersection_controller::global_variables::ARRIVAL_PROMPT;
use intersection_controller::monitoring::traffic_monitoring_system::run_display;
use intersection_controller::{Arrival, IntersectionController, SnapshotKind};
use std::io::Write;
use std::process::ExitCode;
use tokio::io::{stdin, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

// Blocks until the display has written a snapshot of `kind`.
async fn wait_for_display(printed: &mut mpsc::UnboundedReceiver<SnapshotKind>, kind: SnapshotKind) {
    while let Some(shown) = printed.recv().await {
        if shown == kind {
            return;
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    let timing = match TimingConfig::from_env() {
        Ok(timing) => timing,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let (tx, rx) = mpsc::unbounded_channel();
    let (printed_tx, mut printed) = mpsc::unbounded_channel();
    let display = tokio::spawn(run_display(rx, snapshot_csv_path(), Some(printed_tx)));
    let controller = IntersectionController::new(timing).with_events(tx);
    log::info!(
        "Starting intersection controller (yellow {:?}, left turn {:?})",
        controller.timing().yellow,
        controller.timing().left_turn
    );
    wait_for_display(&mut printed, SnapshotKind::Initial).await;

    let mut lines = BufReader::new(stdin()).lines();
    loop {
        print!("{}", ARRIVAL_PROMPT);
        let _ = std::io::stdout().flush();

        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                eprintln!("Error reading input: {}", e);
                break;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            break;
        }

        let arrival = match Arrival::parse(line) {
            Ok(arrival) => arrival,
            Err(e) => {
                eprintln!("{}", e);
                continue;
            }
        };
        println!(
            "Car arrived from the {} direction in the {} lane.",
            arrival.direction, arrival.lane
        );

        match controller.arrive(arrival) {
            Ok(completion) => match completion.wait().await {
                Ok(_) => wait_for_display(&mut printed, SnapshotKind::Completed).await,
                Err(e) => log::error!("{}", e),
            },
            Err(e) if e.is_input_error() => eprintln!("{}", e),
            Err(e) => log::error!("Arrival not handled: {}", e),
        }
    }

    drop(controller);
    if let Err(e) = display.await {
        log::error!("Display task failed: {}", e);
    }
    println!("Exiting.");
    ExitCode::SUCCESS
}
