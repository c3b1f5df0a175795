//! End-to-end arrival scenarios against the public controller API.
//!
//! Every test runs on a paused Tokio clock, so the 5 s / 10 s timings are exact.

use intersection_controller::{
    Arrival, ArrivalError, ArrivalOutcome, Axis, Direction, DirectionLights, IntersectionController,
    IntersectionState, Lane, Light, Phase, TimingConfig,
};
use tokio::time::{sleep, Duration, Instant};

fn controller_serving(axis: Axis) -> IntersectionController {
    IntersectionController::from_state(IntersectionState::serving(axis), TimingConfig::default())
}

fn lights(main_light: Light, left_light: Light) -> DirectionLights {
    DirectionLights {
        main_light,
        left_light,
    }
}

fn assert_axis(state: &IntersectionState, axis: Axis, expected: DirectionLights) {
    for direction in axis.directions() {
        assert_eq!(state.lights(direction), expected, "{} in\n{}", direction, state);
    }
}

#[tokio::test(start_paused = true)]
async fn east_straight_hands_over_after_yellow() {
    let controller = IntersectionController::new(TimingConfig::default());
    let start = Instant::now();
    let completion = controller.arrive_tokens("E", "s1").unwrap();

    sleep(Duration::from_secs(4)).await;
    let state = controller.snapshot();
    assert_axis(&state, Axis::NorthSouth, lights(Light::Yellow, Light::Yellow));
    assert_axis(&state, Axis::EastWest, DirectionLights::RED);

    let done = completion.wait().await.unwrap();
    assert_eq!(start.elapsed(), Duration::from_secs(5));
    assert_eq!(done.phase(), Phase::EastWestStraight);
    assert_axis(&done, Axis::NorthSouth, DirectionLights::RED);
    assert_axis(&done, Axis::EastWest, DirectionLights::GO);
}

#[tokio::test(start_paused = true)]
async fn arrival_on_served_axis_is_immediate_no_op() {
    let controller = IntersectionController::new(TimingConfig::default());
    let before = controller.snapshot();
    for (direction, lane) in [("N", "l"), ("s", "s1"), ("N", "s2"), ("S", "r")] {
        let completion = controller.arrive_tokens(direction, lane).unwrap();
        assert!(completion.is_immediate());
        assert_eq!(completion.outcome(), ArrivalOutcome::Unchanged);
        assert_eq!(completion.wait().await.unwrap(), before);
    }
    assert_eq!(controller.snapshot(), before);
}

#[tokio::test(start_paused = true)]
async fn south_left_runs_protected_left_without_yellow() {
    let controller = controller_serving(Axis::EastWest);
    let start = Instant::now();
    let completion = controller
        .arrive(Arrival::new(Direction::South, Lane::Left))
        .unwrap();
    assert_axis(&controller.snapshot(), Axis::EastWest, lights(Light::Yellow, Light::Yellow));

    sleep(Duration::from_secs(6)).await;
    let state = controller.snapshot();
    assert_eq!(state.phase(), Phase::NorthSouthLeft);
    assert_axis(&state, Axis::EastWest, DirectionLights::RED);
    assert_axis(&state, Axis::NorthSouth, lights(Light::Red, Light::Green));

    // No yellow step before the left phase ends.
    sleep(Duration::from_secs(8)).await;
    assert_axis(&controller.snapshot(), Axis::NorthSouth, lights(Light::Red, Light::Green));

    let done = completion.wait().await.unwrap();
    assert_eq!(start.elapsed(), Duration::from_secs(15));
    assert_eq!(done, IntersectionState::serving(Axis::NorthSouth));
}

#[tokio::test(start_paused = true)]
async fn west_left_clears_protected_left_through_yellow() {
    let controller = IntersectionController::new(TimingConfig::default());
    let start = Instant::now();
    let completion = controller.arrive_tokens("w", "l").unwrap();

    sleep(Duration::from_secs(6)).await;
    let state = controller.snapshot();
    assert_eq!(state.phase(), Phase::EastWestLeft);
    assert_axis(&state, Axis::NorthSouth, DirectionLights::RED);
    assert_axis(&state, Axis::EastWest, lights(Light::Red, Light::Green));

    sleep(Duration::from_secs(10)).await;
    let state = controller.snapshot();
    assert_eq!(state.phase(), Phase::EastWestLeft);
    assert_axis(&state, Axis::EastWest, lights(Light::Red, Light::Yellow));

    let done = completion.wait().await.unwrap();
    assert_eq!(start.elapsed(), Duration::from_secs(20));
    assert_eq!(done, IntersectionState::serving(Axis::EastWest));
}

#[tokio::test(start_paused = true)]
async fn east_right_during_north_south_completes_immediately() {
    let controller = IntersectionController::new(TimingConfig::default());
    let completion = controller.arrive_tokens("E", "r").unwrap();
    assert!(completion.is_immediate());
    assert_eq!(
        completion.wait().await.unwrap(),
        IntersectionState::default()
    );
    assert!(!controller.is_busy());
}

#[tokio::test(start_paused = true)]
async fn arrivals_mid_left_are_rejected_then_accepted() {
    let controller = IntersectionController::new(TimingConfig::default());
    let completion = controller.arrive_tokens("E", "l").unwrap();

    sleep(Duration::from_secs(6)).await;
    assert_eq!(controller.snapshot().phase(), Phase::EastWestLeft);
    let before = controller.snapshot();
    assert_eq!(
        controller.arrive_tokens("N", "s1").unwrap_err(),
        ArrivalError::SequenceInProgress
    );
    assert_eq!(controller.snapshot(), before);

    completion.wait().await.unwrap();

    // Back on a settled East-West phase; a North arrival now switches back.
    let completion = controller.arrive_tokens("N", "s2").unwrap();
    assert!(!completion.is_immediate());
    assert_eq!(
        completion.wait().await.unwrap(),
        IntersectionState::serving(Axis::NorthSouth)
    );
}

#[tokio::test(start_paused = true)]
async fn invalid_tokens_never_touch_state() {
    for axis in [Axis::NorthSouth, Axis::EastWest] {
        let controller = controller_serving(axis);
        let before = controller.snapshot();

        let err = controller.arrive_tokens("X", "s1").unwrap_err();
        assert_eq!(err, ArrivalError::InvalidDirection("X".into()));
        let err = controller.arrive_tokens("N", "z").unwrap_err();
        assert_eq!(err, ArrivalError::InvalidLane("z".into()));
        assert!(err.is_input_error());

        assert_eq!(controller.snapshot(), before);
        assert!(!controller.is_busy());
    }
}

#[tokio::test(start_paused = true)]
async fn custom_timings_are_honoured() {
    let timing = TimingConfig {
        yellow: Duration::from_secs(2),
        left_turn: Duration::from_secs(3),
    };
    let controller = IntersectionController::new(timing);
    let start = Instant::now();
    controller
        .arrive_tokens("E", "l")
        .unwrap()
        .wait()
        .await
        .unwrap();
    assert_eq!(start.elapsed(), Duration::from_secs(2 + 3 + 2));
}
