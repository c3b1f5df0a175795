// Default light timings
pub const YELLOW_TIME_SECONDS: u64 = 5;
pub const LEFT_TURN_SECONDS: u64 = 10;

// Environment overrides
pub const ENV_YELLOW_SECS: &str = "INTERSECTION_YELLOW_SECS";
pub const ENV_LEFT_TURN_SECS: &str = "INTERSECTION_LEFT_TURN_SECS";
pub const ENV_SNAPSHOT_CSV: &str = "INTERSECTION_SNAPSHOT_CSV";

// CLI
pub const ARRIVAL_PROMPT: &str = "Enter car arrival (from direction,lane): ";
