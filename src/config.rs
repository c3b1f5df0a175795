use crate::error::ConfigError;
use crate::global_variables::{
    ENV_LEFT_TURN_SECS, ENV_SNAPSHOT_CSV, ENV_YELLOW_SECS, LEFT_TURN_SECONDS, YELLOW_TIME_SECONDS,
};
use std::env;
use std::path::PathBuf;
use tokio::time::Duration;

/// Durations of the timed stages of a transition sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingConfig {
    /// How long an axis shows yellow before going red (also the EW left-turn clearance).
    pub yellow: Duration,
    /// How long a protected left turn stays green.
    pub left_turn: Duration,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            yellow: Duration::from_secs(YELLOW_TIME_SECONDS),
            left_turn: Duration::from_secs(LEFT_TURN_SECONDS),
        }
    }
}

impl TimingConfig {
    /// Reads overrides from the process environment, falling back to the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as `from_env` but with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            yellow: seconds_or(&lookup, ENV_YELLOW_SECS, defaults.yellow)?,
            left_turn: seconds_or(&lookup, ENV_LEFT_TURN_SECS, defaults.left_turn)?,
        })
    }
}

fn seconds_or<F>(lookup: &F, key: &'static str, default: Duration) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    let secs = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::NotANumber {
            key,
            value: raw.clone(),
        })?;
    if secs == 0 {
        return Err(ConfigError::ZeroInterval { key });
    }
    Ok(Duration::from_secs(secs))
}

/// Where the monitoring system appends snapshot rows, if anywhere.
pub fn snapshot_csv_path() -> Option<PathBuf> {
    env::var_os(ENV_SNAPSHOT_CSV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}
