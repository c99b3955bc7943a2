use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::detection::domain::blink_detector::{
    BlinkThresholds, DEFAULT_CLOSE_THRESHOLD, DEFAULT_MIN_CLOSE_MS, DEFAULT_OPEN_MARGIN,
    DEFAULT_REFRACTORY_MS,
};
use crate::detection::domain::exponential_smoother::{DEFAULT_EAR_ALPHA, DEFAULT_YAW_ALPHA};
use crate::detection::domain::turn_detector::{
    TurnThresholds, DEFAULT_HOLD_MIN_MS, DEFAULT_YAW_ABS_THRESHOLD,
};

pub const DEFAULT_SESSION_WINDOW_MS: u64 = 8_000;
pub const DEFAULT_REQUIRED_BLINKS: u32 = 2;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{field} must be a finite number greater than zero, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error("{field} must be greater than zero milliseconds")]
    ZeroDuration { field: &'static str },

    #[error("{field} must lie in (0, 1], got {value}")]
    AlphaOutOfRange { field: &'static str, value: f64 },

    #[error("required_blinks must be at least 1")]
    NoBlinksRequired,

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Tuning for one liveness session. Every field has a default, so a config
/// file only needs to name what it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LivenessConfig {
    /// Smoothed average EAR below which the eyes count as closed.
    pub ear_close_threshold: f64,
    /// Added to the close threshold to get the reopen threshold.
    pub ear_open_margin: f64,
    pub ear_close_min_ms: u64,
    pub blink_refractory_ms: u64,
    pub yaw_abs_threshold: f64,
    pub yaw_hold_min_ms: u64,
    pub ema_alpha_ear: f64,
    pub ema_alpha_yaw: f64,
    /// Time budget for the challenge. Crossing it always raises an event;
    /// frames are only refused afterwards with `enforce_session_window`.
    pub session_window_ms: u64,
    pub enforce_session_window: bool,
    pub required_blinks: u32,
}

impl Default for LivenessConfig {
    fn default() -> Self {
        Self {
            ear_close_threshold: DEFAULT_CLOSE_THRESHOLD,
            ear_open_margin: DEFAULT_OPEN_MARGIN,
            ear_close_min_ms: DEFAULT_MIN_CLOSE_MS,
            blink_refractory_ms: DEFAULT_REFRACTORY_MS,
            yaw_abs_threshold: DEFAULT_YAW_ABS_THRESHOLD,
            yaw_hold_min_ms: DEFAULT_HOLD_MIN_MS,
            ema_alpha_ear: DEFAULT_EAR_ALPHA,
            ema_alpha_yaw: DEFAULT_YAW_ALPHA,
            session_window_ms: DEFAULT_SESSION_WINDOW_MS,
            enforce_session_window: false,
            required_blinks: DEFAULT_REQUIRED_BLINKS,
        }
    }
}

impl LivenessConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reject configurations the detectors cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("ear_close_threshold", self.ear_close_threshold)?;
        // A non-positive margin would collapse the hysteresis band.
        positive("ear_open_margin", self.ear_open_margin)?;
        positive("yaw_abs_threshold", self.yaw_abs_threshold)?;

        non_zero("ear_close_min_ms", self.ear_close_min_ms)?;
        non_zero("blink_refractory_ms", self.blink_refractory_ms)?;
        non_zero("yaw_hold_min_ms", self.yaw_hold_min_ms)?;
        non_zero("session_window_ms", self.session_window_ms)?;

        alpha("ema_alpha_ear", self.ema_alpha_ear)?;
        alpha("ema_alpha_yaw", self.ema_alpha_yaw)?;

        if self.required_blinks == 0 {
            return Err(ConfigError::NoBlinksRequired);
        }
        Ok(())
    }

    pub fn blink_thresholds(&self) -> BlinkThresholds {
        BlinkThresholds {
            close_threshold: self.ear_close_threshold,
            open_margin: self.ear_open_margin,
            min_close_ms: self.ear_close_min_ms,
            refractory_ms: self.blink_refractory_ms,
        }
    }

    pub fn turn_thresholds(&self) -> TurnThresholds {
        TurnThresholds {
            yaw_abs_threshold: self.yaw_abs_threshold,
            hold_min_ms: self.yaw_hold_min_ms,
        }
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn non_zero(field: &'static str, value: u64) -> Result<(), ConfigError> {
    if value == 0 {
        Err(ConfigError::ZeroDuration { field })
    } else {
        Ok(())
    }
}

fn alpha(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::AlphaOutOfRange { field, value })
    }
}
