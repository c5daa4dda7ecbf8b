//! # The aspect scanning engine
//!
//! Given two or more moving bodies expressed as time-varying ecliptic
//! longitudes, this module finds every instant within a time window at which
//! the angular separation of a pair equals a target aspect angle, within the
//! pair- and aspect-specific orb. The work is split between:
//!
//! 1. **Pair scanning** ([`scan_pair`](crate::scan::pair::scan_pair)) —
//!    sampling one pair's separation at a fixed step, bracketing sign
//!    changes of `separation − target`, refining each crossing by bisection,
//!    deduplicating near-simultaneous roots, and filtering by orb policy.
//! 2. **Range scanning** ([`scan_time_range`](crate::scan::range::scan_time_range)) —
//!    fanning the pair scanner out across all (or a restricted set of)
//!    unordered pairs and merging the hits into one time-sorted vector.
//!
//! The sampling loop is CPU-bound and sequential; the only way to bound a
//! pathological wide-window/small-step request is the cooperative
//! [`CancelToken`] checked at every sample step.

pub mod pair;
pub mod range;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use hifitime::{Duration, Epoch};
use serde::{Deserialize, Serialize};

use crate::aspectarian_errors::AspectarianError;
use crate::constants::{Body, Degree, SECONDS_PER_MINUTE};

pub use pair::scan_pair;
pub use range::scan_time_range;

/// Smallest accepted sampling step, in minutes.
pub const MIN_STEP_MINUTES: u32 = 1;

/// Largest accepted sampling step, in minutes (half a day).
pub const MAX_STEP_MINUTES: u32 = 720;

/// Half-open scan window with UTC-normalized boundaries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeWindow {
    start: Epoch,
    end: Epoch,
}

impl TimeWindow {
    /// Build a window, rejecting non-positive durations.
    pub fn new(start: Epoch, end: Epoch) -> Result<Self, AspectarianError> {
        if end <= start {
            return Err(AspectarianError::InvalidWindow { start, end });
        }
        Ok(TimeWindow { start, end })
    }

    pub fn start(&self) -> Epoch {
        self.start
    }

    pub fn end(&self) -> Epoch {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Clamp an instant into the window. Bisection can overshoot a boundary
    /// by a sub-second epsilon.
    pub(crate) fn clamp(&self, time: Epoch) -> Epoch {
        if time < self.start {
            self.start
        } else if time > self.end {
            self.end
        } else {
            time
        }
    }
}

/// One confirmed crossing of a pair's separation through a target angle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    pub a: Body,
    pub b: Body,
    /// The expanded target angle that was crossed, in degrees.
    pub aspect_angle: Degree,
    pub exact_time: Epoch,
    /// |observed separation − aspect_angle| at `exact_time`, in degrees.
    pub orb: f64,
    /// The orb limit the policy resolved for this pair and angle.
    pub orb_limit: f64,
}

/// Cooperative cancellation signal threaded through the sampling loop.
///
/// Cloning shares the underlying flag: cancelling one handle cancels every
/// scan holding a clone.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelToken {
    pub fn new() -> Self {
        CancelToken::default()
    }

    /// A token that additionally trips once the wall-clock deadline passes.
    pub fn with_deadline(deadline: Instant) -> Self {
        CancelToken {
            flag: Arc::new(AtomicBool::new(false)),
            deadline: Some(deadline),
        }
    }

    /// Request cancellation of every scan sharing this token.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    pub(crate) fn check(&self) -> Result<(), AspectarianError> {
        if self.is_cancelled() {
            return Err(AspectarianError::Cancelled);
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(AspectarianError::DeadlineExceeded);
            }
        }
        Ok(())
    }
}

/// Tunable knobs of one scan invocation.
///
/// The sampling step is a precision/performance trade-off, not an engine
/// invariant: bracketing assumes the separation is monotonic-enough within
/// one step to contain a single root.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub step: Duration,
    /// Roots of the same target angle closer together than this are treated
    /// as one event re-detected through step granularity.
    pub dedup: Duration,
    pub cancel: CancelToken,
}

impl Default for ScanConfig {
    fn default() -> Self {
        ScanConfig {
            step: Duration::from_seconds(60.0 * SECONDS_PER_MINUTE),
            dedup: Duration::from_seconds(120.0 * SECONDS_PER_MINUTE),
            cancel: CancelToken::new(),
        }
    }
}

impl ScanConfig {
    /// Build a config from the wire-level minute counts, validating the step
    /// against [`MIN_STEP_MINUTES`]..=[`MAX_STEP_MINUTES`].
    pub fn from_minutes(step_minutes: u32, dedup_minutes: u32) -> Result<Self, AspectarianError> {
        if !(MIN_STEP_MINUTES..=MAX_STEP_MINUTES).contains(&step_minutes) {
            return Err(AspectarianError::InvalidStep(step_minutes));
        }
        Ok(ScanConfig {
            step: Duration::from_seconds(step_minutes as f64 * SECONDS_PER_MINUTE),
            dedup: Duration::from_seconds(dedup_minutes as f64 * SECONDS_PER_MINUTE),
            cancel: CancelToken::new(),
        })
    }

    /// Attach a cancellation token, replacing the default inert one.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }
}

#[cfg(test)]
mod scan_mod_test {
    use super::*;

    #[test]
    fn test_window_rejects_non_positive_duration() {
        let t0 = Epoch::from_gregorian_utc(2025, 1, 1, 0, 0, 0, 0);
        let t1 = Epoch::from_gregorian_utc(2025, 1, 2, 0, 0, 0, 0);

        assert!(TimeWindow::new(t0, t1).is_ok());
        assert_eq!(
            TimeWindow::new(t1, t0),
            Err(AspectarianError::InvalidWindow { start: t1, end: t0 })
        );
        assert!(TimeWindow::new(t0, t0).is_err());
    }

    #[test]
    fn test_window_clamp() {
        let t0 = Epoch::from_gregorian_utc(2025, 1, 1, 0, 0, 0, 0);
        let t1 = Epoch::from_gregorian_utc(2025, 1, 2, 0, 0, 0, 0);
        let window = TimeWindow::new(t0, t1).unwrap();

        let before = t0 - Duration::from_seconds(0.5);
        let after = t1 + Duration::from_seconds(0.5);
        assert_eq!(window.clamp(before), t0);
        assert_eq!(window.clamp(after), t1);
    }

    #[test]
    fn test_step_validation() {
        assert!(ScanConfig::from_minutes(1, 0).is_ok());
        assert!(ScanConfig::from_minutes(720, 120).is_ok());
        assert_eq!(
            ScanConfig::from_minutes(0, 120).unwrap_err(),
            AspectarianError::InvalidStep(0)
        );
        assert_eq!(
            ScanConfig::from_minutes(721, 120).unwrap_err(),
            AspectarianError::InvalidStep(721)
        );
    }

    #[test]
    fn test_cancel_token_shared_flag() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(token.check().is_ok());
        clone.cancel();
        assert_eq!(token.check().unwrap_err(), AspectarianError::Cancelled);
    }
}
