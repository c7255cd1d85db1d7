//! Reel timing profiles and the deceleration schedule

use serde::{Deserialize, Serialize};

/// Timing profile for reel animation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimingProfile {
    /// Normal draw timing
    #[default]
    Normal,
    /// Fast mode
    Turbo,
    /// No delays (headless runs and tests)
    Instant,
    /// Scaled from another profile
    Custom,
}

/// Reel timing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReelTiming {
    /// Profile type
    pub profile: TimingProfile,

    /// Wall-clock length of the whole spin, excluding settle gaps (ms)
    pub total_duration_ms: f64,

    /// Pause after each offset reset before the next step (ms)
    pub settle_interval_ms: f64,
}

impl ReelTiming {
    /// Normal timing
    pub fn normal() -> Self {
        Self {
            profile: TimingProfile::Normal,
            total_duration_ms: 10_000.0,
            settle_interval_ms: 20.0,
        }
    }

    /// Turbo mode
    pub fn turbo() -> Self {
        Self {
            profile: TimingProfile::Turbo,
            total_duration_ms: 4_000.0,
            settle_interval_ms: 10.0,
        }
    }

    /// Instant: every step completes on the first advance
    pub fn instant() -> Self {
        Self {
            profile: TimingProfile::Instant,
            total_duration_ms: 0.0,
            settle_interval_ms: 0.0,
        }
    }

    /// Get timing for profile
    pub fn from_profile(profile: TimingProfile) -> Self {
        match profile {
            TimingProfile::Normal => Self::normal(),
            TimingProfile::Turbo => Self::turbo(),
            TimingProfile::Instant => Self::instant(),
            TimingProfile::Custom => Self::normal(),
        }
    }

    /// Scale timing by factor (< 1.0 = faster)
    pub fn scaled(&self, factor: f64) -> Self {
        let factor = factor.max(0.0);
        Self {
            profile: TimingProfile::Custom,
            total_duration_ms: self.total_duration_ms * factor,
            settle_interval_ms: self.settle_interval_ms * factor,
        }
    }

    /// Step durations for a spin of `total_steps`
    pub fn schedule(&self, total_steps: usize) -> Vec<f64> {
        step_durations(total_steps, self.total_duration_ms)
    }

    /// Total wall-clock time of a spin including settle gaps (ms)
    pub fn spin_duration(&self, total_steps: usize) -> f64 {
        self.total_duration_ms + total_steps.saturating_sub(1) as f64 * self.settle_interval_ms
    }
}

impl Default for ReelTiming {
    fn default() -> Self {
        Self::normal()
    }
}

/// Quartic ease-in: `t⁴` for `t` in `[0, 1]`
#[inline]
pub fn ease_in_quart(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * t * t
}

/// Per-step durations under the quartic ease-in.
///
/// Step `i` (1-based) gets `(ease(i/n) - ease((i-1)/n)) * duration_ms`.
/// The cursor moves one slot per step, so growing step durations read as
/// the reel slowing down. Durations sum to `duration_ms`.
pub fn step_durations(total_steps: usize, duration_ms: f64) -> Vec<f64> {
    let n = total_steps as f64;
    (1..=total_steps)
        .map(|i| {
            let t1 = i as f64 / n;
            let t0 = (i - 1) as f64 / n;
            (ease_in_quart(t1) - ease_in_quart(t0)) * duration_ms
        })
        .collect()
}
