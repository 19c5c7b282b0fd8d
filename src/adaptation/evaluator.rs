//! Adaptation evaluator
//!
//! Looks at a window of performance snapshots and proposes a sparse patch to
//! the active rule set. Pure: merging and persisting the patch is the
//! caller's job.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::snapshot::PerformanceSnapshot;
use crate::config::AdaptationConfig;
use crate::profile::{AnimationIntensity, ErrorHandling, RuleOverrides, RuleSet};

/// Threshold parameters for the evaluator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdaptationThresholds {
    /// Repeat rate strictly above which the learner is struggling
    pub repeat_rate: f64,
    /// Snapshots per minute strictly above which the learner is moving fast
    pub high_throughput_per_minute: f64,
}

impl Default for AdaptationThresholds {
    fn default() -> Self {
        Self::from(&AdaptationConfig::default())
    }
}

impl From<&AdaptationConfig> for AdaptationThresholds {
    fn from(config: &AdaptationConfig) -> Self {
        Self {
            repeat_rate: config.repeat_rate_threshold,
            high_throughput_per_minute: config.high_throughput_per_minute,
        }
    }
}

/// Metrics computed over a snapshot window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowMetrics {
    pub total: usize,
    pub repeat_rate: f64,
    /// Snapshots per minute; `None` when the window spans no time
    pub completion_speed: Option<f64>,
}

impl WindowMetrics {
    /// `None` for windows with fewer than two snapshots
    pub fn compute(snapshots: &[PerformanceSnapshot]) -> Option<Self> {
        if snapshots.len() < 2 {
            return None;
        }

        let total = snapshots.len();
        let repeated = snapshots.iter().filter(|s| s.repeated).count();
        let repeat_rate = repeated as f64 / total as f64;

        let first = snapshots.iter().map(|s| s.timestamp).min()?;
        let last = snapshots.iter().map(|s| s.timestamp).max()?;
        let elapsed_minutes = (last - first).num_milliseconds() as f64 / 60_000.0;
        let completion_speed = if elapsed_minutes > 0.0 {
            Some(total as f64 / elapsed_minutes)
        } else {
            None
        };

        Some(Self {
            total,
            repeat_rate,
            completion_speed,
        })
    }
}

/// Propose rule overrides for the observed window.
///
/// - repeat rate above threshold: low animation, errorless handling
/// - throughput above threshold: high animation
///
/// When both fire the repeat-rate rule owns `animation_intensity`.
/// Windows with fewer than two snapshots yield no overrides.
pub fn evaluate(
    current: &RuleSet,
    snapshots: &[PerformanceSnapshot],
    thresholds: &AdaptationThresholds,
) -> RuleOverrides {
    let mut overrides = RuleOverrides::default();

    let Some(metrics) = WindowMetrics::compute(snapshots) else {
        debug!("Not enough snapshots to adapt ({})", snapshots.len());
        return overrides;
    };

    let struggling = metrics.repeat_rate > thresholds.repeat_rate;
    if struggling {
        overrides.animation_intensity = Some(AnimationIntensity::Low);
        overrides.error_handling = Some(ErrorHandling::Errorless);
        info!(
            "Repeat rate {:.2} above {:.2}: animation {:?} -> Low, errors {:?} -> Errorless",
            metrics.repeat_rate, thresholds.repeat_rate, current.animation_intensity, current.error_handling
        );
    }

    if let Some(speed) = metrics.completion_speed {
        if speed > thresholds.high_throughput_per_minute {
            if struggling {
                debug!("High throughput ({:.2}/min) ignored while struggling", speed);
            } else {
                overrides.animation_intensity = Some(AnimationIntensity::High);
                info!(
                    "Throughput {:.2}/min above {:.2}: animation {:?} -> High",
                    speed, thresholds.high_throughput_per_minute, current.animation_intensity
                );
            }
        }
    }

    overrides
}
