//! Completion-time estimation
//!
//! Extrapolates the duration of the most recent generation over the
//! generations still to run. Pure: the caller supplies "now".

use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::types::ProgressCounters;

/// Projected finish of a run
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEstimate {
    /// loops requested × generations per loop
    pub total_generations: u64,
    pub remaining_generations: u64,
    pub time_per_generation: Duration,
    pub remaining_duration: Duration,
    pub estimated_completion: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EstimateOutcome {
    /// No generation has completed yet; callers must not send anything
    NothingToReport,
    /// Last generation timing is missing, zero or negative
    InsufficientData,
    Estimate(ProgressEstimate),
}

impl EstimateOutcome {
    pub fn estimate(&self) -> Option<&ProgressEstimate> {
        match self {
            EstimateOutcome::Estimate(estimate) => Some(estimate),
            _ => None,
        }
    }
}

/// Estimate completion from the counters as of `now`
pub fn estimate(counters: &ProgressCounters, now: DateTime<Utc>) -> EstimateOutcome {
    let total_generations = counters.total_generations();

    if counters.generations_completed == 0 {
        return EstimateOutcome::NothingToReport;
    }

    let (Some(start), Some(stop)) = (counters.last_generation_start, counters.last_generation_stop) else {
        return EstimateOutcome::InsufficientData;
    };

    // to_std() fails on negative spans (clock skew)
    let time_per_generation = match (stop - start).to_std() {
        Ok(span) if !span.is_zero() => span,
        _ => return EstimateOutcome::InsufficientData,
    };

    let remaining_generations = total_generations.saturating_sub(counters.generations_completed);
    let remaining_duration = scale(time_per_generation, remaining_generations);

    let estimated_completion = chrono::Duration::from_std(remaining_duration)
        .ok()
        .and_then(|remaining| now.checked_add_signed(remaining))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);

    EstimateOutcome::Estimate(ProgressEstimate {
        total_generations,
        remaining_generations,
        time_per_generation,
        remaining_duration,
        estimated_completion,
    })
}

/// `per * count`, saturating at `Duration::MAX`
fn scale(per: Duration, count: u64) -> Duration {
    const NANOS_PER_SEC: u128 = 1_000_000_000;

    per.as_nanos()
        .checked_mul(u128::from(count))
        .and_then(|nanos| {
            let secs = u64::try_from(nanos / NANOS_PER_SEC).ok()?;
            Some(Duration::new(secs, (nanos % NANOS_PER_SEC) as u32))
        })
        .unwrap_or(Duration::MAX)
}
