//! Synthetic history for the "history + forecast" chart mode
//!
//! History is a back-projection of the current amount along the average curve,
//! optionally jittered for presentation. It is not a modelled scenario; the
//! forecast half stays fully deterministic.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::ProjectionSeries;
use crate::error::{CoreResult, ProjectionError};

/// Default relative noise applied to history points (+/-5%)
pub const DEFAULT_JITTER_AMPLITUDE: f64 = 0.05;

/// Longest synthetic history that will be generated
pub const MAX_HISTORY_YEARS: u32 = 100;

/// Bounded multiplicative noise for history points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Jitter {
    /// Maximum relative deviation, in [0, 1)
    pub amplitude: f64,
    /// Seed for reproducible output; entropy when `None`
    pub seed: Option<u64>,
}

impl Jitter {
    pub fn seeded(seed: u64) -> Self {
        Self {
            amplitude: DEFAULT_JITTER_AMPLITUDE,
            seed: Some(seed),
        }
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        }
    }
}

impl Default for Jitter {
    fn default() -> Self {
        Self {
            amplitude: DEFAULT_JITTER_AMPLITUDE,
            seed: None,
        }
    }
}

/// How much history to synthesize
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Number of past years shown before "now"
    pub years: u32,
    /// Presentation noise; `None` gives the exact back-projection
    pub jitter: Option<Jitter>,
}

impl HistoryConfig {
    /// Exact back-projection with no noise
    pub fn exact(years: u32) -> Self {
        Self { years, jitter: None }
    }

    pub fn with_jitter(years: u32, jitter: Jitter) -> Self {
        Self {
            years,
            jitter: Some(jitter),
        }
    }
}

/// One history point; `offset` is years relative to now (-years..=0)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub offset: i32,
    pub value: f64,
}

/// History followed by the deterministic forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryAndForecast {
    pub history: Vec<HistoryPoint>,
    pub forecast: ProjectionSeries,
}

impl HistoryAndForecast {
    pub fn history_years(&self) -> u32 {
        self.history.len().saturating_sub(1) as u32
    }
}

/// Back-project `amount` along `avg_multiplier` for `config.years` years
pub fn back_project(amount: f64, avg_multiplier: f64, config: &HistoryConfig) -> CoreResult<Vec<HistoryPoint>> {
    match &config.jitter {
        Some(jitter) => back_project_with_rng(
            amount,
            avg_multiplier,
            config.years,
            jitter.amplitude,
            &mut jitter.rng(),
        ),
        // Zero amplitude never samples, so any generator will do
        None => back_project_with_rng(
            amount,
            avg_multiplier,
            config.years,
            0.0,
            &mut StdRng::seed_from_u64(0),
        ),
    }
}

/// Back-projection with a caller-supplied random source.
///
/// Point `i` (0..years) is `amount / avg^(years - i)` times `1 + U(-amplitude, amplitude)`.
/// The final point is exactly `amount`. Fails with `InvalidInput` when `years`
/// exceeds [`MAX_HISTORY_YEARS`] or `amplitude` is outside [0, 1).
pub fn back_project_with_rng<R: Rng>(
    amount: f64,
    avg_multiplier: f64,
    years: u32,
    amplitude: f64,
    rng: &mut R,
) -> CoreResult<Vec<HistoryPoint>> {
    if years > MAX_HISTORY_YEARS {
        return Err(ProjectionError::invalid_input(
            "historyYears",
            format!("must be at most {}, got {}", MAX_HISTORY_YEARS, years),
        ));
    }
    if !(0.0..1.0).contains(&amplitude) {
        return Err(ProjectionError::invalid_input(
            "jitter.amplitude",
            format!("must be in [0, 1), got {}", amplitude),
        ));
    }

    let mut points = Vec::with_capacity(years as usize + 1);

    for i in 0..years {
        let remaining = (years - i) as i32;
        let noise = if amplitude > 0.0 {
            1.0 + rng.gen_range(-amplitude..amplitude)
        } else {
            1.0
        };
        points.push(HistoryPoint {
            offset: -remaining,
            value: amount / avg_multiplier.powi(remaining) * noise,
        });
    }

    points.push(HistoryPoint { offset: 0, value: amount });
    Ok(points)
}
