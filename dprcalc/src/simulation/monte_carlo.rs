use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

use crate::{
    error::{DprError, Result},
    rules::profile::AttackProfile,
    statistics::{
        expected::{CalcInput, calc_input_from_profile},
        probability::{crit_probability, hit_probability},
        roller::Roller,
    },
};

/// Two-sided 95% normal quantile.
pub const Z_95: f64 = 1.96;

/// Trial bounds a caller is expected to clamp to before simulating.
pub const MIN_TRIALS: i64 = 1_000;
pub const MAX_TRIALS: i64 = 200_000;

pub fn clamp_trials(trials: i64) -> i64 {
    trials.clamp(MIN_TRIALS, MAX_TRIALS)
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimResult {
    pub mean: f64,
    pub ci_low: f64,
    pub ci_high: f64,
}

/// Single-pass mean and variance accumulator (Welford's update), constant
/// memory regardless of sample count.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct RunningStats {
    n: u64,
    mean: f64,
    sum_sq_dev: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.n += 1;
        let delta = value - self.mean;
        self.mean += delta / self.n as f64;
        let delta2 = value - self.mean;
        self.sum_sq_dev += delta * delta2;
    }

    pub fn count(&self) -> u64 {
        self.n
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Unbiased sample variance; zero with fewer than two samples.
    pub fn sample_variance(&self) -> f64 {
        if self.n < 2 {
            return 0.0;
        }
        (self.sum_sq_dev / (self.n - 1) as f64).max(0.0)
    }

    pub fn standard_error(&self) -> f64 {
        if self.n == 0 {
            return 0.0;
        }
        (self.sample_variance() / self.n as f64).sqrt()
    }

    /// Normal-approximation interval `mean ± z * standard_error`.
    pub fn confidence_interval(&self, z: f64) -> (f64, f64) {
        let half_width = z * self.standard_error();
        (self.mean - half_width, self.mean + half_width)
    }
}

/// Estimates DPR by sampling `trials` attacks, with a 95% confidence interval.
///
/// Each trial is classified as a crit, a non-crit hit or a miss and scores the
/// corresponding average damage, so the spread reflects the outcome classes
/// rather than individual die faces. `trials <= 0` returns all zeros without
/// sampling.
pub fn simulate(trials: i64, params: &CalcInput, roller: &mut Roller) -> Result<SimResult> {
    simulate_with_z(trials, params, Z_95, roller)
}

/// [`simulate`] with a fresh OS-seeded random source.
pub fn simulate_dpr(trials: i64, params: &CalcInput) -> Result<SimResult> {
    simulate(trials, params, &mut Roller::new())
}

/// [`simulate`] with a confidence level other than 95%, e.g. `0.99`.
pub fn simulate_with_confidence(
    trials: i64,
    params: &CalcInput,
    confidence: f64,
    roller: &mut Roller,
) -> Result<SimResult> {
    if !(confidence > 0.0 && confidence < 1.0) {
        return Err(DprError::InvalidSimulationInput(format!(
            "confidence must be between 0 and 1 (received {confidence})"
        )));
    }
    let z = if (confidence - 0.95).abs() < f64::EPSILON {
        Z_95
    } else {
        Normal::standard().inverse_cdf(0.5 + confidence / 2.0)
    };
    simulate_with_z(trials, params, z, roller)
}

/// Validates a profile, averages its damage and simulates it.
pub fn simulate_profile(
    trials: i64,
    profile: &AttackProfile,
    roller: &mut Roller,
) -> Result<SimResult> {
    let params = calc_input_from_profile(profile)?;
    simulate(trials, &params, roller)
}

fn simulate_with_z(trials: i64, params: &CalcInput, z: f64, roller: &mut Roller) -> Result<SimResult> {
    if trials <= 0 {
        return Ok(SimResult::default());
    }
    params.validate()?;

    let mode = params.roll_mode();
    let p_crit = crit_probability(params.crit_range, mode).clamp(0.0, 1.0);
    let p_hit_not_crit =
        (hit_probability(params.attack_bonus, params.target_ac, mode) - p_crit).clamp(0.0, 1.0 - p_crit);

    let start = chrono::Utc::now();
    let mut stats = RunningStats::default();
    for _ in 0..trials {
        let u = roller.unit();
        let damage = if u < p_crit {
            params.avg_on_crit
        } else if u < p_crit + p_hit_not_crit {
            params.avg_on_hit
        } else {
            0.0
        };
        stats.push(damage);
    }
    let elapsed = chrono::Utc::now() - start;
    log::debug!(
        "Simulated {} trials in {} ms (p_crit {:.4}, p_hit_not_crit {:.4})",
        trials,
        elapsed.num_milliseconds(),
        p_crit,
        p_hit_not_crit
    );

    let (ci_low, ci_high) = stats.confidence_interval(z);
    Ok(SimResult {
        mean: stats.mean(),
        ci_low,
        ci_high,
    })
}
