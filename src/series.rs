//! Synthetic epidemic-like count series: a Gaussian bump plus measurement noise.

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{LaplaceError, LaplaceResult};
use crate::types::{CountSeries, TimeIndex};

/// Ceiling for `peak` and `noise_std`; counts stay exact in an `f64` and far below `u64::MAX`.
pub const MAX_MAGNITUDE: f64 = 1e15;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeriesParams {
    /// Number of time steps `T`.
    pub len: usize,
    /// Height of the bell curve before noise.
    pub peak: f64,
    /// Standard deviation of the additive Gaussian measurement noise.
    pub noise_std: f64,
    pub seed: u64,
}

impl Default for SeriesParams {
    fn default() -> Self {
        Self {
            len: 40,
            peak: 50.0,
            noise_std: 2.0,
            seed: 42,
        }
    }
}

impl SeriesParams {
    pub fn validate(&self) -> LaplaceResult<()> {
        if self.len == 0 {
            return Err(LaplaceError::invalid("length", "series needs at least one time step"));
        }
        if u32::try_from(self.len).is_err() {
            return Err(LaplaceError::invalid("length", format!("{} time steps is too many", self.len)));
        }
        if !self.peak.is_finite() || self.peak <= 0.0 || self.peak > MAX_MAGNITUDE {
            return Err(LaplaceError::invalid(
                "peak",
                format!("{} must be in (0, {MAX_MAGNITUDE:e}]", self.peak),
            ));
        }
        if !self.noise_std.is_finite() || self.noise_std < 0.0 || self.noise_std > MAX_MAGNITUDE {
            return Err(LaplaceError::invalid(
                "noise_std",
                format!("{} must be in [0, {MAX_MAGNITUDE:e}]", self.noise_std),
            ));
        }
        Ok(())
    }

    fn center(&self) -> f64 {
        (self.len / 2) as f64
    }

    fn width(&self) -> f64 {
        self.len as f64 / 6.0
    }

    /// Noise-free curve value at step `t`.
    pub fn curve_at(&self, t: usize) -> f64 {
        let z = (t as f64 - self.center()) / self.width();
        self.peak * (-0.5 * z * z).exp()
    }
}

/// Build the time index and count series for `params`.
///
/// Same parameters always give the same counts; every count is `>= 0`.
pub fn generate(params: &SeriesParams) -> LaplaceResult<(TimeIndex, CountSeries)> {
    params.validate()?;
    let mut rng = ChaCha20Rng::seed_from_u64(params.seed);
    let jitter = if params.noise_std > 0.0 {
        Some(
            Normal::new(0.0, params.noise_std)
                .map_err(|err| LaplaceError::invalid("noise_std", err.to_string()))?,
        )
    } else {
        None
    };

    let counts: Vec<u64> = (0..params.len)
        .map(|t| {
            let noise = jitter
                .as_ref()
                .map(|normal| normal.sample(&mut rng))
                .unwrap_or(0.0);
            (params.curve_at(t) + noise).max(0.0).round() as u64
        })
        .collect();

    debug!(
        len = params.len,
        peak = params.peak,
        noise_std = params.noise_std,
        seed = params.seed,
        max_count = counts.iter().copied().max().unwrap_or(0),
        "generated synthetic count series"
    );
    Ok((TimeIndex::with_len(params.len), CountSeries::new(counts)))
}
