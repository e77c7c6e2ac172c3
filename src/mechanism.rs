//! Laplace mechanism: `x̃ = x + Lap(0, Δ/ε)` applied independently per time step.
//!
//! The returned [`NoisySeries`] is never clipped. Negative values are a valid
//! outcome of the mechanism; clipping belongs to whoever draws the series.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::Serialize;
use tracing::debug;

use crate::errors::{LaplaceError, LaplaceResult};
use crate::types::{CountSeries, NoisySeries, PrivacyBudget, Sensitivity};

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct LaplaceMechanism {
    epsilon: PrivacyBudget,
    sensitivity: Sensitivity,
}

impl LaplaceMechanism {
    /// Fails when `Δ/ε` is too large for every draw to stay finite.
    pub fn new(epsilon: PrivacyBudget, sensitivity: Sensitivity) -> LaplaceResult<Self> {
        let scale = sensitivity.value() / epsilon.value();
        // Largest |ln(tail)| a draw can produce is -ln(f64::MIN_POSITIVE).
        if !(scale * f64::MIN_POSITIVE.ln()).is_finite() {
            return Err(LaplaceError::invalid(
                "epsilon",
                format!(
                    "scale {} / {} overflows",
                    sensitivity.value(),
                    epsilon.value()
                ),
            ));
        }
        Ok(Self {
            epsilon,
            sensitivity,
        })
    }

    /// Validates raw floats; fails before any noise is drawn.
    pub fn from_raw(epsilon: f64, sensitivity: f64) -> LaplaceResult<Self> {
        Self::new(PrivacyBudget::new(epsilon)?, Sensitivity::new(sensitivity)?)
    }

    pub fn epsilon(&self) -> PrivacyBudget {
        self.epsilon
    }

    pub fn sensitivity(&self) -> Sensitivity {
        self.sensitivity
    }

    /// Laplace scale `b = Δ / ε`.
    pub fn scale(&self) -> f64 {
        self.sensitivity.value() / self.epsilon.value()
    }

    /// `E|n| = b` for `n ~ Lap(0, b)`.
    pub fn expected_abs_noise(&self) -> f64 {
        self.scale()
    }

    /// Standard deviation of `Lap(0, b)`, `sqrt(2) * b`.
    pub fn expected_std(&self) -> f64 {
        std::f64::consts::SQRT_2 * self.scale()
    }

    /// Draw `len` noise terms from a stream seeded with `seed`.
    ///
    /// The i-th term only depends on the i-th uniform draw of the stream.
    pub fn sample_noise(&self, len: usize, seed: u64) -> Vec<f64> {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let b = self.scale();
        (0..len).map(|_| sample_laplace(&mut rng, b)).collect()
    }

    pub fn apply(&self, series: &CountSeries, seed: u64) -> NoisySeries {
        let noise = self.sample_noise(series.len(), seed);
        let noisy: Vec<f64> = series
            .iter_f64()
            .zip(noise)
            .map(|(count, n)| count + n)
            .collect();
        debug!(
            epsilon = self.epsilon.value(),
            sensitivity = self.sensitivity.value(),
            scale = self.scale(),
            len = noisy.len(),
            seed,
            "applied laplace mechanism"
        );
        NoisySeries::new(noisy)
    }
}

/// Contract form: validate, then perturb every count with independent Laplace noise.
pub fn apply_laplace_noise(
    series: &CountSeries,
    epsilon: f64,
    sensitivity: f64,
    seed: u64,
) -> LaplaceResult<NoisySeries> {
    let mechanism = LaplaceMechanism::from_raw(epsilon, sensitivity)?;
    Ok(mechanism.apply(series, seed))
}

/// Inverse-CDF sample of `Lap(0, b)` from one uniform draw.
fn sample_laplace<R: Rng + ?Sized>(rng: &mut R, b: f64) -> f64 {
    // u in [-0.5, 0.5); 1 - 2|u| in (0, 1] except at u = -0.5.
    let u: f64 = rng.gen::<f64>() - 0.5;
    let tail = (1.0 - 2.0 * u.abs()).max(f64::MIN_POSITIVE);
    -b * u.signum() * tail.ln()
}
