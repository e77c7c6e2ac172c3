use serde::{Deserialize, Serialize};

/// Empirical view of one noise vector next to what the Laplace scale predicts.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NoiseSummary {
    pub count: usize,
    pub mean: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    pub mean_abs: f64,
    pub max_abs: f64,
    /// How many noisy values fell below zero before display clipping.
    pub negative_values: usize,
    /// `b = Δ/ε`, also `E|n|`.
    pub expected_abs: f64,
    /// `sqrt(2) * b`.
    pub expected_std: f64,
}

impl NoiseSummary {
    pub fn from_noise(noise: &[f64], scale: f64) -> Self {
        let mut summary = Self {
            count: noise.len(),
            expected_abs: scale,
            expected_std: std::f64::consts::SQRT_2 * scale,
            ..Self::default()
        };
        if noise.is_empty() {
            return summary;
        }
        let n = noise.len() as f64;
        summary.mean = noise.iter().sum::<f64>() / n;
        summary.std_dev = (noise
            .iter()
            .map(|v| (v - summary.mean).powi(2))
            .sum::<f64>()
            / n)
            .sqrt();
        summary.mean_abs = noise.iter().map(|v| v.abs()).sum::<f64>() / n;
        summary.max_abs = noise.iter().fold(0.0, |acc: f64, v| acc.max(v.abs()));
        summary
    }

    pub fn with_negatives(mut self, noisy: &[f64]) -> Self {
        self.negative_values = noisy.iter().filter(|v| **v < 0.0).count();
        self
    }

    /// Observed mean |noise| over the predicted `b`; ~1.0 for long series.
    pub fn abs_ratio(&self) -> f64 {
        if self.expected_abs == 0.0 {
            return 0.0;
        }
        self.mean_abs / self.expected_abs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summarizes_small_vector() {
        let summary = NoiseSummary::from_noise(&[1.0, -1.0, 2.0, -2.0], 1.5)
            .with_negatives(&[3.0, -0.5, 4.0, -1.0]);
        assert_eq!(summary.count, 4);
        assert_eq!(summary.mean, 0.0);
        assert_eq!(summary.mean_abs, 1.5);
        assert_eq!(summary.max_abs, 2.0);
        assert_eq!(summary.negative_values, 2);
        assert!((summary.std_dev - 2.5f64.sqrt()).abs() < 1e-12);
        assert_eq!(summary.abs_ratio(), 1.0);
    }

    #[test]
    fn empty_noise_is_all_zero() {
        let summary = NoiseSummary::from_noise(&[], 2.0);
        assert_eq!(summary.count, 0);
        assert_eq!(summary.mean_abs, 0.0);
        assert_eq!(summary.expected_abs, 2.0);
    }
}
