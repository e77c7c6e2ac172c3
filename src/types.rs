use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{LaplaceError, LaplaceResult};

/// Privacy budget ε. Smaller values mean stronger privacy and wider noise.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct PrivacyBudget(f64);

impl PrivacyBudget {
    pub fn new(epsilon: f64) -> LaplaceResult<Self> {
        positive_finite("epsilon", epsilon).map(Self)
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for PrivacyBudget {
    type Error = LaplaceError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PrivacyBudget> for f64 {
    fn from(value: PrivacyBudget) -> Self {
        value.0
    }
}

impl fmt::Display for PrivacyBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 0.2 / 1.0 / 5.0, matching how budgets are usually written down.
        if self.0.fract() == 0.0 {
            write!(f, "{:.1}", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Sensitivity Δ: the most one individual can move a single count.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Sensitivity(f64);

impl Sensitivity {
    pub fn new(delta: f64) -> LaplaceResult<Self> {
        positive_finite("sensitivity", delta).map(Self)
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for Sensitivity {
    fn default() -> Self {
        Self(1.0)
    }
}

impl TryFrom<f64> for Sensitivity {
    type Error = LaplaceError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Sensitivity> for f64 {
    fn from(value: Sensitivity) -> Self {
        value.0
    }
}

fn positive_finite(name: &'static str, value: f64) -> LaplaceResult<f64> {
    if !value.is_finite() {
        return Err(LaplaceError::invalid(name, format!("{value} is not finite")));
    }
    if value <= 0.0 {
        return Err(LaplaceError::invalid(name, format!("{value} must be > 0")));
    }
    Ok(value)
}

/// Discrete time steps `0..T`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeIndex(Vec<u32>);

impl TimeIndex {
    pub fn with_len(len: usize) -> Self {
        Self((0..len as u32).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }
}

/// Non-negative true counts, one per time step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountSeries(Vec<u64>);

impl CountSeries {
    pub fn new(counts: Vec<u64>) -> Self {
        Self(counts)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[u64] {
        &self.0
    }

    pub fn max(&self) -> u64 {
        self.0.iter().copied().max().unwrap_or(0)
    }

    pub fn iter_f64(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.iter().map(|count| *count as f64)
    }
}

impl From<Vec<u64>> for CountSeries {
    fn from(counts: Vec<u64>) -> Self {
        Self(counts)
    }
}

/// Output of the Laplace mechanism. Values may be negative.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoisySeries(Vec<f64>);

impl NoisySeries {
    pub(crate) fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }

    /// Copy with negatives replaced by zero, for plotting only.
    pub fn clipped_for_display(&self) -> Vec<f64> {
        self.0.iter().map(|value| value.max(0.0)).collect()
    }

    /// Per-index `noisy - original`.
    pub fn noise_against(&self, original: &CountSeries) -> Vec<f64> {
        self.0
            .iter()
            .zip(original.iter_f64())
            .map(|(noisy, count)| noisy - count)
            .collect()
    }
}
