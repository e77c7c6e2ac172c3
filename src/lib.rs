//! Laplace-mechanism differential privacy over a synthetic count time series.
//!
//! A bell-shaped epidemic-like series of non-negative counts is generated from
//! an explicit seed, perturbed with independent `Lap(0, Δ/ε)` noise per time
//! step for several privacy budgets, and rendered as a 2x2 comparison grid.
//! The mechanism output is kept unclipped; clipping at zero only happens in a
//! separate display copy.

pub mod config;
pub mod errors;
pub mod experiment;
pub mod mechanism;
pub mod render;
pub mod series;
pub mod stats;
pub mod types;

pub use config::{load_config, ConfigError, ConfigFormat, ExperimentConfig};
pub use errors::{LaplaceError, LaplaceResult};
pub use experiment::{Experiment, ExperimentOutcome, NoisyPanel};
pub use mechanism::{apply_laplace_noise, LaplaceMechanism};
pub use render::{ComparisonRenderer, PlottersRenderer};
pub use series::{generate, SeriesParams};
pub use stats::NoiseSummary;
pub use types::{CountSeries, NoisySeries, PrivacyBudget, Sensitivity, TimeIndex};
