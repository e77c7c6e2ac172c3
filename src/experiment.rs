//! One run: generate the counts once, then perturb them once per privacy budget.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ExperimentConfig;
use crate::errors::LaplaceResult;
use crate::series::generate;
use crate::stats::NoiseSummary;
use crate::types::{CountSeries, NoisySeries, PrivacyBudget, Sensitivity, TimeIndex};

/// Mechanism output for one ε, kept both raw and display-clipped.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoisyPanel {
    pub epsilon: PrivacyBudget,
    pub scale: f64,
    /// Canonical, unclipped mechanism output.
    pub noisy: NoisySeries,
    /// `noisy` with negatives set to zero; only meant for plotting.
    pub display: Vec<f64>,
    pub summary: NoiseSummary,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExperimentOutcome {
    pub time: TimeIndex,
    pub counts: CountSeries,
    pub sensitivity: Sensitivity,
    pub noise_seed: u64,
    /// In configured ε order.
    pub panels: Vec<NoisyPanel>,
}

impl ExperimentOutcome {
    pub fn panel(&self, epsilon: f64) -> Option<&NoisyPanel> {
        self.panels
            .iter()
            .find(|panel| panel.epsilon.value() == epsilon)
    }

    pub fn summary_table(&self) -> BTreeMap<String, NoiseSummary> {
        self.panels
            .iter()
            .map(|panel| (format!("epsilon={}", panel.epsilon), panel.summary.clone()))
            .collect()
    }
}

pub struct Experiment;

impl Experiment {
    /// Validates the whole config up front so a bad ε never yields partial output.
    pub fn run(config: &ExperimentConfig) -> LaplaceResult<ExperimentOutcome> {
        config.validate()?;
        let mechanisms = config.mechanisms()?;
        let (time, counts) = generate(&config.series_params())?;

        let panels = mechanisms
            .iter()
            .map(|mechanism| {
                let noisy = mechanism.apply(&counts, config.noise_seed);
                let noise = noisy.noise_against(&counts);
                let summary = NoiseSummary::from_noise(&noise, mechanism.scale())
                    .with_negatives(noisy.as_slice());
                debug!(
                    epsilon = mechanism.epsilon().value(),
                    mean_abs = summary.mean_abs,
                    expected_abs = summary.expected_abs,
                    negatives = summary.negative_values,
                    "panel ready"
                );
                NoisyPanel {
                    epsilon: mechanism.epsilon(),
                    scale: mechanism.scale(),
                    display: noisy.clipped_for_display(),
                    noisy,
                    summary,
                }
            })
            .collect();

        Ok(ExperimentOutcome {
            time,
            counts,
            sensitivity: Sensitivity::new(config.sensitivity)?,
            noise_seed: config.noise_seed,
            panels,
        })
    }
}
