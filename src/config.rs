use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::dataset::DatasetKind;
use crate::noise::NoiseParams;
use crate::robustness::PerturbationFamily;
use crate::{PerturbError, Result};

/// Runtime configuration for a perturbation experiment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Canonical dataset name (`breast-cancer`, `splice-junction`, `census-income`)
    pub dataset: String,
    /// Center of the Gaussian noise
    pub mu: f64,
    /// Standard deviation of the Gaussian noise
    pub sigma: f64,
    /// Base seed; iteration `i` uses `seed + i`
    pub seed: u64,
    /// Probability of flipping a label
    pub label_flip_p: f64,
    /// Number of perturbation draws in a sweep
    pub iterations: usize,
    /// Perturbation family directory used by robustness aggregation
    pub family: String,
    /// Root of the precomputed result files
    pub results_root: PathBuf,
    /// Prediction-quality metric column
    pub metric: String,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            dataset: "breast-cancer".to_string(),
            mu: 0.0,
            sigma: 1.0,
            seed: 0,
            label_flip_p: 0.1,
            iterations: 10,
            family: "noise".to_string(),
            results_root: PathBuf::from("results"),
            metric: "accuracy".to_string(),
        }
    }
}

impl ExperimentConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let config: ExperimentConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        DatasetKind::from_name(&self.dataset)?;
        self.noise_params(0).validate()?;

        if !(0.0..=1.0).contains(&self.label_flip_p) {
            return Err(PerturbError::InvalidParameter(format!(
                "label_flip_p must lie in [0, 1], got {}",
                self.label_flip_p
            )));
        }
        if self.iterations == 0 {
            return Err(PerturbError::InvalidParameter(
                "iterations must be greater than zero".to_string(),
            ));
        }
        if self.metric.trim().is_empty() {
            return Err(PerturbError::InvalidParameter(
                "metric must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn dataset_kind(&self) -> Result<DatasetKind> {
        DatasetKind::from_name(&self.dataset)
    }

    pub fn family(&self) -> PerturbationFamily {
        PerturbationFamily::from_name(&self.family)
    }

    pub fn noise_params(&self, iteration: usize) -> NoiseParams {
        NoiseParams::new(self.mu, self.sigma, self.seed.wrapping_add(iteration as u64))
    }
}
