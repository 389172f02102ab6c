//! Robustness scores from precomputed experiment results
//!
//! Results live under a root directory:
//!
//! - `drop/<dataset>/<model>/1.csv`: unperturbed baseline metric
//! - `<family>/<dataset>/divergences/<i>.csv`: divergence of iteration `i`
//! - `<family>/<dataset>/<model>/<i>.csv`: model metric at iteration `i`
//!
//! The absolute score of a model is `sum_i(divergence_i / (baseline / quality_i)) / n`
//! and the relative score divides it by the absolute score of the
//! `uneducated` model.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::dataset::DatasetKind;
use crate::{PerturbError, Result};

pub const MODELS: [&str; 4] = ["uneducated", "kins", "kill", "kbann"];
pub const REFERENCE_MODEL: &str = "uneducated";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PerturbationFamily {
    Noise,
    LabelFlip,
    Other(String),
}

impl PerturbationFamily {
    pub fn from_name(name: &str) -> Self {
        match name {
            "noise" => Self::Noise,
            "label_flip" => Self::LabelFlip,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn dir_name(&self) -> &str {
        match self {
            Self::Noise => "noise",
            Self::LabelFlip => "label_flip",
            Self::Other(name) => name,
        }
    }

    /// Nominal iteration count, also the divisor of the absolute score.
    pub fn nominal_iterations(&self) -> usize {
        match self {
            Self::Noise | Self::LabelFlip => 10,
            Self::Other(_) => 20,
        }
    }

    /// Result file indices read for this family. Only `noise` includes the
    /// first iteration.
    pub fn iterations(&self) -> RangeInclusive<usize> {
        let n = self.nominal_iterations();
        match self {
            Self::Noise => 1..=n,
            _ => 2..=n,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelRobustness {
    pub model: String,
    pub absolute: f64,
    pub relative: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RobustnessReport {
    pub family: String,
    pub dataset: String,
    pub metric: String,
    pub models: Vec<ModelRobustness>,
}

impl RobustnessReport {
    pub fn model(&self, name: &str) -> Option<&ModelRobustness> {
        self.models.iter().find(|m| m.model == name)
    }

    /// Flat view keyed `"<model> absolute"` / `"<model> relative"`.
    pub fn to_map(&self) -> BTreeMap<String, f64> {
        let mut map = BTreeMap::new();
        for m in &self.models {
            map.insert(format!("{} absolute", m.model), m.absolute);
            map.insert(format!("{} relative", m.model), m.relative);
        }
        map
    }
}

/// Aggregates absolute and relative robustness of [`MODELS`] for one
/// perturbation family on one dataset.
///
/// Any missing or unreadable result file fails the whole call. A zero
/// quality metric makes its iteration contribute zero; a zero baseline, or a
/// zero absolute score for the reference model, is reported as
/// [`PerturbError::DegenerateBaseline`].
pub fn compute_robustness(
    results_root: &Path,
    family: &PerturbationFamily,
    dataset_name: &str,
    metric: &str,
) -> Result<RobustnessReport> {
    DatasetKind::from_name(dataset_name)?;

    let family_dir = results_root.join(family.dir_name()).join(dataset_name);
    let nominal = family.nominal_iterations() as f64;

    let divergences = family
        .iterations()
        .map(|i| column_mean(&family_dir.join("divergences").join(format!("{i}.csv")), None))
        .collect::<Result<Vec<_>>>()?;

    let mut absolute = Vec::with_capacity(MODELS.len());
    for model in MODELS {
        let baseline_path = results_root
            .join("drop")
            .join(dataset_name)
            .join(model)
            .join("1.csv");
        let baseline = column_mean(&baseline_path, Some(metric))?;
        if baseline == 0.0 || !baseline.is_finite() {
            return Err(PerturbError::DegenerateBaseline {
                model: model.to_string(),
            });
        }

        let mut sum = 0.0;
        for (i, divergence) in family.iterations().zip(&divergences) {
            let quality =
                column_mean(&family_dir.join(model).join(format!("{i}.csv")), Some(metric))?;
            sum += divergence / (baseline / quality);
        }
        let score = sum / nominal;
        debug!(model, baseline, absolute = score, "model robustness");
        absolute.push((model, score));
    }

    let reference = absolute
        .iter()
        .find(|(m, _)| *m == REFERENCE_MODEL)
        .map(|(_, s)| *s)
        .unwrap_or(f64::NAN);
    if reference == 0.0 || !reference.is_finite() {
        return Err(PerturbError::DegenerateBaseline {
            model: REFERENCE_MODEL.to_string(),
        });
    }

    let models = absolute
        .into_iter()
        .map(|(model, score)| ModelRobustness {
            model: model.to_string(),
            absolute: score,
            relative: score / reference,
        })
        .collect();

    let report = RobustnessReport {
        family: family.dir_name().to_string(),
        dataset: dataset_name.to_string(),
        metric: metric.to_string(),
        models,
    };
    info!(
        family = report.family.as_str(),
        dataset = dataset_name,
        metric,
        "robustness computed"
    );
    Ok(report)
}

/// Mean of a numeric CSV column; the first column when `column` is `None`.
pub fn column_mean(path: &Path, column: Option<&str>) -> Result<f64> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;
    let headers = reader.headers()?.clone();
    let idx = match column {
        Some(name) => headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| PerturbError::MissingMetric {
                path: path.to_path_buf(),
                column: name.to_string(),
            })?,
        None => 0,
    };

    let mut sum = 0.0;
    let mut count = 0usize;
    for record in reader.records() {
        let record = record?;
        let raw = record.get(idx).unwrap_or("").trim();
        let value: f64 = raw.parse().map_err(|_| PerturbError::Parse {
            path: path.to_path_buf(),
            value: raw.to_string(),
        })?;
        sum += value;
        count += 1;
    }

    if count == 0 {
        return Err(PerturbError::EmptyResult(PathBuf::from(path)));
    }
    Ok(sum / count as f64)
}
