//! SKI perturb - seeded dataset perturbation and divergence scoring
//!
//! Perturbs the three labeled tabular datasets used by the symbolic knowledge
//! injection experiments (breast cancer, splice junction, census income) with
//! encoding-aware Gaussian noise or label flips, measures the class-conditional
//! shift through a closed-form Gaussian KL divergence, and aggregates per-model
//! robustness scores from precomputed experiment outputs.

use std::path::PathBuf;

use thiserror::Error;

pub mod codec;
pub mod config;
pub mod dataset;
pub mod divergence;
pub mod io;
pub mod label_flip;
pub mod noise;
pub mod reverse;
pub mod rng;
pub mod robustness;
pub mod table;

// Re-export main types
pub use config::ExperimentConfig;
pub use dataset::{CensusSchema, DatasetKind, IntegerBounds};
pub use divergence::{
    compute_divergence, compute_divergence_with_schema, gaussian_kl, DIVERGENCE_SENTINEL,
};
pub use label_flip::flip_labels;
pub use noise::{apply_noise, apply_noise_by_name, NoiseParams};
pub use reverse::{reverse_multi_hot, reverse_one_hot};
pub use rng::NoiseRng;
pub use robustness::{compute_robustness, PerturbationFamily, RobustnessReport, MODELS};
pub use table::{Column, LabelColumn, Table};

#[derive(Debug, Error)]
pub enum PerturbError {
    #[error("the dataset is not valid: {0}")]
    InvalidDataset(String),
    #[error("the two datasets appear to have different labels: perturbed data has no `{expected}` column")]
    LabelMismatch { expected: String },
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("missing column: {0}")]
    MissingColumn(String),
    #[error("{context} length mismatch: expected {expected}, got {got}")]
    Shape {
        context: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{path}: no `{column}` column")]
    MissingMetric { path: PathBuf, column: String },
    #[error("{path}: cannot parse `{value}` as a number")]
    Parse { path: PathBuf, value: String },
    #[error("{0}: no data rows")]
    EmptyResult(PathBuf),
    #[error("baseline metric for model `{model}` is zero or non-finite")]
    DegenerateBaseline { model: String },
}

pub type Result<T> = std::result::Result<T, PerturbError>;
