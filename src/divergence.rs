//! Closed-form Gaussian KL divergence between original and perturbed data
//!
//! Each class is approximated by a multivariate normal fitted to its rows
//! (sample mean, unbiased sample covariance). The per-class divergence
//! `KL(perturbed || original)` is pooled into one score weighted by class size.

use nalgebra::{DMatrix, DVector};
use tracing::{debug, info, warn};

use crate::dataset::{CensusSchema, DatasetKind};
use crate::reverse::{reverse_multi_hot, reverse_one_hot};
use crate::table::Table;
use crate::{PerturbError, Result};

/// Stand-in for a non-finite or absurdly large divergence. Read it as
/// "maximally divergent", not as a distance.
pub const DIVERGENCE_SENTINEL: f64 = 10_000.0;

/// Magnitude above which a divergence is treated as numerically degenerate.
pub const DIVERGENCE_LIMIT: f64 = 1e7;

/// Relative singular-value cut-off of the pseudo-inverse fallback.
const PINV_RCOND: f64 = 1e-15;

/// Pooled divergence between an original table and its perturbed copy,
/// using the default census schema for one-hot reversal.
pub fn compute_divergence(original: &Table, perturbed: &Table) -> Result<f64> {
    compute_divergence_with_schema(original, perturbed, CensusSchema::default())
}

/// Pooled divergence between an original table and its perturbed copy.
///
/// The dataset is inferred from the original label column, the matching
/// reversal is applied to both sides, and per-class divergences are averaged
/// with weights equal to the class counts of the original table.
///
/// # Panics
///
/// Panics when the two tables carry different sets of label values. A
/// perturbation may change label counts but never the set of labels.
pub fn compute_divergence_with_schema(
    original: &Table,
    perturbed: &Table,
    schema: CensusSchema,
) -> Result<f64> {
    let dataset = DatasetKind::infer_with_schema(original, schema)?;
    let label_name = dataset.label_name();
    if perturbed.label_name() != Some(label_name) {
        return Err(PerturbError::LabelMismatch {
            expected: label_name.to_string(),
        });
    }

    let (original, perturbed) = match &dataset {
        DatasetKind::BreastCancer => (original.clone(), perturbed.clone()),
        DatasetKind::SpliceJunction => (reverse_multi_hot(original)?, reverse_multi_hot(perturbed)?),
        DatasetKind::CensusIncome(schema) => (
            reverse_one_hot(original, &schema.one_hot_features)?,
            reverse_one_hot(perturbed, &schema.one_hot_features)?,
        ),
    };

    let labels = original.label_values();
    assert_eq!(
        labels,
        perturbed.label_values(),
        "original and perturbed data must share the same set of labels"
    );

    let total = original.n_rows();
    if total == 0 {
        return Ok(0.0);
    }

    let mut score = 0.0;
    for label in &labels {
        let lhs = original.filter_by_label(label).without_label();
        let rhs = perturbed.filter_by_label(label).without_label();
        let kl = gaussian_kl(&lhs, &rhs)?;
        debug!(dataset = dataset.name(), label = %label, kl, rows = lhs.n_rows(), "class divergence");
        score += kl * lhs.n_rows() as f64;
    }
    let score = score / total as f64;

    info!(dataset = dataset.name(), divergence = score, "divergence score");
    Ok(score)
}

/// `KL(P_perturbed || P_original)` under independent Gaussian fits.
///
/// Features constant on the perturbed side are dropped from both tables
/// first. The result is never negative; degenerate inputs yield
/// [`DIVERGENCE_SENTINEL`].
pub fn gaussian_kl(original: &Table, perturbed: &Table) -> Result<f64> {
    if original.feature_names() != perturbed.feature_names() {
        return Err(PerturbError::InvalidParameter(
            "original and perturbed tables have different feature columns".to_string(),
        ));
    }

    let constant: Vec<String> = perturbed
        .columns()
        .iter()
        .filter(|c| c.is_constant())
        .map(|c| c.name.clone())
        .collect();
    if !constant.is_empty() {
        debug!(dropped = constant.len(), "dropping constant features");
    }
    let lhs = original.drop_columns(&constant);
    let rhs = perturbed.drop_columns(&constant);

    let k = lhs.n_features();
    if k == 0 {
        return Ok(0.0);
    }

    let x1 = design_matrix(&lhs);
    let x2 = design_matrix(&rhs);
    let mu1 = column_means(&x1);
    let mu2 = column_means(&x2);
    let cov1 = sample_covariance(&x1, &mu1);
    let cov2 = sample_covariance(&x2, &mu2);

    if cov1.iter().chain(cov2.iter()).any(|v| !v.is_finite()) {
        warn!(
            rows_original = lhs.n_rows(),
            rows_perturbed = rhs.n_rows(),
            "non-finite covariance, substituting sentinel"
        );
        return Ok(DIVERGENCE_SENTINEL);
    }

    let Some(cov2_inv) = invert(&cov2) else {
        warn!("pseudo-inverse failed, substituting sentinel");
        return Ok(DIVERGENCE_SENTINEL);
    };

    let det1 = cov1.determinant();
    let det2 = cov2.determinant();
    let diff = &mu1 - &mu2;

    let kl = 0.5
        * ((det2 / det1).ln() - k as f64
            + (&cov2_inv * &cov1).trace()
            + diff.dot(&(&cov2_inv * &diff)));

    Ok(stabilize(kl))
}

/// Sentinel for NaN or out-of-range values, zero for negative ones.
pub fn stabilize(kl: f64) -> f64 {
    if kl.is_nan() || kl.abs() > DIVERGENCE_LIMIT {
        warn!(kl, "degenerate divergence, substituting sentinel");
        return DIVERGENCE_SENTINEL;
    }
    if kl < 0.0 {
        return 0.0;
    }
    kl
}

fn design_matrix(table: &Table) -> DMatrix<f64> {
    DMatrix::from_fn(table.n_rows(), table.n_features(), |r, c| {
        table.columns()[c].values[r]
    })
}

fn column_means(x: &DMatrix<f64>) -> DVector<f64> {
    let n = x.nrows() as f64;
    DVector::from_iterator(x.ncols(), x.column_iter().map(|c| c.sum() / n))
}

/// Unbiased covariance (divides by `n - 1`), columns as variables.
fn sample_covariance(x: &DMatrix<f64>, mean: &DVector<f64>) -> DMatrix<f64> {
    let n = x.nrows();
    let mut centered = x.clone();
    for (mut col, &m) in centered.column_iter_mut().zip(mean.iter()) {
        col.add_scalar_mut(-m);
    }
    let denom = n as f64 - 1.0;
    (centered.transpose() * &centered) / denom
}

/// Inverse, falling back to the Moore-Penrose pseudo-inverse when singular.
fn invert(m: &DMatrix<f64>) -> Option<DMatrix<f64>> {
    if let Some(inv) = m.clone().try_inverse() {
        return Some(inv);
    }
    warn!(dim = m.nrows(), "singular covariance, using pseudo-inverse");
    let svd = m.clone().svd(true, true);
    let tol = PINV_RCOND * svd.singular_values.max();
    svd.pseudo_inverse(tol).ok()
}
