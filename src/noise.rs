//! Encoding-aware Gaussian noise for the three datasets
//!
//! Every routine works on a copy of the input table, draws from one explicit
//! [`NoiseRng`], and keeps each feature a valid member of its encoding:
//! ordinal and integer values stay inside their bounds, one-hot blocks keep a
//! single active column.

use rand_distr::Normal;
use tracing::debug;

use crate::codec::{argmax_first, clamp_binary, clamp_ordinal, rounded_gaussian_delta};
use crate::dataset::{CensusSchema, DatasetKind, SPLICE_BASES, SPLICE_GROUPS};
use crate::rng::{fixed_ranks, NoiseRng};
use crate::table::{Column, Table};
use crate::{PerturbError, Result};

/// Center, spread and seed of one noise draw sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseParams {
    pub mu: f64,
    pub sigma: f64,
    pub seed: u64,
}

impl NoiseParams {
    pub fn new(mu: f64, sigma: f64, seed: u64) -> Self {
        Self { mu, sigma, seed }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.mu.is_finite() {
            return Err(PerturbError::InvalidParameter(format!(
                "mu must be finite, got {}",
                self.mu
            )));
        }
        if !self.sigma.is_finite() || self.sigma < 0.0 {
            return Err(PerturbError::InvalidParameter(format!(
                "sigma must be finite and >= 0, got {}",
                self.sigma
            )));
        }
        Ok(())
    }

    pub fn distribution(&self) -> Result<Normal<f64>> {
        self.validate()?;
        Normal::new(self.mu, self.sigma)
            .map_err(|e| PerturbError::InvalidParameter(format!("normal distribution: {e}")))
    }
}

/// Perturbs `table` with the routine for `dataset`.
pub fn apply_noise(table: &Table, dataset: &DatasetKind, params: &NoiseParams) -> Result<Table> {
    let noise = params.distribution()?;
    debug!(
        dataset = dataset.name(),
        mu = params.mu,
        sigma = params.sigma,
        seed = params.seed,
        rows = table.n_rows(),
        "applying noise"
    );
    match dataset {
        DatasetKind::BreastCancer => noise_breast_cancer(table, &noise, params.seed),
        DatasetKind::SpliceJunction => noise_splice_junction(table, &noise, params.seed),
        DatasetKind::CensusIncome(schema) => {
            noise_census_income(table, schema, &noise, params.seed)
        }
    }
}

/// Same as [`apply_noise`], resolving the dataset from its canonical name.
pub fn apply_noise_by_name(table: &Table, dataset_name: &str, params: &NoiseParams) -> Result<Table> {
    let dataset = DatasetKind::from_name(dataset_name)?;
    apply_noise(table, &dataset, params)
}

/// Noised copy of an ordinal column, clamped to its observed `[min, max]`.
fn noised_ordinal(column: &Column, noise: &Normal<f64>, rng: &mut NoiseRng) -> Vec<f64> {
    let (min, max) = (column.min(), column.max());
    column
        .values
        .iter()
        .map(|&v| clamp_ordinal(rounded_gaussian_delta(v, noise, rng), min, max))
        .collect()
}

fn noise_breast_cancer(table: &Table, noise: &Normal<f64>, seed: u64) -> Result<Table> {
    let mut rng = NoiseRng::new(seed);
    let mut out = table.clone();
    for column in table.columns() {
        let values = noised_ordinal(column, noise, &mut rng);
        out = out.with_column_values(&column.name, values)?;
    }
    Ok(out)
}

fn noise_splice_junction(table: &Table, noise: &Normal<f64>, seed: u64) -> Result<Table> {
    let width = SPLICE_BASES.len();
    let expected = SPLICE_GROUPS * width;
    if table.n_features() < expected {
        return Err(PerturbError::Shape {
            context: "splice-junction feature columns",
            expected,
            got: table.n_features(),
        });
    }

    let mut rng = NoiseRng::new(seed);
    let ranks = fixed_ranks(&mut rng, width);
    rng.reseed(seed);

    let max_rank = (width - 1) as f64;
    let n_rows = table.n_rows();
    let mut out = table.clone();

    for group in 0..SPLICE_GROUPS {
        let columns = &table.columns()[group * width..(group + 1) * width];

        // drifted[row][j]: post-noise rank reached from column j, if it was active
        let mut drifted = vec![[None::<usize>; 4]; n_rows];
        for (j, column) in columns.iter().enumerate() {
            for (row, &v) in column.values.iter().enumerate() {
                if v == 1.0 {
                    let moved = rounded_gaussian_delta(ranks[j] as f64, noise, &mut rng);
                    drifted[row][j] = Some(clamp_ordinal(moved, 0.0, max_rank) as usize);
                }
            }
        }

        for (j, column) in columns.iter().enumerate() {
            let values = drifted
                .iter()
                .map(|reached| {
                    if reached.contains(&Some(ranks[j])) {
                        1.0
                    } else {
                        0.0
                    }
                })
                .collect();
            out = out.with_column_values(&column.name, values)?;
        }
    }

    Ok(out)
}

fn noise_census_income(
    table: &Table,
    schema: &CensusSchema,
    noise: &Normal<f64>,
    seed: u64,
) -> Result<Table> {
    let mut rng = NoiseRng::new(seed);
    let mut out = table.clone();

    for feature in &schema.integer_features {
        let column = table.column(&feature.name)?;
        let values = column
            .values
            .iter()
            .map(|&v| feature.bounds.clamp(rounded_gaussian_delta(v, noise, &mut rng)))
            .collect();
        out = out.with_column_values(&feature.name, values)?;
    }

    for name in &schema.binary_features {
        let column = table.column(name)?;
        let values = column
            .values
            .iter()
            .map(|&v| clamp_binary(rounded_gaussian_delta(v, noise, &mut rng)))
            .collect();
        out = out.with_column_values(name, values)?;
    }

    for name in &schema.ordinal_features {
        let column = table.column(name)?;
        let values = noised_ordinal(column, noise, &mut rng);
        out = out.with_column_values(name, values)?;
    }

    for feature in &schema.nominal_features {
        out = noise_nominal_block(out, feature, noise, &mut rng, seed)?;
    }

    Ok(out)
}

/// Moves the active column of a one-hot block by a rounded Gaussian step
/// in the seed-0 rank order of the block.
fn noise_nominal_block(
    table: Table,
    feature: &str,
    noise: &Normal<f64>,
    rng: &mut NoiseRng,
    seed: u64,
) -> Result<Table> {
    let names = table.columns_with_prefix(feature);
    if names.is_empty() {
        return Err(PerturbError::MissingColumn(format!(
            "no one-hot columns for nominal feature `{feature}`"
        )));
    }
    let block = names
        .iter()
        .map(|name| table.column(name).map(|c| c.values.as_slice()))
        .collect::<Result<Vec<_>>>()?;

    let ranks = fixed_ranks(rng, names.len());
    let mut by_rank = vec![0; names.len()];
    for (idx, &rank) in ranks.iter().enumerate() {
        by_rank[rank] = idx;
    }
    rng.reseed(seed);

    let max_rank = (names.len() - 1) as f64;
    let active: Vec<usize> = (0..table.n_rows())
        .map(|row| {
            let cells: Vec<f64> = block.iter().map(|col| col[row]).collect();
            let rank = ranks[argmax_first(&cells)] as f64;
            let moved = clamp_ordinal(rounded_gaussian_delta(rank, noise, rng), 0.0, max_rank);
            by_rank[moved as usize]
        })
        .collect();

    debug!(feature, width = names.len(), "nominal block perturbed");

    let mut out = table;
    for (idx, name) in names.iter().enumerate() {
        let values = active
            .iter()
            .map(|&a| if a == idx { 1.0 } else { 0.0 })
            .collect();
        out = out.with_column_values(name, values)?;
    }
    Ok(out)
}
