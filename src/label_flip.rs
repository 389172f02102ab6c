//! Probabilistic label corruption

use rand::distributions::Bernoulli;
use tracing::debug;

use crate::dataset::label_name_for;
use crate::rng::NoiseRng;
use crate::table::Table;
use crate::{PerturbError, Result};

/// Flips each label with probability `p` to a uniformly chosen different label.
///
/// Candidate labels are the distinct labels of the whole table in sorted
/// order. A row whose label has no alternative keeps it. The Bernoulli draw
/// is consumed for every row, the uniform pick only on heads.
pub fn flip_labels(table: &Table, p: f64, dataset_name: &str, seed: u64) -> Result<Table> {
    let label_name = label_name_for(dataset_name)?;
    let coin = Bernoulli::new(p).map_err(|_| {
        PerturbError::InvalidParameter(format!("flip probability must lie in [0, 1], got {p}"))
    })?;

    let label = match table.label() {
        Some(label) if label.name == label_name => label,
        _ => {
            return Err(PerturbError::MissingColumn(label_name.to_string()));
        }
    };
    let possible: Vec<String> = label.distinct().into_iter().collect();

    let mut rng = NoiseRng::new(seed);
    let flipped: Vec<String> = label
        .values
        .iter()
        .map(|current| flip_one(current, &possible, &coin, &mut rng))
        .collect();

    let changed = flipped
        .iter()
        .zip(&label.values)
        .filter(|(a, b)| a != b)
        .count();
    debug!(dataset = dataset_name, p, seed, changed, "labels flipped");

    table.clone().with_label_values(flipped)
}

fn flip_one(current: &str, possible: &[String], coin: &Bernoulli, rng: &mut NoiseRng) -> String {
    if !rng.bernoulli(coin) {
        return current.to_string();
    }
    let others: Vec<&String> = possible.iter().filter(|l| l.as_str() != current).collect();
    match rng.choose(&others) {
        Some(&other) => other.clone(),
        None => current.to_string(),
    }
}
