//! Inverse encodings applied before divergence scoring

use crate::codec::argmax_first;
use crate::dataset::{SPLICE_BASES, SPLICE_GROUPS};
use crate::table::{Column, Table};
use crate::{PerturbError, Result};

/// Weights folding a 4-column nucleotide group into one composite value.
pub const MULTI_HOT_WEIGHTS: [f64; 4] = [1.0, 3.0, 5.0, 10.0];

/// Collapses each named one-hot block into one categorical column holding the
/// position of the active column within the block.
///
/// Block columns are removed and the categorical column is appended at the
/// end, named after the feature. Features with no matching columns are skipped.
pub fn reverse_one_hot(table: &Table, one_hot_features: &[String]) -> Result<Table> {
    let mut out = table.clone();
    for feature in one_hot_features {
        let names = table.columns_with_prefix(feature);
        if names.is_empty() {
            continue;
        }
        let block = names
            .iter()
            .map(|name| table.column(name))
            .collect::<Result<Vec<_>>>()?;

        let positions = (0..table.n_rows())
            .map(|row| {
                let cells: Vec<f64> = block.iter().map(|c| c.values[row]).collect();
                argmax_first(&cells) as f64
            })
            .collect();

        out = out.drop_columns(&names);
        out.push_column(Column::new(feature.clone(), positions))?;
    }
    Ok(out)
}

/// Folds the 60 nucleotide groups into composite columns named `"0"`..`"59"`.
///
/// Only the first 240 feature columns are read; the label is carried through.
pub fn reverse_multi_hot(table: &Table) -> Result<Table> {
    let width = SPLICE_BASES.len();
    let expected = SPLICE_GROUPS * width;
    if table.n_features() < expected {
        return Err(PerturbError::Shape {
            context: "splice-junction feature columns",
            expected,
            got: table.n_features(),
        });
    }

    let columns = (0..SPLICE_GROUPS)
        .map(|group| {
            let block = &table.columns()[group * width..(group + 1) * width];
            let values = (0..table.n_rows())
                .map(|row| {
                    block
                        .iter()
                        .zip(MULTI_HOT_WEIGHTS)
                        .map(|(c, w)| c.values[row] * w)
                        .sum::<f64>()
                })
                .collect();
            Column::new(group.to_string(), values)
        })
        .collect();

    Table::new(columns, table.label().cloned())
}
