//! In-memory labeled table
//!
//! Feature columns hold `f64` values; the optional label column holds the
//! class of each row as a string. Tables are never mutated by the transforms,
//! which always build a new table.

use std::collections::{BTreeSet, HashSet};

use crate::{PerturbError, Result};

/// Named numeric feature column
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<f64>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn min(&self) -> f64 {
        self.values.iter().copied().fold(f64::INFINITY, f64::min)
    }

    pub fn max(&self) -> f64 {
        self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// True when the column holds at most one distinct value.
    pub fn is_constant(&self) -> bool {
        match self.values.first() {
            Some(&first) => self.values.iter().all(|&v| v == first),
            None => true,
        }
    }
}

/// Named class label column
#[derive(Debug, Clone, PartialEq)]
pub struct LabelColumn {
    pub name: String,
    pub values: Vec<String>,
}

impl LabelColumn {
    pub fn new(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Distinct labels in sorted order.
    pub fn distinct(&self) -> BTreeSet<String> {
        self.values.iter().cloned().collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    label: Option<LabelColumn>,
    n_rows: usize,
}

impl Table {
    pub fn new(columns: Vec<Column>, label: Option<LabelColumn>) -> Result<Self> {
        let n_rows = match (columns.first(), &label) {
            (Some(col), _) => col.values.len(),
            (None, Some(lab)) => lab.values.len(),
            (None, None) => 0,
        };

        let mut seen = HashSet::new();
        for col in &columns {
            if col.values.len() != n_rows {
                return Err(PerturbError::Shape {
                    context: "feature column",
                    expected: n_rows,
                    got: col.values.len(),
                });
            }
            if !seen.insert(col.name.as_str()) {
                return Err(PerturbError::InvalidParameter(format!(
                    "duplicate column name `{}`",
                    col.name
                )));
            }
        }
        if let Some(lab) = &label {
            if lab.values.len() != n_rows {
                return Err(PerturbError::Shape {
                    context: "label column",
                    expected: n_rows,
                    got: lab.values.len(),
                });
            }
            if seen.contains(lab.name.as_str()) {
                return Err(PerturbError::InvalidParameter(format!(
                    "label `{}` is also a feature column",
                    lab.name
                )));
            }
        }

        Ok(Self {
            columns,
            label,
            n_rows,
        })
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_features(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn label(&self) -> Option<&LabelColumn> {
        self.label.as_ref()
    }

    pub fn label_name(&self) -> Option<&str> {
        self.label.as_ref().map(|l| l.name.as_str())
    }

    pub fn feature_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| PerturbError::MissingColumn(name.to_string()))
    }

    /// Names of the columns starting with `prefix`, in table order.
    pub fn columns_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.name.starts_with(prefix))
            .map(|c| c.name.clone())
            .collect()
    }

    /// Distinct label values, empty when the table has no label column.
    pub fn label_values(&self) -> BTreeSet<String> {
        self.label
            .as_ref()
            .map(LabelColumn::distinct)
            .unwrap_or_default()
    }

    /// Rows whose label equals `label`, in original order.
    pub fn filter_by_label(&self, label: &str) -> Table {
        let keep: Vec<bool> = match &self.label {
            Some(lab) => lab.values.iter().map(|v| v == label).collect(),
            None => vec![false; self.n_rows],
        };
        self.select_rows(&keep)
    }

    fn select_rows(&self, keep: &[bool]) -> Table {
        let pick_f64 = |values: &[f64]| -> Vec<f64> {
            values
                .iter()
                .zip(keep)
                .filter(|(_, k)| **k)
                .map(|(&v, _)| v)
                .collect()
        };
        let columns = self
            .columns
            .iter()
            .map(|c| Column::new(c.name.clone(), pick_f64(&c.values)))
            .collect();
        let label = self.label.as_ref().map(|l| {
            let values = l
                .values
                .iter()
                .zip(keep)
                .filter(|(_, k)| **k)
                .map(|(v, _)| v.clone())
                .collect();
            LabelColumn::new(l.name.clone(), values)
        });
        let n_rows = keep.iter().filter(|&&k| k).count();
        Table {
            columns,
            label,
            n_rows,
        }
    }

    /// Copy of the table without the named feature columns. Unknown names are ignored.
    pub fn drop_columns(&self, names: &[String]) -> Table {
        let columns = self
            .columns
            .iter()
            .filter(|c| !names.contains(&c.name))
            .cloned()
            .collect();
        Table {
            columns,
            label: self.label.clone(),
            n_rows: self.n_rows,
        }
    }

    pub fn without_label(&self) -> Table {
        Table {
            columns: self.columns.clone(),
            label: None,
            n_rows: self.n_rows,
        }
    }

    /// Replaces the values of an existing feature column.
    pub fn with_column_values(mut self, name: &str, values: Vec<f64>) -> Result<Table> {
        if values.len() != self.n_rows {
            return Err(PerturbError::Shape {
                context: "replacement column",
                expected: self.n_rows,
                got: values.len(),
            });
        }
        let idx = self
            .column_index(name)
            .ok_or_else(|| PerturbError::MissingColumn(name.to_string()))?;
        self.columns[idx].values = values;
        Ok(self)
    }

    pub fn with_label_values(mut self, values: Vec<String>) -> Result<Table> {
        let n_rows = self.n_rows;
        let label = self
            .label
            .as_mut()
            .ok_or_else(|| PerturbError::MissingColumn("label".to_string()))?;
        if values.len() != n_rows {
            return Err(PerturbError::Shape {
                context: "replacement label",
                expected: n_rows,
                got: values.len(),
            });
        }
        label.values = values;
        Ok(self)
    }

    /// Appends a feature column at the end of the table.
    pub fn push_column(&mut self, column: Column) -> Result<()> {
        if column.values.len() != self.n_rows {
            return Err(PerturbError::Shape {
                context: "appended column",
                expected: self.n_rows,
                got: column.values.len(),
            });
        }
        if self.column_index(&column.name).is_some() {
            return Err(PerturbError::InvalidParameter(format!(
                "duplicate column name `{}`",
                column.name
            )));
        }
        self.columns.push(column);
        Ok(())
    }
}
