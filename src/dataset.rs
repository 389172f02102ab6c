//! Known dataset schemas
//!
//! The three experiment datasets are fixed. Each variant carries the metadata
//! its noise routine needs, so dispatch is a `match` instead of a name lookup.

use serde::{Deserialize, Serialize};

use crate::table::Table;
use crate::{PerturbError, Result};

pub const BREAST_CANCER_NAME: &str = "breast-cancer";
pub const SPLICE_JUNCTION_NAME: &str = "splice-junction";
pub const CENSUS_INCOME_NAME: &str = "census-income";

/// Number of sequence positions in the splice-junction encoding.
pub const SPLICE_GROUPS: usize = 60;
/// Nucleotide symbols, in the order of the four columns of each group.
pub const SPLICE_BASES: [char; 4] = ['a', 'c', 'g', 't'];

/// Optional clamp bounds for an integer census feature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntegerBounds {
    pub floor: Option<f64>,
    pub ceil: Option<f64>,
}

impl IntegerBounds {
    pub fn clamp(&self, value: f64) -> f64 {
        let mut v = value;
        if let Some(ceil) = self.ceil {
            if v > ceil {
                v = ceil;
            }
        }
        if let Some(floor) = self.floor {
            if v < floor {
                v = floor;
            }
        }
        v
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegerFeature {
    pub name: String,
    pub bounds: IntegerBounds,
}

/// Feature metadata for the mixed-type census dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CensusSchema {
    pub integer_features: Vec<IntegerFeature>,
    pub binary_features: Vec<String>,
    pub ordinal_features: Vec<String>,
    /// Features expanded into one-hot blocks, perturbed by rank drift.
    pub nominal_features: Vec<String>,
    /// Blocks collapsed back to a categorical index before divergence scoring.
    pub one_hot_features: Vec<String>,
}

impl Default for CensusSchema {
    fn default() -> Self {
        let nominal: Vec<String> = [
            "WorkClass",
            "MaritalStatus",
            "Occupation",
            "Relationship",
            "NativeCountry",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        Self {
            integer_features: vec![
                IntegerFeature {
                    name: "Age".to_string(),
                    bounds: IntegerBounds {
                        floor: Some(0.0),
                        ceil: None,
                    },
                },
                IntegerFeature {
                    name: "HoursPerWeek".to_string(),
                    bounds: IntegerBounds {
                        floor: Some(0.0),
                        ceil: Some(99.0),
                    },
                },
            ],
            binary_features: vec![
                "Sex".to_string(),
                "CapitalGain".to_string(),
                "CapitalLoss".to_string(),
            ],
            ordinal_features: vec!["Education".to_string()],
            one_hot_features: nominal.clone(),
            nominal_features: nominal,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DatasetKind {
    /// Ordinal-only features, binary `diagnosis` label.
    BreastCancer,
    /// 60 one-hot nucleotide groups of 4 columns, categorical `class` label.
    SpliceJunction,
    /// Mixed integer, binary, ordinal and one-hot features, binary `income` label.
    CensusIncome(CensusSchema),
}

impl DatasetKind {
    /// Looks a dataset up by its canonical name. The census variant gets the default schema.
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            BREAST_CANCER_NAME => Ok(Self::BreastCancer),
            SPLICE_JUNCTION_NAME => Ok(Self::SpliceJunction),
            CENSUS_INCOME_NAME => Ok(Self::CensusIncome(CensusSchema::default())),
            other => Err(PerturbError::InvalidDataset(format!(
                "unknown dataset name `{other}`"
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::BreastCancer => BREAST_CANCER_NAME,
            Self::SpliceJunction => SPLICE_JUNCTION_NAME,
            Self::CensusIncome(_) => CENSUS_INCOME_NAME,
        }
    }

    pub fn label_name(&self) -> &'static str {
        match self {
            Self::BreastCancer => "diagnosis",
            Self::SpliceJunction => "class",
            Self::CensusIncome(_) => "income",
        }
    }

    /// Infers the dataset from the table's label column.
    ///
    /// Recognized label columns are checked as `class`, `income`, `diagnosis`.
    pub fn infer(table: &Table) -> Result<Self> {
        Self::infer_with_schema(table, CensusSchema::default())
    }

    pub fn infer_with_schema(table: &Table, schema: CensusSchema) -> Result<Self> {
        match table.label_name() {
            Some("class") => Ok(Self::SpliceJunction),
            Some("income") => Ok(Self::CensusIncome(schema)),
            Some("diagnosis") => Ok(Self::BreastCancer),
            Some(other) => Err(PerturbError::InvalidDataset(format!(
                "unrecognized label column `{other}`"
            ))),
            None => Err(PerturbError::InvalidDataset(
                "table has no label column".to_string(),
            )),
        }
    }
}

/// Label column of a dataset given its canonical name.
pub fn label_name_for(dataset_name: &str) -> Result<&'static str> {
    match dataset_name {
        BREAST_CANCER_NAME => Ok("diagnosis"),
        SPLICE_JUNCTION_NAME => Ok("class"),
        CENSUS_INCOME_NAME => Ok("income"),
        other => Err(PerturbError::InvalidDataset(format!(
            "unknown dataset name `{other}`"
        ))),
    }
}

/// True when `name` is one of the recognized label columns.
pub fn is_label_column(name: &str) -> bool {
    matches!(name, "diagnosis" | "class" | "income")
}
