#![allow(dead_code)]

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use ski_perturb::dataset::{SPLICE_BASES, SPLICE_GROUPS};
use ski_perturb::{Column, LabelColumn, Table};

pub const WORK_CLASSES: [&str; 4] = ["Private", "SelfEmp", "Gov", "Never"];
pub const RELATIONSHIPS: [&str; 3] = ["Husband", "Wife", "Unmarried"];

fn labels(values: Vec<&str>) -> Vec<String> {
    values.into_iter().map(str::to_string).collect()
}

/// Two ordinal features on `[0, 4]`.
pub fn breast_cancer(rows: usize, seed: u64) -> Table {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut a = Vec::with_capacity(rows);
    let mut b = Vec::with_capacity(rows);
    let mut y = Vec::with_capacity(rows);
    for r in 0..rows {
        let malignant = r % 2 == 0;
        a.push(rng.gen_range(if malignant { 2..=4 } else { 0..=2 }) as f64);
        b.push(rng.gen_range(0..=4) as f64);
        y.push(if malignant { "M" } else { "B" });
    }
    // pin the observed range to [0, 4]
    if rows >= 2 {
        a[0] = 4.0;
        a[1] = 0.0;
        b[0] = 0.0;
        b[1] = 4.0;
    }
    Table::new(
        vec![Column::new("ClumpThickness", a), Column::new("CellSize", b)],
        Some(LabelColumn::new("diagnosis", labels(y))),
    )
    .unwrap()
}

/// 60 one-hot nucleotide groups with a random base per position.
pub fn splice_junction(rows: usize, seed: u64) -> Table {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let picks: Vec<Vec<usize>> = (0..rows)
        .map(|_| (0..SPLICE_GROUPS).map(|_| rng.gen_range(0..4)).collect())
        .collect();

    let mut columns = Vec::with_capacity(SPLICE_GROUPS * 4);
    for group in 0..SPLICE_GROUPS {
        for (j, base) in SPLICE_BASES.iter().enumerate() {
            let values = picks
                .iter()
                .map(|p| if p[group] == j { 1.0 } else { 0.0 })
                .collect();
            columns.push(Column::new(format!("{base}{group}"), values));
        }
    }
    let classes = (0..rows).map(|r| ["EI", "IE", "N"][r % 3]).collect();
    Table::new(columns, Some(LabelColumn::new("class", labels(classes)))).unwrap()
}

/// Census-shaped table covering every feature type of the default schema
/// except the wider nominal blocks, which are represented by two small ones.
pub fn census_income(rows: usize, seed: u64) -> Table {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut age = Vec::with_capacity(rows);
    let mut hours = Vec::with_capacity(rows);
    let mut education = Vec::with_capacity(rows);
    let mut sex = Vec::with_capacity(rows);
    let mut gain = Vec::with_capacity(rows);
    let mut loss = Vec::with_capacity(rows);
    let mut work = vec![Vec::with_capacity(rows); WORK_CLASSES.len()];
    let mut rel = vec![Vec::with_capacity(rows); RELATIONSHIPS.len()];
    let mut income = Vec::with_capacity(rows);

    for r in 0..rows {
        let rich = r % 3 == 0;
        age.push(rng.gen_range(0..6) as f64);
        hours.push(rng.gen_range(if rich { 90..=99 } else { 0..=10 }) as f64);
        education.push(rng.gen_range(1..=16) as f64);
        sex.push(rng.gen_range(0..=1) as f64);
        gain.push(rng.gen_range(0..=1) as f64);
        loss.push(rng.gen_range(0..=1) as f64);
        let w = rng.gen_range(0..WORK_CLASSES.len());
        for (idx, col) in work.iter_mut().enumerate() {
            col.push(if idx == w { 1.0 } else { 0.0 });
        }
        let k = rng.gen_range(0..RELATIONSHIPS.len());
        for (idx, col) in rel.iter_mut().enumerate() {
            col.push(if idx == k { 1.0 } else { 0.0 });
        }
        income.push(if rich { ">50K" } else { "<=50K" });
    }

    let mut columns = vec![
        Column::new("Age", age),
        Column::new("Education", education),
        Column::new("Sex", sex),
        Column::new("CapitalGain", gain),
        Column::new("CapitalLoss", loss),
        Column::new("HoursPerWeek", hours),
    ];
    for (name, values) in WORK_CLASSES.iter().zip(work) {
        columns.push(Column::new(format!("WorkClass_{name}"), values));
    }
    for (name, values) in RELATIONSHIPS.iter().zip(rel) {
        columns.push(Column::new(format!("Relationship_{name}"), values));
    }
    Table::new(columns, Some(LabelColumn::new("income", labels(income)))).unwrap()
}

/// Default schema restricted to the nominal blocks present in [`census_income`].
pub fn census_schema() -> ski_perturb::CensusSchema {
    let nominal = vec!["WorkClass".to_string(), "Relationship".to_string()];
    ski_perturb::CensusSchema {
        nominal_features: nominal.clone(),
        one_hot_features: nominal,
        ..ski_perturb::CensusSchema::default()
    }
}

/// Number of active columns of a one-hot block in one row.
pub fn active_in_block(table: &Table, prefix: &str, row: usize) -> usize {
    table
        .columns()
        .iter()
        .filter(|c| c.name.starts_with(prefix))
        .filter(|c| c.values[row] == 1.0)
        .count()
}
