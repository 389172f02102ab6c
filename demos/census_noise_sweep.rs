//! Census Noise Sweep Example
//!
//! Perturbs a small synthetic census table with increasing noise and prints
//! the pooled divergence of each draw

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use ski_perturb::{apply_noise, compute_divergence, Column, DatasetKind, LabelColumn, NoiseParams, Table};

const WORK_CLASSES: [&str; 4] = ["Private", "SelfEmp", "Gov", "Never"];

fn synthetic_census(rows: usize, seed: u64) -> Table {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut age = Vec::with_capacity(rows);
    let mut hours = Vec::with_capacity(rows);
    let mut education = Vec::with_capacity(rows);
    let mut binary = vec![Vec::with_capacity(rows); 3];
    let mut work = vec![Vec::with_capacity(rows); WORK_CLASSES.len()];
    let mut income = Vec::with_capacity(rows);

    for _ in 0..rows {
        let rich = rng.gen_bool(0.3);
        age.push(rng.gen_range(17..90) as f64);
        hours.push(rng.gen_range(if rich { 35..70 } else { 10..50 }) as f64);
        education.push(rng.gen_range(if rich { 8..16 } else { 1..12 }) as f64);
        for col in binary.iter_mut() {
            col.push(if rng.gen_bool(0.5) { 1.0 } else { 0.0 });
        }
        let active = rng.gen_range(0..WORK_CLASSES.len());
        for (idx, col) in work.iter_mut().enumerate() {
            col.push(if idx == active { 1.0 } else { 0.0 });
        }
        income.push(if rich { ">50K" } else { "<=50K" }.to_string());
    }

    let mut columns = vec![
        Column::new("Age", age),
        Column::new("HoursPerWeek", hours),
        Column::new("Education", education),
    ];
    for (name, values) in ["Sex", "CapitalGain", "CapitalLoss"].iter().zip(binary) {
        columns.push(Column::new(*name, values));
    }
    for (name, values) in WORK_CLASSES.iter().zip(work) {
        columns.push(Column::new(format!("WorkClass_{name}"), values));
    }

    Table::new(columns, Some(LabelColumn::new("income", income))).expect("consistent columns")
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Running census noise sweep...\n");

    let table = synthetic_census(600, 7);
    let dataset = DatasetKind::CensusIncome(census_schema());

    println!("{:>6} {:>12}", "sigma", "divergence");
    for step in 0..=8 {
        let sigma = step as f64 * 0.5;
        let params = NoiseParams::new(0.0, sigma, 42);
        let perturbed = apply_noise(&table, &dataset, &params)?;
        let divergence = compute_divergence(&table, &perturbed)?;
        println!("{sigma:>6.2} {divergence:>12.6}");
    }

    Ok(())
}

fn census_schema() -> ski_perturb::CensusSchema {
    ski_perturb::CensusSchema {
        nominal_features: vec!["WorkClass".to_string()],
        one_hot_features: vec!["WorkClass".to_string()],
        ..ski_perturb::CensusSchema::default()
    }
}
