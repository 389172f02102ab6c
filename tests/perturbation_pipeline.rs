mod support;

use approx::assert_abs_diff_eq;
use ski_perturb::dataset::SPLICE_GROUPS;
use ski_perturb::{
    apply_noise, compute_divergence, compute_divergence_with_schema, flip_labels,
    reverse_one_hot, DatasetKind, NoiseParams, DIVERGENCE_SENTINEL,
};

use support::{active_in_block, breast_cancer, census_income, census_schema, splice_junction};

#[test]
fn ordinal_scenario_keeps_shape_and_bounds() {
    let table = breast_cancer(40, 1);
    let out = apply_noise(&table, &DatasetKind::BreastCancer, &NoiseParams::new(0.0, 1.0, 42)).unwrap();

    assert_eq!(out.n_rows(), table.n_rows());
    assert_eq!(out.feature_names(), table.feature_names());
    for column in out.columns() {
        assert!(column.values.iter().all(|v| (0.0..=4.0).contains(v) && v.fract() == 0.0));
    }
}

#[test]
fn census_integer_bounds_hold_under_wide_noise() {
    let table = census_income(300, 3);
    let dataset = DatasetKind::CensusIncome(census_schema());
    let out = apply_noise(&table, &dataset, &NoiseParams::new(0.0, 5.0, 11)).unwrap();

    let age = &out.column("Age").unwrap().values;
    assert!(age.iter().all(|&v| v >= 0.0));
    // Age has no ceiling, so noise must have pushed something past the observed max
    assert!(age.iter().any(|&v| v > 5.0));

    let hours = &out.column("HoursPerWeek").unwrap().values;
    assert!(hours.iter().all(|&v| (0.0..=99.0).contains(&v)));

    for name in ["Sex", "CapitalGain", "CapitalLoss"] {
        let values = &out.column(name).unwrap().values;
        assert!(values.iter().all(|&v| v == 0.0 || v == 1.0), "{name}");
    }

    let education = &out.column("Education").unwrap().values;
    let (lo, hi) = {
        let col = table.column("Education").unwrap();
        (col.min(), col.max())
    };
    assert!(education.iter().all(|&v| v >= lo && v <= hi));

    for row in 0..out.n_rows() {
        assert_eq!(active_in_block(&out, "WorkClass", row), 1);
        assert_eq!(active_in_block(&out, "Relationship", row), 1);
    }
    assert_eq!(out.label(), table.label());
}

#[test]
fn census_zero_sigma_is_identity() {
    let table = census_income(120, 5);
    let dataset = DatasetKind::CensusIncome(census_schema());
    let out = apply_noise(&table, &dataset, &NoiseParams::new(0.0, 0.0, 77)).unwrap();
    assert_eq!(out, table);
}

#[test]
fn census_noise_is_seed_sensitive() {
    let table = census_income(120, 5);
    let dataset = DatasetKind::CensusIncome(census_schema());
    let a = apply_noise(&table, &dataset, &NoiseParams::new(0.0, 2.0, 1)).unwrap();
    let b = apply_noise(&table, &dataset, &NoiseParams::new(0.0, 2.0, 1)).unwrap();
    let c = apply_noise(&table, &dataset, &NoiseParams::new(0.0, 2.0, 2)).unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn splice_zero_sigma_is_identity_for_any_seed() {
    let table = splice_junction(30, 2);
    for seed in [0, 1, 42, u64::MAX] {
        let out = apply_noise(&table, &DatasetKind::SpliceJunction, &NoiseParams::new(0.0, 0.0, seed))
            .unwrap();
        assert_eq!(out, table, "seed {seed}");
    }
}

#[test]
fn splice_groups_keep_exactly_one_active_column() {
    let table = splice_junction(60, 4);
    let out = apply_noise(&table, &DatasetKind::SpliceJunction, &NoiseParams::new(0.3, 1.2, 8)).unwrap();
    for group in 0..SPLICE_GROUPS {
        for row in 0..out.n_rows() {
            let active = out.columns()[group * 4..group * 4 + 4]
                .iter()
                .filter(|c| c.values[row] == 1.0)
                .count();
            assert_eq!(active, 1);
        }
    }
}

#[test]
fn self_divergence_is_zero_for_every_dataset() {
    let bc = breast_cancer(60, 9);
    assert_abs_diff_eq!(compute_divergence(&bc, &bc).unwrap(), 0.0, epsilon = 1e-6);

    let census = census_income(150, 9);
    let score = compute_divergence_with_schema(&census, &census, census_schema()).unwrap();
    assert_abs_diff_eq!(score, 0.0, epsilon = 1e-6);

    let splice = splice_junction(600, 9);
    assert_abs_diff_eq!(compute_divergence(&splice, &splice).unwrap(), 0.0, epsilon = 1e-6);
}

#[test]
fn rank_deficient_self_divergence_does_not_fail() {
    // 60 composite features on 30 rows per class: singular covariances
    let splice = splice_junction(90, 9);
    let score = compute_divergence(&splice, &splice).unwrap();
    assert!(score >= 0.0);
}

#[test]
fn divergence_grows_with_noise() {
    let table = breast_cancer(400, 12);
    let small = apply_noise(&table, &DatasetKind::BreastCancer, &NoiseParams::new(0.0, 0.3, 3)).unwrap();
    let large = apply_noise(&table, &DatasetKind::BreastCancer, &NoiseParams::new(2.0, 3.0, 3)).unwrap();
    let d_small = compute_divergence(&table, &small).unwrap();
    let d_large = compute_divergence(&table, &large).unwrap();
    assert!(d_small >= 0.0);
    assert!(d_large > d_small);
    assert!(d_large < DIVERGENCE_SENTINEL);
}

#[test]
fn label_flip_then_divergence_keeps_label_set() {
    let table = census_income(200, 6);
    let flipped = flip_labels(&table, 0.2, "census-income", 5).unwrap();
    assert_eq!(flipped.label_values(), table.label_values());
    let score = compute_divergence_with_schema(&table, &flipped, census_schema()).unwrap();
    assert!(score >= 0.0);
}

#[test]
fn one_hot_reversal_recovers_active_column_without_noise() {
    let table = census_income(50, 21);
    let schema = census_schema();
    let out = apply_noise(&table, &DatasetKind::CensusIncome(schema.clone()), &NoiseParams::new(0.0, 0.0, 3))
        .unwrap();
    let before = reverse_one_hot(&table, &schema.one_hot_features).unwrap();
    let after = reverse_one_hot(&out, &schema.one_hot_features).unwrap();
    assert_eq!(before.column("WorkClass").unwrap(), after.column("WorkClass").unwrap());

    for row in 0..table.n_rows() {
        let position = before.column("WorkClass").unwrap().values[row] as usize;
        let name = &table.columns_with_prefix("WorkClass")[position];
        assert_eq!(table.column(name).unwrap().values[row], 1.0);
    }
}
