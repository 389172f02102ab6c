use std::fs;
use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};

use crate::dataset::is_label_column;
use crate::robustness::RobustnessReport;
use crate::table::{Column, LabelColumn, Table};
use crate::{PerturbError, Result};

fn fmt_f64(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{v:.0}")
    } else {
        format!("{v:.10}")
    }
}

pub fn ensure_outdir(outdir: &Path) -> Result<()> {
    fs::create_dir_all(outdir)?;
    Ok(())
}

/// Reads a headed CSV table. A recognized label column (`diagnosis`,
/// `class`, `income`) is kept as text; every other column must be numeric.
pub fn read_table_csv(path: &Path) -> Result<Table> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();
    let label_idx = headers.iter().position(|h| is_label_column(h));

    let mut features: Vec<Vec<f64>> = vec![Vec::new(); headers.len()];
    let mut labels = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.len() != headers.len() {
            return Err(PerturbError::Shape {
                context: "csv record",
                expected: headers.len(),
                got: record.len(),
            });
        }
        for (idx, raw) in record.iter().enumerate() {
            let raw = raw.trim();
            if Some(idx) == label_idx {
                labels.push(raw.to_string());
                continue;
            }
            let value = raw.parse::<f64>().map_err(|_| PerturbError::Parse {
                path: path.to_path_buf(),
                value: raw.to_string(),
            })?;
            features[idx].push(value);
        }
    }

    let columns = headers
        .iter()
        .zip(features)
        .enumerate()
        .filter(|(idx, _)| Some(*idx) != label_idx)
        .map(|(_, (name, values))| Column::new(name.clone(), values))
        .collect();
    let label = label_idx.map(|idx| LabelColumn::new(headers[idx].clone(), labels));
    Table::new(columns, label)
}

/// Writes feature columns in order, followed by the label column.
pub fn write_table_csv(path: &Path, table: &Table) -> Result<()> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_path(path)?;

    let mut header: Vec<&str> = table.feature_names();
    if let Some(name) = table.label_name() {
        header.push(name);
    }
    wtr.write_record(&header)?;

    for r in 0..table.n_rows() {
        let mut record: Vec<String> = table.columns().iter().map(|c| fmt_f64(c.values[r])).collect();
        if let Some(label) = table.label() {
            record.push(label.values[r].clone());
        }
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn write_robustness_csv(path: &Path, report: &RobustnessReport) -> Result<()> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_path(path)?;
    wtr.write_record(["model", "family", "dataset", "metric", "absolute", "relative"])?;
    for m in &report.models {
        wtr.write_record([
            m.model.as_str(),
            report.family.as_str(),
            report.dataset.as_str(),
            report.metric.as_str(),
            &format!("{:.10}", m.absolute),
            &format!("{:.10}", m.relative),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// One divergence per line under a `divergence` header.
pub fn write_divergence_csv(path: &Path, divergences: &[f64]) -> Result<()> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_path(path)?;
    wtr.write_record(["divergence"])?;
    for d in divergences {
        wtr.write_record([format!("{d:.10}")])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes `<dir>/<i>.csv` for each iteration `i` starting at 1, one
/// divergence per file, as read back by the robustness aggregator.
pub fn write_iteration_divergences(dir: &Path, divergences: &[f64]) -> Result<()> {
    ensure_outdir(dir)?;
    for (i, &d) in divergences.iter().enumerate() {
        write_divergence_csv(&dir.join(format!("{}.csv", i + 1)), &[d])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::robustness::column_mean;

    #[test]
    fn table_round_trips_through_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bc.csv");
        fs::write(&path, "clump,size,diagnosis\n1,4,M\n3,2,B\n5,1,M\n").unwrap();

        let table = read_table_csv(&path).unwrap();
        assert_eq!(table.feature_names(), vec!["clump", "size"]);
        assert_eq!(table.label_name(), Some("diagnosis"));
        assert_eq!(table.column("size").unwrap().values, vec![4.0, 2.0, 1.0]);

        let out = dir.path().join("out.csv");
        write_table_csv(&out, &table).unwrap();
        assert_eq!(read_table_csv(&out).unwrap(), table);
        assert_eq!(
            fs::read_to_string(&out).unwrap(),
            "clump,size,diagnosis\n1,4,M\n3,2,B\n5,1,M\n"
        );
    }

    #[test]
    fn non_numeric_feature_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, "x,diagnosis\nabc,M\n").unwrap();
        assert!(matches!(
            read_table_csv(&path),
            Err(PerturbError::Parse { .. })
        ));
    }

    #[test]
    fn divergence_file_is_readable_by_aggregator() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("1.csv");
        write_divergence_csv(&path, &[0.5, 1.5]).unwrap();
        assert_eq!(column_mean(&path, None).unwrap(), 1.0);
    }

    #[test]
    fn iteration_divergences_use_one_file_per_iteration() {
        let dir = tempfile::tempdir().unwrap();
        let divergences = dir.path().join("noise/breast-cancer/divergences");
        write_iteration_divergences(&divergences, &[0.25, 2.0, 8.5]).unwrap();

        assert!(!divergences.join("0.csv").exists());
        assert_eq!(column_mean(&divergences.join("1.csv"), None).unwrap(), 0.25);
        assert_eq!(column_mean(&divergences.join("2.csv"), None).unwrap(), 2.0);
        assert_eq!(column_mean(&divergences.join("3.csv"), None).unwrap(), 8.5);
        assert!(!divergences.join("4.csv").exists());
    }
}
