use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use ski_perturb::io::{
    ensure_outdir, read_table_csv, write_divergence_csv, write_iteration_divergences,
    write_robustness_csv, write_table_csv,
};
use ski_perturb::{
    apply_noise, compute_divergence, compute_robustness, flip_labels,
    ExperimentConfig, PerturbationFamily,
};

#[derive(Debug, Parser)]
#[command(name = "ski_perturb")]
#[command(about = "Seeded dataset perturbation, Gaussian KL divergence and robustness scores")]
struct Cli {
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply Gaussian noise to a dataset CSV
    Noise {
        input: PathBuf,
        output: PathBuf,
        #[arg(long)]
        dataset: Option<String>,
        #[arg(long)]
        mu: Option<f64>,
        #[arg(long)]
        sigma: Option<f64>,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Flip labels of a dataset CSV
    Flip {
        input: PathBuf,
        output: PathBuf,
        #[arg(long)]
        dataset: Option<String>,
        #[arg(long)]
        p: Option<f64>,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Pooled divergence between an original and a perturbed CSV
    Divergence { original: PathBuf, perturbed: PathBuf },
    /// Robustness of every model from precomputed result files
    Robustness {
        #[arg(long)]
        results_root: Option<PathBuf>,
        #[arg(long)]
        family: Option<String>,
        #[arg(long)]
        dataset: Option<String>,
        #[arg(long)]
        metric: Option<String>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Run `iterations` noise draws and record their divergences
    Sweep {
        input: PathBuf,
        #[arg(long, default_value = "output-ski-perturb")]
        outdir: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(error) = try_main() {
        eprintln!("ski_perturb failed: {error:#}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let cli = Cli::parse();
    let base = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Noise {
            input,
            output,
            dataset,
            mu,
            sigma,
            seed,
        } => {
            let config = ExperimentConfig {
                dataset: dataset.unwrap_or(base.dataset.clone()),
                mu: mu.unwrap_or(base.mu),
                sigma: sigma.unwrap_or(base.sigma),
                seed: seed.unwrap_or(base.seed),
                ..base
            };
            config.validate()?;
            let table = read_table_csv(&input)
                .with_context(|| format!("failed to read dataset: {}", input.display()))?;
            let perturbed = apply_noise(&table, &config.dataset_kind()?, &config.noise_params(0))?;
            write_table_csv(&output, &perturbed)
                .with_context(|| format!("failed to write perturbed dataset: {}", output.display()))?;
        }
        Command::Flip {
            input,
            output,
            dataset,
            p,
            seed,
        } => {
            let config = ExperimentConfig {
                dataset: dataset.unwrap_or(base.dataset.clone()),
                label_flip_p: p.unwrap_or(base.label_flip_p),
                seed: seed.unwrap_or(base.seed),
                ..base
            };
            config.validate()?;
            let table = read_table_csv(&input)
                .with_context(|| format!("failed to read dataset: {}", input.display()))?;
            let flipped = flip_labels(&table, config.label_flip_p, &config.dataset, config.seed)?;
            write_table_csv(&output, &flipped)
                .with_context(|| format!("failed to write flipped dataset: {}", output.display()))?;
        }
        Command::Divergence {
            original,
            perturbed,
        } => {
            let score = divergence_between(&original, &perturbed)?;
            println!("{score:.10}");
        }
        Command::Robustness {
            results_root,
            family,
            dataset,
            metric,
            out,
        } => {
            let root = results_root.unwrap_or(base.results_root.clone());
            let family = family
                .map(|f| PerturbationFamily::from_name(&f))
                .unwrap_or_else(|| base.family());
            let dataset = dataset.unwrap_or(base.dataset.clone());
            let metric = metric.unwrap_or(base.metric.clone());

            let report = compute_robustness(&root, &family, &dataset, &metric)
                .with_context(|| format!("failed to aggregate results under {}", root.display()))?;
            for (key, value) in report.to_map() {
                println!("{key}: {value:.10}");
            }
            if let Some(out) = out {
                write_robustness_csv(&out, &report)
                    .with_context(|| format!("failed to write report: {}", out.display()))?;
            }
        }
        Command::Sweep { input, outdir } => {
            base.validate()?;
            run_sweep(&base, &input, &outdir)?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<ExperimentConfig> {
    if let Some(path) = path {
        return ExperimentConfig::from_json_file(path)
            .with_context(|| format!("failed to load config: {}", path.display()));
    }

    let cwd_config = PathBuf::from("ski_perturb.json");
    if cwd_config.exists() {
        return ExperimentConfig::from_json_file(&cwd_config)
            .with_context(|| format!("failed to load config: {}", cwd_config.display()));
    }

    Ok(ExperimentConfig::default())
}

fn divergence_between(original: &Path, perturbed: &Path) -> Result<f64> {
    let lhs = read_table_csv(original)
        .with_context(|| format!("failed to read dataset: {}", original.display()))?;
    let rhs = read_table_csv(perturbed)
        .with_context(|| format!("failed to read dataset: {}", perturbed.display()))?;
    Ok(compute_divergence(&lhs, &rhs)?)
}

fn run_sweep(config: &ExperimentConfig, input: &Path, outdir: &Path) -> Result<()> {
    ensure_outdir(outdir)
        .with_context(|| format!("failed to create output directory: {}", outdir.display()))?;
    let dataset = config.dataset_kind()?;
    let table = read_table_csv(input)
        .with_context(|| format!("failed to read dataset: {}", input.display()))?;

    let mut divergences = Vec::with_capacity(config.iterations);
    for i in 0..config.iterations {
        let params = config.noise_params(i);
        let perturbed = apply_noise(&table, &dataset, &params)?;
        let path = outdir.join(format!("perturbed_{:03}.csv", i + 1));
        write_table_csv(&path, &perturbed)
            .with_context(|| format!("failed to write {}", path.display()))?;
        divergences.push(compute_divergence(&table, &perturbed)?);
    }

    let path = outdir.join("divergences.csv");
    write_divergence_csv(&path, &divergences)
        .with_context(|| format!("failed to write {}", path.display()))?;
    let per_iteration = outdir.join("divergences");
    write_iteration_divergences(&per_iteration, &divergences)
        .with_context(|| format!("failed to write {}", per_iteration.display()))?;
    println!("Output directory: {}", outdir.display());
    Ok(())
}
