use anyhow::Context;
use brushset_lib::services::extract::BatchOutcome;
use brushset_lib::{BrushsetExtractor, ExtractConfig};
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

/// Extract Procreate `.brushset` files into resolved JSON documents.
#[derive(Parser, Debug)]
#[command(name = "brushset", version, about)]
struct Cli {
    /// Brushset files to extract.
    #[arg(required = true, value_hint = clap::ValueHint::FilePath)]
    files: Vec<PathBuf>,

    /// Output directory (default: `cache`).
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    output: Option<PathBuf>,

    /// Shared texture directory (default: `images`).
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    assets: Option<PathBuf>,

    /// JSON settings file; flags override its values.
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Hide the progress line.
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Returns whether every file opened.
fn run(cli: Cli) -> anyhow::Result<bool> {
    let mut config = ExtractConfig::load_or_default(cli.config.as_deref())
        .context("failed to load settings")?;
    if let Some(output) = cli.output {
        config.output_dir = output;
    }
    if let Some(assets) = cli.assets {
        config.texture.asset_dir = assets;
    }

    let extractor = BrushsetExtractor::new(config);
    let quiet = cli.quiet;
    let mut show_progress = |percent: f64| {
        if !quiet {
            eprint!("\rProgress: {percent:.0}%");
            let _ = io::stderr().flush();
            if percent >= 100.0 {
                eprintln!();
            }
        }
    };

    let outcomes = extractor.extract_batch(&cli.files, Some(&mut show_progress), None);
    Ok(summarize(&outcomes))
}

fn summarize(outcomes: &[BatchOutcome]) -> bool {
    let mut all_opened = true;
    for outcome in outcomes {
        match &outcome.result {
            Ok(report) => {
                log::info!(
                    "{}: {} documents, {} images, {} warnings, {} failed members",
                    outcome.source.display(),
                    report.documents.len(),
                    report.images.len(),
                    report.warnings.len(),
                    report.failures.len()
                );
                for failure in &report.failures {
                    log::warn!("  {}: {}", failure.member, failure.error);
                }
            }
            Err(e) => {
                all_opened = false;
                log::error!("{}: {e}", outcome.source.display());
            }
        }
    }
    all_opened
}
