mod cache;
mod catalog;
mod groundtrack;
mod predict;
mod web;

use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::fs;
use std::process::ExitCode;

use crate::cache::CatalogSnapshot;
use crate::catalog::{CatalogError, CatalogSource, FileCatalogSource};
use crate::groundtrack::sweep_catalog;
use crate::predict::TimeGrid;
use crate::web::Config;

#[derive(Parser)]
#[command(name = "groundtrack")]
#[command(about = "Same-day ground tracks for a satellite catalog")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API
    Serve {
        #[arg(short, long)]
        config: String,
    },
    /// Run one sweep for today and write the snapshot
    Compute {
        #[arg(short, long)]
        config: String,
        /// Snapshot output file; prints only a summary when omitted
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Validate the configuration and catalog files
    Check {
        #[arg(short, long)]
        config: String,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config } => serve(&config),
        Commands::Compute { config, output } => compute(&config, output.as_deref()),
        Commands::Check { config } => check(&config),
    }
}

fn load_config(path: &str) -> Option<Config> {
    match Config::from_file(path) {
        Ok(config) => Some(config),
        Err(e) => {
            eprintln!("Error loading config {}: {}", path, e);
            None
        }
    }
}

fn serve(path: &str) -> ExitCode {
    let Some(config) = load_config(path) else {
        return ExitCode::FAILURE;
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error starting runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(web::run_server(config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn compute(path: &str, output: Option<&str>) -> ExitCode {
    let Some(config) = load_config(path) else {
        return ExitCode::FAILURE;
    };
    let settings = config.cache_settings();

    let sets = match FileCatalogSource::new(config.catalog.groups.clone()).load() {
        Ok(sets) => sets,
        Err(e) => {
            eprintln!("Error loading catalog: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let now = chrono::Utc::now();
    let grid = TimeGrid::for_instant(now, settings.cadence);
    let outcome = match sweep_catalog(
        &sets,
        &grid,
        &settings.classifier,
        settings.sweep_concurrency,
    ) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("Error starting sweep: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let snapshot = CatalogSnapshot::new(now, grid, outcome.objects, outcome.excluded);
    println!(
        "Snapshot for {}: {} objects, {} excluded, {} samples each",
        snapshot.generated_on,
        snapshot.len(),
        snapshot.excluded.len(),
        snapshot.grid.len()
    );
    let mut by_class: BTreeMap<String, usize> = BTreeMap::new();
    for object in snapshot.objects.values() {
        *by_class.entry(object.orbit_class.to_string()).or_default() += 1;
    }
    for (class, count) in &by_class {
        println!("  {}: {}", class, count);
    }
    for excluded in &snapshot.excluded {
        println!(
            "  excluded {} ({}): {}",
            excluded.catalog_id, excluded.name, excluded.reason
        );
    }

    if let Some(output) = output {
        let written = snapshot
            .to_bytes()
            .map_err(|e| e.to_string())
            .and_then(|bytes| fs::write(output, bytes).map_err(|e| e.to_string()));
        if let Err(e) = written {
            eprintln!("Error writing {}: {}", output, e);
            return ExitCode::FAILURE;
        }
        println!("Wrote {}", output);
    }

    if !sets.is_empty() && snapshot.is_empty() {
        eprintln!("No catalog object could be propagated");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn check(path: &str) -> ExitCode {
    let Some(config) = load_config(path) else {
        return ExitCode::FAILURE;
    };
    println!(
        "Config is valid ({} catalog groups, {} samples per day)",
        config.catalog.groups.len(),
        config.grid.cadence_minutes.samples_per_day()
    );

    match FileCatalogSource::new(config.catalog.groups.clone()).load() {
        Ok(sets) => {
            let mut by_group: BTreeMap<&str, usize> = BTreeMap::new();
            for set in &sets {
                *by_group
                    .entry(set.group.as_deref().unwrap_or("-"))
                    .or_default() += 1;
            }
            println!("Catalog loaded ({} objects)", sets.len());
            for (group, count) in by_group {
                println!("  {}: {}", group, count);
            }
            ExitCode::SUCCESS
        }
        Err(CatalogError::NothingLoaded) => {
            eprintln!("None of the configured catalog groups could be read");
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Catalog error: {}", e);
            ExitCode::FAILURE
        }
    }
}
