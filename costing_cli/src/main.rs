//! # Wirecost CLI
//!
//! Command line front end for the costing sheet: preview a costing, submit it
//! to a JSON sheet file, browse stored costings and print PDF quotations.
//!
//! Logging goes to stderr and is controlled with `RUST_LOG` (default `warn`).

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use costing_core::calculations::{calculate, CostingBreakdown, CostingInput, MaterialRates, RoundingMode, WireSpec};
use costing_core::pdf::render_costing_pdf;
use costing_core::{CostError, CostResult, CostingSettings, CostingSheet, JsonFileStore};

mod cli;

use cli::{Cli, Commands};

const DEFAULT_STORE: &str = "costings.json";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(io::stderr))
        .init();
}

/// What `calc` prints: the parsed numbers next to the rounded breakdown.
#[derive(Debug, Serialize)]
struct CalcOutput {
    spec: WireSpec,
    rates: MaterialRates,
    rounding: RoundingMode,
    breakdown: CostingBreakdown,
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        if let Ok(json) = serde_json::to_string(&e) {
            eprintln!("{}", json);
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> CostResult<()> {
    let mut settings = CostingSettings::load(&cli.config)?;
    if cli.legacy_rounding {
        settings.rounding = RoundingMode::Legacy;
    }

    let store_path = cli
        .store
        .clone()
        .or_else(|| settings.store_path.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE));

    tracing::debug!(store = %store_path.display(), rounding = ?settings.rounding, "starting");

    let mut sheet = CostingSheet::new(JsonFileStore::new(&store_path), settings);
    if !matches!(cli.command, Commands::Calc { .. }) {
        sheet.init()?;
    }

    match cli.command {
        Commands::Calc { input } => {
            let input = read_input(&input)?;
            let settings = sheet.settings();
            let spec = input.spec(&settings.defaults);
            let rates = input.rates(&settings.defaults);
            print_json(&CalcOutput {
                spec,
                rates,
                rounding: settings.rounding,
                breakdown: calculate(&spec, &rates, settings.rounding).rounded(),
            })
        }
        Commands::Init => {
            println!("Costing sheet ready at {}", store_path.display());
            Ok(())
        }
        Commands::Submit { input } => {
            let input = read_input(&input)?;
            let record = sheet.submit(&input)?;
            print_json(&record.to_row())
        }
        Commands::List { json } => {
            let records = sheet.records()?;
            if json {
                let rows: Vec<_> = records.iter().map(|r| r.to_row()).collect();
                return print_json(&rows);
            }
            if records.is_empty() {
                println!("No costings recorded in {}", store_path.display());
                return Ok(());
            }
            println!("{:<10} {:<11} {:<6} {:>12}  {}", "ID", "Date", "Type", "Cord Cost", "Company");
            for record in &records {
                println!(
                    "{:<10} {:<11} {:<6} {:>12.2}  {}",
                    record.costing_id,
                    record.date.format("%Y-%m-%d"),
                    record.cable_type.label(),
                    record.breakdown.rounded().cord_cost,
                    record.company
                );
            }
            Ok(())
        }
        Commands::Show { id } => {
            let record = sheet.find(&id)?;
            print_json(&record.to_row())
        }
        Commands::NextId => {
            println!("{}", sheet.next_id());
            Ok(())
        }
        Commands::Report { id, output } => {
            let record = sheet.find(&id)?;
            let pdf = render_costing_pdf(&record)?;
            let output = output.unwrap_or_else(|| PathBuf::from(format!("{}.pdf", record.costing_id)));
            fs::write(&output, &pdf)
                .map_err(|e| CostError::file_error("write", output.display().to_string(), e.to_string()))?;
            println!("Wrote {} ({} bytes)", output.display(), pdf.len());
            Ok(())
        }
    }
}

/// Parse a costing form from a file, or from stdin when `source` is `-`.
fn read_input(source: &str) -> CostResult<CostingInput> {
    let text = if source == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .map_err(|e| CostError::file_error("read", "<stdin>", e.to_string()))?;
        text
    } else {
        let path = Path::new(source);
        fs::read_to_string(path).map_err(|e| CostError::file_error("read", path.display().to_string(), e.to_string()))?
    };
    parse_input(&text)
}

fn parse_input(text: &str) -> CostResult<CostingInput> {
    serde_json::from_str(text).map_err(|e| CostError::serialization(format!("Invalid costing input: {}", e)))
}

fn print_json<T: Serialize>(value: &T) -> CostResult<()> {
    let json = serde_json::to_string_pretty(value).map_err(|e| CostError::serialization(e.to_string()))?;
    println!("{}", json);
    Ok(())
}
