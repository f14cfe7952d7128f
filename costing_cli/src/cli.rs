use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "wirecost", version, about = "Wire and cable costing sheet")]
pub struct Cli {
    /// Settings file path
    #[arg(short, long, default_value = "wirecost.toml", global = true)]
    pub config: PathBuf,

    /// Costing sheet file (overrides `store_path` from settings)
    #[arg(short, long, global = true)]
    pub store: Option<PathBuf>,

    /// Round each intermediate value before it feeds the next formula
    #[arg(long, global = true)]
    pub legacy_rounding: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Compute a costing from a JSON form without storing it
    Calc {
        /// Input JSON file, or `-` for stdin
        #[arg(short, long, default_value = "-")]
        input: String,
    },

    /// Create the costing sheet with its header row
    Init,

    /// Compute a costing and append it to the sheet
    Submit {
        /// Input JSON file, or `-` for stdin
        #[arg(short, long, default_value = "-")]
        input: String,
    },

    /// List stored costings
    List {
        /// Print full rows as JSON instead of a summary table
        #[arg(long)]
        json: bool,
    },

    /// Show one stored costing as a sheet row
    Show {
        /// Costing ID, e.g. CO-0004
        id: String,
    },

    /// Print the ID the next submission would get
    NextId,

    /// Render a stored costing as a PDF quotation sheet
    Report {
        /// Costing ID, e.g. CO-0004
        id: String,

        /// Output PDF path (defaults to `<ID>.pdf`)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
