use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;
mod error;

use commands::validate_message::MessageKind;
use config::CliConfig;
use error::CliResult;

#[derive(Parser)]
#[command(name = "event-models")]
#[command(about = "Inspect and validate ticket resale pipeline records")]
#[command(version)]
struct Cli {
    /// YAML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a cached availability file into a structured snapshot
    DecodeSnapshot {
        /// Event the cached places belong to
        #[arg(short, long)]
        event_id: String,

        /// JSON object of place_id -> positional values
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Encode structured place records into the cached availability form
    EncodeSnapshot {
        /// Event the places belong to
        #[arg(short, long)]
        event_id: String,

        /// JSON array of place records, each carrying a place_id
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate pipeline messages of one kind
    Validate {
        /// Record kind
        #[arg(short, long, value_enum)]
        kind: MessageKind,

        /// JSON file holding one record or an array of records
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();

    let config = CliConfig::load(cli.config.as_deref())?;
    config.init_logging()?;

    match cli.command {
        Commands::DecodeSnapshot {
            event_id,
            input,
            output,
        } => commands::decode_snapshot::execute(&config, event_id, input, output),

        Commands::EncodeSnapshot {
            event_id,
            input,
            output,
        } => commands::encode_snapshot::execute(&config, event_id, input, output),

        Commands::Validate { kind, input } => {
            commands::validate_message::execute(&config, kind, input)
        }
    }
}
