use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use pxstream_core::config::ReadLimits;
use pxstream_core::constants::{DEFAULT_MAX_RECORDS, FRAME_VERSION};
use pxstream_core::telemetry::TelemetrySnapshot;

mod commands;
mod input;

use commands::RunStats;

#[derive(Parser)]
#[command(name = "pxstream")]
#[command(about = "Pack, inspect and window PX record frames")]
#[command(version)]
struct Cli {
    /// Print a telemetry snapshot as JSON to stderr when done
    #[arg(long, global = true)]
    stats: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pack `timestamp,value` lines into a frame file
    Pack {
        /// Text input, or `-` for stdin
        #[arg(short, long, default_value = "-")]
        input: String,

        /// Frame file to write
        #[arg(short, long)]
        output: PathBuf,

        /// Version byte written into the header
        #[arg(long, default_value_t = FRAME_VERSION)]
        frame_version: u8,
    },
    /// Print the records of a frame file
    Dump {
        /// Frame file to read
        #[arg(short, long)]
        input: PathBuf,

        /// Refuse frames declaring more records than this
        #[arg(long, default_value_t = DEFAULT_MAX_RECORDS)]
        max_records: u32,

        /// Emit JSON instead of tab-separated lines
        #[arg(long)]
        json: bool,
    },
    /// Show header fields and checksum status of a frame file
    Inspect {
        /// Frame file to read
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Sliding windows (or moving averages) over numbers
    Window {
        /// Window width
        #[arg(short = 'k', long)]
        width: usize,

        /// Print the mean of each window instead of the window itself
        #[arg(short, long)]
        average: bool,

        /// Values to window; read from stdin when absent
        #[arg(allow_negative_numbers = true)]
        values: Vec<f64>,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let mut stats = RunStats::default();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let result = match cli.command {
        Commands::Pack { input, output, frame_version } => {
            commands::pack(&input, &output, frame_version, &mut stats, &mut out)
        }
        Commands::Dump { input, max_records, json } => {
            let limits = ReadLimits { max_records };
            commands::dump(&input, &limits, json, &mut stats, &mut out)
        }
        Commands::Inspect { input } => commands::inspect(&input, &mut stats, &mut out),
        Commands::Window { width, average, values } => {
            commands::window(width, average, values, &mut stats, &mut out)
        }
    };
    out.flush()?;

    stats.timer.finish();
    if cli.stats {
        let snapshot = TelemetrySnapshot::from(&stats.counters, &stats.timer);
        eprintln!("{}", snapshot.to_json()?);
    }
    result
}
