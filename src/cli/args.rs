use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ghcn-station-store")]
#[command(about = "Partition GHCN daily weather data by station and query it")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(
        short,
        long,
        global = true,
        help = "Configuration file [default: ghcn-station-store.{toml,yaml,json} if present]"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download the dataset and write one JSON partition per station
    Ingest {
        #[arg(short, long, help = "Gzip-compressed CSV URL [default: from configuration]")]
        url: Option<String>,

        #[arg(
            short,
            long,
            conflicts_with = "url",
            help = "Local .csv.gz file to ingest instead of downloading"
        )]
        input: Option<PathBuf>,

        #[arg(short, long, help = "Storage directory for station partitions")]
        data_dir: Option<PathBuf>,

        #[arg(long, help = "Skip the line-counting pass (percent complete stays at 0)")]
        no_line_count: bool,

        #[arg(short, long, help = "Hide the progress bar")]
        quiet: bool,
    },

    /// Print a station's records as JSON
    Query {
        #[arg(help = "Station identifier, e.g. USW00094728")]
        station: String,

        #[arg(short, long, help = "Element code filter, e.g. TMAX (case-insensitive)")]
        element: Option<String>,

        #[arg(short, long, help = "First date to include (YYYYMMDD)")]
        start_date: Option<String>,

        #[arg(short = 'E', long, help = "Last date to include (YYYYMMDD)")]
        end_date: Option<String>,

        #[arg(short, long)]
        data_dir: Option<PathBuf>,

        #[arg(short, long, help = "Pretty-print the JSON response")]
        pretty: bool,
    },

    /// Print ingestion status for existing storage as JSON
    Status {
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
    },

    /// Describe the storage root and the element catalogue
    Info {
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
    },
}
