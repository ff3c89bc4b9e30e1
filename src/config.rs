use crate::engine::CountsConfig;
use clap::Parser;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Invalid output format: {}. Use csv or json", s)),
        }
    }
}

/// Compute ActiGraph-compatible activity counts from raw accelerometer data
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Raw data file, or a directory to process every matching file beneath it
    #[arg(help = "Raw data file (CSV with X, Y, Z columns) or a directory of them")]
    pub input_path: PathBuf,

    /// Whether the input is a Feather (Arrow IPC) file
    #[arg(long)]
    pub feather_input: bool,

    /// Sample rate of the raw data in Hz (30, 40, ..., 100)
    #[arg(long, env = "ACTIGRAPH_SAMPLE_RATE")]
    pub sample_rate: u32,

    /// Epoch length in seconds
    #[arg(long, env = "ACTIGRAPH_EPOCH_SECONDS")]
    pub epoch_seconds: u32,

    /// Name of a timestamp column to carry over as epoch start times
    #[arg(long)]
    pub time_column: Option<String>,

    /// Use the low-frequency extension dead band
    #[arg(long)]
    pub lfe: bool,

    /// Read and process the CSV one row at a time
    #[arg(long, conflicts_with_all = ["time_column", "feather_input"])]
    pub streaming: bool,

    /// Process the three axes on the calling thread
    #[arg(long)]
    pub single_threaded: bool,

    /// Output format (csv or json)
    #[arg(long, default_value = "csv")]
    pub format: OutputFormat,

    /// Output file, or output directory when the input is a directory.
    /// Defaults to stdout for a single file and the input's directory otherwise
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Log each pipeline stage
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn counts_config(&self) -> CountsConfig {
        CountsConfig {
            epoch_seconds: self.epoch_seconds,
            low_frequency_extension: self.lfe,
            parallel_axes: !self.single_threaded,
        }
    }

    /// File extensions picked up when the input is a directory.
    pub fn input_extensions(&self) -> &'static [&'static str] {
        if self.feather_input {
            &["feather", "arrow", "ipc"]
        } else {
            &["csv"]
        }
    }
}
