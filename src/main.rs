use actigraph_counts::config::Args;
use actigraph_counts::data_loading::{
    epoch_start_times, read_csv_file, read_feather_file, CsvSampleReader,
};
use actigraph_counts::output::{is_counts_output, output_path_for, write_counts, EpochTimes};
use actigraph_counts::{compute_counts_with, CountRecord, StreamingCounter};
use anyhow::{bail, Context, Result};
use chrono::NaiveDateTime;
use clap::Parser;
use log::{debug, info};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use walkdir::WalkDir;

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    if args.input_path.is_dir() {
        process_directory(&args)
    } else {
        process_file(&args, &args.input_path, args.output.as_deref())
    }
}

fn process_directory(args: &Args) -> Result<()> {
    let extensions = args.input_extensions();
    let mut processed = 0;

    for entry in WalkDir::new(&args.input_path).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        let matches = path
            .extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)));
        if !entry.file_type().is_file() || !matches {
            continue;
        }
        if is_counts_output(path) {
            debug!("Skipping earlier output {}", path.display());
            continue;
        }

        let out_dir = match &args.output {
            Some(dir) => dir.as_path(),
            None => path.parent().unwrap_or(Path::new(".")),
        };
        std::fs::create_dir_all(out_dir)?;
        let out_path = output_path_for(path, out_dir, args.format);
        process_file(args, path, Some(&out_path))?;
        processed += 1;
    }

    if processed == 0 {
        bail!(
            "No .{} files found under {}",
            extensions.join("/."),
            args.input_path.display()
        );
    }
    info!("Processed {} files", processed);
    Ok(())
}

fn process_file(args: &Args, input: &Path, output: Option<&Path>) -> Result<()> {
    info!("Processing {}", input.display());

    let (records, timestamps) = if args.streaming {
        (stream_csv(args, input)?, None)
    } else {
        let loaded = if args.feather_input {
            read_feather_file(input, args.sample_rate)?
        } else {
            read_csv_file(input, args.sample_rate, args.time_column.as_deref())?
        };
        let records = compute_counts_with(&loaded.series, args.sample_rate, &args.counts_config())
            .with_context(|| format!("Failed to compute counts for {}", input.display()))?;
        (records, loaded.timestamps)
    };
    info!("{}: {} epochs", input.display(), records.len());

    let starts: Option<Vec<NaiveDateTime>> = timestamps
        .map(|ts| epoch_start_times(&ts, args.epoch_seconds, records.len()));
    let times = match (&args.time_column, &starts) {
        (Some(column), Some(starts)) => Some(EpochTimes { column, starts }),
        _ => None,
    };

    match output {
        Some(path) => {
            println!("Writing results to {}", path.display());
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            write_counts(BufWriter::new(file), args.format, &records, times)
        }
        None => write_counts(std::io::stdout().lock(), args.format, &records, times),
    }
}

fn stream_csv(args: &Args, input: &Path) -> Result<Vec<CountRecord>> {
    let mut counter = StreamingCounter::new(args.sample_rate, &args.counts_config())?;
    let mut records = Vec::new();

    for sample in CsvSampleReader::open(input)? {
        if let Some(record) = counter.push(sample?)? {
            debug!("Epoch {} complete", record.epoch_index);
            records.push(record);
        }
    }

    if counter.samples_seen() == 0 {
        bail!("{} contains no samples", input.display());
    }
    Ok(records)
}
