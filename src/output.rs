use crate::config::OutputFormat;
use crate::{Axis, CountRecord};
use anyhow::Result;
use chrono::NaiveDateTime;
use ndarray::Array2;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Stem suffix of every file written by directory mode.
pub const OUTPUT_SUFFIX: &str = "_counts";

/// Epoch start times and the name of the column they are written under.
#[derive(Debug, Clone, Copy)]
pub struct EpochTimes<'a> {
    pub column: &'a str,
    pub starts: &'a [NaiveDateTime],
}

#[derive(Debug, Serialize)]
struct JsonEpoch {
    epoch: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    time: Option<NaiveDateTime>,
    #[serde(rename = "X")]
    x: u32,
    #[serde(rename = "Y")]
    y: u32,
    #[serde(rename = "Z")]
    z: u32,
    #[serde(rename = "AC")]
    ac: f64,
}

pub fn write_counts<W: Write>(
    writer: W,
    format: OutputFormat,
    records: &[CountRecord],
    times: Option<EpochTimes<'_>>,
) -> Result<()> {
    match format {
        OutputFormat::Csv => write_counts_csv(writer, records, times),
        OutputFormat::Json => write_counts_json(writer, records, times),
    }
}

/// One row per epoch: `[time,] X, Y, Z, AC`.
pub fn write_counts_csv<W: Write>(
    writer: W,
    records: &[CountRecord],
    times: Option<EpochTimes<'_>>,
) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);

    let mut header: Vec<&str> = Vec::with_capacity(5);
    if let Some(times) = &times {
        header.push(times.column);
    }
    header.extend(Axis::ALL.iter().map(|a| a.column_name()));
    header.push("AC");
    writer.write_record(&header)?;

    for record in records {
        let mut row: Vec<String> = Vec::with_capacity(5);
        if let Some(times) = &times {
            // Epochs beyond the last distinct timestamp get an empty cell.
            row.push(
                times
                    .starts
                    .get(record.epoch_index)
                    .map(|t| t.format(TIME_FORMAT).to_string())
                    .unwrap_or_default(),
            );
        }
        row.extend(Axis::ALL.iter().map(|&a| record.get(a).to_string()));
        // `{:?}` keeps the trailing `.0` on integral magnitudes.
        row.push(format!("{:?}", record.vector_magnitude()));
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

pub fn write_counts_json<W: Write>(
    writer: W,
    records: &[CountRecord],
    times: Option<EpochTimes<'_>>,
) -> Result<()> {
    let rows: Vec<JsonEpoch> = records
        .iter()
        .map(|r| JsonEpoch {
            epoch: r.epoch_index,
            time: times.and_then(|t| t.starts.get(r.epoch_index).copied()),
            x: r.x,
            y: r.y,
            z: r.z,
            ac: r.vector_magnitude(),
        })
        .collect();
    serde_json::to_writer_pretty(writer, &rows)?;
    Ok(())
}

/// `n × 3` matrix of counts, columns in X, Y, Z order.
pub fn counts_matrix(records: &[CountRecord]) -> Array2<u32> {
    Array2::from_shape_fn((records.len(), 3), |(row, col)| {
        records[row].get(Axis::ALL[col])
    })
}

/// `<out_dir>/<stem>_counts.<ext>` for an input file.
pub fn output_path_for(input: &Path, out_dir: &Path, format: OutputFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("results");
    out_dir.join(format!("{}{}.{}", stem, OUTPUT_SUFFIX, format.extension()))
}

/// Whether `path` looks like a file [`output_path_for`] produced.
pub fn is_counts_output(path: &Path) -> bool {
    path.file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|stem| stem.ends_with(OUTPUT_SUFFIX))
}
