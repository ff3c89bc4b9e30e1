use crate::{Axis, RawSample, RawSeries};
use anyhow::{anyhow, bail, Context, Result};
use arrow::array::{Array, Float32Array, Float64Array};
use arrow::ipc::reader::FileReaderBuilder;
use chrono::{DateTime, NaiveDateTime};
use log::{info, warn};
use std::collections::HashSet;
use std::fs::File;
use std::path::Path;

/// A recording read from disk, with its timestamps when a time column was requested.
#[derive(Debug)]
pub struct LoadedSeries {
    pub series: RawSeries,
    pub timestamps: Option<Vec<NaiveDateTime>>,
}

/// Header positions of the X, Y and Z columns.
#[derive(Debug, Clone, Copy)]
struct AxisColumns([usize; 3]);

impl AxisColumns {
    fn locate(headers: &csv::StringRecord, path: &Path) -> Result<Self> {
        let mut positions = [0; 3];
        for (slot, axis) in positions.iter_mut().zip(Axis::ALL) {
            *slot = header_position(headers, axis.column_name()).with_context(|| {
                format!("{} has no {} column", path.display(), axis.column_name())
            })?;
        }
        Ok(AxisColumns(positions))
    }

    fn parse(&self, record: &csv::StringRecord, row: usize) -> Result<RawSample> {
        let mut values = [0.0; 3];
        for ((value, &position), axis) in values.iter_mut().zip(&self.0).zip(Axis::ALL) {
            let field = record
                .get(position)
                .ok_or_else(|| anyhow!("row {}: missing {} value", row, axis.column_name()))?;
            *value = field.trim().parse::<f64>().with_context(|| {
                format!("row {}: invalid {} value '{}'", row, axis.column_name(), field)
            })?;
        }
        Ok(RawSample::new(values[0], values[1], values[2]))
    }
}

fn header_position(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.trim() == name)
}

/// Read a CSV with `X`, `Y`, `Z` columns (any other columns are ignored).
pub fn read_csv_file(path: &Path, sample_rate: u32, time_column: Option<&str>) -> Result<LoadedSeries> {
    let file = File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(file);

    let headers = rdr.headers()?.clone();
    let columns = AxisColumns::locate(&headers, path)?;
    let time_position = time_column
        .map(|name| {
            header_position(&headers, name)
                .ok_or_else(|| anyhow!("{} has no {} column", path.display(), name))
        })
        .transpose()?;

    let mut samples = Vec::new();
    let mut timestamps = time_position.map(|_| Vec::new());

    for (row, result) in rdr.records().enumerate() {
        let record = result?;
        samples.push(columns.parse(&record, row)?);

        if let (Some(position), Some(times)) = (time_position, timestamps.as_mut()) {
            let field = record
                .get(position)
                .ok_or_else(|| anyhow!("row {}: missing timestamp", row))?;
            times.push(parse_timestamp(field).with_context(|| format!("row {}", row))?);
        }
    }

    info!("Loaded {} samples from {}", samples.len(), path.display());
    Ok(LoadedSeries {
        series: RawSeries::new(samples, sample_rate),
        timestamps,
    })
}

/// Read an Arrow IPC (Feather v2) file with float `X`, `Y`, `Z` columns.
pub fn read_feather_file(path: &Path, sample_rate: u32) -> Result<LoadedSeries> {
    let file = File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
    let reader = FileReaderBuilder::new().build(file)?;
    let mut axes: [Vec<f64>; 3] = Default::default();

    for batch in reader {
        let batch = batch?;
        for (values, axis) in axes.iter_mut().zip(Axis::ALL) {
            let column = batch
                .column_by_name(axis.column_name())
                .ok_or_else(|| anyhow!("{} has no {} column", path.display(), axis.column_name()))?;
            append_float_column(column.as_ref(), values)
                .with_context(|| format!("{} column {}", path.display(), axis.column_name()))?;
        }
    }

    let [x, y, z] = axes;
    let series = RawSeries::from_axes(&x, &y, &z, sample_rate)?;
    info!("Loaded {} samples from {}", series.len(), path.display());
    Ok(LoadedSeries {
        series,
        timestamps: None,
    })
}

fn append_float_column(column: &dyn Array, out: &mut Vec<f64>) -> Result<()> {
    let offset = out.len();
    let values: Vec<Option<f64>> = if let Some(array) = column.as_any().downcast_ref::<Float64Array>() {
        array.iter().collect()
    } else if let Some(array) = column.as_any().downcast_ref::<Float32Array>() {
        array.iter().map(|v| v.map(f64::from)).collect()
    } else {
        bail!("expected a float column, found {}", column.data_type());
    };

    for (i, value) in values.into_iter().enumerate() {
        out.push(value.ok_or_else(|| anyhow!("row {}: null value", offset + i))?);
    }
    Ok(())
}

/// Row-at-a-time CSV reader for streaming extraction.
pub struct CsvSampleReader {
    records: csv::StringRecordsIntoIter<File>,
    columns: AxisColumns,
    row: usize,
}

impl CsvSampleReader {
    pub fn open(path: &Path) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(file);
        let columns = AxisColumns::locate(rdr.headers()?, path)?;
        Ok(CsvSampleReader {
            records: rdr.into_records(),
            columns,
            row: 0,
        })
    }
}

impl Iterator for CsvSampleReader {
    type Item = Result<RawSample>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.records.next()?;
        let row = self.row;
        self.row += 1;
        Some(record.map_err(Into::into).and_then(|r| self.columns.parse(&r, row)))
    }
}

const TIMESTAMP_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"];

pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_utc());
    }
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .ok_or_else(|| anyhow!("unrecognized timestamp '{}'", s))
}

/// Round to the nearest multiple of `epoch_seconds`, ties to even.
pub fn round_to_epoch(ts: NaiveDateTime, epoch_seconds: u32) -> NaiveDateTime {
    let unit = i64::from(epoch_seconds) * 1_000_000;
    let micros = ts.and_utc().timestamp_micros();
    let floor = micros.div_euclid(unit);
    let rounded = match (micros.rem_euclid(unit) * 2).cmp(&unit) {
        std::cmp::Ordering::Less => floor,
        std::cmp::Ordering::Greater => floor + 1,
        std::cmp::Ordering::Equal if floor.rem_euclid(2) == 0 => floor,
        std::cmp::Ordering::Equal => floor + 1,
    };
    DateTime::from_timestamp_micros(rounded * unit)
        .map(|dt| dt.naive_utc())
        .unwrap_or(ts)
}

/// One timestamp per epoch: sample times rounded to the epoch grid, in order
/// of first appearance, truncated to `n_epochs`.
pub fn epoch_start_times(
    timestamps: &[NaiveDateTime],
    epoch_seconds: u32,
    n_epochs: usize,
) -> Vec<NaiveDateTime> {
    let mut seen = HashSet::new();
    let starts: Vec<NaiveDateTime> = timestamps
        .iter()
        .map(|&ts| round_to_epoch(ts, epoch_seconds))
        .filter(|ts| seen.insert(*ts))
        .take(n_epochs)
        .collect();
    if starts.len() < n_epochs {
        warn!(
            "Only {} distinct epoch timestamps for {} epochs",
            starts.len(),
            n_epochs
        );
    }
    starts
}
