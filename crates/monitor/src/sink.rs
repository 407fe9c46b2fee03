//! CSV persistence of the price series
//!
//! The whole table is rewritten on every poll. Rows go to a sibling temp
//! file first and are renamed over the target, so a crash mid-write never
//! leaves a truncated CSV behind.

use crate::error::Result;
use crate::series::Series;
use pricewatch_core::PerfTimer;
use pricewatch_exchanges::Kline;

use csv::Writer;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Decimal places moving averages are written with
pub const AVERAGE_DECIMALS: u32 = 8;

/// Destination of the series after each poll
pub trait SeriesSink {
    /// Persist the full series with one moving-average column per window
    fn persist(&mut self, series: &Series, windows: &[usize]) -> Result<()>;
}

/// Full-overwrite CSV file
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "series.csv".to_string());
        self.path.with_file_name(format!(".{name}.tmp"))
    }
}

impl SeriesSink for CsvSink {
    fn persist(&mut self, series: &Series, windows: &[usize]) -> Result<()> {
        let _timer = PerfTimer::start("csv_persist");
        let temp = self.temp_path();

        let written = write_table(&temp, series, windows)
            .and_then(|()| fs::rename(&temp, &self.path).map_err(Into::into));
        if let Err(e) = written {
            let _ = fs::remove_file(&temp);
            return Err(e);
        }

        debug!("💾 Wrote {} rows to {}", series.len(), self.path.display());
        Ok(())
    }
}

fn write_table(path: &Path, series: &Series, windows: &[usize]) -> Result<()> {
    let mut writer = Writer::from_writer(File::create(path)?);

    let mut header = vec!["timestamp".to_string(), "price".to_string()];
    header.extend(windows.iter().map(|w| format!("MA_{w}")));
    writer.write_record(&header)?;

    for rolling in series.rolling_table(windows) {
        let mut record = vec![rolling.row.timestamp, rolling.row.price.to_string()];
        record.extend(rolling.averages.iter().map(|avg| {
            avg.map(|v| v.round_dp(AVERAGE_DECIMALS).normalize().to_string())
                .unwrap_or_default()
        }));
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

/// Export candles as `timestamp,open,high,low,close,volume`
pub fn write_klines_csv(path: &Path, klines: &[Kline]) -> Result<()> {
    let mut writer = Writer::from_writer(File::create(path)?);

    writer.write_record(["timestamp", "open", "high", "low", "close", "volume"])?;

    for kline in klines {
        writer.write_record([
            kline
                .open_time
                .to_datetime()
                .to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            kline.open.to_string(),
            kline.high.to_string(),
            kline.low.to_string(),
            kline.close.to_string(),
            kline.volume.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}
