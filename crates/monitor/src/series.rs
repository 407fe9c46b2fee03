//! Rolling price series and moving averages
//!
//! A [`Series`] is an append-only list of timestamped prices for one symbol.
//! Moving averages are simple means over the last `N` prices, recomputed from
//! the stored samples rather than updated incrementally.

use pricewatch_core::prelude::*;
use chrono::SecondsFormat;
use std::collections::BTreeMap;
use thiserror::Error;

/// Moving average windows written by default (`MA_7` .. `MA_200`)
pub const DEFAULT_WINDOWS: [usize; 6] = [7, 25, 50, 75, 99, 200];

/// Series errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SeriesError {
    #[error("Out of order sample: {attempted} is earlier than last sample at {last}")]
    OutOfOrder {
        last: DateTime<Utc>,
        attempted: DateTime<Utc>,
    },

    #[error("Price must be positive, got {price} at {timestamp}")]
    NonPositivePrice {
        price: Fixed,
        timestamp: DateTime<Utc>,
    },
}

/// One observed price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub price: Fixed,
}

impl Sample {
    pub fn new(timestamp: DateTime<Utc>, price: Fixed) -> Self {
        Self { timestamp, price }
    }
}

/// `(timestamp, price)` row as written to disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesRow {
    /// RFC 3339, UTC, millisecond precision
    pub timestamp: String,
    pub price: Fixed,
}

/// A row plus the value each window had when that row was the latest sample
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollingRow {
    pub row: SeriesRow,
    /// One entry per requested window, in request order
    pub averages: Vec<Option<Fixed>>,
}

/// Mean price per window size
///
/// Windows longer than the series (and a window of 0) are absent rather
/// than zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RollingStats(BTreeMap<usize, Fixed>);

impl RollingStats {
    pub fn get(&self, window: usize) -> Option<Fixed> {
        self.0.get(&window).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, Fixed)> + '_ {
        self.0.iter().map(|(w, v)| (*w, *v))
    }

    pub fn into_inner(self) -> BTreeMap<usize, Fixed> {
        self.0
    }
}

/// Append-only price history of one symbol
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Series {
    symbol: String,
    samples: Vec<Sample>,
}

impl Series {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            samples: Vec::new(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn last(&self) -> Option<&Sample> {
        self.samples.last()
    }

    /// Append a sample; the series is left untouched if its price is not
    /// positive or it predates the last one
    ///
    /// Equal timestamps are accepted.
    pub fn append(&mut self, sample: Sample) -> Result<(), SeriesError> {
        if !sample.price.is_positive() {
            return Err(SeriesError::NonPositivePrice {
                price: sample.price,
                timestamp: sample.timestamp,
            });
        }
        if let Some(last) = self.samples.last() {
            if sample.timestamp < last.timestamp {
                return Err(SeriesError::OutOfOrder {
                    last: last.timestamp,
                    attempted: sample.timestamp,
                });
            }
        }
        self.samples.push(sample);
        Ok(())
    }

    /// Mean of the last `w` prices for every window the series is long enough for
    pub fn recompute_rolling_stats(&self, windows: &[usize]) -> RollingStats {
        let prices: Vec<Fixed> = self.samples.iter().map(|s| s.price).collect();

        let stats = windows
            .iter()
            .filter(|&&w| w > 0 && w <= prices.len())
            .filter_map(|&w| Fixed::mean(&prices[prices.len() - w..]).map(|avg| (w, avg)))
            .collect();

        RollingStats(stats)
    }

    pub fn rows(&self) -> Vec<SeriesRow> {
        self.samples.iter().map(row_of).collect()
    }

    /// Every row with its moving averages, using running sums per window
    pub fn rolling_table(&self, windows: &[usize]) -> Vec<RollingRow> {
        let mut sums = vec![Fixed::ZERO; windows.len()];
        let mut table = Vec::with_capacity(self.samples.len());

        for (i, sample) in self.samples.iter().enumerate() {
            let averages = windows
                .iter()
                .zip(sums.iter_mut())
                .map(|(&w, sum)| {
                    if w == 0 {
                        return None;
                    }
                    *sum += sample.price;
                    if i >= w {
                        *sum -= self.samples[i - w].price;
                    }
                    (i + 1 >= w).then(|| *sum / Fixed::from_i64(w as i64))
                })
                .collect();

            table.push(RollingRow {
                row: row_of(sample),
                averages,
            });
        }

        table
    }
}

fn row_of(sample: &Sample) -> SeriesRow {
    SeriesRow {
        timestamp: sample.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        price: sample.price,
    }
}
