//! Per-day video production logs.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::domain::{ProductId, VideoLogId};

/// Validation failures for a video count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum VideoCountError {
    #[error("count must be a non-negative integer, got {0}")]
    Negative(i64),
    #[error("count is too large, got {0}")]
    TooLarge(i64),
}

/// Number of videos produced on one day. Zero is valid and corrects a
/// mistaken entry.
///
/// # Examples
/// ```
/// use prodtrack::domain::VideoCount;
///
/// assert_eq!(VideoCount::new(0).expect("zero is valid").get(), 0);
/// assert!(VideoCount::new(-1).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct VideoCount(i32);

impl VideoCount {
    /// Validate a raw count; negative or oversized values are rejected.
    pub fn new(value: i64) -> Result<Self, VideoCountError> {
        if value < 0 {
            return Err(VideoCountError::Negative(value));
        }
        i32::try_from(value)
            .map(Self)
            .map_err(|_| VideoCountError::TooLarge(value))
    }

    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

/// A stored log row, unique per `(product_id, date)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoLog {
    pub id: VideoLogId,
    pub product_id: ProductId,
    pub date: NaiveDate,
    pub count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Outcome of a log upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoLogWrite {
    pub log: VideoLog,
    /// `true` when a new row was inserted, `false` when an existing day was
    /// overwritten.
    pub created: bool,
    /// The product's recomputed running total.
    pub video_count: i32,
}

/// A single day's log, or the zero-count placeholder for an empty day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DailyVideoLog {
    Logged(VideoLog),
    Empty { product_id: ProductId, date: NaiveDate },
}

impl DailyVideoLog {
    /// Videos produced that day.
    #[must_use]
    pub fn count(&self) -> i32 {
        match self {
            Self::Logged(log) => log.count,
            Self::Empty { .. } => 0,
        }
    }
}
