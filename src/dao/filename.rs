//! Self-describing filenames: `year-month-day-minuteOfDay-XXXXXXXX.ext`.

use std::fmt;

use rand::{
    Rng,
    distr::{Alphanumeric, Distribution},
};
use thiserror::Error;
use time::OffsetDateTime;

/// Extension of every generated raster.
pub const DEFAULT_EXTENSION: &str = "png";
/// Length of the random alphanumeric suffix.
pub const SUFFIX_LEN: usize = 8;
const SEGMENTS: usize = 5;

/// Calendar fields encoded at the front of a generated filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CreationStamp {
    /// Calendar year.
    pub year: i32,
    /// Month, `1..=12`.
    pub month: u8,
    /// Day of month, `1..=31`.
    pub day: u8,
    /// `minutes + hours * 60`, in `0..1440`. `None` when the segment is not numeric.
    pub minute_of_day: Option<u16>,
}

impl CreationStamp {
    /// Stamp for the given instant.
    pub fn from_datetime(at: OffsetDateTime) -> Self {
        Self {
            year: at.year(),
            month: u8::from(at.month()),
            day: at.day(),
            minute_of_day: Some(u16::from(at.hour()) * 60 + u16::from(at.minute())),
        }
    }

    /// True when both stamps fall on the same calendar day.
    pub fn same_day(&self, other: &Self) -> bool {
        self.year == other.year && self.month == other.month && self.day == other.day
    }
}

/// Failures while reading a filename back into a [`CreationStamp`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilenameError {
    /// The name does not split into exactly five segments.
    #[error("expected 5 `-` separated segments, found {found}")]
    SegmentCount {
        /// Number of segments present.
        found: usize,
    },
    /// A date segment is not an integer.
    #[error("segment `{field}` is not an integer: `{value}`")]
    InvalidField {
        /// Name of the offending field.
        field: &'static str,
        /// Raw segment text.
        value: String,
    },
}

/// Parse the creation fields of `name`.
///
/// Valid iff there are exactly five segments and year, month and day are integers.
/// A non-numeric minute segment still parses, with `minute_of_day` set to `None`.
pub fn parse(name: &str) -> Result<CreationStamp, FilenameError> {
    let segments: Vec<&str> = name.split('-').collect();
    if segments.len() != SEGMENTS {
        return Err(FilenameError::SegmentCount {
            found: segments.len(),
        });
    }

    fn field<T: std::str::FromStr>(field: &'static str, value: &str) -> Result<T, FilenameError> {
        value.parse().map_err(|_| FilenameError::InvalidField {
            field,
            value: value.to_owned(),
        })
    }

    Ok(CreationStamp {
        year: field("year", segments[0])?,
        month: field("month", segments[1])?,
        day: field("day", segments[2])?,
        minute_of_day: segments[3].parse().ok(),
    })
}

/// A freshly generated, collision-resistant filename.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GeneratedName {
    stamp: CreationStamp,
    suffix: String,
    extension: String,
}

impl GeneratedName {
    /// Name for an asset created at `now`.
    pub fn generate(now: OffsetDateTime) -> Self {
        Self::generate_with(now, &mut rand::rng())
    }

    /// [`GeneratedName::generate`] with an explicit random source.
    pub fn generate_with<R: Rng + ?Sized>(now: OffsetDateTime, rng: &mut R) -> Self {
        let suffix = (0..SUFFIX_LEN)
            .map(|_| char::from(Alphanumeric.sample(&mut *rng)))
            .collect();
        Self {
            stamp: CreationStamp::from_datetime(now),
            suffix,
            extension: DEFAULT_EXTENSION.to_owned(),
        }
    }

    /// Creation fields embedded in the name.
    pub fn stamp(&self) -> CreationStamp {
        self.stamp
    }

    /// Random part of the name.
    pub fn suffix(&self) -> &str {
        &self.suffix
    }
}

impl fmt::Display for GeneratedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let CreationStamp {
            year, month, day, ..
        } = self.stamp;
        write!(
            f,
            "{year}-{month}-{day}-{}-{}.{}",
            self.stamp.minute_of_day.unwrap_or_default(),
            self.suffix,
            self.extension
        )
    }
}
