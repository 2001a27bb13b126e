//! Ephemeral on-disk store for generated rasters.
//!
//! The filename is the only metadata: a sweep keeps a file when its embedded date equals
//! today and its minute-of-day is within the freshness window of the current minute.
//! Comparing calendar days means a file written at 23:55 is dropped by a sweep at 00:05
//! even though it is ten minutes old; the TTL is intentionally that coarse.

use std::{
    io::{Cursor, ErrorKind},
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use dashmap::{DashMap, mapref::entry::Entry};
use image::{ImageFormat, RgbaImage};
use time::OffsetDateTime;
use tokio::fs;
use tracing::{debug, error, warn};

use crate::dao::{
    filename::{self, CreationStamp, GeneratedName},
    storage::{StorageError, StorageResult},
};

/// Counters describing one sweep.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    /// Fresh files left in place.
    pub kept: usize,
    /// Stale or malformed files removed.
    pub deleted: usize,
    /// Entries protected by an in-flight write or not regular files.
    pub skipped: usize,
    /// Removals that failed and were ignored.
    pub failed: usize,
}

/// Serving directory plus a registry of names whose write may still be in progress.
pub struct AssetStore {
    dir: PathBuf,
    fresh_window_minutes: u16,
    write_grace: Duration,
    in_flight: DashMap<String, Instant>,
}

impl AssetStore {
    /// Store rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>, fresh_window_minutes: u16, write_grace: Duration) -> Self {
        Self {
            dir: dir.into(),
            fresh_window_minutes,
            write_grace,
            in_flight: DashMap::new(),
        }
    }

    /// Directory generated files are written to and served from.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the serving directory if needed.
    pub async fn ensure_dir(&self) -> StorageResult<()> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| StorageError::io(self.dir.display().to_string(), source))
    }

    /// Generate a name for an asset created at `now` and shield it from sweeps for the grace window.
    pub fn reserve(&self, now: OffsetDateTime) -> GeneratedName {
        loop {
            let name = GeneratedName::generate(now);
            let entry = self.in_flight.entry(name.to_string());
            if let Entry::Vacant(vacant) = entry {
                vacant.insert(Instant::now());
                return name;
            }
        }
    }

    /// Encode `image` as PNG and write it under `name`, replacing any previous content.
    pub async fn write(&self, image: RgbaImage, name: &GeneratedName) -> StorageResult<PathBuf> {
        let file = name.to_string();
        let path = self.dir.join(&file);

        let encode_file = file.clone();
        let bytes = tokio::task::spawn_blocking(move || {
            let mut buffer = Cursor::new(Vec::new());
            image
                .write_to(&mut buffer, ImageFormat::Png)
                .map(|()| buffer.into_inner())
                .map_err(|source| StorageError::Encode {
                    file: encode_file,
                    source,
                })
        })
        .await
        .map_err(|source| StorageError::Worker {
            file: file.clone(),
            source,
        })?
        .inspect_err(|err| error!(file = %file, error = %err, "failed to encode image"))?;

        fs::write(&path, &bytes).await.map_err(|source| {
            error!(path = %path.display(), error = %source, "failed to write image");
            StorageError::io(path.display().to_string(), source)
        })?;

        debug!(path = %path.display(), bytes = bytes.len(), "image written");
        Ok(path)
    }

    /// Delete every entry that is not fresh relative to `now`.
    ///
    /// Failures never propagate: an unreadable directory yields an empty report and
    /// individual removal errors are logged and counted.
    pub async fn sweep(&self, now: OffsetDateTime) -> SweepReport {
        let mut report = SweepReport::default();
        let today = CreationStamp::from_datetime(now);
        self.in_flight
            .retain(|_, reserved| reserved.elapsed() < self.write_grace);

        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(err) => {
                warn!(dir = %self.dir.display(), error = %err, "failed to list serving directory");
                return report;
            }
        };

        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(err) => {
                    warn!(dir = %self.dir.display(), error = %err, "failed to read directory entry");
                    break;
                }
            };

            let name = entry.file_name().to_string_lossy().into_owned();
            let is_file = entry.file_type().await.map(|t| t.is_file()).unwrap_or(false);
            if !is_file || self.in_flight.contains_key(&name) {
                report.skipped += 1;
                continue;
            }

            if is_fresh(&name, &today, self.fresh_window_minutes) {
                report.kept += 1;
                continue;
            }

            match fs::remove_file(entry.path()).await {
                Ok(()) => report.deleted += 1,
                Err(err) if err.kind() == ErrorKind::NotFound => report.deleted += 1,
                Err(err) => {
                    warn!(file = %name, error = %err, "failed to delete stale file");
                    report.failed += 1;
                }
            }
        }

        debug!(
            kept = report.kept,
            deleted = report.deleted,
            skipped = report.skipped,
            failed = report.failed,
            "swept serving directory"
        );
        report
    }
}

/// True when `name` parses and was created on `today`'s date within `window` minutes.
pub fn is_fresh(name: &str, today: &CreationStamp, window: u16) -> bool {
    let Ok(stamp) = filename::parse(name) else {
        return false;
    };
    let (Some(created), Some(current)) = (stamp.minute_of_day, today.minute_of_day) else {
        return false;
    };
    stamp.same_day(today) && created.abs_diff(current) < window
}
