//! Bounded-concurrency metadata extraction.
//!
//! Fan-out/fan-in over the candidate file list: a fixed-size worker pool runs
//! one exiftool invocation per file and collects the classified records. The
//! pool size is a hard ceiling on simultaneously running exiftool processes.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use anyhow::{Context, Result};
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::exif::{ExifError, ExifReader, TagMap};
use crate::record::{self, ImageRecord};

/// Extract and classify every candidate file, with at most `jobs` extractions
/// in flight at once.
///
/// Returns only the bracketed records, in no particular order; callers sort
/// before grouping. A gateway error aborts the batch: the condition is
/// structural (the tool is broken for every remaining file too), so the
/// remaining queue is skipped and the first error reported once.
pub fn extract_records<R: ExifReader>(
    reader: &R,
    paths: &[PathBuf],
    jobs: usize,
) -> Result<Vec<ImageRecord>> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs.max(1))
        .thread_name(|index| format!("exif-worker-{index}"))
        .build()
        .context("failed to build extraction worker pool")?;

    let aborted = AtomicBool::new(false);
    let fatal: Mutex<Option<ExifError>> = Mutex::new(None);

    let records: Vec<ImageRecord> = pool.install(|| {
        paths
            .par_iter()
            .filter_map(|path| {
                if aborted.load(Ordering::Relaxed) {
                    return None;
                }
                match reader.read_tags(path) {
                    Ok(Some(tags)) => classify(path, &tags),
                    Ok(None) => {
                        debug!(path = %path.display(), "no parsable metadata, skipping");
                        None
                    }
                    Err(err) => {
                        aborted.store(true, Ordering::Relaxed);
                        fatal.lock().unwrap().get_or_insert(err);
                        None
                    }
                }
            })
            .collect()
    });

    if let Some(err) = fatal.into_inner().unwrap() {
        return Err(err).context("metadata extraction aborted");
    }
    Ok(records)
}

/// Turn one file's tags into a bracketed record, or nothing.
fn classify(path: &Path, tags: &TagMap) -> Option<ImageRecord> {
    match ImageRecord::from_tags(path, tags) {
        Some(record) if record.is_bracketed => Some(record),
        Some(_) => {
            debug!(path = %path.display(), "not an AEB frame");
            None
        }
        None => {
            if record::is_bracketed(tags) {
                warn!(
                    path = %path.display(),
                    "AEB frame has no derivable capture time, excluding"
                );
            }
            None
        }
    }
}
