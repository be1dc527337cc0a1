//! Per-image record: capture time resolution and AEB classification.

use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDateTime};
use serde::Serialize;
use tracing::trace;

use crate::exif::TagMap;

/// Date tags probed in order; the first one that parses wins.
pub const DATE_TAGS: [&str; 3] = [
    "EXIF:CreateDate",
    "EXIF:DateTimeOriginal",
    "EXIF:ModifyDate",
];

/// EXIF datetime layout, e.g. "2019:08:26 19:54:10".
pub const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Bracket indicator tags with the value that marks an AEB frame.
/// BracketMode is Canon's maker note; ExposureMode covers the other vendors.
const BRACKET_TAGS: [(&str, &str); 2] = [
    ("MakerNotes:BracketMode", "AEB"),
    ("EXIF:ExposureMode", "Auto bracket"),
];

/// Tags carrying the shot's exposure offset within a bracket, probed in order.
const ORDERING_TAGS: [&str; 2] = ["MakerNotes:AEBBracketValue", "EXIF:ExposureCompensation"];

/// One candidate image file after metadata extraction. Immutable once built.
#[derive(Debug, Clone, Serialize)]
pub struct ImageRecord {
    pub path: PathBuf,
    /// Uppercased file suffix, e.g. "JPG".
    pub extension: String,
    /// True iff the metadata indicates auto exposure bracketing.
    pub is_bracketed: bool,
    /// Resolved capture instant (EXIF local wall-clock time).
    pub timestamp: NaiveDateTime,
    /// Exposure offset of this frame, e.g. -1/3 EV. Advisory tie-breaker only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ordering_key: Option<f64>,
}

impl ImageRecord {
    /// Build a record from a file's tag mapping.
    ///
    /// Returns `None` when no capture time is derivable from either the
    /// metadata or the filesystem; such a file cannot be placed in
    /// chronological order and must be excluded.
    pub fn from_tags(path: &Path, tags: &TagMap) -> Option<Self> {
        let timestamp = resolve_datetime(tags, fs_timestamp(path))?;
        Some(Self {
            extension: path
                .extension()
                .map(|ext| ext.to_string_lossy().to_uppercase())
                .unwrap_or_default(),
            path: path.to_path_buf(),
            is_bracketed: is_bracketed(tags),
            timestamp,
            ordering_key: ordering_key(tags),
        })
    }
}

/// Total order used before grouping: capture time, then exposure offset
/// (a missing offset counts as the metered base exposure, 0.0), then path.
pub fn chronological_cmp(a: &ImageRecord, b: &ImageRecord) -> Ordering {
    a.timestamp
        .cmp(&b.timestamp)
        .then_with(|| {
            a.ordering_key
                .unwrap_or(0.0)
                .total_cmp(&b.ordering_key.unwrap_or(0.0))
        })
        .then_with(|| a.path.cmp(&b.path))
}

/// Resolve one capture instant from the tag mapping, falling back to the
/// filesystem timestamp when no date tag parses. Deterministic: equal inputs
/// always resolve to the same instant.
pub fn resolve_datetime(tags: &TagMap, fs_fallback: Option<NaiveDateTime>) -> Option<NaiveDateTime> {
    for tag in DATE_TAGS {
        if let Some(raw) = tags.get_str(tag) {
            if let Some(parsed) = parse_exif_datetime(&raw) {
                return Some(parsed);
            }
            trace!(tag, value = %raw, "malformed date tag, trying next");
        }
    }
    fs_fallback
}

/// Parse an EXIF datetime string. Sub-second precision is not kept.
pub fn parse_exif_datetime(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw.trim(), EXIF_DATETIME_FORMAT).ok()
}

/// Last-modified time of the file as local wall-clock time, the last-resort
/// stand-in for a capture date.
pub fn fs_timestamp(path: &Path) -> Option<NaiveDateTime> {
    let modified = fs::metadata(path).ok()?.modified().ok()?;
    Some(DateTime::<Local>::from(modified).naive_local())
}

/// Whether the tag mapping marks this frame as part of an AEB sequence.
pub fn is_bracketed(tags: &TagMap) -> bool {
    BRACKET_TAGS.into_iter().any(|(tag, marker)| {
        tags.get_str(tag)
            .is_some_and(|value| value.trim().eq_ignore_ascii_case(marker))
    })
}

/// Extract the frame's exposure offset, if any tag exposes one.
pub fn ordering_key(tags: &TagMap) -> Option<f64> {
    ORDERING_TAGS
        .into_iter()
        .find_map(|tag| tags.get_str(tag).as_deref().and_then(parse_signed_fraction))
}

/// Parse exiftool's bracket-offset renderings: "-2/3", "+1/3", "0", "0.33".
pub fn parse_signed_fraction(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let (sign, body) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let value = match body.split_once('/') {
        Some((numerator, denominator)) => {
            let numerator: f64 = numerator.trim().parse().ok()?;
            let denominator: f64 = denominator.trim().parse().ok()?;
            if denominator == 0.0 {
                return None;
            }
            numerator / denominator
        }
        None => body.trim().parse().ok()?,
    };
    Some(sign * value)
}
