//! Group auto exposure bracketing (AEB) photo bursts by EXIF metadata.
//!
//! This crate partitions a directory's images into the bracket groups a
//! camera produced in single AEB bursts: metadata is read through exiftool
//! with a bounded worker pool, each file gets one resolved capture time,
//! and the bracketed frames are clustered by temporal adjacency.

pub mod exif;
pub mod extract;
pub mod group;
pub mod output;
pub mod record;
pub mod scan;

pub use exif::{ExifError, ExifReader, ExiftoolReader, TagMap};
pub use extract::extract_records;
pub use group::{build_groups, BracketGroup, GroupConfig, DEFAULT_MAX_GAP_SECS};
pub use record::ImageRecord;
pub use scan::candidate_files;
