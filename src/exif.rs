//! EXIF metadata extraction via exiftool.
//!
//! The gateway shells out to exiftool once per file and returns the flat,
//! group-prefixed tag mapping from its JSON output (`EXIF:CreateDate`,
//! `MakerNotes:BracketMode`, ...). Files without parsable metadata are a
//! valid empty result; only a tool that cannot be invoked at all is an error.

use std::collections::BTreeMap;
use std::io;
use std::path::Path;
use std::process::Command;

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

const EXIFTOOL: &str = "exiftool";

/// Failure to run the external extraction tool. Both variants are structural:
/// they will recur for every remaining file, so the run aborts on the first.
#[derive(Debug, Error)]
pub enum ExifError {
    #[error("exiftool not found on PATH (install it from https://exiftool.org)")]
    NotInstalled(#[source] io::Error),
    #[error("failed to invoke exiftool")]
    Invocation(#[source] io::Error),
}

/// Flat tag-name to value mapping for one image file.
///
/// Values keep exiftool's JSON types; the same tag can arrive as a string or
/// a number depending on camera vendor, so access goes through [`get_str`]
/// which normalizes both.
///
/// [`get_str`]: TagMap::get_str
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagMap(BTreeMap<String, Value>);

impl TagMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tag: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(tag.into(), value.into());
    }

    pub fn get(&self, tag: &str) -> Option<&Value> {
        self.0.get(tag)
    }

    /// Look up a tag and normalize string or numeric values to a string.
    pub fn get_str(&self, tag: &str) -> Option<String> {
        match self.0.get(tag)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Capability boundary: extract the tag mapping of one file.
///
/// `Ok(None)` means the file is unreadable or carries no parsable metadata
/// and must simply be skipped. `Err` means the tool itself cannot run, which
/// is fatal for the whole batch.
pub trait ExifReader: Sync {
    fn read_tags(&self, path: &Path) -> Result<Option<TagMap>, ExifError>;
}

/// Concrete adapter running `exiftool -json -G <file>` per image.
pub struct ExiftoolReader {
    // Construction goes through new() so the probe always runs.
    _priv: (),
}

impl ExiftoolReader {
    /// Probe the exiftool installation once so a missing tool is reported
    /// before any per-file work starts.
    pub fn new() -> Result<Self, ExifError> {
        let output = Command::new(EXIFTOOL)
            .arg("-ver")
            .output()
            .map_err(spawn_error)?;
        let version = String::from_utf8_lossy(&output.stdout);
        debug!(version = version.trim(), "exiftool available");
        Ok(Self { _priv: () })
    }
}

impl ExifReader for ExiftoolReader {
    fn read_tags(&self, path: &Path) -> Result<Option<TagMap>, ExifError> {
        let output = Command::new(EXIFTOOL)
            .args(["-json", "-G"])
            .arg(path)
            .output()
            .map_err(spawn_error)?;
        if !output.status.success() {
            debug!(path = %path.display(), status = %output.status, "exiftool exited nonzero");
        }
        Ok(parse_exiftool_json(&output.stdout))
    }
}

fn spawn_error(err: io::Error) -> ExifError {
    if err.kind() == io::ErrorKind::NotFound {
        ExifError::NotInstalled(err)
    } else {
        ExifError::Invocation(err)
    }
}

/// Parse exiftool's JSON document (an array with one object per source file)
/// into the first file's tag mapping. Unparsable or empty output yields None.
fn parse_exiftool_json(raw: &[u8]) -> Option<TagMap> {
    let files: Vec<BTreeMap<String, Value>> = serde_json::from_slice(raw).ok()?;
    files.into_iter().next().map(TagMap)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_exiftool_json() {
        let raw = br#"[{
            "SourceFile": "IMG_0001.JPG",
            "EXIF:CreateDate": "2019:08:26 19:54:10",
            "MakerNotes:BracketMode": "AEB",
            "MakerNotes:AEBBracketValue": 0
        }]"#;

        let tags = parse_exiftool_json(raw).unwrap();
        assert_eq!(tags.len(), 4);
        assert_eq!(
            tags.get_str("EXIF:CreateDate").as_deref(),
            Some("2019:08:26 19:54:10")
        );
        assert_eq!(tags.get_str("MakerNotes:BracketMode").as_deref(), Some("AEB"));
    }

    #[test]
    fn test_parse_exiftool_json_garbage() {
        assert!(parse_exiftool_json(b"").is_none());
        assert!(parse_exiftool_json(b"not json at all").is_none());
        assert!(parse_exiftool_json(b"[]").is_none());
    }

    #[test]
    fn test_get_str_normalizes_numbers() {
        let mut tags = TagMap::new();
        tags.insert("MakerNotes:AEBBracketValue", 0);
        tags.insert("EXIF:ExposureCompensation", -0.5);
        tags.insert("EXIF:ISO", "200");

        assert_eq!(tags.get_str("MakerNotes:AEBBracketValue").as_deref(), Some("0"));
        assert_eq!(tags.get_str("EXIF:ExposureCompensation").as_deref(), Some("-0.5"));
        assert_eq!(tags.get_str("EXIF:ISO").as_deref(), Some("200"));
        assert_eq!(tags.get_str("EXIF:Missing"), None);
    }
}
