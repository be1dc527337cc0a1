//! Rendering of the final group list as text or JSON.

use std::io::Write;

use anyhow::Result;
use chrono::NaiveDateTime;
use serde::Serialize;

use crate::group::BracketGroup;
use crate::record::ImageRecord;

/// Stable JSON shape: one document per group, members in chronological order.
#[derive(Serialize)]
struct GroupDoc<'a> {
    start: NaiveDateTime,
    images: &'a [ImageRecord],
}

/// Human-readable listing: a header line per group, one indented line per
/// member path.
pub fn render_text(groups: &[BracketGroup], out: &mut impl Write) -> Result<()> {
    if groups.is_empty() {
        writeln!(out, "No AEB groups found.")?;
        return Ok(());
    }
    for (index, group) in groups.iter().enumerate() {
        writeln!(
            out,
            "Group {} at {} ({} frames)",
            index + 1,
            group.start_time(),
            group.len()
        )?;
        for image in &group.images {
            writeln!(out, "    {}", image.path.display())?;
        }
    }
    Ok(())
}

/// Machine-parsable rendering.
pub fn render_json(groups: &[BracketGroup], out: &mut impl Write) -> Result<()> {
    let docs: Vec<GroupDoc> = groups
        .iter()
        .map(|group| GroupDoc {
            start: group.start_time(),
            images: &group.images,
        })
        .collect();
    serde_json::to_writer_pretty(&mut *out, &docs)?;
    writeln!(out)?;
    Ok(())
}
