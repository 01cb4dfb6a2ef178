//! Level text format (spec §6): newline-delimited rows of single characters
//! naming object kinds, or blanks for empty cells.
//!
//! The extension syntax the spec mentions for encoding a non-default
//! player-id per placed character is left unimplemented -- neither
//! `spec.md` nor `original_source/` defines its shape, so every placed
//! object gets default orientation and player-id `0` (see DESIGN.md).

use crate::error::EngineError;
use crate::kind::KindRegistry;
use crate::object::{Location, Orientation, PlayerId};

/// One object to place, produced by parsing a level's text.
#[derive(Debug)]
pub struct Placement {
    pub kind: String,
    pub player_id: PlayerId,
    pub location: Location,
    pub orientation: Orientation,
}

/// Parsed level: derived extents plus the objects to place.
#[derive(Debug)]
pub struct ParsedLevel {
    pub width: i32,
    pub height: i32,
    pub placements: Vec<Placement>,
}

/// Parse a level's text against a kind registry. `W` is the longest row,
/// `H` is the number of rows.
pub fn parse_level(text: &str, kinds: &KindRegistry) -> Result<ParsedLevel, EngineError> {
    let rows: Vec<&str> = text.lines().collect();
    let height = rows.len() as i32;
    let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0) as i32;
    if width == 0 || height == 0 {
        return Err(EngineError::InvalidLevel("level text is empty".to_owned()));
    }

    let mut placements = Vec::new();
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, ch) in row.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            let kind = kinds
                .kind_by_char(ch)
                .ok_or_else(|| EngineError::InvalidLevel(format!("unregistered map character '{ch}'")))?;
            placements.push(Placement {
                kind: kind.name.clone(),
                player_id: 0,
                location: (col_idx as i32, row_idx as i32),
                orientation: Orientation::default(),
            });
        }
    }

    Ok(ParsedLevel {
        width,
        height,
        placements,
    })
}
