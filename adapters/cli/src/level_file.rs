use std::{fs, path::Path};

use anyhow::{Context, Result};
use tilecrawl_core::Cell;
use tilecrawl_world::Grid;

/// Layout of a level file, detected from its contents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum LevelFormat {
    /// One glyph per cell.
    Glyphs,
    /// Comma-separated numeric tile codes.
    TileCodes,
}

impl LevelFormat {
    fn detect(contents: &str) -> Self {
        if contents.lines().any(|line| line.contains(',')) {
            Self::TileCodes
        } else {
            Self::Glyphs
        }
    }
}

/// Reads and parses the level stored at `path`.
pub(crate) fn load(path: &Path) -> Result<Grid> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read level file at {}", path.display()))?;
    parse(&contents).with_context(|| format!("invalid level file {}", path.display()))
}

/// Parses level text in either supported format; ragged rows are padded.
pub(crate) fn parse(contents: &str) -> Result<Grid> {
    let lines = contents.lines().map(|line| line.trim_end_matches('\r'));
    let grid = match LevelFormat::detect(contents) {
        LevelFormat::Glyphs => Grid::from_rows(
            lines
                .map(|line| line.chars().map(Cell::from_glyph).collect::<Vec<_>>())
                .collect::<Vec<_>>(),
        ),
        LevelFormat::TileCodes => Grid::from_rows(
            lines
                .filter(|line| !line.trim().is_empty())
                .map(|line| line.split(',').map(parse_tile_code).collect::<Vec<_>>())
                .collect::<Vec<_>>(),
        ),
    };
    Ok(grid?)
}

fn parse_tile_code(field: &str) -> Cell {
    field
        .trim()
        .parse::<i32>()
        .map_or(Cell::Blank, Cell::from_tile_code)
}

#[cfg(test)]
mod tests {
    use tilecrawl_core::{DoorAxis, Position};
    use tilecrawl_world::GridError;

    use super::*;

    #[test]
    fn detects_format_from_separators() {
        assert_eq!(LevelFormat::detect("#..#\n#..#"), LevelFormat::Glyphs);
        assert_eq!(LevelFormat::detect("-1,-1\n65,65"), LevelFormat::TileCodes);
    }

    #[test]
    fn glyph_levels_pad_ragged_rows() {
        let grid = parse("#####\n#.$\n#..+.\n").expect("level parses");

        assert_eq!(grid.dimensions(), (5, 3));
        assert_eq!(grid.cell_at(Position::new(2, 1)), Cell::Chest { open: false });
        assert_eq!(grid.cell_at(Position::new(4, 1)), Cell::Blank);
    }

    #[test]
    fn tile_code_levels_map_through_code_table() {
        let grid = parse("65,65,65\n-1,102,-1\n65,224,junk\n").expect("level parses");

        assert_eq!(grid.dimensions(), (3, 3));
        assert_eq!(grid.cell_at(Position::new(0, 1)), Cell::Floor);
        assert_eq!(
            grid.cell_at(Position::new(1, 1)),
            Cell::Door {
                axis: DoorAxis::Vertical,
                open: false
            }
        );
        assert_eq!(grid.cell_at(Position::new(1, 2)), Cell::Chest { open: false });
        assert_eq!(grid.cell_at(Position::new(2, 2)), Cell::Blank);
    }

    #[test]
    fn empty_level_is_rejected() {
        let error = parse("\n\n").expect_err("nothing to load");
        assert_eq!(error.downcast_ref::<GridError>(), Some(&GridError::Empty));
    }
}
