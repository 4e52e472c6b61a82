//! Passability and interaction rules shared by movement, neighbour expansion
//! and pathfinding.

use tilecrawl_core::{Cell, DirectionMask, Position};

use crate::{actors::Roster, grid::filter_neighbors, Grid};

/// Terrain-only half of the entry rule: walls, closed doors and closed chests
/// block, and so does everything outside the grid.
pub(crate) fn terrain_allows(grid: &Grid, position: Position) -> bool {
    !grid.cell_at(position).blocks_movement()
}

/// Reports whether an actor may step onto the position right now.
pub(crate) fn can_enter(grid: &Grid, roster: &Roster, position: Position) -> bool {
    terrain_allows(grid, position) && roster.occupant_at(position).is_none()
}

/// Enterable cardinal neighbours of the position and their direction mask.
pub(crate) fn neighbors4(
    grid: &Grid,
    roster: &Roster,
    position: Position,
) -> (Vec<Position>, DirectionMask) {
    filter_neighbors(position, |neighbor| can_enter(grid, roster, neighbor))
}

/// Opens or closes a door, or opens a chest, returning the cell before and
/// after the change. Any other cell is left untouched.
pub(crate) fn toggle_interactable(grid: &mut Grid, position: Position) -> Option<(Cell, Cell)> {
    let before = grid.cell_at(position);
    let after = before.toggled()?;
    if grid.set(position, after) {
        Some((before, after))
    } else {
        None
    }
}
