//! One-shot wall and door orientation pass run after a grid is loaded.

use tilecrawl_core::{Cell, Direction, DirectionMask, DoorAxis, Position, WallShape};

use crate::{grid::filter_neighbors, traversal, Grid};

/// Rewrites wall shapes and door axes from neighbour adjacency.
///
/// Every cell is classified against the grid as loaded, then all updates
/// are written back, so the result does not depend on scan order.
pub(crate) fn infer(grid: &mut Grid) {
    let updates: Vec<(Position, Cell)> = grid
        .positions()
        .filter_map(|position| match grid.cell_at(position) {
            Cell::Wall(_) => {
                let (_, mask) = filter_neighbors(position, |neighbor| {
                    grid.contains(neighbor) && grid.cell_at(neighbor).is_wall()
                });
                wall_shape_for(mask).map(|shape| (position, Cell::Wall(shape)))
            }
            Cell::Door { open, .. } => {
                let (_, mask) =
                    filter_neighbors(position, |neighbor| traversal::terrain_allows(grid, neighbor));
                door_axis_for(mask).map(|axis| (position, Cell::Door { axis, open }))
            }
            _ => None,
        })
        .collect();

    for (position, cell) in updates {
        let _ = grid.set(position, cell);
    }
}

/// Wall variant for a mask of adjacent walls, if the pattern is tabulated.
pub(crate) fn wall_shape_for(mask: DirectionMask) -> Option<WallShape> {
    let shape = match mask.bits() {
        4 => WallShape::North,
        5 => WallShape::NorthEast,
        6 => WallShape::NorthWest,
        8 => WallShape::South,
        9 => WallShape::SouthEast,
        10 => WallShape::SouthWest,
        11 => WallShape::SouthWestEast,
        12 => WallShape::NorthSouth,
        13 => WallShape::NorthSouthWest,
        14 => WallShape::NorthSouthEast,
        15 => WallShape::SouthWestEast,
        _ => return None,
    };
    Some(shape)
}

/// Door axis for a mask of passable neighbours, if exactly one axis is open.
pub(crate) fn door_axis_for(mask: DirectionMask) -> Option<DoorAxis> {
    let north_south = mask.contains(Direction::North) && mask.contains(Direction::South);
    let east_west = mask.contains(Direction::East) && mask.contains(Direction::West);
    match (north_south, east_west) {
        (true, false) if !mask.contains(Direction::East) && !mask.contains(Direction::West) => {
            Some(DoorAxis::Horizontal)
        }
        (false, true) if !mask.contains(Direction::North) && !mask.contains(Direction::South) => {
            Some(DoorAxis::Vertical)
        }
        _ => None,
    }
}
