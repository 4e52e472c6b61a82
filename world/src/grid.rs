//! Dense cell storage backing the dungeon level.

use thiserror::Error;
use tilecrawl_core::{Cell, Direction, DirectionMask, Position};

use crate::orientation;

/// Errors raised while assembling a grid from loader output.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    /// The loader produced no rows or only empty rows.
    #[error("level contains no cells")]
    Empty,
    /// The level is too large to address with signed coordinates.
    #[error("level dimensions {width}x{height} exceed the addressable range")]
    TooLarge {
        /// Number of columns requested.
        width: usize,
        /// Number of rows requested.
        height: usize,
    },
}

/// Rectangular, row-major grid of cells.
///
/// The shape is fixed once built; only cell types change afterwards, and
/// only through the traversal rules. Reads outside the grid report
/// [`Cell::OUT_OF_BOUNDS`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
}

impl Grid {
    /// Builds a grid from loader rows, padding ragged rows with blank cells.
    ///
    /// Wall orientations and door axes are inferred from neighbour adjacency
    /// before the grid is returned.
    pub fn from_rows<R, I>(rows: R) -> Result<Self, GridError>
    where
        R: IntoIterator<Item = I>,
        I: IntoIterator<Item = Cell>,
    {
        let rows: Vec<Vec<Cell>> = rows
            .into_iter()
            .map(|row| row.into_iter().collect())
            .collect();
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let height = rows.len();

        let mut grid = Self::blank(width, height)?;
        for (row_index, row) in rows.into_iter().enumerate() {
            let offset = row_index * width;
            grid.cells[offset..offset + row.len()].copy_from_slice(&row);
        }

        orientation::infer(&mut grid);
        Ok(grid)
    }

    /// Builds a grid where every cell holds the same value.
    pub fn filled(width: u32, height: u32, cell: Cell) -> Result<Self, GridError> {
        let width = usize::try_from(width).unwrap_or(usize::MAX);
        let height = usize::try_from(height).unwrap_or(usize::MAX);
        let mut grid = Self::blank(width, height)?;
        grid.cells.fill(cell);
        orientation::infer(&mut grid);
        Ok(grid)
    }

    fn blank(width: usize, height: usize) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::Empty);
        }

        if i32::try_from(width).is_err() || i32::try_from(height).is_err() {
            return Err(GridError::TooLarge { width, height });
        }
        let capacity = width
            .checked_mul(height)
            .ok_or(GridError::TooLarge { width, height })?;

        Ok(Self {
            width: width as u32,
            height: height as u32,
            cells: vec![Cell::Blank; capacity],
        })
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Provides the dimensions of the grid as `(width, height)`.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Reports whether the position lies inside the grid.
    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        self.index(position).is_some()
    }

    /// Cell stored at the position; out-of-bounds reads as solid wall.
    #[must_use]
    pub fn cell_at(&self, position: Position) -> Cell {
        self.index(position)
            .and_then(|index| self.cells.get(index).copied())
            .unwrap_or(Cell::OUT_OF_BOUNDS)
    }

    /// Iterator over every in-bounds position in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        let width = i32::try_from(self.width).unwrap_or(0);
        let height = i32::try_from(self.height).unwrap_or(0);
        (0..height).flat_map(move |y| (0..width).map(move |x| Position::new(x, y)))
    }

    /// Iterator over the rows of the grid.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        let width = usize::try_from(self.width).unwrap_or(0).max(1);
        self.cells.chunks(width)
    }

    pub(crate) fn set(&mut self, position: Position, cell: Cell) -> bool {
        match self.index(position) {
            Some(index) => {
                self.cells[index] = cell;
                true
            }
            None => false,
        }
    }

    fn index(&self, position: Position) -> Option<usize> {
        let column = u32::try_from(position.x()).ok()?;
        let row = u32::try_from(position.y()).ok()?;
        if column >= self.width || row >= self.height {
            return None;
        }
        let row = usize::try_from(row).ok()?;
        let column = usize::try_from(column).ok()?;
        let width = usize::try_from(self.width).ok()?;
        Some(row * width + column)
    }
}

/// Collects the cardinal neighbours accepted by `accept`, plus their mask.
///
/// Neighbours are listed in north, east, south, west order; the mask uses the
/// bit layout of [`Direction::bit`].
pub(crate) fn filter_neighbors<F>(position: Position, mut accept: F) -> (Vec<Position>, DirectionMask)
where
    F: FnMut(Position) -> bool,
{
    let mut neighbors = Vec::with_capacity(4);
    let mut mask = DirectionMask::EMPTY;

    for direction in Direction::ALL {
        let neighbor = position.step(direction);
        if accept(neighbor) {
            neighbors.push(neighbor);
            mask.insert(direction);
        }
    }

    (neighbors, mask)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ragged_rows_are_padded_with_blank() {
        let grid = Grid::from_rows(vec![
            vec![Cell::Floor, Cell::Floor, Cell::Floor],
            vec![Cell::Floor],
        ])
        .expect("grid builds");

        assert_eq!(grid.dimensions(), (3, 2));
        assert_eq!(grid.cell_at(Position::new(0, 1)), Cell::Floor);
        assert_eq!(grid.cell_at(Position::new(1, 1)), Cell::Blank);
        assert_eq!(grid.cell_at(Position::new(2, 1)), Cell::Blank);
    }

    #[test]
    fn empty_rows_are_rejected() {
        let rows: Vec<Vec<Cell>> = Vec::new();
        assert_eq!(Grid::from_rows(rows), Err(GridError::Empty));
        assert_eq!(
            Grid::from_rows(vec![Vec::<Cell>::new()]),
            Err(GridError::Empty)
        );
    }

    #[test]
    fn out_of_bounds_reads_as_wall() {
        let grid = Grid::filled(2, 2, Cell::Floor).expect("grid builds");
        for position in [
            Position::new(-1, 0),
            Position::new(0, -1),
            Position::new(2, 0),
            Position::new(0, 2),
        ] {
            assert_eq!(grid.cell_at(position), Cell::OUT_OF_BOUNDS);
            assert!(!grid.contains(position));
        }
    }

    #[test]
    fn positions_are_row_major() {
        let grid = Grid::filled(2, 2, Cell::Floor).expect("grid builds");
        let positions: Vec<_> = grid.positions().collect();
        assert_eq!(
            positions,
            vec![
                Position::new(0, 0),
                Position::new(1, 0),
                Position::new(0, 1),
                Position::new(1, 1),
            ]
        );
    }

    #[test]
    fn filter_neighbors_reports_mask() {
        let (neighbors, mask) = filter_neighbors(Position::new(1, 1), |candidate| {
            candidate.y() == 1
        });
        assert_eq!(neighbors, vec![Position::new(2, 1), Position::new(0, 1)]);
        assert_eq!(mask.bits(), 0b0011);
    }
}
