//! Grid index: which tile occupies which cell.
//!
//! The grid never owns tiles. It stores [`TileId`]s in a `rows × cols`
//! rectangle; the tiles themselves live in the board's arena.

use crate::error::{BoardError, BoardResult};
use crate::position::Position;
use crate::tile::TileId;

/// A rectangular index of optional tile ids, addressed row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: Vec<Vec<Option<TileId>>>,
}

impl Grid {
    /// Create an empty grid of `width` columns and `height` rows.
    pub fn new(width: usize, height: usize) -> BoardResult<Self> {
        check_dimension(width)?;
        check_dimension(height)?;
        Ok(Self {
            rows: vec![vec![None; width]; height],
        })
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Total number of cells.
    pub fn capacity(&self) -> usize {
        self.width() * self.height()
    }

    /// Check whether a position lies inside the grid.
    pub fn contains(&self, pos: Position) -> bool {
        pos.y < self.height() && pos.x < self.width()
    }

    /// Get the tile occupying a cell.
    pub fn get(&self, pos: Position) -> Option<TileId> {
        self.rows.get(pos.y)?.get(pos.x).copied().flatten()
    }

    /// Write a cell, returning its previous occupant.
    ///
    /// Positions outside the grid are ignored.
    pub(crate) fn set(&mut self, pos: Position, id: Option<TileId>) -> Option<TileId> {
        match self.rows.get_mut(pos.y).and_then(|row| row.get_mut(pos.x)) {
            Some(cell) => std::mem::replace(cell, id),
            None => None,
        }
    }

    /// Map fractional cell coordinates to a cell.
    ///
    /// Each axis is clamped to the grid before flooring, so any input
    /// (negative, past the far edge, infinite, NaN) yields a valid cell.
    pub fn find(&self, fx: f64, fy: f64) -> Position {
        Position::new(clamp_axis(fx, self.width()), clamp_axis(fy, self.height()))
    }

    /// First empty cell in row-major order.
    pub fn first_empty(&self) -> Option<Position> {
        self.rows.iter().enumerate().find_map(|(y, row)| {
            row.iter()
                .position(Option::is_none)
                .map(|x| Position::new(x, y))
        })
    }

    /// Check whether every cell is occupied.
    pub fn is_full(&self) -> bool {
        self.first_empty().is_none()
    }

    /// Occupied cells in row-major order.
    pub fn occupied(&self) -> impl Iterator<Item = (Position, TileId)> + '_ {
        self.rows.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .filter_map(move |(x, cell)| cell.map(|id| (Position::new(x, y), id)))
        })
    }

    /// Number of occupied cells.
    pub fn occupied_count(&self) -> usize {
        self.occupied().count()
    }

    /// Change the number of rows.
    ///
    /// Shrinking drops the trailing rows and returns the ids that lived in
    /// them (row-major); growing appends empty rows.
    pub fn set_height(&mut self, height: usize) -> BoardResult<Vec<TileId>> {
        check_dimension(height)?;
        let width = self.width();
        if height < self.height() {
            let evicted = self
                .rows
                .drain(height..)
                .flat_map(|row| row.into_iter().flatten())
                .collect();
            Ok(evicted)
        } else {
            self.rows.resize_with(height, || vec![None; width]);
            Ok(Vec::new())
        }
    }

    /// Change the number of columns, applied to every row.
    ///
    /// Shrinking truncates each row and returns the evicted ids (row-major).
    pub fn set_width(&mut self, width: usize) -> BoardResult<Vec<TileId>> {
        check_dimension(width)?;
        let mut evicted = Vec::new();
        for row in &mut self.rows {
            if width < row.len() {
                evicted.extend(row.drain(width..).flatten());
            } else {
                row.resize(width, None);
            }
        }
        Ok(evicted)
    }

    /// Empty every cell, returning the previous occupants (row-major).
    pub fn clear(&mut self) -> Vec<TileId> {
        self.rows
            .iter_mut()
            .flat_map(|row| row.iter_mut().filter_map(Option::take))
            .collect()
    }
}

fn check_dimension(n: usize) -> BoardResult<()> {
    if n == 0 {
        return Err(BoardError::InvalidDimension(n));
    }
    Ok(())
}

fn clamp_axis(value: f64, len: usize) -> usize {
    if value.is_nan() || len == 0 {
        return 0;
    }
    let max = (len - 1) as f64;
    value.clamp(0.0, max).floor() as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn filled(width: usize, height: usize) -> (Grid, Vec<TileId>) {
        let mut grid = Grid::new(width, height).unwrap();
        let mut ids = Vec::new();
        while let Some(pos) = grid.first_empty() {
            let id = Uuid::new_v4();
            grid.set(pos, Some(id));
            ids.push(id);
        }
        (grid, ids)
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(matches!(Grid::new(0, 3), Err(BoardError::InvalidDimension(0))));
        assert!(matches!(Grid::new(3, 0), Err(BoardError::InvalidDimension(0))));
        let mut grid = Grid::new(2, 2).unwrap();
        assert!(grid.set_height(0).is_err());
        assert!(grid.set_width(0).is_err());
        assert_eq!((grid.width(), grid.height()), (2, 2));
    }

    #[test]
    fn test_first_empty_row_major() {
        let mut grid = Grid::new(2, 2).unwrap();
        assert_eq!(grid.first_empty(), Some(Position::new(0, 0)));
        grid.set(Position::new(0, 0), Some(Uuid::new_v4()));
        assert_eq!(grid.first_empty(), Some(Position::new(1, 0)));
        grid.set(Position::new(1, 0), Some(Uuid::new_v4()));
        assert_eq!(grid.first_empty(), Some(Position::new(0, 1)));
    }

    #[test]
    fn test_find_clamps_every_input() {
        let grid = Grid::new(3, 4).unwrap();
        assert_eq!(grid.find(1.7, 2.2), Position::new(1, 2));
        assert_eq!(grid.find(-5.0, -0.1), Position::new(0, 0));
        assert_eq!(grid.find(99.0, 4.0), Position::new(2, 3));
        assert_eq!(grid.find(f64::INFINITY, f64::NEG_INFINITY), Position::new(2, 0));
        assert_eq!(grid.find(f64::NAN, 3.999), Position::new(0, 3));

        let mut value = -10.0;
        while value < 10.0 {
            let pos = grid.find(value, value * 0.7);
            assert!(grid.contains(pos));
            value += 0.37;
        }
    }

    #[test]
    fn test_shrink_height_evicts_trailing_rows() {
        let (mut grid, ids) = filled(2, 3);
        let evicted = grid.set_height(1).unwrap();
        assert_eq!(evicted, ids[2..].to_vec());
        assert_eq!(grid.height(), 1);
        assert_eq!(grid.width(), 2);
        assert_eq!(grid.occupied_count(), 2);
    }

    #[test]
    fn test_shrink_width_evicts_trailing_columns() {
        let (mut grid, ids) = filled(3, 2);
        let evicted = grid.set_width(1).unwrap();
        assert_eq!(evicted, vec![ids[1], ids[2], ids[4], ids[5]]);
        assert_eq!(grid.width(), 1);
        assert_eq!(grid.get(Position::new(0, 1)), Some(ids[3]));
    }

    #[test]
    fn test_grow_appends_empty_cells() {
        let (mut grid, ids) = filled(1, 1);
        assert!(grid.set_width(3).unwrap().is_empty());
        assert!(grid.set_height(2).unwrap().is_empty());
        assert_eq!(grid.capacity(), 6);
        assert_eq!(grid.get(Position::ORIGIN), Some(ids[0]));
        assert_eq!(grid.first_empty(), Some(Position::new(1, 0)));
        assert!(grid.rows.iter().all(|row| row.len() == 3));
    }

    #[test]
    fn test_set_outside_is_ignored() {
        let mut grid = Grid::new(1, 1).unwrap();
        assert_eq!(grid.set(Position::new(4, 4), Some(Uuid::new_v4())), None);
        assert_eq!(grid.occupied_count(), 0);
    }

    #[test]
    fn test_clear() {
        let (mut grid, ids) = filled(2, 2);
        assert!(grid.is_full());
        assert_eq!(grid.clear(), ids);
        assert_eq!(grid.occupied_count(), 0);
    }
}
