//! Square grid of maze cells
//!
//! The grid owns every [Cell] in a flat, row-major arena. Passages between
//! cells are stored as [Position] handles into that arena, so the
//! neighbor relations may form cycles without any ownership questions.

use std::fmt;
use std::slice;

use crate::{MazeError, Result};

/// Side of a cell
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Top,
    Bottom,
}

impl Direction {
    /// All four sides, in slot order
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Top,
        Direction::Bottom,
    ];

    /// The side facing this one from the adjacent cell
    pub fn opposite(self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Top => Direction::Bottom,
            Direction::Bottom => Direction::Top,
        }
    }

    /// Step `(delta row, delta column)` taken when moving towards this side
    pub fn offset(self) -> (isize, isize) {
        match self {
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
            Direction::Top => (-1, 0),
            Direction::Bottom => (1, 0),
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// Location of a cell in the grid
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub row: usize,
    pub column: usize,
}

impl Position {
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }

    /// Adjacent position towards `direction`, if it lies inside a grid of
    /// the given dimension.
    ///
    /// # Examples
    /// ```
    /// use labyrinth::{Direction, Position};
    ///
    /// let corner = Position::new(0, 0);
    /// assert_eq!(corner.step(Direction::Top, 3), None);
    /// assert_eq!(corner.step(Direction::Right, 3), Some(Position::new(0, 1)));
    /// ```
    pub fn step(self, direction: Direction, dimension: usize) -> Option<Position> {
        let (dy, dx) = direction.offset();
        let row = self.row.checked_add_signed(dy)?;
        let column = self.column.checked_add_signed(dx)?;
        (row < dimension && column < dimension).then_some(Position { row, column })
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

/// One square of the maze
///
/// A cell knows its own position and, for each side, the neighbor it has
/// an open passage to. Unset sides are walls.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    position: Position,
    links: [Option<Position>; 4],
    /// Portal marker, carried for collaborators but never interpreted here
    hole: bool,
}

impl Cell {
    fn new(row: usize, column: usize) -> Self {
        Self {
            position: Position { row, column },
            links: [None; 4],
            hole: false,
        }
    }

    pub fn row(&self) -> usize {
        self.position.row
    }

    pub fn column(&self) -> usize {
        self.position.column
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Neighbor reached through an open passage on the given side
    pub fn link(&self, direction: Direction) -> Option<Position> {
        self.links[direction.slot()]
    }

    pub fn has_passage(&self, direction: Direction) -> bool {
        self.link(direction).is_some()
    }

    /// Open passages of this cell
    pub fn links(&self) -> impl Iterator<Item = (Direction, Position)> + '_ {
        Direction::ALL
            .iter()
            .filter_map(|&d| self.link(d).map(|p| (d, p)))
    }

    pub fn is_hole(&self) -> bool {
        self.hole
    }

    pub(crate) fn set_hole(&mut self, hole: bool) {
        self.hole = hole;
    }
}

/// Square arena of cells, `dimension` by `dimension`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    dimension: usize,
    /// Row-major cells
    cells: Vec<Cell>,
}

impl Grid {
    /// Allocate a grid with every side of every cell walled off.
    ///
    /// Returns [MazeError::InvalidDimension] for an empty grid.
    pub fn create(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(MazeError::InvalidDimension { dimension });
        }
        let cells = (0..dimension)
            .flat_map(|row| (0..dimension).map(move |column| Cell::new(row, column)))
            .collect();
        Ok(Self { dimension, cells })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Cell at the given row and column
    ///
    /// Returns [MazeError::OutOfBounds] instead of clamping.
    pub fn at(&self, row: usize, column: usize) -> Result<&Cell> {
        let index = self.checked_index(row, column)?;
        Ok(&self.cells[index])
    }

    pub(crate) fn at_mut(&mut self, row: usize, column: usize) -> Result<&mut Cell> {
        let index = self.checked_index(row, column)?;
        Ok(&mut self.cells[index])
    }

    /// Cell at `position`, or `None` outside the grid
    pub fn get(&self, position: Position) -> Option<&Cell> {
        self.index(position).map(|i| &self.cells[i])
    }

    /// All cells in row-major order
    pub fn cells(&self) -> slice::Iter<'_, Cell> {
        self.cells.iter()
    }

    /// Cells grouped by row, top to bottom
    pub fn rows(&self) -> slice::Chunks<'_, Cell> {
        self.cells.chunks(self.dimension)
    }

    /// Neighbor across an open passage on the given side of `cell`
    pub fn neighbor(&self, cell: &Cell, direction: Direction) -> Option<&Cell> {
        cell.link(direction).and_then(|p| self.get(p))
    }

    /// Number of open passages, each counted once
    pub fn passage_count(&self) -> usize {
        self.cells
            .iter()
            .map(|c| {
                c.has_passage(Direction::Right) as usize + c.has_passage(Direction::Bottom) as usize
            })
            .sum()
    }

    /// Open the passage between `from` and its neighbor towards `direction`.
    ///
    /// Both cells are updated, so the relation is always symmetric. Returns
    /// the position of the neighbor.
    pub(crate) fn open_passage(&mut self, from: Position, direction: Direction) -> Result<Position> {
        let origin = self.checked_index(from.row, from.column)?;
        let to = from
            .step(direction, self.dimension)
            .ok_or(MazeError::OutOfBounds {
                row: from.row as isize + direction.offset().0,
                column: from.column as isize + direction.offset().1,
                dimension: self.dimension,
            })?;
        let target = self.checked_index(to.row, to.column)?;

        debug_assert!(self.cells[origin].links[direction.slot()].is_none());
        debug_assert!(self.cells[target].links[direction.opposite().slot()].is_none());

        self.cells[origin].links[direction.slot()] = Some(to);
        self.cells[target].links[direction.opposite().slot()] = Some(from);
        Ok(to)
    }

    /// Whether `to` can be reached from `from` through open passages.
    ///
    /// Every cell reaches itself. Otherwise a depth-first search runs over
    /// the passages opened so far, with a visited set owned by this call
    /// alone. Positions outside the grid are never connected.
    pub fn is_connected(&self, from: Position, to: Position) -> bool {
        let (Some(start), Some(goal)) = (self.index(from), self.index(to)) else {
            return false;
        };
        if start == goal || self.cells[start].links().any(|(_, p)| p == to) {
            return true;
        }

        let mut visited = vec![false; self.cells.len()];
        visited[start] = true;
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            for (_, next) in self.cells[current].links() {
                let Some(i) = self.index(next) else { continue };
                if i == goal {
                    return true;
                }
                if !visited[i] {
                    visited[i] = true;
                    stack.push(i);
                }
            }
        }
        false
    }

    fn index(&self, position: Position) -> Option<usize> {
        (position.row < self.dimension && position.column < self.dimension)
            .then(|| position.row * self.dimension + position.column)
    }

    fn checked_index(&self, row: usize, column: usize) -> Result<usize> {
        self.index(Position { row, column })
            .ok_or(MazeError::OutOfBounds {
                row: row as isize,
                column: column as isize,
                dimension: self.dimension,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_assigns_positions() {
        let grid = Grid::create(4).unwrap();
        assert_eq!(grid.cells().len(), 16);
        for (r, row) in grid.rows().enumerate() {
            assert_eq!(row.len(), 4);
            for (c, cell) in row.iter().enumerate() {
                assert_eq!((cell.row(), cell.column()), (r, c));
                assert_eq!(cell.links().count(), 0);
            }
        }
    }

    #[test]
    fn create_rejects_empty_grid() {
        assert_eq!(
            Grid::create(0),
            Err(MazeError::InvalidDimension { dimension: 0 })
        );
    }

    #[test]
    fn at_rejects_out_of_bounds() {
        let grid = Grid::create(3).unwrap();
        assert_eq!(grid.at(2, 2).unwrap().position(), Position::new(2, 2));
        assert_eq!(
            grid.at(3, 0),
            Err(MazeError::OutOfBounds {
                row: 3,
                column: 0,
                dimension: 3
            })
        );
        assert!(grid.at(0, 7).is_err());
        assert!(grid.get(Position::new(5, 5)).is_none());
    }

    #[test]
    fn step_stays_inside_grid() {
        let p = Position::new(1, 1);
        for d in Direction::ALL {
            let next = p.step(d, 3).unwrap();
            assert_eq!(next.step(d.opposite(), 3), Some(p));
        }
        assert_eq!(Position::new(2, 2).step(Direction::Bottom, 3), None);
        assert_eq!(Position::new(2, 2).step(Direction::Right, 3), None);
        assert_eq!(Position::new(0, 2).step(Direction::Left, 3), Some(Position::new(0, 1)));
    }

    #[test]
    fn open_passage_is_symmetric() {
        let mut grid = Grid::create(2).unwrap();
        let to = grid
            .open_passage(Position::new(0, 0), Direction::Bottom)
            .unwrap();
        assert_eq!(to, Position::new(1, 0));

        let top = grid.at(0, 0).unwrap();
        let bottom = grid.at(1, 0).unwrap();
        assert_eq!(top.link(Direction::Bottom), Some(bottom.position()));
        assert_eq!(bottom.link(Direction::Top), Some(top.position()));
        assert_eq!(grid.neighbor(top, Direction::Bottom), Some(bottom));
        assert_eq!(grid.neighbor(top, Direction::Right), None);
        assert_eq!(grid.passage_count(), 1);
    }

    #[test]
    fn open_passage_refuses_boundary() {
        let mut grid = Grid::create(2).unwrap();
        assert_eq!(
            grid.open_passage(Position::new(0, 0), Direction::Top),
            Err(MazeError::OutOfBounds {
                row: -1,
                column: 0,
                dimension: 2
            })
        );
        assert_eq!(grid.passage_count(), 0);
    }

    #[test]
    fn connectivity_follows_passages() {
        let mut grid = Grid::create(3).unwrap();
        let origin = Position::new(0, 0);
        assert!(grid.is_connected(origin, origin));
        assert!(!grid.is_connected(origin, Position::new(0, 1)));

        grid.open_passage(origin, Direction::Right).unwrap();
        grid.open_passage(Position::new(0, 1), Direction::Bottom).unwrap();
        grid.open_passage(Position::new(1, 1), Direction::Bottom).unwrap();

        assert!(grid.is_connected(origin, Position::new(0, 1)));
        assert!(grid.is_connected(origin, Position::new(2, 1)));
        assert!(grid.is_connected(Position::new(2, 1), origin));
        assert!(!grid.is_connected(origin, Position::new(2, 2)));
        assert!(!grid.is_connected(origin, Position::new(9, 9)));
    }

    #[test]
    fn connectivity_queries_do_not_share_state() {
        let mut grid = Grid::create(3).unwrap();
        grid.open_passage(Position::new(0, 0), Direction::Right).unwrap();
        grid.open_passage(Position::new(0, 1), Direction::Right).unwrap();

        // A failed search must not leave stale visited cells behind
        assert!(!grid.is_connected(Position::new(0, 0), Position::new(1, 0)));
        assert!(grid.is_connected(Position::new(0, 0), Position::new(0, 2)));
        assert!(grid.is_connected(Position::new(0, 1), Position::new(0, 2)));
    }

    #[test]
    fn verify_detects_one_sided_passage() {
        let mut grid = Grid::create(2).unwrap();
        grid.open_passage(Position::new(0, 0), Direction::Right).unwrap();
        grid.open_passage(Position::new(0, 0), Direction::Bottom).unwrap();
        grid.open_passage(Position::new(1, 0), Direction::Right).unwrap();
        grid.cells[1].links[Direction::Left.slot()] = None;

        assert_eq!(
            crate::Maze::from_grid(grid).verify(),
            Err(MazeError::AsymmetricPassage {
                from: Position::new(0, 0),
                to: Position::new(0, 1)
            })
        );
    }

    #[test]
    fn verify_detects_passage_to_distant_cell() {
        let mut grid = Grid::create(3).unwrap();
        grid.cells[0].links[Direction::Right.slot()] = Some(Position::new(0, 2));
        grid.cells[2].links[Direction::Left.slot()] = Some(Position::new(0, 0));

        assert_eq!(
            crate::Maze::from_grid(grid).verify(),
            Err(MazeError::PassageOutsideGrid {
                from: Position::new(0, 0),
                direction: Direction::Right
            })
        );
    }
}
