//! Generate perfect mazes on square grids
//!
//! A perfect maze connects every cell to every other cell through exactly
//! one path: its open passages form a spanning tree over the grid. The
//! maze knows nothing about pixels or devices; renderers and solvers read
//! the passages through [Maze::has_passage], [Maze::neighbor] and
//! [Maze::is_connected].
//!
//! # Examples
//! ```
//! use labyrinth::{Direction, MazeGenerator};
//!
//! let mut generator = MazeGenerator::new(Some(13));
//! let maze = generator.build_maze(5).unwrap();
//!
//! let entrance = maze.at(0, 0).unwrap();
//! let exit = maze.at(4, 4).unwrap();
//! assert!(maze.is_connected(entrance, exit));
//! assert_eq!(maze.passage_count(), 24);
//! assert!(!maze.has_passage(entrance, Direction::Top));
//! println!("{maze}");
//! ```

use std::collections::HashSet;
use std::fmt;
use std::iter;
use std::slice;

use itertools::Itertools;
use petgraph::algo::{astar, connected_components};
use petgraph::graph::{NodeIndex, UnGraph};
use thiserror::Error;

pub mod grid;
pub mod maze_generator;

pub use grid::{Cell, Direction, Grid, Position};
pub use maze_generator::{build_maze, GuardStrategy, MazeGenerator};

/// Errors from building, addressing or verifying a maze
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MazeError {
    #[error("maze dimension must be positive, got {dimension}")]
    InvalidDimension { dimension: usize },

    #[error("cell ({row}, {column}) is outside the {dimension}x{dimension} grid")]
    OutOfBounds {
        row: isize,
        column: isize,
        dimension: usize,
    },

    #[error("passage from {from} towards {direction:?} does not lead to the adjacent cell")]
    PassageOutsideGrid { from: Position, direction: Direction },

    #[error("passage {from} -> {to} has no passage back")]
    AsymmetricPassage { from: Position, to: Position },

    #[error("expected {expected} passages, found {found}")]
    PassageCount { expected: usize, found: usize },

    #[error("maze is split into {components} disconnected regions")]
    Disconnected { components: usize },
}

pub type Result<T> = std::result::Result<T, MazeError>;

/// Finished maze
///
/// Produced by [MazeGenerator::build_maze]. Passages are read-only from
/// here on; only the hole markers may still change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Maze {
    grid: Grid,
}

impl Maze {
    pub(crate) fn from_grid(grid: Grid) -> Self {
        Self { grid }
    }

    /// Number of cells along each side
    pub fn dimension(&self) -> usize {
        self.grid.dimension()
    }

    /// Cell at the given row and column, see [Grid::at]
    pub fn at(&self, row: usize, column: usize) -> Result<&Cell> {
        self.grid.at(row, column)
    }

    /// All cells in row-major order
    pub fn cells(&self) -> slice::Iter<'_, Cell> {
        self.grid.cells()
    }

    /// Cells grouped by row, top to bottom
    pub fn rows(&self) -> slice::Chunks<'_, Cell> {
        self.grid.rows()
    }

    /// Whether movement across the given side of `cell` is allowed
    pub fn has_passage(&self, cell: &Cell, direction: Direction) -> bool {
        cell.has_passage(direction)
    }

    /// Cell reached by crossing the given side of `cell`, if it is open
    pub fn neighbor(&self, cell: &Cell, direction: Direction) -> Option<&Cell> {
        self.grid.neighbor(cell, direction)
    }

    /// Whether `to` is reachable from `from`, see [Grid::is_connected]
    pub fn is_connected(&self, from: &Cell, to: &Cell) -> bool {
        self.grid.is_connected(from.position(), to.position())
    }

    /// Number of open passages, each counted once
    pub fn passage_count(&self) -> usize {
        self.grid.passage_count()
    }

    /// Open passages as position pairs, each passage once
    pub fn passages(&self) -> impl Iterator<Item = (Position, Position)> + '_ {
        self.grid.cells().flat_map(|cell| {
            [Direction::Right, Direction::Bottom]
                .into_iter()
                .filter_map(move |d| cell.link(d).map(|p| (cell.position(), p)))
        })
    }

    /// Mark or unmark the cell as a hole. Holes do not affect passages.
    pub fn set_hole(&mut self, row: usize, column: usize, hole: bool) -> Result<()> {
        self.grid.at_mut(row, column)?.set_hole(hole);
        Ok(())
    }

    /// Cells currently marked as holes
    pub fn holes(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.grid.cells().filter(|c| c.is_hole())
    }

    /// Check that the passages form a spanning tree over the grid.
    ///
    /// Every passage must lead to the adjacent cell in its direction, and
    /// that cell must hold the passage back. There must be exactly
    /// `dimension² - 1` passages, and all cells must be connected.
    pub fn verify(&self) -> Result<()> {
        let dimension = self.dimension();
        for cell in self.grid.cells() {
            let from = cell.position();
            for (direction, to) in cell.links() {
                if from.step(direction, dimension) != Some(to) {
                    return Err(MazeError::PassageOutsideGrid { from, direction });
                }
                let back = self.grid.get(to).and_then(|c| c.link(direction.opposite()));
                if back != Some(from) {
                    return Err(MazeError::AsymmetricPassage { from, to });
                }
            }
        }

        let expected = dimension * dimension - 1;
        let found = self.passage_count();
        if found != expected {
            return Err(MazeError::PassageCount { expected, found });
        }

        let components = connected_components(&self.to_graph());
        if components != 1 {
            return Err(MazeError::Disconnected { components });
        }
        Ok(())
    }

    /// Passage graph for solvers
    ///
    /// Node weights are the cell positions; node `i` is the `i`th cell in
    /// row-major order.
    pub fn to_graph(&self) -> UnGraph<Position, ()> {
        let mut graph = UnGraph::with_capacity(self.grid.cells().len(), self.passage_count());
        for cell in self.grid.cells() {
            graph.add_node(cell.position());
        }
        for (a, b) in self.passages() {
            graph.add_edge(self.node(a), self.node(b), ());
        }
        graph
    }

    /// The path between two cells, both ends included
    ///
    /// Returns `None` if either position lies outside the maze.
    pub fn shortest_path(&self, from: Position, to: Position) -> Option<Vec<Position>> {
        self.grid.get(from)?;
        self.grid.get(to)?;

        let graph = self.to_graph();
        let (_, nodes) = astar(
            &graph,
            self.node(from),
            |n| graph[n] == to,
            |_| 1usize,
            |n| graph[n].row.abs_diff(to.row) + graph[n].column.abs_diff(to.column),
        )?;
        Some(nodes.into_iter().map(|n| graph[n]).collect())
    }

    /// Text drawing of the maze with the given cells marked `*`
    ///
    /// Holes are drawn as `O`.
    pub fn render_with_path(&self, path: &[Position]) -> String {
        let on_path: HashSet<Position> = path.iter().copied().collect();
        let mut lines = Vec::with_capacity(2 * self.dimension() + 1);
        lines.push(iter::repeat("+---").take(self.dimension()).join("") + "+");

        for row in self.grid.rows() {
            let body = row
                .iter()
                .map(|cell| {
                    let wall = if cell.has_passage(Direction::Left) { ' ' } else { '|' };
                    let mark = if cell.is_hole() {
                        'O'
                    } else if on_path.contains(&cell.position()) {
                        '*'
                    } else {
                        ' '
                    };
                    format!("{wall} {mark} ")
                })
                .join("");
            let floor = row
                .iter()
                .map(|cell| {
                    if cell.has_passage(Direction::Bottom) {
                        "+   "
                    } else {
                        "+---"
                    }
                })
                .join("");
            lines.push(body + "|");
            lines.push(floor + "+");
        }
        lines.join("\n")
    }

    fn node(&self, position: Position) -> NodeIndex {
        NodeIndex::new(position.row * self.dimension() + position.column)
    }
}

impl fmt::Display for Maze {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render_with_path(&[]))
    }
}
