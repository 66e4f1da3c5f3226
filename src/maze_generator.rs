//! Maze generation
//!
//! Every cell is visited in row-major order. The sides of the cell are
//! tried in random order, and a passage is opened towards each neighbor
//! that is not yet reachable from the cell. A neighbor that is already
//! reachable would close a cycle, so that side stays a wall. When all
//! cells are visited, every pair of adjacent cells is connected and no
//! passage was ever redundant: the passages form a spanning tree.
//!
//! The resulting trees are not uniformly distributed; only connectivity
//! and the absence of cycles are guaranteed.

use log::{debug, trace};
use petgraph::unionfind::UnionFind;
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

use crate::{Direction, Grid, Maze, Position, Result};

/// How the generator decides that a candidate passage would close a cycle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GuardStrategy {
    /// Depth-first search over the passages opened so far, see
    /// [Grid::is_connected]. Each check is linear in the grid size.
    #[default]
    Traversal,
    /// Disjoint sets of connected cells, near-constant time per check.
    /// Preferable for large grids.
    DisjointSet,
}

/// Cycle guard state for a single build
enum CycleGuard {
    Traversal,
    DisjointSet {
        sets: UnionFind<usize>,
        dimension: usize,
    },
}

impl CycleGuard {
    fn new(strategy: GuardStrategy, dimension: usize) -> Self {
        match strategy {
            GuardStrategy::Traversal => CycleGuard::Traversal,
            GuardStrategy::DisjointSet => CycleGuard::DisjointSet {
                sets: UnionFind::new(dimension * dimension),
                dimension,
            },
        }
    }

    fn connected(&self, grid: &Grid, a: Position, b: Position) -> bool {
        match self {
            CycleGuard::Traversal => grid.is_connected(a, b),
            CycleGuard::DisjointSet { sets, dimension } => {
                sets.equiv(index(a, *dimension), index(b, *dimension))
            }
        }
    }

    fn join(&mut self, a: Position, b: Position) {
        if let CycleGuard::DisjointSet { sets, dimension } = self {
            sets.union(index(a, *dimension), index(b, *dimension));
        }
    }
}

fn index(position: Position, dimension: usize) -> usize {
    position.row * dimension + position.column
}

/// Build a maze using a generator seeded from system entropy.
///
/// # Examples
/// ```
/// let maze = labyrinth::build_maze(8).unwrap();
/// assert_eq!(maze.passage_count(), 63);
/// assert!(labyrinth::build_maze(0).is_err());
/// ```
pub fn build_maze(dimension: usize) -> Result<Maze> {
    MazeGenerator::new(None).build_maze(dimension)
}

/// Perfect maze generator
///
/// The random source is injected, so a seeded generator always produces
/// the same mazes.
pub struct MazeGenerator<R = StdRng> {
    random: R,
    guard: GuardStrategy,
}

impl MazeGenerator<StdRng> {
    /// Generator backed by [StdRng], seeded from `seed` or from entropy
    pub fn new(seed: Option<u64>) -> Self {
        Self::with_rng(if let Some(state) = seed {
            StdRng::seed_from_u64(state)
        } else {
            StdRng::from_entropy()
        })
    }
}

impl<R: Rng> MazeGenerator<R> {
    /// Generator drawing from the given random source
    pub fn with_rng(random: R) -> Self {
        Self {
            random,
            guard: GuardStrategy::default(),
        }
    }

    /// Select the cycle guard used by subsequent builds
    pub fn guard(mut self, guard: GuardStrategy) -> Self {
        self.guard = guard;
        self
    }

    /// Generate a `dimension` by `dimension` perfect maze.
    ///
    /// Can only fail for an invalid dimension. The maze is returned only
    /// once every cell is resolved.
    pub fn build_maze(&mut self, dimension: usize) -> Result<Maze> {
        let mut grid = Grid::create(dimension)?;
        let mut guard = CycleGuard::new(self.guard, dimension);
        let mut rejected: usize = 0;

        for i in 0..dimension * dimension {
            let current = Position::new(i / dimension, i % dimension);

            // Sides are drawn without replacement, so the walk over them
            // always ends. A rejected side stays rejected: components only grow.
            let mut directions = Direction::ALL;
            directions.shuffle(&mut self.random);

            for direction in directions {
                let Some(next) = current.step(direction, dimension) else {
                    continue;
                };
                if grid.at(current.row, current.column)?.has_passage(direction) {
                    continue;
                }
                if guard.connected(&grid, current, next) {
                    rejected += 1;
                    continue;
                }
                grid.open_passage(current, direction)?;
                guard.join(current, next);
                trace!("Opened passage {} -> {}", current, next);
            }
        }

        let maze = Maze::from_grid(grid);
        debug!(
            "Built {d}x{d} maze with {} passages, {} rejected candidates ({:?} guard)",
            maze.passage_count(),
            rejected,
            self.guard,
            d = dimension,
        );
        debug_assert_eq!(maze.verify(), Ok(()));
        Ok(maze)
    }

    /// Mark up to `count` random cells of `maze` as holes.
    ///
    /// The entrance `(0, 0)` and the exit `(d - 1, d - 1)` are never
    /// chosen. Returns the marked positions.
    pub fn place_holes(&mut self, maze: &mut Maze, count: usize) -> Result<Vec<Position>> {
        let last = maze.dimension() - 1;
        let eligible: Vec<Position> = maze
            .cells()
            .map(|c| c.position())
            .filter(|&p| p != Position::new(0, 0) && p != Position::new(last, last))
            .collect();

        let chosen: Vec<Position> = eligible
            .choose_multiple(&mut self.random, count)
            .copied()
            .collect();
        for p in &chosen {
            maze.set_hole(p.row, p.column, true)?;
        }
        debug!("Placed {} holes", chosen.len());
        Ok(chosen)
    }
}
