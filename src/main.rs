//! CLI for maze generation

use anyhow::Context;
use clap::{Parser, ValueEnum};
use labyrinth::{GuardStrategy, MazeGenerator, Position};

/// Perfect maze generator
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Number of cells along each side
    #[arg(short, long, default_value_t = 10)]
    dimension: usize,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// How cycles are detected while carving passages
    #[arg(long, value_enum, default_value_t = Guard::Traversal)]
    guard: Guard,

    /// Number of holes to scatter in the maze
    #[arg(long, default_value_t = 0)]
    holes: usize,

    /// Mark the path from the top-left to the bottom-right corner
    #[arg(short, long)]
    solve: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Guard {
    Traversal,
    DisjointSet,
}

impl From<Guard> for GuardStrategy {
    fn from(guard: Guard) -> Self {
        match guard {
            Guard::Traversal => GuardStrategy::Traversal,
            Guard::DisjointSet => GuardStrategy::DisjointSet,
        }
    }
}

/// Generate maze, print output
fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut gen = MazeGenerator::new(args.seed).guard(args.guard.into());
    let mut maze = gen
        .build_maze(args.dimension)
        .context("Could not build maze")?;
    if args.holes > 0 {
        gen.place_holes(&mut maze, args.holes)
            .context("Could not place holes")?;
    }

    if args.solve {
        let last = args.dimension - 1;
        let path = maze
            .shortest_path(Position::new(0, 0), Position::new(last, last))
            .context("No path from entrance to exit")?;
        println!("{}", maze.render_with_path(&path));
        println!("The shortest path is {} steps.", path.len() - 1);
    } else {
        println!("{maze}");
    }
    Ok(())
}
