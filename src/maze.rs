use std::fmt;

use log::info;
use rand::{rngs::StdRng, Rng, SeedableRng};
use strum::{Display, EnumIter, VariantArray};

use crate::{
    env::Environment,
    error::{Error, Result},
    grid::{Cell, Grid, Pos},
};

/// One of the four orthogonal moves
///
/// The declaration order is also the tie-break order of greedy action selection.
#[derive(EnumIter, VariantArray, Display, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
}

impl Action {
    /// Number of actions
    pub const COUNT: usize = 4;

    /// `(row, col)` delta of the move
    pub const fn delta(self) -> (isize, isize) {
        match self {
            Action::Up => (-1, 0),
            Action::Down => (1, 0),
            Action::Left => (0, -1),
            Action::Right => (0, 1),
        }
    }

    /// Position of the action in [`Action::VARIANTS`]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Pick an action uniformly at random
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::VARIANTS[rng.gen_range(0..Self::COUNT)]
    }
}

/// Result of a transition
#[derive(Display, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    Moved,
    HitWall,
    HitBoundary,
    GoalReached,
}

impl Outcome {
    /// Whether the agent position changed
    pub fn is_move(self) -> bool {
        matches!(self, Outcome::Moved | Outcome::GoalReached)
    }
}

/// Configuration for [`Maze::generate`]
#[derive(Debug, Clone, PartialEq)]
pub struct MazeConfig {
    /// **Default**: `5`
    pub rows: usize,
    /// **Default**: `5`
    pub cols: usize,
    /// Probability that a cell other than start and goal becomes a wall
    ///
    /// **Default**: `0.2`
    pub obstacle_probability: f32,
    /// **Default**: `(0, 0)`
    pub start: Pos,
    /// **Default**: the bottom right corner
    pub goal: Pos,
    /// Seed for the obstacle layout, drawn from entropy when `None`
    ///
    /// **Default**: `None`
    pub seed: Option<u64>,
}

impl MazeConfig {
    /// A `rows` by `cols` maze from the top left to the bottom right corner
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            obstacle_probability: 0.2,
            start: (0, 0),
            goal: (rows.saturating_sub(1), cols.saturating_sub(1)),
            seed: None,
        }
    }
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self::new(5, 5)
    }
}

/// A grid maze holding the obstacle layout, the endpoints, and the agent position
///
/// The layout and endpoints never change after construction; only the agent position moves.
#[derive(Debug, Clone)]
pub struct Maze {
    grid: Grid,
    start: Pos,
    goal: Pos,
    pos: Pos,
}

impl Maze {
    /// Generate a random maze, seeded from `config.seed` if present
    pub fn generate(config: &MazeConfig) -> Result<Self> {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::generate_with(config, &mut rng)
    }

    /// Generate a random maze drawing from `rng`
    pub fn generate_with<R: Rng + ?Sized>(config: &MazeConfig, rng: &mut R) -> Result<Self> {
        let grid = Grid::generate(
            config.rows,
            config.cols,
            config.obstacle_probability,
            config.start,
            config.goal,
            rng,
        )?;
        let maze = Self::from_grid(grid, config.start, config.goal)?;
        info!(
            "Generated {}x{} maze with {} walls, start {:?}, goal {:?}",
            config.rows,
            config.cols,
            maze.grid.wall_count(),
            maze.start,
            maze.goal
        );
        Ok(maze)
    }

    /// Build a maze around an existing layout
    pub fn from_grid(grid: Grid, start: Pos, goal: Pos) -> Result<Self> {
        for (name, pos) in [("start", start), ("goal", goal)] {
            grid.check_bounds(name, pos)?;
            if grid[pos] == Cell::Wall {
                return Err(Error::Blocked { name, pos });
            }
        }
        if start == goal {
            return Err(Error::StartIsGoal(start));
        }

        Ok(Self {
            grid,
            start,
            goal,
            pos: start,
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn rows(&self) -> usize {
        self.grid.rows()
    }

    pub fn cols(&self) -> usize {
        self.grid.cols()
    }

    pub fn start(&self) -> Pos {
        self.start
    }

    pub fn goal(&self) -> Pos {
        self.goal
    }

    /// Current agent position
    pub fn pos(&self) -> Pos {
        self.pos
    }

    /// Cell classification at `pos`, or `None` if out of bounds
    pub fn cell(&self, pos: Pos) -> Option<Cell> {
        self.grid.get(pos)
    }

    /// Where `action` leads from `from`, without moving the agent
    pub fn transition(&self, from: Pos, action: Action) -> (Pos, Outcome) {
        match self.grid.offset(from, action.delta()) {
            None => (from, Outcome::HitBoundary),
            Some(to) if self.grid[to] == Cell::Wall => (from, Outcome::HitWall),
            Some(to) if to == self.goal => (to, Outcome::GoalReached),
            Some(to) => (to, Outcome::Moved),
        }
    }

    /// Render the maze with `path` overlaid as `*`
    pub fn render_with_path(&self, path: &[Pos]) -> String {
        let mut out = String::with_capacity((self.cols() + 1) * self.rows());
        for r in 0..self.rows() {
            for c in 0..self.cols() {
                let pos = (r, c);
                let symbol = if pos == self.pos {
                    'A'
                } else if pos == self.start {
                    'S'
                } else if pos == self.goal {
                    'G'
                } else if path.contains(&pos) {
                    '*'
                } else {
                    self.grid[pos].symbol()
                };
                out.push(symbol);
            }
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for Maze {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render_with_path(&[]))
    }
}

impl Environment for Maze {
    type State = Pos;
    type Action = Action;
    type Outcome = Outcome;

    fn state(&self) -> Self::State {
        self.pos
    }

    fn is_active(&self) -> bool {
        self.pos != self.goal
    }

    fn step(&mut self, action: Self::Action) -> (Self::State, Self::Outcome) {
        let (next, outcome) = self.transition(self.pos, action);
        if outcome.is_move() {
            self.pos = next;
        }
        (self.pos, outcome)
    }

    fn reset(&mut self) -> Self::State {
        self.pos = self.start;
        self.pos
    }
}
