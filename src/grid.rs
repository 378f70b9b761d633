use std::ops::Index;

use rand::Rng;

use crate::{
    ensure_interval,
    error::{Error, Result},
};

/// Position coordinates in the grid as `(row, col)`
pub type Pos = (usize, usize);

/// Classification of a single grid cell
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Cell {
    #[default]
    Free,
    Wall,
}

impl Cell {
    pub fn symbol(self) -> char {
        match self {
            Cell::Free => '.',
            Cell::Wall => '#',
        }
    }
}

impl TryFrom<char> for Cell {
    type Error = Error;

    fn try_from(c: char) -> Result<Self> {
        match c {
            '.' | 'S' | 'G' => Ok(Cell::Free),
            '#' => Ok(Cell::Wall),
            other => Err(Error::UnknownCell(other)),
        }
    }
}

/// A rectangular obstacle layout with fixed dimensions, stored row-major
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Create a grid of `rows` by `cols` free cells
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(Error::EmptyGrid { rows, cols });
        }
        Ok(Self {
            rows,
            cols,
            cells: vec![Cell::Free; rows * cols],
        })
    }

    /// Randomly place walls: every cell other than `start` and `goal` independently
    /// becomes a [`Cell::Wall`] with probability `obstacle_probability`
    ///
    /// Nothing guarantees that `goal` is reachable from `start`.
    pub fn generate<R: Rng + ?Sized>(
        rows: usize,
        cols: usize,
        obstacle_probability: f32,
        start: Pos,
        goal: Pos,
        rng: &mut R,
    ) -> Result<Self> {
        ensure_interval!(obstacle_probability, 0.0, 1.0);
        let mut grid = Self::new(rows, cols)?;
        grid.check_bounds("start", start)?;
        grid.check_bounds("goal", goal)?;

        for r in 0..rows {
            for c in 0..cols {
                if (r, c) == start || (r, c) == goal {
                    continue;
                }
                if rng.gen::<f32>() < obstacle_probability {
                    grid.set((r, c), Cell::Wall);
                }
            }
        }

        Ok(grid)
    }

    /// Parse a grid from text rows where `#` is a wall and `.`, `S` or `G` are free
    ///
    /// ### Example
    /// ```
    /// use rl_maze::grid::{Cell, Grid};
    ///
    /// let grid = Grid::from_rows(&["S.#", "..G"]).unwrap();
    /// assert_eq!(grid[(0, 2)], Cell::Wall);
    /// ```
    pub fn from_rows<S: AsRef<str>>(lines: &[S]) -> Result<Self> {
        let rows = lines.len();
        let cols = lines.first().map_or(0, |l| l.as_ref().chars().count());
        let mut grid = Self::new(rows, cols)?;

        for (r, line) in lines.iter().enumerate() {
            let line = line.as_ref();
            let len = line.chars().count();
            if len != cols {
                return Err(Error::RaggedRow {
                    row: r,
                    len,
                    expected: cols,
                });
            }
            for (c, symbol) in line.chars().enumerate() {
                grid.set((r, c), Cell::try_from(symbol)?);
            }
        }

        Ok(grid)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, pos: Pos) -> bool {
        pos.0 < self.rows && pos.1 < self.cols
    }

    /// Cell classification at `pos`, or `None` if out of bounds
    pub fn get(&self, pos: Pos) -> Option<Cell> {
        self.contains(pos).then(|| self.cells[self.index_of(pos)])
    }

    pub fn is_free(&self, pos: Pos) -> bool {
        self.get(pos) == Some(Cell::Free)
    }

    /// Overwrite a cell, ignoring out of bounds positions
    pub fn set(&mut self, pos: Pos, cell: Cell) {
        if self.contains(pos) {
            let i = self.index_of(pos);
            self.cells[i] = cell;
        }
    }

    /// Apply a `(row, col)` delta to `pos`, or `None` if the result leaves the grid
    pub fn offset(&self, pos: Pos, (dr, dc): (isize, isize)) -> Option<Pos> {
        let r = pos.0.checked_add_signed(dr)?;
        let c = pos.1.checked_add_signed(dc)?;
        self.contains((r, c)).then_some((r, c))
    }

    /// Number of wall cells
    pub fn wall_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c == Cell::Wall).count()
    }

    /// Row-major index of `pos`, which must be in bounds
    pub(crate) fn index_of(&self, pos: Pos) -> usize {
        pos.0 * self.cols + pos.1
    }

    pub(crate) fn check_bounds(&self, name: &'static str, pos: Pos) -> Result<()> {
        if self.contains(pos) {
            Ok(())
        } else {
            Err(Error::OutOfBounds {
                name,
                pos,
                rows: self.rows,
                cols: self.cols,
            })
        }
    }
}

impl Index<Pos> for Grid {
    type Output = Cell;

    fn index(&self, pos: Pos) -> &Self::Output {
        &self.cells[self.index_of(pos)]
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    #[test]
    fn empty_dimensions_rejected() {
        assert_eq!(
            Grid::new(0, 3),
            Err(Error::EmptyGrid { rows: 0, cols: 3 }),
            "Zero rows rejected"
        );
        assert!(Grid::new(3, 0).is_err(), "Zero cols rejected");
    }

    #[test]
    fn parse_rows() {
        let grid = Grid::from_rows(&["S.#", "#.G"]).unwrap();
        assert_eq!((grid.rows(), grid.cols()), (2, 3), "Dimensions parsed");
        assert_eq!(grid[(0, 0)], Cell::Free, "Start symbol is free");
        assert_eq!(grid[(0, 2)], Cell::Wall, "Wall parsed");
        assert_eq!(grid[(1, 0)], Cell::Wall, "Wall parsed");
        assert_eq!(grid.wall_count(), 2, "Wall count correct");

        assert_eq!(
            Grid::from_rows(&["..", "..."]),
            Err(Error::RaggedRow {
                row: 1,
                len: 3,
                expected: 2
            }),
            "Ragged rows rejected"
        );
        assert_eq!(
            Grid::from_rows(&[".x"]),
            Err(Error::UnknownCell('x')),
            "Unknown symbols rejected"
        );
    }

    #[test]
    fn offsets_respect_bounds() {
        let grid = Grid::new(2, 3).unwrap();
        assert_eq!(grid.offset((0, 0), (-1, 0)), None, "Above top row");
        assert_eq!(grid.offset((0, 0), (0, -1)), None, "Left of first col");
        assert_eq!(grid.offset((1, 2), (1, 0)), None, "Below bottom row");
        assert_eq!(grid.offset((1, 2), (0, 1)), None, "Right of last col");
        assert_eq!(grid.offset((0, 1), (1, 0)), Some((1, 1)), "Inside grid");
        assert_eq!(grid.get((2, 0)), None, "Out of bounds lookup");
    }

    #[test]
    fn generation_keeps_endpoints_free() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let grid = Grid::generate(6, 4, 1.0, (0, 0), (5, 3), &mut rng).unwrap();
            assert!(grid.is_free((0, 0)), "Start is free");
            assert!(grid.is_free((5, 3)), "Goal is free");
            assert_eq!(grid.wall_count(), 6 * 4 - 2, "Every other cell is a wall");
        }

        let grid = Grid::generate(6, 4, 0.0, (0, 0), (5, 3), &mut rng).unwrap();
        assert_eq!(grid.wall_count(), 0, "No walls with zero probability");
    }

    #[test]
    fn generation_validates_input() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(
            matches!(
                Grid::generate(5, 5, 1.5, (0, 0), (4, 4), &mut rng),
                Err(Error::OutOfInterval { .. })
            ),
            "Probability above one rejected"
        );
        assert!(
            matches!(
                Grid::generate(5, 5, 0.2, (0, 0), (5, 4), &mut rng),
                Err(Error::OutOfBounds { name: "goal", .. })
            ),
            "Goal outside grid rejected"
        );
    }
}
