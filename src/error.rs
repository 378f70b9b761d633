use thiserror::Error;

use crate::grid::Pos;

/// Errors raised while validating a configuration
///
/// Rejected moves and unreachable goals are not errors, they are reported as
/// [`Outcome`](crate::maze::Outcome) tags and empty [`Solution`](crate::algo::Solution)s.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("grid dimensions must be non-zero, got {rows}x{cols}")]
    EmptyGrid { rows: usize, cols: usize },

    #[error("{name} {pos:?} is outside of the {rows}x{cols} grid")]
    OutOfBounds {
        name: &'static str,
        pos: Pos,
        rows: usize,
        cols: usize,
    },

    #[error("{name} {pos:?} is a wall")]
    Blocked { name: &'static str, pos: Pos },

    #[error("start and goal must differ, both are {0:?}")]
    StartIsGoal(Pos),

    #[error("invalid value for `{name}`: {value}, must be in the interval [{min}, {max}]")]
    OutOfInterval {
        name: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },

    #[error("`min_epsilon` ({min}) must not exceed the initial epsilon ({initial})")]
    EpsilonFloorAboveStart { min: f32, initial: f32 },

    #[error("grid row {row} has {len} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        len: usize,
        expected: usize,
    },

    #[error("unknown cell symbol {0:?}")]
    UnknownCell(char),
}

pub type Result<T> = std::result::Result<T, Error>;
