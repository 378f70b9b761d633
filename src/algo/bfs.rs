use std::collections::VecDeque;

use log::debug;
use strum::IntoEnumIterator;

use crate::{
    grid::{Cell, Grid, Pos},
    maze::{Action, Maze},
};

/// Result of a shortest path search
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Solution {
    /// Positions from start to goal inclusive, empty if the goal is unreachable
    pub path: Vec<Pos>,
    /// Number of dequeues plus neighbour checks performed by the search
    pub operations: usize,
}

impl Solution {
    pub fn is_found(&self) -> bool {
        !self.path.is_empty()
    }

    /// Number of moves along the path, `0` if no path was found
    pub fn moves(&self) -> usize {
        self.path.len().saturating_sub(1)
    }
}

/// Breadth-first shortest path search over the 4-connected grid
///
/// Neighbours are expanded in [`Action`] declaration order and marked visited when
/// enqueued, so the first path to reach the goal is a shortest one and ties go to
/// the path discovered first.
///
/// The operation count charges one for every dequeue and one for every neighbour
/// examined, whether or not the neighbour is in bounds, free, or unvisited.
#[derive(Debug, Clone, Copy, Default)]
pub struct BfsSolver;

impl BfsSolver {
    pub fn new() -> Self {
        Self
    }

    /// Search `grid` for a shortest path from `start` to `goal`
    pub fn solve(&self, grid: &Grid, start: Pos, goal: Pos) -> Solution {
        if !grid.contains(start) || !grid.contains(goal) {
            return Solution::default();
        }

        let mut parent: Vec<Option<Pos>> = vec![None; grid.len()];
        let mut visited = vec![false; grid.len()];
        let mut frontier = VecDeque::from([start]);
        visited[grid.index_of(start)] = true;
        let mut operations = 0;

        while let Some(pos) = frontier.pop_front() {
            operations += 1;
            if pos == goal {
                let path = backtrack(grid, &parent, goal);
                debug!(
                    "BFS reached {:?} in {} moves after {} operations",
                    goal,
                    path.len() - 1,
                    operations
                );
                return Solution { path, operations };
            }

            for action in Action::iter() {
                operations += 1;
                let Some(next) = grid.offset(pos, action.delta()) else {
                    continue;
                };
                let i = grid.index_of(next);
                if grid[next] == Cell::Wall || visited[i] {
                    continue;
                }
                visited[i] = true;
                parent[i] = Some(pos);
                frontier.push_back(next);
            }
        }

        debug!(
            "BFS found no path from {:?} to {:?} after {} operations",
            start, goal, operations
        );
        Solution {
            path: Vec::new(),
            operations,
        }
    }

    /// Search between the endpoints of `maze`
    pub fn solve_maze(&self, maze: &Maze) -> Solution {
        self.solve(maze.grid(), maze.start(), maze.goal())
    }
}

/// Follow parent links from `goal` back to the root and return the path root first
fn backtrack(grid: &Grid, parent: &[Option<Pos>], goal: Pos) -> Vec<Pos> {
    let mut path = vec![goal];
    let mut current = goal;
    while let Some(prev) = parent[grid.index_of(current)] {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reference distances from `from` to every cell, `None` where unreachable
    fn distances(grid: &Grid, from: Pos) -> Vec<Option<usize>> {
        let mut dist = vec![None; grid.len()];
        dist[grid.index_of(from)] = Some(0);
        let mut queue = VecDeque::from([from]);
        while let Some(pos) = queue.pop_front() {
            let d = dist[grid.index_of(pos)].unwrap();
            for (dr, dc) in [(-1, 0), (1, 0), (0, -1), (0, 1)] {
                if let Some(next) = grid.offset(pos, (dr, dc)) {
                    if grid.is_free(next) && dist[grid.index_of(next)].is_none() {
                        dist[grid.index_of(next)] = Some(d + 1);
                        queue.push_back(next);
                    }
                }
            }
        }
        dist
    }

    fn assert_valid_path(grid: &Grid, solution: &Solution, start: Pos, goal: Pos) {
        let path = &solution.path;
        assert_eq!(path.first(), Some(&start), "Path starts at start");
        assert_eq!(path.last(), Some(&goal), "Path ends at goal");
        for pos in path {
            assert!(grid.is_free(*pos), "Path avoids walls at {pos:?}");
        }
        for pair in path.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            assert_eq!(
                a.0.abs_diff(b.0) + a.1.abs_diff(b.1),
                1,
                "Consecutive positions {a:?} and {b:?} are 4-connected"
            );
        }
    }

    const MAZES: [&[&str]; 4] = [
        &[".....", ".....", ".....", ".....", "....."],
        &["..#..", ".##.#", "...#.", "#.#..", "....."],
        &[".#...", ".#.#.", ".#.#.", ".#.#.", "...#."],
        &["....#.", "###...", "...##.", ".#....", ".#.##."],
    ];

    #[test]
    fn open_grid_shortest_path() {
        let grid = Grid::new(5, 5).unwrap();
        let solution = BfsSolver.solve(&grid, (0, 0), (4, 4));
        assert_valid_path(&grid, &solution, (0, 0), (4, 4));
        assert_eq!(solution.moves(), 8, "Path length is the Manhattan distance");
        assert_eq!(solution.path.len(), 9, "Path holds both endpoints");
        assert!(
            solution.operations <= 25 * 5,
            "Operation count {} bounded by cell count",
            solution.operations
        );
    }

    #[test]
    fn exact_operation_count() {
        let grid = Grid::new(2, 2).unwrap();
        let solution = BfsSolver.solve(&grid, (0, 0), (1, 1));
        assert_eq!(solution.path, [(0, 0), (1, 0), (1, 1)], "Down explored before right");
        assert_eq!(solution.operations, 16, "Four dequeues and three expansions");
    }

    #[test]
    fn path_length_matches_reference_distance() {
        for rows in MAZES {
            let grid = Grid::from_rows(rows).unwrap();
            let start = (0, 0);
            let dist = distances(&grid, start);
            for r in 0..grid.rows() {
                for c in 0..grid.cols() {
                    let goal = (r, c);
                    if !grid.is_free(goal) {
                        continue;
                    }
                    let solution = BfsSolver.solve(&grid, start, goal);
                    match dist[grid.index_of(goal)] {
                        Some(d) => {
                            assert_valid_path(&grid, &solution, start, goal);
                            assert_eq!(solution.moves(), d, "Shortest distance to {goal:?}");
                        }
                        None => assert!(!solution.is_found(), "{goal:?} is unreachable"),
                    }
                }
            }
        }
    }

    #[test]
    fn start_is_goal() {
        let grid = Grid::new(2, 2).unwrap();
        let solution = BfsSolver.solve(&grid, (0, 0), (0, 0));
        assert!(solution.is_found(), "Goal found at the start");
        assert_eq!(solution.path, [(0, 0)], "Single position path");
        assert_eq!(solution.moves(), 0, "No moves needed");
        assert_eq!(solution.operations, 1, "Only the first dequeue");
    }

    #[test]
    fn solve_is_idempotent() {
        let grid = Grid::from_rows(MAZES[3]).unwrap();
        let first = BfsSolver.solve(&grid, (0, 0), (4, 5));
        let second = BfsSolver.solve(&grid, (0, 0), (4, 5));
        assert!(first.is_found(), "Goal reachable");
        assert_eq!(first, second, "Same path and operation count");
    }

    #[test]
    fn enclosed_goal_has_no_path() {
        let grid = Grid::from_rows(&[".....", "..#..", ".#.#.", "..#..", "....."]).unwrap();
        let solution = BfsSolver.solve(&grid, (0, 0), (2, 2));
        assert!(solution.path.is_empty(), "No path into enclosed goal");
        assert!(solution.operations > 0, "Operations still counted");

        let grid = Grid::from_rows(&[".#."]).unwrap();
        let solution = BfsSolver.solve(&grid, (0, 0), (0, 2));
        assert_eq!(
            solution,
            Solution {
                path: vec![],
                operations: 5
            },
            "One dequeue and four neighbour checks"
        );
    }

    #[test]
    fn solve_maze_uses_endpoints() {
        let grid = Grid::from_rows(&["S.#", ".#.", "..G"]).unwrap();
        let maze = Maze::from_grid(grid, (0, 0), (2, 2)).unwrap();
        let solution = BfsSolver::new().solve_maze(&maze);
        assert_eq!(
            solution.path,
            [(0, 0), (1, 0), (2, 0), (2, 1), (2, 2)],
            "Only route around the walls"
        );
    }
}
