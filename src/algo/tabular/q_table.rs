use std::ops::Index;

use log::trace;
use rand::{rngs::StdRng, SeedableRng};
use strum::VariantArray;

use crate::{
    decay::Multiplicative,
    ensure_interval,
    env::Environment,
    error::{Error, Result},
    exploration::{Choice, EpsilonGreedy},
    grid::Pos,
    maze::{Action, Maze, Outcome},
    memory::Exp,
};

/// Configuration for the [`QTableAgent`]
#[derive(Debug, Clone, PartialEq)]
pub struct QTableAgentConfig {
    /// Learning rate, in `[0,1]`
    ///
    /// **Default**: `0.1`
    pub alpha: f32,
    /// Discount factor, in `[0,1]`
    ///
    /// **Default**: `0.9`
    pub gamma: f32,
    /// Initial exploration rate
    ///
    /// **Default**: `1.0`
    pub epsilon: f32,
    /// Multiplier applied to epsilon after every completed episode
    ///
    /// **Default**: `0.995`
    pub epsilon_decay: f32,
    /// Floor for epsilon
    ///
    /// **Default**: `0.01`
    pub min_epsilon: f32,
    /// Seed for exploration, drawn from entropy when `None`
    ///
    /// **Default**: `None`
    pub seed: Option<u64>,
}

impl Default for QTableAgentConfig {
    fn default() -> Self {
        Self {
            alpha: 0.1,
            gamma: 0.9,
            epsilon: 1.0,
            epsilon_decay: 0.995,
            min_epsilon: 0.01,
            seed: None,
        }
    }
}

impl QTableAgentConfig {
    pub fn validate(&self) -> Result<()> {
        ensure_interval!(self.alpha, 0.0, 1.0);
        ensure_interval!(self.gamma, 0.0, 1.0);
        ensure_interval!(self.epsilon, 0.0, 1.0);
        ensure_interval!(self.epsilon_decay, 0.0, 1.0);
        ensure_interval!(self.min_epsilon, 0.0, 1.0);
        if self.min_epsilon > self.epsilon {
            return Err(Error::EpsilonFloorAboveStart {
                min: self.min_epsilon,
                initial: self.epsilon,
            });
        }
        Ok(())
    }
}

/// Dense table of action values, one row of [`Action::COUNT`] estimates per grid cell
#[derive(Debug, Clone, PartialEq)]
pub struct QTable {
    rows: usize,
    cols: usize,
    values: Vec<[f32; Action::COUNT]>,
}

impl QTable {
    /// A zeroed table for a `rows` by `cols` grid
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            values: vec![[0.0; Action::COUNT]; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Estimates for every action in `state`, indexed by [`Action::index`]
    ///
    /// **Panics** if `state` is outside the table
    pub fn values(&self, state: Pos) -> &[f32; Action::COUNT] {
        &self.values[self.slot(state)]
    }

    pub fn set(&mut self, state: Pos, action: Action, value: f32) {
        let i = self.slot(state);
        self.values[i][action.index()] = value;
    }

    /// Highest estimate in `state`
    pub fn max(&self, state: Pos) -> f32 {
        self.values(state)
            .iter()
            .copied()
            .fold(f32::NEG_INFINITY, f32::max)
    }

    /// The action with the highest estimate in `state`
    ///
    /// Ties go to the first action in declaration order (`Up`, `Down`, `Left`, `Right`),
    /// so an untrained state always yields `Up`.
    pub fn best_action(&self, state: Pos) -> Action {
        let values = self.values(state);
        let mut best = 0;
        for (i, &v) in values.iter().enumerate().skip(1) {
            if v > values[best] {
                best = i;
            }
        }
        Action::VARIANTS[best]
    }

    /// Iterate over `(state, action, value)` for every entry
    pub fn iter(&self) -> impl Iterator<Item = (Pos, Action, f32)> + '_ {
        self.values.iter().enumerate().flat_map(move |(i, row)| {
            let state = (i / self.cols, i % self.cols);
            Action::VARIANTS
                .iter()
                .map(move |&a| (state, a, row[a.index()]))
        })
    }

    fn slot(&self, (r, c): Pos) -> usize {
        assert!(
            r < self.rows && c < self.cols,
            "State {:?} outside of the {}x{} table",
            (r, c),
            self.rows,
            self.cols
        );
        r * self.cols + c
    }
}

impl Index<(Pos, Action)> for QTable {
    type Output = f32;

    fn index(&self, (state, action): (Pos, Action)) -> &Self::Output {
        &self.values(state)[action.index()]
    }
}

/// A greedy walk through an environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rollout {
    /// Positions visited, starting with the initial state
    pub path: Vec<Pos>,
    /// Number of actions taken, rejected moves included
    pub steps: usize,
    pub reached_goal: bool,
}

/// A simple Q-learning agent that utilizes a Q-table to learn a maze
///
/// The table has one entry per cell and action of the maze it was built for.
/// Values are updated off-policy with the one step Bellman update
///
/// Q(s,a) ← (1 - α) Q(s,a) + α (r + γ max<sub>a'</sub> Q(s',a'))
///
/// and epsilon decays multiplicatively once per completed episode.
#[derive(Debug, Clone)]
pub struct QTableAgent {
    q_table: QTable,
    exploration: EpsilonGreedy<Multiplicative>,
    alpha: f32,   // learning rate
    gamma: f32,   // discount factor
    episode: u32, // completed episodes
    rng: StdRng,
}

impl QTableAgent {
    /// Initialize a new agent with a zeroed table for a `rows` by `cols` grid
    pub fn new(config: QTableAgentConfig, rows: usize, cols: usize) -> Result<Self> {
        config.validate()?;
        if rows == 0 || cols == 0 {
            return Err(Error::EmptyGrid { rows, cols });
        }
        let decay = Multiplicative::new(config.epsilon_decay, config.min_epsilon)?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            q_table: QTable::new(rows, cols),
            exploration: EpsilonGreedy::new(config.epsilon, decay)?,
            alpha: config.alpha,
            gamma: config.gamma,
            episode: 0,
            rng,
        })
    }

    /// Initialize a new agent sized for `maze`
    pub fn for_maze(config: QTableAgentConfig, maze: &Maze) -> Result<Self> {
        Self::new(config, maze.rows(), maze.cols())
    }

    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    pub fn epsilon(&self) -> f32 {
        self.exploration.epsilon()
    }

    /// Number of times epsilon has been decayed
    pub fn episode(&self) -> u32 {
        self.episode
    }

    /// Choose an action based on the current state and exploration policy
    pub fn choose_action(&mut self, state: Pos) -> Action {
        match self.exploration.choose(&mut self.rng) {
            Choice::Explore => Action::random(&mut self.rng),
            Choice::Exploit => self.q_table.best_action(state),
        }
    }

    /// The best known action, ignoring exploration
    pub fn greedy_action(&self, state: Pos) -> Action {
        self.q_table.best_action(state)
    }

    /// Learn from a given experience and update the table
    ///
    /// Only the entry for the experience's state and action changes.
    pub fn learn<E>(&mut self, experience: Exp<E>)
    where
        E: Environment<State = Pos, Action = Action>,
    {
        let Exp {
            state,
            action,
            next_state,
            reward,
        } = experience;

        let q_value = self.q_table[(state, action)];
        let max_next_q = self.q_table.max(next_state);
        let new_q_value = reward + self.gamma * max_next_q;
        let weighted_q_value = (1.0 - self.alpha) * q_value + self.alpha * new_q_value;

        trace!("Q({state:?}, {action}) {q_value} -> {weighted_q_value}");
        self.q_table.set(state, action, weighted_q_value);
    }

    /// Decay the exploration rate after a completed episode
    ///
    /// **Returns** the new epsilon
    pub fn decay_epsilon(&mut self) -> f32 {
        self.episode += 1;
        self.exploration.decay()
    }

    /// Reset `env` and follow the greedy policy for at most `max_steps` actions
    ///
    /// Neither the table nor epsilon is touched.
    pub fn greedy_rollout<E>(&self, env: &mut E, max_steps: usize) -> Rollout
    where
        E: Environment<State = Pos, Action = Action, Outcome = Outcome>,
    {
        let mut state = env.reset();
        let mut rollout = Rollout {
            path: vec![state],
            steps: 0,
            reached_goal: false,
        };

        while rollout.steps < max_steps {
            let (next, outcome) = env.step(self.greedy_action(state));
            rollout.steps += 1;
            if outcome.is_move() {
                rollout.path.push(next);
            }
            state = next;
            if outcome == Outcome::GoalReached {
                rollout.reached_goal = true;
                break;
            }
        }

        rollout
    }
}
