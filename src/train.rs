use log::{debug, info, warn};

use crate::{
    algo::tabular::QTableAgent,
    ensure_interval,
    env::Environment,
    error::Result,
    grid::Pos,
    maze::{Action, Outcome},
    memory::Exp,
};

/// Reward assigned to each transition outcome
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rewards {
    /// **Default**: `100.0`
    pub goal: f32,
    /// **Default**: `-5.0`
    pub wall: f32,
    /// Any other outcome, boundary hits included
    ///
    /// **Default**: `-1.0`
    pub step: f32,
}

impl Default for Rewards {
    fn default() -> Self {
        Self {
            goal: 100.0,
            wall: -5.0,
            step: -1.0,
        }
    }
}

impl Rewards {
    pub fn reward(&self, outcome: Outcome) -> f32 {
        match outcome {
            Outcome::GoalReached => self.goal,
            Outcome::HitWall => self.wall,
            Outcome::Moved | Outcome::HitBoundary => self.step,
        }
    }
}

/// Configuration for the [`Trainer`]
#[derive(Debug, Clone, PartialEq)]
pub struct TrainConfig {
    pub rewards: Rewards,
    /// Training stops once epsilon falls below this value after an episode
    ///
    /// **Default**: `0.1`
    pub convergence_epsilon: f32,
    /// Stop after this many episodes, counting truncated ones
    ///
    /// **Default**: `Some(5000)`
    pub max_episodes: Option<u32>,
    /// Abandon an episode after this many steps and start over
    ///
    /// **Default**: `Some(10_000)`
    pub max_steps_per_episode: Option<u32>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            rewards: Rewards::default(),
            convergence_epsilon: 0.1,
            max_episodes: Some(5000),
            max_steps_per_episode: Some(10_000),
        }
    }
}

impl TrainConfig {
    /// No caps: training only ends by converging
    pub fn uncapped() -> Self {
        Self {
            max_episodes: None,
            max_steps_per_episode: None,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure_interval!(self.convergence_epsilon, 0.0, 1.0);
        Ok(())
    }
}

/// Where training stands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Status {
    #[default]
    Idle,
    Running,
    /// Epsilon fell below the convergence threshold
    Converged,
    /// The episode cap was reached first
    Exhausted,
}

/// What a single training step did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    /// A step inside an episode
    Step { state: Pos, action: Action, outcome: Outcome },
    /// The goal was reached and the next episode starts from the start position
    EpisodeEnd { steps: u32, epsilon: f32 },
    /// The step cap was hit and the episode starts over
    Truncated { steps: u32 },
    /// The goal was reached with epsilon below the threshold; the agent stays at the goal
    Converged { steps: u32, epsilon: f32 },
    /// The episode cap was reached
    Exhausted { episodes: u32 },
}

/// Totals of a training run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainSummary {
    pub status: Status,
    pub episodes: u32,
    pub total_steps: u64,
    /// Steps taken in the last episode
    pub final_episode_steps: u32,
    pub epsilon: f32,
}

/// Drives the observe, act, learn loop of a [`QTableAgent`] in an environment
///
/// Owns the episode and step counters. One call to [`Trainer::tick`] performs one
/// simulated step; an episode ends when the goal is reached.
#[derive(Debug, Clone)]
pub struct Trainer {
    config: TrainConfig,
    status: Status,
    episode: u32,
    steps: u32,
    total_steps: u64,
}

impl Trainer {
    pub fn new(config: TrainConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            status: Status::Idle,
            episode: 0,
            steps: 0,
            total_steps: 0,
        })
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == Status::Running
    }

    /// Index of the current episode
    pub fn episode(&self) -> u32 {
        self.episode
    }

    /// Steps taken in the current episode
    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Start or resume training: the environment goes back to its start and the step counter is cleared
    pub fn begin<E: Environment>(&mut self, env: &mut E) {
        env.reset();
        self.steps = 0;
        self.status = match self.config.max_episodes {
            Some(max) if self.episode >= max => Status::Exhausted,
            _ => Status::Running,
        };
    }

    /// Pause training, keeping counters and the environment as they are
    pub fn pause(&mut self) {
        if self.status == Status::Running {
            self.status = Status::Idle;
        }
    }

    /// Perform one training step
    ///
    /// **Returns** `None` if training is not running
    pub fn tick<E>(&mut self, agent: &mut QTableAgent, env: &mut E) -> Option<Event>
    where
        E: Environment<State = Pos, Action = Action, Outcome = Outcome>,
    {
        if !self.is_running() {
            return None;
        }

        self.steps = self.steps.saturating_add(1);
        self.total_steps = self.total_steps.saturating_add(1);

        let state = env.state();
        let action = agent.choose_action(state);
        let (next_state, outcome) = env.step(action);
        let reward = self.config.rewards.reward(outcome);

        agent.learn(Exp::<E> {
            state,
            action,
            next_state,
            reward,
        });

        if outcome == Outcome::GoalReached {
            let epsilon = agent.decay_epsilon();
            if epsilon < self.config.convergence_epsilon {
                self.status = Status::Converged;
                info!(
                    "Converged after {} episodes, final path {} steps, epsilon {:.3}",
                    self.episode + 1,
                    self.steps,
                    epsilon
                );
                return Some(Event::Converged {
                    steps: self.steps,
                    epsilon,
                });
            }

            debug!(
                "Episode {} reached the goal in {} steps, epsilon {:.3}",
                self.episode, self.steps, epsilon
            );
            let steps = self.steps;
            return Some(self.next_episode(env).unwrap_or(Event::EpisodeEnd { steps, epsilon }));
        }

        if let Some(max) = self.config.max_steps_per_episode {
            if self.steps >= max {
                let steps = self.steps;
                debug!("Episode {} truncated after {} steps", self.episode, steps);
                return Some(self.next_episode(env).unwrap_or(Event::Truncated { steps }));
            }
        }

        Some(Event::Step {
            state,
            action,
            outcome,
        })
    }

    /// Run until training converges or hits a cap
    ///
    /// Without caps this never returns for a maze whose goal is unreachable.
    pub fn run<E>(&mut self, agent: &mut QTableAgent, env: &mut E) -> TrainSummary
    where
        E: Environment<State = Pos, Action = Action, Outcome = Outcome>,
    {
        if !self.is_running() {
            self.begin(env);
        }
        while self.tick(agent, env).is_some() {}

        self.summary(agent)
    }

    pub fn summary(&self, agent: &QTableAgent) -> TrainSummary {
        TrainSummary {
            status: self.status,
            episodes: self.episode + u32::from(self.status == Status::Converged),
            total_steps: self.total_steps,
            final_episode_steps: self.steps,
            epsilon: agent.epsilon(),
        }
    }

    /// Reset for a new episode, or stop if the episode cap is reached
    ///
    /// **Returns** `Some` if training stopped
    fn next_episode<E: Environment>(&mut self, env: &mut E) -> Option<Event> {
        self.episode += 1;
        if let Some(max) = self.config.max_episodes {
            if self.episode >= max {
                self.status = Status::Exhausted;
                warn!("Stopped after {} episodes without converging", self.episode);
                return Some(Event::Exhausted {
                    episodes: self.episode,
                });
            }
        }
        env.reset();
        self.steps = 0;
        None
    }
}
