use log::info;
use rand::{rngs::StdRng, SeedableRng};

use crate::{
    algo::{
        tabular::{QTableAgent, QTableAgentConfig},
        BfsSolver, Solution,
    },
    env::Environment,
    error::Result,
    grid::{Cell, Pos},
    maze::{Action, Maze, MazeConfig, Outcome},
    train::{Event, TrainConfig, TrainSummary, Trainer},
};

/// A maze together with both decision engines and the training loop state
///
/// This is the surface a front end drives: it answers queries about the maze and the
/// agent and takes commands to solve, step, train, and regenerate.
#[derive(Debug)]
pub struct Simulation {
    maze_config: MazeConfig,
    agent_config: QTableAgentConfig,
    maze: Maze,
    agent: QTableAgent,
    trainer: Trainer,
    solver: BfsSolver,
    solution: Option<Solution>,
    rng: StdRng,
}

impl Simulation {
    pub fn new(
        maze_config: MazeConfig,
        agent_config: QTableAgentConfig,
        train_config: TrainConfig,
    ) -> Result<Self> {
        let mut rng = match maze_config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let maze = Maze::generate_with(&maze_config, &mut rng)?;
        let agent = QTableAgent::for_maze(agent_config.clone(), &maze)?;
        let trainer = Trainer::new(train_config)?;

        Ok(Self {
            maze_config,
            agent_config,
            maze,
            agent,
            trainer,
            solver: BfsSolver::new(),
            solution: None,
            rng,
        })
    }

    /// Use `maze` instead of a generated layout
    pub fn with_maze(mut self, maze: Maze) -> Result<Self> {
        self.agent = QTableAgent::for_maze(self.agent_config.clone(), &maze)?;
        self.trainer = Trainer::new(self.trainer.config().clone())?;
        self.maze = maze;
        self.solution = None;
        Ok(self)
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    pub fn agent(&self) -> &QTableAgent {
        &self.agent
    }

    pub fn trainer(&self) -> &Trainer {
        &self.trainer
    }

    /// Current agent position
    pub fn pos(&self) -> Pos {
        self.maze.pos()
    }

    pub fn cell(&self, pos: Pos) -> Option<Cell> {
        self.maze.cell(pos)
    }

    pub fn start(&self) -> Pos {
        self.maze.start()
    }

    pub fn goal(&self) -> Pos {
        self.maze.goal()
    }

    pub fn epsilon(&self) -> f32 {
        self.agent.epsilon()
    }

    pub fn episode(&self) -> u32 {
        self.trainer.episode()
    }

    pub fn steps(&self) -> u32 {
        self.trainer.steps()
    }

    pub fn is_training(&self) -> bool {
        self.trainer.is_running()
    }

    /// Run the shortest path search and keep its result
    pub fn solve(&mut self) -> &Solution {
        let solution = self.solver.solve_maze(&self.maze);
        self.solution.insert(solution)
    }

    /// The last search result, if any
    pub fn solution(&self) -> Option<&Solution> {
        self.solution.as_ref()
    }

    /// Operations spent by the last search, `0` before any search
    pub fn bfs_operations(&self) -> usize {
        self.solution.as_ref().map_or(0, |s| s.operations)
    }

    /// Number of positions on the last found path, `0` if none
    pub fn bfs_path_len(&self) -> usize {
        self.solution.as_ref().map_or(0, |s| s.path.len())
    }

    /// Apply an action to the maze directly
    pub fn step(&mut self, action: Action) -> (Pos, Outcome) {
        self.maze.step(action)
    }

    /// Apply a user move, ignored while training runs
    pub fn manual_step(&mut self, action: Action) -> Option<(Pos, Outcome)> {
        (!self.is_training()).then(|| self.maze.step(action))
    }

    /// Send the agent back to the start
    pub fn reset(&mut self) -> Pos {
        self.maze.reset()
    }

    /// Switch training on or off
    ///
    /// Switching on restarts the current episode from the start position.
    ///
    /// **Returns** whether training is now running
    pub fn toggle_training(&mut self) -> bool {
        if self.trainer.is_running() {
            self.trainer.pause();
        } else {
            self.trainer.begin(&mut self.maze);
        }
        self.trainer.is_running()
    }

    /// Perform one training step, `None` when training is not running
    pub fn tick(&mut self) -> Option<Event> {
        self.trainer.tick(&mut self.agent, &mut self.maze)
    }

    /// Train until convergence or a cap
    pub fn train(&mut self) -> TrainSummary {
        self.trainer.run(&mut self.agent, &mut self.maze)
    }

    /// Replace the maze, agent, and training state with fresh ones
    pub fn regenerate(&mut self) -> Result<()> {
        let maze = Maze::generate_with(&self.maze_config, &mut self.rng)?;
        self.agent = QTableAgent::for_maze(self.agent_config.clone(), &maze)?;
        self.trainer = Trainer::new(self.trainer.config().clone())?;
        self.maze = maze;
        self.solution = None;
        info!("Regenerated maze, epsilon reset to {}", self.agent.epsilon());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{grid::Grid, train::Status};

    fn sim(seed: u64) -> Simulation {
        let maze_config = MazeConfig {
            seed: Some(seed),
            ..Default::default()
        };
        let agent_config = QTableAgentConfig {
            seed: Some(seed),
            ..Default::default()
        };
        Simulation::new(maze_config, agent_config, TrainConfig::default()).unwrap()
    }

    fn open_sim() -> Simulation {
        let maze = Maze::from_grid(Grid::new(5, 5).unwrap(), (0, 0), (4, 4)).unwrap();
        sim(0).with_maze(maze).unwrap()
    }

    #[test]
    fn queries() {
        let sim = sim(9);
        assert_eq!(sim.start(), (0, 0));
        assert_eq!(sim.goal(), (4, 4));
        assert_eq!(sim.pos(), sim.start());
        assert_eq!(sim.cell(sim.goal()), Some(Cell::Free));
        assert_eq!(sim.cell((5, 0)), None);
        assert_eq!(sim.epsilon(), 1.0);
        assert_eq!((sim.episode(), sim.steps()), (0, 0));
        assert!(!sim.is_training());
    }

    #[test]
    fn solve_records_stats() {
        let mut sim = open_sim();
        assert_eq!((sim.bfs_operations(), sim.bfs_path_len()), (0, 0));
        let moves = sim.solve().moves();
        assert_eq!(moves, 8);
        assert_eq!(sim.bfs_path_len(), 9, "Positions on the path");
        assert!(sim.bfs_operations() > 0);
    }

    #[test]
    fn manual_control_blocked_while_training() {
        let mut sim = open_sim();
        assert_eq!(sim.manual_step(Action::Right), Some(((0, 1), Outcome::Moved)));

        assert!(sim.toggle_training(), "Training switched on");
        assert_eq!(sim.pos(), (0, 0), "Training restarts from the start");
        assert_eq!(sim.manual_step(Action::Right), None, "Manual move ignored");
        assert!(sim.tick().is_some());
        assert_eq!(sim.steps(), 1);

        assert!(!sim.toggle_training(), "Training switched off");
        assert_eq!(sim.tick(), None);
        assert!(sim.manual_step(Action::Down).is_some());
    }

    #[test]
    fn train_to_convergence() {
        let mut sim = open_sim();
        let summary = sim.train();
        assert_eq!(summary.status, Status::Converged);
        assert!(sim.epsilon() < 0.1);
        assert_eq!(sim.pos(), sim.goal());
        assert!(!sim.is_training());
    }

    #[test]
    fn regenerate_resets_everything() {
        let mut sim = sim(12);
        sim.solve();
        sim.toggle_training();
        for _ in 0..500 {
            sim.tick();
        }
        assert!(sim.steps() > 0 || sim.episode() > 0);

        sim.regenerate().unwrap();
        assert_eq!(sim.epsilon(), 1.0, "Fresh agent");
        assert!(
            sim.agent().q_table().iter().all(|(_, _, v)| v == 0.0),
            "Fresh table"
        );
        assert_eq!((sim.episode(), sim.steps()), (0, 0), "Counters cleared");
        assert!(!sim.is_training(), "Training stopped");
        assert!(sim.solution().is_none(), "Solution cleared");
        assert_eq!(sim.pos(), sim.start());
        assert!(sim.cell(sim.start()) == Some(Cell::Free) && sim.cell(sim.goal()) == Some(Cell::Free));
    }
}
