use std::error::Error;

use clap::Parser;
use rl_maze::{
    algo::QTableAgentConfig,
    maze::MazeConfig,
    sim::Simulation,
    train::{Status, TrainConfig},
};
use tracing_subscriber::filter::LevelFilter;

/// Solve a random maze with breadth-first search, then train a Q-learning agent on it
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(long, default_value_t = 5)]
    rows: usize,

    #[arg(long, default_value_t = 5)]
    cols: usize,

    #[arg(long, default_value_t = 0.2)]
    obstacle_probability: f32,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, default_value_t = 5000)]
    max_episodes: u32,

    #[arg(long, default_value_t = 10_000)]
    max_steps: u32,

    /// Keep generating mazes until the goal is reachable
    #[arg(long, default_value_t = false)]
    solvable: bool,

    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

const MAX_REGENERATIONS: usize = 100;

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let maze_config = MazeConfig {
        obstacle_probability: args.obstacle_probability,
        seed: args.seed,
        ..MazeConfig::new(args.rows, args.cols)
    };
    let agent_config = QTableAgentConfig {
        seed: args.seed,
        ..Default::default()
    };
    let train_config = TrainConfig {
        max_episodes: Some(args.max_episodes),
        max_steps_per_episode: Some(args.max_steps),
        ..Default::default()
    };

    let mut sim = Simulation::new(maze_config, agent_config, train_config)?;
    let mut attempts = 0;
    while args.solvable && !sim.solve().is_found() && attempts < MAX_REGENERATIONS {
        sim.regenerate()?;
        attempts += 1;
    }

    let solution = sim.solve().clone();
    println!("{}", sim.maze());
    if solution.is_found() {
        println!(
            "BFS: {} moves, {} operations",
            solution.moves(),
            solution.operations
        );
        println!("{}", sim.maze().render_with_path(&solution.path));
    } else {
        println!(
            "BFS: no path after {} operations, training will stop at the episode cap",
            solution.operations
        );
    }

    let summary = sim.train();
    println!(
        "Q-learning: {:?} after {} episodes ({} steps total), epsilon {:.3}",
        summary.status, summary.episodes, summary.total_steps, summary.epsilon
    );
    if summary.status == Status::Converged {
        println!("Final episode took {} steps", summary.final_episode_steps);
        let mut maze = sim.maze().clone();
        let rollout = sim.agent().greedy_rollout(&mut maze, args.rows * args.cols * 4);
        println!(
            "Greedy policy: {} steps, goal reached: {}",
            rollout.steps, rollout.reached_goal
        );
        println!("{}", maze.render_with_path(&rollout.path));
    }

    Ok(())
}
