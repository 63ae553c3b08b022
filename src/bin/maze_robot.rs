use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use qlearning_robot::action_selection::DecayMode;
use qlearning_robot::env::GridMaze;
use qlearning_robot::runner::success_rate;
use qlearning_robot::utils::moving_average;
use qlearning_robot::{Agent, AgentConfig, EpochReport, RunConfig, Runner};

extern crate structopt;

use structopt::StructOpt;
use tracing::{info, Level};

/// Train a Q-learning robot on a maze, then test its greedy policy
#[derive(StructOpt, Debug)]
#[structopt(name = "RLRust - MazeRobot")]
struct Cli {
    /// Built-in maze to use: small or medium
    #[structopt(long = "map", default_value = "small")]
    map: String,

    /// Read the maze from a file instead (S start, G goal, # wall, T trap, . free)
    #[structopt(long = "map_file", parse(from_os_str))]
    map_file: Option<PathBuf>,

    /// Number of training epochs
    #[structopt(long = "epochs", short = "n", default_value = "200")]
    epochs: usize,

    /// Number of testing epochs
    #[structopt(long = "test_epochs", default_value = "10")]
    test_epochs: usize,

    /// Maximum number of steps per epoch
    #[structopt(long = "max_steps", default_value = "100")]
    max_steps: usize,

    /// Learning rate of the robot
    #[structopt(long = "alpha", default_value = "0.5")]
    alpha: f64,

    /// Discount factor used on the temporal difference target
    #[structopt(long = "gamma", default_value = "0.9")]
    gamma: f64,

    /// Initial value for the exploration ratio
    #[structopt(long = "epsilon0", default_value = "0.5")]
    epsilon0: f64,

    /// Decay factor (exp) or decay step (linear) of the exploration ratio
    #[structopt(long = "epsilon_atten", default_value = "0.99")]
    epsilon_atten: f64,

    /// Exploration decay: exp or linear
    #[structopt(long = "epsilon_type", default_value = "exp")]
    epsilon_type: DecayMode,

    /// Seed for the robot's random choices
    #[structopt(long = "seed")]
    seed: Option<u64>,

    /// Moving average window used on the printed results
    #[structopt(long = "moving_average_window", default_value = "20")]
    moving_average_window: usize,

    /// Show a progress bar
    #[structopt(long = "progress")]
    progress: bool,

    /// Log verbosity (-v info, -vv debug, -vvv trace)
    #[structopt(short = "v", long = "verbose", parse(from_occurrences))]
    verbose: u64,
}

fn init_logging(verbose: u64) {
    let level: Level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn load_maze(cli: &Cli) -> Result<GridMaze> {
    let maze: GridMaze = match &cli.map_file {
        Some(path) => {
            let text: String = fs::read_to_string(path)
                .with_context(|| format!("cannot read {}", path.display()))?;
            GridMaze::parse(&text).with_context(|| format!("bad maze in {}", path.display()))?
        }
        None => match cli.map.as_str() {
            "small" => GridMaze::new(&GridMaze::MAP_SMALL)?,
            "medium" => GridMaze::new(&GridMaze::MAP_MEDIUM)?,
            other => bail!("unknown map {:?}, expected small or medium", other),
        },
    };
    Ok(maze)
}

fn summarize(label: &str, reports: &[EpochReport], window: usize) {
    let rewards: Vec<f64> = reports.iter().map(|r| r.total_reward).collect();
    let steps: Vec<f64> = reports.iter().map(|r| r.steps as f64).collect();
    println!("{} success rate: {:.2}", label, success_rate(reports));
    println!("{} reward (moving average): {:.2?}", label, moving_average(window, &rewards));
    println!("{} steps (moving average): {:.2?}", label, moving_average(window, &steps));
}

fn run(cli: Cli) -> Result<()> {
    let mut env: GridMaze = load_maze(&cli)?;
    let config = AgentConfig {
        alpha: cli.alpha,
        gamma: cli.gamma,
        epsilon0: cli.epsilon0,
        epsilon_atten: cli.epsilon_atten,
        decay_mode: cli.epsilon_type,
        seed: cli.seed,
    };
    let mut agent: Agent<GridMaze> = Agent::new(&env, config)?;

    let trainer = Runner::new(RunConfig {
        epochs: cli.epochs,
        max_steps: cli.max_steps,
        progress: cli.progress,
    });
    let now: Instant = Instant::now();
    let train_reports: Vec<EpochReport> = trainer
        .train(&mut agent, &mut env)
        .context("training failed")?;
    info!(
        "training done in {:.2?}: {} states, epsilon={:.4}, t={}",
        now.elapsed(),
        agent.q_table().len(),
        agent.epsilon(),
        agent.step_count()
    );

    let tester = Runner::new(RunConfig {
        epochs: cli.test_epochs,
        max_steps: cli.max_steps,
        progress: cli.progress,
    });
    let test_reports: Vec<EpochReport> = tester
        .test(&mut agent, &mut env)
        .context("testing failed")?;

    summarize("train", &train_reports, cli.moving_average_window);
    summarize("test", &test_reports, cli.moving_average_window);
    Ok(())
}

fn main() -> Result<()> {
    let cli: Cli = Cli::from_args();
    init_logging(cli.verbose);
    run(cli)
}
