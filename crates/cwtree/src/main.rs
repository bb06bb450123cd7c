//! `cwtree` command-line driver
//!
//! Grows a Calkin-Wilf tree with a worker pool and reports on it as text.
//! `run` grows for a fixed time; `repl` gives a line console for pausing,
//! stepping and inspecting the tree while it grows.

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use cwtree::{
    render_to_depth, telemetry, GrowthConfig, NodeId, Rational, SharedGrowth, Status, WorkerPool,
};

#[derive(Parser, Debug)]
#[command(name = "cwtree", version, about = "Grow the Calkin-Wilf tree concurrently")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Command,
}

/// Command-line overrides applied on top of the config file.
#[derive(Args, Debug)]
struct Overrides {
    /// JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Root value, as `n/d` or `n`
    #[arg(long, global = true)]
    start: Option<Rational>,

    /// Number of worker threads
    #[arg(long, global = true)]
    workers: Option<usize>,

    /// Worker sleep before each attempt, in milliseconds
    #[arg(long, global = true)]
    step_delay_ms: Option<u64>,

    /// Worker poll interval while paused, in milliseconds
    #[arg(long, global = true)]
    pause_delay_ms: Option<u64>,
}

impl Overrides {
    fn resolve(&self) -> Result<GrowthConfig> {
        let mut config = match &self.config {
            Some(path) => GrowthConfig::load(path)?,
            None => GrowthConfig::default(),
        };
        if let Some(start) = self.start {
            config.start = start;
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(ms) = self.step_delay_ms {
            config.step_delay_ms = ms;
        }
        if let Some(ms) = self.pause_delay_ms {
            config.pause_delay_ms = ms;
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Grow for a fixed time, then print the status
    Run {
        /// How long to grow, in milliseconds
        #[arg(long, default_value_t = 1000)]
        duration_ms: u64,

        /// Also print the tree, down to this many levels below the root
        #[arg(long)]
        tree: Option<usize>,
    },

    /// Interactive console; growth starts paused
    Repl,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init(cli.verbose);
    let config = cli.overrides.resolve()?;

    match cli.command {
        Command::Run { duration_ms, tree } => run(&config, Duration::from_millis(duration_ms), tree),
        Command::Repl => repl(&config),
    }
}

fn run(config: &GrowthConfig, duration: Duration, tree: Option<usize>) -> Result<()> {
    let growth = SharedGrowth::from_config(config)?;
    let pool = WorkerPool::spawn(&growth, config)?;
    thread::sleep(duration);
    let report = pool.shutdown()?;

    print_status(&growth.status()?);
    println!("Steps per worker={:?}", report.steps);

    let violations = growth.with_state(|state| state.audit())?;
    if !violations.is_empty() {
        anyhow::bail!("tree failed audit: {violations:?}");
    }
    if let Some(depth) = tree {
        let text = growth.with_state(|state| render_to_depth(state.arena(), NodeId::ROOT, depth))??;
        println!("{text}");
    }
    Ok(())
}

const HELP: &str = "commands: pause | resume | step [n] | status | bounds | tree [depth] | help | quit";

fn repl(config: &GrowthConfig) -> Result<()> {
    let growth = SharedGrowth::from_config(config)?;
    growth.pause()?;
    let pool = WorkerPool::spawn(&growth, config)?;
    let mut editor = DefaultEditor::new().context("failed to start line editor")?;
    println!("{HELP}");

    loop {
        let line = match editor.readline("cwtree> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Err(err) = editor.add_history_entry(line) {
            tracing::debug!(error = %err, "history entry not recorded");
        }

        let mut words = line.split_whitespace();
        let command = words.next().unwrap_or_default();
        match dispatch(&growth, command, words.next()) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            Err(err) => println!("error: {err:#}"),
        }
    }

    let report = pool.shutdown()?;
    print_status(&growth.status()?);
    println!("Steps per worker={:?}", report.steps);
    Ok(())
}

enum Flow {
    Continue,
    Quit,
}

fn dispatch(growth: &SharedGrowth, command: &str, arg: Option<&str>) -> Result<Flow> {
    match command {
        "pause" => growth.pause()?,
        "resume" => growth.resume()?,
        "step" => {
            let count = arg.map(str::parse::<usize>).transpose()?.unwrap_or(1);
            for _ in 0..count {
                if let Some(expansion) = growth.expand_one_step()? {
                    let (left, centre, right) = expansion.values;
                    println!("{centre} -> {left}, {right}");
                }
            }
        }
        "status" => print_status(&growth.status()?),
        "bounds" => {
            let bounds = growth.compute_bounds()?;
            println!(
                "Lower={} ({})  Upper={} ({})",
                bounds.leftmost.value, bounds.lower, bounds.rightmost.value, bounds.upper
            );
        }
        "tree" => {
            let depth = arg.map(str::parse::<usize>).transpose()?.unwrap_or(3);
            let text =
                growth.with_state(|state| render_to_depth(state.arena(), NodeId::ROOT, depth))??;
            println!("{text}");
        }
        "help" => println!("{HELP}"),
        "quit" | "exit" => return Ok(Flow::Quit),
        other => println!("unknown command {other:?}; {HELP}"),
    }
    Ok(Flow::Continue)
}

fn print_status(status: &Status) {
    println!("Count={}", status.count);
    println!("Iterations={}", status.iterations);
    println!("Frontier={}", status.frontier);
    println!(
        "Lower={}  Upper={}",
        status.bounds.leftmost.value, status.bounds.rightmost.value
    );
    if status.paused {
        println!("(paused)");
    }
}
