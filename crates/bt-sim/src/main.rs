//! bt-sim - headless behavior tree driver.
//!
//! Spawns a crowd of guard agents from one prototype tree, ticks them on a fixed step and
//! reports outcome counts and node pool usage:
//! - `bt-sim run` - simulate (the default)
//! - `bt-sim config` - print the resolved configuration as YAML

mod config;
mod guard;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use bt_core::{OwnerContext, TickContext};
use bt_runtime::{NodePool, PoolStats, TickSummary, TreeRunner};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::SimConfig;
use crate::guard::{Guard, Patrol};

#[derive(Parser)]
#[command(name = "bt-sim")]
#[command(about = "Behavior tree crowd simulation", version)]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Number of agents (overrides the config file)
    #[arg(long, global = true)]
    agents: Option<u64>,

    /// Number of ticks (overrides the config file)
    #[arg(long, global = true)]
    ticks: Option<u64>,

    /// Fixed step in seconds (overrides the config file)
    #[arg(long, global = true)]
    dt: Option<f32>,

    /// Threat schedule seed (overrides the config file)
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Tick each agent every N ticks, staggered by agent id
    #[arg(long, global = true)]
    think_every: Option<u32>,

    /// Print the final report as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the simulation
    Run,

    /// Print the resolved configuration
    Config,
}

#[derive(Debug, Serialize)]
struct Report {
    agents: u64,
    ticks: u64,
    totals: TickSummary,
    pool: PoolStats,
    shots: i64,
    distance_walked: f32,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    if cli.log_json {
        fmt().json().with_env_filter(filter).with_target(false).init();
    } else {
        fmt().with_env_filter(filter).with_target(false).init();
    }

    let config = resolve_config(&cli)?;

    match cli.command {
        Some(Commands::Config) => {
            print!("{}", serde_yaml::to_string(&config)?);
            Ok(())
        }
        Some(Commands::Run) | None => {
            let report = run(&config)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
            Ok(())
        }
    }
}

fn resolve_config(cli: &Cli) -> Result<SimConfig> {
    let mut config = match &cli.config {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };

    if let Some(agents) = cli.agents {
        config.agents = agents;
    }
    if let Some(ticks) = cli.ticks {
        config.ticks = ticks;
    }
    if let Some(dt) = cli.dt {
        config.dt_seconds = dt;
    }
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if let Some(every) = cli.think_every {
        config.runner.think_every_ticks = every;
        config.runner.stagger = true;
    }

    config.validate()?;
    Ok(config)
}

fn run(config: &SimConfig) -> Result<Report> {
    let prototype =
        guard::prototype(config.linger_seconds).context("Failed to build guard tree")?;
    let pool = Arc::new(NodePool::with_config(config.pool));
    let copies = usize::try_from(config.agents).unwrap_or(usize::MAX);
    pool.prewarm(&prototype, copies);
    tracing::info!(
        nodes = prototype.len(),
        agents = config.agents,
        free = pool.total_free(),
        "Prototype ready"
    );

    let mut runner = TreeRunner::new(Arc::clone(&pool), config.runner);
    for id in 0..config.agents {
        runner
            .spawn(id, &prototype, OwnerContext::new(Guard::new(id)))
            .with_context(|| format!("Failed to spawn agent {id}"))?;
    }

    let mut totals = TickSummary::default();
    let mut ctx = TickContext::new(0, config.dt_seconds);
    for _ in 0..config.ticks {
        for id in 0..config.agents {
            if let Some(bb) = runner.blackboard_mut(id) {
                bb.set_bool(guard::THREAT, guard::threat_at(config.seed, id, ctx.tick));
            }
        }

        let summary = runner.tick(&ctx);
        tracing::debug!(
            tick = ctx.tick,
            ticked = summary.ticked,
            running = summary.running,
            success = summary.success,
            failure = summary.failure,
            "Tick"
        );
        totals += summary;
        ctx = ctx.next();
    }

    let shots = (0..config.agents)
        .filter_map(|id| runner.blackboard(id))
        .map(|bb| bb.get_int(guard::SHOTS, 0))
        .sum();
    let distance_walked = (0..config.agents)
        .filter_map(|id| runner.tree(id))
        .filter_map(|tree| tree.iter().find_map(|n| n.behavior::<Patrol>()))
        .map(Patrol::walked)
        .sum();

    runner.stop_all();
    for id in 0..config.agents {
        runner.despawn(id);
    }
    tracing::info!(free = pool.total_free(), "Agents despawned");

    Ok(Report {
        agents: config.agents,
        ticks: config.ticks,
        totals,
        pool: pool.stats(),
        shots,
        distance_walked,
    })
}

fn print_report(report: &Report) {
    println!("Simulated {} agents for {} ticks", report.agents, report.ticks);
    println!();
    println!("Ticks:");
    println!("  ticked:   {}", report.totals.ticked);
    println!("  skipped:  {}", report.totals.skipped);
    println!("  running:  {}", report.totals.running);
    println!("  success:  {}", report.totals.success);
    println!("  failure:  {}", report.totals.failure);
    println!();
    println!("Node pool:");
    println!("  hits:     {}", report.pool.hits);
    println!("  misses:   {}", report.pool.misses);
    println!("  released: {}", report.pool.released);
    println!("  dropped:  {}", report.pool.dropped);
    println!();
    println!("Shots fired:     {}", report.shots);
    println!("Distance walked: {:.1}", report.distance_walked);
}
