//! Run the airspace simulation headless.

use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use skytwin_core::types::{EventKind, NegotiationEvent, Priority};
use skytwin_runtime::airspace::Airspace;
use skytwin_runtime::config::AirspaceConfig;
use tracing::debug;

use crate::commands::stats;
use crate::config::Config;

/// Command-line overrides for a run.
#[derive(Debug, Default)]
pub struct RunOptions {
    pub ticks: Option<u64>,
    pub seed: Option<u64>,
    pub agents: Option<usize>,
    pub compact: bool,
    pub json: bool,
    pub verbose: bool,
}

pub fn run(opts: RunOptions) -> Result<()> {
    let config = Config::load()?;
    let ticks = opts.ticks.unwrap_or(config.run.ticks);
    let airspace_config = apply_overrides(config.airspace, &opts);
    debug!(?airspace_config, ticks, "starting headless run");

    let mut airspace = Airspace::new(airspace_config).context("Invalid airspace config")?;

    if opts.json {
        airspace.run(ticks);
        let json = serde_json::to_string_pretty(&airspace.snapshot())
            .context("Failed to serialize snapshot")?;
        println!("{}", json);
        return Ok(());
    }

    println!(
        "{} Running {} drones for {} ticks...",
        "→".blue(),
        airspace.agents().len().to_string().cyan(),
        ticks.to_string().cyan()
    );

    let pb = ProgressBar::new(ticks);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ticks")
            .context("Invalid progress template")?
            .progress_chars("#>-"),
    );

    for _ in 0..ticks {
        let report = airspace.tick();
        if opts.verbose {
            for event in &report.events {
                pb.println(format_event(event));
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    println!("{} Simulation complete!", "✓".green().bold());
    println!();
    stats::print(&airspace.stats());

    Ok(())
}

/// Layer command-line flags over the file config. `--compact` replaces the
/// fleet size, `--agents` wins over both.
fn apply_overrides(mut config: AirspaceConfig, opts: &RunOptions) -> AirspaceConfig {
    if opts.compact {
        config.agent_count = AirspaceConfig::compact().agent_count;
    }
    if let Some(agents) = opts.agents {
        config.agent_count = agents;
    }
    if let Some(seed) = opts.seed {
        config.seed = Some(seed);
    }
    config
}

fn format_event(event: &NegotiationEvent) -> String {
    let kind = match event.kind {
        EventKind::ConflictDetected => "CONFLICT".red(),
        EventKind::PriorityExchange => "PRIORITY".magenta(),
        EventKind::PathNegotiation => "NEGOTIATE".yellow(),
        EventKind::ResolutionComplete => "RESOLVED".green(),
    };
    let priority = match event.priority {
        Priority::High => "high".red(),
        Priority::Medium => "medium".yellow(),
        Priority::Low => "low".dimmed(),
    };
    format!(
        "  [{:>5}] {} {:<9} {} ({})",
        event.tick,
        event.id.to_string().dimmed(),
        kind,
        event.description,
        priority
    )
}
