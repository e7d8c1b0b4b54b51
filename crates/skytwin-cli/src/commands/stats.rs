//! Print aggregate airspace statistics.

use colored::Colorize;
use skytwin_runtime::stats::AirspaceStats;

pub fn print(stats: &AirspaceStats) {
    println!("{}", "SkyTwin Airspace Statistics".white().bold());
    println!("{}", "═".repeat(40).dimmed());
    println!();

    println!("{}", "Fleet".blue().bold());
    println!("  Tick:              {}", stats.tick.to_string().cyan());
    println!("  Drones:            {}", stats.agents.to_string().cyan());
    println!("  Active:            {}", stats.active.to_string().green());
    println!("  Negotiating:       {}", stats.negotiating.to_string().yellow());
    println!("  Rerouting:         {}", stats.rerouting.to_string().yellow());
    if stats.resolved > 0 {
        println!("  Grounded:          {}", stats.resolved.to_string().red());
    }
    println!("  Mean battery:      {:.1}%", stats.mean_battery);
    println!();

    println!("{}", "Negotiation Log".blue().bold());
    println!("  Events retained:   {}", stats.total_events.to_string().cyan());
    println!(
        "  Conflicts:         {}",
        stats.conflicts_detected.to_string().cyan()
    );
    println!(
        "  Resolutions:       {}",
        stats.resolutions_completed.to_string().cyan()
    );

    println!();
    println!("{}", "═".repeat(40).dimmed());
}
