use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;
use efor::{DashboardStats, Directory, RequestStore};
use tracing::instrument;

use super::terminal::{Colorize, is_narrow};

#[derive(Debug, Parser, Default)]
#[command(about = "Show request counts, hours and deadline pressure")]
pub struct Dashboard {
    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,

    /// Suppress headers and format for scripting
    #[arg(long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl Dashboard {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf, today: NaiveDate) -> anyhow::Result<()> {
        let directory = Directory::new(root)?;
        let requests = directory.store().requests();

        let stats = DashboardStats::collect(requests, directory.config(), today);

        match self.output {
            OutputFormat::Json => println!("{}", self.render_json(&stats)?),
            OutputFormat::Table if self.quiet => output_quiet(&stats),
            OutputFormat::Table if requests.is_empty() => {
                println!("No requests found yet. Create one with 'efor create'.");
            }
            OutputFormat::Table => output_table(&stats),
        }

        Ok(())
    }

    fn render_json(&self, stats: &DashboardStats) -> serde_json::Result<String> {
        if self.quiet {
            serde_json::to_string(stats)
        } else {
            serde_json::to_string_pretty(stats)
        }
    }
}

fn output_quiet(stats: &DashboardStats) {
    println!(
        "total={} in_progress={} overdue={} approaching={} hours={:.1}",
        stats.total_requests,
        stats.in_progress,
        stats.overdue,
        stats.approaching,
        stats.total_hours
    );
}

fn output_table(stats: &DashboardStats) {
    let narrow = is_narrow();

    println!("Requests");
    println!("{}", "────────".dim());
    println!("Total:        {}", stats.total_requests);
    println!("In progress:  {}", stats.in_progress);

    if stats.overdue == 0 {
        println!("Overdue:      {} ✅", "0".success());
    } else {
        println!("Overdue:      {} ⚠️", stats.overdue.to_string().danger());
    }
    if stats.approaching == 0 {
        println!("Approaching:  {}", "0".success());
    } else {
        println!("Approaching:  {}", stats.approaching.to_string().warning());
    }
    println!();

    println!("Hours");
    println!("{}", "─────".dim());
    let phases = [
        ("Analyst", stats.phase_hours.analyst),
        ("Developer", stats.phase_hours.developer),
        ("KKT", stats.phase_hours.acceptance_test),
        ("Preprod", stats.phase_hours.preprod),
    ];
    if narrow {
        for (phase, hours) in phases {
            println!("{phase}: {hours:.1}");
        }
    } else {
        for (phase, hours) in phases {
            println!("{phase:<12}  {hours:>8.1}");
        }
    }
    println!("{:<12}  {:>8.1}", "Total", stats.total_hours);
    println!();

    println!("By size");
    println!("{}", "───────".dim());
    for (size, count) in &stats.size_distribution {
        let label = format!("{:<10}", size.label()).sized(*size);
        println!("{label}  {count}");
    }
    println!();

    println!("By status");
    println!("{}", "─────────".dim());
    for (status, count) in stats.status_distribution.iter().filter(|(_, c)| **c > 0) {
        println!("{:<14}  {count}", status.label());
    }
}
