use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;
use efor::{
    Derived, Directory, Request, RequestId, RequestStore,
    domain::{compute_derived, deadline::days_until},
};
use serde_json::json;
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Parser)]
#[command(about = "Display a request with its effort and deadline figures")]
pub struct Show {
    /// The request to display (`12` or `#12`)
    id: RequestId,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "pretty")]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Pretty,
    Json,
}

impl Show {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf, today: NaiveDate) -> anyhow::Result<()> {
        let directory = Directory::new(root)?;

        let Some(request) = directory.store().get(self.id) else {
            anyhow::bail!("request {} not found", self.id);
        };
        let derived = compute_derived(request, directory.config(), today);

        match self.output {
            OutputFormat::Pretty => output_pretty(request, &derived, today),
            OutputFormat::Json => {
                let output = json!({
                    "request": request,
                    "derived": derived,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
        }

        Ok(())
    }
}

fn output_pretty(request: &Request, derived: &Derived, today: NaiveDate) {
    println!("{} {}", request.id, request.name);
    if !request.description.is_empty() {
        println!("{}", request.description.dim());
    }
    println!();

    println!("{}", "Metadata".dim());
    println!("  Status:    {}", request.status);
    println!("  Priority:  {}", request.priority.label());
    println!(
        "  Created:   {}{}",
        request.created_date.format("%Y-%m-%d %H:%M"),
        by(&request.created_by)
    );
    println!(
        "  Modified:  {}{}",
        request.last_modified.format("%Y-%m-%d %H:%M"),
        by(&request.last_modified_by)
    );
    println!();

    println!("{}", "Effort".dim());
    println!("  Analyst:   {:.1}h", request.hours.analyst);
    println!("  Developer: {:.1}h", request.hours.developer);
    println!("  KKT:       {:.1}h", request.hours.acceptance_test);
    println!("  Preprod:   {:.1}h", request.hours.preprod);
    println!(
        "  Total:     {:.1}h ({:.1} man-days)",
        derived.total_hours,
        derived.man_days_display()
    );
    println!("  Size:      {}", derived.size.label().sized(derived.size));
    println!("  Points:    {}", derived.story_points);
    println!();

    println!("{}", "Deadlines".dim());
    match request.deadline {
        Some(deadline) => {
            let days = days_until(deadline, today);
            let when = if days < 0 {
                format!("{} days late", -days)
            } else {
                format!("in {days} days")
            };
            println!(
                "  Delivery:  {deadline} ({})",
                format!("{}, {when}", derived.deadline_status).deadline(derived.deadline_status)
            );
            println!(
                "  Schedule:  {}",
                derived.schedule_risk.to_string().risk(derived.schedule_risk)
            );
        }
        None => println!("  Delivery:  {}", "none".dim()),
    }
    if let Some(kkt_deadline) = request.kkt_deadline {
        println!("  KKT:       {kkt_deadline}");
    }
}

fn by(author: &str) -> String {
    if author.is_empty() {
        String::new()
    } else {
        format!(" by {author}")
    }
}
