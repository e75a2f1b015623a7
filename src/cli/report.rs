use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;
use efor::{Directory, RequestStore, domain::dashboard::RequestSummary};
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Parser, Default)]
#[command(about = "Show totals, averages, recent activity and upcoming deadlines")]
pub struct Report {
    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl Report {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf, today: NaiveDate) -> anyhow::Result<()> {
        let directory = Directory::new(root)?;
        let report = efor::Report::collect(directory.store().requests(), directory.config(), today);

        match self.output {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            OutputFormat::Table => output_table(&report, directory.config().upcoming_days()),
        }

        Ok(())
    }
}

fn output_table(report: &efor::Report, upcoming_days: u32) {
    println!("Summary");
    println!("{}", "───────".dim());
    println!("Requests:      {}", report.total_requests);
    println!("Completed:     {}", report.completed);
    println!("In progress:   {}", report.in_progress);
    if report.overdue > 0 {
        println!("Overdue:       {}", report.overdue.to_string().danger());
    } else {
        println!("Overdue:       {}", "0".success());
    }
    println!("Total hours:   {:.1}", report.total_hours);
    println!("Average hours: {:.1}", report.average_hours);
    println!();

    println!("Phases");
    println!("{}", "──────".dim());
    println!("Analyst:       {:.1}", report.phase_hours.analyst);
    println!("Developer:     {:.1}", report.phase_hours.developer);
    println!("KKT:           {:.1}", report.phase_hours.acceptance_test);
    println!("Preprod:       {:.1}", report.phase_hours.preprod);
    println!();

    println!("Activity");
    println!("{}", "────────".dim());
    println!("This month:    {}", report.created_this_month);
    println!("Last 7 days:   {}", report.created_this_week);
    println!();

    println!("Largest requests");
    println!("{}", "────────────────".dim());
    print_summaries(&report.largest, "No requests yet.");
    println!();

    println!("Due in the next {upcoming_days} days");
    println!("{}", "──────────────────────".dim());
    print_summaries(&report.upcoming_deadlines, "Nothing due.");
}

fn print_summaries(summaries: &[RequestSummary], empty: &str) {
    if summaries.is_empty() {
        println!("{}", empty.dim());
        return;
    }

    for summary in summaries {
        let deadline = summary
            .deadline
            .map_or_else(|| "-".to_string(), |d| d.to_string());
        println!(
            "{:<6} {:<32} {:>8.1}h  {deadline:<10}  {}",
            summary.id.to_string(),
            summary.name,
            summary.total_hours,
            summary.status.label().dim()
        );
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use efor::NewRequest;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn report_run_renders_both_formats() {
        let tmp = tempdir().unwrap();
        let mut directory = Directory::init(tmp.path().to_path_buf()).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 9, 2, 9, 0, 0).unwrap();
        let mut new = NewRequest::named("Ledger export");
        new.hours.analyst = 6.0;
        new.deadline = NaiveDate::from_ymd_opt(2024, 9, 6);
        directory.store_mut().create(new, now).unwrap();
        directory.flush().unwrap();

        let today = NaiveDate::from_ymd_opt(2024, 9, 3).unwrap();
        for output in [OutputFormat::Table, OutputFormat::Json] {
            Report { output }.run(tmp.path().to_path_buf(), today).unwrap();
        }
    }

    #[test]
    fn report_run_on_uninitialised_root() {
        let tmp = tempdir().unwrap();
        Report::default()
            .run(tmp.path().to_path_buf(), Utc::now().date_naive())
            .unwrap();
    }
}
