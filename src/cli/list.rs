use std::{cmp::Ordering, path::PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use efor::{
    Config, Derived, Directory, Request, RequestStore, Size, Status, domain::compute_derived,
};
use regex::Regex;
use serde::Serialize;
use tracing::instrument;

use super::terminal::Colorize;

/// Command arguments for `efor list`.
#[derive(Debug, Parser, Default)]
#[command(about = "List requests with filters")]
pub struct List {
    /// Filter by status (comma-separated).
    #[arg(long, value_delimiter = ',', value_parser = super::parse_status, value_name = "STATUS")]
    status: Vec<Status>,

    /// Filter by size band (comma-separated, case-insensitive).
    #[arg(long, value_delimiter = ',', value_name = "SIZE")]
    size: Vec<Size>,

    /// Show only requests in progress or testing.
    #[arg(long)]
    active: bool,

    /// Show only open requests past their deadline.
    #[arg(long)]
    overdue: bool,

    /// Show only requests whose deadline is past or within six weeks.
    #[arg(long)]
    at_risk: bool,

    /// Case-insensitive substring match against name/description.
    #[arg(long, conflicts_with = "regex")]
    contains: Option<String>,

    /// Regular expression match against name/description.
    #[arg(long)]
    regex: Option<String>,

    /// Sort field (default: id).
    #[arg(long, value_enum, default_value_t)]
    sort: SortField,

    /// Reverse the sort order.
    #[arg(long)]
    reverse: bool,

    /// Output format (default: table).
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,

    /// Suppress headers and format rows for scripting.
    #[arg(long)]
    quiet: bool,

    /// Limit number of rows returned.
    #[arg(long)]
    limit: Option<usize>,
}

/// Supported output formats.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Sortable fields.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Default)]
pub enum SortField {
    #[default]
    Id,
    Name,
    Size,
    Deadline,
    Created,
    Hours,
}

#[derive(Debug, Serialize)]
struct Row<'a> {
    #[serde(flatten)]
    request: &'a Request,
    #[serde(flatten)]
    derived: Derived,
}

impl List {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf, today: NaiveDate) -> anyhow::Result<()> {
        let directory = Directory::new(root)?;
        let rows = self.rows(directory.store().requests(), directory.config(), today)?;

        if rows.is_empty() && self.output == OutputFormat::Table && !self.quiet {
            println!("No matching requests.");
            return Ok(());
        }

        match self.output {
            OutputFormat::Table => render_table(&rows, self.quiet),
            OutputFormat::Json => render_json(&rows)?,
        }

        Ok(())
    }

    fn rows<'a>(
        &self,
        requests: &'a [Request],
        config: &Config,
        today: NaiveDate,
    ) -> anyhow::Result<Vec<Row<'a>>> {
        let filters = Filters::new(self)?;

        let mut rows: Vec<Row<'a>> = requests
            .iter()
            .map(|request| Row {
                request,
                derived: compute_derived(request, config, today),
            })
            .filter(|row| filters.matches(row, today))
            .collect();

        rows.sort_by(|a, b| compare_rows(a, b, self.sort));
        if self.reverse {
            rows.reverse();
        }
        if let Some(limit) = self.limit {
            rows.truncate(limit);
        }

        tracing::debug!(count = rows.len(), "listing requests");
        Ok(rows)
    }
}

#[derive(Debug)]
struct Filters {
    statuses: Vec<Status>,
    sizes: Vec<Size>,
    active: bool,
    overdue: bool,
    at_risk: bool,
    contains: Option<String>,
    regex: Option<Regex>,
}

impl Filters {
    fn new(cmd: &List) -> anyhow::Result<Self> {
        let regex = if let Some(pattern) = &cmd.regex {
            Some(Regex::new(pattern).with_context(|| format!("invalid regex: {pattern}"))?)
        } else {
            None
        };

        Ok(Self {
            statuses: cmd.status.clone(),
            sizes: cmd.size.clone(),
            active: cmd.active,
            overdue: cmd.overdue,
            at_risk: cmd.at_risk,
            contains: cmd.contains.as_deref().map(str::to_lowercase),
            regex,
        })
    }

    fn matches(&self, row: &Row<'_>, today: NaiveDate) -> bool {
        let request = row.request;

        if !self.statuses.is_empty() && !self.statuses.contains(&request.status) {
            return false;
        }

        if !self.sizes.is_empty() && !self.sizes.contains(&row.derived.size) {
            return false;
        }

        if self.active && !row.derived.is_active {
            return false;
        }

        if self.overdue && !request.is_overdue_and_open(today) {
            return false;
        }

        if self.at_risk && !row.derived.deadline_status.is_at_risk() {
            return false;
        }

        if let Some(search) = &self.contains {
            if !request.name.to_lowercase().contains(search)
                && !request.description.to_lowercase().contains(search)
            {
                return false;
            }
        }

        if let Some(regex) = &self.regex {
            if !regex.is_match(&request.name) && !regex.is_match(&request.description) {
                return false;
            }
        }

        true
    }
}

fn compare_rows(a: &Row<'_>, b: &Row<'_>, sort_field: SortField) -> Ordering {
    let primary = match sort_field {
        SortField::Id => Ordering::Equal,
        SortField::Name => a.request.name.to_lowercase().cmp(&b.request.name.to_lowercase()),
        SortField::Size => a.derived.size.cmp(&b.derived.size),
        // Requests without a deadline go last.
        SortField::Deadline => match (a.request.deadline, b.request.deadline) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
        SortField::Created => a.request.created_date.cmp(&b.request.created_date),
        SortField::Hours => a.derived.total_hours.total_cmp(&b.derived.total_hours),
    };

    primary.then_with(|| a.request.id.cmp(&b.request.id))
}

fn render_table(rows: &[Row<'_>], quiet: bool) {
    if quiet {
        for row in rows {
            println!("{}", row.request.id.get());
        }
        return;
    }

    let headers = [
        "ID", "Name", "Status", "Hours", "Days", "Size", "SP", "Deadline",
    ];
    let data: Vec<[String; 8]> = rows
        .iter()
        .map(|row| {
            [
                row.request.id.to_string(),
                row.request.name.clone(),
                row.request.status.label().to_string(),
                format!("{:.1}", row.derived.total_hours),
                format!("{:.1}", row.derived.man_days_display()),
                row.derived.size.to_string(),
                row.derived.story_points.to_string(),
                row.request
                    .deadline
                    .map_or_else(|| "-".to_string(), |d| d.to_string()),
            ]
        })
        .collect();

    // Determine column widths for alignment.
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            data.iter()
                .map(|row| row[idx].chars().count())
                .max()
                .unwrap_or(0)
                .max(header.len())
        })
        .collect();

    for (header, width) in headers.iter().zip(widths.iter().copied()) {
        print!("{header:<width$}  ");
    }
    println!();
    for width in widths.iter().copied() {
        print!("{:-<width$}  ", "");
    }
    println!();

    for (row, values) in rows.iter().zip(data) {
        for (idx, value) in values.into_iter().enumerate() {
            // Pad before colouring so escape codes do not skew the columns.
            let padded = format!("{value:<width$}", width = widths[idx]);
            let cell = match idx {
                5 => padded.sized(row.derived.size),
                7 => padded.deadline(row.derived.deadline_status),
                _ => padded,
            };
            print!("{cell}  ");
        }
        println!();
    }
}

fn render_json(rows: &[Row<'_>]) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(std::io::stdout(), rows)
        .context("failed to render json output")?;
    println!();
    Ok(())
}
