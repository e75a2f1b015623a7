use std::path::PathBuf;

mod dashboard;
mod list;
mod report;
mod show;
mod terminal;

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clap::ArgAction;
use dashboard::Dashboard;
use efor::{Directory, Hours, NewRequest, Priority, RequestId, RequestStore, Status};
use list::List;
use report::Report;
use show::Show;
use terminal::Colorize;
use tracing::instrument;

/// Parse a status from its name or label (CLI boundary, strict).
fn parse_status(s: &str) -> Result<Status, String> {
    Status::parse(s).ok_or_else(|| {
        format!(
            "unknown status '{s}' (expected one of: {})",
            Status::ALL.map(Status::name).join(", ")
        )
    })
}

/// Parse a priority from its name or label (CLI boundary, strict).
fn parse_priority(s: &str) -> Result<Priority, String> {
    Priority::ALL
        .into_iter()
        .find(|priority| priority.name().eq_ignore_ascii_case(s.trim()) || priority.label() == s)
        .ok_or_else(|| {
            format!(
                "unknown priority '{s}' (expected one of: {})",
                Priority::ALL.map(Priority::name).join(", ")
            )
        })
}

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// The path to the root of the tracker
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    /// Evaluate deadlines as of this date (YYYY-MM-DD) instead of today
    #[arg(long, global = true, value_name = "DATE")]
    today: Option<NaiveDate>,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        let today = self
            .today
            .unwrap_or_else(|| chrono::Local::now().date_naive());

        self.command
            .unwrap_or_else(|| Command::Dashboard(Dashboard::default()))
            .run(self.root, today)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Show dashboard figures (default)
    Dashboard(Dashboard),

    /// Initialize a new tracker
    Init(Init),

    /// Create a new request
    Create(Create),

    /// Change the name, hours, priority or deadlines of a request
    Edit(Edit),

    /// Move a request to another status
    ///
    /// Completed and cancelled requests must be reopened before they can
    /// move again.
    Move(Move),

    /// Delete a request
    Delete(Delete),

    /// Show a request with its size and deadline risk
    Show(Show),

    /// List requests with filters
    List(List),

    /// Show the effort report
    Report(Report),
}

impl Command {
    fn run(self, root: PathBuf, today: NaiveDate) -> anyhow::Result<()> {
        match self {
            Self::Dashboard(command) => command.run(root, today)?,
            Self::Init(command) => command.run(root)?,
            Self::Create(command) => command.run(root)?,
            Self::Edit(command) => command.run(root)?,
            Self::Move(command) => command.run(root)?,
            Self::Delete(command) => command.run(root)?,
            Self::Show(command) => command.run(root, today)?,
            Self::List(command) => command.run(root, today)?,
            Self::Report(command) => command.run(root, today)?,
        }
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Init {}

impl Init {
    #[instrument]
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let display = root.display().to_string();
        Directory::init(root)?;

        println!("Initialized effort tracker in {display}");
        println!("  Created: .efor/config.toml");
        println!();
        println!("Next steps:");
        println!("  efor create \"Your first request\" --developer 16");

        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Create {
    /// The name of the request.
    name: String,

    /// Longer description.
    #[clap(long, short)]
    description: Option<String>,

    /// Priority (low, medium, high, critical).
    #[clap(long, short, value_parser = parse_priority, default_value = "medium")]
    priority: Priority,

    /// Analysis hours.
    #[clap(long, default_value_t = 0.0)]
    analyst: f64,

    /// Development hours.
    #[clap(long, default_value_t = 0.0)]
    developer: f64,

    /// KKT (acceptance testing) hours.
    #[clap(long, default_value_t = 0.0)]
    kkt: f64,

    /// Pre-production hours.
    #[clap(long, default_value_t = 0.0)]
    preprod: f64,

    /// Delivery deadline (YYYY-MM-DD).
    #[clap(long)]
    deadline: Option<NaiveDate>,

    /// KKT deadline (YYYY-MM-DD).
    #[clap(long)]
    kkt_deadline: Option<NaiveDate>,

    /// Who is creating the request.
    #[clap(long, default_value = "")]
    by: String,
}

impl Create {
    #[instrument]
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut directory = Directory::new(root)?;

        let new = NewRequest {
            name: self.name,
            description: self.description.unwrap_or_default(),
            priority: self.priority,
            hours: Hours {
                analyst: self.analyst,
                developer: self.developer,
                acceptance_test: self.kkt,
                preprod: self.preprod,
            },
            deadline: self.deadline,
            kkt_deadline: self.kkt_deadline,
            created_by: self.by,
        };

        let id = directory.store_mut().create(new, Utc::now())?.id;
        directory.flush()?;

        println!("Added request {id}");
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Edit {
    /// The request to change.
    id: RequestId,

    /// New name.
    #[clap(long)]
    name: Option<String>,

    /// New description.
    #[clap(long, short)]
    description: Option<String>,

    /// New priority.
    #[clap(long, short, value_parser = parse_priority)]
    priority: Option<Priority>,

    /// Analysis hours.
    #[clap(long)]
    analyst: Option<f64>,

    /// Development hours.
    #[clap(long)]
    developer: Option<f64>,

    /// KKT (acceptance testing) hours.
    #[clap(long)]
    kkt: Option<f64>,

    /// Pre-production hours.
    #[clap(long)]
    preprod: Option<f64>,

    /// Delivery deadline (YYYY-MM-DD).
    #[clap(long, conflicts_with = "clear_deadline")]
    deadline: Option<NaiveDate>,

    /// Remove the delivery deadline.
    #[clap(long)]
    clear_deadline: bool,

    /// KKT deadline (YYYY-MM-DD).
    #[clap(long, conflicts_with = "clear_kkt_deadline")]
    kkt_deadline: Option<NaiveDate>,

    /// Remove the KKT deadline.
    #[clap(long)]
    clear_kkt_deadline: bool,

    /// Who is making the change.
    #[clap(long)]
    by: Option<String>,
}

impl Edit {
    #[instrument]
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut directory = Directory::new(root)?;

        let mut request = directory
            .store()
            .get(self.id)
            .cloned()
            .with_context(|| format!("request {} not found", self.id))?;

        if let Some(name) = self.name {
            request.name = name;
        }
        if let Some(description) = self.description {
            request.description = description;
        }
        if let Some(priority) = self.priority {
            request.priority = priority;
        }
        if let Some(hours) = self.analyst {
            request.hours.analyst = hours;
        }
        if let Some(hours) = self.developer {
            request.hours.developer = hours;
        }
        if let Some(hours) = self.kkt {
            request.hours.acceptance_test = hours;
        }
        if let Some(hours) = self.preprod {
            request.hours.preprod = hours;
        }
        if self.clear_deadline {
            request.deadline = None;
        } else if self.deadline.is_some() {
            request.deadline = self.deadline;
        }
        if self.clear_kkt_deadline {
            request.kkt_deadline = None;
        } else if self.kkt_deadline.is_some() {
            request.kkt_deadline = self.kkt_deadline;
        }
        if let Some(by) = self.by {
            request.last_modified_by = by;
        }

        directory.store_mut().update(request, Utc::now())?;
        directory.flush()?;

        println!("Updated request {}", self.id);
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Move {
    /// The request to move.
    id: RequestId,

    /// Target status (new, in-progress, testing, completed, cancelled).
    #[clap(value_parser = parse_status, required_unless_present = "reopen")]
    status: Option<Status>,

    /// Reopen a completed or cancelled request.
    #[arg(long, conflicts_with = "status")]
    reopen: bool,

    /// Who is making the change.
    #[clap(long)]
    by: Option<String>,
}

impl Move {
    #[instrument]
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut directory = Directory::new(root)?;

        let mut request = directory
            .store()
            .get(self.id)
            .cloned()
            .with_context(|| format!("request {} not found", self.id))?;

        let from = request.status;
        request.status = match self.status {
            Some(to) if !self.reopen => from.transition_to(to)?,
            _ => from.reopen()?,
        };
        if let Some(by) = self.by {
            request.last_modified_by = by;
        }
        let to = request.status;

        directory.store_mut().update(request, Utc::now())?;
        directory.flush()?;

        println!("Moved request {}: {from} → {}", self.id, to.label().success());
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Delete {
    /// The request to delete.
    id: RequestId,

    /// Show what would be deleted without deleting
    #[arg(long)]
    dry_run: bool,

    /// Skip confirmation prompts
    #[arg(long, short)]
    yes: bool,
}

impl Delete {
    #[instrument]
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut directory = Directory::new(root)?;

        let Some(request) = directory.store().get(self.id) else {
            anyhow::bail!("request {} not found", self.id);
        };
        let name = request.name.clone();

        if self.dry_run {
            println!("{}", format!("Would delete request {} ({name})", self.id).dim());
            return Ok(());
        }

        if !self.yes {
            let proceed = dialoguer::Confirm::new()
                .with_prompt(format!("Delete request {} ({name})?", self.id))
                .default(false)
                .interact()?;
            if !proceed {
                println!("Cancelled");
                return Ok(());
            }
        }

        directory.store_mut().delete(self.id)?;
        directory.flush()?;

        println!("{}", format!("✅ Deleted request {} ({name})", self.id).success());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use efor::{Directory, Request, RequestId, RequestStore, Status};
    use tempfile::tempdir;

    use super::*;

    fn create(root: &std::path::Path, name: &str, developer: f64) -> RequestId {
        Create {
            name: name.to_string(),
            description: None,
            priority: Priority::Medium,
            analyst: 0.0,
            developer,
            kkt: 0.0,
            preprod: 0.0,
            deadline: NaiveDate::from_ymd_opt(2024, 5, 20),
            kkt_deadline: None,
            by: "tester".to_string(),
        }
        .run(root.to_path_buf())
        .expect("create command should succeed");

        let directory = Directory::new(root.to_path_buf()).unwrap();
        directory.store().requests().last().unwrap().id
    }

    fn load(root: &std::path::Path, id: RequestId) -> Request {
        Directory::new(root.to_path_buf())
            .unwrap()
            .store()
            .get(id)
            .cloned()
            .expect("request should exist")
    }

    fn edit(id: RequestId) -> Edit {
        Edit {
            id,
            name: None,
            description: None,
            priority: None,
            analyst: None,
            developer: None,
            kkt: None,
            preprod: None,
            deadline: None,
            clear_deadline: false,
            kkt_deadline: None,
            clear_kkt_deadline: false,
            by: None,
        }
    }

    #[test]
    fn init_run_creates_tracker() {
        let tmp = tempdir().unwrap();
        Init {}
            .run(tmp.path().to_path_buf())
            .expect("init should succeed");

        assert!(tmp.path().join(".efor").join("config.toml").exists());
        assert!(Init {}.run(tmp.path().to_path_buf()).is_err());
    }

    #[test]
    fn create_run_stores_request() {
        let tmp = tempdir().unwrap();
        let id = create(tmp.path(), "Customer portal", 32.0);
        let request = load(tmp.path(), id);

        assert_eq!(request.name, "Customer portal");
        assert_eq!(request.status, Status::New);
        assert_eq!(request.created_by, "tester");
        assert!((request.total_hours() - 32.0).abs() < 1e-9);
    }

    #[test]
    fn create_run_rejects_negative_hours() {
        let tmp = tempdir().unwrap();
        let result = Create {
            name: "Broken".to_string(),
            description: None,
            priority: Priority::Low,
            analyst: -2.0,
            developer: 0.0,
            kkt: 0.0,
            preprod: 0.0,
            deadline: None,
            kkt_deadline: None,
            by: String::new(),
        }
        .run(tmp.path().to_path_buf());

        assert!(result.is_err());
        let directory = Directory::new(tmp.path().to_path_buf()).unwrap();
        assert!(directory.store().requests().is_empty());
    }

    #[test]
    fn edit_run_updates_selected_fields() {
        let tmp = tempdir().unwrap();
        let id = create(tmp.path(), "Reporting", 8.0);

        let mut command = edit(id);
        command.kkt = Some(6.0);
        command.clear_deadline = true;
        command.by = Some("reviewer".to_string());
        command.run(tmp.path().to_path_buf()).unwrap();

        let request = load(tmp.path(), id);
        assert!((request.hours.developer - 8.0).abs() < 1e-9);
        assert!((request.hours.acceptance_test - 6.0).abs() < 1e-9);
        assert_eq!(request.deadline, None);
        assert_eq!(request.last_modified_by, "reviewer");
    }

    #[test]
    fn edit_run_unknown_request_fails() {
        let tmp = tempdir().unwrap();
        assert!(edit(RequestId::new(5)).run(tmp.path().to_path_buf()).is_err());
    }

    #[test]
    fn move_run_follows_lifecycle() {
        let tmp = tempdir().unwrap();
        let id = create(tmp.path(), "Migration", 8.0);

        for status in [Status::InProgress, Status::Testing, Status::Completed] {
            Move {
                id,
                status: Some(status),
                reopen: false,
                by: None,
            }
            .run(tmp.path().to_path_buf())
            .unwrap();
            assert_eq!(load(tmp.path(), id).status, status);
        }

        let blocked = Move {
            id,
            status: Some(Status::InProgress),
            reopen: false,
            by: None,
        }
        .run(tmp.path().to_path_buf());
        assert!(blocked.is_err());
        assert_eq!(load(tmp.path(), id).status, Status::Completed);

        Move {
            id,
            status: None,
            reopen: true,
            by: None,
        }
        .run(tmp.path().to_path_buf())
        .unwrap();
        assert_eq!(load(tmp.path(), id).status, Status::New);
    }

    #[test]
    fn delete_run_removes_request() {
        let tmp = tempdir().unwrap();
        let keep = create(tmp.path(), "Keep", 1.0);
        let drop = create(tmp.path(), "Drop", 1.0);

        Delete {
            id: drop,
            dry_run: true,
            yes: true,
        }
        .run(tmp.path().to_path_buf())
        .unwrap();
        assert_eq!(load(tmp.path(), drop).name, "Drop");

        Delete {
            id: drop,
            dry_run: false,
            yes: true,
        }
        .run(tmp.path().to_path_buf())
        .unwrap();

        let directory = Directory::new(tmp.path().to_path_buf()).unwrap();
        assert!(directory.store().get(drop).is_none());
        assert!(directory.store().get(keep).is_some());
    }

    #[test]
    fn parse_helpers_are_strict() {
        assert_eq!(parse_status("in-progress"), Ok(Status::InProgress));
        assert!(parse_status("Havuz").is_err());
        assert_eq!(parse_priority("HIGH"), Ok(Priority::High));
        assert!(parse_priority("urgent").is_err());
    }
}
