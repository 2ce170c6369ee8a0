//! Command-line surface.
//!
//! Replaces the original page routes one-for-one: `login`/`logout` for the
//! login gate, `status` for the dashboard, and one subcommand family per
//! sheet. Every command except `login` and `logout` runs behind the session
//! guard. Handlers stay thin - they parse, call core operations, and render
//! the outcome; business logic lives in [`crate::core`].

/// Attendance and mass sheet commands
pub mod attendance;
/// Children roster commands
pub mod children;
/// Login, logout and status commands
pub mod session;

use crate::config::{self, AppConfig};
use crate::core::debounce::WriteFailure;
use crate::core::session::{SessionFile, guard};
use crate::errors::Result;
use crate::store::RestStore;
use chrono::{Local, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

/// Command-line interface definition.
#[derive(Parser)]
#[command(
    name = "attendance-buddy",
    version = env!("CARGO_PKG_VERSION"),
    about = "Sunday-school and mass attendance tracking over a hosted document store",
    long_about = None
)]
pub struct Cli {
    /// Path to the configuration file (default: ./config.toml)
    #[arg(global = true, long = "config")]
    pub config: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands, one per page of the original application.
#[derive(Subcommand)]
pub enum Commands {
    /// Log in as the administrator
    Login {
        /// Username; prompted for when omitted
        #[arg(long)]
        username: Option<String>,
        /// Password; prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },

    /// End the current session
    Logout,

    /// Show the session state and the size of each collection
    Status,

    /// Sunday-school attendance sheet
    Attendance {
        #[command(subcommand)]
        command: SheetCommands,
    },

    /// Mass attendance sheet
    Mass {
        #[command(subcommand)]
        command: SheetCommands,
    },

    /// Children roster
    Children {
        #[command(subcommand)]
        command: ChildrenCommands,
    },
}

/// Commands shared by the two attendance sheets.
#[derive(Subcommand)]
pub enum SheetCommands {
    /// List the sheet for one date
    List {
        /// Date to show (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Keep only names containing this text
        #[arg(long, default_value = "")]
        search: String,

        /// Page to show (20 rows per page)
        #[arg(long, default_value_t = 1)]
        page: usize,
    },

    /// Add an attendee by name
    Add {
        /// Attendee name
        name: String,
    },

    /// Set the present/absent flags for one attendee on one date
    Mark {
        /// Attendee id (shown by `list`)
        id: String,

        /// Date to mark (default today)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// New value of the present flag
        #[arg(long)]
        present: Option<bool>,

        /// New value of the absent flag
        #[arg(long)]
        absent: Option<bool>,
    },

    /// Clear both flags for every attendee on one date
    Reset {
        /// Date to reset (default today)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Import attendees from a spreadsheet (first column: name)
    Import {
        /// Path to an .xlsx/.xls file
        file: PathBuf,
    },

    /// Delete an attendee and all their recorded days
    Remove {
        /// Attendee id
        id: String,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

/// Children roster commands.
#[derive(Subcommand)]
pub enum ChildrenCommands {
    /// List the roster
    List {
        /// Keep only names containing this text
        #[arg(long, default_value = "")]
        search: String,

        /// Page to show (20 rows per page)
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Month whose visit flag to show (YYYY-MM, default this month)
        #[arg(long)]
        month: Option<String>,
    },

    /// Add an empty roster row
    Add,

    /// Set one text field on one row
    Set {
        /// Row id (shown by `list`)
        id: String,

        /// Field name: name, phone, address, dateOfBirth, stage, birthCertificate
        #[arg(long)]
        field: String,

        /// New value (any text, empty allowed)
        #[arg(long)]
        value: String,
    },

    /// Mark one child visited (or not) for a month
    Visit {
        /// Row id
        id: String,

        /// Month (YYYY-MM, default this month)
        #[arg(long)]
        month: Option<String>,

        /// Clear the flag instead of setting it
        #[arg(long)]
        clear: bool,
    },

    /// Clear the visit flag for every child for a month
    Reset {
        /// Month to reset (YYYY-MM, default this month)
        #[arg(long)]
        month: Option<String>,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Import roster rows from a spreadsheet
    Import {
        /// Path to an .xlsx/.xls file
        file: PathBuf,
    },

    /// Delete one roster row
    Remove {
        /// Row id
        id: String,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

/// Parses configuration, applies the session guard and dispatches.
pub async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => config::load_default_config()?,
    };
    let session_file = SessionFile::default_location()?;

    match cli.command {
        Commands::Login { username, password } => {
            session::login_command(&config, &session_file, username, password)
        }
        Commands::Logout => session::logout_command(&session_file),
        Commands::Status => {
            let session = guard(&session_file, Utc::now())?;
            session::status_command(rest_store(&config), &config, &session).await
        }
        Commands::Attendance { command } => {
            guard(&session_file, Utc::now())?;
            attendance::run(
                rest_store(&config),
                config.remote.collections.attendance.clone(),
                config.remote.quiet_window(),
                command,
            )
            .await
        }
        Commands::Mass { command } => {
            guard(&session_file, Utc::now())?;
            attendance::run(
                rest_store(&config),
                config.remote.collections.mass.clone(),
                config.remote.quiet_window(),
                command,
            )
            .await
        }
        Commands::Children { command } => {
            guard(&session_file, Utc::now())?;
            children::run(
                rest_store(&config),
                config.remote.collections.children.clone(),
                config.remote.quiet_window(),
                command,
            )
            .await
        }
    }
}

fn rest_store(config: &AppConfig) -> Arc<RestStore> {
    Arc::new(RestStore::new(
        &config.remote.base_url,
        config.remote.api_token.clone(),
    ))
}

/// Today in the local timezone, the default period for sheet commands.
pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Blocking yes/no prompt guarding destructive commands.
pub(crate) fn confirm(prompt: &str) -> bool {
    print!("{prompt} [y/N] ");
    let _ = std::io::stdout().flush();
    let mut line = String::new();
    if std::io::stdin().read_line(&mut line).is_err() {
        return false;
    }
    matches!(line.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Reads one line of input under a label, for the login prompt.
pub(crate) fn prompt_line(label: &str) -> Result<String> {
    print!("{label}: ");
    let _ = std::io::stdout().flush();
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Prints the write failures collected after a command, if any.
pub(crate) fn print_alerts(failures: &[WriteFailure]) {
    for failure in failures {
        println!(
            "Warning: saving {} for {} failed: {}",
            failure.key.field, failure.key.id, failure.message
        );
    }
}
