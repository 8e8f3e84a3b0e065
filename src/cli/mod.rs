//! CLI interface for EduLog

pub mod commands;
mod output;

pub use output::*;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "edulog")]
#[command(author = "EduLog")]
#[command(version)]
#[command(about = "School attendance from the terminal", long_about = None)]
pub struct Cli {
    /// Path to edulog.toml (searched upward from the current directory by default)
    #[arg(long, global = true, env = "EDULOG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "table")]
    pub format: OutputFormat,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default edulog.toml in the current directory
    Init {
        /// Backend URL to write instead of the commented template
        #[arg(long)]
        api_url: Option<String>,
    },

    /// Sign in and store the session
    Login {
        #[arg(short, long)]
        email: String,

        /// Prompted for when omitted
        #[arg(short, long, env = "EDULOG_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Create an account
    Register {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        username: String,

        /// admin or student
        #[arg(short, long, default_value = "student")]
        role: String,

        /// Required for students
        #[arg(long)]
        student_id: Option<String>,

        /// Department id
        #[arg(long)]
        department: Option<i64>,

        /// Prompted for when omitted
        #[arg(short, long)]
        password: Option<String>,
    },

    /// End the current session
    Logout,

    /// Show the current session
    Whoami,

    /// Check whether a screen can be opened with the current session
    Open {
        /// Route such as /adminHome or /studentHome
        route: String,
    },

    /// Clock in for today
    ClockIn,

    /// Clock out for today
    ClockOut,

    /// Show whether you are clocked in
    Status,

    /// Attendance statistics (your own, or a student's as admin)
    Stats {
        student_id: Option<String>,
    },

    /// Admin overview: totals, today's attendance, departments, recent logs
    Dashboard,

    /// Student roster
    Students {
        #[command(subcommand)]
        action: StudentsAction,
    },

    /// Attendance records
    Attendance {
        #[command(subcommand)]
        action: AttendanceAction,
    },

    /// Attendance reports
    Reports {
        #[command(subcommand)]
        action: ReportsAction,
    },

    /// School calendar events
    Events {
        #[command(subcommand)]
        action: EventsAction,
    },
}

#[derive(Subcommand)]
pub enum StudentsAction {
    /// Find students by name or student id
    Search { query: String },

    /// Show a student's account
    Show { id: i64 },

    /// Count registered students
    Total,

    /// List departments with student counts
    Departments,
}

#[derive(Subcommand)]
pub enum AttendanceAction {
    /// Student attendance, newest first
    List {
        /// First day (YYYY-MM-DD)
        #[arg(long)]
        from: Option<chrono::NaiveDate>,

        /// Last day (YYYY-MM-DD)
        #[arg(long)]
        to: Option<chrono::NaiveDate>,
    },

    /// All attendance records
    Records,

    /// Change an attendance record
    Update {
        id: i64,

        #[arg(long)]
        status: Option<String>,

        #[arg(long)]
        date: Option<chrono::NaiveDate>,

        /// HH:MM:SS
        #[arg(long)]
        clock_in: Option<String>,

        /// HH:MM:SS
        #[arg(long)]
        clock_out: Option<String>,
    },

    /// Delete an attendance record
    Delete {
        id: i64,

        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
pub enum ReportsAction {
    /// Per-student attendance summary
    Show {
        #[arg(long)]
        start: Option<chrono::NaiveDate>,

        #[arg(long)]
        end: Option<chrono::NaiveDate>,

        /// present, absent, late or pending
        #[arg(long)]
        status: Option<String>,

        #[arg(long)]
        department: Option<String>,

        /// Part of a student name
        #[arg(long)]
        name: Option<String>,
    },

    /// Available departments and statuses
    Filters,
}

#[derive(Subcommand)]
pub enum EventsAction {
    /// All events
    List,

    /// The next few events
    Upcoming,

    /// Add an event
    Create {
        #[arg(short, long)]
        title: String,

        /// YYYY-MM-DD
        #[arg(short, long)]
        date: chrono::NaiveDate,

        #[arg(short, long)]
        location: Option<String>,

        #[arg(long)]
        description: Option<String>,
    },

    /// Remove an event
    Delete {
        id: i64,

        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
}
