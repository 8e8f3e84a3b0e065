//! CLI output formatting utilities

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::time::Duration;

use crate::api::models::{
    AdminAttendance, AttendanceRecord, AttendanceStats, Event, RecentLog, ReportRow,
    StudentSummary, UpcomingEvent,
};
use crate::auth::{Navigator, LOGGED_OUT_ROUTE, LOGIN_ROUTE, UNAUTHORIZED_ROUTE};
use crate::error::Result;

use super::OutputFormat;

/// Print a success message
pub fn success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

/// Print an error message
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

/// Print a warning message
pub fn warn(message: &str) {
    println!("{} {}", "⚠".yellow(), message);
}

/// Print an info message
pub fn info(message: &str) {
    println!("{} {}", "ℹ".blue(), message);
}

/// Print `value` as JSON or YAML; returns false for table output so the
/// caller renders its own table
pub fn print_structured<T: Serialize>(format: OutputFormat, value: &T) -> Result<bool> {
    match format {
        OutputFormat::Table => Ok(false),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(value)?);
            Ok(true)
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(value)?);
            Ok(true)
        }
    }
}

/// Spinner shown while waiting on the backend
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(message.to_string());
    pb
}

/// Format an attendance status as a colored string
pub fn format_status(status: &str) -> String {
    match status.to_lowercase().as_str() {
        "present" => status.green().to_string(),
        "absent" => status.red().to_string(),
        "late" | "pending" => status.yellow().to_string(),
        _ => status.to_string(),
    }
}

fn status_color(status: &str) -> Color {
    match status.to_lowercase().as_str() {
        "present" => Color::Green,
        "absent" => Color::Red,
        _ => Color::Yellow,
    }
}

fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            headers
                .iter()
                .map(|h| Cell::new(h).fg(Color::Cyan))
                .collect::<Vec<_>>(),
        );
    table
}

pub fn print_attendance_stats(stats: &AttendanceStats) {
    println!("{}", "Attendance".bold().underline());
    println!();
    println!("  {} {}", "Days recorded:".bold(), stats.total);
    println!("  {} {}", "Present:".bold(), stats.present.to_string().green());
    println!("  {} {}", "Absent:".bold(), stats.absent.to_string().red());
    println!("  {} {}", "Late:".bold(), stats.late.to_string().yellow());
    println!("  {} {:.1}%", "Attendance rate:".bold(), stats.percentage);
}

pub fn print_records_table(records: &[AttendanceRecord]) {
    if records.is_empty() {
        info("No attendance records found");
        return;
    }

    let mut table = new_table(&["ID", "Student", "Date", "Status", "In", "Out"]);
    for record in records {
        table.add_row(vec![
            Cell::new(record.id),
            Cell::new(record.student_name.as_deref().unwrap_or("-")),
            Cell::new(record.date),
            Cell::new(record.status).fg(status_color(record.status.as_str())),
            Cell::new(record.clock_in_time.as_deref().unwrap_or("-")),
            Cell::new(record.clock_out_time.as_deref().unwrap_or("-")),
        ]);
    }
    println!("{table}");
}

pub fn print_admin_attendance_table(records: &[AdminAttendance]) {
    if records.is_empty() {
        info("No attendance found for that period");
        return;
    }

    let mut table = new_table(&["ID", "Student ID", "Student", "Date", "Status", "In", "Out"]);
    for record in records {
        table.add_row(vec![
            Cell::new(record.id),
            Cell::new(record.student_id.as_deref().unwrap_or("-")),
            Cell::new(record.student_name.as_deref().unwrap_or("-")),
            Cell::new(record.date),
            Cell::new(record.status).fg(status_color(record.status.as_str())),
            Cell::new(record.clock_in_time.as_deref().unwrap_or("-")),
            Cell::new(record.clock_out_time.as_deref().unwrap_or("-")),
        ]);
    }
    println!("{table}");
}

pub fn print_students_table(students: &[StudentSummary]) {
    if students.is_empty() {
        info("No matching students");
        return;
    }

    let mut table = new_table(&["ID", "Name", "Student ID"]);
    for student in students {
        table.add_row(vec![
            Cell::new(student.id),
            Cell::new(&student.username),
            Cell::new(student.student_id.as_deref().unwrap_or("-")),
        ]);
    }
    println!("{table}");
}

pub fn print_report_table(rows: &[ReportRow]) {
    if rows.is_empty() {
        info("No students match these filters");
        return;
    }

    let mut table = new_table(&["Student", "Department", "Last attended", "Status", "Rate"]);
    for row in rows {
        table.add_row(vec![
            Cell::new(&row.student_name),
            Cell::new(&row.department),
            Cell::new(&row.attendance_date),
            Cell::new(&row.status).fg(status_color(&row.status)),
            Cell::new(format!("{:.1}%", row.attendance_percentage)),
        ]);
    }
    println!("{table}");
}

pub fn print_recent_logs(logs: &[RecentLog]) {
    if logs.is_empty() {
        return;
    }

    let mut table = new_table(&["Student", "Student ID", "Date", "Status"]);
    for log in logs {
        table.add_row(vec![
            Cell::new(&log.student_name),
            Cell::new(log.student_id.as_deref().unwrap_or("-")),
            Cell::new(&log.date),
            Cell::new(&log.status).fg(status_color(&log.status)),
        ]);
    }
    println!("{table}");
}

pub fn print_events_table(events: &[Event]) {
    if events.is_empty() {
        info("No events scheduled");
        return;
    }

    let mut table = new_table(&["ID", "Date", "Title", "Location"]);
    for event in events {
        table.add_row(vec![
            Cell::new(event.id),
            Cell::new(event.date),
            Cell::new(&event.title),
            Cell::new(event.location.as_deref().unwrap_or("-")),
        ]);
    }
    println!("{table}");
}

pub fn print_upcoming_events(events: &[UpcomingEvent]) {
    if events.is_empty() {
        info("No upcoming events");
        return;
    }

    for event in events {
        let location = event
            .location
            .as_deref()
            .map(|l| format!(" @ {}", l))
            .unwrap_or_default();
        println!("  {} {}{}", event.date.cyan(), event.title.bold(), location);
        if let Some(description) = &event.description {
            println!("      {}", description);
        }
    }
}

/// Confirm an action with the user
pub fn confirm(message: &str) -> bool {
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .unwrap_or(false)
}

/// Terminal stand-in for a browser location change: explains where the
/// user was sent and what to do next
pub struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate(&self, location: &str) {
        match location {
            LOGGED_OUT_ROUTE => warn("You were logged out elsewhere. Run 'edulog login' to sign in again"),
            LOGIN_ROUTE => info("Run 'edulog login --email <email>' to sign in"),
            UNAUTHORIZED_ROUTE => error("Your account is not allowed to open this screen"),
            other => tracing::debug!(location = other, "Opened screen"),
        }
    }
}
