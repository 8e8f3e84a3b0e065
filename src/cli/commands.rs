//! CLI command implementations

use anyhow::{anyhow, Result};
use colored::Colorize;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::api::models::{
    AttendanceStatus, AttendanceUpdate, NewEvent, RegisterRequest, ReportFilters,
};
use crate::api::ApiClient;
use crate::auth::{
    peek_claims, FileSessionRepository, GuardOutcome, Role, RouteGuard, RouteTable,
    SessionContext, TokenStore,
};
use crate::cli::{
    confirm, error, format_status, info, print_admin_attendance_table, print_attendance_stats,
    print_events_table, print_recent_logs, print_records_table, print_report_table,
    print_structured, print_students_table, print_upcoming_events, spinner, success, warn,
    AttendanceAction, EventsAction, OutputFormat, ReportsAction, StudentsAction,
    TerminalNavigator,
};
use crate::config::{self, Config};
use crate::error::Error;

/// Everything a command needs: config, the session-bound client and the guard
pub struct App {
    pub config: Config,
    pub client: ApiClient,
    pub guard: RouteGuard,
    pub format: OutputFormat,
}

impl App {
    /// Build from an explicit config file or the discovered one
    pub fn load(config_path: Option<&Path>, format: OutputFormat) -> Result<Self> {
        let config = match config_path {
            Some(path) => config::loader::load_config_from_path(path)?,
            None => config::load_config_or_default()?,
        };
        Self::from_config(config, format)
    }

    pub fn from_config(config: Config, format: OutputFormat) -> Result<Self> {
        let repo = FileSessionRepository::new(&config.session.path);
        let context = SessionContext::new(TokenStore::new(Arc::new(repo)), Arc::new(TerminalNavigator));
        let client = ApiClient::from_config(&config, context.clone())?;
        let guard = RouteGuard::new(RouteTable::standard(), context);

        Ok(Self {
            config,
            client,
            guard,
            format,
        })
    }

    fn store(&self) -> &TokenStore {
        self.client.session().store()
    }

    /// Gate a command on its screen's route before touching the network
    fn require(&self, route: &str) -> Result<()> {
        match self.guard.enter(route) {
            GuardOutcome::Render(_) => Ok(()),
            GuardOutcome::RedirectToLogin => Err(Error::NotAuthenticated.into()),
            GuardOutcome::RedirectToUnauthorized => Err(Error::Unauthorized(route.to_string()).into()),
        }
    }
}

/// Initialize a new edulog.toml configuration file
pub async fn init(api_url: Option<String>) -> Result<()> {
    let config_path = Path::new(config::loader::CONFIG_FILENAME);

    if config_path.exists() {
        warn("edulog.toml already exists");
        return Ok(());
    }

    match api_url {
        Some(url) => {
            config::loader::save_config(&Config::with_base_url(url), config_path)?;
            success("Created edulog.toml");
            info("Run 'edulog login --email <email>'");
        }
        None => {
            fs::write(config_path, config::loader::default_config_content())?;
            success("Created edulog.toml");
            info("Set [api].base_url and run 'edulog login --email <email>'");
        }
    }

    Ok(())
}

fn read_password(password: Option<String>) -> Result<String> {
    match password {
        Some(password) => Ok(password),
        None => Ok(dialoguer::Password::new().with_prompt("Password").interact()?),
    }
}

pub async fn login(app: &App, email: &str, password: Option<String>) -> Result<()> {
    let password = read_password(password)?;

    let pb = spinner("Signing in...");
    let result = app.client.login(email, &password).await;
    pb.finish_and_clear();

    match result {
        Ok(session) => {
            let who = session.student_name.as_deref().unwrap_or(email);
            success(&format!("Logged in as {} ({})", who, session.role));
            info(&format!("Home screen: {}", session.landing_route()));
            Ok(())
        }
        Err(e) => {
            error(&format!("Login failed: {}", e));
            Err(e.into())
        }
    }
}

pub async fn register(
    app: &App,
    email: &str,
    username: &str,
    role: &str,
    student_id: Option<String>,
    department: Option<i64>,
    password: Option<String>,
) -> Result<()> {
    let role: Role = role.parse()?;
    if role == Role::Student && student_id.is_none() {
        return Err(anyhow!("--student-id is required for students"));
    }

    let request = RegisterRequest {
        email: email.to_string(),
        username: username.to_string(),
        password: read_password(password)?,
        role,
        student_id,
        department,
    };

    match app.client.register(&request).await {
        Ok(response) => {
            success(response.message.as_deref().unwrap_or("Account created"));
            Ok(())
        }
        Err(e) => {
            error(&format!("Registration failed: {}", e));
            Err(e.into())
        }
    }
}

pub async fn logout(app: &App) -> Result<()> {
    app.client.logout()?;
    success("Logged out");
    Ok(())
}

pub async fn whoami(app: &App) -> Result<()> {
    let Some(session) = app.store().session() else {
        warn("Not logged in");
        return Ok(());
    };

    let expires = peek_claims(&session.access_token)
        .ok()
        .and_then(|claims| claims.expires_at());

    if print_structured(app.format, &session)? {
        return Ok(());
    }

    println!("{}", "Session".bold().underline());
    println!();
    println!("  {} {}", "Role:".bold(), session.role);
    if let Some(name) = &session.student_name {
        println!("  {} {}", "Name:".bold(), name);
    }
    if let Some(id) = &session.student_id {
        println!("  {} {}", "Student ID:".bold(), id);
    }
    println!(
        "  {} {}",
        "Token issued:".bold(),
        session.issued_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    match expires {
        Some(at) if at < chrono::Utc::now() => println!(
            "  {} {} (will refresh on next request)",
            "Token expires:".bold(),
            at.format("%Y-%m-%d %H:%M:%S UTC").to_string().yellow()
        ),
        Some(at) => println!(
            "  {} {}",
            "Token expires:".bold(),
            at.format("%Y-%m-%d %H:%M:%S UTC")
        ),
        None => {}
    }
    println!("  {} {}", "Backend:".bold(), app.config.api.base_url);
    Ok(())
}

pub async fn open(app: &App, route: &str) -> Result<()> {
    match app.guard.enter(route) {
        GuardOutcome::Render(path) => success(&format!("{} is available", path)),
        GuardOutcome::RedirectToLogin => warn(&format!("{} redirects to /login", route)),
        GuardOutcome::RedirectToUnauthorized => warn(&format!("{} redirects to /unauthorized", route)),
    }
    Ok(())
}

fn own_student_id(app: &App) -> Result<String> {
    app.store()
        .student_id()
        .ok_or_else(|| Error::IncompleteSession.into())
}

pub async fn clock_in(app: &App) -> Result<()> {
    app.require("/studentHome")?;

    let response = app.client.clock_in().await?;
    if print_structured(app.format, &response)? {
        return Ok(());
    }
    success(&format!("{} at {}", response.message, response.clock_in_time));
    info(&format!("Days present: {}", response.updated_present_count));
    Ok(())
}

pub async fn clock_out(app: &App) -> Result<()> {
    app.require("/studentHome")?;

    let response = app.client.clock_out().await?;
    if print_structured(app.format, &response)? {
        return Ok(());
    }
    success(&format!("{} at {}", response.message, response.clock_out_time));
    Ok(())
}

pub async fn status(app: &App) -> Result<()> {
    app.require("/studentHome")?;
    let student_id = own_student_id(app)?;

    let status = app.client.clock_status(&student_id).await?;
    if print_structured(app.format, &status)? {
        return Ok(());
    }
    if status.is_clocked_in {
        info(&format!("Currently {}", format_status("present")));
    } else {
        info("Not clocked in");
    }
    Ok(())
}

pub async fn stats(app: &App, student_id: Option<String>) -> Result<()> {
    let student_id = match student_id {
        Some(id) => {
            app.require("/attendance")?;
            id
        }
        None => {
            app.require("/studentHome")?;
            own_student_id(app)?
        }
    };

    let stats = app.client.attendance_stats(&student_id).await?;
    if !print_structured(app.format, &stats)? {
        print_attendance_stats(&stats);
    }
    Ok(())
}

pub async fn dashboard(app: &App) -> Result<()> {
    app.require("/adminHome")?;

    let pb = spinner("Loading dashboard...");
    let (total, today, absent, departments, recent, upcoming) = tokio::join!(
        app.client.total_students(),
        app.client.attendance_today(),
        app.client.absent_today(),
        app.client.department_stats(),
        app.client.recent_logs(),
        app.client.upcoming_events(),
    );
    pb.finish_and_clear();

    let total = total?;
    let today = today?;
    let absent = absent?;
    let departments = departments?;

    let summary = serde_json::json!({
        "total_students": total,
        "attendance_today_percent": today,
        "absent_today": absent,
        "departments": departments,
        "recent_logs": recent,
        "upcoming_events": upcoming,
    });
    if print_structured(app.format, &summary)? {
        return Ok(());
    }

    println!("{}", "Dashboard".bold().underline());
    println!();
    println!("  {} {}", "Students:".bold(), total);
    println!("  {} {:.1}%", "Present today:".bold(), today);
    println!("  {} {}", "Absent today:".bold(), absent.to_string().red());
    println!();
    println!("  {}", "Departments:".bold());
    for department in &departments {
        println!("    - {} ({})", department.name, department.student_count);
    }
    if !recent.is_empty() {
        println!();
        println!("  {}", "Recent attendance:".bold());
        print_recent_logs(&recent);
    }
    if !upcoming.is_empty() {
        println!();
        println!("  {}", "Upcoming events:".bold());
        print_upcoming_events(&upcoming);
    }
    Ok(())
}

pub async fn students(app: &App, action: StudentsAction) -> Result<()> {
    app.require("/studentsManagement")?;

    match action {
        StudentsAction::Search { query } => {
            let students = app.client.search_students(&query).await?;
            if !print_structured(app.format, &students)? {
                print_students_table(&students);
            }
        }
        StudentsAction::Show { id } => {
            let student = app.client.student_details(id).await?;
            if !print_structured(app.format, &student)? {
                println!("  {} {}", "Name:".bold(), student.username);
                println!("  {} {}", "Email:".bold(), student.email);
                println!("  {} {}", "Role:".bold(), student.role);
                println!(
                    "  {} {}",
                    "Student ID:".bold(),
                    student.student_id.as_deref().unwrap_or("-")
                );
            }
        }
        StudentsAction::Total => {
            let total = app.client.total_students().await?;
            if !print_structured(app.format, &serde_json::json!({ "total": total }))? {
                info(&format!("{} students registered", total));
            }
        }
        StudentsAction::Departments => {
            let departments = app.client.department_stats().await?;
            if !print_structured(app.format, &departments)? {
                for department in &departments {
                    println!("  {} ({})", department.name.bold(), department.student_count);
                }
            }
        }
    }
    Ok(())
}

pub async fn attendance(app: &App, action: AttendanceAction) -> Result<()> {
    app.require("/attendance")?;

    match action {
        AttendanceAction::List { from, to } => {
            let records = app.client.admin_attendance(from, to).await?;
            if !print_structured(app.format, &records)? {
                print_admin_attendance_table(&records);
            }
        }
        AttendanceAction::Records => {
            let records = app.client.list_records().await?;
            if !print_structured(app.format, &records)? {
                print_records_table(&records);
            }
        }
        AttendanceAction::Update {
            id,
            status,
            date,
            clock_in,
            clock_out,
        } => {
            let update = AttendanceUpdate {
                date,
                status: status.as_deref().map(str::parse::<AttendanceStatus>).transpose()?,
                clock_in_time: clock_in,
                clock_out_time: clock_out,
            };
            if update.is_empty() {
                warn("Nothing to update");
                return Ok(());
            }
            let record = app.client.update_attendance(id, &update).await?;
            success(&format!(
                "Updated record {} ({} on {})",
                record.id,
                format_status(record.status.as_str()),
                record.date
            ));
        }
        AttendanceAction::Delete { id, force } => {
            if !force && !confirm(&format!("Delete attendance record {}?", id)) {
                info("Cancelled");
                return Ok(());
            }
            app.client.delete_attendance(id).await?;
            success(&format!("Deleted attendance record {}", id));
        }
    }
    Ok(())
}

pub async fn reports(app: &App, action: ReportsAction) -> Result<()> {
    app.require("/reports")?;

    match action {
        ReportsAction::Show {
            start,
            end,
            status,
            department,
            name,
        } => {
            if start.is_some() != end.is_some() {
                warn("Date filter needs both --start and --end; ignoring it");
            }
            let filters = ReportFilters {
                start_date: start,
                end_date: end,
                status: status.as_deref().map(str::parse::<AttendanceStatus>).transpose()?,
                department,
                student_name: name,
            };
            let pb = spinner("Building report...");
            let rows = app.client.student_report(&filters).await;
            pb.finish_and_clear();
            let rows = rows?;
            if !print_structured(app.format, &rows)? {
                print_report_table(&rows);
            }
        }
        ReportsAction::Filters => {
            let options = app.client.report_filter_options().await?;
            if !print_structured(app.format, &options)? {
                println!("  {} {}", "Departments:".bold(), options.departments.join(", "));
                println!("  {} {}", "Statuses:".bold(), options.status_choices.join(", "));
            }
        }
    }
    Ok(())
}

pub async fn events(app: &App, action: EventsAction) -> Result<()> {
    app.require("/calendarPage")?;

    match action {
        EventsAction::List => {
            let events = app.client.list_events().await?;
            if !print_structured(app.format, &events)? {
                print_events_table(&events);
            }
        }
        EventsAction::Upcoming => {
            let events = app.client.upcoming_events().await;
            if !print_structured(app.format, &events)? {
                print_upcoming_events(&events);
            }
        }
        EventsAction::Create {
            title,
            date,
            location,
            description,
        } => {
            let event = app
                .client
                .create_event(&NewEvent {
                    title,
                    description,
                    date,
                    location,
                })
                .await?;
            success(&format!("Created event {} on {}", event.title, event.date));
        }
        EventsAction::Delete { id, force } => {
            if !force && !confirm(&format!("Delete event {}?", id)) {
                info("Cancelled");
                return Ok(());
            }
            app.client.delete_event(id).await?;
            success(&format!("Deleted event {}", id));
        }
    }
    Ok(())
}
