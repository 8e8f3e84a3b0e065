use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use edulog::cli::{self, commands, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.quiet { "edulog=warn" } else { "edulog=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Commands::Init { api_url } = cli.command {
        return commands::init(api_url).await;
    }

    let app = commands::App::load(cli.config.as_deref(), cli.format)?;

    let result = match cli.command {
        Commands::Init { .. } => Ok(()),
        Commands::Login { email, password } => commands::login(&app, &email, password).await,
        Commands::Register {
            email,
            username,
            role,
            student_id,
            department,
            password,
        } => {
            commands::register(&app, &email, &username, &role, student_id, department, password)
                .await
        }
        Commands::Logout => commands::logout(&app).await,
        Commands::Whoami => commands::whoami(&app).await,
        Commands::Open { route } => commands::open(&app, &route).await,
        Commands::ClockIn => commands::clock_in(&app).await,
        Commands::ClockOut => commands::clock_out(&app).await,
        Commands::Status => commands::status(&app).await,
        Commands::Stats { student_id } => commands::stats(&app, student_id).await,
        Commands::Dashboard => commands::dashboard(&app).await,
        Commands::Students { action } => commands::students(&app, action).await,
        Commands::Attendance { action } => commands::attendance(&app, action).await,
        Commands::Reports { action } => commands::reports(&app, action).await,
        Commands::Events { action } => commands::events(&app, action).await,
    };

    if let Err(e) = &result {
        if let Some(edulog::Error::SessionExpired | edulog::Error::RefreshFailed(_)) =
            e.downcast_ref::<edulog::Error>()
        {
            cli::warn("Your session has expired");
        }
    }

    result
}
