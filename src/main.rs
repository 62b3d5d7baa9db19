use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tableside::net::feed::FeedEvent;
use tableside::reports::api::DEFAULT_EXPORT_TOP;
use tableside::{ApiError, Console, ConsoleConfig};
use time::Date;
use time::macros::format_description;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("missing credentials; pass --username/--password or set TABLESIDE_USERNAME/TABLESIDE_PASSWORD")]
    MissingCredentials,
    #[error("invalid date `{0}`, expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "tableside", about = "Tableside admin console client")]
struct Cli {
    #[arg(long, env = "TABLESIDE_API_BASE_URL")]
    base_url: Option<String>,

    #[arg(long, env = "TABLESIDE_USERNAME")]
    username: Option<String>,

    #[arg(long, env = "TABLESIDE_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and print the resolved principal.
    Login,
    /// Ask the backend who the session belongs to.
    Whoami,
    /// List one admin collection as JSON.
    List {
        #[arg(value_enum)]
        resource: Resource,
    },
    Report(ReportCommand),
    /// Print one line per order event until interrupted.
    Watch,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Resource {
    Menu,
    Categories,
    Tables,
    Users,
    Promotions,
    Shifts,
    Assignments,
    Stats,
}

#[derive(Args, Debug)]
struct ReportCommand {
    #[command(subcommand)]
    command: ReportSubcommand,
}

#[derive(Subcommand, Debug)]
enum ReportSubcommand {
    Summary,
    Dashboard,
    Export {
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        #[arg(long, default_value_t = DEFAULT_EXPORT_TOP)]
        top: u32,
        #[arg(long, default_value = "report.xlsx")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match cli.base_url.as_deref() {
        Some(url) => ConsoleConfig::for_base_url(url)?,
        None => ConsoleConfig::from_env()?,
    };
    let console = Console::connect(config)?;

    // The session cookie only lives in this process, so every command logs in.
    let (Some(username), Some(password)) = (cli.username.as_deref(), cli.password.as_deref()) else {
        return Err(CliError::MissingCredentials);
    };
    let principal = console.session().login(username, password).await?;
    tracing::info!(username = %principal.username, role = %principal.role, "logged in");

    match cli.command {
        Command::Login => print_json(&principal),
        Command::Whoami => {
            let me = console.session().current_principal().await?;
            print_json(&me)
        }
        Command::List { resource } => run_list(&console, resource).await,
        Command::Report(report) => run_report(&console, report).await,
        Command::Watch => run_watch(&console).await,
    }
}

async fn run_list(console: &Console, resource: Resource) -> Result<(), CliError> {
    match resource {
        Resource::Menu => print_json(&console.menu().items().list().await?),
        Resource::Categories => print_json(&console.menu().categories().await?),
        Resource::Tables => print_json(&console.tables().list().await?),
        Resource::Users => print_json(&console.users().list().await?),
        Resource::Promotions => print_json(&console.promotions().list().await?),
        Resource::Shifts => print_json(&console.shifts().list().await?),
        Resource::Assignments => print_json(&console.shifts().assignments().await?),
        Resource::Stats => print_json(&console.shifts().stats().await?),
    }
}

async fn run_report(console: &Console, report: ReportCommand) -> Result<(), CliError> {
    match report.command {
        ReportSubcommand::Summary => print_json(&console.reports().summary().await?),
        ReportSubcommand::Dashboard => print_json(&console.dashboard().load().await?),
        ReportSubcommand::Export { start, end, top, out } => {
            let bytes = console.reports().export(parse_date(&start)?, parse_date(&end)?, top).await?;
            tokio::fs::write(&out, &bytes).await?;
            println!("wrote {} bytes to {}", bytes.len(), out.display());
            Ok(())
        }
    }
}

async fn run_watch(console: &Console) -> Result<(), CliError> {
    let feed = console.order_feed();
    let mut events = feed.subscribe();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = events.recv() => match event {
                Ok(FeedEvent::Connected) => println!("connected"),
                Ok(FeedEvent::Disconnected) => println!("disconnected; reconnecting"),
                Ok(FeedEvent::OrdersChanged) => println!("orders changed"),
                Err(RecvError::Lagged(skipped)) => tracing::warn!(skipped, "feed consumer lagged"),
                Err(RecvError::Closed) => break,
            },
        }
    }
    feed.shutdown();
    Ok(())
}

fn parse_date(raw: &str) -> Result<Date, CliError> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]")).map_err(|_| CliError::InvalidDate(raw.to_owned()))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
