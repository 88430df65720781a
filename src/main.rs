//! Employee Tracker CLI Entry Point
//!
//! Loads connection settings, opens the database connection and runs the
//! interactive menu until the operator chooses `Exit`.
//!
//! Menu output goes to stdout. Logs go to stderr (`RUST_LOG`, default `warn`).

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use employee_tracker::config::{load_dotenv, DbConfig};
use employee_tracker::{Menu, PgRepository, Result, TerminalPrompter};

/// Employee Tracker - manage departments, roles and employees
///
/// Connection settings are read from DB_USER, DB_PASSWORD, DB_HOST, DB_NAME
/// and DB_PORT (a `.env` file in the working directory is honoured).
#[derive(Parser)]
#[command(name = "employee-tracker")]
#[command(about = "Interactive CLI for managing departments, roles and employees")]
#[command(version)]
struct Cli {}

#[tokio::main]
async fn main() -> ExitCode {
    let _cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    load_dotenv();
    let config = DbConfig::from_env()?;

    let repo = PgRepository::connect(&config).await?;
    println!("Connected to PostgreSQL database");
    println!("Welcome to Employee Tracker!");

    let mut menu = Menu::new(&repo, TerminalPrompter::new(), io::stdout());
    menu.run().await
}
