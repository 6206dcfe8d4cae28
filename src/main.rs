use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{
    ConfigCommand, EmployeesArgs, FeedCommand, LoginArgs, NotificationsCommand, RegisterArgs,
};
use intradash::config::Config;

#[derive(Parser)]
#[command(name = "intradash")]
#[command(version)]
#[command(about = "Company intranet dashboard CLI", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and remember the session
    Login(LoginArgs),

    /// End the current session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Create a new employee account
    Register(RegisterArgs),

    /// Browse the employee directory
    Employees(EmployeesArgs),

    /// Read and manage notifications
    Notifications(NotificationsCommand),

    /// Recent documents, announcements, and activity
    Feed(FeedCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = Config::load(cli.config)?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "intradash=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut session = commands::open_session(&config);

    match cli.command {
        Some(Commands::Login(args)) => args.run(&mut session).await?,
        Some(Commands::Logout) => commands::logout(&mut session).await?,
        Some(Commands::Whoami) => commands::whoami(&session).await?,
        Some(Commands::Register(args)) => args.run(&session).await?,
        Some(Commands::Employees(args)) => args.run(&session).await?,
        Some(Commands::Notifications(cmd)) => cmd.run(&session).await?,
        Some(Commands::Feed(cmd)) => cmd.run(&session).await?,
        Some(Commands::Config(cmd)) => cmd.run(&config)?,
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}
