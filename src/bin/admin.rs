//! Intradash Admin CLI
//!
//! Manages user accounts directly in the server's database.
//!
//! # Usage
//!
//! ```bash
//! intradash-admin user add jdoe --full-name "Jane Doe" --email jane@example.com \
//!     --department Engineering --title "Staff Engineer" --role admin
//! intradash-admin user list
//! intradash-admin user role jdoe management
//! intradash-admin user deactivate jdoe
//! ```
//!
//! # Environment Variables
//!
//! - `INTRADASH_DATABASE_URL`: Database to manage (see `intradash config show`)
//! - `INTRADASH_ADMIN_PASSWORD`: Password for `user add` when `--password` is omitted

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use intradash::auth::{Accounts, PasswordHasher};
use intradash::config::Config;
use intradash::db::{self, Database};
use intradash::models::{Department, NewUser, Role};

const PASSWORD_ENV: &str = "INTRADASH_ADMIN_PASSWORD";

#[derive(Parser)]
#[command(name = "intradash-admin")]
#[command(version)]
#[command(about = "Intradash user administration tool")]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage users
    User(UserCommand),
}

#[derive(Args)]
struct UserCommand {
    #[command(subcommand)]
    command: UserSubcommand,
}

#[derive(Subcommand)]
enum UserSubcommand {
    /// Add a new user
    Add {
        /// Login name
        username: String,
        /// User's full name
        #[arg(long)]
        full_name: String,
        /// User's email address
        #[arg(long)]
        email: String,
        /// Department
        #[arg(long)]
        department: Department,
        /// Job title
        #[arg(long)]
        title: String,
        /// Access level
        #[arg(long, default_value = "employee")]
        role: Role,
        /// Initial password (falls back to INTRADASH_ADMIN_PASSWORD)
        #[arg(long)]
        password: Option<String>,
    },
    /// List all users, deactivated ones included
    List,
    /// Change a user's role
    Role {
        /// Login name
        username: String,
        /// New access level
        role: Role,
    },
    /// Deactivate a user
    Deactivate {
        /// Login name
        username: String,
    },
}

type AdminResult = Result<(), Box<dyn std::error::Error>>;

fn resolve_password(flag: Option<String>) -> Result<String, String> {
    flag.or_else(|| std::env::var(PASSWORD_ENV).ok())
        .filter(|p| !p.is_empty())
        .ok_or_else(|| format!("No password given. Pass --password or set {}", PASSWORD_ENV))
}

async fn add_user(db: &Database, new_user: NewUser) -> AdminResult {
    let accounts = Accounts::new(db, PasswordHasher::new());
    let user = accounts.create_account(new_user).await?;

    println!("Added user: {}", user.username);
    println!("  Name: {}", user.full_name);
    println!("  Department: {}", user.department);
    println!("  Role: {}", user.role.label());

    Ok(())
}

async fn list_users(db: &Database) -> AdminResult {
    let users = db.users().list_all().await?;

    if users.is_empty() {
        println!("No users registered.");
        return Ok(());
    }

    println!(
        "{:<20} {:<24} {:<12} {:<14} {:<8}",
        "USERNAME", "NAME", "DEPARTMENT", "ROLE", "STATUS"
    );
    println!("{}", "-".repeat(82));

    for user in &users {
        let status = if user.is_active() { "active" } else { "inactive" };
        println!(
            "{:<20} {:<24} {:<12} {:<14} {:<8}",
            user.username,
            user.full_name,
            user.department.label(),
            user.role.label(),
            status
        );
    }

    println!();
    println!("Total: {} user(s)", users.len());

    Ok(())
}

async fn set_role(db: &Database, username: &str, role: Role) -> AdminResult {
    let repo = db.users();
    let user = repo
        .get_by_username(username)
        .await?
        .ok_or_else(|| format!("User '{}' not found", username))?;

    repo.update_role(&user.id, role).await?;
    println!("{} is now {}", username, role.label());

    Ok(())
}

async fn deactivate_user(db: &Database, username: &str) -> AdminResult {
    let repo = db.users();
    let user = repo
        .get_by_username(username)
        .await?
        .ok_or_else(|| format!("User '{}' not found", username))?;

    if !repo.deactivate(&user.id, Utc::now()).await? {
        return Err(format!("User '{}' is already deactivated", username).into());
    }
    println!("Deactivated user: {}", username);

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> AdminResult {
    let cli = Cli::parse();
    let config = Config::load(cli.config)?;
    let db = db::connect(&config.database_url.value).await?;

    match cli.command {
        Commands::User(user_cmd) => match user_cmd.command {
            UserSubcommand::Add {
                username,
                full_name,
                email,
                department,
                title,
                role,
                password,
            } => {
                let password = resolve_password(password)?;
                add_user(
                    &db,
                    NewUser {
                        username,
                        password,
                        full_name,
                        email,
                        department,
                        title,
                        role: Some(role),
                    },
                )
                .await
            }
            UserSubcommand::List => list_users(&db).await,
            UserSubcommand::Role { username, role } => set_role(&db, &username, role).await,
            UserSubcommand::Deactivate { username } => deactivate_user(&db, &username).await,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_flag_wins() {
        assert_eq!(resolve_password(Some("s3cret!".to_string())).unwrap(), "s3cret!");
    }

    #[test]
    fn test_user_add_parses_role_and_department() {
        let cli = Cli::try_parse_from([
            "intradash-admin",
            "user",
            "add",
            "jdoe",
            "--full-name",
            "Jane Doe",
            "--email",
            "jane@example.com",
            "--department",
            "hr",
            "--title",
            "Recruiter",
            "--role",
            "management",
        ])
        .unwrap();

        let Commands::User(UserCommand {
            command: UserSubcommand::Add { department, role, password, .. },
        }) = cli.command
        else {
            panic!("expected user add");
        };
        assert_eq!(department, Department::HumanResources);
        assert_eq!(role, Role::Management);
        assert!(password.is_none());
    }
}
