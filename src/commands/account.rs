use clap::Args;
use std::io::{self, Write};

use intradash::models::{Department, NewUser};

use super::{authed_client, CliSession, CommandResult};

#[derive(Args)]
pub struct LoginArgs {
    /// Username
    pub username: String,

    /// Password (prompted for when omitted)
    #[arg(long)]
    pub password: Option<String>,
}

#[derive(Args)]
pub struct RegisterArgs {
    /// Username (at least 3 characters)
    pub username: String,

    /// Full name
    #[arg(long)]
    pub full_name: String,

    /// Email address
    #[arg(long)]
    pub email: String,

    /// Department (Engineering, Marketing, Sales, Finance, HR, Operations, Executive)
    #[arg(long)]
    pub department: Department,

    /// Job title
    #[arg(long)]
    pub title: String,

    /// Password (prompted for when omitted)
    #[arg(long)]
    pub password: Option<String>,
}

fn prompt(label: &str) -> io::Result<String> {
    print!("{}: ", label);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}

impl LoginArgs {
    pub async fn run(&self, session: &mut CliSession) -> CommandResult {
        let password = match &self.password {
            Some(p) => p.clone(),
            None => prompt("Password")?,
        };

        let user = session.login(&self.username, &password).await?;
        println!("Logged in as {} ({})", user.full_name, user.role.label());
        Ok(())
    }
}

impl RegisterArgs {
    pub async fn run(&self, session: &CliSession) -> CommandResult {
        let password = match &self.password {
            Some(p) => p.clone(),
            None => {
                let first = prompt("Password")?;
                let second = prompt("Confirm password")?;
                if first != second {
                    return Err("Passwords do not match".into());
                }
                first
            }
        };

        let user = session
            .register(NewUser {
                username: self.username.clone(),
                password,
                full_name: self.full_name.clone(),
                email: self.email.clone(),
                department: self.department,
                title: self.title.clone(),
                role: None,
            })
            .await?;

        println!("Registered {}", user.username);
        println!("Log in with: intradash login {}", user.username);
        Ok(())
    }
}

/// Revokes the server token (best effort) and forgets the local session.
pub async fn logout(session: &mut CliSession) -> CommandResult {
    if !session.is_authenticated() {
        println!("Not logged in");
        return Ok(());
    }

    if let Ok(client) = authed_client(session) {
        if let Err(e) = client.logout().await {
            tracing::warn!("Server logout failed: {}", e);
        }
    }
    if let Err(e) = session.logout() {
        return Err(format!("Logged out, but the saved session could not be removed: {}", e).into());
    }
    println!("Logged out");
    Ok(())
}

pub async fn whoami(session: &CliSession) -> CommandResult {
    match session.current_user() {
        Some(user) => {
            println!("{}", user);
            println!("Server: {}", session.authenticator().base_url());
        }
        None => println!("Not logged in"),
    }
    Ok(())
}
