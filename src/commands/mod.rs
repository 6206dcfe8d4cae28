mod account;
mod config_cmd;
mod employees;
mod feed;
mod notifications;

pub use account::{logout, whoami, LoginArgs, RegisterArgs};
pub use config_cmd::ConfigCommand;
pub use employees::EmployeesArgs;
pub use feed::FeedCommand;
pub use notifications::NotificationsCommand;

use clap::ValueEnum;
use std::error::Error;

use intradash::auth::{FileStorage, SessionStore};
use intradash::client::ApiClient;
use intradash::config::Config;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

pub type CommandResult = Result<(), Box<dyn Error>>;

/// Session persisted under the configured data directory.
pub type CliSession = SessionStore<ApiClient, FileStorage>;

pub fn open_session(config: &Config) -> CliSession {
    SessionStore::bootstrap(
        ApiClient::new(config.server_url.value.as_str()),
        FileStorage::new(&config.data_dir.value),
    )
}

/// Client carrying the stored bearer token.
pub fn authed_client(session: &CliSession) -> Result<ApiClient, Box<dyn Error>> {
    match session.token() {
        Some(token) => Ok(session
            .authenticator()
            .clone()
            .with_token(Some(token.to_string()))),
        None => Err("Not logged in. Run `intradash login <username>` first.".into()),
    }
}

pub(crate) fn format_time(t: &chrono::DateTime<chrono::Utc>) -> String {
    t.with_timezone(&chrono::Local)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}
