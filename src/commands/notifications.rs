use clap::{Args, Subcommand};

use super::{authed_client, format_time, CliSession, CommandResult, OutputFormat};

#[derive(Args)]
pub struct NotificationsCommand {
    #[command(subcommand)]
    pub command: NotificationsSubcommand,
}

#[derive(Subcommand)]
pub enum NotificationsSubcommand {
    /// List notifications, newest first
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Only show unread notifications
        #[arg(long)]
        unread: bool,
    },

    /// Mark one notification as read
    Read {
        /// Notification ID
        id: u64,
    },

    /// Mark every notification as read
    ReadAll,

    /// Remove one notification
    Clear {
        /// Notification ID
        id: u64,
    },

    /// Remove all notifications
    ClearAll,
}

impl NotificationsCommand {
    pub async fn run(&self, session: &CliSession) -> CommandResult {
        let client = authed_client(session)?;

        match &self.command {
            NotificationsSubcommand::List { format, unread } => {
                let snapshot = client.notifications().await?;
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&snapshot)?);
                    }
                    OutputFormat::Text => {
                        let shown: Vec<_> = snapshot
                            .notifications
                            .iter()
                            .filter(|n| !*unread || !n.read)
                            .collect();
                        if shown.is_empty() {
                            println!("No notifications");
                            return Ok(());
                        }

                        println!("{} unread\n", snapshot.unread_count);
                        for n in shown {
                            let marker = if n.read { " " } else { "*" };
                            println!(
                                "{} #{:<4} {} {}  ({})",
                                marker,
                                n.id,
                                n.kind.symbol(),
                                n.title,
                                format_time(&n.timestamp)
                            );
                            println!("         {}", n.message);
                            if let Some(link) = &n.link {
                                println!("         {}", link);
                            }
                        }
                    }
                }
            }
            NotificationsSubcommand::Read { id } => {
                let snapshot = client.mark_read(*id).await?;
                println!("{} unread", snapshot.unread_count);
            }
            NotificationsSubcommand::ReadAll => {
                let updated = client.mark_all_read().await?;
                println!("Marked {} notification(s) as read", updated);
            }
            NotificationsSubcommand::Clear { id } => {
                client.clear_notification(*id).await?;
                println!("Cleared notification #{}", id);
            }
            NotificationsSubcommand::ClearAll => {
                client.clear_notifications().await?;
                println!("Cleared all notifications");
            }
        }

        Ok(())
    }
}
