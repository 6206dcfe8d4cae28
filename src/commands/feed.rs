use clap::{Args, Subcommand};

use intradash::feed::DEFAULT_FEED_LIMIT;

use super::{authed_client, format_time, CliSession, CommandResult, OutputFormat};

#[derive(Args)]
pub struct FeedCommand {
    #[command(subcommand)]
    pub command: FeedSubcommand,
}

#[derive(Subcommand)]
pub enum FeedSubcommand {
    /// Most recently updated documents
    Documents {
        /// Maximum number of entries
        #[arg(long, short, default_value_t = DEFAULT_FEED_LIMIT)]
        limit: usize,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Latest announcements
    Announcements {
        /// Maximum number of entries
        #[arg(long, short, default_value_t = DEFAULT_FEED_LIMIT)]
        limit: usize,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Recent activity across the organization
    Activity {
        /// Maximum number of entries
        #[arg(long, short, default_value_t = 10)]
        limit: usize,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Dashboard counters with month-over-month trends
    Stats {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

fn signed(trend: i64) -> String {
    if trend > 0 {
        format!("+{}%", trend)
    } else {
        format!("{}%", trend)
    }
}

impl FeedCommand {
    pub async fn run(&self, session: &CliSession) -> CommandResult {
        let client = authed_client(session)?;

        match &self.command {
            FeedSubcommand::Documents { limit, format } => {
                let documents = client.recent_documents(*limit).await?;
                match format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&documents)?),
                    OutputFormat::Text => {
                        if documents.is_empty() {
                            println!("No documents");
                        }
                        for doc in &documents {
                            println!(
                                "{:<40} {:<10} {:>10} bytes  {}",
                                doc.name,
                                doc.status,
                                doc.size,
                                format_time(&doc.updated_at)
                            );
                        }
                    }
                }
            }
            FeedSubcommand::Announcements { limit, format } => {
                let announcements = client.recent_announcements(*limit).await?;
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&announcements)?)
                    }
                    OutputFormat::Text => {
                        if announcements.is_empty() {
                            println!("No announcements");
                        }
                        for a in &announcements {
                            println!("[{}] {}  ({})", a.category, a.title, format_time(&a.created_at));
                            println!("    {}", a.content);
                        }
                    }
                }
            }
            FeedSubcommand::Activity { limit, format } => {
                let activities = client.activities(*limit).await?;
                match format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&activities)?),
                    OutputFormat::Text => {
                        if activities.is_empty() {
                            println!("No activity yet");
                        }
                        for a in &activities {
                            println!("{}  {}", format_time(&a.created_at), a.description);
                        }
                    }
                }
            }
            FeedSubcommand::Stats { format } => {
                let stats = client.dashboard_stats().await?;
                match format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
                    OutputFormat::Text => {
                        println!(
                            "Documents:     {:>6}  {}",
                            stats.total_documents,
                            signed(stats.documents_trend)
                        );
                        println!(
                            "Users:         {:>6}  {}",
                            stats.total_users,
                            signed(stats.users_trend)
                        );
                        println!(
                            "Active users:  {:>6}  {}",
                            stats.active_users,
                            signed(stats.active_users_trend)
                        );
                        println!(
                            "Announcements: {:>6}  {}",
                            stats.total_announcements,
                            signed(stats.announcements_trend)
                        );
                    }
                }
            }
        }

        Ok(())
    }
}
