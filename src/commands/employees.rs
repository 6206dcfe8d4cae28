use clap::Args;

use intradash::directory::DirectoryFilter;
use intradash::models::Department;

use super::{authed_client, CliSession, CommandResult, OutputFormat};

#[derive(Args)]
pub struct EmployeesArgs {
    /// Match against full name, title, and username
    #[arg(long, short)]
    pub search: Option<String>,

    /// Only show one department
    #[arg(long, short)]
    pub department: Option<Department>,

    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl EmployeesArgs {
    pub async fn run(&self, session: &CliSession) -> CommandResult {
        let client = authed_client(session)?;
        let filter = DirectoryFilter {
            search: self.search.clone(),
            department: self.department,
        };
        let employees = client.employees(&filter).await?;

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&employees)?),
            OutputFormat::Text => {
                if employees.is_empty() {
                    println!("No employees found");
                    return Ok(());
                }
                println!("{:<24} {:<12} {:<28} Email", "Name", "Department", "Title");
                println!("{}", "-".repeat(90));
                for e in &employees {
                    println!(
                        "{:<24} {:<12} {:<28} {}",
                        e.full_name,
                        e.department.label(),
                        e.title,
                        e.email
                    );
                }
            }
        }
        Ok(())
    }
}
