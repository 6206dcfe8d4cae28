mod activity_repo;
mod announcement_repo;
mod document_repo;
mod finance_repo;
mod user_repo;

pub use activity_repo::ActivityRepository;
pub use announcement_repo::AnnouncementRepository;
pub use document_repo::DocumentRepository;
pub use finance_repo::{
    BudgetRepository, ExpenseRepository, InvoiceRepository, RevenueRepository,
};
pub use user_repo::UserRepository;

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;
use std::path::PathBuf;
use std::str::FromStr;

/// Storage adapter selected by the database URL scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Embedded file database, used in development.
    Sqlite,
    /// Networked database, used in production.
    Postgres,
}

impl Backend {
    pub fn from_url(url: &str) -> Option<Self> {
        if url.starts_with("sqlite:") {
            Some(Backend::Sqlite)
        } else if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Some(Backend::Postgres)
        } else {
            None
        }
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Sqlite => write!(f, "sqlite"),
            Backend::Postgres => write!(f, "postgres"),
        }
    }
}

/// Every repository shares one pool; handing them out from here keeps
/// callers unaware of which adapter is behind it.
#[derive(Debug, Clone)]
pub struct Database {
    pool: AnyPool,
    backend: Backend,
}

impl Database {
    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }

    pub fn documents(&self) -> DocumentRepository {
        DocumentRepository::new(self.pool.clone())
    }

    pub fn announcements(&self) -> AnnouncementRepository {
        AnnouncementRepository::new(self.pool.clone())
    }

    pub fn activities(&self) -> ActivityRepository {
        ActivityRepository::new(self.pool.clone())
    }

    pub fn invoices(&self) -> InvoiceRepository {
        InvoiceRepository::new(self.pool.clone())
    }

    pub fn expenses(&self) -> ExpenseRepository {
        ExpenseRepository::new(self.pool.clone())
    }

    pub fn revenue(&self) -> RevenueRepository {
        RevenueRepository::new(self.pool.clone())
    }

    pub fn budgets(&self) -> BudgetRepository {
        BudgetRepository::new(self.pool.clone())
    }
}

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        username TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        full_name TEXT NOT NULL,
        email TEXT NOT NULL,
        department TEXT NOT NULL,
        title TEXT NOT NULL,
        role TEXT NOT NULL,
        created_at TEXT NOT NULL,
        deactivated_at TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS documents (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        content_type TEXT NOT NULL,
        size BIGINT NOT NULL,
        status TEXT NOT NULL,
        created_by_id TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS announcements (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        content TEXT NOT NULL,
        category TEXT NOT NULL,
        created_by_id TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS activities (
        id TEXT PRIMARY KEY,
        kind TEXT NOT NULL,
        description TEXT NOT NULL,
        user_id TEXT NOT NULL,
        document_id TEXT,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS invoices (
        id TEXT PRIMARY KEY,
        number TEXT NOT NULL,
        client_name TEXT NOT NULL,
        amount BIGINT NOT NULL,
        status TEXT NOT NULL,
        due_date TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS expenses (
        id TEXT PRIMARY KEY,
        category TEXT NOT NULL,
        amount BIGINT NOT NULL,
        spent_on TEXT NOT NULL,
        description TEXT,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS revenue (
        id TEXT PRIMARY KEY,
        source TEXT NOT NULL,
        amount BIGINT NOT NULL,
        received_on TEXT NOT NULL,
        description TEXT,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS budgets (
        id TEXT PRIMARY KEY,
        category TEXT NOT NULL,
        allocated BIGINT NOT NULL,
        spent BIGINT NOT NULL DEFAULT 0,
        period TEXT NOT NULL,
        fiscal_year BIGINT NOT NULL,
        period_month BIGINT,
        period_quarter BIGINT,
        created_at TEXT NOT NULL
    )
    "#,
];

/// Opens the database named by `url` and creates any missing tables.
pub async fn connect(url: &str) -> Result<Database, sqlx::Error> {
    let backend = Backend::from_url(url)
        .ok_or_else(|| sqlx::Error::Configuration(format!("unsupported database URL: {}", url).into()))?;

    if backend == Backend::Sqlite {
        if let Some(parent) = sqlite_file(url).as_ref().and_then(|p| p.parent()) {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
    }

    sqlx::any::install_default_drivers();

    let pool = AnyPoolOptions::new()
        .max_connections(5)
        .connect(url)
        .await?;

    for statement in SCHEMA {
        sqlx::query(statement).execute(&pool).await?;
    }

    tracing::info!(%backend, "Database ready");
    Ok(Database { pool, backend })
}

/// File path of a `sqlite:` URL, or `None` for in-memory databases.
fn sqlite_file(url: &str) -> Option<PathBuf> {
    let rest = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or(rest);
    if path.is_empty() || path == ":memory:" {
        None
    } else {
        Some(PathBuf::from(path))
    }
}

pub(crate) fn decode_error(message: impl Into<String>) -> sqlx::Error {
    sqlx::Error::Decode(message.into().into())
}

pub(crate) fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, sqlx::Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| decode_error(format!("invalid timestamp '{}': {}", value, e)))
}

pub(crate) fn parse_date(value: &str) -> Result<NaiveDate, sqlx::Error> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| decode_error(format!("invalid date '{}': {}", value, e)))
}

pub(crate) fn parse_enum<T: FromStr<Err = String>>(value: &str) -> Result<T, sqlx::Error> {
    value.parse().map_err(decode_error)
}

#[cfg(test)]
pub(crate) async fn test_db(dir: &std::path::Path) -> Database {
    let url = format!("sqlite:{}?mode=rwc", dir.join("test.db").display());
    connect(&url).await.unwrap()
}
