use sqlx::AnyPool;

use super::{decode_error, parse_date, parse_enum, parse_timestamp};
use crate::models::{Budget, Expense, Invoice, Revenue};

const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct InvoiceRepository {
    pool: AnyPool,
}

#[derive(sqlx::FromRow)]
struct InvoiceRow {
    id: String,
    number: String,
    client_name: String,
    amount: i64,
    status: String,
    due_date: String,
    created_at: String,
}

impl TryFrom<InvoiceRow> for Invoice {
    type Error = sqlx::Error;

    fn try_from(row: InvoiceRow) -> Result<Self, Self::Error> {
        Ok(Invoice {
            status: parse_enum(&row.status)?,
            due_date: parse_date(&row.due_date)?,
            created_at: parse_timestamp(&row.created_at)?,
            id: row.id,
            number: row.number,
            client_name: row.client_name,
            amount: row.amount,
        })
    }
}

impl InvoiceRepository {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, invoice: &Invoice) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO invoices (id, number, client_name, amount, status, due_date, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&invoice.id)
        .bind(&invoice.number)
        .bind(&invoice.client_name)
        .bind(invoice.amount)
        .bind(invoice.status.to_string())
        .bind(invoice.due_date.format(DATE_FORMAT).to_string())
        .bind(invoice.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<Invoice>, sqlx::Error> {
        let row: Option<InvoiceRow> = sqlx::query_as(
            "SELECT id, number, client_name, amount, status, due_date, created_at FROM invoices WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Invoice::try_from).transpose()
    }

    /// Invoices ordered by due date, soonest first.
    pub async fn list(&self) -> Result<Vec<Invoice>, sqlx::Error> {
        let rows: Vec<InvoiceRow> = sqlx::query_as(
            "SELECT id, number, client_name, amount, status, due_date, created_at FROM invoices ORDER BY due_date, number",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Invoice::try_from).collect()
    }

    pub async fn update(&self, invoice: &Invoice) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE invoices
            SET client_name = $1, amount = $2, status = $3, due_date = $4
            WHERE id = $5
            "#,
        )
        .bind(&invoice.client_name)
        .bind(invoice.amount)
        .bind(invoice.status.to_string())
        .bind(invoice.due_date.format(DATE_FORMAT).to_string())
        .bind(&invoice.id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM invoices WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

pub struct ExpenseRepository {
    pool: AnyPool,
}

#[derive(sqlx::FromRow)]
struct ExpenseRow {
    id: String,
    category: String,
    amount: i64,
    spent_on: String,
    description: Option<String>,
    created_at: String,
}

impl TryFrom<ExpenseRow> for Expense {
    type Error = sqlx::Error;

    fn try_from(row: ExpenseRow) -> Result<Self, Self::Error> {
        Ok(Expense {
            date: parse_date(&row.spent_on)?,
            created_at: parse_timestamp(&row.created_at)?,
            id: row.id,
            category: row.category,
            amount: row.amount,
            description: row.description,
        })
    }
}

impl ExpenseRepository {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, expense: &Expense) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO expenses (id, category, amount, spent_on, description, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&expense.id)
        .bind(&expense.category)
        .bind(expense.amount)
        .bind(expense.date.format(DATE_FORMAT).to_string())
        .bind(expense.description.as_deref())
        .bind(expense.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<Expense>, sqlx::Error> {
        let row: Option<ExpenseRow> = sqlx::query_as(
            "SELECT id, category, amount, spent_on, description, created_at FROM expenses WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Expense::try_from).transpose()
    }

    /// Expenses ordered by date, most recent first.
    pub async fn list(&self) -> Result<Vec<Expense>, sqlx::Error> {
        let rows: Vec<ExpenseRow> = sqlx::query_as(
            "SELECT id, category, amount, spent_on, description, created_at FROM expenses ORDER BY spent_on DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Expense::try_from).collect()
    }

    pub async fn update(&self, expense: &Expense) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE expenses
            SET category = $1, amount = $2, spent_on = $3, description = $4
            WHERE id = $5
            "#,
        )
        .bind(&expense.category)
        .bind(expense.amount)
        .bind(expense.date.format(DATE_FORMAT).to_string())
        .bind(expense.description.as_deref())
        .bind(&expense.id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

pub struct RevenueRepository {
    pool: AnyPool,
}

#[derive(sqlx::FromRow)]
struct RevenueRow {
    id: String,
    source: String,
    amount: i64,
    received_on: String,
    description: Option<String>,
    created_at: String,
}

impl TryFrom<RevenueRow> for Revenue {
    type Error = sqlx::Error;

    fn try_from(row: RevenueRow) -> Result<Self, Self::Error> {
        Ok(Revenue {
            date: parse_date(&row.received_on)?,
            created_at: parse_timestamp(&row.created_at)?,
            id: row.id,
            source: row.source,
            amount: row.amount,
            description: row.description,
        })
    }
}

impl RevenueRepository {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, revenue: &Revenue) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO revenue (id, source, amount, received_on, description, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&revenue.id)
        .bind(&revenue.source)
        .bind(revenue.amount)
        .bind(revenue.date.format(DATE_FORMAT).to_string())
        .bind(revenue.description.as_deref())
        .bind(revenue.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<Revenue>, sqlx::Error> {
        let row: Option<RevenueRow> = sqlx::query_as(
            "SELECT id, source, amount, received_on, description, created_at FROM revenue WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Revenue::try_from).transpose()
    }

    /// Revenue entries ordered by date, most recent first.
    pub async fn list(&self) -> Result<Vec<Revenue>, sqlx::Error> {
        let rows: Vec<RevenueRow> = sqlx::query_as(
            "SELECT id, source, amount, received_on, description, created_at FROM revenue ORDER BY received_on DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Revenue::try_from).collect()
    }

    pub async fn update(&self, revenue: &Revenue) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE revenue
            SET source = $1, amount = $2, received_on = $3, description = $4
            WHERE id = $5
            "#,
        )
        .bind(&revenue.source)
        .bind(revenue.amount)
        .bind(revenue.date.format(DATE_FORMAT).to_string())
        .bind(revenue.description.as_deref())
        .bind(&revenue.id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM revenue WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

pub struct BudgetRepository {
    pool: AnyPool,
}

#[derive(sqlx::FromRow)]
struct BudgetRow {
    id: String,
    category: String,
    allocated: i64,
    spent: i64,
    period: String,
    fiscal_year: i64,
    period_month: Option<i64>,
    period_quarter: Option<i64>,
    created_at: String,
}

fn narrow<T: TryFrom<i64>>(column: &str, value: i64) -> Result<T, sqlx::Error> {
    T::try_from(value).map_err(|_| decode_error(format!("{} out of range: {}", column, value)))
}

impl TryFrom<BudgetRow> for Budget {
    type Error = sqlx::Error;

    fn try_from(row: BudgetRow) -> Result<Self, Self::Error> {
        Ok(Budget {
            period: parse_enum(&row.period)?,
            year: narrow("fiscal_year", row.fiscal_year)?,
            month: row
                .period_month
                .map(|m| narrow("period_month", m))
                .transpose()?,
            quarter: row
                .period_quarter
                .map(|q| narrow("period_quarter", q))
                .transpose()?,
            created_at: parse_timestamp(&row.created_at)?,
            id: row.id,
            category: row.category,
            allocated: row.allocated,
            spent: row.spent,
        })
    }
}

const BUDGET_COLUMNS: &str = "id, category, allocated, spent, period, fiscal_year, period_month, period_quarter, created_at";

impl BudgetRepository {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, budget: &Budget) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO budgets (id, category, allocated, spent, period, fiscal_year, period_month, period_quarter, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(&budget.id)
        .bind(&budget.category)
        .bind(budget.allocated)
        .bind(budget.spent)
        .bind(budget.period.to_string())
        .bind(i64::from(budget.year))
        .bind(budget.month.map(i64::from))
        .bind(budget.quarter.map(i64::from))
        .bind(budget.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<Budget>, sqlx::Error> {
        let row: Option<BudgetRow> = sqlx::query_as(&format!(
            "SELECT {} FROM budgets WHERE id = $1",
            BUDGET_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Budget::try_from).transpose()
    }

    /// Budgets ordered by year, then category.
    pub async fn list(&self) -> Result<Vec<Budget>, sqlx::Error> {
        let rows: Vec<BudgetRow> = sqlx::query_as(&format!(
            "SELECT {} FROM budgets ORDER BY fiscal_year DESC, category, period_month, period_quarter",
            BUDGET_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Budget::try_from).collect()
    }

    pub async fn update(&self, budget: &Budget) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE budgets
            SET category = $1, allocated = $2, spent = $3, period = $4,
                fiscal_year = $5, period_month = $6, period_quarter = $7
            WHERE id = $8
            "#,
        )
        .bind(&budget.category)
        .bind(budget.allocated)
        .bind(budget.spent)
        .bind(budget.period.to_string())
        .bind(i64::from(budget.year))
        .bind(budget.month.map(i64::from))
        .bind(budget.quarter.map(i64::from))
        .bind(&budget.id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM budgets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_db;
    use crate::models::{
        BudgetPatch, BudgetPeriod, ExpensePatch, InvoiceStatus, NewBudget, NewExpense, NewInvoice,
        NewRevenue, RevenuePatch,
    };
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_invoices_ordered_by_due_date() {
        let temp_dir = tempdir().unwrap();
        let repo = test_db(temp_dir.path()).await.invoices();

        for (number, due) in [("INV-2", date(2025, 3, 1)), ("INV-1", date(2025, 1, 15))] {
            let invoice = NewInvoice {
                number: number.to_string(),
                client_name: "Acme".to_string(),
                amount: 125_000,
                status: InvoiceStatus::Pending,
                due_date: due,
            }
            .into_invoice();
            repo.create(&invoice).await.unwrap();
        }

        let invoices = repo.list().await.unwrap();
        assert_eq!(invoices[0].number, "INV-1");
        assert_eq!(invoices[0].due_date, date(2025, 1, 15));
        assert_eq!(invoices[1].amount, 125_000);
    }

    #[tokio::test]
    async fn test_invoice_update_and_delete() {
        let temp_dir = tempdir().unwrap();
        let repo = test_db(temp_dir.path()).await.invoices();

        let mut invoice = NewInvoice {
            number: "INV-9".to_string(),
            client_name: "Globex".to_string(),
            amount: 500,
            status: InvoiceStatus::Pending,
            due_date: date(2025, 5, 1),
        }
        .into_invoice();
        repo.create(&invoice).await.unwrap();

        invoice.status = InvoiceStatus::Overdue;
        assert!(repo.update(&invoice).await.unwrap());
        let stored = repo.get_by_id(&invoice.id).await.unwrap().unwrap();
        assert_eq!(stored.status, InvoiceStatus::Overdue);

        assert!(repo.delete(&invoice.id).await.unwrap());
        assert!(repo.get_by_id(&invoice.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expense_lifecycle() {
        let temp_dir = tempdir().unwrap();
        let repo = test_db(temp_dir.path()).await.expenses();

        let mut expense = NewExpense {
            category: "Travel".to_string(),
            amount: 4200,
            date: date(2025, 4, 2),
            description: None,
        }
        .into_expense();
        repo.create(&expense).await.unwrap();

        let stored = repo.get_by_id(&expense.id).await.unwrap().unwrap();
        assert_eq!(stored.description, None);
        assert_eq!(stored.date, date(2025, 4, 2));

        ExpensePatch {
            description: Some("Client visit".to_string()),
            ..Default::default()
        }
        .apply(&mut expense);
        assert!(repo.update(&expense).await.unwrap());

        let stored = repo.get_by_id(&expense.id).await.unwrap().unwrap();
        assert_eq!(stored.description.as_deref(), Some("Client visit"));
        assert_eq!(repo.list().await.unwrap().len(), 1);

        assert!(repo.delete(&expense.id).await.unwrap());
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_revenue_lifecycle() {
        let temp_dir = tempdir().unwrap();
        let repo = test_db(temp_dir.path()).await.revenue();

        for (source, day) in [("Consulting", 3), ("Licensing", 20)] {
            let revenue = NewRevenue {
                source: source.to_string(),
                amount: 250_000,
                date: date(2025, 2, day),
                description: None,
            }
            .into_revenue();
            repo.create(&revenue).await.unwrap();
        }

        let mut entries = repo.list().await.unwrap();
        assert_eq!(entries[0].source, "Licensing");
        assert_eq!(entries[1].date, date(2025, 2, 3));

        let mut revenue = entries.remove(1);
        RevenuePatch {
            amount: Some(300_000),
            description: Some("Q1 retainer".to_string()),
            ..Default::default()
        }
        .apply(&mut revenue);
        assert!(repo.update(&revenue).await.unwrap());

        let stored = repo.get_by_id(&revenue.id).await.unwrap().unwrap();
        assert_eq!(stored.amount, 300_000);
        assert_eq!(stored.description.as_deref(), Some("Q1 retainer"));

        assert!(repo.delete(&revenue.id).await.unwrap());
        assert!(!repo.delete(&revenue.id).await.unwrap());
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_budget_lifecycle() {
        let temp_dir = tempdir().unwrap();
        let repo = test_db(temp_dir.path()).await.budgets();

        let yearly = NewBudget {
            category: "Software".to_string(),
            allocated: 1_200_000,
            spent: 0,
            period: BudgetPeriod::Yearly,
            year: 2025,
            month: None,
            quarter: None,
        }
        .into_budget();
        let mut quarterly = NewBudget {
            category: "Marketing".to_string(),
            allocated: 500_000,
            spent: 125_000,
            period: BudgetPeriod::Quarterly,
            year: 2025,
            month: None,
            quarter: Some(2),
        }
        .into_budget();
        repo.create(&yearly).await.unwrap();
        repo.create(&quarterly).await.unwrap();

        let budgets = repo.list().await.unwrap();
        assert_eq!(budgets.len(), 2);
        assert_eq!(budgets[0].category, "Marketing");
        assert_eq!(budgets[0].quarter, Some(2));
        assert_eq!(budgets[0].month, None);
        assert_eq!(budgets[1].id, yearly.id);
        assert_eq!(budgets[1].period, BudgetPeriod::Yearly);

        BudgetPatch {
            period: Some(BudgetPeriod::Monthly),
            month: Some(5),
            ..Default::default()
        }
        .apply(&mut quarterly)
        .unwrap();
        assert!(repo.update(&quarterly).await.unwrap());

        let stored = repo.get_by_id(&quarterly.id).await.unwrap().unwrap();
        assert_eq!(stored.period, BudgetPeriod::Monthly);
        assert_eq!(stored.month, Some(5));
        assert_eq!(stored.quarter, None);
        assert_eq!(stored.spent, 125_000);

        assert!(repo.delete(&yearly.id).await.unwrap());
        assert!(repo.get_by_id(&yearly.id).await.unwrap().is_none());
    }
}
