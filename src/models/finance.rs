use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Paid,
    #[default]
    Pending,
    Overdue,
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvoiceStatus::Paid => write!(f, "paid"),
            InvoiceStatus::Pending => write!(f, "pending"),
            InvoiceStatus::Overdue => write!(f, "overdue"),
        }
    }
}

impl FromStr for InvoiceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "paid" => Ok(InvoiceStatus::Paid),
            "pending" => Ok(InvoiceStatus::Pending),
            "overdue" => Ok(InvoiceStatus::Overdue),
            _ => Err(format!(
                "Invalid invoice status '{}'. Valid options: paid, pending, overdue",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: String,
    pub number: String,
    pub client_name: String,
    /// Amount in cents.
    pub amount: i64,
    pub status: InvoiceStatus,
    pub due_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Fields accepted when creating an invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInvoice {
    pub number: String,
    pub client_name: String,
    pub amount: i64,
    #[serde(default)]
    pub status: InvoiceStatus,
    pub due_date: NaiveDate,
}

impl NewInvoice {
    pub fn validate(&self) -> Result<(), String> {
        if self.number.trim().is_empty() {
            return Err("Invoice number is required".to_string());
        }
        if self.client_name.trim().is_empty() {
            return Err("Client name is required".to_string());
        }
        if self.amount < 0 {
            return Err("Invoice amount cannot be negative".to_string());
        }
        Ok(())
    }

    pub fn into_invoice(self) -> Invoice {
        Invoice {
            id: Uuid::new_v4().to_string(),
            number: self.number,
            client_name: self.client_name,
            amount: self.amount,
            status: self.status,
            due_date: self.due_date,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoicePatch {
    pub client_name: Option<String>,
    pub amount: Option<i64>,
    pub status: Option<InvoiceStatus>,
    pub due_date: Option<NaiveDate>,
}

impl InvoicePatch {
    pub fn apply(&self, invoice: &mut Invoice) {
        if let Some(client_name) = &self.client_name {
            invoice.client_name = client_name.clone();
        }
        if let Some(amount) = self.amount {
            invoice.amount = amount;
        }
        if let Some(status) = self.status {
            invoice.status = status;
        }
        if let Some(due_date) = self.due_date {
            invoice.due_date = due_date;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    pub category: String,
    /// Amount in cents.
    pub amount: i64,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExpense {
    pub category: String,
    pub amount: i64,
    pub date: NaiveDate,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewExpense {
    pub fn validate(&self) -> Result<(), String> {
        if self.category.trim().is_empty() {
            return Err("Expense category is required".to_string());
        }
        if self.amount <= 0 {
            return Err("Expense amount must be positive".to_string());
        }
        Ok(())
    }

    pub fn into_expense(self) -> Expense {
        Expense {
            id: Uuid::new_v4().to_string(),
            category: self.category,
            amount: self.amount,
            date: self.date,
            description: self.description,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpensePatch {
    pub category: Option<String>,
    pub amount: Option<i64>,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
}

impl ExpensePatch {
    pub fn apply(&self, expense: &mut Expense) {
        if let Some(category) = &self.category {
            expense.category = category.clone();
        }
        if let Some(amount) = self.amount {
            expense.amount = amount;
        }
        if let Some(date) = self.date {
            expense.date = date;
        }
        if let Some(description) = &self.description {
            expense.description = Some(description.clone());
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Revenue {
    pub id: String,
    pub source: String,
    /// Amount in cents.
    pub amount: i64,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRevenue {
    pub source: String,
    pub amount: i64,
    pub date: NaiveDate,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewRevenue {
    pub fn validate(&self) -> Result<(), String> {
        if self.source.trim().is_empty() {
            return Err("Revenue source is required".to_string());
        }
        if self.amount <= 0 {
            return Err("Revenue amount must be positive".to_string());
        }
        Ok(())
    }

    pub fn into_revenue(self) -> Revenue {
        Revenue {
            id: Uuid::new_v4().to_string(),
            source: self.source,
            amount: self.amount,
            date: self.date,
            description: self.description,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenuePatch {
    pub source: Option<String>,
    pub amount: Option<i64>,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
}

impl RevenuePatch {
    pub fn validate(&self) -> Result<(), String> {
        if matches!(&self.source, Some(source) if source.trim().is_empty()) {
            return Err("Revenue source is required".to_string());
        }
        if matches!(self.amount, Some(amount) if amount <= 0) {
            return Err("Revenue amount must be positive".to_string());
        }
        Ok(())
    }

    pub fn apply(&self, revenue: &mut Revenue) {
        if let Some(source) = &self.source {
            revenue.source = source.clone();
        }
        if let Some(amount) = self.amount {
            revenue.amount = amount;
        }
        if let Some(date) = self.date {
            revenue.date = date;
        }
        if let Some(description) = &self.description {
            revenue.description = Some(description.clone());
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    Monthly,
    Quarterly,
    Yearly,
}

impl fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BudgetPeriod::Monthly => write!(f, "monthly"),
            BudgetPeriod::Quarterly => write!(f, "quarterly"),
            BudgetPeriod::Yearly => write!(f, "yearly"),
        }
    }
}

impl FromStr for BudgetPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "monthly" => Ok(BudgetPeriod::Monthly),
            "quarterly" => Ok(BudgetPeriod::Quarterly),
            "yearly" => Ok(BudgetPeriod::Yearly),
            _ => Err(format!(
                "Invalid budget period '{}'. Valid options: monthly, quarterly, yearly",
                s
            )),
        }
    }
}

/// Spending allocated to one expense category for a month, quarter or year.
///
/// `spent` holds spending recorded directly against the budget; expenses in
/// the same category and period are added on top when the summary is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub id: String,
    pub category: String,
    /// Amount in cents.
    pub allocated: i64,
    /// Amount in cents.
    pub spent: i64,
    pub period: BudgetPeriod,
    pub year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quarter: Option<u32>,
    pub created_at: DateTime<Utc>,
}

impl Budget {
    /// Whether `date` falls inside this budget's period.
    pub fn covers(&self, date: NaiveDate) -> bool {
        if date.year() != self.year {
            return false;
        }
        match self.period {
            BudgetPeriod::Yearly => true,
            BudgetPeriod::Monthly => self.month == Some(date.month()),
            BudgetPeriod::Quarterly => self.quarter == Some((date.month() - 1) / 3 + 1),
        }
    }

    fn check(&self) -> Result<(), String> {
        if self.category.trim().is_empty() {
            return Err("Budget category is required".to_string());
        }
        if self.allocated < 0 || self.spent < 0 {
            return Err("Budget amounts cannot be negative".to_string());
        }
        match self.period {
            BudgetPeriod::Monthly if !matches!(self.month, Some(1..=12)) => {
                Err("Monthly budgets need a month between 1 and 12".to_string())
            }
            BudgetPeriod::Quarterly if !matches!(self.quarter, Some(1..=4)) => {
                Err("Quarterly budgets need a quarter between 1 and 4".to_string())
            }
            _ => Ok(()),
        }
    }

    fn normalize(&mut self) {
        match self.period {
            BudgetPeriod::Monthly => self.quarter = None,
            BudgetPeriod::Quarterly => self.month = None,
            BudgetPeriod::Yearly => {
                self.month = None;
                self.quarter = None;
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBudget {
    pub category: String,
    pub allocated: i64,
    #[serde(default)]
    pub spent: i64,
    pub period: BudgetPeriod,
    pub year: i32,
    #[serde(default)]
    pub month: Option<u32>,
    #[serde(default)]
    pub quarter: Option<u32>,
}

impl NewBudget {
    pub fn validate(&self) -> Result<(), String> {
        self.clone().into_budget().check()
    }

    /// Builds the budget, discarding a month or quarter the period doesn't use.
    pub fn into_budget(self) -> Budget {
        let mut budget = Budget {
            id: Uuid::new_v4().to_string(),
            category: self.category,
            allocated: self.allocated,
            spent: self.spent,
            period: self.period,
            year: self.year,
            month: self.month,
            quarter: self.quarter,
            created_at: Utc::now(),
        };
        budget.normalize();
        budget
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetPatch {
    pub category: Option<String>,
    pub allocated: Option<i64>,
    pub spent: Option<i64>,
    pub period: Option<BudgetPeriod>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub quarter: Option<u32>,
}

impl BudgetPatch {
    /// Applies the patch, leaving `budget` untouched if the result is invalid.
    pub fn apply(&self, budget: &mut Budget) -> Result<(), String> {
        let mut updated = budget.clone();
        if let Some(category) = &self.category {
            updated.category = category.clone();
        }
        if let Some(allocated) = self.allocated {
            updated.allocated = allocated;
        }
        if let Some(spent) = self.spent {
            updated.spent = spent;
        }
        if let Some(period) = self.period {
            updated.period = period;
        }
        if let Some(year) = self.year {
            updated.year = year;
        }
        if self.month.is_some() {
            updated.month = self.month;
        }
        if self.quarter.is_some() {
            updated.quarter = self.quarter;
        }

        updated.check()?;
        updated.normalize();
        *budget = updated;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_new_invoice_defaults_to_pending() {
        let json = r#"{"number":"INV-001","clientName":"Acme","amount":125000,"dueDate":"2025-02-01"}"#;
        let new: NewInvoice = serde_json::from_str(json).unwrap();
        assert_eq!(new.status, InvoiceStatus::Pending);
        assert!(new.validate().is_ok());

        let invoice = new.into_invoice();
        assert_eq!(invoice.due_date, date(2025, 2, 1));
    }

    #[test]
    fn test_invoice_validation() {
        let new = NewInvoice {
            number: "INV-1".to_string(),
            client_name: "Acme".to_string(),
            amount: -1,
            status: InvoiceStatus::Paid,
            due_date: date(2025, 1, 1),
        };
        assert!(new.validate().unwrap_err().contains("negative"));
    }

    #[test]
    fn test_expense_validation() {
        let new = NewExpense {
            category: "Travel".to_string(),
            amount: 0,
            date: date(2025, 1, 1),
            description: None,
        };
        assert!(new.validate().is_err());
    }

    #[test]
    fn test_invoice_patch() {
        let mut invoice = NewInvoice {
            number: "INV-1".to_string(),
            client_name: "Acme".to_string(),
            amount: 100,
            status: InvoiceStatus::Pending,
            due_date: date(2025, 1, 1),
        }
        .into_invoice();

        InvoicePatch {
            status: Some(InvoiceStatus::Paid),
            ..Default::default()
        }
        .apply(&mut invoice);

        assert_eq!(invoice.status, InvoiceStatus::Paid);
        assert_eq!(invoice.amount, 100);
    }

    fn budget(period: BudgetPeriod, month: Option<u32>, quarter: Option<u32>) -> NewBudget {
        NewBudget {
            category: "Travel".to_string(),
            allocated: 100_000,
            spent: 0,
            period,
            year: 2025,
            month,
            quarter,
        }
    }

    #[test]
    fn test_revenue_validation() {
        let json = r#"{"source":"Consulting","amount":0,"date":"2025-03-01"}"#;
        let new: NewRevenue = serde_json::from_str(json).unwrap();
        assert_eq!(new.validate().unwrap_err(), "Revenue amount must be positive");

        let patch = RevenuePatch {
            source: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
    }

    #[test]
    fn test_budget_period_needs_matching_field() {
        assert!(budget(BudgetPeriod::Monthly, Some(3), None).validate().is_ok());
        assert!(budget(BudgetPeriod::Monthly, None, None).validate().is_err());
        assert!(budget(BudgetPeriod::Monthly, Some(13), None).validate().is_err());
        assert!(budget(BudgetPeriod::Quarterly, None, Some(4)).validate().is_ok());
        assert!(budget(BudgetPeriod::Quarterly, None, Some(5)).validate().is_err());
        assert!(budget(BudgetPeriod::Yearly, None, None).validate().is_ok());

        let mut negative = budget(BudgetPeriod::Yearly, None, None);
        negative.allocated = -1;
        assert!(negative.validate().unwrap_err().contains("negative"));
    }

    #[test]
    fn test_budget_covers_its_period() {
        let monthly = budget(BudgetPeriod::Monthly, Some(3), Some(2)).into_budget();
        assert_eq!(monthly.quarter, None);
        assert!(monthly.covers(date(2025, 3, 31)));
        assert!(!monthly.covers(date(2025, 4, 1)));
        assert!(!monthly.covers(date(2024, 3, 15)));

        let quarterly = budget(BudgetPeriod::Quarterly, None, Some(2)).into_budget();
        assert!(quarterly.covers(date(2025, 4, 1)));
        assert!(quarterly.covers(date(2025, 6, 30)));
        assert!(!quarterly.covers(date(2025, 7, 1)));

        let yearly = budget(BudgetPeriod::Yearly, Some(1), None).into_budget();
        assert_eq!(yearly.month, None);
        assert!(yearly.covers(date(2025, 12, 31)));
    }

    #[test]
    fn test_budget_patch_rejects_invalid_result() {
        let mut budget = budget(BudgetPeriod::Yearly, None, None).into_budget();

        let err = BudgetPatch {
            period: Some(BudgetPeriod::Monthly),
            ..Default::default()
        }
        .apply(&mut budget)
        .unwrap_err();
        assert!(err.contains("month"));
        assert_eq!(budget.period, BudgetPeriod::Yearly);

        BudgetPatch {
            period: Some(BudgetPeriod::Monthly),
            month: Some(6),
            spent: Some(2500),
            ..Default::default()
        }
        .apply(&mut budget)
        .unwrap();
        assert_eq!(budget.period, BudgetPeriod::Monthly);
        assert_eq!(budget.month, Some(6));
        assert_eq!(budget.spent, 2500);
    }
}
