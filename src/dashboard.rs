//! Dashboard aggregates computed from entity snapshots.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::models::{
    Activity, Announcement, Budget, BudgetPeriod, Document, Expense, Invoice, InvoiceStatus,
    PublicUser, Revenue,
};

/// Headline numbers for the dashboard, with month-over-month trends in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_documents: usize,
    pub total_users: usize,
    pub active_users: usize,
    pub total_announcements: usize,
    pub documents_trend: i64,
    pub users_trend: i64,
    pub active_users_trend: i64,
    pub announcements_trend: i64,
}

/// Percent change from `previous` to `current`, rounded.
pub fn trend(current: usize, previous: usize) -> i64 {
    if previous == 0 {
        return if current > 0 { 100 } else { 0 };
    }
    let change = (current as f64 - previous as f64) / previous as f64 * 100.0;
    change.round() as i64
}

/// The two consecutive 30-day windows ending at `now`.
struct Periods {
    one_day_ago: DateTime<Utc>,
    one_month_ago: DateTime<Utc>,
    two_months_ago: DateTime<Utc>,
}

impl Periods {
    fn ending_at(now: DateTime<Utc>) -> Self {
        Self {
            one_day_ago: now - Duration::days(1),
            one_month_ago: now - Duration::days(30),
            two_months_ago: now - Duration::days(60),
        }
    }

    fn current(&self, t: DateTime<Utc>) -> bool {
        t > self.one_month_ago
    }

    fn previous(&self, t: DateTime<Utc>) -> bool {
        t > self.two_months_ago && t <= self.one_month_ago
    }

    fn split<T>(&self, items: &[T], time: impl Fn(&T) -> DateTime<Utc>) -> (usize, usize) {
        let current = items.iter().filter(|i| self.current(time(*i))).count();
        let previous = items.iter().filter(|i| self.previous(time(*i))).count();
        (current, previous)
    }

    fn distinct_users(&self, activities: &[Activity], keep: impl Fn(DateTime<Utc>) -> bool) -> usize {
        activities
            .iter()
            .filter(|a| keep(a.created_at))
            .map(|a| a.user_id.as_str())
            .collect::<HashSet<_>>()
            .len()
    }
}

impl DashboardStats {
    pub fn compute(
        documents: &[Document],
        users: &[PublicUser],
        announcements: &[Announcement],
        activities: &[Activity],
        now: DateTime<Utc>,
    ) -> Self {
        let periods = Periods::ending_at(now);

        let (docs_now, docs_before) = periods.split(documents, |d| d.created_at);
        let (users_now, users_before) = periods.split(users, |u| u.created_at);
        let (ann_now, ann_before) = periods.split(announcements, |a| a.created_at);

        let active_users = periods.distinct_users(activities, |t| t > periods.one_day_ago);
        let active_now = periods.distinct_users(activities, |t| periods.current(t));
        let active_before = periods.distinct_users(activities, |t| periods.previous(t));

        Self {
            total_documents: documents.len(),
            total_users: users.len(),
            active_users,
            total_announcements: announcements.len(),
            documents_trend: trend(docs_now, docs_before),
            users_trend: trend(users_now, users_before),
            active_users_trend: trend(active_now, active_before),
            announcements_trend: trend(ann_now, ann_before),
        }
    }
}

/// Invoice, expense, revenue and budget totals, all amounts in cents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    pub paid: i64,
    pub pending: i64,
    pub overdue: i64,
    pub outstanding: i64,
    pub total_expenses: i64,
    /// Largest category first.
    pub expenses_by_category: Vec<CategoryTotal>,
    pub total_revenue: i64,
    /// Revenue minus expenses.
    pub net_income: i64,
    /// Budget against actual spending, in budget list order.
    pub budgets: Vec<BudgetStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetStatus {
    pub budget_id: String,
    pub category: String,
    pub period: BudgetPeriod,
    pub year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quarter: Option<u32>,
    pub allocated: i64,
    /// Spending recorded on the budget plus matching expenses.
    pub actual: i64,
    /// Negative once the budget is exceeded.
    pub remaining: i64,
    /// Percent of the allocation used, rounded.
    pub utilization: i64,
    pub over_budget: bool,
}

impl BudgetStatus {
    /// Expenses count toward a budget when their category matches
    /// (ignoring ASCII case) and their date falls inside its period.
    pub fn compute(budget: &Budget, expenses: &[Expense]) -> Self {
        let expensed: i64 = expenses
            .iter()
            .filter(|e| e.category.eq_ignore_ascii_case(&budget.category) && budget.covers(e.date))
            .map(|e| e.amount)
            .sum();
        let actual = budget.spent + expensed;
        let utilization = if budget.allocated > 0 {
            (actual as f64 / budget.allocated as f64 * 100.0).round() as i64
        } else {
            0
        };

        Self {
            budget_id: budget.id.clone(),
            category: budget.category.clone(),
            period: budget.period,
            year: budget.year,
            month: budget.month,
            quarter: budget.quarter,
            allocated: budget.allocated,
            actual,
            remaining: budget.allocated - actual,
            utilization,
            over_budget: actual > budget.allocated,
        }
    }
}

impl FinancialSummary {
    pub fn compute(
        invoices: &[Invoice],
        expenses: &[Expense],
        revenue: &[Revenue],
        budgets: &[Budget],
    ) -> Self {
        let sum_status = |status: InvoiceStatus| -> i64 {
            invoices
                .iter()
                .filter(|i| i.status == status)
                .map(|i| i.amount)
                .sum()
        };
        let paid = sum_status(InvoiceStatus::Paid);
        let pending = sum_status(InvoiceStatus::Pending);
        let overdue = sum_status(InvoiceStatus::Overdue);

        let mut by_category: BTreeMap<&str, i64> = BTreeMap::new();
        for expense in expenses {
            *by_category.entry(expense.category.as_str()).or_default() += expense.amount;
        }
        let mut expenses_by_category: Vec<CategoryTotal> = by_category
            .into_iter()
            .map(|(category, amount)| CategoryTotal {
                category: category.to_string(),
                amount,
            })
            .collect();
        // BTreeMap order keeps ties alphabetical
        expenses_by_category.sort_by(|a, b| b.amount.cmp(&a.amount));

        let total_expenses: i64 = expenses.iter().map(|e| e.amount).sum();
        let total_revenue: i64 = revenue.iter().map(|r| r.amount).sum();

        Self {
            paid,
            pending,
            overdue,
            outstanding: pending + overdue,
            total_expenses,
            expenses_by_category,
            total_revenue,
            net_income: total_revenue - total_expenses,
            budgets: budgets
                .iter()
                .map(|b| BudgetStatus::compute(b, expenses))
                .collect(),
        }
    }
}
