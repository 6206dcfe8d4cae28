//! Invoices, expenses, revenue, budgets and the financial summary.
//! Restricted to management and admins.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use super::{ApiError, ApiResult, AppState, CurrentUser};
use crate::dashboard::FinancialSummary;
use crate::models::{
    Budget, BudgetPatch, Expense, ExpensePatch, Invoice, InvoicePatch, NewBudget, NewExpense,
    NewInvoice, NewRevenue, Revenue, RevenuePatch, Role,
};

fn require_finance(current: &CurrentUser) -> ApiResult<()> {
    match current.user.role {
        Role::Management | Role::Admin => Ok(()),
        Role::Employee | Role::Client => Err(ApiError::Forbidden(
            "Financial data requires a management or admin role".to_string(),
        )),
    }
}

pub(super) async fn list_invoices(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Json<Vec<Invoice>>> {
    require_finance(&current)?;
    Ok(Json(state.db.invoices().list().await?))
}

pub(super) async fn get_invoice(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<Invoice>> {
    require_finance(&current)?;
    state
        .db
        .invoices()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Invoice"))
}

pub(super) async fn create_invoice(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<NewInvoice>,
) -> ApiResult<(StatusCode, Json<Invoice>)> {
    require_finance(&current)?;
    payload.validate().map_err(ApiError::BadRequest)?;

    let invoice = payload.into_invoice();
    state.db.invoices().create(&invoice).await?;
    tracing::info!(number = %invoice.number, amount = invoice.amount, "Invoice created");
    Ok((StatusCode::CREATED, Json(invoice)))
}

pub(super) async fn update_invoice(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(patch): Json<InvoicePatch>,
) -> ApiResult<Json<Invoice>> {
    require_finance(&current)?;
    if matches!(patch.amount, Some(amount) if amount < 0) {
        return Err(ApiError::BadRequest(
            "Invoice amount cannot be negative".to_string(),
        ));
    }

    let repo = state.db.invoices();
    let mut invoice = repo
        .get_by_id(&id)
        .await?
        .ok_or(ApiError::NotFound("Invoice"))?;
    patch.apply(&mut invoice);
    repo.update(&invoice).await?;
    Ok(Json(invoice))
}

pub(super) async fn delete_invoice(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    require_finance(&current)?;
    if state.db.invoices().delete(&id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Invoice"))
    }
}

pub(super) async fn list_expenses(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Json<Vec<Expense>>> {
    require_finance(&current)?;
    Ok(Json(state.db.expenses().list().await?))
}

pub(super) async fn get_expense(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<Expense>> {
    require_finance(&current)?;
    state
        .db
        .expenses()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Expense"))
}

pub(super) async fn create_expense(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<NewExpense>,
) -> ApiResult<(StatusCode, Json<Expense>)> {
    require_finance(&current)?;
    payload.validate().map_err(ApiError::BadRequest)?;

    let expense = payload.into_expense();
    state.db.expenses().create(&expense).await?;
    Ok((StatusCode::CREATED, Json(expense)))
}

pub(super) async fn update_expense(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(patch): Json<ExpensePatch>,
) -> ApiResult<Json<Expense>> {
    require_finance(&current)?;
    if matches!(patch.amount, Some(amount) if amount <= 0) {
        return Err(ApiError::BadRequest(
            "Expense amount must be positive".to_string(),
        ));
    }

    let repo = state.db.expenses();
    let mut expense = repo
        .get_by_id(&id)
        .await?
        .ok_or(ApiError::NotFound("Expense"))?;
    patch.apply(&mut expense);
    repo.update(&expense).await?;
    Ok(Json(expense))
}

pub(super) async fn delete_expense(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    require_finance(&current)?;
    if state.db.expenses().delete(&id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Expense"))
    }
}

pub(super) async fn list_revenue(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Json<Vec<Revenue>>> {
    require_finance(&current)?;
    Ok(Json(state.db.revenue().list().await?))
}

pub(super) async fn get_revenue(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<Revenue>> {
    require_finance(&current)?;
    state
        .db
        .revenue()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Revenue"))
}

pub(super) async fn create_revenue(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<NewRevenue>,
) -> ApiResult<(StatusCode, Json<Revenue>)> {
    require_finance(&current)?;
    payload.validate().map_err(ApiError::BadRequest)?;

    let revenue = payload.into_revenue();
    state.db.revenue().create(&revenue).await?;
    tracing::info!(source = %revenue.source, amount = revenue.amount, "Revenue recorded");
    Ok((StatusCode::CREATED, Json(revenue)))
}

pub(super) async fn update_revenue(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(patch): Json<RevenuePatch>,
) -> ApiResult<Json<Revenue>> {
    require_finance(&current)?;
    patch.validate().map_err(ApiError::BadRequest)?;

    let repo = state.db.revenue();
    let mut revenue = repo
        .get_by_id(&id)
        .await?
        .ok_or(ApiError::NotFound("Revenue"))?;
    patch.apply(&mut revenue);
    repo.update(&revenue).await?;
    Ok(Json(revenue))
}

pub(super) async fn delete_revenue(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    require_finance(&current)?;
    if state.db.revenue().delete(&id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Revenue"))
    }
}

pub(super) async fn list_budgets(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Json<Vec<Budget>>> {
    require_finance(&current)?;
    Ok(Json(state.db.budgets().list().await?))
}

pub(super) async fn get_budget(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<Budget>> {
    require_finance(&current)?;
    state
        .db
        .budgets()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Budget"))
}

pub(super) async fn create_budget(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<NewBudget>,
) -> ApiResult<(StatusCode, Json<Budget>)> {
    require_finance(&current)?;
    payload.validate().map_err(ApiError::BadRequest)?;

    let budget = payload.into_budget();
    state.db.budgets().create(&budget).await?;
    tracing::info!(
        category = %budget.category,
        period = %budget.period,
        allocated = budget.allocated,
        "Budget created"
    );
    Ok((StatusCode::CREATED, Json(budget)))
}

pub(super) async fn update_budget(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(patch): Json<BudgetPatch>,
) -> ApiResult<Json<Budget>> {
    require_finance(&current)?;

    let repo = state.db.budgets();
    let mut budget = repo
        .get_by_id(&id)
        .await?
        .ok_or(ApiError::NotFound("Budget"))?;
    patch.apply(&mut budget).map_err(ApiError::BadRequest)?;
    repo.update(&budget).await?;
    Ok(Json(budget))
}

pub(super) async fn delete_budget(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    require_finance(&current)?;
    if state.db.budgets().delete(&id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Budget"))
    }
}

pub(super) async fn summary(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Json<FinancialSummary>> {
    require_finance(&current)?;
    let invoices = state.db.invoices().list().await?;
    let expenses = state.db.expenses().list().await?;
    let revenue = state.db.revenue().list().await?;
    let budgets = state.db.budgets().list().await?;
    Ok(Json(FinancialSummary::compute(
        &invoices, &expenses, &revenue, &budgets,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InvoiceStatus;
    use crate::server::test_support::TestServer;
    use axum::http::Method;
    use serde_json::json;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_employees_cannot_see_financials() {
        let temp_dir = tempdir().unwrap();
        let server = TestServer::start(temp_dir.path()).await;
        let (_, token) = server.user("alice", Role::Employee).await;

        for uri in [
            "/api/invoices",
            "/api/expenses",
            "/api/revenue",
            "/api/budgets",
            "/api/financials/summary",
        ] {
            let (status, _) = server.send(Method::GET, uri, Some(&token), None).await;
            assert_eq!(status, StatusCode::FORBIDDEN, "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_invoice_crud_and_summary() {
        let temp_dir = tempdir().unwrap();
        let server = TestServer::start(temp_dir.path()).await;
        let (_, token) = server.user("carol", Role::Management).await;

        let (status, body) = server
            .send(
                Method::POST,
                "/api/invoices",
                Some(&token),
                Some(json!({
                    "number": "INV-001",
                    "clientName": "Acme",
                    "amount": 150000,
                    "dueDate": "2025-02-01"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["status"], "pending");
        let uri = format!("/api/invoices/{}", body["id"].as_str().unwrap());

        let (status, body) = server
            .send(Method::PATCH, &uri, Some(&token), Some(json!({"status": "overdue"})))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "overdue");

        for (category, amount) in [("Travel", 2000), ("Software", 5000), ("Travel", 4000)] {
            let (status, _) = server
                .send(
                    Method::POST,
                    "/api/expenses",
                    Some(&token),
                    Some(json!({"category": category, "amount": amount, "date": "2025-01-10"})),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let summary: FinancialSummary = server.get("/api/financials/summary", &token).await;
        assert_eq!(summary.overdue, 150000);
        assert_eq!(summary.outstanding, 150000);
        assert_eq!(summary.paid, 0);
        assert_eq!(summary.total_expenses, 11000);
        assert_eq!(summary.expenses_by_category[0].category, "Travel");
        assert_eq!(summary.expenses_by_category[0].amount, 6000);

        let invoice: Invoice = server.get(&uri, &token).await;
        assert_eq!(invoice.status, InvoiceStatus::Overdue);

        let (status, _) = server.send(Method::DELETE, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = server.send(Method::DELETE, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_expense_rejected() {
        let temp_dir = tempdir().unwrap();
        let server = TestServer::start(temp_dir.path()).await;
        let (_, token) = server.user("root", Role::Admin).await;

        let (status, body) = server
            .send(
                Method::POST,
                "/api/expenses",
                Some(&token),
                Some(json!({"category": "Travel", "amount": 0, "date": "2025-01-10"})),
            )
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Expense amount must be positive");
    }

    #[tokio::test]
    async fn test_revenue_crud() {
        let temp_dir = tempdir().unwrap();
        let server = TestServer::start(temp_dir.path()).await;
        let (_, token) = server.user("carol", Role::Management).await;

        let (status, body) = server
            .send(
                Method::POST,
                "/api/revenue",
                Some(&token),
                Some(json!({"source": "Consulting", "amount": 250000, "date": "2025-03-15"})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let uri = format!("/api/revenue/{}", body["id"].as_str().unwrap());

        let (status, body) = server
            .send(Method::PATCH, &uri, Some(&token), Some(json!({"amount": -5})))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Revenue amount must be positive");

        let (status, body) = server
            .send(
                Method::PATCH,
                &uri,
                Some(&token),
                Some(json!({"description": "March retainer"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["description"], "March retainer");

        let entries: Vec<Revenue> = server.get("/api/revenue", &token).await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].amount, 250000);

        let (status, _) = server.send(Method::DELETE, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, body) = server.send(Method::GET, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Revenue not found");
    }

    #[tokio::test]
    async fn test_budget_vs_actual_in_summary() {
        let temp_dir = tempdir().unwrap();
        let server = TestServer::start(temp_dir.path()).await;
        let (_, token) = server.user("root", Role::Admin).await;

        let (status, body) = server
            .send(
                Method::POST,
                "/api/budgets",
                Some(&token),
                Some(json!({"category": "Travel", "allocated": 10000, "period": "monthly", "year": 2025})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_error");

        let (status, body) = server
            .send(
                Method::POST,
                "/api/budgets",
                Some(&token),
                Some(json!({
                    "category": "Travel",
                    "allocated": 10000,
                    "spent": 1000,
                    "period": "quarterly",
                    "year": 2025,
                    "quarter": 1
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["period"], "quarterly");
        let uri = format!("/api/budgets/{}", body["id"].as_str().unwrap());

        for (amount, date) in [(4000, "2025-02-10"), (9000, "2025-04-02")] {
            let (status, _) = server
                .send(
                    Method::POST,
                    "/api/expenses",
                    Some(&token),
                    Some(json!({"category": "Travel", "amount": amount, "date": date})),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED);
        }
        server
            .send(
                Method::POST,
                "/api/revenue",
                Some(&token),
                Some(json!({"source": "Licensing", "amount": 20000, "date": "2025-01-31"})),
            )
            .await;

        let summary: FinancialSummary = server.get("/api/financials/summary", &token).await;
        assert_eq!(summary.total_revenue, 20000);
        assert_eq!(summary.net_income, 7000);
        assert_eq!(summary.budgets.len(), 1);
        assert_eq!(summary.budgets[0].actual, 5000);
        assert_eq!(summary.budgets[0].utilization, 50);
        assert!(!summary.budgets[0].over_budget);

        let (status, body) = server
            .send(Method::PATCH, &uri, Some(&token), Some(json!({"quarter": 2})))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["quarter"], 2);

        let summary: FinancialSummary = server.get("/api/financials/summary", &token).await;
        assert_eq!(summary.budgets[0].actual, 10000);
        assert_eq!(summary.budgets[0].remaining, 0);

        let (status, _) = server
            .send(Method::PATCH, &uri, Some(&token), Some(json!({"quarter": 7})))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let budget: Budget = server.get(&uri, &token).await;
        assert_eq!(budget.quarter, Some(2));

        let (status, _) = server.send(Method::DELETE, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let budgets: Vec<Budget> = server.get("/api/budgets", &token).await;
        assert!(budgets.is_empty());
    }
}
