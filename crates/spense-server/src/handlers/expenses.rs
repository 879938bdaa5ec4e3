//! Expense CRUD and monthly summary handlers
//!
//! Creating an expense classifies it first; classification is total, so
//! these operations succeed regardless of provider health.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use spense_core::store::ExpenseStore;
use spense_core::{money, monthly_summary, Category, Expense, ExpensePatch, NewExpense};

use crate::{get_owner_id, AppError, AppState, SuccessResponse};

/// Request body for creating an expense
#[derive(Debug, Deserialize)]
pub struct CreateExpenseRequest {
    pub title: String,
    /// Amount in major units, e.g. 12.34
    pub amount: f64,
    pub description: Option<String>,
    /// Defaults to today when omitted
    pub date: Option<NaiveDate>,
}

/// Request body for updating an expense (all fields optional)
#[derive(Debug, Deserialize)]
pub struct UpdateExpenseRequest {
    pub title: Option<String>,
    pub amount: Option<f64>,
    /// Must be a taxonomy member; anything else is rejected at parse time
    pub category: Option<Category>,
    pub date: Option<NaiveDate>,
    /// Absent keeps the stored description; an explicit null clears it
    #[serde(default, deserialize_with = "clearable")]
    pub description: Option<Option<String>>,
}

/// Maps a present field to `Some(value-or-null)` so absent and null stay
/// distinguishable after deserialization.
fn clearable<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// An expense as returned by the API
#[derive(Debug, Serialize)]
pub struct ExpenseResponse {
    pub id: i64,
    pub title: String,
    pub amount: f64,
    pub category: Category,
    pub suggested_category: Option<Category>,
    pub date: NaiveDate,
    pub description: Option<String>,
    pub created_at: chrono::DateTime<Utc>,
    pub updated_at: chrono::DateTime<Utc>,
}

impl From<Expense> for ExpenseResponse {
    fn from(e: Expense) -> Self {
        Self {
            id: e.id,
            title: e.title,
            amount: money::to_major(e.amount_cents),
            category: e.category,
            suggested_category: e.suggested_category,
            date: e.occurred_on,
            description: e.description,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

/// One row of the monthly summary
#[derive(Debug, Serialize)]
pub struct MonthlySummaryRow {
    /// Period label, e.g. "Jan 2025"
    pub month: String,
    /// Summed amount in major units
    pub total: f64,
}

/// GET /api/expenses - list the owner's expenses, newest first
pub async fn list_expenses(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<ExpenseResponse>>, AppError> {
    let owner = get_owner_id(&headers);
    let expenses = state.store.find_by_owner(&owner)?;
    Ok(Json(expenses.into_iter().map(Into::into).collect()))
}

/// POST /api/expenses - add an expense with AI categorization
pub async fn create_expense(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CreateExpenseRequest>,
) -> Result<(StatusCode, Json<ExpenseResponse>), AppError> {
    let owner = get_owner_id(&headers);

    let title = body.title.trim().to_string();
    if title.is_empty() {
        return Err(AppError::bad_request("Title and amount are required"));
    }
    let amount_cents = money::from_major(body.amount)?;

    // Total: provider failure degrades to the default category,
    // never to a failed request
    let classification = state
        .classifier
        .classify(&title, body.description.as_deref())
        .await;

    let expense = state.store.insert(
        &owner,
        NewExpense {
            title,
            amount_cents,
            category: classification.category,
            suggested_category: Some(classification.category),
            occurred_on: body.date.unwrap_or_else(|| Utc::now().date_naive()),
            description: body.description,
        },
    )?;

    Ok((StatusCode::CREATED, Json(expense.into())))
}

/// PUT /api/expenses/:id - partial update
pub async fn update_expense(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<UpdateExpenseRequest>,
) -> Result<Json<ExpenseResponse>, AppError> {
    let owner = get_owner_id(&headers);

    let title = match body.title {
        Some(t) => {
            let t = t.trim().to_string();
            if t.is_empty() {
                return Err(AppError::bad_request("Title must not be empty"));
            }
            Some(t)
        }
        None => None,
    };
    let amount_cents = body.amount.map(money::from_major).transpose()?;

    let patch = ExpensePatch {
        title,
        amount_cents,
        category: body.category,
        occurred_on: body.date,
        description: body.description,
    };

    let updated = state.store.update(&owner, id, patch)?;
    Ok(Json(updated.into()))
}

/// DELETE /api/expenses/:id
pub async fn delete_expense(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse>, AppError> {
    let owner = get_owner_id(&headers);
    state.store.delete(&owner, id)?;
    Ok(Json(SuccessResponse { success: true }))
}

/// GET /api/expenses/monthly-summary - ordered (year, month) rollup
pub async fn get_monthly_summary(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<MonthlySummaryRow>>, AppError> {
    let owner = get_owner_id(&headers);
    let expenses = state.store.find_by_owner(&owner)?;

    let rows = monthly_summary(&expenses)
        .into_iter()
        .map(|b| MonthlySummaryRow {
            month: b.label(),
            total: b.total_major(),
        })
        .collect();
    Ok(Json(rows))
}
