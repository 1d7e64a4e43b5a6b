use crate::dashboard::{DashboardEvent, EarningForm, ExpenseForm, Tab, build_state};
use crate::errors::{AppError, StoreError};
use crate::models::{Earning, Expense, FinancialSummary, NewEarning, NewExpense};
use crate::report::{REPORT_FILENAME, render_report};
use crate::state::AppState;
use crate::summary::summarize;
use crate::ui::render_index;
use axum::{
    Form, Json,
    extract::{Query, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::{error, warn};

/// Raw dashboard query. Kept as strings so a stale or hand-edited link
/// falls back to the defaults instead of failing the page.
#[derive(Debug, Default, Deserialize)]
pub struct IndexQuery {
    pub tab: Option<String>,
    pub saved: Option<String>,
}

impl IndexQuery {
    pub fn tab(&self) -> Tab {
        match self.tab.as_deref() {
            Some("weekly") => Tab::Weekly,
            _ => Tab::Daily,
        }
    }

    pub fn saved(&self) -> bool {
        matches!(self.saved.as_deref(), Some("true" | "1"))
    }
}

pub async fn index(State(state): State<AppState>, Query(query): Query<IndexQuery>) -> Html<String> {
    let tab = query.tab();
    let mut events = vec![
        DashboardEvent::TabSelected(tab),
        DashboardEvent::DataLoaded(state.store.snapshot().await),
    ];
    if query.saved() {
        events.push(DashboardEvent::SubmitSucceeded(tab));
    }
    Html(render_index(&build_state(events)))
}

pub async fn list_expenses(State(state): State<AppState>) -> Json<Vec<Expense>> {
    Json(state.store.list_expenses().await)
}

pub async fn create_expense(
    State(state): State<AppState>,
    payload: Result<Json<NewExpense>, JsonRejection>,
) -> Result<(StatusCode, Json<Expense>), AppError> {
    let Json(request) = payload.map_err(|rejection| reject_body("daily expense", rejection))?;
    let expense = state
        .store
        .create_expense(request)
        .await
        .map_err(|err| store_failure("daily expense", err))?;
    Ok((StatusCode::CREATED, Json(expense)))
}

pub async fn list_earnings(State(state): State<AppState>) -> Json<Vec<Earning>> {
    Json(state.store.list_earnings().await)
}

pub async fn create_earning(
    State(state): State<AppState>,
    payload: Result<Json<NewEarning>, JsonRejection>,
) -> Result<(StatusCode, Json<Earning>), AppError> {
    let Json(request) = payload.map_err(|rejection| reject_body("weekly earning", rejection))?;
    let earning = state
        .store
        .create_earning(request)
        .await
        .map_err(|err| store_failure("weekly earning", err))?;
    Ok((StatusCode::CREATED, Json(earning)))
}

pub async fn get_summary(State(state): State<AppState>) -> Json<FinancialSummary> {
    let ledger = state.store.snapshot().await;
    Json(summarize(&ledger.expenses, &ledger.earnings))
}

pub async fn get_report(State(state): State<AppState>) -> Result<Response, AppError> {
    let ledger = state.store.snapshot().await;
    let summary = summarize(&ledger.expenses, &ledger.earnings);
    let body = render_report(&ledger, &summary).inspect_err(|err| error!("report export failed: {err}"))?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{REPORT_FILENAME}\""),
            ),
        ],
        body,
    )
        .into_response())
}

pub async fn submit_expense_form(
    State(state): State<AppState>,
    Form(form): Form<ExpenseForm>,
) -> Response {
    let result: Result<Expense, StoreError> = async {
        let request = form.to_request()?;
        state.store.create_expense(request).await
    }
    .await;

    match result {
        Ok(_) => Redirect::to("/?tab=daily&saved=true").into_response(),
        Err(err) => {
            let err = store_failure("daily expense", err);
            failed_submission(&state, Tab::Daily, DashboardEvent::ExpenseFormEdited(form), err).await
        }
    }
}

pub async fn submit_earning_form(
    State(state): State<AppState>,
    Form(form): Form<EarningForm>,
) -> Response {
    let result: Result<Earning, StoreError> = async {
        let request = form.to_request()?;
        state.store.create_earning(request).await
    }
    .await;

    match result {
        Ok(_) => Redirect::to("/?tab=weekly&saved=true").into_response(),
        Err(err) => {
            let err = store_failure("weekly earning", err);
            failed_submission(&state, Tab::Weekly, DashboardEvent::EarningFormEdited(form), err).await
        }
    }
}

/// Re-renders the page with the rejected input still in the form.
async fn failed_submission(
    state: &AppState,
    tab: Tab,
    edited: DashboardEvent,
    err: AppError,
) -> Response {
    let page = build_state([
        DashboardEvent::TabSelected(tab),
        DashboardEvent::DataLoaded(state.store.snapshot().await),
        edited,
        DashboardEvent::SubmitFailed {
            tab,
            message: err.message,
        },
    ]);
    (err.status, Html(render_index(&page))).into_response()
}

fn reject_body(record: &str, rejection: JsonRejection) -> AppError {
    let message = rejection.body_text();
    warn!(record, error = %message, "rejected malformed body");
    AppError::bad_request(message)
}

fn store_failure(record: &str, err: StoreError) -> AppError {
    if err.is_validation() {
        warn!(record, error = %err, "rejected invalid record");
    } else {
        error!(record, error = %err, "failed to store record");
    }
    AppError::from(err)
}
