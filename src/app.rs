use crate::handlers;
use crate::state::AppState;
use axum::{Router, routing::{get, post}};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/forms/daily-expense", post(handlers::submit_expense_form))
        .route("/forms/weekly-earning", post(handlers::submit_earning_form))
        .route(
            "/api/daily-expenses",
            get(handlers::list_expenses).post(handlers::create_expense),
        )
        .route(
            "/api/weekly-earnings",
            get(handlers::list_earnings).post(handlers::create_earning),
        )
        .route("/api/summary", get(handlers::get_summary))
        .route("/api/report", get(handlers::get_report))
        .with_state(state)
}
