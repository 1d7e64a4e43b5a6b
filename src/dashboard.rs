//! Page state for the dashboard and the events that move it.
//!
//! The page is rebuilt on every request by folding events over
//! `DashboardState::default()`. After any successful write the whole ledger
//! is reloaded and the summary recomputed from scratch; nothing is updated
//! incrementally.

use crate::errors::StoreError;
use crate::models::{Earning, Expense, FinancialSummary, LedgerData, NewEarning, NewExpense};
use crate::money::Money;
use crate::summary::summarize;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Daily,
    Weekly,
}

impl Tab {
    pub fn as_str(self) -> &'static str {
        match self {
            Tab::Daily => "daily",
            Tab::Weekly => "weekly",
        }
    }
}

/// Uncommitted input of the daily expense form, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExpenseForm {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub description: String,
}

impl ExpenseForm {
    pub fn to_request(&self) -> Result<NewExpense, StoreError> {
        Ok(NewExpense {
            date: non_blank(&self.date),
            amount: parse_amount("amount", &self.amount)?,
            description: non_blank(&self.description),
        })
    }
}

/// Uncommitted input of the weekly earning form.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningForm {
    #[serde(default)]
    pub week_number: String,
    #[serde(default)]
    pub gross_amount: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
}

impl EarningForm {
    pub fn to_request(&self) -> Result<NewEarning, StoreError> {
        let week_number = match non_blank(&self.week_number) {
            Some(raw) => Some(raw.parse::<i64>().map_err(|_| {
                StoreError::validation(format!("weekNumber: '{raw}' is not a whole number"))
            })?),
            None => None,
        };

        Ok(NewEarning {
            week_number,
            gross_amount: parse_amount("grossAmount", &self.gross_amount)?,
            start_date: non_blank(&self.start_date),
            end_date: non_blank(&self.end_date),
        })
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn parse_amount(field: &str, raw: &str) -> Result<Option<Money>, StoreError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    Money::parse(raw)
        .map(Some)
        .map_err(|err| StoreError::validation(format!("{field}: {err}")))
}

#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Saved(Tab),
    Error(String),
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Notice::Saved(Tab::Daily) => "Gasto diário salvo.",
            Notice::Saved(Tab::Weekly) => "Ganho semanal salvo.",
            Notice::Error(message) => message.as_str(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Error(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardState {
    pub tab: Tab,
    pub expenses: Vec<Expense>,
    pub earnings: Vec<Earning>,
    pub summary: FinancialSummary,
    pub expense_form: ExpenseForm,
    pub earning_form: EarningForm,
    pub notice: Option<Notice>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardEvent {
    TabSelected(Tab),
    /// A full reload of both collections.
    DataLoaded(LedgerData),
    ExpenseFormEdited(ExpenseForm),
    EarningFormEdited(EarningForm),
    SubmitSucceeded(Tab),
    SubmitFailed { tab: Tab, message: String },
    FetchFailed(String),
}

pub fn reduce(mut state: DashboardState, event: DashboardEvent) -> DashboardState {
    match event {
        DashboardEvent::TabSelected(tab) => {
            state.tab = tab;
            state.notice = None;
        }
        DashboardEvent::DataLoaded(ledger) => {
            state.summary = summarize(&ledger.expenses, &ledger.earnings);
            state.expenses = ledger.expenses;
            state.earnings = ledger.earnings;
        }
        DashboardEvent::ExpenseFormEdited(form) => state.expense_form = form,
        DashboardEvent::EarningFormEdited(form) => state.earning_form = form,
        DashboardEvent::SubmitSucceeded(tab) => {
            match tab {
                Tab::Daily => state.expense_form = ExpenseForm::default(),
                Tab::Weekly => state.earning_form = EarningForm::default(),
            }
            state.notice = Some(Notice::Saved(tab));
        }
        DashboardEvent::SubmitFailed { tab, message } => {
            state.tab = tab;
            state.notice = Some(Notice::Error(message));
        }
        DashboardEvent::FetchFailed(message) => {
            state.notice = Some(Notice::Error(message));
        }
    }
    state
}

pub fn build_state(events: impl IntoIterator<Item = DashboardEvent>) -> DashboardState {
    events.into_iter().fold(DashboardState::default(), reduce)
}

/// One cluster of bars in the weekly chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartGroup {
    pub label: String,
    pub gross: Money,
    pub expenses: Money,
    pub net: Money,
}

/// Weekly bars in calendar order, whatever order the summary is in.
pub fn chart_groups(summary: &FinancialSummary) -> Vec<ChartGroup> {
    let mut weeks: Vec<_> = summary.weekly.iter().collect();
    weeks.sort_by_key(|week| week.start_date);
    weeks
        .into_iter()
        .map(|week| ChartGroup {
            label: format!("Semana {}", week.week),
            gross: week.gross,
            expenses: week.expenses,
            net: week.net,
        })
        .collect()
}
