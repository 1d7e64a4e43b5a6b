use crate::errors::StoreError;
use crate::money::Money;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MIN_WEEK_NUMBER: i64 = 1;
pub const MAX_WEEK_NUMBER: i64 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: Uuid,
    pub date: NaiveDate,
    pub amount: Money,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Earning {
    pub id: Uuid,
    pub week_number: u8,
    pub gross_amount: Money,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl Earning {
    /// Whether `date` falls inside the inclusive week interval.
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// Everything the ledger file holds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerData {
    #[serde(default)]
    pub expenses: Vec<Expense>,
    #[serde(default)]
    pub earnings: Vec<Earning>,
}

impl LedgerData {
    /// Whether total gross and total expenses both stay within `Money::MAX`,
    /// which keeps every weekly and monthly figure in range.
    pub fn within_limits(&self) -> bool {
        Money::checked_total(self.expenses.iter().map(|expense| expense.amount)).is_some()
            && Money::checked_total(self.earnings.iter().map(|earning| earning.gross_amount))
                .is_some()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExpense {
    pub date: Option<String>,
    pub amount: Option<Money>,
    pub description: Option<String>,
}

impl NewExpense {
    pub fn into_expense(self, id: Uuid) -> Result<Expense, StoreError> {
        let date = parse_calendar_date("date", required("date", self.date)?.as_str())?;
        let amount = non_negative("amount", required("amount", self.amount)?)?;
        let description = required("description", self.description)?.trim().to_string();
        if description.is_empty() {
            return Err(StoreError::validation("description must not be blank"));
        }

        Ok(Expense {
            id,
            date,
            amount,
            description,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEarning {
    pub week_number: Option<i64>,
    pub gross_amount: Option<Money>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl NewEarning {
    pub fn into_earning(self, id: Uuid) -> Result<Earning, StoreError> {
        let week_number = required("weekNumber", self.week_number)?;
        if !(MIN_WEEK_NUMBER..=MAX_WEEK_NUMBER).contains(&week_number) {
            return Err(StoreError::validation(format!(
                "weekNumber must be between {MIN_WEEK_NUMBER} and {MAX_WEEK_NUMBER}, got {week_number}"
            )));
        }
        let gross_amount = non_negative("grossAmount", required("grossAmount", self.gross_amount)?)?;
        let start_date =
            parse_calendar_date("startDate", required("startDate", self.start_date)?.as_str())?;
        let end_date = parse_calendar_date("endDate", required("endDate", self.end_date)?.as_str())?;
        if start_date > end_date {
            return Err(StoreError::validation(format!(
                "startDate {start_date} is after endDate {end_date}"
            )));
        }

        Ok(Earning {
            id,
            week_number: week_number as u8,
            gross_amount,
            start_date,
            end_date,
        })
    }
}

/// Accepts `YYYY-MM-DD` or an ISO-8601 datetime; only the calendar date is kept.
pub fn parse_calendar_date(field: &str, raw: &str) -> Result<NaiveDate, StoreError> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(raw) {
        return Ok(datetime.date_naive());
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(datetime.date());
    }
    Err(StoreError::validation(format!(
        "{field}: '{raw}' is not a valid date"
    )))
}

fn required<T>(field: &str, value: Option<T>) -> Result<T, StoreError> {
    value.ok_or_else(|| StoreError::validation(format!("{field} is required")))
}

fn non_negative(field: &str, amount: Money) -> Result<Money, StoreError> {
    if amount.is_negative() {
        return Err(StoreError::validation(format!(
            "{field} must not be negative"
        )));
    }
    Ok(amount)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklySummary {
    pub week: u8,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub gross: Money,
    pub expenses: Money,
    pub net: Money,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub gross: Money,
    pub expenses: Money,
    pub net: Money,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    pub weekly: Vec<WeeklySummary>,
    pub monthly: MonthlySummary,
    /// Expenses that fall outside every week interval.
    pub unattributed_expenses: Money,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cents(value: i64) -> Money {
        Money::from_cents(value)
    }

    #[test]
    fn expense_requires_every_field() {
        let err = NewExpense {
            date: Some("2024-01-03".into()),
            amount: None,
            description: Some("gas".into()),
        }
        .into_expense(Uuid::new_v4())
        .unwrap_err();
        assert_eq!(err.to_string(), "amount is required");

        let err = NewExpense::default()
            .into_expense(Uuid::new_v4())
            .unwrap_err();
        assert_eq!(err.to_string(), "date is required");
    }

    #[test]
    fn expense_rejects_blank_description_and_bad_date() {
        let err = NewExpense {
            date: Some("2024-01-03".into()),
            amount: Some(cents(100)),
            description: Some("   ".into()),
        }
        .into_expense(Uuid::new_v4())
        .unwrap_err();
        assert!(err.is_validation());

        let err = NewExpense {
            date: Some("03/01/2024".into()),
            amount: Some(cents(100)),
            description: Some("bread".into()),
        }
        .into_expense(Uuid::new_v4())
        .unwrap_err();
        assert_eq!(err.to_string(), "date: '03/01/2024' is not a valid date");
    }

    #[test]
    fn expense_accepts_iso_datetime() {
        let expense = NewExpense {
            date: Some("2024-01-03T00:00:00.000Z".into()),
            amount: Some(cents(20000)),
            description: Some(" bread ".into()),
        }
        .into_expense(Uuid::new_v4())
        .unwrap();
        assert_eq!(expense.date, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
        assert_eq!(expense.description, "bread");
    }

    #[test]
    fn datetime_keeps_date_in_its_own_offset() {
        let date = parse_calendar_date("date", "2024-01-03T22:30:00-03:00").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
    }

    #[test]
    fn earning_validates_week_number_and_interval() {
        let base = NewEarning {
            week_number: Some(1),
            gross_amount: Some(cents(100000)),
            start_date: Some("2024-01-01".into()),
            end_date: Some("2024-01-07".into()),
        };

        let earning = base.clone().into_earning(Uuid::new_v4()).unwrap();
        assert_eq!(earning.week_number, 1);
        assert!(earning.covers(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()));
        assert!(earning.covers(NaiveDate::from_ymd_opt(2024, 1, 7).unwrap()));
        assert!(!earning.covers(NaiveDate::from_ymd_opt(2024, 1, 8).unwrap()));

        let err = NewEarning {
            week_number: Some(6),
            ..base.clone()
        }
        .into_earning(Uuid::new_v4())
        .unwrap_err();
        assert!(err.to_string().starts_with("weekNumber must be between 1 and 5"));

        let err = NewEarning {
            start_date: Some("2024-01-08".into()),
            ..base.clone()
        }
        .into_earning(Uuid::new_v4())
        .unwrap_err();
        assert!(err.to_string().contains("is after endDate"));

        let err = NewEarning {
            gross_amount: Some(cents(-1)),
            ..base
        }
        .into_earning(Uuid::new_v4())
        .unwrap_err();
        assert_eq!(err.to_string(), "grossAmount must not be negative");
    }

    #[test]
    fn records_use_camel_case_on_the_wire() {
        let earning = Earning {
            id: Uuid::nil(),
            week_number: 2,
            gross_amount: cents(123456),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 8).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 14).unwrap(),
        };
        let value = serde_json::to_value(&earning).unwrap();
        assert_eq!(value["weekNumber"], 2);
        assert_eq!(value["grossAmount"], 1234.56);
        assert_eq!(value["startDate"], "2024-01-08");
        assert_eq!(value["endDate"], "2024-01-14");
    }
}
