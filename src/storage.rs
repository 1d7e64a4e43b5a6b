use crate::errors::{LoadError, StoreError};
use crate::models::{Earning, Expense, LedgerData, NewEarning, NewExpense};
use crate::money::Money;
use std::path::{Path, PathBuf};
use tokio::{fs, sync::Mutex};
use tracing::{error, info};
use uuid::Uuid;

/// Expense and earning collections backed by a single JSON file.
///
/// Writes hold the lock across the file update, so every create is applied
/// to memory and disk together or not at all.
pub struct LedgerStore {
    path: PathBuf,
    data: Mutex<LedgerData>,
}

impl LedgerStore {
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, LoadError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| LoadError::Read {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }
        let data = load_ledger(&path).await?;
        Ok(Self::with_data(path, data))
    }

    pub fn with_data(path: impl Into<PathBuf>, data: LedgerData) -> Self {
        Self {
            path: path.into(),
            data: Mutex::new(data),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn create_expense(&self, request: NewExpense) -> Result<Expense, StoreError> {
        let expense = request.into_expense(Uuid::new_v4())?;
        let mut data = self.data.lock().await;
        data.expenses.push(expense.clone());
        if !data.within_limits() {
            data.expenses.pop();
            return Err(StoreError::validation(format!(
                "total expenses would exceed {}",
                Money::MAX
            )));
        }
        if let Err(err) = persist_ledger(&self.path, &data).await {
            data.expenses.pop();
            return Err(err);
        }

        info!(
            id = %expense.id,
            date = %expense.date,
            amount = %expense.amount,
            "expense recorded"
        );
        Ok(expense)
    }

    pub async fn create_earning(&self, request: NewEarning) -> Result<Earning, StoreError> {
        let earning = request.into_earning(Uuid::new_v4())?;
        let mut data = self.data.lock().await;
        data.earnings.push(earning.clone());
        if !data.within_limits() {
            data.earnings.pop();
            return Err(StoreError::validation(format!(
                "total earnings would exceed {}",
                Money::MAX
            )));
        }
        if let Err(err) = persist_ledger(&self.path, &data).await {
            data.earnings.pop();
            return Err(err);
        }

        info!(
            id = %earning.id,
            week = earning.week_number,
            gross = %earning.gross_amount,
            start = %earning.start_date,
            end = %earning.end_date,
            "earning recorded"
        );
        Ok(earning)
    }

    /// Expenses by date, newest first.
    pub async fn list_expenses(&self) -> Vec<Expense> {
        let data = self.data.lock().await;
        sorted_expenses(&data.expenses)
    }

    /// Earnings by start date, newest first.
    pub async fn list_earnings(&self) -> Vec<Earning> {
        let data = self.data.lock().await;
        sorted_earnings(&data.earnings)
    }

    /// Both collections in listing order, read under one lock.
    pub async fn snapshot(&self) -> LedgerData {
        let data = self.data.lock().await;
        LedgerData {
            expenses: sorted_expenses(&data.expenses),
            earnings: sorted_earnings(&data.earnings),
        }
    }
}

// Records are appended, so reversing first makes later inserts win ties
// under the stable sort.
fn sorted_expenses(expenses: &[Expense]) -> Vec<Expense> {
    let mut sorted: Vec<Expense> = expenses.iter().rev().cloned().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));
    sorted
}

fn sorted_earnings(earnings: &[Earning]) -> Vec<Earning> {
    let mut sorted: Vec<Earning> = earnings.iter().rev().cloned().collect();
    sorted.sort_by(|a, b| b.start_date.cmp(&a.start_date));
    sorted
}

pub async fn load_ledger(path: &Path) -> Result<LedgerData, LoadError> {
    match fs::read(path).await {
        Ok(bytes) => {
            let data: LedgerData = serde_json::from_slice(&bytes).map_err(|source| {
                error!("failed to parse ledger file {}: {source}", path.display());
                LoadError::Parse {
                    path: path.to_path_buf(),
                    source,
                }
            })?;
            if !data.within_limits() {
                error!("ledger file {} holds totals beyond {}", path.display(), Money::MAX);
                return Err(LoadError::OutOfRange {
                    path: path.to_path_buf(),
                });
            }
            Ok(data)
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(LedgerData::default()),
        Err(source) => {
            error!("failed to read ledger file {}: {source}", path.display());
            Err(LoadError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    }
}

/// Writes to a sibling temp file and renames it over the ledger.
pub async fn persist_ledger(path: &Path, data: &LedgerData) -> Result<(), StoreError> {
    let persistence = |source: std::io::Error| StoreError::Persistence {
        path: path.to_path_buf(),
        source,
    };

    let payload = serde_json::to_vec_pretty(data).map_err(|err| persistence(err.into()))?;
    let mut tmp_path = path.as_os_str().to_owned();
    tmp_path.push(".tmp");
    let tmp_path = PathBuf::from(tmp_path);

    let result = async {
        fs::write(&tmp_path, payload).await?;
        fs::rename(&tmp_path, path).await
    }
    .await;

    result.map_err(|source| {
        error!("failed to persist ledger to {}: {source}", path.display());
        persistence(source)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn new_expense(date: &str, cents: i64, description: &str) -> NewExpense {
        NewExpense {
            date: Some(date.to_string()),
            amount: Some(Money::from_cents(cents)),
            description: Some(description.to_string()),
        }
    }

    fn new_earning(week: i64, start: &str, end: &str) -> NewEarning {
        NewEarning {
            week_number: Some(week),
            gross_amount: Some(Money::from_cents(100000)),
            start_date: Some(start.to_string()),
            end_date: Some(end.to_string()),
        }
    }

    #[tokio::test]
    async fn expenses_list_newest_first_and_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        let store = LedgerStore::open(&path).await.unwrap();

        store
            .create_expense(new_expense("2024-01-03", 20000, "flour"))
            .await
            .unwrap();
        store
            .create_expense(new_expense("2024-01-10", 5000, "gas"))
            .await
            .unwrap();
        store
            .create_expense(new_expense("2024-01-01", 1234, "napkins"))
            .await
            .unwrap();

        let listed = store.list_expenses().await;
        let dates: Vec<String> = listed.iter().map(|e| e.date.to_string()).collect();
        assert_eq!(dates, vec!["2024-01-10", "2024-01-03", "2024-01-01"]);
        assert_eq!(listed[2].amount.cents(), 1234);
        assert_eq!(listed[2].description, "napkins");

        let reopened = LedgerStore::open(&path).await.unwrap();
        assert_eq!(reopened.list_expenses().await, listed);
    }

    #[tokio::test]
    async fn same_day_expenses_list_latest_insert_first() {
        let dir = tempfile::tempdir().unwrap();
        let store = LedgerStore::open(dir.path().join("ledger.json")).await.unwrap();

        store
            .create_expense(new_expense("2024-01-03", 100, "first"))
            .await
            .unwrap();
        store
            .create_expense(new_expense("2024-01-03", 200, "second"))
            .await
            .unwrap();

        let listed = store.list_expenses().await;
        assert_eq!(listed[0].description, "second");
        assert_eq!(listed[1].description, "first");
    }

    #[tokio::test]
    async fn invalid_request_persists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        let store = LedgerStore::open(&path).await.unwrap();

        let err = store
            .create_expense(NewExpense {
                amount: None,
                ..new_expense("2024-01-03", 0, "flour")
            })
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert!(store.list_expenses().await.is_empty());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn failed_write_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("ledger.json");
        let store = LedgerStore::with_data(&path, LedgerData::default());

        let err = store
            .create_earning(new_earning(1, "2024-01-01", "2024-01-07"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Persistence { .. }));
        assert!(store.list_earnings().await.is_empty());
    }

    #[tokio::test]
    async fn earnings_sorted_by_start_date() {
        let dir = tempfile::tempdir().unwrap();
        let store = LedgerStore::open(dir.path().join("ledger.json")).await.unwrap();

        store
            .create_earning(new_earning(1, "2024-01-01", "2024-01-07"))
            .await
            .unwrap();
        store
            .create_earning(new_earning(3, "2024-01-15", "2024-01-21"))
            .await
            .unwrap();
        store
            .create_earning(new_earning(2, "2024-01-08", "2024-01-14"))
            .await
            .unwrap();

        let snapshot = store.snapshot().await;
        let weeks: Vec<u8> = snapshot.earnings.iter().map(|e| e.week_number).collect();
        assert_eq!(weeks, vec![3, 2, 1]);
        assert_eq!(
            snapshot.earnings[0].end_date,
            NaiveDate::from_ymd_opt(2024, 1, 21).unwrap()
        );
    }

    #[tokio::test]
    async fn create_past_total_limit_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        let existing = Expense {
            id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            amount: Money::MAX,
            description: "equipment".to_string(),
        };
        let store = LedgerStore::with_data(
            &path,
            LedgerData {
                expenses: vec![existing.clone()],
                earnings: Vec::new(),
            },
        );

        let err = store
            .create_expense(new_expense("2024-01-03", 1, "napkins"))
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(store.list_expenses().await, vec![existing]);
        assert!(!path.exists());

        store
            .create_earning(new_earning(1, "2024-01-01", "2024-01-07"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn oversized_totals_are_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        let expense = |id: &str| {
            format!(
                r#"{{"id":"{id}","date":"2024-01-02","amount":60000000000000,"description":"x"}}"#
            )
        };
        let body = format!(
            r#"{{"expenses":[{},{}],"earnings":[]}}"#,
            expense("6f1c0b1e-8e3a-4d5e-9a43-0d3c6a1b2c01"),
            expense("6f1c0b1e-8e3a-4d5e-9a43-0d3c6a1b2c02")
        );
        std::fs::write(&path, body).unwrap();

        let err = LedgerStore::open(&path).await.err().unwrap();
        assert!(matches!(err, LoadError::OutOfRange { .. }));
    }

    #[tokio::test]
    async fn corrupt_file_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        std::fs::write(&path, b"{ not json").unwrap();

        let err = LedgerStore::open(&path).await.err().unwrap();
        assert!(matches!(err, LoadError::Parse { .. }));
    }

    #[tokio::test]
    async fn missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let data = load_ledger(&dir.path().join("absent.json")).await.unwrap();
        assert_eq!(data, LedgerData::default());
    }
}
