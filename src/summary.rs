use crate::models::{Earning, Expense, FinancialSummary, MonthlySummary, WeeklySummary};
use crate::money::Money;
use chrono::NaiveDate;

/// Rolls expenses and earnings into one summary per earning (same order as
/// `earnings`) plus a total over the whole dataset.
///
/// Each expense lands in at most one week: among the intervals containing its
/// date, the one with the earliest start date wins, ties going to the earning
/// listed first. Expenses outside every interval only count toward the total.
pub fn summarize(expenses: &[Expense], earnings: &[Earning]) -> FinancialSummary {
    let mut week_expenses = vec![Money::ZERO; earnings.len()];
    let mut unattributed_expenses = Money::ZERO;

    for expense in expenses {
        match attributed_week(expense.date, earnings) {
            Some(index) => week_expenses[index] += expense.amount,
            None => unattributed_expenses += expense.amount,
        }
    }

    let weekly = earnings
        .iter()
        .zip(week_expenses)
        .map(|(earning, expenses)| WeeklySummary {
            week: earning.week_number,
            start_date: earning.start_date,
            end_date: earning.end_date,
            gross: earning.gross_amount,
            expenses,
            net: earning.gross_amount - expenses,
        })
        .collect();

    let gross: Money = earnings.iter().map(|earning| earning.gross_amount).sum();
    let total_expenses: Money = expenses.iter().map(|expense| expense.amount).sum();

    FinancialSummary {
        weekly,
        monthly: MonthlySummary {
            gross,
            expenses: total_expenses,
            net: gross - total_expenses,
        },
        unattributed_expenses,
    }
}

/// Index of the earning an expense on `date` is attributed to, if any.
pub fn attributed_week(date: NaiveDate, earnings: &[Earning]) -> Option<usize> {
    earnings
        .iter()
        .enumerate()
        .filter(|(_, earning)| earning.covers(date))
        .min_by_key(|(index, earning)| (earning.start_date, *index))
        .map(|(index, _)| index)
}
