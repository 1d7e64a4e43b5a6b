//! Spreadsheet export served by `GET /api/report`.
//!
//! One CSV document with four titled sections: expenses, earnings, the
//! weekly breakdown and the overall totals. Rows are written with a flexible
//! writer because each section has its own column count.

use crate::errors::ReportError;
use crate::models::{FinancialSummary, LedgerData};

pub const REPORT_FILENAME: &str = "relatorio-financeiro.csv";

pub fn render_report(ledger: &LedgerData, summary: &FinancialSummary) -> Result<Vec<u8>, ReportError> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());

    writer.write_record(["Gastos Diarios"])?;
    writer.write_record(["id", "data", "valor", "descricao"])?;
    for expense in &ledger.expenses {
        writer.write_record([
            expense.id.to_string(),
            expense.date.to_string(),
            expense.amount.to_string(),
            expense.description.clone(),
        ])?;
    }

    writer.write_record(["Ganhos Semanais"])?;
    writer.write_record(["id", "semana", "valor_bruto", "data_inicio", "data_fim"])?;
    for earning in &ledger.earnings {
        writer.write_record([
            earning.id.to_string(),
            earning.week_number.to_string(),
            earning.gross_amount.to_string(),
            earning.start_date.to_string(),
            earning.end_date.to_string(),
        ])?;
    }

    writer.write_record(["Resumo Semanal"])?;
    writer.write_record(["semana", "data_inicio", "data_fim", "bruto", "gastos", "liquido"])?;
    for week in &summary.weekly {
        writer.write_record([
            week.week.to_string(),
            week.start_date.to_string(),
            week.end_date.to_string(),
            week.gross.to_string(),
            week.expenses.to_string(),
            week.net.to_string(),
        ])?;
    }

    writer.write_record(["Resumo Mensal"])?;
    writer.write_record(["bruto", "gastos", "liquido", "gastos_fora_das_semanas"])?;
    writer.write_record([
        summary.monthly.gross.to_string(),
        summary.monthly.expenses.to_string(),
        summary.monthly.net.to_string(),
        summary.unattributed_expenses.to_string(),
    ])?;

    writer
        .into_inner()
        .map_err(|err| ReportError::Io(err.into_error()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Earning, Expense};
    use crate::money::Money;
    use crate::summary::summarize;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn sample_ledger() -> LedgerData {
        LedgerData {
            expenses: vec![
                Expense {
                    id: Uuid::new_v4(),
                    date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
                    amount: Money::from_cents(5000),
                    description: "gas, refill".to_string(),
                },
                Expense {
                    id: Uuid::new_v4(),
                    date: NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
                    amount: Money::from_cents(20000),
                    description: "flour".to_string(),
                },
            ],
            earnings: vec![Earning {
                id: Uuid::new_v4(),
                week_number: 1,
                gross_amount: Money::from_cents(100000),
                start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2024, 1, 7).unwrap(),
            }],
        }
    }

    #[test]
    fn report_has_every_section() {
        let ledger = sample_ledger();
        let summary = summarize(&ledger.expenses, &ledger.earnings);
        let text = String::from_utf8(render_report(&ledger, &summary).unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Gastos Diarios");
        assert!(lines[2].ends_with(",2024-01-10,50.00,\"gas, refill\""));
        assert!(lines[3].ends_with(",2024-01-03,200.00,flour"));
        assert_eq!(lines[4], "Ganhos Semanais");
        assert!(lines[6].ends_with(",1,1000.00,2024-01-01,2024-01-07"));
        assert_eq!(lines[7], "Resumo Semanal");
        assert_eq!(lines[9], "1,2024-01-01,2024-01-07,1000.00,200.00,800.00");
        assert_eq!(lines[10], "Resumo Mensal");
        assert_eq!(lines[12], "1000.00,250.00,750.00,50.00");
        assert_eq!(lines.len(), 13);
    }

    #[test]
    fn empty_ledger_still_has_totals() {
        let ledger = LedgerData::default();
        let summary = summarize(&[], &[]);
        let text = String::from_utf8(render_report(&ledger, &summary).unwrap()).unwrap();
        assert!(text.trim_end().ends_with("0.00,0.00,0.00,0.00"));
    }
}
