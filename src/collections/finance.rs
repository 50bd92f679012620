use super::{new_id, remove_by_id, require_text};
use crate::errors::{AppError, AppResult};
use crate::locale::short_month_label;
use crate::models::{FinanceSummary, MonthlyFinance, NewTransactionPayload, Transaction, TransactionKind};
use chrono::Datelike;
use std::collections::BTreeMap;

/// Largest single amount; keeps the signed balance representable.
pub const MAX_AMOUNT: u64 = i64::MAX as u64;

/// Appends the transaction and keeps the ledger newest first.
pub fn add(transactions: &mut Vec<Transaction>, payload: NewTransactionPayload) -> AppResult<Transaction> {
    if payload.amount > MAX_AMOUNT {
        return Err(AppError::Validation(format!("amount cannot exceed {}", MAX_AMOUNT)));
    }
    let transaction = Transaction {
        id: new_id("trans"),
        date: payload.date,
        kind: payload.kind,
        description: require_text(&payload.description, "description")?,
        amount: payload.amount,
    };
    transactions.push(transaction.clone());
    transactions.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(transaction)
}

pub fn delete(transactions: &mut Vec<Transaction>, id: &str) -> AppResult<Transaction> {
    remove_by_id(transactions, id, "transaction")
}

pub fn summary(transactions: &[Transaction]) -> FinanceSummary {
    let mut summary = FinanceSummary::default();
    for transaction in transactions {
        match transaction.kind {
            TransactionKind::Income => {
                summary.total_income = summary.total_income.saturating_add(transaction.amount)
            }
            TransactionKind::Expense => {
                summary.total_expense = summary.total_expense.saturating_add(transaction.amount)
            }
        }
    }
    let balance = i128::from(summary.total_income) - i128::from(summary.total_expense);
    summary.balance = balance.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64;
    summary
}

/// Income and expense per calendar month, oldest month first.
pub fn monthly_buckets(transactions: &[Transaction]) -> Vec<MonthlyFinance> {
    let mut buckets: BTreeMap<(i32, u32), (u64, u64)> = BTreeMap::new();
    for transaction in transactions {
        let entry = buckets
            .entry((transaction.date.year(), transaction.date.month()))
            .or_default();
        match transaction.kind {
            TransactionKind::Income => entry.0 = entry.0.saturating_add(transaction.amount),
            TransactionKind::Expense => entry.1 = entry.1.saturating_add(transaction.amount),
        }
    }

    buckets
        .into_iter()
        .map(|((year, month), (income, expense))| MonthlyFinance {
            label: short_month_label(year, month),
            year,
            month,
            income,
            expense,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{add, delete, monthly_buckets, summary, MAX_AMOUNT};
    use crate::errors::AppError;
    use crate::models::{NewTransactionPayload, TransactionKind};
    use chrono::NaiveDate;

    fn entry(date: (i32, u32, u32), kind: TransactionKind, amount: u64) -> NewTransactionPayload {
        NewTransactionPayload {
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).expect("date"),
            kind,
            description: "Iuran kebersihan".to_string(),
            amount,
        }
    }

    #[test]
    fn ledger_stays_newest_first() {
        let mut ledger = Vec::new();
        add(&mut ledger, entry((2024, 1, 10), TransactionKind::Income, 100)).expect("add");
        add(&mut ledger, entry((2024, 3, 1), TransactionKind::Expense, 40)).expect("add");
        add(&mut ledger, entry((2024, 2, 5), TransactionKind::Income, 60)).expect("add");
        let months: Vec<_> = ledger.iter().map(|t| t.date.format("%m").to_string()).collect();
        assert_eq!(months, vec!["03", "02", "01"]);
    }

    #[test]
    fn balance_can_go_negative() {
        let mut ledger = Vec::new();
        add(&mut ledger, entry((2024, 1, 10), TransactionKind::Income, 150_000)).expect("add");
        add(&mut ledger, entry((2024, 1, 12), TransactionKind::Expense, 200_000)).expect("add");
        let totals = summary(&ledger);
        assert_eq!(totals.total_income, 150_000);
        assert_eq!(totals.total_expense, 200_000);
        assert_eq!(totals.balance, -50_000);
    }

    #[test]
    fn buckets_group_by_calendar_month() {
        let mut ledger = Vec::new();
        add(&mut ledger, entry((2024, 2, 1), TransactionKind::Income, 10)).expect("add");
        add(&mut ledger, entry((2024, 2, 28), TransactionKind::Expense, 3)).expect("add");
        add(&mut ledger, entry((2023, 12, 31), TransactionKind::Income, 7)).expect("add");
        let buckets = monthly_buckets(&ledger);
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].label, "Des 2023");
        assert_eq!((buckets[1].income, buckets[1].expense), (10, 3));
    }

    #[test]
    fn oversized_amounts_are_rejected_and_totals_saturate() {
        let mut ledger = Vec::new();
        let too_big = add(&mut ledger, entry((2024, 1, 1), TransactionKind::Income, MAX_AMOUNT + 1));
        assert!(matches!(too_big, Err(AppError::Validation(_))));
        assert!(ledger.is_empty());

        for day in 1..=3 {
            add(&mut ledger, entry((2024, 1, day), TransactionKind::Income, MAX_AMOUNT)).expect("add");
        }
        add(&mut ledger, entry((2024, 1, 4), TransactionKind::Expense, 1)).expect("add");
        let totals = summary(&ledger);
        assert_eq!(totals.total_income, u64::MAX);
        assert_eq!(totals.total_expense, 1);
        assert_eq!(totals.balance, i64::MAX);

        let buckets = monthly_buckets(&ledger);
        assert_eq!((buckets[0].income, buckets[0].expense), (u64::MAX, 1));
    }

    #[test]
    fn blank_description_is_rejected_and_delete_removes() {
        let mut ledger = Vec::new();
        let mut blank = entry((2024, 1, 1), TransactionKind::Income, 1);
        blank.description = " ".to_string();
        assert!(add(&mut ledger, blank).is_err());

        let kept = add(&mut ledger, entry((2024, 1, 1), TransactionKind::Income, 1)).expect("add");
        delete(&mut ledger, &kept.id).expect("delete");
        assert!(ledger.is_empty());
    }
}
