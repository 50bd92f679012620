use crate::errors::{AppError, AppResult};
use crate::locale::{month_name, MONTHS_LONG};
use crate::models::{DuesRow, DuesYearGrid, Household, HouseholdDues};
use std::collections::BTreeMap;

/// Ledger key for a 1-based month: `januari-2024`.
pub fn payment_key(month: u32, year: i32) -> AppResult<String> {
    let Some(name) = month_name(month) else {
        return Err(AppError::Validation(format!("month {} is out of range", month)));
    };
    Ok(format!("{}-{}", name.to_lowercase(), year))
}

pub fn is_paid(dues: &HouseholdDues, month: u32, year: i32) -> bool {
    payment_key(month, year)
        .ok()
        .and_then(|key| dues.payments.get(&key).copied())
        .unwrap_or(false)
}

/// Flips one month for one household and returns the new state.
pub fn toggle(ledger: &mut [HouseholdDues], family_card_number: &str, month: u32, year: i32) -> AppResult<bool> {
    let key = payment_key(month, year)?;
    let Some(dues) = ledger
        .iter_mut()
        .find(|dues| dues.family_card_number == family_card_number)
    else {
        return Err(AppError::NotFound(format!(
            "no dues ledger for household {}",
            family_card_number
        )));
    };
    let paid = !dues.payments.get(&key).copied().unwrap_or(false);
    dues.payments.insert(key, paid);
    Ok(paid)
}

pub fn year_grid(ledger: &[HouseholdDues], year: i32) -> DuesYearGrid {
    let rows: Vec<DuesRow> = ledger
        .iter()
        .map(|dues| DuesRow {
            family_card_number: dues.family_card_number.clone(),
            head_name: dues.head_name.clone(),
            paid: (1..=12).map(|month| is_paid(dues, month, year)).collect(),
        })
        .collect();

    DuesYearGrid {
        year,
        months: MONTHS_LONG.iter().map(ToString::to_string).collect(),
        paid_per_month: month_totals(ledger, year),
        rows,
    }
}

/// Households that paid, per calendar month of `year`.
pub fn month_totals(ledger: &[HouseholdDues], year: i32) -> Vec<usize> {
    (1..=12)
        .map(|month| ledger.iter().filter(|dues| is_paid(dues, month, year)).count())
        .collect()
}

/// The year picker offers the current year and the two before it.
pub fn selectable_years(current_year: i32) -> Vec<i32> {
    (0..3).map(|offset| current_year - offset).collect()
}

/// Opens an empty ledger for a newly registered household.
pub fn register_household(ledger: &mut Vec<HouseholdDues>, household: &Household) {
    if ledger
        .iter()
        .any(|dues| dues.family_card_number == household.id)
    {
        return;
    }
    ledger.push(HouseholdDues {
        family_card_number: household.id.clone(),
        head_name: household.head_name.clone(),
        payments: BTreeMap::new(),
    });
}

/// Keeps the displayed head name in step with the household record.
pub fn rename_household(ledger: &mut [HouseholdDues], household: &Household) {
    for dues in ledger
        .iter_mut()
        .filter(|dues| dues.family_card_number == household.id)
    {
        dues.head_name = household.head_name.clone();
    }
}

pub fn remove_household(ledger: &mut Vec<HouseholdDues>, family_card_number: &str) -> bool {
    let before = ledger.len();
    ledger.retain(|dues| dues.family_card_number != family_card_number);
    ledger.len() != before
}

#[cfg(test)]
mod tests {
    use super::{payment_key, register_household, remove_household, selectable_years, toggle, year_grid};
    use crate::errors::AppError;
    use crate::seed;

    #[test]
    fn keys_use_lowercase_indonesian_months() {
        assert_eq!(payment_key(1, 2024).expect("key"), "januari-2024");
        assert_eq!(payment_key(8, 2023).expect("key"), "agustus-2023");
        assert!(payment_key(13, 2024).is_err());
    }

    #[test]
    fn toggle_flips_and_grid_reflects_it() {
        let mut ledger = seed::dues();
        assert!(toggle(&mut ledger, "3201234567890001", 2, 2024).expect("toggle"));
        assert_eq!(ledger[0].payments.get("februari-2024"), Some(&true));

        let grid = year_grid(&ledger, 2024);
        assert_eq!(grid.months.len(), 12);
        assert!(grid.rows[0].paid[1]);
        assert!(!grid.rows[1].paid[1]);
        assert_eq!(grid.paid_per_month[1], 1);
        assert!(!year_grid(&ledger, 2023).rows[0].paid[1]);

        assert!(!toggle(&mut ledger, "3201234567890001", 2, 2024).expect("toggle back"));
        assert_eq!(year_grid(&ledger, 2024).paid_per_month[1], 0);
    }

    #[test]
    fn toggle_requires_known_household() {
        let mut ledger = seed::dues();
        assert!(matches!(
            toggle(&mut ledger, "3201234567899999", 1, 2024),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn roster_follows_households() {
        let mut ledger = Vec::new();
        let households = seed::households();
        register_household(&mut ledger, &households[0]);
        register_household(&mut ledger, &households[0]);
        assert_eq!(ledger.len(), 1);
        assert!(remove_household(&mut ledger, &households[0].id));
        assert!(!remove_household(&mut ledger, &households[0].id));
    }

    #[test]
    fn offers_three_years() {
        assert_eq!(selectable_years(2024), vec![2024, 2023, 2022]);
    }
}
