use super::{households::head_of_household, new_id, require_text};
use crate::errors::{AppError, AppResult};
use crate::models::{Applicant, CreateLetterPayload, Household, Letter};
use chrono::{Datelike, NaiveDate};

/// `NNN/<prefix>/<month>/<year>`, numbered from the count of letters already issued.
pub fn next_number(issued: usize, today: NaiveDate, prefix: &str) -> String {
    format!("{:03}/{}/{}/{}", issued + 1, prefix, today.month(), today.year())
}

pub fn create(
    letters: &mut Vec<Letter>,
    households: &[Household],
    payload: CreateLetterPayload,
    today: NaiveDate,
    prefix: &str,
) -> AppResult<Letter> {
    let purpose = require_text(&payload.purpose, "purpose")?;
    let Some(household) = households
        .iter()
        .find(|household| household.id == payload.family_card_number.trim())
    else {
        return Err(AppError::NotFound("Data warga tidak ditemukan.".to_string()));
    };
    let Some(head) = head_of_household(household) else {
        return Err(AppError::Validation(format!(
            "household {} has no members",
            household.id
        )));
    };

    let letter = Letter {
        id: new_id("surat"),
        number: next_number(letters.len(), today, prefix),
        kind: payload.kind,
        date: today,
        applicant: Applicant {
            name: head.name.clone(),
            nik: head.nik.clone(),
            family_card_number: household.id.clone(),
        },
        purpose,
    };
    letters.push(letter.clone());
    Ok(letter)
}

pub fn find<'a>(letters: &'a [Letter], id: &str) -> AppResult<&'a Letter> {
    letters
        .iter()
        .find(|letter| letter.id == id)
        .ok_or_else(|| AppError::NotFound(format!("letter '{}' not found", id)))
}

#[cfg(test)]
mod tests {
    use super::{create, next_number};
    use crate::errors::AppError;
    use crate::models::{CreateLetterPayload, LetterKind};
    use crate::seed;
    use chrono::NaiveDate;

    fn payload(no_kk: &str, purpose: &str) -> CreateLetterPayload {
        CreateLetterPayload {
            family_card_number: no_kk.to_string(),
            kind: LetterKind::Domicile,
            purpose: purpose.to_string(),
        }
    }

    #[test]
    fn numbers_are_sequential_and_dated() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 9).expect("date");
        assert_eq!(next_number(0, today, "RT01-RW05"), "001/RT01-RW05/3/2024");
        assert_eq!(next_number(41, today, "RT01-RW05"), "042/RT01-RW05/3/2024");
    }

    #[test]
    fn applicant_is_head_of_household() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 9).expect("date");
        let households = seed::households();
        let mut letters = Vec::new();

        let first = create(&mut letters, &households, payload("3201234567890002", "Melamar kerja"), today, "RT01-RW05")
            .expect("letter");
        assert_eq!(first.applicant.name, "Siti Aminah");
        assert_eq!(first.applicant.nik, "3201234567890002");
        assert_eq!(first.number, "001/RT01-RW05/3/2024");
        assert_eq!(first.date, today);

        let second = create(&mut letters, &households, payload("3201234567890001", "Pindah"), today, "RT01-RW05")
            .expect("letter");
        assert_eq!(second.number, "002/RT01-RW05/3/2024");
        assert_eq!(letters.len(), 2);
    }

    #[test]
    fn unknown_household_and_blank_purpose_are_rejected() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 9).expect("date");
        let households = seed::households();
        let mut letters = Vec::new();
        let missing = create(&mut letters, &households, payload("3201234567899999", "x"), today, "P");
        assert!(matches!(missing, Err(AppError::NotFound(message)) if message == "Data warga tidak ditemukan."));
        let blank = create(&mut letters, &households, payload("3201234567890001", "  "), today, "P");
        assert!(matches!(blank, Err(AppError::Validation(_))));
        assert!(letters.is_empty());
    }
}
