use super::{new_id, remove_by_id};
use crate::errors::{AppError, AppResult};
use crate::models::{Suggestion, SubmitSuggestionPayload};
use chrono::NaiveDate;

pub const ANONYMOUS_SENDER: &str = "Anonim";

pub fn submit(
    items: &mut Vec<Suggestion>,
    payload: SubmitSuggestionPayload,
    sender_name: Option<&str>,
    today: NaiveDate,
) -> AppResult<Suggestion> {
    if payload.body.trim().is_empty() {
        return Err(AppError::Validation("suggestion cannot be empty".to_string()));
    }
    let sender = match sender_name.map(str::trim) {
        Some(name) if !payload.anonymous && !name.is_empty() => name.to_string(),
        _ => ANONYMOUS_SENDER.to_string(),
    };
    let suggestion = Suggestion {
        id: new_id("saran"),
        sender,
        body: payload.body,
        date: today,
    };
    items.push(suggestion.clone());
    Ok(suggestion)
}

pub fn delete(items: &mut Vec<Suggestion>, id: &str) -> AppResult<Suggestion> {
    remove_by_id(items, id, "suggestion")
}

/// Newest first.
pub fn sorted(items: &[Suggestion]) -> Vec<Suggestion> {
    let mut sorted = items.to_vec();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));
    sorted
}

#[cfg(test)]
mod tests {
    use super::{sorted, submit, ANONYMOUS_SENDER};
    use crate::models::SubmitSuggestionPayload;
    use chrono::NaiveDate;

    fn payload(body: &str, anonymous: bool) -> SubmitSuggestionPayload {
        SubmitSuggestionPayload {
            body: body.to_string(),
            anonymous,
        }
    }

    #[test]
    fn sender_is_anonymous_unless_named() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 2).expect("date");
        let mut items = Vec::new();
        let anon = submit(&mut items, payload("Lampu jalan mati", true), Some("Eko Prasetyo"), today).expect("anon");
        assert_eq!(anon.sender, ANONYMOUS_SENDER);
        let named = submit(&mut items, payload("Tambah tong sampah", false), Some("Eko Prasetyo"), today).expect("named");
        assert_eq!(named.sender, "Eko Prasetyo");
        let nameless = submit(&mut items, payload("Portal rusak", false), None, today).expect("nameless");
        assert_eq!(nameless.sender, ANONYMOUS_SENDER);
    }

    #[test]
    fn whitespace_only_is_rejected() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 2).expect("date");
        let mut items = Vec::new();
        assert!(submit(&mut items, payload(" \n\t ", true), None, today).is_err());
        assert!(items.is_empty());
    }

    #[test]
    fn inbox_is_newest_first() {
        let mut items = Vec::new();
        for day in [1, 3, 2] {
            let date = NaiveDate::from_ymd_opt(2024, 1, day).expect("date");
            submit(&mut items, payload(&day.to_string(), true), None, date).expect("submit");
        }
        let bodies: Vec<_> = sorted(&items).into_iter().map(|s| s.body).collect();
        assert_eq!(bodies, vec!["3", "2", "1"]);
    }
}
