use super::{new_id, remove_by_id, require_text, upsert};
use crate::errors::AppResult;
use crate::models::{Announcement, AnnouncementPreview, SaveAnnouncementPayload};
use chrono::NaiveDate;

const EXCERPT_CHARS: usize = 80;

/// New announcements default to today and to the signed-in author.
pub fn save(
    items: &mut Vec<Announcement>,
    payload: SaveAnnouncementPayload,
    today: NaiveDate,
    author: &str,
) -> AppResult<Announcement> {
    let existing = payload
        .id
        .as_deref()
        .map(str::trim)
        .and_then(|id| items.iter().find(|item| item.id == id))
        .cloned();

    let announcement = Announcement {
        id: existing.as_ref().map(|item| item.id.clone()).unwrap_or_else(|| new_id("pengumuman")),
        title: require_text(&payload.title, "title")?,
        body: require_text(&payload.body, "body")?,
        date: payload
            .date
            .or_else(|| existing.as_ref().map(|item| item.date))
            .unwrap_or(today),
        author: payload
            .author
            .filter(|author| !author.trim().is_empty())
            .or_else(|| existing.as_ref().map(|item| item.author.clone()))
            .unwrap_or_else(|| author.to_string()),
    };
    upsert(items, announcement.clone());
    Ok(announcement)
}

pub fn delete(items: &mut Vec<Announcement>, id: &str) -> AppResult<Announcement> {
    remove_by_id(items, id, "announcement")
}

/// Newest first.
pub fn sorted(items: &[Announcement]) -> Vec<Announcement> {
    let mut sorted = items.to_vec();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));
    sorted
}

pub fn latest(items: &[Announcement], limit: usize) -> Vec<AnnouncementPreview> {
    sorted(items)
        .into_iter()
        .take(limit)
        .map(|item| AnnouncementPreview {
            excerpt: excerpt(&item.body),
            id: item.id,
            title: item.title,
            date: item.date,
        })
        .collect()
}

/// First 80 characters followed by an ellipsis.
pub fn excerpt(body: &str) -> String {
    let head: String = body.chars().take(EXCERPT_CHARS).collect();
    format!("{}...", head)
}

#[cfg(test)]
mod tests {
    use super::{excerpt, latest, save};
    use crate::models::SaveAnnouncementPayload;
    use chrono::NaiveDate;

    fn payload(title: &str, date: Option<NaiveDate>) -> SaveAnnouncementPayload {
        SaveAnnouncementPayload {
            id: None,
            title: title.to_string(),
            body: "Kerja bakti hari Minggu pukul 07.00 di balai warga.".to_string(),
            date,
            author: None,
        }
    }

    #[test]
    fn defaults_to_today_and_current_author() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 1).expect("date");
        let mut items = Vec::new();
        let saved = save(&mut items, payload("Kerja bakti", None), today, "Citra Lestari").expect("save");
        assert_eq!(saved.date, today);
        assert_eq!(saved.author, "Citra Lestari");

        let mut edit = payload("Kerja bakti (ralat)", None);
        edit.id = Some(saved.id.clone());
        let later = NaiveDate::from_ymd_opt(2024, 6, 1).expect("date");
        let edited = save(&mut items, edit, later, "Budi Santoso").expect("edit");
        assert_eq!(edited.date, today);
        assert_eq!(edited.author, "Citra Lestari");
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn latest_is_newest_first() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 1).expect("date");
        let mut items = Vec::new();
        for day in [3, 1, 4, 2] {
            let date = NaiveDate::from_ymd_opt(2024, 5, day);
            save(&mut items, payload(&format!("day {}", day), date), today, "x").expect("save");
        }
        let titles: Vec<_> = latest(&items, 3).into_iter().map(|p| p.title).collect();
        assert_eq!(titles, vec!["day 4", "day 3", "day 2"]);
    }

    #[test]
    fn excerpt_cuts_on_characters() {
        let body = "é".repeat(100);
        let cut = excerpt(&body);
        assert_eq!(cut.chars().count(), 83);
        assert!(cut.ends_with("..."));
    }
}
