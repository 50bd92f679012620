use super::{new_id, remove_by_id, require_text, upsert};
use crate::errors::{AppError, AppResult};
use crate::models::{AgendaItem, ImageUpload, SaveAgendaPayload};
use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use chrono::NaiveDate;

pub fn save(items: &mut Vec<AgendaItem>, payload: SaveAgendaPayload) -> AppResult<AgendaItem> {
    let id = match payload.id.as_deref().map(str::trim) {
        Some(id) if items.iter().any(|item| item.id == id) => id.to_string(),
        _ => new_id("agenda"),
    };
    let item = AgendaItem {
        id,
        title: require_text(&payload.title, "title")?,
        date: payload.date,
        description: payload.description,
        documentation: payload.documentation,
    };
    upsert(items, item.clone());
    Ok(item)
}

pub fn delete(items: &mut Vec<AgendaItem>, id: &str) -> AppResult<AgendaItem> {
    remove_by_id(items, id, "agenda")
}

/// Newest first.
pub fn sorted(items: &[AgendaItem]) -> Vec<AgendaItem> {
    let mut sorted = items.to_vec();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));
    sorted
}

/// Events on or after `today`, soonest first.
pub fn upcoming(items: &[AgendaItem], today: NaiveDate, limit: usize) -> Vec<AgendaItem> {
    let mut upcoming: Vec<AgendaItem> = items.iter().filter(|item| item.date >= today).cloned().collect();
    upcoming.sort_by(|a, b| a.date.cmp(&b.date));
    upcoming.truncate(limit);
    upcoming
}

pub fn data_url(upload: &ImageUpload) -> AppResult<String> {
    let mime_type = upload.mime_type.trim();
    if !mime_type.starts_with("image/") {
        return Err(AppError::Validation(format!(
            "documentation must be an image, got '{}'",
            mime_type
        )));
    }
    if upload.bytes.is_empty() {
        return Err(AppError::Validation("documentation image is empty".to_string()));
    }
    Ok(format!("data:{};base64,{}", mime_type, B64.encode(&upload.bytes)))
}

/// Appends images to an event's documentation, in upload order.
pub fn attach_documentation(items: &mut [AgendaItem], id: &str, uploads: &[ImageUpload]) -> AppResult<AgendaItem> {
    let encoded = uploads.iter().map(data_url).collect::<AppResult<Vec<_>>>()?;
    let Some(item) = items.iter_mut().find(|item| item.id == id) else {
        return Err(AppError::NotFound(format!("agenda '{}' not found", id)));
    };
    item.documentation.extend(encoded);
    Ok(item.clone())
}

#[cfg(test)]
mod tests {
    use super::{attach_documentation, data_url, save, sorted, upcoming};
    use crate::errors::AppError;
    use crate::models::{ImageUpload, SaveAgendaPayload};
    use chrono::NaiveDate;

    fn on(day: u32, title: &str) -> SaveAgendaPayload {
        SaveAgendaPayload {
            id: None,
            title: title.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 8, day).expect("date"),
            description: String::new(),
            documentation: Vec::new(),
        }
    }

    #[test]
    fn save_inserts_then_updates_by_id() {
        let mut items = Vec::new();
        let created = save(&mut items, on(17, "Lomba 17-an")).expect("save");
        assert!(created.id.starts_with("agenda-"));

        let mut edit = on(18, "Lomba 17 Agustus");
        edit.id = Some(created.id.clone());
        save(&mut items, edit).expect("update");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Lomba 17 Agustus");

        let mut stale = on(19, "Rapat");
        stale.id = Some("agenda-gone".to_string());
        let inserted = save(&mut items, stale).expect("insert");
        assert_ne!(inserted.id, "agenda-gone");
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn upcoming_is_soonest_first_and_limited() {
        let mut items = Vec::new();
        for (day, title) in [(1, "a"), (20, "d"), (10, "b"), (15, "c"), (5, "past")] {
            save(&mut items, on(day, title)).expect("save");
        }
        let today = NaiveDate::from_ymd_opt(2024, 8, 10).expect("date");
        let titles: Vec<_> = upcoming(&items, today, 3).into_iter().map(|item| item.title).collect();
        assert_eq!(titles, vec!["b", "c", "d"]);

        let all: Vec<_> = sorted(&items).into_iter().map(|item| item.title).collect();
        assert_eq!(all, vec!["d", "c", "b", "past", "a"]);
    }

    #[test]
    fn documentation_is_stored_as_data_urls() {
        let upload = ImageUpload {
            mime_type: "image/png".to_string(),
            bytes: b"abc".to_vec(),
        };
        assert_eq!(data_url(&upload).expect("url"), "data:image/png;base64,YWJj");

        let mut items = Vec::new();
        let item = save(&mut items, on(1, "Kerja bakti")).expect("save");
        let updated = attach_documentation(&mut items, &item.id, &[upload.clone(), upload]).expect("attach");
        assert_eq!(updated.documentation.len(), 2);

        let text = ImageUpload {
            mime_type: "text/plain".to_string(),
            bytes: b"abc".to_vec(),
        };
        assert!(matches!(
            attach_documentation(&mut items, &item.id, &[text]),
            Err(AppError::Validation(_))
        ));
        assert_eq!(items[0].documentation.len(), 2);
    }
}
