pub mod agenda;
pub mod announcements;
pub mod dues;
pub mod finance;
pub mod households;
pub mod inventory;
pub mod letters;
pub mod staff;
pub mod suggestions;

use crate::errors::{AppError, AppResult};
use crate::models::{AgendaItem, Announcement, Household, InventoryItem, Letter, StaffMember, Suggestion, Transaction};
use uuid::Uuid;

/// A stored record addressed by a string id.
pub trait Record {
    fn id(&self) -> &str;
}

macro_rules! impl_record {
    ($($ty:ty),* $(,)?) => {
        $(impl Record for $ty {
            fn id(&self) -> &str {
                &self.id
            }
        })*
    };
}

impl_record!(AgendaItem, Announcement, Household, InventoryItem, Letter, StaffMember, Suggestion, Transaction);

pub fn new_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4())
}

/// Replaces the record with the same id, or appends it. Returns true when
/// an existing record was replaced.
pub fn upsert<T: Record>(items: &mut Vec<T>, record: T) -> bool {
    match items.iter_mut().find(|item| item.id() == record.id()) {
        Some(existing) => {
            *existing = record;
            true
        }
        None => {
            items.push(record);
            false
        }
    }
}

pub fn remove_by_id<T: Record>(items: &mut Vec<T>, id: &str, label: &str) -> AppResult<T> {
    let Some(index) = items.iter().position(|item| item.id() == id) else {
        return Err(AppError::NotFound(format!("{} '{}' not found", label, id)));
    };
    Ok(items.remove(index))
}

pub(crate) fn require_text(value: &str, label: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{} cannot be empty", label)));
    }
    Ok(trimmed.to_string())
}
