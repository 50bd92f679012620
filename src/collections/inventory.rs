use super::{new_id, remove_by_id, require_text, upsert};
use crate::errors::{AppError, AppResult};
use crate::models::{InventoryItem, SaveInventoryPayload};

pub fn save(items: &mut Vec<InventoryItem>, payload: SaveInventoryPayload) -> AppResult<InventoryItem> {
    if payload.quantity == 0 {
        return Err(AppError::Validation("quantity must be at least 1".to_string()));
    }
    let id = match payload.id.as_deref().map(str::trim) {
        Some(id) if items.iter().any(|item| item.id == id) => id.to_string(),
        _ => new_id("inv"),
    };
    let item = InventoryItem {
        id,
        name: require_text(&payload.name, "item name")?,
        quantity: payload.quantity,
        condition: payload.condition,
    };
    upsert(items, item.clone());
    Ok(item)
}

pub fn delete(items: &mut Vec<InventoryItem>, id: &str) -> AppResult<InventoryItem> {
    remove_by_id(items, id, "inventory item")
}
