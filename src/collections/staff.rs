use super::{new_id, remove_by_id, require_text, upsert};
use crate::errors::AppResult;
use crate::models::{SaveStaffPayload, StaffMember};

pub fn save(roster: &mut Vec<StaffMember>, payload: SaveStaffPayload) -> AppResult<StaffMember> {
    let id = match payload.id.as_deref().map(str::trim) {
        Some(id) if roster.iter().any(|member| member.id == id) => id.to_string(),
        _ => new_id("pengurus"),
    };
    let member = StaffMember {
        id,
        position: require_text(&payload.position, "position")?,
        name: require_text(&payload.name, "name")?,
    };
    upsert(roster, member.clone());
    Ok(member)
}

pub fn delete(roster: &mut Vec<StaffMember>, id: &str) -> AppResult<StaffMember> {
    remove_by_id(roster, id, "staff member")
}
