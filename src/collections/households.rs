use super::{new_id, remove_by_id};
use crate::errors::{AppError, AppResult};
use crate::models::{FamilyMember, Household};
use crate::redaction::is_identity_number;

pub const HEAD_RELATIONSHIP: &str = "Kepala Keluarga";

/// Case-insensitive match on the head's name, or a substring of the KK number.
pub fn search<'a>(households: &'a [Household], term: &str) -> Vec<&'a Household> {
    let needle = term.trim().to_lowercase();
    households
        .iter()
        .filter(|household| {
            needle.is_empty()
                || household.head_name.to_lowercase().contains(&needle)
                || household.id.contains(term.trim())
        })
        .collect()
}

pub fn blank_member(relationship: &str) -> FamilyMember {
    FamilyMember {
        id: new_id("new"),
        relationship: relationship.to_string(),
        ..FamilyMember::default()
    }
}

/// An empty form: one member, already marked as head of household.
pub fn new_draft() -> Household {
    Household {
        members: vec![blank_member(HEAD_RELATIONSHIP)],
        ..Household::default()
    }
}

pub fn add_member(household: &mut Household) -> &FamilyMember {
    household.members.push(blank_member(""));
    &household.members[household.members.len() - 1]
}

pub fn remove_member(household: &mut Household, index: usize) -> AppResult<FamilyMember> {
    if index >= household.members.len() {
        return Err(AppError::NotFound(format!("member #{} not found", index)));
    }
    if household.members.len() <= 1 {
        return Err(AppError::Validation("a household keeps at least one member".to_string()));
    }
    Ok(household.members.remove(index))
}

/// Renames a member; renaming the head of household renames the household.
pub fn rename_member(household: &mut Household, index: usize, name: &str) -> AppResult<()> {
    let Some(member) = household.members.get_mut(index) else {
        return Err(AppError::NotFound(format!("member #{} not found", index)));
    };
    member.name = name.to_string();
    if member.relationship.trim().eq_ignore_ascii_case(HEAD_RELATIONSHIP) {
        household.head_name = name.to_string();
    }
    Ok(())
}

pub fn head_of_household(household: &Household) -> Option<&FamilyMember> {
    household
        .members
        .iter()
        .find(|member| member.relationship.trim().eq_ignore_ascii_case(HEAD_RELATIONSHIP))
        .or_else(|| household.members.first())
}

pub fn member_count(households: &[Household]) -> usize {
    households.iter().map(|household| household.members.len()).sum()
}

pub fn sort_by_head_name(households: &mut [Household]) {
    households.sort_by_cached_key(|household| household.head_name.to_lowercase());
}

pub fn create(households: &mut Vec<Household>, household: Household) -> AppResult<()> {
    let household = prepare(household)?;
    if households.iter().any(|existing| existing.id == household.id) {
        return Err(AppError::Conflict("Nomor KK sudah ada.".to_string()));
    }
    households.push(household);
    sort_by_head_name(households);
    Ok(())
}

pub fn update(households: &mut [Household], household: Household) -> AppResult<()> {
    let household = prepare(household)?;
    let Some(existing) = households.iter_mut().find(|existing| existing.id == household.id) else {
        return Err(AppError::NotFound(format!("household {} not found", household.id)));
    };
    *existing = household;
    sort_by_head_name(households);
    Ok(())
}

pub fn delete(households: &mut Vec<Household>, id: &str) -> AppResult<Household> {
    remove_by_id(households, id, "household")
}

fn prepare(mut household: Household) -> AppResult<Household> {
    household.id = household.id.trim().to_string();
    for member in &mut household.members {
        member.nik = member.nik.trim().to_string();
        if member.id.is_empty() {
            member.id = new_id("new");
        }
    }
    if household.head_name.trim().is_empty() {
        if let Some(head) = head_of_household(&household) {
            household.head_name = head.name.clone();
        }
    }
    validate(&household)?;
    Ok(household)
}

pub fn validate(household: &Household) -> AppResult<()> {
    if !is_identity_number(&household.id) {
        return Err(AppError::Validation("Nomor KK harus 16 digit.".to_string()));
    }
    if household.members.is_empty() {
        return Err(AppError::Validation("a household needs at least one member".to_string()));
    }
    if household.head_name.trim().is_empty() {
        return Err(AppError::Validation("head of household name cannot be empty".to_string()));
    }
    for member in &household.members {
        if member.name.trim().is_empty() {
            return Err(AppError::Validation("member name cannot be empty".to_string()));
        }
        if !member.nik.is_empty() && !is_identity_number(&member.nik) {
            return Err(AppError::Validation(format!("NIK {} harus 16 digit.", member.name)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{
        add_member, create, delete, head_of_household, new_draft, remove_member, rename_member, search, update,
        HEAD_RELATIONSHIP,
    };
    use crate::errors::AppError;
    use crate::seed;

    fn draft(id: &str, head: &str) -> crate::models::Household {
        let mut household = new_draft();
        household.id = id.to_string();
        rename_member(&mut household, 0, head).expect("rename");
        household
    }

    #[test]
    fn create_sorts_by_head_name_and_rejects_duplicates() {
        let mut households = seed::households();
        create(&mut households, draft("3201234567890003", "agus salim")).expect("create");
        let names: Vec<_> = households.iter().map(|h| h.head_name.as_str()).collect();
        assert_eq!(names, vec!["agus salim", "Eko Prasetyo", "Siti Aminah"]);

        let result = create(&mut households, draft("3201234567890003", "Budi"));
        assert!(matches!(result, Err(AppError::Conflict(message)) if message == "Nomor KK sudah ada."));
    }

    #[test]
    fn create_rejects_malformed_numbers() {
        let mut households = Vec::new();
        assert!(matches!(
            create(&mut households, draft("12345", "Joko")),
            Err(AppError::Validation(_))
        ));

        let mut household = draft("3201234567890009", "Joko");
        household.members[0].nik = "99".to_string();
        assert!(matches!(create(&mut households, household), Err(AppError::Validation(_))));
    }

    #[test]
    fn search_matches_name_case_insensitively_or_number() {
        let households = seed::households();
        assert_eq!(search(&households, "siti").len(), 1);
        assert_eq!(search(&households, "0001")[0].head_name, "Eko Prasetyo");
        assert_eq!(search(&households, "").len(), 2);
        assert!(search(&households, "nobody").is_empty());
    }

    #[test]
    fn renaming_head_renames_household() {
        let mut household = draft("3201234567890003", "Agus");
        add_member(&mut household);
        rename_member(&mut household, 1, "Rina").expect("rename");
        assert_eq!(household.head_name, "Agus");
        rename_member(&mut household, 0, "Agus Salim").expect("rename");
        assert_eq!(household.head_name, "Agus Salim");
    }

    #[test]
    fn last_member_cannot_be_removed() {
        let mut household = draft("3201234567890003", "Agus");
        assert!(matches!(remove_member(&mut household, 0), Err(AppError::Validation(_))));
        add_member(&mut household);
        assert!(remove_member(&mut household, 1).is_ok());
        assert_eq!(household.members.len(), 1);
    }

    #[test]
    fn head_falls_back_to_first_member() {
        let mut household = draft("3201234567890003", "Agus");
        assert_eq!(head_of_household(&household).map(|m| m.name.as_str()), Some("Agus"));
        household.members[0].relationship = "Anak".to_string();
        add_member(&mut household);
        household.members[1].name = "Rina".to_string();
        household.members[1].relationship = "kepala keluarga".to_string();
        assert_eq!(head_of_household(&household).map(|m| m.name.as_str()), Some("Rina"));
        household.members[1].relationship = String::new();
        assert_eq!(head_of_household(&household).map(|m| m.name.as_str()), Some("Agus"));
        assert_ne!(household.members[0].relationship, HEAD_RELATIONSHIP);
    }

    #[test]
    fn update_and_delete_require_existing_records() {
        let mut households = seed::households();
        let mut changed = households[0].clone();
        changed.address = "Jl. Merdeka No. 10".to_string();
        update(&mut households, changed).expect("update");
        assert_eq!(households[0].address, "Jl. Merdeka No. 10");

        assert!(matches!(
            update(&mut households, draft("3201234567890099", "Nobody")),
            Err(AppError::NotFound(_))
        ));
        delete(&mut households, "3201234567890002").expect("delete");
        assert_eq!(households.len(), 1);
    }
}
