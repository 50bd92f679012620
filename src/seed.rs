use crate::models::{FamilyMember, Gender, Household, HouseholdDues, StaffMember, User, UserRole};
use chrono::NaiveDate;
use std::collections::BTreeMap;

pub fn users() -> Vec<User> {
    let user = |id: &str, username: &str, role: UserRole, full_name: &str, family_card_number: Option<&str>| User {
        id: id.to_string(),
        username: username.to_string(),
        password: Some("password".to_string()),
        role,
        full_name: full_name.to_string(),
        family_card_number: family_card_number.map(ToString::to_string),
    };

    vec![
        user("user-1", "ketua", UserRole::Chair, "Budi Santoso", None),
        user("user-2", "sekretaris", UserRole::Secretary, "Citra Lestari", None),
        user("user-3", "bendahara", UserRole::Treasurer, "Dana Wijaya", None),
        user("user-4", "warga", UserRole::Resident, "Eko Prasetyo", Some("3201234567890001")),
    ]
}

pub fn households() -> Vec<Household> {
    vec![
        seeded_household(
            "3201234567890001",
            "Eko Prasetyo",
            "Jl. Merdeka No. 1",
            FamilyMember {
                id: "warga-1".to_string(),
                name: "Eko Prasetyo".to_string(),
                nik: "3201234567890001".to_string(),
                gender: Gender::Male,
                birth_place: "Bogor".to_string(),
                birth_date: NaiveDate::from_ymd_opt(1980, 1, 15),
                religion: "Islam".to_string(),
                education: "S1".to_string(),
                occupation: "Karyawan Swasta".to_string(),
                relationship: "Kepala Keluarga".to_string(),
            },
        ),
        seeded_household(
            "3201234567890002",
            "Siti Aminah",
            "Jl. Merdeka No. 2",
            FamilyMember {
                id: "warga-2".to_string(),
                name: "Siti Aminah".to_string(),
                nik: "3201234567890002".to_string(),
                gender: Gender::Female,
                birth_place: "Jakarta".to_string(),
                birth_date: NaiveDate::from_ymd_opt(1985, 5, 20),
                religion: "Islam".to_string(),
                education: "SMA".to_string(),
                occupation: "Ibu Rumah Tangga".to_string(),
                relationship: "Kepala Keluarga".to_string(),
            },
        ),
    ]
}

fn seeded_household(id: &str, head_name: &str, address: &str, head: FamilyMember) -> Household {
    Household {
        id: id.to_string(),
        head_name: head_name.to_string(),
        address: address.to_string(),
        rt: "001".to_string(),
        rw: "005".to_string(),
        village: "Sukamaju".to_string(),
        district: "Cibadak".to_string(),
        city: "Bogor".to_string(),
        province: "Jawa Barat".to_string(),
        postal_code: "16710".to_string(),
        members: vec![head],
        family_card_image: None,
    }
}

/// One empty ledger per seeded household.
pub fn dues() -> Vec<HouseholdDues> {
    households()
        .into_iter()
        .map(|household| HouseholdDues {
            family_card_number: household.id,
            head_name: household.head_name,
            payments: BTreeMap::new(),
        })
        .collect()
}

pub fn staff() -> Vec<StaffMember> {
    [("p-1", "Ketua RT", "Budi Santoso"), ("p-2", "Sekretaris", "Citra Lestari"), ("p-3", "Bendahara", "Dana Wijaya")]
        .into_iter()
        .map(|(id, position, name)| StaffMember {
            id: id.to_string(),
            position: position.to_string(),
            name: name.to_string(),
        })
        .collect()
}
