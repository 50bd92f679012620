//! Chart aggregations for the dashboard and the resident statistics panel.

use crate::collections::{agenda, announcements, finance, households};
use crate::locale::format_rupiah;
use crate::models::{
    AgendaItem, Announcement, CountEntry, DashboardSummary, Demographics, FamilyMember, Gender, Household,
    Transaction,
};
use chrono::{Datelike, NaiveDate};

pub const AGE_GROUPS: [&str; 6] = ["0-12", "13-17", "18-25", "26-40", "41-60", "60+"];

/// Whole years since `birth_date`; a birthday later this year does not count yet.
pub fn age_on(birth_date: Option<NaiveDate>, today: NaiveDate) -> i32 {
    let Some(birth_date) = birth_date else {
        return 0;
    };
    let mut age = today.year() - birth_date.year();
    if (today.month(), today.day()) < (birth_date.month(), birth_date.day()) {
        age -= 1;
    }
    age
}

fn age_group(age: i32) -> usize {
    match age {
        i32::MIN..=12 => 0,
        13..=17 => 1,
        18..=25 => 2,
        26..=40 => 3,
        41..=60 => 4,
        _ => 5,
    }
}

pub fn demographics(households: &[Household], today: NaiveDate) -> Demographics {
    let members: Vec<&FamilyMember> = households.iter().flat_map(|household| &household.members).collect();

    let mut ages = [0usize; AGE_GROUPS.len()];
    for member in &members {
        ages[age_group(age_on(member.birth_date, today))] += 1;
    }

    let mut gender = vec![
        CountEntry { label: Gender::Male.as_str().to_string(), count: 0 },
        CountEntry { label: Gender::Female.as_str().to_string(), count: 0 },
    ];
    for member in &members {
        match member.gender {
            Gender::Male => gender[0].count += 1,
            Gender::Female => gender[1].count += 1,
            Gender::Unspecified => {}
        }
    }

    let mut education: Vec<CountEntry> = Vec::new();
    for member in &members {
        let level = member.education.trim();
        if level.is_empty() {
            continue;
        }
        match education.iter_mut().find(|entry| entry.label == level) {
            Some(entry) => entry.count += 1,
            None => education.push(CountEntry { label: level.to_string(), count: 1 }),
        }
    }

    Demographics {
        age_groups: AGE_GROUPS
            .iter()
            .zip(ages)
            .map(|(label, count)| CountEntry { label: label.to_string(), count })
            .collect(),
        gender,
        education,
    }
}

pub struct DashboardInputs<'a> {
    pub greeting_name: &'a str,
    pub households: &'a [Household],
    pub transactions: &'a [Transaction],
    pub agenda: &'a [AgendaItem],
    pub announcements: &'a [Announcement],
    pub today: NaiveDate,
    pub upcoming_limit: usize,
    pub announcement_limit: usize,
}

pub fn dashboard(inputs: DashboardInputs<'_>) -> DashboardSummary {
    let balance = finance::summary(inputs.transactions).balance;
    DashboardSummary {
        greeting_name: inputs.greeting_name.to_string(),
        household_count: inputs.households.len(),
        member_count: households::member_count(inputs.households),
        balance,
        balance_display: format_rupiah(balance),
        upcoming_agenda: agenda::upcoming(inputs.agenda, inputs.today, inputs.upcoming_limit),
        latest_announcements: announcements::latest(inputs.announcements, inputs.announcement_limit),
        demographics: demographics(inputs.households, inputs.today),
    }
}
