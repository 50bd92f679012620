use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserRole {
    #[serde(rename = "Ketua RT")]
    Chair,
    #[serde(rename = "Sekretaris")]
    Secretary,
    #[serde(rename = "Bendahara")]
    Treasurer,
    #[serde(rename = "Warga")]
    Resident,
}

impl UserRole {
    pub const ALL: [UserRole; 4] = [Self::Chair, Self::Secretary, Self::Treasurer, Self::Resident];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Chair => "Ketua RT",
            Self::Secretary => "Sekretaris",
            Self::Treasurer => "Bendahara",
            Self::Resident => "Warga",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub role: UserRole,
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_card_number: Option<String>,
}

/// The user as kept in the `currentUser` slot: never carries a password.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: String,
    pub username: String,
    pub role: UserRole,
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_card_number: Option<String>,
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            role: user.role,
            full_name: user.full_name.clone(),
            family_card_number: user.family_card_number.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "Laki-laki")]
    Male,
    #[serde(rename = "Perempuan")]
    Female,
    #[default]
    #[serde(rename = "")]
    Unspecified,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Male => "Laki-laki",
            Self::Female => "Perempuan",
            Self::Unspecified => "",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct FamilyMember {
    pub id: String,
    pub name: String,
    pub nik: String,
    pub gender: Gender,
    pub birth_place: String,
    #[serde(with = "optional_date")]
    pub birth_date: Option<NaiveDate>,
    pub religion: String,
    pub education: String,
    pub occupation: String,
    pub relationship: String,
}

/// A household keyed by its family card number (No. KK).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Household {
    pub id: String,
    pub head_name: String,
    pub address: String,
    pub rt: String,
    pub rw: String,
    pub village: String,
    pub district: String,
    pub city: String,
    pub province: String,
    pub postal_code: String,
    pub members: Vec<FamilyMember>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family_card_image: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LetterKind {
    #[serde(rename = "Pengantar KTP")]
    IdentityCard,
    #[serde(rename = "Pengantar KK")]
    FamilyCard,
    #[serde(rename = "Keterangan Tidak Mampu (SKTM)")]
    LowIncome,
    #[serde(rename = "Keterangan Domisili")]
    Domicile,
    #[serde(rename = "Pengantar Nikah")]
    Marriage,
}

impl LetterKind {
    pub const ALL: [LetterKind; 5] = [
        Self::IdentityCard,
        Self::FamilyCard,
        Self::LowIncome,
        Self::Domicile,
        Self::Marriage,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::IdentityCard => "Pengantar KTP",
            Self::FamilyCard => "Pengantar KK",
            Self::LowIncome => "Keterangan Tidak Mampu (SKTM)",
            Self::Domicile => "Keterangan Domisili",
            Self::Marriage => "Pengantar Nikah",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Applicant {
    pub name: String,
    pub nik: String,
    pub family_card_number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Letter {
    pub id: String,
    pub number: String,
    pub kind: LetterKind,
    pub date: NaiveDate,
    pub applicant: Applicant,
    pub purpose: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    #[serde(rename = "Pemasukan")]
    Income,
    #[serde(rename = "Pengeluaran")]
    Expense,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "Pemasukan",
            Self::Expense => "Pengeluaran",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub date: NaiveDate,
    pub kind: TransactionKind,
    pub description: String,
    pub amount: u64,
}

/// Monthly dues ledger for one household, keyed `<bulan>-<tahun>`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HouseholdDues {
    pub family_card_number: String,
    pub head_name: String,
    #[serde(default)]
    pub payments: BTreeMap<String, bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AgendaItem {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    pub description: String,
    #[serde(default)]
    pub documentation: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StaffMember {
    pub id: String,
    pub position: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemCondition {
    #[default]
    #[serde(rename = "Baik")]
    Good,
    #[serde(rename = "Rusak")]
    Damaged,
    #[serde(rename = "Perbaikan")]
    UnderRepair,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: String,
    pub name: String,
    pub quantity: u32,
    pub condition: ItemCondition,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub id: String,
    pub title: String,
    pub body: String,
    pub date: NaiveDate,
    pub author: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub id: String,
    pub sender: String,
    pub body: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Letterhead {
    pub rt_number: String,
    pub rw_number: String,
    pub village: String,
    pub district: String,
    pub city: String,
    pub chair_name: String,
    pub letter_number_prefix: String,
}

impl Default for Letterhead {
    fn default() -> Self {
        Self {
            rt_number: "01".to_string(),
            rw_number: "05".to_string(),
            village: "Contoh".to_string(),
            district: "Contoh".to_string(),
            city: "Jakarta".to_string(),
            chair_name: "Budi Santoso".to_string(),
            letter_number_prefix: "RT01-RW05".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractorSettings {
    pub command: Option<String>,
    pub args: Vec<String>,
    pub timeout_seconds: u64,
}

impl Default for ExtractorSettings {
    fn default() -> Self {
        Self {
            command: None,
            args: Vec::new(),
            timeout_seconds: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub letterhead: Letterhead,
    pub upcoming_agenda_limit: usize,
    pub latest_announcement_limit: usize,
    pub extractor: ExtractorSettings,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            letterhead: Letterhead::default(),
            upcoming_agenda_limit: 3,
            latest_announcement_limit: 3,
            extractor: ExtractorSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginPayload {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLetterPayload {
    pub family_card_number: String,
    pub kind: LetterKind,
    pub purpose: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransactionPayload {
    pub date: NaiveDate,
    pub kind: TransactionKind,
    pub description: String,
    pub amount: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleDuesPayload {
    pub family_card_number: String,
    /// 1-based calendar month.
    pub month: u32,
    pub year: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveAgendaPayload {
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    pub date: NaiveDate,
    pub description: String,
    #[serde(default)]
    pub documentation: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageUpload {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveStaffPayload {
    #[serde(default)]
    pub id: Option<String>,
    pub position: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveInventoryPayload {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub quantity: u32,
    #[serde(default)]
    pub condition: ItemCondition,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveAnnouncementPayload {
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub author: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitSuggestionPayload {
    pub body: String,
    #[serde(default = "default_true")]
    pub anonymous: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BooleanResponse {
    pub success: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResponse {
    pub path: String,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FinanceSummary {
    pub total_income: u64,
    pub total_expense: u64,
    pub balance: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyFinance {
    pub label: String,
    pub year: i32,
    pub month: u32,
    pub income: u64,
    pub expense: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DuesRow {
    pub family_card_number: String,
    pub head_name: String,
    pub paid: Vec<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DuesYearGrid {
    pub year: i32,
    pub months: Vec<String>,
    pub rows: Vec<DuesRow>,
    pub paid_per_month: Vec<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CountEntry {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Demographics {
    pub age_groups: Vec<CountEntry>,
    pub gender: Vec<CountEntry>,
    pub education: Vec<CountEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementPreview {
    pub id: String,
    pub title: String,
    pub excerpt: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub greeting_name: String,
    pub household_count: usize,
    pub member_count: usize,
    pub balance: i64,
    pub balance_display: String,
    pub upcoming_agenda: Vec<AgendaItem>,
    pub latest_announcements: Vec<AnnouncementPreview>,
    pub demographics: Demographics,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LetterPreview {
    pub letter: Letter,
    pub file_name: String,
    pub text: String,
}

/// Serializes an optional date the way the forms send it: `YYYY-MM-DD`
/// or an empty string.
mod optional_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S>(value: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(date) => serializer.serialize_str(&date.format(FORMAT).to_string()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => NaiveDate::parse_from_str(value, FORMAT)
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}
