use crate::errors::{AppError, AppResult};
use crate::models::{
    AgendaItem, Announcement, AppSettings, Household, HouseholdDues, InventoryItem, Letter, SessionUser, StaffMember,
    Suggestion, Transaction, User,
};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Named storage slots. The names are the keys the web console has always
/// used, so an exported snapshot stays readable by older front-ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    Users,
    CurrentUser,
    Households,
    Letters,
    Transactions,
    Dues,
    Agenda,
    Staff,
    Inventory,
    Announcements,
    Suggestions,
    Settings,
}

impl Slot {
    pub const ALL: [Slot; 12] = [
        Self::Users,
        Self::CurrentUser,
        Self::Households,
        Self::Letters,
        Self::Transactions,
        Self::Dues,
        Self::Agenda,
        Self::Staff,
        Self::Inventory,
        Self::Announcements,
        Self::Suggestions,
        Self::Settings,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::CurrentUser => "currentUser",
            Self::Households => "warga",
            Self::Letters => "surat",
            Self::Transactions => "transaksi",
            Self::Dues => "iuran",
            Self::Agenda => "agenda",
            Self::Staff => "pengurus",
            Self::Inventory => "inventaris",
            Self::Announcements => "pengumuman",
            Self::Suggestions => "saran",
            Self::Settings => "settings",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|slot| slot.as_str() == value)
    }

    /// Fails unless `value` decodes into the record type this slot holds.
    pub fn check_value(self, value: &serde_json::Value) -> AppResult<()> {
        let decoded = match self {
            Self::Users => decodes::<Vec<User>>(value),
            Self::CurrentUser => decodes::<Option<SessionUser>>(value),
            Self::Households => decodes::<Vec<Household>>(value),
            Self::Letters => decodes::<Vec<Letter>>(value),
            Self::Transactions => decodes::<Vec<Transaction>>(value),
            Self::Dues => decodes::<Vec<HouseholdDues>>(value),
            Self::Agenda => decodes::<Vec<AgendaItem>>(value),
            Self::Staff => decodes::<Vec<StaffMember>>(value),
            Self::Inventory => decodes::<Vec<InventoryItem>>(value),
            Self::Announcements => decodes::<Vec<Announcement>>(value),
            Self::Suggestions => decodes::<Vec<Suggestion>>(value),
            Self::Settings => decodes::<AppSettings>(value),
        };
        decoded.map_err(|error| AppError::Validation(format!("slot '{}' is malformed: {}", self.as_str(), error)))
    }
}

fn decodes<T: DeserializeOwned>(value: &serde_json::Value) -> Result<(), serde_json::Error> {
    serde_json::from_value::<T>(value.clone()).map(|_| ())
}

#[derive(Debug)]
pub struct Database {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl Database {
    pub fn new(path: &Path) -> AppResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| AppError::Io(err.to_string()))?;
        }
        let conn = Connection::open(path).map_err(AppError::from)?;
        conn.execute_batch(SCHEMA_SQL).map_err(AppError::from)?;

        let db = Self {
            conn: Mutex::new(conn),
            db_path: path.to_path_buf(),
        };

        db.ensure_default_settings()?;

        Ok(db)
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Returns the stored value, or `default()` when the slot was never
    /// written. The default is not persisted.
    pub fn load_slot<T, F>(&self, slot: Slot, default: F) -> AppResult<T>
    where
        T: DeserializeOwned,
        F: FnOnce() -> T,
    {
        let raw = {
            let conn = self.conn()?;
            conn.query_row(
                "SELECT value_json FROM kv_slots WHERE slot = ?1",
                [slot.as_str()],
                |row| row.get::<_, String>(0),
            )
            .optional()?
        };

        match raw {
            Some(raw) => serde_json::from_str::<T>(&raw).map_err(|error| {
                AppError::Internal(format!(
                    "slot '{}' holds undecodable data: {}",
                    slot.as_str(),
                    error
                ))
            }),
            None => Ok(default()),
        }
    }

    pub fn save_slot<T: Serialize + ?Sized>(&self, slot: Slot, value: &T) -> AppResult<()> {
        let value_json = serde_json::to_string(value)?;
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO kv_slots (slot, value_json, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(slot) DO UPDATE SET value_json = excluded.value_json, updated_at = excluded.updated_at",
            params![slot.as_str(), value_json, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn clear_slot(&self, slot: Slot) -> AppResult<bool> {
        let conn = self.conn()?;
        let removed = conn.execute("DELETE FROM kv_slots WHERE slot = ?1", [slot.as_str()])?;
        Ok(removed > 0)
    }

    pub fn has_slot(&self, slot: Slot) -> AppResult<bool> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(1) FROM kv_slots WHERE slot = ?1",
            [slot.as_str()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn get_settings(&self) -> AppResult<AppSettings> {
        let conn = self.conn()?;
        let raw = conn
            .query_row(
                "SELECT value_json FROM kv_slots WHERE slot = ?1",
                [Slot::Settings.as_str()],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        match raw {
            Some(raw) => serde_json::from_str::<AppSettings>(&raw).map_err(|error| {
                AppError::Internal(format!("slot 'settings' holds undecodable data: {}", error))
            }),
            None => Ok(AppSettings::default()),
        }
    }

    pub fn update_settings(&self, update: serde_json::Value) -> AppResult<AppSettings> {
        if !update.is_object() {
            return Err(AppError::Validation("settings update must be a JSON object".to_string()));
        }
        let current = self.get_settings()?;
        let mut merged = serde_json::to_value(current)?;
        merge_json(&mut merged, update);
        let settings: AppSettings = serde_json::from_value(merged)
            .map_err(|error| AppError::Validation(format!("invalid settings: {}", error)))?;

        self.save_slot(Slot::Settings, &settings)?;
        Ok(settings)
    }

    /// Every stored slot, keyed by slot name. Slots never written are absent.
    pub fn export_snapshot(&self) -> AppResult<BTreeMap<String, serde_json::Value>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT slot, value_json FROM kv_slots ORDER BY slot")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;

        let mut snapshot = BTreeMap::new();
        for row in rows {
            let (slot, raw) = row?;
            snapshot.insert(slot, serde_json::from_str(&raw)?);
        }
        Ok(snapshot)
    }

    /// Replaces the given slots in one transaction. Slots missing from the
    /// snapshot are left untouched. Nothing is written unless every slot
    /// decodes into its record type.
    pub fn import_snapshot(&self, snapshot: &BTreeMap<String, serde_json::Value>) -> AppResult<usize> {
        let mut resolved = Vec::with_capacity(snapshot.len());
        for (name, value) in snapshot {
            let Some(slot) = Slot::parse(name) else {
                return Err(AppError::Validation(format!("unknown slot '{}'", name)));
            };
            slot.check_value(value)?;
            resolved.push((slot, serde_json::to_string(value)?));
        }

        let now = Utc::now().to_rfc3339();
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        for (slot, value_json) in &resolved {
            tx.execute(
                "INSERT INTO kv_slots (slot, value_json, updated_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(slot) DO UPDATE SET value_json = excluded.value_json, updated_at = excluded.updated_at",
                params![slot.as_str(), value_json, now],
            )?;
        }
        tx.commit()?;
        Ok(resolved.len())
    }

    fn ensure_default_settings(&self) -> AppResult<()> {
        if self.has_slot(Slot::Settings)? {
            return Ok(());
        }
        self.save_slot(Slot::Settings, &AppSettings::default())
    }

    fn conn(&self) -> AppResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::Internal("database mutex poisoned".to_string()))
    }
}

fn merge_json(target: &mut serde_json::Value, update: serde_json::Value) {
    match (target, update) {
        (serde_json::Value::Object(target_map), serde_json::Value::Object(update_map)) => {
            for (key, value) in update_map {
                merge_json(target_map.entry(key).or_insert(serde_json::Value::Null), value);
            }
        }
        (target, update) => {
            *target = update;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Database, Slot};
    use crate::errors::AppError;
    use crate::models::Suggestion;
    use std::collections::BTreeMap;

    fn open() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().expect("tempdir");
        let db = Database::new(&dir.path().join("state.sqlite")).expect("db");
        (dir, db)
    }

    #[test]
    fn absent_slot_yields_default_without_writing_it() {
        let (_dir, db) = open();
        let value: Vec<String> = db
            .load_slot(Slot::Letters, || vec!["seed".to_string()])
            .expect("load");
        assert_eq!(value, vec!["seed".to_string()]);
        assert!(!db.has_slot(Slot::Letters).expect("has slot"));
    }

    #[test]
    fn saved_slot_survives_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("state.sqlite");
        {
            let db = Database::new(&path).expect("db");
            db.save_slot(Slot::Agenda, &vec![1, 2, 3]).expect("save");
        }
        let db = Database::new(&path).expect("reopen");
        let value: Vec<i32> = db.load_slot(Slot::Agenda, Vec::new).expect("load");
        assert_eq!(value, vec![1, 2, 3]);
    }

    #[test]
    fn clear_slot_reports_whether_anything_was_removed() {
        let (_dir, db) = open();
        db.save_slot(Slot::CurrentUser, &serde_json::json!({"id": "user-1"}))
            .expect("save");
        assert!(db.clear_slot(Slot::CurrentUser).expect("clear"));
        assert!(!db.clear_slot(Slot::CurrentUser).expect("clear again"));
    }

    #[test]
    fn undecodable_slot_is_an_error() {
        let (_dir, db) = open();
        db.save_slot(Slot::Inventory, &serde_json::json!({"not": "a list"}))
            .expect("save");
        let result: Result<Vec<String>, AppError> = db.load_slot(Slot::Inventory, Vec::new);
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[test]
    fn settings_merge_partial_updates() {
        let (_dir, db) = open();
        let settings = db
            .update_settings(serde_json::json!({
                "letterhead": { "city": "Bogor" },
                "upcomingAgendaLimit": 5
            }))
            .expect("update");
        assert_eq!(settings.letterhead.city, "Bogor");
        assert_eq!(settings.letterhead.rt_number, "01");
        assert_eq!(settings.upcoming_agenda_limit, 5);
        assert_eq!(db.get_settings().expect("settings"), settings);
    }

    #[test]
    fn settings_update_rejects_wrong_types() {
        let (_dir, db) = open();
        let result = db.update_settings(serde_json::json!({ "upcomingAgendaLimit": "many" }));
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn snapshot_round_trips_and_rejects_unknown_slots() {
        let (_dir, db) = open();
        let inbox = serde_json::json!([
            { "id": "saran-1", "sender": "Anonim", "body": "Tambah lampu jalan", "date": "2024-05-01" }
        ]);
        db.save_slot(Slot::Suggestions, &inbox).expect("save");
        let snapshot = db.export_snapshot().expect("export");
        assert!(snapshot.contains_key("saran"));
        assert!(snapshot.contains_key("settings"));

        let (_other_dir, other) = open();
        assert_eq!(other.import_snapshot(&snapshot).expect("import"), snapshot.len());
        let restored: Vec<Suggestion> = other.load_slot(Slot::Suggestions, Vec::new).expect("load");
        assert_eq!(restored[0].body, "Tambah lampu jalan");

        let mut bogus = BTreeMap::new();
        bogus.insert("cookies".to_string(), serde_json::json!([]));
        assert!(matches!(other.import_snapshot(&bogus), Err(AppError::Validation(_))));
    }

    #[test]
    fn malformed_slot_aborts_the_whole_import() {
        let (_dir, db) = open();
        let mut snapshot = BTreeMap::new();
        snapshot.insert("agenda".to_string(), serde_json::json!([]));
        snapshot.insert("warga".to_string(), serde_json::json!({ "not": "a list" }));
        let result = db.import_snapshot(&snapshot);
        assert!(matches!(result, Err(AppError::Validation(message)) if message.contains("'warga'")));
        assert!(!db.has_slot(Slot::Agenda).expect("has slot"));

        let mut settings = BTreeMap::new();
        settings.insert("settings".to_string(), serde_json::json!({ "upcomingAgendaLimit": "many" }));
        assert!(matches!(db.import_snapshot(&settings), Err(AppError::Validation(_))));
    }

    #[test]
    fn corrupt_settings_are_reported_not_defaulted() {
        let (_dir, db) = open();
        db.save_slot(Slot::Settings, &serde_json::json!({ "upcomingAgendaLimit": "many" }))
            .expect("save");
        assert!(matches!(db.get_settings(), Err(AppError::Internal(_))));
    }
}
