use crate::collections::{agenda, announcements, dues, finance, households, inventory, letters, staff, suggestions};
use crate::db::{Database, Slot};
use crate::errors::{AppError, AppResult};
use crate::extractors::command::CommandExtractor;
use crate::extractors::{self, FamilyCardExtractor, EXTRACTION_FAILED};
use crate::letter_document::{self, DocumentRenderer, PlainTextRenderer};
use crate::locale;
use crate::models::{
    AgendaItem, Announcement, AppSettings, BooleanResponse, CreateLetterPayload, DashboardSummary, DuesYearGrid,
    ExportResponse, FinanceSummary, Household, HouseholdDues, ImageUpload, InventoryItem, Letter, LetterPreview,
    LoginPayload, MonthlyFinance, NewTransactionPayload, SaveAgendaPayload, SaveAnnouncementPayload,
    SaveInventoryPayload, SaveStaffPayload, SessionUser, StaffMember, SubmitSuggestionPayload, Suggestion,
    ToggleDuesPayload, Transaction,
};
use crate::policy::{Capability, NavItem, PolicyEngine, Route, RouteDecision};
use crate::redaction::mask_identity_numbers;
use crate::seed;
use crate::session::SessionManager;
use crate::stats::{self, DashboardInputs};
use chrono::{Datelike, Local};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

const KEYRING_SERVICE: &str = "rt-digital";
const EXTRACTOR_KEY_ENTRY: &str = "extractor-api-key";

/// Every page action of the console. Each operation checks the route or
/// capability for the signed-in user, then loads, mutates and writes
/// through the affected slot.
pub struct ConsoleCore {
    db: Arc<Database>,
    policy: PolicyEngine,
    extractor: Option<Arc<dyn FamilyCardExtractor>>,
    renderer: Arc<dyn DocumentRenderer>,
    keyring_lock: Arc<Mutex<()>>,
    data_dir: PathBuf,
}

impl ConsoleCore {
    pub fn new(data_dir: PathBuf) -> AppResult<Arc<Self>> {
        Self::build(data_dir, None, Arc::new(PlainTextRenderer))
    }

    /// Uses `extractor` for family card scans instead of the configured bridge program.
    pub fn with_extractor(data_dir: PathBuf, extractor: Arc<dyn FamilyCardExtractor>) -> AppResult<Arc<Self>> {
        Self::build(data_dir, Some(extractor), Arc::new(PlainTextRenderer))
    }

    pub fn with_renderer(data_dir: PathBuf, renderer: Arc<dyn DocumentRenderer>) -> AppResult<Arc<Self>> {
        Self::build(data_dir, None, renderer)
    }

    fn build(
        data_dir: PathBuf,
        extractor: Option<Arc<dyn FamilyCardExtractor>>,
        renderer: Arc<dyn DocumentRenderer>,
    ) -> AppResult<Arc<Self>> {
        let db = Arc::new(Database::new(&data_dir.join("state.sqlite"))?);
        tracing::info!(path = %db.path().display(), "console store opened");
        Ok(Arc::new(Self {
            db,
            policy: PolicyEngine::new(),
            extractor,
            renderer,
            keyring_lock: Arc::new(Mutex::new(())),
            data_dir,
        }))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn session(&self) -> SessionManager<'_> {
        SessionManager::new(&self.db)
    }

    fn signed_in(&self, route: Route) -> AppResult<SessionUser> {
        let user = self.session().current_user()?;
        self.policy.require_route(user.as_ref(), route).cloned()
    }

    fn permitted(&self, route: Route, capability: Capability) -> AppResult<SessionUser> {
        let user = self.signed_in(route)?;
        self.policy.require_capability(&user, capability)?;
        Ok(user)
    }

    // Session and navigation

    pub fn login(&self, payload: LoginPayload) -> AppResult<SessionUser> {
        self.session().login(&payload.username, &payload.password)
    }

    pub fn logout(&self) -> AppResult<BooleanResponse> {
        self.session().logout()?;
        Ok(BooleanResponse { success: true })
    }

    pub fn current_user(&self) -> AppResult<Option<SessionUser>> {
        self.session().current_user()
    }

    pub fn profile(&self) -> AppResult<SessionUser> {
        self.signed_in(Route::Profile)
    }

    pub fn guard(&self, path: &str) -> AppResult<RouteDecision> {
        let user = self.session().current_user()?;
        Ok(self.policy.guard(path, user.as_ref()))
    }

    pub fn nav_items(&self) -> AppResult<Vec<NavItem>> {
        Ok(self
            .session()
            .current_user()?
            .map(|user| self.policy.nav_items(user.role))
            .unwrap_or_default())
    }

    // Households

    fn load_households(&self) -> AppResult<Vec<Household>> {
        self.db.load_slot(Slot::Households, seed::households)
    }

    fn load_dues(&self) -> AppResult<Vec<HouseholdDues>> {
        self.db.load_slot(Slot::Dues, seed::dues)
    }

    pub fn list_households(&self, search: Option<String>) -> AppResult<Vec<Household>> {
        self.signed_in(Route::Households)?;
        let all = self.load_households()?;
        Ok(match search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => households::search(&all, term).into_iter().cloned().collect(),
            _ => all,
        })
    }

    pub fn new_household_draft(&self) -> AppResult<Household> {
        self.signed_in(Route::Households)?;
        Ok(households::new_draft())
    }

    pub fn add_draft_member(&self, mut draft: Household) -> AppResult<Household> {
        self.signed_in(Route::Households)?;
        households::add_member(&mut draft);
        Ok(draft)
    }

    pub fn remove_draft_member(&self, mut draft: Household, index: usize) -> AppResult<Household> {
        self.signed_in(Route::Households)?;
        households::remove_member(&mut draft, index)?;
        Ok(draft)
    }

    pub fn rename_draft_member(&self, mut draft: Household, index: usize, name: String) -> AppResult<Household> {
        self.signed_in(Route::Households)?;
        households::rename_member(&mut draft, index, &name)?;
        Ok(draft)
    }

    pub fn create_household(&self, household: Household) -> AppResult<Household> {
        self.signed_in(Route::Households)?;
        let mut all = self.load_households()?;
        let id = household.id.trim().to_string();
        households::create(&mut all, household)?;
        let created = find_household(&all, &id)?;

        let mut ledger = self.load_dues()?;
        dues::register_household(&mut ledger, &created);
        self.db.save_slot(Slot::Households, &all)?;
        self.db.save_slot(Slot::Dues, &ledger)?;
        tracing::info!(
            family_card = %mask_identity_numbers(&created.id),
            members = created.members.len(),
            "household created"
        );
        Ok(created)
    }

    pub fn update_household(&self, household: Household) -> AppResult<Household> {
        self.signed_in(Route::Households)?;
        let mut all = self.load_households()?;
        let id = household.id.trim().to_string();
        households::update(&mut all, household)?;
        let updated = find_household(&all, &id)?;

        let mut ledger = self.load_dues()?;
        dues::rename_household(&mut ledger, &updated);
        self.db.save_slot(Slot::Households, &all)?;
        self.db.save_slot(Slot::Dues, &ledger)?;
        tracing::info!(family_card = %mask_identity_numbers(&updated.id), "household updated");
        Ok(updated)
    }

    pub fn delete_household(&self, id: String) -> AppResult<BooleanResponse> {
        self.signed_in(Route::Households)?;
        let mut all = self.load_households()?;
        let removed = households::delete(&mut all, &id)?;

        let mut ledger = self.load_dues()?;
        dues::remove_household(&mut ledger, &removed.id);
        self.db.save_slot(Slot::Households, &all)?;
        self.db.save_slot(Slot::Dues, &ledger)?;
        tracing::info!(family_card = %mask_identity_numbers(&removed.id), "household deleted");
        Ok(BooleanResponse { success: true })
    }

    /// Reads a family card photo into an unsaved household draft.
    pub async fn scan_family_card(&self, upload: ImageUpload) -> AppResult<Household> {
        self.signed_in(Route::Households)?;
        let extractor = match &self.extractor {
            Some(extractor) => extractor.clone(),
            None => self.command_extractor().await?,
        };

        tokio::task::spawn_blocking(move || extractors::scan_family_card(extractor.as_ref(), &upload))
            .await
            .map_err(|error| AppError::Internal(format!("extraction task failed: {}", error)))?
    }

    async fn command_extractor(&self) -> AppResult<Arc<dyn FamilyCardExtractor>> {
        let settings = self.db.get_settings()?.extractor;
        let Some(program) = settings.command.filter(|command| !command.trim().is_empty()) else {
            tracing::error!("family card scan requested but no extractor command is configured");
            return Err(AppError::Extraction(EXTRACTION_FAILED.to_string()));
        };

        let api_key = match self.read_extractor_api_key().await {
            Ok(key) => key,
            Err(error) => {
                tracing::warn!(error = %error, "extractor api key unavailable; running bridge without it");
                None
            }
        };

        let extractor = CommandExtractor::new(
            program,
            settings.args,
            Duration::from_secs(settings.timeout_seconds.max(1)),
        )
        .with_api_key(api_key);
        Ok(Arc::new(extractor))
    }

    // Extractor credentials

    fn keyring_entry() -> AppResult<keyring::Entry> {
        keyring::Entry::new(KEYRING_SERVICE, EXTRACTOR_KEY_ENTRY).map_err(|error| AppError::Io(error.to_string()))
    }

    async fn read_extractor_api_key(&self) -> AppResult<Option<String>> {
        let _guard = self.keyring_lock.lock().await;
        match Self::keyring_entry()?.get_password() {
            Ok(value) if !value.is_empty() => Ok(Some(value)),
            Ok(_) | Err(keyring::Error::NoEntry) => Ok(None),
            Err(error) => Err(AppError::Io(error.to_string())),
        }
    }

    pub async fn save_extractor_api_key(&self, api_key: String) -> AppResult<BooleanResponse> {
        self.permitted(Route::Households, Capability::ManageSettings)?;
        if api_key.trim().is_empty() {
            return Err(AppError::Validation("api key cannot be empty".to_string()));
        }
        let _guard = self.keyring_lock.lock().await;
        Self::keyring_entry()?
            .set_password(api_key.trim())
            .map_err(|error| AppError::Io(error.to_string()))?;
        tracing::info!("extractor api key stored");
        Ok(BooleanResponse { success: true })
    }

    pub async fn clear_extractor_api_key(&self) -> AppResult<BooleanResponse> {
        self.permitted(Route::Households, Capability::ManageSettings)?;
        let _guard = self.keyring_lock.lock().await;
        match Self::keyring_entry()?.delete_credential() {
            Ok(_) | Err(keyring::Error::NoEntry) => Ok(BooleanResponse { success: true }),
            Err(error) => Err(AppError::Io(error.to_string())),
        }
    }

    pub async fn has_extractor_api_key(&self) -> AppResult<BooleanResponse> {
        self.signed_in(Route::Households)?;
        Ok(BooleanResponse {
            success: self.read_extractor_api_key().await?.is_some(),
        })
    }

    // Letters

    fn load_letters(&self) -> AppResult<Vec<Letter>> {
        self.db.load_slot(Slot::Letters, Vec::new)
    }

    /// Most recently issued first.
    pub fn list_letters(&self) -> AppResult<Vec<Letter>> {
        self.signed_in(Route::Letters)?;
        let mut all = self.load_letters()?;
        all.reverse();
        Ok(all)
    }

    pub fn create_letter(&self, payload: CreateLetterPayload) -> AppResult<Letter> {
        self.signed_in(Route::Letters)?;
        let settings = self.db.get_settings()?;
        let households = self.load_households()?;
        let mut all = self.load_letters()?;
        let letter = letters::create(
            &mut all,
            &households,
            payload,
            locale::today(),
            &settings.letterhead.letter_number_prefix,
        )?;
        self.db.save_slot(Slot::Letters, &all)?;
        tracing::info!(
            number = %letter.number,
            kind = letter.kind.as_str(),
            family_card = %mask_identity_numbers(&letter.applicant.family_card_number),
            "letter issued"
        );
        Ok(letter)
    }

    pub fn preview_letter(&self, id: String) -> AppResult<LetterPreview> {
        self.signed_in(Route::Letters)?;
        let all = self.load_letters()?;
        let letter = letters::find(&all, &id)?.clone();
        let document = letter_document::layout(&letter, &self.db.get_settings()?.letterhead);
        Ok(LetterPreview {
            file_name: document.file_name("pdf"),
            text: PlainTextRenderer.to_text(&document),
            letter,
        })
    }

    /// Renders the letter into `<data>/exports`.
    pub fn export_letter(&self, id: String) -> AppResult<ExportResponse> {
        self.signed_in(Route::Letters)?;
        let all = self.load_letters()?;
        let letter = letters::find(&all, &id)?;
        let document = letter_document::layout(letter, &self.db.get_settings()?.letterhead);
        let bytes = self.renderer.render(&document)?;

        let export_dir = self.data_dir.join("exports");
        std::fs::create_dir_all(&export_dir)?;
        let path = export_dir.join(safe_file_name(&document.file_name(self.renderer.extension())));
        std::fs::write(&path, bytes)?;
        tracing::info!(number = %letter.number, path = %path.display(), "letter exported");
        Ok(ExportResponse {
            path: path.to_string_lossy().to_string(),
        })
    }

    // Finance

    fn load_transactions(&self) -> AppResult<Vec<Transaction>> {
        self.db.load_slot(Slot::Transactions, Vec::new)
    }

    pub fn list_transactions(&self) -> AppResult<Vec<Transaction>> {
        self.signed_in(Route::Finance)?;
        self.load_transactions()
    }

    pub fn add_transaction(&self, payload: NewTransactionPayload) -> AppResult<Transaction> {
        self.signed_in(Route::Finance)?;
        let mut all = self.load_transactions()?;
        let transaction = finance::add(&mut all, payload)?;
        self.db.save_slot(Slot::Transactions, &all)?;
        tracing::info!(
            id = %transaction.id,
            kind = transaction.kind.as_str(),
            amount = transaction.amount,
            "transaction recorded"
        );
        Ok(transaction)
    }

    pub fn delete_transaction(&self, id: String) -> AppResult<BooleanResponse> {
        self.signed_in(Route::Finance)?;
        let mut all = self.load_transactions()?;
        let removed = finance::delete(&mut all, &id)?;
        self.db.save_slot(Slot::Transactions, &all)?;
        tracing::info!(id = %removed.id, "transaction deleted");
        Ok(BooleanResponse { success: true })
    }

    pub fn finance_summary(&self) -> AppResult<FinanceSummary> {
        self.signed_in(Route::Finance)?;
        Ok(finance::summary(&self.load_transactions()?))
    }

    pub fn monthly_finance(&self) -> AppResult<Vec<MonthlyFinance>> {
        self.signed_in(Route::Finance)?;
        Ok(finance::monthly_buckets(&self.load_transactions()?))
    }

    // Dues

    pub fn dues_years(&self) -> AppResult<Vec<i32>> {
        self.signed_in(Route::Dues)?;
        Ok(dues::selectable_years(Local::now().year()))
    }

    pub fn dues_grid(&self, year: i32) -> AppResult<DuesYearGrid> {
        self.signed_in(Route::Dues)?;
        Ok(dues::year_grid(&self.load_dues()?, year))
    }

    /// Returns the new paid flag.
    pub fn toggle_dues(&self, payload: ToggleDuesPayload) -> AppResult<bool> {
        self.signed_in(Route::Dues)?;
        let mut ledger = self.load_dues()?;
        let paid = dues::toggle(&mut ledger, &payload.family_card_number, payload.month, payload.year)?;
        self.db.save_slot(Slot::Dues, &ledger)?;
        tracing::info!(
            family_card = %mask_identity_numbers(&payload.family_card_number),
            month = payload.month,
            year = payload.year,
            paid,
            "dues toggled"
        );
        Ok(paid)
    }

    // Agenda

    fn load_agenda(&self) -> AppResult<Vec<AgendaItem>> {
        self.db.load_slot(Slot::Agenda, Vec::new)
    }

    pub fn list_agenda(&self) -> AppResult<Vec<AgendaItem>> {
        self.signed_in(Route::Agenda)?;
        Ok(agenda::sorted(&self.load_agenda()?))
    }

    pub fn upcoming_agenda(&self) -> AppResult<Vec<AgendaItem>> {
        self.signed_in(Route::Dashboard)?;
        let limit = self.db.get_settings()?.upcoming_agenda_limit;
        Ok(agenda::upcoming(&self.load_agenda()?, locale::today(), limit))
    }

    pub fn save_agenda(&self, payload: SaveAgendaPayload) -> AppResult<AgendaItem> {
        self.permitted(Route::Agenda, Capability::ManageAgenda)?;
        let mut all = self.load_agenda()?;
        let item = agenda::save(&mut all, payload)?;
        self.db.save_slot(Slot::Agenda, &all)?;
        tracing::info!(id = %item.id, "agenda saved");
        Ok(item)
    }

    pub fn delete_agenda(&self, id: String) -> AppResult<BooleanResponse> {
        self.permitted(Route::Agenda, Capability::ManageAgenda)?;
        let mut all = self.load_agenda()?;
        let removed = agenda::delete(&mut all, &id)?;
        self.db.save_slot(Slot::Agenda, &all)?;
        tracing::info!(id = %removed.id, "agenda deleted");
        Ok(BooleanResponse { success: true })
    }

    pub fn attach_agenda_documentation(&self, id: String, uploads: Vec<ImageUpload>) -> AppResult<AgendaItem> {
        self.permitted(Route::Agenda, Capability::ManageAgenda)?;
        let mut all = self.load_agenda()?;
        let item = agenda::attach_documentation(&mut all, &id, &uploads)?;
        self.db.save_slot(Slot::Agenda, &all)?;
        tracing::info!(id = %item.id, added = uploads.len(), "agenda documentation attached");
        Ok(item)
    }

    // Staff roster

    fn load_staff(&self) -> AppResult<Vec<StaffMember>> {
        self.db.load_slot(Slot::Staff, seed::staff)
    }

    pub fn list_staff(&self) -> AppResult<Vec<StaffMember>> {
        self.signed_in(Route::Organization)?;
        self.load_staff()
    }

    pub fn save_staff(&self, payload: SaveStaffPayload) -> AppResult<StaffMember> {
        self.permitted(Route::Organization, Capability::ManageStaff)?;
        let mut roster = self.load_staff()?;
        let member = staff::save(&mut roster, payload)?;
        self.db.save_slot(Slot::Staff, &roster)?;
        tracing::info!(id = %member.id, position = %member.position, "staff saved");
        Ok(member)
    }

    pub fn delete_staff(&self, id: String) -> AppResult<BooleanResponse> {
        self.permitted(Route::Organization, Capability::ManageStaff)?;
        let mut roster = self.load_staff()?;
        let removed = staff::delete(&mut roster, &id)?;
        self.db.save_slot(Slot::Staff, &roster)?;
        tracing::info!(id = %removed.id, "staff deleted");
        Ok(BooleanResponse { success: true })
    }

    // Inventory

    fn load_inventory(&self) -> AppResult<Vec<InventoryItem>> {
        self.db.load_slot(Slot::Inventory, Vec::new)
    }

    pub fn list_inventory(&self) -> AppResult<Vec<InventoryItem>> {
        self.signed_in(Route::Inventory)?;
        self.load_inventory()
    }

    pub fn save_inventory(&self, payload: SaveInventoryPayload) -> AppResult<InventoryItem> {
        self.signed_in(Route::Inventory)?;
        let mut all = self.load_inventory()?;
        let item = inventory::save(&mut all, payload)?;
        self.db.save_slot(Slot::Inventory, &all)?;
        tracing::info!(id = %item.id, quantity = item.quantity, "inventory saved");
        Ok(item)
    }

    pub fn delete_inventory(&self, id: String) -> AppResult<BooleanResponse> {
        self.signed_in(Route::Inventory)?;
        let mut all = self.load_inventory()?;
        let removed = inventory::delete(&mut all, &id)?;
        self.db.save_slot(Slot::Inventory, &all)?;
        tracing::info!(id = %removed.id, "inventory deleted");
        Ok(BooleanResponse { success: true })
    }

    // Announcements

    fn load_announcements(&self) -> AppResult<Vec<Announcement>> {
        self.db.load_slot(Slot::Announcements, Vec::new)
    }

    pub fn list_announcements(&self) -> AppResult<Vec<Announcement>> {
        self.signed_in(Route::Announcements)?;
        Ok(announcements::sorted(&self.load_announcements()?))
    }

    pub fn save_announcement(&self, payload: SaveAnnouncementPayload) -> AppResult<Announcement> {
        let user = self.permitted(Route::Announcements, Capability::ManageAnnouncements)?;
        let mut all = self.load_announcements()?;
        let saved = announcements::save(&mut all, payload, locale::today(), &user.full_name)?;
        self.db.save_slot(Slot::Announcements, &all)?;
        tracing::info!(id = %saved.id, "announcement saved");
        Ok(saved)
    }

    pub fn delete_announcement(&self, id: String) -> AppResult<BooleanResponse> {
        self.permitted(Route::Announcements, Capability::ManageAnnouncements)?;
        let mut all = self.load_announcements()?;
        let removed = announcements::delete(&mut all, &id)?;
        self.db.save_slot(Slot::Announcements, &all)?;
        tracing::info!(id = %removed.id, "announcement deleted");
        Ok(BooleanResponse { success: true })
    }

    // Suggestions

    fn load_suggestions(&self) -> AppResult<Vec<Suggestion>> {
        self.db.load_slot(Slot::Suggestions, Vec::new)
    }

    pub fn submit_suggestion(&self, payload: SubmitSuggestionPayload) -> AppResult<Suggestion> {
        let user = self.signed_in(Route::Suggestions)?;
        let mut all = self.load_suggestions()?;
        let suggestion = suggestions::submit(&mut all, payload, Some(&user.full_name), locale::today())?;
        self.db.save_slot(Slot::Suggestions, &all)?;
        let anonymous = suggestion.sender == suggestions::ANONYMOUS_SENDER;
        tracing::info!(id = %suggestion.id, anonymous, "suggestion submitted");
        Ok(suggestion)
    }

    pub fn list_suggestions(&self) -> AppResult<Vec<Suggestion>> {
        self.permitted(Route::Suggestions, Capability::ReadSuggestions)?;
        Ok(suggestions::sorted(&self.load_suggestions()?))
    }

    pub fn delete_suggestion(&self, id: String) -> AppResult<BooleanResponse> {
        self.permitted(Route::Suggestions, Capability::ReadSuggestions)?;
        let mut all = self.load_suggestions()?;
        let removed = suggestions::delete(&mut all, &id)?;
        self.db.save_slot(Slot::Suggestions, &all)?;
        tracing::info!(id = %removed.id, "suggestion deleted");
        Ok(BooleanResponse { success: true })
    }

    // Dashboard

    pub fn dashboard(&self) -> AppResult<DashboardSummary> {
        let user = self.signed_in(Route::Dashboard)?;
        let settings = self.db.get_settings()?;
        let households = self.load_households()?;
        let transactions = self.load_transactions()?;
        let agenda = self.load_agenda()?;
        let announcements = self.load_announcements()?;
        Ok(stats::dashboard(DashboardInputs {
            greeting_name: &user.full_name,
            households: &households,
            transactions: &transactions,
            agenda: &agenda,
            announcements: &announcements,
            today: locale::today(),
            upcoming_limit: settings.upcoming_agenda_limit,
            announcement_limit: settings.latest_announcement_limit,
        }))
    }

    // Settings and backups

    pub fn get_settings(&self) -> AppResult<AppSettings> {
        self.signed_in(Route::Dashboard)?;
        self.db.get_settings()
    }

    pub fn update_settings(&self, update: serde_json::Value) -> AppResult<AppSettings> {
        self.permitted(Route::Dashboard, Capability::ManageSettings)?;
        let settings = self.db.update_settings(update)?;
        tracing::info!("settings updated");
        Ok(settings)
    }

    /// Writes every stored slot except the session to `<data>/backups`.
    pub fn export_backup(&self) -> AppResult<ExportResponse> {
        self.permitted(Route::Dashboard, Capability::ManageSettings)?;
        let mut snapshot = self.db.export_snapshot()?;
        snapshot.remove(Slot::CurrentUser.as_str());

        let backup_dir = self.data_dir.join("backups");
        std::fs::create_dir_all(&backup_dir)?;
        let path = backup_dir.join(format!("rt-digital-{}.json", Local::now().format("%Y%m%d-%H%M%S")));
        std::fs::write(&path, serde_json::to_vec_pretty(&snapshot)?)?;
        tracing::info!(path = %path.display(), slots = snapshot.len(), "backup exported");
        Ok(ExportResponse {
            path: path.to_string_lossy().to_string(),
        })
    }

    /// Restores the slots found in a backup file. The current session is kept.
    pub fn import_backup(&self, path: String) -> AppResult<BooleanResponse> {
        self.permitted(Route::Dashboard, Capability::ManageSettings)?;
        let raw = std::fs::read_to_string(&path)?;
        let mut snapshot: BTreeMap<String, serde_json::Value> = serde_json::from_str(&raw)
            .map_err(|error| AppError::Validation(format!("backup is not a slot map: {}", error)))?;
        snapshot.remove(Slot::CurrentUser.as_str());
        let restored = self.db.import_snapshot(&snapshot)?;
        tracing::info!(path = %path, slots = restored, "backup imported");
        Ok(BooleanResponse { success: true })
    }
}

fn find_household(all: &[Household], id: &str) -> AppResult<Household> {
    all.iter()
        .find(|household| household.id == id)
        .cloned()
        .ok_or_else(|| AppError::Internal(format!("household {} missing after write", id)))
}

fn safe_file_name(name: &str) -> String {
    name.chars()
        .map(|ch| if matches!(ch, '/' | '\\' | ':') || ch.is_control() { '_' } else { ch })
        .collect()
}
