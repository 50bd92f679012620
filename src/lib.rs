pub mod collections;
pub mod console;
pub mod db;
pub mod errors;
pub mod extractors;
pub mod letter_document;
pub mod locale;
pub mod models;
pub mod policy;
pub mod redaction;
pub mod seed;
pub mod session;
pub mod stats;

pub use crate::console::ConsoleCore;
pub use crate::errors::{AppError, AppResult};

use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;

pub const DATA_DIR_ENV: &str = "RT_DIGITAL_DATA_DIR";

static LOG_GUARD: std::sync::OnceLock<WorkerGuard> = std::sync::OnceLock::new();

/// `RT_DIGITAL_DATA_DIR` when set, otherwise the platform default.
pub fn resolve_data_dir(platform_default: PathBuf) -> PathBuf {
    match std::env::var(DATA_DIR_ENV) {
        Ok(value) if !value.trim().is_empty() => PathBuf::from(value.trim()),
        _ => platform_default,
    }
}

pub fn init_tracing(data_dir: &Path) -> Result<(), String> {
    let log_dir = data_dir.join("logs");
    std::fs::create_dir_all(&log_dir).map_err(|error| error.to_string())?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "console.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .json()
        .with_writer(non_blocking)
        .try_init()
        .map_err(|error| error.to_string())
}

#[cfg(feature = "desktop")]
mod desktop {
    use crate::console::ConsoleCore;
    use crate::models::{
        AgendaItem, Announcement, AppSettings, BooleanResponse, CreateLetterPayload, DashboardSummary,
        DuesYearGrid, ExportResponse, FinanceSummary, Household, ImageUpload, InventoryItem, Letter,
        LetterPreview, LoginPayload, MonthlyFinance, NewTransactionPayload, SaveAgendaPayload,
        SaveAnnouncementPayload, SaveInventoryPayload, SaveStaffPayload, SessionUser, StaffMember,
        SubmitSuggestionPayload, Suggestion, ToggleDuesPayload, Transaction,
    };
    use crate::policy::{NavItem, RouteDecision};
    use crate::{init_tracing, resolve_data_dir};
    use std::sync::Arc;
    use tauri::Manager;

    #[derive(Clone)]
    struct AppState {
        console: Arc<ConsoleCore>,
    }

    fn to_client_error(error: impl std::fmt::Display) -> String {
        error.to_string()
    }

    #[tauri::command]
    fn login(state: tauri::State<'_, AppState>, payload: LoginPayload) -> Result<SessionUser, String> {
        state.console.login(payload).map_err(to_client_error)
    }

    #[tauri::command]
    fn logout(state: tauri::State<'_, AppState>) -> Result<BooleanResponse, String> {
        state.console.logout().map_err(to_client_error)
    }

    #[tauri::command]
    fn current_user(state: tauri::State<'_, AppState>) -> Result<Option<SessionUser>, String> {
        state.console.current_user().map_err(to_client_error)
    }

    #[tauri::command]
    fn profile(state: tauri::State<'_, AppState>) -> Result<SessionUser, String> {
        state.console.profile().map_err(to_client_error)
    }

    #[tauri::command]
    fn guard_route(state: tauri::State<'_, AppState>, path: String) -> Result<RouteDecision, String> {
        state.console.guard(&path).map_err(to_client_error)
    }

    #[tauri::command]
    fn nav_items(state: tauri::State<'_, AppState>) -> Result<Vec<NavItem>, String> {
        state.console.nav_items().map_err(to_client_error)
    }

    #[tauri::command]
    fn dashboard(state: tauri::State<'_, AppState>) -> Result<DashboardSummary, String> {
        state.console.dashboard().map_err(to_client_error)
    }

    #[tauri::command]
    fn list_households(state: tauri::State<'_, AppState>, search: Option<String>) -> Result<Vec<Household>, String> {
        state.console.list_households(search).map_err(to_client_error)
    }

    #[tauri::command]
    fn new_household_draft(state: tauri::State<'_, AppState>) -> Result<Household, String> {
        state.console.new_household_draft().map_err(to_client_error)
    }

    #[tauri::command]
    fn add_draft_member(state: tauri::State<'_, AppState>, draft: Household) -> Result<Household, String> {
        state.console.add_draft_member(draft).map_err(to_client_error)
    }

    #[tauri::command]
    fn remove_draft_member(
        state: tauri::State<'_, AppState>,
        draft: Household,
        index: usize,
    ) -> Result<Household, String> {
        state.console.remove_draft_member(draft, index).map_err(to_client_error)
    }

    #[tauri::command]
    fn rename_draft_member(
        state: tauri::State<'_, AppState>,
        draft: Household,
        index: usize,
        name: String,
    ) -> Result<Household, String> {
        state
            .console
            .rename_draft_member(draft, index, name)
            .map_err(to_client_error)
    }

    #[tauri::command]
    fn create_household(state: tauri::State<'_, AppState>, household: Household) -> Result<Household, String> {
        state.console.create_household(household).map_err(to_client_error)
    }

    #[tauri::command]
    fn update_household(state: tauri::State<'_, AppState>, household: Household) -> Result<Household, String> {
        state.console.update_household(household).map_err(to_client_error)
    }

    #[tauri::command]
    fn delete_household(state: tauri::State<'_, AppState>, id: String) -> Result<BooleanResponse, String> {
        state.console.delete_household(id).map_err(to_client_error)
    }

    #[tauri::command]
    async fn scan_family_card(state: tauri::State<'_, AppState>, upload: ImageUpload) -> Result<Household, String> {
        state.console.scan_family_card(upload).await.map_err(to_client_error)
    }

    #[tauri::command]
    async fn save_extractor_api_key(
        state: tauri::State<'_, AppState>,
        api_key: String,
    ) -> Result<BooleanResponse, String> {
        state.console.save_extractor_api_key(api_key).await.map_err(to_client_error)
    }

    #[tauri::command]
    async fn clear_extractor_api_key(state: tauri::State<'_, AppState>) -> Result<BooleanResponse, String> {
        state.console.clear_extractor_api_key().await.map_err(to_client_error)
    }

    #[tauri::command]
    async fn has_extractor_api_key(state: tauri::State<'_, AppState>) -> Result<BooleanResponse, String> {
        state.console.has_extractor_api_key().await.map_err(to_client_error)
    }

    #[tauri::command]
    fn list_letters(state: tauri::State<'_, AppState>) -> Result<Vec<Letter>, String> {
        state.console.list_letters().map_err(to_client_error)
    }

    #[tauri::command]
    fn create_letter(state: tauri::State<'_, AppState>, payload: CreateLetterPayload) -> Result<Letter, String> {
        state.console.create_letter(payload).map_err(to_client_error)
    }

    #[tauri::command]
    fn preview_letter(state: tauri::State<'_, AppState>, id: String) -> Result<LetterPreview, String> {
        state.console.preview_letter(id).map_err(to_client_error)
    }

    #[tauri::command]
    fn export_letter(state: tauri::State<'_, AppState>, id: String) -> Result<ExportResponse, String> {
        state.console.export_letter(id).map_err(to_client_error)
    }

    #[tauri::command]
    fn list_transactions(state: tauri::State<'_, AppState>) -> Result<Vec<Transaction>, String> {
        state.console.list_transactions().map_err(to_client_error)
    }

    #[tauri::command]
    fn add_transaction(
        state: tauri::State<'_, AppState>,
        payload: NewTransactionPayload,
    ) -> Result<Transaction, String> {
        state.console.add_transaction(payload).map_err(to_client_error)
    }

    #[tauri::command]
    fn delete_transaction(state: tauri::State<'_, AppState>, id: String) -> Result<BooleanResponse, String> {
        state.console.delete_transaction(id).map_err(to_client_error)
    }

    #[tauri::command]
    fn finance_summary(state: tauri::State<'_, AppState>) -> Result<FinanceSummary, String> {
        state.console.finance_summary().map_err(to_client_error)
    }

    #[tauri::command]
    fn monthly_finance(state: tauri::State<'_, AppState>) -> Result<Vec<MonthlyFinance>, String> {
        state.console.monthly_finance().map_err(to_client_error)
    }

    #[tauri::command]
    fn dues_years(state: tauri::State<'_, AppState>) -> Result<Vec<i32>, String> {
        state.console.dues_years().map_err(to_client_error)
    }

    #[tauri::command]
    fn dues_grid(state: tauri::State<'_, AppState>, year: i32) -> Result<DuesYearGrid, String> {
        state.console.dues_grid(year).map_err(to_client_error)
    }

    #[tauri::command]
    fn toggle_dues(state: tauri::State<'_, AppState>, payload: ToggleDuesPayload) -> Result<bool, String> {
        state.console.toggle_dues(payload).map_err(to_client_error)
    }

    #[tauri::command]
    fn list_agenda(state: tauri::State<'_, AppState>) -> Result<Vec<AgendaItem>, String> {
        state.console.list_agenda().map_err(to_client_error)
    }

    #[tauri::command]
    fn upcoming_agenda(state: tauri::State<'_, AppState>) -> Result<Vec<AgendaItem>, String> {
        state.console.upcoming_agenda().map_err(to_client_error)
    }

    #[tauri::command]
    fn save_agenda(state: tauri::State<'_, AppState>, payload: SaveAgendaPayload) -> Result<AgendaItem, String> {
        state.console.save_agenda(payload).map_err(to_client_error)
    }

    #[tauri::command]
    fn delete_agenda(state: tauri::State<'_, AppState>, id: String) -> Result<BooleanResponse, String> {
        state.console.delete_agenda(id).map_err(to_client_error)
    }

    #[tauri::command]
    fn attach_agenda_documentation(
        state: tauri::State<'_, AppState>,
        id: String,
        uploads: Vec<ImageUpload>,
    ) -> Result<AgendaItem, String> {
        state
            .console
            .attach_agenda_documentation(id, uploads)
            .map_err(to_client_error)
    }

    #[tauri::command]
    fn list_staff(state: tauri::State<'_, AppState>) -> Result<Vec<StaffMember>, String> {
        state.console.list_staff().map_err(to_client_error)
    }

    #[tauri::command]
    fn save_staff(state: tauri::State<'_, AppState>, payload: SaveStaffPayload) -> Result<StaffMember, String> {
        state.console.save_staff(payload).map_err(to_client_error)
    }

    #[tauri::command]
    fn delete_staff(state: tauri::State<'_, AppState>, id: String) -> Result<BooleanResponse, String> {
        state.console.delete_staff(id).map_err(to_client_error)
    }

    #[tauri::command]
    fn list_inventory(state: tauri::State<'_, AppState>) -> Result<Vec<InventoryItem>, String> {
        state.console.list_inventory().map_err(to_client_error)
    }

    #[tauri::command]
    fn save_inventory(
        state: tauri::State<'_, AppState>,
        payload: SaveInventoryPayload,
    ) -> Result<InventoryItem, String> {
        state.console.save_inventory(payload).map_err(to_client_error)
    }

    #[tauri::command]
    fn delete_inventory(state: tauri::State<'_, AppState>, id: String) -> Result<BooleanResponse, String> {
        state.console.delete_inventory(id).map_err(to_client_error)
    }

    #[tauri::command]
    fn list_announcements(state: tauri::State<'_, AppState>) -> Result<Vec<Announcement>, String> {
        state.console.list_announcements().map_err(to_client_error)
    }

    #[tauri::command]
    fn save_announcement(
        state: tauri::State<'_, AppState>,
        payload: SaveAnnouncementPayload,
    ) -> Result<Announcement, String> {
        state.console.save_announcement(payload).map_err(to_client_error)
    }

    #[tauri::command]
    fn delete_announcement(state: tauri::State<'_, AppState>, id: String) -> Result<BooleanResponse, String> {
        state.console.delete_announcement(id).map_err(to_client_error)
    }

    #[tauri::command]
    fn submit_suggestion(
        state: tauri::State<'_, AppState>,
        payload: SubmitSuggestionPayload,
    ) -> Result<Suggestion, String> {
        state.console.submit_suggestion(payload).map_err(to_client_error)
    }

    #[tauri::command]
    fn list_suggestions(state: tauri::State<'_, AppState>) -> Result<Vec<Suggestion>, String> {
        state.console.list_suggestions().map_err(to_client_error)
    }

    #[tauri::command]
    fn delete_suggestion(state: tauri::State<'_, AppState>, id: String) -> Result<BooleanResponse, String> {
        state.console.delete_suggestion(id).map_err(to_client_error)
    }

    #[tauri::command]
    fn get_settings(state: tauri::State<'_, AppState>) -> Result<AppSettings, String> {
        state.console.get_settings().map_err(to_client_error)
    }

    #[tauri::command]
    fn update_settings(state: tauri::State<'_, AppState>, update: serde_json::Value) -> Result<AppSettings, String> {
        state.console.update_settings(update).map_err(to_client_error)
    }

    #[tauri::command]
    fn export_backup(state: tauri::State<'_, AppState>) -> Result<ExportResponse, String> {
        state.console.export_backup().map_err(to_client_error)
    }

    #[tauri::command]
    fn import_backup(state: tauri::State<'_, AppState>, path: String) -> Result<BooleanResponse, String> {
        state.console.import_backup(path).map_err(to_client_error)
    }

    pub fn run() {
        tauri::Builder::default()
            .setup(|app| {
                let platform_dir = app.path().app_data_dir().map_err(|error| error.to_string())?;
                let data_dir = resolve_data_dir(platform_dir);
                std::fs::create_dir_all(&data_dir).map_err(|error| error.to_string())?;
                init_tracing(&data_dir).map_err(|error| error.to_string())?;

                let console = ConsoleCore::new(data_dir).map_err(|error| error.to_string())?;
                app.manage(AppState { console });
                Ok(())
            })
            .invoke_handler(tauri::generate_handler![
                login,
                logout,
                current_user,
                profile,
                guard_route,
                nav_items,
                dashboard,
                list_households,
                new_household_draft,
                add_draft_member,
                remove_draft_member,
                rename_draft_member,
                create_household,
                update_household,
                delete_household,
                scan_family_card,
                save_extractor_api_key,
                clear_extractor_api_key,
                has_extractor_api_key,
                list_letters,
                create_letter,
                preview_letter,
                export_letter,
                list_transactions,
                add_transaction,
                delete_transaction,
                finance_summary,
                monthly_finance,
                dues_years,
                dues_grid,
                toggle_dues,
                list_agenda,
                upcoming_agenda,
                save_agenda,
                delete_agenda,
                attach_agenda_documentation,
                list_staff,
                save_staff,
                delete_staff,
                list_inventory,
                save_inventory,
                delete_inventory,
                list_announcements,
                save_announcement,
                delete_announcement,
                submit_suggestion,
                list_suggestions,
                delete_suggestion,
                get_settings,
                update_settings,
                export_backup,
                import_backup,
            ])
            .run(tauri::generate_context!())
            .expect("error while running tauri application");
    }
}

#[cfg(feature = "desktop")]
pub use desktop::run;
