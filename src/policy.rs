use crate::errors::{AppError, AppResult};
use crate::models::{SessionUser, UserRole};
use serde::{Deserialize, Serialize};

const EVERYONE: &[UserRole] = &UserRole::ALL;
const CHAIR: &[UserRole] = &[UserRole::Chair];
const CHAIR_SECRETARY: &[UserRole] = &[UserRole::Chair, UserRole::Secretary];
const CHAIR_TREASURER: &[UserRole] = &[UserRole::Chair, UserRole::Treasurer];
const AGENDA_READERS: &[UserRole] = &[UserRole::Chair, UserRole::Secretary, UserRole::Resident];
const BOARD: &[UserRole] = &[UserRole::Chair, UserRole::Secretary, UserRole::Treasurer];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Route {
    Dashboard,
    Households,
    Letters,
    Finance,
    Dues,
    Agenda,
    Organization,
    Inventory,
    Announcements,
    Suggestions,
    Profile,
    Login,
}

impl Route {
    /// Sidebar order.
    pub const MENU: [Route; 10] = [
        Self::Dashboard,
        Self::Households,
        Self::Letters,
        Self::Finance,
        Self::Dues,
        Self::Agenda,
        Self::Organization,
        Self::Inventory,
        Self::Announcements,
        Self::Suggestions,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Self::Dashboard => "/",
            Self::Households => "/data-warga",
            Self::Letters => "/surat-pengantar",
            Self::Finance => "/keuangan",
            Self::Dues => "/iuran",
            Self::Agenda => "/agenda",
            Self::Organization => "/struktur-organisasi",
            Self::Inventory => "/inventaris",
            Self::Announcements => "/pengumuman",
            Self::Suggestions => "/kotak-saran",
            Self::Profile => "/profile",
            Self::Login => "/login",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Households => "Data Warga",
            Self::Letters => "Surat Pengantar",
            Self::Finance => "Laporan Keuangan",
            Self::Dues => "Iuran Warga",
            Self::Agenda => "Agenda Kegiatan",
            Self::Organization => "Struktur Organisasi",
            Self::Inventory => "Inventaris RT",
            Self::Announcements => "Pengumuman",
            Self::Suggestions => "Kotak Saran",
            Self::Profile => "Profil",
            Self::Login => "Login",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        let trimmed = path.trim();
        let normalized = match trimmed.trim_end_matches('/') {
            "" => "/",
            other => other,
        };
        Self::MENU
            .into_iter()
            .chain([Self::Profile, Self::Login])
            .find(|route| route.path() == normalized)
    }

    pub fn allowed_roles(self) -> &'static [UserRole] {
        match self {
            Self::Households | Self::Letters | Self::Organization => CHAIR_SECRETARY,
            Self::Finance | Self::Dues => CHAIR_TREASURER,
            Self::Agenda => AGENDA_READERS,
            Self::Inventory => BOARD,
            Self::Dashboard | Self::Announcements | Self::Suggestions | Self::Profile | Self::Login => EVERYONE,
        }
    }
}

/// Actions inside a page that not every visitor of the page may take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Capability {
    ManageAgenda,
    ManageAnnouncements,
    ManageStaff,
    ReadSuggestions,
    ManageSettings,
}

impl Capability {
    pub fn allowed_roles(self) -> &'static [UserRole] {
        match self {
            Self::ManageAgenda | Self::ManageAnnouncements | Self::ManageStaff => CHAIR_SECRETARY,
            Self::ReadSuggestions => BOARD,
            Self::ManageSettings => CHAIR,
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Self::ManageAgenda => "manage agenda",
            Self::ManageAnnouncements => "manage announcements",
            Self::ManageStaff => "manage staff",
            Self::ReadSuggestions => "read suggestions",
            Self::ManageSettings => "manage settings",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", content = "route", rename_all = "camelCase")]
pub enum RouteDecision {
    Render(Route),
    RedirectToLogin,
    RedirectToHome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavItem {
    pub path: String,
    pub label: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PolicyEngine;

impl PolicyEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn guard(&self, path: &str, user: Option<&SessionUser>) -> RouteDecision {
        let route = Route::from_path(path);
        if route == Some(Route::Login) {
            return RouteDecision::Render(Route::Login);
        }
        let Some(user) = user else {
            return RouteDecision::RedirectToLogin;
        };
        match route {
            Some(route) if route.allowed_roles().contains(&user.role) => RouteDecision::Render(route),
            _ => RouteDecision::RedirectToHome,
        }
    }

    pub fn nav_items(&self, role: UserRole) -> Vec<NavItem> {
        Route::MENU
            .into_iter()
            .filter(|route| route.allowed_roles().contains(&role))
            .map(|route| NavItem {
                path: route.path().to_string(),
                label: route.label().to_string(),
            })
            .collect()
    }

    pub fn can(&self, role: UserRole, capability: Capability) -> bool {
        capability.allowed_roles().contains(&role)
    }

    /// The signed-in user, provided their role may open `route`.
    pub fn require_route<'u>(&self, user: Option<&'u SessionUser>, route: Route) -> AppResult<&'u SessionUser> {
        let user = user.ok_or_else(|| AppError::Auth("not signed in".to_string()))?;
        if !route.allowed_roles().contains(&user.role) {
            return Err(AppError::Forbidden(format!(
                "{} cannot open {}",
                user.role.as_str(),
                route.label()
            )));
        }
        Ok(user)
    }

    pub fn require_capability(&self, user: &SessionUser, capability: Capability) -> AppResult<()> {
        if self.can(user.role, capability) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "{} cannot {}",
                user.role.as_str(),
                capability.describe()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Capability, PolicyEngine, Route, RouteDecision};
    use crate::errors::AppError;
    use crate::models::{SessionUser, UserRole};

    fn user(role: UserRole) -> SessionUser {
        SessionUser {
            id: "u".to_string(),
            username: "u".to_string(),
            role,
            full_name: "U".to_string(),
            family_card_number: None,
        }
    }

    #[test]
    fn unauthenticated_visitors_go_to_login() {
        let policy = PolicyEngine::new();
        assert_eq!(policy.guard("/keuangan", None), RouteDecision::RedirectToLogin);
        assert_eq!(policy.guard("/", None), RouteDecision::RedirectToLogin);
        assert_eq!(policy.guard("/login", None), RouteDecision::Render(Route::Login));
    }

    #[test]
    fn role_table_is_enforced() {
        let policy = PolicyEngine::new();
        let treasurer = user(UserRole::Treasurer);
        assert_eq!(policy.guard("/keuangan", Some(&treasurer)), RouteDecision::Render(Route::Finance));
        assert_eq!(policy.guard("/data-warga", Some(&treasurer)), RouteDecision::RedirectToHome);

        let resident = user(UserRole::Resident);
        assert_eq!(policy.guard("/agenda", Some(&resident)), RouteDecision::Render(Route::Agenda));
        assert_eq!(policy.guard("/inventaris", Some(&resident)), RouteDecision::RedirectToHome);
        assert_eq!(policy.guard("/profile/", Some(&resident)), RouteDecision::Render(Route::Profile));
        assert_eq!(policy.guard("/nowhere", Some(&resident)), RouteDecision::RedirectToHome);
    }

    #[test]
    fn menu_keeps_order_and_filters_by_role() {
        let policy = PolicyEngine::new();
        let labels: Vec<_> = policy
            .nav_items(UserRole::Resident)
            .into_iter()
            .map(|item| item.label)
            .collect();
        assert_eq!(labels, vec!["Dashboard", "Agenda Kegiatan", "Pengumuman", "Kotak Saran"]);
        assert_eq!(policy.nav_items(UserRole::Chair).len(), 10);
        let paths: Vec<_> = policy
            .nav_items(UserRole::Treasurer)
            .into_iter()
            .map(|item| item.path)
            .collect();
        assert_eq!(paths, vec!["/", "/keuangan", "/iuran", "/inventaris", "/pengumuman", "/kotak-saran"]);
    }

    #[test]
    fn capabilities_and_requirements() {
        let policy = PolicyEngine::new();
        assert!(policy.can(UserRole::Secretary, Capability::ManageAgenda));
        assert!(!policy.can(UserRole::Treasurer, Capability::ManageAnnouncements));
        assert!(policy.can(UserRole::Treasurer, Capability::ReadSuggestions));
        assert!(!policy.can(UserRole::Resident, Capability::ReadSuggestions));
        assert!(policy.can(UserRole::Chair, Capability::ManageSettings));
        assert!(!policy.can(UserRole::Secretary, Capability::ManageSettings));

        let resident = user(UserRole::Resident);
        assert!(matches!(
            policy.require_capability(&resident, Capability::ManageStaff),
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(policy.require_route(None, Route::Dashboard), Err(AppError::Auth(_))));
        assert!(matches!(
            policy.require_route(Some(&resident), Route::Finance),
            Err(AppError::Forbidden(_))
        ));
        assert!(policy.require_route(Some(&resident), Route::Suggestions).is_ok());
    }
}
