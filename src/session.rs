use crate::db::{Database, Slot};
use crate::errors::{AppError, AppResult};
use crate::models::{SessionUser, User};
use crate::seed;

pub const LOGIN_FAILED: &str = "Username atau password salah.";

/// Keeps the signed-in user in the `currentUser` slot so a restart resumes the session.
#[derive(Clone, Copy)]
pub struct SessionManager<'a> {
    db: &'a Database,
}

impl<'a> SessionManager<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub fn users(&self) -> AppResult<Vec<User>> {
        self.db.load_slot(Slot::Users, seed::users)
    }

    /// Exact, case-sensitive match on both fields. Usernames are not
    /// unique; the first match in stored order wins.
    pub fn login(&self, username: &str, password: &str) -> AppResult<SessionUser> {
        let users = self.users()?;
        let Some(user) = users
            .iter()
            .find(|user| user.username == username && user.password.as_deref() == Some(password))
        else {
            tracing::info!(username, "login rejected");
            return Err(AppError::Auth(LOGIN_FAILED.to_string()));
        };

        let session = SessionUser::from(user);
        self.db.save_slot(Slot::CurrentUser, &session)?;
        tracing::info!(user_id = %session.id, role = session.role.as_str(), "login");
        Ok(session)
    }

    pub fn logout(&self) -> AppResult<()> {
        if self.db.clear_slot(Slot::CurrentUser)? {
            tracing::info!("logout");
        }
        Ok(())
    }

    pub fn current_user(&self) -> AppResult<Option<SessionUser>> {
        self.db.load_slot(Slot::CurrentUser, || None)
    }

    pub fn is_authenticated(&self) -> AppResult<bool> {
        self.db.has_slot(Slot::CurrentUser)
    }

    /// What the profile page shows: the session user as stored.
    pub fn profile(&self) -> AppResult<SessionUser> {
        self.current_user()?
            .ok_or_else(|| AppError::Auth("not signed in".to_string()))
    }
}
