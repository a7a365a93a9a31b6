//! Session context: who is signed in, and the checkout in progress.
//!
//! A [`Session`] is built once at startup from a [`SessionStore`] and handed
//! to the API client, which reads the bearer token from it on every request.
//! Login writes token, user and role; logout clears them along with any
//! pending checkout.

mod store;

pub use store::{FileStore, MemoryStore, SessionStore};

use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{ClientError, Result};
use crate::models::{AuthResponse, User, ADMIN_ROLE};

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";
pub const ROLE_KEY: &str = "role";
pub const CHECKOUT_AMOUNT_KEY: &str = "checkout_amount";
pub const CHECKOUT_BOOKING_KEY: &str = "checkout_bookingId";
pub const CHECKOUT_USER_KEY: &str = "checkout_userId";

const AUTH_KEYS: [&str; 3] = [TOKEN_KEY, USER_KEY, ROLE_KEY];
const CHECKOUT_KEYS: [&str; 3] = [CHECKOUT_AMOUNT_KEY, CHECKOUT_BOOKING_KEY, CHECKOUT_USER_KEY];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthState {
    Anonymous,
    AuthenticatedUser,
    AuthenticatedAdmin,
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        !matches!(self, AuthState::Anonymous)
    }
}

impl fmt::Display for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AuthState::Anonymous => "anonymous",
            AuthState::AuthenticatedUser => "user",
            AuthState::AuthenticatedAdmin => "admin",
        };
        f.write_str(label)
    }
}

/// Payment started for a booking, awaiting confirmation
#[derive(Debug, Clone, PartialEq)]
pub struct Checkout {
    pub amount: f64,
    pub booking_id: String,
    pub user_id: String,
}

#[derive(Clone)]
pub struct Session {
    store: Arc<dyn SessionStore>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state())
            .finish()
    }
}

impl Session {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Load the session persisted at `path` (empty if the file is absent)
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::new(Arc::new(FileStore::open(path)?)))
    }

    pub fn token(&self) -> Option<String> {
        self.store.get(TOKEN_KEY).filter(|t| !t.is_empty())
    }

    pub fn role(&self) -> Option<String> {
        self.store.get(ROLE_KEY)
    }

    /// Stored user record; an undecodable value reads as no user
    pub fn user(&self) -> Option<User> {
        let raw = self.store.get(USER_KEY)?;
        match serde_json::from_str::<User>(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "Ignoring undecodable stored user");
                None
            }
        }
    }

    /// Admin routing depends on the stored role string alone
    pub fn state(&self) -> AuthState {
        if self.token().is_none() {
            return AuthState::Anonymous;
        }
        if self.is_admin() {
            AuthState::AuthenticatedAdmin
        } else {
            AuthState::AuthenticatedUser
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role().as_deref() == Some(ADMIN_ROLE)
    }

    /// Record a successful login
    pub fn sign_in(&self, auth: &AuthResponse) -> Result<AuthState> {
        self.store.set(TOKEN_KEY, &auth.token)?;
        self.store.set(USER_KEY, &serde_json::to_string(&auth.user)?)?;
        match auth.user.role() {
            Some(role) => self.store.set(ROLE_KEY, &role)?,
            None => self.store.remove(ROLE_KEY)?,
        }

        let state = self.state();
        info!(state = %state, "Signed in");
        Ok(state)
    }

    pub fn sign_out(&self) -> Result<()> {
        for key in AUTH_KEYS.iter().chain(CHECKOUT_KEYS.iter()) {
            self.store.remove(key)?;
        }
        info!("Signed out");
        Ok(())
    }

    /// Id of the signed-in user, or the message the booking screens show
    pub fn current_user_id(&self) -> Result<String> {
        let user = self
            .user()
            .ok_or_else(|| ClientError::session("Please login to continue."))?;
        user.id().ok_or_else(|| {
            ClientError::session("Unable to read your account details. Please relogin.")
        })
    }

    pub fn require_login(&self) -> Result<()> {
        if self.state().is_authenticated() {
            Ok(())
        } else {
            Err(ClientError::session("Please login to continue."))
        }
    }

    pub fn require_admin(&self) -> Result<()> {
        match self.state() {
            AuthState::AuthenticatedAdmin => Ok(()),
            AuthState::AuthenticatedUser => Err(ClientError::session(
                "This action is only available to administrators.",
            )),
            AuthState::Anonymous => Err(ClientError::session("Please login to continue.")),
        }
    }

    pub fn begin_checkout(&self, checkout: &Checkout) -> Result<()> {
        self.store
            .set(CHECKOUT_AMOUNT_KEY, &checkout.amount.to_string())?;
        self.store.set(CHECKOUT_BOOKING_KEY, &checkout.booking_id)?;
        self.store.set(CHECKOUT_USER_KEY, &checkout.user_id)?;
        Ok(())
    }

    /// Checkout in progress; incomplete or malformed entries read as none
    pub fn checkout(&self) -> Option<Checkout> {
        let amount = self.store.get(CHECKOUT_AMOUNT_KEY)?.parse::<f64>().ok()?;
        Some(Checkout {
            amount,
            booking_id: self.store.get(CHECKOUT_BOOKING_KEY)?,
            user_id: self.store.get(CHECKOUT_USER_KEY)?,
        })
    }

    pub fn clear_checkout(&self) -> Result<()> {
        for key in CHECKOUT_KEYS {
            self.store.remove(key)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn auth(value: serde_json::Value) -> AuthResponse {
        AuthResponse::from_value(&value).unwrap()
    }

    #[test]
    fn test_starts_anonymous() {
        let session = Session::in_memory();
        assert_eq!(session.state(), AuthState::Anonymous);
        assert!(session.token().is_none());
        assert!(session.require_login().is_err());
    }

    #[test]
    fn test_admin_login() {
        let session = Session::in_memory();
        let state = session
            .sign_in(&auth(json!({ "token": "t1", "user": { "_id": "a1", "role": "admin" } })))
            .unwrap();

        assert_eq!(state, AuthState::AuthenticatedAdmin);
        assert_eq!(session.role().as_deref(), Some("admin"));
        assert_eq!(session.token().as_deref(), Some("t1"));
        assert!(session.require_admin().is_ok());
    }

    #[test]
    fn test_any_other_role_is_user() {
        let session = Session::in_memory();
        let state = session
            .sign_in(&auth(json!({ "token": "t1", "user": { "_id": "u1", "role": "Admin" } })))
            .unwrap();
        assert_eq!(state, AuthState::AuthenticatedUser);

        match session.require_admin() {
            Err(ClientError::Session(msg)) => assert!(msg.contains("administrators")),
            other => panic!("Expected session error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_role_clears_previous_one() {
        let session = Session::in_memory();
        session
            .sign_in(&auth(json!({ "token": "t1", "user": { "_id": "a1", "role": "admin" } })))
            .unwrap();
        session
            .sign_in(&auth(json!({ "token": "t2", "user": { "_id": "u1" } })))
            .unwrap();
        assert_eq!(session.role(), None);
        assert_eq!(session.state(), AuthState::AuthenticatedUser);
    }

    #[test]
    fn test_logout_clears_everything() {
        let session = Session::in_memory();
        session
            .sign_in(&auth(json!({ "token": "t1", "user": { "_id": "u1", "role": "user" } })))
            .unwrap();
        session
            .begin_checkout(&Checkout {
                amount: 2000.0,
                booking_id: "b1".into(),
                user_id: "u1".into(),
            })
            .unwrap();

        session.sign_out().unwrap();

        assert_eq!(session.state(), AuthState::Anonymous);
        assert!(session.user().is_none());
        assert!(session.role().is_none());
        assert!(session.checkout().is_none());
    }

    #[test]
    fn test_current_user_id_messages() {
        let session = Session::in_memory();
        assert_eq!(
            session.current_user_id().unwrap_err().to_string(),
            "Please login to continue."
        );

        session
            .sign_in(&auth(json!({ "token": "t1", "user": { "email": "x@y.z" } })))
            .unwrap();
        assert_eq!(
            session.current_user_id().unwrap_err().to_string(),
            "Unable to read your account details. Please relogin."
        );

        session
            .sign_in(&auth(json!({ "token": "t1", "user": { "id": "u7" } })))
            .unwrap();
        assert_eq!(session.current_user_id().unwrap(), "u7");
    }

    #[test]
    fn test_checkout_round_trip() {
        let session = Session::in_memory();
        let checkout = Checkout {
            amount: 4500.5,
            booking_id: "b9".into(),
            user_id: "u1".into(),
        };
        session.begin_checkout(&checkout).unwrap();
        assert_eq!(session.checkout(), Some(checkout));

        session.clear_checkout().unwrap();
        assert!(session.checkout().is_none());
    }

    #[test]
    fn test_file_backed_session_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let session = Session::open(&path).unwrap();
        session
            .sign_in(&auth(json!({ "token": "t1", "user": { "_id": "a1", "role": "admin" } })))
            .unwrap();

        let reloaded = Session::open(&path).unwrap();
        assert_eq!(reloaded.state(), AuthState::AuthenticatedAdmin);
        assert_eq!(reloaded.user().and_then(|u| u.id()).as_deref(), Some("a1"));
    }
}
