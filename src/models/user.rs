use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

use super::{read_str, Record};
use crate::error::{ClientError, Result};

/// Role string that unlocks the admin commands
pub const ADMIN_ROLE: &str = "admin";

/// A user account as returned by `/login` and stored in the session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct User(Record);

impl From<Record> for User {
    fn from(record: Record) -> Self {
        Self(record)
    }
}

impl User {
    pub fn as_record(&self) -> &Record {
        &self.0
    }

    /// `_id`, falling back to `id`
    pub fn id(&self) -> Option<String> {
        read_str(&self.0, &["_id", "id"])
    }

    pub fn full_name(&self) -> Option<String> {
        read_str(&self.0, &["fullName", "name"])
    }

    pub fn email(&self) -> Option<String> {
        read_str(&self.0, &["email"])
    }

    pub fn phone(&self) -> Option<String> {
        read_str(&self.0, &["phone"])
    }

    pub fn role(&self) -> Option<String> {
        read_str(&self.0, &["role"])
    }

    pub fn profile_pic(&self) -> Option<String> {
        read_str(&self.0, &["profilePic"])
    }

    pub fn is_admin(&self) -> bool {
        self.role().as_deref() == Some(ADMIN_ROLE)
    }
}

/// Body of `POST /login`
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Fields sent as multipart to `POST /register`
#[derive(Debug, Clone)]
pub struct Registration {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub profile_pic: Option<PathBuf>,
}

/// Successful login payload: `{ token, user }`
#[derive(Debug, Clone)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

impl AuthResponse {
    pub fn from_value(payload: &Value) -> Result<Self> {
        let token = payload
            .get("token")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ClientError::UnexpectedResponse("login response has no token".into()))?;

        let user = match payload.get("user") {
            Some(Value::Object(map)) => User::from(map.clone()),
            _ => {
                return Err(ClientError::UnexpectedResponse(
                    "login response has no user".into(),
                ))
            }
        };

        Ok(Self {
            token: token.to_string(),
            user,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_accessors() {
        let user: User = serde_json::from_value(json!({
            "_id": "665f",
            "fullName": "Asha Rao",
            "email": "asha@example.com",
            "phone": "9999999999",
            "role": "user",
            "profilePic": "uploads/asha.png"
        }))
        .unwrap();

        assert_eq!(user.id().as_deref(), Some("665f"));
        assert_eq!(user.full_name().as_deref(), Some("Asha Rao"));
        assert_eq!(user.profile_pic().as_deref(), Some("uploads/asha.png"));
        assert!(!user.is_admin());
    }

    #[test]
    fn test_user_id_fallback() {
        let user: User = serde_json::from_value(json!({ "id": "u-1", "role": "admin" })).unwrap();
        assert_eq!(user.id().as_deref(), Some("u-1"));
        assert!(user.is_admin());
    }

    #[test]
    fn test_user_round_trips_unknown_fields() {
        let raw = json!({ "_id": "1", "createdAt": "2024-05-01", "__v": 0 });
        let user: User = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&user).unwrap(), raw);
    }

    #[test]
    fn test_auth_response() {
        let auth = AuthResponse::from_value(&json!({
            "token": "jwt",
            "user": { "_id": "1", "role": "admin" }
        }))
        .unwrap();
        assert_eq!(auth.token, "jwt");
        assert!(auth.user.is_admin());

        assert!(AuthResponse::from_value(&json!({ "user": {} })).is_err());
        assert!(AuthResponse::from_value(&json!({ "token": "jwt" })).is_err());
    }
}
