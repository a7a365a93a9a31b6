use reqwest::multipart::Form;
use reqwest::Method;
use serde_json::Value;

use super::{file_part, ApiClient, RequestBody};
use crate::error::Result;
use crate::models::{AuthResponse, Credentials, Registration};
use crate::session::AuthState;

impl ApiClient {
    /// `POST /register` as multipart; the profile picture is optional
    pub async fn register_user(&self, registration: &Registration) -> Result<Value> {
        let mut form = Form::new()
            .text("fullName", registration.full_name.clone())
            .text("email", registration.email.clone())
            .text("phone", registration.phone.clone())
            .text("password", registration.password.clone());

        if let Some(path) = &registration.profile_pic {
            form = form.part("profilePic", file_part(path).await?);
        }

        self.request("/register", Method::POST, RequestBody::Multipart(form))
            .await
    }

    /// `POST /login`
    pub async fn login_user(&self, credentials: &Credentials) -> Result<Value> {
        self.request("/login", Method::POST, RequestBody::json(credentials)?)
            .await
    }

    /// Log in and store token, user and role in the session
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<AuthState> {
        let payload = self.login_user(credentials).await?;
        let auth = AuthResponse::from_value(&payload)?;
        self.session().sign_in(&auth)
    }

    pub fn sign_out(&self) -> Result<()> {
        self.session().sign_out()
    }
}
