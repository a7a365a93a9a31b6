//! HTTP access to the rental backend.
//!
//! [`ApiClient::request`] is the only place a network call happens. It adds
//! the bearer token from the [`Session`], encodes the body, and folds every
//! response into either the parsed JSON body or a [`ClientError`]. The
//! resource accessors in the submodules are thin wrappers mapping one backend
//! operation to a fixed verb and path.
//!
//! - `auth` - registration and login
//! - `cars` - fleet listing and admin inventory management
//! - `bookings` - booking requests and the admin approval workflow
//! - `payments` - payment intents for checkout

mod auth;
mod bookings;
mod cars;
mod payments;

pub use bookings::{BookingDraft, BookingReceipt};
pub use payments::PaymentIntent;

use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::Form;
use reqwest::{Client, Method};
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::config::ApiConfig;
use crate::error::{ClientError, Result};
use crate::images;
use crate::session::Session;

/// Request payload handed to [`ApiClient::request`]
#[derive(Debug)]
pub enum RequestBody {
    Empty,
    Json(Value),
    /// Sent as-is; the HTTP stack writes the boundary header
    Multipart(Form),
}

impl RequestBody {
    pub fn json<T: Serialize>(body: &T) -> Result<Self> {
        Ok(RequestBody::Json(serde_json::to_value(body)?))
    }

    fn is_multipart(&self) -> bool {
        matches!(self, RequestBody::Multipart(_))
    }
}

/// Client for the rental backend, bound to one session
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: Session,
}

impl ApiClient {
    pub fn new(config: &ApiConfig, session: Session) -> Result<Self> {
        let http = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Absolute URL for an image path returned by the backend
    pub fn image_url(&self, raw: Option<&str>) -> Option<String> {
        images::resolve_image_url(&self.base_url, raw)
    }

    /// Perform one API call.
    ///
    /// Resolves to the parsed JSON body, or an empty object when the body is
    /// empty or not JSON. A non-2xx status becomes [`ClientError::Api`] with
    /// the server's message when it sent one.
    pub async fn request(&self, path: &str, method: Method, body: RequestBody) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        debug!(method = %method, path = %path, "API request");

        let mut request = self.http.request(method.clone(), &url);

        if !body.is_multipart() {
            request = request.header(CONTENT_TYPE, "application/json");
        }

        if let Some(token) = self.session.token() {
            request = request.bearer_auth(token);
        }

        request = match body {
            RequestBody::Empty => request,
            RequestBody::Json(value) => request.body(serde_json::to_vec(&value)?),
            RequestBody::Multipart(form) => request.multipart(form),
        };

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        let data = serde_json::from_slice::<Value>(&bytes)
            .ok()
            .filter(|v| !v.is_null());

        if !status.is_success() {
            debug!(method = %method, path = %path, status = status.as_u16(), "API error response");
            return Err(ClientError::from_response(status.as_u16(), data));
        }

        Ok(data.unwrap_or_else(|| Value::Object(Map::new())))
    }
}

/// Return the `data` member of an envelope object, or the payload itself
pub fn unwrap_data(payload: Value) -> Value {
    match payload {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Multipart part holding the file at `path`, named after the file
pub(crate) async fn file_part(path: &Path) -> Result<reqwest::multipart::Part> {
    let bytes = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    let mime = mime_guess::from_path(path).first_or_octet_stream();

    Ok(reqwest::multipart::Part::bytes(bytes)
        .file_name(file_name)
        .mime_str(mime.as_ref())?)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::config::ApiConfig;

    /// Serve `router` on an ephemeral local port and return its origin
    pub async fn spawn_backend(router: axum::Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    pub fn client_for(base_url: &str, session: Session) -> ApiClient {
        let config = ApiConfig {
            base_url: base_url.to_string(),
            timeout_secs: 5,
            ..ApiConfig::default()
        };
        ApiClient::new(&config, session).unwrap()
    }
}
