//! Records exchanged with the rental backend.
//!
//! The backend is the source of truth and has shipped several field names for
//! the same thing over time (`startDate`/`from`, `totalPrice`/`total`/...).
//! Records are therefore kept as the raw JSON object they arrived as and read
//! through accessors that know the aliases, instead of a strict struct that
//! would reject one generation of the API or the other.

mod booking;
mod car;
mod user;

pub use booking::{Booking, BookingAction, CarRef, NewBooking};
pub use car::{Car, CarUpdate, NewCar};
pub use user::{AuthResponse, Credentials, Registration, User, ADMIN_ROLE};

use serde_json::{Map, Value};

pub type Record = Map<String, Value>;

/// How a booking or payment status should be presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    /// approved / confirmed / paid
    Settled,
    Pending,
    /// cancelled, rejected, failed and anything unrecognised
    Rejected,
}

pub fn status_tone(status: &str) -> StatusTone {
    match status {
        "confirm" | "approved" | "paid" => StatusTone::Settled,
        "pending" => StatusTone::Pending,
        _ => StatusTone::Rejected,
    }
}

/// Normalize a list-shaped response.
///
/// Accepts a bare array, or an object holding the array under `data` or one
/// of `keys`. Non-object entries are dropped; any other shape is an empty
/// list.
pub fn normalize_list<T: From<Record>>(payload: Value, keys: &[&str]) -> Vec<T> {
    let items = match payload {
        Value::Array(items) => items,
        Value::Object(mut map) => std::iter::once("data")
            .chain(keys.iter().copied())
            .find_map(|key| match map.remove(key) {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            })
            .unwrap_or_default(),
        _ => Vec::new(),
    };

    items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(map) => Some(T::from(map)),
            _ => None,
        })
        .collect()
}

/// First field among `keys` holding a non-empty string or a number, as text
pub(crate) fn read_str(record: &Record, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match record.get(*key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Numeric reading of the first truthy field among `keys`.
///
/// Zero, empty strings, `false` and `null` are skipped; a chosen value that
/// does not parse as a number reads as `0.0`.
pub(crate) fn read_number(record: &Record, keys: &[&str]) -> f64 {
    let chosen = keys
        .iter()
        .filter_map(|key| record.get(*key))
        .find(|value| is_truthy(value));

    let number = match chosen {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(Value::Bool(true)) => Some(1.0),
        _ => None,
    };

    number.filter(|n| n.is_finite()).unwrap_or(0.0)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
