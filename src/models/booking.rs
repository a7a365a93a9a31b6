use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::{read_number, read_str, Car, Record};

/// A rental request and its approval/payment state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Booking(Record);

impl From<Record> for Booking {
    fn from(record: Record) -> Self {
        Self(record)
    }
}

/// The car a booking points at: populated, a bare id, or nothing
#[derive(Debug, Clone, PartialEq)]
pub enum CarRef {
    Embedded(Car),
    Id(String),
    Missing,
}

impl CarRef {
    pub fn embedded(&self) -> Option<&Car> {
        match self {
            CarRef::Embedded(car) => Some(car),
            _ => None,
        }
    }

    pub fn id(&self) -> Option<String> {
        match self {
            CarRef::Embedded(car) => car.id(),
            CarRef::Id(id) => Some(id.clone()),
            CarRef::Missing => None,
        }
    }
}

impl Booking {
    pub fn as_record(&self) -> &Record {
        &self.0
    }

    pub fn id(&self) -> Option<String> {
        read_str(&self.0, &["_id", "id"])
    }

    /// `car` or `carId`, whichever is populated first
    pub fn car(&self) -> CarRef {
        for key in ["car", "carId"] {
            if let Some(Value::Object(map)) = self.0.get(key) {
                return CarRef::Embedded(Car::from(map.clone()));
            }
        }
        match read_str(&self.0, &["car", "carId"]) {
            Some(id) => CarRef::Id(id),
            None => CarRef::Missing,
        }
    }

    pub fn user_id(&self) -> Option<String> {
        for key in ["user", "userId"] {
            if let Some(Value::Object(map)) = self.0.get(key) {
                if let Some(id) = read_str(map, &["_id", "id"]) {
                    return Some(id);
                }
            }
        }
        read_str(&self.0, &["user", "userId"])
    }

    pub fn user_name(&self) -> Option<String> {
        self.embedded_user_field("fullName")
            .or_else(|| read_str(&self.0, &["userName"]))
    }

    pub fn user_email(&self) -> Option<String> {
        self.embedded_user_field("email")
            .or_else(|| read_str(&self.0, &["userEmail"]))
    }

    fn embedded_user_field(&self, field: &str) -> Option<String> {
        match self.0.get("user") {
            Some(Value::Object(map)) => read_str(map, &[field]),
            _ => None,
        }
    }

    pub fn start_date(&self) -> Option<String> {
        read_str(&self.0, &["startDate", "from"])
    }

    pub fn end_date(&self) -> Option<String> {
        read_str(&self.0, &["endDate", "to"])
    }

    pub fn total(&self) -> f64 {
        read_number(&self.0, &["totalPrice", "total", "amount", "price"])
    }

    /// Lowercased approval status, `pending` when absent
    pub fn booking_status(&self) -> String {
        read_str(&self.0, &["bookingStatus", "status"])
            .unwrap_or_else(|| "pending".to_string())
            .to_lowercase()
    }

    /// Lowercased payment status, `pending` when absent
    pub fn payment_status(&self) -> String {
        read_str(&self.0, &["paymentStatus"])
            .unwrap_or_else(|| "pending".to_string())
            .to_lowercase()
    }

    pub fn pickup_location(&self) -> Option<String> {
        read_str(&self.0, &["pickupLocation"])
    }

    pub fn drop_location(&self) -> Option<String> {
        read_str(&self.0, &["dropLocation"])
    }

    pub fn note(&self) -> Option<String> {
        read_str(&self.0, &["note"])
    }
}

/// Body of `POST /bookings`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    pub user: String,
    pub car: String,
    pub start_date: String,
    pub end_date: String,
    pub pickup_location: String,
    pub drop_location: String,
    pub total_price: f64,
}

/// Admin decision sent to `PATCH /approve/:id?action=...`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingAction {
    Approve,
    Cancel,
}

impl BookingAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingAction::Approve => "approve",
            BookingAction::Cancel => "cancel",
        }
    }
}

impl fmt::Display for BookingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
