use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

use super::{read_number, read_str, Record};

/// A vehicle in the rental fleet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Car(Record);

impl From<Record> for Car {
    fn from(record: Record) -> Self {
        Self(record)
    }
}

impl Car {
    pub fn as_record(&self) -> &Record {
        &self.0
    }

    pub fn id(&self) -> Option<String> {
        read_str(&self.0, &["_id", "id"])
    }

    pub fn name(&self) -> Option<String> {
        read_str(&self.0, &["name"])
    }

    pub fn brand(&self) -> Option<String> {
        read_str(&self.0, &["brand"])
    }

    pub fn car_type(&self) -> Option<String> {
        read_str(&self.0, &["type"])
    }

    pub fn fuel_type(&self) -> Option<String> {
        read_str(&self.0, &["fuelType"])
    }

    pub fn transmission(&self) -> Option<String> {
        read_str(&self.0, &["transmission"])
    }

    pub fn image(&self) -> Option<String> {
        read_str(&self.0, &["image"])
    }

    /// Daily rate; missing or non-numeric reads as `0.0`
    pub fn price_per_day(&self) -> f64 {
        read_number(&self.0, &["pricePerDay"])
    }

    /// `true`, `"true"` and `1` all mean available
    pub fn is_available(&self) -> bool {
        match self.0.get("available") {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s == "true",
            Some(Value::Number(n)) => n.as_f64() == Some(1.0),
            _ => false,
        }
    }

    /// "Brand Name", or just the name, or "Car"
    pub fn display_name(&self) -> String {
        let name = self.name().unwrap_or_else(|| "Car".to_string());
        match self.brand() {
            Some(brand) => format!("{} {}", brand, name),
            None => name,
        }
    }
}

/// Fields for `POST /cars` (sent as multipart)
#[derive(Debug, Clone)]
pub struct NewCar {
    pub name: String,
    pub brand: String,
    pub car_type: String,
    pub price_per_day: f64,
    pub fuel_type: String,
    pub transmission: String,
    pub available: bool,
    pub image: Option<PathBuf>,
}

/// JSON body for `PUT /cars/:id`; unset fields are left out
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub car_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_per_day: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuel_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transmission: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available: Option<bool>,
}

impl CarUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.brand.is_none()
            && self.car_type.is_none()
            && self.price_per_day.is_none()
            && self.fuel_type.is_none()
            && self.transmission.is_none()
            && self.available.is_none()
    }
}
