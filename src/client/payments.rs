use reqwest::Method;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;

use super::{ApiClient, RequestBody};
use crate::error::{ClientError, Result};
use crate::session::Checkout;

/// Payment processor intent created for a booking
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    pub booking_id: String,
    /// Amount in minor currency units
    pub amount: i64,
    /// Secret the processor's checkout form confirms the charge with
    pub client_secret: String,
}

/// Convert a major-unit amount to minor units, rounding to the nearest unit
pub fn to_minor_units(amount: f64, minor_units: u32) -> i64 {
    (amount * f64::from(minor_units)).round() as i64
}

impl ApiClient {
    /// `POST /payments/create-intent/:bookingId` with `{ amount }` in minor units
    pub async fn create_payment_intent(&self, booking_id: &str, amount: i64) -> Result<PaymentIntent> {
        let payload = self
            .request(
                &format!("/payments/create-intent/{}", booking_id),
                Method::POST,
                RequestBody::Json(json!({ "amount": amount })),
            )
            .await?;

        let client_secret = ["clientSecret", "client_secret"]
            .iter()
            .find_map(|key| payload.get(*key).and_then(Value::as_str))
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                ClientError::UnexpectedResponse("payment intent has no client secret".into())
            })?;

        Ok(PaymentIntent {
            booking_id: booking_id.to_string(),
            amount,
            client_secret: client_secret.to_string(),
        })
    }

    /// Start paying for one of the signed-in user's bookings.
    ///
    /// The booking total is read from the user's bookings, remembered as the
    /// pending checkout, and turned into a payment intent.
    pub async fn start_checkout(&self, booking_id: &str, minor_units: u32) -> Result<PaymentIntent> {
        let user_id = self.session().current_user_id()?;

        let booking = self
            .list_user_bookings(&user_id)
            .await?
            .into_iter()
            .find(|b| b.id().as_deref() == Some(booking_id))
            .ok_or_else(|| {
                ClientError::validation(format!("Booking {} not found in your bookings.", booking_id))
            })?;

        let total = booking.total();
        if total <= 0.0 {
            return Err(ClientError::validation(
                "This booking has no amount to pay.",
            ));
        }

        self.session().begin_checkout(&Checkout {
            amount: total,
            booking_id: booking_id.to_string(),
            user_id,
        })?;

        let intent = self
            .create_payment_intent(booking_id, to_minor_units(total, minor_units))
            .await?;
        info!(booking_id = %booking_id, amount = intent.amount, "Payment intent created");
        Ok(intent)
    }
}
