use reqwest::Method;
use serde_json::Value;
use tracing::warn;

use super::{unwrap_data, ApiClient, RequestBody};
use crate::error::{ClientError, Result};
use crate::models::{normalize_list, Booking, BookingAction, Car, NewBooking};
use crate::quote::{self, Quote};

/// What the renter filled in on the booking form
#[derive(Debug, Clone, Default)]
pub struct BookingDraft {
    pub car_id: String,
    pub start_date: String,
    pub end_date: String,
    pub pickup_location: String,
    pub drop_location: String,
}

/// A booking request accepted by the backend
#[derive(Debug, Clone)]
pub struct BookingReceipt {
    pub car: Car,
    pub quote: Quote,
    pub request: NewBooking,
    pub response: Value,
}

impl ApiClient {
    pub async fn create_booking(&self, booking: &NewBooking) -> Result<Value> {
        self.request("/bookings", Method::POST, RequestBody::json(booking)?)
            .await
    }

    /// `GET /bookings` (admin), envelope unwrapped
    pub async fn get_bookings(&self) -> Result<Value> {
        Ok(unwrap_data(
            self.request("/bookings", Method::GET, RequestBody::Empty)
                .await?,
        ))
    }

    /// `GET /bookings/:userId`, envelope unwrapped.
    ///
    /// A 404 means the user has no bookings and yields an empty array. A 400
    /// is retried once with the identical request, after which a 404 is
    /// again an empty array and anything else is returned as the error.
    pub async fn get_bookings_by_user(&self, user_id: &str) -> Result<Value> {
        let path = format!("/bookings/{}", user_id);

        match self.request(&path, Method::GET, RequestBody::Empty).await {
            Ok(payload) => Ok(unwrap_data(payload)),
            Err(e) if e.is_status(404) => Ok(Value::Array(Vec::new())),
            Err(e) if e.is_status(400) => {
                warn!(path = %path, "Bookings lookup answered 400, retrying once");
                match self.request(&path, Method::GET, RequestBody::Empty).await {
                    Ok(payload) => Ok(unwrap_data(payload)),
                    Err(retry) if retry.is_status(404) => Ok(Value::Array(Vec::new())),
                    Err(retry) => Err(retry),
                }
            }
            Err(e) => Err(e),
        }
    }

    pub async fn update_booking(&self, id: &str, body: &Value) -> Result<Value> {
        self.request(
            &format!("/bookings/{}", id),
            Method::PUT,
            RequestBody::Json(body.clone()),
        )
        .await
    }

    pub async fn delete_booking(&self, id: &str) -> Result<Value> {
        self.request(
            &format!("/bookings/{}", id),
            Method::DELETE,
            RequestBody::Empty,
        )
        .await
    }

    /// `PATCH /approve/:id?action=approve|cancel`
    pub async fn approve_cancel_request(&self, id: &str, action: BookingAction) -> Result<Value> {
        self.request(
            &format!("/approve/{}?action={}", id, action.as_str()),
            Method::PATCH,
            RequestBody::Empty,
        )
        .await
    }

    pub async fn list_bookings(&self) -> Result<Vec<Booking>> {
        Ok(normalize_list(self.get_bookings().await?, &["bookings"]))
    }

    pub async fn list_user_bookings(&self, user_id: &str) -> Result<Vec<Booking>> {
        Ok(normalize_list(
            self.get_bookings_by_user(user_id).await?,
            &["bookings"],
        ))
    }

    /// Bookings of the signed-in user
    pub async fn my_bookings(&self) -> Result<Vec<Booking>> {
        let user_id = self.session().current_user_id()?;
        self.list_user_bookings(&user_id).await
    }

    /// Validate the draft, price it against the car's daily rate and send
    /// the booking request.
    ///
    /// Every check on the draft and the session runs before any request.
    pub async fn book_car(&self, draft: &BookingDraft) -> Result<BookingReceipt> {
        let user_id = validate_draft(draft, || self.session().current_user_id())?;

        let car = self.car(&draft.car_id).await?;
        let quote = quote::quote(car.price_per_day(), &draft.start_date, &draft.end_date);

        let request = NewBooking {
            user: user_id,
            car: draft.car_id.clone(),
            start_date: draft.start_date.clone(),
            end_date: draft.end_date.clone(),
            pickup_location: draft.pickup_location.clone(),
            drop_location: draft.drop_location.clone(),
            total_price: quote.total_price,
        };

        let response = self.create_booking(&request).await?;

        Ok(BookingReceipt {
            car,
            quote,
            request,
            response,
        })
    }
}

/// Checks the booking screen performs, in the order it performs them.
/// Returns the id of the user making the booking.
fn validate_draft(
    draft: &BookingDraft,
    current_user: impl FnOnce() -> Result<String>,
) -> Result<String> {
    if draft.car_id.trim().is_empty() {
        return Err(ClientError::validation(
            "Car details not found. Please try again.",
        ));
    }

    if draft.start_date.trim().is_empty() || draft.end_date.trim().is_empty() {
        return Err(ClientError::validation(
            "Please select both start and end dates.",
        ));
    }

    if quote::rental_days(&draft.start_date, &draft.end_date) == 0 {
        return Err(ClientError::validation(
            "End date must be after start date.",
        ));
    }

    current_user()
}
