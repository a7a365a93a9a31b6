use reqwest::multipart::Form;
use reqwest::Method;
use serde_json::Value;

use super::{file_part, unwrap_data, ApiClient, RequestBody};
use crate::error::{ClientError, Result};
use crate::models::{normalize_list, Car, CarUpdate, NewCar};

impl ApiClient {
    /// `POST /cars` as multipart, with the image file when given
    pub async fn create_car(&self, car: &NewCar) -> Result<Value> {
        let mut form = Form::new()
            .text("name", car.name.clone())
            .text("brand", car.brand.clone())
            .text("type", car.car_type.clone())
            .text("pricePerDay", car.price_per_day.to_string())
            .text("fuelType", car.fuel_type.clone())
            .text("transmission", car.transmission.clone())
            .text("available", car.available.to_string());

        if let Some(path) = &car.image {
            form = form.part("image", file_part(path).await?);
        }

        self.request("/cars", Method::POST, RequestBody::Multipart(form))
            .await
    }

    /// `GET /cars`, envelope unwrapped
    pub async fn get_cars(&self) -> Result<Value> {
        Ok(unwrap_data(
            self.request("/cars", Method::GET, RequestBody::Empty).await?,
        ))
    }

    /// `GET /cars/:id`, envelope unwrapped
    pub async fn get_car_by_id(&self, id: &str) -> Result<Value> {
        Ok(unwrap_data(
            self.request(&format!("/cars/{}", id), Method::GET, RequestBody::Empty)
                .await?,
        ))
    }

    pub async fn update_car(&self, id: &str, update: &CarUpdate) -> Result<Value> {
        self.request(
            &format!("/cars/{}", id),
            Method::PUT,
            RequestBody::json(update)?,
        )
        .await
    }

    pub async fn delete_car(&self, id: &str) -> Result<Value> {
        self.request(&format!("/cars/{}", id), Method::DELETE, RequestBody::Empty)
            .await
    }

    pub async fn list_cars(&self) -> Result<Vec<Car>> {
        Ok(normalize_list(self.get_cars().await?, &["cars"]))
    }

    pub async fn car(&self, id: &str) -> Result<Car> {
        match self.get_car_by_id(id).await? {
            Value::Object(map) => Ok(Car::from(map)),
            other => Err(ClientError::UnexpectedResponse(format!(
                "expected a car object, got {}",
                json_kind(&other)
            ))),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use crate::client::test_support::{client_for, spawn_backend};
    use crate::error::ClientError;
    use crate::models::{CarUpdate, NewCar};
    use crate::session::Session;
    use axum::extract::{Multipart, Path};
    use axum::http::StatusCode;
    use axum::routing::{get, post, put};
    use axum::{Json, Router};
    use serde_json::{json, Value};

    fn fleet() -> Value {
        json!([
            { "_id": "c1", "name": "Nexon", "brand": "Tata", "pricePerDay": 2500, "available": true },
            { "_id": "c2", "name": "Swift", "brand": "Maruti", "pricePerDay": "1800", "available": "false" }
        ])
    }

    #[tokio::test]
    async fn test_list_cars_from_envelope() {
        let router = Router::new().route(
            "/cars",
            get(|| async { Json(json!({ "success": true, "data": fleet() })) }),
        );
        let client = client_for(&spawn_backend(router).await, Session::in_memory());

        let cars = client.list_cars().await.unwrap();
        assert_eq!(cars.len(), 2);
        assert_eq!(cars[0].display_name(), "Tata Nexon");
        assert!(cars[0].is_available());
        assert_eq!(cars[1].price_per_day(), 1800.0);
        assert!(!cars[1].is_available());
    }

    #[tokio::test]
    async fn test_list_cars_bare_array_and_cars_key() {
        let router = Router::new()
            .route("/cars", get(|| async { Json(fleet()) }));
        let client = client_for(&spawn_backend(router).await, Session::in_memory());
        assert_eq!(client.list_cars().await.unwrap().len(), 2);

        let router = Router::new()
            .route("/cars", get(|| async { Json(json!({ "cars": fleet() })) }));
        let client = client_for(&spawn_backend(router).await, Session::in_memory());
        assert_eq!(client.list_cars().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_get_car_by_id() {
        let router = Router::new().route(
            "/cars/:id",
            get(|Path(id): Path<String>| async move {
                if id == "c1" {
                    (StatusCode::OK, Json(json!({ "data": { "_id": "c1", "name": "Nexon" } })))
                } else {
                    (StatusCode::NOT_FOUND, Json(json!({ "message": "Car not found" })))
                }
            }),
        );
        let client = client_for(&spawn_backend(router).await, Session::in_memory());

        let car = client.car("c1").await.unwrap();
        assert_eq!(car.id().as_deref(), Some("c1"));

        let err = client.car("zzz").await.unwrap_err();
        assert_eq!(err.to_string(), "Car not found");
        assert!(err.is_status(404));
    }

    #[tokio::test]
    async fn test_car_rejects_non_object() {
        let router = Router::new().route("/cars/:id", get(|| async { Json(json!([1, 2])) }));
        let client = client_for(&spawn_backend(router).await, Session::in_memory());

        let err = client.car("c1").await.unwrap_err();
        assert!(matches!(err, ClientError::UnexpectedResponse(_)));
    }

    #[tokio::test]
    async fn test_update_sends_only_set_fields() {
        let router = Router::new().route(
            "/cars/:id",
            put(|Path(id): Path<String>, Json(body): Json<Value>| async move {
                Json(json!({ "id": id, "body": body }))
            }),
        );
        let client = client_for(&spawn_backend(router).await, Session::in_memory());

        let update = CarUpdate {
            available: Some(false),
            ..Default::default()
        };
        let echoed = client.update_car("c9", &update).await.unwrap();
        assert_eq!(echoed["id"], "c9");
        assert_eq!(echoed["body"], json!({ "available": false }));
    }

    #[tokio::test]
    async fn test_create_car_multipart_fields() {
        let router = Router::new().route(
            "/cars",
            post(|mut multipart: Multipart| async move {
                let mut names = Vec::new();
                while let Some(field) = multipart.next_field().await.unwrap() {
                    let name = field.name().unwrap_or_default().to_string();
                    let text = field.text().await.unwrap();
                    names.push(json!([name, text]));
                }
                (StatusCode::CREATED, Json(Value::Array(names)))
            }),
        );
        let client = client_for(&spawn_backend(router).await, Session::in_memory());

        let echoed = client
            .create_car(&NewCar {
                name: "Nexon".into(),
                brand: "Tata".into(),
                car_type: "SUV".into(),
                price_per_day: 2500.0,
                fuel_type: "Petrol".into(),
                transmission: "Manual".into(),
                available: true,
                image: None,
            })
            .await
            .unwrap();

        assert_eq!(
            echoed,
            json!([
                ["name", "Nexon"],
                ["brand", "Tata"],
                ["type", "SUV"],
                ["pricePerDay", "2500"],
                ["fuelType", "Petrol"],
                ["transmission", "Manual"],
                ["available", "true"]
            ])
        );
    }
}
