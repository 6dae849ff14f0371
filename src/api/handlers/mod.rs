use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};

use super::AppState;
use crate::error::Error;
use crate::models::*;
use crate::service::{CarListing, Redirect};

// ============================================================
// Error Handling
// ============================================================

/// Map a core error onto a status code.
///
/// Storage failures are logged in full but clients only see a generic
/// message; the other variants describe the caller's own input and are
/// returned as-is.
fn error_response(e: Error) -> (StatusCode, String) {
    let status = match &e {
        Error::NotFound { .. } => StatusCode::NOT_FOUND,
        Error::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        Error::Conflict(_) => StatusCode::CONFLICT,
        Error::Storage(_) => {
            tracing::error!("Internal error: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            );
        }
    };

    tracing::warn!("Request rejected: {}", e);
    (status, e.to_string())
}

impl IntoResponse for Redirect {
    fn into_response(self) -> Response {
        (StatusCode::FOUND, [(header::LOCATION, self.location)]).into_response()
    }
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Cars
// ============================================================

pub async fn list_cars(
    State(state): State<AppState>,
) -> Result<Json<CarListing>, (StatusCode, String)> {
    state.cars.list_cars().map(Json).map_err(error_response)
}

pub async fn get_car(
    State(state): State<AppState>,
    Path(id): Path<CarId>,
) -> Result<Json<Car>, (StatusCode, String)> {
    state
        .cars
        .find_car(id)
        .map_err(error_response)?
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Car not found".to_string()))
}

pub async fn upsert_car(
    State(state): State<AppState>,
    Form(input): Form<CarInput>,
) -> Result<Redirect, (StatusCode, String)> {
    state.cars.upsert_car(input).map_err(error_response)
}

pub async fn delete_car(
    State(state): State<AppState>,
    Path(id): Path<CarId>,
) -> Result<Redirect, (StatusCode, String)> {
    state.cars.delete_car(id).map_err(error_response)
}

pub async fn list_car_transportations(
    State(state): State<AppState>,
    Path(id): Path<CarId>,
) -> Result<Json<Vec<Transportation>>, (StatusCode, String)> {
    state
        .db
        .get_transportations_by_car(id)
        .map(Json)
        .map_err(error_response)
}

// ============================================================
// Ownership
// ============================================================

pub async fn add_owner(
    State(state): State<AppState>,
    Path((car_id, customer_id)): Path<(CarId, CustomerId)>,
) -> Result<Redirect, (StatusCode, String)> {
    state
        .cars
        .add_owner(Ownership {
            car_id,
            customer_id,
        })
        .map_err(error_response)
}

pub async fn remove_owner(
    State(state): State<AppState>,
    Path((car_id, customer_id)): Path<(CarId, CustomerId)>,
) -> Result<StatusCode, (StatusCode, String)> {
    let removed = state
        .cars
        .remove_owner(Ownership {
            car_id,
            customer_id,
        })
        .map_err(error_response)?;

    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, "Ownership not found".to_string()))
    }
}

pub async fn list_owned_cars(
    State(state): State<AppState>,
    Path(customer_id): Path<CustomerId>,
) -> Result<Json<Vec<Car>>, (StatusCode, String)> {
    state
        .db
        .get_cars_by_owner(customer_id)
        .map(Json)
        .map_err(error_response)
}

// ============================================================
// Transportations
// ============================================================

pub async fn create_transportation(
    State(state): State<AppState>,
    Json(input): Json<CreateTransportationInput>,
) -> Result<(StatusCode, Json<Transportation>), (StatusCode, String)> {
    state
        .db
        .create_transportation(input)
        .map(|t| (StatusCode::CREATED, Json(t)))
        .map_err(error_response)
}

pub async fn get_transportation(
    State(state): State<AppState>,
    Path(id): Path<TransportationId>,
) -> Result<Json<Transportation>, (StatusCode, String)> {
    state
        .db
        .get_transportation(id)
        .map_err(error_response)?
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Transportation not found".to_string()))
}

pub async fn delete_transportation(
    State(state): State<AppState>,
    Path(id): Path<TransportationId>,
) -> Result<StatusCode, (StatusCode, String)> {
    if state
        .db
        .delete_transportation(id)
        .map_err(error_response)?
    {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, "Transportation not found".to_string()))
    }
}
