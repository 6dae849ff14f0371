mod handlers;

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::db::Database;
use crate::service::CarService;

/// Shared handler state. Both fields wrap the same connection.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub cars: CarService<Database>,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        Self {
            cars: CarService::new(db.clone()),
            db,
        }
    }
}

pub fn create_router(db: Database) -> Router {
    Router::new()
        // Cars
        .route("/cars", get(handlers::list_cars))
        .route("/car/upsert", post(handlers::upsert_car))
        .route("/car/{id}", get(handlers::get_car))
        .route("/car/{id}/delete", get(handlers::delete_car))
        .route("/car/{id}/transportations", get(handlers::list_car_transportations))
        // Ownership
        .route("/car/{id}/owners/{customer_id}", post(handlers::add_owner))
        .route("/car/{id}/owners/{customer_id}", delete(handlers::remove_owner))
        .route("/customers/{id}/cars", get(handlers::list_owned_cars))
        // Transportations
        .route("/transportations", post(handlers::create_transportation))
        .route("/transportations/{id}", get(handlers::get_transportation))
        .route("/transportations/{id}", delete(handlers::delete_transportation))
        // Health
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(AppState::new(db))
}
