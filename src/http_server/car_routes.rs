//! Car HTTP Routes
//!
//! - `GET /` redirects to `/cars`
//! - `GET /cars?number=N` HTML listing of the first N cars (N <= 10)
//! - `GET /cars/:id` HTML page for one car
//! - `POST /cars` create cars from a JSON body
//! - `PUT /cars/:id` merge a partial car and return it as JSON
//! - `DELETE /cars/:id` remove a car

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{Method, StatusCode, Uri},
    response::{Html, Redirect},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;

use crate::observability::{Logger, MetricsRegistry};
use crate::render::{HomeTemplate, PageContext};
use crate::schema::{Car, CarValidator, LocSegment};
use crate::store::{CarId, CarStore};

use super::config::{ConfigError, ServerConfig};
use super::errors::ApiResult;

/// Default and maximum number of cars on the listing page
pub const MAX_LISTED: i64 = 10;

const HOME_TITLE: &str = "Home";

// ==================
// Shared State
// ==================

/// State shared across car handlers
pub struct CarsState {
    pub store: CarStore,
    pub validator: CarValidator,
    pub template: HomeTemplate,
    pub metrics: Arc<MetricsRegistry>,
}

impl CarsState {
    /// Empty store, built-in template
    pub fn new() -> Self {
        Self {
            store: CarStore::new(),
            validator: CarValidator::new(),
            template: HomeTemplate::builtin(),
            metrics: Arc::new(MetricsRegistry::new()),
        }
    }

    /// Build state from configuration: load the template and insert seed cars.
    pub fn from_config(config: &ServerConfig) -> Result<Self, ConfigError> {
        let mut state = Self::new();

        if let Some(path) = &config.template_path {
            state.template = HomeTemplate::load(path)?;
        }

        if !config.seed.is_empty() {
            let request = state
                .validator
                .validate_create(&Value::Array(config.seed.clone()))?;
            let ids = state
                .store
                .insert_batch(request.cars, 0)
                .map_err(|e| ConfigError::Invalid(e.to_string()))?;
            state.metrics.set_cars(ids.len() as u64);
            Logger::info("SEED_LOADED", &[("count", &ids.len().to_string())]);
        }

        Ok(state)
    }

    fn refresh_size(&self) {
        if let Ok(len) = self.store.len() {
            self.metrics.set_cars(len as u64);
        }
    }
}

impl Default for CarsState {
    fn default() -> Self {
        Self::new()
    }
}

// ==================
// Request Types
// ==================

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub number: Option<i64>,
}

impl ListQuery {
    /// How many of `size` stored cars to list. Negative counts drop that many
    /// cars from the end. The result never exceeds MAX_LISTED.
    pub fn take(&self, size: usize) -> usize {
        let number = self.number.unwrap_or(MAX_LISTED).min(MAX_LISTED);
        if number >= 0 {
            number as usize
        } else {
            let dropped = usize::try_from(number.unsigned_abs()).unwrap_or(usize::MAX);
            size.saturating_sub(dropped).min(MAX_LISTED as usize)
        }
    }
}

// ==================
// Car Routes
// ==================

/// Create car routes
pub fn car_routes(state: Arc<CarsState>) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/cars", get(list_cars_handler).post(create_cars_handler))
        .route(
            "/cars/:id",
            get(get_car_handler)
                .put(update_car_handler)
                .delete(delete_car_handler),
        )
        .with_state(state)
}

fn describe(method: &Method, uri: &Uri) -> String {
    format!("{} {}", method, uri.path())
}

// ==================
// Handlers
// ==================

async fn root_handler() -> Redirect {
    Redirect::temporary("/cars")
}

async fn list_cars_handler(
    State(state): State<Arc<CarsState>>,
    method: Method,
    uri: Uri,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Html<String>> {
    let Query(query) = query?;
    let size = state.store.len()?;
    let cars = state.store.list(query.take(size))?;
    Logger::trace(
        "CARS_LISTED",
        &[("count", &cars.len().to_string()), ("size", &size.to_string())],
    );
    let ctx = PageContext::new(describe(&method, &uri), HOME_TITLE, cars);
    Ok(Html(state.template.render(&ctx)?))
}

async fn get_car_handler(
    State(state): State<Arc<CarsState>>,
    method: Method,
    uri: Uri,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Html<String>> {
    let Path(raw) = path?;
    let id = state.validator.validate_path_id(&raw)?;
    let id = state.validator.validate_read_id(id)?;
    let car = state.store.get(id)?;
    let ctx = PageContext::new(describe(&method, &uri), format!("Car #{}", id), vec![(id, car)]);
    Ok(Html(state.template.render(&ctx)?))
}

async fn create_cars_handler(
    State(state): State<Arc<CarsState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let Json(body) = body?;
    let request = state.validator.validate_create(&body)?;
    let ids = state.store.insert_batch(request.cars, request.min_id)?;

    state.metrics.add_cars_created(ids.len() as u64);
    state.refresh_size();

    let ids_field = ids
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",");
    Logger::info(
        "CARS_CREATED",
        &[
            ("count", &ids.len().to_string()),
            ("ids", &ids_field),
            ("min_id", &request.min_id.to_string()),
        ],
    );

    Ok(StatusCode::CREATED)
}

async fn update_car_handler(
    State(state): State<Arc<CarsState>>,
    path: Result<Path<String>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Car>> {
    let Path(raw) = path?;
    let id: CarId = state.validator.validate_path_id(&raw)?;
    let Json(body) = body?;
    let patch = state
        .validator
        .validate_patch(&body, &[LocSegment::from("body")])?;
    let car = state.store.update(id, patch)?;

    state.metrics.increment_cars_updated();
    Logger::info("CAR_UPDATED", &[("id", &id.to_string())]);

    Ok(Json(car))
}

async fn delete_car_handler(
    State(state): State<Arc<CarsState>>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(raw) = path?;
    let id: CarId = state.validator.validate_path_id(&raw)?;
    state.store.delete(id)?;

    state.metrics.increment_cars_deleted();
    state.refresh_size();
    Logger::info("CAR_DELETED", &[("id", &id.to_string())]);

    Ok(StatusCode::NO_CONTENT)
}
