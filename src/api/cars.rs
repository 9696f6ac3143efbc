use askama::Template;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use serde::Deserialize;

use crate::api::middleware::session::AppState;
use crate::models::car::{Car, CarWithManufacturer, CreateCarData};
use crate::models::manufacturer::Manufacturer;
use crate::services::pagination::Pager;
use crate::services::validation::{require, FieldErrors};

#[derive(Debug)]
pub enum CarsError {
    DatabaseError(sqlx::Error),
    NotFound,
}

impl IntoResponse for CarsError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            CarsError::DatabaseError(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", e),
            ),
            CarsError::NotFound => (StatusCode::NOT_FOUND, "Car not found".to_string()),
        };

        (status, message).into_response()
    }
}

// Template structures
#[derive(Template)]
#[template(path = "cars/list.html")]
struct CarListTemplate {
    cars: Vec<CarWithManufacturer>,
    pager: Pager,
    query: String,
}

#[derive(Template)]
#[template(path = "cars/detail.html")]
struct CarDetailTemplate {
    car: CarWithManufacturer,
}

#[derive(Template)]
#[template(path = "cars/form.html")]
struct CarFormTemplate {
    title: &'static str,
    action: String,
    model: String,
    manufacturer_id: Option<i64>,
    manufacturers: Vec<Manufacturer>,
    errors: FieldErrors,
}

impl CarFormTemplate {
    fn is_selected(&self, id: &i64) -> bool {
        self.manufacturer_id == Some(*id)
    }
}

#[derive(Deserialize)]
struct ListQuery {
    model: Option<String>,
    page: Option<i64>,
}

/// List cars, optionally filtered by model, five per page
async fn list_cars(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<CarListTemplate, CarsError> {
    let filter = query.model.as_deref();

    let total = Car::count_matching(&state.pool, filter)
        .await
        .map_err(CarsError::DatabaseError)?;

    let pager = Pager::new(query.page, total);

    let cars = Car::search(&state.pool, filter, pager.limit(), pager.offset())
        .await
        .map_err(CarsError::DatabaseError)?;

    Ok(CarListTemplate {
        cars,
        pager,
        query: query.model.unwrap_or_default(),
    })
}

/// Show a single car with its manufacturer
async fn car_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<CarDetailTemplate, CarsError> {
    let car = Car::find_detail(&state.pool, id)
        .await
        .map_err(CarsError::DatabaseError)?
        .ok_or(CarsError::NotFound)?;

    Ok(CarDetailTemplate { car })
}

/// Show the blank create form
async fn new_car_form(State(state): State<AppState>) -> Result<CarFormTemplate, CarsError> {
    let manufacturers = Manufacturer::list_all(&state.pool)
        .await
        .map_err(CarsError::DatabaseError)?;

    Ok(CarFormTemplate {
        title: "New car",
        action: "/cars".to_string(),
        model: String::new(),
        manufacturer_id: None,
        manufacturers,
        errors: FieldErrors::new(),
    })
}

#[derive(Deserialize)]
struct CarForm {
    model: String,
    manufacturer: Option<i64>,
}

/// Validates the car form; the manufacturer must reference an existing row
async fn validate_car_form(state: &AppState, form: &CarForm) -> Result<FieldErrors, sqlx::Error> {
    let mut errors = FieldErrors::new();
    require(&mut errors, "model", &form.model, "Model is required");

    match form.manufacturer {
        None => errors.add("manufacturer", "Manufacturer is required"),
        Some(id) => {
            if Manufacturer::find_by_id(&state.pool, id).await?.is_none() {
                errors.add("manufacturer", "Select a valid manufacturer");
            }
        }
    }

    Ok(errors)
}

async fn render_car_form(
    state: &AppState,
    title: &'static str,
    action: String,
    form: CarForm,
    errors: FieldErrors,
) -> Result<CarFormTemplate, sqlx::Error> {
    let manufacturers = Manufacturer::list_all(&state.pool).await?;

    Ok(CarFormTemplate {
        title,
        action,
        model: form.model,
        manufacturer_id: form.manufacturer,
        manufacturers,
        errors,
    })
}

/// Create a new car
async fn create_car(
    State(state): State<AppState>,
    Form(form): Form<CarForm>,
) -> Result<Response, CarsError> {
    let errors = validate_car_form(&state, &form)
        .await
        .map_err(CarsError::DatabaseError)?;

    if !errors.is_empty() {
        let template = render_car_form(&state, "New car", "/cars".to_string(), form, errors)
            .await
            .map_err(CarsError::DatabaseError)?;
        return Ok(template.into_response());
    }

    let car = Car::create(
        &state.pool,
        CreateCarData {
            model: form.model.trim().to_string(),
            // Checked above
            manufacturer_id: form.manufacturer.unwrap_or_default(),
        },
    )
    .await
    .map_err(CarsError::DatabaseError)?;

    tracing::info!(car_id = car.id, "Created car");

    Ok(Redirect::to("/cars").into_response())
}

/// Show the pre-filled edit form
async fn edit_car_form(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<CarFormTemplate, CarsError> {
    let car = Car::find_by_id(&state.pool, id)
        .await
        .map_err(CarsError::DatabaseError)?
        .ok_or(CarsError::NotFound)?;

    let manufacturers = Manufacturer::list_all(&state.pool)
        .await
        .map_err(CarsError::DatabaseError)?;

    Ok(CarFormTemplate {
        title: "Edit car",
        action: format!("/cars/{}", id),
        model: car.model,
        manufacturer_id: Some(car.manufacturer_id),
        manufacturers,
        errors: FieldErrors::new(),
    })
}

/// Update an existing car
async fn update_car(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<CarForm>,
) -> Result<Response, CarsError> {
    Car::find_by_id(&state.pool, id)
        .await
        .map_err(CarsError::DatabaseError)?
        .ok_or(CarsError::NotFound)?;

    let errors = validate_car_form(&state, &form)
        .await
        .map_err(CarsError::DatabaseError)?;

    if !errors.is_empty() {
        let template = render_car_form(&state, "Edit car", format!("/cars/{}", id), form, errors)
            .await
            .map_err(CarsError::DatabaseError)?;
        return Ok(template.into_response());
    }

    Car::update(
        &state.pool,
        id,
        form.model.trim(),
        form.manufacturer.unwrap_or_default(),
    )
    .await
    .map_err(CarsError::DatabaseError)?;

    tracing::info!(car_id = id, "Updated car");

    Ok(Redirect::to("/cars").into_response())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cars", get(list_cars).post(create_car))
        .route("/cars/new", get(new_car_form))
        .route("/cars/:id", get(car_detail).post(update_car))
        .route("/cars/:id/edit", get(edit_car_form))
}
