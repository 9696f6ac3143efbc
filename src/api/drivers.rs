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
use crate::models::driver::{CreateDriverData, Driver};
use crate::services::pagination::Pager;
use crate::services::password;
use crate::services::validation::{require, validate_license_number, FieldErrors};

#[derive(Debug)]
pub enum DriversError {
    DatabaseError(sqlx::Error),
    NotFound,
    PasswordError(String),
}

impl IntoResponse for DriversError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            DriversError::DatabaseError(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", e),
            ),
            DriversError::NotFound => (StatusCode::NOT_FOUND, "Driver not found".to_string()),
            DriversError::PasswordError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Password hashing error: {}", msg),
            ),
        };

        (status, message).into_response()
    }
}

// Template structures
#[derive(Template)]
#[template(path = "drivers/list.html")]
struct DriverListTemplate {
    drivers: Vec<Driver>,
    pager: Pager,
}

#[derive(Template)]
#[template(path = "drivers/detail.html")]
struct DriverDetailTemplate {
    driver: Driver,
}

#[derive(Template)]
#[template(path = "drivers/form.html")]
struct DriverFormTemplate {
    username: String,
    first_name: String,
    last_name: String,
    license_number: String,
    errors: FieldErrors,
}

#[derive(Template)]
#[template(path = "drivers/license_form.html")]
struct LicenseFormTemplate {
    driver_id: i64,
    username: String,
    license_number: String,
    errors: FieldErrors,
}

#[derive(Deserialize)]
struct ListQuery {
    page: Option<i64>,
}

/// List drivers, five per page
async fn list_drivers(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<DriverListTemplate, DriversError> {
    let total = Driver::count(&state.pool)
        .await
        .map_err(DriversError::DatabaseError)?;

    let pager = Pager::new(query.page, total);

    let drivers = Driver::list(&state.pool, pager.limit(), pager.offset())
        .await
        .map_err(DriversError::DatabaseError)?;

    Ok(DriverListTemplate { drivers, pager })
}

/// Show a single driver
async fn driver_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<DriverDetailTemplate, DriversError> {
    let driver = Driver::find_by_id(&state.pool, id)
        .await
        .map_err(DriversError::DatabaseError)?
        .ok_or(DriversError::NotFound)?;

    Ok(DriverDetailTemplate { driver })
}

/// Show the blank create form
async fn new_driver_form() -> DriverFormTemplate {
    DriverFormTemplate {
        username: String::new(),
        first_name: String::new(),
        last_name: String::new(),
        license_number: String::new(),
        errors: FieldErrors::new(),
    }
}

#[derive(Deserialize)]
struct NewDriverForm {
    username: String,
    password1: String,
    password2: String,
    first_name: String,
    last_name: String,
    license_number: String,
}

/// Create a new driver. All field validators run and every failure is
/// collected before the form is rejected.
async fn create_driver(
    State(state): State<AppState>,
    Form(form): Form<NewDriverForm>,
) -> Result<Response, DriversError> {
    let mut errors = FieldErrors::new();

    require(&mut errors, "username", &form.username, "Username is required");
    require(&mut errors, "password1", &form.password1, "Password is required");

    if form.password1 != form.password2 {
        errors.add("password2", "The two password fields didn't match");
    }

    if let Err(msg) = validate_license_number(&form.license_number) {
        errors.add("license_number", msg);
    }

    if !form.username.trim().is_empty() {
        let taken = Driver::find_by_username(&state.pool, form.username.trim())
            .await
            .map_err(DriversError::DatabaseError)?
            .is_some();
        if taken {
            errors.add("username", "A driver with that username already exists");
        }
    }

    if !errors.is_empty() {
        return Ok(DriverFormTemplate {
            username: form.username,
            first_name: form.first_name,
            last_name: form.last_name,
            license_number: form.license_number,
            errors,
        }
        .into_response());
    }

    let password_hash = password::hash_password(&form.password1)
        .map_err(|e| DriversError::PasswordError(e.to_string()))?;

    let driver = Driver::create(
        &state.pool,
        CreateDriverData {
            username: form.username.trim().to_string(),
            password_hash,
            first_name: form.first_name.trim().to_string(),
            last_name: form.last_name.trim().to_string(),
            license_number: form.license_number,
        },
    )
    .await
    .map_err(DriversError::DatabaseError)?;

    tracing::info!(driver_id = driver.id, username = %driver.username, "Created driver");

    Ok(Redirect::to("/drivers").into_response())
}

/// Show the license update form
async fn edit_license_form(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<LicenseFormTemplate, DriversError> {
    let driver = Driver::find_by_id(&state.pool, id)
        .await
        .map_err(DriversError::DatabaseError)?
        .ok_or(DriversError::NotFound)?;

    Ok(LicenseFormTemplate {
        driver_id: driver.id,
        username: driver.username,
        license_number: driver.license_number,
        errors: FieldErrors::new(),
    })
}

#[derive(Deserialize)]
struct LicenseForm {
    license_number: String,
}

/// Update a driver's license number
async fn update_license(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<LicenseForm>,
) -> Result<Response, DriversError> {
    let driver = Driver::find_by_id(&state.pool, id)
        .await
        .map_err(DriversError::DatabaseError)?
        .ok_or(DriversError::NotFound)?;

    if let Err(msg) = validate_license_number(&form.license_number) {
        let mut errors = FieldErrors::new();
        errors.add("license_number", msg);

        return Ok(LicenseFormTemplate {
            driver_id: driver.id,
            username: driver.username,
            license_number: form.license_number,
            errors,
        }
        .into_response());
    }

    Driver::update_license(&state.pool, id, &form.license_number)
        .await
        .map_err(DriversError::DatabaseError)?;

    tracing::info!(driver_id = id, "Updated driver license");

    Ok(Redirect::to(&format!("/drivers/{}", id)).into_response())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/drivers", get(list_drivers).post(create_driver))
        .route("/drivers/new", get(new_driver_form))
        .route("/drivers/:id", get(driver_detail))
        .route("/drivers/:id/license/edit", get(edit_license_form))
        .route("/drivers/:id/license", axum::routing::post(update_license))
}
