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
use crate::models::manufacturer::{CreateManufacturerData, Manufacturer};
use crate::services::pagination::Pager;
use crate::services::validation::{require, FieldErrors};

#[derive(Debug)]
pub enum ManufacturersError {
    DatabaseError(sqlx::Error),
    NotFound,
}

impl IntoResponse for ManufacturersError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ManufacturersError::DatabaseError(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", e),
            ),
            ManufacturersError::NotFound => {
                (StatusCode::NOT_FOUND, "Manufacturer not found".to_string())
            }
        };

        (status, message).into_response()
    }
}

// Template structures
#[derive(Template)]
#[template(path = "manufacturers/list.html")]
struct ManufacturerListTemplate {
    manufacturers: Vec<Manufacturer>,
    pager: Pager,
    query: String,
}

#[derive(Template)]
#[template(path = "manufacturers/detail.html")]
struct ManufacturerDetailTemplate {
    manufacturer: Manufacturer,
}

#[derive(Template)]
#[template(path = "manufacturers/form.html")]
struct ManufacturerFormTemplate {
    title: &'static str,
    action: String,
    name: String,
    country: String,
    errors: FieldErrors,
}

#[derive(Deserialize)]
struct ListQuery {
    name: Option<String>,
    page: Option<i64>,
}

/// List manufacturers, optionally filtered by name, five per page
async fn list_manufacturers(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<ManufacturerListTemplate, ManufacturersError> {
    let filter = query.name.as_deref();

    let total = Manufacturer::count_matching(&state.pool, filter)
        .await
        .map_err(ManufacturersError::DatabaseError)?;

    let pager = Pager::new(query.page, total);

    let manufacturers = Manufacturer::search(&state.pool, filter, pager.limit(), pager.offset())
        .await
        .map_err(ManufacturersError::DatabaseError)?;

    Ok(ManufacturerListTemplate {
        manufacturers,
        pager,
        query: query.name.unwrap_or_default(),
    })
}

/// Show a single manufacturer
async fn manufacturer_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ManufacturerDetailTemplate, ManufacturersError> {
    let manufacturer = Manufacturer::find_by_id(&state.pool, id)
        .await
        .map_err(ManufacturersError::DatabaseError)?
        .ok_or(ManufacturersError::NotFound)?;

    Ok(ManufacturerDetailTemplate { manufacturer })
}

/// Show the blank create form
async fn new_manufacturer_form() -> ManufacturerFormTemplate {
    ManufacturerFormTemplate {
        title: "New manufacturer",
        action: "/manufacturers".to_string(),
        name: String::new(),
        country: String::new(),
        errors: FieldErrors::new(),
    }
}

#[derive(Deserialize)]
struct ManufacturerForm {
    name: String,
    country: String,
}

fn validate_manufacturer_form(form: &ManufacturerForm) -> FieldErrors {
    let mut errors = FieldErrors::new();
    require(&mut errors, "name", &form.name, "Name is required");
    require(&mut errors, "country", &form.country, "Country is required");
    errors
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// Create a new manufacturer
async fn create_manufacturer(
    State(state): State<AppState>,
    Form(form): Form<ManufacturerForm>,
) -> Result<Response, ManufacturersError> {
    let mut errors = validate_manufacturer_form(&form);

    if errors.is_empty() {
        match Manufacturer::create(
            &state.pool,
            CreateManufacturerData {
                name: form.name.trim().to_string(),
                country: form.country.trim().to_string(),
            },
        )
        .await
        {
            Ok(manufacturer) => {
                tracing::info!(manufacturer_id = manufacturer.id, "Created manufacturer");
                return Ok(Redirect::to("/manufacturers").into_response());
            }
            Err(e) if is_unique_violation(&e) => {
                errors.add("name", "A manufacturer with this name already exists");
            }
            Err(e) => return Err(ManufacturersError::DatabaseError(e)),
        }
    }

    Ok(ManufacturerFormTemplate {
        title: "New manufacturer",
        action: "/manufacturers".to_string(),
        name: form.name,
        country: form.country,
        errors,
    }
    .into_response())
}

/// Show the pre-filled edit form
async fn edit_manufacturer_form(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ManufacturerFormTemplate, ManufacturersError> {
    let manufacturer = Manufacturer::find_by_id(&state.pool, id)
        .await
        .map_err(ManufacturersError::DatabaseError)?
        .ok_or(ManufacturersError::NotFound)?;

    Ok(ManufacturerFormTemplate {
        title: "Edit manufacturer",
        action: format!("/manufacturers/{}", id),
        name: manufacturer.name,
        country: manufacturer.country,
        errors: FieldErrors::new(),
    })
}

/// Update an existing manufacturer
async fn update_manufacturer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<ManufacturerForm>,
) -> Result<Response, ManufacturersError> {
    Manufacturer::find_by_id(&state.pool, id)
        .await
        .map_err(ManufacturersError::DatabaseError)?
        .ok_or(ManufacturersError::NotFound)?;

    let mut errors = validate_manufacturer_form(&form);

    if errors.is_empty() {
        match Manufacturer::update(&state.pool, id, form.name.trim(), form.country.trim()).await {
            Ok(()) => {
                tracing::info!(manufacturer_id = id, "Updated manufacturer");
                return Ok(Redirect::to("/manufacturers").into_response());
            }
            Err(e) if is_unique_violation(&e) => {
                errors.add("name", "A manufacturer with this name already exists");
            }
            Err(e) => return Err(ManufacturersError::DatabaseError(e)),
        }
    }

    Ok(ManufacturerFormTemplate {
        title: "Edit manufacturer",
        action: format!("/manufacturers/{}", id),
        name: form.name,
        country: form.country,
        errors,
    }
    .into_response())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/manufacturers",
            get(list_manufacturers).post(create_manufacturer),
        )
        .route("/manufacturers/new", get(new_manufacturer_form))
        .route(
            "/manufacturers/:id",
            get(manufacturer_detail).post(update_manufacturer),
        )
        .route("/manufacturers/:id/edit", get(edit_manufacturer_form))
}
