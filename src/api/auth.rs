use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::api::middleware::session::{AppState, SESSION_KEY_DRIVER_ID};
use crate::models::driver::Driver;
use crate::services::password;

#[derive(Debug)]
pub enum AuthError {
    DatabaseError(sqlx::Error),
    SessionError(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::DatabaseError(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", e),
            ),
            AuthError::SessionError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Session error: {}", msg),
            ),
        };

        (status, message).into_response()
    }
}

#[derive(Template)]
#[template(path = "home.html")]
struct HomeTemplate {
    logged_in: bool,
}

#[derive(Template)]
#[template(path = "auth/login.html")]
struct LoginTemplate {
    username: String,
    error: Option<String>,
}

/// Shows the home page
async fn home_page(session: Session) -> Result<HomeTemplate, AuthError> {
    let driver_id: Option<i64> = session
        .get(SESSION_KEY_DRIVER_ID)
        .await
        .map_err(|e| AuthError::SessionError(e.to_string()))?;

    Ok(HomeTemplate {
        logged_in: driver_id.is_some(),
    })
}

/// Shows the login form
async fn login_form() -> LoginTemplate {
    LoginTemplate {
        username: String::new(),
        error: None,
    }
}

#[derive(Deserialize)]
struct LoginForm {
    username: String,
    password: String,
}

/// Authenticates a driver by username and password
async fn login_submit(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AuthError> {
    let driver = Driver::find_by_username(&state.pool, &form.username)
        .await
        .map_err(AuthError::DatabaseError)?;

    let verified = driver
        .as_ref()
        .map(|d| password::verify_password(&form.password, &d.password_hash))
        .unwrap_or(false);

    let Some(driver) = driver.filter(|_| verified) else {
        tracing::info!(username = %form.username, "Failed login attempt");

        return Ok(LoginTemplate {
            username: form.username,
            error: Some("Invalid username or password".to_string()),
        }
        .into_response());
    };

    session
        .insert(SESSION_KEY_DRIVER_ID, driver.id)
        .await
        .map_err(|e| AuthError::SessionError(e.to_string()))?;

    tracing::info!(driver_id = driver.id, username = %driver.username, "Driver logged in");

    Ok(Redirect::to("/").into_response())
}

/// Logs out the current driver
async fn logout(session: Session) -> Result<Redirect, AuthError> {
    session
        .flush()
        .await
        .map_err(|e| AuthError::SessionError(e.to_string()))?;

    Ok(Redirect::to("/login"))
}

/// Creates the auth router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(home_page))
        .route("/login", get(login_form).post(login_submit))
        .route("/logout", get(logout))
}
