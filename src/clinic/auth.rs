use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use tracing::{instrument, warn};

use super::password::verify_password;
use super::patients::Patient;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub nik: String,
    pub password: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

/// Unknown nik and wrong password answer the identical 401 so a caller
/// cannot enumerate registered national ids.
#[instrument(skip(state, payload))]
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Patient>, ApiError> {
    let Some(patient) = Patient::find_by_nik(&state.db, &payload.nik).await? else {
        warn!("login with unknown nik");
        return Err(ApiError::InvalidCredentials);
    };

    if !verify_password(&payload.password, &patient.password)? {
        warn!(patient_id = %patient.id, "login with wrong password");
        return Err(ApiError::InvalidCredentials);
    }

    Ok(Json(patient))
}
