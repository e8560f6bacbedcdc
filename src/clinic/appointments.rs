use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use tracing::{instrument, warn};

use super::WithId;
use crate::error::ApiError;
use crate::state::AppState;

/// Appointment booked by a patient with a clinic user. Both ids are stored
/// verbatim and never checked against the referenced tables.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PatientAppointment {
    pub id: i64,
    pub patient_id: i64,
    pub user_id: i64,
    pub appointment_date: String,
    pub notes: String,
    pub prescription: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AppointmentInput {
    #[serde(default)]
    pub patient_id: i64,
    #[serde(default)]
    pub user_id: i64,
    #[serde(default)]
    pub appointment_date: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub prescription: String,
    #[serde(default)]
    pub status: String,
}

const COLUMNS: &str =
    "id, patient_id, user_id, appointment_date, notes, prescription, status, created_at, updated_at";

impl PatientAppointment {
    pub async fn list(db: &PgPool) -> Result<Vec<PatientAppointment>, sqlx::Error> {
        let rows = sqlx::query(&format!("SELECT {COLUMNS} FROM patient_appointments"))
            .fetch_all(db)
            .await?;
        Ok(rows
            .iter()
            .filter_map(|row| match PatientAppointment::from_row(row) {
                Ok(appointment) => Some(appointment),
                Err(e) => {
                    warn!(error = %e, "skipping undecodable appointment row");
                    None
                }
            })
            .collect())
    }

    pub async fn find(db: &PgPool, id: i64) -> Result<Option<PatientAppointment>, sqlx::Error> {
        sqlx::query_as::<_, PatientAppointment>(&format!(
            "SELECT {COLUMNS} FROM patient_appointments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await
    }

    pub async fn create(
        db: &PgPool,
        input: &AppointmentInput,
    ) -> Result<PatientAppointment, sqlx::Error> {
        sqlx::query_as::<_, PatientAppointment>(&format!(
            r#"
            INSERT INTO patient_appointments
                (patient_id, user_id, appointment_date, notes, prescription, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(input.patient_id)
        .bind(input.user_id)
        .bind(&input.appointment_date)
        .bind(&input.notes)
        .bind(&input.prescription)
        .bind(&input.status)
        .fetch_one(db)
        .await
    }

    pub async fn update(
        db: &PgPool,
        id: i64,
        input: &AppointmentInput,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE patient_appointments
            SET patient_id = $1, user_id = $2, appointment_date = $3,
                notes = $4, prescription = $5, status = $6, updated_at = now()::text
            WHERE id = $7
            "#,
        )
        .bind(input.patient_id)
        .bind(input.user_id)
        .bind(&input.appointment_date)
        .bind(&input.notes)
        .bind(&input.prescription)
        .bind(&input.status)
        .bind(id)
        .execute(db)
        .await?;
        Ok(())
    }

    pub async fn delete(db: &PgPool, id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM patient_appointments WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/appointments", get(list).post(create))
        .route(
            "/appointments/:id",
            get(get_by_id).put(update).delete(delete_by_id),
        )
}

#[instrument(skip(state))]
async fn list(State(state): State<AppState>) -> Result<Json<Vec<PatientAppointment>>, ApiError> {
    Ok(Json(PatientAppointment::list(&state.db).await?))
}

#[instrument(skip(state))]
async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PatientAppointment>, ApiError> {
    PatientAppointment::find(&state.db, id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Appointment"))
}

#[instrument(skip(state, input))]
async fn create(
    State(state): State<AppState>,
    Json(input): Json<AppointmentInput>,
) -> Result<(StatusCode, Json<PatientAppointment>), ApiError> {
    let appointment = PatientAppointment::create(&state.db, &input).await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

#[instrument(skip(state, input))]
async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<AppointmentInput>,
) -> Result<Json<WithId<AppointmentInput>>, ApiError> {
    PatientAppointment::update(&state.db, id, &input).await?;
    Ok(Json(WithId { id, record: input }))
}

#[instrument(skip(state))]
async fn delete_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<String, ApiError> {
    PatientAppointment::delete(&state.db, id).await?;
    Ok(format!("Appointment with ID {id} deleted"))
}
