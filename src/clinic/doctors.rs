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

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Doctor {
    pub id: i64,
    pub user_id: i64,
    pub specialization: String,
    pub profile_photo_path: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DoctorInput {
    #[serde(default)]
    pub user_id: i64,
    #[serde(default)]
    pub specialization: String,
    #[serde(default)]
    pub profile_photo_path: String,
}

const COLUMNS: &str = "id, user_id, specialization, profile_photo_path, created_at, updated_at";

impl Doctor {
    pub async fn list(db: &PgPool) -> Result<Vec<Doctor>, sqlx::Error> {
        let rows = sqlx::query(&format!("SELECT {COLUMNS} FROM doctors"))
            .fetch_all(db)
            .await?;
        Ok(rows
            .iter()
            .filter_map(|row| match Doctor::from_row(row) {
                Ok(doctor) => Some(doctor),
                Err(e) => {
                    warn!(error = %e, "skipping undecodable doctor row");
                    None
                }
            })
            .collect())
    }

    pub async fn find(db: &PgPool, id: i64) -> Result<Option<Doctor>, sqlx::Error> {
        sqlx::query_as::<_, Doctor>(&format!("SELECT {COLUMNS} FROM doctors WHERE id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await
    }

    pub async fn create(db: &PgPool, input: &DoctorInput) -> Result<Doctor, sqlx::Error> {
        sqlx::query_as::<_, Doctor>(&format!(
            r#"
            INSERT INTO doctors (user_id, specialization, profile_photo_path)
            VALUES ($1, $2, $3)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(input.user_id)
        .bind(&input.specialization)
        .bind(&input.profile_photo_path)
        .fetch_one(db)
        .await
    }

    pub async fn update(db: &PgPool, id: i64, input: &DoctorInput) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE doctors
            SET user_id = $1, specialization = $2, profile_photo_path = $3,
                updated_at = now()::text
            WHERE id = $4
            "#,
        )
        .bind(input.user_id)
        .bind(&input.specialization)
        .bind(&input.profile_photo_path)
        .bind(id)
        .execute(db)
        .await?;
        Ok(())
    }

    pub async fn delete(db: &PgPool, id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM doctors WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/doctors", get(list).post(create))
        .route(
            "/doctors/:id",
            get(get_by_id).put(update).delete(delete_by_id),
        )
}

#[instrument(skip(state))]
async fn list(State(state): State<AppState>) -> Result<Json<Vec<Doctor>>, ApiError> {
    Ok(Json(Doctor::list(&state.db).await?))
}

#[instrument(skip(state))]
async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Doctor>, ApiError> {
    Doctor::find(&state.db, id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Doctor"))
}

#[instrument(skip(state, input))]
async fn create(
    State(state): State<AppState>,
    Json(input): Json<DoctorInput>,
) -> Result<(StatusCode, Json<Doctor>), ApiError> {
    let doctor = Doctor::create(&state.db, &input).await?;
    Ok((StatusCode::CREATED, Json(doctor)))
}

#[instrument(skip(state, input))]
async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<DoctorInput>,
) -> Result<Json<WithId<DoctorInput>>, ApiError> {
    Doctor::update(&state.db, id, &input).await?;
    Ok(Json(WithId { id, record: input }))
}

#[instrument(skip(state))]
async fn delete_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<String, ApiError> {
    Doctor::delete(&state.db, id).await?;
    Ok(format!("Doctor with ID {id} deleted"))
}
