use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use tracing::{instrument, warn};

use super::password::hash_password;
use super::WithId;
use crate::error::ApiError;
use crate::state::AppState;

/// The password column holds an argon2 hash, never the plaintext. The
/// stored value still appears in responses so the payload shape stays
/// compatible with existing clients.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Patient {
    pub id: i64,
    pub nik: String,
    pub name: String,
    pub gender: String,
    pub date_of_birth: String,
    pub address: String,
    pub password: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PatientInput {
    #[serde(default)]
    pub nik: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub date_of_birth: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub password: String,
}

const COLUMNS: &str =
    "id, nik, name, gender, date_of_birth, address, password, created_at, updated_at";

impl Patient {
    pub async fn list(db: &PgPool) -> Result<Vec<Patient>, sqlx::Error> {
        let rows = sqlx::query(&format!("SELECT {COLUMNS} FROM patients"))
            .fetch_all(db)
            .await?;
        Ok(rows
            .iter()
            .filter_map(|row| match Patient::from_row(row) {
                Ok(patient) => Some(patient),
                Err(e) => {
                    warn!(error = %e, "skipping undecodable patient row");
                    None
                }
            })
            .collect())
    }

    pub async fn find(db: &PgPool, id: i64) -> Result<Option<Patient>, sqlx::Error> {
        sqlx::query_as::<_, Patient>(&format!("SELECT {COLUMNS} FROM patients WHERE id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await
    }

    pub async fn find_by_nik(db: &PgPool, nik: &str) -> Result<Option<Patient>, sqlx::Error> {
        sqlx::query_as::<_, Patient>(&format!("SELECT {COLUMNS} FROM patients WHERE nik = $1"))
            .bind(nik)
            .fetch_optional(db)
            .await
    }

    /// `password_hash` must already be hashed by the caller.
    pub async fn create(
        db: &PgPool,
        input: &PatientInput,
        password_hash: &str,
    ) -> Result<Patient, sqlx::Error> {
        sqlx::query_as::<_, Patient>(&format!(
            r#"
            INSERT INTO patients (nik, name, gender, date_of_birth, address, password)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(&input.nik)
        .bind(&input.name)
        .bind(&input.gender)
        .bind(&input.date_of_birth)
        .bind(&input.address)
        .bind(password_hash)
        .fetch_one(db)
        .await
    }

    pub async fn update(
        db: &PgPool,
        id: i64,
        input: &PatientInput,
        password_hash: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE patients
            SET nik = $1, name = $2, gender = $3, date_of_birth = $4,
                address = $5, password = $6, updated_at = now()::text
            WHERE id = $7
            "#,
        )
        .bind(&input.nik)
        .bind(&input.name)
        .bind(&input.gender)
        .bind(&input.date_of_birth)
        .bind(&input.address)
        .bind(password_hash)
        .bind(id)
        .execute(db)
        .await?;
        Ok(())
    }

    pub async fn delete(db: &PgPool, id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM patients WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/patients", get(list).post(create))
        .route(
            "/patients/:id",
            get(get_by_id).put(update).delete(delete_by_id),
        )
}

#[instrument(skip(state))]
async fn list(State(state): State<AppState>) -> Result<Json<Vec<Patient>>, ApiError> {
    Ok(Json(Patient::list(&state.db).await?))
}

#[instrument(skip(state))]
async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Patient>, ApiError> {
    Patient::find(&state.db, id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Patient"))
}

#[instrument(skip(state, input))]
async fn create(
    State(state): State<AppState>,
    Json(input): Json<PatientInput>,
) -> Result<(StatusCode, Json<Patient>), ApiError> {
    let hash = hash_password(&input.password)?;
    let patient = Patient::create(&state.db, &input, &hash).await?;
    Ok((StatusCode::CREATED, Json(patient)))
}

#[instrument(skip(state, input))]
async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<PatientInput>,
) -> Result<Json<WithId<PatientInput>>, ApiError> {
    let hash = hash_password(&input.password)?;
    Patient::update(&state.db, id, &input, &hash).await?;
    Ok(Json(WithId { id, record: input }))
}

#[instrument(skip(state))]
async fn delete_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<String, ApiError> {
    Patient::delete(&state.db, id).await?;
    Ok(format!("Patient with ID {id} deleted"))
}
