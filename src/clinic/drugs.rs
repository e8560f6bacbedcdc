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
pub struct Drug {
    pub id: i64,
    pub name: String,
    // "type" is the wire name; the column stays drug_type.
    #[serde(rename = "type")]
    pub drug_type: String,
    pub description: String,
    pub composition: String,
    pub packaging: String,
    pub dosage: String,
    pub contraindications: String,
    pub side_effects: String,
    pub price: f64,
    pub currency: String,
    pub expiration_date: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DrugInput {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub drug_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub composition: String,
    #[serde(default)]
    pub packaging: String,
    #[serde(default)]
    pub dosage: String,
    #[serde(default)]
    pub contraindications: String,
    #[serde(default)]
    pub side_effects: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub expiration_date: String,
}

const COLUMNS: &str = "id, name, drug_type, description, composition, packaging, dosage, \
     contraindications, side_effects, price, currency, expiration_date, created_at, updated_at";

impl Drug {
    pub async fn list(db: &PgPool) -> Result<Vec<Drug>, sqlx::Error> {
        let rows = sqlx::query(&format!("SELECT {COLUMNS} FROM drugs"))
            .fetch_all(db)
            .await?;
        Ok(rows
            .iter()
            .filter_map(|row| match Drug::from_row(row) {
                Ok(drug) => Some(drug),
                Err(e) => {
                    warn!(error = %e, "skipping undecodable drug row");
                    None
                }
            })
            .collect())
    }

    pub async fn find(db: &PgPool, id: i64) -> Result<Option<Drug>, sqlx::Error> {
        sqlx::query_as::<_, Drug>(&format!("SELECT {COLUMNS} FROM drugs WHERE id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await
    }

    pub async fn create(db: &PgPool, input: &DrugInput) -> Result<Drug, sqlx::Error> {
        sqlx::query_as::<_, Drug>(&format!(
            r#"
            INSERT INTO drugs
                (name, drug_type, description, composition, packaging, dosage,
                 contraindications, side_effects, price, currency, expiration_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(&input.name)
        .bind(&input.drug_type)
        .bind(&input.description)
        .bind(&input.composition)
        .bind(&input.packaging)
        .bind(&input.dosage)
        .bind(&input.contraindications)
        .bind(&input.side_effects)
        .bind(input.price)
        .bind(&input.currency)
        .bind(&input.expiration_date)
        .fetch_one(db)
        .await
    }

    pub async fn update(db: &PgPool, id: i64, input: &DrugInput) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE drugs
            SET name = $1, drug_type = $2, description = $3, composition = $4,
                packaging = $5, dosage = $6, contraindications = $7, side_effects = $8,
                price = $9, currency = $10, expiration_date = $11, updated_at = now()::text
            WHERE id = $12
            "#,
        )
        .bind(&input.name)
        .bind(&input.drug_type)
        .bind(&input.description)
        .bind(&input.composition)
        .bind(&input.packaging)
        .bind(&input.dosage)
        .bind(&input.contraindications)
        .bind(&input.side_effects)
        .bind(input.price)
        .bind(&input.currency)
        .bind(&input.expiration_date)
        .bind(id)
        .execute(db)
        .await?;
        Ok(())
    }

    pub async fn delete(db: &PgPool, id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM drugs WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/drugs", get(list).post(create))
        .route("/drugs/:id", get(get_by_id).put(update).delete(delete_by_id))
}

#[instrument(skip(state))]
async fn list(State(state): State<AppState>) -> Result<Json<Vec<Drug>>, ApiError> {
    Ok(Json(Drug::list(&state.db).await?))
}

#[instrument(skip(state))]
async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Drug>, ApiError> {
    Drug::find(&state.db, id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Drug"))
}

#[instrument(skip(state, input))]
async fn create(
    State(state): State<AppState>,
    Json(input): Json<DrugInput>,
) -> Result<(StatusCode, Json<Drug>), ApiError> {
    let drug = Drug::create(&state.db, &input).await?;
    Ok((StatusCode::CREATED, Json(drug)))
}

#[instrument(skip(state, input))]
async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<DrugInput>,
) -> Result<Json<WithId<DrugInput>>, ApiError> {
    Drug::update(&state.db, id, &input).await?;
    Ok(Json(WithId { id, record: input }))
}

#[instrument(skip(state))]
async fn delete_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<String, ApiError> {
    Drug::delete(&state.db, id).await?;
    Ok(format!("Drug with ID {id} deleted"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drug_type_uses_the_type_wire_name() {
        let input: DrugInput =
            serde_json::from_str(r#"{"name":"Aspirin","type":"analgesic"}"#).unwrap();
        assert_eq!(input.drug_type, "analgesic");
        assert_eq!(input.price, 0.0);
    }
}
