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

// total_price is stored as supplied; it is never recomputed from
// quantity and the drug's price.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Transaction {
    pub id: i64,
    pub patient_id: i64,
    pub drug_id: i64,
    pub quantity: f64,
    pub total_price: f64,
    pub currency: String,
    pub prescription: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TransactionInput {
    #[serde(default)]
    pub patient_id: i64,
    #[serde(default)]
    pub drug_id: i64,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default)]
    pub total_price: f64,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub prescription: String,
}

const COLUMNS: &str =
    "id, patient_id, drug_id, quantity, total_price, currency, prescription, created_at, updated_at";

impl Transaction {
    pub async fn list(db: &PgPool) -> Result<Vec<Transaction>, sqlx::Error> {
        let rows = sqlx::query(&format!("SELECT {COLUMNS} FROM transactions"))
            .fetch_all(db)
            .await?;
        Ok(rows
            .iter()
            .filter_map(|row| match Transaction::from_row(row) {
                Ok(transaction) => Some(transaction),
                Err(e) => {
                    warn!(error = %e, "skipping undecodable transaction row");
                    None
                }
            })
            .collect())
    }

    pub async fn find(db: &PgPool, id: i64) -> Result<Option<Transaction>, sqlx::Error> {
        sqlx::query_as::<_, Transaction>(&format!(
            "SELECT {COLUMNS} FROM transactions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await
    }

    pub async fn create(db: &PgPool, input: &TransactionInput) -> Result<Transaction, sqlx::Error> {
        sqlx::query_as::<_, Transaction>(&format!(
            r#"
            INSERT INTO transactions
                (patient_id, drug_id, quantity, total_price, currency, prescription)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(input.patient_id)
        .bind(input.drug_id)
        .bind(input.quantity)
        .bind(input.total_price)
        .bind(&input.currency)
        .bind(&input.prescription)
        .fetch_one(db)
        .await
    }

    pub async fn update(
        db: &PgPool,
        id: i64,
        input: &TransactionInput,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE transactions
            SET patient_id = $1, drug_id = $2, quantity = $3, total_price = $4,
                currency = $5, prescription = $6, updated_at = now()::text
            WHERE id = $7
            "#,
        )
        .bind(input.patient_id)
        .bind(input.drug_id)
        .bind(input.quantity)
        .bind(input.total_price)
        .bind(&input.currency)
        .bind(&input.prescription)
        .bind(id)
        .execute(db)
        .await?;
        Ok(())
    }

    pub async fn delete(db: &PgPool, id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM transactions WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/transactions", get(list).post(create))
        .route(
            "/transactions/:id",
            get(get_by_id).put(update).delete(delete_by_id),
        )
}

#[instrument(skip(state))]
async fn list(State(state): State<AppState>) -> Result<Json<Vec<Transaction>>, ApiError> {
    Ok(Json(Transaction::list(&state.db).await?))
}

#[instrument(skip(state))]
async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Transaction>, ApiError> {
    Transaction::find(&state.db, id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Transaction"))
}

#[instrument(skip(state, input))]
async fn create(
    State(state): State<AppState>,
    Json(input): Json<TransactionInput>,
) -> Result<(StatusCode, Json<Transaction>), ApiError> {
    let transaction = Transaction::create(&state.db, &input).await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

#[instrument(skip(state, input))]
async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<TransactionInput>,
) -> Result<Json<WithId<TransactionInput>>, ApiError> {
    Transaction::update(&state.db, id, &input).await?;
    Ok(Json(WithId { id, record: input }))
}

#[instrument(skip(state))]
async fn delete_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<String, ApiError> {
    Transaction::delete(&state.db, id).await?;
    Ok(format!("Transaction with ID {id} deleted"))
}
