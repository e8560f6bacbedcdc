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
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Writable fields. Missing JSON fields fall back to their zero value;
/// updates overwrite every field with whatever arrived.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UserInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

impl User {
    pub async fn list(db: &PgPool) -> Result<Vec<User>, sqlx::Error> {
        let rows = sqlx::query("SELECT id, name, email, created_at, updated_at FROM users")
            .fetch_all(db)
            .await?;
        // A row that fails to decode is skipped; the rest of the list is
        // still served.
        Ok(rows
            .iter()
            .filter_map(|row| match User::from_row(row) {
                Ok(user) => Some(user),
                Err(e) => {
                    warn!(error = %e, "skipping undecodable user row");
                    None
                }
            })
            .collect())
    }

    pub async fn find(db: &PgPool, id: i64) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT id, name, email, created_at, updated_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    pub async fn create(db: &PgPool, input: &UserInput) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email)
            VALUES ($1, $2)
            RETURNING id, name, email, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.email)
        .fetch_one(db)
        .await
    }

    pub async fn update(db: &PgPool, id: i64, input: &UserInput) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET name = $1, email = $2, updated_at = now()::text WHERE id = $3")
            .bind(&input.name)
            .bind(&input.email)
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }

    pub async fn delete(db: &PgPool, id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list).post(create))
        .route("/users/:id", get(get_by_id).put(update).delete(delete_by_id))
}

#[instrument(skip(state))]
async fn list(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(User::list(&state.db).await?))
}

#[instrument(skip(state))]
async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<User>, ApiError> {
    User::find(&state.db, id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("User"))
}

#[instrument(skip(state, input))]
async fn create(
    State(state): State<AppState>,
    Json(input): Json<UserInput>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = User::create(&state.db, &input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// No prior-existence check: updating an unknown id still answers 200.
#[instrument(skip(state, input))]
async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<UserInput>,
) -> Result<Json<WithId<UserInput>>, ApiError> {
    User::update(&state.db, id, &input).await?;
    Ok(Json(WithId { id, record: input }))
}

#[instrument(skip(state))]
async fn delete_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<String, ApiError> {
    User::delete(&state.db, id).await?;
    Ok(format!("User with ID {id} deleted"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn omitted_input_fields_default_to_zero_values() {
        let input: UserInput = serde_json::from_str("{}").unwrap();
        assert_eq!(input.name, "");
        assert_eq!(input.email, "");
    }
}
