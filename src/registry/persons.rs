use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use tracing::instrument;

use crate::error::ApiError;
use crate::state::AppState;

/// The id is client-chosen; uniqueness is enforced only by the primary-key
/// constraint and a violation surfaces as a generic 500.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Person {
    pub id: String,
    pub full_name: String,
    pub age: i32,
}

impl Person {
    pub async fn list(db: &PgPool) -> Result<Vec<Person>, sqlx::Error> {
        sqlx::query_as::<_, Person>("SELECT id, full_name, age FROM persons")
            .fetch_all(db)
            .await
    }

    pub async fn find(db: &PgPool, id: &str) -> Result<Option<Person>, sqlx::Error> {
        sqlx::query_as::<_, Person>("SELECT id, full_name, age FROM persons WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await
    }

    /// Shared by the Create handler and the startup one-shot insert.
    pub async fn insert(db: &PgPool, person: &Person) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO persons (id, full_name, age) VALUES ($1, $2, $3)")
            .bind(&person.id)
            .bind(&person.full_name)
            .bind(person.age)
            .execute(db)
            .await?;
        Ok(())
    }

    pub async fn delete(db: &PgPool, id: &str) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM persons WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }
}

/// Lexicographic ascending order by id, applied in memory after the fetch.
pub fn sort_by_id(persons: &mut [Person]) {
    persons.sort_by(|a, b| a.id.cmp(&b.id));
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/persons", get(list).post(create))
        .route("/persons/:id", get(get_by_id).delete(delete_by_id))
}

#[instrument(skip(state))]
async fn list(State(state): State<AppState>) -> Result<Json<Vec<Person>>, ApiError> {
    let mut persons = Person::list(&state.db).await?;
    sort_by_id(&mut persons);
    Ok(Json(persons))
}

#[instrument(skip(state))]
async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Person>, ApiError> {
    Person::find(&state.db, &id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Person"))
}

#[instrument(skip(state, person))]
async fn create(
    State(state): State<AppState>,
    Json(person): Json<Person>,
) -> Result<(StatusCode, Json<Person>), ApiError> {
    Person::insert(&state.db, &person).await?;
    Ok((StatusCode::CREATED, Json(person)))
}

#[instrument(skip(state))]
async fn delete_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    Person::delete(&state.db, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(id: &str) -> Person {
        Person {
            id: id.into(),
            full_name: format!("person {id}"),
            age: 30,
        }
    }

    #[test]
    fn list_order_is_ascending_by_id_regardless_of_insertion_order() {
        let mut persons = vec![person("b"), person("a"), person("c")];
        sort_by_id(&mut persons);
        let ids: Vec<&str> = persons.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn ordering_is_lexicographic_not_numeric() {
        let mut persons = vec![person("10"), person("2"), person("1")];
        sort_by_id(&mut persons);
        let ids: Vec<&str> = persons.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["1", "10", "2"]);
    }

    #[test]
    fn person_requires_a_client_supplied_id() {
        let err = serde_json::from_str::<Person>(r#"{"full_name":"x","age":1}"#).unwrap_err();
        assert!(err.to_string().contains("id"));
    }
}
