mod appointments;
mod auth;
mod doctors;
mod drugs;
mod password;
mod patients;
mod transactions;
mod users;

use axum::Router;
use serde::Serialize;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(users::router())
        .merge(appointments::router())
        .merge(drugs::router())
        .merge(patients::router())
        .merge(doctors::router())
        .merge(transactions::router())
        .merge(auth::router())
}

/// Update responses echo the client's input plus the path id.
#[derive(Debug, Serialize)]
pub struct WithId<T> {
    pub id: i64,
    #[serde(flatten)]
    pub record: T,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Sample {
        name: String,
    }

    #[test]
    fn with_id_flattens_the_record() {
        let body = WithId {
            id: 7,
            record: Sample { name: "x".into() },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({ "id": 7, "name": "x" }));
    }
}
