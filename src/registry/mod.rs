pub mod persons;

use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    persons::router()
}
