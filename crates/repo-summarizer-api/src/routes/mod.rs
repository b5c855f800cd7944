use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

mod health;
mod summarize;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(health::healthz))
        .route("/summarize", post(summarize::summarize))
}
