use axum::Router;
use tower_http::trace::TraceLayer;

mod cors;
mod request_id;

pub fn wrap(router: Router) -> Router {
    router
        .layer(request_id::layer())
        .layer(TraceLayer::new_for_http())
        .layer(cors::layer())
}
