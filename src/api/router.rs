use axum::routing::post;
use axum::Router;

use super::routes::*;
use super::AppState;

pub(super) fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/spawn", post(spawn))
        .route("/clear_scene", post(clear_scene))
        .route("/set_lighting", post(set_lighting))
        .route("/capture_vision", post(capture_vision))
        .route("/run_simulation", post(run_simulation))
        .route("/get_object_position", post(get_object_position))
        .route("/list_all_objects", post(list_all_objects))
        .fallback(invalid_endpoint)
        .method_not_allowed_fallback(invalid_endpoint)
        .with_state(state)
}
