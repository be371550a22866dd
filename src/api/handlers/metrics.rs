use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use metrics::gauge;

use crate::AppState;

pub async fn render(State(state): State<AppState>) -> impl IntoResponse {
    gauge!("active_sessions").set(state.sessions.len().await as f64);
    let body = state.metrics_handle.render();
    ([(CONTENT_TYPE, "text/plain; version=0.0.4")], body)
}
