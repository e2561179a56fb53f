use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use tracing::{error, info, instrument};

use super::dto::{PlannerDocument, UpdatePlannerResponse};
use crate::state::AppState;

/// GET/POST only; axum answers every other method with a bare 405.
pub fn planner_routes() -> Router<AppState> {
    Router::new().route("/api/tripPlanner", get(get_planner).post(update_planner))
}

#[instrument(skip(state))]
pub async fn get_planner(
    State(state): State<AppState>,
) -> Result<Json<PlannerDocument>, (StatusCode, String)> {
    let doc = state.planner.find_one().await.map_err(|e| {
        error!(error = %e, "load planner document failed");
        internal(e)
    })?;
    Ok(Json(doc.unwrap_or_default()))
}

/// Replaces the whole document. Last writer wins.
#[instrument(skip(state, body))]
pub async fn update_planner(
    State(state): State<AppState>,
    Json(body): Json<PlannerDocument>,
) -> Result<Json<UpdatePlannerResponse>, (StatusCode, String)> {
    state.planner.replace(body).await.map_err(|e| {
        error!(error = %e, "replace planner document failed");
        internal(e)
    })?;
    info!("planner document replaced");
    Ok(Json(UpdatePlannerResponse::updated()))
}

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
