use axum::{extract::State, response::IntoResponse};

use super::common::success_response;
use crate::{errors::ServiceError, services::analytics::Dashboard, AppState};

/// Dashboard and financial report figures
#[utoipa::path(
    get,
    path = "/api/dashboard",
    responses(
        (status = 200, description = "Aggregated dashboard payload", body = Dashboard)
    ),
    tag = "dashboard"
)]
pub async fn get_dashboard(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let dashboard = state.services.analytics.dashboard().await?;
    Ok(success_response(dashboard))
}
