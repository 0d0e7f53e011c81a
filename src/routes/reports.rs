//! Mock report endpoints.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;

use crate::services::reports::{self, GeneratedReport, ReportError, ReportFilters, ReportRow, ReportTemplate};
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateReportBody {
    pub template_id: String,
    #[serde(default)]
    pub filters: ReportFilters,
}

/// `GET /api/reports` — filtered fixture rows.
pub async fn list_reports(
    State(_state): State<AppState>,
    Query(filters): Query<ReportFilters>,
) -> Result<Json<Vec<ReportRow>>, StatusCode> {
    let rows = reports::list_reports(&filters).map_err(report_error_to_status)?;
    Ok(Json(rows))
}

/// `GET /api/templates` — static template fixtures.
pub async fn list_templates(State(_state): State<AppState>) -> Json<Vec<ReportTemplate>> {
    Json(reports::list_templates())
}

/// `POST /api/generate-report` — validate the template and return rows.
pub async fn generate_report(
    State(_state): State<AppState>,
    Json(body): Json<GenerateReportBody>,
) -> Result<Json<GeneratedReport>, StatusCode> {
    let report =
        reports::generate_report(&body.template_id, &body.filters).map_err(report_error_to_status)?;
    Ok(Json(report))
}

pub(crate) fn report_error_to_status(err: ReportError) -> StatusCode {
    match err {
        ReportError::UnknownTemplate(_) => StatusCode::NOT_FOUND,
        ReportError::InvalidDate(_) => StatusCode::BAD_REQUEST,
    }
}
