//! Mock report backend — fixtures, filtering, and report generation.
//!
//! DESIGN
//! ======
//! There is no data engine behind these endpoints. Rows and templates are
//! static fixtures; "generation" validates the template id and returns the
//! filtered fixture rows tagged with the template's category. The shapes
//! mirror the group-fare request data the chat assistant talks about.

use serde::{Deserialize, Serialize};
use serde_json::json;
use time::Date;
use time::macros::format_description;

use crate::chat::types::{TableColumn, TablePayload};

// =============================================================================
// TYPES
// =============================================================================

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("unknown report template: {0}")]
    UnknownTemplate(String),
    #[error("invalid date filter: {0}")]
    InvalidDate(String),
}

/// One group-fare request row, as served by `/api/reports`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub id: String,
    pub group_id: String,
    pub group_name: String,
    pub request_type: String,
    pub trip_type: String,
    pub currency: String,
    pub requested_fare: f64,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    #[serde(default, with = "iso_date::option", skip_serializing_if = "Option::is_none")]
    pub departure_date: Option<Date>,
    #[serde(default, with = "iso_date::option", skip_serializing_if = "Option::is_none")]
    pub return_date: Option<Date>,
}

/// A report template, as served by `/api/templates`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportTemplate {
    pub id: String,
    pub name: String,
    pub description: String,
    pub fields: Vec<String>,
    pub category: String,
}

/// Row filters accepted by the report endpoints. Dates are inclusive
/// bounds on the departure date, `YYYY-MM-DD`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportFilters {
    pub currency: Option<String>,
    pub status: Option<String>,
    pub sector: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

// =============================================================================
// QUERIES
// =============================================================================

/// Filter the fixture rows.
///
/// # Errors
///
/// Returns `InvalidDate` if a date bound does not parse as `YYYY-MM-DD`.
pub fn list_reports(filters: &ReportFilters) -> Result<Vec<ReportRow>, ReportError> {
    let from = parse_date_filter(filters.date_from.as_deref())?;
    let to = parse_date_filter(filters.date_to.as_deref())?;

    Ok(fixture_rows()
        .into_iter()
        .filter(|row| {
            matches_opt(filters.currency.as_deref(), &row.currency)
                && matches_opt(filters.status.as_deref(), &row.status)
                && filters
                    .sector
                    .as_deref()
                    .is_none_or(|want| row.sector.as_deref() == Some(want))
                && from.is_none_or(|bound| row.departure_date.is_some_and(|d| d >= bound))
                && to.is_none_or(|bound| row.departure_date.is_some_and(|d| d <= bound))
        })
        .collect())
}

/// Static template fixtures.
#[must_use]
pub fn list_templates() -> Vec<ReportTemplate> {
    fixture_templates()
}

/// Generated report: validated template plus filtered rows.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedReport {
    pub template_id: String,
    pub category: String,
    pub rows: Vec<ReportRow>,
}

/// Validate the template id and return the filtered fixture rows.
///
/// # Errors
///
/// Returns `UnknownTemplate` for ids not in the registry, or
/// `InvalidDate` for malformed date bounds.
pub fn generate_report(template_id: &str, filters: &ReportFilters) -> Result<GeneratedReport, ReportError> {
    let template = fixture_templates()
        .into_iter()
        .find(|t| t.id == template_id)
        .ok_or_else(|| ReportError::UnknownTemplate(template_id.to_string()))?;

    Ok(GeneratedReport {
        template_id: template.id,
        category: template.category,
        rows: list_reports(filters)?,
    })
}

/// Tabular payload over the first `limit` fixture rows, for synthetic
/// chat replies.
#[must_use]
pub fn tabular_payload(limit: usize) -> TablePayload {
    let columns = vec![
        column("groupName", "Group"),
        column("requestType", "Request Type"),
        column("tripType", "Trip"),
        column("sector", "Sector"),
        column("currency", "Currency"),
        column("requestedFare", "Requested Fare"),
        column("status", "Status"),
    ];
    let rows = fixture_rows()
        .into_iter()
        .take(limit)
        .filter_map(|row| match serde_json::to_value(&row) {
            Ok(serde_json::Value::Object(map)) => Some(map),
            _ => None,
        })
        .collect();
    TablePayload { columns, rows }
}

fn column(key: &str, label: &str) -> TableColumn {
    TableColumn { key: key.to_string(), label: label.to_string() }
}

fn matches_opt(want: Option<&str>, have: &str) -> bool {
    want.is_none_or(|w| w.eq_ignore_ascii_case(have))
}

fn parse_date_filter(value: Option<&str>) -> Result<Option<Date>, ReportError> {
    let format = format_description!("[year]-[month]-[day]");
    value
        .map(|s| Date::parse(s, &format).map_err(|_| ReportError::InvalidDate(s.to_string())))
        .transpose()
}

// =============================================================================
// FIXTURES
// =============================================================================

fn fixture_rows() -> Vec<ReportRow> {
    let raw = json!([
        {
            "id": "RPT-1001", "groupId": "GRP-204", "groupName": "Horizon Tours",
            "requestType": "Group Fare", "tripType": "Round Trip", "currency": "USD",
            "requestedFare": 412.50, "status": "Approved", "sector": "JFK-LHR",
            "departureDate": "2024-01-18", "returnDate": "2024-01-25"
        },
        {
            "id": "RPT-1002", "groupId": "GRP-207", "groupName": "Pacific Charters",
            "requestType": "Series Fare", "tripType": "One Way", "currency": "USD",
            "requestedFare": 289.00, "status": "Pending", "sector": "LAX-NRT",
            "departureDate": "2024-01-22"
        },
        {
            "id": "RPT-1003", "groupId": "GRP-211", "groupName": "Alpine Ski Club",
            "requestType": "Group Fare", "tripType": "Round Trip", "currency": "EUR",
            "requestedFare": 356.75, "status": "Approved", "sector": "FRA-GVA",
            "departureDate": "2024-02-02", "returnDate": "2024-02-09"
        },
        {
            "id": "RPT-1004", "groupId": "GRP-215", "groupName": "Maple Leaf Events",
            "requestType": "Ad Hoc", "tripType": "Round Trip", "currency": "CAD",
            "requestedFare": 521.00, "status": "Rejected", "sector": "YYZ-MIA",
            "departureDate": "2024-02-11", "returnDate": "2024-02-15"
        },
        {
            "id": "RPT-1005", "groupId": "GRP-219", "groupName": "Delta Sigma Reunion",
            "requestType": "Group Fare", "tripType": "One Way", "currency": "USD",
            "requestedFare": 198.25, "status": "Pending", "sector": "ATL-ORD",
            "departureDate": "2024-02-20"
        },
        {
            "id": "RPT-1006", "groupId": "GRP-223", "groupName": "Sunrise Pilgrimages",
            "requestType": "Series Fare", "tripType": "Round Trip", "currency": "GBP",
            "requestedFare": 477.90, "status": "Approved", "sector": "LHR-JED",
            "departureDate": "2024-03-01", "returnDate": "2024-03-14"
        },
        {
            "id": "RPT-1007", "groupId": "GRP-228", "groupName": "Coastal Conferences",
            "requestType": "Ad Hoc", "tripType": "Round Trip", "currency": "USD",
            "requestedFare": 634.10, "status": "Pending", "sector": "SFO-BOS",
            "departureDate": "2024-03-08", "returnDate": "2024-03-12"
        },
        {
            "id": "RPT-1008", "groupId": "GRP-231", "groupName": "Northern Lights Tours",
            "requestType": "Group Fare", "tripType": "Round Trip", "currency": "EUR",
            "requestedFare": 389.40, "status": "Approved", "sector": "CDG-KEF",
            "departureDate": "2024-03-17", "returnDate": "2024-03-23"
        }
    ]);
    serde_json::from_value(raw).unwrap_or_default()
}

fn fixture_templates() -> Vec<ReportTemplate> {
    let raw = json!([
        {
            "id": "delay-analysis",
            "name": "Flight Delay Analysis",
            "description": "Delay patterns, root causes, and recommendations",
            "fields": ["sector", "departureDate", "status"],
            "category": "Operations"
        },
        {
            "id": "passenger-satisfaction",
            "name": "Passenger Satisfaction Survey",
            "description": "Customer feedback analysis by route and period",
            "fields": ["groupName", "sector", "status"],
            "category": "Customer"
        },
        {
            "id": "route-performance",
            "name": "Route Performance Metrics",
            "description": "Profitability and on-time performance by sector",
            "fields": ["sector", "currency", "requestedFare"],
            "category": "Network"
        },
        {
            "id": "fleet-utilization",
            "name": "Aircraft Utilization Report",
            "description": "Fleet efficiency metrics and recommendations",
            "fields": ["tripType", "departureDate", "returnDate"],
            "category": "Fleet"
        }
    ]);
    serde_json::from_value(raw).unwrap_or_default()
}

#[cfg(test)]
#[path = "reports_test.rs"]
mod tests;
