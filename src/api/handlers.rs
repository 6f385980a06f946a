//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use chrono::NaiveDate;

use super::AppState;
use super::types::{ErrorResponse, RecordsQuery};
use crate::dataset::DailyRecord;
use crate::sites::{Site, SiteType};
use crate::summary::SummaryDocument;

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(error: String) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse { error }))
}

/// `GET /summary` -> 200 + `SummaryDocument` JSON
pub async fn get_summary(State(state): State<Arc<AppState>>) -> Json<SummaryDocument> {
    Json(state.summary.clone())
}

/// `GET /sites` -> 200 + registry JSON, in registry order
pub async fn get_sites(State(state): State<Arc<AppState>>) -> Json<Vec<Site>> {
    Json(state.dataset.registry().list_sites().to_vec())
}

/// Returns dataset rows matching every supplied filter.
///
/// `GET /records` -> every row
/// `GET /records?site_type=wind&from=2023-01-01&to=2023-01-31` -> filtered
/// `GET /records?from=2023-02-01&to=2023-01-01` -> 400 + `ErrorResponse`
/// `GET /records?site_type=hydro` -> 400 + `ErrorResponse`
pub async fn get_records(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RecordsQuery>,
) -> Result<Json<Vec<DailyRecord>>, ApiError> {
    let site_type = query
        .site_type
        .as_deref()
        .map(str::parse::<SiteType>)
        .transpose()
        .map_err(|e| bad_request(e.to_string()))?;
    let from = parse_date("from", query.from.as_deref())?;
    let to = parse_date("to", query.to.as_deref())?;

    if let (Some(f), Some(t)) = (from, to) {
        if f > t {
            return Err(bad_request(format!("`from` ({f}) must be <= `to` ({t})")));
        }
    }

    let records: Vec<DailyRecord> = state
        .dataset
        .filter(query.site_id.as_deref(), site_type, from, to)
        .cloned()
        .collect();

    Ok(Json(records))
}

fn parse_date(name: &str, raw: Option<&str>) -> Result<Option<NaiveDate>, ApiError> {
    raw.map(|s| {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|_| bad_request(format!("`{name}` must be a YYYY-MM-DD date, got \"{s}\"")))
    })
    .transpose()
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use tower::util::ServiceExt;

    use super::*;
    use crate::api::router;
    use crate::config::GeneratorConfig;
    use crate::generator::generate;

    fn make_test_state() -> Arc<AppState> {
        let mut cfg = GeneratorConfig::smoke();
        cfg.run.end_date = NaiveDate::from_ymd_opt(2023, 1, 10).unwrap();
        let out = generate(&cfg).unwrap();
        Arc::new(AppState {
            summary: out.summary,
            dataset: out.dataset,
        })
    }

    async fn get_json(uri: &str) -> (StatusCode, serde_json::Value) {
        let app = router(make_test_state());
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn summary_returns_200() {
        let (status, json) = get_json("/summary").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total_records"], 60);
        assert_eq!(json["seed"], 7);
    }

    #[tokio::test]
    async fn sites_in_registry_order() {
        let (status, json) = get_json("/sites").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().map(Vec::len), Some(6));
        assert_eq!(json[0]["site_id"], "SOLAR001");
        assert_eq!(json[5]["type"], "battery");
    }

    #[tokio::test]
    async fn records_filtered() {
        let (status, json) =
            get_json("/records?site_type=wind&from=2023-01-03&to=2023-01-04").await;
        assert_eq!(status, StatusCode::OK);
        let rows = json.as_array().cloned().unwrap_or_default();
        assert_eq!(rows.len(), 4);
        assert!(rows.iter().all(|r| r["site_type"] == "wind"));
        assert_eq!(rows[0]["date"], "2023-01-03");
    }

    #[tokio::test]
    async fn records_by_site() {
        let (status, json) = get_json("/records?site_id=BATT001").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().map(Vec::len), Some(10));
    }

    #[tokio::test]
    async fn records_invalid_range_returns_400() {
        let (status, json) = get_json("/records?from=2023-01-05&to=2023-01-01").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json.get("error").is_some());
    }

    #[tokio::test]
    async fn records_unknown_type_returns_400() {
        let (status, json) = get_json("/records?site_type=hydro").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json.get("error").is_some());
    }
}
