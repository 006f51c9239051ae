use crate::server::payload::{collect_params, extract_deal_id};
use crate::server::AppState;
use axum::body::Bytes;
use axum::extract::{RawQuery, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use dealhook_bitrix::{CrmGateway, EnrichError, EnrichOptions, EnrichReport};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, warn};

#[derive(Serialize)]
struct HealthResponse<'a> {
    status: &'static str,
    version: &'static str,
    dataset: &'a str,
}

pub async fn health<G>(State(state): State<AppState<G>>) -> Response {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        dataset: &state.dataset_version,
    })
    .into_response()
}

#[derive(Serialize)]
struct EnrichResponse<'a> {
    status: &'static str,
    deal_id: &'a str,
    contact_id: Option<&'a str>,
    timezone: Option<&'a str>,
    contact_fields: Vec<&'a str>,
    deal_fields: Vec<&'a str>,
    contact_update: &'a dealhook_bitrix::UpdateStatus,
    deal_update: &'a dealhook_bitrix::UpdateStatus,
}

impl<'a> EnrichResponse<'a> {
    fn from_report(report: &'a EnrichReport) -> Self {
        Self {
            status: if report.is_complete() {
                "success"
            } else {
                "partial"
            },
            deal_id: &report.deal_id,
            contact_id: report.contact_id.as_deref(),
            timezone: report.timezone.as_deref(),
            contact_fields: report.contact_updates.field_names(),
            deal_fields: report.deal_updates.field_names(),
            contact_update: &report.contact_status,
            deal_update: &report.deal_status,
        }
    }
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let body = json!({ "status": "error", "message": message.into() });
    (status, Json(body)).into_response()
}

pub async fn webhook<G>(
    State(state): State<AppState<G>>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    G: CrmGateway + Send + Sync + 'static,
{
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());
    let params = match collect_params(query.as_deref(), content_type, &body) {
        Ok(params) => params,
        Err(err) => {
            warn!(error = %err, "rejecting webhook payload");
            return error_response(StatusCode::BAD_REQUEST, err.to_string());
        }
    };

    let Some(deal_id) = extract_deal_id(&params) else {
        warn!(keys = ?params.keys().collect::<Vec<_>>(), "no deal id in request");
        return error_response(StatusCode::BAD_REQUEST, "No deal ID provided");
    };

    let enricher = Arc::clone(&state.enricher);
    let outcome = tokio::task::spawn_blocking(move || {
        enricher.enrich(&deal_id, EnrichOptions::default())
    })
    .await;

    match outcome {
        Ok(Ok(report)) => {
            (StatusCode::OK, Json(EnrichResponse::from_report(&report))).into_response()
        }
        Ok(Err(err)) => enrich_error_response(err),
        Err(err) => {
            error!(error = %err, "enrichment task failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "enrichment task failed")
        }
    }
}

fn enrich_error_response(err: EnrichError) -> Response {
    match &err {
        EnrichError::InvalidDealId(_) => error_response(StatusCode::BAD_REQUEST, err.to_string()),
        EnrichError::DealNotFound(_) => error_response(StatusCode::NOT_FOUND, "Deal not found"),
        EnrichError::Gateway(source) => {
            error!(error = %source, "bitrix request failed");
            error_response(StatusCode::BAD_GATEWAY, err.to_string())
        }
    }
}
