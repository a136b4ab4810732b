//! HTTP request handlers for the tax-credit engine API.
//!
//! This module contains the handler functions for all API endpoints.
//! Extraction and calculation are CPU-bound, so both run on the blocking
//! thread pool.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::extraction::extract_batch;
use crate::pipeline::CaseFile;

use super::request::{CreditsRequest, ExtractRequest, decode_documents};
use super::response::{
    ApiError, ApiErrorResponse, CreditsResponse, DocumentSummary, ExtractResponse, failed_files,
};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/extract", post(extract_handler))
        .route("/credits", post(credits_handler))
        .with_state(state)
}

/// Handler for POST /extract endpoint.
///
/// Classifies and extracts every document and returns the sheet rows the
/// spreadsheet generator consumes.
async fn extract_handler(payload: Result<Json<ExtractRequest>, JsonRejection>) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing extraction request");

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let start_time = Instant::now();
    let result = tokio::task::spawn_blocking(move || {
        let (sources, undecodable) = decode_documents(request.documents);
        let mut outcome = extract_batch(&sources);
        outcome.failures.extend(undecodable);
        let documents = outcome.documents.iter().map(DocumentSummary::from).collect();
        let failed = failed_files(&outcome);
        let processed = outcome.processed;
        let case = CaseFile::from_documents(outcome.documents);
        ExtractResponse {
            correlation_id,
            processed,
            failed_files: failed,
            documents,
            employees: case.employee_rows(),
            tax_credits: case.tax_credit_rows(),
            shareholders: case.shareholder_matrix(),
        }
    })
    .await;

    match result {
        Ok(response) => {
            info!(
                correlation_id = %correlation_id,
                processed = response.processed,
                failed = response.failed_files.len(),
                duration_us = start_time.elapsed().as_micros(),
                "Extraction completed"
            );
            json_response(StatusCode::OK, response)
        }
        Err(join_error) => error_response(
            correlation_id,
            EngineError::CalculationError {
                message: join_error.to_string(),
            },
        ),
    }
}

/// Handler for POST /credits endpoint.
///
/// Extracts the documents, resolves exclusions, applies the preparer's
/// overrides and runs every credit engine.
async fn credits_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreditsRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing credits request");

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let config = state.shared_config();
    let start_time = Instant::now();
    let result = tokio::task::spawn_blocking(move || -> EngineResult<CreditsResponse> {
        let (sources, undecodable) = decode_documents(request.documents);
        let mut outcome = extract_batch(&sources);
        outcome.failures.extend(undecodable);
        let failed = failed_files(&outcome);
        let processed = outcome.processed;
        let mut case = CaseFile::from_documents(outcome.documents);
        let settings = request.settings.resolve(case.region_hint())?;

        case.resolve_exclusions();
        let overridden = case.apply_overrides(&request.overrides);
        let excluded = case
            .all_employees()
            .filter(|r| !r.exclusion_reason.is_included())
            .count();
        let report = case.calculate(&settings, config.tables());
        Ok(CreditsResponse {
            correlation_id,
            processed,
            failed_files: failed,
            excluded,
            overridden,
            report,
        })
    })
    .await;

    match result {
        Ok(Ok(response)) => {
            info!(
                correlation_id = %correlation_id,
                processed = response.processed,
                grand_total = %response.report.summary.grand_total,
                duration_us = start_time.elapsed().as_micros(),
                "Credit calculation completed successfully"
            );
            json_response(StatusCode::OK, response)
        }
        Ok(Err(err)) => error_response(correlation_id, err),
        Err(join_error) => error_response(
            correlation_id,
            EngineError::CalculationError {
                message: join_error.to_string(),
            },
        ),
    }
}

fn json_response<T: serde::Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn error_response(correlation_id: Uuid, err: EngineError) -> Response {
    warn!(
        correlation_id = %correlation_id,
        error = %err,
        "Request failed"
    );
    let api_error: ApiErrorResponse = err.into();
    json_response(api_error.status, api_error.error)
}

fn rejection_response(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    json_response(StatusCode::BAD_REQUEST, error)
}
