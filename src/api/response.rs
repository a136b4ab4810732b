//! Response types for the tax-credit engine API.
//!
//! This module defines the success bodies of both endpoints, the error
//! response structure, and the mapping from [`EngineError`] to HTTP errors.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EngineError;
use crate::extraction::{BatchOutcome, DocumentContent, DocumentKind, ExtractedDocument};
use crate::models::{CreditReport, EmployeeRow, ShareholderMatrix, TaxCreditRow};

/// What one document yielded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSummary {
    /// The source file name.
    pub file_name: String,
    /// The detected document kind.
    pub kind: DocumentKind,
    /// Fiscal year, when the document carries one.
    pub fiscal_year: Option<i32>,
    /// Employees, executives or credit items read, depending on the kind.
    pub records: usize,
}

impl From<&ExtractedDocument> for DocumentSummary {
    fn from(document: &ExtractedDocument) -> Self {
        let (fiscal_year, records) = match &document.content {
            DocumentContent::Withholding(ledger) => (ledger.fiscal_year, ledger.employees.len()),
            DocumentContent::Registry(registry) => (None, registry.executives.len()),
            DocumentContent::TaxReturn(extraction) => {
                (extraction.record.year, extraction.record.credit_items.len())
            }
        };
        DocumentSummary {
            file_name: document.file_name.clone(),
            kind: document.content.kind(),
            fiscal_year,
            records,
        }
    }
}

/// Response body of the `/extract` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractResponse {
    /// Request correlation id.
    pub correlation_id: Uuid,
    /// Number of documents extracted.
    pub processed: usize,
    /// Files that could not be read.
    pub failed_files: Vec<String>,
    /// One entry per extracted document.
    pub documents: Vec<DocumentSummary>,
    /// Employee sheet rows.
    pub employees: Vec<EmployeeRow>,
    /// Credit-by-code rows.
    pub tax_credits: Vec<TaxCreditRow>,
    /// Share ratios by year.
    pub shareholders: ShareholderMatrix,
}

/// Response body of the `/credits` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditsResponse {
    /// Request correlation id.
    pub correlation_id: Uuid,
    /// Number of documents extracted.
    pub processed: usize,
    /// Files that could not be read.
    pub failed_files: Vec<String>,
    /// Employee-years excluded after overrides.
    pub excluded: usize,
    /// Employee-years changed by overrides.
    pub overridden: usize,
    /// The full credit report.
    pub report: CreditReport,
}

/// File names of the failed documents of a batch.
pub fn failed_files(outcome: &BatchOutcome) -> Vec<String> {
    outcome
        .failures
        .iter()
        .map(|f| f.file_name.clone())
        .collect()
}

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }

    /// Creates an invalid settings error response.
    pub fn invalid_settings(message: impl Into<String>) -> Self {
        Self::with_details(
            "INVALID_SETTINGS",
            message,
            "Region must be capital or non_capital; size must be small, middle or large",
        )
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        match error {
            EngineError::ConfigNotFound { path } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration error",
                    format!("Configuration file not found: {}", path),
                ),
            },
            EngineError::ConfigParseError { path, message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration parse error",
                    format!("Failed to parse {}: {}", path, message),
                ),
            },
            EngineError::DocumentUnreadable { file_name, message } => ApiErrorResponse {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                error: ApiError::with_details(
                    "DOCUMENT_UNREADABLE",
                    format!("Document '{}' is unreadable", file_name),
                    message,
                ),
            },
            EngineError::PageUnavailable { file_name, page } => ApiErrorResponse {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                error: ApiError::new(
                    "DOCUMENT_UNREADABLE",
                    format!("Page {} of '{}' is unavailable", page, file_name),
                ),
            },
            EngineError::InvalidSettings { message } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::invalid_settings(message),
            },
            EngineError::CalculationError { message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details("CALCULATION_ERROR", "Calculation failed", message),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::{BatchFailure, WithholdingLedger};
    use crate::models::EmployeeRecord;

    #[test]
    fn test_api_error_serialization() {
        let error = ApiError::new("TEST_ERROR", "Test message");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"code\":\"TEST_ERROR\""));
        assert!(json.contains("\"message\":\"Test message\""));
        assert!(!json.contains("details"));
    }

    #[test]
    fn test_api_error_with_details_serialization() {
        let error = ApiError::with_details("TEST_ERROR", "Test message", "Some details");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"details\":\"Some details\""));
    }

    #[test]
    fn test_invalid_settings_maps_to_bad_request() {
        let api_error: ApiErrorResponse = EngineError::InvalidSettings {
            message: "unknown region: moon".to_string(),
        }
        .into();
        assert_eq!(api_error.status, StatusCode::BAD_REQUEST);
        assert_eq!(api_error.error.code, "INVALID_SETTINGS");
        assert!(api_error.error.message.contains("moon"));
    }

    #[test]
    fn test_unreadable_document_maps_to_unprocessable() {
        let api_error: ApiErrorResponse = EngineError::DocumentUnreadable {
            file_name: "a.pdf".to_string(),
            message: "no pages".to_string(),
        }
        .into();
        assert_eq!(api_error.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(api_error.error.details.as_deref(), Some("no pages"));
    }

    #[test]
    fn test_document_summary_counts_records() {
        let document = ExtractedDocument {
            file_name: "2023.pdf".to_string(),
            content: DocumentContent::Withholding(WithholdingLedger {
                fiscal_year: Some(2023),
                employees: vec![
                    EmployeeRecord::new("김민수", None, 2023),
                    EmployeeRecord::new("이서연", None, 2023),
                ],
            }),
        };
        let summary = DocumentSummary::from(&document);
        assert_eq!(summary.kind, DocumentKind::Withholding);
        assert_eq!(summary.fiscal_year, Some(2023));
        assert_eq!(summary.records, 2);
    }

    #[test]
    fn test_failed_files_lists_names() {
        let outcome = BatchOutcome {
            documents: vec![],
            processed: 0,
            failures: vec![BatchFailure {
                file_name: "broken.pdf".to_string(),
                message: "truncated".to_string(),
            }],
        };
        assert_eq!(failed_files(&outcome), vec!["broken.pdf".to_string()]);
    }
}
