//! HTTP API module for the tax-credit engine.
//!
//! This module provides the REST API endpoints for extracting documents
//! (`POST /extract`) and computing credits (`POST /credits`).

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{CreditsRequest, ExtractRequest, SettingsRequest, decode_documents};
pub use response::{
    ApiError, ApiErrorResponse, CreditsResponse, DocumentSummary, ExtractResponse,
};
pub use state::AppState;
