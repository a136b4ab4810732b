//! Request types for the tax-credit engine API.
//!
//! This module defines the JSON request structures for the `/extract` and
//! `/credits` endpoints. Documents arrive as positioned-token dumps.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::analysis::ExclusionOverride;
use crate::error::{EngineError, EngineResult};
use crate::extraction::{BatchFailure, TokenDocument};
use crate::models::{CompanySize, CreditSettings, Region};

/// Request body for the `/extract` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractRequest {
    /// Token dumps to classify and extract, decoded one by one.
    pub documents: Vec<Value>,
}

/// Request body for the `/credits` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditsRequest {
    /// Token dumps of every document of the case, decoded one by one.
    pub documents: Vec<Value>,
    /// Company settings.
    pub settings: SettingsRequest,
    /// Manual exclusion decisions applied after automatic resolution.
    #[serde(default)]
    pub overrides: Vec<ExclusionOverride>,
}

/// Company settings as sent by the client.
///
/// Labels are parsed leniently ("capital", "수도권", "중소기업", ...). The
/// region may be omitted when a registry certificate is part of the case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsRequest {
    /// Region label; falls back to the registry address when absent.
    #[serde(default)]
    pub region: Option<String>,
    /// Company size label.
    pub size: String,
    /// New-growth service business.
    #[serde(default)]
    pub growth_service: bool,
}

impl SettingsRequest {
    /// Resolves the settings, using `region_hint` when no region was sent.
    pub fn resolve(&self, region_hint: Option<Region>) -> EngineResult<CreditSettings> {
        let region = match self.region.as_deref() {
            Some(label) => label.parse::<Region>()?,
            None => region_hint.ok_or_else(|| EngineError::InvalidSettings {
                message: "region was not given and no registry address was found".to_string(),
            })?,
        };
        let size = self.size.parse::<CompanySize>()?;
        Ok(CreditSettings {
            region,
            size,
            growth_service: self.growth_service,
        })
    }
}

/// Decodes each token dump on its own.
///
/// A dump that does not decode becomes a failure for that file only, the
/// same way an unreadable PDF would.
pub fn decode_documents(raw: Vec<Value>) -> (Vec<TokenDocument>, Vec<BatchFailure>) {
    let mut documents = Vec::with_capacity(raw.len());
    let mut failures = Vec::new();
    for (index, value) in raw.into_iter().enumerate() {
        let file_name = value
            .get("file_name")
            .and_then(Value::as_str)
            .map_or_else(|| format!("document {}", index), str::to_string);
        match serde_json::from_value::<TokenDocument>(value) {
            Ok(document) => documents.push(document),
            Err(e) => {
                let error = EngineError::DocumentUnreadable {
                    file_name: file_name.clone(),
                    message: e.to_string(),
                };
                failures.push(BatchFailure {
                    file_name,
                    message: error.to_string(),
                });
            }
        }
    }
    (documents, failures)
}
