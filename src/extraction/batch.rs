//! Per-document dispatch and batch extraction.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::EngineResult;

use super::classifier::classify;
use super::document::{DocumentContent, DocumentKind, ExtractedDocument, PageSource};
use super::registry::extract_registry;
use super::tax_return::extract_tax_return;
use super::withholding::extract_withholding;

/// Classifies a document and runs the matching extractor over all of it.
pub fn extract_document(source: &dyn PageSource) -> EngineResult<ExtractedDocument> {
    let content = match classify(source)? {
        DocumentKind::Withholding => DocumentContent::Withholding(extract_withholding(source)?),
        DocumentKind::Registry => DocumentContent::Registry(extract_registry(source)?),
        DocumentKind::TaxReturn => DocumentContent::TaxReturn(extract_tax_return(source)?),
    };
    Ok(ExtractedDocument {
        file_name: source.file_name().to_string(),
        content,
    })
}

/// A document the batch had to skip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchFailure {
    /// The skipped file.
    pub file_name: String,
    /// Why it failed.
    pub message: String,
}

/// Result of extracting several independent documents.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BatchOutcome {
    /// Successfully extracted documents, in input order.
    pub documents: Vec<ExtractedDocument>,
    /// Number of documents extracted.
    pub processed: usize,
    /// Documents that failed and were skipped.
    pub failures: Vec<BatchFailure>,
}

/// Extracts every document, skipping the ones that fail.
///
/// A failure never aborts the batch; it is logged and recorded in
/// [`BatchOutcome::failures`].
pub fn extract_batch<S: PageSource>(sources: &[S]) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();
    for source in sources {
        match extract_document(source) {
            Ok(document) => {
                outcome.documents.push(document);
                outcome.processed += 1;
            }
            Err(e) => {
                warn!(file_name = source.file_name(), error = %e, "Skipped unreadable document");
                outcome.failures.push(BatchFailure {
                    file_name: source.file_name().to_string(),
                    message: e.to_string(),
                });
            }
        }
    }
    info!(
        processed = outcome.processed,
        failed = outcome.failures.len(),
        "Batch extraction finished"
    );
    outcome
}
