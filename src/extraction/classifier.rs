//! Document kind classification.

use tracing::debug;

use crate::error::EngineResult;

use super::document::{DocumentKind, PageSource, page_lines, readable_pages};

/// Pages inspected when classifying.
pub const CLASSIFY_PAGES: usize = 3;

/// Markers of a corporate tax return, matched against whitespace-free text.
pub const TAX_RETURN_MARKERS: [&str; 2] = ["과세표준및세액신고서", "과세표준및세액조정계산서"];

/// Markers of a corporate registry certificate on the first page.
pub const REGISTRY_MARKERS: [&str; 3] = ["등기사항전부증명서", "등기사항일부증명서", "법인등기부"];

/// Chooses the document kind from its first pages.
///
/// A tax-return marker on any of the first three pages wins; otherwise a
/// registry marker on the first page selects the registry; everything else
/// is treated as a withholding ledger.
pub fn classify(source: &dyn PageSource) -> EngineResult<DocumentKind> {
    let pages = readable_pages(source).min(CLASSIFY_PAGES);
    let mut texts = Vec::with_capacity(pages);
    for index in 0..pages {
        let text: String = page_lines(source, index)?
            .iter()
            .map(|line| line.compact())
            .collect();
        texts.push(text);
    }

    let kind = classify_texts(&texts);
    debug!(file_name = source.file_name(), kind = ?kind, "Classified document");
    Ok(kind)
}

/// Classifies whitespace-free page texts in reading order.
pub fn classify_texts(pages: &[String]) -> DocumentKind {
    let is_tax_return = pages
        .iter()
        .take(CLASSIFY_PAGES)
        .any(|text| TAX_RETURN_MARKERS.iter().any(|m| text.contains(m)));
    if is_tax_return {
        return DocumentKind::TaxReturn;
    }

    let is_registry = pages
        .first()
        .is_some_and(|text| REGISTRY_MARKERS.iter().any(|m| text.contains(m)));
    if is_registry {
        return DocumentKind::Registry;
    }

    DocumentKind::Withholding
}
