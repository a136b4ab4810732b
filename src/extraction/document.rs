//! Document sources and extraction outputs.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{EngineError, EngineResult};
use crate::models::{Line, PositionedToken, RegistryRecord, ShareholderRecord, TaxReturnRecord};

use super::assembler::assemble_lines;
use super::withholding::WithholdingLedger;

/// Pages beyond this index are never read.
pub const MAX_PAGES: usize = 2000;

/// Anything that can hand out positioned tokens page by page.
///
/// Page retrieval is the only fallible step of extraction; an error here
/// fails the whole document.
pub trait PageSource {
    /// The document's file name.
    fn file_name(&self) -> &str;

    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Tokens of one page, in any order.
    fn page_tokens(&self, index: usize) -> EngineResult<Vec<PositionedToken>>;
}

impl<T: PageSource + ?Sized> PageSource for Box<T> {
    fn file_name(&self) -> &str {
        (**self).file_name()
    }

    fn page_count(&self) -> usize {
        (**self).page_count()
    }

    fn page_tokens(&self, index: usize) -> EngineResult<Vec<PositionedToken>> {
        (**self).page_tokens(index)
    }
}

/// A document already converted to positioned tokens by the PDF text dumper.
///
/// # Example
///
/// ```
/// use tax_credit_engine::extraction::{PageSource, TokenDocument};
///
/// let json = r#"{"file_name":"a.pdf","pages":[[{"text":"성명","x0":0,"x1":10,"top":0,"bottom":10}]]}"#;
/// let document = TokenDocument::from_json(json).unwrap();
/// assert_eq!(document.page_count(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenDocument {
    /// The original file name.
    pub file_name: String,
    /// Tokens per page.
    pub pages: Vec<Vec<PositionedToken>>,
}

impl TokenDocument {
    /// Creates a document from token pages.
    pub fn new(file_name: impl Into<String>, pages: Vec<Vec<PositionedToken>>) -> Self {
        Self {
            file_name: file_name.into(),
            pages,
        }
    }

    /// Decodes a token dump.
    pub fn from_json(json: &str) -> EngineResult<Self> {
        serde_json::from_str(json).map_err(|e| EngineError::DocumentUnreadable {
            file_name: "<json>".to_string(),
            message: e.to_string(),
        })
    }
}

impl PageSource for TokenDocument {
    fn file_name(&self) -> &str {
        &self.file_name
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_tokens(&self, index: usize) -> EngineResult<Vec<PositionedToken>> {
        let tokens = self
            .pages
            .get(index)
            .ok_or_else(|| EngineError::PageUnavailable {
                file_name: self.file_name.clone(),
                page: index,
            })?;
        Ok(tokens
            .iter()
            .cloned()
            .map(|token| token.on_page(index))
            .collect())
    }
}

/// The three supported document kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Payroll withholding ledger (근로소득 원천징수부).
    Withholding,
    /// Corporate registry certificate (법인 등기사항증명서).
    Registry,
    /// Corporate tax return (법인세 과세표준 및 세액신고서).
    TaxReturn,
}

/// What the tax-return extractor reads from one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxReturnExtraction {
    /// Headline figures and credit items.
    pub record: TaxReturnRecord,
    /// Shareholder rows with relation codes 00 through 08.
    pub shareholders: Vec<ShareholderRecord>,
}

/// The normalized content of one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "record", rename_all = "snake_case")]
pub enum DocumentContent {
    /// Employee-year records.
    Withholding(WithholdingLedger),
    /// Company and executive records.
    Registry(RegistryRecord),
    /// Tax return and shareholder records.
    TaxReturn(TaxReturnExtraction),
}

impl DocumentContent {
    /// The kind of document this content came from.
    pub fn kind(&self) -> DocumentKind {
        match self {
            DocumentContent::Withholding(_) => DocumentKind::Withholding,
            DocumentContent::Registry(_) => DocumentKind::Registry,
            DocumentContent::TaxReturn(_) => DocumentKind::TaxReturn,
        }
    }
}

/// One successfully extracted document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedDocument {
    /// The source file name.
    pub file_name: String,
    /// Its normalized content.
    pub content: DocumentContent,
}

/// Number of pages extraction will read from a source.
pub(crate) fn readable_pages(source: &dyn PageSource) -> usize {
    let count = source.page_count();
    if count > MAX_PAGES {
        warn!(
            file_name = source.file_name(),
            page_count = count,
            max_pages = MAX_PAGES,
            "Page budget exceeded; trailing pages ignored"
        );
    }
    count.min(MAX_PAGES)
}

/// Retrieves one page and assembles its lines.
pub(crate) fn page_lines(source: &dyn PageSource, index: usize) -> EngineResult<Vec<Line>> {
    Ok(assemble_lines(&source.page_tokens(index)?))
}
