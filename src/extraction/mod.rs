//! Document field extraction.
//!
//! Positioned tokens are assembled into words and lines, the document kind
//! is chosen from its first pages, and the matching extractor turns the
//! whole document into normalized records.

mod assembler;
mod batch;
mod classifier;
mod codes;
mod document;
mod registry;
mod shareholders;
mod tax_return;
mod text;
mod withholding;

pub use assembler::{LINE_TOLERANCE, WORD_TOLERANCE, assemble_lines, assemble_words, group_lines};
pub use batch::{BatchFailure, BatchOutcome, extract_batch, extract_document};
pub use classifier::{CLASSIFY_PAGES, REGISTRY_MARKERS, TAX_RETURN_MARKERS, classify, classify_texts};
pub use codes::{RELATION_CODES, TAX_CREDIT_CODES, credit_name, relation_name};
pub use document::{
    DocumentContent, DocumentKind, ExtractedDocument, MAX_PAGES, PageSource, TaxReturnExtraction,
    TokenDocument,
};
pub use registry::{RegistryParser, RegistryState, extract_registry, is_capital_region};
pub use shareholders::{decode_tail, parse_shareholder_rows};
pub use tax_return::{
    MIN_CREDIT_AMOUNT, MIN_TAX_RATE, TaxReturnSection, credit_items, extract_tax_return,
    find_amount, fiscal_year_label,
};
pub use text::{
    compact, month_end, parse_amount, parse_date, spaced_label, year_from_file_name,
};
pub use withholding::{
    BONUS_COLUMN, ColumnSpec, SALARY_COLUMN, WithholdingLedger, extract_withholding, locate_column,
    month_rows, read_cover_page,
};
