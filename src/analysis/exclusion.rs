//! Executive and shareholder exclusion.
//!
//! Employees who are registered executives or related shareholders do not
//! count toward the employment credits. Matching is by normalized name and,
//! when both sides carry one, the birth-date prefix of the national ID.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::models::{EmployeeRecord, ExclusionReason, ExecutiveRecord, ShareholderRecord, id_prefix};

static PARENTHETICAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^)]*\)|（[^）]*）").expect("valid parenthetical regex"));

/// Strips parenthetical notes, digits and whitespace from a name.
///
/// # Example
///
/// ```
/// use tax_credit_engine::analysis::normalize_name;
///
/// assert_eq!(normalize_name("홍길동(대표)"), "홍길동");
/// assert_eq!(normalize_name("홍 길동2"), "홍길동");
/// ```
pub fn normalize_name(name: &str) -> String {
    PARENTHETICAL_RE
        .replace_all(name, "")
        .chars()
        .filter(|c| !c.is_ascii_digit() && !c.is_whitespace())
        .collect()
}

/// Returns true unless both IDs carry a birth-date prefix and the prefixes differ.
pub fn ids_compatible(a: Option<&str>, b: Option<&str>) -> bool {
    match (id_prefix(a), id_prefix(b)) {
        (Some(a), Some(b)) => a == b,
        _ => true,
    }
}

fn same_person(name: &str, id: Option<&str>, other_name: &str, other_id: Option<&str>) -> bool {
    let name = normalize_name(name);
    !name.is_empty() && name == normalize_name(other_name) && ids_compatible(id, other_id)
}

/// Decides the exclusion reason for one employee-year.
///
/// Executives serving at any point of the fiscal year are checked first,
/// then shareholders listed for the same year.
pub fn resolve_exclusion(
    record: &EmployeeRecord,
    executives: &[ExecutiveRecord],
    shareholders: &[ShareholderRecord],
) -> ExclusionReason {
    let id = record.national_id.as_deref();
    let year_span = NaiveDate::from_ymd_opt(record.fiscal_year, 1, 1)
        .zip(NaiveDate::from_ymd_opt(record.fiscal_year, 12, 31));

    let is_executive = executives.iter().any(|exec| {
        year_span.is_some_and(|(from, to)| exec.serves_between(from, to))
            && same_person(&record.name, id, &exec.name, exec.national_id.as_deref())
    });
    if is_executive {
        return ExclusionReason::Executive;
    }

    let is_shareholder = shareholders.iter().any(|holder| {
        holder.year == record.fiscal_year
            && same_person(&record.name, id, &holder.name, holder.masked_id.as_deref())
    });
    if is_shareholder {
        return ExclusionReason::Shareholder;
    }

    ExclusionReason::None
}

/// Resolves every record in place and returns how many were excluded.
pub fn resolve_exclusions(
    records: &mut [EmployeeRecord],
    executives: &[ExecutiveRecord],
    shareholders: &[ShareholderRecord],
) -> usize {
    let mut excluded = 0;
    for record in records.iter_mut() {
        record.exclusion_reason = resolve_exclusion(record, executives, shareholders);
        if !record.exclusion_reason.is_included() {
            excluded += 1;
            debug!(
                name = %record.name,
                year = record.fiscal_year,
                reason = ?record.exclusion_reason,
                "Employee excluded"
            );
        }
    }
    info!(records = records.len(), excluded, "Resolved exclusions");
    excluded
}

/// A preparer's manual exclusion decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionOverride {
    /// Fiscal year of the targeted record.
    pub year: i32,
    /// Employee name; compared after normalization.
    pub name: String,
    /// Birth-date prefix of the ID; `None` matches any ID.
    #[serde(default)]
    pub id_prefix: Option<String>,
    /// The reason to set. [`ExclusionReason::None`] re-includes the record.
    pub reason: ExclusionReason,
}

impl ExclusionOverride {
    /// Returns true when the override targets `record`.
    pub fn matches(&self, record: &EmployeeRecord) -> bool {
        let prefix_matches = match (self.id_prefix.as_deref(), record.id_prefix()) {
            (Some(wanted), Some(actual)) => wanted == actual,
            _ => true,
        };
        self.year == record.fiscal_year
            && normalize_name(&self.name) == normalize_name(&record.name)
            && prefix_matches
    }
}

/// Applies overrides in order and returns how many records changed.
///
/// Later overrides win over earlier ones for the same record.
pub fn apply_overrides(records: &mut [EmployeeRecord], overrides: &[ExclusionOverride]) -> usize {
    let mut changed = 0;
    for record in records.iter_mut() {
        let Some(last) = overrides.iter().rev().find(|o| o.matches(record)) else {
            continue;
        };
        if record.exclusion_reason != last.reason {
            debug!(
                name = %record.name,
                year = record.fiscal_year,
                from = ?record.exclusion_reason,
                to = ?last.reason,
                "Exclusion overridden"
            );
            record.exclusion_reason = last.reason;
            changed += 1;
        }
    }
    changed
}
