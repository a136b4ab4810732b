//! Case file: everything extracted for one client company.
//!
//! A [`CaseFile`] collects the output of any number of extracted documents,
//! resolves exclusions, classifies employees and runs the credit engines.
//! It also produces the row shapes consumed by the spreadsheet generator.
//!
//! # Example
//!
//! ```
//! use tax_credit_engine::config::CreditTables;
//! use tax_credit_engine::models::{CompanySize, CreditSettings, Region};
//! use tax_credit_engine::pipeline::CaseFile;
//!
//! let mut case = CaseFile::new();
//! let settings = CreditSettings::new(Region::Capital, CompanySize::Small);
//! let report = case.calculate(&settings, CreditTables::statutory());
//! assert!(report.summary.years.is_empty());
//! ```

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::analysis::{ExclusionOverride, analyze_employees};
use crate::calculation::calculate_credits;
use crate::config::CreditTables;
use crate::extraction::{DocumentContent, ExtractedDocument, credit_name};
use crate::models::{
    CreditReport, CreditSettings, EmployeeRecord, EmployeeRow, ExecutiveRecord, Region,
    ShareholderColumn, ShareholderMatrix, ShareholderRecord, TaxCreditRow, TaxReturnRecord,
};

/// Accumulated extraction results for one company.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CaseFile {
    company_name: Option<String>,
    address: Option<String>,
    is_capital_region: Option<bool>,
    employees: BTreeMap<i32, Vec<EmployeeRecord>>,
    executives: Vec<ExecutiveRecord>,
    shareholders: BTreeMap<i32, Vec<ShareholderRecord>>,
    tax_returns: Vec<TaxReturnRecord>,
}

impl CaseFile {
    /// Creates an empty case file.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a case file from extracted documents, in order.
    pub fn from_documents(documents: impl IntoIterator<Item = ExtractedDocument>) -> Self {
        let mut case = Self::new();
        for document in documents {
            case.ingest(document);
        }
        case
    }

    /// Adds one extracted document.
    ///
    /// Employee-years already present (same name, ID and year) absorb the
    /// new record's months instead of being duplicated. A tax return or
    /// shareholder statement for a year already on file replaces it.
    pub fn ingest(&mut self, document: ExtractedDocument) {
        let file_name = document.file_name;
        match document.content {
            DocumentContent::Withholding(ledger) => {
                let count = ledger.employees.len();
                for record in ledger.employees {
                    let year = self.employees.entry(record.fiscal_year).or_default();
                    match year.iter_mut().find(|e| e.same_entry(&record)) {
                        Some(existing) => existing.fill_missing(&record),
                        None => year.push(record),
                    }
                }
                debug!(
                    %file_name,
                    year = ?ledger.fiscal_year,
                    count,
                    "Ingested withholding ledger"
                );
            }
            DocumentContent::Registry(registry) => {
                if registry.company_name.is_some() {
                    self.company_name = registry.company_name;
                }
                if registry.address.is_some() {
                    self.address = registry.address;
                    self.is_capital_region = Some(registry.is_capital_region);
                }
                let count = registry.executives.len();
                for executive in registry.executives {
                    if !self.executives.contains(&executive) {
                        self.executives.push(executive);
                    }
                }
                debug!(%file_name, executives = count, "Ingested registry");
            }
            DocumentContent::TaxReturn(extraction) => {
                let year = extraction.record.year;
                if year.is_some() {
                    self.tax_returns.retain(|r| r.year != year);
                }
                self.tax_returns.push(extraction.record);
                self.tax_returns.sort_by_key(|r| r.year);

                let mut by_year: BTreeMap<i32, Vec<ShareholderRecord>> = BTreeMap::new();
                for holder in extraction.shareholders {
                    by_year.entry(holder.year).or_default().push(holder);
                }
                self.shareholders.extend(by_year);
                debug!(%file_name, year = ?year, "Ingested tax return");
            }
        }
    }

    /// Company name from the registry.
    pub fn company_name(&self) -> Option<&str> {
        self.company_name.as_deref()
    }

    /// Head-office address from the registry.
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    /// The region implied by the registry address, when one was read.
    pub fn region_hint(&self) -> Option<Region> {
        self.is_capital_region.map(|capital| {
            if capital {
                Region::Capital
            } else {
                Region::NonCapital
            }
        })
    }

    /// Fiscal years with employee data.
    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.employees.keys().copied()
    }

    /// Employee-years of one fiscal year.
    pub fn employees(&self, year: i32) -> &[EmployeeRecord] {
        self.employees.get(&year).map(Vec::as_slice).unwrap_or_default()
    }

    /// Every employee-year in year order.
    pub fn all_employees(&self) -> impl Iterator<Item = &EmployeeRecord> {
        self.employees.values().flatten()
    }

    /// Registry executives.
    pub fn executives(&self) -> &[ExecutiveRecord] {
        &self.executives
    }

    /// Tax returns in year order.
    pub fn tax_returns(&self) -> &[TaxReturnRecord] {
        &self.tax_returns
    }

    /// Flags executives and shareholders in every year.
    ///
    /// Shareholders are matched against the forward-filled list, so a year
    /// without its own statement uses the latest earlier one. Returns the
    /// number of excluded employee-years.
    pub fn resolve_exclusions(&mut self) -> usize {
        let matrix = self.shareholder_matrix();
        let mut excluded = 0;
        for (year, records) in self.employees.iter_mut() {
            let holders: Vec<ShareholderRecord> = matrix
                .column(*year)
                .map(|column| {
                    column
                        .holders
                        .iter()
                        .cloned()
                        .map(|holder| ShareholderRecord {
                            year: *year,
                            ..holder
                        })
                        .collect()
                })
                .unwrap_or_default();
            excluded += crate::analysis::resolve_exclusions(records, &self.executives, &holders);
        }
        excluded
    }

    /// Applies the preparer's overrides and returns how many records changed.
    pub fn apply_overrides(&mut self, overrides: &[ExclusionOverride]) -> usize {
        self.employees
            .values_mut()
            .map(|records| crate::analysis::apply_overrides(records, overrides))
            .sum()
    }

    /// Classifies every employee-year and runs all credit engines.
    ///
    /// Exclusions are used as they stand; call [`CaseFile::resolve_exclusions`]
    /// and [`CaseFile::apply_overrides`] first to refresh them.
    pub fn calculate(&mut self, settings: &CreditSettings, tables: &CreditTables) -> CreditReport {
        for records in self.employees.values_mut() {
            analyze_employees(records, tables.youth_age_limit);
        }
        let records: Vec<EmployeeRecord> = self.all_employees().cloned().collect();
        info!(
            company = ?self.company_name,
            years = self.employees.len(),
            records = records.len(),
            "Calculating credits for case"
        );
        calculate_credits(&records, settings, tables)
    }

    /// Employee sheet rows in year order.
    pub fn employee_rows(&self) -> Vec<EmployeeRow> {
        self.all_employees().map(EmployeeRow::from).collect()
    }

    /// One row per credit item of every tax return.
    pub fn tax_credit_rows(&self) -> Vec<TaxCreditRow> {
        self.tax_returns
            .iter()
            .flat_map(|record| {
                record.credit_items.iter().map(|item| TaxCreditRow {
                    year: record.year,
                    code: item.code.clone(),
                    name: credit_name(&item.code)
                        .map_or_else(|| item.name.clone(), str::to_string),
                    amount: item.amount,
                })
            })
            .collect()
    }

    /// Share ratios by year.
    ///
    /// Columns run from the first statement year to the last year known
    /// from any document. A year without its own statement inherits the
    /// latest earlier list.
    pub fn shareholder_matrix(&self) -> ShareholderMatrix {
        let Some(&first) = self.shareholders.keys().next() else {
            return ShareholderMatrix::default();
        };
        let known: BTreeSet<i32> = self
            .shareholders
            .keys()
            .copied()
            .chain(self.employees.keys().copied())
            .chain(self.tax_returns.iter().filter_map(|r| r.year))
            .collect();
        let last = known.last().copied().unwrap_or(first);

        let columns = (first..=last)
            .filter_map(|year| {
                let (&source_year, holders) = self.shareholders.range(..=year).next_back()?;
                Some(ShareholderColumn {
                    year,
                    source_year,
                    holders: holders.clone(),
                })
            })
            .collect();
        ShareholderMatrix { columns }
    }
}
