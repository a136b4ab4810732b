//! Runs every credit engine and assembles the report.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::config::CreditTables;
use crate::models::{CreditCategory, CreditReport, CreditSettings, EmployeeRecord};

use super::employment_increase::calculate_employment_increase;
use super::income_increase::calculate_income_increase;
use super::social_insurance::calculate_social_insurance;
use super::summary::summarize;

/// Runs the three engines over classified records and summarizes them.
///
/// Records must already carry their classification and exclusion flag;
/// unclassified records are ignored by every engine.
pub fn calculate_credits(
    records: &[EmployeeRecord],
    settings: &CreditSettings,
    tables: &CreditTables,
) -> CreditReport {
    let employment_increase = calculate_employment_increase(records, settings, tables);
    let social_insurance = calculate_social_insurance(records, settings, tables);
    let income_increase = calculate_income_increase(records, settings, tables);
    let summary = summarize(&[
        (CreditCategory::EmploymentIncrease, &employment_increase.results),
        (CreditCategory::SocialInsurance, &social_insurance.results),
        (CreditCategory::IncomeIncrease, &income_increase.results),
    ]);

    let report = CreditReport {
        calculation_id: Uuid::new_v4(),
        timestamp: Utc::now(),
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        settings: *settings,
        employment_increase,
        social_insurance,
        income_increase,
        summary,
    };
    info!(
        calculation_id = %report.calculation_id,
        records = records.len(),
        years = report.summary.years.len(),
        grand_total = %report.summary.grand_total,
        "Credit calculation completed"
    );
    report
}
