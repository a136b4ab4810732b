//! Employment increase credit (RSTA art. 29-7).
//!
//! A year's head-count increase over the prior year earns a per-head credit
//! at the rate for the company's size and region. The credit is paid again
//! in each of the next two years as long as the overall head count has not
//! fallen below the year it was generated in.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::debug;

use crate::config::{CreditTables, EMPLOYMENT_RATE_UNIT};
use crate::models::{
    AnnualCohortStat, AuditStep, CreditResult, CreditSettings, EmployeeRecord,
    EmploymentIncreaseReport,
};

use super::cohort::{annual_stats, recognize_increase, stats_by_year};

/// Statute reference cited in audit steps.
pub const EMPLOYMENT_INCREASE_CLAUSE: &str = "RSTA 29-7";

/// Computes the employment increase credit for every year in the data.
///
/// # Example
///
/// ```
/// use tax_credit_engine::calculation::calculate_employment_increase;
/// use tax_credit_engine::config::CreditTables;
/// use tax_credit_engine::models::{
///     CompanySize, CreditSettings, EmployeeClassification, EmployeeRecord, Region,
/// };
/// use rust_decimal::Decimal;
///
/// let staff = |year: i32, months: u32| {
///     let mut r = EmployeeRecord::new("직원", None, year);
///     r.classification = Some(EmployeeClassification { normal_months: months, ..Default::default() });
///     r
/// };
/// let records = vec![staff(2022, 120), staff(2023, 150)];
/// let settings = CreditSettings::new(Region::NonCapital, CompanySize::Small);
///
/// let report = calculate_employment_increase(&records, &settings, CreditTables::statutory());
/// assert_eq!(report.results[1].first_year, Decimal::new(19_250_000, 0));
/// ```
pub fn calculate_employment_increase(
    records: &[EmployeeRecord],
    settings: &CreditSettings,
    tables: &CreditTables,
) -> EmploymentIncreaseReport {
    let stats = annual_stats(records);
    let by_year = stats_by_year(&stats);
    let rates = tables.employment_rates(settings);

    let mut generated: BTreeMap<i32, Decimal> = BTreeMap::new();
    let mut results = Vec::with_capacity(stats.len());
    let mut audit_steps = Vec::with_capacity(stats.len());

    for stat in &stats {
        let year = stat.year;
        let recognition = recognize_increase(stat, by_year.get(&(year - 1)));
        let first_year = (recognition.youth_increase * rates.youth * EMPLOYMENT_RATE_UNIT
            + recognition.other_increase * rates.other * EMPLOYMENT_RATE_UNIT)
            .floor();
        generated.insert(year, first_year);

        let second_year = maintained(stat, &by_year, &generated, 1);
        let third_year = maintained(stat, &by_year, &generated, 2);
        let result = CreditResult::new(year, recognition, first_year, second_year, third_year);

        audit_steps.push(AuditStep {
            step_number: audit_steps.len() as u32 + 1,
            rule_id: "employment_increase".to_string(),
            rule_name: "Employment Increase Credit".to_string(),
            clause_ref: EMPLOYMENT_INCREASE_CLAUSE.to_string(),
            input: serde_json::json!({
                "year": year,
                "overall_count": stat.overall_count.to_string(),
                "youth_count": stat.youth_count.to_string(),
                "youth_rate": rates.youth.to_string(),
                "other_rate": rates.other.to_string(),
            }),
            output: serde_json::json!({
                "youth_increase": recognition.youth_increase.to_string(),
                "other_increase": recognition.other_increase.to_string(),
                "first_year": first_year.to_string(),
                "second_year": second_year.to_string(),
                "third_year": third_year.to_string(),
            }),
            reasoning: format!(
                "{} youth x {} + {} other x {} (x{}) = {}; carried {} + {}",
                recognition.youth_increase,
                rates.youth,
                recognition.other_increase,
                rates.other,
                EMPLOYMENT_RATE_UNIT,
                first_year,
                second_year,
                third_year
            ),
        });
        results.push(result);
    }

    debug!(years = results.len(), "Employment increase credit calculated");
    EmploymentIncreaseReport {
        stats,
        results,
        audit_steps,
    }
}

/// The credit generated `lag` years before `stat`, if head count held.
fn maintained(
    stat: &AnnualCohortStat,
    by_year: &BTreeMap<i32, AnnualCohortStat>,
    generated: &BTreeMap<i32, Decimal>,
    lag: i32,
) -> Decimal {
    let origin = stat.year - lag;
    match (by_year.get(&origin), generated.get(&origin)) {
        (Some(origin_stat), Some(amount)) if stat.overall_count >= origin_stat.overall_count => {
            *amount
        }
        _ => Decimal::ZERO,
    }
}
