//! Social insurance credit for small and medium employers (RSTA art. 30-4).
//!
//! The recognized increase of each band is multiplied by the employer's
//! per-head insurance burden for that band. The normal band's per-head
//! figure divides by `overall - youth` rather than the separately truncated
//! normal count, and its credit is scaled by the deduction factor. A credit
//! is supported for one further year while head count holds.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::config::CreditTables;
use crate::models::{
    AnnualCohortStat, AuditStep, CreditResult, CreditSettings, EmployeeRecord, InsuranceBurden,
    SocialInsuranceReport,
};

use super::cohort::{annual_stats, counted_records, recognize_increase, stats_by_year};

/// Statute reference cited in audit steps.
pub const SOCIAL_INSURANCE_CLAUSE: &str = "RSTA 30-4";

/// The divisor for the normal band's per-head burden.
///
/// # Example
///
/// ```
/// use tax_credit_engine::calculation::normal_divisor;
/// use tax_credit_engine::models::AnnualCohortStat;
/// use rust_decimal::Decimal;
///
/// let stat = AnnualCohortStat {
///     year: 2023,
///     overall_count: Decimal::new(1000, 2),
///     youth_count: Decimal::new(300, 2),
///     normal_count: Decimal::new(691, 2),
/// };
/// assert_eq!(normal_divisor(&stat), Decimal::new(700, 2));
/// ```
pub fn normal_divisor(stat: &AnnualCohortStat) -> Decimal {
    stat.overall_count - stat.youth_count
}

fn per_head(salary: Decimal, count: Decimal, rate: Decimal) -> Decimal {
    if count > Decimal::ZERO {
        salary / count * rate
    } else {
        Decimal::ZERO
    }
}

/// Social-insurance salary sums per year: `(youth, normal)`.
fn insured_salaries(records: &[EmployeeRecord]) -> BTreeMap<i32, (Decimal, Decimal)> {
    let mut sums: BTreeMap<i32, (Decimal, Decimal)> = BTreeMap::new();
    for record in counted_records(records) {
        if let Some(c) = &record.classification {
            let entry = sums.entry(record.fiscal_year).or_default();
            entry.0 += c.insured_youth_salary;
            entry.1 += c.insured_normal_salary;
        }
    }
    sums
}

/// Computes the social insurance credit for every year in the data.
pub fn calculate_social_insurance(
    records: &[EmployeeRecord],
    settings: &CreditSettings,
    tables: &CreditTables,
) -> SocialInsuranceReport {
    let stats = annual_stats(records);
    let by_year = stats_by_year(&stats);
    let salaries = insured_salaries(records);
    let youth_factor = tables.social_insurance_factors.youth;
    let normal_factor = tables.normal_band_factor(settings);

    let mut generated: BTreeMap<i32, Decimal> = BTreeMap::new();
    let mut burdens = Vec::with_capacity(stats.len());
    let mut results = Vec::with_capacity(stats.len());
    let mut audit_steps = Vec::with_capacity(stats.len());

    for stat in &stats {
        let year = stat.year;
        let lookup = tables.insurance_rate(year);
        if lookup.is_none() {
            warn!(year, "No insurance rates configured; burden is zero");
        }
        let rate = lookup.map_or(Decimal::ZERO, |l| l.rate);
        let fallback = lookup.is_some_and(|l| l.fallback);
        if fallback {
            debug!(
                year,
                source_year = ?lookup.map(|l| l.source_year),
                "Insurance rate fell back to latest year"
            );
        }

        let (youth_salary, normal_salary) = salaries.get(&year).copied().unwrap_or_default();
        let divisor = normal_divisor(stat);
        let burden = InsuranceBurden {
            year,
            rate,
            normal_divisor: divisor,
            youth_per_head: per_head(youth_salary, stat.youth_count, rate),
            normal_per_head: per_head(normal_salary, divisor, rate),
        };

        let recognition = recognize_increase(stat, by_year.get(&(year - 1)));
        let first_year = (recognition.youth_increase * burden.youth_per_head * youth_factor
            + recognition.other_increase * burden.normal_per_head * normal_factor)
            .floor();
        generated.insert(year, first_year);

        let second_year = match (by_year.get(&(year - 1)), generated.get(&(year - 1))) {
            (Some(prior), Some(amount)) if stat.overall_count >= prior.overall_count => *amount,
            _ => Decimal::ZERO,
        };
        let result = CreditResult::new(year, recognition, first_year, second_year, Decimal::ZERO);

        audit_steps.push(AuditStep {
            step_number: audit_steps.len() as u32 + 1,
            rule_id: "social_insurance".to_string(),
            rule_name: "Social Insurance Credit".to_string(),
            clause_ref: SOCIAL_INSURANCE_CLAUSE.to_string(),
            input: serde_json::json!({
                "year": year,
                "overall_count": stat.overall_count.to_string(),
                "youth_count": stat.youth_count.to_string(),
                "normal_divisor": divisor.to_string(),
                "rate": rate.to_string(),
                "rate_source_year": lookup.map(|l| l.source_year),
                "rate_fallback": fallback,
            }),
            output: serde_json::json!({
                "youth_per_head": burden.youth_per_head.round_dp(2).to_string(),
                "normal_per_head": burden.normal_per_head.round_dp(2).to_string(),
                "first_year": first_year.to_string(),
                "second_year": second_year.to_string(),
            }),
            reasoning: format!(
                "{} youth x {} x {} + {} other x {} x {} = {}; carried {}",
                recognition.youth_increase,
                burden.youth_per_head.round_dp(2),
                youth_factor,
                recognition.other_increase,
                burden.normal_per_head.round_dp(2),
                normal_factor,
                first_year,
                second_year
            ),
        });
        burdens.push(burden);
        results.push(result);
    }

    debug!(years = results.len(), "Social insurance credit calculated");
    SocialInsuranceReport {
        stats,
        burdens,
        results,
        audit_steps,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CompanySize, EmployeeClassification, ExclusionReason, Region};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn staff(year: i32, youth_months: u32, normal_months: u32, monthly: i64) -> EmployeeRecord {
        let pay = Decimal::new(monthly, 0);
        let mut record = EmployeeRecord::new("직원", None, year);
        record.classification = Some(EmployeeClassification {
            youth_months,
            normal_months,
            insured_youth_salary: pay * Decimal::from(youth_months),
            insured_normal_salary: pay * Decimal::from(normal_months),
            ..Default::default()
        });
        record
    }

    fn settings() -> CreditSettings {
        CreditSettings::new(Region::Capital, CompanySize::Small)
    }

    fn run(records: &[EmployeeRecord], settings: CreditSettings) -> SocialInsuranceReport {
        calculate_social_insurance(records, &settings, CreditTables::statutory())
    }

    #[test]
    fn test_divisor_is_overall_minus_youth() {
        let report = run(&[staff(2023, 37, 83, 1_000_000)], settings());
        let stat = &report.stats[0];
        assert_eq!(stat.overall_count, dec("10.00"));
        assert_eq!(stat.youth_count, dec("3.08"));
        assert_eq!(stat.normal_count, dec("6.91"));
        assert_eq!(report.burdens[0].normal_divisor, dec("6.92"));
    }

    #[test]
    fn test_youth_increase_credit() {
        let records = vec![staff(2022, 12, 108, 2_000_000), staff(2023, 36, 108, 2_000_000)];
        let report = run(&records, settings());

        let burden = &report.burdens[1];
        assert_eq!(burden.rate, dec("0.10980"));
        assert_eq!(burden.youth_per_head, dec("2635200"));
        let result = &report.results[1];
        assert_eq!(result.youth_increase, dec("2"));
        assert_eq!(result.first_year, dec("5270400"));
        assert_eq!(result.second_year, Decimal::ZERO);
    }

    #[test]
    fn test_other_increase_uses_factor_and_second_year_support() {
        let records = vec![
            staff(2022, 12, 108, 3_000_000),
            staff(2023, 36, 108, 3_000_000),
            staff(2024, 36, 120, 3_000_000),
        ];
        let report = run(&records, settings());

        // 2023: 2 youth x (108M / 3 x 0.1098)
        assert_eq!(report.results[1].first_year, dec("7905600"));
        // 2024: 1 other x (360M / 10 x 0.1106) x 0.5
        assert_eq!(report.burdens[2].normal_per_head, dec("3981600"));
        assert_eq!(report.results[2].first_year, dec("1990800"));
        assert_eq!(report.results[2].second_year, dec("7905600"));
        assert_eq!(report.results[2].third_year, Decimal::ZERO);
    }

    #[test]
    fn test_increase_counted_from_fully_excluded_year() {
        let mut owner = staff(2022, 0, 12, 5_000_000);
        owner.exclusion_reason = ExclusionReason::Executive;
        let mut owner_next = staff(2023, 0, 12, 5_000_000);
        owner_next.exclusion_reason = ExclusionReason::Executive;
        let records = vec![owner, owner_next, staff(2023, 0, 24, 1_000_000)];
        let report = run(&records, settings());

        assert_eq!(report.stats[0].overall_count, Decimal::ZERO);
        // 2 other x (24M / 2 x 0.1098) x 0.5
        assert_eq!(report.burdens[1].normal_per_head, dec("1317600"));
        assert_eq!(report.results[1].other_increase, dec("2"));
        assert_eq!(report.results[1].first_year, dec("1317600"));
    }

    #[test]
    fn test_growth_service_factor() {
        let records = vec![staff(2023, 0, 120, 1_000_000), staff(2024, 0, 132, 1_000_000)];
        let mut growth = settings();
        growth.growth_service = true;
        let report = run(&records, growth);

        // 1 other x (132M / 11 x 0.1106) x 0.75
        assert_eq!(report.results[1].first_year, dec("995400"));
    }

    #[test]
    fn test_unknown_year_falls_back_to_latest_rate() {
        let report = run(&[staff(2031, 0, 12, 1_000_000)], settings());
        assert_eq!(report.burdens[0].rate, dec("0.11060"));
        let input = &report.audit_steps[0].input;
        assert!(input["rate_fallback"].as_bool().unwrap());
        assert_eq!(input["rate_source_year"].as_i64().unwrap(), 2024);
    }

    #[test]
    fn test_support_lapses_when_head_count_falls() {
        let records = vec![
            staff(2022, 0, 120, 1_000_000),
            staff(2023, 0, 144, 1_000_000),
            staff(2024, 0, 132, 1_000_000),
        ];
        let report = run(&records, settings());
        assert!(report.results[1].first_year > Decimal::ZERO);
        assert_eq!(report.results[2].second_year, Decimal::ZERO);
    }
}
