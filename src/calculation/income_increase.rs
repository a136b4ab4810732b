//! Wage income increase credit (RSTA art. 29-4).
//!
//! For a target year `T` the engine follows one cohort across `T-4..=T`:
//! people on the payroll at the end of `T` who, in none of those years,
//! earned over the salary cap, resigned, or were excluded. Average wages
//! of that cohort give year-over-year growth rates; the credit applies
//! when growth in `T` beats the mean of the prior rates.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use rust_decimal::Decimal;
use tracing::debug;

use crate::analysis::normalize_name;
use crate::config::CreditTables;
use crate::models::{
    AuditStep, CreditResult, CreditSettings, EmployeeRecord, IncomeIncreaseReport,
    IncomeIncreaseYear, IncreaseRecognition,
};

use super::cohort::annual_stats;

/// Statute reference cited in audit steps.
pub const INCOME_INCREASE_CLAUSE: &str = "RSTA 29-4";

/// Years of history needed before the target year.
pub const LOOKBACK_YEARS: i32 = 4;

const MONTHS_PER_YEAR: Decimal = Decimal::from_parts(12, 0, 0, false, 0);

type PersonKey = (String, Option<String>);

fn person_key(record: &EmployeeRecord) -> PersonKey {
    let id = record
        .national_id
        .as_deref()
        .map(|id| id.chars().filter(|c| !c.is_whitespace()).collect());
    (normalize_name(&record.name), id)
}

/// The people followed for target year `target`.
fn cohort(records: &[EmployeeRecord], target: i32, salary_cap: Decimal) -> HashSet<PersonKey> {
    let window = (target - LOOKBACK_YEARS)..=target;

    let disqualified: HashSet<PersonKey> = records
        .iter()
        .filter(|r| window.contains(&r.fiscal_year))
        .filter(|r| {
            r.total_salary() > salary_cap
                || r.resigned_in_year()
                || !r.exclusion_reason.is_included()
        })
        .map(person_key)
        .collect();

    records
        .iter()
        .filter(|r| r.fiscal_year == target && r.exclusion_reason.is_included())
        .filter(|r| {
            r.classification
                .as_ref()
                .is_some_and(|c| c.employed_at_year_end)
        })
        .map(person_key)
        .filter(|key| !disqualified.contains(key))
        .collect()
}

/// Cohort average wage for one year: total pay over full-time equivalents.
///
/// People hired during the year are left out of that year's average.
fn average_wage(
    records: &[EmployeeRecord],
    cohort: &HashSet<PersonKey>,
    year: i32,
) -> Option<Decimal> {
    let (salary, months) = records
        .iter()
        .filter(|r| r.fiscal_year == year && !r.hired_in_year())
        .filter(|r| cohort.contains(&person_key(r)))
        .fold((Decimal::ZERO, 0u32), |(salary, months), r| {
            let employed = r.classification.as_ref().map_or(0, |c| c.employed_months());
            (salary + r.total_salary(), months + employed)
        });

    let fte = Decimal::from(months) / MONTHS_PER_YEAR;
    (fte > Decimal::ZERO).then(|| salary / fte)
}

fn growth(current: Option<Decimal>, prior: Option<Decimal>) -> Option<Decimal> {
    match (current, prior) {
        (Some(current), Some(prior)) if prior > Decimal::ZERO => {
            Some(current / prior - Decimal::ONE)
        }
        _ => None,
    }
}

/// Computes the income increase credit for every target year with a full
/// lookback window.
///
/// Years lacking any of the four prior years are listed in
/// [`IncomeIncreaseReport::skipped_years`] instead of producing a result.
pub fn calculate_income_increase(
    records: &[EmployeeRecord],
    settings: &CreditSettings,
    tables: &CreditTables,
) -> IncomeIncreaseReport {
    let years: BTreeSet<i32> = records.iter().map(|r| r.fiscal_year).collect();
    let counts: BTreeMap<i32, Decimal> = annual_stats(records)
        .into_iter()
        .map(|s| (s.year, s.overall_count))
        .collect();
    let credit_rate = tables.income_rate(settings);

    let mut report = IncomeIncreaseReport {
        years: Vec::new(),
        results: Vec::new(),
        skipped_years: Vec::new(),
        audit_steps: Vec::new(),
    };

    for &target in &years {
        let complete = (target - LOOKBACK_YEARS..target).all(|y| years.contains(&y));
        if !complete {
            report.skipped_years.push(target);
            continue;
        }

        let members = cohort(records, target, tables.income_salary_cap);
        let averages: BTreeMap<i32, Option<Decimal>> = (target - LOOKBACK_YEARS..=target)
            .map(|y| (y, average_wage(records, &members, y)))
            .collect();
        let average = |y: i32| averages.get(&y).copied().flatten();

        let growth_rate = growth(average(target), average(target - 1));
        let prior_rates: Vec<Decimal> = (1..LOOKBACK_YEARS)
            .filter_map(|lag| growth(average(target - lag), average(target - lag - 1)))
            .collect();
        let average_prior_rate = (!prior_rates.is_empty()).then(|| {
            prior_rates.iter().copied().sum::<Decimal>() / Decimal::from(prior_rates.len())
        });

        let eligible = match (growth_rate, average_prior_rate) {
            (Some(rate), Some(prior)) => rate > prior && prior >= Decimal::ZERO,
            _ => false,
        };

        let average_wage_t = average(target).unwrap_or_default();
        let prior_average_wage = average(target - 1).unwrap_or_default();
        let prior_year_count = counts.get(&(target - 1)).copied().unwrap_or_default();

        let credit = if eligible {
            let prior_rate = average_prior_rate.unwrap_or_default();
            let trend = prior_average_wage * (Decimal::ONE + prior_rate);
            let amount = ((average_wage_t - trend) * prior_year_count * credit_rate).floor();
            amount.max(Decimal::ZERO)
        } else {
            Decimal::ZERO
        };

        report.audit_steps.push(AuditStep {
            step_number: report.audit_steps.len() as u32 + 1,
            rule_id: "income_increase".to_string(),
            rule_name: "Income Increase Credit".to_string(),
            clause_ref: INCOME_INCREASE_CLAUSE.to_string(),
            input: serde_json::json!({
                "year": target,
                "cohort_size": members.len(),
                "average_wage": average_wage_t.round_dp(2).to_string(),
                "prior_average_wage": prior_average_wage.round_dp(2).to_string(),
                "prior_year_count": prior_year_count.to_string(),
                "credit_rate": credit_rate.to_string(),
            }),
            output: serde_json::json!({
                "growth_rate": growth_rate.map(|r| r.round_dp(6).to_string()),
                "average_prior_rate": average_prior_rate.map(|r| r.round_dp(6).to_string()),
                "eligible": eligible,
                "credit": credit.to_string(),
            }),
            reasoning: if eligible {
                format!(
                    "({} - {} x (1 + {})) x {} x {} = {}",
                    average_wage_t.round_dp(0),
                    prior_average_wage.round_dp(0),
                    average_prior_rate.unwrap_or_default().round_dp(6),
                    prior_year_count,
                    credit_rate,
                    credit
                )
            } else {
                "Growth did not exceed the non-negative prior average".to_string()
            },
        });

        report.years.push(IncomeIncreaseYear {
            year: target,
            average_wage: average_wage_t,
            prior_average_wage,
            growth_rate,
            average_prior_rate,
            prior_year_count,
            credit_rate,
            eligible,
        });
        report.results.push(CreditResult::new(
            target,
            IncreaseRecognition::default(),
            credit,
            Decimal::ZERO,
            Decimal::ZERO,
        ));
    }

    debug!(
        years = report.results.len(),
        skipped = ?report.skipped_years,
        "Income increase credit calculated"
    );
    report
}
