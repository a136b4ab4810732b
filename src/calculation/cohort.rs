//! Head-count helpers shared by the employment and social-insurance engines.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::models::{AnnualCohortStat, EmployeeRecord, IncreaseRecognition};

const MONTHS_PER_YEAR: Decimal = Decimal::from_parts(12, 0, 0, false, 0);

/// Truncates to two decimal places.
///
/// # Example
///
/// ```
/// use tax_credit_engine::calculation::floor2;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(floor2(Decimal::from_str("2.999").unwrap()), Decimal::from_str("2.99").unwrap());
/// ```
pub fn floor2(value: Decimal) -> Decimal {
    (value * Decimal::ONE_HUNDRED).floor() / Decimal::ONE_HUNDRED
}

/// Month-ends divided by twelve, truncated to two decimals.
pub fn months_to_count(months: u32) -> Decimal {
    floor2(Decimal::from(months) / MONTHS_PER_YEAR)
}

/// Included records that have been classified.
pub fn counted_records(records: &[EmployeeRecord]) -> impl Iterator<Item = &EmployeeRecord> {
    records
        .iter()
        .filter(|r| r.exclusion_reason.is_included() && r.classification.is_some())
}

/// Head counts for every fiscal year that has a ledger.
///
/// A year whose records are all excluded still gets a zero stat, so the
/// following year measures its increase from zero. The three counts are
/// truncated independently from their own month sums.
pub fn annual_stats(records: &[EmployeeRecord]) -> Vec<AnnualCohortStat> {
    let mut months: BTreeMap<i32, (u32, u32)> = records
        .iter()
        .map(|r| (r.fiscal_year, (0, 0)))
        .collect();
    for record in counted_records(records) {
        if let Some(c) = &record.classification {
            let entry = months.entry(record.fiscal_year).or_default();
            entry.0 += c.youth_months;
            entry.1 += c.normal_months;
        }
    }

    months
        .into_iter()
        .map(|(year, (youth, normal))| AnnualCohortStat {
            year,
            overall_count: months_to_count(youth + normal),
            youth_count: months_to_count(youth),
            normal_count: months_to_count(normal),
        })
        .collect()
}

/// Splits a year-over-year increase into youth and other components.
///
/// Nothing is recognized without a prior year or when the overall count
/// did not grow. The youth part never exceeds the overall increase and is
/// never negative.
pub fn recognize_increase(
    current: &AnnualCohortStat,
    prior: Option<&AnnualCohortStat>,
) -> IncreaseRecognition {
    let Some(prior) = prior else {
        return IncreaseRecognition::default();
    };
    let overall_difference = current.overall_count - prior.overall_count;
    if overall_difference <= Decimal::ZERO {
        return IncreaseRecognition {
            overall_difference,
            ..Default::default()
        };
    }

    let youth_difference = current.youth_count - prior.youth_count;
    let youth_increase = overall_difference.min(youth_difference).max(Decimal::ZERO);
    IncreaseRecognition {
        overall_difference,
        youth_increase,
        other_increase: overall_difference - youth_increase,
    }
}

/// Indexes stats by year.
pub fn stats_by_year(stats: &[AnnualCohortStat]) -> BTreeMap<i32, AnnualCohortStat> {
    stats.iter().map(|s| (s.year, *s)).collect()
}
