//! Year-by-category credit summary.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::models::{CreditCategory, CreditResult, CreditSummary, SummaryYear};

/// Number of most recent years the summary covers.
pub const SUMMARY_YEARS: usize = 5;

/// Merges engine results into per-year category totals.
///
/// Only the latest five years that appear in any engine are kept. A year
/// missing from an engine contributes zero for that category.
///
/// # Example
///
/// ```
/// use tax_credit_engine::calculation::summarize;
/// use tax_credit_engine::models::{CreditCategory, CreditResult, IncreaseRecognition};
/// use rust_decimal::Decimal;
///
/// let result = CreditResult::new(
///     2023,
///     IncreaseRecognition::default(),
///     Decimal::new(1_000, 0),
///     Decimal::ZERO,
///     Decimal::ZERO,
/// );
/// let summary = summarize(&[(CreditCategory::IncomeIncrease, &[result])]);
/// assert_eq!(summary.years[0].income_increase, Decimal::new(1_000, 0));
/// assert_eq!(summary.years[0].employment_increase, Decimal::ZERO);
/// assert_eq!(summary.grand_total, Decimal::new(1_000, 0));
/// ```
pub fn summarize(engines: &[(CreditCategory, &[CreditResult])]) -> CreditSummary {
    let mut totals: BTreeMap<i32, BTreeMap<CreditCategory, Decimal>> = BTreeMap::new();
    for (category, results) in engines {
        for result in results.iter() {
            *totals
                .entry(result.year)
                .or_default()
                .entry(*category)
                .or_default() += result.total;
        }
    }

    let skip = totals.len().saturating_sub(SUMMARY_YEARS);
    let years: Vec<SummaryYear> = totals
        .into_iter()
        .skip(skip)
        .map(|(year, amounts)| {
            let amount = |category| amounts.get(&category).copied().unwrap_or_default();
            let employment_increase = amount(CreditCategory::EmploymentIncrease);
            let social_insurance = amount(CreditCategory::SocialInsurance);
            let income_increase = amount(CreditCategory::IncomeIncrease);
            SummaryYear {
                year,
                employment_increase,
                social_insurance,
                income_increase,
                total: employment_increase + social_insurance + income_increase,
            }
        })
        .collect();

    let grand_total = years.iter().map(|y| y.total).sum();
    CreditSummary { years, grand_total }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IncreaseRecognition;

    fn dec(v: i64) -> Decimal {
        Decimal::new(v, 0)
    }

    fn result(year: i32, first: i64, second: i64) -> CreditResult {
        CreditResult::new(
            year,
            IncreaseRecognition::default(),
            dec(first),
            dec(second),
            Decimal::ZERO,
        )
    }

    #[test]
    fn test_summary_keeps_latest_five_years() {
        let employment: Vec<_> = (2017..=2023).map(|y| result(y, 100, 0)).collect();
        let summary = summarize(&[(CreditCategory::EmploymentIncrease, &employment)]);

        assert_eq!(summary.years.len(), 5);
        assert_eq!(summary.years[0].year, 2019);
        assert_eq!(summary.years[4].year, 2023);
        assert_eq!(summary.grand_total, dec(500));
    }

    #[test]
    fn test_categories_sum_per_year_with_zero_defaults() {
        let employment = vec![result(2022, 1_000, 0), result(2023, 0, 1_000)];
        let social = vec![result(2023, 300, 200)];
        let income: Vec<CreditResult> = vec![];
        let summary = summarize(&[
            (CreditCategory::EmploymentIncrease, &employment),
            (CreditCategory::SocialInsurance, &social),
            (CreditCategory::IncomeIncrease, &income),
        ]);

        assert_eq!(summary.years.len(), 2);
        let y2022 = &summary.years[0];
        assert_eq!(y2022.social_insurance, Decimal::ZERO);
        assert_eq!(y2022.total, dec(1_000));

        let y2023 = &summary.years[1];
        assert_eq!(y2023.amount(CreditCategory::EmploymentIncrease), dec(1_000));
        assert_eq!(y2023.amount(CreditCategory::SocialInsurance), dec(500));
        assert_eq!(y2023.total, dec(1_500));
        assert_eq!(summary.grand_total, dec(2_500));
    }

    #[test]
    fn test_empty_input_gives_empty_summary() {
        let summary = summarize(&[]);
        assert!(summary.years.is_empty());
        assert_eq!(summary.grand_total, Decimal::ZERO);
    }
}
