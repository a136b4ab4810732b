//! Credit calculation result models.
//!
//! This module contains the per-engine reports, the shared [`CreditResult`]
//! row, the year-by-category [`CreditSummary`] and the [`CreditReport`]
//! envelope returned to callers, together with the audit trail types that
//! record each statutory decision.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::CreditSettings;

/// The three credits the engine computes.
///
/// # Example
///
/// ```
/// use tax_credit_engine::models::CreditCategory;
///
/// let json = serde_json::to_string(&CreditCategory::SocialInsurance).unwrap();
/// assert_eq!(json, "\"social_insurance\"");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditCategory {
    /// Credit for increased head count.
    EmploymentIncrease,
    /// Credit for the employer's social-insurance burden on new hires.
    SocialInsurance,
    /// Credit for above-trend wage growth.
    IncomeIncrease,
}

/// A single step in the audit trail recording a calculation decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// Reference to the statute article for this rule.
    pub clause_ref: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// Full-time-equivalent head counts for one year.
///
/// Each count is truncated independently, so `overall_count` need not equal
/// `youth_count + normal_count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnualCohortStat {
    /// Fiscal year.
    pub year: i32,
    /// All employed month-ends / 12, truncated to two decimals.
    pub overall_count: Decimal,
    /// Youth-band month-ends / 12, truncated to two decimals.
    pub youth_count: Decimal,
    /// Normal-band month-ends / 12, truncated to two decimals.
    pub normal_count: Decimal,
}

/// How a year-over-year head-count increase splits into credit bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IncreaseRecognition {
    /// `overall(Y) - overall(Y-1)`, possibly negative.
    pub overall_difference: Decimal,
    /// Recognized youth increase.
    pub youth_increase: Decimal,
    /// Recognized increase outside the youth band.
    pub other_increase: Decimal,
}

/// One year's credit from one engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditResult {
    /// Fiscal year the amounts are payable in.
    pub year: i32,
    /// Recognized youth increase (zero for the income engine).
    pub youth_increase: Decimal,
    /// Recognized other increase (zero for the income engine).
    pub other_increase: Decimal,
    /// Credit generated this year.
    pub first_year: Decimal,
    /// Credit generated last year and maintained this year.
    pub second_year: Decimal,
    /// Credit generated two years ago and maintained this year.
    pub third_year: Decimal,
    /// Sum of the three amounts.
    pub total: Decimal,
}

impl CreditResult {
    /// Builds a result and fills in the total.
    pub fn new(
        year: i32,
        recognition: IncreaseRecognition,
        first_year: Decimal,
        second_year: Decimal,
        third_year: Decimal,
    ) -> Self {
        Self {
            year,
            youth_increase: recognition.youth_increase,
            other_increase: recognition.other_increase,
            first_year,
            second_year,
            third_year,
            total: first_year + second_year + third_year,
        }
    }
}

/// Output of the employment-increase engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmploymentIncreaseReport {
    /// Head counts per year.
    pub stats: Vec<AnnualCohortStat>,
    /// Credits per year.
    pub results: Vec<CreditResult>,
    /// Decisions in order.
    pub audit_steps: Vec<AuditStep>,
}

/// Per-head employer burden used by the social-insurance engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsuranceBurden {
    /// Fiscal year.
    pub year: i32,
    /// Statutory employer rate applied.
    pub rate: Decimal,
    /// `overall_count - youth_count`.
    pub normal_divisor: Decimal,
    /// Youth-band salary / youth count × rate.
    pub youth_per_head: Decimal,
    /// Normal-band salary / normal divisor × rate.
    pub normal_per_head: Decimal,
}

/// Output of the social-insurance engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialInsuranceReport {
    /// Head counts per year.
    pub stats: Vec<AnnualCohortStat>,
    /// Burden per head per year.
    pub burdens: Vec<InsuranceBurden>,
    /// Credits per year.
    pub results: Vec<CreditResult>,
    /// Decisions in order.
    pub audit_steps: Vec<AuditStep>,
}

/// Wage-growth figures for one target year of the income-increase engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeIncreaseYear {
    /// Target year.
    pub year: i32,
    /// Cohort average wage in the target year.
    pub average_wage: Decimal,
    /// Cohort average wage in the prior year.
    pub prior_average_wage: Decimal,
    /// Target-year growth rate, when computable.
    pub growth_rate: Option<Decimal>,
    /// Mean of up to three prior growth rates, when any are computable.
    pub average_prior_rate: Option<Decimal>,
    /// Prior-year overall head count.
    pub prior_year_count: Decimal,
    /// Credit rate for the company size.
    pub credit_rate: Decimal,
    /// Whether the growth test passed.
    pub eligible: bool,
}

/// Output of the income-increase engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeIncreaseReport {
    /// Figures for every target year with a full lookback window.
    pub years: Vec<IncomeIncreaseYear>,
    /// Credits for those years.
    pub results: Vec<CreditResult>,
    /// Years present in the data but lacking a full lookback window.
    pub skipped_years: Vec<i32>,
    /// Decisions in order.
    pub audit_steps: Vec<AuditStep>,
}

/// One year of the summary table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryYear {
    /// Fiscal year.
    pub year: i32,
    /// Employment-increase total for the year.
    pub employment_increase: Decimal,
    /// Social-insurance total for the year.
    pub social_insurance: Decimal,
    /// Income-increase total for the year.
    pub income_increase: Decimal,
    /// Sum across categories.
    pub total: Decimal,
}

impl SummaryYear {
    /// Returns the amount for one category.
    pub fn amount(&self, category: CreditCategory) -> Decimal {
        match category {
            CreditCategory::EmploymentIncrease => self.employment_increase,
            CreditCategory::SocialInsurance => self.social_insurance,
            CreditCategory::IncomeIncrease => self.income_increase,
        }
    }
}

/// Year-by-category totals over the latest five years.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditSummary {
    /// Years in ascending order.
    pub years: Vec<SummaryYear>,
    /// Sum of all year totals.
    pub grand_total: Decimal,
}

/// Everything a credit calculation produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditReport {
    /// Unique identifier for this calculation.
    pub calculation_id: Uuid,
    /// When the calculation ran.
    pub timestamp: DateTime<Utc>,
    /// Version of the engine that produced the report.
    pub engine_version: String,
    /// Settings the report was computed with.
    pub settings: CreditSettings,
    /// Employment-increase output.
    pub employment_increase: EmploymentIncreaseReport,
    /// Social-insurance output.
    pub social_insurance: SocialInsuranceReport,
    /// Income-increase output.
    pub income_increase: IncomeIncreaseReport,
    /// Year-by-category totals.
    pub summary: CreditSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(v: i64) -> Decimal {
        Decimal::new(v, 0)
    }

    #[test]
    fn test_credit_result_total_sums_all_years() {
        let result = CreditResult::new(
            2023,
            IncreaseRecognition::default(),
            dec(100),
            dec(20),
            dec(3),
        );
        assert_eq!(result.total, dec(123));
    }

    #[test]
    fn test_summary_year_amount_by_category() {
        let year = SummaryYear {
            year: 2022,
            employment_increase: dec(1),
            social_insurance: dec(2),
            income_increase: dec(3),
            total: dec(6),
        };
        assert_eq!(year.amount(CreditCategory::SocialInsurance), dec(2));
        assert_eq!(year.amount(CreditCategory::IncomeIncrease), dec(3));
    }
}
