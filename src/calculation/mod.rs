//! Calculation logic for the tax-credit engine.
//!
//! This module contains the three credit engines (employment increase,
//! social insurance and income increase), the head-count helpers they
//! share, and the year-by-category summary. Every engine is a pure function
//! of the classified employee records, the company settings and the
//! statutory tables.

mod cohort;
mod employment_increase;
mod income_increase;
mod report;
mod social_insurance;
mod summary;

pub use cohort::{
    annual_stats, counted_records, floor2, months_to_count, recognize_increase, stats_by_year,
};
pub use employment_increase::{EMPLOYMENT_INCREASE_CLAUSE, calculate_employment_increase};
pub use income_increase::{INCOME_INCREASE_CLAUSE, LOOKBACK_YEARS, calculate_income_increase};
pub use report::calculate_credits;
pub use social_insurance::{SOCIAL_INSURANCE_CLAUSE, calculate_social_insurance, normal_divisor};
pub use summary::{SUMMARY_YEARS, summarize};
