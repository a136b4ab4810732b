//! Employment tax-credit reconciliation engine for Korean corporate filings
//!
//! This crate reads positioned-text dumps of payroll withholding ledgers,
//! corporate registry certificates and corporate tax returns, normalizes
//! them into employee-year, executive and shareholder records, and computes
//! the employment increase, social insurance and income increase credits
//! over several fiscal years.

#![warn(missing_docs)]

pub mod analysis;
pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod extraction;
pub mod models;
pub mod pipeline;
