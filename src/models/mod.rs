//! Core data models for the tax-credit engine.
//!
//! This module contains the positioned-text primitives, the normalized
//! records produced by extraction, and the credit results produced by the
//! calculation engines.

mod credit_result;
mod employee;
mod geometry;
mod registry;
mod settings;
mod tax_return;

pub use credit_result::{
    AnnualCohortStat, AuditStep, CreditCategory, CreditReport, CreditResult, CreditSummary,
    EmploymentIncreaseReport, IncomeIncreaseReport, IncomeIncreaseYear, IncreaseRecognition,
    InsuranceBurden, SocialInsuranceReport, SummaryYear,
};
pub use employee::{
    EmployeeClassification, EmployeeRecord, EmployeeRow, ExclusionReason, MonthlyAmounts,
    id_prefix,
};
pub use geometry::{BoundingBox, Line, PositionedToken, Word};
pub use registry::{ExecutiveRecord, RegistryRecord, TenureEvent, TenureEventKind};
pub use settings::{CompanySize, CreditSettings, Region};
pub use tax_return::{
    ShareholderColumn, ShareholderMatrix, ShareholderRecord, TaxCreditItem, TaxCreditRow,
    TaxReturnRecord,
};
