//! Statutory tables and their configuration loading.
//!
//! The engines read every rate from [`CreditTables`]. The built-in values
//! live in [`CreditTables::statutory`]; [`ConfigLoader`] layers a YAML file
//! on top of them.
//!
//! # Example
//!
//! ```no_run
//! use tax_credit_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config").unwrap();
//! println!("Youth age limit: {}", config.tables().youth_age_limit);
//! ```

mod loader;
mod types;

pub use loader::{ConfigLoader, TABLES_FILE};
pub use types::{
    CreditTables, EMPLOYMENT_RATE_UNIT, EmploymentRateTable, EmploymentRates,
    IncomeRateTable, InsuranceRateLookup, SocialInsuranceFactors, TablesOverride,
};
