//! Statutory rate tables.
//!
//! The tables are immutable once built. [`CreditTables::statutory`] returns
//! the built-in values; a YAML file may override parts of them through
//! [`TablesOverride`].

use std::collections::BTreeMap;
use std::sync::LazyLock;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{CompanySize, CreditSettings, Region};

/// Employment-increase rates are quoted in units of 10,000 won per head.
pub const EMPLOYMENT_RATE_UNIT: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);

/// Per-head credit rates for one company class, in 10,000-won units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmploymentRates {
    /// Rate for each recognized youth head.
    pub youth: Decimal,
    /// Rate for each recognized other head.
    pub other: Decimal,
}

impl EmploymentRates {
    const fn units(youth: i64, other: i64) -> Self {
        Self {
            youth: Decimal::from_parts(youth as u32, 0, 0, false, 0),
            other: Decimal::from_parts(other as u32, 0, 0, false, 0),
        }
    }
}

/// Employment-increase rates by company size and region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmploymentRateTable {
    /// Small company in the capital region.
    pub small_capital: EmploymentRates,
    /// Small company outside the capital region.
    pub small_non_capital: EmploymentRates,
    /// Middle-market company, any region.
    pub middle: EmploymentRates,
    /// Large company, any region.
    pub large: EmploymentRates,
}

impl EmploymentRateTable {
    /// Selects the rates for a company.
    pub fn rates(&self, size: CompanySize, region: Region) -> EmploymentRates {
        match (size, region) {
            (CompanySize::Small, Region::Capital) => self.small_capital,
            (CompanySize::Small, Region::NonCapital) => self.small_non_capital,
            (CompanySize::Middle, _) => self.middle,
            (CompanySize::Large, _) => self.large,
        }
    }
}

/// Income-increase credit rates by company size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeRateTable {
    /// Small company.
    pub small: Decimal,
    /// Middle-market company.
    pub middle: Decimal,
    /// Large company.
    pub large: Decimal,
}

impl IncomeRateTable {
    /// Selects the rate for a company size.
    pub fn rate(&self, size: CompanySize) -> Decimal {
        match size {
            CompanySize::Small => self.small,
            CompanySize::Middle => self.middle,
            CompanySize::Large => self.large,
        }
    }
}

/// Share of the per-head burden credited for each band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialInsuranceFactors {
    /// Youth band.
    pub youth: Decimal,
    /// Normal band.
    pub normal: Decimal,
    /// Normal band for new-growth service businesses.
    pub growth_service_normal: Decimal,
}

/// The result of looking up an employer insurance rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsuranceRateLookup {
    /// The rate applied.
    pub rate: Decimal,
    /// The table year the rate came from.
    pub source_year: i32,
    /// True when the requested year was not in the table.
    pub fallback: bool,
}

/// Every table the credit engines read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditTables {
    /// Employment-increase rates.
    pub employment_rates: EmploymentRateTable,
    /// Employer social-insurance rate by year.
    pub insurance_rates: BTreeMap<i32, Decimal>,
    /// Band factors for the social-insurance credit.
    pub social_insurance_factors: SocialInsuranceFactors,
    /// Income-increase credit rates.
    pub income_rates: IncomeRateTable,
    /// Oldest age (inclusive) counted in the youth band.
    pub youth_age_limit: u32,
    /// Annual pay above which an employee leaves the income-increase cohort.
    pub income_salary_cap: Decimal,
}

static STATUTORY: LazyLock<CreditTables> = LazyLock::new(|| CreditTables {
    employment_rates: EmploymentRateTable {
        small_capital: EmploymentRates::units(1100, 700),
        small_non_capital: EmploymentRates::units(1200, 770),
        middle: EmploymentRates::units(800, 450),
        large: EmploymentRates::units(0, 0),
    },
    insurance_rates: BTreeMap::from([
        (2017, Decimal::new(9_590, 5)),
        (2018, Decimal::new(9_720, 5)),
        (2019, Decimal::new(10_010, 5)),
        (2020, Decimal::new(10_250, 5)),
        (2021, Decimal::new(10_430, 5)),
        (2022, Decimal::new(10_760, 5)),
        (2023, Decimal::new(10_980, 5)),
        (2024, Decimal::new(11_060, 5)),
    ]),
    social_insurance_factors: SocialInsuranceFactors {
        youth: Decimal::ONE,
        normal: Decimal::new(5, 1),
        growth_service_normal: Decimal::new(75, 2),
    },
    income_rates: IncomeRateTable {
        small: Decimal::new(20, 2),
        middle: Decimal::new(10, 2),
        large: Decimal::new(5, 2),
    },
    youth_age_limit: 29,
    income_salary_cap: Decimal::new(70_000_000, 0),
});

impl CreditTables {
    /// The built-in statutory tables.
    pub fn statutory() -> &'static CreditTables {
        &STATUTORY
    }

    /// Employment-increase rates for a company.
    pub fn employment_rates(&self, settings: &CreditSettings) -> EmploymentRates {
        self.employment_rates.rates(settings.size, settings.region)
    }

    /// Income-increase credit rate for a company.
    pub fn income_rate(&self, settings: &CreditSettings) -> Decimal {
        self.income_rates.rate(settings.size)
    }

    /// Normal-band deduction factor for a company.
    pub fn normal_band_factor(&self, settings: &CreditSettings) -> Decimal {
        if settings.growth_service {
            self.social_insurance_factors.growth_service_normal
        } else {
            self.social_insurance_factors.normal
        }
    }

    /// Looks up the employer insurance rate for a year.
    ///
    /// Unlike every other table, an unknown year is not an error: it
    /// resolves to the latest year in the table and is flagged as a
    /// fallback. Returns `None` only when the table is empty.
    ///
    /// # Example
    ///
    /// ```
    /// use tax_credit_engine::config::CreditTables;
    ///
    /// let tables = CreditTables::statutory();
    /// let known = tables.insurance_rate(2020).unwrap();
    /// assert!(!known.fallback);
    ///
    /// let future = tables.insurance_rate(2031).unwrap();
    /// assert!(future.fallback);
    /// assert_eq!(future.source_year, 2024);
    /// ```
    pub fn insurance_rate(&self, year: i32) -> Option<InsuranceRateLookup> {
        if let Some(rate) = self.insurance_rates.get(&year) {
            return Some(InsuranceRateLookup {
                rate: *rate,
                source_year: year,
                fallback: false,
            });
        }
        self.insurance_rates
            .last_key_value()
            .map(|(source_year, rate)| InsuranceRateLookup {
                rate: *rate,
                source_year: *source_year,
                fallback: true,
            })
    }
}

/// Partial tables read from `credit_tables.yaml`.
///
/// Absent sections keep the statutory values. Insurance rates merge year by
/// year.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TablesOverride {
    /// Replaces the employment-increase rates.
    pub employment_rates: Option<EmploymentRateTable>,
    /// Adds or replaces insurance rates for individual years.
    pub insurance_rates: BTreeMap<i32, Decimal>,
    /// Replaces the social-insurance band factors.
    pub social_insurance_factors: Option<SocialInsuranceFactors>,
    /// Replaces the income-increase rates.
    pub income_rates: Option<IncomeRateTable>,
    /// Replaces the youth age limit.
    pub youth_age_limit: Option<u32>,
    /// Replaces the income-increase salary cap.
    pub income_salary_cap: Option<Decimal>,
}

impl TablesOverride {
    /// Applies the overrides on top of `base`.
    pub fn apply(self, base: &CreditTables) -> CreditTables {
        let mut tables = base.clone();
        if let Some(rates) = self.employment_rates {
            tables.employment_rates = rates;
        }
        tables.insurance_rates.extend(self.insurance_rates);
        if let Some(factors) = self.social_insurance_factors {
            tables.social_insurance_factors = factors;
        }
        if let Some(rates) = self.income_rates {
            tables.income_rates = rates;
        }
        if let Some(limit) = self.youth_age_limit {
            tables.youth_age_limit = limit;
        }
        if let Some(cap) = self.income_salary_cap {
            tables.income_salary_cap = cap;
        }
        tables
    }
}
