//! Employee-year model and related types.
//!
//! An [`EmployeeRecord`] is one person in one fiscal year, as read from a
//! withholding ledger. The status analyzer fills in its
//! [`EmployeeClassification`] and the exclusion resolver sets its
//! [`ExclusionReason`].

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Twelve monthly amounts indexed by calendar month (1 through 12).
///
/// # Example
///
/// ```
/// use tax_credit_engine::models::MonthlyAmounts;
/// use rust_decimal::Decimal;
///
/// let mut salary = MonthlyAmounts::default();
/// salary.set(3, Decimal::new(2_500_000, 0));
/// assert_eq!(salary.get(3), Decimal::new(2_500_000, 0));
/// assert_eq!(salary.get(13), Decimal::ZERO);
/// assert_eq!(salary.total(), Decimal::new(2_500_000, 0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MonthlyAmounts([Decimal; 12]);

impl MonthlyAmounts {
    /// Builds amounts from January..December values.
    pub fn from_months(values: [Decimal; 12]) -> Self {
        Self(values)
    }

    /// Returns the amount for a month, or zero outside 1..=12.
    pub fn get(&self, month: u32) -> Decimal {
        match month {
            1..=12 => self.0[(month - 1) as usize],
            _ => Decimal::ZERO,
        }
    }

    /// Sets the amount for a month. Returns false when the month is out of range.
    pub fn set(&mut self, month: u32, amount: Decimal) -> bool {
        match month {
            1..=12 => {
                self.0[(month - 1) as usize] = amount;
                true
            }
            _ => false,
        }
    }

    /// Sum over all twelve months.
    pub fn total(&self) -> Decimal {
        self.0.iter().copied().sum()
    }

    /// Copies months that are still zero here from `other`.
    pub fn fill_missing(&mut self, other: &MonthlyAmounts) {
        for (slot, value) in self.0.iter_mut().zip(other.0.iter()) {
            if slot.is_zero() {
                *slot = *value;
            }
        }
    }

    /// Iterates `(month, amount)` pairs in calendar order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, Decimal)> + '_ {
        self.0.iter().enumerate().map(|(i, v)| (i as u32 + 1, *v))
    }
}

/// Why an employee is left out of credit calculations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    /// Counted normally.
    #[default]
    None,
    /// Registered as an executive during the fiscal year.
    Executive,
    /// Listed as a shareholder (or a related party) for the fiscal year.
    Shareholder,
    /// Excluded by the preparer for another reason.
    Other,
}

impl ExclusionReason {
    /// Returns true when the record takes part in credit calculations.
    pub fn is_included(&self) -> bool {
        matches!(self, ExclusionReason::None)
    }
}

/// Derived per-year employment facts for one employee.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EmployeeClassification {
    /// Birth date decoded from the national ID, when decodable.
    pub birth_date: Option<NaiveDate>,
    /// Month-ends employed while in the youth band.
    pub youth_months: u32,
    /// Month-ends employed while in the normal band.
    pub normal_months: u32,
    /// Pay attributed to youth-band months (income-tax basis).
    pub youth_salary: Decimal,
    /// Pay attributed to normal-band months (income-tax basis).
    pub normal_salary: Decimal,
    /// Youth-band pay on the social-insurance basis.
    pub insured_youth_salary: Decimal,
    /// Normal-band pay on the social-insurance basis.
    pub insured_normal_salary: Decimal,
    /// Youth band at the last month-end the person was employed.
    pub is_youth: bool,
    /// Employed on December 31 of the fiscal year.
    pub employed_at_year_end: bool,
}

impl EmployeeClassification {
    /// Total employed month-ends across both bands.
    pub fn employed_months(&self) -> u32 {
        self.youth_months + self.normal_months
    }
}

/// One person in one fiscal year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    /// Name as printed on the ledger.
    pub name: String,
    /// National ID, possibly masked after the dash.
    #[serde(default)]
    pub national_id: Option<String>,
    /// The fiscal year the ledger covers.
    pub fiscal_year: i32,
    /// Hire date, when printed.
    #[serde(default)]
    pub hire_date: Option<NaiveDate>,
    /// Retire date, when printed and inside the fiscal year.
    #[serde(default)]
    pub retire_date: Option<NaiveDate>,
    /// Monthly salary.
    #[serde(default)]
    pub salary: MonthlyAmounts,
    /// Monthly bonus.
    #[serde(default)]
    pub bonus: MonthlyAmounts,
    /// Derived classification, filled by the status analyzer.
    #[serde(default)]
    pub classification: Option<EmployeeClassification>,
    /// Exclusion flag, filled by the exclusion resolver or the preparer.
    #[serde(default)]
    pub exclusion_reason: ExclusionReason,
}

impl EmployeeRecord {
    /// Creates an unclassified record with empty monthly maps.
    pub fn new(name: impl Into<String>, national_id: Option<String>, fiscal_year: i32) -> Self {
        Self {
            name: name.into(),
            national_id,
            fiscal_year,
            hire_date: None,
            retire_date: None,
            salary: MonthlyAmounts::default(),
            bonus: MonthlyAmounts::default(),
            classification: None,
            exclusion_reason: ExclusionReason::None,
        }
    }

    /// Salary plus bonus for one month.
    pub fn monthly_pay(&self, month: u32) -> Decimal {
        self.salary.get(month) + self.bonus.get(month)
    }

    /// Salary plus bonus over the whole year.
    pub fn total_salary(&self) -> Decimal {
        self.salary.total() + self.bonus.total()
    }

    /// The birth-date digits of the national ID, when present.
    pub fn id_prefix(&self) -> Option<&str> {
        id_prefix(self.national_id.as_deref())
    }

    /// Returns true when the retire date falls inside this record's fiscal year.
    pub fn resigned_in_year(&self) -> bool {
        self.retire_date
            .is_some_and(|d| d.year() == self.fiscal_year)
    }

    /// Returns true when the hire date falls inside this record's fiscal year.
    pub fn hired_in_year(&self) -> bool {
        self.hire_date.is_some_and(|d| d.year() == self.fiscal_year)
    }

    /// Returns true when both records describe the same person in the same year.
    pub fn same_entry(&self, other: &EmployeeRecord) -> bool {
        self.name == other.name
            && self.national_id == other.national_id
            && self.fiscal_year == other.fiscal_year
    }

    /// Fills months and dates still missing here from `other`.
    pub fn fill_missing(&mut self, other: &EmployeeRecord) {
        self.salary.fill_missing(&other.salary);
        self.bonus.fill_missing(&other.bonus);
        self.hire_date = self.hire_date.or(other.hire_date);
        self.retire_date = self.retire_date.or(other.retire_date);
    }
}

/// Extracts the six leading digits of a national ID.
pub fn id_prefix(id: Option<&str>) -> Option<&str> {
    let id = id?.trim();
    let prefix = id.get(..6)?;
    prefix
        .chars()
        .all(|c| c.is_ascii_digit())
        .then_some(prefix)
}

/// One row of the employee sheet handed to the spreadsheet generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeRow {
    /// Fiscal year of the row.
    pub year: i32,
    /// Employee name.
    pub name: String,
    /// National ID as printed.
    pub id: Option<String>,
    /// Hire date.
    pub hire_date: Option<NaiveDate>,
    /// Retire date.
    pub retire_date: Option<NaiveDate>,
    /// Salary plus bonus for the year.
    pub total_salary: Decimal,
    /// Youth band at the last employed month-end.
    pub is_youth: bool,
    /// Youth-band employed month-ends.
    pub youth_months: u32,
    /// Normal-band employed month-ends.
    pub normal_months: u32,
    /// Current exclusion flag.
    pub exclusion_reason: ExclusionReason,
}

impl From<&EmployeeRecord> for EmployeeRow {
    fn from(record: &EmployeeRecord) -> Self {
        let classification = record.classification.clone().unwrap_or_default();
        EmployeeRow {
            year: record.fiscal_year,
            name: record.name.clone(),
            id: record.national_id.clone(),
            hire_date: record.hire_date,
            retire_date: record.retire_date,
            total_salary: record.total_salary(),
            is_youth: classification.is_youth,
            youth_months: classification.youth_months,
            normal_months: classification.normal_months,
            exclusion_reason: record.exclusion_reason,
        }
    }
}
