//! Per-month employment and age-band classification.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use tracing::debug;

use crate::extraction::month_end;
use crate::models::{EmployeeClassification, EmployeeRecord, id_prefix};

/// Two-digit birth years below this are read as 20xx.
pub const CENTURY_PIVOT: u32 = 30;

/// Decodes a birth date from the first six digits of a national ID.
///
/// # Example
///
/// ```
/// use tax_credit_engine::analysis::birth_date_from_id;
/// use chrono::NaiveDate;
///
/// assert_eq!(birth_date_from_id(Some("950101-1******")), NaiveDate::from_ymd_opt(1995, 1, 1));
/// assert_eq!(birth_date_from_id(Some("030315-3******")), NaiveDate::from_ymd_opt(2003, 3, 15));
/// assert_eq!(birth_date_from_id(Some("991399-1******")), None);
/// ```
pub fn birth_date_from_id(id: Option<&str>) -> Option<NaiveDate> {
    let digits = id_prefix(id)?;
    let yy: u32 = digits[0..2].parse().ok()?;
    let mm: u32 = digits[2..4].parse().ok()?;
    let dd: u32 = digits[4..6].parse().ok()?;
    let century = if yy < CENTURY_PIVOT { 2000 } else { 1900 };
    NaiveDate::from_ymd_opt((century + yy) as i32, mm, dd)
}

/// Age in completed years on `date`.
pub fn age_on(birth_date: NaiveDate, date: NaiveDate) -> i32 {
    let had_birthday = (date.month(), date.day()) >= (birth_date.month(), birth_date.day());
    date.year() - birth_date.year() - i32::from(!had_birthday)
}

/// Returns true when the person is on the payroll at `date`.
///
/// A missing hire date counts as employed since before the year.
pub fn employed_on(record: &EmployeeRecord, date: NaiveDate) -> bool {
    record.hire_date.is_none_or(|hire| hire <= date)
        && record.retire_date.is_none_or(|retire| retire >= date)
}

/// Classifies one employee-year month by month.
///
/// Each month-end the person is employed counts toward the youth band when
/// their age is at most `youth_age_limit`, otherwise toward the normal
/// band. An undecodable birth date always counts as normal. Pay for every
/// month goes to that month's band. The social-insurance sums leave out
/// pay for the month the person resigned in.
pub fn classify_employee(record: &EmployeeRecord, youth_age_limit: u32) -> EmployeeClassification {
    let birth_date = birth_date_from_id(record.national_id.as_deref());
    let resign_month = record
        .retire_date
        .filter(|d| d.year() == record.fiscal_year)
        .map(|d| d.month());

    let mut classification = EmployeeClassification {
        birth_date,
        ..Default::default()
    };
    let mut last_employed_youth = None;

    for month in 1..=12u32 {
        let Some(end) = month_end(record.fiscal_year, month) else {
            continue;
        };
        let youth = birth_date.is_some_and(|birth| age_on(birth, end) <= youth_age_limit as i32);
        let pay = record.monthly_pay(month);
        let insured_pay = if resign_month == Some(month) {
            Decimal::ZERO
        } else {
            pay
        };

        if employed_on(record, end) {
            if youth {
                classification.youth_months += 1;
            } else {
                classification.normal_months += 1;
            }
            last_employed_youth = Some(youth);
        }

        if youth {
            classification.youth_salary += pay;
            classification.insured_youth_salary += insured_pay;
        } else {
            classification.normal_salary += pay;
            classification.insured_normal_salary += insured_pay;
        }
    }

    classification.is_youth = last_employed_youth.unwrap_or(false);
    classification.employed_at_year_end = month_end(record.fiscal_year, 12)
        .is_some_and(|end| employed_on(record, end));
    classification
}

/// Classifies every record in place.
pub fn analyze_employees(records: &mut [EmployeeRecord], youth_age_limit: u32) {
    for record in records.iter_mut() {
        record.classification = Some(classify_employee(record, youth_age_limit));
    }
    debug!(records = records.len(), youth_age_limit, "Classified employees");
}
