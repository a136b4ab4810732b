//! Shared recognition helpers for noisy extracted text.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;

/// A date written as `2023.01.02`, `2023-1-2` or `2023년 1월 2일`, with
/// arbitrary spacing between parts.
pub const DATE_PATTERN: &str =
    r"(\d{4})\s*[.\-/년]\s*(\d{1,2})\s*[.\-/월]\s*(\d{1,2})\s*일?";

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DATE_PATTERN).expect("valid date regex"));

static YEAR_IN_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\D)((?:19|20)\d{2})(?:\D|$)").expect("valid year regex"));

/// Builds a regex fragment matching `label` with optional whitespace
/// between every glyph.
///
/// # Example
///
/// ```
/// use regex::Regex;
/// use tax_credit_engine::extraction::spaced_label;
///
/// let re = Regex::new(&spaced_label("입사일")).unwrap();
/// assert!(re.is_match("입 사  일 2021.03.02"));
/// ```
pub fn spaced_label(label: &str) -> String {
    label
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| regex::escape(&c.to_string()))
        .collect::<Vec<_>>()
        .join(r"\s*")
}

/// Removes every whitespace character.
pub fn compact(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Builds a date from captured year/month/day strings.
pub fn date_from_parts(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

/// Parses the first date in `text`.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let caps = DATE_RE.captures(text)?;
    date_from_parts(&caps[1], &caps[2], &caps[3])
}

/// Parses an amount such as `1,234,567`, `-500` or `△72,142,319`.
///
/// The triangle glyphs used on Korean tax forms mark negative values.
/// Returns `None` when no digits remain after stripping separators.
///
/// # Example
///
/// ```
/// use tax_credit_engine::extraction::parse_amount;
/// use rust_decimal::Decimal;
///
/// assert_eq!(parse_amount("△72,142,319"), Some(Decimal::new(-72_142_319, 0)));
/// assert_eq!(parse_amount("3,000,000"), Some(Decimal::new(3_000_000, 0)));
/// assert_eq!(parse_amount("급여"), None);
/// ```
pub fn parse_amount(text: &str) -> Option<Decimal> {
    let trimmed = text.trim();
    let negative = trimmed.starts_with(['△', '▲', '-']);
    let digits: String = trimmed
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if !digits.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    let value: Decimal = digits.parse().ok()?;
    Some(if negative { -value } else { value })
}

/// Returns true for text made only of digits and thousands separators.
pub fn is_numeric(text: &str) -> bool {
    let text = text.trim();
    !text.is_empty()
        && text.chars().any(|c| c.is_ascii_digit())
        && text.chars().all(|c| c.is_ascii_digit() || c == ',')
}

/// Finds a four-digit year in a file name.
pub fn year_from_file_name(file_name: &str) -> Option<i32> {
    YEAR_IN_NAME_RE
        .captures(file_name)
        .and_then(|caps| caps[1].parse().ok())
}

/// The last day of a month.
pub fn month_end(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_parse_date_accepts_common_layouts() {
        assert_eq!(parse_date("2021.03.02"), Some(make_date("2021-03-02")));
        assert_eq!(parse_date("2021 - 3 - 2"), Some(make_date("2021-03-02")));
        assert_eq!(parse_date("2021년 03월 02일 취임"), Some(make_date("2021-03-02")));
        assert_eq!(parse_date("2021.13.40"), None);
        assert_eq!(parse_date("없음"), None);
    }

    #[test]
    fn test_parse_amount_handles_negative_markers() {
        assert_eq!(parse_amount("-1,000"), Some(Decimal::new(-1000, 0)));
        assert_eq!(parse_amount("▲ 500"), Some(Decimal::new(-500, 0)));
        assert_eq!(parse_amount("12.50"), Some(Decimal::new(1250, 2)));
        assert_eq!(parse_amount(","), None);
    }

    #[test]
    fn test_is_numeric_rejects_text() {
        assert!(is_numeric("1,250,000"));
        assert!(is_numeric("0"));
        assert!(!is_numeric("1월"));
        assert!(!is_numeric(""));
        assert!(!is_numeric(",,"));
    }

    #[test]
    fn test_year_from_file_name() {
        assert_eq!(year_from_file_name("2022_원천징수부.pdf"), Some(2022));
        assert_eq!(year_from_file_name("법인세신고서(2019).pdf"), Some(2019));
        assert_eq!(year_from_file_name("scan_120234.pdf"), None);
        assert_eq!(year_from_file_name("ledger.pdf"), None);
    }

    #[test]
    fn test_month_end_handles_february_and_december() {
        assert_eq!(month_end(2024, 2), Some(make_date("2024-02-29")));
        assert_eq!(month_end(2023, 2), Some(make_date("2023-02-28")));
        assert_eq!(month_end(2023, 12), Some(make_date("2023-12-31")));
    }

    #[test]
    fn test_spaced_label_escapes_metacharacters() {
        let re = Regex::new(&spaced_label("(13)")).unwrap();
        assert!(re.is_match("( 1 3 )"));
        assert!(!re.is_match("13"));
    }
}
