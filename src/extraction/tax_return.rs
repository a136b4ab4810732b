//! Corporate tax return extraction.
//!
//! A return bundles several forms. Each page is checked against every
//! section marker, so one page may feed more than one section.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::error::EngineResult;
use crate::models::{TaxCreditItem, TaxReturnRecord};

use super::codes::{TAX_CREDIT_CODES, credit_name};
use super::document::{PageSource, TaxReturnExtraction, page_lines, readable_pages};
use super::shareholders::parse_shareholder_rows;
use super::text::{DATE_PATTERN, compact, parse_amount, spaced_label, year_from_file_name};

/// A value with an optional negative-sign glyph.
const VALUE_PATTERN: &str = r"(△|▲|-)?\s*(\d[\d,]*)";

/// Credit items below this amount are treated as noise.
pub const MIN_CREDIT_AMOUNT: i64 = 10_000;

/// Fallback minimum tax rate applied to the tax base.
pub const MIN_TAX_RATE: Decimal = Decimal::from_parts(7, 0, 0, false, 2);

/// Footer markers after which the credit summary sheet carries no data.
pub const CREDIT_FOOTERS: [&str; 3] = ["작성방법", "210mm×297mm", "210㎜×297㎜"];

static FISCAL_YEAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"{}\s*[:：]?\s*{DATE_PATTERN}(?:\s*[~∼\-]\s*{DATE_PATTERN})?",
        spaced_label("사업연도")
    ))
    .expect("valid fiscal year regex")
});

static CREDIT_ITEM_RE: LazyLock<Regex> = LazyLock::new(|| {
    let codes = TAX_CREDIT_CODES
        .iter()
        .map(|(code, _)| regex::escape(code))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"({codes})(\d{{1,3}}(?:,\d{{3}})+|\d+)")).expect("valid credit item regex")
});

/// Forms bundled in a tax return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxReturnSection {
    /// The return itself and the tax adjustment statement.
    Summary,
    /// The minimum tax adjustment statement.
    MinimumTax,
    /// The credit and reduction summary sheet.
    Credits,
    /// The share-change statement.
    Shareholders,
}

impl TaxReturnSection {
    /// Whitespace-free markers identifying the section.
    pub fn markers(&self) -> &'static [&'static str] {
        match self {
            TaxReturnSection::Summary => &["과세표준및세액신고서", "과세표준및세액조정계산서"],
            TaxReturnSection::MinimumTax => &["최저한세조정계산서"],
            TaxReturnSection::Credits => {
                &["공제감면세액및추가납부세액합계표", "공제감면세액합계표"]
            }
            TaxReturnSection::Shareholders => &["주식등변동상황명세서"],
        }
    }

    /// Every section whose marker appears in the page.
    pub fn detect(compact_text: &str) -> Vec<TaxReturnSection> {
        [
            TaxReturnSection::Summary,
            TaxReturnSection::MinimumTax,
            TaxReturnSection::Credits,
            TaxReturnSection::Shareholders,
        ]
        .into_iter()
        .filter(|section| section.markers().iter().any(|m| compact_text.contains(m)))
        .collect()
    }
}

/// Label spellings for one headline figure, longest first.
struct FieldLabels {
    labels: &'static [&'static str],
    code: Option<&'static str>,
    /// Longer labels that end with one of `labels` and name another figure.
    not_after: &'static [&'static str],
}

const TAX_BASE: FieldLabels = FieldLabels {
    labels: &["과세표준금액", "과세표준"],
    code: None,
    not_after: &[],
};
const CALCULATED_TAX: FieldLabels = FieldLabels {
    labels: &["산출세액"],
    code: None,
    not_after: &[],
};
const MIN_TAX_TARGET: FieldLabels = FieldLabels {
    labels: &["최저한세적용대상공제감면세액", "최저한세적용대상"],
    code: None,
    not_after: &[],
};
const DEDUCTED_TAX: FieldLabels = FieldLabels {
    labels: &["공제감면세액합계", "공제감면세액"],
    code: None,
    not_after: &["최저한세적용대상"],
};
const TOTAL_ADJUSTMENT: FieldLabels = FieldLabels {
    labels: &["최저한세적용으로인한조정감", "조정감"],
    code: None,
    not_after: &[],
};
const MIN_TAX: FieldLabels = FieldLabels {
    labels: &["최저한세액", "최저한세"],
    code: None,
    not_after: &[],
};

/// Finds the `nth` value printed right after a label.
///
/// Patterns are tried in order: a parenthesized line-item code then the
/// value, a bare code then the value, and the value alone. A bare code is
/// only tried when `code` is given; the value alone only when it is not.
/// Shorter label spellings are tried while the result is still zero, so a
/// printed zero and a missing value are indistinguishable.
///
/// # Example
///
/// ```
/// use tax_credit_engine::extraction::find_amount;
/// use rust_decimal::Decimal;
///
/// let text = "⑩ 과 세 표 준 △72,142,319 ⑪ 산출세액 0";
/// assert_eq!(
///     find_amount(text, &["과세표준금액", "과세표준"], None, 0),
///     Decimal::new(-72_142_319, 0)
/// );
/// assert_eq!(find_amount("세액 (113) 1,000", &["세액"], Some("113"), 0), Decimal::new(1000, 0));
/// ```
pub fn find_amount(text: &str, labels: &[&str], code: Option<&str>, nth: usize) -> Decimal {
    find_amount_not_after(text, labels, code, nth, &[])
}

/// Like [`find_amount`], skipping label hits whose preceding text ends
/// with one of `not_after`, whitespace ignored.
fn find_amount_not_after(
    text: &str,
    labels: &[&str],
    code: Option<&str>,
    nth: usize,
    not_after: &[&str],
) -> Decimal {
    let mut result = Decimal::ZERO;
    for label in labels {
        result = find_with_label(text, label, code, nth, not_after).unwrap_or(Decimal::ZERO);
        if !result.is_zero() {
            break;
        }
    }
    result
}

fn preceded_by(text: &str, start: usize, prefixes: &[&str]) -> bool {
    let before = compact(&text[..start]);
    prefixes.iter().any(|prefix| before.ends_with(prefix))
}

fn find_with_label(
    text: &str,
    label: &str,
    code: Option<&str>,
    nth: usize,
    not_after: &[&str],
) -> Option<Decimal> {
    let label = spaced_label(label);
    let patterns = match code {
        Some(code) => {
            let code = regex::escape(code);
            vec![
                format!(r"{label}\s*\(\s*{code}\s*\)\s*{VALUE_PATTERN}"),
                format!(r"{label}\s*{code}\s+{VALUE_PATTERN}"),
            ]
        }
        None => vec![
            format!(r"{label}\s*\(\s*\d{{1,3}}\s*\)\s*{VALUE_PATTERN}"),
            format!(r"{label}\s*{VALUE_PATTERN}"),
        ],
    };

    for pattern in patterns {
        let Ok(re) = Regex::new(&pattern) else {
            continue;
        };
        let hit = re
            .captures_iter(text)
            .filter(|caps| caps.get(0).is_some_and(|m| !preceded_by(text, m.start(), not_after)))
            .nth(nth);
        if let Some(caps) = hit {
            let sign = caps.get(1).map_or("", |m| m.as_str());
            return parse_amount(&format!("{}{}", sign, &caps[2]));
        }
    }
    None
}

/// Credit items on a credit summary page.
///
/// The page text is stripped of whitespace and cut at the form's footer
/// before scanning for `{code}{amount}` pairs.
pub fn credit_items(text: &str) -> Vec<TaxCreditItem> {
    let squeezed = compact(text);
    let end = CREDIT_FOOTERS
        .iter()
        .filter_map(|footer| squeezed.find(footer))
        .min()
        .unwrap_or(squeezed.len());
    let minimum = Decimal::new(MIN_CREDIT_AMOUNT, 0);

    CREDIT_ITEM_RE
        .captures_iter(&squeezed[..end])
        .filter_map(|caps| {
            let code = caps[1].to_string();
            let amount = parse_amount(&caps[2])?;
            (amount >= minimum).then(|| TaxCreditItem {
                name: credit_name(&code).unwrap_or_default().to_string(),
                code,
                amount,
            })
        })
        .collect()
}

/// Fiscal year from an in-document business-year label, using the end of
/// the printed period when one is given.
pub fn fiscal_year_label(text: &str) -> Option<i32> {
    let caps = FISCAL_YEAR_RE.captures(text)?;
    caps.get(4).or_else(|| caps.get(1))?.as_str().parse().ok()
}

/// Extracts headline figures, credit items and shareholder rows.
pub fn extract_tax_return(source: &dyn PageSource) -> EngineResult<TaxReturnExtraction> {
    let mut pages = Vec::new();
    for index in 0..readable_pages(source) {
        let text = page_lines(source, index)?
            .iter()
            .map(|line| line.text())
            .collect::<Vec<_>>()
            .join(" ");
        pages.push(text);
    }

    let year = pages
        .iter()
        .find_map(|text| fiscal_year_label(text))
        .or_else(|| year_from_file_name(source.file_name()));

    let mut record = TaxReturnRecord {
        year,
        ..Default::default()
    };
    let mut shareholders = Vec::new();
    let mut seen_items = HashSet::new();

    for (index, text) in pages.iter().enumerate() {
        let sections = TaxReturnSection::detect(&compact(text));
        if !sections.is_empty() {
            debug!(file_name = source.file_name(), page = index, sections = ?sections, "Tax return page");
        }
        for section in sections {
            match section {
                TaxReturnSection::Summary | TaxReturnSection::MinimumTax => {
                    read_headline(text, &mut record);
                }
                TaxReturnSection::Credits => {
                    for item in credit_items(text) {
                        if seen_items.insert((item.code.clone(), item.amount)) {
                            record.credit_items.push(item);
                        }
                    }
                }
                TaxReturnSection::Shareholders => match year {
                    Some(year) => shareholders.extend(parse_shareholder_rows(text, year)),
                    None => warn!(
                        file_name = source.file_name(),
                        page = index,
                        "Shareholder statement without a fiscal year skipped"
                    ),
                },
            }
        }
    }

    if record.min_tax.is_zero() {
        record.min_tax = (record.tax_base * MIN_TAX_RATE).floor().max(Decimal::ZERO);
    }
    record.refresh_min_tax_adjustment();

    debug!(
        file_name = source.file_name(),
        year = ?record.year,
        tax_base = %record.tax_base,
        credit_items = record.credit_items.len(),
        shareholders = shareholders.len(),
        "Extracted tax return"
    );
    Ok(TaxReturnExtraction {
        record,
        shareholders,
    })
}

/// Fills headline figures that are still zero.
fn read_headline(text: &str, record: &mut TaxReturnRecord) {
    let fields: [(&mut Decimal, &FieldLabels); 6] = [
        (&mut record.tax_base, &TAX_BASE),
        (&mut record.calculated_tax, &CALCULATED_TAX),
        (&mut record.min_tax_target, &MIN_TAX_TARGET),
        (&mut record.deducted_tax, &DEDUCTED_TAX),
        (&mut record.total_adjustment, &TOTAL_ADJUSTMENT),
        (&mut record.min_tax, &MIN_TAX),
    ];
    for (slot, field) in fields {
        if slot.is_zero() {
            *slot = find_amount_not_after(text, field.labels, field.code, 0, field.not_after);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::TokenDocument;
    use crate::models::PositionedToken;

    fn dec(v: i64) -> Decimal {
        Decimal::new(v, 0)
    }

    fn page(lines: &[&str]) -> Vec<PositionedToken> {
        let mut tokens = Vec::new();
        for (row, line) in lines.iter().enumerate() {
            let top = 20.0 + row as f64 * 30.0;
            let mut x = 10.0;
            for word in line.split(' ') {
                let width = 8.0 * word.chars().count() as f64;
                tokens.push(PositionedToken::new(word, x, x + width, top, top + 10.0));
                x += width + 20.0;
            }
        }
        tokens
    }

    #[test]
    fn test_negative_tax_base_with_triangle() {
        assert_eq!(
            find_amount("과세표준 △72,142,319", TAX_BASE.labels, None, 0),
            dec(-72_142_319)
        );
    }

    #[test]
    fn test_parenthesized_code_precedes_value_only() {
        let text = "산출세액 (16) 5,000,000";
        assert_eq!(find_amount(text, CALCULATED_TAX.labels, None, 0), dec(5_000_000));
    }

    #[test]
    fn test_required_code_must_follow_label() {
        let text = "공제세액 (114) 300,000 공제세액 (131) 900,000";
        assert_eq!(find_amount(text, &["공제세액"], Some("131"), 0), dec(900_000));
        assert_eq!(find_amount(text, &["공제세액"], Some("999"), 0), Decimal::ZERO);
        assert_eq!(find_amount("공제세액 131 700", &["공제세액"], Some("131"), 0), dec(700));
    }

    #[test]
    fn test_nth_match_is_returned() {
        let text = "산출세액 100 산출세액 200";
        assert_eq!(find_amount(text, &["산출세액"], None, 1), dec(200));
        assert_eq!(find_amount(text, &["산출세액"], None, 2), Decimal::ZERO);
    }

    #[test]
    fn test_shorter_label_retried_while_zero() {
        let text = "최저한세적용대상 0 최저한세 1,400,000";
        assert_eq!(find_amount(text, MIN_TAX.labels, None, 0), dec(1_400_000));
    }

    #[test]
    fn test_deducted_tax_skips_min_tax_target_line() {
        let text = "최저한세 적용대상 공제감면세액 (17) 5,000,000 산출세액 (16) 9,000,000";
        let mut record = TaxReturnRecord::default();
        read_headline(text, &mut record);
        assert_eq!(record.min_tax_target, dec(5_000_000));
        assert_eq!(record.deducted_tax, Decimal::ZERO);

        let text = "최저한세적용대상공제감면세액 (17) 5,000,000 공제감면세액 (18) 3,000,000";
        let mut record = TaxReturnRecord::default();
        read_headline(text, &mut record);
        assert_eq!(record.min_tax_target, dec(5_000_000));
        assert_eq!(record.deducted_tax, dec(3_000_000));
    }

    #[test]
    fn test_credit_items_filter_and_footer() {
        let text = "13R 19,250,000 13Q 5,000 14F 3 000 000 작성방법 131 8,000,000";
        let items = credit_items(text);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].code, "13R");
        assert_eq!(items[0].name, "고용증대 세액공제");
        assert_eq!(items[0].amount, dec(19_250_000));
        assert_eq!(items[1].code, "14F");
        assert_eq!(items[1].amount, dec(3_000_000));
    }

    #[test]
    fn test_fiscal_year_label_uses_period_end() {
        assert_eq!(fiscal_year_label("사업연도 2022.07.01 ~ 2023.06.30"), Some(2023));
        assert_eq!(fiscal_year_label("사 업 연 도 2021.01.01"), Some(2021));
        assert_eq!(fiscal_year_label("과세표준"), None);
    }

    #[test]
    fn test_sections_are_not_exclusive() {
        let sections = TaxReturnSection::detect("최저한세조정계산서주식등변동상황명세서");
        assert_eq!(
            sections,
            vec![TaxReturnSection::MinimumTax, TaxReturnSection::Shareholders]
        );
        assert!(TaxReturnSection::detect("표지").is_empty());
    }

    #[test]
    fn test_extract_tax_return_document() {
        let document = TokenDocument::new(
            "법인세_2022.pdf",
            vec![
                page(&[
                    "법인세 과세표준 및 세액신고서",
                    "사업연도 2023.01.01 ~ 2023.12.31",
                    "과세표준 300,000,000",
                    "산출세액 37,000,000",
                    "공제감면세액합계 20,000,000",
                ]),
                page(&[
                    "공제감면세액 및 추가납부세액합계표",
                    "13R 19,250,000",
                    "13R 19,250,000",
                    "작성방법",
                ]),
                page(&[
                    "주식등변동상황명세서",
                    "개인 홍길동 700101-1****** 00 6,000 60.00",
                ]),
            ],
        );

        let extraction = extract_tax_return(&document).unwrap();
        let record = &extraction.record;
        assert_eq!(record.year, Some(2023));
        assert_eq!(record.tax_base, dec(300_000_000));
        assert_eq!(record.calculated_tax, dec(37_000_000));
        assert_eq!(record.deducted_tax, dec(20_000_000));
        assert_eq!(record.min_tax, dec(21_000_000));
        assert_eq!(record.min_tax_adjustment, dec(-1_000_000));
        assert_eq!(record.credit_items.len(), 1);
        assert_eq!(extraction.shareholders.len(), 1);
        assert_eq!(extraction.shareholders[0].year, 2023);
    }

    #[test]
    fn test_loss_year_min_tax_fallback_is_zero() {
        let document = TokenDocument::new(
            "2021.pdf",
            vec![page(&["과세표준 및 세액조정계산서", "과세표준 △72,142,319"])],
        );
        let record = extract_tax_return(&document).unwrap().record;
        assert_eq!(record.year, Some(2021));
        assert_eq!(record.tax_base, dec(-72_142_319));
        assert_eq!(record.min_tax, Decimal::ZERO);
    }
}
