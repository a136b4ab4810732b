//! Payroll withholding ledger extraction.
//!
//! Each cover page of a ledger describes one employee: identity and
//! employment dates at the top, then a month-by-month table whose salary and
//! bonus columns are located from their header labels.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::EngineResult;
use crate::models::{BoundingBox, EmployeeRecord, MonthlyAmounts, Word};

use super::assembler::{assemble_words, group_lines};
use super::document::{PageSource, readable_pages};
use super::text::{
    DATE_PATTERN, compact, date_from_parts, is_numeric, parse_amount, spaced_label,
    year_from_file_name,
};

/// Month labels are only searched left of this x coordinate.
pub const MONTH_MARGIN_X: f64 = 100.0;

/// Horizontal tolerance (px) between a column anchor and a cell.
pub const CELL_TOLERANCE_X: f64 = 40.0;

/// Vertical tolerance (px) between a month row and a cell.
pub const CELL_TOLERANCE_Y: f64 = 5.0;

/// How far (px) an index marker may sit from its header label.
const MARKER_REACH_X: f64 = 60.0;
const MARKER_REACH_Y: f64 = 40.0;

/// Largest gap (px) between the two glyphs of a split index marker.
const SPLIT_MARKER_GAP: f64 = 12.0;

const TITLE_MARKER: &str = "근로소득원천징수부";
const HIRE_LABEL: &str = "입사일";
const RETIRE_LABEL: &str = "퇴사일";

/// A table column found by its header label and optional index marker.
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    /// Header label, e.g. "급여".
    pub label: &'static str,
    /// Printed column index markers, e.g. "⑦" or "(7)".
    pub markers: &'static [&'static str],
}

/// The salary column.
pub const SALARY_COLUMN: ColumnSpec = ColumnSpec {
    label: "급여",
    markers: &["⑦", "(7)"],
};

/// The bonus column.
pub const BONUS_COLUMN: ColumnSpec = ColumnSpec {
    label: "상여",
    markers: &["⑧", "(8)"],
};

static NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"{}\s*[:：]?\s*([가-힣]{{2,5}})", spaced_label("성명")))
        .expect("valid name regex")
});

static ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{6})\s*-\s*([\d*]{6,7})").expect("valid id regex"));

static HIRE_RE: LazyLock<Regex> = LazyLock::new(|| labelled_date(HIRE_LABEL));
static RETIRE_RE: LazyLock<Regex> = LazyLock::new(|| labelled_date(RETIRE_LABEL));
static COVER_LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("{}|{}", spaced_label(HIRE_LABEL), spaced_label(RETIRE_LABEL)))
        .expect("valid cover label regex")
});

static YEAR_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(\d{{4}})\s*년?\s*{}", spaced_label("귀속"))).expect("valid year regex")
});
static YEAR_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"{}\s*(?:연\s*도|년\s*도)?\s*[:：]?\s*(\d{{4}})", spaced_label("귀속")))
        .expect("valid year regex")
});

static MONTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(0?[1-9]|1[0-2])월?$").expect("valid month regex"));

fn labelled_date(label: &str) -> Regex {
    Regex::new(&format!(
        r"{}\s*자?\s*[:：]?\s*{}",
        spaced_label(label),
        DATE_PATTERN
    ))
    .expect("valid labelled date regex")
}

/// Employee-year records read from one withholding ledger.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WithholdingLedger {
    /// The ledger's fiscal year, when it could be determined.
    pub fiscal_year: Option<i32>,
    /// One record per person.
    pub employees: Vec<EmployeeRecord>,
}

/// Extracts every employee cover page of a ledger.
///
/// Pages without a recognizable name are dropped. Repeated cover pages for
/// the same person merge, later pages filling months that are still empty.
pub fn extract_withholding(source: &dyn PageSource) -> EngineResult<WithholdingLedger> {
    let file_year = year_from_file_name(source.file_name());
    let mut ledger = WithholdingLedger::default();

    for index in 0..readable_pages(source) {
        let words = assemble_words(&source.page_tokens(index)?);
        match read_cover_page(&words, ledger.fiscal_year.or(file_year)) {
            Some(record) => {
                ledger.fiscal_year.get_or_insert(record.fiscal_year);
                merge_record(&mut ledger.employees, record);
            }
            None => debug!(
                file_name = source.file_name(),
                page = index,
                "Dropped page without an employee cover"
            ),
        }
    }

    debug!(
        file_name = source.file_name(),
        employees = ledger.employees.len(),
        fiscal_year = ?ledger.fiscal_year,
        "Extracted withholding ledger"
    );
    Ok(ledger)
}

/// Reads one page as an employee cover page.
///
/// `fallback_year` is used when the page carries no fiscal-year label.
pub fn read_cover_page(words: &[Word], fallback_year: Option<i32>) -> Option<EmployeeRecord> {
    let text = group_lines(words)
        .iter()
        .map(|line| line.text())
        .collect::<Vec<_>>()
        .join(" ");

    let is_cover = COVER_LABEL_RE.is_match(&text) || compact(&text).contains(TITLE_MARKER);
    if !is_cover {
        return None;
    }

    let name = NAME_RE.captures(&text)?[1].to_string();
    let national_id = ID_RE
        .captures(&text)
        .map(|caps| format!("{}-{}", &caps[1], &caps[2]));
    let hire_date = labelled(&HIRE_RE, &text);
    let retire_date = labelled(&RETIRE_RE, &text);

    let fiscal_year = fiscal_year_label(&text)
        .or(fallback_year)
        .or_else(|| hire_date.max(retire_date).map(|d| d.year()))?;

    let retire_date = retire_date.filter(|date| {
        let keep = date.year() <= fiscal_year;
        if !keep {
            debug!(name = %name, retire_date = %date, fiscal_year, "Discarded retire date after fiscal year end");
        }
        keep
    });

    let mut record = EmployeeRecord::new(name, national_id, fiscal_year);
    record.hire_date = hire_date;
    record.retire_date = retire_date;

    let rows = month_rows(words);
    let header_limit = rows.values().copied().reduce(f64::min);
    if let Some(x) = locate_column(words, &SALARY_COLUMN, header_limit) {
        record.salary = read_column(words, &rows, x);
    }
    if let Some(x) = locate_column(words, &BONUS_COLUMN, header_limit) {
        record.bonus = read_column(words, &rows, x);
    }

    Some(record)
}

fn labelled(re: &Regex, text: &str) -> Option<NaiveDate> {
    let caps = re.captures(text)?;
    date_from_parts(&caps[1], &caps[2], &caps[3])
}

fn fiscal_year_label(text: &str) -> Option<i32> {
    YEAR_SUFFIX_RE
        .captures(text)
        .or_else(|| YEAR_PREFIX_RE.captures(text))
        .and_then(|caps| caps[1].parse().ok())
}

/// Finds month labels in the left margin, keyed by month, valued by the
/// row's vertical center. The first (topmost) occurrence of a month wins.
pub fn month_rows(words: &[Word]) -> BTreeMap<u32, f64> {
    let mut candidates: Vec<&Word> = words
        .iter()
        .filter(|w| w.bbox.x0 < MONTH_MARGIN_X)
        .collect();
    candidates.sort_by(|a, b| a.bbox.center_y().total_cmp(&b.bbox.center_y()));

    let mut rows = BTreeMap::new();
    for word in candidates {
        let text = word.compact();
        let Some(caps) = MONTH_RE.captures(&text) else {
            continue;
        };
        if let Ok(month) = caps[1].parse::<u32>() {
            rows.entry(month).or_insert(word.bbox.center_y());
        }
    }
    rows
}

/// Locates a column's x coordinate.
///
/// Header labels longer than the label plus one glyph are compound labels
/// of other columns and are ignored. When an index marker sits near the
/// chosen label its position wins; otherwise the label's own position is
/// used. Without any label, a lone index marker is used.
pub fn locate_column(words: &[Word], spec: &ColumnSpec, header_limit: Option<f64>) -> Option<f64> {
    let max_len = spec.label.chars().count() + 1;
    let label = words
        .iter()
        .filter(|w| header_limit.is_none_or(|limit| w.bbox.center_y() < limit))
        .filter(|w| {
            let text = w.compact();
            text.contains(spec.label) && text.chars().count() <= max_len
        })
        .max_by(|a, b| a.bbox.top.total_cmp(&b.bbox.top));

    let markers = index_markers(words, spec.markers);

    match label {
        Some(label) => {
            let near = markers
                .iter()
                .filter(|m| {
                    (m.center_x() - label.bbox.center_x()).abs() <= MARKER_REACH_X
                        && (m.center_y() - label.bbox.center_y()).abs() <= MARKER_REACH_Y
                })
                .min_by(|a, b| {
                    let da = (a.center_x() - label.bbox.center_x()).abs();
                    let db = (b.center_x() - label.bbox.center_x()).abs();
                    da.total_cmp(&db)
                });
            Some(near.map_or(label.bbox.center_x(), |m| m.center_x()))
        }
        None => markers.first().map(|m| m.center_x()),
    }
}

/// Boxes of index markers, including markers split into two adjacent words.
fn index_markers(words: &[Word], markers: &[&str]) -> Vec<BoundingBox> {
    let mut found: Vec<BoundingBox> = words
        .iter()
        .filter(|w| markers.contains(&w.compact().as_str()))
        .map(|w| w.bbox)
        .collect();

    for (i, first) in words.iter().enumerate() {
        for second in &words[i + 1..] {
            let adjacent = first.page == second.page
                && (first.bbox.top - second.bbox.top).abs() < CELL_TOLERANCE_Y
                && second.bbox.x0 >= first.bbox.x0
                && first.bbox.horizontal_gap(&second.bbox) < SPLIT_MARKER_GAP;
            if adjacent {
                let joined = format!("{}{}", first.compact(), second.compact());
                if markers.contains(&joined.as_str()) {
                    found.push(first.bbox.union(&second.bbox));
                }
            }
        }
    }
    found
}

/// Reads the numeric cell of every month row in one column.
fn read_column(words: &[Word], rows: &BTreeMap<u32, f64>, column_x: f64) -> MonthlyAmounts {
    let mut amounts = MonthlyAmounts::default();
    for (&month, &row_y) in rows {
        let cell = words
            .iter()
            .filter(|w| {
                (w.bbox.center_x() - column_x).abs() <= CELL_TOLERANCE_X
                    && (w.bbox.center_y() - row_y).abs() <= CELL_TOLERANCE_Y
                    && is_numeric(&w.text)
            })
            .min_by(|a, b| {
                let da = (a.bbox.center_x() - column_x).abs();
                let db = (b.bbox.center_x() - column_x).abs();
                da.total_cmp(&db)
            });
        if let Some(value) = cell.and_then(|w| parse_amount(&w.text)) {
            amounts.set(month, value);
        }
    }
    amounts
}

fn merge_record(employees: &mut Vec<EmployeeRecord>, record: EmployeeRecord) {
    match employees.iter_mut().find(|e| e.same_entry(&record)) {
        Some(existing) => existing.fill_missing(&record),
        None => employees.push(record),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::TokenDocument;
    use crate::models::PositionedToken;
    use rust_decimal::Decimal;

    fn at(text: &str, x0: f64, top: f64) -> PositionedToken {
        let width = 8.0 * text.chars().count() as f64;
        PositionedToken::new(text, x0, x0 + width, top, top + 10.0)
    }

    fn centered(text: &str, cx: f64, top: f64) -> PositionedToken {
        let width = 8.0 * text.chars().count() as f64;
        at(text, cx - width / 2.0, top)
    }

    fn dec(v: i64) -> Decimal {
        Decimal::new(v, 0)
    }

    fn make_date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn cover_page(name: &str, id: &str, retire: Option<&str>) -> Vec<PositionedToken> {
        let mut tokens = vec![
            at("근로소득", 200.0, 20.0),
            at("원천징수부", 250.0, 20.0),
            at("2023년", 400.0, 20.0),
            at("귀속", 460.0, 20.0),
            at("성명", 20.0, 60.0),
            at(name, 80.0, 60.0),
            at("주민등록번호", 200.0, 60.0),
            at(id, 300.0, 60.0),
            at("입사일", 20.0, 80.0),
            at("2021.03.02", 80.0, 80.0),
            at("퇴사일", 200.0, 80.0),
            centered("급여", 158.0, 120.0),
            centered("⑦", 160.0, 135.0),
            centered("상여", 300.0, 120.0),
            centered("인정상여", 420.0, 120.0),
        ];
        if let Some(retire) = retire {
            tokens.push(at(retire, 260.0, 80.0));
        }
        for month in 1..=12u32 {
            let top = 150.0 + month as f64 * 20.0;
            tokens.push(at(&format!("{}월", month), 20.0, top));
            tokens.push(centered("3,000,000", 160.0, top));
            tokens.push(centered("999", 420.0, top));
        }
        tokens.push(centered("500,000", 300.0, 150.0 + 6.0 * 20.0));
        tokens
    }

    #[test]
    fn test_cover_page_identity_and_dates() {
        let words = assemble_words(&cover_page("김민수", "950101-1******", Some("2023.10.31")));
        let record = read_cover_page(&words, None).unwrap();

        assert_eq!(record.name, "김민수");
        assert_eq!(record.national_id.as_deref(), Some("950101-1******"));
        assert_eq!(record.fiscal_year, 2023);
        assert_eq!(record.hire_date, Some(make_date("2021-03-02")));
        assert_eq!(record.retire_date, Some(make_date("2023-10-31")));
    }

    #[test]
    fn test_salary_and_bonus_columns_are_read_per_month() {
        let words = assemble_words(&cover_page("김민수", "950101-1******", None));
        let record = read_cover_page(&words, None).unwrap();

        assert_eq!(record.salary.get(1), dec(3_000_000));
        assert_eq!(record.salary.get(12), dec(3_000_000));
        assert_eq!(record.salary.total(), dec(36_000_000));
        assert_eq!(record.bonus.get(6), dec(500_000));
        assert_eq!(record.bonus.total(), dec(500_000));
    }

    #[test]
    fn test_retire_date_after_fiscal_year_is_discarded() {
        let words = assemble_words(&cover_page("김민수", "950101-1******", Some("2024.01.15")));
        let record = read_cover_page(&words, None).unwrap();
        assert_eq!(record.retire_date, None);
    }

    #[test]
    fn test_page_without_cover_labels_is_not_a_cover() {
        let words = assemble_words(&[at("성명", 20.0, 60.0), at("김민수", 80.0, 60.0)]);
        assert!(read_cover_page(&words, Some(2023)).is_none());
    }

    #[test]
    fn test_cover_without_name_is_dropped() {
        let words = assemble_words(&[at("입사일", 20.0, 80.0), at("2021.03.02", 80.0, 80.0)]);
        assert!(read_cover_page(&words, Some(2023)).is_none());
    }

    #[test]
    fn test_spaced_labels_are_recognized() {
        let words = assemble_words(&[
            at("성", 20.0, 60.0),
            at("명", 40.0, 60.0),
            at("이서연", 80.0, 60.0),
            at("입", 20.0, 80.0),
            at("사", 40.0, 80.0),
            at("일", 60.0, 80.0),
            at("2022.7.1", 100.0, 80.0),
        ]);
        let record = read_cover_page(&words, Some(2022)).unwrap();
        assert_eq!(record.name, "이서연");
        assert_eq!(record.hire_date, Some(make_date("2022-07-01")));
        assert_eq!(record.fiscal_year, 2022);
    }

    #[test]
    fn test_month_rows_keep_first_occurrence() {
        let words = assemble_words(&[
            at("3월", 20.0, 300.0),
            at("3", 20.0, 100.0),
            at("1월", 20.0, 200.0),
            at("1월", 150.0, 50.0),
        ]);
        let rows = month_rows(&words);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[&3], 105.0);
        assert_eq!(rows[&1], 205.0);
    }

    #[test]
    fn test_compound_labels_are_not_columns() {
        let words = assemble_words(&[centered("인정상여", 100.0, 10.0)]);
        assert_eq!(locate_column(&words, &BONUS_COLUMN, None), None);
    }

    #[test]
    fn test_marker_near_label_wins() {
        let words = assemble_words(&[centered("급여", 200.0, 10.0), centered("(7)", 230.0, 30.0)]);
        let x = locate_column(&words, &SALARY_COLUMN, None).unwrap();
        assert_eq!(x, 230.0);
    }

    #[test]
    fn test_distant_marker_falls_back_to_label() {
        let words = assemble_words(&[centered("급여", 200.0, 10.0), centered("⑦", 400.0, 30.0)]);
        let x = locate_column(&words, &SALARY_COLUMN, None).unwrap();
        assert_eq!(x, 200.0);
    }

    #[test]
    fn test_split_two_glyph_marker_is_recognized() {
        let words = assemble_words(&[
            centered("급여", 200.0, 10.0),
            at("(7", 210.0, 30.0),
            at(")", 234.0, 30.0),
        ]);
        let x = locate_column(&words, &SALARY_COLUMN, None).unwrap();
        assert_eq!(x, (210.0 + 242.0) / 2.0);
    }

    #[test]
    fn test_non_numeric_cells_are_rejected() {
        let words = assemble_words(&[
            centered("급여", 200.0, 10.0),
            at("1월", 20.0, 50.0),
            centered("해당없음", 200.0, 50.0),
        ]);
        let rows = month_rows(&words);
        let amounts = read_column(&words, &rows, 200.0);
        assert_eq!(amounts.total(), Decimal::ZERO);
    }

    #[test]
    fn test_repeated_cover_pages_merge() {
        let mut second = cover_page("김민수", "950101-1******", None);
        second.retain(|t| t.text != "3,000,000");
        let document = TokenDocument::new(
            "2023_원천징수부.pdf",
            vec![
                cover_page("김민수", "950101-1******", None),
                second,
                vec![at("별지", 20.0, 20.0)],
                cover_page("박지훈", "880202-1******", None),
            ],
        );

        let ledger = extract_withholding(&document).unwrap();
        assert_eq!(ledger.fiscal_year, Some(2023));
        assert_eq!(ledger.employees.len(), 2);
        assert_eq!(ledger.employees[0].salary.total(), dec(36_000_000));
        let total: Decimal = ledger.employees.iter().map(|e| e.total_salary()).sum();
        assert_eq!(total, dec(73_000_000));
    }
}
