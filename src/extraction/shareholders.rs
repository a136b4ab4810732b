//! Share-change statement (주식등변동상황명세서) rows.

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

use crate::models::ShareholderRecord;

use super::codes::relation_name;
use super::text::parse_amount;

/// Words that open a shareholder row.
pub const ROW_MARKERS: [&str; 2] = ["개인", "법인"];

static HOLDER_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{6}\s*-\s*[\d*]{7}|\d{3}\s*-\s*\d{2}\s*-\s*[\d*]{5}")
        .expect("valid holder id regex")
});

/// Parses every shareholder row in the whitespace-separated page text.
///
/// Rows without a masked ID or with a relation code outside 00 through 08
/// are skipped. A numeric tail that cannot be decoded leaves shares and
/// ratio at zero.
pub fn parse_shareholder_rows(text: &str, year: i32) -> Vec<ShareholderRecord> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let markers: Vec<usize> = tokens
        .iter()
        .enumerate()
        .filter(|(_, t)| ROW_MARKERS.contains(t))
        .map(|(i, _)| i)
        .collect();

    markers
        .iter()
        .enumerate()
        .filter_map(|(n, &start)| {
            let end = markers.get(n + 1).copied().unwrap_or(tokens.len());
            parse_row(&tokens[start + 1..end].join(" "), year)
        })
        .collect()
}

fn parse_row(chunk: &str, year: i32) -> Option<ShareholderRecord> {
    let id = HOLDER_ID_RE.find(chunk)?;
    let name = chunk[..id.start()].trim();
    if name.is_empty() {
        return None;
    }

    let after: Vec<&str> = chunk[id.end()..].split_whitespace().collect();
    let code_at = after
        .iter()
        .position(|t| t.len() == 2 && t.chars().all(|c| c.is_ascii_digit()))?;
    let relation_code = after[code_at];
    relation_name(relation_code)?;

    let tail: Vec<&str> = after[code_at + 1..]
        .iter()
        .copied()
        .filter(|t| t.chars().all(|c| c.is_ascii_digit() || c == ',' || c == '.'))
        .filter(|t| t.chars().any(|c| c.is_ascii_digit()))
        .collect();
    let (shares, ratio) = decode_tail(&tail).unwrap_or_default();

    Some(ShareholderRecord {
        name: name.to_string(),
        masked_id: Some(id.as_str().chars().filter(|c| !c.is_whitespace()).collect()),
        relation_code: relation_code.to_string(),
        shares,
        ratio,
        year,
    })
}

/// Decodes a row's numeric tail into `(shares, ratio%)`.
///
/// Two or more numbers read as the last shares/ratio pair. A single token
/// is assumed to be both values glued together, split after the three
/// digits that follow the last thousands separator.
///
/// # Example
///
/// ```
/// use tax_credit_engine::extraction::decode_tail;
/// use rust_decimal::Decimal;
///
/// assert_eq!(
///     decode_tail(&["12,000", "30.00"]),
///     Some((Decimal::new(12_000, 0), Decimal::new(3000, 2)))
/// );
/// assert_eq!(
///     decode_tail(&["12,00030.00"]),
///     Some((Decimal::new(12_000, 0), Decimal::new(3000, 2)))
/// );
/// assert_eq!(decode_tail(&["50030"]), None);
/// ```
pub fn decode_tail(tail: &[&str]) -> Option<(Decimal, Decimal)> {
    match tail {
        [] => None,
        [glued] => {
            let comma = glued.rfind(',')?;
            let split = comma + 4;
            if split >= glued.len() {
                return None;
            }
            let shares = parse_amount(&glued[..split])?;
            let ratio = parse_amount(&glued[split..])?;
            Some((shares, ratio))
        }
        [.., shares, ratio] => Some((parse_amount(shares)?, parse_amount(ratio)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(v: i64, scale: u32) -> Decimal {
        Decimal::new(v, scale)
    }

    #[test]
    fn test_rows_are_split_at_markers() {
        let text = "주주구분(개인/법인) 성명 주민등록번호 관계 주식수 지분율 \
                    개인 홍길동 700101-1****** 00 6,000 60.00 \
                    개인 홍 민 지 950202-2****** 02 3,000 30.00 \
                    법인 주식회사 가람 110-81-12*** 08 1,000 10.00";
        let rows = parse_shareholder_rows(text, 2023);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].name, "홍길동");
        assert_eq!(rows[0].masked_id.as_deref(), Some("700101-1******"));
        assert_eq!(rows[0].relation_code, "00");
        assert_eq!(rows[0].shares, dec(6000, 0));
        assert_eq!(rows[0].ratio, dec(6000, 2));
        assert_eq!(rows[1].name, "홍 민 지");
        assert_eq!(rows[2].masked_id.as_deref(), Some("110-81-12***"));
        assert!(rows.iter().all(|r| r.year == 2023));
    }

    #[test]
    fn test_unrelated_codes_are_dropped() {
        let rows = parse_shareholder_rows("개인 김외부 800101-1****** 09 100 1.00", 2023);
        assert!(rows.is_empty());
    }

    #[test]
    fn test_rows_without_id_are_dropped() {
        let rows = parse_shareholder_rows("개인 합계 10,000 100.00", 2023);
        assert!(rows.is_empty());
    }

    #[test]
    fn test_undecodable_tail_keeps_row_with_zero_values() {
        let rows = parse_shareholder_rows("개인 박영수 800101-1****** 01 50030", 2022);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].shares, Decimal::ZERO);
        assert_eq!(rows[0].ratio, Decimal::ZERO);
    }

    #[test]
    fn test_tail_uses_last_pair_of_numbers() {
        assert_eq!(
            decode_tail(&["1,000", "10.00", "2,000", "20.00"]),
            Some((dec(2000, 0), dec(2000, 2)))
        );
    }

    #[test]
    fn test_glued_tail_without_ratio_is_rejected() {
        assert_eq!(decode_tail(&["12,000"]), None);
    }
}
