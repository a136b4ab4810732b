//! Corporate tax return models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One line of the credit and reduction summary sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxCreditItem {
    /// Three-character line-item code.
    pub code: String,
    /// Statutory name of the item.
    pub name: String,
    /// Amount in won.
    pub amount: Decimal,
}

/// Headline figures of one corporate tax return.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaxReturnRecord {
    /// Fiscal year, from the document or its file name.
    pub year: Option<i32>,
    /// Tax base (과세표준); negative for a loss.
    pub tax_base: Decimal,
    /// Calculated tax (산출세액).
    pub calculated_tax: Decimal,
    /// Reductions subject to the minimum tax.
    pub min_tax_target: Decimal,
    /// Total deducted and reduced tax.
    pub deducted_tax: Decimal,
    /// Adjustment caused by the minimum tax.
    pub total_adjustment: Decimal,
    /// Minimum tax.
    pub min_tax: Decimal,
    /// `deducted_tax - min_tax`.
    pub min_tax_adjustment: Decimal,
    /// Credit and reduction items.
    pub credit_items: Vec<TaxCreditItem>,
}

impl TaxReturnRecord {
    /// Recomputes the derived minimum-tax adjustment.
    pub fn refresh_min_tax_adjustment(&mut self) {
        self.min_tax_adjustment = self.deducted_tax - self.min_tax;
    }
}

/// A shareholder row from the share-change statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareholderRecord {
    /// Holder name.
    pub name: String,
    /// Masked national ID (or corporate number).
    pub masked_id: Option<String>,
    /// Relation to the controlling shareholder, "00" through "08".
    pub relation_code: String,
    /// Shares held at year end.
    pub shares: Decimal,
    /// Share ratio in percent.
    pub ratio: Decimal,
    /// Fiscal year of the statement.
    pub year: i32,
}

/// One row of the credit-by-code sheet handed to the spreadsheet generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxCreditRow {
    /// Fiscal year, when known.
    pub year: Option<i32>,
    /// Line-item code.
    pub code: String,
    /// Statutory name.
    pub name: String,
    /// Amount in won.
    pub amount: Decimal,
}

/// One year of the shareholder matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareholderColumn {
    /// The year this column describes.
    pub year: i32,
    /// The year the holders were actually extracted for. Differs from
    /// `year` when the list was carried forward.
    pub source_year: i32,
    /// Holders in statement order.
    pub holders: Vec<ShareholderRecord>,
}

impl ShareholderColumn {
    /// Returns true when the holders were inherited from an earlier year.
    pub fn is_carried_forward(&self) -> bool {
        self.source_year != self.year
    }
}

/// Share ratios by year, forward-filled across years without a statement.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShareholderMatrix {
    /// Columns in ascending year order.
    pub columns: Vec<ShareholderColumn>,
}

impl ShareholderMatrix {
    /// The column for one year.
    pub fn column(&self, year: i32) -> Option<&ShareholderColumn> {
        self.columns.iter().find(|c| c.year == year)
    }

    /// A holder's ratio in one year.
    pub fn ratio(&self, year: i32, name: &str) -> Option<Decimal> {
        self.column(year)?
            .holders
            .iter()
            .find(|h| h.name == name)
            .map(|h| h.ratio)
    }

    /// Every holder name in order of first appearance.
    pub fn holder_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for holder in self.columns.iter().flat_map(|c| c.holders.iter()) {
            if !names.contains(&holder.name.as_str()) {
                names.push(&holder.name);
            }
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_tax_adjustment_is_deducted_minus_min_tax() {
        let mut record = TaxReturnRecord {
            deducted_tax: Decimal::new(30_000_000, 0),
            min_tax: Decimal::new(21_000_000, 0),
            ..Default::default()
        };
        record.refresh_min_tax_adjustment();
        assert_eq!(record.min_tax_adjustment, Decimal::new(9_000_000, 0));
    }

    #[test]
    fn test_matrix_lookup_by_year_and_name() {
        let holder = |name: &str, ratio: i64| ShareholderRecord {
            name: name.to_string(),
            masked_id: None,
            relation_code: "00".to_string(),
            shares: Decimal::new(1_000, 0),
            ratio: Decimal::new(ratio, 0),
            year: 2022,
        };
        let matrix = ShareholderMatrix {
            columns: vec![
                ShareholderColumn {
                    year: 2022,
                    source_year: 2022,
                    holders: vec![holder("김대표", 60), holder("이주주", 40)],
                },
                ShareholderColumn {
                    year: 2023,
                    source_year: 2022,
                    holders: vec![holder("김대표", 60), holder("이주주", 40)],
                },
            ],
        };

        assert_eq!(matrix.ratio(2023, "이주주"), Some(Decimal::new(40, 0)));
        assert_eq!(matrix.ratio(2024, "이주주"), None);
        assert!(matrix.column(2023).unwrap().is_carried_forward());
        assert!(!matrix.column(2022).unwrap().is_carried_forward());
        assert_eq!(matrix.holder_names(), vec!["김대표", "이주주"]);
    }
}
