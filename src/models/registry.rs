//! Corporate registry models.
//!
//! A [`RegistryRecord`] holds what the registry extractor reads from a
//! corporate registry certificate: the company's name and head-office
//! address plus the executive roster with tenure history.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The kind of a tenure history entry on the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenureEventKind {
    /// First appointment (취임).
    Assume,
    /// Re-appointment at term end (중임).
    Reassume,
    /// Resignation (사임).
    Resign,
    /// Retirement (퇴임).
    Retire,
    /// Term expiry (임기만료).
    Expire,
    /// Dismissal (해임).
    Dismiss,
}

impl TenureEventKind {
    /// Returns true when the event ends a tenure.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TenureEventKind::Resign
                | TenureEventKind::Retire
                | TenureEventKind::Expire
                | TenureEventKind::Dismiss
        )
    }

    /// Recognizes the event kind from registry wording.
    ///
    /// Expiry is checked before retirement because the registry writes an
    /// expiry as "임기만료로 인한 퇴임".
    ///
    /// # Example
    ///
    /// ```
    /// use tax_credit_engine::models::TenureEventKind;
    ///
    /// assert_eq!(TenureEventKind::from_label("취임"), Some(TenureEventKind::Assume));
    /// assert_eq!(TenureEventKind::from_label("임기만료퇴임"), Some(TenureEventKind::Expire));
    /// assert_eq!(TenureEventKind::from_label("변경"), None);
    /// ```
    pub fn from_label(label: &str) -> Option<Self> {
        let label: String = label.chars().filter(|c| !c.is_whitespace()).collect();
        if label.contains("만료") {
            Some(TenureEventKind::Expire)
        } else if label.contains("중임") {
            Some(TenureEventKind::Reassume)
        } else if label.contains("취임") {
            Some(TenureEventKind::Assume)
        } else if label.contains("사임") {
            Some(TenureEventKind::Resign)
        } else if label.contains("해임") {
            Some(TenureEventKind::Dismiss)
        } else if label.contains("퇴임") {
            Some(TenureEventKind::Retire)
        } else {
            None
        }
    }
}

/// One dated entry in an executive's tenure history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenureEvent {
    /// The effective date of the event.
    pub date: NaiveDate,
    /// What happened.
    pub kind: TenureEventKind,
}

/// An executive listed on the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutiveRecord {
    /// Executive name.
    pub name: String,
    /// Masked national ID as printed on the registry.
    pub national_id: Option<String>,
    /// Position title (e.g. 대표이사, 사내이사).
    pub position: String,
    /// Tenure history in chronological order once finalized.
    pub history: Vec<TenureEvent>,
    /// Date of the first history event.
    pub start_date: Option<NaiveDate>,
    /// Date of the last history event when that event is terminal.
    pub end_date: Option<NaiveDate>,
}

impl ExecutiveRecord {
    /// Opens a record with an empty history.
    pub fn new(
        name: impl Into<String>,
        national_id: Option<String>,
        position: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            national_id,
            position: position.into(),
            history: Vec::new(),
            start_date: None,
            end_date: None,
        }
    }

    /// Appends a history event and re-derives the tenure bounds.
    pub fn push_event(&mut self, date: NaiveDate, kind: TenureEventKind) {
        self.history.push(TenureEvent { date, kind });
        self.finalize();
    }

    /// Sorts the history and derives `start_date` and `end_date`.
    ///
    /// # Example
    ///
    /// ```
    /// use tax_credit_engine::models::{ExecutiveRecord, TenureEventKind};
    /// use chrono::NaiveDate;
    ///
    /// let mut exec = ExecutiveRecord::new("홍길동", None, "대표이사");
    /// exec.push_event(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(), TenureEventKind::Assume);
    /// assert_eq!(exec.end_date, None);
    ///
    /// exec.push_event(NaiveDate::from_ymd_opt(2023, 6, 30).unwrap(), TenureEventKind::Resign);
    /// assert_eq!(exec.start_date, NaiveDate::from_ymd_opt(2020, 1, 1));
    /// assert_eq!(exec.end_date, NaiveDate::from_ymd_opt(2023, 6, 30));
    /// ```
    pub fn finalize(&mut self) {
        self.history.sort_by_key(|e| e.date);
        self.start_date = self.history.first().map(|e| e.date);
        self.end_date = self
            .history
            .last()
            .filter(|e| e.kind.is_terminal())
            .map(|e| e.date);
    }

    /// Returns true when the tenure overlaps `[from, to]`.
    ///
    /// A record without history is treated as serving throughout.
    pub fn serves_between(&self, from: NaiveDate, to: NaiveDate) -> bool {
        let started = self.start_date.is_none_or(|start| start <= to);
        let not_ended = self.end_date.is_none_or(|end| end >= from);
        started && not_ended
    }
}

/// Everything read from one registry certificate.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RegistryRecord {
    /// Company name without trailing change annotations.
    pub company_name: Option<String>,
    /// Corporate registration number, when printed.
    pub registration_number: Option<String>,
    /// The latest head-office address.
    pub address: Option<String>,
    /// Whether the latest address lies in the capital region.
    pub is_capital_region: bool,
    /// Executives in order of appearance.
    pub executives: Vec<ExecutiveRecord>,
}
