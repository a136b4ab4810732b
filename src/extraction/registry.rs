//! Corporate registry certificate extraction.
//!
//! The certificate is read line by line through [`RegistryParser`], a small
//! state machine that knows which section of the certificate it is in and
//! holds at most one executive record open at a time.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::error::EngineResult;
use crate::models::{ExecutiveRecord, RegistryRecord, TenureEventKind};

use super::document::{PageSource, page_lines, readable_pages};
use super::text::{DATE_PATTERN, compact, date_from_parts, spaced_label};

/// Place names whose presence in an address marks the capital region.
pub const CAPITAL_REGION_NAMES: [&str; 3] = ["서울", "인천", "경기"];

/// Section headers (whitespace-free prefixes) that end the address and
/// executive sections.
pub const OTHER_SECTIONS: [&str; 14] = [
    "공고방법",
    "1주의금액",
    "발행할주식의총수",
    "발행주식의총수",
    "자본금의액",
    "목적",
    "지점",
    "지배인",
    "전환사채",
    "존립기간",
    "기타사항",
    "회사성립연월일",
    "등기기록의개설사유",
    "종류주식",
];

const ADDRESS_SECTION: &str = "본점";
const EXECUTIVE_SECTION: &str = "임원에관한사항";

static COMPANY_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^\s*{}\s*[:：]?\s*(.+)$", spaced_label("상호")))
        .expect("valid company name regex")
});

static REGISTRATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"{}\s*[:：]?\s*(\d{{6}})\s*-\s*(\d{{7}})",
        spaced_label("등록번호")
    ))
    .expect("valid registration regex")
});

static ADDRESS_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^\s*{}\s*[:：]?\s*(.*)$", spaced_label(ADDRESS_SECTION)))
        .expect("valid address regex")
});

static ADDRESS_CHANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"{DATE_PATTERN}\s*(?:변\s*경|이\s*전)\s*(.+?)\s*{DATE_PATTERN}"
    ))
    .expect("valid address change regex")
});

static TRAILING_NOTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\s*(?:{DATE_PATTERN}.*|변\s*경.*|등\s*기.*)$"))
        .expect("valid note regex")
});

static EXECUTIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([가-힣]*(?:이사|감사|임원|청산인|위원))\s+([가-힣]{2,5})\s+(\d{6}\s*-\s*[\d*]{7})")
        .expect("valid executive regex")
});

static DATED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DATE_PATTERN).expect("valid date regex"));

/// Which part of the certificate the parser is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryState {
    /// Outside any section of interest.
    ScanningHeader,
    /// Inside the head-office address section.
    ParsingAddress,
    /// Inside the executive section.
    ParsingExecutives,
}

/// Line-driven registry parser.
///
/// # Example
///
/// ```
/// use tax_credit_engine::extraction::RegistryParser;
///
/// let mut parser = RegistryParser::new();
/// parser.feed("상 호 주식회사 한빛 2019.05.01 변경");
/// parser.feed("본 점 부산광역시 해운대구 센텀로 1");
/// parser.feed("임원에 관한 사항");
/// parser.feed("대표이사 홍길동 700101-*******");
/// parser.feed("2020 년 01 월 01 일 취임 2020 년 01 월 05 일 등기");
/// let record = parser.finish();
///
/// assert_eq!(record.company_name.as_deref(), Some("주식회사 한빛"));
/// assert!(!record.is_capital_region);
/// assert_eq!(record.executives.len(), 1);
/// assert!(record.executives[0].end_date.is_none());
/// ```
#[derive(Debug, Clone)]
pub struct RegistryParser {
    state: RegistryState,
    record: RegistryRecord,
    open_executive: Option<ExecutiveRecord>,
}

impl Default for RegistryParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryParser {
    /// A parser at the top of a certificate.
    pub fn new() -> Self {
        Self {
            state: RegistryState::ScanningHeader,
            record: RegistryRecord::default(),
            open_executive: None,
        }
    }

    /// The current state.
    pub fn state(&self) -> RegistryState {
        self.state
    }

    /// Consumes one line of text.
    pub fn feed(&mut self, line: &str) {
        let squeezed = compact(line);
        if squeezed.is_empty() {
            return;
        }

        if self.record.company_name.is_none() {
            if let Some(caps) = COMPANY_NAME_RE.captures(line) {
                let name = trim_annotations(&caps[1]);
                if !name.is_empty() {
                    self.record.company_name = Some(name);
                }
            }
        }
        if self.record.registration_number.is_none() {
            if let Some(caps) = REGISTRATION_RE.captures(line) {
                self.record.registration_number = Some(format!("{}-{}", &caps[1], &caps[2]));
            }
        }

        if squeezed.starts_with(ADDRESS_SECTION) {
            self.enter(RegistryState::ParsingAddress);
            let rest = ADDRESS_LINE_RE
                .captures(line)
                .map(|caps| caps[1].to_string())
                .unwrap_or_default();
            self.read_address(&rest);
            return;
        }
        if squeezed.contains(EXECUTIVE_SECTION) {
            self.enter(RegistryState::ParsingExecutives);
            return;
        }
        if OTHER_SECTIONS.iter().any(|header| squeezed.starts_with(header)) {
            self.enter(RegistryState::ScanningHeader);
            return;
        }

        match self.state {
            RegistryState::ScanningHeader => {}
            RegistryState::ParsingAddress => self.read_address(line),
            RegistryState::ParsingExecutives => self.read_executive(line),
        }
    }

    /// Flushes the open executive and returns the finished record.
    pub fn finish(mut self) -> RegistryRecord {
        self.flush_executive();
        for executive in &mut self.record.executives {
            executive.finalize();
        }
        self.record
    }

    fn enter(&mut self, state: RegistryState) {
        if self.state != state {
            debug!(from = ?self.state, to = ?state, "Registry section changed");
        }
        self.flush_executive();
        self.state = state;
    }

    fn flush_executive(&mut self) {
        if let Some(executive) = self.open_executive.take() {
            self.record.executives.push(executive);
        }
    }

    fn read_address(&mut self, line: &str) {
        if let Some(caps) = ADDRESS_CHANGE_RE.captures(line) {
            self.set_address(caps[4].trim());
            return;
        }
        let starts_with_date = line.trim_start().starts_with(|c: char| c.is_ascii_digit());
        if self.record.address.is_none() && !starts_with_date {
            let address = trim_annotations(line);
            if !address.is_empty() {
                self.set_address(&address);
            }
        }
    }

    fn set_address(&mut self, address: &str) {
        self.record.is_capital_region = is_capital_region(address);
        self.record.address = Some(address.to_string());
    }

    fn read_executive(&mut self, line: &str) {
        let remainder = match EXECUTIVE_RE.captures(line) {
            Some(caps) => {
                self.flush_executive();
                let id = compact(&caps[3]);
                self.open_executive = Some(ExecutiveRecord::new(&caps[2], Some(id), &caps[1]));
                line[caps.get(0).map_or(0, |m| m.end())..].to_string()
            }
            None => line.to_string(),
        };

        let Some(executive) = self.open_executive.as_mut() else {
            return;
        };
        for (date, kind) in dated_events(&remainder) {
            executive.push_event(date, kind);
        }
    }
}

/// Returns true when the address names a capital-region province or city.
pub fn is_capital_region(address: &str) -> bool {
    CAPITAL_REGION_NAMES.iter().any(|name| address.contains(name))
}

fn trim_annotations(text: &str) -> String {
    let end = TRAILING_NOTE_RE.find(text).map_or(text.len(), |m| m.start());
    text[..end].trim().to_string()
}

/// Every `{date} {event}` pair in a line. Dates followed by a non-event
/// (such as the registration date) are skipped.
fn dated_events(line: &str) -> Vec<(chrono::NaiveDate, TenureEventKind)> {
    let matches: Vec<_> = DATED_RE.captures_iter(line).collect();
    let mut events = Vec::new();
    for (i, caps) in matches.iter().enumerate() {
        let Some(whole) = caps.get(0) else { continue };
        let segment_end = matches
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map_or(line.len(), |m| m.start());
        let label = &line[whole.end()..segment_end];
        let date = date_from_parts(&caps[1], &caps[2], &caps[3]);
        if let (Some(date), Some(kind)) = (date, TenureEventKind::from_label(label)) {
            events.push((date, kind));
        }
    }
    events
}

/// Extracts the registry record from every page of a certificate.
pub fn extract_registry(source: &dyn PageSource) -> EngineResult<RegistryRecord> {
    let mut parser = RegistryParser::new();
    for index in 0..readable_pages(source) {
        for line in page_lines(source, index)? {
            parser.feed(&line.text());
        }
    }
    let record = parser.finish();
    debug!(
        file_name = source.file_name(),
        company = ?record.company_name,
        executives = record.executives.len(),
        capital_region = record.is_capital_region,
        "Extracted registry"
    );
    Ok(record)
}
