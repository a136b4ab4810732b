//! Fixed lookup tables of the corporate tax return.
//!
//! Unknown keys resolve to `None`; callers decide what an unknown code means.

/// Line-item codes of the credit and reduction summary sheet
/// (공제감면세액 및 추가납부세액합계표) with their statutory names.
pub const TAX_CREDIT_CODES: &[(&str, &str)] = &[
    ("111", "창업중소기업 등에 대한 세액감면"),
    ("112", "중소기업에 대한 특별세액감면"),
    ("113", "연구개발특구 입주기업에 대한 세액감면"),
    ("114", "수도권 밖으로 공장을 이전하는 기업에 대한 세액감면"),
    ("115", "농공단지 입주기업 등에 대한 세액감면"),
    ("116", "영농조합법인 등에 대한 세액감면"),
    ("117", "사회적기업에 대한 세액감면"),
    ("118", "장애인표준사업장에 대한 세액감면"),
    ("119", "위기지역 창업기업에 대한 세액감면"),
    ("11A", "해외진출기업의 국내복귀에 대한 세액감면"),
    ("11B", "기술이전 및 기술대여 소득에 대한 세액감면"),
    ("11C", "공공기관 지방이전에 따른 세액감면"),
    ("11D", "외국인투자에 대한 세액감면"),
    ("11E", "제주첨단과학기술단지 입주기업 세액감면"),
    ("11F", "기업도시개발구역 입주기업 세액감면"),
    ("11G", "아시아문화중심도시 입주기업 세액감면"),
    ("11H", "금융중심지 창업기업 세액감면"),
    ("11J", "첨단의료복합단지 입주기업 세액감면"),
    ("11K", "농업회사법인에 대한 세액감면"),
    ("11L", "소형주택 임대사업자에 대한 세액감면"),
    ("121", "외국납부세액공제"),
    ("122", "재해손실세액공제"),
    ("123", "간접투자회사 외국납부세액공제"),
    ("131", "중소기업 등 투자세액공제"),
    ("132", "상생결제 지급금액에 대한 세액공제"),
    ("133", "대·중소기업 상생협력을 위한 기금출연 세액공제"),
    ("134", "협력중소기업 유형고정자산 무상임대 세액공제"),
    ("135", "수탁기업 설치 시설 투자 세액공제"),
    ("136", "일반연구·인력개발비 세액공제"),
    ("137", "기술혁신형 중소기업 주식취득 세액공제"),
    ("138", "연구시험용시설 투자세액공제"),
    ("139", "에너지절약시설 투자세액공제"),
    ("13A", "환경보전시설 투자세액공제"),
    ("13B", "근로자복지증진시설 투자세액공제"),
    ("13C", "안전시설 투자세액공제"),
    ("13D", "생산성향상시설 투자세액공제"),
    ("13E", "의약품 품질관리 개선시설 투자세액공제"),
    ("13F", "신성장기술 사업화시설 투자세액공제"),
    ("13G", "영상콘텐츠 제작비용 세액공제"),
    ("13H", "초연결 네트워크 구축시설 투자세액공제"),
    ("13J", "고용창출투자세액공제"),
    ("13K", "산업수요맞춤형고등학교 졸업자 복직 세액공제"),
    ("13L", "경력단절 여성 재고용 세액공제"),
    ("13M", "근로소득 증대 세액공제"),
    ("13N", "청년고용 증대 세액공제"),
    ("13P", "정규직 근로자 전환 세액공제"),
    ("13Q", "중소기업 사회보험료 세액공제"),
    ("13R", "고용증대 세액공제"),
    ("13S", "고용유지중소기업 세액공제"),
    ("13T", "육아휴직 복귀자 인건비 세액공제"),
    ("13U", "성과공유 중소기업 경영성과급 세액공제"),
    ("13V", "전자신고 세액공제"),
    ("13W", "기업의 운동경기부 설치·운영 세액공제"),
    ("13X", "석유제품 전자상거래 세액공제"),
    ("13Y", "우수 선화주기업 인증 세액공제"),
    ("13Z", "용역제공자 과세자료 제출 세액공제"),
    ("14A", "신성장·원천기술 연구개발비 세액공제"),
    ("14B", "국가전략기술 연구개발비 세액공제"),
    ("14C", "통합투자세액공제(일반)"),
    ("14D", "통합투자세액공제(신성장·원천기술)"),
    ("14E", "통합투자세액공제(국가전략기술)"),
    ("14F", "통합고용세액공제"),
    ("14G", "통합고용세액공제(정규직 전환)"),
    ("14H", "통합고용세액공제(육아휴직 복귀)"),
];

/// Shareholder relation codes to the controlling shareholder that the
/// exclusion rules care about.
pub const RELATION_CODES: &[(&str, &str)] = &[
    ("00", "본인"),
    ("01", "배우자"),
    ("02", "6촌 이내 혈족"),
    ("03", "4촌 이내 인척"),
    ("04", "친생자로서 다른 사람에게 친양자 입양된 자"),
    ("05", "임원"),
    ("06", "사용인"),
    ("07", "생계를 함께하는 자"),
    ("08", "지배적 영향력을 행사하는 법인"),
];

/// The statutory name of a credit line-item code.
///
/// # Example
///
/// ```
/// use tax_credit_engine::extraction::credit_name;
///
/// assert_eq!(credit_name("13R"), Some("고용증대 세액공제"));
/// assert_eq!(credit_name("ZZZ"), None);
/// ```
pub fn credit_name(code: &str) -> Option<&'static str> {
    TAX_CREDIT_CODES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, name)| *name)
}

/// The description of a relation code, `None` outside 00 through 08.
pub fn relation_name(code: &str) -> Option<&'static str> {
    RELATION_CODES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, name)| *name)
}
