//! Performance benchmarks for the tax-credit engine.
//!
//! This benchmark suite measures:
//! - Status analysis of a multi-year roster
//! - All three credit engines over a classified roster
//! - Word and line assembly of a dense page
//! - The `/credits` endpoint end to end with token documents
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use tax_credit_engine::analysis::analyze_employees;
use tax_credit_engine::api::{AppState, create_router};
use tax_credit_engine::calculation::calculate_credits;
use tax_credit_engine::config::{ConfigLoader, CreditTables};
use tax_credit_engine::extraction::assemble_lines;
use tax_credit_engine::models::{
    CompanySize, CreditSettings, EmployeeRecord, PositionedToken, Region,
};

use axum::{body::Body, http::Request};
use tower::ServiceExt;

const FIRST_YEAR: i32 = 2017;
const LAST_YEAR: i32 = 2024;

/// Builds a roster that grows by a tenth each year, with some turnover.
fn create_roster(base_headcount: usize) -> Vec<EmployeeRecord> {
    let mut records = Vec::new();
    for (offset, year) in (FIRST_YEAR..=LAST_YEAR).enumerate() {
        let headcount = base_headcount + base_headcount * offset / 10;
        for person in 0..headcount {
            let birth_year = 60 + (person % 40);
            let id = format!("{:02}0101-1******", birth_year % 100);
            let mut record = EmployeeRecord::new(format!("직원{:05}", person), Some(id), year);
            record.hire_date = NaiveDate::from_ymd_opt(year - (person % 3) as i32, 3, 1);
            if person % 17 == 0 {
                record.retire_date = NaiveDate::from_ymd_opt(year, 9, 30);
            }
            let monthly = Decimal::new(2_500_000 + (person as i64 % 20) * 100_000, 0);
            for month in 1..=12 {
                record.salary.set(month, monthly);
            }
            records.push(record);
        }
    }
    records
}

fn settings() -> CreditSettings {
    CreditSettings::new(Region::Capital, CompanySize::Small)
}

/// Benchmark: classify every employee-year of a roster.
fn bench_status_analysis(c: &mut Criterion) {
    let roster = create_roster(100);
    let limit = CreditTables::statutory().youth_age_limit;

    c.bench_function("analyze_employees_100_per_year", |b| {
        b.iter(|| {
            let mut records = roster.clone();
            analyze_employees(black_box(&mut records), limit);
            black_box(records)
        })
    });
}

/// Benchmark: run all engines at several roster sizes.
fn bench_credit_engines(c: &mut Criterion) {
    let tables = CreditTables::statutory();
    let mut group = c.benchmark_group("credit_engines");

    for headcount in [10usize, 100, 1000].iter() {
        let mut roster = create_roster(*headcount);
        analyze_employees(&mut roster, tables.youth_age_limit);

        group.throughput(Throughput::Elements(roster.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("headcount", headcount),
            &roster,
            |b, roster| b.iter(|| black_box(calculate_credits(roster, &settings(), tables))),
        );
    }

    group.finish();
}

/// Benchmark: assemble a page of 2,000 tokens into lines.
fn bench_line_assembly(c: &mut Criterion) {
    let tokens: Vec<PositionedToken> = (0..2000)
        .map(|i| {
            let x0 = (i % 40) as f64 * 14.0;
            let top = (i / 40) as f64 * 16.0;
            PositionedToken::new("가", x0, x0 + 10.0, top, top + 10.0)
        })
        .collect();

    c.bench_function("assemble_lines_2000_tokens", |b| {
        b.iter(|| black_box(assemble_lines(black_box(&tokens))))
    });
}

fn cover_page_tokens(name: &str, year: i32) -> Vec<serde_json::Value> {
    let token = |text: &str, x0: f64, top: f64| {
        let width = 8.0 * text.chars().count() as f64;
        serde_json::json!({"text": text, "x0": x0, "x1": x0 + width, "top": top, "bottom": top + 10.0})
    };
    let mut tokens = vec![
        token("근로소득", 200.0, 20.0),
        token("원천징수부", 250.0, 20.0),
        token(&format!("{}년", year), 400.0, 20.0),
        token("귀속", 460.0, 20.0),
        token("성명", 20.0, 60.0),
        token(name, 80.0, 60.0),
        token("주민등록번호", 200.0, 60.0),
        token("850101-1******", 300.0, 60.0),
        token("급여", 150.0, 120.0),
    ];
    for month in 1..=12 {
        let top = 150.0 + month as f64 * 20.0;
        tokens.push(token(&format!("{}월", month), 20.0, top));
        tokens.push(token("3,000,000", 124.0, top));
    }
    tokens
}

/// Benchmark: the `/credits` endpoint with five yearly ledgers.
fn bench_credits_endpoint(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let config = ConfigLoader::load("./config").expect("Failed to load config");
    let router = create_router(AppState::new(config));

    let documents: Vec<serde_json::Value> = (2019..=2023)
        .map(|year| {
            let pages: Vec<_> = (0..(20 + (year - 2019) * 2))
                .map(|i| cover_page_tokens(&format!("직원{:03}", i), year))
                .collect();
            serde_json::json!({"file_name": format!("{}.pdf", year), "pages": pages})
        })
        .collect();
    let body = serde_json::json!({
        "documents": documents,
        "settings": {"region": "capital", "size": "small"}
    })
    .to_string();

    c.bench_function("credits_endpoint_5_ledgers", |b| {
        b.to_async(&rt).iter(|| async {
            let router = router.clone();
            let response = router
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/credits")
                        .header("Content-Type", "application/json")
                        .body(Body::from(body.clone()))
                        .unwrap(),
                )
                .await
                .unwrap();
            black_box(response)
        })
    });
}

criterion_group!(
    benches,
    bench_status_analysis,
    bench_credit_engines,
    bench_line_assembly,
    bench_credits_endpoint,
);
criterion_main!(benches);
