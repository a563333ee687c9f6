//! Staking Benchmarks — Per-Entry Sizing Cost
//!
//! Every joined book entry goes through Kelly sizing, expected value
//! and cent rounding. These benchmarks cover that path, plus the
//! estimate join over a full book.
//!
//! Run with: cargo bench --bench staking_bench

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use chrono::{NaiveDate, TimeZone, Utc};

use betfair_value_bot::config::StakingConfig;
use betfair_value_bot::domain::market::{BookEntry, Market};
use betfair_value_bot::domain::probability::{
    ProbabilityEstimate, SelectionLookup, SelectionRef,
};
use betfair_value_bot::domain::staking::{expected_value, kelly_fraction, round_cents};
use betfair_value_bot::domain::Side;
use betfair_value_bot::usecases::matching::{EstimateIndex, JoinedEntry};
use betfair_value_bot::usecases::selection::StakingRules;

fn market() -> Market {
    Market {
        market_id: "1.230000001".to_string(),
        market_name: "Match Odds".to_string(),
        competition_id: 81,
        competition_name: "Serie A".to_string(),
        event_name: "Home v Away".to_string(),
        market_start_time: Utc.with_ymd_and_hms(2024, 5, 1, 19, 0, 0).unwrap(),
        commission_rate: 0.05,
        total_matched: 25_000.0,
        runners: Vec::new(),
    }
}

fn entry(selection_id: u64, side: Side, price: f64) -> BookEntry {
    BookEntry {
        market_id: "1.230000001".to_string(),
        selection_id,
        side,
        price,
        size: 150.0,
        commission_rate: 0.05,
    }
}

/// Benchmark quarter-Kelly sizing.
fn bench_kelly_fraction(c: &mut Criterion) {
    c.bench_function("kelly_quarter", |b| {
        b.iter(|| {
            let _f = kelly_fraction(black_box(0.55), black_box(2.1), black_box(0.25));
        });
    });
}

/// Benchmark expected value for both sides.
fn bench_expected_value(c: &mut Criterion) {
    c.bench_function("expected_value_back", |b| {
        b.iter(|| {
            let _ev = expected_value(
                black_box(40.0),
                black_box(0.55),
                black_box(2.1),
                black_box(0.05),
                Side::Back,
            );
        });
    });

    c.bench_function("expected_value_lay", |b| {
        b.iter(|| {
            let _ev = expected_value(
                black_box(40.0),
                black_box(0.45),
                black_box(2.2),
                black_box(0.05),
                Side::Lay,
            );
        });
    });
}

/// Benchmark decimal cent rounding.
fn bench_round_cents(c: &mut Criterion) {
    c.bench_function("round_cents", |b| {
        b.iter(|| {
            let _r = round_cents(black_box(52.083_333));
        });
    });
}

/// Benchmark sizing a single joined entry into a candidate.
fn bench_evaluate(c: &mut Criterion) {
    let rules = StakingRules::from(&StakingConfig::default());
    let market = market();
    let joined = JoinedEntry {
        entry: entry(11, Side::Lay, 3.0),
        probability: 0.3,
        date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
    };

    c.bench_function("evaluate_lay_candidate", |b| {
        b.iter(|| {
            let _candidate = rules.evaluate(&market, black_box(&joined), black_box(1000.0));
        });
    });
}

/// Benchmark joining a three-way book (6 entries) with the estimates.
fn bench_join(c: &mut Criterion) {
    let market = market();
    let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
    let estimates: Vec<ProbabilityEstimate> = [(11, 0.45), (12, 0.30), (13, 0.25)]
        .into_iter()
        .map(|(selection_id, probability)| ProbabilityEstimate {
            competition_id: 81,
            event_name: "Home v Away".to_string(),
            date,
            selection: SelectionRef::Id(selection_id),
            probability,
        })
        .collect();
    let index = EstimateIndex::build(&estimates, &SelectionLookup::new());
    let entries: Vec<BookEntry> = [11, 12, 13]
        .into_iter()
        .flat_map(|id| [entry(id, Side::Back, 2.4), entry(id, Side::Lay, 2.5)])
        .collect();

    c.bench_function("join_three_way_book", |b| {
        b.iter(|| {
            let _joined = index.join(
                &market,
                black_box(&entries),
                chrono_tz::America::Los_Angeles,
            );
        });
    });
}

criterion_group!(
    benches,
    bench_kelly_fraction,
    bench_expected_value,
    bench_round_cents,
    bench_evaluate,
    bench_join,
);
criterion_main!(benches);
