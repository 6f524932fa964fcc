use chrono::{DateTime, Duration, Utc};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use ticketdesk::{
    FeedBatch, FeedChange, FeedConfig, Reconciler, TicketRecord, compute_rankings, parse,
};

fn structured_blob(pairs: usize) -> String {
    (0..pairs)
        .map(|i| format!("Field Number {}\nvalue-{i:06}", (b'a' + (i % 26) as u8) as char))
        .collect::<Vec<_>>()
        .join("\n")
}

fn unstructured_blob(lines: usize) -> String {
    (0..lines)
        .map(|i| {
            if i % 3 == 0 {
                format!("note line {i} without any separator")
            } else {
                format!("Key {i}: value {i}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn ticket(n: usize, teller: &str) -> TicketRecord {
    let raw = format!("Reference Code\nREF-{n:06}\nTeller\n{teller}");
    TicketRecord {
        id: format!("t{n}"),
        employee_name: "Bench".into(),
        department: "Ops".into(),
        parsed_data: parse(&raw),
        raw_input: raw,
        ticket_type: "Reversal".into(),
        description: String::new(),
        submitted_at: DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(n as i64),
        submitted_by: "bench".into(),
    }
}

/// Parser throughput for both layouts
fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    for size in [4usize, 32, 256] {
        let structured = structured_blob(size);
        group.throughput(Throughput::Bytes(structured.len() as u64));
        group.bench_with_input(BenchmarkId::new("structured", size), &structured, |b, text| {
            b.iter(|| parse(black_box(text)));
        });

        let unstructured = unstructured_blob(size * 2);
        group.throughput(Throughput::Bytes(unstructured.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("unstructured", size),
            &unstructured,
            |b, text| {
                b.iter(|| parse(black_box(text)));
            },
        );
    }

    group.finish();
}

/// Full window load followed by a stream of single-ticket adds
fn bench_reconcile(c: &mut Criterion) {
    let tellers = ["DDN-165", "DDN-200", "DDN-301", "DDN-402"];
    let snapshot: Vec<TicketRecord> = (0..100)
        .rev()
        .map(|n| ticket(n, tellers[n % tellers.len()]))
        .collect();
    let adds: Vec<FeedChange> = (100..200)
        .map(|n| FeedChange::added(ticket(n, tellers[n % tellers.len()])))
        .collect();

    c.bench_function("reconcile_snapshot_then_100_adds", |b| {
        b.iter(|| {
            let mut reconciler = Reconciler::new(FeedConfig::default());
            reconciler.start();
            reconciler.apply(FeedBatch::Snapshot(snapshot.clone()));
            for add in &adds {
                black_box(reconciler.apply(FeedBatch::Changes(vec![add.clone()])).map(|v| v.len()));
            }
        });
    });

    c.bench_function("rank_100_tickets", |b| {
        b.iter(|| compute_rankings(black_box(&snapshot)));
    });
}

criterion_group!(benches, bench_parse, bench_reconcile);
criterion_main!(benches);
