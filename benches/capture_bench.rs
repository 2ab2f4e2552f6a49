// Copyright (c) 2026 Bountyy Oy. All rights reserved.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use sessionjar::{normalize, CapturePolicy, FieldKind, SessionStore};

fn normalize_benchmark(c: &mut Criterion) {
    let inputs = vec![
        "x.com",
        "HTTPS://WWW.LinkedIn.com/feed/?trk=nav",
        "http://localhost:8001/api",
        "  www.example.org#top ",
    ];

    c.bench_function("normalize_domain", |b| {
        b.iter(|| {
            for raw in &inputs {
                black_box(normalize(raw).ok());
            }
        })
    });
}

fn merge_benchmark(c: &mut Criterion) {
    let policy = CapturePolicy::builtin();
    let host = match normalize("x.com") {
        Ok(host) => host,
        Err(_) => return,
    };
    let headers = vec![
        ("authorization", "Bearer token"),
        ("x-csrf-token", "abc"),
        ("accept", "*/*"),
        ("user-agent", "Mozilla/5.0"),
    ];

    c.bench_function("filter_and_merge_headers", |b| {
        let mut store = SessionStore::new();
        b.iter(|| {
            for (name, value) in &headers {
                if policy.should_capture(&host, name, FieldKind::Header) {
                    black_box(store.merge_header(&host, name, value));
                }
            }
        })
    });
}

criterion_group!(benches, normalize_benchmark, merge_benchmark);
criterion_main!(benches);
