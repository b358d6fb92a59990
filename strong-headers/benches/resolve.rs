#![allow(missing_docs)]

use strong_headers::{HeaderMappings, HeaderTable};

use std::hint::black_box;
use criterion::{criterion_group, criterion_main, Criterion};

#[derive(Debug)]
struct CorrelationId(Option<String>);

#[derive(Debug)]
struct Correlation {
    external: Option<String>,
    internal: Option<String>,
}

fn mappings() -> HeaderMappings {
    HeaderMappings::configure(|builder| {
        builder
            .add_mapping("X-Correlation-Id", |v| CorrelationId(v.last().map(Into::into)))?
            .add_multi_mapping(["X-External-Id", "X-Internal-Id"], |h| Correlation {
                external: h.last("X-External-Id").map(Into::into),
                internal: h.last("X-Internal-Id").map(Into::into),
            })?;
        Ok(())
    }).expect("valid mappings")
}

fn headers() -> HeaderTable {
    HeaderTable::from_pairs([
        ("X-Correlation-Id", "a, b"),
        ("x-correlation-id", "c"),
        ("X-External-Id", "ext"),
        ("X-Internal-Id", "int"),
        ("Accept", "text/html, application/json;q=0.9, */*;q=0.8"),
        ("User-Agent", "bench"),
    ])
}

fn benchmark(c: &mut Criterion) {
    let mappings = mappings();
    let headers = headers();

    c.bench_function("table", |b| b.iter(|| {
        black_box(self::headers());
    }));
    c.bench_function("scope", |b| b.iter(|| {
        black_box(mappings.scope(headers.clone()));
    }));
    c.bench_function("resolve_uncached", |b| b.iter(|| {
        black_box(mappings.resolve_as::<Correlation>(&headers));
    }));
    c.bench_function("resolve_first", |b| b.iter(|| {
        let scope = mappings.scope(headers.clone());
        black_box(scope.get::<CorrelationId>());
    }));

    let scope = mappings.scope(headers.clone());
    c.bench_function("resolve_cached", |b| b.iter(|| {
        black_box(scope.get::<CorrelationId>());
    }));
}

criterion_group!(benches, benchmark);
criterion_main!(benches);
