use opentelemetry::{
    global,
    metrics::{Counter, Histogram, Meter},
};
use std::sync::LazyLock;

pub static METER: LazyLock<Meter> = LazyLock::new(|| global::meter("shadow-ai-intake"));

// --- Domain Metrics ---

pub static RECORDS_LOADED: LazyLock<Counter<u64>> = LazyLock::new(|| {
    METER
        .u64_counter("intake.records.loaded")
        .with_description("Tool records loaded or generated at startup")
        .with_unit("{record}")
        .build()
});

pub static ROWS_REJECTED: LazyLock<Counter<u64>> = LazyLock::new(|| {
    METER
        .u64_counter("intake.rows.rejected")
        .with_description("CSV rows skipped for a missing tool name")
        .with_unit("{row}")
        .build()
});

pub static EXPORTS_GENERATED: LazyLock<Counter<u64>> = LazyLock::new(|| {
    METER
        .u64_counter("intake.exports.generated")
        .with_description("Reports and summaries generated")
        .with_unit("{export}")
        .build()
});

// --- HTTP Metrics ---

pub static HTTP_REQUESTS_TOTAL: LazyLock<Counter<u64>> = LazyLock::new(|| {
    METER
        .u64_counter("http.requests.total")
        .with_description("Total number of HTTP requests")
        .with_unit("{request}")
        .build()
});

pub static HTTP_REQUEST_DURATION: LazyLock<Histogram<f64>> = LazyLock::new(|| {
    METER
        .f64_histogram("http.request.duration")
        .with_description("HTTP request duration in milliseconds")
        .with_unit("ms")
        .with_boundaries(vec![
            1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0,
        ])
        .build()
});
