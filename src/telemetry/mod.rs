mod init;
pub mod metrics;

pub use init::{TelemetryGuard, init_telemetry};
pub use metrics::{
    EXPORTS_GENERATED, HTTP_REQUEST_DURATION, HTTP_REQUESTS_TOTAL, RECORDS_LOADED, ROWS_REJECTED,
};
