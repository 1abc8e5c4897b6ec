//! Logging and OpenTelemetry integration for Keyward.
//!
//! Installs the process-wide `tracing` subscriber (env-filtered, plain or
//! JSON output, optional OTLP export) and provides span helpers for license
//! and product operations.

pub mod spans;
pub mod tracer;

pub use spans::{LicenseAttributes, license_span, product_span};
pub use tracer::{
    LogFormat, OtlpConfig, TracerError, TracingConfig, init_test_tracing, init_tracer,
    shutdown_tracer,
};
