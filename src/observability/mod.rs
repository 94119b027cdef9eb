//! Observability subsystem.
//!
//! Structured logging via `tracing`; request correlation comes from the
//! request-id middleware in the HTTP layer.

pub mod logging;
