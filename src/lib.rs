//! Mr. DLib widget proxy library.
//!
//! Sits between a publisher's page (or the JavaScript widget embedded in
//! it) and the Mr. DLib recommendation API: a generic cross-origin relay,
//! a recommendation renderer producing embeddable HTML, and the legacy
//! related-documents lookup.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod recommender;
pub mod relay;

pub use config::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
