//! Recommendation retrieval and widget rendering subsystem.
//!
//! # Data Flow
//! ```text
//! query (id, title, user)
//!     → client.rs (deployment origin, id lookup, title fallback)
//!     → model.rs (XML payload → Recommendation records)
//!     → normalize.rs (trim, CDATA strip, escape, author formatting)
//!     → render.rs (variant selection, HTML fragment)   — widget endpoint
//!     → legacy.rs (flat document rendering)            — legacy endpoint
//! ```
//!
//! # Design Decisions
//! - The client is built once from validated config and shared; lookups
//!   themselves are stateless
//! - Rendering is pure: fatal lookup errors produce plain text and never a
//!   partial fragment
//! - The legacy endpoint keeps its own, looser contract: parser errors are
//!   echoed inline and the fixed beta deployment is used

pub mod client;
pub mod legacy;
pub mod model;
pub mod normalize;
pub mod render;

pub use client::{deployment_origin, RecommendError, RecommenderClient};
pub use model::{parse_related_articles, ParseError, Recommendation};
pub use render::{DisplayVariant, RenderedRecommendation};
