//! Generic cross-origin relay subsystem.
//!
//! # Data Flow
//! ```text
//! inbound request (method, query, headers, body)
//!     → input.rs (RelayRequest built once at the boundary)
//!     → forward.rs (validate target, outbound call, RelayOutcome)
//!     → respond.rs (passthrough or structured rendering)
//!     → Send to client
//! ```
//!
//! # Design Decisions
//! - Relay logic never touches the ambient request; everything it needs is
//!   captured in `RelayRequest` up front
//! - Failures never abort the request: they surface as an outcome with the
//!   sentinel `ERROR` status and an error string in the body
//! - A missing or invalid target URL short-circuits before any outbound
//!   call is made

pub mod forward;
pub mod input;
pub mod respond;

pub use forward::{forward, RelayOutcome, RelayStatus, ERROR_STATUS};
pub use input::RelayRequest;
pub use respond::{passthrough_response, structured_response};
