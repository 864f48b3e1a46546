//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! routing (router ready, route matched, redirect, 405, no match)
//!     → tracing events
//!     → logging.rs subscriber (fmt to stderr, EnvFilter)
//! ```
//!
//! # Design Decisions
//! - The library only emits events; installing a subscriber is the
//!   embedding binary's choice
//! - Per-request events are `debug`/`trace` so the hot path stays quiet at `info`

pub mod logging;
