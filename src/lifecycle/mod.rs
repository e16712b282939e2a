//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Init logging/metrics → Build pool → Health gate
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Cancel token → In-flight calls and backoff sleeps abort
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger cancellation
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then observability, then the pool
//! - Cancellation is cooperative via one root token

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{bootstrap, build_pool, init_observability};
