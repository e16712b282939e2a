//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Startup gate (active.rs):
//!     ProviderPool::check_health
//!     → one liveness probe per endpoint, concurrently (retried per policy)
//!     → join all probes
//!     → partition into active / inactive (state.rs)
//!     → any inactive endpoint fails the gate
//! ```
//!
//! # Design Decisions
//! - Health is checked explicitly, not monitored continuously
//! - All-or-nothing: the pool is usable only if every endpoint passed
//! - The probe is the latest checkpoint sequence number

pub mod active;
pub mod state;

pub use state::{HealthReport, HealthState};
