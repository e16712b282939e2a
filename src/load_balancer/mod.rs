//! Provider selection subsystem.
//!
//! # Data Flow
//! ```text
//! RpcConfig (endpoint URLs, proxy URLs)
//!     → proxy.rs (one HTTP transport per proxy, shared rotator)
//!     → endpoint.rs (URL + bound JSON-RPC client)
//!     → pool.rs (built once, random provider per call, health gate)
//! Outbound call:
//!     → random endpoint from the pool
//!     → round_robin.rs advances the proxy cursor
//!     → request leaves through the selected transport
//! ```
//!
//! # Design Decisions
//! - Provider choice is uniformly random; no per-provider concurrency cap
//! - Proxy rotation is per call, not per endpoint
//! - The pool is an owned handle passed by reference, never a global

pub mod endpoint;
pub mod pool;
pub mod proxy;
pub mod round_robin;

pub use endpoint::Endpoint;
pub use pool::ProviderPool;
pub use proxy::{ProxyRotator, Transport, TransportTimeouts};
