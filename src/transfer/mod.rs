//! Multi-recipient transfer pipeline.
//!
//! # Data Flow
//! ```text
//! TransferRequest (request.rs, validated before any network call)
//!     → selector.rs (page owned coins until the total is covered)
//!     → builder.rs (merge + split + one transfer per recipient)
//!     → blockchain::transaction (sign, submit, check execution status)
//!     → TransferReceipt
//! ```
//!
//! multisend.rs drives the whole flow and logs its state transitions.

pub mod builder;
pub mod multisend;
pub mod request;
pub mod selector;

pub use builder::{assemble_plan, CoinSource, PlanCommand, TransferBuilder, TransferPlan};
pub use multisend::{MultiSender, TransferState};
pub use request::{Recipient, TransferReceipt, TransferRequest};
pub use selector::{CoinSelection, CoinSelector};
