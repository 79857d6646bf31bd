//! Billing ledger client for the Storyreel pipeline.
//!
//! The pipeline consumes the ledger as three calls: get current balance,
//! charge, refund. Idempotency and audit logging of each call are the
//! ledger service's responsibility, not this client's.

pub mod client;
pub mod error;
pub mod memory;

pub use client::{CreditLedger, HttpLedger, LedgerConfig};
pub use error::{LedgerError, LedgerResult};
pub use memory::InMemoryLedger;
