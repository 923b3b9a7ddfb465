//! Custodial value dispenser ("faucet") for the drip network.
//!
//! The faucet holds a pooled balance of native value. Anyone may fund
//! the pool or request a small, capped withdrawal; the owner may drain
//! the full balance or decommission the dispenser for good. The crate
//! provides:
//! - The dispenser ledger state machine ([`ledger`])
//! - Audit trail of every state transition ([`database`])
//! - HTTP surface for interacting with the dispenser ([`api`])

pub mod api;
pub mod config;
pub mod database;
pub mod error;
pub mod ledger;
pub mod service;

pub use config::{FaucetConfig, GenesisAccount};
pub use database::{AuditDatabase, AuditRecord, AuditStatistics, Operation};
pub use error::{FaucetError, FaucetResult, LedgerError, LedgerResult};
pub use ledger::{Accounts, Dispenser, WITHDRAW_CAP};
pub use service::{FaucetService, FaucetStatus, OperationReceipt};
