//! Shared primitives for the drip faucet: addresses and value units.

pub mod types;
pub mod units;
