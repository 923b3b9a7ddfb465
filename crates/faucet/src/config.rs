//! Faucet configuration
//!
//! The public withdrawal cap is deliberately absent here: it is a
//! hard-coded policy constant ([`crate::ledger::WITHDRAW_CAP`]), not a
//! deployment knob.

use serde::{Deserialize, Serialize};

/// A pre-funded account in the environment's balance book
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenesisAccount {
    /// Account address (0x-prefixed hex)
    pub address: String,
    /// Starting balance (in wei)
    pub balance: String,
}

/// Faucet service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaucetConfig {
    /// Server address
    pub server_addr: String,

    /// Owner address (0x-prefixed hex); the owner is the creator of
    /// the dispenser and never changes
    pub owner: String,

    /// Balance the owner's environment account starts with (in wei);
    /// the dispenser's initial pool is debited from it
    pub owner_genesis_balance: String,

    /// Initial pool balance (in wei, may be zero)
    pub initial_balance: String,

    /// Additional pre-funded environment accounts
    pub genesis_alloc: Vec<GenesisAccount>,

    /// Audit database path
    pub db_path: String,

    /// Enable CORS
    pub cors_enabled: bool,
}

impl Default for FaucetConfig {
    fn default() -> Self {
        Self {
            server_addr: "0.0.0.0:3000".to_string(),
            owner: "0x0000000000000000000000000000000000000001".to_string(),
            owner_genesis_balance: "1000000000000000000000".to_string(), // 1000 units
            initial_balance: "2000000000000000000".to_string(),          // 2 units
            genesis_alloc: Vec::new(),
            db_path: "./faucet_data".to_string(),
            cors_enabled: true,
        }
    }
}

impl FaucetConfig {
    /// Load from environment variables with defaults
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("FAUCET_SERVER_ADDR") {
            config.server_addr = addr;
        }

        if let Ok(owner) = std::env::var("FAUCET_OWNER") {
            config.owner = owner;
        }

        if let Ok(balance) = std::env::var("FAUCET_OWNER_GENESIS_BALANCE") {
            config.owner_genesis_balance = balance;
        }

        if let Ok(balance) = std::env::var("FAUCET_INITIAL_BALANCE") {
            config.initial_balance = balance;
        }

        if let Ok(db_path) = std::env::var("FAUCET_DB_PATH") {
            config.db_path = db_path;
        }

        if let Ok(enabled) = std::env::var("FAUCET_CORS_ENABLED") {
            config.cors_enabled = enabled.to_lowercase() == "true";
        }

        config
    }
}
