//! Faucet service: the mutual-exclusion boundary around the ledger
//!
//! The dispenser itself is a plain state machine; this service wraps
//! the `(Dispenser, Accounts)` pair in a single mutex so that every
//! HTTP-invoked operation is one indivisible read-modify-write. Each
//! successful mutation is appended to the audit trail.

use crate::config::FaucetConfig;
use crate::database::{AuditDatabase, AuditRecord, AuditStatistics, Operation};
use crate::error::{FaucetError, FaucetResult};
use crate::ledger::{Accounts, Dispenser, WITHDRAW_CAP};
use drip_common::types::Address;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::info;

struct LedgerState {
    dispenser: Dispenser,
    accounts: Accounts,
}

/// Faucet service
pub struct FaucetService {
    state: Mutex<LedgerState>,
    database: AuditDatabase,
}

impl FaucetService {
    /// Create a new faucet service: seed the environment's balance
    /// book from the genesis allocation, then open the dispenser on
    /// behalf of the configured owner.
    pub fn new(config: FaucetConfig, database: AuditDatabase) -> FaucetResult<Self> {
        let owner = Address::from_hex(&config.owner)
            .map_err(|e| FaucetError::InvalidAddress(e.to_string()))?;
        let owner_genesis = parse_wei(&config.owner_genesis_balance)?;
        let initial_balance = parse_wei(&config.initial_balance)?;

        let mut accounts = Accounts::new();
        accounts.credit(owner, owner_genesis)?;
        for alloc in &config.genesis_alloc {
            let address = Address::from_hex(&alloc.address)
                .map_err(|e| FaucetError::InvalidAddress(e.to_string()))?;
            accounts.credit(address, parse_wei(&alloc.balance)?)?;
        }

        let dispenser = Dispenser::open(owner, initial_balance, &mut accounts)?;

        database.record(AuditRecord::new(
            Operation::Open,
            owner.to_hex(),
            initial_balance,
            dispenser.balance(),
        ))?;

        info!(
            "Faucet service ready: owner={}, pool={} wei, cap={} wei",
            owner.to_hex(),
            initial_balance,
            WITHDRAW_CAP
        );

        Ok(Self {
            state: Mutex::new(LedgerState {
                dispenser,
                accounts,
            }),
            database,
        })
    }

    /// Fund the pool from any identity
    pub async fn fund(&self, from: Address, amount: u128) -> FaucetResult<OperationReceipt> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        state.dispenser.fund(&from, amount, &mut state.accounts)?;

        let pool_balance = state.dispenser.balance();
        self.database.record(AuditRecord::new(
            Operation::Fund,
            from.to_hex(),
            amount,
            pool_balance,
        ))?;

        Ok(OperationReceipt::new(
            Operation::Fund,
            from,
            amount,
            pool_balance,
        ))
    }

    /// Public capped withdrawal
    pub async fn withdraw(&self, caller: Address, amount: u128) -> FaucetResult<OperationReceipt> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        state
            .dispenser
            .withdraw(&caller, amount, &mut state.accounts)?;

        let pool_balance = state.dispenser.balance();
        self.database.record(AuditRecord::new(
            Operation::Withdraw,
            caller.to_hex(),
            amount,
            pool_balance,
        ))?;

        Ok(OperationReceipt::new(
            Operation::Withdraw,
            caller,
            amount,
            pool_balance,
        ))
    }

    /// Drain the entire pool to the owner (owner-only)
    pub async fn withdraw_all(&self, caller: Address) -> FaucetResult<OperationReceipt> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        let drained = state.dispenser.withdraw_all(&caller, &mut state.accounts)?;

        let pool_balance = state.dispenser.balance();
        self.database.record(AuditRecord::new(
            Operation::WithdrawAll,
            caller.to_hex(),
            drained,
            pool_balance,
        ))?;

        Ok(OperationReceipt::new(
            Operation::WithdrawAll,
            caller,
            drained,
            pool_balance,
        ))
    }

    /// Decommission the dispenser (owner-only, terminal)
    pub async fn decommission(&self, caller: Address) -> FaucetResult<OperationReceipt> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        let drained = state
            .dispenser
            .decommission(&caller, &mut state.accounts)?;

        let pool_balance = state.dispenser.balance();
        self.database.record(AuditRecord::new(
            Operation::Decommission,
            caller.to_hex(),
            drained,
            pool_balance,
        ))?;

        Ok(OperationReceipt::new(
            Operation::Decommission,
            caller,
            drained,
            pool_balance,
        ))
    }

    /// Owner identity; readable even after decommission
    pub async fn owner(&self) -> Address {
        self.state.lock().await.dispenser.owner()
    }

    /// Environment balance lookup for an arbitrary address
    pub async fn balance_of(&self, address: Address) -> u128 {
        self.state.lock().await.accounts.balance_of(&address)
    }

    /// Current pooled balance in wei
    pub async fn pool_balance(&self) -> u128 {
        self.state.lock().await.dispenser.balance()
    }

    /// Dispenser status plus audit statistics
    pub async fn status(&self) -> FaucetResult<FaucetStatus> {
        let state = self.state.lock().await;
        let stats = self.database.statistics()?;

        Ok(FaucetStatus {
            owner: state.dispenser.owner().to_hex(),
            balance: state.dispenser.balance().to_string(),
            active: state.dispenser.is_active(),
            withdraw_cap: WITHDRAW_CAP.to_string(),
            statistics: stats,
        })
    }

    /// Most recent audit records, newest first
    pub fn recent_operations(&self, limit: usize) -> FaucetResult<Vec<AuditRecord>> {
        self.database.recent(limit)
    }
}

fn parse_wei(s: &str) -> FaucetResult<u128> {
    s.parse::<u128>()
        .map_err(|_| FaucetError::InvalidAmount(format!("not a wei amount: {}", s)))
}

/// Receipt for a successful dispenser operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationReceipt {
    pub operation: String,
    pub party: String,
    pub amount: String,
    pub pool_balance: String,
}

impl OperationReceipt {
    fn new(operation: Operation, party: Address, amount: u128, pool_balance: u128) -> Self {
        Self {
            operation: operation.to_string(),
            party: party.to_hex(),
            amount: amount.to_string(),
            pool_balance: pool_balance.to_string(),
        }
    }
}

/// Faucet status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaucetStatus {
    pub owner: String,
    pub balance: String,
    pub active: bool,
    pub withdraw_cap: String,
    pub statistics: AuditStatistics,
}
