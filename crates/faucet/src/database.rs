//! Audit database: a persistent trail of every dispenser transition

use crate::error::{FaucetError, FaucetResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sled::{Db, Tree};
use std::fmt;
use tracing::{debug, info};

/// Kind of dispenser operation being audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    Open,
    Fund,
    Withdraw,
    WithdrawAll,
    Decommission,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Open => "open",
            Operation::Fund => "fund",
            Operation::Withdraw => "withdraw",
            Operation::WithdrawAll => "withdraw_all",
            Operation::Decommission => "decommission",
        };
        write!(f, "{}", name)
    }
}

/// One successful state transition of the dispenser
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Operation kind
    pub operation: Operation,
    /// The identity that invoked the operation (0x-prefixed hex)
    pub party: String,
    /// Amount moved (in wei)
    pub amount: String,
    /// Pool balance after the operation (in wei)
    pub pool_balance: String,
    /// Timestamp
    pub timestamp: i64,
}

impl AuditRecord {
    pub fn new(operation: Operation, party: String, amount: u128, pool_balance: u128) -> Self {
        Self {
            operation,
            party,
            amount: amount.to_string(),
            pool_balance: pool_balance.to_string(),
            timestamp: Utc::now().timestamp(),
        }
    }

    pub fn datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.timestamp, 0).unwrap_or_else(Utc::now)
    }
}

/// Audit database
pub struct AuditDatabase {
    db: Db,
    /// Tree for audit records, keyed by a monotonic id
    operations: Tree,
}

impl AuditDatabase {
    /// Create or open the audit database
    pub fn new(path: &str) -> FaucetResult<Self> {
        info!("Opening audit database at: {}", path);

        let db = sled::Config::default()
            .path(path)
            .open()
            .map_err(FaucetError::DatabaseError)?;

        let operations = db
            .open_tree("operations")
            .map_err(FaucetError::DatabaseError)?;

        Ok(Self { db, operations })
    }

    /// Append a record to the audit trail
    pub fn record(&self, record: AuditRecord) -> FaucetResult<()> {
        let id = self.db.generate_id().map_err(FaucetError::DatabaseError)?;
        let value =
            bincode::serialize(&record).map_err(|e| FaucetError::InternalError(e.to_string()))?;

        self.operations
            .insert(id.to_be_bytes(), value)
            .map_err(FaucetError::DatabaseError)?;

        debug!(
            "Audit record: op={}, party={}, amount={} wei",
            record.operation, record.party, record.amount
        );

        Ok(())
    }

    /// Most recent records, newest first
    pub fn recent(&self, limit: usize) -> FaucetResult<Vec<AuditRecord>> {
        let mut records = Vec::new();

        for item in self.operations.iter().rev().take(limit) {
            let (_, value) = item.map_err(FaucetError::DatabaseError)?;
            let record: AuditRecord = bincode::deserialize(&value)
                .map_err(|e| FaucetError::InternalError(e.to_string()))?;
            records.push(record);
        }

        Ok(records)
    }

    /// Aggregate statistics over the audit trail
    pub fn statistics(&self) -> FaucetResult<AuditStatistics> {
        let total_operations = self.operations.len();

        let mut total_dispensed = 0u128;
        let mut recipients = std::collections::HashSet::new();

        for item in self.operations.iter() {
            let (_, value) = item.map_err(FaucetError::DatabaseError)?;
            let record: AuditRecord = bincode::deserialize(&value)
                .map_err(|e| FaucetError::InternalError(e.to_string()))?;

            match record.operation {
                Operation::Withdraw | Operation::WithdrawAll | Operation::Decommission => {
                    total_dispensed = total_dispensed
                        .saturating_add(record.amount.parse::<u128>().unwrap_or(0));
                    recipients.insert(record.party);
                }
                Operation::Open | Operation::Fund => {}
            }
        }

        Ok(AuditStatistics {
            total_operations,
            total_dispensed: total_dispensed.to_string(),
            unique_recipients: recipients.len() as u64,
        })
    }
}

/// Audit statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditStatistics {
    pub total_operations: usize,
    pub total_dispensed: String,
    pub unique_recipients: u64,
}
