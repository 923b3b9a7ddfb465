//! Dispenser ledger: the faucet's balance state machine.
//!
//! A [`Dispenser`] owns a pooled balance, an immutable owner identity
//! and an `active` flag. Value moves between the pool and the
//! surrounding environment's balance book ([`Accounts`]), so every
//! transfer is externally observable. Each operation is a single
//! indivisible state transition: all fallible checks run before any
//! mutation, so a failed call leaves both the pool and the accounts
//! book untouched.

use crate::error::{LedgerError, LedgerResult};
use drip_common::types::Address;
use drip_common::units::WEI_PER_UNIT;
use std::collections::HashMap;
use tracing::{debug, info};

/// Maximum amount a public withdrawal may request per call, in wei
/// (0.1 unit). Hard-coded policy: it protects the pool from
/// single-call drain by non-owners and is never configurable.
pub const WITHDRAW_CAP: u128 = WEI_PER_UNIT / 10;

/// Balance book for the environment surrounding the dispenser. Unknown
/// addresses hold zero.
#[derive(Debug, Clone, Default)]
pub struct Accounts {
    balances: HashMap<Address, u128>,
}

impl Accounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance_of(&self, address: &Address) -> u128 {
        self.balances.get(address).copied().unwrap_or(0)
    }

    pub fn credit(&mut self, address: Address, amount: u128) -> LedgerResult<()> {
        let updated = self
            .balance_of(&address)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        self.balances.insert(address, updated);
        Ok(())
    }

    pub fn debit(&mut self, address: &Address, amount: u128) -> LedgerResult<()> {
        let available = self.balance_of(address);
        if amount > available {
            return Err(LedgerError::InsufficientBalance {
                requested: amount,
                available,
            });
        }
        self.balances.insert(*address, available - amount);
        Ok(())
    }
}

/// The dispenser entity: pooled balance, owner identity, active flag.
///
/// State machine: `Active` -> `Decommissioned` (terminal). All
/// operations except [`Dispenser::decommission`] are self-loops on
/// `Active`; no transition leaves `Decommissioned`.
#[derive(Debug)]
pub struct Dispenser {
    owner: Address,
    balance: u128,
    active: bool,
}

impl Dispenser {
    /// Open a dispenser funded from the creator's account. The creator
    /// becomes the owner; the initial balance may be zero.
    pub fn open(
        owner: Address,
        initial_balance: u128,
        accounts: &mut Accounts,
    ) -> LedgerResult<Self> {
        accounts.debit(&owner, initial_balance)?;
        info!(
            "Dispenser opened: owner=0x{}, balance={} wei",
            owner, initial_balance
        );
        Ok(Self {
            owner,
            balance: initial_balance,
            active: true,
        })
    }

    /// Owner identity. Set once at construction, never transferable,
    /// readable even after decommission.
    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Current pooled balance in wei.
    pub fn balance(&self) -> u128 {
        self.balance
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    fn ensure_active(&self) -> LedgerResult<()> {
        if self.active {
            Ok(())
        } else {
            Err(LedgerError::Inactive)
        }
    }

    fn ensure_owner(&self, caller: &Address) -> LedgerResult<()> {
        if *caller == self.owner {
            Ok(())
        } else {
            Err(LedgerError::Unauthorized)
        }
    }

    /// Fund the pool. Any identity may fund; the amount is debited
    /// from the funder's account.
    pub fn fund(
        &mut self,
        from: &Address,
        amount: u128,
        accounts: &mut Accounts,
    ) -> LedgerResult<()> {
        self.ensure_active()?;
        let updated = self
            .balance
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        accounts.debit(from, amount)?;
        self.balance = updated;
        debug!(
            "Pool funded: from=0x{}, amount={} wei, balance={} wei",
            from, amount, self.balance
        );
        Ok(())
    }

    /// Public withdrawal path: any identity, capped per call at
    /// [`WITHDRAW_CAP`]. The balance decrement and the credit to the
    /// caller happen as one atomic unit.
    pub fn withdraw(
        &mut self,
        caller: &Address,
        amount: u128,
        accounts: &mut Accounts,
    ) -> LedgerResult<()> {
        self.ensure_active()?;
        if amount > WITHDRAW_CAP {
            return Err(LedgerError::LimitExceeded {
                requested: amount,
                cap: WITHDRAW_CAP,
            });
        }
        if amount > self.balance {
            return Err(LedgerError::InsufficientBalance {
                requested: amount,
                available: self.balance,
            });
        }
        accounts.credit(*caller, amount)?;
        self.balance -= amount;
        debug!(
            "Withdrawal: caller=0x{}, amount={} wei, balance={} wei",
            caller, amount, self.balance
        );
        Ok(())
    }

    /// Drain the entire pool to the owner. Owner-only.
    pub fn withdraw_all(&mut self, caller: &Address, accounts: &mut Accounts) -> LedgerResult<u128> {
        self.ensure_active()?;
        self.ensure_owner(caller)?;
        let drained = self.balance;
        accounts.credit(self.owner, drained)?;
        self.balance = 0;
        info!("Pool drained by owner: amount={} wei", drained);
        Ok(drained)
    }

    /// Decommission the dispenser. Owner-only, terminal and NOT
    /// idempotent: a second call fails with [`LedgerError::Inactive`].
    /// Any remaining balance is credited to the owner; afterwards
    /// every operation on this dispenser fails forever.
    pub fn decommission(
        &mut self,
        caller: &Address,
        accounts: &mut Accounts,
    ) -> LedgerResult<u128> {
        self.ensure_active()?;
        self.ensure_owner(caller)?;
        let drained = self.balance;
        accounts.credit(self.owner, drained)?;
        self.balance = 0;
        self.active = false;
        info!(
            "Dispenser decommissioned: owner=0x{}, drained={} wei",
            self.owner, drained
        );
        Ok(drained)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drip_common::units::{milli_to_wei, to_wei};

    fn owner() -> Address {
        Address([0x01; 20])
    }

    fn stranger() -> Address {
        Address([0x02; 20])
    }

    fn funded_dispenser(initial_units: u64) -> (Dispenser, Accounts) {
        let mut accounts = Accounts::new();
        accounts.credit(owner(), to_wei(1_000)).unwrap();
        accounts.credit(stranger(), to_wei(1_000)).unwrap();
        let dispenser = Dispenser::open(owner(), to_wei(initial_units), &mut accounts).unwrap();
        (dispenser, accounts)
    }

    #[test]
    fn test_open_sets_owner_and_balance() {
        let (dispenser, accounts) = funded_dispenser(2);
        assert_eq!(dispenser.owner(), owner());
        assert_eq!(dispenser.balance(), to_wei(2));
        assert!(dispenser.is_active());
        // The pool was debited from the creator's account
        assert_eq!(accounts.balance_of(&owner()), to_wei(998));
    }

    #[test]
    fn test_open_with_zero_balance() {
        let mut accounts = Accounts::new();
        let dispenser = Dispenser::open(owner(), 0, &mut accounts).unwrap();
        assert_eq!(dispenser.balance(), 0);
        assert!(dispenser.is_active());
    }

    #[test]
    fn test_open_requires_creator_funds() {
        let mut accounts = Accounts::new();
        let err = Dispenser::open(owner(), to_wei(2), &mut accounts).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientBalance {
                requested: to_wei(2),
                available: 0,
            }
        );
    }

    #[test]
    fn test_withdraw_above_cap_rejected() {
        let (mut dispenser, mut accounts) = funded_dispenser(2);
        // 0.11 units is just over the 0.1 unit cap, even for the owner
        let err = dispenser
            .withdraw(&owner(), milli_to_wei(110), &mut accounts)
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::LimitExceeded {
                requested: milli_to_wei(110),
                cap: WITHDRAW_CAP,
            }
        );
        assert_eq!(dispenser.balance(), to_wei(2));
    }

    #[test]
    fn test_withdraw_at_cap_succeeds() {
        let (mut dispenser, mut accounts) = funded_dispenser(2);
        let before = accounts.balance_of(&stranger());
        dispenser
            .withdraw(&stranger(), WITHDRAW_CAP, &mut accounts)
            .unwrap();
        assert_eq!(dispenser.balance(), to_wei(2) - WITHDRAW_CAP);
        assert_eq!(accounts.balance_of(&stranger()), before + WITHDRAW_CAP);
    }

    #[test]
    fn test_withdraw_exceeding_pool_rejected() {
        let mut accounts = Accounts::new();
        accounts.credit(owner(), milli_to_wei(50)).unwrap();
        let mut dispenser = Dispenser::open(owner(), milli_to_wei(50), &mut accounts).unwrap();

        let err = dispenser
            .withdraw(&stranger(), milli_to_wei(60), &mut accounts)
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientBalance {
                requested: milli_to_wei(60),
                available: milli_to_wei(50),
            }
        );
        assert_eq!(dispenser.balance(), milli_to_wei(50));
        assert_eq!(accounts.balance_of(&stranger()), 0);
    }

    #[test]
    fn test_fund_from_any_identity() {
        let (mut dispenser, mut accounts) = funded_dispenser(2);
        dispenser
            .fund(&stranger(), to_wei(1), &mut accounts)
            .unwrap();
        assert_eq!(dispenser.balance(), to_wei(3));
        assert_eq!(accounts.balance_of(&stranger()), to_wei(999));
    }

    #[test]
    fn test_fund_requires_funder_balance() {
        let (mut dispenser, mut accounts) = funded_dispenser(2);
        let broke = Address([0x03; 20]);
        let err = dispenser.fund(&broke, to_wei(1), &mut accounts).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientBalance { .. }));
        assert_eq!(dispenser.balance(), to_wei(2));
    }

    #[test]
    fn test_withdraw_all_owner_only() {
        let (mut dispenser, mut accounts) = funded_dispenser(2);
        let err = dispenser
            .withdraw_all(&stranger(), &mut accounts)
            .unwrap_err();
        assert_eq!(err, LedgerError::Unauthorized);
        assert_eq!(dispenser.balance(), to_wei(2));
    }

    #[test]
    fn test_withdraw_all_drains_to_owner() {
        let (mut dispenser, mut accounts) = funded_dispenser(2);
        let before = accounts.balance_of(&owner());
        let drained = dispenser.withdraw_all(&owner(), &mut accounts).unwrap();
        assert_eq!(drained, to_wei(2));
        assert_eq!(dispenser.balance(), 0);
        assert_eq!(accounts.balance_of(&owner()), before + to_wei(2));
        assert!(dispenser.is_active());
    }

    #[test]
    fn test_decommission_owner_only() {
        let (mut dispenser, mut accounts) = funded_dispenser(2);
        let err = dispenser
            .decommission(&stranger(), &mut accounts)
            .unwrap_err();
        assert_eq!(err, LedgerError::Unauthorized);
        assert!(dispenser.is_active());
        assert_eq!(dispenser.balance(), to_wei(2));
    }

    #[test]
    fn test_decommission_is_terminal() {
        let (mut dispenser, mut accounts) = funded_dispenser(2);
        let drained = dispenser.decommission(&owner(), &mut accounts).unwrap();
        assert_eq!(drained, to_wei(2));
        assert!(!dispenser.is_active());
        assert_eq!(dispenser.balance(), 0);

        // Every subsequent operation fails, including a second
        // decommission by the owner
        assert_eq!(
            dispenser.fund(&stranger(), to_wei(1), &mut accounts),
            Err(LedgerError::Inactive)
        );
        assert_eq!(
            dispenser.withdraw(&stranger(), milli_to_wei(10), &mut accounts),
            Err(LedgerError::Inactive)
        );
        assert_eq!(
            dispenser.withdraw_all(&owner(), &mut accounts),
            Err(LedgerError::Inactive)
        );
        assert_eq!(
            dispenser.decommission(&owner(), &mut accounts),
            Err(LedgerError::Inactive)
        );

        // Identity stays readable after decommission
        assert_eq!(dispenser.owner(), owner());
    }

    #[test]
    fn test_conservation_over_operation_sequence() {
        let (mut dispenser, mut accounts) = funded_dispenser(2);
        let total_before = accounts.balance_of(&owner())
            + accounts.balance_of(&stranger())
            + dispenser.balance();

        dispenser
            .withdraw(&stranger(), milli_to_wei(100), &mut accounts)
            .unwrap();
        dispenser.fund(&stranger(), to_wei(1), &mut accounts).unwrap();
        dispenser
            .withdraw(&owner(), milli_to_wei(50), &mut accounts)
            .unwrap();
        dispenser.withdraw_all(&owner(), &mut accounts).unwrap();
        dispenser.fund(&owner(), to_wei(3), &mut accounts).unwrap();
        dispenser.decommission(&owner(), &mut accounts).unwrap();

        let total_after = accounts.balance_of(&owner())
            + accounts.balance_of(&stranger())
            + dispenser.balance();
        assert_eq!(total_before, total_after);
    }

    #[test]
    fn test_faucet_lifecycle_scenario() {
        // Open with 2.0 units, as in the deployment scenario
        let (mut dispenser, mut accounts) = funded_dispenser(2);
        let owner_before = accounts.balance_of(&owner());

        // Owner withdrawal of 0.11 units is over the public cap
        let err = dispenser
            .withdraw(&owner(), milli_to_wei(110), &mut accounts)
            .unwrap_err();
        assert!(matches!(err, LedgerError::LimitExceeded { .. }));
        assert_eq!(dispenser.balance(), to_wei(2));

        // withdraw_all drains the pool to the owner
        dispenser.withdraw_all(&owner(), &mut accounts).unwrap();
        assert_eq!(dispenser.balance(), 0);
        assert_eq!(accounts.balance_of(&owner()), owner_before + to_wei(2));

        // Non-owner may not decommission
        assert_eq!(
            dispenser.decommission(&stranger(), &mut accounts),
            Err(LedgerError::Unauthorized)
        );

        // Owner decommission leaves the dispenser permanently inert
        dispenser.decommission(&owner(), &mut accounts).unwrap();
        assert!(!dispenser.is_active());
        assert_eq!(dispenser.balance(), 0);
        assert_eq!(
            dispenser.withdraw(&stranger(), 1, &mut accounts),
            Err(LedgerError::Inactive)
        );
    }
}
