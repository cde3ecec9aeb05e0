//! Core ledger: balances, allowances and the fixed total supply.

use crate::custody::Custody;
use crate::error::TokenError;
use crate::event::TokenEvent;
use std::collections::HashMap;
use tcr_types::{AccountId, TokenParams};
use tracing::debug;

/// Per-account ledger record.
#[derive(Clone, Debug, Default)]
struct Account {
    balance: u128,
    /// Spender → remaining amount it may move out of this account.
    allowances: HashMap<AccountId, u128>,
}

/// The token ledger.
///
/// Invariant: the sum of all balances equals `params.total_supply` after every
/// operation, successful or not.
pub struct TokenLedger {
    params: TokenParams,
    accounts: HashMap<AccountId, Account>,
    events: Vec<TokenEvent>,
}

impl TokenLedger {
    /// Create a ledger and credit the entire supply to `genesis_holder`.
    pub fn new(params: TokenParams, genesis_holder: AccountId) -> Result<Self, TokenError> {
        if !genesis_holder.is_valid() {
            return Err(TokenError::InvalidAccount(genesis_holder.to_string()));
        }
        let mut accounts = HashMap::new();
        accounts.insert(
            genesis_holder.clone(),
            Account {
                balance: params.total_supply,
                allowances: HashMap::new(),
            },
        );
        debug!(holder = %genesis_holder, supply = params.total_supply, "token ledger created");
        Ok(Self {
            params,
            accounts,
            events: Vec::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.params.name
    }

    pub fn symbol(&self) -> &str {
        &self.params.symbol
    }

    pub fn decimals(&self) -> u8 {
        self.params.decimals
    }

    pub fn total_supply(&self) -> u128 {
        self.params.total_supply
    }

    pub fn balance_of(&self, account: &AccountId) -> u128 {
        self.accounts.get(account).map(|a| a.balance).unwrap_or(0)
    }

    pub fn allowance(&self, owner: &AccountId, spender: &AccountId) -> u128 {
        self.accounts
            .get(owner)
            .and_then(|a| a.allowances.get(spender).copied())
            .unwrap_or(0)
    }

    /// Sum of all balances, or `None` if it would overflow.
    pub fn circulating(&self) -> Option<u128> {
        self.accounts
            .values()
            .try_fold(0u128, |acc, a| acc.checked_add(a.balance))
    }

    /// Whether the sum of balances still equals the fixed supply.
    pub fn supply_is_conserved(&self) -> bool {
        self.circulating() == Some(self.params.total_supply)
    }

    /// Set the allowance `owner` grants `spender`. Overwrites, never accumulates.
    pub fn approve(
        &mut self,
        owner: &AccountId,
        spender: &AccountId,
        amount: u128,
    ) -> Result<(), TokenError> {
        if !owner.is_valid() {
            return Err(TokenError::InvalidAccount(owner.to_string()));
        }
        if !spender.is_valid() {
            return Err(TokenError::InvalidAccount(spender.to_string()));
        }
        self.accounts
            .entry(owner.clone())
            .or_default()
            .allowances
            .insert(spender.clone(), amount);
        debug!(%owner, %spender, amount, "allowance set");
        self.events.push(TokenEvent::Approval {
            owner: owner.clone(),
            spender: spender.clone(),
            amount,
        });
        Ok(())
    }

    /// Move `amount` from `from` to `to`.
    pub fn transfer(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: u128,
    ) -> Result<(), TokenError> {
        let (from_after, to_after) = self.plan_move(from, to, amount)?;
        self.apply_move(from, to, from_after, to_after);
        debug!(%from, %to, amount, "transfer");
        self.events.push(TokenEvent::Transfer {
            from: from.clone(),
            to: to.clone(),
            amount,
        });
        Ok(())
    }

    /// Spend from the allowance `owner` granted `spender`.
    ///
    /// Balance is checked before allowance; both are checked before either moves.
    pub fn transfer_from(
        &mut self,
        spender: &AccountId,
        owner: &AccountId,
        to: &AccountId,
        amount: u128,
    ) -> Result<(), TokenError> {
        let (from_after, to_after) = self.plan_move(owner, to, amount)?;
        let approved = self.allowance(owner, spender);
        if approved < amount {
            return Err(TokenError::InsufficientAllowance {
                needed: amount,
                available: approved,
            });
        }
        let allowance_after = approved.checked_sub(amount).ok_or(TokenError::Underflow)?;

        if let Some(account) = self.accounts.get_mut(owner) {
            account.allowances.insert(spender.clone(), allowance_after);
        }
        self.apply_move(owner, to, from_after, to_after);
        debug!(%spender, %owner, %to, amount, "delegated transfer");
        self.events.push(TokenEvent::Transfer {
            from: owner.clone(),
            to: to.clone(),
            amount,
        });
        Ok(())
    }

    /// All events emitted so far, oldest first.
    pub fn events(&self) -> &[TokenEvent] {
        &self.events
    }

    /// Take the event log, leaving it empty.
    pub fn drain_events(&mut self) -> Vec<TokenEvent> {
        std::mem::take(&mut self.events)
    }

    /// Compute post-move balances without mutating anything.
    fn plan_move(
        &self,
        from: &AccountId,
        to: &AccountId,
        amount: u128,
    ) -> Result<(u128, u128), TokenError> {
        for account in [from, to] {
            if !account.is_valid() {
                return Err(TokenError::InvalidAccount(account.to_string()));
            }
        }
        let available = self.balance_of(from);
        if available < amount {
            return Err(TokenError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        let from_after = available.checked_sub(amount).ok_or(TokenError::Underflow)?;
        let to_after = if from == to {
            available
        } else {
            self.balance_of(to)
                .checked_add(amount)
                .ok_or(TokenError::Overflow)?
        };
        Ok((from_after, to_after))
    }

    fn apply_move(&mut self, from: &AccountId, to: &AccountId, from_after: u128, to_after: u128) {
        if from == to {
            return;
        }
        self.accounts.entry(from.clone()).or_default().balance = from_after;
        self.accounts.entry(to.clone()).or_default().balance = to_after;
    }
}

impl Custody for TokenLedger {
    fn transfer(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: u128,
    ) -> Result<(), TokenError> {
        TokenLedger::transfer(self, from, to, amount)
    }

    fn transfer_from(
        &mut self,
        spender: &AccountId,
        owner: &AccountId,
        to: &AccountId,
        amount: u128,
    ) -> Result<(), TokenError> {
        TokenLedger::transfer_from(self, spender, owner, to, amount)
    }

    fn balance_of(&self, account: &AccountId) -> u128 {
        TokenLedger::balance_of(self, account)
    }

    fn allowance(&self, owner: &AccountId, spender: &AccountId) -> u128 {
        TokenLedger::allowance(self, owner, spender)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acct(name: &str) -> AccountId {
        AccountId::new(name)
    }

    fn ledger() -> TokenLedger {
        TokenLedger::new(TokenParams::default(), acct("genesis")).unwrap()
    }

    #[test]
    fn genesis_holder_receives_total_supply() {
        let l = ledger();
        assert_eq!(l.name(), "DemoToken");
        assert_eq!(l.total_supply(), 21_000_000);
        assert_eq!(l.balance_of(&acct("genesis")), 21_000_000);
        assert_eq!(l.balance_of(&acct("nobody")), 0);
        assert!(l.supply_is_conserved());
    }

    #[test]
    fn empty_genesis_holder_is_rejected() {
        assert!(matches!(
            TokenLedger::new(TokenParams::default(), acct("")),
            Err(TokenError::InvalidAccount(_))
        ));
    }

    #[test]
    fn transfer_moves_balance() {
        let mut l = ledger();
        l.transfer(&acct("genesis"), &acct("alice"), 100_000).unwrap();
        assert_eq!(l.balance_of(&acct("alice")), 100_000);
        assert_eq!(l.balance_of(&acct("genesis")), 20_900_000);
        assert!(l.supply_is_conserved());
        assert_eq!(
            l.events().last(),
            Some(&TokenEvent::Transfer {
                from: acct("genesis"),
                to: acct("alice"),
                amount: 100_000
            })
        );
    }

    #[test]
    fn transfer_more_than_balance_fails_without_change() {
        let mut l = ledger();
        l.transfer(&acct("genesis"), &acct("alice"), 10).unwrap();
        let err = l.transfer(&acct("alice"), &acct("bob"), 11).unwrap_err();
        assert_eq!(
            err,
            TokenError::InsufficientBalance {
                needed: 11,
                available: 10
            }
        );
        assert_eq!(l.balance_of(&acct("alice")), 10);
        assert_eq!(l.balance_of(&acct("bob")), 0);
    }

    #[test]
    fn self_transfer_keeps_balance() {
        let mut l = ledger();
        l.transfer(&acct("genesis"), &acct("genesis"), 500).unwrap();
        assert_eq!(l.balance_of(&acct("genesis")), 21_000_000);
        assert!(l.supply_is_conserved());
    }

    #[test]
    fn approve_overwrites_previous_allowance() {
        let mut l = ledger();
        l.approve(&acct("genesis"), &acct("tcr"), 100_000).unwrap();
        assert_eq!(l.allowance(&acct("genesis"), &acct("tcr")), 100_000);
        l.approve(&acct("genesis"), &acct("tcr"), 5).unwrap();
        assert_eq!(l.allowance(&acct("genesis"), &acct("tcr")), 5);
    }

    #[test]
    fn transfer_from_spends_allowance() {
        let mut l = ledger();
        l.approve(&acct("genesis"), &acct("tcr"), 100).unwrap();
        l.transfer_from(&acct("tcr"), &acct("genesis"), &acct("tcr"), 60)
            .unwrap();
        assert_eq!(l.balance_of(&acct("tcr")), 60);
        assert_eq!(l.allowance(&acct("genesis"), &acct("tcr")), 40);
    }

    #[test]
    fn transfer_from_beyond_allowance_fails_without_change() {
        let mut l = ledger();
        l.approve(&acct("genesis"), &acct("tcr"), 10).unwrap();
        let err = l
            .transfer_from(&acct("tcr"), &acct("genesis"), &acct("tcr"), 11)
            .unwrap_err();
        assert_eq!(
            err,
            TokenError::InsufficientAllowance {
                needed: 11,
                available: 10
            }
        );
        assert_eq!(l.allowance(&acct("genesis"), &acct("tcr")), 10);
        assert_eq!(l.balance_of(&acct("tcr")), 0);
    }

    #[test]
    fn transfer_from_checks_balance_before_allowance() {
        let mut l = ledger();
        l.approve(&acct("alice"), &acct("tcr"), 10).unwrap();
        let err = l
            .transfer_from(&acct("tcr"), &acct("alice"), &acct("tcr"), 5)
            .unwrap_err();
        assert!(matches!(err, TokenError::InsufficientBalance { .. }));
        assert_eq!(l.allowance(&acct("alice"), &acct("tcr")), 10);
    }

    #[test]
    fn zero_transfer_is_allowed() {
        let mut l = ledger();
        l.transfer(&acct("alice"), &acct("bob"), 0).unwrap();
        assert_eq!(l.events().len(), 1);
    }

    #[test]
    fn drain_events_empties_log() {
        let mut l = ledger();
        l.approve(&acct("genesis"), &acct("tcr"), 1).unwrap();
        assert_eq!(l.drain_events().len(), 1);
        assert!(l.events().is_empty());
    }
}
