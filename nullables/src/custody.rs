//! Nullable custody: a real ledger that can be told to refuse payouts.

use tcr_token::{Custody, TokenError, TokenLedger};
use tcr_types::AccountId;

/// Wraps a [`TokenLedger`] and, when armed, fails every plain `transfer`
/// as if the sending account were drained. Delegated transfers still work,
/// so deposits can be taken while refunds and payouts fail.
pub struct NullCustody {
    inner: TokenLedger,
    refuse_transfers: bool,
}

impl NullCustody {
    pub fn new(inner: TokenLedger) -> Self {
        Self {
            inner,
            refuse_transfers: false,
        }
    }

    pub fn refuse_transfers(&mut self, refuse: bool) {
        self.refuse_transfers = refuse;
    }

    pub fn inner(&self) -> &TokenLedger {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut TokenLedger {
        &mut self.inner
    }
}

impl Custody for NullCustody {
    fn transfer(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: u128,
    ) -> Result<(), TokenError> {
        if self.refuse_transfers {
            return Err(TokenError::InsufficientBalance {
                needed: amount,
                available: 0,
            });
        }
        self.inner.transfer(from, to, amount)
    }

    fn transfer_from(
        &mut self,
        spender: &AccountId,
        owner: &AccountId,
        to: &AccountId,
        amount: u128,
    ) -> Result<(), TokenError> {
        self.inner.transfer_from(spender, owner, to, amount)
    }

    fn balance_of(&self, account: &AccountId) -> u128 {
        self.inner.balance_of(account)
    }

    fn allowance(&self, owner: &AccountId, spender: &AccountId) -> u128 {
        self.inner.allowance(owner, spender)
    }
}
