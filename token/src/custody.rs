//! The delegated-transfer seam between the registry and the ledger.

use crate::error::TokenError;
use tcr_types::AccountId;

/// Token custody operations a registry needs from the host ledger.
///
/// Implementations must be atomic: an `Err` means no balance or allowance moved.
pub trait Custody {
    /// Move `amount` from `from` to `to`. The caller must be `from`.
    fn transfer(&mut self, from: &AccountId, to: &AccountId, amount: u128)
        -> Result<(), TokenError>;

    /// Spend up to the allowance `owner` granted `spender`, moving tokens to `to`.
    fn transfer_from(
        &mut self,
        spender: &AccountId,
        owner: &AccountId,
        to: &AccountId,
        amount: u128,
    ) -> Result<(), TokenError>;

    fn balance_of(&self, account: &AccountId) -> u128;

    fn allowance(&self, owner: &AccountId, spender: &AccountId) -> u128;
}
