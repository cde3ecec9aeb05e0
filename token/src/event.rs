//! Ledger events for external observers.

use serde::{Deserialize, Serialize};
use tcr_types::AccountId;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum TokenEvent {
    /// Tokens moved between two accounts (also emitted for delegated transfers).
    Transfer {
        from: AccountId,
        to: AccountId,
        amount: u128,
    },
    /// An allowance was set, replacing any previous grant.
    Approval {
        owner: AccountId,
        spender: AccountId,
        amount: u128,
    },
}
