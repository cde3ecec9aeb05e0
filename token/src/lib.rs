//! Token ledger for the fixed-supply fungible asset the registry stakes.
//!
//! The ledger owns every account's balance and allowance table. Supply is
//! minted once to a genesis holder at construction; there is no mint or burn.
//!
//! Other components never touch balances directly. They go through the
//! [`Custody`] trait, which models the approve-then-transferFrom pattern:
//! an owner first grants a spender an allowance, the spender then moves
//! tokens up to that grant.

pub mod custody;
pub mod error;
pub mod event;
pub mod ledger;

pub use custody::Custody;
pub use error::TokenError;
pub use event::TokenEvent;
pub use ledger::TokenLedger;
