//! Token-weighted votes on a challenge.

use crate::challenge::ChallengeId;
use serde::{Deserialize, Serialize};
use tcr_types::AccountId;

/// One voter's position on one challenge. Top-ups accumulate into the same record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub challenge_id: ChallengeId,
    pub voter: AccountId,
    pub tokens_committed: u128,
    /// `true` supports the listing, `false` supports the challenger.
    pub choice: bool,
    pub claimed: bool,
}

/// Returned by `Registry::vote`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteReceipt {
    pub challenge_id: ChallengeId,
    pub voter: AccountId,
    /// Tokens locked by this call.
    pub amount: u128,
    /// Voter's total on this challenge after this call.
    pub tokens_committed: u128,
    pub support: bool,
    pub votes_for: u128,
    pub votes_against: u128,
}
