//! Registry events for indexers. Each carries enough to replay the transition.

use crate::challenge::ChallengeId;
use serde::{Deserialize, Serialize};
use tcr_types::{AccountId, ListingName, Timestamp};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum RegistryEvent {
    Application {
        name: ListingName,
        owner: AccountId,
        deposit: u128,
        application_expiry: Timestamp,
        data: String,
    },
    Challenge {
        name: ListingName,
        challenge_id: ChallengeId,
        challenger: AccountId,
        deposit: u128,
        resolution_time: Timestamp,
    },
    Vote {
        name: ListingName,
        challenge_id: ChallengeId,
        voter: AccountId,
        amount: u128,
        support: bool,
        votes_for: u128,
        votes_against: u128,
    },
    /// An unchallenged application was accepted.
    ListingWhitelisted {
        name: ListingName,
        deposit: u128,
    },
    ResolveChallenge {
        name: ListingName,
        challenge_id: ChallengeId,
        listing_won: bool,
        votes_for: u128,
        votes_against: u128,
        reward_pool: u128,
        total_winning_tokens: u128,
        resolved_by: AccountId,
    },
    RewardClaimed {
        challenge_id: ChallengeId,
        voter: AccountId,
        tokens_returned: u128,
        reward: u128,
    },
    /// The owner withdrew a whitelisted listing and its deposit.
    ListingExited {
        name: ListingName,
        owner: AccountId,
        deposit: u128,
    },
}
