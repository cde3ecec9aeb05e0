//! Registry listings.

use crate::challenge::ChallengeId;
use serde::{Deserialize, Serialize};
use tcr_types::{AccountId, ListingName, Timestamp};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListingStatus {
    /// Never listed, removed by a lost challenge, or withdrawn by its owner.
    Unlisted,
    /// Deposit staked, waiting for the application period to pass.
    Applied,
    /// Accepted into the registry.
    Whitelisted,
}

impl ListingStatus {
    /// Whether the listing currently holds a deposit in the registry.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Applied | Self::Whitelisted)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Listing {
    pub name: ListingName,
    pub owner: AccountId,
    /// Tokens at stake for this listing; zero once unlisted.
    pub deposit: u128,
    pub status: ListingStatus,
    pub application_expiry: Timestamp,
    /// Most recent challenge, open or resolved.
    pub challenge_id: Option<ChallengeId>,
    pub data: String,
}

/// Read-only projection returned by `Registry::listing_details`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingDetails {
    pub owner: AccountId,
    pub deposit: u128,
    pub status: ListingStatus,
    pub challenge_id: Option<ChallengeId>,
    pub data: String,
}

impl From<&Listing> for ListingDetails {
    fn from(listing: &Listing) -> Self {
        Self {
            owner: listing.owner.clone(),
            deposit: listing.deposit,
            status: listing.status,
            challenge_id: listing.challenge_id,
            data: listing.data.clone(),
        }
    }
}
