//! Token-curated registry.
//!
//! Lifecycle of a listing:
//! 1. **Propose**: an applicant stakes at least `min_deposit` tokens; the
//!    listing enters `Applied` for `application_period_secs`.
//! 2. **Challenge** (optional): anyone matches the listing's deposit to open a
//!    vote lasting `voting_period_secs`. One open challenge per listing.
//! 3. **Vote**: token holders lock tokens for or against the listing.
//! 4. **Resolve**: anyone advances the listing once its time gate passes.
//!    Unchallenged applications become `Whitelisted`; challenges are settled,
//!    the listing wins only with strictly more votes for than against.
//! 5. **Claim**: winning voters withdraw their tokens plus a pro-rata share of
//!    the loser's deposit.
//!
//! Every token movement goes through [`tcr_token::Custody`]; the registry's
//! own account holds all deposits and locked votes.

pub mod challenge;
pub mod engine;
pub mod error;
pub mod event;
pub mod listing;
pub mod vote;

pub use challenge::{Challenge, ChallengeId, ResolutionOutcome};
pub use engine::Registry;
pub use error::{ErrorKind, RegistryError};
pub use event::RegistryEvent;
pub use listing::{Listing, ListingDetails, ListingStatus};
pub use vote::{Vote, VoteReceipt};
