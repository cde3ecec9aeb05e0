//! Challenges against listings and their settlement arithmetic.

use crate::error::RegistryError;
use serde::{Deserialize, Serialize};
use tcr_types::{AccountId, ListingName, Timestamp};

/// Monotonically increasing challenge identifier. The first challenge is 1.
pub type ChallengeId = u64;

/// A dispute against a listing. Never removed, so late claims stay possible.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Challenge {
    pub id: ChallengeId,
    pub listing_name: ListingName,
    pub challenger: AccountId,
    /// Equal to the listing's deposit at the time of the challenge.
    pub deposit: u128,
    pub votes_for: u128,
    pub votes_against: u128,
    pub resolved: bool,
    pub resolution_time: Timestamp,
    /// The loser's deposit, shared among winning voters.
    pub reward_pool: u128,
    /// Winning side's tally, frozen at resolution.
    pub total_winning_tokens: u128,
    /// Losing side's tally; these tokens stay in registry custody.
    pub forfeited_vote_tokens: u128,
    /// `Some(true)` if the listing survived. Set at resolution.
    pub listing_won: Option<bool>,
    /// Reward shares paid out so far (excludes returned vote tokens).
    pub rewards_paid: u128,
    /// Winning vote tokens already returned to their voters.
    pub tokens_returned: u128,
}

impl Challenge {
    pub fn new(
        id: ChallengeId,
        listing_name: ListingName,
        challenger: AccountId,
        deposit: u128,
        resolution_time: Timestamp,
    ) -> Self {
        Self {
            id,
            listing_name,
            challenger,
            deposit,
            votes_for: 0,
            votes_against: 0,
            resolved: false,
            resolution_time,
            reward_pool: 0,
            total_winning_tokens: 0,
            forfeited_vote_tokens: 0,
            listing_won: None,
            rewards_paid: 0,
            tokens_returned: 0,
        }
    }

    /// Votes are accepted strictly before `resolution_time`.
    pub fn voting_open(&self, now: Timestamp) -> bool {
        !self.resolved && !self.resolution_time.has_passed(now)
    }

    /// Ties go to the challenger: the listing needs strictly more votes for.
    pub fn listing_wins_tally(&self) -> bool {
        self.votes_for > self.votes_against
    }

    /// The vote choice that won, once resolved.
    pub fn winning_choice(&self) -> Option<bool> {
        self.listing_won
    }

    /// Proportional share of the reward pool for `tokens` winning tokens.
    ///
    /// Truncates toward zero. The remainder stays in registry custody and is
    /// reported by [`Challenge::unclaimable_dust`] once all winners have claimed.
    pub fn reward_share(&self, tokens: u128) -> Result<u128, RegistryError> {
        if self.total_winning_tokens == 0 {
            return Ok(0);
        }
        mul_div_floor(self.reward_pool, tokens, self.total_winning_tokens)
            .ok_or(RegistryError::Overflow)
    }

    /// Reward pool left over after every winning voter has claimed.
    pub fn unclaimable_dust(&self) -> u128 {
        if self.tokens_returned < self.total_winning_tokens {
            return 0;
        }
        self.reward_pool.saturating_sub(self.rewards_paid)
    }

    /// Tokens this challenge still holds in registry custody.
    pub fn tokens_in_custody(&self) -> Result<u128, RegistryError> {
        if !self.resolved {
            return self
                .deposit
                .checked_add(self.votes_for)
                .and_then(|t| t.checked_add(self.votes_against))
                .ok_or(RegistryError::Overflow);
        }
        let held = self
            .reward_pool
            .checked_add(self.total_winning_tokens)
            .and_then(|t| t.checked_add(self.forfeited_vote_tokens))
            .ok_or(RegistryError::Overflow)?;
        held.checked_sub(self.rewards_paid)
            .and_then(|t| t.checked_sub(self.tokens_returned))
            .ok_or(RegistryError::Underflow)
    }
}

/// `floor(a * b / d)` with a 256-bit intermediate product.
///
/// `None` if `d` is zero or the quotient does not fit in a `u128`.
fn mul_div_floor(a: u128, b: u128, d: u128) -> Option<u128> {
    if d == 0 {
        return None;
    }
    let (hi, lo) = widening_mul(a, b);
    if hi == 0 {
        return Some(lo / d);
    }
    if hi >= d {
        return None;
    }
    // Restoring division of hi:lo by d, one bit of lo at a time. The
    // remainder stays below d, so only the shifted-out top bit can carry.
    let mut rem = hi;
    let mut quotient = 0u128;
    for bit in (0..128).rev() {
        let carry = rem >> 127;
        rem = (rem << 1) | ((lo >> bit) & 1);
        quotient <<= 1;
        if carry == 1 || rem >= d {
            rem = rem.wrapping_sub(d);
            quotient |= 1;
        }
    }
    Some(quotient)
}

/// Full 256-bit product of two `u128`s as `(high, low)` halves.
fn widening_mul(a: u128, b: u128) -> (u128, u128) {
    const MASK: u128 = u64::MAX as u128;
    let (a_hi, a_lo) = (a >> 64, a & MASK);
    let (b_hi, b_lo) = (b >> 64, b & MASK);

    let ll = a_lo * b_lo;
    let lh = a_lo * b_hi;
    let hl = a_hi * b_lo;
    let hh = a_hi * b_hi;

    let mid = (ll >> 64) + (lh & MASK) + (hl & MASK);
    let lo = (ll & MASK) | (mid << 64);
    let hi = hh + (lh >> 64) + (hl >> 64) + (mid >> 64);
    (hi, lo)
}

/// What `Registry::resolve` did.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionOutcome {
    /// An unchallenged application passed its application period.
    Whitelisted { name: ListingName },
    /// The listing won its challenge and is whitelisted; the challenger's
    /// deposit funds the reward pool.
    ChallengeFailed {
        challenge_id: ChallengeId,
        reward_pool: u128,
    },
    /// The challenger won; the listing is removed and its deposit funds the
    /// reward pool.
    ChallengeSucceeded {
        challenge_id: ChallengeId,
        reward_pool: u128,
    },
}
