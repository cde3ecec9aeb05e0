//! Core registry engine: listing lifecycle, challenge voting and reward settlement.

use crate::challenge::{Challenge, ChallengeId, ResolutionOutcome};
use crate::error::RegistryError;
use crate::event::RegistryEvent;
use crate::listing::{Listing, ListingDetails, ListingStatus};
use crate::vote::{Vote, VoteReceipt};
use std::collections::{BTreeMap, HashMap};
use tcr_token::{Custody, TokenLedger};
use tcr_types::{AccountId, ListingName, RegistryParams, Timestamp};
use tracing::{debug, info, warn};

/// The registry state machine.
///
/// Every public operation takes the caller identity and the host timestamp
/// explicitly. Operations either fully apply or return an error with no
/// state or token change. Deposits and locked votes sit in the ledger under
/// `account`, moved only through the [`Custody`] seam.
pub struct Registry<L: Custody = TokenLedger> {
    name: String,
    account: AccountId,
    params: RegistryParams,
    ledger: L,
    listings: HashMap<ListingName, Listing>,
    /// Names in order of first proposal.
    listing_order: Vec<ListingName>,
    challenges: BTreeMap<ChallengeId, Challenge>,
    votes: HashMap<(ChallengeId, AccountId), Vote>,
    next_challenge_id: ChallengeId,
    events: Vec<RegistryEvent>,
}

impl<L: Custody> Registry<L> {
    /// Create a registry that holds custody under `account` on `ledger`.
    pub fn new(
        name: impl Into<String>,
        account: AccountId,
        params: RegistryParams,
        ledger: L,
    ) -> Result<Self, RegistryError> {
        params
            .validate()
            .map_err(|e| RegistryError::InvalidParams(e.to_string()))?;
        if !account.is_valid() {
            return Err(RegistryError::InvalidParams(
                "registry account must be non-empty".into(),
            ));
        }
        let name = name.into();
        info!(registry = %name, %account, min_deposit = params.min_deposit, "registry initialized");
        Ok(Self {
            name,
            account,
            params,
            ledger,
            listings: HashMap::new(),
            listing_order: Vec::new(),
            challenges: BTreeMap::new(),
            votes: HashMap::new(),
            next_challenge_id: 1,
            events: Vec::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The ledger identity holding deposits and locked votes.
    pub fn account(&self) -> &AccountId {
        &self.account
    }

    pub fn params(&self) -> &RegistryParams {
        &self.params
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Mutable ledger access, for callers approving the registry account.
    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    // ── Listing lifecycle ───────────────────────────────────────────────

    /// Apply for a listing by staking `deposit` tokens.
    ///
    /// The caller must have approved the registry account for at least `deposit`.
    pub fn propose(
        &mut self,
        caller: &AccountId,
        name: ListingName,
        deposit: u128,
        data: impl Into<String>,
        now: Timestamp,
    ) -> Result<ListingName, RegistryError> {
        if let Some(existing) = self.listings.get(&name) {
            if existing.status != ListingStatus::Unlisted {
                return Err(RegistryError::AlreadyExists(name.to_string()));
            }
        }
        if deposit < self.params.min_deposit {
            return Err(RegistryError::DepositTooLow {
                deposit,
                min: self.params.min_deposit,
            });
        }
        let application_expiry = now
            .checked_add_secs(self.params.application_period_secs)
            .ok_or(RegistryError::Overflow)?;

        self.ledger
            .transfer_from(&self.account, caller, &self.account, deposit)?;

        let data = data.into();
        let listing = Listing {
            name,
            owner: caller.clone(),
            deposit,
            status: ListingStatus::Applied,
            application_expiry,
            challenge_id: None,
            data: data.clone(),
        };
        if self.listings.insert(name, listing).is_none() {
            self.listing_order.push(name);
        }
        info!(listing = %name, owner = %caller, deposit, expiry = %application_expiry, "application submitted");
        self.events.push(RegistryEvent::Application {
            name,
            owner: caller.clone(),
            deposit,
            application_expiry,
            data,
        });
        Ok(name)
    }

    /// Advance a listing past its time gate.
    ///
    /// Whitelists an unchallenged application once its period has passed, or
    /// settles an open challenge once voting has closed. Callable by anyone.
    pub fn resolve(
        &mut self,
        caller: &AccountId,
        name: &ListingName,
        now: Timestamp,
    ) -> Result<ResolutionOutcome, RegistryError> {
        let listing = self
            .listings
            .get(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;

        if let Some(challenge_id) = listing.challenge_id {
            let challenge = self
                .challenges
                .get(&challenge_id)
                .ok_or(RegistryError::ChallengeNotFound(challenge_id))?;
            if !challenge.resolved {
                if !challenge.resolution_time.has_passed(now) {
                    return Err(RegistryError::NotReady {
                        what: format!("challenge {}", challenge_id),
                        ready_at: challenge.resolution_time.as_secs(),
                    });
                }
                return self.resolve_challenge(caller, *name, challenge_id);
            }
        }

        // Known listing, nothing pending.
        match listing.status {
            ListingStatus::Unlisted | ListingStatus::Whitelisted => {
                Err(RegistryError::AlreadyResolved(format!("listing {}", name)))
            }
            ListingStatus::Applied => {
                if !listing.application_expiry.has_passed(now) {
                    return Err(RegistryError::NotReady {
                        what: format!("listing {}", name),
                        ready_at: listing.application_expiry.as_secs(),
                    });
                }
                let deposit = listing.deposit;
                if let Some(listing) = self.listings.get_mut(name) {
                    listing.status = ListingStatus::Whitelisted;
                }
                info!(listing = %name, deposit, "listing whitelisted");
                self.events
                    .push(RegistryEvent::ListingWhitelisted { name: *name, deposit });
                Ok(ResolutionOutcome::Whitelisted { name: *name })
            }
        }
    }

    /// Withdraw a whitelisted, unchallenged listing and return its deposit.
    pub fn exit(&mut self, caller: &AccountId, name: &ListingName) -> Result<u128, RegistryError> {
        let listing = self
            .listings
            .get(name)
            .filter(|l| l.status.is_active())
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;
        if listing.owner != *caller {
            return Err(RegistryError::NotOwner {
                name: name.to_string(),
                caller: caller.to_string(),
            });
        }
        if self.open_challenge_id(listing).is_some() {
            return Err(RegistryError::AlreadyChallenged(name.to_string()));
        }
        if listing.status != ListingStatus::Whitelisted {
            return Err(RegistryError::NotWhitelisted(name.to_string()));
        }
        let deposit = listing.deposit;

        self.ledger.transfer(&self.account, caller, deposit)?;

        if let Some(listing) = self.listings.get_mut(name) {
            listing.status = ListingStatus::Unlisted;
            listing.deposit = 0;
        }
        info!(listing = %name, owner = %caller, deposit, "listing exited");
        self.events.push(RegistryEvent::ListingExited {
            name: *name,
            owner: caller.clone(),
            deposit,
        });
        Ok(deposit)
    }

    // ── Challenges and voting ───────────────────────────────────────────

    /// Contest a listing by matching its deposit.
    pub fn challenge(
        &mut self,
        caller: &AccountId,
        name: &ListingName,
        deposit: u128,
        now: Timestamp,
    ) -> Result<ChallengeId, RegistryError> {
        let listing = self
            .listings
            .get(name)
            .filter(|l| l.status.is_active())
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;
        if self.open_challenge_id(listing).is_some() {
            return Err(RegistryError::AlreadyChallenged(name.to_string()));
        }
        if deposit != listing.deposit {
            return Err(RegistryError::DepositMismatch {
                expected: listing.deposit,
                provided: deposit,
            });
        }
        let resolution_time = now
            .checked_add_secs(self.params.voting_period_secs)
            .ok_or(RegistryError::Overflow)?;
        let challenge_id = self.next_challenge_id;
        let next_challenge_id = challenge_id
            .checked_add(1)
            .ok_or(RegistryError::Overflow)?;

        self.ledger
            .transfer_from(&self.account, caller, &self.account, deposit)?;

        self.next_challenge_id = next_challenge_id;
        self.challenges.insert(
            challenge_id,
            Challenge::new(challenge_id, *name, caller.clone(), deposit, resolution_time),
        );
        if let Some(listing) = self.listings.get_mut(name) {
            listing.challenge_id = Some(challenge_id);
        }
        info!(listing = %name, challenge_id, challenger = %caller, deposit, "challenge opened");
        self.events.push(RegistryEvent::Challenge {
            name: *name,
            challenge_id,
            challenger: caller.clone(),
            deposit,
            resolution_time,
        });
        Ok(challenge_id)
    }

    /// Lock `amount` tokens for (`support = true`) or against the listing.
    ///
    /// A repeat vote tops up the caller's existing record and must keep the
    /// same side.
    pub fn vote(
        &mut self,
        caller: &AccountId,
        name: &ListingName,
        amount: u128,
        support: bool,
        now: Timestamp,
    ) -> Result<VoteReceipt, RegistryError> {
        if amount == 0 {
            return Err(RegistryError::ZeroAmount);
        }
        let listing = self
            .listings
            .get(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;
        let challenge_id = self
            .open_challenge_id(listing)
            .ok_or_else(|| RegistryError::NoOpenChallenge(name.to_string()))?;
        let challenge = self
            .challenges
            .get(&challenge_id)
            .ok_or(RegistryError::ChallengeNotFound(challenge_id))?;
        if !challenge.voting_open(now) {
            return Err(RegistryError::VotingClosed {
                challenge_id,
                closed_at: challenge.resolution_time.as_secs(),
            });
        }

        let key = (challenge_id, caller.clone());
        let prior_tokens = match self.votes.get(&key) {
            Some(existing) if existing.choice != support => {
                return Err(RegistryError::ConflictingVote {
                    challenge_id,
                    voter: caller.to_string(),
                });
            }
            Some(existing) => existing.tokens_committed,
            None => 0,
        };
        let tokens_committed = prior_tokens
            .checked_add(amount)
            .ok_or(RegistryError::Overflow)?;
        let (votes_for, votes_against) = if support {
            (
                challenge
                    .votes_for
                    .checked_add(amount)
                    .ok_or(RegistryError::Overflow)?,
                challenge.votes_against,
            )
        } else {
            (
                challenge.votes_for,
                challenge
                    .votes_against
                    .checked_add(amount)
                    .ok_or(RegistryError::Overflow)?,
            )
        };

        self.ledger
            .transfer_from(&self.account, caller, &self.account, amount)?;

        if let Some(challenge) = self.challenges.get_mut(&challenge_id) {
            challenge.votes_for = votes_for;
            challenge.votes_against = votes_against;
        }
        self.votes.insert(
            key,
            Vote {
                challenge_id,
                voter: caller.clone(),
                tokens_committed,
                choice: support,
                claimed: false,
            },
        );
        debug!(listing = %name, challenge_id, voter = %caller, amount, support, "vote recorded");
        self.events.push(RegistryEvent::Vote {
            name: *name,
            challenge_id,
            voter: caller.clone(),
            amount,
            support,
            votes_for,
            votes_against,
        });
        Ok(VoteReceipt {
            challenge_id,
            voter: caller.clone(),
            amount,
            tokens_committed,
            support,
            votes_for,
            votes_against,
        })
    }

    /// Settle a challenge whose voting period has ended. Runs once per challenge.
    fn resolve_challenge(
        &mut self,
        caller: &AccountId,
        name: ListingName,
        challenge_id: ChallengeId,
    ) -> Result<ResolutionOutcome, RegistryError> {
        let prior_challenge = self
            .challenges
            .get(&challenge_id)
            .cloned()
            .ok_or(RegistryError::ChallengeNotFound(challenge_id))?;
        let prior_listing = self
            .listings
            .get(&name)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;
        if prior_challenge.resolved {
            return Err(RegistryError::AlreadyResolved(format!(
                "challenge {}",
                challenge_id
            )));
        }

        let listing_won = prior_challenge.listing_wins_tally();
        let (reward_pool, total_winning_tokens, forfeited_vote_tokens) = if listing_won {
            (
                prior_challenge.deposit,
                prior_challenge.votes_for,
                prior_challenge.votes_against,
            )
        } else {
            (
                prior_listing.deposit,
                prior_challenge.votes_against,
                prior_challenge.votes_for,
            )
        };

        // Flags first: the refund below runs against already-settled state.
        let mut challenge = prior_challenge.clone();
        challenge.resolved = true;
        challenge.listing_won = Some(listing_won);
        challenge.reward_pool = reward_pool;
        challenge.total_winning_tokens = total_winning_tokens;
        challenge.forfeited_vote_tokens = forfeited_vote_tokens;
        let mut listing = prior_listing.clone();
        if listing_won {
            listing.status = ListingStatus::Whitelisted;
        } else {
            listing.status = ListingStatus::Unlisted;
            listing.deposit = 0;
        }
        self.challenges.insert(challenge_id, challenge);
        self.listings.insert(name, listing);

        if !listing_won {
            if let Err(e) =
                self.ledger
                    .transfer(&self.account, &prior_challenge.challenger, prior_challenge.deposit)
            {
                self.challenges.insert(challenge_id, prior_challenge);
                self.listings.insert(name, prior_listing);
                return Err(e.into());
            }
        }

        info!(
            listing = %name,
            challenge_id,
            listing_won,
            votes_for = prior_challenge.votes_for,
            votes_against = prior_challenge.votes_against,
            reward_pool,
            "challenge resolved"
        );
        self.events.push(RegistryEvent::ResolveChallenge {
            name,
            challenge_id,
            listing_won,
            votes_for: prior_challenge.votes_for,
            votes_against: prior_challenge.votes_against,
            reward_pool,
            total_winning_tokens,
            resolved_by: caller.clone(),
        });
        Ok(if listing_won {
            ResolutionOutcome::ChallengeFailed {
                challenge_id,
                reward_pool,
            }
        } else {
            ResolutionOutcome::ChallengeSucceeded {
                challenge_id,
                reward_pool,
            }
        })
    }

    // ── Reward settlement ───────────────────────────────────────────────

    /// Pay a winning voter their locked tokens plus their share of the pool.
    ///
    /// Payout is `tokens + floor(reward_pool * tokens / total_winning_tokens)`.
    /// Rounding dust is never redistributed; it stays in registry custody.
    pub fn claim_rewards(
        &mut self,
        caller: &AccountId,
        challenge_id: ChallengeId,
    ) -> Result<u128, RegistryError> {
        let (tokens, reward) = match self.settlement(challenge_id, caller) {
            Ok(amounts) => amounts,
            Err(e) => {
                warn!(challenge_id, voter = %caller, error = %e, "reward claim rejected");
                return Err(e);
            }
        };
        let payout = tokens.checked_add(reward).ok_or(RegistryError::Overflow)?;
        let key = (challenge_id, caller.clone());
        let prior_challenge = self
            .challenges
            .get(&challenge_id)
            .cloned()
            .ok_or(RegistryError::ChallengeNotFound(challenge_id))?;
        let rewards_paid = prior_challenge
            .rewards_paid
            .checked_add(reward)
            .ok_or(RegistryError::Overflow)?;
        let tokens_returned = prior_challenge
            .tokens_returned
            .checked_add(tokens)
            .ok_or(RegistryError::Overflow)?;

        // Mark claimed before paying so a repeat sees the flag.
        if let Some(vote) = self.votes.get_mut(&key) {
            vote.claimed = true;
        }
        if let Some(challenge) = self.challenges.get_mut(&challenge_id) {
            challenge.rewards_paid = rewards_paid;
            challenge.tokens_returned = tokens_returned;
        }

        if let Err(e) = self.ledger.transfer(&self.account, caller, payout) {
            if let Some(vote) = self.votes.get_mut(&key) {
                vote.claimed = false;
            }
            self.challenges.insert(challenge_id, prior_challenge);
            return Err(e.into());
        }

        info!(challenge_id, voter = %caller, tokens, reward, "reward claimed");
        self.events.push(RegistryEvent::RewardClaimed {
            challenge_id,
            voter: caller.clone(),
            tokens_returned: tokens,
            reward,
        });
        Ok(payout)
    }

    /// The payout `voter` would receive from `claim_rewards`, without claiming.
    pub fn reward_preview(
        &self,
        challenge_id: ChallengeId,
        voter: &AccountId,
    ) -> Result<u128, RegistryError> {
        let (tokens, reward) = self.settlement(challenge_id, voter)?;
        tokens.checked_add(reward).ok_or(RegistryError::Overflow)
    }

    /// Validate a claim and split it into (returned tokens, reward share).
    fn settlement(
        &self,
        challenge_id: ChallengeId,
        voter: &AccountId,
    ) -> Result<(u128, u128), RegistryError> {
        let challenge = self
            .challenges
            .get(&challenge_id)
            .ok_or(RegistryError::ChallengeNotFound(challenge_id))?;
        if !challenge.resolved {
            return Err(RegistryError::ChallengeNotResolved(challenge_id));
        }
        let vote = self
            .votes
            .get(&(challenge_id, voter.clone()))
            .ok_or_else(|| RegistryError::VoteNotFound {
                challenge_id,
                voter: voter.to_string(),
            })?;
        if challenge.winning_choice() != Some(vote.choice) {
            return Err(RegistryError::NotAWinningVoter {
                challenge_id,
                voter: voter.to_string(),
            });
        }
        if vote.claimed {
            return Err(RegistryError::AlreadyClaimed {
                challenge_id,
                voter: voter.to_string(),
            });
        }
        let reward = challenge.reward_share(vote.tokens_committed)?;
        Ok((vote.tokens_committed, reward))
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub fn is_whitelisted(&self, name: &ListingName) -> bool {
        self.listings
            .get(name)
            .map(|l| l.status == ListingStatus::Whitelisted)
            .unwrap_or(false)
    }

    pub fn listing_details(&self, name: &ListingName) -> Result<ListingDetails, RegistryError> {
        self.listings
            .get(name)
            .map(ListingDetails::from)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    pub fn listing(&self, name: &ListingName) -> Option<&Listing> {
        self.listings.get(name)
    }

    /// Every name ever proposed, in order of first proposal.
    pub fn listings(&self) -> &[ListingName] {
        &self.listing_order
    }

    pub fn get_challenge(&self, challenge_id: ChallengeId) -> Option<&Challenge> {
        self.challenges.get(&challenge_id)
    }

    pub fn vote_of(&self, challenge_id: ChallengeId, voter: &AccountId) -> Option<&Vote> {
        self.votes.get(&(challenge_id, voter.clone()))
    }

    /// Tokens the ledger currently holds under the registry account.
    pub fn custody_balance(&self) -> u128 {
        self.ledger.balance_of(&self.account)
    }

    /// Tokens the registry's own records say it holds.
    ///
    /// Equals [`Registry::custody_balance`] unless someone transferred tokens
    /// to the registry account outside of registry operations.
    pub fn accounted_custody(&self) -> Result<u128, RegistryError> {
        let deposits = self
            .listings
            .values()
            .try_fold(0u128, |acc, l| acc.checked_add(l.deposit))
            .ok_or(RegistryError::Overflow)?;
        self.challenges.values().try_fold(deposits, |acc, c| {
            acc.checked_add(c.tokens_in_custody()?)
                .ok_or(RegistryError::Overflow)
        })
    }

    pub fn events(&self) -> &[RegistryEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<RegistryEvent> {
        std::mem::take(&mut self.events)
    }

    fn open_challenge_id(&self, listing: &Listing) -> Option<ChallengeId> {
        listing
            .challenge_id
            .filter(|id| self.challenges.get(id).map_or(false, |c| !c.resolved))
    }
}
