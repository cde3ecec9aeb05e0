use tcr_token::TokenError;
use thiserror::Error;

/// Broad classes of registry failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad arguments; retry with corrected values.
    Validation,
    /// The listing or challenge is in the wrong state or time window.
    StateConflict,
    /// Token custody failed: balance, allowance or arithmetic.
    Custody,
}

/// Every variant is returned before any state or token moves.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("deposit {deposit} is below the minimum of {min}")]
    DepositTooLow { deposit: u128, min: u128 },

    #[error("challenge deposit {provided} must equal the listing deposit {expected}")]
    DepositMismatch { expected: u128, provided: u128 },

    #[error("amount must be non-zero")]
    ZeroAmount,

    #[error("invalid registry configuration: {0}")]
    InvalidParams(String),

    #[error("listing {0} already exists")]
    AlreadyExists(String),

    #[error("listing {0} does not exist")]
    NotFound(String),

    #[error("listing {0} already has an open challenge")]
    AlreadyChallenged(String),

    #[error("listing {0} has no open challenge")]
    NoOpenChallenge(String),

    #[error("voting on challenge {challenge_id} closed at {closed_at}s")]
    VotingClosed { challenge_id: u64, closed_at: u64 },

    #[error("{what} cannot be resolved before {ready_at}s")]
    NotReady { what: String, ready_at: u64 },

    #[error("{0} is already resolved")]
    AlreadyResolved(String),

    #[error("challenge {0} does not exist")]
    ChallengeNotFound(u64),

    #[error("challenge {0} is not resolved yet")]
    ChallengeNotResolved(u64),

    #[error("{voter} did not vote on challenge {challenge_id}")]
    VoteNotFound { challenge_id: u64, voter: String },

    #[error("{voter} voted with the losing side of challenge {challenge_id}")]
    NotAWinningVoter { challenge_id: u64, voter: String },

    #[error("{voter} already claimed rewards for challenge {challenge_id}")]
    AlreadyClaimed { challenge_id: u64, voter: String },

    #[error("{voter} already voted the other way on challenge {challenge_id}")]
    ConflictingVote { challenge_id: u64, voter: String },

    #[error("{caller} does not own listing {name}")]
    NotOwner { name: String, caller: String },

    #[error("listing {0} is not whitelisted")]
    NotWhitelisted(String),

    #[error("token custody: {0}")]
    Token(#[from] TokenError),

    #[error("arithmetic overflow in registry")]
    Overflow,

    #[error("arithmetic underflow in registry")]
    Underflow,
}

impl RegistryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DepositTooLow { .. }
            | Self::DepositMismatch { .. }
            | Self::ZeroAmount
            | Self::InvalidParams(_) => ErrorKind::Validation,
            Self::Token(_) | Self::Overflow | Self::Underflow => ErrorKind::Custody,
            _ => ErrorKind::StateConflict,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_error_classes() {
        assert_eq!(
            RegistryError::DepositTooLow { deposit: 1, min: 100 }.kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            RegistryError::AlreadyExists("x".into()).kind(),
            ErrorKind::StateConflict
        );
        assert_eq!(
            RegistryError::from(TokenError::InsufficientAllowance {
                needed: 1,
                available: 0
            })
            .kind(),
            ErrorKind::Custody
        );
        assert_eq!(RegistryError::Overflow.kind(), ErrorKind::Custody);
    }
}
