use cosmwasm_std::StdError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("unauthorized: {reason}")]
    Unauthorized { reason: String },

    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("a participant with this {field} is already registered")]
    DuplicateEntry { field: String },

    #[error("participant {entry_id} not found")]
    ParticipantNotFound { entry_id: String },

    #[error("referral code {referral_code} not found")]
    ReferralCodeNotFound { referral_code: String },

    #[error("registration closed at {deadline}")]
    RegistrationClosed { deadline: u64 },

    #[error("could not allocate a unique entry id after {attempts} attempts")]
    EntryIdExhausted { attempts: u32 },

    #[error("no eligible participants for draw position {draw_position}")]
    NoEligibleParticipants { draw_position: u32 },

    #[error("draw position {requested} was already taken, next position is {expected}")]
    DrawConflict { expected: u32, requested: u32 },

    #[error("participant {entry_id} has already won")]
    AlreadyWon { entry_id: String },

    #[error("draw position must be at least 1")]
    InvalidDrawPosition,

    #[error("invalid hex: {field}")]
    InvalidHex { field: String },

    #[error("entropy must be 32 bytes, got {got}")]
    InvalidEntropyLength { got: usize },

    #[error("invalid max_winners {value}: {reason}")]
    InvalidMaxWinners { value: u32, reason: String },
}

impl ContractError {
    /// Errors a caller may retry automatically, after refreshing the winner
    /// list and draw position.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ContractError::DrawConflict { .. })
    }

    pub(crate) fn validation(field: &str, reason: impl Into<String>) -> Self {
        ContractError::Validation {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}
