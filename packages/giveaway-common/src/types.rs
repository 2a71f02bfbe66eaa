use cosmwasm_schema::cw_serde;
use cosmwasm_std::{StdError, StdResult, Timestamp, Uint128};

use crate::badges::{calculate_earned_badges, Badge};

/// Entries every participant holds from registration.
pub const BASE_ENTRIES: u64 = 1;

/// Bonus entries credited to a referrer per successful referral.
pub const BONUS_PER_REFERRAL: u64 = 3;

/// Real winners a campaign may draw unless configured otherwise.
pub const DEFAULT_MAX_WINNERS: u32 = 10;

/// Which registrations count as duplicates.
#[cw_serde]
pub enum DedupPolicy {
    /// One registration per normalized email address.
    Email,
    /// One registration per email and one per phone number.
    EmailOrPhone,
    /// No duplicate detection.
    Disabled,
}

impl Default for DedupPolicy {
    fn default() -> Self {
        DedupPolicy::Email
    }
}

#[cw_serde]
pub struct Participant {
    pub entry_id: String,
    pub name: String,
    /// Trimmed and lowercased
    pub email: String,
    pub phone: String,
    pub selected_products: Vec<String>,
    pub referral_code: String,
    /// Referral code of the participant who referred this one
    pub referred_by: Option<String>,
    pub referral_count: u64,
    pub base_entries: u64,
    pub bonus_entries: u64,
    pub total_entries: u64,
    pub submitted_at: Timestamp,
    /// Registration ordinal, breaks ties between registrations in the same block
    pub sequence: u64,
    /// Badge tiers as last refreshed by a referral
    pub badges: Vec<Badge>,
}

impl Participant {
    /// Credit one referral: bump the counter and recompute bonus and total
    /// entries and the badge ledger in a single step.
    pub fn apply_referral(&mut self, now: Timestamp) -> StdResult<()> {
        let referral_count = self
            .referral_count
            .checked_add(1)
            .ok_or_else(|| StdError::generic_err("referral count overflow"))?;
        let bonus_entries = bonus_entries(referral_count)?;
        let total_entries = total_entries(self.base_entries, bonus_entries)?;

        self.referral_count = referral_count;
        self.bonus_entries = bonus_entries;
        self.total_entries = total_entries;
        self.badges = calculate_earned_badges(referral_count, &self.badges, now);
        Ok(())
    }

    /// True when the stored counters agree with the entry formula.
    pub fn entries_consistent(&self) -> bool {
        bonus_entries(self.referral_count).ok() == Some(self.bonus_entries)
            && total_entries(self.base_entries, self.bonus_entries).ok()
                == Some(self.total_entries)
            && self.total_entries >= 1
    }
}

pub fn bonus_entries(referral_count: u64) -> StdResult<u64> {
    referral_count
        .checked_mul(BONUS_PER_REFERRAL)
        .ok_or_else(|| StdError::generic_err("bonus entries overflow"))
}

pub fn total_entries(base_entries: u64, bonus_entries: u64) -> StdResult<u64> {
    base_entries
        .checked_add(bonus_entries)
        .ok_or_else(|| StdError::generic_err("total entries overflow"))
}

/// A committed draw result. Real and rehearsal winners live in separate stores;
/// `is_rehearsal` is recorded on the row as well so the two can never be confused.
#[cw_serde]
pub struct Winner {
    pub entry_id: String,
    pub draw_position: u32,
    pub drawn_at: Timestamp,
    pub is_rehearsal: bool,
    /// Ticket in `[0, total_weight)` that selected this winner
    pub winning_ticket: Uint128,
    pub total_weight: Uint128,
    pub pool_size: u32,
    /// Admin-supplied entropy, hex-encoded
    pub entropy: String,
    /// sha256(entropy) XOR sha256(block context), hex-encoded
    pub final_randomness: String,
}

#[cw_serde]
pub struct DrawStatistics {
    pub pool_size: u32,
    pub remaining_participants: u32,
    pub total_weight: Uint128,
}

#[cw_serde]
pub struct DrawResult {
    pub winner: Winner,
    pub statistics: DrawStatistics,
}
