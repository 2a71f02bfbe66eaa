use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::Timestamp;
use giveaway_common::badges::{Badge, NextBadge};
use giveaway_common::leaderboard::LeaderboardEntry;
use giveaway_common::milestones::MilestoneMessage;
use giveaway_common::types::{DedupPolicy, Participant, Winner};

use crate::state::Config;

#[cw_serde]
pub struct InstantiateMsg {
    pub operator: String,
    /// Defaults to 10
    pub max_winners: Option<u32>,
    /// Defaults to one registration per email
    pub dedup_policy: Option<DedupPolicy>,
    pub registration_deadline: Option<Timestamp>,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Register a participant. Operator or admin only.
    /// Response data is the new `Participant`.
    Register {
        name: String,
        email: String,
        phone: String,
        selected_products: Vec<String>,
        /// Referral code of the referrer, if the user arrived through a link
        referred_by_code: Option<String>,
    },
    /// Credit one referral to the owner of `referral_code`. Operator or admin only.
    /// Response data is the updated referrer.
    RecordReferral { referral_code: String },
    /// Draw one winner, weighted by entries. Admin only.
    /// Response data is a `DrawResult`.
    DrawWinner {
        exclude_entry_ids: Vec<String>,
        /// Must be the next free position for the scope
        draw_position: u32,
        is_rehearsal: bool,
        /// 32 bytes from a CSPRNG, hex-encoded
        entropy_hex: String,
    },
    /// Clear the rehearsal winner store. Admin only.
    ResetRehearsal {},
    /// Update configuration. Admin only.
    UpdateConfig {
        operator: Option<String>,
        max_winners: Option<u32>,
        dedup_policy: Option<DedupPolicy>,
        registration_deadline: Option<Timestamp>,
    },
}

#[cw_serde]
pub struct MigrateMsg {}

pub struct RegisterParams {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub selected_products: Vec<String>,
    pub referred_by_code: Option<String>,
}

pub struct DrawWinnerParams {
    pub exclude_entry_ids: Vec<String>,
    pub draw_position: u32,
    pub is_rehearsal: bool,
    pub entropy_hex: String,
}

pub struct UpdateConfigParams {
    pub operator: Option<String>,
    pub max_winners: Option<u32>,
    pub dedup_policy: Option<DedupPolicy>,
    pub registration_deadline: Option<Timestamp>,
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(Config)]
    Config {},
    #[returns(Participant)]
    Participant { entry_id: String },
    #[returns(Participant)]
    ParticipantByReferralCode { referral_code: String },
    #[returns(ParticipantsResponse)]
    Participants {
        start_after: Option<String>,
        limit: Option<u32>,
    },
    #[returns(LeaderboardResponse)]
    Leaderboard { limit: Option<u32> },
    #[returns(BadgesResponse)]
    Badges { entry_id: String },
    #[returns(Option<MilestoneMessage>)]
    Milestone { referral_count: u64 },
    #[returns(WinnersResponse)]
    Winners { is_rehearsal: bool },
    #[returns(DrawStateResponse)]
    DrawState {},
}

#[cw_serde]
pub struct ParticipantsResponse {
    pub participants: Vec<Participant>,
}

#[cw_serde]
pub struct LeaderboardResponse {
    pub entries: Vec<LeaderboardEntry>,
    pub total_participants: u64,
}

#[cw_serde]
pub struct BadgesResponse {
    pub entry_id: String,
    pub referral_count: u64,
    pub badges: Vec<Badge>,
    pub highest: Option<Badge>,
    pub next: Option<NextBadge>,
}

#[cw_serde]
pub struct WinnersResponse {
    pub is_rehearsal: bool,
    pub winners: Vec<Winner>,
}

#[cw_serde]
pub struct DrawStateResponse {
    pub max_winners: u32,
    pub real_winners_drawn: u32,
    pub rehearsal_winners_drawn: u32,
    /// Real draws still allowed before the campaign is full
    pub remaining_slots: u32,
    pub next_draw_position: u32,
    pub next_rehearsal_position: u32,
    pub draw_nonce: u64,
    pub last_draw_at: Option<Timestamp>,
    pub total_participants: u64,
}
