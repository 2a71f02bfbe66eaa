use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Timestamp};
use cw_storage_plus::{Item, Map};
use giveaway_common::types::{DedupPolicy, Participant, Winner};

pub const CONFIG: Item<Config> = Item::new("config");
pub const LEDGER_STATE: Item<LedgerState> = Item::new("ledger_state");
pub const DRAW_STATE: Item<DrawStateInfo> = Item::new("draw_state");

/// entry_id -> participant
pub const PARTICIPANTS: Map<&str, Participant> = Map::new("participants");
/// referral_code -> entry_id
pub const REFERRAL_CODES: Map<&str, String> = Map::new("referral_codes");
/// Normalized email -> entry_id. Maintained under every dedup policy so the
/// policy can be tightened later.
pub const EMAIL_INDEX: Map<&str, String> = Map::new("email_index");
/// Normalized phone -> entry_id
pub const PHONE_INDEX: Map<&str, String> = Map::new("phone_index");

/// Real winners by draw position
pub const WINNERS: Map<u32, Winner> = Map::new("winners");
/// entry_id -> draw position, for real winners only
pub const WINNER_ENTRIES: Map<&str, u32> = Map::new("winner_entries");
/// Rehearsal winners by draw position. Never read by real draws.
pub const REHEARSAL_WINNERS: Map<u32, Winner> = Map::new("rehearsal_winners");

#[cw_serde]
pub struct Config {
    pub admin: Addr,
    /// Website backend relaying registrations and referrals
    pub operator: Addr,
    pub max_winners: u32,
    pub dedup_policy: DedupPolicy,
    pub registration_deadline: Option<Timestamp>,
}

#[cw_serde]
pub struct LedgerState {
    pub next_sequence: u64,
    pub total_participants: u64,
    pub total_referrals: u64,
}

#[cw_serde]
pub struct DrawStateInfo {
    pub real_winners_drawn: u32,
    pub rehearsal_winners_drawn: u32,
    /// Every committed draw, real or rehearsal, bumps the nonce
    pub draw_nonce: u64,
    pub last_draw_at: Option<Timestamp>,
}

impl DrawStateInfo {
    pub fn drawn(&self, is_rehearsal: bool) -> u32 {
        if is_rehearsal {
            self.rehearsal_winners_drawn
        } else {
            self.real_winners_drawn
        }
    }
}

/// Winner store for a draw scope.
pub fn winners_store(is_rehearsal: bool) -> Map<u32, Winner> {
    if is_rehearsal {
        REHEARSAL_WINNERS
    } else {
        WINNERS
    }
}
