use cosmwasm_std::{to_json_binary, Binary, Deps, Env, Order, StdError, StdResult};
use cw_storage_plus::Bound;
use giveaway_common::badges::{calculate_earned_badges, get_highest_badge, get_next_badge};
use giveaway_common::ids::normalize_referral_code;
use giveaway_common::leaderboard::rank;
use giveaway_common::milestones::get_milestone_message;
use giveaway_common::types::{Participant, Winner};

use crate::msg::{
    BadgesResponse, DrawStateResponse, LeaderboardResponse, ParticipantsResponse, WinnersResponse,
};
use crate::state::{
    winners_store, CONFIG, DRAW_STATE, LEDGER_STATE, PARTICIPANTS, REFERRAL_CODES,
};

fn load_participant(deps: Deps, entry_id: &str) -> StdResult<Participant> {
    PARTICIPANTS
        .may_load(deps.storage, entry_id)?
        .ok_or_else(|| StdError::not_found(format!("participant {entry_id}")))
}

pub fn query_config(deps: Deps) -> StdResult<Binary> {
    let config = CONFIG.load(deps.storage)?;
    to_json_binary(&config)
}

pub fn query_participant(deps: Deps, entry_id: String) -> StdResult<Binary> {
    to_json_binary(&load_participant(deps, &entry_id)?)
}

pub fn query_participant_by_referral_code(deps: Deps, referral_code: String) -> StdResult<Binary> {
    let code = normalize_referral_code(&referral_code);
    let entry_id = REFERRAL_CODES
        .may_load(deps.storage, &code)?
        .ok_or_else(|| StdError::not_found(format!("referral code {code}")))?;
    to_json_binary(&load_participant(deps, &entry_id)?)
}

pub fn query_participants(
    deps: Deps,
    start_after: Option<String>,
    limit: Option<u32>,
) -> StdResult<Binary> {
    let limit = limit.unwrap_or(30).min(100) as usize;
    let start = start_after.as_deref().map(Bound::exclusive);

    let participants = PARTICIPANTS
        .range(deps.storage, start, None, Order::Ascending)
        .take(limit)
        .map(|item| item.map(|(_, p)| p))
        .collect::<StdResult<Vec<_>>>()?;

    to_json_binary(&ParticipantsResponse { participants })
}

/// Ranked over the full ledger, then truncated.
pub fn query_leaderboard(deps: Deps, limit: Option<u32>) -> StdResult<Binary> {
    let limit = limit.unwrap_or(10).min(100) as usize;

    let participants = PARTICIPANTS
        .range(deps.storage, None, None, Order::Ascending)
        .map(|item| item.map(|(_, p)| p))
        .collect::<StdResult<Vec<_>>>()?;
    let total_participants = participants.len() as u64;

    let mut entries = rank(participants);
    entries.truncate(limit);

    to_json_binary(&LeaderboardResponse {
        entries,
        total_participants,
    })
}

pub fn query_badges(deps: Deps, env: Env, entry_id: String) -> StdResult<Binary> {
    let participant = load_participant(deps, &entry_id)?;

    // Tiers already in the ledger keep their stored earned_at
    let badges = calculate_earned_badges(
        participant.referral_count,
        &participant.badges,
        env.block.time,
    );
    let highest = get_highest_badge(&badges);
    let next = get_next_badge(participant.referral_count);

    to_json_binary(&BadgesResponse {
        entry_id,
        referral_count: participant.referral_count,
        badges,
        highest,
        next,
    })
}

pub fn query_milestone(referral_count: u64) -> StdResult<Binary> {
    to_json_binary(&get_milestone_message(referral_count))
}

pub fn query_winners(deps: Deps, is_rehearsal: bool) -> StdResult<Binary> {
    let winners: Vec<Winner> = winners_store(is_rehearsal)
        .range(deps.storage, None, None, Order::Ascending)
        .map(|item| item.map(|(_, w)| w))
        .collect::<StdResult<_>>()?;

    to_json_binary(&WinnersResponse {
        is_rehearsal,
        winners,
    })
}

pub fn query_draw_state(deps: Deps) -> StdResult<Binary> {
    let config = CONFIG.load(deps.storage)?;
    let state = DRAW_STATE.load(deps.storage)?;
    let ledger = LEDGER_STATE.load(deps.storage)?;

    to_json_binary(&DrawStateResponse {
        max_winners: config.max_winners,
        real_winners_drawn: state.real_winners_drawn,
        rehearsal_winners_drawn: state.rehearsal_winners_drawn,
        remaining_slots: config.max_winners.saturating_sub(state.real_winners_drawn),
        next_draw_position: state.real_winners_drawn + 1,
        next_rehearsal_position: state.rehearsal_winners_drawn + 1,
        draw_nonce: state.draw_nonce,
        last_draw_at: state.last_draw_at,
        total_participants: ledger.total_participants,
    })
}
