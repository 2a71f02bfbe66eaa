use std::collections::BTreeSet;

use cosmwasm_std::{
    to_json_binary, DepsMut, Env, Event, MessageInfo, Order, Response, StdError, StdResult,
    Uint128,
};
use giveaway_common::draw::{
    build_ticket_ranges, mix_randomness, select_by_ticket, winning_ticket, DrawContext,
    ENTROPY_LEN,
};
use giveaway_common::types::{DrawResult, DrawStatistics, Participant, Winner};

use crate::error::ContractError;
use crate::msg::DrawWinnerParams;
use crate::state::{winners_store, CONFIG, DRAW_STATE, PARTICIPANTS, WINNER_ENTRIES};

/// Draw one winner, weighted by entries. Admin only.
///
/// The whole draw runs inside one execute, so reading the eligible pool and
/// writing the winner are atomic with respect to every other draw:
/// 1. Check the requested position is the next free one for the scope
/// 2. Pool = participants minus `exclude_entry_ids` minus winners already in the scope
///    (`WINNER_ENTRIES` for real draws)
/// 3. Lay the pool out as ticket ranges ordered by entry id
/// 4. final = sha256(entropy) XOR sha256(block context)
/// 5. winning_ticket = uint128(final[0..16]) % total_weight
/// 6. Persist the winner to the real or rehearsal store
pub fn draw_winner(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    params: DrawWinnerParams,
) -> Result<Response, ContractError> {
    let DrawWinnerParams {
        exclude_entry_ids,
        draw_position,
        is_rehearsal,
        entropy_hex,
    } = params;

    let config = CONFIG.load(deps.storage)?;
    if info.sender != config.admin {
        return Err(ContractError::Unauthorized {
            reason: "only admin can draw winners".to_string(),
        });
    }

    if draw_position == 0 {
        return Err(ContractError::InvalidDrawPosition);
    }

    let entropy = hex::decode(entropy_hex.trim()).map_err(|_| ContractError::InvalidHex {
        field: "entropy_hex".to_string(),
    })?;
    if entropy.len() != ENTROPY_LEN {
        return Err(ContractError::InvalidEntropyLength { got: entropy.len() });
    }

    let mut state = DRAW_STATE.load(deps.storage)?;
    let drawn = state.drawn(is_rehearsal);
    if drawn >= config.max_winners {
        return Err(ContractError::NoEligibleParticipants { draw_position });
    }

    // A stale position means another draw committed since the caller looked
    let expected = drawn + 1;
    if draw_position != expected {
        return Err(ContractError::DrawConflict {
            expected,
            requested: draw_position,
        });
    }

    let store = winners_store(is_rehearsal);
    let mut excluded: BTreeSet<String> = exclude_entry_ids
        .iter()
        .map(|id| id.trim().to_string())
        .collect();
    if is_rehearsal {
        for winner in store.range(deps.storage, None, None, Order::Ascending) {
            let (_, winner) = winner?;
            excluded.insert(winner.entry_id);
        }
    } else {
        for entry_id in WINNER_ENTRIES.keys(deps.storage, None, None, Order::Ascending) {
            excluded.insert(entry_id?);
        }
    }

    let participants: Vec<Participant> = PARTICIPANTS
        .range(deps.storage, None, None, Order::Ascending)
        .map(|item| item.map(|(_, p)| p))
        .collect::<StdResult<_>>()?;
    let pool = participants
        .iter()
        .filter(|p| !excluded.contains(&p.entry_id))
        .map(|p| (p.entry_id.as_str(), p.total_entries));

    let (ranges, total_weight) = build_ticket_ranges(pool);
    if ranges.is_empty() {
        return Err(ContractError::NoEligibleParticipants { draw_position });
    }
    let pool_size = ranges.len() as u32;

    let context = DrawContext {
        chain_id: &env.block.chain_id,
        block_height: env.block.height,
        block_time_nanos: env.block.time.nanos(),
        draw_nonce: state.draw_nonce,
        draw_position,
        is_rehearsal,
    };
    let final_randomness = mix_randomness(&entropy, &context);
    let ticket = winning_ticket(&final_randomness, total_weight)
        .ok_or(ContractError::NoEligibleParticipants { draw_position })?;
    let selected = select_by_ticket(&ranges, ticket)
        .ok_or_else(|| StdError::generic_err(format!("ticket {ticket} outside ticket ranges")))?;

    if !is_rehearsal && WINNER_ENTRIES.has(deps.storage, &selected.entry_id) {
        return Err(ContractError::AlreadyWon {
            entry_id: selected.entry_id.clone(),
        });
    }

    let winner = Winner {
        entry_id: selected.entry_id.clone(),
        draw_position,
        drawn_at: env.block.time,
        is_rehearsal,
        winning_ticket: Uint128::new(ticket),
        total_weight: Uint128::new(total_weight),
        pool_size,
        entropy: hex::encode(&entropy),
        final_randomness: hex::encode(final_randomness),
    };

    store.save(deps.storage, draw_position, &winner)?;
    if is_rehearsal {
        state.rehearsal_winners_drawn += 1;
    } else {
        WINNER_ENTRIES.save(deps.storage, &winner.entry_id, &draw_position)?;
        state.real_winners_drawn += 1;
    }
    state.draw_nonce += 1;
    state.last_draw_at = Some(env.block.time);
    DRAW_STATE.save(deps.storage, &state)?;

    let statistics = DrawStatistics {
        pool_size,
        remaining_participants: pool_size - 1,
        total_weight: Uint128::new(total_weight),
    };

    Ok(Response::new()
        .set_data(to_json_binary(&DrawResult {
            winner: winner.clone(),
            statistics,
        })?)
        .add_attribute("action", "draw_winner")
        .add_attribute("draw_position", draw_position.to_string())
        .add_attribute("winner", winner.entry_id.clone())
        .add_attribute("is_rehearsal", is_rehearsal.to_string())
        .add_event(
            Event::new("giveaway_winner_drawn")
                .add_attribute("entry_id", winner.entry_id)
                .add_attribute("draw_position", draw_position.to_string())
                .add_attribute("is_rehearsal", is_rehearsal.to_string())
                .add_attribute("winning_ticket", ticket.to_string())
                .add_attribute("total_weight", total_weight.to_string())
                .add_attribute("pool_size", pool_size.to_string())
                .add_attribute("entropy", winner.entropy)
                .add_attribute("final_randomness", winner.final_randomness)
                .add_attribute("draw_nonce", context.draw_nonce.to_string())
                .add_attribute("timestamp", env.block.time.seconds().to_string()),
        ))
}
