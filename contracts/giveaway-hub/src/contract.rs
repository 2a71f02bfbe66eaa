use cosmwasm_std::{entry_point, Binary, Deps, DepsMut, Env, MessageInfo, Response, StdResult};
use cw2::{get_contract_version, set_contract_version};
use giveaway_common::types::DEFAULT_MAX_WINNERS;

use crate::draw;
use crate::error::ContractError;
use crate::execute;
use crate::msg::{
    DrawWinnerParams, ExecuteMsg, InstantiateMsg, MigrateMsg, QueryMsg, RegisterParams,
    UpdateConfigParams,
};
use crate::query;
use crate::state::{Config, DrawStateInfo, LedgerState, CONFIG, DRAW_STATE, LEDGER_STATE};

const CONTRACT_NAME: &str = "crates.io:giveaway-hub";
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[entry_point]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    let max_winners = msg.max_winners.unwrap_or(DEFAULT_MAX_WINNERS);
    execute::validate_max_winners(max_winners, 0)?;

    let config = Config {
        admin: info.sender.clone(),
        operator: deps.api.addr_validate(&msg.operator)?,
        max_winners,
        dedup_policy: msg.dedup_policy.unwrap_or_default(),
        registration_deadline: msg.registration_deadline,
    };
    CONFIG.save(deps.storage, &config)?;

    LEDGER_STATE.save(
        deps.storage,
        &LedgerState {
            next_sequence: 0,
            total_participants: 0,
            total_referrals: 0,
        },
    )?;
    DRAW_STATE.save(
        deps.storage,
        &DrawStateInfo {
            real_winners_drawn: 0,
            rehearsal_winners_drawn: 0,
            draw_nonce: 0,
            last_draw_at: None,
        },
    )?;

    Ok(Response::new()
        .add_attribute("action", "instantiate")
        .add_attribute("contract", "giveaway-hub")
        .add_attribute("admin", info.sender.to_string())
        .add_attribute("max_winners", max_winners.to_string()))
}

#[entry_point]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::Register {
            name,
            email,
            phone,
            selected_products,
            referred_by_code,
        } => execute::register_participant(
            deps,
            env,
            info,
            RegisterParams {
                name,
                email,
                phone,
                selected_products,
                referred_by_code,
            },
        ),
        ExecuteMsg::RecordReferral { referral_code } => {
            execute::record_referral(deps, env, info, referral_code)
        }
        ExecuteMsg::DrawWinner {
            exclude_entry_ids,
            draw_position,
            is_rehearsal,
            entropy_hex,
        } => draw::draw_winner(
            deps,
            env,
            info,
            DrawWinnerParams {
                exclude_entry_ids,
                draw_position,
                is_rehearsal,
                entropy_hex,
            },
        ),
        ExecuteMsg::ResetRehearsal {} => execute::reset_rehearsal(deps, env, info),
        ExecuteMsg::UpdateConfig {
            operator,
            max_winners,
            dedup_policy,
            registration_deadline,
        } => execute::update_config(
            deps,
            env,
            info,
            UpdateConfigParams {
                operator,
                max_winners,
                dedup_policy,
                registration_deadline,
            },
        ),
    }
}

#[entry_point]
pub fn query(deps: Deps, env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Config {} => query::query_config(deps),
        QueryMsg::Participant { entry_id } => query::query_participant(deps, entry_id),
        QueryMsg::ParticipantByReferralCode { referral_code } => {
            query::query_participant_by_referral_code(deps, referral_code)
        }
        QueryMsg::Participants { start_after, limit } => {
            query::query_participants(deps, start_after, limit)
        }
        QueryMsg::Leaderboard { limit } => query::query_leaderboard(deps, limit),
        QueryMsg::Badges { entry_id } => query::query_badges(deps, env, entry_id),
        QueryMsg::Milestone { referral_count } => query::query_milestone(referral_count),
        QueryMsg::Winners { is_rehearsal } => query::query_winners(deps, is_rehearsal),
        QueryMsg::DrawState {} => query::query_draw_state(deps),
    }
}

#[entry_point]
pub fn migrate(deps: DepsMut, _env: Env, _msg: MigrateMsg) -> Result<Response, ContractError> {
    let stored = get_contract_version(deps.storage)?;
    if stored.contract != CONTRACT_NAME {
        return Err(ContractError::Unauthorized {
            reason: "Cannot migrate from different contract type".to_string(),
        });
    }

    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    Ok(Response::new()
        .add_attribute("action", "migrate")
        .add_attribute("from_version", stored.version)
        .add_attribute("to_version", CONTRACT_VERSION))
}
