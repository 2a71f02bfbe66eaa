use cosmwasm_std::{
    to_json_binary, Addr, DepsMut, Env, Event, MessageInfo, Order, Response, StdResult, Storage,
    Timestamp,
};
use giveaway_common::ids::{
    generate_entry_id, normalize_referral_code, referral_code_for, EntrySeed,
};
use giveaway_common::badges::calculate_earned_badges;
use giveaway_common::milestones::get_milestone_message;
use giveaway_common::types::{DedupPolicy, Participant, BASE_ENTRIES};

use crate::error::ContractError;
use crate::msg::{RegisterParams, UpdateConfigParams};
use crate::state::{
    Config, CONFIG, DRAW_STATE, EMAIL_INDEX, LEDGER_STATE, PARTICIPANTS, PHONE_INDEX,
    REFERRAL_CODES, REHEARSAL_WINNERS,
};
use crate::validation::validate_registration;

/// Attempts at finding a free entry id before giving up.
pub const MAX_ID_ATTEMPTS: u32 = 8;

/// Upper bound for `max_winners`.
pub const MAX_WINNERS_LIMIT: u32 = 100;

pub fn validate_max_winners(value: u32, already_drawn: u32) -> Result<(), ContractError> {
    if value == 0 || value > MAX_WINNERS_LIMIT {
        return Err(ContractError::InvalidMaxWinners {
            value,
            reason: format!("must be between 1 and {MAX_WINNERS_LIMIT}"),
        });
    }
    if value < already_drawn {
        return Err(ContractError::InvalidMaxWinners {
            value,
            reason: format!("{already_drawn} winners already drawn"),
        });
    }
    Ok(())
}

fn ensure_relayer(config: &Config, sender: &Addr, action: &str) -> Result<(), ContractError> {
    if *sender != config.operator && *sender != config.admin {
        return Err(ContractError::Unauthorized {
            reason: format!("only operator or admin can {action}"),
        });
    }
    Ok(())
}

/// Credit one referral to `entry_id` and persist it in the same write.
fn credit_referral(
    storage: &mut dyn Storage,
    entry_id: &str,
    now: Timestamp,
) -> Result<Participant, ContractError> {
    let mut referrer = PARTICIPANTS
        .may_load(storage, entry_id)?
        .ok_or_else(|| ContractError::ParticipantNotFound {
            entry_id: entry_id.to_string(),
        })?;
    referrer.apply_referral(now)?;
    PARTICIPANTS.save(storage, entry_id, &referrer)?;
    Ok(referrer)
}

/// First free entry id for this registration.
fn allocate_entry_id(storage: &dyn Storage, seed: &EntrySeed) -> Result<String, ContractError> {
    for attempt in 0..MAX_ID_ATTEMPTS {
        let entry_id = generate_entry_id(seed, attempt);
        if !PARTICIPANTS.has(storage, &entry_id)
            && !REFERRAL_CODES.has(storage, &referral_code_for(&entry_id))
        {
            return Ok(entry_id);
        }
    }
    Err(ContractError::EntryIdExhausted {
        attempts: MAX_ID_ATTEMPTS,
    })
}

fn referral_event(referrer: &Participant) -> Event {
    let mut event = Event::new("giveaway_referral")
        .add_attribute("entry_id", referrer.entry_id.clone())
        .add_attribute("referral_count", referrer.referral_count.to_string())
        .add_attribute("bonus_entries", referrer.bonus_entries.to_string())
        .add_attribute("total_entries", referrer.total_entries.to_string());
    if let Some(milestone) = get_milestone_message(referrer.referral_count) {
        event = event.add_attribute("milestone", milestone.referral_count.to_string());
    }
    event
}

/// Register a participant with one base entry.
///
/// A referral code that resolves is credited to its owner in the same
/// transaction. An unknown code is ignored so the signup itself still goes
/// through.
pub fn register_participant(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    params: RegisterParams,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    ensure_relayer(&config, &info.sender, "register participants")?;

    if let Some(deadline) = config.registration_deadline {
        if env.block.time > deadline {
            return Err(ContractError::RegistrationClosed {
                deadline: deadline.seconds(),
            });
        }
    }

    let valid = validate_registration(&params)?;

    match config.dedup_policy {
        DedupPolicy::Email => {
            if EMAIL_INDEX.has(deps.storage, &valid.email) {
                return Err(ContractError::DuplicateEntry {
                    field: "email".to_string(),
                });
            }
        }
        DedupPolicy::EmailOrPhone => {
            if EMAIL_INDEX.has(deps.storage, &valid.email) {
                return Err(ContractError::DuplicateEntry {
                    field: "email".to_string(),
                });
            }
            if let Some(key) = &valid.phone_key {
                if PHONE_INDEX.has(deps.storage, key) {
                    return Err(ContractError::DuplicateEntry {
                        field: "phone".to_string(),
                    });
                }
            }
        }
        DedupPolicy::Disabled => {}
    }

    let mut ledger = LEDGER_STATE.load(deps.storage)?;
    let sequence = ledger.next_sequence;

    let seed = EntrySeed {
        email: &valid.email,
        block_height: env.block.height,
        block_time: env.block.time,
        sequence,
    };
    let entry_id = allocate_entry_id(deps.storage, &seed)?;
    let referral_code = referral_code_for(&entry_id);

    // Resolve and credit the referrer before the new row exists
    let mut referred_by = None;
    let mut referrer = None;
    if let Some(code) = params.referred_by_code.as_deref() {
        let code = normalize_referral_code(code);
        if !code.is_empty() {
            if let Some(referrer_id) = REFERRAL_CODES.may_load(deps.storage, &code)? {
                referrer = Some(credit_referral(deps.storage, &referrer_id, env.block.time)?);
                referred_by = Some(code);
            }
        }
    }

    let participant = Participant {
        entry_id: entry_id.clone(),
        name: valid.name,
        email: valid.email.clone(),
        phone: valid.phone,
        selected_products: valid.selected_products,
        referral_code: referral_code.clone(),
        referred_by: referred_by.clone(),
        referral_count: 0,
        base_entries: BASE_ENTRIES,
        bonus_entries: 0,
        total_entries: BASE_ENTRIES,
        submitted_at: env.block.time,
        sequence,
        badges: calculate_earned_badges(0, &[], env.block.time),
    };

    PARTICIPANTS.save(deps.storage, &entry_id, &participant)?;
    REFERRAL_CODES.save(deps.storage, &referral_code, &entry_id)?;
    EMAIL_INDEX.save(deps.storage, &valid.email, &entry_id)?;
    if let Some(key) = &valid.phone_key {
        PHONE_INDEX.save(deps.storage, key, &entry_id)?;
    }

    ledger.next_sequence += 1;
    ledger.total_participants += 1;
    if referrer.is_some() {
        ledger.total_referrals += 1;
    }
    LEDGER_STATE.save(deps.storage, &ledger)?;

    let referral_status = match (&params.referred_by_code, &referrer) {
        (_, Some(_)) => "credited",
        (Some(code), None) if !code.trim().is_empty() => "ignored",
        _ => "none",
    };

    let mut response = Response::new()
        .set_data(to_json_binary(&participant)?)
        .add_attribute("action", "register")
        .add_attribute("entry_id", entry_id.clone())
        .add_attribute("referral_status", referral_status)
        .add_event(
            Event::new("giveaway_registered")
                .add_attribute("entry_id", entry_id)
                .add_attribute("referral_code", referral_code)
                .add_attribute("referred_by", referred_by.unwrap_or_default())
                .add_attribute("sequence", sequence.to_string())
                .add_attribute("timestamp", env.block.time.seconds().to_string()),
        );
    if let Some(referrer) = referrer {
        response = response.add_event(referral_event(&referrer));
    }

    Ok(response)
}

/// Credit one referral to the owner of `referral_code`.
pub fn record_referral(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    referral_code: String,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    ensure_relayer(&config, &info.sender, "record referrals")?;

    let code = normalize_referral_code(&referral_code);
    let referrer_id = REFERRAL_CODES
        .may_load(deps.storage, &code)?
        .ok_or(ContractError::ReferralCodeNotFound {
            referral_code: code.clone(),
        })?;

    let referrer = credit_referral(deps.storage, &referrer_id, env.block.time)?;

    let mut ledger = LEDGER_STATE.load(deps.storage)?;
    ledger.total_referrals += 1;
    LEDGER_STATE.save(deps.storage, &ledger)?;

    Ok(Response::new()
        .set_data(to_json_binary(&referrer)?)
        .add_attribute("action", "record_referral")
        .add_attribute("entry_id", referrer.entry_id.clone())
        .add_attribute("referral_count", referrer.referral_count.to_string())
        .add_event(referral_event(&referrer)))
}

/// Clear rehearsal winners. Real winners and the ledger are untouched.
pub fn reset_rehearsal(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if info.sender != config.admin {
        return Err(ContractError::Unauthorized {
            reason: "only admin can reset rehearsals".to_string(),
        });
    }

    let positions: Vec<u32> = REHEARSAL_WINNERS
        .keys(deps.storage, None, None, Order::Ascending)
        .collect::<StdResult<_>>()?;
    for position in &positions {
        REHEARSAL_WINNERS.remove(deps.storage, *position);
    }

    let mut state = DRAW_STATE.load(deps.storage)?;
    state.rehearsal_winners_drawn = 0;
    DRAW_STATE.save(deps.storage, &state)?;

    Ok(Response::new()
        .add_attribute("action", "reset_rehearsal")
        .add_event(
            Event::new("giveaway_rehearsal_reset")
                .add_attribute("cleared", positions.len().to_string()),
        ))
}

/// Update configuration. Admin only.
pub fn update_config(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    params: UpdateConfigParams,
) -> Result<Response, ContractError> {
    let UpdateConfigParams {
        operator,
        max_winners,
        dedup_policy,
        registration_deadline,
    } = params;

    let mut config = CONFIG.load(deps.storage)?;

    if info.sender != config.admin {
        return Err(ContractError::Unauthorized {
            reason: "only admin can update config".to_string(),
        });
    }

    if let Some(op) = operator {
        config.operator = deps.api.addr_validate(&op)?;
    }
    if let Some(max) = max_winners {
        let state = DRAW_STATE.load(deps.storage)?;
        validate_max_winners(max, state.real_winners_drawn)?;
        config.max_winners = max;
    }
    if let Some(policy) = dedup_policy {
        config.dedup_policy = policy;
    }
    if let Some(deadline) = registration_deadline {
        config.registration_deadline = Some(deadline);
    }

    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("action", "update_config")
        .add_event(
            Event::new("giveaway_config_updated")
                .add_attribute("operator", config.operator.to_string())
                .add_attribute("max_winners", config.max_winners.to_string()),
        ))
}
