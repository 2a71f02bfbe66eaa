use cosmwasm_std::Timestamp;
use sha2::{Digest, Sha256};

pub const ENTRY_ID_PREFIX: &str = "GW-";
pub const REFERRAL_CODE_PREFIX: &str = "ref-";

/// Hex characters of hash taken for an entry id.
const ENTRY_ID_HEX_LEN: usize = 10;

/// Inputs an entry id is derived from.
pub struct EntrySeed<'a> {
    pub email: &'a str,
    pub block_height: u64,
    pub block_time: Timestamp,
    pub sequence: u64,
}

/// `GW-` + first 10 hex chars (uppercase) of
/// `sha256( 0x02 || email || 0x00 || height || time || sequence || attempt )`.
///
/// Callers bump `attempt` until the id is free.
pub fn generate_entry_id(seed: &EntrySeed, attempt: u32) -> String {
    let mut hasher = Sha256::new();
    hasher.update([0x02]);
    hasher.update(seed.email.as_bytes());
    hasher.update([0x00]);
    hasher.update(seed.block_height.to_be_bytes());
    hasher.update(seed.block_time.nanos().to_be_bytes());
    hasher.update(seed.sequence.to_be_bytes());
    hasher.update(attempt.to_be_bytes());
    let digest: [u8; 32] = hasher.finalize().into();

    let mut id = hex::encode_upper(digest);
    id.truncate(ENTRY_ID_HEX_LEN);
    format!("{ENTRY_ID_PREFIX}{id}")
}

/// Referral code for an entry id. Distinct ids always map to distinct codes.
pub fn referral_code_for(entry_id: &str) -> String {
    let body = entry_id.strip_prefix(ENTRY_ID_PREFIX).unwrap_or(entry_id);
    format!("{REFERRAL_CODE_PREFIX}{}", body.to_ascii_lowercase())
}

/// Canonical form of a referral code typed or pasted by a user.
pub fn normalize_referral_code(code: &str) -> String {
    code.trim().to_ascii_lowercase()
}
