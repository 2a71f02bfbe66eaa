use cosmwasm_schema::cw_serde;
use cosmwasm_std::Uint128;
use sha2::{Digest, Sha256};

/// Required length of the admin-supplied entropy, in bytes.
pub const ENTROPY_LEN: usize = 32;

const DRAW_DOMAIN: &[u8] = b"giveaway-draw-v1";

/// A participant's slice of the ticket space: tickets in
/// `[cumulative_start, cumulative_end)` belong to `entry_id`.
#[cw_serde]
pub struct TicketRange {
    pub entry_id: String,
    pub weight: u64,
    pub cumulative_start: Uint128,
    pub cumulative_end: Uint128,
}

/// Block context mixed into every draw so the admin's entropy alone never
/// decides the outcome.
pub struct DrawContext<'a> {
    pub chain_id: &'a str,
    pub block_height: u64,
    pub block_time_nanos: u64,
    pub draw_nonce: u64,
    pub draw_position: u32,
    pub is_rehearsal: bool,
}

impl DrawContext<'_> {
    /// `sha256( domain || chain_id || 0x00 || height || time || nonce || position || rehearsal )`
    pub fn hash(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(DRAW_DOMAIN);
        hasher.update(self.chain_id.as_bytes());
        hasher.update([0x00]);
        hasher.update(self.block_height.to_be_bytes());
        hasher.update(self.block_time_nanos.to_be_bytes());
        hasher.update(self.draw_nonce.to_be_bytes());
        hasher.update(self.draw_position.to_be_bytes());
        hasher.update([self.is_rehearsal as u8]);
        hasher.finalize().into()
    }
}

/// final = sha256(entropy) XOR context hash
pub fn mix_randomness(entropy: &[u8], context: &DrawContext) -> [u8; 32] {
    let entropy_hash: [u8; 32] = Sha256::digest(entropy).into();
    let context_hash = context.hash();

    let mut final_randomness = [0u8; 32];
    for i in 0..32 {
        final_randomness[i] = entropy_hash[i] ^ context_hash[i];
    }
    final_randomness
}

/// winning_ticket = uint128(final[0..16]) % total_weight
///
/// Returns `None` for an empty ticket space.
pub fn winning_ticket(final_randomness: &[u8; 32], total_weight: u128) -> Option<u128> {
    if total_weight == 0 {
        return None;
    }
    let mut ticket_bytes = [0u8; 16];
    ticket_bytes.copy_from_slice(&final_randomness[0..16]);
    Some(u128::from_be_bytes(ticket_bytes) % total_weight)
}

/// Lay out the pool as consecutive ticket ranges ordered by entry id.
/// Zero-weight entries hold no tickets and are dropped.
///
/// Returns the ranges and the total weight.
pub fn build_ticket_ranges<I, S>(pool: I) -> (Vec<TicketRange>, u128)
where
    I: IntoIterator<Item = (S, u64)>,
    S: Into<String>,
{
    let mut entries: Vec<(String, u64)> = pool
        .into_iter()
        .map(|(id, weight)| (id.into(), weight))
        .filter(|(_, weight)| *weight > 0)
        .collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    let mut cumulative: u128 = 0;
    let ranges = entries
        .into_iter()
        .map(|(entry_id, weight)| {
            let start = cumulative;
            cumulative += weight as u128;
            TicketRange {
                entry_id,
                weight,
                cumulative_start: Uint128::new(start),
                cumulative_end: Uint128::new(cumulative),
            }
        })
        .collect();

    (ranges, cumulative)
}

/// First range whose cumulative end exceeds `ticket`.
pub fn select_by_ticket(ranges: &[TicketRange], ticket: u128) -> Option<&TicketRange> {
    let index = ranges.partition_point(|r| r.cumulative_end.u128() <= ticket);
    ranges
        .get(index)
        .filter(|r| r.cumulative_start.u128() <= ticket)
}
