use std::cmp::Ordering;

use cosmwasm_schema::cw_serde;

use crate::types::Participant;

/// Public leaderboard row. Contact details are never part of it.
#[cw_serde]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub entry_id: String,
    pub name: String,
    pub referral_count: u64,
    pub bonus_entries: u64,
    pub total_entries: u64,
}

/// Total order used for ranking: most referrals first, then earliest
/// registration. `sequence` and `entry_id` settle registrations that share a
/// block timestamp.
pub fn compare_standing(a: &Participant, b: &Participant) -> Ordering {
    b.referral_count
        .cmp(&a.referral_count)
        .then_with(|| a.submitted_at.cmp(&b.submitted_at))
        .then_with(|| a.sequence.cmp(&b.sequence))
        .then_with(|| a.entry_id.cmp(&b.entry_id))
}

/// Rank participants 1..N. Ranks are strictly ordinal, ties never share a rank.
pub fn rank(mut participants: Vec<Participant>) -> Vec<LeaderboardEntry> {
    participants.sort_by(compare_standing);
    participants
        .into_iter()
        .enumerate()
        .map(|(index, p)| LeaderboardEntry {
            rank: index as u32 + 1,
            entry_id: p.entry_id,
            name: p.name,
            referral_count: p.referral_count,
            bonus_entries: p.bonus_entries,
            total_entries: p.total_entries,
        })
        .collect()
}
