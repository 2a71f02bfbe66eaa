use cosmwasm_schema::cw_serde;

pub struct Milestone {
    pub referral_count: u64,
    pub title: &'static str,
    pub message: &'static str,
}

pub const MILESTONES: [Milestone; 5] = [
    Milestone {
        referral_count: 1,
        title: "First referral!",
        message: "Your first friend joined. That's 3 extra chances to win.",
    },
    Milestone {
        referral_count: 5,
        title: "High five!",
        message: "Five friends joined through your link. You're on a roll.",
    },
    Milestone {
        referral_count: 10,
        title: "Double digits!",
        message: "Ten referrals and 30 bonus entries. Keep sharing!",
    },
    Milestone {
        referral_count: 25,
        title: "Quarter century!",
        message: "25 referrals. You're one of our top ambassadors.",
    },
    Milestone {
        referral_count: 50,
        title: "Legendary!",
        message: "50 referrals. Your odds have never looked better.",
    },
];

#[cw_serde]
pub struct MilestoneMessage {
    pub referral_count: u64,
    pub title: String,
    pub message: String,
}

/// Message for a referral count that lands exactly on a milestone.
///
/// Pure and idempotent; showing a milestone only once is up to the caller.
pub fn get_milestone_message(referral_count: u64) -> Option<MilestoneMessage> {
    MILESTONES
        .iter()
        .find(|m| m.referral_count == referral_count)
        .map(|m| MilestoneMessage {
            referral_count: m.referral_count,
            title: m.title.to_string(),
            message: m.message.to_string(),
        })
}
