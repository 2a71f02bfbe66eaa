use cosmwasm_schema::cw_serde;
use cosmwasm_std::Timestamp;

#[cw_serde]
#[derive(Copy, Eq)]
pub enum BadgeLevel {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

/// A catalog tier.
pub struct BadgeTier {
    pub level: BadgeLevel,
    pub name: &'static str,
    pub required_referrals: u64,
}

impl BadgeTier {
    fn badge(&self, earned: bool, earned_at: Option<Timestamp>) -> Badge {
        Badge {
            level: self.level,
            name: self.name.to_string(),
            required_referrals: self.required_referrals,
            earned,
            earned_at,
        }
    }
}

/// Static badge catalog, thresholds strictly increasing.
pub const BADGE_CATALOG: [BadgeTier; 4] = [
    BadgeTier {
        level: BadgeLevel::Bronze,
        name: "Bronze Ambassador",
        required_referrals: 1,
    },
    BadgeTier {
        level: BadgeLevel::Silver,
        name: "Silver Ambassador",
        required_referrals: 5,
    },
    BadgeTier {
        level: BadgeLevel::Gold,
        name: "Gold Ambassador",
        required_referrals: 10,
    },
    BadgeTier {
        level: BadgeLevel::Platinum,
        name: "Platinum Ambassador",
        required_referrals: 25,
    },
];

#[cw_serde]
pub struct Badge {
    pub level: BadgeLevel,
    pub name: String,
    pub required_referrals: u64,
    pub earned: bool,
    /// Set the first time the tier is earned, never cleared
    pub earned_at: Option<Timestamp>,
}

#[cw_serde]
pub struct NextBadge {
    pub badge: Badge,
    pub progress_percent: u8,
    pub remaining: u64,
}

/// Compute the badge set for `referral_count`.
///
/// A tier already earned in `previous` stays earned and keeps its `earned_at`
/// verbatim, whatever `referral_count` says. A tier earned for the first time
/// in this call is stamped with `now`.
pub fn calculate_earned_badges(
    referral_count: u64,
    previous: &[Badge],
    now: Timestamp,
) -> Vec<Badge> {
    BADGE_CATALOG
        .iter()
        .map(|tier| {
            let prior = previous.iter().find(|b| b.level == tier.level && b.earned);
            match prior {
                Some(prior) => tier.badge(true, prior.earned_at),
                None if referral_count >= tier.required_referrals => tier.badge(true, Some(now)),
                None => tier.badge(false, None),
            }
        })
        .collect()
}

/// Lowest-threshold tier not yet reached, with progress toward it.
/// `None` once every tier is reached.
pub fn get_next_badge(referral_count: u64) -> Option<NextBadge> {
    let tier = BADGE_CATALOG
        .iter()
        .find(|tier| referral_count < tier.required_referrals)?;

    let progress = referral_count.saturating_mul(100) / tier.required_referrals;
    Some(NextBadge {
        badge: tier.badge(false, None),
        progress_percent: progress.min(100) as u8,
        remaining: tier.required_referrals.saturating_sub(referral_count),
    })
}

/// Highest-threshold earned badge.
pub fn get_highest_badge(badges: &[Badge]) -> Option<Badge> {
    badges
        .iter()
        .filter(|b| b.earned)
        .max_by_key(|b| b.required_referrals)
        .cloned()
}
