pub mod badges;
pub mod draw;
pub mod ids;
pub mod leaderboard;
pub mod milestones;
pub mod types;

pub use badges::{calculate_earned_badges, get_highest_badge, get_next_badge, Badge, NextBadge};
pub use draw::{build_ticket_ranges, mix_randomness, select_by_ticket, winning_ticket, DrawContext};
pub use leaderboard::{rank, LeaderboardEntry};
pub use milestones::{get_milestone_message, MilestoneMessage};
pub use types::{DedupPolicy, DrawResult, DrawStatistics, Participant, Winner};
