// Draft engine: tier construction and the snake allocator.

pub mod snake;
pub mod tiers;

pub use snake::{snake_draft, DraftLog, DraftOutcome, DraftPick, Team, TierDraft};
pub use tiers::{build_tiers, tier_sizes, Tier};
