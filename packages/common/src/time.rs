pub const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Reward rates are expressed per week.
pub const WEEK: u64 = 7 * SECONDS_PER_DAY;

/// How long users have to claim after a bonus period ends before the
/// leftovers of the period may be swept by the owner.
pub const CLAIM_GRACE_PERIOD: u64 = WEEK;
