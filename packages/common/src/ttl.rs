// Constants for storage bump amounts
pub const DAY_IN_LEDGERS: u32 = 17280;

// Instance storage holds the access policy and the pool list, which are touched by every call.
pub const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
pub const INSTANCE_LIFETIME_THRESHOLD: u32 = INSTANCE_BUMP_AMOUNT - DAY_IN_LEDGERS;

// Pools, bonus periods and user positions. A position can sit untouched for the
// whole length of a bonus program, so it is kept alive for a month at a time.
pub const PERSISTENT_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
pub const PERSISTENT_LIFETIME_THRESHOLD: u32 = PERSISTENT_BUMP_AMOUNT - DAY_IN_LEDGERS;
