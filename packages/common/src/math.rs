//! Scaled-integer arithmetic used by the reward accumulator.
//!
//! All helpers work on non-negative `i128` values (the token amount type of
//! the Soroban token interface), truncate toward zero unless stated otherwise
//! and return `None` instead of overflowing.

use crate::time::WEEK;

/// Scale of `acc_rewards_per_token`. With 1e12 a single unit staked in a pool
/// of 1e12 units still accrues a non-zero share of one mined unit.
pub const PRECISION: i128 = 1_000_000_000_000;

/// `a * b / denominator`, rounded down.
pub fn mul_div(a: i128, b: i128, denominator: i128) -> Option<i128> {
    if denominator == 0 {
        return None;
    }
    a.checked_mul(b)?.checked_div(denominator)
}

/// `a * b / denominator`, rounded up.
pub fn mul_div_ceil(a: i128, b: i128, denominator: i128) -> Option<i128> {
    if denominator == 0 {
        return None;
    }
    let product = a.checked_mul(b)?;
    let quotient = product.checked_div(denominator)?;
    if product % denominator == 0 {
        Some(quotient)
    } else {
        quotient.checked_add(1)
    }
}

/// Amount emitted over `seconds` at `weekly_rewards` per week, rounded down.
pub fn rewards_for_duration(weekly_rewards: i128, seconds: u64) -> Option<i128> {
    mul_div(weekly_rewards, seconds as i128, WEEK as i128)
}

/// Amount needed to fund `seconds` at `weekly_rewards` per week, rounded up.
pub fn funding_for_duration(weekly_rewards: i128, seconds: u64) -> Option<i128> {
    mul_div_ceil(weekly_rewards, seconds as i128, WEEK as i128)
}

/// Seconds that `amount` lasts at `weekly_rewards` per week.
///
/// Multiplies before dividing and rounds down, so a period never emits more
/// than it was funded with.
pub fn duration_for_rewards(amount: i128, weekly_rewards: i128) -> Option<u64> {
    if weekly_rewards <= 0 || amount < 0 {
        return None;
    }
    let seconds = mul_div(amount, WEEK as i128, weekly_rewards)?;
    u64::try_from(seconds).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(10, 20, 3 => Some(66) ; "rounds down")]
    #[test_case(10, 30, 3 => Some(100) ; "exact")]
    #[test_case(0, 30, 3 => Some(0) ; "zero numerator")]
    #[test_case(10, 30, 0 => None ; "zero denominator")]
    #[test_case(i128::MAX, 2, 1 => None ; "overflow")]
    fn mul_div_cases(a: i128, b: i128, d: i128) -> Option<i128> {
        mul_div(a, b, d)
    }

    #[test_case(10, 20, 3 => Some(67) ; "rounds up")]
    #[test_case(10, 30, 3 => Some(100) ; "exact")]
    #[test_case(10, 30, 0 => None ; "zero denominator")]
    fn mul_div_ceil_cases(a: i128, b: i128, d: i128) -> Option<i128> {
        mul_div_ceil(a, b, d)
    }

    #[test]
    fn one_week_of_funding_lasts_one_week() {
        assert_eq!(duration_for_rewards(800, 800), Some(WEEK));
        assert_eq!(duration_for_rewards(1_600, 800), Some(2 * WEEK));
    }

    #[test]
    fn duration_truncates_when_amount_is_not_a_multiple_of_rate() {
        // 10_000 / 800 = 12.5 weeks, multiply-then-divide keeps the half week
        assert_eq!(duration_for_rewards(10_000, 800), Some(12 * WEEK + WEEK / 2));

        // 1 unit at 3 per week lasts WEEK / 3 seconds, rounded down
        let seconds = duration_for_rewards(1, 3).unwrap();
        assert_eq!(seconds, WEEK / 3);
        assert!(rewards_for_duration(3, seconds).unwrap() <= 1);
    }

    #[test]
    fn duration_rejects_invalid_rate() {
        assert_eq!(duration_for_rewards(100, 0), None);
        assert_eq!(duration_for_rewards(100, -1), None);
        assert_eq!(duration_for_rewards(-1, 10), None);
    }

    #[test]
    fn emitted_rewards_never_exceed_funding() {
        for (amount, rate) in [(7i128, 3i128), (1_000, 999), (10_000, 800), (1, 1_000_000)] {
            let seconds = duration_for_rewards(amount, rate).unwrap();
            assert!(rewards_for_duration(rate, seconds).unwrap() <= amount);
        }
    }

    #[test]
    fn funding_covers_emission() {
        let seconds = 12_345;
        let rate = 777;
        assert!(
            funding_for_duration(rate, seconds).unwrap()
                >= rewards_for_duration(rate, seconds).unwrap()
        );
        assert_eq!(funding_for_duration(800, WEEK), Some(800));
    }
}
