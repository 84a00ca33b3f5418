use bonus_common::{
    math::{mul_div, rewards_for_duration, PRECISION},
    time::CLAIM_GRACE_PERIOD,
};
use soroban_sdk::{Address, Env, Vec};

use crate::{
    error::ContractError,
    storage::{get_bonuses, BonusPeriod, Pool, RewardCheckpoint, UserPosition},
};

/// Brings the accumulator of a single bonus period up to `now`.
///
/// Time is clamped to `[last_update_time, end_time]`. Whatever the clock mined
/// while nothing was staked stays in `remaining` and is never claimable.
pub fn accrue(period: &mut BonusPeriod, total_staked: i128, now: u64) -> Result<(), ContractError> {
    let effective_now = now.min(period.end_time);
    if effective_now <= period.last_update_time {
        return Ok(());
    }

    let elapsed = effective_now - period.last_update_time;
    let unmined = period
        .funded
        .checked_sub(period.mined)
        .ok_or(ContractError::ContractMathError)?
        .max(0);
    let mined = rewards_for_duration(period.weekly_rewards, elapsed)
        .ok_or(ContractError::ContractMathError)?
        .min(unmined);

    period.mined = period
        .mined
        .checked_add(mined)
        .ok_or(ContractError::ContractMathError)?;

    if total_staked > 0 {
        let increment =
            mul_div(mined, PRECISION, total_staked).ok_or(ContractError::ContractMathError)?;
        period.acc_rewards_per_token = period
            .acc_rewards_per_token
            .checked_add(increment)
            .ok_or(ContractError::ContractMathError)?;
    }
    period.last_update_time = effective_now;

    Ok(())
}

/// Loads every bonus period of the pool and accrues it up to `now`.
/// Nothing is written; callers save the periods once they are done with them.
pub fn settle_pool(env: &Env, pool: &Pool, now: u64) -> Result<Vec<BonusPeriod>, ContractError> {
    let mut periods = get_bonuses(env, pool);
    for i in 0..periods.len() {
        let mut period = periods.get_unchecked(i);
        accrue(&mut period, pool.total_staked, now)?;
        periods.set(i, period);
    }
    Ok(periods)
}

fn checkpoint_of(period: &BonusPeriod, position: &UserPosition) -> i128 {
    match position.checkpoints.get(period.bonus_asset.clone()) {
        Some(checkpoint) if checkpoint.period_id == period.period_id => {
            checkpoint.acc_rewards_per_token
        }
        _ => 0,
    }
}

/// Reward owed to `position` for `period` since its last checkpoint.
///
/// Capped by what the period still holds: once the leftovers of an ended
/// period were swept, late claims are forfeited.
pub fn pending_reward(
    period: &BonusPeriod,
    position: &UserPosition,
) -> Result<i128, ContractError> {
    if position.amount == 0 {
        return Ok(0);
    }
    let delta = period
        .acc_rewards_per_token
        .checked_sub(checkpoint_of(period, position))
        .ok_or(ContractError::ContractMathError)?
        .max(0);
    let reward =
        mul_div(position.amount, delta, PRECISION).ok_or(ContractError::ContractMathError)?;

    Ok(reward.min(period.remaining.max(0)))
}

/// Settles the user against already accrued periods.
///
/// Every owed reward is taken out of its period's `remaining` and queued in
/// `payouts`; the transfers themselves are left to the caller, after all
/// bookkeeping has been saved.
pub fn settle_user(
    periods: &mut Vec<BonusPeriod>,
    position: &mut UserPosition,
    payouts: &mut Vec<(Address, i128)>,
) -> Result<(), ContractError> {
    for i in 0..periods.len() {
        let mut period = periods.get_unchecked(i);
        let reward = pending_reward(&period, position)?;
        if reward > 0 {
            period.remaining -= reward;
            payouts.push_back((period.bonus_asset.clone(), reward));
            periods.set(i, period.clone());
        }
        position.checkpoints.set(
            period.bonus_asset.clone(),
            RewardCheckpoint {
                period_id: period.period_id,
                acc_rewards_per_token: period.acc_rewards_per_token,
            },
        );
    }
    Ok(())
}

/// Moves every checkpoint of the position to the stored accumulators without paying anything.
pub fn forfeit_rewards(periods: &Vec<BonusPeriod>, position: &mut UserPosition) {
    for period in periods.iter() {
        position.checkpoints.set(
            period.bonus_asset.clone(),
            RewardCheckpoint {
                period_id: period.period_id,
                acc_rewards_per_token: period.acc_rewards_per_token,
            },
        );
    }
}

/// A period may be swept once it ended and either everything was paid out or
/// users had a full grace period to claim.
pub fn is_sweepable(period: &BonusPeriod, now: u64) -> bool {
    if now < period.end_time {
        return false;
    }
    period.remaining == 0 || now > period.end_time.saturating_add(CLAIM_GRACE_PERIOD)
}
