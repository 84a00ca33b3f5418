use bonus_common::math::{duration_for_rewards, funding_for_duration};
use soroban_sdk::{contract, contractimpl, contractmeta, log, Address, Env, Vec};

use crate::{
    distribution::{forfeit_rewards, is_sweepable, pending_reward, settle_pool, settle_user},
    error::ContractError,
    msg::{PendingReward, PoolResponse},
    storage::{
        get_authorizers, get_bonus, get_bonuses, get_owner, get_pool, get_pool_list,
        get_responders, get_user, is_paused, save_authorizers, save_bonus, save_bonuses,
        save_owner, save_paused, save_pool, save_pool_list, save_responders, save_user,
        BonusPeriod, Pool, UserPosition,
    },
    utils::{
        balance_of, pay_rewards, require_authorizer, require_not_paused, require_owner,
        require_responder, transfer_in, transfer_out,
    },
};

// Metadata that is added on to the WASM custom section
contractmeta!(
    key = "Description",
    val = "Bonus rewards for staked assets"
);

#[contract]
pub struct BonusRewards;

pub trait BonusRewardsTrait {
    fn __constructor(env: Env, owner: Address);

    // ACCESS POLICY

    fn set_responders(env: Env, sender: Address, responders: Vec<Address>)
        -> Result<(), ContractError>;

    fn set_paused(env: Env, sender: Address, paused: bool) -> Result<(), ContractError>;

    // POOL REGISTRY

    fn add_pools_and_allow_bonus(
        env: Env,
        sender: Address,
        staked_assets: Vec<Address>,
        bonus_assets: Vec<Address>,
        authorizers: Vec<Address>,
    ) -> Result<(), ContractError>;

    // FUNDING

    fn add_bonus(
        env: Env,
        sender: Address,
        pool: Address,
        bonus_asset: Address,
        start_time: u64,
        weekly_rewards: i128,
        amount: i128,
    ) -> Result<(), ContractError>;

    fn extend_bonus(
        env: Env,
        sender: Address,
        pool: Address,
        bonus_asset: Address,
        amount: i128,
    ) -> Result<(), ContractError>;

    /// Changes the weekly rate of an active period.
    /// Without `end_time` the unmined budget is re-spread at the new rate;
    /// with it, the funding difference is pulled from or returned to `sender`.
    fn update_bonus(
        env: Env,
        sender: Address,
        pool: Address,
        bonus_asset: Address,
        weekly_rewards: i128,
        end_time: Option<u64>,
    ) -> Result<(), ContractError>;

    // STAKING

    fn deposit(env: Env, sender: Address, pool: Address, amount: i128)
        -> Result<(), ContractError>;

    fn withdraw(env: Env, sender: Address, pool: Address, amount: i128)
        -> Result<(), ContractError>;

    fn claim_rewards_for_pools(
        env: Env,
        sender: Address,
        pools: Vec<Address>,
    ) -> Result<(), ContractError>;

    fn emergency_withdraw(env: Env, sender: Address, pool: Address) -> Result<(), ContractError>;

    // DUST

    fn collect_dust(env: Env, sender: Address, asset: Address) -> Result<(), ContractError>;

    // QUERIES

    fn query_owner(env: Env) -> Address;

    fn query_responders(env: Env) -> Vec<Address>;

    fn query_paused(env: Env) -> bool;

    fn get_pool_list(env: Env) -> Vec<Address>;

    fn get_authorizers(env: Env, pool: Address, bonus_asset: Address) -> Vec<Address>;

    fn get_pool(env: Env, pool: Address) -> Result<PoolResponse, ContractError>;

    fn get_user(env: Env, pool: Address, user: Address) -> UserPosition;

    fn view_rewards(
        env: Env,
        pool: Address,
        user: Address,
    ) -> Result<Vec<PendingReward>, ContractError>;
}

#[contractimpl]
impl BonusRewardsTrait for BonusRewards {
    fn __constructor(env: Env, owner: Address) {
        save_owner(&env, &owner);
        save_responders(&env, &Vec::new(&env));
        save_paused(&env, false);
        save_pool_list(&env, &Vec::new(&env));

        env.events()
            .publish(("initialize", "Bonus rewards owner"), &owner);
    }

    fn set_responders(
        env: Env,
        sender: Address,
        responders: Vec<Address>,
    ) -> Result<(), ContractError> {
        sender.require_auth();
        require_owner(&env, &sender)?;

        save_responders(&env, &responders);

        env.events()
            .publish(("set_responders", "responders"), responders);

        Ok(())
    }

    fn set_paused(env: Env, sender: Address, paused: bool) -> Result<(), ContractError> {
        sender.require_auth();
        require_responder(&env, &sender)?;

        save_paused(&env, paused);

        env.events().publish(("set_paused", "sender"), &sender);
        env.events().publish(("set_paused", "paused"), paused);

        Ok(())
    }

    fn add_pools_and_allow_bonus(
        env: Env,
        sender: Address,
        staked_assets: Vec<Address>,
        bonus_assets: Vec<Address>,
        authorizers: Vec<Address>,
    ) -> Result<(), ContractError> {
        sender.require_auth();
        require_owner(&env, &sender)?;
        require_not_paused(&env)?;

        let mut pool_list = get_pool_list(&env);

        for staked_asset in staked_assets.iter() {
            if is_bonus_asset(&env, &pool_list, &staked_asset) {
                log!(
                    &env,
                    "Bonus Rewards: Add pools: staked asset is already a bonus asset"
                );
                return Err(ContractError::InvalidAsset);
            }
            if !pool_list.contains(&staked_asset) {
                pool_list.push_back(staked_asset.clone());
                save_pool(
                    &env,
                    &Pool {
                        staked_asset: staked_asset.clone(),
                        total_staked: 0,
                        bonus_assets: Vec::new(&env),
                    },
                );
                env.events().publish(("add_pool", "pool"), &staked_asset);
            }
        }

        for bonus_asset in bonus_assets.iter() {
            if pool_list.contains(&bonus_asset) {
                log!(
                    &env,
                    "Bonus Rewards: Add pools: a staked asset cannot be a bonus asset"
                );
                return Err(ContractError::InvalidAsset);
            }
        }

        for staked_asset in staked_assets.iter() {
            let Some(mut pool) = get_pool(&env, &staked_asset) else {
                log!(&env, "Bonus Rewards: Add pools: pool does not exist");
                return Err(ContractError::NotFound);
            };

            for bonus_asset in bonus_assets.iter() {
                if !pool.bonus_assets.contains(&bonus_asset) {
                    pool.bonus_assets.push_back(bonus_asset.clone());
                }

                let mut allowed = get_authorizers(&env, &staked_asset, &bonus_asset);
                for authorizer in authorizers.iter() {
                    if !allowed.contains(&authorizer) {
                        allowed.push_back(authorizer);
                    }
                }
                save_authorizers(&env, &staked_asset, &bonus_asset, &allowed);

                env.events()
                    .publish(("allow_bonus", "pool"), &staked_asset);
                env.events()
                    .publish(("allow_bonus", "bonus_asset"), &bonus_asset);
            }
            save_pool(&env, &pool);
        }

        save_pool_list(&env, &pool_list);

        Ok(())
    }

    fn add_bonus(
        env: Env,
        sender: Address,
        pool: Address,
        bonus_asset: Address,
        start_time: u64,
        weekly_rewards: i128,
        amount: i128,
    ) -> Result<(), ContractError> {
        sender.require_auth();
        require_not_paused(&env)?;
        require_authorizer(&env, &sender, &pool, &bonus_asset)?;

        let now = env.ledger().timestamp();
        if start_time <= now {
            log!(
                &env,
                "Bonus Rewards: Add bonus: start time in the past: {} is not after {}",
                start_time,
                now
            );
            return Err(ContractError::InvalidTiming);
        }

        let pool_info = load_pool(&env, &pool)?;
        if !pool_info.bonus_assets.contains(&bonus_asset) {
            log!(
                &env,
                "Bonus Rewards: Add bonus: bonus asset not allowed on this pool"
            );
            return Err(ContractError::InvalidAsset);
        }

        if weekly_rewards <= 0 || amount <= 0 {
            log!(
                &env,
                "Bonus Rewards: Add bonus: weekly rewards and amount must be positive"
            );
            return Err(ContractError::InvalidAmount);
        }
        let duration =
            duration_for_rewards(amount, weekly_rewards).ok_or(ContractError::ContractMathError)?;
        if duration == 0 {
            log!(
                &env,
                "Bonus Rewards: Add bonus: amount does not cover a single second"
            );
            return Err(ContractError::InvalidAmount);
        }

        let period_id = match get_bonus(&env, &pool, &bonus_asset) {
            Some(previous) => {
                if previous.end_time > now {
                    log!(
                        &env,
                        "Bonus Rewards: Add bonus: last bonus period hasn't ended"
                    );
                    return Err(ContractError::PeriodConflict);
                }
                if previous.remaining > 0 {
                    log!(
                        &env,
                        "Bonus Rewards: Add bonus: last bonus not all claimed, {} left",
                        previous.remaining
                    );
                    return Err(ContractError::PeriodConflict);
                }
                previous
                    .period_id
                    .checked_add(1)
                    .ok_or(ContractError::ContractMathError)?
            }
            None => 0,
        };

        let end_time = start_time
            .checked_add(duration)
            .ok_or(ContractError::ContractMathError)?;
        save_bonus(
            &env,
            &pool,
            &BonusPeriod {
                bonus_asset: bonus_asset.clone(),
                period_id,
                start_time,
                end_time,
                weekly_rewards,
                acc_rewards_per_token: 0,
                last_update_time: start_time,
                funded: amount,
                mined: 0,
                remaining: amount,
            },
        );

        transfer_in(&env, &bonus_asset, &sender, amount)?;

        env.events().publish(("add_bonus", "pool"), &pool);
        env.events().publish(("add_bonus", "bonus_asset"), &bonus_asset);
        env.events().publish(("add_bonus", "amount"), amount);
        env.events().publish(("add_bonus", "end_time"), end_time);

        Ok(())
    }

    fn extend_bonus(
        env: Env,
        sender: Address,
        pool: Address,
        bonus_asset: Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        sender.require_auth();
        require_not_paused(&env)?;
        require_authorizer(&env, &sender, &pool, &bonus_asset)?;

        if amount <= 0 {
            log!(&env, "Bonus Rewards: Extend bonus: amount must be positive");
            return Err(ContractError::InvalidAmount);
        }

        let now = env.ledger().timestamp();
        let pool_info = load_pool(&env, &pool)?;
        let mut period = settle_active_period(&env, &pool_info, &bonus_asset, now)?;

        let extension = duration_for_rewards(amount, period.weekly_rewards)
            .ok_or(ContractError::ContractMathError)?;
        if extension == 0 {
            log!(
                &env,
                "Bonus Rewards: Extend bonus: amount does not cover a single second"
            );
            return Err(ContractError::InvalidAmount);
        }
        period.end_time = period
            .end_time
            .checked_add(extension)
            .ok_or(ContractError::ContractMathError)?;
        period.funded = period
            .funded
            .checked_add(amount)
            .ok_or(ContractError::ContractMathError)?;
        period.remaining = period
            .remaining
            .checked_add(amount)
            .ok_or(ContractError::ContractMathError)?;
        save_bonus(&env, &pool, &period);

        transfer_in(&env, &bonus_asset, &sender, amount)?;

        env.events().publish(("extend_bonus", "pool"), &pool);
        env.events()
            .publish(("extend_bonus", "bonus_asset"), &bonus_asset);
        env.events().publish(("extend_bonus", "amount"), amount);
        env.events()
            .publish(("extend_bonus", "end_time"), period.end_time);

        Ok(())
    }

    fn update_bonus(
        env: Env,
        sender: Address,
        pool: Address,
        bonus_asset: Address,
        weekly_rewards: i128,
        end_time: Option<u64>,
    ) -> Result<(), ContractError> {
        sender.require_auth();
        require_not_paused(&env)?;
        require_authorizer(&env, &sender, &pool, &bonus_asset)?;

        if weekly_rewards <= 0 {
            log!(
                &env,
                "Bonus Rewards: Update bonus: weekly rewards must be positive"
            );
            return Err(ContractError::InvalidAmount);
        }

        let now = env.ledger().timestamp();
        let pool_info = load_pool(&env, &pool)?;
        // everything up to now is credited at the old rate
        let mut period = settle_active_period(&env, &pool_info, &bonus_asset, now)?;

        let anchor = now.max(period.start_time);
        let unmined = period
            .funded
            .checked_sub(period.mined)
            .ok_or(ContractError::ContractMathError)?;

        let mut delta = 0i128;
        let new_end_time = match end_time {
            None => anchor
                .checked_add(
                    duration_for_rewards(unmined, weekly_rewards)
                        .ok_or(ContractError::ContractMathError)?,
                )
                .ok_or(ContractError::ContractMathError)?,
            Some(new_end_time) => {
                if new_end_time <= anchor {
                    log!(
                        &env,
                        "Bonus Rewards: Update bonus: end time {} must be after {}",
                        new_end_time,
                        anchor
                    );
                    return Err(ContractError::InvalidTiming);
                }
                let required = funding_for_duration(weekly_rewards, new_end_time - anchor)
                    .ok_or(ContractError::ContractMathError)?;
                delta = required
                    .checked_sub(unmined)
                    .ok_or(ContractError::ContractMathError)?;
                new_end_time
            }
        };

        period.funded = period
            .funded
            .checked_add(delta)
            .ok_or(ContractError::ContractMathError)?;
        period.remaining = period
            .remaining
            .checked_add(delta)
            .ok_or(ContractError::ContractMathError)?;
        period.weekly_rewards = weekly_rewards;
        period.end_time = new_end_time;
        save_bonus(&env, &pool, &period);

        if delta > 0 {
            transfer_in(&env, &bonus_asset, &sender, delta)?;
        } else if delta < 0 {
            transfer_out(&env, &bonus_asset, &sender, -delta)?;
        }

        env.events().publish(("update_bonus", "pool"), &pool);
        env.events()
            .publish(("update_bonus", "bonus_asset"), &bonus_asset);
        env.events()
            .publish(("update_bonus", "weekly_rewards"), weekly_rewards);
        env.events()
            .publish(("update_bonus", "end_time"), new_end_time);

        Ok(())
    }

    fn deposit(
        env: Env,
        sender: Address,
        pool: Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        sender.require_auth();
        require_not_paused(&env)?;

        if amount < 0 {
            log!(&env, "Bonus Rewards: Deposit: negative amount {}", amount);
            return Err(ContractError::InvalidAmount);
        }

        let mut pool_info = load_pool(&env, &pool)?;
        let now = env.ledger().timestamp();

        let mut periods = settle_pool(&env, &pool_info, now)?;
        let mut position = get_user(&env, &pool, &sender);
        let mut payouts = Vec::new(&env);
        settle_user(&mut periods, &mut position, &mut payouts)?;

        position.amount = position
            .amount
            .checked_add(amount)
            .ok_or(ContractError::ContractMathError)?;
        pool_info.total_staked = pool_info
            .total_staked
            .checked_add(amount)
            .ok_or(ContractError::ContractMathError)?;

        save_bonuses(&env, &pool, &periods);
        save_pool(&env, &pool_info);
        save_user(&env, &pool, &sender, &position);

        if amount > 0 {
            transfer_in(&env, &pool, &sender, amount)?;
        }
        pay_rewards(&env, &sender, &payouts)?;

        env.events().publish(("deposit", "user"), &sender);
        env.events().publish(("deposit", "pool"), &pool);
        env.events().publish(("deposit", "amount"), amount);

        Ok(())
    }

    fn withdraw(
        env: Env,
        sender: Address,
        pool: Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        sender.require_auth();
        require_not_paused(&env)?;

        if amount < 0 {
            log!(&env, "Bonus Rewards: Withdraw: negative amount {}", amount);
            return Err(ContractError::InvalidAmount);
        }

        let mut pool_info = load_pool(&env, &pool)?;
        let mut position = get_user(&env, &pool, &sender);
        if amount > position.amount {
            log!(
                &env,
                "Bonus Rewards: Withdraw: insufficient balance, {} staked but {} requested",
                position.amount,
                amount
            );
            return Err(ContractError::InsufficientBalance);
        }

        let now = env.ledger().timestamp();
        let mut periods = settle_pool(&env, &pool_info, now)?;
        let mut payouts = Vec::new(&env);
        settle_user(&mut periods, &mut position, &mut payouts)?;

        position.amount -= amount;
        pool_info.total_staked = pool_info
            .total_staked
            .checked_sub(amount)
            .ok_or(ContractError::ContractMathError)?;

        save_bonuses(&env, &pool, &periods);
        save_pool(&env, &pool_info);
        save_user(&env, &pool, &sender, &position);

        if amount > 0 {
            transfer_out(&env, &pool, &sender, amount)?;
        }
        pay_rewards(&env, &sender, &payouts)?;

        env.events().publish(("withdraw", "user"), &sender);
        env.events().publish(("withdraw", "pool"), &pool);
        env.events().publish(("withdraw", "amount"), amount);

        Ok(())
    }

    fn claim_rewards_for_pools(
        env: Env,
        sender: Address,
        pools: Vec<Address>,
    ) -> Result<(), ContractError> {
        sender.require_auth();
        require_not_paused(&env)?;

        let now = env.ledger().timestamp();
        let mut payouts = Vec::new(&env);

        for pool in pools.iter() {
            // unknown pools and pools without a stake have nothing to claim
            let Some(pool_info) = get_pool(&env, &pool) else {
                continue;
            };
            let mut position = get_user(&env, &pool, &sender);
            if position.amount == 0 {
                continue;
            }

            let mut periods = settle_pool(&env, &pool_info, now)?;
            settle_user(&mut periods, &mut position, &mut payouts)?;

            save_bonuses(&env, &pool, &periods);
            save_user(&env, &pool, &sender, &position);
        }

        pay_rewards(&env, &sender, &payouts)?;

        Ok(())
    }

    fn emergency_withdraw(env: Env, sender: Address, pool: Address) -> Result<(), ContractError> {
        sender.require_auth();

        let mut pool_info = load_pool(&env, &pool)?;
        let mut position = get_user(&env, &pool, &sender);
        let amount = position.amount;

        // no accrual here: this has to work even when a bonus asset is broken
        forfeit_rewards(&get_bonuses(&env, &pool_info), &mut position);
        position.amount = 0;
        pool_info.total_staked = pool_info
            .total_staked
            .checked_sub(amount)
            .ok_or(ContractError::ContractMathError)?;

        save_pool(&env, &pool_info);
        save_user(&env, &pool, &sender, &position);

        if amount > 0 {
            transfer_out(&env, &pool, &sender, amount)?;
        }

        env.events()
            .publish(("emergency_withdraw", "user"), &sender);
        env.events()
            .publish(("emergency_withdraw", "pool"), &pool);
        env.events()
            .publish(("emergency_withdraw", "amount"), amount);

        Ok(())
    }

    fn collect_dust(env: Env, sender: Address, asset: Address) -> Result<(), ContractError> {
        sender.require_auth();
        require_owner(&env, &sender)?;

        if get_pool(&env, &asset).is_some() {
            log!(
                &env,
                "Bonus Rewards: Collect dust: staked assets cannot be collected"
            );
            return Err(ContractError::InvalidAsset);
        }

        let now = env.ledger().timestamp();
        for pool in get_pool_list(&env).iter() {
            let Some(pool_info) = get_pool(&env, &pool) else {
                continue;
            };
            if !pool_info.bonus_assets.contains(&asset) || get_bonus(&env, &pool, &asset).is_none()
            {
                continue;
            }

            let periods = settle_pool(&env, &pool_info, now)?;
            for mut period in periods.iter() {
                if period.bonus_asset == asset {
                    if !is_sweepable(&period, now) {
                        log!(
                            &env,
                            "Bonus Rewards: Collect dust: not ready, period ends at {}",
                            period.end_time
                        );
                        return Err(ContractError::InvalidAsset);
                    }
                    period.remaining = 0;
                }
                save_bonus(&env, &pool, &period);
            }
        }

        let owner = get_owner(&env);
        let balance = balance_of(&env, &asset, &env.current_contract_address());
        if balance > 0 {
            transfer_out(&env, &asset, &owner, balance)?;
        }

        env.events().publish(("collect_dust", "asset"), &asset);
        env.events().publish(("collect_dust", "amount"), balance);

        Ok(())
    }

    // QUERIES

    fn query_owner(env: Env) -> Address {
        get_owner(&env)
    }

    fn query_responders(env: Env) -> Vec<Address> {
        get_responders(&env)
    }

    fn query_paused(env: Env) -> bool {
        is_paused(&env)
    }

    fn get_pool_list(env: Env) -> Vec<Address> {
        get_pool_list(&env)
    }

    fn get_authorizers(env: Env, pool: Address, bonus_asset: Address) -> Vec<Address> {
        get_authorizers(&env, &pool, &bonus_asset)
    }

    fn get_pool(env: Env, pool: Address) -> Result<PoolResponse, ContractError> {
        let pool_info = load_pool(&env, &pool)?;
        let bonuses = get_bonuses(&env, &pool_info);

        Ok(PoolResponse {
            staked_asset: pool_info.staked_asset,
            total_staked: pool_info.total_staked,
            bonus_assets: pool_info.bonus_assets,
            bonuses,
        })
    }

    fn get_user(env: Env, pool: Address, user: Address) -> UserPosition {
        get_user(&env, &pool, &user)
    }

    fn view_rewards(
        env: Env,
        pool: Address,
        user: Address,
    ) -> Result<Vec<PendingReward>, ContractError> {
        let pool_info = load_pool(&env, &pool)?;
        let position = get_user(&env, &pool, &user);
        let periods = settle_pool(&env, &pool_info, env.ledger().timestamp())?;

        let mut rewards = Vec::new(&env);
        for period in periods.iter() {
            rewards.push_back(PendingReward {
                amount: pending_reward(&period, &position)?,
                bonus_asset: period.bonus_asset,
            });
        }

        Ok(rewards)
    }
}

fn load_pool(env: &Env, pool: &Address) -> Result<Pool, ContractError> {
    get_pool(env, pool).ok_or_else(|| {
        log!(env, "Bonus Rewards: pool does not exist");
        ContractError::NotFound
    })
}

fn is_bonus_asset(env: &Env, pool_list: &Vec<Address>, asset: &Address) -> bool {
    pool_list.iter().any(|pool| {
        get_pool(env, &pool).is_some_and(|pool_info| pool_info.bonus_assets.contains(asset))
    })
}

/// Accrues every period of the pool up to `now`, saves them and returns the
/// period of `bonus_asset`, which must still be running.
fn settle_active_period(
    env: &Env,
    pool: &Pool,
    bonus_asset: &Address,
    now: u64,
) -> Result<BonusPeriod, ContractError> {
    let periods = settle_pool(env, pool, now)?;
    save_bonuses(env, &pool.staked_asset, &periods);

    let Some(period) = periods.iter().find(|period| period.bonus_asset == *bonus_asset) else {
        log!(env, "Bonus Rewards: no bonus period for this asset");
        return Err(ContractError::NotFound);
    };
    if period.end_time <= now {
        log!(
            env,
            "Bonus Rewards: bonus program ended, please start a new one"
        );
        return Err(ContractError::InvalidTiming);
    }

    Ok(period)
}
