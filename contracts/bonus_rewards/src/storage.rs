use bonus_common::ttl::{
    INSTANCE_BUMP_AMOUNT, INSTANCE_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT,
    PERSISTENT_LIFETIME_THRESHOLD,
};
use soroban_sdk::{
    contracttype, log, panic_with_error, symbol_short, Address, Env, Map, Symbol, Vec,
};

use crate::error::ContractError;

const OWNER: Symbol = symbol_short!("OWNER");
const RESPONDERS: Symbol = symbol_short!("RESPOND");
const PAUSED: Symbol = symbol_short!("PAUSED");

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    /// Every registered staked asset, in registration order
    PoolList,
    /// staked asset => Pool
    Pool(Address),
    /// (staked asset, bonus asset) => addresses allowed to fund the pair
    Authorizers(Address, Address),
    /// (staked asset, bonus asset) => current BonusPeriod
    Bonus(Address, Address),
    /// (staked asset, user) => UserPosition
    User(Address, Address),
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Pool {
    /// The asset users deposit, also the identifier of the pool
    pub staked_asset: Address,
    /// Sum of all user positions in this pool
    pub total_staked: i128,
    /// Bonus assets allowed on this pool, in the order they were allowed
    pub bonus_assets: Vec<Address>,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BonusPeriod {
    pub bonus_asset: Address,
    /// Incremented each time a new period replaces an ended one for the same pair.
    /// User checkpoints recorded under an older id are treated as zero.
    pub period_id: u32,
    pub start_time: u64,
    pub end_time: u64,
    pub weekly_rewards: i128,
    /// Rewards earned per staked unit since `start_time`, scaled by `PRECISION`.
    pub acc_rewards_per_token: i128,
    /// The accumulator is up to date until this timestamp, always within [start_time, end_time].
    pub last_update_time: u64,
    /// Total bonus asset committed to this period.
    pub funded: i128,
    /// Emitted so far, whether or not anything was staked at the time.
    pub mined: i128,
    /// Bonus asset still held for this period: funded minus everything paid out or swept.
    pub remaining: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardCheckpoint {
    pub period_id: u32,
    pub acc_rewards_per_token: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UserPosition {
    pub amount: i128,
    /// bonus asset => accumulator value at the last settlement of this user
    pub checkpoints: Map<Address, RewardCheckpoint>,
}

fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

fn bump_persistent(env: &Env, key: &DataKey) {
    if env.storage().persistent().has(key) {
        env.storage().persistent().extend_ttl(
            key,
            PERSISTENT_LIFETIME_THRESHOLD,
            PERSISTENT_BUMP_AMOUNT,
        );
    }
}

pub fn save_owner(env: &Env, owner: &Address) {
    env.storage().instance().set(&OWNER, owner);
    bump_instance(env);
}

pub fn get_owner(env: &Env) -> Address {
    bump_instance(env);
    env.storage().instance().get(&OWNER).unwrap_or_else(|| {
        log!(env, "Bonus Rewards: Owner not set");
        panic_with_error!(env, ContractError::OwnerNotSet)
    })
}

pub fn save_responders(env: &Env, responders: &Vec<Address>) {
    env.storage().instance().set(&RESPONDERS, responders);
    bump_instance(env);
}

pub fn get_responders(env: &Env) -> Vec<Address> {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&RESPONDERS)
        .unwrap_or_else(|| Vec::new(env))
}

pub fn save_paused(env: &Env, paused: bool) {
    env.storage().instance().set(&PAUSED, &paused);
    bump_instance(env);
}

pub fn is_paused(env: &Env) -> bool {
    bump_instance(env);
    env.storage().instance().get(&PAUSED).unwrap_or(false)
}

pub fn save_pool_list(env: &Env, pools: &Vec<Address>) {
    env.storage().persistent().set(&DataKey::PoolList, pools);
    bump_persistent(env, &DataKey::PoolList);
}

pub fn get_pool_list(env: &Env) -> Vec<Address> {
    bump_persistent(env, &DataKey::PoolList);
    env.storage()
        .persistent()
        .get(&DataKey::PoolList)
        .unwrap_or_else(|| Vec::new(env))
}

pub fn save_pool(env: &Env, pool: &Pool) {
    let key = DataKey::Pool(pool.staked_asset.clone());
    env.storage().persistent().set(&key, pool);
    bump_persistent(env, &key);
}

pub fn get_pool(env: &Env, staked_asset: &Address) -> Option<Pool> {
    let key = DataKey::Pool(staked_asset.clone());
    bump_persistent(env, &key);
    env.storage().persistent().get(&key)
}

pub fn save_authorizers(
    env: &Env,
    staked_asset: &Address,
    bonus_asset: &Address,
    authorizers: &Vec<Address>,
) {
    let key = DataKey::Authorizers(staked_asset.clone(), bonus_asset.clone());
    env.storage().persistent().set(&key, authorizers);
    bump_persistent(env, &key);
}

pub fn get_authorizers(env: &Env, staked_asset: &Address, bonus_asset: &Address) -> Vec<Address> {
    let key = DataKey::Authorizers(staked_asset.clone(), bonus_asset.clone());
    bump_persistent(env, &key);
    env.storage()
        .persistent()
        .get(&key)
        .unwrap_or_else(|| Vec::new(env))
}

pub fn save_bonus(env: &Env, staked_asset: &Address, period: &BonusPeriod) {
    let key = DataKey::Bonus(staked_asset.clone(), period.bonus_asset.clone());
    env.storage().persistent().set(&key, period);
    bump_persistent(env, &key);
}

pub fn get_bonus(env: &Env, staked_asset: &Address, bonus_asset: &Address) -> Option<BonusPeriod> {
    let key = DataKey::Bonus(staked_asset.clone(), bonus_asset.clone());
    bump_persistent(env, &key);
    env.storage().persistent().get(&key)
}

/// All bonus periods of a pool, in the order the bonus assets were allowed.
/// Bonus assets that were never funded are skipped.
pub fn get_bonuses(env: &Env, pool: &Pool) -> Vec<BonusPeriod> {
    let mut periods = Vec::new(env);
    for bonus_asset in pool.bonus_assets.iter() {
        if let Some(period) = get_bonus(env, &pool.staked_asset, &bonus_asset) {
            periods.push_back(period);
        }
    }
    periods
}

pub fn save_bonuses(env: &Env, staked_asset: &Address, periods: &Vec<BonusPeriod>) {
    for period in periods.iter() {
        save_bonus(env, staked_asset, &period);
    }
}

pub fn save_user(env: &Env, staked_asset: &Address, user: &Address, position: &UserPosition) {
    let key = DataKey::User(staked_asset.clone(), user.clone());
    env.storage().persistent().set(&key, position);
    bump_persistent(env, &key);
}

pub fn get_user(env: &Env, staked_asset: &Address, user: &Address) -> UserPosition {
    let key = DataKey::User(staked_asset.clone(), user.clone());
    bump_persistent(env, &key);
    env.storage()
        .persistent()
        .get(&key)
        .unwrap_or_else(|| UserPosition {
            amount: 0,
            checkpoints: Map::new(env),
        })
}
