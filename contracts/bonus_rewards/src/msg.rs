use soroban_sdk::{contracttype, Address, Vec};

use crate::storage::BonusPeriod;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolResponse {
    pub staked_asset: Address,
    pub total_staked: i128,
    /// Every bonus asset allowed on the pool, funded or not.
    pub bonus_assets: Vec<Address>,
    /// Current period of every funded bonus asset, as last stored.
    pub bonuses: Vec<BonusPeriod>,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PendingReward {
    pub bonus_asset: Address,
    /// Amount the user would receive by claiming now.
    pub amount: i128,
}
