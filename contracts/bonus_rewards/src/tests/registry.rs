use pretty_assertions::assert_eq;
use soroban_sdk::{testutils::Address as _, vec, Address, Env, Vec};

use super::setup::{deploy_bonus_rewards_contract, deploy_token_contract, Setup};
use crate::{error::ContractError, msg::PoolResponse, storage::DataKey};

#[test]
fn add_pools_and_allow_bonus_for_every_pair() {
    let env = Env::default();
    env.mock_all_auths();

    let owner = Address::generate(&env);
    let partner = Address::generate(&env);
    let rewards = deploy_bonus_rewards_contract(&env, &owner);

    let (lp_a, _) = deploy_token_contract(&env, &owner);
    let (lp_b, _) = deploy_token_contract(&env, &owner);
    let (bonus_x, _) = deploy_token_contract(&env, &owner);
    let (bonus_y, _) = deploy_token_contract(&env, &owner);

    rewards.add_pools_and_allow_bonus(
        &owner,
        &vec![&env, lp_a.address.clone(), lp_b.address.clone()],
        &vec![&env, bonus_x.address.clone(), bonus_y.address.clone()],
        &vec![&env, partner.clone()],
    );

    assert_eq!(
        rewards.get_pool_list(),
        vec![&env, lp_a.address.clone(), lp_b.address.clone()]
    );
    for lp in [&lp_a, &lp_b] {
        assert_eq!(
            rewards.get_pool(&lp.address),
            PoolResponse {
                staked_asset: lp.address.clone(),
                total_staked: 0,
                bonus_assets: vec![&env, bonus_x.address.clone(), bonus_y.address.clone()],
                bonuses: Vec::new(&env),
            }
        );
        for bonus in [&bonus_x, &bonus_y] {
            assert_eq!(
                rewards.get_authorizers(&lp.address, &bonus.address),
                vec![&env, partner.clone()]
            );
        }
    }
}

#[test]
fn adding_pools_again_merges_without_duplicates() {
    let setup = Setup::new();
    let env = &setup.env;
    let lp = &setup.lp.address;
    let bonus = &setup.bonus.address;
    let second_partner = Address::generate(env);
    let (other_bonus, _) = deploy_token_contract(env, &setup.owner);

    setup.rewards.add_pools_and_allow_bonus(
        &setup.owner,
        &vec![env, lp.clone()],
        &vec![env, bonus.clone(), other_bonus.address.clone()],
        &vec![env, setup.partner.clone(), second_partner.clone()],
    );

    assert_eq!(setup.rewards.get_pool_list(), vec![env, lp.clone()]);
    assert_eq!(
        setup.rewards.get_pool(lp).bonus_assets,
        vec![env, bonus.clone(), other_bonus.address.clone()]
    );
    assert_eq!(
        setup.rewards.get_authorizers(lp, bonus),
        vec![env, setup.partner.clone(), second_partner.clone()]
    );
    assert_eq!(
        setup.rewards.get_authorizers(lp, &other_bonus.address),
        vec![env, setup.partner.clone(), second_partner]
    );
}

#[test]
fn pool_without_authorizers_is_owner_funded() {
    let env = Env::default();
    env.mock_all_auths();

    let owner = Address::generate(&env);
    let rewards = deploy_bonus_rewards_contract(&env, &owner);
    let (lp, _) = deploy_token_contract(&env, &owner);
    let (bonus, _) = deploy_token_contract(&env, &owner);

    rewards.add_pools_and_allow_bonus(
        &owner,
        &vec![&env, lp.address.clone()],
        &vec![&env, bonus.address.clone()],
        &Vec::new(&env),
    );

    assert_eq!(
        rewards.get_authorizers(&lp.address, &bonus.address),
        Vec::new(&env)
    );
    assert_eq!(
        rewards.get_pool(&lp.address).bonus_assets,
        vec![&env, bonus.address]
    );
}

#[test]
fn staked_asset_cannot_be_its_own_bonus() {
    let env = Env::default();
    env.mock_all_auths();

    let owner = Address::generate(&env);
    let rewards = deploy_bonus_rewards_contract(&env, &owner);
    let (lp, _) = deploy_token_contract(&env, &owner);

    assert_eq!(
        rewards.try_add_pools_and_allow_bonus(
            &owner,
            &vec![&env, lp.address.clone()],
            &vec![&env, lp.address.clone()],
            &Vec::new(&env),
        ),
        Err(Ok(ContractError::InvalidAsset))
    );
    // nothing from the failed call was kept
    assert_eq!(rewards.get_pool_list(), Vec::new(&env));
}

#[test]
fn existing_pool_cannot_become_a_bonus_asset() {
    let setup = Setup::new();
    let env = &setup.env;
    let (lp_b, _) = deploy_token_contract(env, &setup.owner);

    assert_eq!(
        setup.rewards.try_add_pools_and_allow_bonus(
            &setup.owner,
            &vec![env, lp_b.address.clone()],
            &vec![env, setup.lp.address.clone()],
            &Vec::new(env),
        ),
        Err(Ok(ContractError::InvalidAsset))
    );
}

#[test]
fn existing_bonus_asset_cannot_become_a_pool() {
    let setup = Setup::new();
    let env = &setup.env;
    let (other_bonus, _) = deploy_token_contract(env, &setup.owner);

    assert_eq!(
        setup.rewards.try_add_pools_and_allow_bonus(
            &setup.owner,
            &vec![env, setup.bonus.address.clone()],
            &vec![env, other_bonus.address.clone()],
            &Vec::new(env),
        ),
        Err(Ok(ContractError::InvalidAsset))
    );
    assert_eq!(
        setup.rewards.get_pool_list(),
        vec![env, setup.lp.address.clone()]
    );
}

#[test]
fn get_pool_of_unknown_asset() {
    let setup = Setup::new();

    assert_eq!(
        setup
            .rewards
            .try_get_pool(&Address::generate(&setup.env)),
        Err(Ok(ContractError::NotFound))
    );
    assert_eq!(
        setup
            .rewards
            .try_view_rewards(&Address::generate(&setup.env), &setup.partner),
        Err(Ok(ContractError::NotFound))
    );
}

#[test]
fn pool_list_lives_in_persistent_storage() {
    let setup = Setup::new();
    let env = &setup.env;
    let (lp_b, _) = deploy_token_contract(env, &setup.owner);
    setup.rewards.add_pools_and_allow_bonus(
        &setup.owner,
        &vec![env, lp_b.address.clone()],
        &Vec::new(env),
        &Vec::new(env),
    );

    let stored: Option<Vec<Address>> = env.as_contract(&setup.rewards.address, || {
        env.storage().persistent().get(&DataKey::PoolList)
    });
    assert_eq!(
        stored,
        Some(vec![env, setup.lp.address.clone(), lp_b.address.clone()])
    );
    assert_eq!(
        setup.rewards.get_pool_list(),
        vec![env, setup.lp.address.clone(), lp_b.address.clone()]
    );
}
