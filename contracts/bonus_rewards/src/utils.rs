use soroban_sdk::{log, token, Address, Env, Vec};

use crate::{
    error::ContractError,
    storage::{get_authorizers, get_owner, get_responders, is_paused},
};

pub fn require_owner(env: &Env, sender: &Address) -> Result<(), ContractError> {
    if *sender != get_owner(env) {
        log!(env, "Bonus Rewards: caller is not the owner");
        return Err(ContractError::Unauthorized);
    }
    Ok(())
}

pub fn require_responder(env: &Env, sender: &Address) -> Result<(), ContractError> {
    if *sender != get_owner(env) && !get_responders(env).contains(sender) {
        log!(env, "Bonus Rewards: caller not responder");
        return Err(ContractError::Unauthorized);
    }
    Ok(())
}

/// The owner may fund any pair, everyone else has to be on the pair's authorizer list.
pub fn require_authorizer(
    env: &Env,
    sender: &Address,
    staked_asset: &Address,
    bonus_asset: &Address,
) -> Result<(), ContractError> {
    if *sender == get_owner(env) || get_authorizers(env, staked_asset, bonus_asset).contains(sender)
    {
        return Ok(());
    }
    log!(env, "Bonus Rewards: not authorized caller");
    Err(ContractError::Unauthorized)
}

pub fn require_not_paused(env: &Env) -> Result<(), ContractError> {
    if is_paused(env) {
        log!(env, "Bonus Rewards: paused");
        return Err(ContractError::Paused);
    }
    Ok(())
}

/// Pulls `amount` of `asset` from `from` into the contract.
pub fn transfer_in(
    env: &Env,
    asset: &Address,
    from: &Address,
    amount: i128,
) -> Result<(), ContractError> {
    let client = token::Client::new(env, asset);
    match client.try_transfer(from, &env.current_contract_address(), &amount) {
        Ok(Ok(())) => Ok(()),
        _ => {
            log!(
                env,
                "Bonus Rewards: Transfer in: transfer of {} from {} failed",
                amount,
                from
            );
            Err(ContractError::TransferFailed)
        }
    }
}

/// Sends `amount` of `asset` held by the contract to `to`.
pub fn transfer_out(
    env: &Env,
    asset: &Address,
    to: &Address,
    amount: i128,
) -> Result<(), ContractError> {
    let client = token::Client::new(env, asset);
    match client.try_transfer(&env.current_contract_address(), to, &amount) {
        Ok(Ok(())) => Ok(()),
        _ => {
            log!(
                env,
                "Bonus Rewards: Transfer out: transfer of {} to {} failed",
                amount,
                to
            );
            Err(ContractError::TransferFailed)
        }
    }
}

pub fn balance_of(env: &Env, asset: &Address, holder: &Address) -> i128 {
    token::Client::new(env, asset).balance(holder)
}

/// Pays the rewards queued by a settlement.
pub fn pay_rewards(
    env: &Env,
    to: &Address,
    payouts: &Vec<(Address, i128)>,
) -> Result<(), ContractError> {
    for (bonus_asset, amount) in payouts.iter() {
        transfer_out(env, &bonus_asset, to, amount)?;
        env.events().publish(("claim", "user"), to);
        env.events().publish(("claim", "asset"), &bonus_asset);
        env.events().publish(("claim", "amount"), amount);
    }
    Ok(())
}
