// Vault controller: orchestrates the share ledger, the protocol registry and
// adapter fund movements. Handlers in `instructions` load accounts and call in here;
// tests drive the same functions with in-memory adapters.

use anchor_lang::prelude::*;

use crate::{
    adapters::{AssetCustody, YieldAdapter},
    errors::VaultError,
    events::*,
    state::{AdapterHandle, AssetState, UserBalance, VaultConfig},
};

/// Result of a registered adapter lookup
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct ActiveProtocol {
    pub adapter: Pubkey,
    pub index: u8,
}

/// Make sure `adapter` is the asset's active adapter
fn ensure_active(asset: &AssetState, adapter: &dyn YieldAdapter) -> Result<()> {
    let (handle, _) = asset.active_protocol()?;
    ensure_matches(asset, handle, adapter)
}

fn ensure_matches(asset: &AssetState, handle: &AdapterHandle, adapter: &dyn YieldAdapter) -> Result<()> {
    require_keys_eq!(adapter.target(), handle.target, VaultError::InvalidAdapter);
    require_keys_eq!(adapter.asset(), asset.mint, VaultError::InvalidMint);
    Ok(())
}

/// Checks-effects-interactions with rollback
///
/// Ledger effects are committed under the asset lock before any external call.
/// If an interaction fails the ledger is restored, so no partial state is observable.
fn transact<T>(
    asset: &mut AssetState,
    balance: &mut UserBalance,
    effects: impl FnOnce(&mut AssetState, &mut UserBalance) -> Result<()>,
    interactions: impl FnOnce() -> Result<T>,
) -> Result<T> {
    asset.enter()?;
    let snapshot = (asset.clone(), balance.clone());

    let outcome = effects(&mut *asset, &mut *balance).and_then(|_| interactions());
    if outcome.is_err() {
        *asset = snapshot.0;
        *balance = snapshot.1;
    }
    asset.exit();
    outcome
}

// =============================================================================
// Admin
// =============================================================================

pub fn add_protocol(
    config: &mut VaultConfig,
    asset: &mut AssetState,
    caller: &Pubkey,
    handle: AdapterHandle,
    timestamp: i64,
) -> Result<ProtocolAdded> {
    config.require_owner(caller)?;
    asset.ensure_can_register(&handle)?;
    config.ensure_can_list(&asset.mint)?;

    let adapter = handle.target;
    let index = asset.add_protocol(handle)?;
    config.list_token(asset.mint)?;

    msg!("Protocol {} registered for {} at index {}", adapter, asset.mint, index);

    Ok(ProtocolAdded {
        asset: asset.mint,
        adapter,
        index,
        timestamp,
    })
}

/// Move the asset's whole balance from the active adapter to `new_index`
///
/// Share counts are untouched. Blocked while paused.
pub fn switch_protocol(
    config: &VaultConfig,
    asset: &mut AssetState,
    caller: &Pubkey,
    from: &mut dyn YieldAdapter,
    to: &mut dyn YieldAdapter,
    new_index: u8,
    timestamp: i64,
) -> Result<ProtocolSwitched> {
    config.require_owner(caller)?;
    config.require_not_paused()?;
    asset.check_switch(new_index)?;

    let old_index = asset.active_index;
    ensure_matches(asset, asset.protocol(old_index)?, from)?;
    ensure_matches(asset, asset.protocol(new_index)?, to)?;

    let balance = from.current_balance()?;

    asset.enter()?;
    asset.active_index = new_index;

    let moved = (|| -> Result<u64> {
        if balance == 0 {
            return Ok(0);
        }
        let received = from.withdraw_from(balance)?;
        require!(received == balance, VaultError::AdapterFailure);
        to.deposit_into(received)?;
        Ok(received)
    })();

    if moved.is_err() {
        asset.active_index = old_index;
    }
    asset.exit();
    let moved = moved?;

    msg!("Switched {} to protocol {} moving {}", asset.mint, new_index, moved);

    Ok(ProtocolSwitched {
        asset: asset.mint,
        old_adapter: from.target(),
        new_adapter: to.target(),
        amount_moved: moved,
        timestamp,
    })
}

pub fn pause(config: &mut VaultConfig, caller: &Pubkey, timestamp: i64) -> Result<Paused> {
    config.pause(caller)?;
    Ok(Paused {
        owner: *caller,
        timestamp,
    })
}

pub fn unpause(config: &mut VaultConfig, caller: &Pubkey, timestamp: i64) -> Result<Unpaused> {
    config.unpause(caller)?;
    Ok(Unpaused {
        owner: *caller,
        timestamp,
    })
}

pub fn transfer_ownership(
    config: &mut VaultConfig,
    caller: &Pubkey,
    new_owner: Pubkey,
    timestamp: i64,
) -> Result<OwnershipTransferred> {
    let previous_owner = config.transfer_ownership(caller, new_owner)?;
    Ok(OwnershipTransferred {
        previous_owner,
        new_owner,
        timestamp,
    })
}

// =============================================================================
// User operations
// =============================================================================

/// Deposit `amount` for `balance.user`, minting shares priced before the deposit lands
pub fn deposit(
    config: &VaultConfig,
    asset: &mut AssetState,
    balance: &mut UserBalance,
    adapter: &mut dyn YieldAdapter,
    custody: &mut dyn AssetCustody,
    amount: u64,
    timestamp: i64,
) -> Result<Deposited> {
    // CHECKS
    require!(asset.is_supported(), VaultError::UnsupportedAsset);
    require!(amount > 0, VaultError::InvalidAmount);
    config.require_not_paused()?;
    ensure_active(asset, adapter)?;

    let total_value = adapter.current_balance()?;
    let shares = asset.calculate_shares(amount, total_value)?;
    require!(shares > 0, VaultError::ZeroShares);

    // EFFECTS then INTERACTIONS
    transact(
        asset,
        balance,
        |asset, balance| asset.record_deposit(balance, amount, shares),
        || {
            custody.collect(amount)?;
            adapter.deposit_into(amount)
        },
    )?;

    Ok(Deposited {
        user: balance.user,
        asset: asset.mint,
        amount,
        shares_minted: shares,
        timestamp,
    })
}

/// Pay out exactly `amount`, burning ceil(amount * total_shares / total_value) shares
///
/// Allowed while paused.
pub fn withdraw(
    asset: &mut AssetState,
    balance: &mut UserBalance,
    adapter: &mut dyn YieldAdapter,
    custody: &mut dyn AssetCustody,
    amount: u64,
    timestamp: i64,
) -> Result<Withdrawn> {
    require!(asset.is_supported(), VaultError::UnsupportedAsset);
    require!(amount > 0, VaultError::InvalidAmount);
    require!(balance.shares > 0, VaultError::NoBalance);
    ensure_active(asset, adapter)?;

    let total_value = adapter.current_balance()?;
    let shares = asset.shares_for_withdrawal(amount, total_value)?;
    require!(shares <= balance.shares, VaultError::InsufficientShares);

    settle_withdrawal(asset, balance, adapter, custody, amount, shares)?;

    Ok(Withdrawn {
        user: balance.user,
        asset: asset.mint,
        amount,
        shares_burned: shares,
        timestamp,
    })
}

/// Redeem every share the user holds at floor value
///
/// The last holder receives the pool's whole remaining value, dust included.
pub fn withdraw_all(
    asset: &mut AssetState,
    balance: &mut UserBalance,
    adapter: &mut dyn YieldAdapter,
    custody: &mut dyn AssetCustody,
    timestamp: i64,
) -> Result<Withdrawn> {
    require!(asset.is_supported(), VaultError::UnsupportedAsset);
    require!(balance.shares > 0, VaultError::NoBalance);
    ensure_active(asset, adapter)?;

    let shares = balance.shares;
    let total_value = adapter.current_balance()?;
    let amount = asset.redeem_value(shares, total_value)?;

    settle_withdrawal(asset, balance, adapter, custody, amount, shares)?;

    Ok(Withdrawn {
        user: balance.user,
        asset: asset.mint,
        amount,
        shares_burned: shares,
        timestamp,
    })
}

fn settle_withdrawal(
    asset: &mut AssetState,
    balance: &mut UserBalance,
    adapter: &mut dyn YieldAdapter,
    custody: &mut dyn AssetCustody,
    amount: u64,
    shares: u64,
) -> Result<()> {
    transact(
        asset,
        balance,
        |asset, balance| asset.record_withdrawal(balance, shares),
        || {
            if amount == 0 {
                return Ok(());
            }
            // Partial returns fail the whole withdrawal
            let received = adapter.withdraw_from(amount)?;
            require!(received == amount, VaultError::AdapterFailure);
            custody.pay_out(amount)
        },
    )
}

// =============================================================================
// Queries
// =============================================================================

/// Current value of the asset's pool as reported by its active adapter
pub fn total_value(asset: &AssetState, adapter: &dyn YieldAdapter) -> Result<u64> {
    ensure_active(asset, adapter)?;
    adapter.current_balance()
}

pub fn calculate_shares(asset: &AssetState, adapter: &dyn YieldAdapter, amount: u64) -> Result<u64> {
    require!(asset.is_supported(), VaultError::UnsupportedAsset);
    require!(amount > 0, VaultError::InvalidAmount);

    asset.calculate_shares(amount, total_value(asset, adapter)?)
}

pub fn user_total_value(asset: &AssetState, balance: &UserBalance, adapter: &dyn YieldAdapter) -> Result<u64> {
    require_keys_eq!(balance.mint, asset.mint, VaultError::InvalidMint);
    if balance.shares == 0 {
        return Ok(0);
    }

    asset.redeem_value(balance.shares, total_value(asset, adapter)?)
}

pub fn supported_tokens(config: &VaultConfig) -> &[Pubkey] {
    &config.supported_tokens
}

pub fn protocol_count(asset: &AssetState) -> u8 {
    asset.protocol_count() as u8
}

pub fn active_protocol(asset: &AssetState) -> Result<ActiveProtocol> {
    let (handle, index) = asset.active_protocol()?;
    Ok(ActiveProtocol {
        adapter: handle.target,
        index,
    })
}

/// (shares, total_deposited) for one user
pub fn user_balances(balance: &UserBalance) -> (u64, u64) {
    (balance.shares, balance.total_deposited)
}
