use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::{adapters, constants::*, errors::VaultError, state::*, vault};

// Read-only instructions. Values come back through Anchor return data,
// so clients read them by simulating the transaction.

#[derive(Accounts)]
pub struct ConfigView<'info> {
    #[account(
        seeds = [CONFIG_SEED],
        bump = config.bump,
    )]
    pub config: Account<'info, VaultConfig>,
}

/// `remaining_accounts`: the active adapter's accounts, where a balance is needed
#[derive(Accounts)]
pub struct AssetView<'info> {
    #[account(
        seeds = [CONFIG_SEED],
        bump = config.bump,
    )]
    pub config: Account<'info, VaultConfig>,

    #[account(
        seeds = [ASSET_SEED, asset_state.mint.as_ref()],
        bump = asset_state.bump,
    )]
    pub asset_state: Account<'info, AssetState>,

    /// CHECK: PDA used as token authority, validated by seeds
    #[account(
        seeds = [VAULT_AUTHORITY_SEED],
        bump = config.authority_bump,
    )]
    pub vault_authority: UncheckedAccount<'info>,

    #[account(
        associated_token::mint = asset_state.mint,
        associated_token::authority = vault_authority,
    )]
    pub vault_custody: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

/// `user_balance` may not exist yet; a user who never deposited is worth 0
#[derive(Accounts)]
#[instruction(user: Pubkey)]
pub struct UserView<'info> {
    #[account(
        seeds = [CONFIG_SEED],
        bump = config.bump,
    )]
    pub config: Account<'info, VaultConfig>,

    #[account(
        seeds = [ASSET_SEED, asset_state.mint.as_ref()],
        bump = asset_state.bump,
    )]
    pub asset_state: Account<'info, AssetState>,

    /// CHECK: address validated by seeds, contents decoded by `decode_balance`
    #[account(
        seeds = [USER_BALANCE_SEED, asset_state.mint.as_ref(), user.as_ref()],
        bump
    )]
    pub user_balance: UncheckedAccount<'info>,

    /// CHECK: PDA used as token authority, validated by seeds
    #[account(
        seeds = [VAULT_AUTHORITY_SEED],
        bump = config.authority_bump,
    )]
    pub vault_authority: UncheckedAccount<'info>,

    #[account(
        associated_token::mint = asset_state.mint,
        associated_token::authority = vault_authority,
    )]
    pub vault_custody: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

/// Load the asset's active adapter from `remaining_accounts`
fn active_adapter<'info>(
    config: &VaultConfig,
    asset_state: &AssetState,
    vault_authority: &UncheckedAccount<'info>,
    vault_custody: &Account<'info, TokenAccount>,
    token_program: &Program<'info, Token>,
    remaining_accounts: &[AccountInfo<'info>],
) -> Result<Box<dyn adapters::YieldAdapter + 'info>> {
    let env = adapters::CpiEnv {
        mint: asset_state.mint,
        vault_authority: vault_authority.to_account_info(),
        vault_custody: vault_custody.to_account_info(),
        token_program: token_program.to_account_info(),
        authority_bump: config.authority_bump,
    };
    let (handle, _) = asset_state.active_protocol()?;
    let (adapter, _) = adapters::load_adapter(handle, remaining_accounts, &env)?;
    Ok(adapter)
}

pub fn get_supported_tokens(ctx: Context<ConfigView>) -> Result<Vec<Pubkey>> {
    Ok(vault::supported_tokens(&ctx.accounts.config).to_vec())
}

pub fn get_protocol_count(ctx: Context<AssetView>) -> Result<u8> {
    Ok(vault::protocol_count(&ctx.accounts.asset_state))
}

pub fn get_active_protocol(ctx: Context<AssetView>) -> Result<vault::ActiveProtocol> {
    vault::active_protocol(&ctx.accounts.asset_state)
}

pub fn calculate_shares<'info>(
    ctx: Context<'_, '_, 'info, 'info, AssetView<'info>>,
    amount: u64,
) -> Result<u64> {
    let accounts = &ctx.accounts;
    let adapter = active_adapter(
        &accounts.config,
        &accounts.asset_state,
        &accounts.vault_authority,
        &accounts.vault_custody,
        &accounts.token_program,
        ctx.remaining_accounts,
    )?;
    vault::calculate_shares(&accounts.asset_state, adapter.as_ref(), amount)
}

pub fn get_user_total_value<'info>(
    ctx: Context<'_, '_, 'info, 'info, UserView<'info>>,
    user: Pubkey,
) -> Result<u64> {
    let accounts = &ctx.accounts;
    let info = accounts.user_balance.to_account_info();
    let balance = {
        let data = info.try_borrow_data()?;
        decode_balance(info.owner, &data)?
    };
    let Some(balance) = balance else {
        return Ok(0);
    };
    require_keys_eq!(balance.user, user, VaultError::InvalidOwner);

    let adapter = active_adapter(
        &accounts.config,
        &accounts.asset_state,
        &accounts.vault_authority,
        &accounts.vault_custody,
        &accounts.token_program,
        ctx.remaining_accounts,
    )?;
    vault::user_total_value(&accounts.asset_state, &balance, adapter.as_ref())
}

/// `None` for an address that was never initialized
fn decode_balance(owner: &Pubkey, data: &[u8]) -> Result<Option<UserBalance>> {
    if data.is_empty() {
        return Ok(None);
    }
    require_keys_eq!(*owner, crate::ID, VaultError::InvalidOwner);
    Ok(Some(UserBalance::try_deserialize(&mut &data[..])?))
}
