use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::{adapters, constants::*, state::*, vault};

/// Move an asset's funds to another registered adapter
///
/// `remaining_accounts`: accounts of the active adapter, then of the new one.
#[derive(Accounts)]
pub struct SwitchProtocol<'info> {
    pub owner: Signer<'info>,

    #[account(
        seeds = [CONFIG_SEED],
        bump = config.bump,
    )]
    pub config: Account<'info, VaultConfig>,

    #[account(
        mut,
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
        mut,
        associated_token::mint = asset_state.mint,
        associated_token::authority = vault_authority,
    )]
    pub vault_custody: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

pub fn handler<'info>(
    ctx: Context<'_, '_, 'info, 'info, SwitchProtocol<'info>>,
    new_index: u8,
) -> Result<()> {
    let accounts = &mut *ctx.accounts;

    // CHECKS: fail on bad ids before loading any adapter
    accounts.config.require_owner(&accounts.owner.key())?;
    accounts.config.require_not_paused()?;
    accounts.asset_state.check_switch(new_index)?;

    let env = adapters::CpiEnv {
        mint: accounts.asset_state.mint,
        vault_authority: accounts.vault_authority.to_account_info(),
        vault_custody: accounts.vault_custody.to_account_info(),
        token_program: accounts.token_program.to_account_info(),
        authority_bump: accounts.config.authority_bump,
    };

    let (old_handle, _) = accounts.asset_state.active_protocol()?;
    let old_handle = old_handle.clone();
    let new_handle = accounts.asset_state.protocol(new_index)?.clone();

    let (mut from, used) = adapters::load_adapter(&old_handle, ctx.remaining_accounts, &env)?;
    let (mut to, _) = adapters::load_adapter(&new_handle, &ctx.remaining_accounts[used..], &env)?;

    let event = vault::switch_protocol(
        &accounts.config,
        &mut accounts.asset_state,
        &accounts.owner.key(),
        from.as_mut(),
        to.as_mut(),
        new_index,
        Clock::get()?.unix_timestamp,
    )?;

    emit!(event);

    Ok(())
}
