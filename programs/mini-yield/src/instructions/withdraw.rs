use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::{adapters, constants::*, errors::*, state::*, vault};

/// Withdraw assets by burning shares. Also serves `withdraw_all`.
///
/// Withdrawals stay open while the vault is paused.
/// `remaining_accounts`: the active adapter's accounts.
#[derive(Accounts)]
pub struct Withdraw<'info> {
    #[account(mut)]
    pub user: Signer<'info>,

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

    /// Created empty if missing so a holder-less withdraw reports NoBalance
    #[account(
        init_if_needed,
        payer = user,
        space = 8 + UserBalance::INIT_SPACE,
        seeds = [USER_BALANCE_SEED, asset_state.mint.as_ref(), user.key().as_ref()],
        bump
    )]
    pub user_balance: Account<'info, UserBalance>,

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

    /// User's asset token account (destination)
    #[account(
        mut,
        constraint = user_token_account.mint == asset_state.mint @ VaultError::InvalidMint,
        constraint = user_token_account.owner == user.key() @ VaultError::InvalidOwner,
    )]
    pub user_token_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

/// `None` redeems every share the user holds
pub fn handler<'info>(
    ctx: Context<'_, '_, 'info, 'info, Withdraw<'info>>,
    amount: Option<u64>,
) -> Result<()> {
    let accounts = &mut *ctx.accounts;

    if !accounts.user_balance.is_initialized() {
        let balance = UserBalance::new(
            accounts.user.key(),
            accounts.asset_state.mint,
            ctx.bumps.user_balance,
        );
        accounts.user_balance.set_inner(balance);
    }
    require!(accounts.user_balance.shares > 0, VaultError::NoBalance);

    let env = adapters::CpiEnv {
        mint: accounts.asset_state.mint,
        vault_authority: accounts.vault_authority.to_account_info(),
        vault_custody: accounts.vault_custody.to_account_info(),
        token_program: accounts.token_program.to_account_info(),
        authority_bump: accounts.config.authority_bump,
    };
    let (handle, _) = accounts.asset_state.active_protocol()?;
    let (mut adapter, _) = adapters::load_adapter(handle, ctx.remaining_accounts, &env)?;
    let mut custody = adapters::TokenCustody::new(
        accounts.user.to_account_info(),
        accounts.user_token_account.to_account_info(),
        env,
    );

    let timestamp = Clock::get()?.unix_timestamp;
    let event = match amount {
        Some(amount) => vault::withdraw(
            &mut accounts.asset_state,
            &mut accounts.user_balance,
            adapter.as_mut(),
            &mut custody,
            amount,
            timestamp,
        )?,
        None => vault::withdraw_all(
            &mut accounts.asset_state,
            &mut accounts.user_balance,
            adapter.as_mut(),
            &mut custody,
            timestamp,
        )?,
    };

    emit!(event);

    Ok(())
}
