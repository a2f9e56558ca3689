use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::AssociatedToken,
    token::{Mint, Token, TokenAccount},
};

use crate::{adapters, constants::*, errors::*, state::*, vault};

/// Append an adapter to an asset's registry
///
/// `remaining_accounts[0]` must be the handle's target (reserve token account
/// or adapter program) so it can be validated at registration.
#[derive(Accounts)]
pub struct AddProtocol<'info> {
    /// Vault owner - only they can manage protocols
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(
        mut,
        seeds = [CONFIG_SEED],
        bump = config.bump,
    )]
    pub config: Account<'info, VaultConfig>,

    pub asset_mint: Account<'info, Mint>,

    /// Asset ledger PDA
    /// Security: Initialized on the first add_protocol for this mint
    #[account(
        init_if_needed,
        payer = owner,
        space = 8 + AssetState::INIT_SPACE,
        seeds = [ASSET_SEED, asset_mint.key().as_ref()],
        bump
    )]
    pub asset_state: Account<'info, AssetState>,

    /// CHECK: PDA used as token authority, validated by seeds
    #[account(
        seeds = [VAULT_AUTHORITY_SEED],
        bump = config.authority_bump,
    )]
    pub vault_authority: UncheckedAccount<'info>,

    /// Vault custody for this mint
    #[account(
        init_if_needed,
        payer = owner,
        associated_token::mint = asset_mint,
        associated_token::authority = vault_authority,
    )]
    pub vault_custody: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub system_program: Program<'info, System>,
}

pub fn handler(
    ctx: Context<AddProtocol>,
    kind: AdapterKind,
    target: Pubkey,
    position: Pubkey,
) -> Result<()> {
    let handle = AdapterHandle::new(kind, target, position);
    let mint = ctx.accounts.asset_mint.key();

    // CHECKS: Validate the adapter account before touching state
    let env = adapters::CpiEnv {
        mint,
        vault_authority: ctx.accounts.vault_authority.to_account_info(),
        vault_custody: ctx.accounts.vault_custody.to_account_info(),
        token_program: ctx.accounts.token_program.to_account_info(),
        authority_bump: ctx.accounts.config.authority_bump,
    };
    let target_account = ctx
        .remaining_accounts
        .first()
        .ok_or(VaultError::InvalidAdapter)?;
    adapters::validate_registration(&handle, target_account, &env)?;

    let accounts = &mut *ctx.accounts;

    // Initialize the ledger on first registration
    if accounts.asset_state.mint == Pubkey::default() {
        accounts
            .asset_state
            .set_inner(AssetState::new(mint, ctx.bumps.asset_state));
    }

    // EFFECTS
    let event = vault::add_protocol(
        &mut accounts.config,
        &mut accounts.asset_state,
        &accounts.owner.key(),
        handle,
        Clock::get()?.unix_timestamp,
    )?;

    emit!(event);

    Ok(())
}
