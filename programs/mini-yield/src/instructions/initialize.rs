use anchor_lang::prelude::*;

use crate::{constants::*, events::*, state::*};

/// Create the global vault config; the signer becomes owner
#[derive(Accounts)]
pub struct Initialize<'info> {
    /// Future owner of the vault
    /// Security: Must be signer, stored in state
    #[account(mut)]
    pub owner: Signer<'info>,

    /// Vault config PDA
    #[account(
        init,
        payer = owner,
        space = 8 + VaultConfig::INIT_SPACE,
        seeds = [CONFIG_SEED],
        bump
    )]
    pub config: Account<'info, VaultConfig>,

    /// Vault authority PDA - owns custody and reserve token accounts
    /// CHECK: PDA used as token authority, validated by seeds
    #[account(
        seeds = [VAULT_AUTHORITY_SEED],
        bump
    )]
    pub vault_authority: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<Initialize>) -> Result<()> {
    let owner = ctx.accounts.owner.key();

    // EFFECTS: Initialize config in the Active state
    ctx.accounts.config.set_inner(VaultConfig::new(
        owner,
        ctx.bumps.config,
        ctx.bumps.vault_authority,
    ));

    emit!(VaultInitialized {
        owner,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
