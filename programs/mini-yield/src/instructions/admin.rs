use anchor_lang::prelude::*;

use crate::{constants::*, state::*, vault};

/// Owner-only lifecycle and ownership management
#[derive(Accounts)]
pub struct ConfigAdmin<'info> {
    /// Security: checked against config.owner by the guard, not by constraint,
    /// so a wrong signer surfaces as NotOwner
    pub owner: Signer<'info>,

    #[account(
        mut,
        seeds = [CONFIG_SEED],
        bump = config.bump,
    )]
    pub config: Account<'info, VaultConfig>,
}

pub fn pause_handler(ctx: Context<ConfigAdmin>) -> Result<()> {
    let owner = ctx.accounts.owner.key();
    let event = vault::pause(&mut ctx.accounts.config, &owner, Clock::get()?.unix_timestamp)?;

    msg!("Vault paused");
    emit!(event);
    Ok(())
}

pub fn unpause_handler(ctx: Context<ConfigAdmin>) -> Result<()> {
    let owner = ctx.accounts.owner.key();
    let event = vault::unpause(&mut ctx.accounts.config, &owner, Clock::get()?.unix_timestamp)?;

    msg!("Vault unpaused");
    emit!(event);
    Ok(())
}

pub fn transfer_ownership_handler(ctx: Context<ConfigAdmin>, new_owner: Pubkey) -> Result<()> {
    let owner = ctx.accounts.owner.key();
    let event = vault::transfer_ownership(
        &mut ctx.accounts.config,
        &owner,
        new_owner,
        Clock::get()?.unix_timestamp,
    )?;

    emit!(event);
    Ok(())
}
