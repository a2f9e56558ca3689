// MiniYield - single-asset yield-routing vault on Solana
// Security: Checks-effects-interactions with a per-asset lock; owner-gated administration
// Architecture: share ledger + per-asset adapter registry, one active adapter holding all funds

use anchor_lang::prelude::*;

pub mod adapters;
pub mod constants;
pub mod errors;
pub mod events;
pub mod instructions;
pub mod state;
pub mod vault;

use instructions::*;

declare_id!("63JbdXkZ49dqGkbpTu4x9ECRDCmYnA7eSGfkPn84rFcY");

#[program]
pub mod mini_yield {
    use super::*;

    /// Create the vault config; the signer becomes owner
    pub fn initialize(ctx: Context<Initialize>) -> Result<()> {
        instructions::initialize::handler(ctx)
    }

    /// Register an adapter for a token
    ///
    /// Security considerations:
    /// - Owner-only
    /// - Validates the adapter account (reserve mint/owner, or executable program)
    /// - Enforces registry size limits
    /// - First adapter lists the token and becomes active
    pub fn add_protocol(
        ctx: Context<AddProtocol>,
        kind: state::AdapterKind,
        target: Pubkey,
        position: Pubkey,
    ) -> Result<()> {
        instructions::add_protocol::handler(ctx, kind, target, position)
    }

    /// Move a token's entire balance to another registered adapter
    ///
    /// Security considerations:
    /// - Owner-only, rejected while paused
    /// - All-or-nothing: the active index only changes if both legs succeed
    pub fn switch_protocol<'info>(
        ctx: Context<'_, '_, 'info, 'info, SwitchProtocol<'info>>,
        new_index: u8,
    ) -> Result<()> {
        instructions::switch_protocol::handler(ctx, new_index)
    }

    /// Deposit tokens and receive shares
    ///
    /// Security considerations:
    /// - Validates user token account (mint, owner)
    /// - Shares priced before the deposit reaches the adapter, rounded down
    /// - Rejected while paused
    pub fn deposit<'info>(
        ctx: Context<'_, '_, 'info, 'info, Deposit<'info>>,
        amount: u64,
    ) -> Result<()> {
        instructions::deposit::handler(ctx, amount)
    }

    /// Withdraw an exact token amount, burning shares rounded up
    pub fn withdraw<'info>(
        ctx: Context<'_, '_, 'info, 'info, Withdraw<'info>>,
        amount: u64,
    ) -> Result<()> {
        instructions::withdraw::handler(ctx, Some(amount))
    }

    /// Redeem every share the caller holds
    pub fn withdraw_all<'info>(ctx: Context<'_, '_, 'info, 'info, Withdraw<'info>>) -> Result<()> {
        instructions::withdraw::handler(ctx, None)
    }

    pub fn pause(ctx: Context<ConfigAdmin>) -> Result<()> {
        instructions::admin::pause_handler(ctx)
    }

    pub fn unpause(ctx: Context<ConfigAdmin>) -> Result<()> {
        instructions::admin::unpause_handler(ctx)
    }

    pub fn transfer_ownership(ctx: Context<ConfigAdmin>, new_owner: Pubkey) -> Result<()> {
        instructions::admin::transfer_ownership_handler(ctx, new_owner)
    }

    pub fn get_supported_tokens(ctx: Context<ConfigView>) -> Result<Vec<Pubkey>> {
        instructions::views::get_supported_tokens(ctx)
    }

    pub fn get_protocol_count(ctx: Context<AssetView>) -> Result<u8> {
        instructions::views::get_protocol_count(ctx)
    }

    pub fn get_active_protocol(ctx: Context<AssetView>) -> Result<vault::ActiveProtocol> {
        instructions::views::get_active_protocol(ctx)
    }

    pub fn calculate_shares<'info>(
        ctx: Context<'_, '_, 'info, 'info, AssetView<'info>>,
        amount: u64,
    ) -> Result<u64> {
        instructions::views::calculate_shares(ctx, amount)
    }

    /// Current redeemable value of `user`'s shares; 0 if they never deposited
    pub fn get_user_total_value<'info>(
        ctx: Context<'_, '_, 'info, 'info, UserView<'info>>,
        user: Pubkey,
    ) -> Result<u64> {
        instructions::views::get_user_total_value(ctx, user)
    }
}
