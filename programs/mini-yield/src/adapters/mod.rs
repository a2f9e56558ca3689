// Adapter capability and the account-backed implementations the program wires in

use anchor_lang::prelude::*;
use anchor_spl::token::{self, TokenAccount, Transfer};

use crate::{
    constants::VAULT_AUTHORITY_SEED,
    errors::VaultError,
    state::{AdapterHandle, AdapterKind},
};

pub mod custody;
pub mod program;
pub mod reserve;

pub use custody::*;
pub use program::*;
pub use reserve::*;

/// One yield-bearing destination for a single asset
///
/// The ledger only ever talks to adapters through this trait; concrete
/// backends are chosen from the registered `AdapterHandle`.
pub trait YieldAdapter {
    /// Key stored as `AdapterHandle::target` for this adapter
    fn target(&self) -> Pubkey;

    /// Mint of the asset this adapter serves
    fn asset(&self) -> Pubkey;

    /// Move `amount` from vault custody into the adapter
    fn deposit_into(&mut self, amount: u64) -> Result<()>;

    /// Return up to `amount` to vault custody, reporting what actually arrived
    fn withdraw_from(&mut self, amount: u64) -> Result<u64>;

    /// Value held for the vault, accrued yield included
    fn current_balance(&self) -> Result<u64>;
}

/// Movement of the asset between a user and vault custody
pub trait AssetCustody {
    /// Pull `amount` from the user into custody
    fn collect(&mut self, amount: u64) -> Result<()>;

    /// Send `amount` from custody to the user
    fn pay_out(&mut self, amount: u64) -> Result<()>;
}

/// Accounts every on-chain adapter needs to move funds in and out of custody
#[derive(Clone)]
pub struct CpiEnv<'info> {
    pub mint: Pubkey,
    pub vault_authority: AccountInfo<'info>,
    pub vault_custody: AccountInfo<'info>,
    pub token_program: AccountInfo<'info>,
    pub authority_bump: u8,
}

impl<'info> CpiEnv<'info> {
    /// SPL transfer signed by the vault authority PDA
    pub fn signed_transfer(
        &self,
        from: &AccountInfo<'info>,
        to: &AccountInfo<'info>,
        amount: u64,
    ) -> Result<()> {
        let authority_bump = self.authority_bump;
        let authority_seeds: &[&[u8]] = &[VAULT_AUTHORITY_SEED, &[authority_bump]];
        let signer_seeds = &[&authority_seeds[..]];

        let transfer_ctx = CpiContext::new_with_signer(
            self.token_program.clone(),
            Transfer {
                from: from.clone(),
                to: to.clone(),
                authority: self.vault_authority.clone(),
            },
            signer_seeds,
        );
        token::transfer(transfer_ctx, amount)
    }

    pub fn custody_amount(&self) -> Result<u64> {
        Ok(read_token_account(&self.vault_custody)?.amount)
    }
}

/// Deserialize an SPL token account, rejecting accounts the token program does not own
pub fn read_token_account(info: &AccountInfo) -> Result<TokenAccount> {
    require_keys_eq!(*info.owner, token::ID, VaultError::InvalidAdapter);
    let data = info.try_borrow_data()?;
    let account = TokenAccount::try_deserialize(&mut &data[..])?;
    Ok(account)
}

/// Build the adapter for `handle` from the head of `accounts`
///
/// Returns the adapter and how many accounts it consumed, so callers can
/// load a second adapter from the rest of the slice.
pub fn load_adapter<'info>(
    handle: &AdapterHandle,
    accounts: &[AccountInfo<'info>],
    env: &CpiEnv<'info>,
) -> Result<(Box<dyn YieldAdapter + 'info>, usize)> {
    let count = handle.account_count();
    require!(accounts.len() >= count, VaultError::InvalidAdapter);
    let accounts = &accounts[..count];

    let adapter: Box<dyn YieldAdapter + 'info> = match handle.kind {
        AdapterKind::Reserve => Box::new(ReserveAdapter::load(handle, accounts, env.clone())?),
        AdapterKind::Program => Box::new(ProgramAdapter::load(handle, accounts, env.clone())?),
    };
    Ok((adapter, count))
}

/// Registration-time checks on the account named by a new handle
pub fn validate_registration(handle: &AdapterHandle, target: &AccountInfo, env: &CpiEnv) -> Result<()> {
    require_keys_eq!(*target.key, handle.target, VaultError::InvalidAdapter);

    match handle.kind {
        AdapterKind::Reserve => {
            let reserve = read_token_account(target)?;
            require_keys_eq!(reserve.mint, env.mint, VaultError::InvalidMint);
            require_keys_eq!(reserve.owner, *env.vault_authority.key, VaultError::InvalidAdapter);
            require_keys_neq!(*target.key, *env.vault_custody.key, VaultError::InvalidAdapter);
        }
        AdapterKind::Program => {
            require!(target.executable, VaultError::InvalidAdapter);
        }
    }
    Ok(())
}
