use anchor_lang::prelude::*;

use super::{read_token_account, CpiEnv, YieldAdapter};
use crate::{errors::VaultError, state::AdapterHandle};

/// Vault-authority-owned token account. Yield arrives as transfers into it.
pub struct ReserveAdapter<'info> {
    reserve: AccountInfo<'info>,
    env: CpiEnv<'info>,
}

impl<'info> ReserveAdapter<'info> {
    pub fn load(handle: &AdapterHandle, accounts: &[AccountInfo<'info>], env: CpiEnv<'info>) -> Result<Self> {
        let reserve = accounts.first().ok_or(VaultError::InvalidAdapter)?;
        require_keys_eq!(*reserve.key, handle.target, VaultError::InvalidAdapter);

        let state = read_token_account(reserve)?;
        require_keys_eq!(state.mint, env.mint, VaultError::InvalidMint);
        require_keys_eq!(state.owner, *env.vault_authority.key, VaultError::InvalidAdapter);

        Ok(Self {
            reserve: reserve.clone(),
            env,
        })
    }
}

impl<'info> YieldAdapter for ReserveAdapter<'info> {
    fn target(&self) -> Pubkey {
        *self.reserve.key
    }

    fn asset(&self) -> Pubkey {
        self.env.mint
    }

    fn deposit_into(&mut self, amount: u64) -> Result<()> {
        self.env
            .signed_transfer(&self.env.vault_custody, &self.reserve, amount)
    }

    fn withdraw_from(&mut self, amount: u64) -> Result<u64> {
        let available = self.current_balance()?;
        require!(available >= amount, VaultError::AdapterFailure);

        self.env
            .signed_transfer(&self.reserve, &self.env.vault_custody, amount)?;
        Ok(amount)
    }

    fn current_balance(&self) -> Result<u64> {
        Ok(read_token_account(&self.reserve)?.amount)
    }
}
