use anchor_lang::prelude::*;
use anchor_lang::solana_program::{
    instruction::{AccountMeta, Instruction},
    program::invoke_signed,
};

use super::{CpiEnv, YieldAdapter};
use crate::{
    constants::{
        ADAPTER_DEPOSIT_DISCRIMINATOR, ADAPTER_POSITION_DISCRIMINATOR,
        ADAPTER_WITHDRAW_DISCRIMINATOR, VAULT_AUTHORITY_SEED,
    },
    errors::VaultError,
    state::AdapterHandle,
};

/// Balance record an adapter program keeps for the vault
///
/// Stored after the 8-byte `account:AdapterPosition` discriminator.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct AdapterPosition {
    pub authority: Pubkey,
    pub mint: Pubkey,
    pub balance: u64,
}

impl AdapterPosition {
    pub fn unpack(data: &[u8]) -> Result<Self> {
        require!(data.len() >= 8, VaultError::InvalidAdapter);
        require!(
            data[..8] == ADAPTER_POSITION_DISCRIMINATOR,
            VaultError::InvalidAdapter
        );
        AdapterPosition::deserialize(&mut &data[8..]).map_err(|_| error!(VaultError::InvalidAdapter))
    }
}

/// External yield program reached by CPI
///
/// Interface: `deposit(u64)` / `withdraw(u64)` taking
/// `[vault_authority (signer), vault_custody (w), position (w), adapter_token_account (w), token_program]`.
pub struct ProgramAdapter<'info> {
    program: AccountInfo<'info>,
    position: AccountInfo<'info>,
    adapter_token_account: AccountInfo<'info>,
    env: CpiEnv<'info>,
}

impl<'info> ProgramAdapter<'info> {
    pub fn load(handle: &AdapterHandle, accounts: &[AccountInfo<'info>], env: CpiEnv<'info>) -> Result<Self> {
        let [program, position, adapter_token_account] = accounts else {
            return err!(VaultError::InvalidAdapter);
        };

        require_keys_eq!(*program.key, handle.target, VaultError::InvalidAdapter);
        require!(program.executable, VaultError::InvalidAdapter);
        require_keys_eq!(*position.key, handle.position, VaultError::InvalidAdapter);
        require_keys_eq!(*position.owner, handle.target, VaultError::InvalidAdapter);

        Ok(Self {
            program: program.clone(),
            position: position.clone(),
            adapter_token_account: adapter_token_account.clone(),
            env,
        })
    }

    fn invoke(&self, discriminator: [u8; 8], amount: u64) -> Result<()> {
        let mut data = Vec::with_capacity(16);
        data.extend_from_slice(&discriminator);
        data.extend_from_slice(&amount.to_le_bytes());

        let ix = Instruction {
            program_id: *self.program.key,
            accounts: vec![
                AccountMeta::new_readonly(*self.env.vault_authority.key, true),
                AccountMeta::new(*self.env.vault_custody.key, false),
                AccountMeta::new(*self.position.key, false),
                AccountMeta::new(*self.adapter_token_account.key, false),
                AccountMeta::new_readonly(*self.env.token_program.key, false),
            ],
            data,
        };

        let authority_bump = self.env.authority_bump;
        let authority_seeds: &[&[u8]] = &[VAULT_AUTHORITY_SEED, &[authority_bump]];

        invoke_signed(
            &ix,
            &[
                self.env.vault_authority.clone(),
                self.env.vault_custody.clone(),
                self.position.clone(),
                self.adapter_token_account.clone(),
                self.env.token_program.clone(),
                self.program.clone(),
            ],
            &[authority_seeds],
        )?;
        Ok(())
    }
}

impl<'info> YieldAdapter for ProgramAdapter<'info> {
    fn target(&self) -> Pubkey {
        *self.program.key
    }

    fn asset(&self) -> Pubkey {
        self.env.mint
    }

    fn deposit_into(&mut self, amount: u64) -> Result<()> {
        let before = self.env.custody_amount()?;
        self.invoke(ADAPTER_DEPOSIT_DISCRIMINATOR, amount)?;
        let after = self.env.custody_amount()?;

        ensure_pulled(before, after, amount)
    }

    fn withdraw_from(&mut self, amount: u64) -> Result<u64> {
        let before = self.env.custody_amount()?;
        self.invoke(ADAPTER_WITHDRAW_DISCRIMINATOR, amount)?;
        let after = self.env.custody_amount()?;

        received(before, after)
    }

    fn current_balance(&self) -> Result<u64> {
        let data = self.position.try_borrow_data()?;
        let position = AdapterPosition::unpack(&data)?;

        require_keys_eq!(position.authority, *self.env.vault_authority.key, VaultError::InvalidAdapter);
        require_keys_eq!(position.mint, self.env.mint, VaultError::InvalidMint);
        Ok(position.balance)
    }
}

/// The adapter must have taken exactly `amount` out of custody
fn ensure_pulled(before: u64, after: u64, amount: u64) -> Result<()> {
    let pulled = before
        .checked_sub(after)
        .ok_or(VaultError::AdapterFailure)?;
    require!(pulled == amount, VaultError::AdapterFailure);
    Ok(())
}

/// Amount that arrived in custody during a withdraw CPI
fn received(before: u64, after: u64) -> Result<u64> {
    after
        .checked_sub(before)
        .ok_or_else(|| error!(VaultError::AdapterFailure))
}
