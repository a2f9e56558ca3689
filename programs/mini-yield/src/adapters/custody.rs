use anchor_lang::prelude::*;
use anchor_spl::token::{self, Transfer};

use super::{read_token_account, AssetCustody, CpiEnv};
use crate::errors::VaultError;

/// SPL token movements between a signing user and vault custody
pub struct TokenCustody<'info> {
    user: AccountInfo<'info>,
    user_token_account: AccountInfo<'info>,
    env: CpiEnv<'info>,
}

impl<'info> TokenCustody<'info> {
    pub fn new(user: AccountInfo<'info>, user_token_account: AccountInfo<'info>, env: CpiEnv<'info>) -> Self {
        Self {
            user,
            user_token_account,
            env,
        }
    }
}

impl<'info> AssetCustody for TokenCustody<'info> {
    fn collect(&mut self, amount: u64) -> Result<()> {
        let available = read_token_account(&self.user_token_account)?.amount;
        require!(available >= amount, VaultError::TransferFailed);

        let transfer_ctx = CpiContext::new(
            self.env.token_program.clone(),
            Transfer {
                from: self.user_token_account.clone(),
                to: self.env.vault_custody.clone(),
                authority: self.user.clone(),
            },
        );
        token::transfer(transfer_ctx, amount)
    }

    fn pay_out(&mut self, amount: u64) -> Result<()> {
        let available = self.env.custody_amount()?;
        require!(available >= amount, VaultError::TransferFailed);

        self.env
            .signed_transfer(&self.env.vault_custody, &self.user_token_account, amount)
    }
}
