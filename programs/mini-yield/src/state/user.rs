use anchor_lang::prelude::*;

/// Per-(user, asset) share position
#[account]
#[derive(InitSpace, Debug, Default, PartialEq, Eq)]
pub struct UserBalance {
    pub user: Pubkey,
    pub mint: Pubkey,

    /// Proportional claim on the asset's pooled value
    pub shares: u64,

    /// Cumulative principal ever deposited. Withdrawals never reduce it.
    pub total_deposited: u64,

    pub bump: u8,
}

impl UserBalance {
    pub fn new(user: Pubkey, mint: Pubkey, bump: u8) -> Self {
        Self {
            user,
            mint,
            shares: 0,
            total_deposited: 0,
            bump,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.user != Pubkey::default()
    }
}
