use anchor_lang::prelude::*;

use crate::{constants::MAX_PROTOCOLS, errors::VaultError, state::UserBalance};

/// Backend behind an adapter handle
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, InitSpace)]
pub enum AdapterKind {
    /// Token account of the asset owned by the vault authority
    Reserve,
    /// External program speaking the adapter deposit/withdraw interface
    Program,
}

/// Registered yield destination for one asset. Never mutated after registration.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq, InitSpace)]
pub struct AdapterHandle {
    pub kind: AdapterKind,

    /// Reserve token account, or the adapter program id
    pub target: Pubkey,

    /// Account reporting the vault's balance. Equals `target` for reserves.
    pub position: Pubkey,
}

impl AdapterHandle {
    pub fn reserve(target: Pubkey) -> Self {
        Self {
            kind: AdapterKind::Reserve,
            target,
            position: target,
        }
    }

    pub fn program(program: Pubkey, position: Pubkey) -> Self {
        Self {
            kind: AdapterKind::Program,
            target: program,
            position,
        }
    }

    pub fn new(kind: AdapterKind, target: Pubkey, position: Pubkey) -> Self {
        match kind {
            AdapterKind::Reserve => Self::reserve(target),
            AdapterKind::Program => Self::program(target, position),
        }
    }

    /// Number of `remaining_accounts` an instruction must supply for this adapter
    pub fn account_count(&self) -> usize {
        match self.kind {
            AdapterKind::Reserve => 1,
            AdapterKind::Program => 3,
        }
    }
}

/// Per-asset ledger and protocol registry
///
/// Security considerations:
/// - `total_shares` always equals the sum of every `UserBalance::shares` for the mint
/// - `total_deposited` is outstanding principal; it is zero whenever `total_shares` is
/// - Only the adapter at `active_index` ever holds funds
/// - `locked` rejects nested entry while fund movements are in flight
#[account]
#[derive(InitSpace, Debug, PartialEq, Eq)]
pub struct AssetState {
    /// Mint of the asset this ledger accounts for
    pub mint: Pubkey,

    /// Adapters in registration order. The index is the protocol id.
    #[max_len(16)]
    pub protocols: Vec<AdapterHandle>,

    /// Adapter currently holding the asset's funds
    pub active_index: u8,

    pub total_shares: u64,

    /// Principal backing outstanding shares
    pub total_deposited: u64,

    pub locked: bool,

    pub bump: u8,
}

impl AssetState {
    pub fn new(mint: Pubkey, bump: u8) -> Self {
        Self {
            mint,
            protocols: Vec::new(),
            active_index: 0,
            total_shares: 0,
            total_deposited: 0,
            locked: false,
            bump,
        }
    }

    pub fn is_supported(&self) -> bool {
        !self.protocols.is_empty()
    }

    // ---------------------------------------------------------------------
    // Share ledger
    // ---------------------------------------------------------------------

    /// Shares issued for depositing `amount` when the pool is worth `total_value`
    ///
    /// - First deposit: shares = amount
    /// - Otherwise: shares = floor(amount * total_shares / total_value)
    ///
    /// Truncation leaves the remainder with existing holders.
    pub fn calculate_shares(&self, amount: u64, total_value: u64) -> Result<u64> {
        require!(self.is_supported(), VaultError::UnsupportedAsset);
        require!(amount > 0, VaultError::InvalidAmount);

        if self.total_shares == 0 {
            return Ok(amount);
        }

        mul_div_floor(amount, self.total_shares, total_value)
    }

    /// Asset amount `shares` redeem for: floor(shares * total_value / total_shares)
    pub fn redeem_value(&self, shares: u64, total_value: u64) -> Result<u64> {
        require!(shares <= self.total_shares, VaultError::InsufficientShares);
        if shares == 0 {
            return Ok(0);
        }

        mul_div_floor(shares, total_value, self.total_shares)
    }

    /// Shares to burn for paying out `amount`: ceil(amount * total_shares / total_value)
    ///
    /// Rounding up keeps the payout from ever exceeding the burned claim.
    /// Burning every outstanding share requires paying out the whole pool, so
    /// no value is left behind without holders.
    pub fn shares_for_withdrawal(&self, amount: u64, total_value: u64) -> Result<u64> {
        require!(amount > 0, VaultError::InvalidAmount);
        require!(self.total_shares > 0, VaultError::NoBalance);

        let shares = mul_div_ceil(amount, self.total_shares, total_value)?;
        require!(
            shares < self.total_shares || amount == total_value,
            VaultError::InsufficientShares
        );
        Ok(shares)
    }

    /// Principal released when `shares` are burned
    pub fn principal_for(&self, shares: u64) -> Result<u64> {
        require!(shares <= self.total_shares, VaultError::InsufficientShares);
        if shares == self.total_shares {
            return Ok(self.total_deposited);
        }

        mul_div_floor(self.total_deposited, shares, self.total_shares)
    }

    /// Commit a deposit of `amount` that minted `shares` to `balance`
    pub fn record_deposit(&mut self, balance: &mut UserBalance, amount: u64, shares: u64) -> Result<()> {
        require_keys_eq!(balance.mint, self.mint, VaultError::InvalidMint);

        let total_shares = self
            .total_shares
            .checked_add(shares)
            .ok_or(VaultError::MathOverflow)?;
        let total_deposited = self
            .total_deposited
            .checked_add(amount)
            .ok_or(VaultError::MathOverflow)?;
        let user_shares = balance
            .shares
            .checked_add(shares)
            .ok_or(VaultError::MathOverflow)?;
        let user_deposited = balance
            .total_deposited
            .checked_add(amount)
            .ok_or(VaultError::MathOverflow)?;

        self.total_shares = total_shares;
        self.total_deposited = total_deposited;
        balance.shares = user_shares;
        balance.total_deposited = user_deposited;
        Ok(())
    }

    /// Burn `shares` from `balance`, releasing their proportional principal
    pub fn record_withdrawal(&mut self, balance: &mut UserBalance, shares: u64) -> Result<()> {
        require_keys_eq!(balance.mint, self.mint, VaultError::InvalidMint);
        require!(balance.shares > 0, VaultError::NoBalance);
        require!(shares <= balance.shares, VaultError::InsufficientShares);

        let principal = self.principal_for(shares)?;

        self.total_shares = self
            .total_shares
            .checked_sub(shares)
            .ok_or(VaultError::MathOverflow)?;
        self.total_deposited = if self.total_shares == 0 {
            0
        } else {
            self.total_deposited
                .checked_sub(principal)
                .ok_or(VaultError::MathOverflow)?
        };
        balance.shares -= shares;
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Protocol registry
    // ---------------------------------------------------------------------

    pub fn protocol_count(&self) -> usize {
        self.protocols.len()
    }

    pub fn protocol(&self, index: u8) -> Result<&AdapterHandle> {
        self.protocols
            .get(index as usize)
            .ok_or_else(|| error!(VaultError::InvalidIndex))
    }

    /// Handle and index of the adapter currently holding the funds
    pub fn active_protocol(&self) -> Result<(&AdapterHandle, u8)> {
        require!(self.is_supported(), VaultError::UnsupportedAsset);
        Ok((self.protocol(self.active_index)?, self.active_index))
    }

    pub fn ensure_can_register(&self, handle: &AdapterHandle) -> Result<()> {
        require!(
            !self.protocols.iter().any(|p| p.target == handle.target),
            VaultError::ProtocolAlreadyExists
        );
        require!(self.protocols.len() < MAX_PROTOCOLS, VaultError::RegistryFull);
        Ok(())
    }

    /// Append `handle`, returning its protocol id. The first adapter becomes active.
    pub fn add_protocol(&mut self, handle: AdapterHandle) -> Result<u8> {
        self.ensure_can_register(&handle)?;

        let index = u8::try_from(self.protocols.len()).map_err(|_| VaultError::RegistryFull)?;
        self.protocols.push(handle);
        if index == 0 {
            self.active_index = 0;
        }
        Ok(index)
    }

    /// Switching to the active index is rejected as well as out-of-range ids
    pub fn check_switch(&self, new_index: u8) -> Result<()> {
        require!(self.is_supported(), VaultError::UnsupportedAsset);
        require!(
            (new_index as usize) < self.protocols.len() && new_index != self.active_index,
            VaultError::InvalidIndex
        );
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Reentrancy guard
    // ---------------------------------------------------------------------

    pub fn enter(&mut self) -> Result<()> {
        require!(!self.locked, VaultError::Reentrancy);
        self.locked = true;
        Ok(())
    }

    pub fn exit(&mut self) {
        self.locked = false;
    }
}

fn mul_div_floor(a: u64, b: u64, denominator: u64) -> Result<u64> {
    require!(denominator > 0, VaultError::DivisionByZero);

    let product = (a as u128)
        .checked_mul(b as u128)
        .ok_or(VaultError::MathOverflow)?;

    u64::try_from(product / denominator as u128).map_err(|_| error!(VaultError::MathOverflow))
}

fn mul_div_ceil(a: u64, b: u64, denominator: u64) -> Result<u64> {
    require!(denominator > 0, VaultError::DivisionByZero);

    let product = (a as u128)
        .checked_mul(b as u128)
        .ok_or(VaultError::MathOverflow)?;
    let denominator = denominator as u128;
    let quotient = product / denominator + u128::from(product % denominator != 0);

    u64::try_from(quotient).map_err(|_| error!(VaultError::MathOverflow))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_lang::error::Error;

    fn mock_asset(total_shares: u64, total_deposited: u64) -> AssetState {
        let mut asset = AssetState::new(Pubkey::new_unique(), 0);
        asset.add_protocol(AdapterHandle::reserve(Pubkey::new_unique())).unwrap();
        asset.total_shares = total_shares;
        asset.total_deposited = total_deposited;
        asset
    }

    #[test]
    fn test_first_deposit() {
        let asset = mock_asset(0, 0);
        assert_eq!(asset.calculate_shares(1000, 0).unwrap(), 1000);
    }

    #[test]
    fn test_subsequent_deposit_equal_ratio() {
        let asset = mock_asset(1000, 1000);
        assert_eq!(asset.calculate_shares(500, 1000).unwrap(), 500);
    }

    #[test]
    fn test_subsequent_deposit_with_yield() {
        // Pool worth 2000 backs 1000 shares
        let asset = mock_asset(1000, 1000);
        assert_eq!(asset.calculate_shares(500, 2000).unwrap(), 250);
    }

    #[test]
    fn test_redeem_value() {
        let asset = mock_asset(1000, 1000);
        assert_eq!(asset.redeem_value(500, 2000).unwrap(), 1000);
        assert_eq!(
            asset.redeem_value(1001, 2000).unwrap_err(),
            Error::from(VaultError::InsufficientShares)
        );
    }

    #[test]
    fn test_precision_loss_floors_issuance_and_ceils_burn() {
        let asset = mock_asset(333, 333);
        // 100 * 333 / 1000 = 33.3
        assert_eq!(asset.calculate_shares(100, 1000).unwrap(), 33);
        assert_eq!(asset.shares_for_withdrawal(100, 1000).unwrap(), 34);
        // Exact division does not round up
        assert_eq!(asset.shares_for_withdrawal(1000, 1000).unwrap(), 333);
    }

    #[test]
    fn test_burning_every_share_requires_whole_pool() {
        // One share backs 1000 tokens; ceil(1 * 1 / 1000) would burn it all
        let asset = mock_asset(1, 1);
        assert_eq!(
            asset.shares_for_withdrawal(1, 1000).unwrap_err(),
            Error::from(VaultError::InsufficientShares)
        );
        assert_eq!(
            asset.shares_for_withdrawal(999, 1000).unwrap_err(),
            Error::from(VaultError::InsufficientShares)
        );
        assert_eq!(asset.shares_for_withdrawal(1000, 1000).unwrap(), 1);
    }

    #[test]
    fn test_zero_value_with_outstanding_shares() {
        let asset = mock_asset(1000, 1000);
        assert_eq!(
            asset.calculate_shares(10, 0).unwrap_err(),
            Error::from(VaultError::DivisionByZero)
        );
        assert_eq!(asset.redeem_value(10, 0).unwrap(), 0);
    }

    #[test]
    fn test_unsupported_and_zero_amount() {
        let bare = AssetState::new(Pubkey::new_unique(), 0);
        assert_eq!(
            bare.calculate_shares(10, 0).unwrap_err(),
            Error::from(VaultError::UnsupportedAsset)
        );
        assert_eq!(
            mock_asset(0, 0).calculate_shares(0, 0).unwrap_err(),
            Error::from(VaultError::InvalidAmount)
        );
    }

    #[test]
    fn test_withdrawal_releases_proportional_principal() {
        let mut asset = mock_asset(0, 0);
        let mut alice = UserBalance::new(Pubkey::new_unique(), asset.mint, 0);
        let mut bob = UserBalance::new(Pubkey::new_unique(), asset.mint, 0);

        asset.record_deposit(&mut alice, 300, 300).unwrap();
        asset.record_deposit(&mut bob, 100, 100).unwrap();
        asset.record_withdrawal(&mut alice, 100).unwrap();

        assert_eq!(asset.total_shares, 300);
        assert_eq!(asset.total_deposited, 300);
        assert_eq!(alice.shares, 200);
        // Historical counter is untouched
        assert_eq!(alice.total_deposited, 300);

        asset.record_withdrawal(&mut alice, 200).unwrap();
        asset.record_withdrawal(&mut bob, 100).unwrap();
        assert_eq!(asset.total_shares, 0);
        assert_eq!(asset.total_deposited, 0);
    }

    #[test]
    fn test_record_withdrawal_rejects_overdraw() {
        let mut asset = mock_asset(0, 0);
        let mut user = UserBalance::new(Pubkey::new_unique(), asset.mint, 0);

        assert_eq!(
            asset.record_withdrawal(&mut user, 1).unwrap_err(),
            Error::from(VaultError::NoBalance)
        );
        asset.record_deposit(&mut user, 50, 50).unwrap();
        assert_eq!(
            asset.record_withdrawal(&mut user, 51).unwrap_err(),
            Error::from(VaultError::InsufficientShares)
        );
    }

    #[test]
    fn test_registry_appends_and_caps() {
        let mut asset = AssetState::new(Pubkey::new_unique(), 0);
        let first = AdapterHandle::reserve(Pubkey::new_unique());

        assert_eq!(asset.add_protocol(first.clone()).unwrap(), 0);
        assert_eq!(asset.active_protocol().unwrap(), (&first, 0));
        assert_eq!(
            asset.add_protocol(first).unwrap_err(),
            Error::from(VaultError::ProtocolAlreadyExists)
        );

        for i in 1..MAX_PROTOCOLS {
            let index = asset
                .add_protocol(AdapterHandle::program(Pubkey::new_unique(), Pubkey::new_unique()))
                .unwrap();
            assert_eq!(index as usize, i);
        }
        assert_eq!(
            asset
                .add_protocol(AdapterHandle::reserve(Pubkey::new_unique()))
                .unwrap_err(),
            Error::from(VaultError::RegistryFull)
        );
        // Registration never moves the active adapter
        assert_eq!(asset.active_index, 0);
    }

    #[test]
    fn test_check_switch() {
        let mut asset = AssetState::new(Pubkey::new_unique(), 0);
        assert_eq!(asset.check_switch(0).unwrap_err(), Error::from(VaultError::UnsupportedAsset));

        asset.add_protocol(AdapterHandle::reserve(Pubkey::new_unique())).unwrap();
        asset.add_protocol(AdapterHandle::reserve(Pubkey::new_unique())).unwrap();

        assert!(asset.check_switch(1).is_ok());
        assert_eq!(asset.check_switch(0).unwrap_err(), Error::from(VaultError::InvalidIndex));
        assert_eq!(asset.check_switch(2).unwrap_err(), Error::from(VaultError::InvalidIndex));
    }

    #[test]
    fn test_lock_rejects_nested_entry() {
        let mut asset = mock_asset(0, 0);
        asset.enter().unwrap();
        assert_eq!(asset.enter().unwrap_err(), Error::from(VaultError::Reentrancy));
        asset.exit();
        assert!(asset.enter().is_ok());
    }
}
