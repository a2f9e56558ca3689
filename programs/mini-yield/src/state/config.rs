use anchor_lang::prelude::*;

use crate::{constants::MAX_SUPPORTED_TOKENS, errors::VaultError};

/// Global vault configuration: ownership, lifecycle flag and the asset listing
///
/// Security considerations:
/// - Owner stored in state (not instruction args)
/// - Every admin instruction routes through `require_owner`
/// - `supported_tokens` is append-only
#[account]
#[derive(InitSpace, Debug, PartialEq, Eq)]
pub struct VaultConfig {
    /// Identity allowed to register adapters, switch protocols and pause
    pub owner: Pubkey,

    /// Lifecycle gate: `true` rejects deposits and protocol switches
    pub paused: bool,

    /// Every mint that ever had an adapter registered, in listing order
    #[max_len(32)]
    pub supported_tokens: Vec<Pubkey>,

    /// Bump seed for the config PDA
    pub bump: u8,

    /// Bump seed for the vault authority PDA
    pub authority_bump: u8,
}

impl VaultConfig {
    pub fn new(owner: Pubkey, bump: u8, authority_bump: u8) -> Self {
        Self {
            owner,
            paused: false,
            supported_tokens: Vec::new(),
            bump,
            authority_bump,
        }
    }

    pub fn require_owner(&self, caller: &Pubkey) -> Result<()> {
        require_keys_eq!(*caller, self.owner, VaultError::NotOwner);
        Ok(())
    }

    pub fn require_not_paused(&self) -> Result<()> {
        require!(!self.paused, VaultError::ContractPaused);
        Ok(())
    }

    /// Active -> Paused. Pausing twice is rejected rather than ignored.
    pub fn pause(&mut self, caller: &Pubkey) -> Result<()> {
        self.require_owner(caller)?;
        self.require_not_paused()?;
        self.paused = true;
        Ok(())
    }

    /// Paused -> Active
    pub fn unpause(&mut self, caller: &Pubkey) -> Result<()> {
        self.require_owner(caller)?;
        require!(self.paused, VaultError::NotPaused);
        self.paused = false;
        Ok(())
    }

    /// Hand the owner capability to `new_owner`, returning the previous owner
    pub fn transfer_ownership(&mut self, caller: &Pubkey, new_owner: Pubkey) -> Result<Pubkey> {
        self.require_owner(caller)?;
        require!(new_owner != Pubkey::default(), VaultError::InvalidOwner);
        Ok(std::mem::replace(&mut self.owner, new_owner))
    }

    pub fn is_listed(&self, mint: &Pubkey) -> bool {
        self.supported_tokens.contains(mint)
    }

    /// Fails only when a new mint would exceed the listing cap
    pub fn ensure_can_list(&self, mint: &Pubkey) -> Result<()> {
        require!(
            self.is_listed(mint) || self.supported_tokens.len() < MAX_SUPPORTED_TOKENS,
            VaultError::RegistryFull
        );
        Ok(())
    }

    /// Append `mint` to the listing. Listing an already listed mint is a no-op.
    pub fn list_token(&mut self, mint: Pubkey) -> Result<()> {
        self.ensure_can_list(&mint)?;
        if !self.is_listed(&mint) {
            self.supported_tokens.push(mint);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_lang::error::Error;

    #[test]
    fn test_starts_active() {
        let config = VaultConfig::new(Pubkey::new_unique(), 0, 0);
        assert!(!config.paused);
        assert!(config.supported_tokens.is_empty());
        assert!(config.require_not_paused().is_ok());
    }

    #[test]
    fn test_pause_round_trip() {
        let owner = Pubkey::new_unique();
        let mut config = VaultConfig::new(owner, 0, 0);

        config.pause(&owner).unwrap();
        assert!(config.paused);
        assert_eq!(
            config.require_not_paused().unwrap_err(),
            Error::from(VaultError::ContractPaused)
        );

        config.unpause(&owner).unwrap();
        assert!(!config.paused);
    }

    #[test]
    fn test_pause_rejects_repeat_transitions() {
        let owner = Pubkey::new_unique();
        let mut config = VaultConfig::new(owner, 0, 0);

        assert_eq!(config.unpause(&owner).unwrap_err(), Error::from(VaultError::NotPaused));
        config.pause(&owner).unwrap();
        assert_eq!(config.pause(&owner).unwrap_err(), Error::from(VaultError::ContractPaused));
    }

    #[test]
    fn test_listing_is_idempotent_and_capped() {
        let mut config = VaultConfig::new(Pubkey::new_unique(), 0, 0);
        let mint = Pubkey::new_unique();

        config.list_token(mint).unwrap();
        config.list_token(mint).unwrap();
        assert_eq!(config.supported_tokens, vec![mint]);

        for _ in 1..MAX_SUPPORTED_TOKENS {
            config.list_token(Pubkey::new_unique()).unwrap();
        }
        assert_eq!(
            config.list_token(Pubkey::new_unique()).unwrap_err(),
            Error::from(VaultError::RegistryFull)
        );
        // Already listed mints still pass once the cap is reached
        assert!(config.list_token(mint).is_ok());
    }

    #[test]
    fn test_transfer_ownership() {
        let owner = Pubkey::new_unique();
        let next = Pubkey::new_unique();
        let mut config = VaultConfig::new(owner, 0, 0);

        assert_eq!(
            config.transfer_ownership(&next, next).unwrap_err(),
            Error::from(VaultError::NotOwner)
        );
        assert_eq!(
            config.transfer_ownership(&owner, Pubkey::default()).unwrap_err(),
            Error::from(VaultError::InvalidOwner)
        );
        assert_eq!(config.transfer_ownership(&owner, next).unwrap(), owner);
        assert_eq!(config.owner, next);
        assert_eq!(config.pause(&owner).unwrap_err(), Error::from(VaultError::NotOwner));
    }
}
