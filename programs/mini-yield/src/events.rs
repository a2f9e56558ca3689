// Program events. Interface event `Deposit` is emitted as `Deposited`,
// `Withdraw` as `Withdrawn` and `ProtocolSwitch` as `ProtocolSwitched`;
// the present-tense names belong to account contexts.

use anchor_lang::prelude::*;

/// Event emitted when the vault config is created
#[event]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultInitialized {
    pub owner: Pubkey,
    pub timestamp: i64,
}

/// Event emitted when a user deposits into an asset
#[event]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deposited {
    pub user: Pubkey,
    pub asset: Pubkey,
    pub amount: u64,
    pub shares_minted: u64,
    pub timestamp: i64,
}

/// Event emitted when a user withdraws from an asset
#[event]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Withdrawn {
    pub user: Pubkey,
    pub asset: Pubkey,
    pub amount: u64,
    pub shares_burned: u64,
    pub timestamp: i64,
}

/// Event emitted when an asset's funds move to another adapter
#[event]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolSwitched {
    pub asset: Pubkey,
    pub old_adapter: Pubkey,
    pub new_adapter: Pubkey,
    pub amount_moved: u64,
    pub timestamp: i64,
}

/// Event emitted when an adapter is appended to an asset's registry
#[event]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolAdded {
    pub asset: Pubkey,
    pub adapter: Pubkey,
    pub index: u8,
    pub timestamp: i64,
}

#[event]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paused {
    pub owner: Pubkey,
    pub timestamp: i64,
}

#[event]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unpaused {
    pub owner: Pubkey,
    pub timestamp: i64,
}

#[event]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnershipTransferred {
    pub previous_owner: Pubkey,
    pub new_owner: Pubkey,
    pub timestamp: i64,
}
