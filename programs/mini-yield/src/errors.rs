use anchor_lang::prelude::*;

/// Custom error codes for the MiniYield program
///
/// Every variant aborts the whole instruction; no partial ledger state survives.
#[error_code]
pub enum VaultError {
    #[msg("Caller is not the owner")]
    NotOwner,

    #[msg("Contract is paused")]
    ContractPaused,

    #[msg("Contract is not paused")]
    NotPaused,

    #[msg("Token not supported")]
    UnsupportedAsset,

    #[msg("Amount must be greater than 0")]
    InvalidAmount,

    #[msg("No balance to withdraw")]
    NoBalance,

    #[msg("Insufficient shares for requested amount")]
    InsufficientShares,

    #[msg("Invalid protocol index")]
    InvalidIndex,

    #[msg("Token transfer failed")]
    TransferFailed,

    #[msg("Adapter could not honor the request in full")]
    AdapterFailure,

    #[msg("Adapter accounts do not match the registered handle")]
    InvalidAdapter,

    #[msg("Protocol already registered for this token")]
    ProtocolAlreadyExists,

    #[msg("Protocol registry is full")]
    RegistryFull,

    #[msg("Deposit too small to mint any shares")]
    ZeroShares,

    #[msg("Math overflow occurred during calculation")]
    MathOverflow,

    #[msg("Cannot divide by zero - asset has no value backing its shares")]
    DivisionByZero,

    #[msg("Reentrant call rejected")]
    Reentrancy,

    #[msg("Invalid owner")]
    InvalidOwner,

    #[msg("Invalid token mint - does not match asset")]
    InvalidMint,
}
