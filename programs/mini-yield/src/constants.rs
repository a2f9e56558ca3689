// Constants for the MiniYield program

/// Seed for the global vault config PDA
pub const CONFIG_SEED: &[u8] = b"config";

/// Seed for per-asset ledger PDAs
pub const ASSET_SEED: &[u8] = b"asset";

/// Seed for per-(mint, user) balance PDAs
pub const USER_BALANCE_SEED: &[u8] = b"user_balance";

/// Seed for the PDA that owns every custody and reserve token account
pub const VAULT_AUTHORITY_SEED: &[u8] = b"vault_authority";

/// Adapters registered per asset. Switching iterates nothing, but account
/// space and client-side scans grow with the list.
pub const MAX_PROTOCOLS: usize = 16;

/// Assets that can ever be listed by `get_supported_tokens`
pub const MAX_SUPPORTED_TOKENS: usize = 32;

/// sha256("global:deposit")[..8], the adapter program's deposit instruction
pub const ADAPTER_DEPOSIT_DISCRIMINATOR: [u8; 8] = [242, 35, 198, 137, 82, 225, 242, 182];

/// sha256("global:withdraw")[..8], the adapter program's withdraw instruction
pub const ADAPTER_WITHDRAW_DISCRIMINATOR: [u8; 8] = [183, 18, 70, 156, 148, 109, 161, 34];

/// sha256("account:AdapterPosition")[..8], layout tag of an adapter position account
pub const ADAPTER_POSITION_DISCRIMINATOR: [u8; 8] = [111, 146, 212, 92, 30, 187, 93, 29];
