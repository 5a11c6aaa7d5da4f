use anchor_lang::prelude::*;

use crate::state::Role;

/// Event emitted when a new vault is initialized
#[event]
pub struct VaultInitialized {
    pub vault: Pubkey,
    pub authority: Pubkey,
    pub share_mint: Pubkey,
    pub vault_id: u64,
    pub timestamp: i64,
}

#[event]
pub struct RoleGranted {
    pub vault: Pubkey,
    pub role: Role,
    pub previous: Pubkey,
    pub grantee: Pubkey,
}

#[event]
pub struct RateProviderSet {
    pub vault: Pubkey,
    pub previous: Pubkey,
    pub rate_provider: Pubkey,
}

#[event]
pub struct PauseToggled {
    pub vault: Pubkey,
    pub paused: bool,
}

/// Event emitted when an asset is added to the registry
#[event]
pub struct AssetAdded {
    pub vault: Pubkey,
    pub asset: Pubkey,
    pub index: u32,
    pub decimals: u8,
    pub active: bool,
    pub timestamp: i64,
}

#[event]
pub struct AssetToggled {
    pub vault: Pubkey,
    pub asset: Pubkey,
    pub active: bool,
    pub timestamp: i64,
}

#[event]
pub struct StrategyAdded {
    pub vault: Pubkey,
    pub strategy: Pubkey,
    pub asset: Pubkey,
    pub index: u32,
    pub timestamp: i64,
}

#[event]
pub struct StrategyToggled {
    pub vault: Pubkey,
    pub strategy: Pubkey,
    pub active: bool,
    pub timestamp: i64,
}

#[event]
pub struct ProcessorRuleSet {
    pub vault: Pubkey,
    pub target: Pubkey,
    pub selector: [u8; 4],
    pub is_active: bool,
    pub params: u8,
    pub accounts: u8,
    pub allow_value: bool,
}

#[event]
pub struct RateUpdated {
    pub rate_feed: Pubkey,
    pub asset: Pubkey,
    pub rate: u64,
    pub timestamp: i64,
}

/// Event emitted when assets are deposited (deposit or mint)
#[event]
pub struct Deposited {
    pub vault: Pubkey,
    pub caller: Pubkey,
    pub receiver: Pubkey,
    pub asset: Pubkey,
    pub assets: u64,
    pub base_assets: u64,
    pub shares: u64,
    pub total_base_assets: u64,
    pub timestamp: i64,
}

/// Event emitted when assets leave the vault (withdraw or redeem)
#[event]
pub struct Withdrawn {
    pub vault: Pubkey,
    pub caller: Pubkey,
    pub receiver: Pubkey,
    pub owner: Pubkey,
    pub asset: Pubkey,
    pub assets: u64,
    pub base_assets: u64,
    pub shares: u64,
    pub total_base_assets: u64,
    pub timestamp: i64,
}

#[event]
pub struct AccountingProcessed {
    pub vault: Pubkey,
    pub idle_base_assets: u64,
    pub deployed_base_assets: u64,
    pub total_base_assets: u64,
    pub timestamp: i64,
}

/// Event emitted after a processor batch executed in full
#[event]
pub struct ProcessSuccess {
    pub vault: Pubkey,
    pub targets: Vec<Pubkey>,
    pub values: Vec<u64>,
    pub data: Vec<Vec<u8>>,
}
