// Constants for the Multi-Asset Vault program

/// Seed for vault state PDA
pub const VAULT_SEED: &[u8] = b"vault";

/// Seed for share mint PDA
pub const SHARE_MINT_SEED: &[u8] = b"shares";

/// Seed for vault authority PDA (owns every vault token account, signs CPIs)
pub const VAULT_AUTHORITY_SEED: &[u8] = b"vault_authority";

/// Seed for the asset registry PDA
pub const ASSET_REGISTRY_SEED: &[u8] = b"asset_registry";

/// Seed for the strategy registry PDA
pub const STRATEGY_REGISTRY_SEED: &[u8] = b"strategy_registry";

/// Seed for the processor rule book PDA
pub const PROCESSOR_RULES_SEED: &[u8] = b"processor_rules";

/// Exponent of the virtual share offset (`10^offset` virtual shares).
/// Zero keeps the first deposit at a 1:1 base-to-share ratio.
pub const DECIMALS_OFFSET: u8 = 0;

/// Registry index reserved for "not present"; real entries start at 1
pub const ABSENT_INDEX: u32 = 0;

/// Length of the function selector prefix of a processor payload
pub const SELECTOR_LEN: usize = 4;

/// Width of one encoded Uint256 / Address parameter
pub const WORD_LEN: usize = 32;

pub const MAX_ASSETS: usize = 8;
pub const MAX_STRATEGIES: usize = 8;
pub const MAX_RATES: usize = 16;
pub const MAX_FUNCTION_RULES: usize = 8;
pub const MAX_PARAMS: usize = 4;
pub const MAX_ALLOW_LIST: usize = 4;
pub const MAX_RULE_ACCOUNTS: usize = 8;

/// Space for VaultState account (8 discriminator + 32 authority + 32 processor +
/// 32 share_mint + 32 rate_provider + 8 total_base_assets + 8 vault_id +
/// 1 paused + 1 locked + 1 bump + 1 share_bump + 1 authority_bump + 64 padding)
pub const VAULT_STATE_SIZE: usize = 8 + 32 + 32 + 32 + 32 + 8 + 8 + 1 + 1 + 1 + 1 + 1 + 64;

/// AssetEntry: 32 asset + 4 index + 1 active + 1 decimals + 8 idle + 8 deployed
pub const ASSET_ENTRY_SIZE: usize = 32 + 4 + 1 + 1 + 8 + 8;

/// StrategyEntry: 32 strategy + 32 asset + 4 index + 1 active + 1 decimals + 8 deployed
pub const STRATEGY_ENTRY_SIZE: usize = 32 + 32 + 4 + 1 + 1 + 8;

/// AssetRate: 32 asset + 8 rate + 8 updated_at
pub const ASSET_RATE_SIZE: usize = 32 + 8 + 8;

/// ParamRule: 1 param_type + 1 is_array + 4 vec len + allow list
pub const PARAM_RULE_SIZE: usize = 1 + 1 + 4 + MAX_ALLOW_LIST * 32;

/// RuleEntry: 32 target + 4 selector + 1 is_active + 4 vec len + params +
/// 4 vec len + account keys + 1 allow_value
pub const RULE_ENTRY_SIZE: usize = 32
    + SELECTOR_LEN
    + 1
    + 4
    + MAX_PARAMS * PARAM_RULE_SIZE
    + 4
    + MAX_RULE_ACCOUNTS * 32
    + 1;
