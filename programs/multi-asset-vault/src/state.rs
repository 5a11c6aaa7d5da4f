use anchor_lang::prelude::*;

use crate::{
    constants::*,
    errors::VaultError,
    math::{self, Rounding},
    processor::{decode_params, split_selector, validate_params, FunctionRule, OutboundCall},
};

/// Roles checked before privileged entry points
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    /// Configures assets, strategies, rules, the rate provider and the pause flag
    Admin,
    /// Submits processor batches
    Processor,
}

/// Global vault state: configuration, the base-asset total and the lock
///
/// Security considerations:
/// - Role holders stored in state (not instruction args)
/// - `total_base_assets` is the only figure conversion math reads
/// - `locked` is persisted before any CPI so a reentrant call sees it
/// - 64 bytes padding for future upgrades
#[account]
pub struct VaultState {
    /// Holder of the Admin role
    pub authority: Pubkey,          // 32 bytes

    /// Holder of the Processor role
    pub processor: Pubkey,          // 32 bytes

    /// Mint of the vault share token
    pub share_mint: Pubkey,         // 32 bytes

    /// RateFeed account; default key until configured
    pub rate_provider: Pubkey,      // 32 bytes

    /// Value of all deposits in base units, maintained by deposit/withdraw
    pub total_base_assets: u64,     // 8 bytes

    /// Distinguishes vaults created by the same program
    pub vault_id: u64,              // 8 bytes

    /// Gate on every user-facing mutating instruction
    pub paused: bool,               // 1 byte

    /// Reentrancy flag held for the duration of a mutating instruction
    pub locked: bool,               // 1 byte

    /// Bump seed for vault state PDA
    pub bump: u8,                   // 1 byte

    /// Bump seed for share mint PDA
    pub share_bump: u8,             // 1 byte

    /// Bump seed for vault authority PDA
    pub authority_bump: u8,         // 1 byte

    // Padding for future upgrades
    pub _reserved: [u8; 64],        // 64 bytes
}

/// Amounts settled by one deposit/mint/withdraw/redeem
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Settlement {
    /// Asset units moved in or out
    pub assets: u64,
    /// Base value of `assets`, the amount `total_base_assets` moves by
    pub base: u64,
    /// Shares minted or burned
    pub shares: u64,
}

impl VaultState {
    pub fn has_role(&self, role: Role, who: &Pubkey) -> bool {
        match role {
            Role::Admin => self.authority == *who,
            Role::Processor => self.processor == *who,
        }
    }

    /// Take the reentrancy lock. The instruction reverting releases it.
    pub fn enter(&mut self) -> Result<()> {
        require!(!self.locked, VaultError::Reentrancy);
        self.locked = true;
        Ok(())
    }

    pub fn leave(&mut self) {
        self.locked = false;
    }

    pub fn require_unpaused(&self) -> Result<()> {
        require!(!self.paused, VaultError::VaultPaused);
        require!(
            self.rate_provider != Pubkey::default(),
            VaultError::RateProviderNotSet
        );
        Ok(())
    }

    /// The vault may open once it has a rate provider and a registered asset
    pub fn can_unpause(&self, asset_count: usize) -> Result<()> {
        require!(
            self.rate_provider != Pubkey::default(),
            VaultError::RateProviderNotSet
        );
        require!(asset_count > 0, VaultError::NoAssets);
        Ok(())
    }

    /// Base units to shares
    pub fn convert_to_shares(&self, base: u64, total_shares: u64, rounding: Rounding) -> Result<u64> {
        math::convert_to_shares(
            base,
            self.total_base_assets,
            total_shares,
            DECIMALS_OFFSET,
            rounding,
        )
    }

    /// Shares to base units
    pub fn convert_to_assets(&self, shares: u64, total_shares: u64, rounding: Rounding) -> Result<u64> {
        math::convert_to_assets(
            shares,
            self.total_base_assets,
            total_shares,
            DECIMALS_OFFSET,
            rounding,
        )
    }

    /// Shares minted for `base` (floor)
    pub fn preview_deposit(&self, base: u64, total_shares: u64) -> Result<u64> {
        self.convert_to_shares(base, total_shares, Rounding::Floor)
    }

    /// Base value required to mint `shares` (ceiling)
    pub fn preview_mint(&self, shares: u64, total_shares: u64) -> Result<u64> {
        self.convert_to_assets(shares, total_shares, Rounding::Ceiling)
    }

    /// Shares burned to withdraw `base` (ceiling)
    pub fn preview_withdraw(&self, base: u64, total_shares: u64) -> Result<u64> {
        self.convert_to_shares(base, total_shares, Rounding::Ceiling)
    }

    /// Base value paid for redeeming `shares` (floor)
    pub fn preview_redeem(&self, shares: u64, total_shares: u64) -> Result<u64> {
        self.convert_to_assets(shares, total_shares, Rounding::Floor)
    }

    pub fn max_deposit(&self, asset: &AssetEntry) -> u64 {
        if self.paused || !asset.active {
            0
        } else {
            u64::MAX
        }
    }

    pub fn max_mint(&self, asset: &AssetEntry) -> u64 {
        self.max_deposit(asset)
    }

    /// Owner's share balance, or zero while paused
    pub fn max_redeem(&self, owner_shares: u64) -> u64 {
        if self.paused {
            0
        } else {
            owner_shares
        }
    }

    /// Floor value of the owner's shares in `asset`, capped by the idle balance
    pub fn max_withdraw(
        &self,
        oracle: &impl RateOracle,
        asset: &AssetEntry,
        owner_shares: u64,
        total_shares: u64,
        idle_balance: u64,
    ) -> Result<u64> {
        if self.paused || !asset.active {
            return Ok(0);
        }
        let base = self.convert_to_assets(owner_shares, total_shares, Rounding::Floor)?;
        let assets = asset.from_base(oracle, base, Rounding::Floor)?;
        Ok(assets.min(idle_balance))
    }

    /// Quote a deposit of `assets` before any state changes
    pub fn plan_deposit(
        &self,
        oracle: &impl RateOracle,
        asset: &AssetEntry,
        assets: u64,
        total_shares: u64,
    ) -> Result<Settlement> {
        require!(assets > 0, VaultError::ZeroAmount);
        require_gte!(
            self.max_deposit(asset),
            assets,
            VaultError::ExceededMaxDeposit
        );

        let base = asset.to_base(oracle, assets)?;
        let shares = self.preview_deposit(base, total_shares)?;
        require!(shares > 0, VaultError::ZeroShares);

        Ok(Settlement { assets, base, shares })
    }

    /// Quote a mint of exactly `shares`
    pub fn plan_mint(
        &self,
        oracle: &impl RateOracle,
        asset: &AssetEntry,
        shares: u64,
        total_shares: u64,
    ) -> Result<Settlement> {
        require!(shares > 0, VaultError::ZeroShares);
        require_gte!(self.max_mint(asset), shares, VaultError::ExceededMaxMint);

        let required = self.preview_mint(shares, total_shares)?;
        let assets = asset.from_base(oracle, required, Rounding::Ceiling)?;
        require!(assets > 0, VaultError::ZeroAmount);
        let base = asset.to_base(oracle, assets)?;

        Ok(Settlement { assets, base, shares })
    }

    /// Quote a withdrawal of exactly `assets` out of the owner's shares
    pub fn plan_withdraw(
        &self,
        oracle: &impl RateOracle,
        asset: &AssetEntry,
        assets: u64,
        owner_shares: u64,
        total_shares: u64,
        idle_balance: u64,
    ) -> Result<Settlement> {
        require!(assets > 0, VaultError::ZeroAmount);
        let max = self.max_withdraw(oracle, asset, owner_shares, total_shares, idle_balance)?;
        require_gte!(max, assets, VaultError::ExceededMaxWithdraw);

        // Value the payout rounded up so the shares burned cover it
        let base = asset.to_base_rounded(oracle, assets, Rounding::Ceiling)?;
        let shares = self.preview_withdraw(base, total_shares)?;
        require!(shares > 0, VaultError::ZeroShares);

        Ok(Settlement { assets, base, shares })
    }

    /// Quote a redemption of exactly `shares`
    pub fn plan_redeem(
        &self,
        oracle: &impl RateOracle,
        asset: &AssetEntry,
        shares: u64,
        owner_shares: u64,
        total_shares: u64,
        idle_balance: u64,
    ) -> Result<Settlement> {
        require!(shares > 0, VaultError::ZeroShares);
        require!(asset.active, VaultError::AssetNotActive);
        require_gte!(
            self.max_redeem(owner_shares),
            shares,
            VaultError::ExceededMaxRedeem
        );

        let value = self.preview_redeem(shares, total_shares)?;
        let assets = asset.from_base(oracle, value, Rounding::Floor)?;
        require!(assets > 0, VaultError::ZeroAmount);
        require_gte!(
            idle_balance,
            assets,
            VaultError::InsufficientVaultBalance
        );

        // The burned shares' full value leaves the ledger, dust included
        Ok(Settlement {
            assets,
            base: value,
            shares,
        })
    }

    pub fn record_deposit(&mut self, base: u64) -> Result<()> {
        self.total_base_assets = self
            .total_base_assets
            .checked_add(base)
            .ok_or(VaultError::MathOverflow)?;
        Ok(())
    }

    pub fn record_withdrawal(&mut self, base: u64) -> Result<()> {
        self.total_base_assets = self
            .total_base_assets
            .checked_sub(base)
            .ok_or(VaultError::MathOverflow)?;
        Ok(())
    }
}

/// Shares `caller` may burn out of `owner`'s account
///
/// The owner is unrestricted; anyone else is limited to the SPL delegate
/// allowance granted to them.
pub fn spendable_allowance(
    owner: &Pubkey,
    caller: &Pubkey,
    delegate: Option<Pubkey>,
    delegated_amount: u64,
) -> u64 {
    if owner == caller {
        u64::MAX
    } else if delegate.as_ref() == Some(caller) {
        delegated_amount
    } else {
        0
    }
}

/// Source of per-asset exchange rates into base units.
///
/// A rate is the number of base units one whole asset unit (`10^decimals`
/// raw units) is worth. Rates are read fresh on every conversion.
pub trait RateOracle {
    fn get_rate(&self, asset: &Pubkey) -> Result<u64>;
}

/// Individual registered asset
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq)]
pub struct AssetEntry {
    /// Mint of the asset
    pub asset: Pubkey,              // 32 bytes

    /// Position in the registry, starting at 1
    pub index: u32,                 // 4 bytes

    /// Whether the asset currently accepts deposits and withdrawals
    pub active: bool,               // 1 byte

    /// Mint decimals
    pub decimals: u8,               // 1 byte

    /// Base value held by the vault, refreshed by accounting
    pub idle_assets: u64,           // 8 bytes

    /// Base value held in strategies backed by this asset, refreshed by accounting
    pub deployed_assets: u64,       // 8 bytes
}

impl AssetEntry {
    pub fn to_base(&self, oracle: &impl RateOracle, amount: u64) -> Result<u64> {
        math::to_base(amount, oracle.get_rate(&self.asset)?, self.decimals)
    }

    pub fn to_base_rounded(
        &self,
        oracle: &impl RateOracle,
        amount: u64,
        rounding: Rounding,
    ) -> Result<u64> {
        math::to_base_rounded(amount, oracle.get_rate(&self.asset)?, self.decimals, rounding)
    }

    pub fn from_base(&self, oracle: &impl RateOracle, base: u64, rounding: Rounding) -> Result<u64> {
        math::from_base(base, oracle.get_rate(&self.asset)?, self.decimals, rounding)
    }
}

/// Ordered registry of accepted assets
///
/// Entries are never removed, only deactivated, so an index stays valid for
/// the life of the vault.
#[account]
pub struct AssetRegistry {
    /// Vault this registry belongs to
    pub vault: Pubkey,              // 32 bytes

    /// Registered assets in index order
    pub assets: Vec<AssetEntry>,    // 4 + (n * 54) bytes

    /// Bump seed for PDA
    pub bump: u8,                   // 1 byte
}

impl AssetRegistry {
    /// 8 (discriminator) + 32 (vault) + 4 (vec len) + entries + 1 (bump) + 64 (padding)
    pub const SPACE: usize = 8 + 32 + 4 + (MAX_ASSETS * ASSET_ENTRY_SIZE) + 1 + 64;

    /// Registry index of `asset`, or `ABSENT_INDEX`
    pub fn index_of(&self, asset: &Pubkey) -> u32 {
        self.assets
            .iter()
            .find(|a| a.asset == *asset)
            .map_or(ABSENT_INDEX, |a| a.index)
    }

    pub fn get(&self, asset: &Pubkey) -> Option<&AssetEntry> {
        match self.index_of(asset) {
            ABSENT_INDEX => None,
            index => self.assets.get(index as usize - 1),
        }
    }

    /// Entry for a deposit or withdrawal in `asset`
    pub fn active_asset(&self, asset: &Pubkey) -> Result<&AssetEntry> {
        let entry = self.get(asset).ok_or(VaultError::InvalidAsset)?;
        require!(entry.active, VaultError::AssetNotActive);
        Ok(entry)
    }

    pub fn add(&mut self, asset: Pubkey, decimals: u8, active: bool) -> Result<&AssetEntry> {
        require!(asset != Pubkey::default(), VaultError::ZeroAddress);
        require!(
            self.index_of(&asset) == ABSENT_INDEX,
            VaultError::DuplicateAsset
        );
        require!(self.assets.len() < MAX_ASSETS, VaultError::RegistryFull);

        let index = self.assets.len() as u32 + 1;
        self.assets.push(AssetEntry {
            asset,
            index,
            active,
            decimals,
            idle_assets: 0,
            deployed_assets: 0,
        });
        Ok(&self.assets[index as usize - 1])
    }

    pub fn toggle(&mut self, asset: &Pubkey, active: bool) -> Result<()> {
        require!(!self.assets.is_empty(), VaultError::AssetNotFound);
        let index = self.index_of(asset);
        require!(index != ABSENT_INDEX, VaultError::AssetNotFound);

        self.assets[index as usize - 1].active = active;
        Ok(())
    }
}

/// Individual approved strategy entry
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq)]
pub struct StrategyEntry {
    /// Receipt token mint the vault holds for this strategy
    pub strategy: Pubkey,           // 32 bytes

    /// Underlying registered asset the strategy deploys
    pub asset: Pubkey,              // 32 bytes

    /// Position in the registry, starting at 1
    pub index: u32,                 // 4 bytes

    /// Whether the strategy is currently enabled
    pub active: bool,               // 1 byte

    /// Receipt token decimals
    pub decimals: u8,               // 1 byte

    /// Base value of the vault's receipt balance, refreshed by accounting
    pub deployed_assets: u64,       // 8 bytes
}

/// Ordered registry of approved strategies
#[account]
pub struct StrategyRegistry {
    /// Vault this registry belongs to
    pub vault: Pubkey,                  // 32 bytes

    /// Approved strategies in index order
    pub strategies: Vec<StrategyEntry>, // 4 + (n * 78) bytes

    /// Bump seed for PDA
    pub bump: u8,                       // 1 byte
}

impl StrategyRegistry {
    pub const SPACE: usize = 8 + 32 + 4 + (MAX_STRATEGIES * STRATEGY_ENTRY_SIZE) + 1 + 64;

    pub fn index_of(&self, strategy: &Pubkey) -> u32 {
        self.strategies
            .iter()
            .find(|s| s.strategy == *strategy)
            .map_or(ABSENT_INDEX, |s| s.index)
    }

    pub fn get(&self, strategy: &Pubkey) -> Option<&StrategyEntry> {
        match self.index_of(strategy) {
            ABSENT_INDEX => None,
            index => self.strategies.get(index as usize - 1),
        }
    }

    pub fn add(
        &mut self,
        strategy: Pubkey,
        asset: Pubkey,
        decimals: u8,
        active: bool,
    ) -> Result<&StrategyEntry> {
        require!(strategy != Pubkey::default(), VaultError::ZeroAddress);
        require!(
            self.index_of(&strategy) == ABSENT_INDEX,
            VaultError::DuplicateStrategy
        );
        require!(
            self.strategies.len() < MAX_STRATEGIES,
            VaultError::RegistryFull
        );

        let index = self.strategies.len() as u32 + 1;
        self.strategies.push(StrategyEntry {
            strategy,
            asset,
            index,
            active,
            decimals,
            deployed_assets: 0,
        });
        Ok(&self.strategies[index as usize - 1])
    }

    pub fn toggle(&mut self, strategy: &Pubkey, active: bool) -> Result<()> {
        require!(!self.strategies.is_empty(), VaultError::StrategyNotFound);
        let index = self.index_of(strategy);
        require!(index != ABSENT_INDEX, VaultError::StrategyNotFound);

        self.strategies[index as usize - 1].active = active;
        Ok(())
    }
}

/// Published rate for one asset
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq)]
pub struct AssetRate {
    pub asset: Pubkey,              // 32 bytes
    pub rate: u64,                  // 8 bytes
    pub updated_at: i64,            // 8 bytes
}

/// On-chain rate provider the vault reads conversions from
#[account]
pub struct RateFeed {
    /// Signer allowed to publish rates
    pub authority: Pubkey,          // 32 bytes

    pub rates: Vec<AssetRate>,      // 4 + (n * 48) bytes
}

impl RateFeed {
    pub const SPACE: usize = 8 + 32 + 4 + (MAX_RATES * ASSET_RATE_SIZE) + 64;

    pub fn set_rate(&mut self, asset: Pubkey, rate: u64, now: i64) -> Result<()> {
        require!(rate > 0, VaultError::ZeroAmount);

        if let Some(entry) = self.rates.iter_mut().find(|r| r.asset == asset) {
            entry.rate = rate;
            entry.updated_at = now;
            return Ok(());
        }

        require!(self.rates.len() < MAX_RATES, VaultError::RegistryFull);
        self.rates.push(AssetRate {
            asset,
            rate,
            updated_at: now,
        });
        Ok(())
    }
}

impl RateOracle for RateFeed {
    fn get_rate(&self, asset: &Pubkey) -> Result<u64> {
        self.rates
            .iter()
            .find(|r| r.asset == *asset)
            .map(|r| r.rate)
            .ok_or_else(|| error!(VaultError::RateNotFound))
    }
}

/// One configured `(target, selector)` rule
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct RuleEntry {
    pub target: Pubkey,
    pub selector: [u8; 4],
    pub rule: FunctionRule,
}

/// Allow-list of outbound calls the Processor role may trigger
#[account]
pub struct ProcessorRules {
    /// Vault this rule book belongs to
    pub vault: Pubkey,              // 32 bytes

    pub rules: Vec<RuleEntry>,      // 4 + (n * RULE_ENTRY_SIZE) bytes

    /// Bump seed for PDA
    pub bump: u8,                   // 1 byte
}

impl ProcessorRules {
    /// 8 (discriminator) + 32 (vault) + 4 (vec len) + rules + 1 (bump)
    pub const SPACE: usize = 8 + 32 + 4 + (MAX_FUNCTION_RULES * RULE_ENTRY_SIZE) + 1;

    pub fn find(&self, target: &Pubkey, selector: &[u8; 4]) -> Option<&FunctionRule> {
        self.rules
            .iter()
            .find(|r| r.target == *target && r.selector == *selector)
            .map(|r| &r.rule)
    }

    /// Insert or replace the rule for `(target, selector)`
    pub fn set_rule(&mut self, target: Pubkey, selector: [u8; 4], rule: FunctionRule) -> Result<()> {
        require!(target != Pubkey::default(), VaultError::InvalidTarget);
        rule.check_limits()?;

        if let Some(entry) = self
            .rules
            .iter_mut()
            .find(|r| r.target == target && r.selector == selector)
        {
            entry.rule = rule;
            return Ok(());
        }

        require!(
            self.rules.len() < MAX_FUNCTION_RULES,
            VaultError::RegistryFull
        );
        self.rules.push(RuleEntry {
            target,
            selector,
            rule,
        });
        Ok(())
    }

    /// Check one outbound call against its rule without executing it
    pub fn validate_call(&self, call: &OutboundCall<'_>, vault_authority: &Pubkey) -> Result<()> {
        let target = &call.target;
        require!(*target != Pubkey::default(), VaultError::InvalidTarget);

        let (selector, params) = split_selector(call.data)?;
        let rule = self
            .find(target, &selector)
            .filter(|rule| rule.is_active)
            .ok_or(VaultError::InvalidFunction)?;

        let decoded = decode_params(params, &rule.param_rules)?;
        validate_params(&decoded, &rule.param_rules)
            .and_then(|()| rule.validate_accounts(call.accounts, call.value, vault_authority))
            .map_err(|err| {
                msg!("call to {} selector {:?} rejected", target, selector);
                err
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedRates(Vec<(Pubkey, u64)>);

    impl RateOracle for FixedRates {
        fn get_rate(&self, asset: &Pubkey) -> Result<u64> {
            self.0
                .iter()
                .find(|(a, _)| a == asset)
                .map(|(_, rate)| *rate)
                .ok_or_else(|| error!(VaultError::RateNotFound))
        }
    }

    fn mock_vault(total_base_assets: u64) -> VaultState {
        VaultState {
            authority: Pubkey::new_unique(),
            processor: Pubkey::new_unique(),
            share_mint: Pubkey::default(),
            rate_provider: Pubkey::new_unique(),
            total_base_assets,
            vault_id: 0,
            paused: false,
            locked: false,
            bump: 0,
            share_bump: 0,
            authority_bump: 0,
            _reserved: [0; 64],
        }
    }

    fn asset(decimals: u8) -> AssetEntry {
        AssetEntry {
            asset: Pubkey::new_unique(),
            index: 1,
            active: true,
            decimals,
            idle_assets: 0,
            deployed_assets: 0,
        }
    }

    #[test]
    fn test_first_deposit_is_one_to_one() {
        let vault = mock_vault(0);
        let usdc = asset(6);
        let rates = FixedRates(vec![(usdc.asset, 1_000_000)]);

        let settlement = vault.plan_deposit(&rates, &usdc, 1000, 0).unwrap();
        assert_eq!(settlement.base, 1000);
        assert_eq!(settlement.shares, 1000);
    }

    #[test]
    fn test_deposit_values_asset_at_rate() {
        // 1 SOL-like asset (9 decimals) worth 2.0 base units per unit
        let vault = mock_vault(1_000);
        let sol = asset(9);
        let rates = FixedRates(vec![(sol.asset, 2_000_000_000)]);

        let settlement = vault.plan_deposit(&rates, &sol, 500, 1_000).unwrap();
        assert_eq!(settlement.base, 1_000);
        // 1000 * 1001 / 1001
        assert_eq!(settlement.shares, 1_000);
    }

    #[test]
    fn test_deposit_rejects_inactive_asset() {
        let vault = mock_vault(0);
        let mut usdc = asset(6);
        usdc.active = false;
        let rates = FixedRates(vec![(usdc.asset, 1_000_000)]);

        assert!(vault.plan_deposit(&rates, &usdc, 1000, 0).is_err());
    }

    #[test]
    fn test_deposit_without_rate_fails() {
        let vault = mock_vault(0);
        let usdc = asset(6);
        let rates = FixedRates(vec![]);

        assert!(vault.plan_deposit(&rates, &usdc, 1000, 0).is_err());
    }

    #[test]
    fn test_mint_rounds_assets_up() {
        // 1000 base backing 999 shares
        let vault = mock_vault(1000);
        let usdc = asset(6);
        let rates = FixedRates(vec![(usdc.asset, 1_000_000)]);

        let settlement = vault.plan_mint(&rates, &usdc, 100, 999).unwrap();
        // 100 * 1001 / 1000 = 100.1 -> 101
        assert_eq!(settlement.assets, 101);
        assert_eq!(settlement.base, 101);

        let quoted = vault.plan_deposit(&rates, &usdc, settlement.assets, 999).unwrap();
        assert!(quoted.shares >= settlement.shares);
    }

    #[test]
    fn test_redeem_over_max_fails() {
        let vault = mock_vault(1000);
        let usdc = asset(6);
        let rates = FixedRates(vec![(usdc.asset, 1_000_000)]);

        assert!(vault
            .plan_redeem(&rates, &usdc, 501, 500, 1000, 1000)
            .is_err());
        assert!(vault
            .plan_redeem(&rates, &usdc, 500, 500, 1000, 1000)
            .is_ok());
    }

    #[test]
    fn test_withdraw_burns_ceiling_shares() {
        // 2000 base backing 1000 shares
        let vault = mock_vault(2000);
        let usdc = asset(6);
        let rates = FixedRates(vec![(usdc.asset, 1_000_000)]);

        let settlement = vault
            .plan_withdraw(&rates, &usdc, 1001, 1000, 1000, 2000)
            .unwrap();
        // 1001 * 1001 / 2001 = 500.75 -> 501
        assert_eq!(settlement.shares, 501);
    }

    #[test]
    fn test_withdraw_capped_by_idle_balance() {
        let vault = mock_vault(2000);
        let usdc = asset(6);
        let rates = FixedRates(vec![(usdc.asset, 1_000_000)]);

        let max = vault.max_withdraw(&rates, &usdc, 1000, 1000, 300).unwrap();
        assert_eq!(max, 300);
        assert!(vault
            .plan_withdraw(&rates, &usdc, 301, 1000, 1000, 300)
            .is_err());
    }

    #[test]
    fn test_paused_limits_are_zero() {
        let mut vault = mock_vault(2000);
        vault.paused = true;
        let usdc = asset(6);
        let rates = FixedRates(vec![(usdc.asset, 1_000_000)]);

        assert_eq!(vault.max_deposit(&usdc), 0);
        assert_eq!(vault.max_redeem(1000), 0);
        assert_eq!(vault.max_withdraw(&rates, &usdc, 1000, 1000, 2000).unwrap(), 0);
    }

    #[test]
    fn test_lock_rejects_reentry() {
        let mut vault = mock_vault(0);
        vault.enter().unwrap();
        assert!(vault.enter().is_err());
        vault.leave();
        assert!(vault.enter().is_ok());
    }

    #[test]
    fn test_allowance() {
        let owner = Pubkey::new_unique();
        let spender = Pubkey::new_unique();

        assert_eq!(spendable_allowance(&owner, &owner, None, 0), u64::MAX);
        assert_eq!(spendable_allowance(&owner, &spender, Some(spender), 40), 40);
        assert_eq!(
            spendable_allowance(&owner, &spender, Some(Pubkey::new_unique()), 40),
            0
        );
        assert_eq!(spendable_allowance(&owner, &spender, None, 40), 0);
    }

    #[test]
    fn test_registry_indexes_start_at_one() {
        let mut registry = AssetRegistry {
            vault: Pubkey::new_unique(),
            assets: vec![],
            bump: 0,
        };
        let first = Pubkey::new_unique();
        let second = Pubkey::new_unique();

        assert_eq!(registry.add(first, 6, true).unwrap().index, 1);
        assert_eq!(registry.add(second, 9, false).unwrap().index, 2);
        assert_eq!(registry.index_of(&first), 1);
        assert_eq!(registry.index_of(&Pubkey::new_unique()), ABSENT_INDEX);
    }

    #[test]
    fn test_rate_feed_upsert() {
        let mut feed = RateFeed {
            authority: Pubkey::new_unique(),
            rates: vec![],
        };
        let usdc = Pubkey::new_unique();

        feed.set_rate(usdc, 1_000_000, 1).unwrap();
        feed.set_rate(usdc, 1_010_000, 2).unwrap();

        assert_eq!(feed.rates.len(), 1);
        assert_eq!(feed.get_rate(&usdc).unwrap(), 1_010_000);
        assert!(feed.set_rate(usdc, 0, 3).is_err());
        assert!(feed.get_rate(&Pubkey::new_unique()).is_err());
    }
}
