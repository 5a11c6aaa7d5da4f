use anchor_lang::prelude::*;
use anchor_spl::token::{self, TokenAccount};

use crate::{
    constants::ABSENT_INDEX,
    errors::VaultError,
    math,
    state::{AssetRegistry, RateOracle, StrategyRegistry},
};

/// Totals produced by one accounting sweep
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AccountingSummary {
    pub idle_base_assets: u64,
    pub deployed_base_assets: u64,
}

/// Balance of a token account that must hold `mint` for `owner`
pub fn vault_balance(info: &AccountInfo, mint: &Pubkey, owner: &Pubkey) -> Result<u64> {
    require_keys_eq!(*info.owner, token::ID, VaultError::InvalidOwner);

    let data = info.try_borrow_data()?;
    let account = TokenAccount::try_deserialize(&mut &data[..])?;
    require_keys_eq!(account.mint, *mint, VaultError::InvalidMint);
    require_keys_eq!(account.owner, *owner, VaultError::InvalidOwner);

    Ok(account.amount)
}

/// Read the sweep's raw balances from the vault's token accounts.
///
/// `accounts` holds the vault account of every registered asset in registry
/// order, then the receipt account of every registered strategy. Returns
/// `(idle_balances, receipt_balances)`.
pub fn collect_balances(
    assets: &AssetRegistry,
    strategies: &StrategyRegistry,
    accounts: &[AccountInfo],
    vault_authority: &Pubkey,
) -> Result<(Vec<u64>, Vec<u64>)> {
    let asset_count = assets.assets.len();
    require_eq!(
        accounts.len(),
        asset_count + strategies.strategies.len(),
        VaultError::ArrayLengthMismatch
    );
    let (asset_accounts, receipt_accounts) = accounts.split_at(asset_count);

    let idle_balances = assets
        .assets
        .iter()
        .zip(asset_accounts)
        .map(|(entry, info)| vault_balance(info, &entry.asset, vault_authority))
        .collect::<Result<Vec<_>>>()?;
    let receipt_balances = strategies
        .strategies
        .iter()
        .zip(receipt_accounts)
        .map(|(entry, info)| vault_balance(info, &entry.strategy, vault_authority))
        .collect::<Result<Vec<_>>>()?;

    Ok((idle_balances, receipt_balances))
}

/// Revalue every registered asset and strategy from raw token balances.
///
/// `idle_balances[i]` is the vault's balance of asset `i`, `receipt_balances[j]`
/// its balance of strategy `j`'s receipt token, both in registry order. Every
/// figure is overwritten, so a second sweep over unchanged balances is a no-op.
///
/// The result is informational: `VaultState::total_base_assets` is left alone.
pub fn process_accounting(
    assets: &mut AssetRegistry,
    strategies: &mut StrategyRegistry,
    oracle: &impl RateOracle,
    idle_balances: &[u64],
    receipt_balances: &[u64],
) -> Result<AccountingSummary> {
    require!(
        idle_balances.len() == assets.assets.len()
            && receipt_balances.len() == strategies.strategies.len(),
        VaultError::ArrayLengthMismatch
    );

    let mut summary = AccountingSummary::default();

    for (entry, balance) in assets.assets.iter_mut().zip(idle_balances) {
        entry.idle_assets = entry.to_base(oracle, *balance)?;
        entry.deployed_assets = 0;
        summary.idle_base_assets = summary
            .idle_base_assets
            .checked_add(entry.idle_assets)
            .ok_or(VaultError::MathOverflow)?;
    }

    for (strategy, balance) in strategies.strategies.iter_mut().zip(receipt_balances) {
        let rate = oracle.get_rate(&strategy.strategy)?;
        strategy.deployed_assets = math::to_base(*balance, rate, strategy.decimals)?;

        summary.deployed_base_assets = summary
            .deployed_base_assets
            .checked_add(strategy.deployed_assets)
            .ok_or(VaultError::MathOverflow)?;

        let index = assets.index_of(&strategy.asset);
        if index != ABSENT_INDEX {
            let underlying = &mut assets.assets[index as usize - 1];
            underlying.deployed_assets = underlying
                .deployed_assets
                .checked_add(strategy.deployed_assets)
                .ok_or(VaultError::MathOverflow)?;
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{AssetEntry, RateFeed, StrategyEntry};

    fn setup() -> (AssetRegistry, StrategyRegistry, RateFeed) {
        let usdc = Pubkey::new_unique();
        let sol = Pubkey::new_unique();
        let receipt = Pubkey::new_unique();

        let assets = AssetRegistry {
            vault: Pubkey::new_unique(),
            assets: vec![
                AssetEntry {
                    asset: usdc,
                    index: 1,
                    active: true,
                    decimals: 6,
                    idle_assets: 0,
                    deployed_assets: 0,
                },
                AssetEntry {
                    asset: sol,
                    index: 2,
                    active: false,
                    decimals: 9,
                    idle_assets: 0,
                    deployed_assets: 0,
                },
            ],
            bump: 0,
        };
        let strategies = StrategyRegistry {
            vault: assets.vault,
            strategies: vec![StrategyEntry {
                strategy: receipt,
                asset: usdc,
                index: 1,
                active: true,
                decimals: 6,
                deployed_assets: 0,
            }],
            bump: 0,
        };
        let mut feed = RateFeed {
            authority: Pubkey::new_unique(),
            rates: vec![],
        };
        feed.set_rate(usdc, 1_000_000, 0).unwrap();
        // Base units are USDC raw units; 1 SOL is worth 150 USDC
        feed.set_rate(sol, 150_000_000, 0).unwrap();
        // Receipt token appreciated 10%
        feed.set_rate(receipt, 1_100_000, 0).unwrap();

        (assets, strategies, feed)
    }

    #[test]
    fn test_sweep_revalues_balances() {
        let (mut assets, mut strategies, feed) = setup();

        let summary =
            process_accounting(&mut assets, &mut strategies, &feed, &[500, 2_000_000_000], &[1_000])
                .unwrap();

        assert_eq!(assets.assets[0].idle_assets, 500);
        // 2 SOL at 150
        assert_eq!(assets.assets[1].idle_assets, 300_000_000);
        assert_eq!(strategies.strategies[0].deployed_assets, 1_100);
        assert_eq!(assets.assets[0].deployed_assets, 1_100);
        assert_eq!(assets.assets[1].deployed_assets, 0);
        assert_eq!(
            summary,
            AccountingSummary {
                idle_base_assets: 300_000_500,
                deployed_base_assets: 1_100,
            }
        );
    }

    #[test]
    fn test_sweep_is_idempotent() {
        let (mut assets, mut strategies, feed) = setup();

        let first =
            process_accounting(&mut assets, &mut strategies, &feed, &[500, 7], &[1_000]).unwrap();
        let assets_after_first = assets.assets.clone();
        let strategies_after_first = strategies.strategies.clone();

        let second =
            process_accounting(&mut assets, &mut strategies, &feed, &[500, 7], &[1_000]).unwrap();

        assert_eq!(first, second);
        assert_eq!(assets.assets, assets_after_first);
        assert_eq!(strategies.strategies, strategies_after_first);
    }

    #[test]
    fn test_sweep_requires_every_balance() {
        let (mut assets, mut strategies, feed) = setup();

        let result = process_accounting(&mut assets, &mut strategies, &feed, &[500], &[1_000]);
        assert!(result.is_err());
    }
}
