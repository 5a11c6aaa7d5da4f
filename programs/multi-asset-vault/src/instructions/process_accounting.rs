use anchor_lang::prelude::*;

use crate::{
    accounting::{self, AccountingSummary},
    constants::*,
    errors::*,
    events::*,
    state::*,
};

/// Revalue idle and deployed balances from the vault's token accounts
///
/// Remaining accounts: the vault token account of every registered asset in
/// registry order, then the vault receipt account of every registered
/// strategy in registry order. Permissionless.
#[derive(Accounts)]
pub struct ProcessAccounting<'info> {
    #[account(
        mut,
        seeds = [VAULT_SEED, vault_state.vault_id.to_le_bytes().as_ref()],
        bump = vault_state.bump,
    )]
    pub vault_state: Account<'info, VaultState>,

    #[account(
        mut,
        seeds = [ASSET_REGISTRY_SEED, vault_state.key().as_ref()],
        bump = asset_registry.bump,
    )]
    pub asset_registry: Account<'info, AssetRegistry>,

    /// Absent until the first add_strategy
    #[account(
        mut,
        seeds = [STRATEGY_REGISTRY_SEED, vault_state.key().as_ref()],
        bump = strategy_registry.bump,
    )]
    pub strategy_registry: Option<Account<'info, StrategyRegistry>>,

    #[account(
        constraint = rate_feed.key() == vault_state.rate_provider @ VaultError::RateProviderNotSet,
    )]
    pub rate_feed: Account<'info, RateFeed>,

    /// CHECK: PDA used as authority, validated by seeds
    #[account(
        seeds = [VAULT_AUTHORITY_SEED, vault_state.key().as_ref()],
        bump = vault_state.authority_bump,
    )]
    pub vault_authority: UncheckedAccount<'info>,
}

pub fn handler<'info>(ctx: Context<'_, '_, 'info, 'info, ProcessAccounting<'info>>) -> Result<()> {
    let vault_key = ctx.accounts.vault_state.key();
    let vault_authority = ctx.accounts.vault_authority.key();
    ctx.accounts.vault_state.enter()?;

    let mut no_strategies = StrategyRegistry {
        vault: vault_key,
        strategies: Vec::new(),
        bump: 0,
    };
    let strategies = match ctx.accounts.strategy_registry.as_mut() {
        Some(registry) => &mut **registry,
        None => &mut no_strategies,
    };
    let assets = &mut ctx.accounts.asset_registry;

    let (idle_balances, receipt_balances) =
        accounting::collect_balances(assets, strategies, ctx.remaining_accounts, &vault_authority)?;

    let AccountingSummary {
        idle_base_assets,
        deployed_base_assets,
    } = accounting::process_accounting(
        assets,
        strategies,
        &*ctx.accounts.rate_feed,
        &idle_balances,
        &receipt_balances,
    )?;

    let vault_state = &mut ctx.accounts.vault_state;
    vault_state.leave();

    msg!(
        "accounting: idle {} deployed {} recorded {}",
        idle_base_assets,
        deployed_base_assets,
        vault_state.total_base_assets
    );

    emit!(AccountingProcessed {
        vault: vault_key,
        idle_base_assets,
        deployed_base_assets,
        total_base_assets: vault_state.total_base_assets,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
