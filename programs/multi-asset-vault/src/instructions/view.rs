//! Read-only entry points. Each returns its value through Anchor return data
//! and leaves every account untouched.

use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, TokenAccount};

use crate::{
    constants::*,
    errors::*,
    math::Rounding,
    processor::FunctionRule,
    state::*,
};

#[derive(Accounts)]
pub struct ReadAssets<'info> {
    #[account(
        seeds = [VAULT_SEED, vault_state.vault_id.to_le_bytes().as_ref()],
        bump = vault_state.bump,
    )]
    pub vault_state: Account<'info, VaultState>,

    #[account(
        seeds = [ASSET_REGISTRY_SEED, vault_state.key().as_ref()],
        bump = asset_registry.bump,
    )]
    pub asset_registry: Account<'info, AssetRegistry>,
}

#[derive(Accounts)]
pub struct ReadStrategies<'info> {
    #[account(
        seeds = [VAULT_SEED, vault_state.vault_id.to_le_bytes().as_ref()],
        bump = vault_state.bump,
    )]
    pub vault_state: Account<'info, VaultState>,

    #[account(
        seeds = [STRATEGY_REGISTRY_SEED, vault_state.key().as_ref()],
        bump = strategy_registry.bump,
    )]
    pub strategy_registry: Account<'info, StrategyRegistry>,
}

#[derive(Accounts)]
pub struct ReadRules<'info> {
    #[account(
        seeds = [VAULT_SEED, vault_state.vault_id.to_le_bytes().as_ref()],
        bump = vault_state.bump,
    )]
    pub vault_state: Account<'info, VaultState>,

    #[account(
        seeds = [PROCESSOR_RULES_SEED, vault_state.key().as_ref()],
        bump = processor_rules.bump,
    )]
    pub processor_rules: Account<'info, ProcessorRules>,
}

/// Base-unit conversions against the current share supply
#[derive(Accounts)]
pub struct ReadVault<'info> {
    #[account(
        seeds = [VAULT_SEED, vault_state.vault_id.to_le_bytes().as_ref()],
        bump = vault_state.bump,
    )]
    pub vault_state: Account<'info, VaultState>,

    #[account(address = vault_state.share_mint)]
    pub share_mint: Account<'info, Mint>,
}

/// Quotes in one registered asset
#[derive(Accounts)]
pub struct Quote<'info> {
    #[account(
        seeds = [VAULT_SEED, vault_state.vault_id.to_le_bytes().as_ref()],
        bump = vault_state.bump,
    )]
    pub vault_state: Account<'info, VaultState>,

    #[account(address = vault_state.share_mint)]
    pub share_mint: Account<'info, Mint>,

    #[account(
        seeds = [ASSET_REGISTRY_SEED, vault_state.key().as_ref()],
        bump = asset_registry.bump,
    )]
    pub asset_registry: Account<'info, AssetRegistry>,

    #[account(
        constraint = rate_feed.key() == vault_state.rate_provider @ VaultError::RateProviderNotSet,
    )]
    pub rate_feed: Account<'info, RateFeed>,

    pub asset_mint: Account<'info, Mint>,
}

/// Owner-specific limits in one registered asset
#[derive(Accounts)]
pub struct QuoteOwner<'info> {
    #[account(
        seeds = [VAULT_SEED, vault_state.vault_id.to_le_bytes().as_ref()],
        bump = vault_state.bump,
    )]
    pub vault_state: Account<'info, VaultState>,

    #[account(address = vault_state.share_mint)]
    pub share_mint: Account<'info, Mint>,

    #[account(
        seeds = [ASSET_REGISTRY_SEED, vault_state.key().as_ref()],
        bump = asset_registry.bump,
    )]
    pub asset_registry: Account<'info, AssetRegistry>,

    #[account(
        constraint = rate_feed.key() == vault_state.rate_provider @ VaultError::RateProviderNotSet,
    )]
    pub rate_feed: Account<'info, RateFeed>,

    pub asset_mint: Account<'info, Mint>,

    /// CHECK: PDA used as authority, validated by seeds
    #[account(
        seeds = [VAULT_AUTHORITY_SEED, vault_state.key().as_ref()],
        bump = vault_state.authority_bump,
    )]
    pub vault_authority: UncheckedAccount<'info>,

    /// Owner's share balance
    #[account(
        constraint = owner_share_account.mint == vault_state.share_mint @ VaultError::InvalidMint,
    )]
    pub owner_share_account: Account<'info, TokenAccount>,

    /// Vault's idle balance of the asset
    #[account(
        constraint = vault_token_account.mint == asset_mint.key() @ VaultError::InvalidMint,
        constraint = vault_token_account.owner == vault_authority.key() @ VaultError::InvalidOwner,
    )]
    pub vault_token_account: Account<'info, TokenAccount>,
}

impl<'info> Quote<'info> {
    fn asset(&self) -> Result<&AssetEntry> {
        self.asset_registry
            .get(&self.asset_mint.key())
            .ok_or_else(|| error!(VaultError::InvalidAsset))
    }
}

impl<'info> QuoteOwner<'info> {
    fn asset(&self) -> Result<&AssetEntry> {
        self.asset_registry
            .get(&self.asset_mint.key())
            .ok_or_else(|| error!(VaultError::InvalidAsset))
    }
}

pub fn get_assets(ctx: Context<ReadAssets>) -> Result<Vec<AssetEntry>> {
    Ok(ctx.accounts.asset_registry.assets.clone())
}

pub fn get_asset(ctx: Context<ReadAssets>, asset: Pubkey) -> Result<AssetEntry> {
    ctx.accounts
        .asset_registry
        .get(&asset)
        .cloned()
        .ok_or_else(|| error!(VaultError::AssetNotFound))
}

pub fn get_strategies(ctx: Context<ReadStrategies>) -> Result<Vec<StrategyEntry>> {
    Ok(ctx.accounts.strategy_registry.strategies.clone())
}

pub fn get_strategy(ctx: Context<ReadStrategies>, strategy: Pubkey) -> Result<StrategyEntry> {
    ctx.accounts
        .strategy_registry
        .get(&strategy)
        .cloned()
        .ok_or_else(|| error!(VaultError::StrategyNotFound))
}

pub fn get_processor_rule(
    ctx: Context<ReadRules>,
    target: Pubkey,
    selector: [u8; 4],
) -> Result<Option<FunctionRule>> {
    Ok(ctx.accounts.processor_rules.find(&target, &selector).cloned())
}

pub fn total_assets(ctx: Context<ReadVault>) -> Result<u64> {
    Ok(ctx.accounts.vault_state.total_base_assets)
}

/// Shares `base` units are worth, floored
pub fn convert_to_shares(ctx: Context<ReadVault>, base: u64) -> Result<u64> {
    let accounts = &ctx.accounts;
    accounts
        .vault_state
        .convert_to_shares(base, accounts.share_mint.supply, Rounding::Floor)
}

/// Base units `shares` are worth, floored
pub fn convert_to_assets(ctx: Context<ReadVault>, shares: u64) -> Result<u64> {
    let accounts = &ctx.accounts;
    accounts
        .vault_state
        .convert_to_assets(shares, accounts.share_mint.supply, Rounding::Floor)
}

pub fn preview_deposit(ctx: Context<Quote>, assets: u64) -> Result<u64> {
    let accounts = &ctx.accounts;
    let base = accounts.asset()?.to_base(&*accounts.rate_feed, assets)?;
    accounts
        .vault_state
        .preview_deposit(base, accounts.share_mint.supply)
}

/// Asset amount `mint` would pull for `shares`
pub fn preview_mint(ctx: Context<Quote>, shares: u64) -> Result<u64> {
    let accounts = &ctx.accounts;
    let base = accounts
        .vault_state
        .preview_mint(shares, accounts.share_mint.supply)?;
    accounts
        .asset()?
        .from_base(&*accounts.rate_feed, base, Rounding::Ceiling)
}

/// Shares `withdraw` would burn for `assets`
pub fn preview_withdraw(ctx: Context<Quote>, assets: u64) -> Result<u64> {
    let accounts = &ctx.accounts;
    let base = accounts
        .asset()?
        .to_base_rounded(&*accounts.rate_feed, assets, Rounding::Ceiling)?;
    accounts
        .vault_state
        .preview_withdraw(base, accounts.share_mint.supply)
}

/// Asset amount `redeem` would pay for `shares`
pub fn preview_redeem(ctx: Context<Quote>, shares: u64) -> Result<u64> {
    let accounts = &ctx.accounts;
    let base = accounts
        .vault_state
        .preview_redeem(shares, accounts.share_mint.supply)?;
    accounts
        .asset()?
        .from_base(&*accounts.rate_feed, base, Rounding::Floor)
}

pub fn max_deposit(ctx: Context<Quote>) -> Result<u64> {
    let accounts = &ctx.accounts;
    Ok(accounts.vault_state.max_deposit(accounts.asset()?))
}

pub fn max_mint(ctx: Context<Quote>) -> Result<u64> {
    let accounts = &ctx.accounts;
    Ok(accounts.vault_state.max_mint(accounts.asset()?))
}

pub fn max_withdraw(ctx: Context<QuoteOwner>) -> Result<u64> {
    let accounts = &ctx.accounts;
    accounts.vault_state.max_withdraw(
        &*accounts.rate_feed,
        accounts.asset()?,
        accounts.owner_share_account.amount,
        accounts.share_mint.supply,
        accounts.vault_token_account.amount,
    )
}

pub fn max_redeem(ctx: Context<QuoteOwner>) -> Result<u64> {
    Ok(ctx
        .accounts
        .vault_state
        .max_redeem(ctx.accounts.owner_share_account.amount))
}
