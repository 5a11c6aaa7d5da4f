// Multi-Asset Vault - ERC-4626-style vault over several whitelisted assets on Solana
// Architecture: Asset/strategy registries + rate feed + allow-listed call processor

use anchor_lang::prelude::*;

pub mod accounting;
pub mod constants;
pub mod errors;
pub mod events;
pub mod instructions;
pub mod math;
pub mod processor;
pub mod state;

use instructions::*;
use processor::FunctionRule;
use state::{AssetEntry, Role, StrategyEntry};

declare_id!("MAVtWs4qZ1Hn9bEYc8LdkJgV3rXpTu2oNfKm6RyAiQe");

#[program]
pub mod multi_asset_vault {
    use super::*;

    /// Create a vault with its share mint and authority PDA
    ///
    /// Security considerations:
    /// - Signer becomes both Admin and Processor
    /// - Vault starts paused until a rate provider and an asset are configured
    /// - Share mint authority is the vault authority PDA
    pub fn initialize(ctx: Context<Initialize>, vault_id: u64, share_decimals: u8) -> Result<()> {
        instructions::initialize::handler(ctx, vault_id, share_decimals)
    }

    /// Hand the Admin or Processor role to another key
    pub fn grant_role(ctx: Context<Admin>, role: Role, grantee: Pubkey) -> Result<()> {
        instructions::admin::grant_role(ctx, role, grantee)
    }

    /// Point the vault at the rate feed every conversion reads
    pub fn set_rate_provider(ctx: Context<SetRateProvider>) -> Result<()> {
        instructions::admin::set_rate_provider(ctx)
    }

    /// Pause or unpause user deposits and withdrawals
    ///
    /// Security considerations:
    /// - Unpausing requires a rate provider and at least one registered asset
    pub fn set_paused(ctx: Context<SetPaused>, paused: bool) -> Result<()> {
        instructions::admin::set_paused(ctx, paused)
    }

    /// Register the passed mint as a vault asset
    ///
    /// Security considerations:
    /// - Admin-only function
    /// - Rejects duplicates and enforces registry size limits
    /// - Decimals come from the mint, not from the caller
    pub fn add_asset(ctx: Context<AddAsset>, active: bool) -> Result<()> {
        instructions::add_asset::handler(ctx, active)
    }

    /// Toggle an asset on/off without touching its index or balances
    pub fn toggle_asset(ctx: Context<ToggleAsset>, asset: Pubkey, active: bool) -> Result<()> {
        instructions::toggle_asset::handler(ctx, asset, active)
    }

    /// Approve a strategy by its receipt mint, deploying a registered asset
    pub fn add_strategy(ctx: Context<AddStrategy>, asset: Pubkey, active: bool) -> Result<()> {
        instructions::add_strategy::handler(ctx, asset, active)
    }

    pub fn toggle_strategy(
        ctx: Context<ToggleStrategy>,
        strategy: Pubkey,
        active: bool,
    ) -> Result<()> {
        instructions::toggle_strategy::handler(ctx, strategy, active)
    }

    /// Insert or replace the processor rule for a target program and selector
    pub fn set_processor_rule(
        ctx: Context<SetProcessorRule>,
        target: Pubkey,
        selector: [u8; 4],
        rule: FunctionRule,
    ) -> Result<()> {
        instructions::set_processor_rule::handler(ctx, target, selector, rule)
    }

    pub fn initialize_rate_feed(ctx: Context<InitializeRateFeed>) -> Result<()> {
        instructions::rate_feed::initialize_rate_feed(ctx)
    }

    /// Publish the base-unit value of one whole unit of `asset`
    pub fn update_rate(ctx: Context<UpdateRate>, asset: Pubkey, rate: u64) -> Result<()> {
        instructions::rate_feed::update_rate(ctx, asset, rate)
    }

    /// Deposit exactly `assets` of one registered asset and receive shares
    ///
    /// Security considerations:
    /// - Validates token accounts (mint, owner)
    /// - Shares quoted with floor rounding before any mutation
    /// - Reentrancy lock and new total persisted before the transfer CPI
    /// - Emits event for tracking
    pub fn deposit(ctx: Context<Deposit>, assets: u64) -> Result<()> {
        instructions::deposit::handler(ctx, assets)
    }

    /// Mint exactly `shares`, paying the ceiling asset amount
    pub fn mint(ctx: Context<Deposit>, shares: u64) -> Result<()> {
        instructions::mint::handler(ctx, shares)
    }

    /// Withdraw exactly `assets`, burning the ceiling share amount
    ///
    /// Security considerations:
    /// - Caller other than the owner spends the owner's SPL delegation
    /// - Capped by the owner's floor-valued shares and the vault's idle balance
    /// - Total decremented and persisted before the payout CPI
    pub fn withdraw(ctx: Context<Withdraw>, assets: u64) -> Result<()> {
        instructions::withdraw::handler(ctx, assets)
    }

    /// Redeem exactly `shares` for the floor asset amount
    pub fn redeem(ctx: Context<Withdraw>, shares: u64) -> Result<()> {
        instructions::redeem::handler(ctx, shares)
    }

    /// Revalue idle and deployed balances from the vault's token accounts
    pub fn process_accounting<'info>(
        ctx: Context<'_, '_, 'info, 'info, ProcessAccounting<'info>>,
    ) -> Result<()> {
        instructions::process_accounting::handler(ctx)
    }

    /// Execute a batch of allow-listed calls signed by the vault authority
    ///
    /// Architecture: Validates every call against the processor rule book
    /// Security considerations:
    /// - Processor-role only
    /// - Instruction accounts and attached lamports must match the rule
    /// - Whole batch validated before the first call runs
    /// - Any failing call aborts the transaction
    /// - Emits event with the full batch
    pub fn processor<'info>(
        ctx: Context<'_, '_, 'info, 'info, ProcessCalls<'info>>,
        targets: Vec<Pubkey>,
        values: Vec<u64>,
        data: Vec<Vec<u8>>,
        account_counts: Vec<u8>,
    ) -> Result<Vec<Vec<u8>>> {
        instructions::process_calls::handler(ctx, targets, values, data, account_counts)
    }

    pub fn get_assets(ctx: Context<ReadAssets>) -> Result<Vec<AssetEntry>> {
        instructions::view::get_assets(ctx)
    }

    pub fn get_asset(ctx: Context<ReadAssets>, asset: Pubkey) -> Result<AssetEntry> {
        instructions::view::get_asset(ctx, asset)
    }

    pub fn get_strategies(ctx: Context<ReadStrategies>) -> Result<Vec<StrategyEntry>> {
        instructions::view::get_strategies(ctx)
    }

    pub fn get_strategy(ctx: Context<ReadStrategies>, strategy: Pubkey) -> Result<StrategyEntry> {
        instructions::view::get_strategy(ctx, strategy)
    }

    pub fn get_processor_rule(
        ctx: Context<ReadRules>,
        target: Pubkey,
        selector: [u8; 4],
    ) -> Result<Option<FunctionRule>> {
        instructions::view::get_processor_rule(ctx, target, selector)
    }

    /// Deposit-maintained total in base units
    pub fn total_assets(ctx: Context<ReadVault>) -> Result<u64> {
        instructions::view::total_assets(ctx)
    }

    pub fn convert_to_shares(ctx: Context<ReadVault>, base: u64) -> Result<u64> {
        instructions::view::convert_to_shares(ctx, base)
    }

    pub fn convert_to_assets(ctx: Context<ReadVault>, shares: u64) -> Result<u64> {
        instructions::view::convert_to_assets(ctx, shares)
    }

    pub fn preview_deposit(ctx: Context<Quote>, assets: u64) -> Result<u64> {
        instructions::view::preview_deposit(ctx, assets)
    }

    pub fn preview_mint(ctx: Context<Quote>, shares: u64) -> Result<u64> {
        instructions::view::preview_mint(ctx, shares)
    }

    pub fn preview_withdraw(ctx: Context<Quote>, assets: u64) -> Result<u64> {
        instructions::view::preview_withdraw(ctx, assets)
    }

    pub fn preview_redeem(ctx: Context<Quote>, shares: u64) -> Result<u64> {
        instructions::view::preview_redeem(ctx, shares)
    }

    pub fn max_deposit(ctx: Context<Quote>) -> Result<u64> {
        instructions::view::max_deposit(ctx)
    }

    pub fn max_mint(ctx: Context<Quote>) -> Result<u64> {
        instructions::view::max_mint(ctx)
    }

    pub fn max_withdraw(ctx: Context<QuoteOwner>) -> Result<u64> {
        instructions::view::max_withdraw(ctx)
    }

    pub fn max_redeem(ctx: Context<QuoteOwner>) -> Result<u64> {
        instructions::view::max_redeem(ctx)
    }
}
