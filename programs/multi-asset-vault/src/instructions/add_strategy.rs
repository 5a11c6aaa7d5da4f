use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::AssociatedToken,
    token::{Mint, Token, TokenAccount},
};

use crate::{constants::*, errors::*, events::*, state::*};

/// Approve a strategy, identified by the receipt token it issues the vault
///
/// Architecture: a strategy is valued through the vault's receipt balance,
/// so the registry keys it by the receipt mint and records the registered
/// asset it deploys.
#[derive(Accounts)]
pub struct AddStrategy<'info> {
    #[account(mut)]
    pub authority: Signer<'info>,

    #[account(
        seeds = [VAULT_SEED, vault_state.vault_id.to_le_bytes().as_ref()],
        bump = vault_state.bump,
        has_one = authority @ VaultError::Unauthorized,
    )]
    pub vault_state: Account<'info, VaultState>,

    /// Underlying asset must already be registered
    #[account(
        seeds = [ASSET_REGISTRY_SEED, vault_state.key().as_ref()],
        bump = asset_registry.bump,
    )]
    pub asset_registry: Account<'info, AssetRegistry>,

    /// Strategy registry PDA
    /// Security: Initialized on first add_strategy call
    #[account(
        init_if_needed,
        payer = authority,
        space = StrategyRegistry::SPACE,
        seeds = [STRATEGY_REGISTRY_SEED, vault_state.key().as_ref()],
        bump
    )]
    pub strategy_registry: Account<'info, StrategyRegistry>,

    /// Receipt token mint of the strategy
    pub receipt_mint: Account<'info, Mint>,

    /// CHECK: PDA used as authority, validated by seeds
    #[account(
        seeds = [VAULT_AUTHORITY_SEED, vault_state.key().as_ref()],
        bump = vault_state.authority_bump,
    )]
    pub vault_authority: UncheckedAccount<'info>,

    /// Vault's receipt balance, read by the accounting sweep
    #[account(
        init_if_needed,
        payer = authority,
        associated_token::mint = receipt_mint,
        associated_token::authority = vault_authority,
    )]
    pub vault_receipt_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<AddStrategy>, asset: Pubkey, active: bool) -> Result<()> {
    require!(
        ctx.accounts.asset_registry.get(&asset).is_some(),
        VaultError::InvalidAsset
    );

    let registry = &mut ctx.accounts.strategy_registry;

    if registry.vault == Pubkey::default() {
        registry.vault = ctx.accounts.vault_state.key();
        registry.bump = ctx.bumps.strategy_registry;
        registry.strategies = Vec::new();
    }

    let strategy = ctx.accounts.receipt_mint.key();
    let decimals = ctx.accounts.receipt_mint.decimals;
    let index = registry.add(strategy, asset, decimals, active)?.index;

    emit!(StrategyAdded {
        vault: registry.vault,
        strategy,
        asset,
        index,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
