use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::AssociatedToken,
    token::{Mint, Token, TokenAccount},
};

use crate::{constants::*, errors::*, events::*, state::*};

/// Register a new asset and open the vault's token account for it
#[derive(Accounts)]
pub struct AddAsset<'info> {
    /// Holder of the Admin role, pays for the registry and token account
    #[account(mut)]
    pub authority: Signer<'info>,

    /// Vault state PDA
    /// Security: has_one constraint validates authority from state
    #[account(
        seeds = [VAULT_SEED, vault_state.vault_id.to_le_bytes().as_ref()],
        bump = vault_state.bump,
        has_one = authority @ VaultError::Unauthorized,
    )]
    pub vault_state: Account<'info, VaultState>,

    /// Asset registry PDA
    /// Security: Initialized on first add_asset call
    #[account(
        init_if_needed,
        payer = authority,
        space = AssetRegistry::SPACE,
        seeds = [ASSET_REGISTRY_SEED, vault_state.key().as_ref()],
        bump
    )]
    pub asset_registry: Account<'info, AssetRegistry>,

    /// Mint of the asset being registered; decimals are read from it
    pub asset_mint: Account<'info, Mint>,

    /// CHECK: PDA used as authority, validated by seeds
    #[account(
        seeds = [VAULT_AUTHORITY_SEED, vault_state.key().as_ref()],
        bump = vault_state.authority_bump,
    )]
    pub vault_authority: UncheckedAccount<'info>,

    /// Vault's idle balance of the asset
    #[account(
        init_if_needed,
        payer = authority,
        associated_token::mint = asset_mint,
        associated_token::authority = vault_authority,
    )]
    pub vault_token_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<AddAsset>, active: bool) -> Result<()> {
    let registry = &mut ctx.accounts.asset_registry;

    // Initialize registry if first time
    if registry.vault == Pubkey::default() {
        registry.vault = ctx.accounts.vault_state.key();
        registry.bump = ctx.bumps.asset_registry;
        registry.assets = Vec::new();
    }

    let asset = ctx.accounts.asset_mint.key();
    let decimals = ctx.accounts.asset_mint.decimals;
    let index = registry.add(asset, decimals, active)?.index;

    emit!(AssetAdded {
        vault: registry.vault,
        asset,
        index,
        decimals,
        active,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
