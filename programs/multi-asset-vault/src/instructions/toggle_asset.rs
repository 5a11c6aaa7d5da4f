use anchor_lang::prelude::*;

use crate::{constants::*, errors::*, events::*, state::*};

/// Activate or deactivate a registered asset
#[derive(Accounts)]
pub struct ToggleAsset<'info> {
    pub authority: Signer<'info>,

    #[account(
        seeds = [VAULT_SEED, vault_state.vault_id.to_le_bytes().as_ref()],
        bump = vault_state.bump,
        has_one = authority @ VaultError::Unauthorized,
    )]
    pub vault_state: Account<'info, VaultState>,

    #[account(
        mut,
        seeds = [ASSET_REGISTRY_SEED, vault_state.key().as_ref()],
        bump = asset_registry.bump,
    )]
    pub asset_registry: Account<'info, AssetRegistry>,
}

pub fn handler(ctx: Context<ToggleAsset>, asset: Pubkey, active: bool) -> Result<()> {
    let registry = &mut ctx.accounts.asset_registry;
    registry.toggle(&asset, active)?;

    emit!(AssetToggled {
        vault: registry.vault,
        asset,
        active,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
