use anchor_lang::prelude::*;

use crate::{constants::*, errors::*, events::*, state::*};

/// Accounts shared by role and configuration changes
#[derive(Accounts)]
pub struct Admin<'info> {
    /// Holder of the Admin role
    pub authority: Signer<'info>,

    /// Vault state PDA
    /// Security: has_one constraint validates authority from state
    #[account(
        mut,
        seeds = [VAULT_SEED, vault_state.vault_id.to_le_bytes().as_ref()],
        bump = vault_state.bump,
        has_one = authority @ VaultError::Unauthorized,
    )]
    pub vault_state: Account<'info, VaultState>,
}

#[derive(Accounts)]
pub struct SetRateProvider<'info> {
    pub authority: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault_state.vault_id.to_le_bytes().as_ref()],
        bump = vault_state.bump,
        has_one = authority @ VaultError::Unauthorized,
    )]
    pub vault_state: Account<'info, VaultState>,

    /// Rate feed the vault will read every conversion from
    /// Security: Account<RateFeed> checks owner and discriminator
    pub rate_feed: Account<'info, RateFeed>,
}

#[derive(Accounts)]
pub struct SetPaused<'info> {
    pub authority: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault_state.vault_id.to_le_bytes().as_ref()],
        bump = vault_state.bump,
        has_one = authority @ VaultError::Unauthorized,
    )]
    pub vault_state: Account<'info, VaultState>,

    /// Required to unpause; absent until the first add_asset
    #[account(
        seeds = [ASSET_REGISTRY_SEED, vault_state.key().as_ref()],
        bump = asset_registry.bump,
    )]
    pub asset_registry: Option<Account<'info, AssetRegistry>>,
}

pub fn grant_role(ctx: Context<Admin>, role: Role, grantee: Pubkey) -> Result<()> {
    require!(grantee != Pubkey::default(), VaultError::ZeroAddress);

    let vault_state = &mut ctx.accounts.vault_state;
    let holder = match role {
        Role::Admin => &mut vault_state.authority,
        Role::Processor => &mut vault_state.processor,
    };
    let previous = std::mem::replace(holder, grantee);

    emit!(RoleGranted {
        vault: vault_state.key(),
        role,
        previous,
        grantee,
    });

    Ok(())
}

pub fn set_rate_provider(ctx: Context<SetRateProvider>) -> Result<()> {
    let rate_provider = ctx.accounts.rate_feed.key();
    let vault_state = &mut ctx.accounts.vault_state;
    let previous = vault_state.rate_provider;
    vault_state.rate_provider = rate_provider;

    emit!(RateProviderSet {
        vault: vault_state.key(),
        previous,
        rate_provider,
    });

    Ok(())
}

pub fn set_paused(ctx: Context<SetPaused>, paused: bool) -> Result<()> {
    if !paused {
        let asset_count = ctx
            .accounts
            .asset_registry
            .as_ref()
            .map_or(0, |registry| registry.assets.len());
        ctx.accounts.vault_state.can_unpause(asset_count)?;
    }

    let vault_state = &mut ctx.accounts.vault_state;
    vault_state.paused = paused;

    emit!(PauseToggled {
        vault: vault_state.key(),
        paused,
    });

    Ok(())
}
