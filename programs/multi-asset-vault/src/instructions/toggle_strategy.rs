use anchor_lang::prelude::*;

use crate::{constants::*, errors::*, events::*, state::*};

/// Enable or disable an approved strategy
#[derive(Accounts)]
pub struct ToggleStrategy<'info> {
    pub authority: Signer<'info>,

    #[account(
        seeds = [VAULT_SEED, vault_state.vault_id.to_le_bytes().as_ref()],
        bump = vault_state.bump,
        has_one = authority @ VaultError::Unauthorized,
    )]
    pub vault_state: Account<'info, VaultState>,

    #[account(
        mut,
        seeds = [STRATEGY_REGISTRY_SEED, vault_state.key().as_ref()],
        bump = strategy_registry.bump,
    )]
    pub strategy_registry: Account<'info, StrategyRegistry>,
}

pub fn handler(ctx: Context<ToggleStrategy>, strategy: Pubkey, active: bool) -> Result<()> {
    let registry = &mut ctx.accounts.strategy_registry;
    registry.toggle(&strategy, active)?;

    emit!(StrategyToggled {
        vault: registry.vault,
        strategy,
        active,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
