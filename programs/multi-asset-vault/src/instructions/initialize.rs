use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token};

use crate::{constants::*, events::*, state::*};

/// Create a vault, its share mint and its authority PDA
#[derive(Accounts)]
#[instruction(vault_id: u64, share_decimals: u8)]
pub struct Initialize<'info> {
    /// Initial holder of both the Admin and Processor roles
    /// Security: Must be signer, stored in state
    #[account(mut)]
    pub authority: Signer<'info>,

    /// Vault state PDA
    /// Security: Initialized with proper space and padding for upgrades
    #[account(
        init,
        payer = authority,
        space = VAULT_STATE_SIZE,
        seeds = [VAULT_SEED, vault_id.to_le_bytes().as_ref()],
        bump
    )]
    pub vault_state: Account<'info, VaultState>,

    /// Share token mint PDA (vault shares)
    /// Security: Mint authority is vault_authority PDA
    #[account(
        init,
        payer = authority,
        seeds = [SHARE_MINT_SEED, vault_state.key().as_ref()],
        bump,
        mint::decimals = share_decimals,
        mint::authority = vault_authority,
    )]
    pub share_mint: Account<'info, Mint>,

    /// Vault authority PDA - owns every vault token account and signs CPIs
    /// CHECK: PDA used as authority, validated by seeds
    #[account(
        seeds = [VAULT_AUTHORITY_SEED, vault_state.key().as_ref()],
        bump
    )]
    pub vault_authority: UncheckedAccount<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<Initialize>, vault_id: u64, _share_decimals: u8) -> Result<()> {
    let vault_state = &mut ctx.accounts.vault_state;

    // Paused until an admin sets a rate provider and registers an asset
    vault_state.authority = ctx.accounts.authority.key();
    vault_state.processor = ctx.accounts.authority.key();
    vault_state.share_mint = ctx.accounts.share_mint.key();
    vault_state.rate_provider = Pubkey::default();
    vault_state.total_base_assets = 0;
    vault_state.vault_id = vault_id;
    vault_state.paused = true;
    vault_state.locked = false;
    vault_state.bump = ctx.bumps.vault_state;
    vault_state.share_bump = ctx.bumps.share_mint;
    vault_state.authority_bump = ctx.bumps.vault_authority;
    vault_state._reserved = [0; 64];

    emit!(VaultInitialized {
        vault: vault_state.key(),
        authority: vault_state.authority,
        share_mint: vault_state.share_mint,
        vault_id,
        timestamp: Clock::get()?.unix_timestamp,
    });

    msg!("vault {} initialized (paused)", vault_id);

    Ok(())
}
