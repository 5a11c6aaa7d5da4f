use anchor_lang::prelude::*;
use anchor_spl::token::{self, Mint, MintTo, Token, TokenAccount, Transfer};

use crate::{constants::*, errors::*, events::*, state::*};

/// Deposit one registered asset into the vault and receive shares
///
/// Shared by `deposit` (exact assets in) and `mint` (exact shares out).
///
/// Security checklist:
/// ✅ 1. SIGNER VALIDATION: Caller must be signer
/// ✅ 2. ACCOUNT OWNERSHIP: Vault state, registry and authority validated with seeds
/// ✅ 6. MATH SAFETY: Quote computed with checked u128 math before any mutation
/// ✅ 7. TOKEN ACCOUNT VALIDATION: Validates mint and owner
/// ✅ 8. BUSINESS LOGIC: Lock and total persisted before the transfer CPI
/// ✅ 10. EVENTS: Emits Deposited event
#[derive(Accounts)]
pub struct Deposit<'info> {
    /// User depositing assets
    #[account(mut)]
    pub caller: Signer<'info>,

    /// Vault state PDA
    #[account(
        mut,
        seeds = [VAULT_SEED, vault_state.vault_id.to_le_bytes().as_ref()],
        bump = vault_state.bump,
    )]
    pub vault_state: Account<'info, VaultState>,

    #[account(
        seeds = [ASSET_REGISTRY_SEED, vault_state.key().as_ref()],
        bump = asset_registry.bump,
    )]
    pub asset_registry: Account<'info, AssetRegistry>,

    /// Rate feed configured on the vault
    #[account(
        constraint = rate_feed.key() == vault_state.rate_provider @ VaultError::RateProviderNotSet,
    )]
    pub rate_feed: Account<'info, RateFeed>,

    /// Mint of the asset deposited; must be registered and active
    pub asset_mint: Account<'info, Mint>,

    #[account(
        mut,
        address = vault_state.share_mint,
    )]
    pub share_mint: Account<'info, Mint>,

    /// CHECK: PDA used as authority, validated by seeds
    #[account(
        seeds = [VAULT_AUTHORITY_SEED, vault_state.key().as_ref()],
        bump = vault_state.authority_bump,
    )]
    pub vault_authority: UncheckedAccount<'info>,

    /// Caller's asset token account (source)
    #[account(
        mut,
        constraint = caller_asset_account.mint == asset_mint.key() @ VaultError::InvalidMint,
        constraint = caller_asset_account.owner == caller.key() @ VaultError::InvalidOwner,
    )]
    pub caller_asset_account: Account<'info, TokenAccount>,

    /// Share account credited; its owner is the receiver
    #[account(
        mut,
        constraint = receiver_share_account.mint == vault_state.share_mint @ VaultError::InvalidMint,
    )]
    pub receiver_share_account: Account<'info, TokenAccount>,

    /// Vault's idle balance of the asset
    #[account(
        mut,
        constraint = vault_token_account.mint == asset_mint.key() @ VaultError::InvalidMint,
        constraint = vault_token_account.owner == vault_authority.key() @ VaultError::InvalidOwner,
    )]
    pub vault_token_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

impl<'info> Deposit<'info> {
    /// Resolve the deposited asset after the pause and rate-provider guards
    pub fn asset(&self) -> Result<&AssetEntry> {
        self.vault_state.require_unpaused()?;
        self.asset_registry.active_asset(&self.asset_mint.key())
    }

    /// Move the quoted amounts: record, pull assets, mint shares
    pub fn settle(&mut self, settlement: Settlement) -> Result<()> {
        let vault_state = &mut self.vault_state;
        vault_state.enter()?;

        // EFFECTS: Update vault state BEFORE external calls
        vault_state.record_deposit(settlement.base)?;
        vault_state.exit(&crate::ID)?;

        // INTERACTIONS: Transfer assets from caller to vault
        let transfer_ctx = CpiContext::new(
            self.token_program.to_account_info(),
            Transfer {
                from: self.caller_asset_account.to_account_info(),
                to: self.vault_token_account.to_account_info(),
                authority: self.caller.to_account_info(),
            },
        );
        token::transfer(transfer_ctx, settlement.assets)?;

        // Mint shares to receiver
        let vault_key = self.vault_state.key();
        let authority_bump = self.vault_state.authority_bump;
        let authority_seeds: &[&[u8]] = &[
            VAULT_AUTHORITY_SEED,
            vault_key.as_ref(),
            &[authority_bump],
        ];
        let signer_seeds = &[&authority_seeds[..]];

        let mint_ctx = CpiContext::new_with_signer(
            self.token_program.to_account_info(),
            MintTo {
                mint: self.share_mint.to_account_info(),
                to: self.receiver_share_account.to_account_info(),
                authority: self.vault_authority.to_account_info(),
            },
            signer_seeds,
        );
        token::mint_to(mint_ctx, settlement.shares)?;

        self.vault_state.leave();

        emit!(Deposited {
            vault: vault_key,
            caller: self.caller.key(),
            receiver: self.receiver_share_account.owner,
            asset: self.asset_mint.key(),
            assets: settlement.assets,
            base_assets: settlement.base,
            shares: settlement.shares,
            total_base_assets: self.vault_state.total_base_assets,
            timestamp: Clock::get()?.unix_timestamp,
        });

        Ok(())
    }
}

pub fn handler(ctx: Context<Deposit>, assets: u64) -> Result<()> {
    let accounts = &ctx.accounts;
    let settlement = accounts.vault_state.plan_deposit(
        &*accounts.rate_feed,
        accounts.asset()?,
        assets,
        accounts.share_mint.supply,
    )?;

    ctx.accounts.settle(settlement)
}
