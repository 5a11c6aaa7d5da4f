use anchor_lang::prelude::*;
use anchor_spl::token::{self, Burn, Mint, Token, TokenAccount, Transfer};

use crate::{constants::*, errors::*, events::*, state::*};

/// Burn shares and pay out one registered asset
///
/// Shared by `withdraw` (exact assets out) and `redeem` (exact shares in).
/// A caller other than the share owner must be the owner's SPL delegate; the
/// burn spends that delegation.
#[derive(Accounts)]
pub struct Withdraw<'info> {
    /// Share owner or their delegate
    pub caller: Signer<'info>,

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

    #[account(
        constraint = rate_feed.key() == vault_state.rate_provider @ VaultError::RateProviderNotSet,
    )]
    pub rate_feed: Account<'info, RateFeed>,

    /// Mint of the asset paid out
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

    /// Share account burned from; its owner is the share owner
    #[account(
        mut,
        constraint = owner_share_account.mint == vault_state.share_mint @ VaultError::InvalidMint,
    )]
    pub owner_share_account: Account<'info, TokenAccount>,

    /// Asset account credited
    #[account(
        mut,
        constraint = receiver_asset_account.mint == asset_mint.key() @ VaultError::InvalidMint,
    )]
    pub receiver_asset_account: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = vault_token_account.mint == asset_mint.key() @ VaultError::InvalidMint,
        constraint = vault_token_account.owner == vault_authority.key() @ VaultError::InvalidOwner,
    )]
    pub vault_token_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

impl<'info> Withdraw<'info> {
    pub fn asset(&self) -> Result<&AssetEntry> {
        self.vault_state.require_unpaused()?;
        self.asset_registry.active_asset(&self.asset_mint.key())
    }

    /// Fail unless the caller may burn `shares` of the owner's balance
    fn check_allowance(&self, shares: u64) -> Result<()> {
        let owner_account = &self.owner_share_account;
        let allowance = spendable_allowance(
            &owner_account.owner,
            &self.caller.key(),
            Option::from(owner_account.delegate),
            owner_account.delegated_amount,
        );
        require_gte!(allowance, shares, VaultError::InsufficientAllowance);
        Ok(())
    }

    /// Move the quoted amounts: record, burn shares, pay assets
    pub fn settle(&mut self, settlement: Settlement) -> Result<()> {
        self.check_allowance(settlement.shares)?;

        let vault_state = &mut self.vault_state;
        vault_state.enter()?;

        // EFFECTS: Update vault state BEFORE the burn and payout
        vault_state.record_withdrawal(settlement.base)?;
        vault_state.exit(&crate::ID)?;

        // INTERACTIONS: Burn shares with the caller's authority (owner or delegate)
        let burn_ctx = CpiContext::new(
            self.token_program.to_account_info(),
            Burn {
                mint: self.share_mint.to_account_info(),
                from: self.owner_share_account.to_account_info(),
                authority: self.caller.to_account_info(),
            },
        );
        token::burn(burn_ctx, settlement.shares)?;

        let vault_key = self.vault_state.key();
        let authority_bump = self.vault_state.authority_bump;
        let authority_seeds: &[&[u8]] = &[
            VAULT_AUTHORITY_SEED,
            vault_key.as_ref(),
            &[authority_bump],
        ];
        let signer_seeds = &[&authority_seeds[..]];

        let transfer_ctx = CpiContext::new_with_signer(
            self.token_program.to_account_info(),
            Transfer {
                from: self.vault_token_account.to_account_info(),
                to: self.receiver_asset_account.to_account_info(),
                authority: self.vault_authority.to_account_info(),
            },
            signer_seeds,
        );
        token::transfer(transfer_ctx, settlement.assets)?;

        self.vault_state.leave();

        emit!(Withdrawn {
            vault: vault_key,
            caller: self.caller.key(),
            receiver: self.receiver_asset_account.owner,
            owner: self.owner_share_account.owner,
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

pub fn handler(ctx: Context<Withdraw>, assets: u64) -> Result<()> {
    let accounts = &ctx.accounts;
    let settlement = accounts.vault_state.plan_withdraw(
        &*accounts.rate_feed,
        accounts.asset()?,
        assets,
        accounts.owner_share_account.amount,
        accounts.share_mint.supply,
        accounts.vault_token_account.amount,
    )?;

    ctx.accounts.settle(settlement)
}
