use anchor_lang::prelude::*;

use crate::{errors::*, events::*, state::*};

/// Create a rate feed owned by this program
#[derive(Accounts)]
pub struct InitializeRateFeed<'info> {
    /// Becomes the feed's updater
    #[account(mut)]
    pub authority: Signer<'info>,

    #[account(init, payer = authority, space = RateFeed::SPACE)]
    pub rate_feed: Account<'info, RateFeed>,

    pub system_program: Program<'info, System>,
}

/// Publish a rate on a feed
#[derive(Accounts)]
pub struct UpdateRate<'info> {
    pub authority: Signer<'info>,

    #[account(
        mut,
        has_one = authority @ VaultError::Unauthorized,
    )]
    pub rate_feed: Account<'info, RateFeed>,
}

pub fn initialize_rate_feed(ctx: Context<InitializeRateFeed>) -> Result<()> {
    let rate_feed = &mut ctx.accounts.rate_feed;
    rate_feed.authority = ctx.accounts.authority.key();
    rate_feed.rates = Vec::new();
    Ok(())
}

pub fn update_rate(ctx: Context<UpdateRate>, asset: Pubkey, rate: u64) -> Result<()> {
    require!(asset != Pubkey::default(), VaultError::ZeroAddress);

    let timestamp = Clock::get()?.unix_timestamp;
    let rate_feed = &mut ctx.accounts.rate_feed;
    rate_feed.set_rate(asset, rate, timestamp)?;

    emit!(RateUpdated {
        rate_feed: rate_feed.key(),
        asset,
        rate,
        timestamp,
    });

    Ok(())
}
