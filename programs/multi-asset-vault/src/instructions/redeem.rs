use anchor_lang::prelude::*;

use crate::instructions::withdraw::Withdraw;

/// Burn exactly `shares` for the floor asset amount they are worth
pub fn handler(ctx: Context<Withdraw>, shares: u64) -> Result<()> {
    let accounts = &ctx.accounts;
    let settlement = accounts.vault_state.plan_redeem(
        &*accounts.rate_feed,
        accounts.asset()?,
        shares,
        accounts.owner_share_account.amount,
        accounts.share_mint.supply,
        accounts.vault_token_account.amount,
    )?;

    ctx.accounts.settle(settlement)
}
