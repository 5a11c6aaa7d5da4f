use anchor_lang::prelude::*;

use crate::instructions::deposit::Deposit;

/// Mint exactly `shares`, pulling the ceiling asset amount they cost
pub fn handler(ctx: Context<Deposit>, shares: u64) -> Result<()> {
    let accounts = &ctx.accounts;
    let settlement = accounts.vault_state.plan_mint(
        &*accounts.rate_feed,
        accounts.asset()?,
        shares,
        accounts.share_mint.supply,
    )?;

    ctx.accounts.settle(settlement)
}
