use anchor_lang::prelude::*;

use crate::{constants::*, errors::*, events::*, processor::FunctionRule, state::*};

/// Insert or replace the rule for one `(target, selector)` pair
#[derive(Accounts)]
pub struct SetProcessorRule<'info> {
    #[account(mut)]
    pub authority: Signer<'info>,

    #[account(
        seeds = [VAULT_SEED, vault_state.vault_id.to_le_bytes().as_ref()],
        bump = vault_state.bump,
        has_one = authority @ VaultError::Unauthorized,
    )]
    pub vault_state: Account<'info, VaultState>,

    /// Processor rule book PDA
    /// Security: Initialized on first set_processor_rule call
    #[account(
        init_if_needed,
        payer = authority,
        space = ProcessorRules::SPACE,
        seeds = [PROCESSOR_RULES_SEED, vault_state.key().as_ref()],
        bump
    )]
    pub processor_rules: Account<'info, ProcessorRules>,

    pub system_program: Program<'info, System>,
}

pub fn handler(
    ctx: Context<SetProcessorRule>,
    target: Pubkey,
    selector: [u8; 4],
    rule: FunctionRule,
) -> Result<()> {
    let rules = &mut ctx.accounts.processor_rules;

    if rules.vault == Pubkey::default() {
        rules.vault = ctx.accounts.vault_state.key();
        rules.bump = ctx.bumps.processor_rules;
        rules.rules = Vec::new();
    }

    let is_active = rule.is_active;
    let params = rule.param_rules.len() as u8;
    let accounts = rule.account_rules.len() as u8;
    let allow_value = rule.allow_value;
    rules.set_rule(target, selector, rule)?;

    emit!(ProcessorRuleSet {
        vault: rules.vault,
        target,
        selector,
        is_active,
        params,
        accounts,
        allow_value,
    });

    Ok(())
}
