use anchor_lang::{
    prelude::*,
    solana_program::{
        instruction::{AccountMeta, Instruction},
        program::{get_return_data, invoke_signed, set_return_data},
    },
    system_program,
};

use crate::{
    constants::*,
    errors::*,
    events::*,
    processor::{self, Batch, CallExecutor, OutboundCall},
    state::*,
};

/// Execute an allow-listed batch of outbound calls with the vault's authority
///
/// Architecture: Registry + rule book
/// - Every call is checked against `ProcessorRules` before any call runs
/// - Call `i` consumes the next `account_counts[i]` remaining accounts: the
///   target program first, then the instruction's accounts in order
/// - Instruction accounts must match the rule's pinned keys, so the vault
///   authority PDA signs only where a rule places it
/// - A failing call aborts the transaction, discarding the whole batch
#[derive(Accounts)]
pub struct ProcessCalls<'info> {
    /// Holder of the Processor role
    pub processor: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault_state.vault_id.to_le_bytes().as_ref()],
        bump = vault_state.bump,
        constraint = vault_state.has_role(Role::Processor, &processor.key()) @ VaultError::Unauthorized,
    )]
    pub vault_state: Account<'info, VaultState>,

    #[account(
        seeds = [PROCESSOR_RULES_SEED, vault_state.key().as_ref()],
        bump = processor_rules.bump,
    )]
    pub processor_rules: Account<'info, ProcessorRules>,

    /// Pays attached lamports and signs every call
    /// CHECK: PDA used as authority, validated by seeds
    #[account(
        mut,
        seeds = [VAULT_AUTHORITY_SEED, vault_state.key().as_ref()],
        bump = vault_state.authority_bump,
    )]
    pub vault_authority: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}

/// Performs validated calls as CPIs signed by the vault authority
struct CpiExecutor<'a, 'info> {
    /// Accounts of each call, target program first
    calls: Vec<&'a [AccountInfo<'info>]>,
    vault_authority: AccountInfo<'info>,
    system_program: AccountInfo<'info>,
    vault: Pubkey,
    authority_bump: u8,
}

impl<'a, 'info> CallExecutor for CpiExecutor<'a, 'info> {
    fn execute(&mut self, index: usize, call: &OutboundCall<'_>) -> Result<Vec<u8>> {
        let (program, accounts) = self.calls[index]
            .split_first()
            .ok_or(VaultError::InvalidTarget)?;

        let authority_seeds: &[&[u8]] = &[
            VAULT_AUTHORITY_SEED,
            self.vault.as_ref(),
            &[self.authority_bump],
        ];
        let signer_seeds = &[&authority_seeds[..]];

        if call.value > 0 {
            let recipient = accounts.first().ok_or(VaultError::ProcessInvalid)?;
            let transfer_ctx = CpiContext::new_with_signer(
                self.system_program.clone(),
                system_program::Transfer {
                    from: self.vault_authority.clone(),
                    to: recipient.clone(),
                },
                signer_seeds,
            );
            system_program::transfer(transfer_ctx, call.value)?;
        }

        let authority = self.vault_authority.key();
        let instruction = Instruction {
            program_id: call.target,
            accounts: accounts
                .iter()
                .map(|info| AccountMeta {
                    pubkey: info.key(),
                    is_signer: info.is_signer || info.key() == authority,
                    is_writable: info.is_writable,
                })
                .collect(),
            data: call.data.to_vec(),
        };

        let mut infos = accounts.to_vec();
        infos.push(program.clone());

        // Clear so a silent target cannot surface an earlier call's data
        set_return_data(&[]);
        // Errors returned here are raised before the callee runs (missing
        // account, privilege escalation, borrow conflict). A callee failure
        // aborts the transaction inside the runtime and never reaches this map.
        invoke_signed(&instruction, &infos, signer_seeds).map_err(|err| {
            msg!("call {} to {} could not be dispatched: {:?}", index, call.target, err);
            msg!("payload: {:?}", call.data);
            error!(VaultError::ProcessFailed)
        })?;

        Ok(match get_return_data() {
            Some((program_id, data)) if program_id == call.target => data,
            _ => Vec::new(),
        })
    }
}

pub fn handler<'info>(
    ctx: Context<'_, '_, 'info, 'info, ProcessCalls<'info>>,
    targets: Vec<Pubkey>,
    values: Vec<u64>,
    data: Vec<Vec<u8>>,
    account_counts: Vec<u8>,
) -> Result<Vec<Vec<u8>>> {
    require!(
        account_counts.len() == targets.len(),
        VaultError::ArrayLengthMismatch
    );

    // Partition remaining accounts per call; each slice leads with its target
    let mut calls = Vec::with_capacity(targets.len());
    let mut call_keys: Vec<Vec<Pubkey>> = Vec::with_capacity(targets.len());
    let mut rest: &'info [AccountInfo<'info>] = ctx.remaining_accounts;
    for (target, count) in targets.iter().zip(&account_counts) {
        let count = *count as usize;
        require!(
            count > 0 && count <= rest.len(),
            VaultError::ProcessInvalid
        );
        let (accounts, tail) = rest.split_at(count);
        require_keys_eq!(accounts[0].key(), *target, VaultError::InvalidTarget);
        require!(accounts[0].executable, VaultError::InvalidTarget);
        call_keys.push(accounts[1..].iter().map(|info| info.key()).collect());
        calls.push(accounts);
        rest = tail;
    }
    require!(rest.is_empty(), VaultError::ProcessInvalid);

    let vault_state = &mut ctx.accounts.vault_state;
    vault_state.enter()?;
    vault_state.exit(&crate::ID)?;

    let mut executor = CpiExecutor {
        calls,
        vault_authority: ctx.accounts.vault_authority.to_account_info(),
        system_program: ctx.accounts.system_program.to_account_info(),
        vault: ctx.accounts.vault_state.key(),
        authority_bump: ctx.accounts.vault_state.authority_bump,
    };

    let batch = Batch {
        targets: &targets,
        values: &values,
        data: &data,
        accounts: &call_keys,
    };
    let results = processor::process_batch(
        &ctx.accounts.processor_rules,
        &ctx.accounts.vault_authority.key(),
        &batch,
        &mut executor,
    )?;

    ctx.accounts.vault_state.leave();

    emit!(ProcessSuccess {
        vault: ctx.accounts.vault_state.key(),
        targets,
        values,
        data,
    });

    Ok(results)
}
