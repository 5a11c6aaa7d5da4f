//! Rule engine behind the `processor` instruction.
//!
//! A payload is `selector (4 bytes) || params`, params laid out the Borsh way:
//! a `Uint256` is a 32-byte little-endian word, an `Address` a 32-byte key and
//! an array a `u32` little-endian length followed by its elements.
//!
//! Decoding and validation are separate passes so rules can be checked against
//! hand-built payloads. A call's instruction accounts and attached lamports are
//! arguments too: each rule pins the accounts by position and says whether a
//! value may be attached. Execution is behind [`CallExecutor`]; the on-chain
//! executor performs the CPI.

use anchor_lang::prelude::*;

use crate::{
    constants::{MAX_ALLOW_LIST, MAX_PARAMS, MAX_RULE_ACCOUNTS, SELECTOR_LEN, WORD_LEN},
    errors::VaultError,
    state::ProcessorRules,
};

/// ABI type of one positional parameter
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamType {
    Uint256,
    Address,
}

/// Acceptable values for one positional parameter.
///
/// An empty `allow_list` accepts any value of `param_type`. For `Uint256` the
/// entries are compared as raw 32-byte words.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct ParamRule {
    pub param_type: ParamType,
    pub is_array: bool,
    pub allow_list: Vec<Pubkey>,
}

/// Rule for one `(target, selector)` pair
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct FunctionRule {
    pub is_active: bool,
    pub param_rules: Vec<ParamRule>,
    /// Instruction accounts by position, target program excluded. The default
    /// key accepts any account except the vault authority.
    pub account_rules: Vec<Pubkey>,
    /// Whether lamports may be attached; they go to the first account
    pub allow_value: bool,
}

impl FunctionRule {
    pub fn check_limits(&self) -> Result<()> {
        require!(
            self.param_rules.len() <= MAX_PARAMS,
            VaultError::RuleTooLarge
        );
        require!(
            self.param_rules
                .iter()
                .all(|p| p.allow_list.len() <= MAX_ALLOW_LIST),
            VaultError::RuleTooLarge
        );
        require!(
            self.account_rules.len() <= MAX_RULE_ACCOUNTS,
            VaultError::RuleTooLarge
        );
        // The value recipient must be pinned
        require!(
            !self.allow_value
                || self
                    .account_rules
                    .first()
                    .is_some_and(|recipient| *recipient != Pubkey::default()),
            VaultError::InvalidRule
        );
        Ok(())
    }

    /// Check a call's instruction accounts and attached lamports
    pub fn validate_accounts(
        &self,
        accounts: &[Pubkey],
        value: u64,
        vault_authority: &Pubkey,
    ) -> Result<()> {
        require_eq!(
            self.account_rules.len(),
            accounts.len(),
            VaultError::AccountNotAllowed
        );

        for (position, (key, allowed)) in accounts.iter().zip(&self.account_rules).enumerate() {
            let permitted = if *allowed == Pubkey::default() {
                key != vault_authority
            } else {
                key == allowed
            };
            if !permitted {
                msg!("account {} rejected: {}", position, key);
                return err!(VaultError::AccountNotAllowed);
            }
        }

        require!(value == 0 || self.allow_value, VaultError::ValueNotAllowed);
        Ok(())
    }
}

/// Decoded scalar value
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParamValue {
    Uint256([u8; WORD_LEN]),
    Address(Pubkey),
}

impl ParamValue {
    /// Little-endian word holding `value`
    pub fn uint(value: u128) -> Self {
        let mut word = [0u8; WORD_LEN];
        word[..16].copy_from_slice(&value.to_le_bytes());
        ParamValue::Uint256(word)
    }

    fn word(&self) -> [u8; WORD_LEN] {
        match self {
            ParamValue::Uint256(word) => *word,
            ParamValue::Address(key) => key.to_bytes(),
        }
    }
}

/// Decoded positional argument
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecodedParam {
    Single(ParamValue),
    Array(Vec<ParamValue>),
}

impl DecodedParam {
    fn values(&self) -> &[ParamValue] {
        match self {
            DecodedParam::Single(value) => std::slice::from_ref(value),
            DecodedParam::Array(values) => values,
        }
    }
}

impl ParamRule {
    /// Whether `value` passes this rule's allow list
    pub fn permits(&self, value: &ParamValue) -> bool {
        if self.allow_list.is_empty() {
            return true;
        }
        let word = value.word();
        self.allow_list.iter().any(|allowed| allowed.to_bytes() == word)
    }
}

struct Cursor<'a> {
    data: &'a [u8],
}

impl<'a> Cursor<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        require!(self.data.len() >= len, VaultError::ProcessInvalid);
        let (head, tail) = self.data.split_at(len);
        self.data = tail;
        Ok(head)
    }

    fn word(&mut self) -> Result<[u8; WORD_LEN]> {
        let mut word = [0u8; WORD_LEN];
        word.copy_from_slice(self.take(WORD_LEN)?);
        Ok(word)
    }

    fn value(&mut self, param_type: ParamType) -> Result<ParamValue> {
        let word = self.word()?;
        Ok(match param_type {
            ParamType::Uint256 => ParamValue::Uint256(word),
            ParamType::Address => ParamValue::Address(Pubkey::new_from_array(word)),
        })
    }

    fn array_len(&mut self) -> Result<usize> {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(self.take(4)?);
        let len = u32::from_le_bytes(raw) as usize;
        // Each element is one word; reject lengths the payload cannot hold
        require!(
            len <= self.data.len() / WORD_LEN,
            VaultError::ProcessInvalid
        );
        Ok(len)
    }
}

/// Split a payload into its selector and encoded params
pub fn split_selector(payload: &[u8]) -> Result<([u8; SELECTOR_LEN], &[u8])> {
    require!(payload.len() >= SELECTOR_LEN, VaultError::InvalidFunction);
    let (head, params) = payload.split_at(SELECTOR_LEN);
    let mut selector = [0u8; SELECTOR_LEN];
    selector.copy_from_slice(head);
    Ok((selector, params))
}

/// Decode `params` positionally against `rules`.
///
/// The encoding must be consumed exactly; any missing or trailing byte means
/// the call does not have the shape the rule describes.
pub fn decode_params(params: &[u8], rules: &[ParamRule]) -> Result<Vec<DecodedParam>> {
    let mut cursor = Cursor { data: params };
    let mut decoded = Vec::with_capacity(rules.len());

    for rule in rules {
        let param = if rule.is_array {
            let len = cursor.array_len()?;
            let mut values = Vec::with_capacity(len);
            for _ in 0..len {
                values.push(cursor.value(rule.param_type)?);
            }
            DecodedParam::Array(values)
        } else {
            DecodedParam::Single(cursor.value(rule.param_type)?)
        };
        decoded.push(param);
    }

    require!(cursor.data.is_empty(), VaultError::ProcessInvalid);
    Ok(decoded)
}

/// Check every decoded value against its positional rule
pub fn validate_params(params: &[DecodedParam], rules: &[ParamRule]) -> Result<()> {
    require!(params.len() == rules.len(), VaultError::ProcessInvalid);

    for (position, (param, rule)) in params.iter().zip(rules).enumerate() {
        if let Some(rejected) = param.values().iter().find(|v| !rule.permits(v)) {
            msg!("param {} rejected: {:?}", position, rejected);
            return err!(VaultError::ParamNotAllowed);
        }
    }
    Ok(())
}

/// One entry of a processor batch
pub struct OutboundCall<'a> {
    pub target: Pubkey,
    pub value: u64,
    pub data: &'a [u8],
    /// Instruction account keys, target program excluded
    pub accounts: &'a [Pubkey],
}

/// A processor batch as submitted, one element per call in each slice
pub struct Batch<'a> {
    pub targets: &'a [Pubkey],
    pub values: &'a [u64],
    pub data: &'a [Vec<u8>],
    pub accounts: &'a [Vec<Pubkey>],
}

/// Performs a validated call and returns its return data
pub trait CallExecutor {
    fn execute(&mut self, index: usize, call: &OutboundCall<'_>) -> Result<Vec<u8>>;
}

/// Validate the whole batch, then execute it in order.
///
/// No call reaches the executor unless every call in the batch passed its
/// rule. A failing execution aborts the batch; the runtime discards the
/// effects of the calls that already ran.
pub fn process_batch<E: CallExecutor>(
    rules: &ProcessorRules,
    vault_authority: &Pubkey,
    batch: &Batch<'_>,
    executor: &mut E,
) -> Result<Vec<Vec<u8>>> {
    let len = batch.targets.len();
    require!(
        batch.values.len() == len && batch.data.len() == len && batch.accounts.len() == len,
        VaultError::ArrayLengthMismatch
    );

    let calls: Vec<OutboundCall<'_>> = (0..len)
        .map(|i| OutboundCall {
            target: batch.targets[i],
            value: batch.values[i],
            data: &batch.data[i],
            accounts: &batch.accounts[i],
        })
        .collect();

    for call in &calls {
        rules.validate_call(call, vault_authority)?;
    }

    let mut results = Vec::with_capacity(len);
    for (index, call) in calls.iter().enumerate() {
        results.push(executor.execute(index, call)?);
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address_rule(allow_list: Vec<Pubkey>) -> ParamRule {
        ParamRule {
            param_type: ParamType::Address,
            is_array: false,
            allow_list,
        }
    }

    fn uint_rule() -> ParamRule {
        ParamRule {
            param_type: ParamType::Uint256,
            is_array: false,
            allow_list: vec![],
        }
    }

    fn uint_word(value: u128) -> Vec<u8> {
        match ParamValue::uint(value) {
            ParamValue::Uint256(word) => word.to_vec(),
            ParamValue::Address(_) => unreachable!(),
        }
    }

    #[test]
    fn test_split_selector() {
        let (selector, params) = split_selector(&[1, 2, 3, 4, 9]).unwrap();
        assert_eq!(selector, [1, 2, 3, 4]);
        assert_eq!(params, &[9]);

        assert!(split_selector(&[1, 2, 3]).is_err());
    }

    #[test]
    fn test_decode_uint_and_address() {
        let who = Pubkey::new_unique();
        let mut params = uint_word(1_000);
        params.extend_from_slice(who.as_ref());

        let rules = vec![uint_rule(), address_rule(vec![])];
        let decoded = decode_params(&params, &rules).unwrap();

        assert_eq!(decoded[0], DecodedParam::Single(ParamValue::uint(1_000)));
        assert_eq!(decoded[1], DecodedParam::Single(ParamValue::Address(who)));
    }

    #[test]
    fn test_decode_array() {
        let a = Pubkey::new_unique();
        let b = Pubkey::new_unique();
        let mut params = 2u32.to_le_bytes().to_vec();
        params.extend_from_slice(a.as_ref());
        params.extend_from_slice(b.as_ref());

        let rules = vec![ParamRule {
            param_type: ParamType::Address,
            is_array: true,
            allow_list: vec![],
        }];
        let decoded = decode_params(&params, &rules).unwrap();
        assert_eq!(
            decoded[0],
            DecodedParam::Array(vec![ParamValue::Address(a), ParamValue::Address(b)])
        );
    }

    #[test]
    fn test_decode_rejects_length_mismatch() {
        let rules = vec![uint_rule(), uint_rule()];

        // One word short
        assert!(decode_params(&uint_word(1), &rules).is_err());

        // Trailing bytes
        let mut params = uint_word(1);
        params.extend(uint_word(2));
        params.push(0);
        assert!(decode_params(&params, &rules).is_err());
    }

    #[test]
    fn test_decode_rejects_oversized_array_len() {
        let rules = vec![ParamRule {
            param_type: ParamType::Uint256,
            is_array: true,
            allow_list: vec![],
        }];
        let params = u32::MAX.to_le_bytes().to_vec();
        assert!(decode_params(&params, &rules).is_err());
    }

    #[test]
    fn test_validate_allow_list() {
        let vault = Pubkey::new_unique();
        let rules = vec![address_rule(vec![vault])];

        let good = vec![DecodedParam::Single(ParamValue::Address(vault))];
        assert!(validate_params(&good, &rules).is_ok());

        let bad = vec![DecodedParam::Single(ParamValue::Address(Pubkey::new_unique()))];
        assert!(validate_params(&bad, &rules).is_err());
    }

    #[test]
    fn test_validate_every_array_element() {
        let allowed = Pubkey::new_unique();
        let rules = vec![ParamRule {
            param_type: ParamType::Address,
            is_array: true,
            allow_list: vec![allowed],
        }];

        let mixed = vec![DecodedParam::Array(vec![
            ParamValue::Address(allowed),
            ParamValue::Address(Pubkey::new_unique()),
        ])];
        assert!(validate_params(&mixed, &rules).is_err());

        let empty = vec![DecodedParam::Array(vec![])];
        assert!(validate_params(&empty, &rules).is_ok());
    }

    #[test]
    fn test_uint_allow_list_compares_words() {
        let word = match ParamValue::uint(42) {
            ParamValue::Uint256(word) => word,
            ParamValue::Address(_) => unreachable!(),
        };
        let rule = ParamRule {
            param_type: ParamType::Uint256,
            is_array: false,
            allow_list: vec![Pubkey::new_from_array(word)],
        };

        assert!(rule.permits(&ParamValue::uint(42)));
        assert!(!rule.permits(&ParamValue::uint(43)));
    }

    #[test]
    fn test_rule_limits() {
        let too_many_params = FunctionRule {
            is_active: true,
            param_rules: vec![uint_rule(); MAX_PARAMS + 1],
            account_rules: vec![],
            allow_value: false,
        };
        assert!(too_many_params.check_limits().is_err());

        let long_list = FunctionRule {
            is_active: true,
            param_rules: vec![address_rule(vec![Pubkey::new_unique(); MAX_ALLOW_LIST + 1])],
            account_rules: vec![],
            allow_value: false,
        };
        assert!(long_list.check_limits().is_err());

        let too_many_accounts = FunctionRule {
            is_active: true,
            param_rules: vec![],
            account_rules: vec![Pubkey::new_unique(); MAX_RULE_ACCOUNTS + 1],
            allow_value: false,
        };
        assert!(too_many_accounts.check_limits().is_err());
    }

    #[test]
    fn test_value_recipient_must_be_pinned() {
        let mut rule = FunctionRule {
            is_active: true,
            param_rules: vec![],
            account_rules: vec![Pubkey::default()],
            allow_value: true,
        };
        assert!(rule.check_limits().is_err());

        rule.account_rules = vec![];
        assert!(rule.check_limits().is_err());

        rule.account_rules = vec![Pubkey::new_unique()];
        assert!(rule.check_limits().is_ok());
    }

    #[test]
    fn test_validate_accounts() {
        let authority = Pubkey::new_unique();
        let pool = Pubkey::new_unique();
        let rule = FunctionRule {
            is_active: true,
            param_rules: vec![],
            account_rules: vec![pool, Pubkey::default()],
            allow_value: false,
        };

        let any = Pubkey::new_unique();
        assert!(rule.validate_accounts(&[pool, any], 0, &authority).is_ok());

        // Pinned position holds another key
        assert!(rule.validate_accounts(&[any, any], 0, &authority).is_err());
        // Open position may not carry the vault's signature
        assert!(rule.validate_accounts(&[pool, authority], 0, &authority).is_err());
        // Missing or extra accounts
        assert!(rule.validate_accounts(&[pool], 0, &authority).is_err());
        assert!(rule.validate_accounts(&[pool, any, any], 0, &authority).is_err());
        // Value without permission
        assert!(rule.validate_accounts(&[pool, any], 1, &authority).is_err());
    }
}
