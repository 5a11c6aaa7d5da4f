use anchor_lang::prelude::*;

/// Custom error codes for the Multi-Asset Vault program
///
/// Limit errors are raised through `require_gte!`, which logs the permitted
/// and requested values next to the code.
#[error_code]
pub enum VaultError {
    // ---- state guards ----
    #[msg("Vault is paused")]
    VaultPaused,

    #[msg("Rate provider has not been configured")]
    RateProviderNotSet,

    #[msg("Vault has no registered assets")]
    NoAssets,

    #[msg("Reentrant call into a locked vault")]
    Reentrancy,

    // ---- validation ----
    #[msg("Amount must be greater than zero")]
    ZeroAmount,

    #[msg("Operation would mint or burn zero shares")]
    ZeroShares,

    #[msg("Address must not be the default key")]
    ZeroAddress,

    #[msg("Asset is not registered with the vault")]
    InvalidAsset,

    #[msg("Asset is registered but not active")]
    AssetNotActive,

    #[msg("Asset not found in registry")]
    AssetNotFound,

    #[msg("Asset already exists in registry")]
    DuplicateAsset,

    #[msg("Strategy not found in registry")]
    StrategyNotFound,

    #[msg("Strategy already exists in registry")]
    DuplicateStrategy,

    #[msg("Registry is full - maximum entries reached")]
    RegistryFull,

    #[msg("Call target is the default key or does not match the supplied program")]
    InvalidTarget,

    #[msg("No active processor rule for target and selector")]
    InvalidFunction,

    #[msg("Input arrays have different lengths")]
    ArrayLengthMismatch,

    #[msg("Processor rule exceeds parameter or allow-list limits")]
    RuleTooLarge,

    #[msg("Processor rule allows value without a pinned recipient")]
    InvalidRule,

    #[msg("Rate provider has no rate for this asset")]
    RateNotFound,

    #[msg("Invalid token mint")]
    InvalidMint,

    #[msg("Invalid token account owner")]
    InvalidOwner,

    #[msg("Unauthorized - caller does not hold the required role")]
    Unauthorized,

    #[msg("Caller allowance over the owner's shares is insufficient")]
    InsufficientAllowance,

    // ---- limits ----
    #[msg("Deposit exceeds max deposit")]
    ExceededMaxDeposit,

    #[msg("Mint exceeds max mint")]
    ExceededMaxMint,

    #[msg("Withdraw exceeds max withdraw")]
    ExceededMaxWithdraw,

    #[msg("Redeem exceeds max redeem")]
    ExceededMaxRedeem,

    #[msg("Insufficient idle balance in the vault for this asset")]
    InsufficientVaultBalance,

    // ---- downstream calls ----
    #[msg("Call payload does not decode against its processor rule")]
    ProcessInvalid,

    #[msg("Call parameter is not in the rule's allow list")]
    ParamNotAllowed,

    #[msg("Call accounts do not match the rule")]
    AccountNotAllowed,

    #[msg("Call attaches lamports the rule does not allow")]
    ValueNotAllowed,

    #[msg("Outbound call could not be dispatched")]
    ProcessFailed,

    // ---- math ----
    #[msg("Math overflow occurred during calculation")]
    MathOverflow,

    #[msg("Division by zero")]
    DivisionByZero,
}
