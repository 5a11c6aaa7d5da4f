use anchor_lang::prelude::*;

use crate::errors::VaultError;

/// Direction an integer division is rounded in.
///
/// Callers pick the direction so that every conversion favours the vault:
/// deposit floors shares out, mint ceils assets in, withdraw ceils shares
/// burned, redeem floors assets out.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Rounding {
    Floor,
    Ceiling,
}

/// `10^exponent` as u128, failing past 10^38
pub fn pow10(exponent: u8) -> Result<u128> {
    10u128
        .checked_pow(exponent as u32)
        .ok_or(error!(VaultError::MathOverflow))
}

/// Convert an asset amount into base units.
///
/// Formula: base = amount × rate / 10^decimals
///
/// Floors: the value credited for assets coming in.
pub fn to_base(amount: u64, rate: u64, decimals: u8) -> Result<u64> {
    to_base_rounded(amount, rate, decimals, Rounding::Floor)
}

/// [`to_base`] with explicit rounding; outflows are valued with `Ceiling`
pub fn to_base_rounded(amount: u64, rate: u64, decimals: u8, rounding: Rounding) -> Result<u64> {
    mul_div(amount, rate as u128, pow10(decimals)?, rounding)
}

/// Convert base units back into an asset amount.
///
/// Formula: amount = base × 10^decimals / rate
pub fn from_base(base: u64, rate: u64, decimals: u8, rounding: Rounding) -> Result<u64> {
    mul_div(base, pow10(decimals)?, rate as u128, rounding)
}

/// Convert base assets to shares with virtual offset protection against inflation attacks.
///
/// Formula: shares = base × (total_shares + 10^offset) / (total_base_assets + 1)
///
/// The virtual share and the virtual base unit keep the empty vault away from
/// a zero denominator and stop a donation from skewing the first exchange rate.
pub fn convert_to_shares(
    base: u64,
    total_base_assets: u64,
    total_shares: u64,
    decimals_offset: u8,
    rounding: Rounding,
) -> Result<u64> {
    let virtual_shares = (total_shares as u128)
        .checked_add(pow10(decimals_offset)?)
        .ok_or(VaultError::MathOverflow)?;
    let virtual_assets = (total_base_assets as u128) + 1;

    mul_div(base, virtual_shares, virtual_assets, rounding)
}

/// Convert shares to base assets with virtual offset protection.
///
/// Formula: base = shares × (total_base_assets + 1) / (total_shares + 10^offset)
pub fn convert_to_assets(
    shares: u64,
    total_base_assets: u64,
    total_shares: u64,
    decimals_offset: u8,
    rounding: Rounding,
) -> Result<u64> {
    let virtual_shares = (total_shares as u128)
        .checked_add(pow10(decimals_offset)?)
        .ok_or(VaultError::MathOverflow)?;
    let virtual_assets = (total_base_assets as u128) + 1;

    mul_div(shares, virtual_assets, virtual_shares, rounding)
}

/// Safe multiplication then division with configurable rounding.
///
/// Computes: (value × numerator) / denominator in u128, result must fit u64.
pub fn mul_div(value: u64, numerator: u128, denominator: u128, rounding: Rounding) -> Result<u64> {
    require!(denominator > 0, VaultError::DivisionByZero);

    let product = (value as u128)
        .checked_mul(numerator)
        .ok_or(VaultError::MathOverflow)?;

    let quotient = product / denominator;
    let result = match rounding {
        Rounding::Floor => quotient,
        Rounding::Ceiling if product % denominator == 0 => quotient,
        Rounding::Ceiling => quotient + 1,
    };

    u64::try_from(result).map_err(|_| error!(VaultError::MathOverflow))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE_18: u64 = 1_000_000_000_000_000_000;

    #[test]
    fn test_mul_div_floor() {
        assert_eq!(mul_div(100, 3, 2, Rounding::Floor).unwrap(), 150);
        assert_eq!(mul_div(100, 1, 3, Rounding::Floor).unwrap(), 33);
    }

    #[test]
    fn test_mul_div_ceiling() {
        assert_eq!(mul_div(100, 3, 2, Rounding::Ceiling).unwrap(), 150);
        assert_eq!(mul_div(100, 1, 3, Rounding::Ceiling).unwrap(), 34);
    }

    #[test]
    fn test_division_by_zero() {
        assert!(mul_div(100, 100, 0, Rounding::Floor).is_err());
    }

    #[test]
    fn test_result_must_fit_u64() {
        assert!(mul_div(u64::MAX, 2, 1, Rounding::Floor).is_err());
    }

    #[test]
    fn test_to_base_unit_rate() {
        // Rate equal to 10^decimals: one base unit per raw unit
        assert_eq!(to_base(1000, ONE_18, 18).unwrap(), 1000);
        assert_eq!(to_base(1_500_000, 1_000_000, 6).unwrap(), 1_500_000);
    }

    #[test]
    fn test_to_base_rounded_up_for_outflows() {
        // 2 raw units at 0.999999999 are worth 1.999999998 base
        assert_eq!(to_base_rounded(2, 999_999_999, 9, Rounding::Floor).unwrap(), 1);
        assert_eq!(to_base_rounded(2, 999_999_999, 9, Rounding::Ceiling).unwrap(), 2);
        // Exact values are not bumped
        assert_eq!(to_base_rounded(3, 1_000_000_000, 9, Rounding::Ceiling).unwrap(), 3);
    }

    #[test]
    fn test_to_base_floors() {
        // 10 * 1.05 = 10.5 -> 10
        assert_eq!(to_base(10, 1_050_000, 6).unwrap(), 10);
        // 3 units at rate 0.5 -> 1.5 -> 1
        assert_eq!(to_base(3, 500_000_000, 9).unwrap(), 1);
    }

    #[test]
    fn test_from_base_rounding() {
        // 10 base at rate 3.0 (6 decimals) -> 3.33 units
        assert_eq!(from_base(10, 3_000_000, 6, Rounding::Floor).unwrap(), 3);
        assert_eq!(from_base(10, 3_000_000, 6, Rounding::Ceiling).unwrap(), 4);
    }

    #[test]
    fn test_from_base_zero_rate() {
        assert!(from_base(10, 0, 6, Rounding::Floor).is_err());
    }

    #[test]
    fn test_decimals_beyond_u128() {
        assert!(pow10(38).is_ok());
        assert!(pow10(39).is_err());
        assert!(to_base(1, 1, 200).is_err());
    }

    #[test]
    fn test_convert_to_shares_empty_vault() {
        // Offset 0: virtual shares = 1, virtual assets = 1 -> 1:1
        assert_eq!(convert_to_shares(1000, 0, 0, 0, Rounding::Floor).unwrap(), 1000);
        // Offset 3 inflates the first mint by 10^3
        assert_eq!(
            convert_to_shares(1_000_000, 0, 0, 3, Rounding::Floor).unwrap(),
            1_000_000_000
        );
    }

    #[test]
    fn test_convert_to_shares_proportional() {
        // 2000 base backing 1000 shares: 500 base buys ~250 shares
        let shares = convert_to_shares(500, 2000, 1000, 0, Rounding::Floor).unwrap();
        // 500 * 1001 / 2001 = 250.12 -> 250
        assert_eq!(shares, 250);
    }

    #[test]
    fn test_convert_to_assets_proportional() {
        // 500 * 2001 / 1001 = 999.5 -> 999 floor, 1000 ceiling
        assert_eq!(convert_to_assets(500, 2000, 1000, 0, Rounding::Floor).unwrap(), 999);
        assert_eq!(convert_to_assets(500, 2000, 1000, 0, Rounding::Ceiling).unwrap(), 1000);
    }

    #[test]
    fn test_inflation_attack_protection() {
        // Attacker donates 1M base to an empty vault, victim deposits 1
        // shares = 1 * (0 + 1) / (1_000_000 + 1) = 0
        let shares = convert_to_shares(1, 1_000_000, 0, 0, Rounding::Floor).unwrap();
        assert_eq!(shares, 0);
    }

    #[test]
    fn test_rounding_favors_vault() {
        let deposit_shares = convert_to_shares(100, 1000, 999, 0, Rounding::Floor).unwrap();
        let withdraw_shares = convert_to_shares(100, 1000, 999, 0, Rounding::Ceiling).unwrap();
        let redeem_assets = convert_to_assets(100, 1000, 999, 0, Rounding::Floor).unwrap();
        let mint_assets = convert_to_assets(100, 1000, 999, 0, Rounding::Ceiling).unwrap();

        assert!(withdraw_shares >= deposit_shares);
        assert!(mint_assets >= redeem_assets);
    }

    #[test]
    fn test_max_values() {
        let large = u64::MAX / 2;
        assert!(convert_to_shares(large, large, large, 0, Rounding::Floor).is_ok());
    }
}
