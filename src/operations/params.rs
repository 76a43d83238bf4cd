//! Parsing helpers shared by the operation validators.
//!
//! All inputs arrive as caller-supplied text and leave as typed values, or a
//! [`ParamError`] naming the offending field.

use alloy::primitives::{Address, U256};

use crate::operations::error::ParamError;

/// Maximum royalty expressible in basis points (100%).
pub const MAX_ROYALTY_BPS: u16 = 10_000;

/// Parse a non-zero contract or account address.
pub fn parse_address(field: &'static str, value: &str) -> Result<Address, ParamError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ParamError::Missing(field));
    }
    let address: Address = value.parse().map_err(|_| ParamError::InvalidAddress {
        field,
        value: value.to_string(),
    })?;
    if address.is_zero() {
        return Err(ParamError::ZeroAddress(field));
    }
    Ok(address)
}

/// Parse a strictly positive base-10 integer.
///
/// Rejects empty input, signs, decimals, exponents and hex.
pub fn parse_positive(field: &'static str, value: &str) -> Result<U256, ParamError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ParamError::Missing(field));
    }
    if !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParamError::NotNumeric {
            field,
            value: value.to_string(),
        });
    }
    let parsed = U256::from_str_radix(value, 10).map_err(|_| ParamError::NotNumeric {
        field,
        value: value.to_string(),
    })?;
    if parsed.is_zero() {
        return Err(ParamError::NotPositive(field));
    }
    Ok(parsed)
}

/// Parse an amount of wei; must be strictly positive.
pub fn parse_wei(field: &'static str, value: &str) -> Result<U256, ParamError> {
    parse_positive(field, value)
}

/// Parse a token id; must be a positive integer.
pub fn parse_token_id(value: &str) -> Result<U256, ParamError> {
    parse_positive("token_id", value)
}

/// Check a listing id is positive.
pub fn check_listing_id(listing_id: u64) -> Result<U256, ParamError> {
    if listing_id == 0 {
        return Err(ParamError::NotPositive("listing_id"));
    }
    Ok(U256::from(listing_id))
}

/// Require non-blank text, returning it trimmed.
pub fn require_text(field: &'static str, value: &str) -> Result<String, ParamError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ParamError::Missing(field));
    }
    Ok(value.to_string())
}

/// Check a royalty is within 0..=10000 basis points.
pub fn check_royalty(royalty_bps: u16) -> Result<u16, ParamError> {
    if royalty_bps > MAX_ROYALTY_BPS {
        return Err(ParamError::OutOfRange {
            field: "royalty_bps",
            max: MAX_ROYALTY_BPS as u64,
        });
    }
    Ok(royalty_bps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_wei() {
        assert_eq!(
            parse_wei("price", "1000000000000000000").unwrap(),
            U256::from(1_000_000_000_000_000_000u128)
        );
        assert_eq!(parse_wei("price", " 42 ").unwrap(), U256::from(42));
    }

    #[test]
    fn test_parse_wei_rejects_bad_amounts() {
        assert_eq!(parse_wei("price", "0"), Err(ParamError::NotPositive("price")));
        assert_eq!(parse_wei("price", "000"), Err(ParamError::NotPositive("price")));
        assert_eq!(parse_wei("price", ""), Err(ParamError::Missing("price")));
        for bad in ["-1", "1.5", "abc", "1e18", "0x10", "+5"] {
            assert!(
                matches!(parse_wei("price", bad), Err(ParamError::NotNumeric { .. })),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_parse_wei_overflow() {
        let too_big = "1".repeat(90);
        assert!(matches!(parse_wei("price", &too_big), Err(ParamError::NotNumeric { .. })));
    }

    #[test]
    fn test_parse_address() {
        let addr = parse_address("nft_contract", "0x5FbDB2315678afecb367f032d93F642f64180aa3");
        assert!(addr.is_ok());

        assert_eq!(parse_address("nft_contract", " "), Err(ParamError::Missing("nft_contract")));
        assert_eq!(
            parse_address("nft_contract", "0x0000000000000000000000000000000000000000"),
            Err(ParamError::ZeroAddress("nft_contract"))
        );
        assert!(matches!(
            parse_address("nft_contract", "0x1234"),
            Err(ParamError::InvalidAddress { .. })
        ));
    }

    #[test]
    fn test_ids() {
        assert_eq!(parse_token_id("7").unwrap(), U256::from(7));
        assert_eq!(parse_token_id("0"), Err(ParamError::NotPositive("token_id")));
        assert_eq!(check_listing_id(0), Err(ParamError::NotPositive("listing_id")));
        assert_eq!(check_listing_id(42).unwrap(), U256::from(42));
    }

    #[test]
    fn test_text_and_royalty() {
        assert_eq!(require_text("name", "  Apes "), Ok("Apes".to_string()));
        assert_eq!(require_text("name", "\t"), Err(ParamError::Missing("name")));
        assert_eq!(check_royalty(10_000), Ok(10_000));
        assert!(check_royalty(10_001).is_err());
    }
}
