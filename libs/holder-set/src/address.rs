//! Structural validation of contract identifiers.
//!
//! Accepts exactly `0x` followed by 40 hex digits, in any letter case.
//! Checksums are not verified.

use alloy_primitives::Address;

use crate::errors::ResolverError;

/// Length of a `0x`-prefixed 20-byte hex address
pub const ADDRESS_STR_LEN: usize = 42;

/// Check the `0x` + 40 hex digit shape and parse into an [`Address`].
pub fn parse_address(input: &str) -> Result<Address, ResolverError> {
    let invalid = |reason: &str| ResolverError::InvalidAddress {
        input: input.to_string(),
        reason: reason.to_string(),
    };

    let digits = input
        .strip_prefix("0x")
        .ok_or_else(|| invalid("missing 0x prefix"))?;

    if input.len() != ADDRESS_STR_LEN {
        return Err(invalid("expected 40 hex digits"));
    }

    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid("contains non-hex characters"));
    }

    digits.parse::<Address>().map_err(|e| invalid(&e.to_string()))
}

/// True if `input` would be accepted by [`parse_address`].
pub fn is_address(input: &str) -> bool {
    parse_address(input).is_ok()
}
