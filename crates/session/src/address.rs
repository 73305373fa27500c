use crate::SessionError;
use alloy_primitives::Address;

/// Parse a user-supplied address.
///
/// Accepts 40 hex digits with an optional `0x` prefix. All-lowercase and
/// all-uppercase input is taken as is; mixed case must be a valid EIP-55
/// checksum.
pub fn parse_address(input: &str) -> Result<Address, SessionError> {
    let invalid = || SessionError::InvalidAddress(input.to_string());

    let trimmed = input.trim();
    let hex = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if hex.len() != 40 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let has_lower = hex.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = hex.bytes().any(|b| b.is_ascii_uppercase());
    let prefixed = format!("0x{hex}");

    if has_lower && has_upper {
        Address::parse_checksummed(&prefixed, None).map_err(|_| invalid())
    } else {
        prefixed.parse().map_err(|_| invalid())
    }
}
